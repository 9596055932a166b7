use crate::errors::AdminError;
use crate::responses::ResultResp;
use astra::{Body, ResponseBuilder};
use maud::Markup;

pub fn html_response(markup: Markup) -> ResultResp {
    html_response_with(markup, &[])
}

/// HTML with extra headers, e.g. `HX-Refresh` for htmx.
pub fn html_response_with(markup: Markup, headers: &[(&str, &str)]) -> ResultResp {
    let mut builder = ResponseBuilder::new()
        .status(200)
        .header("Content-Type", "text/html; charset=utf-8");
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }

    builder
        .body(Body::from(markup.into_string()))
        .map_err(|_| AdminError::Internal)
}
