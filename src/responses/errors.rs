use crate::errors::AdminError;
use crate::templates::components::error_page;
use astra::{Body, Response, ResponseBuilder};
use tracing::{error, warn};

pub type ResultResp = Result<Response, AdminError>;

pub fn status_for(err: &AdminError) -> u16 {
    match err {
        AdminError::NotFound => 404,
        e if e.is_user_input() => 400,
        AdminError::BadRequest(_) => 400,
        AdminError::Network(_) | AdminError::Service(_) => 502,
        _ => 500,
    }
}

/// Convert an AdminError into an HTML error page with a matching status.
pub fn error_to_response(err: AdminError) -> Response {
    let status = status_for(&err);
    if status >= 500 {
        error!("❌ {status}: {err}");
    } else {
        warn!("⚠️ {status}: {err}");
    }

    let page = error_page(status, &err.to_string()).into_string();
    ResponseBuilder::new()
        .status(status)
        .header("Content-Type", "text/html; charset=utf-8")
        .body(Body::from(page))
        .unwrap_or_else(|_| Response::new(Body::from("Internal Server Error")))
}
