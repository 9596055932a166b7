pub mod errors;
pub mod files;
pub mod html;

pub use errors::{error_to_response, ResultResp};
pub use files::{csv_response, json_response, static_response, xlsx_response};
pub use html::{html_response, html_response_with};
