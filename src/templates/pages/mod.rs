pub mod admin;
pub mod report;

pub use admin::{admin_page, description_preview, panel};
pub use report::report_page;
