pub mod connection;
pub mod drafts;
pub mod preferences;

pub use connection::{init_db, Database};
