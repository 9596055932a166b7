mod controller;
pub mod state;

pub use controller::{AdminApp, SuggestionTarget};
pub use state::{DayUpdate, FormInput, Theme};
