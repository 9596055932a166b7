pub mod dates;
pub mod description;
pub mod listing;

pub use description::{DayEntry, Meridiem, Schedule, TimeOfDay};
pub use listing::{Feature, GarageSaleListing};
