mod projection;

pub use projection::{LatLng, SpatialReference};
