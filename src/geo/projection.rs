// src/geo/projection.rs

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Half the equatorial circumference of the spherical Web Mercator earth, in meters.
pub const HALF_CIRCUMFERENCE: f64 = 20037508.34;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// True when the point can be put on a lat/lng map as-is.
    /// Nothing is clamped; callers skip points that fail this.
    pub fn is_displayable(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && self.lat > -90.0
            && self.lat < 90.0
            && (-180.0..=180.0).contains(&self.lng)
    }
}

/// EPSG:3857 meters to EPSG:4326 degrees.
pub fn web_mercator_to_wgs84(x: f64, y: f64) -> LatLng {
    let lng = x / HALF_CIRCUMFERENCE * 180.0;
    let lat = y / HALF_CIRCUMFERENCE * 180.0;
    let lat = 180.0 / PI * (2.0 * (lat * PI / 180.0).exp().atan() - PI / 2.0);
    LatLng { lat, lng }
}

/// EPSG:4326 degrees to EPSG:3857 meters, returned as `(x, y)`.
pub fn wgs84_to_web_mercator(at: LatLng) -> (f64, f64) {
    let x = at.lng * HALF_CIRCUMFERENCE / 180.0;
    let y = ((90.0 + at.lat) * PI / 360.0).tan().ln() / (PI / 180.0);
    let y = y * HALF_CIRCUMFERENCE / 180.0;
    (x, y)
}

/// The two coordinate systems the feature layer can speak.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpatialReference {
    Wgs84,
    WebMercator,
}

impl SpatialReference {
    /// 102100 is Esri's legacy id for 3857.
    pub fn from_wkid(wkid: u32) -> Option<Self> {
        match wkid {
            4326 => Some(Self::Wgs84),
            3857 | 102100 | 102113 => Some(Self::WebMercator),
            _ => None,
        }
    }

    pub fn wkid(&self) -> u32 {
        match self {
            Self::Wgs84 => 4326,
            Self::WebMercator => 3857,
        }
    }

    /// Native `(x, y)` in this reference to a map position.
    pub fn to_lat_lng(&self, x: f64, y: f64) -> LatLng {
        match self {
            Self::Wgs84 => LatLng { lat: y, lng: x },
            Self::WebMercator => web_mercator_to_wgs84(x, y),
        }
    }

    /// Map position to native `(x, y)` in this reference.
    pub fn from_lat_lng(&self, at: LatLng) -> (f64, f64) {
        match self {
            Self::Wgs84 => (at.lng, at.lat),
            Self::WebMercator => wgs84_to_web_mercator(at),
        }
    }
}
