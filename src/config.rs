// config.rs
use crate::errors::{AdminError, Result};
use crate::geo::SpatialReference;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_LAYER_URL: &str =
    "https://services3.arcgis.com/DAf01WuIltSLujAv/arcgis/rest/services/Garage_Sales/FeatureServer/0";
pub const DEFAULT_GEOCODING_SERVICE: &str =
    "https://geocode-api.arcgis.com/arcgis/rest/services/World/GeocodeServer";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Organization {
    pub name: String,
    pub state: String,
    pub website: String,
    pub contact: String,
}

impl Default for Organization {
    fn default() -> Self {
        Self {
            name: "City of Portland".into(),
            state: "Texas".into(),
            website: "https://www.portlandtx.gov".into(),
            contact: "justin.mcintyre@portlandtx.gov".into(),
        }
    }
}

/// WGS84 bounding box used to bias geocoder suggestions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Extent {
    pub xmin: f64,
    pub ymin: f64,
    pub xmax: f64,
    pub ymax: f64,
}

impl Extent {
    /// `xmin,ymin,xmax,ymax`, the form the geocoder accepts for `searchExtent`.
    pub fn to_param(&self) -> String {
        format!("{},{},{},{}", self.xmin, self.ymin, self.xmax, self.ymax)
    }
}

/// Every knob the admin app reads. Missing keys in a config file fall back
/// to these defaults (City of Portland, TX).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub layer_url: String,
    /// Native spatial reference of the feature layer. Used on write, and on
    /// read when the query response does not say.
    pub layer_wkid: u32,
    pub geocoding_service: String,

    /// `[lat, lng]`
    pub center: [f64; 2],
    pub zoom: u8,
    pub min_zoom: u8,
    pub max_zoom: u8,

    /// Appended to address searches that don't already name the state.
    pub locality: String,
    /// Suggestions mentioning one of these are preferred.
    pub locality_keywords: Vec<String>,
    pub search_extent: Option<Extent>,

    pub request_timeout_ms: u64,
    pub max_retries: u32,
    pub retry_backoff_ms: u64,
    pub auto_refresh_interval_ms: u64,
    pub toast_duration_ms: u64,

    pub auto_compose_description: bool,
    pub multi_day_sales: bool,
    pub export_enabled: bool,
    pub print_enabled: bool,
    pub auto_save_drafts: bool,
    pub enable_address_validation: bool,
    pub dark_mode_default: bool,

    pub description_min_length: usize,
    pub csv_filename: String,
    pub include_coordinates: bool,

    pub organization: Organization,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            layer_url: DEFAULT_LAYER_URL.into(),
            layer_wkid: 3857,
            geocoding_service: DEFAULT_GEOCODING_SERVICE.into(),
            center: [27.876, -97.323],
            zoom: 15,
            min_zoom: 10,
            max_zoom: 19,
            locality: "Portland, TX".into(),
            locality_keywords: vec!["portland".into(), "tx".into(), "texas".into()],
            search_extent: Some(Extent {
                xmin: -97.40,
                ymin: 27.83,
                xmax: -97.25,
                ymax: 27.92,
            }),
            request_timeout_ms: 10_000,
            max_retries: 3,
            retry_backoff_ms: 1_000,
            auto_refresh_interval_ms: 300_000,
            toast_duration_ms: 4_000,
            auto_compose_description: true,
            multi_day_sales: true,
            export_enabled: true,
            print_enabled: true,
            auto_save_drafts: true,
            enable_address_validation: true,
            dark_mode_default: true,
            description_min_length: 5,
            csv_filename: "portland-tx-garage-sales".into(),
            include_coordinates: true,
            organization: Organization::default(),
        }
    }
}

impl Config {
    pub fn from_json_str(raw: &str) -> Result<Self> {
        serde_json::from_str(raw).map_err(|e| AdminError::Config(format!("Invalid config: {e}")))
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            AdminError::Config(format!("Failed to read {}: {e}", path.display()))
        })?;
        Self::from_json_str(&raw)
    }

    /// Reject settings that would only fail later, at request time.
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("layer_url", &self.layer_url),
            ("geocoding_service", &self.geocoding_service),
        ] {
            let parsed = url::Url::parse(value)
                .map_err(|e| AdminError::Config(format!("{name} is not a valid URL: {e}")))?;
            if !matches!(parsed.scheme(), "http" | "https") {
                return Err(AdminError::Config(format!("{name} must be http(s)")));
            }
        }

        if SpatialReference::from_wkid(self.layer_wkid).is_none() {
            return Err(AdminError::Config(format!(
                "Unsupported layer_wkid {} (expected 4326 or 3857)",
                self.layer_wkid
            )));
        }
        if self.max_retries == 0 {
            return Err(AdminError::Config("max_retries must be at least 1".into()));
        }
        if self.request_timeout_ms == 0 {
            return Err(AdminError::Config("request_timeout_ms must be positive".into()));
        }
        if self.min_zoom > self.max_zoom || !(self.min_zoom..=self.max_zoom).contains(&self.zoom) {
            return Err(AdminError::Config(format!(
                "zoom {} must sit within {}..={}",
                self.zoom, self.min_zoom, self.max_zoom
            )));
        }
        let [lat, lng] = self.center;
        if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lng) {
            return Err(AdminError::Config(format!("center {lat},{lng} is out of range")));
        }
        if self.csv_filename.trim().is_empty() {
            return Err(AdminError::Config("csv_filename must not be empty".into()));
        }
        Ok(())
    }

    pub fn layer_spatial_reference(&self) -> SpatialReference {
        SpatialReference::from_wkid(self.layer_wkid).unwrap_or(SpatialReference::WebMercator)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }

    pub fn auto_refresh_interval(&self) -> Option<Duration> {
        (self.auto_refresh_interval_ms > 0)
            .then(|| Duration::from_millis(self.auto_refresh_interval_ms))
    }
}
