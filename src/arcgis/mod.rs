//! Everything that talks to ArcGIS: the garage sale FeatureServer layer and
//! the World GeocodeServer. The controller only sees the two traits below,
//! so it can run against fakes.

mod feature_service;
mod geocoder;
pub mod models;
mod retry;

pub use feature_service::ArcGisFeatureService;
pub use geocoder::{bias_text, ArcGisGeocoder};
pub use models::{Candidate, Suggestion};
pub use retry::with_retry;

use crate::domain::Feature;
use crate::errors::{AdminError, Result};
use crate::geo::{LatLng, SpatialReference};
use models::ErrorBody;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Result of a full-layer query.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryResult {
    pub features: Vec<Feature>,
    /// Reference the response says its geometry is in, if it says.
    pub spatial_reference: Option<SpatialReference>,
    /// A reference the response reported that cannot be projected here.
    pub unsupported_wkid: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EditOutcome {
    pub object_id: Option<i64>,
}

pub trait FeatureService: Send + Sync {
    /// Every feature in the layer, attributes and geometry.
    fn query_all(&self) -> Result<QueryResult>;

    /// One `applyEdits` call. Succeeds only when the first add or update result does.
    fn apply_edits(&self, adds: &[Feature], updates: &[Feature]) -> Result<EditOutcome>;

    fn delete_features(&self, object_id: i64) -> Result<()>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddressQuery {
    Text(String),
    /// A suggestion picked from `suggest`.
    MagicKey { text: String, magic_key: String },
}

pub trait Geocoder: Send + Sync {
    fn suggest(&self, text: &str) -> Result<Vec<Suggestion>>;

    /// Best candidate, located in WGS84.
    fn find_address_candidates(&self, query: &AddressQuery) -> Result<Option<Candidate>>;

    fn reverse_geocode(&self, at: LatLng) -> Result<Option<String>>;
}

/// Reads an `f=json` response. Non-2xx and `{"error": ...}` bodies become
/// `AdminError::Service` with the remote message.
pub(crate) fn read_json<T: DeserializeOwned>(
    resp: reqwest::blocking::Response,
    what: &str,
) -> Result<T> {
    let status = resp.status();
    let text = resp.text()?;

    let value: Option<Value> = serde_json::from_str(&text).ok();

    if let Some(err) = value.as_ref().and_then(|v| v.get("error")) {
        let body: ErrorBody = serde_json::from_value(err.clone()).unwrap_or_default();
        return Err(AdminError::Service(format!("{what}: {}", body.summary())));
    }

    if !status.is_success() {
        return Err(AdminError::Service(format!(
            "{what}: HTTP {status}: {}",
            snippet(&text)
        )));
    }

    let value = value.ok_or_else(|| {
        AdminError::Service(format!("{what}: response was not JSON: {}", snippet(&text)))
    })?;

    serde_json::from_value(value)
        .map_err(|e| AdminError::Service(format!("{what}: unexpected response shape: {e}")))
}

fn snippet(text: &str) -> String {
    const MAX: usize = 200;
    match text.char_indices().nth(MAX) {
        Some((cut, _)) => format!("{}…", &text[..cut]),
        None => text.to_string(),
    }
}
