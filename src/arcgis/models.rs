use crate::domain::listing::WkidRef;
use serde::Deserialize;
use serde_json::Value;

/// `{"error": {"code": 400, "message": "...", "details": [...]}}`
#[derive(Debug, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub code: Option<i64>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub details: Vec<String>,
}

impl ErrorBody {
    pub fn summary(&self) -> String {
        let text = self
            .message
            .as_deref()
            .or(self.description.as_deref())
            .unwrap_or("ArcGIS service error");
        match (self.code, self.details.first()) {
            (Some(code), Some(detail)) => format!("{text} ({code}: {detail})"),
            (Some(code), None) => format!("{text} ({code})"),
            (None, Some(detail)) => format!("{text} ({detail})"),
            (None, None) => text.to_string(),
        }
    }
}

/// Raw `query` response. Features stay untyped until each is checked on its own.
#[derive(Debug, Deserialize)]
pub struct QueryResponse {
    #[serde(default)]
    pub features: Vec<Value>,
    #[serde(rename = "spatialReference", default)]
    pub spatial_reference: Option<WkidRef>,
}

#[derive(Debug, Deserialize)]
pub struct EditResult {
    #[serde(rename = "objectId", default)]
    pub object_id: Option<i64>,
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub error: Option<ErrorBody>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ApplyEditsResponse {
    #[serde(rename = "addResults", default)]
    pub add_results: Vec<EditResult>,
    #[serde(rename = "updateResults", default)]
    pub update_results: Vec<EditResult>,
}

#[derive(Debug, Default, Deserialize)]
pub struct DeleteResponse {
    #[serde(rename = "deleteResults", default)]
    pub delete_results: Vec<EditResult>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Suggestion {
    pub text: String,
    #[serde(rename = "magicKey", default)]
    pub magic_key: Option<String>,
    #[serde(rename = "isCollection", default)]
    pub is_collection: bool,
}

#[derive(Debug, Deserialize)]
pub struct SuggestResponse {
    #[serde(default)]
    pub suggestions: Vec<Suggestion>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Location {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Candidate {
    #[serde(default)]
    pub address: String,
    pub location: Location,
    #[serde(default)]
    pub score: f64,
}

#[derive(Debug, Deserialize)]
pub struct CandidatesResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
pub struct ReverseAddress {
    #[serde(rename = "Match_addr", default)]
    pub match_addr: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ReverseGeocodeResponse {
    #[serde(default)]
    pub address: Option<ReverseAddress>,
}
