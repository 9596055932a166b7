// feature_service.rs
use super::models::{ApplyEditsResponse, DeleteResponse, EditResult, QueryResponse};
use super::{read_json, EditOutcome, FeatureService, QueryResult};
use crate::domain::Feature;
use crate::errors::{AdminError, Result};
use reqwest::blocking::{multipart, Client};
use std::time::Duration;
use tracing::{debug, info, warn};

const USER_AGENT: &str = concat!("garage-sale-admin/", env!("CARGO_PKG_VERSION"));
const WRITE_TIMEOUT: Duration = Duration::from_secs(30);

/// Client for one FeatureServer layer, e.g. `.../FeatureServer/0`.
pub struct ArcGisFeatureService {
    client: Client,
    layer_url: String,
    query_timeout: Duration,
}

impl ArcGisFeatureService {
    pub fn new(layer_url: &str, query_timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(WRITE_TIMEOUT)
            .build()
            .map_err(|e| AdminError::Network(e.to_string()))?;

        Ok(Self {
            client,
            layer_url: layer_url.trim_end_matches('/').to_string(),
            query_timeout,
        })
    }

    fn endpoint(&self, op: &str) -> String {
        format!("{}/{op}", self.layer_url)
    }
}

impl FeatureService for ArcGisFeatureService {
    fn query_all(&self) -> Result<QueryResult> {
        let url = self.endpoint("query");
        debug!("🌐 Querying {url}");

        // The per-request timeout aborts the call; the client default is for writes.
        let resp = self
            .client
            .get(&url)
            .query(&[
                ("where", "1=1"),
                ("outFields", "*"),
                ("returnGeometry", "true"),
                ("f", "json"),
            ])
            .timeout(self.query_timeout)
            .send()?;

        let body: QueryResponse = read_json(resp, "query")?;
        let (spatial_reference, unsupported_wkid) = match body.spatial_reference {
            Some(sr) => match (sr.spatial_reference(), sr.reported()) {
                (Some(reference), _) => (Some(reference), None),
                (None, Some(wkid)) => {
                    warn!("⚠️ Layer reports unsupported spatial reference {wkid}");
                    (None, Some(wkid))
                }
                (None, None) => (None, None),
            },
            None => (None, None),
        };

        let total = body.features.len();
        let features: Vec<Feature> = body
            .features
            .into_iter()
            .enumerate()
            .filter_map(|(i, raw)| match serde_json::from_value(raw) {
                Ok(feature) => Some(feature),
                Err(e) => {
                    warn!("⚠️ Skipping feature {i}: {e}");
                    None
                }
            })
            .collect();

        info!("📍 Found {} garage sales ({} skipped)", features.len(), total - features.len());

        Ok(QueryResult {
            features,
            spatial_reference,
            unsupported_wkid,
        })
    }

    fn apply_edits(&self, adds: &[Feature], updates: &[Feature]) -> Result<EditOutcome> {
        let mut form = multipart::Form::new().text("f", "json");
        if !adds.is_empty() {
            form = form.text("adds", encode(adds)?);
        }
        if !updates.is_empty() {
            form = form.text("updates", encode(updates)?);
        }

        let resp = self
            .client
            .post(self.endpoint("applyEdits"))
            .multipart(form)
            .send()?;

        let body: ApplyEditsResponse = read_json(resp, "applyEdits")?;

        let first = body
            .add_results
            .first()
            .filter(|r| r.success)
            .or_else(|| body.update_results.first().filter(|r| r.success));

        match first {
            Some(result) => Ok(EditOutcome {
                object_id: result.object_id,
            }),
            None => Err(failed_edit(
                body.add_results.first().or(body.update_results.first()),
                "Save operation failed",
            )),
        }
    }

    fn delete_features(&self, object_id: i64) -> Result<()> {
        let resp = self
            .client
            .post(self.endpoint("deleteFeatures"))
            .form(&[("objectIds", object_id.to_string()), ("f", "json".into())])
            .send()?;

        let body: DeleteResponse = read_json(resp, "deleteFeatures")?;
        match body.delete_results.first() {
            Some(result) if result.success => Ok(()),
            other => Err(failed_edit(other, "Delete operation failed")),
        }
    }
}

fn failed_edit(result: Option<&EditResult>, fallback: &str) -> AdminError {
    let message = result
        .and_then(|r| r.error.as_ref())
        .map(|e| e.summary())
        .unwrap_or_else(|| fallback.to_string());
    AdminError::Service(message)
}

fn encode(features: &[Feature]) -> Result<String> {
    serde_json::to_string(features).map_err(|e| {
        warn!("Failed to encode edits: {e}");
        AdminError::Internal
    })
}
