use super::models::{
    Candidate, CandidatesResponse, ReverseGeocodeResponse, SuggestResponse, Suggestion,
};
use super::{read_json, AddressQuery, Geocoder};
use crate::config::{Config, Extent};
use crate::errors::{AdminError, Result};
use crate::geo::LatLng;
use reqwest::blocking::Client;
use std::time::Duration;

const MAX_SUGGESTIONS: &str = "6";
/// How many unfiltered suggestions to fall back on when none mention the locality.
const FALLBACK_SUGGESTIONS: usize = 4;

pub struct ArcGisGeocoder {
    client: Client,
    base_url: String,
    locality: String,
    locality_keywords: Vec<String>,
    search_extent: Option<Extent>,
}

impl ArcGisGeocoder {
    pub fn new(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .build()
            .map_err(|e| AdminError::Network(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.geocoding_service.trim_end_matches('/').to_string(),
            locality: config.locality.clone(),
            locality_keywords: config
                .locality_keywords
                .iter()
                .map(|k| k.to_lowercase())
                .collect(),
            search_extent: config.search_extent,
        })
    }

    fn endpoint(&self, op: &str) -> String {
        format!("{}/{op}", self.base_url)
    }

    /// Suggestions mentioning the municipality first; if none do, a few of the raw ones.
    /// Category collections ("Coffee Shops") never resolve to one address and are dropped.
    fn prefer_local(&self, suggestions: Vec<Suggestion>) -> Vec<Suggestion> {
        let suggestions: Vec<Suggestion> =
            suggestions.into_iter().filter(|s| !s.is_collection).collect();
        let local: Vec<Suggestion> = suggestions
            .iter()
            .filter(|s| {
                let text = s.text.to_lowercase();
                self.locality_keywords.iter().any(|k| text.contains(k.as_str()))
            })
            .cloned()
            .collect();

        if local.is_empty() {
            suggestions.into_iter().take(FALLBACK_SUGGESTIONS).collect()
        } else {
            local
        }
    }
}

/// Appends `", <locality>"` unless the text already names the locality's
/// last part (the state, for `"Portland, TX"`).
pub fn bias_text(text: &str, locality: &str) -> String {
    let text = text.trim();
    let Some(state) = locality
        .rsplit(',')
        .next()
        .map(str::trim)
        .filter(|s| !s.is_empty())
    else {
        return text.to_string();
    };

    let mentions_state = text
        .split(|c: char| !c.is_alphanumeric())
        .any(|word| word.eq_ignore_ascii_case(state));

    if mentions_state {
        text.to_string()
    } else {
        format!("{text}, {locality}")
    }
}

impl Geocoder for ArcGisGeocoder {
    fn suggest(&self, text: &str) -> Result<Vec<Suggestion>> {
        let biased = bias_text(text, &self.locality);
        let mut params = vec![
            ("text", biased),
            ("f", "json".to_string()),
            ("maxSuggestions", MAX_SUGGESTIONS.to_string()),
            ("countryCode", "USA".to_string()),
            ("category", "Address".to_string()),
        ];
        if let Some(extent) = &self.search_extent {
            params.push(("searchExtent", extent.to_param()));
        }

        let resp = self.client.get(self.endpoint("suggest")).query(&params).send()?;
        let body: SuggestResponse = read_json(resp, "suggest")?;
        Ok(self.prefer_local(body.suggestions))
    }

    fn find_address_candidates(&self, query: &AddressQuery) -> Result<Option<Candidate>> {
        let mut params = vec![
            ("f", "json".to_string()),
            ("outSR", "4326".to_string()),
            ("maxLocations", "1".to_string()),
        ];
        match query {
            AddressQuery::Text(text) => {
                params.push(("singleLine", bias_text(text, &self.locality)));
            }
            AddressQuery::MagicKey { text, magic_key } => {
                params.push(("singleLine", text.clone()));
                params.push(("magicKey", magic_key.clone()));
            }
        }

        let resp = self
            .client
            .get(self.endpoint("findAddressCandidates"))
            .query(&params)
            .send()?;
        let body: CandidatesResponse = read_json(resp, "findAddressCandidates")?;

        Ok(body
            .candidates
            .into_iter()
            .max_by(|a, b| a.score.total_cmp(&b.score)))
    }

    fn reverse_geocode(&self, at: LatLng) -> Result<Option<String>> {
        let resp = self
            .client
            .get(self.endpoint("reverseGeocode"))
            .query(&[
                ("location", format!("{},{}", at.lng, at.lat)),
                ("f", "json".to_string()),
            ])
            .send()?;
        let body: ReverseGeocodeResponse = read_json(resp, "reverseGeocode")?;

        Ok(body
            .address
            .and_then(|a| a.match_addr)
            .filter(|a| !a.trim().is_empty()))
    }
}

impl Candidate {
    pub fn lat_lng(&self) -> LatLng {
        LatLng::new(self.location.y, self.location.x)
    }
}
