use crate::domain::dates;
use crate::geo::{LatLng, SpatialReference};
use serde::{Deserialize, Serialize};
use tracing::warn;

// feature
//  ├── attributes
//  │    ├── OBJECTID
//  │    ├── Address
//  │    ├── Description
//  │    ├── Date_1      (epoch ms)
//  │    └── EndDate     (epoch ms)
//  └── geometry
//       ├── x
//       ├── y
//       └── spatialReference { wkid }

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Attributes {
    #[serde(
        rename = "OBJECTID",
        alias = "ObjectID",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub object_id: Option<i64>,
    #[serde(rename = "Address", default)]
    pub address: Option<String>,
    #[serde(rename = "Description", default)]
    pub description: Option<String>,
    #[serde(rename = "Date_1", default)]
    pub start_date: Option<i64>,
    #[serde(rename = "EndDate", default)]
    pub end_date: Option<i64>,
}

/// `{"wkid": 102100, "latestWkid": 3857}`. Either key may be missing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct WkidRef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wkid: Option<u32>,
    #[serde(rename = "latestWkid", default, skip_serializing_if = "Option::is_none")]
    pub latest_wkid: Option<u32>,
}

impl WkidRef {
    pub fn new(wkid: u32) -> Self {
        Self {
            wkid: Some(wkid),
            latest_wkid: None,
        }
    }

    /// The first of `wkid` and `latestWkid` that can be projected here.
    pub fn spatial_reference(&self) -> Option<SpatialReference> {
        self.wkid
            .and_then(SpatialReference::from_wkid)
            .or_else(|| self.latest_wkid.and_then(SpatialReference::from_wkid))
    }

    /// The code as sent, for messages.
    pub fn reported(&self) -> Option<u32> {
        self.wkid.or(self.latest_wkid)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointGeometry {
    pub x: f64,
    pub y: f64,
    #[serde(
        rename = "spatialReference",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub spatial_reference: Option<WkidRef>,
}

/// A feature as the FeatureServer sends and receives it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    pub attributes: Attributes,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geometry: Option<PointGeometry>,
}

/// A garage sale with its position already in map coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct GarageSaleListing {
    /// Assigned by the feature service; `None` until first save.
    pub object_id: Option<i64>,
    pub address: String,
    pub description: String,
    pub start_date: Option<i64>,
    pub end_date: Option<i64>,
    pub position: Option<LatLng>,
}

impl GarageSaleListing {
    /// `layer` is the reference the geometry is in, unless the geometry itself says otherwise.
    pub fn from_feature(feature: &Feature, layer: SpatialReference) -> Self {
        let attrs = &feature.attributes;
        let position = feature.geometry.as_ref().map(|geom| {
            let reference = match geom.spatial_reference {
                Some(sr) => sr.spatial_reference().unwrap_or_else(|| {
                    warn!(
                        "⚠️ Sale {:?} has unsupported spatial reference {:?}; assuming {}",
                        attrs.object_id,
                        sr.reported(),
                        layer.wkid()
                    );
                    layer
                }),
                None => layer,
            };
            reference.to_lat_lng(geom.x, geom.y)
        });

        Self {
            object_id: attrs.object_id,
            address: attrs.address.clone().unwrap_or_default(),
            description: attrs.description.clone().unwrap_or_default(),
            start_date: attrs.start_date,
            end_date: attrs.end_date,
            position,
        }
    }

    /// Write form: geometry converted into the layer's own reference and tagged with its wkid.
    pub fn to_feature(&self, layer: SpatialReference) -> Feature {
        let geometry = self.position.map(|at| {
            let (x, y) = layer.from_lat_lng(at);
            PointGeometry {
                x,
                y,
                spatial_reference: Some(WkidRef::new(layer.wkid())),
            }
        });

        Feature {
            attributes: Attributes {
                object_id: self.object_id,
                address: Some(self.address.clone()),
                description: Some(self.description.clone()),
                start_date: self.start_date,
                end_date: self.end_date,
            },
            geometry,
        }
    }

    /// Position when it can go on the map.
    pub fn map_position(&self) -> Option<LatLng> {
        self.position.filter(LatLng::is_displayable)
    }

    pub fn display_address(&self) -> &str {
        if self.address.trim().is_empty() {
            "No address"
        } else {
            &self.address
        }
    }

    pub fn display_description(&self) -> &str {
        if self.description.trim().is_empty() {
            "No description"
        } else {
            &self.description
        }
    }

    pub fn display_start(&self) -> String {
        dates::display_date(self.start_date).unwrap_or_else(|| "No date".into())
    }

    pub fn is_weekend_sale(&self) -> bool {
        dates::is_weekend(self.start_date)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_service_feature() {
        let feature: Feature = serde_json::from_value(json!({
            "attributes": {
                "OBJECTID": 12,
                "Address": "101 Main St",
                "Description": "7:00 AM - 2:00 PM: tools",
                "Date_1": 1746230400000i64,
                "EndDate": null
            },
            "geometry": { "x": -10834000.0, "y": 3233000.0 }
        }))
        .expect("feature");

        let listing = GarageSaleListing::from_feature(&feature, SpatialReference::WebMercator);
        assert_eq!(listing.object_id, Some(12));
        assert_eq!(listing.end_date, None);
        let at = listing.map_position().expect("position");
        assert!((at.lng + 97.32).abs() < 0.01, "lng {}", at.lng);
        assert!((at.lat - 27.87).abs() < 0.05, "lat {}", at.lat);
    }

    #[test]
    fn geometry_wkid_overrides_layer_default() {
        let feature = Feature {
            attributes: Attributes::default(),
            geometry: Some(PointGeometry {
                x: -97.3,
                y: 27.8,
                spatial_reference: Some(WkidRef::new(4326)),
            }),
        };
        let listing = GarageSaleListing::from_feature(&feature, SpatialReference::WebMercator);
        assert_eq!(listing.position, Some(LatLng::new(27.8, -97.3)));
    }

    #[test]
    fn latest_wkid_is_used_when_wkid_is_missing() {
        let sr: WkidRef = serde_json::from_value(json!({ "latestWkid": 3857 })).expect("sr");
        assert_eq!(sr.wkid, None);
        assert_eq!(sr.spatial_reference(), Some(SpatialReference::WebMercator));

        let sr: WkidRef =
            serde_json::from_value(json!({ "wkid": 2278, "latestWkid": 2278 })).expect("sr");
        assert_eq!(sr.spatial_reference(), None);
        assert_eq!(sr.reported(), Some(2278));
    }

    #[test]
    fn writes_in_the_layer_reference() {
        let listing = GarageSaleListing {
            object_id: None,
            address: "1 Elm".into(),
            description: "toys".into(),
            start_date: Some(1),
            end_date: None,
            position: Some(LatLng::new(0.0, 0.0)),
        };
        let feature = listing.to_feature(SpatialReference::WebMercator);
        let geom = feature.geometry.expect("geometry");
        assert_eq!(geom.spatial_reference, Some(WkidRef::new(3857)));
        assert!(geom.x.abs() < 1e-9 && geom.y.abs() < 1e-9);

        let value = serde_json::to_value(&feature.attributes).expect("json");
        assert!(value.get("OBJECTID").is_none(), "adds must not carry an id");
        assert_eq!(value["Address"], "1 Elm");
    }

    #[test]
    fn blank_fields_have_display_fallbacks() {
        let listing = GarageSaleListing::from_feature(
            &Feature {
                attributes: Attributes::default(),
                geometry: None,
            },
            SpatialReference::Wgs84,
        );
        assert_eq!(listing.display_address(), "No address");
        assert_eq!(listing.display_description(), "No description");
        assert_eq!(listing.display_start(), "No date");
        assert_eq!(listing.map_position(), None);
    }
}
