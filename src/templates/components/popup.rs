use crate::domain::GarageSaleListing;
use maud::{html, Markup};
use serde::Serialize;
use tracing::warn;

/// What `map.js` needs to draw one marker.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarkerView {
    pub object_id: i64,
    pub lat: f64,
    pub lng: f64,
    pub weekend: bool,
    pub popup_html: String,
}

pub fn popup(listing: &GarageSaleListing) -> Markup {
    html! {
        div class="popup" {
            h4 class="popup-address" { (listing.display_address()) }
            p class="popup-date" { "📅 " (listing.display_start()) }
            p class="popup-description" { (listing.display_description()) }
            @if let Some(id) = listing.object_id {
                button type="button" class="btn btn-small" data-edit-sale=(id) { "Edit Sale" }
            }
        }
    }
}

/// Markers for every listing that has an id and a position on the map.
pub fn marker_views(listings: &[GarageSaleListing]) -> Vec<MarkerView> {
    listings
        .iter()
        .filter_map(|listing| {
            let object_id = listing.object_id?;
            let Some(at) = listing.map_position() else {
                warn!("⚠️ Skipping sale {object_id}: no valid position");
                return None;
            };
            Some(MarkerView {
                object_id,
                lat: at.lat,
                lng: at.lng,
                weekend: listing.is_weekend_sale(),
                popup_html: popup(listing).into_string(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::LatLng;

    fn listing(id: i64, position: Option<LatLng>) -> GarageSaleListing {
        GarageSaleListing {
            object_id: Some(id),
            address: "<b>1 Elm</b> & Co".into(),
            description: String::new(),
            start_date: Some(1_746_230_400_000),
            end_date: None,
            position,
        }
    }

    #[test]
    fn popup_escapes_user_text() {
        let html = popup(&listing(1, None)).into_string();
        assert!(html.contains("&lt;b&gt;1 Elm&lt;/b&gt; &amp; Co"));
        assert!(html.contains("No description"));
        assert!(html.contains("5/3/2025"));
        assert!(html.contains(r#"data-edit-sale="1""#));
    }

    #[test]
    fn skips_listings_that_cannot_be_drawn() {
        let views = marker_views(&[
            listing(1, Some(LatLng::new(27.876, -97.323))),
            listing(2, None),
            listing(3, Some(LatLng::new(f64::NAN, 0.0))),
        ]);
        assert_eq!(views.len(), 1);
        assert_eq!(views[0].object_id, 1);
        assert!(views[0].weekend);
    }
}
