pub mod export_csv;
pub mod export_xlsx;

pub use export_csv::export_listings_csv;
pub use export_xlsx::export_listings_xlsx;

use crate::domain::dates::from_epoch;
use crate::domain::GarageSaleListing;

/// Column headers shared by both export formats.
pub(crate) fn headers(include_coordinates: bool) -> Vec<&'static str> {
    let mut headers = vec!["ObjectID", "Address", "Description", "Start Date", "End Date"];
    if include_coordinates {
        headers.extend(["Latitude", "Longitude"]);
    }
    headers
}

/// One export row as text. Coordinates are WGS84 with six decimals.
pub(crate) fn row_cells(listing: &GarageSaleListing, include_coordinates: bool) -> Vec<String> {
    let mut cells = vec![
        listing.object_id.map(|id| id.to_string()).unwrap_or_default(),
        listing.address.clone(),
        listing.description.clone(),
        from_epoch(listing.start_date),
        from_epoch(listing.end_date),
    ];
    if include_coordinates {
        match listing.position {
            Some(at) => cells.extend([format!("{:.6}", at.lat), format!("{:.6}", at.lng)]),
            None => cells.extend([String::new(), String::new()]),
        }
    }
    cells
}
