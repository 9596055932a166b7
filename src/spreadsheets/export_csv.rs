use crate::domain::GarageSaleListing;
use crate::errors::{AdminError, Result};
use crate::spreadsheets::{headers, row_cells};

/// Renders the listing cache as CSV bytes.
pub fn export_listings_csv(listings: &[GarageSaleListing], include_coordinates: bool) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    writer
        .write_record(headers(include_coordinates))
        .map_err(|e| AdminError::Export(format!("Failed to write CSV header: {e}")))?;

    for listing in listings {
        writer
            .write_record(row_cells(listing, include_coordinates))
            .map_err(|e| AdminError::Export(format!("Failed to write CSV row: {e}")))?;
    }

    writer
        .into_inner()
        .map_err(|e| AdminError::Export(format!("Failed to finish CSV: {e}")))
}
