use crate::domain::GarageSaleListing;
use crate::errors::{AdminError, Result};
use crate::spreadsheets::{headers, row_cells};
use rust_xlsxwriter::Workbook;

/// Renders the listing cache as an XLSX workbook. ObjectID and coordinates
/// are written as numbers, everything else as text.
pub fn export_listings_xlsx(listings: &[GarageSaleListing], include_coordinates: bool) -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet
        .set_name("Garage Sales")
        .map_err(|e| AdminError::Export(format!("Failed to name worksheet: {e}")))?;

    // Headers
    for (col, header) in headers(include_coordinates).iter().enumerate() {
        worksheet
            .write_string(0, col as u16, *header)
            .map_err(|e| AdminError::Export(format!("Failed to write header '{header}': {e}")))?;
    }

    // Rows
    for (i, listing) in listings.iter().enumerate() {
        let r = (i + 1) as u32;

        if let Some(id) = listing.object_id {
            worksheet
                .write_number(r, 0, id as f64)
                .map_err(|e| AdminError::Export(format!("Failed to write ObjectID: {e}")))?;
        }

        let cells = row_cells(listing, include_coordinates);
        for (col, cell) in cells.iter().enumerate().skip(1).take(4) {
            worksheet
                .write_string(r, col as u16, cell)
                .map_err(|e| AdminError::Export(format!("Failed to write cell: {e}")))?;
        }

        if include_coordinates {
            if let Some(at) = listing.position {
                worksheet
                    .write_number(r, 5, at.lat)
                    .map_err(|e| AdminError::Export(format!("Failed to write latitude: {e}")))?;
                worksheet
                    .write_number(r, 6, at.lng)
                    .map_err(|e| AdminError::Export(format!("Failed to write longitude: {e}")))?;
            }
        }
    }

    workbook
        .save_to_buffer()
        .map_err(|e| AdminError::Export(format!("Failed to save workbook: {e}")))
}
