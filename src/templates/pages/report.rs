use crate::config::Config;
use crate::domain::dates::display_date;
use crate::domain::GarageSaleListing;
use maud::{html, Markup, DOCTYPE};

/// Printable list of every cached sale, ordered by start date.
pub fn report_page(listings: &[GarageSaleListing], config: &Config, generated: &str) -> Markup {
    let mut rows: Vec<&GarageSaleListing> = listings.iter().collect();
    rows.sort_by_key(|l| (l.start_date.is_none(), l.start_date, l.address.clone()));

    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                title { (config.organization.name) " Garage Sales" }
                link rel="stylesheet" href="/static/main.css";
            }
            body class="report" {
                header {
                    h1 { (config.organization.name) " Garage Sales" }
                    p class="muted" { "Generated " (generated) " · " (rows.len()) " sales" }
                    button type="button" class="btn no-print" onclick="window.print()" { "🖨️ Print" }
                }
                table {
                    thead {
                        tr {
                            th { "Address" }
                            th { "Start" }
                            th { "End" }
                            th { "Description" }
                        }
                    }
                    tbody {
                        @for listing in &rows {
                            tr {
                                td { (listing.display_address()) }
                                td { (listing.display_start()) }
                                td { (display_date(listing.end_date).unwrap_or_default()) }
                                td { (listing.display_description()) }
                            }
                        }
                    }
                }
                @if !config.organization.website.is_empty() {
                    footer class="muted" { (config.organization.website) }
                }
            }
        }
    }
}
