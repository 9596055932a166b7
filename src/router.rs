use crate::app::{AdminApp, DayUpdate, FormInput, SuggestionTarget};
use crate::arcgis::{AddressQuery, FeatureService, Geocoder};
use crate::domain::TimeOfDay;
use crate::errors::{AdminError, Result};
use crate::geo::LatLng;
use crate::responses::{
    csv_response, html_response, html_response_with, json_response, static_response,
    xlsx_response, ResultResp,
};
use crate::spreadsheets::{export_listings_csv, export_listings_xlsx};
use crate::templates::components::{guide_modal, marker_views, suggestion_list};
use crate::templates::pages::{admin_page, description_preview, panel, report_page};
use astra::Request;
use maud::html;
use std::collections::HashMap;
use std::io::Read;
use tracing::debug;

const MAP_JS: &str = include_str!("../static/map.js");
const MAIN_CSS: &str = include_str!("../static/main.css");

/// Largest form body accepted; the sale form is a few hundred bytes.
const MAX_FORM_BYTES: u64 = 64 * 1024;

type Params = HashMap<String, String>;

pub fn handle<S: FeatureService, G: Geocoder>(req: Request, app: &AdminApp<S, G>) -> ResultResp {
    let method = req.method().as_str().to_string();
    let path = req.uri().path().to_string();
    let query = parse_pairs(req.uri().query().unwrap_or("").as_bytes());
    debug!("{method} {path}");

    let form = if method == "POST" {
        read_form(req)?
    } else {
        Params::new()
    };

    let segments: Vec<&str> = path.trim_matches('/').split('/').collect();

    match (method.as_str(), segments.as_slice()) {
        ("GET", [""]) => html_response(admin_page(&app.drain_view(), app.config())),
        ("GET", ["static", "map.js"]) => static_response(MAP_JS, &mime::APPLICATION_JAVASCRIPT),
        ("GET", ["static", "main.css"]) => static_response(MAIN_CSS, &mime::TEXT_CSS),
        ("GET", ["api", "markers"]) => json_response(&marker_views(&app.snapshot().listings)),

        ("POST", ["sales", "new"]) => {
            app.enter_add_mode();
            render_panel(app)
        }
        ("POST", ["sales", "cancel"]) => {
            app.cancel();
            render_panel(app)
        }
        ("POST", ["sales", "save"]) => {
            sync_form(app, &form);
            // Failures are already queued as toasts.
            let _ = app.save();
            render_panel(app)
        }
        ("POST", ["sales", "delete"]) => {
            let _ = app.delete();
            render_panel(app)
        }
        ("POST", ["sales", id, "edit"]) => {
            app.select_listing(parse_id(id)?)?;
            render_panel(app)
        }

        ("POST", ["map", "click"]) => {
            let lat = required_f64(&form, "lat")?;
            let lng = required_f64(&form, "lng")?;
            app.map_click(LatLng::new(lat, lng));
            render_panel(app)
        }

        ("POST", ["form", "multi-day"]) => {
            sync_form(app, &form);
            app.set_multi_day(form.contains_key("multi_day"));
            render_panel(app)
        }
        ("POST", ["form", "days", "add"]) => {
            sync_form(app, &form);
            app.add_day();
            render_panel(app)
        }
        ("POST", ["form", "days", id]) => {
            let update = DayUpdate {
                weekday: form.get("day_weekday").and_then(|w| w.parse::<u8>().ok()),
                start: form.get("day_start").and_then(|t| TimeOfDay::parse(t)),
                end: form.get("day_end").and_then(|t| TimeOfDay::parse(t)),
            };
            app.update_day(parse_id(id)?, update)?;
            render_panel(app)
        }
        ("POST", ["form", "days", id, "remove"]) => {
            sync_form(app, &form);
            app.remove_day(parse_id(id)?)?;
            render_panel(app)
        }
        ("POST", ["form", "preview"]) => {
            sync_form(app, &form);
            let (description, warnings) = app.description_preview();
            html_response(description_preview(&description, &warnings))
        }

        ("GET", ["address", "suggest"]) => {
            let text = query
                .get("q")
                .or_else(|| query.get("address"))
                .map(String::as_str)
                .unwrap_or("");
            let target = query.get("target").map(String::as_str).unwrap_or("form");
            let suggestions = app.search_address(text, suggestion_target(Some(target)));
            html_response(suggestion_list(&suggestions, target))
        }
        ("POST", ["address", "select"]) => {
            let text = form
                .get("text")
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty())
                .ok_or_else(|| AdminError::BadRequest("Missing address text".into()))?;
            let address = match form.get("magic_key").filter(|k| !k.is_empty()) {
                Some(key) => AddressQuery::MagicKey {
                    text,
                    magic_key: key.clone(),
                },
                None => AddressQuery::Text(text),
            };
            let target = suggestion_target(form.get("target").map(String::as_str));
            app.select_suggestion(address, target);
            render_panel(app)
        }

        ("POST", ["theme"]) => {
            app.cycle_theme();
            html_response_with(html! {}, &[("HX-Refresh", "true")])
        }
        ("GET", ["guide"]) => html_response(guide_modal(app.config())),
        ("POST", ["listings", "refresh"]) => {
            let _ = app.load_listings();
            render_panel(app)
        }

        ("GET", ["export.csv"]) if app.config().export_enabled => {
            let config = app.config();
            let bytes = export_listings_csv(&app.snapshot().listings, config.include_coordinates)?;
            csv_response(bytes, &format!("{}.csv", config.csv_filename))
        }
        ("GET", ["export.xlsx"]) if app.config().export_enabled => {
            let config = app.config();
            let bytes = export_listings_xlsx(&app.snapshot().listings, config.include_coordinates)?;
            xlsx_response(bytes, &format!("{}.xlsx", config.csv_filename))
        }
        ("GET", ["report"]) if app.config().print_enabled => {
            let generated = chrono::Local::now().format("%-m/%-d/%Y %-I:%M %p").to_string();
            html_response(report_page(&app.snapshot().listings, app.config(), &generated))
        }

        _ => Err(AdminError::NotFound),
    }
}

fn render_panel<S: FeatureService, G: Geocoder>(app: &AdminApp<S, G>) -> ResultResp {
    html_response(panel(&app.drain_view(), app.config()))
}

/// Posts that carry the sale form update it first, so the action sees what
/// is on screen.
fn sync_form<S: FeatureService, G: Geocoder>(app: &AdminApp<S, G>, form: &Params) {
    if !form.contains_key("address") {
        return;
    }
    app.update_form(FormInput {
        address: form.get("address").cloned(),
        details: form.get("details").cloned(),
        date_start: form.get("date_start").cloned(),
        date_end: form.get("date_end").cloned(),
        start: form.get("start").and_then(|t| TimeOfDay::parse(t)),
        end: form.get("end").and_then(|t| TimeOfDay::parse(t)),
    });
}

fn suggestion_target(raw: Option<&str>) -> SuggestionTarget {
    match raw {
        Some("search") => SuggestionTarget::Search,
        _ => SuggestionTarget::FormAddress,
    }
}

fn read_form(req: Request) -> Result<Params> {
    let mut body = Vec::new();
    req.into_body()
        .reader()
        .take(MAX_FORM_BYTES + 1)
        .read_to_end(&mut body)
        .map_err(|e| AdminError::BadRequest(format!("Unreadable body: {e}")))?;
    if body.len() as u64 > MAX_FORM_BYTES {
        return Err(AdminError::BadRequest("Form too large".into()));
    }
    Ok(parse_pairs(&body))
}

fn parse_pairs(raw: &[u8]) -> Params {
    url::form_urlencoded::parse(raw).into_owned().collect()
}

fn parse_id<T: std::str::FromStr>(raw: &str) -> Result<T> {
    raw.parse()
        .map_err(|_| AdminError::BadRequest(format!("Invalid id: {raw}")))
}

fn required_f64(form: &Params, key: &str) -> Result<f64> {
    form.get(key)
        .and_then(|v| v.parse::<f64>().ok())
        .filter(|v| v.is_finite())
        .ok_or_else(|| AdminError::BadRequest(format!("Missing or invalid {key}")))
}
