use crate::app::state::{AppState, Mode};
use crate::config::Config;
use crate::templates::components::{
    card, day_rows, status_line, suggestion_list, time_select, toast_stack,
};
use crate::templates::desktop_layout;
use maud::{html, Markup};

/// Full page: the map on the left, the panel on the right.
pub fn admin_page(view: &AppState, config: &Config) -> Markup {
    let title = format!("{} Garage Sale Admin", config.organization.name);
    desktop_layout(
        &title,
        view.theme,
        html! {
            main class="layout" {
                div id="map"
                    data-center-lat=(config.center[0])
                    data-center-lng=(config.center[1])
                    data-zoom=(config.zoom)
                    data-min-zoom=(config.min_zoom)
                    data-max-zoom=(config.max_zoom)
                    data-refresh-ms=(config.auto_refresh_interval_ms) {}
                div id="coords" class="coords" aria-live="off" {}
                (panel(view, config))
            }
        },
    )
}

/// The htmx swap target. Placement and pending pan ride along as data
/// attributes for `map.js`.
pub fn panel(view: &AppState, config: &Config) -> Markup {
    let mode = match view.mode {
        Mode::Idle => "idle",
        Mode::Adding => "adding",
        Mode::Editing { .. } => "editing",
    };
    let placement = view.placement.map(|at| format!("{},{}", at.lat, at.lng));
    let fly_to = view.fly_to.map(|f| format!("{},{},{}", f.at.lat, f.at.lng, f.zoom));
    let stats = view.stats();

    html! {
        aside id="panel" class="panel" data-mode=(mode) data-placement=[placement] data-fly-to=[fly_to] {
            header class="panel-header" {
                h1 { "🏷️ Garage Sale Admin" }
                p class="muted" { (config.organization.name) ", " (config.organization.state) }
            }

            nav class="toolbar" {
                button type="button" class="btn btn-primary"
                    hx-post="/sales/new" hx-target="#panel" hx-swap="outerHTML" { "New Sale" }
                button type="button" class="btn"
                    hx-post="/listings/refresh" hx-target="#panel" hx-swap="outerHTML" { "↻ Refresh" }
                button type="button" class="btn" hx-post="/theme" { "🎨 Theme" }
                button type="button" class="btn"
                    hx-get="/guide" hx-target="#modal" hx-swap="innerHTML" { "? Guide" }
                @if config.export_enabled {
                    a class="btn" href="/export.csv" download { "CSV" }
                    a class="btn" href="/export.xlsx" download { "XLSX" }
                }
                @if config.print_enabled {
                    a class="btn" href="/report" target="_blank" { "🖨️ Report" }
                }
            }

            div class="search" {
                input type="search" name="q" placeholder="Search for an address…" autocomplete="off"
                    hx-get="/address/suggest"
                    hx-vals=r#"{"target":"search"}"#
                    hx-trigger="keyup changed delay:300ms"
                    hx-target="#search-suggestions";
                div id="search-suggestions" {}
            }

            (status_line(&view.status))

            p class="stats" {
                "Total sales: " strong { (stats.total) }
                " · Weekend sales: " strong { (stats.weekend) }
            }

            @if view.mode != Mode::Idle {
                (sale_form(view, config))
            }

            (toast_stack(&view.toasts, config.toast_duration_ms))
        }
    }
}

fn sale_form(view: &AppState, config: &Config) -> Markup {
    let form = &view.form;
    let heading = match view.mode {
        Mode::Editing { .. } => "Edit Garage Sale",
        _ => "New Garage Sale",
    };

    card(
        heading,
        html! {
            form id="sale-form"
                hx-post="/form/preview"
                hx-trigger="change, keyup delay:500ms"
                hx-target="#preview"
                hx-swap="outerHTML" {
                @if view.placement.is_none() {
                    p class="hint" { "📍 Click the map to place the sale." }
                }

                label {
                    "Address"
                    input type="text" name="address" value=(form.address) autocomplete="off" required
                        hx-get="/address/suggest"
                        hx-vals=r#"{"target":"form"}"#
                        hx-trigger="keyup changed delay:300ms"
                        hx-target="#address-suggestions";
                }
                div id="address-suggestions" {
                    @if !view.form_suggestions.is_empty() {
                        (suggestion_list(&view.form_suggestions, "form"))
                    }
                }

                div class="row" {
                    label { "Start date" input type="date" name="date_start" value=(form.date_start) required; }
                    label { "End date" input type="date" name="date_end" value=(form.date_end); }
                }

                @if config.multi_day_sales {
                    label class="checkbox" {
                        input type="checkbox" name="multi_day" checked[form.multi_day]
                            hx-post="/form/multi-day"
                            hx-include="#sale-form"
                            hx-target="#panel"
                            hx-swap="outerHTML";
                        "Multiple days with different hours"
                    }
                }

                @if form.multi_day {
                    (day_rows(&form.days))
                } @else {
                    div class="row" {
                        label { "Opens" (time_select("start", form.start)) }
                        label { "Closes" (time_select("end", form.end)) }
                    }
                }

                label {
                    "Items for sale"
                    textarea name="details" rows="3" placeholder="Furniture, toys, clothes…" { (form.details) }
                }

                @if config.auto_compose_description {
                    (description_preview(&form.description(), &[]))
                }

                div class="actions" {
                    button type="button" class="btn btn-primary"
                        hx-post="/sales/save" hx-include="#sale-form"
                        hx-target="#panel" hx-swap="outerHTML"
                        disabled[view.save_in_flight] { "💾 Save" }
                    button type="button" class="btn"
                        hx-post="/sales/cancel" hx-target="#panel" hx-swap="outerHTML" { "Cancel" }
                    @if matches!(view.mode, Mode::Editing { .. }) {
                        button type="button" class="btn btn-danger"
                            hx-post="/sales/delete"
                            hx-confirm="Delete this garage sale? This cannot be undone."
                            hx-target="#panel" hx-swap="outerHTML" { "🗑️ Delete" }
                    }
                }
            }
        },
    )
}

pub fn description_preview(description: &str, warnings: &[String]) -> Markup {
    html! {
        div id="preview" class="preview" {
            span class="muted" { "Description: " }
            @if description.is_empty() {
                em { "(empty)" }
            } @else {
                (description)
            }
            @for warning in warnings {
                p class="status-warning" { "⚠️ " (warning) }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::state::{FlyTo, Theme};
    use crate::geo::LatLng;
    use scraper::{Html, Selector};

    #[test]
    fn idle_panel_has_no_form() {
        let view = AppState::new(Theme::Dark);
        let html = Html::parse_fragment(&panel(&view, &Config::default()).into_string());
        let panel_sel = Selector::parse("#panel").expect("selector");
        let form_sel = Selector::parse("#sale-form").expect("selector");

        let aside = html.select(&panel_sel).next().expect("panel");
        assert_eq!(aside.value().attr("data-mode"), Some("idle"));
        assert_eq!(aside.value().attr("data-placement"), None);
        assert!(html.select(&form_sel).next().is_none());
    }

    #[test]
    fn adding_panel_carries_placement_and_pan() {
        let mut view = AppState::new(Theme::Dark);
        view.mode = Mode::Adding;
        view.placement = Some(LatLng::new(27.5, -97.25));
        view.fly_to = Some(FlyTo {
            at: LatLng::new(27.5, -97.25),
            zoom: 17,
        });
        view.form.address = "12 Bay".into();

        let html = Html::parse_fragment(&panel(&view, &Config::default()).into_string());
        let aside = html
            .select(&Selector::parse("#panel").expect("selector"))
            .next()
            .expect("panel");
        assert_eq!(aside.value().attr("data-placement"), Some("27.5,-97.25"));
        assert_eq!(aside.value().attr("data-fly-to"), Some("27.5,-97.25,17"));

        let address = html
            .select(&Selector::parse("input[name=address]").expect("selector"))
            .next()
            .expect("address input");
        assert_eq!(address.value().attr("value"), Some("12 Bay"));

        let preview = html
            .select(&Selector::parse("#preview").expect("selector"))
            .next()
            .expect("preview");
        assert!(preview.text().collect::<String>().contains("7:00 AM - 2:00 PM"));
    }

    #[test]
    fn delete_only_offered_while_editing() {
        let mut view = AppState::new(Theme::Light);
        view.mode = Mode::Adding;
        let adding = panel(&view, &Config::default()).into_string();
        assert!(!adding.contains("/sales/delete"));

        view.mode = Mode::Editing { object_id: 3 };
        let editing = panel(&view, &Config::default()).into_string();
        assert!(editing.contains("/sales/delete"));
        assert!(editing.contains("Edit Garage Sale"));
    }
}
