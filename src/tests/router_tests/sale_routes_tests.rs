use crate::app::state::Mode;
use crate::responses::error_to_response;
use crate::router::handle;
use crate::tests::fakes::{count, listing, FakeGeocoder, FakeService};
use crate::tests::utils::{read_body, test_app, TestApp};
use astra::Body;
use http::{Method, Request};
use scraper::{Html, Selector};
use std::sync::Arc;

fn get(app: &TestApp, uri: &str) -> astra::Response {
    let req = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    handle(req, app).unwrap_or_else(error_to_response)
}

fn post(app: &TestApp, uri: &str, form: &str) -> astra::Response {
    let req = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("Content-Type", "application/x-www-form-urlencoded")
        .body(Body::from(form.to_string()))
        .unwrap();
    handle(req, app).unwrap_or_else(error_to_response)
}

fn loaded_app() -> (tempfile::TempDir, Arc<FakeService>, TestApp) {
    let service = Arc::new(FakeService::with_listings(&[listing(
        7,
        "7 Oak <Rear>",
        "8:00 AM - 1:00 PM: books",
    )]));
    let geocoder = Arc::new(FakeGeocoder::answering("101 Main St, Portland, TX"));
    let (dir, app) = test_app(&service, &geocoder);
    app.load_listings().expect("load");
    (dir, service, app)
}

#[test]
fn home_page_renders_map_and_panel() {
    let (_dir, _service, app) = loaded_app();
    let resp = get(&app, "/");
    assert_eq!(resp.status(), 200);

    let body = read_body(resp);
    assert!(body.contains("Garage Sale Admin"));
    assert!(body.contains(r#"id="map""#));
    assert!(body.contains(r#"id="coords""#));
    assert!(body.contains(r#"data-mode="idle""#));
    assert!(body.contains("1 garage sales loaded successfully."));
}

#[test]
fn markers_are_served_as_json_with_escaped_popups() {
    let (_dir, _service, app) = loaded_app();
    let resp = get(&app, "/api/markers");
    assert_eq!(resp.status(), 200);
    assert_eq!(
        resp.headers().get("Content-Type").and_then(|v| v.to_str().ok()),
        Some("application/json")
    );

    let markers: serde_json::Value = serde_json::from_str(&read_body(resp)).expect("json");
    let markers = markers.as_array().expect("array");
    assert_eq!(markers.len(), 1);
    assert_eq!(markers[0]["object_id"], 7);
    let popup = markers[0]["popup_html"].as_str().expect("popup");
    assert!(popup.contains("7 Oak &lt;Rear&gt;"));
}

#[test]
fn new_sale_then_click_places_the_pin() {
    let (_dir, _service, app) = loaded_app();

    let body = read_body(post(&app, "/sales/new", ""));
    assert!(body.contains(r#"data-mode="adding""#));
    assert!(body.contains("Click anywhere on the map"));

    let body = read_body(post(&app, "/map/click", "lat=27.876&lng=-97.323"));
    assert!(body.contains(r#"data-placement="27.876,-97.323""#));
    assert!(body.contains(r#"value="101 Main St, Portland, TX""#));
}

#[test]
fn save_route_syncs_the_posted_form() {
    let (_dir, service, app) = loaded_app();
    post(&app, "/sales/new", "");
    post(&app, "/map/click", "lat=27.876&lng=-97.323");

    let form = "address=22+Cedar+Ln&date_start=2025-05-03&date_end=&start=8%3A00+AM&end=12%3A00+PM&details=tools";
    let resp = post(&app, "/sales/save", form);
    assert_eq!(resp.status(), 200);
    let body = read_body(resp);
    assert!(body.contains("Garage sale added!"));

    assert_eq!(count(&service.edit_calls), 1);
    let edits = service.edits.lock().expect("edits").clone();
    let added = &edits[0].0[0];
    assert_eq!(added.attributes.address.as_deref(), Some("22 Cedar Ln"));
    assert_eq!(
        added.attributes.description.as_deref(),
        Some("8:00 AM - 12:00 PM: tools")
    );
    assert_eq!(app.snapshot().listings.len(), 2);
}

#[test]
fn save_route_shows_validation_as_a_toast() {
    let (_dir, service, app) = loaded_app();
    post(&app, "/sales/new", "");

    let resp = post(&app, "/sales/save", "address=&date_start=2025-05-03&details=");
    assert_eq!(resp.status(), 200);
    let body = read_body(resp);
    assert!(body.contains("Address is required"));
    assert!(body.contains("toast-warning"));
    assert_eq!(count(&service.edit_calls), 0);
}

#[test]
fn edit_route_loads_the_listing() {
    let (_dir, _service, app) = loaded_app();
    let body = read_body(post(&app, "/sales/7/edit", ""));
    assert!(body.contains("Edit Garage Sale"));
    assert!(body.contains(r#"data-fly-to="#));
    assert_eq!(app.snapshot().mode, Mode::Editing { object_id: 7 });

    let html = Html::parse_fragment(&body);
    let first = |css: &str| {
        let selector = Selector::parse(css).expect("selector");
        html.select(&selector).next().map(|el| {
            let text: String = el.text().collect();
            (el.value().attr("value").map(str::to_string), text)
        })
    };
    let (address, _) = first("input[name=address]").expect("address input");
    assert_eq!(address.as_deref(), Some("7 Oak <Rear>"));
    let (_, details) = first("textarea[name=details]").expect("details");
    assert_eq!(details, "books");
    let (_, opens) = first("select[name=start] option[selected]").expect("start time");
    assert_eq!(opens, "8:00 AM");

    // The pan is handed over once.
    let again = read_body(get(&app, "/"));
    assert!(again.contains(r#"data-mode="editing""#));
    assert!(!again.contains("data-fly-to"));
}

#[test]
fn unknown_listing_and_route_are_404() {
    let (_dir, _service, app) = loaded_app();
    assert_eq!(post(&app, "/sales/999/edit", "").status(), 404);
    assert_eq!(get(&app, "/nowhere").status(), 404);
    assert_eq!(post(&app, "/sales/abc/edit", "").status(), 400);
}

#[test]
fn oversized_form_is_rejected() {
    let (_dir, service, app) = loaded_app();
    post(&app, "/sales/new", "");
    let form = format!("address={}", "a".repeat(70 * 1024));
    assert_eq!(post(&app, "/sales/save", &form).status(), 400);
    assert_eq!(count(&service.edit_calls), 0);
    assert_eq!(app.snapshot().form.address, "");
}

#[test]
fn search_box_suggestions_stay_out_of_the_form() {
    let service = Arc::new(FakeService::default());
    let geocoder = Arc::new(FakeGeocoder {
        suggestions: vec![crate::arcgis::Suggestion {
            text: "9 Bay St, Portland, TX".into(),
            magic_key: Some("k9".into()),
            is_collection: false,
        }],
        ..FakeGeocoder::default()
    });
    let (_dir, app) = test_app(&service, &geocoder);
    post(&app, "/sales/new", "");

    let list = read_body(get(&app, "/address/suggest?q=9+Bay&target=search"));
    assert!(list.contains("9 Bay St, Portland, TX"));
    let panel = read_body(post(&app, "/listings/refresh", ""));
    assert!(!panel.contains("9 Bay St, Portland, TX"));

    get(&app, "/address/suggest?q=9+Bay&target=form");
    let panel = read_body(post(&app, "/listings/refresh", ""));
    assert!(panel.contains("9 Bay St, Portland, TX"));
}

#[test]
fn map_click_needs_coordinates() {
    let (_dir, _service, app) = loaded_app();
    assert_eq!(post(&app, "/map/click", "lat=27.8").status(), 400);
    assert_eq!(post(&app, "/map/click", "lat=NaN&lng=1").status(), 400);
}

#[test]
fn day_routes_edit_the_schedule() {
    let (_dir, _service, app) = loaded_app();
    post(&app, "/sales/new", "");
    post(&app, "/form/multi-day", "address=&date_start=2025-05-02&multi_day=on");
    post(&app, "/form/days/add", "");

    let days = app.snapshot().form.days;
    assert_eq!(days.len(), 2);
    let second = days[1].id;

    post(
        &app,
        &format!("/form/days/{second}"),
        "day_weekday=0&day_start=9%3A00+AM&day_end=3%3A00+PM",
    );
    let preview = read_body(post(&app, "/form/preview", "address=&details=lamps"));
    assert!(preview.contains("Friday 7:00 AM - 2:00 PM &amp; Sunday 9:00 AM - 3:00 PM: lamps"));

    let removed = post(&app, &format!("/form/days/{second}/remove"), "");
    assert!(read_body(removed).contains("Day removed"));
    assert_eq!(post(&app, "/form/days/999/remove", "").status(), 404);
}

#[test]
fn theme_route_asks_htmx_to_refresh() {
    let (_dir, _service, app) = loaded_app();
    let resp = post(&app, "/theme", "");
    assert_eq!(
        resp.headers().get("HX-Refresh").and_then(|v| v.to_str().ok()),
        Some("true")
    );
    let page = read_body(get(&app, "/"));
    assert!(page.contains(r#"data-theme="dim""#));
}

#[test]
fn guide_and_static_assets_are_served() {
    let (_dir, _service, app) = loaded_app();
    assert!(read_body(get(&app, "/guide")).contains("How to manage garage sales"));

    let js = get(&app, "/static/map.js");
    assert_eq!(js.status(), 200);
    let js = read_body(js);
    assert!(js.contains("/api/markers"));
    assert!(js.contains(r#"marker.on("click""#));
    assert!(js.contains("mousemove"));
}
