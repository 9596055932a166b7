use crate::router::handle;
use crate::tests::fakes::{listing, FakeGeocoder, FakeService};
use crate::tests::utils::{read_body, test_app};
use astra::Body;
use http::{Method, Request};
use std::sync::Arc;

fn get(uri: &str) -> astra::Response {
    let service = Arc::new(FakeService::with_listings(&[
        listing(1, "1 Elm, Portland, TX", "tools"),
        listing(2, "2 Elm", "books"),
    ]));
    let geocoder = Arc::new(FakeGeocoder::default());
    let (_dir, app) = test_app(&service, &geocoder);
    app.load_listings().expect("load");

    let req = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    handle(req, &app).expect("Handler failed")
}

fn header(resp: &astra::Response, name: &str) -> String {
    resp.headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

#[test]
fn csv_export_is_an_attachment_with_every_listing() {
    let resp = get("/export.csv");
    assert_eq!(resp.status(), 200);
    assert!(header(&resp, "Content-Type").starts_with("text/csv"));
    assert_eq!(
        header(&resp, "Content-Disposition"),
        "attachment; filename=\"portland-tx-garage-sales.csv\""
    );

    let body = read_body(resp);
    let lines: Vec<&str> = body.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].ends_with("Latitude,Longitude"));
    assert!(lines[1].starts_with("1,\"1 Elm, Portland, TX\",tools,2025-05-03,,27.876000,-97.323000"));
}

#[test]
fn xlsx_export_is_served() {
    let resp = get("/export.xlsx");
    assert_eq!(resp.status(), 200);
    assert_eq!(
        header(&resp, "Content-Disposition"),
        "attachment; filename=\"portland-tx-garage-sales.xlsx\""
    );
}

#[test]
fn report_lists_every_sale() {
    let resp = get("/report");
    assert_eq!(resp.status(), 200);
    let body = read_body(resp);
    assert!(body.contains("City of Portland Garage Sales"));
    assert!(body.contains("1 Elm, Portland, TX"));
    assert!(body.contains("2 Elm"));
}
