//! Garage sale admin: a small server-rendered map app for creating, editing
//! and deleting garage sale listings on an ArcGIS feature layer.
//!
//! ```bash
//! garage_sale_admin                          # http://127.0.0.1:3000
//! garage_sale_admin --config portland.json   # custom layer / locality
//! garage_sale_admin --bind 0.0.0.0:8080 --db /var/lib/sales.sqlite3
//! ```

use crate::app::AdminApp;
use crate::arcgis::{ArcGisFeatureService, ArcGisGeocoder, FeatureService, Geocoder};
use crate::config::Config;
use crate::db::{init_db, Database};
use crate::responses::error_to_response;
use crate::router::handle;
use astra::Server;
use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use tracing::{error, info};

mod app;
mod arcgis;
mod config;
mod db;
mod domain;
mod errors;
mod geo;
mod responses;
mod router;
mod spreadsheets;
mod templates;

#[cfg(test)]
mod tests;

/// Map admin for garage sale listings on an ArcGIS feature layer.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// JSON configuration file. Built-in Portland, TX settings when omitted.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Address to listen on.
    #[arg(long, default_value = "127.0.0.1:3000")]
    bind: String,
    /// Local SQLite store for drafts and preferences.
    #[arg(long, default_value = "garage_sales.sqlite3")]
    db: PathBuf,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "garage_sale_admin=info".into()),
        )
        .init();

    let args = Args::parse();

    // 1️⃣ Configuration
    let config = match &args.config {
        Some(path) => Config::from_json_file(path),
        None => Ok(Config::default()),
    }
    .and_then(|config| config.validate().map(|_| config));
    let config = match config {
        Ok(config) => config,
        Err(e) => {
            error!("❌ {e}");
            std::process::exit(1);
        }
    };
    info!(
        "🏛️ {} garage sale admin, layer {}",
        config.organization.name, config.layer_url
    );

    // 2️⃣ Local store
    let db = Database::new(args.db.to_string_lossy().to_string());
    if let Err(e) = init_db(&db) {
        error!("❌ Database initialization failed: {e}");
        std::process::exit(1);
    }

    // 3️⃣ Remote services
    let service = ArcGisFeatureService::new(&config.layer_url, config.request_timeout());
    let geocoder = ArcGisGeocoder::new(&config);
    let (service, geocoder) = match (service, geocoder) {
        (Ok(service), Ok(geocoder)) => (service, geocoder),
        (Err(e), _) | (_, Err(e)) => {
            error!("❌ Could not build HTTP client: {e}");
            std::process::exit(1);
        }
    };

    let app = Arc::new(AdminApp::new(config, service, geocoder, db));
    app.restore_draft(chrono::Utc::now().timestamp_millis());
    // A failed first load leaves the app usable for adding sales.
    let _ = app.load_listings();
    spawn_auto_refresh(Arc::clone(&app));

    // 4️⃣ Start the server
    let addr: SocketAddr = match args.bind.parse() {
        Ok(addr) => addr,
        Err(e) => {
            error!("❌ Invalid bind address '{}': {e}", args.bind);
            std::process::exit(1);
        }
    };
    info!("🚀 Starting server at http://{addr}");

    let server = Server::bind(&addr).max_workers(8);
    let result = server.serve(move |req, _info| match handle(req, &*app) {
        Ok(resp) => resp,
        Err(err) => error_to_response(err),
    });

    if let Err(e) = result {
        error!("Server ended with error: {e}");
    }

    info!("Server shut down cleanly.");
}

fn spawn_auto_refresh<S, G>(app: Arc<AdminApp<S, G>>)
where
    S: FeatureService + 'static,
    G: Geocoder + 'static,
{
    let Some(interval) = app.config().auto_refresh_interval() else {
        return;
    };
    thread::spawn(move || loop {
        thread::sleep(interval);
        info!("⏱️ Auto refresh");
        let _ = app.load_listings();
    });
}

#[cfg(test)]
mod args_tests {
    use super::*;

    #[test]
    fn defaults_without_flags() {
        let args = Args::try_parse_from(["garage_sale_admin"]).expect("parse");
        assert_eq!(args.bind, "127.0.0.1:3000");
        assert_eq!(args.db, PathBuf::from("garage_sales.sqlite3"));
        assert!(args.config.is_none());
    }

    #[test]
    fn flags_override_defaults() {
        let args = Args::try_parse_from([
            "garage_sale_admin",
            "--bind",
            "0.0.0.0:80",
            "--config",
            "c.json",
        ])
        .expect("parse");
        assert_eq!(args.bind, "0.0.0.0:80");
        assert_eq!(args.config, Some(PathBuf::from("c.json")));
    }

    #[test]
    fn missing_value_and_unknown_flag_are_errors() {
        assert!(Args::try_parse_from(["garage_sale_admin", "--db"]).is_err());
        assert!(Args::try_parse_from(["garage_sale_admin", "--verbose"]).is_err());
    }
}
