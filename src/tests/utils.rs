use crate::app::AdminApp;
use crate::config::Config;
use crate::db::{init_db, Database};
use crate::tests::fakes::{FakeGeocoder, FakeService};
use astra::{Body, ResponseBuilder, Server};
use std::io::Read;
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

/// Fresh local store in its own temp dir. Keep the dir alive for the test.
pub fn init_test_db() -> (tempfile::TempDir, Database) {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("test_db.sqlite3");
    let db = Database::new(path.to_string_lossy().to_string());
    init_db(&db).unwrap_or_else(|e| panic!("Database initialization failed: {e}"));
    (dir, db)
}

/// Defaults with retries that don't sleep.
pub fn test_config() -> Config {
    Config {
        retry_backoff_ms: 0,
        ..Config::default()
    }
}

pub type TestApp = AdminApp<Arc<FakeService>, Arc<FakeGeocoder>>;

pub fn test_app(
    service: &Arc<FakeService>,
    geocoder: &Arc<FakeGeocoder>,
) -> (tempfile::TempDir, TestApp) {
    let (dir, db) = init_test_db();
    let app = AdminApp::new(test_config(), Arc::clone(service), Arc::clone(geocoder), db);
    (dir, app)
}

#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: String,
    pub path: String,
    pub query: String,
    pub body: String,
}

/// A local astra server standing in for ArcGIS.
pub struct StubServer {
    pub base: String,
    requests: Arc<Mutex<Vec<Recorded>>>,
}

impl StubServer {
    pub fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().expect("requests lock").clone()
    }
}

pub fn stub_server<F>(respond: F) -> StubServer
where
    F: Fn(&Recorded) -> (u16, String) + Send + Sync + 'static,
{
    let port = TcpListener::bind("127.0.0.1:0")
        .and_then(|l| l.local_addr())
        .expect("free port")
        .port();
    let addr: SocketAddr = format!("127.0.0.1:{port}").parse().expect("addr");

    let requests = Arc::new(Mutex::new(Vec::new()));
    let seen = Arc::clone(&requests);

    thread::spawn(move || {
        let _ = Server::bind(&addr).max_workers(4).serve(move |req: astra::Request, _info| {
            let method = req.method().as_str().to_string();
            let path = req.uri().path().to_string();
            let query = req.uri().query().unwrap_or("").to_string();
            let mut body = String::new();
            let _ = req.into_body().reader().read_to_string(&mut body);

            let recorded = Recorded {
                method,
                path,
                query,
                body,
            };
            let (status, payload) = respond(&recorded);
            seen.lock().expect("requests lock").push(recorded);

            ResponseBuilder::new()
                .status(status)
                .header("Content-Type", "application/json")
                .body(Body::from(payload))
                .expect("stub response")
        });
    });

    for _ in 0..100 {
        if TcpStream::connect(addr).is_ok() {
            break;
        }
        thread::sleep(Duration::from_millis(20));
    }

    StubServer {
        base: format!("http://{addr}"),
        requests,
    }
}

/// Query string pairs, decoded.
pub fn query_pairs(raw: &str) -> Vec<(String, String)> {
    url::form_urlencoded::parse(raw.as_bytes()).into_owned().collect()
}

pub fn read_body(resp: astra::Response) -> String {
    let mut body = String::new();
    resp.into_body()
        .reader()
        .read_to_string(&mut body)
        .expect("response body");
    body
}
