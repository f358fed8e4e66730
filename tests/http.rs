use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use once_cell::sync::Lazy;
use reqwest::header::{COOKIE, SET_COOKIE};
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use std::net::TcpListener;
use std::process::{Child, Command, Stdio};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio::time::sleep;

#[derive(Debug, Deserialize)]
struct CounterResponse {
    value: i64,
}

struct TestServer {
    base_url: String,
    child: Child,
}

impl Drop for TestServer {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

static TEST_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));
static SERVER: Lazy<Mutex<Option<Arc<TestServer>>>> = Lazy::new(|| Mutex::new(None));

#[cfg(unix)]
mod cleanup {
    use std::sync::atomic::{AtomicI32, Ordering};
    use std::sync::Mutex;

    static PIDS: Mutex<Vec<i32>> = Mutex::new(Vec::new());
    static REGISTERED: AtomicI32 = AtomicI32::new(0);

    pub fn register(pid: u32) {
        if let Ok(mut pids) = PIDS.lock() {
            pids.push(pid as i32);
        }
        if REGISTERED.swap(1, Ordering::SeqCst) == 0 {
            unsafe {
                libc::atexit(on_exit);
            }
        }
    }

    extern "C" fn on_exit() {
        if let Ok(pids) = PIDS.lock() {
            for pid in pids.iter().copied().filter(|pid| *pid > 0) {
                unsafe {
                    libc::kill(pid, libc::SIGTERM);
                }
            }
        }
    }
}

/// In-memory stand-in for the PocketBase record endpoints.
#[derive(Default)]
struct FakeDb {
    collections: bool,
    counter: Option<i64>,
    quarters: Vec<(String, f64)>,
}

type Db = Arc<std::sync::Mutex<FakeDb>>;

fn not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "code": 404, "message": "The requested resource wasn't found.", "data": {} })),
    )
        .into_response()
}

fn counter_record(value: i64) -> Value {
    json!({ "id": "main", "value": value, "updated": "2026-10-19 12:00:00.000Z" })
}

async fn get_counter(State(db): State<Db>, Path(id): Path<String>) -> Response {
    let db = db.lock().unwrap();
    match (db.collections, db.counter, id.as_str()) {
        (true, Some(value), "main") => Json(counter_record(value)).into_response(),
        _ => not_found(),
    }
}

async fn create_counter(State(db): State<Db>, Json(body): Json<Value>) -> Response {
    let mut db = db.lock().unwrap();
    if !db.collections {
        return not_found();
    }
    let value = body["value"].as_i64().unwrap_or_default();
    db.counter = Some(value);
    Json(counter_record(value)).into_response()
}

async fn update_counter(State(db): State<Db>, Path(_id): Path<String>, Json(body): Json<Value>) -> Response {
    let mut db = db.lock().unwrap();
    if !db.collections || db.counter.is_none() {
        return not_found();
    }
    let value = body["value"].as_i64().unwrap_or_default();
    db.counter = Some(value);
    Json(counter_record(value)).into_response()
}

async fn list_quarters(State(db): State<Db>) -> Response {
    let db = db.lock().unwrap();
    if !db.collections {
        return not_found();
    }
    let items: Vec<Value> = db
        .quarters
        .iter()
        .enumerate()
        .map(|(idx, (quarter, value))| json!({ "id": format!("r{idx}"), "quarter": quarter, "value": value }))
        .collect();
    Json(json!({ "page": 1, "perPage": 200, "items": items })).into_response()
}

async fn auth_with_password(Json(body): Json<Value>) -> Response {
    if body["password"] == "secret" {
        Json(json!({
            "token": "eyJhbGciOiJIUzI1NiJ9.eyJpZCI6InUxIn0.sig",
            "record": { "id": "u1", "email": body["identity"] }
        }))
        .into_response()
    } else {
        (
            StatusCode::BAD_REQUEST,
            Json(json!({ "code": 400, "message": "Failed to authenticate.", "data": {} })),
        )
            .into_response()
    }
}

/// Starts a fake PocketBase on its own runtime thread so it outlives the
/// per-test tokio runtimes.
fn spawn_fake_pocketbase(db: FakeDb) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind fake pocketbase");
    listener.set_nonblocking(true).expect("nonblocking listener");
    let addr = listener.local_addr().unwrap();
    let db: Db = Arc::new(std::sync::Mutex::new(db));

    let app = Router::new()
        .route("/api/collections/counters/records", post(create_counter))
        .route(
            "/api/collections/counters/records/:id",
            get(get_counter).patch(update_counter),
        )
        .route("/api/collections/value_quarters/records", get(list_quarters))
        .route("/api/collections/users/auth-with-password", post(auth_with_password))
        .with_state(db);

    std::thread::spawn(move || {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .expect("fake pocketbase runtime");
        runtime.block_on(async move {
            let listener = tokio::net::TcpListener::from_std(listener).expect("tokio listener");
            axum::serve(listener, app).await.expect("fake pocketbase");
        });
    });

    format!("http://{addr}")
}

fn pick_free_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind random port");
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    port
}

async fn wait_until_ready(base_url: &str) {
    let client = Client::new();
    let deadline = Instant::now() + Duration::from_secs(3);
    loop {
        if let Ok(resp) = client.get(format!("{base_url}/api/charts")).send().await {
            if resp.status().is_success() {
                return;
            }
        }
        if Instant::now() > deadline {
            panic!("server did not become ready");
        }
        sleep(Duration::from_millis(100)).await;
    }
}

async fn spawn_server(pocketbase_url: &str) -> TestServer {
    let port = pick_free_port();
    let child = Command::new(env!("CARGO_BIN_EXE_quarter_dashboard"))
        .env("PORT", port.to_string())
        .env("POCKETBASE_URL", pocketbase_url)
        .env("RUST_LOG", "info")
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .spawn()
        .expect("failed to spawn server");

    #[cfg(unix)]
    cleanup::register(child.id());

    let base_url = format!("http://127.0.0.1:{port}");
    wait_until_ready(&base_url).await;

    TestServer { base_url, child }
}

async fn shared_server() -> Arc<TestServer> {
    let mut guard = SERVER.lock().await;
    if let Some(server) = guard.as_ref() {
        return Arc::clone(server);
    }
    let pocketbase_url = spawn_fake_pocketbase(FakeDb {
        collections: true,
        counter: None,
        quarters: vec![
            ("2024Q2".into(), 30.0),
            ("2023Q4".into(), 10.0),
            ("2024Q1".into(), 25.0),
        ],
    });
    let server = Arc::new(spawn_server(&pocketbase_url).await);
    *guard = Some(Arc::clone(&server));
    server
}

async fn counter_value(client: &Client, base_url: &str) -> i64 {
    let response: CounterResponse = client
        .get(format!("{base_url}/api/counter"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    response.value
}

#[tokio::test]
async fn http_counter_increment_and_decrement() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let before = counter_value(&client, &server.base_url).await;

    let response = client
        .post(format!("{}/api/counter", server.base_url))
        .json(&json!({ "action": "increment" }))
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());
    let incremented: CounterResponse = response.json().await.unwrap();
    assert_eq!(incremented.value, before + 1);

    let response = client
        .post(format!("{}/api/counter", server.base_url))
        .json(&json!({ "action": "decrement" }))
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());

    assert_eq!(counter_value(&client, &server.base_url).await, before);
}

#[tokio::test]
async fn http_counter_rejects_unknown_action() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;

    let response = Client::new()
        .post(format!("{}/api/counter", server.base_url))
        .json(&json!({ "action": "reset" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn http_chart_sorts_quarters_and_aligns_data() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;

    let chart: Value = Client::new()
        .get(format!("{}/api/charts/cumulative?width=800", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(chart["kind"], "cumulative");
    assert_eq!(chart["labels"], json!(["Q4 2023", "Q1 2024", "Q2 2024"]));
    assert_eq!(chart["data"], json!([[0.0, 1.0, 2.0], [10.0, 25.0, 30.0], [10.0, 35.0, 65.0]]));
    assert_eq!(chart["options"]["width"], 800);
    assert_eq!(chart["options"]["title"], "Quarterly Values");
}

#[tokio::test]
async fn http_unknown_chart_kind_falls_back_to_bars() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let unknown: Value = client
        .get(format!("{}/api/charts/nonexistent", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let bars: Value = client
        .get(format!("{}/api/charts/bars", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(unknown, bars);
    assert_eq!(unknown["options"]["width"], 600);
}

#[tokio::test]
async fn http_catalog_and_login() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let catalog: Vec<Value> = client
        .get(format!("{}/api/charts", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(catalog.len(), 10);
    assert_eq!(catalog[0]["key"], "bars");

    let rejected = client
        .post(format!("{}/api/auth/login", server.base_url))
        .json(&json!({ "email": "a@example.com", "password": "wrong" }))
        .send()
        .await
        .unwrap();
    assert_eq!(rejected.status(), reqwest::StatusCode::UNAUTHORIZED);

    let session: Value = client
        .post(format!("{}/api/auth/login", server.base_url))
        .json(&json!({ "email": "a@example.com", "password": "secret" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(session["is_authenticated"], true);
    assert_eq!(session["user"]["id"], "u1");

    let session: Value = client
        .post(format!("{}/api/auth/logout", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(session["is_authenticated"], false);
}

#[tokio::test]
async fn http_missing_collections_report_setup_hint() {
    let pocketbase_url = spawn_fake_pocketbase(FakeDb::default());
    let server = spawn_server(&pocketbase_url).await;
    let client = Client::new();

    let response = client
        .get(format!("{}/api/counter", server.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::SERVICE_UNAVAILABLE);
    assert!(response.text().await.unwrap().contains("PocketBase collections are missing"));

    let response = client
        .get(format!("{}/api/charts/line", server.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::SERVICE_UNAVAILABLE);
    assert!(response.text().await.unwrap().contains("go run ./pocketbase/seeders/valuequarters"));
}

async fn auth_state(client: &Client, base_url: &str, cookie: Option<&str>) -> Value {
    let mut request = client.get(format!("{base_url}/api/auth"));
    if let Some(cookie) = cookie {
        request = request.header(COOKIE, cookie);
    }
    request.send().await.unwrap().json().await.unwrap()
}

#[tokio::test]
async fn http_login_is_scoped_to_one_visitor() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let alice = Client::new();
    let bob = Client::new();

    let response = alice
        .post(format!("{}/api/auth/login", server.base_url))
        .json(&json!({ "email": "alice@example.com", "password": "secret" }))
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());
    let set_cookie = response.headers()[SET_COOKIE].to_str().unwrap().to_string();
    let cookie = set_cookie.split(';').next().unwrap().to_string();
    assert!(cookie.starts_with("qd_session="));

    let state = auth_state(&alice, &server.base_url, Some(&cookie)).await;
    assert_eq!(state["is_authenticated"], true);
    assert_eq!(state["user"]["email"], "alice@example.com");

    let state = auth_state(&bob, &server.base_url, None).await;
    assert_eq!(state["is_authenticated"], false);
    assert!(state["user"].is_null());

    // Another visitor signing out leaves the first session alone.
    bob.post(format!("{}/api/auth/logout", server.base_url))
        .send()
        .await
        .unwrap();
    let state = auth_state(&alice, &server.base_url, Some(&cookie)).await;
    assert_eq!(state["is_authenticated"], true);

    let response = alice
        .post(format!("{}/api/auth/logout", server.base_url))
        .header(COOKIE, &cookie)
        .send()
        .await
        .unwrap();
    assert!(response.headers()[SET_COOKIE].to_str().unwrap().contains("Max-Age=0"));
    let state = auth_state(&alice, &server.base_url, Some(&cookie)).await;
    assert_eq!(state["is_authenticated"], false);
}
