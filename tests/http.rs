use once_cell::sync::Lazy;
use reqwest::Client;
use serde::Deserialize;
use std::net::TcpListener;
use std::process::{Child, Command, Stdio};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio::time::sleep;

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    success: bool,
    data: T,
    message: String,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    success: bool,
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    code: String,
    message: String,
}

#[derive(Debug, Deserialize)]
struct RecordResponse {
    id: String,
    user_id: String,
    content: String,
    score: u8,
    created_at: String,
}

#[derive(Debug, Deserialize)]
struct PeriodStatsResponse {
    record_count: u64,
    total_score: u64,
    average_score: f64,
}

#[derive(Debug, Deserialize)]
struct StatsSummaryResponse {
    today: PeriodStatsResponse,
    this_week: PeriodStatsResponse,
    this_month: PeriodStatsResponse,
    all_time: PeriodStatsResponse,
}

#[derive(Debug, Deserialize)]
struct WeekPointResponse {
    date: String,
    label: String,
    weekday: u32,
    score_counts: [u64; 5],
}

#[derive(Debug, Deserialize)]
struct ScoreSliceResponse {
    score: u8,
    count: u64,
    percentage: f64,
}

#[derive(Debug, Deserialize)]
struct CalendarResponse {
    year: i32,
    month: u32,
    days: Vec<serde_json::Value>,
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
    use std::sync::Once;
    use std::sync::atomic::{AtomicI32, Ordering};

    static REGISTER: Once = Once::new();
    static PID: AtomicI32 = AtomicI32::new(0);

    pub fn register(pid: u32) {
        REGISTER.call_once(|| {
            PID.store(pid as i32, Ordering::SeqCst);
            unsafe {
                libc::atexit(on_exit);
            }
        });
    }

    extern "C" fn on_exit() {
        let pid = PID.load(Ordering::SeqCst);
        if pid > 0 {
            unsafe {
                libc::kill(pid, libc::SIGTERM);
            }
        }
    }
}

fn pick_free_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind random port");
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    port
}

fn unique_data_path() -> String {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let mut path = std::env::temp_dir();
    path.push(format!(
        "failure_bank_http_{}_{}.json",
        std::process::id(),
        nanos
    ));
    path.to_string_lossy().to_string()
}

async fn wait_until_ready(base_url: &str) {
    let client = Client::new();
    let deadline = Instant::now() + Duration::from_secs(3);
    loop {
        if let Ok(resp) = client
            .get(format!("{base_url}/api/stats/summary"))
            .send()
            .await
        {
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

async fn spawn_server() -> TestServer {
    let port = pick_free_port();
    let data_path = unique_data_path();
    let child = Command::new(env!("CARGO_BIN_EXE_failure_bank"))
        .env("PORT", port.to_string())
        .env("APP_DATA_PATH", data_path)
        .env("WEEK_START_DAY", "0")
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
    let server = Arc::new(spawn_server().await);
    *guard = Some(Arc::clone(&server));
    server
}

async fn create_record(client: &Client, base_url: &str, content: &str, score: u8) -> RecordResponse {
    let response = client
        .post(format!("{base_url}/api/records"))
        .json(&serde_json::json!({ "content": content, "score": score }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::CREATED);

    let body: Envelope<RecordResponse> = response.json().await.unwrap();
    assert!(body.success);
    assert!(!body.message.is_empty());
    body.data
}

async fn fetch_summary(client: &Client, base_url: &str) -> StatsSummaryResponse {
    let body: Envelope<StatsSummaryResponse> = client
        .get(format!("{base_url}/api/stats/summary"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(body.success);
    body.data
}

#[tokio::test]
async fn http_create_record_updates_summary() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let before = fetch_summary(&client, &server.base_url).await;

    let record = create_record(&client, &server.base_url, "spoke up in a meeting", 4).await;
    assert_eq!(record.content, "spoke up in a meeting");
    assert_eq!(record.score, 4);
    assert!(!record.id.is_empty());
    assert!(!record.user_id.is_empty());
    assert!(!record.created_at.is_empty());

    let after = fetch_summary(&client, &server.base_url).await;
    assert_eq!(after.all_time.record_count, before.all_time.record_count + 1);
    assert_eq!(after.all_time.total_score, before.all_time.total_score + 4);
    assert_eq!(after.today.record_count, before.today.record_count + 1);
    assert_eq!(after.this_week.record_count, before.this_week.record_count + 1);
    assert_eq!(
        after.this_month.record_count,
        before.this_month.record_count + 1
    );

    if after.all_time.record_count > 0 {
        let expected = after.all_time.total_score as f64 / after.all_time.record_count as f64;
        assert!((after.all_time.average_score - expected).abs() < 1e-9);
    }
}

#[tokio::test]
async fn http_rejects_invalid_payloads() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let response = client
        .post(format!("{}/api/records", server.base_url))
        .json(&serde_json::json!({ "content": "bad score", "score": 6 }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::UNPROCESSABLE_ENTITY);
    let body: ErrorEnvelope = response.json().await.unwrap();
    assert!(!body.success);
    assert_eq!(body.error.code, "VALIDATION_ERROR");
    assert!(!body.error.message.is_empty());

    let response = client
        .post(format!("{}/api/records", server.base_url))
        .json(&serde_json::json!({ "content": "   ", "score": 3 }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::UNPROCESSABLE_ENTITY);
    let body: ErrorEnvelope = response.json().await.unwrap();
    assert_eq!(body.error.code, "VALIDATION_ERROR");
}

#[tokio::test]
async fn http_undeserializable_body_gets_error_envelope() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    // Wrong field type: score as a string.
    let response = client
        .post(format!("{}/api/records", server.base_url))
        .json(&serde_json::json!({ "content": "typed wrong", "score": "three" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::UNPROCESSABLE_ENTITY);
    let body: ErrorEnvelope = response.json().await.unwrap();
    assert!(!body.success);
    assert_eq!(body.error.code, "VALIDATION_ERROR");
    assert!(!body.error.message.is_empty());

    // Not JSON at all.
    let response = client
        .post(format!("{}/api/records", server.base_url))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::UNPROCESSABLE_ENTITY);
    let body: ErrorEnvelope = response.json().await.unwrap();
    assert_eq!(body.error.code, "VALIDATION_ERROR");
}

#[tokio::test]
async fn http_record_crud_round_trip() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let created = create_record(&client, &server.base_url, "first draft", 2).await;

    let fetched: Envelope<RecordResponse> = client
        .get(format!("{}/api/records/{}", server.base_url, created.id))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(fetched.data.content, "first draft");

    let updated: Envelope<RecordResponse> = client
        .put(format!("{}/api/records/{}", server.base_url, created.id))
        .json(&serde_json::json!({ "score": 5 }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(updated.data.score, 5);
    assert_eq!(updated.data.content, "first draft");

    let deleted = client
        .delete(format!("{}/api/records/{}", server.base_url, created.id))
        .send()
        .await
        .unwrap();
    assert!(deleted.status().is_success());

    let missing = client
        .get(format!("{}/api/records/{}", server.base_url, created.id))
        .send()
        .await
        .unwrap();
    assert_eq!(missing.status(), reqwest::StatusCode::NOT_FOUND);
    let body: ErrorEnvelope = missing.json().await.unwrap();
    assert_eq!(body.error.code, "NOT_FOUND");
}

#[tokio::test]
async fn http_list_records_newest_first() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    create_record(&client, &server.base_url, "older entry", 1).await;
    let newest = create_record(&client, &server.base_url, "newest entry", 3).await;

    let body: Envelope<Vec<RecordResponse>> = client
        .get(format!("{}/api/records?limit=2", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(body.data.len(), 2);
    assert_eq!(body.data[0].id, newest.id);
    assert!(body.data[0].created_at >= body.data[1].created_at);
}

#[tokio::test]
async fn http_weekly_stats_have_seven_points() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    create_record(&client, &server.base_url, "weekly entry", 5).await;

    let body: Envelope<Vec<WeekPointResponse>> = client
        .get(format!("{}/api/stats/weekly", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(body.data.len(), 7);
    let weekday_names = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];
    for (index, point) in body.data.iter().enumerate() {
        assert_eq!(point.weekday, index as u32);
        assert_eq!(point.date.len(), "2024-01-01".len());
        // Sunday-start server (WEEK_START_DAY=0): labels come back in order.
        assert_eq!(point.label, weekday_names[index]);
    }
    let total: u64 = body
        .data
        .iter()
        .flat_map(|point| point.score_counts)
        .sum();
    assert!(total >= 1);
}

#[tokio::test]
async fn http_distribution_reflects_scores() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    create_record(&client, &server.base_url, "distribution entry", 2).await;

    let body: Envelope<Vec<ScoreSliceResponse>> = client
        .get(format!("{}/api/stats/distribution", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert!(!body.data.is_empty());
    assert!(body.data.iter().all(|slice| slice.count > 0));
    assert!(body.data.iter().any(|slice| slice.score == 2));
    let sum: f64 = body.data.iter().map(|slice| slice.percentage).sum();
    assert!((sum - 100.0).abs() < 1e-6);
}

#[tokio::test]
async fn http_calendar_validates_month() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let ok = client
        .get(format!(
            "{}/api/stats/calendar?year=2024&month=2",
            server.base_url
        ))
        .send()
        .await
        .unwrap();
    assert!(ok.status().is_success());
    let body: Envelope<CalendarResponse> = ok.json().await.unwrap();
    assert_eq!(body.data.year, 2024);
    assert_eq!(body.data.month, 2);

    let bad = client
        .get(format!(
            "{}/api/stats/calendar?year=2024&month=13",
            server.base_url
        ))
        .send()
        .await
        .unwrap();
    assert_eq!(bad.status(), reqwest::StatusCode::BAD_REQUEST);
    let body: ErrorEnvelope = bad.json().await.unwrap();
    assert_eq!(body.error.code, "BAD_REQUEST");
}

#[tokio::test]
async fn http_index_serves_dashboard() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let response = client.get(&server.base_url).send().await.unwrap();
    assert!(response.status().is_success());
    let html = response.text().await.unwrap();
    assert!(html.contains("Failure Bank"));
    assert!(html.contains("Activity calendar"));
}
