use once_cell::sync::Lazy;
use reqwest::Client;
use serde::Deserialize;
use std::net::TcpListener;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio::time::sleep;

#[derive(Debug, Deserialize)]
struct TeamSummary {
    key: String,
    count: u64,
}

#[derive(Debug, Deserialize)]
struct SummaryResponse {
    total: u64,
    goal: u64,
    goal_reached: bool,
    teams: Vec<TeamSummary>,
}

impl SummaryResponse {
    fn count(&self, key: &str) -> u64 {
        self.teams
            .iter()
            .find(|team| team.key == key)
            .map(|team| team.count)
            .unwrap_or(0)
    }
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
    use std::sync::Once;

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

fn unique_data_dir() -> PathBuf {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let mut path = std::env::temp_dir();
    path.push(format!("summit_checkin_http_{}_{}", std::process::id(), nanos));
    path
}

async fn wait_until_ready(base_url: &str) {
    let client = Client::new();
    let deadline = Instant::now() + Duration::from_secs(3);
    loop {
        if let Ok(resp) = client.get(format!("{base_url}/api/summary")).send().await {
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

async fn spawn_server(data_dir: &Path) -> TestServer {
    let port = pick_free_port();
    let child = Command::new(env!("CARGO_BIN_EXE_summit_checkin"))
        .env("PORT", port.to_string())
        .env("APP_DATA_DIR", data_dir)
        .env("ATTENDANCE_GOAL", "3")
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
    let server = Arc::new(spawn_server(&unique_data_dir()).await);
    *guard = Some(Arc::clone(&server));
    server
}

async fn summary(client: &Client, base_url: &str) -> SummaryResponse {
    client
        .get(format!("{base_url}/api/summary"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap()
}

#[tokio::test]
async fn http_check_in_updates_summary() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let before = summary(&client, &server.base_url).await;
    assert_eq!(before.goal, 3);

    let response = client
        .post(format!("{}/api/checkin", server.base_url))
        .json(&serde_json::json!({ "name": "Ada", "team": "net-zero" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::CREATED);

    let after = summary(&client, &server.base_url).await;
    assert_eq!(after.total, before.total + 1);
    assert_eq!(after.count("net-zero"), before.count("net-zero") + 1);
    assert_eq!(after.count("water-wise"), before.count("water-wise"));
}

#[tokio::test]
async fn http_unknown_team_is_rejected() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let before = summary(&client, &server.base_url).await;
    let response = client
        .post(format!("{}/api/checkin", server.base_url))
        .json(&serde_json::json!({ "name": "Bob", "team": "fire" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::BAD_REQUEST);

    let after = summary(&client, &server.base_url).await;
    assert_eq!(after.total, before.total);
}

#[tokio::test]
async fn http_state_persists_across_restart() {
    let _guard = TEST_LOCK.lock().await;
    let data_dir = unique_data_dir();
    let client = Client::new();

    {
        let server = spawn_server(&data_dir).await;
        for team in ["water-wise", "renewables", "water-wise"] {
            let response = client
                .post(format!("{}/api/checkin", server.base_url))
                .json(&serde_json::json!({ "name": "Guest", "team": team }))
                .send()
                .await
                .unwrap();
            assert!(response.status().is_success());
        }
    }

    let server = spawn_server(&data_dir).await;
    let restored = summary(&client, &server.base_url).await;
    assert_eq!(restored.total, 3);
    assert!(restored.goal_reached);
    assert_eq!(restored.count("water-wise"), 2);
    assert_eq!(restored.count("renewables"), 1);

    drop(server);
    let _ = std::fs::remove_dir_all(data_dir);
}
