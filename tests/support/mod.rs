// Shared bootstrap so every integration test talks to one running server.
use std::{
    sync::{Arc, OnceLock},
    time::Duration,
};

use ferreteria_server::{AppConfig, Environment};

pub const ADMIN_USERNAME: &str = "admin";
pub const ADMIN_PASSWORD: &str = "clave-de-prueba";

// Base URL published once the server has bound its ephemeral port.
static SERVER_URL: OnceLock<String> = OnceLock::new();
static SERVER_READY: OnceLock<()> = OnceLock::new();

// Ensure the test server is running and return the shared base URL.
pub fn ensure_server() -> &'static str {
    SERVER_READY.get_or_init(|| {
        let published_url = Arc::new(OnceLock::<String>::new());
        let published_url_thread = Arc::clone(&published_url);
        // Own thread and runtime so the server outlives individual `#[tokio::test]` runtimes.
        std::thread::spawn(move || {
            let runtime = tokio::runtime::Runtime::new().expect("test runtime");
            runtime.block_on(async move {
                let config = AppConfig {
                    environment: Environment::Development,
                    admin_username: ADMIN_USERNAME.to_string(),
                    admin_password: Some(ADMIN_PASSWORD.to_string()),
                    ..AppConfig::default()
                };
                let state = ferreteria_server::build_state(&config)
                    .await
                    .expect("build in-memory state");
                let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
                    .await
                    .expect("bind ephemeral test port");
                let addr = listener.local_addr().expect("get local addr");
                let _ = published_url_thread.set(format!("http://{}", addr));
                ferreteria_server::run(listener, state)
                    .await
                    .expect("server failed");
            });
        });
        wait_for_server_url_and_readiness(published_url);
    });

    SERVER_URL
        .get()
        .expect("server url should be initialized")
        .as_str()
}

fn wait_for_server_url_and_readiness(published_url: Arc<OnceLock<String>>) {
    let base_url = loop {
        if let Some(url) = published_url.get() {
            break url.clone();
        }
        std::thread::sleep(Duration::from_millis(10));
    };

    let _ = SERVER_URL.set(base_url.clone());

    let addr = base_url
        .strip_prefix("http://")
        .expect("base url should use http://");

    for _ in 0..100 {
        if std::net::TcpStream::connect(addr).is_ok() {
            return;
        }
        std::thread::sleep(Duration::from_millis(20));
    }

    panic!("server did not become ready in time");
}

// Logs in as the seeded administrator and returns the bearer token.
pub async fn admin_token(client: &reqwest::Client, base_url: &str) -> String {
    let res = client
        .post(format!("{base_url}/api/auth/login"))
        .json(&serde_json::json!({
            "username": ADMIN_USERNAME,
            "password": ADMIN_PASSWORD,
        }))
        .send()
        .await
        .expect("login request should succeed");
    assert_eq!(res.status(), reqwest::StatusCode::OK);

    let body: serde_json::Value = res.json().await.expect("login body should be json");
    body["data"]["token"]
        .as_str()
        .expect("login should return a token")
        .to_string()
}
