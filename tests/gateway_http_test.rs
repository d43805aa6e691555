use async_trait::async_trait;
use rtfmark::config::RtfmarkConfig;
use rtfmark::convert::TABLE_FIDELITY_WARNING;
use rtfmark::engine::{ConversionEngine, EngineError, EngineOutput};
use rtfmark::gateway::{AppState, router};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::time::{Duration, sleep};

fn free_port() -> u16 {
    std::net::TcpListener::bind("127.0.0.1:0")
        .expect("bind ephemeral")
        .local_addr()
        .expect("local addr")
        .port()
}

fn loopback_config(port: u16) -> RtfmarkConfig {
    let mut config = RtfmarkConfig::default();
    config.server.bind = "127.0.0.1".to_string();
    config.server.port = port;
    config
}

/// Echoes the document back as Markdown, or fails with a fixed message.
struct FakeEngine {
    out: Option<String>,
    calls: AtomicUsize,
}

impl FakeEngine {
    fn echo() -> Arc<Self> {
        Arc::new(Self {
            out: None,
            calls: AtomicUsize::new(0),
        })
    }

    fn returning(out: &str) -> Arc<Self> {
        Arc::new(Self {
            out: Some(out.to_string()),
            calls: AtomicUsize::new(0),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ConversionEngine for FakeEngine {
    fn name(&self) -> &str {
        "fake"
    }

    async fn init(&self) -> Result<(), EngineError> {
        Ok(())
    }

    async fn convert(&self, _args: &str, input: &str) -> Result<EngineOutput, EngineError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if input.contains("FAIL") {
            return Err(EngineError::Call("engine exploded".into()));
        }
        Ok(EngineOutput {
            out: self.out.clone().unwrap_or_else(|| format!("  {input}\n")),
            log: "[INFO] converted\n".into(),
        })
    }
}

/// Serve the router on an ephemeral port and return its base URL.
async fn spawn_app(config: RtfmarkConfig, engine: Arc<FakeEngine>) -> String {
    let state = Arc::new(AppState::new(config, engine).expect("app state"));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        let _ = axum::serve(listener, router(state)).await;
    });
    format!("http://{addr}")
}

fn rtf_form(name: &str, body: impl Into<Vec<u8>>) -> reqwest::multipart::Form {
    let part = reqwest::multipart::Part::bytes(body.into()).file_name(name.to_string());
    reqwest::multipart::Form::new().part("file", part)
}

async fn error_message(response: reqwest::Response) -> String {
    let body: serde_json::Value = response.json().await.expect("json error body");
    body["error"].as_str().unwrap_or_default().to_string()
}

async fn wait_for_health(port: u16) {
    let client = reqwest::Client::new();
    let url = format!("http://127.0.0.1:{port}/health");

    for _ in 0..80 {
        if let Ok(resp) = client.get(&url).send().await {
            if resp.status().is_success() {
                return;
            }
        }
        sleep(Duration::from_millis(50)).await;
    }

    panic!("server did not become healthy at {url}");
}

#[tokio::test]
async fn health_endpoint_returns_ok() {
    let port = free_port();
    let config = loopback_config(port);
    let server = tokio::spawn(async move {
        let _ = rtfmark::gateway::serve(config, FakeEngine::echo()).await;
    });

    wait_for_health(port).await;

    let url = format!("http://127.0.0.1:{port}/health");
    let response = reqwest::get(url).await.expect("health response");
    assert_eq!(response.status(), reqwest::StatusCode::OK);
    let body = response.text().await.expect("health body");
    assert_eq!(body, "ok");

    server.abort();
    let _ = server.await;
}

#[tokio::test]
async fn ui_root_and_spa_fallback_routes_serve_html() {
    let base = spawn_app(RtfmarkConfig::default(), FakeEngine::echo()).await;
    let client = reqwest::Client::new();

    for path in ["/", "/documents/recent"] {
        let response = client
            .get(format!("{base}{path}"))
            .send()
            .await
            .expect("ui response");
        assert_eq!(response.status(), reqwest::StatusCode::OK);
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("");
        assert!(content_type.contains("text/html"), "{path}: {content_type}");
    }
}

#[tokio::test]
async fn convert_returns_markdown_and_meta() {
    let engine = FakeEngine::echo();
    let base = spawn_app(RtfmarkConfig::default(), Arc::clone(&engine)).await;

    let response = reqwest::Client::new()
        .post(format!("{base}/api/convert"))
        .multipart(rtf_form("Letter.RTF", "# Dear reader"))
        .send()
        .await
        .expect("convert response");

    assert_eq!(response.status(), reqwest::StatusCode::OK);
    let body: serde_json::Value = response.json().await.expect("json body");
    assert_eq!(body["markdown"], "# Dear reader");
    assert_eq!(body["warnings"], serde_json::json!([]));
    assert_eq!(body["stderr"], "[INFO] converted");
    assert_eq!(body["meta"]["bytesIn"], 13);
    assert_eq!(body["meta"]["bytesOut"], 13);
    assert!(body["meta"]["ms"].is_number());
    assert_eq!(engine.calls(), 1);
}

#[tokio::test]
async fn convert_warns_about_html_tables() {
    let engine = FakeEngine::returning("<table><tr><td rowspan=\"2\">x</td></tr></table>");
    let base = spawn_app(RtfmarkConfig::default(), engine).await;

    let response = reqwest::Client::new()
        .post(format!("{base}/api/convert"))
        .multipart(rtf_form("table.rtf", "{\\rtf1}"))
        .send()
        .await
        .expect("convert response");

    assert_eq!(response.status(), reqwest::StatusCode::OK);
    let body: serde_json::Value = response.json().await.expect("json body");
    assert_eq!(body["warnings"], serde_json::json!([TABLE_FIDELITY_WARNING]));
}

#[tokio::test]
async fn convert_without_file_is_rejected() {
    let engine = FakeEngine::echo();
    let base = spawn_app(RtfmarkConfig::default(), Arc::clone(&engine)).await;

    let form = reqwest::multipart::Form::new().text("note", "no file here");
    let response = reqwest::Client::new()
        .post(format!("{base}/api/convert"))
        .multipart(form)
        .send()
        .await
        .expect("convert response");

    assert_eq!(response.status(), reqwest::StatusCode::BAD_REQUEST);
    assert_eq!(error_message(response).await, "No file uploaded.");
    assert_eq!(engine.calls(), 0);
}

#[tokio::test]
async fn convert_rejects_other_extensions() {
    let engine = FakeEngine::echo();
    let base = spawn_app(RtfmarkConfig::default(), Arc::clone(&engine)).await;

    let response = reqwest::Client::new()
        .post(format!("{base}/api/convert"))
        .multipart(rtf_form("letter.docx", "PK"))
        .send()
        .await
        .expect("convert response");

    assert_eq!(response.status(), reqwest::StatusCode::BAD_REQUEST);
    assert_eq!(error_message(response).await, "Only .rtf files are supported.");
    assert_eq!(engine.calls(), 0);
}

#[tokio::test]
async fn convert_rejects_oversize_upload() {
    let engine = FakeEngine::echo();
    let base = spawn_app(RtfmarkConfig::default(), Arc::clone(&engine)).await;

    let oversize = vec![b'a'; 2_621_441];
    let response = reqwest::Client::new()
        .post(format!("{base}/api/convert"))
        .multipart(rtf_form("big.rtf", oversize))
        .send()
        .await
        .expect("convert response");

    assert_eq!(response.status(), reqwest::StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(
        error_message(response).await,
        "File is too large. Max 2.5 MB for browser conversion."
    );
    assert_eq!(engine.calls(), 0);
}

#[tokio::test]
async fn convert_accepts_upload_at_limit() {
    let mut config = RtfmarkConfig::default();
    config.server.max_upload_bytes = 1024;
    let engine = FakeEngine::returning("ok");
    let base = spawn_app(config, Arc::clone(&engine)).await;

    let response = reqwest::Client::new()
        .post(format!("{base}/api/convert"))
        .multipart(rtf_form("exact.rtf", vec![b'x'; 1024]))
        .send()
        .await
        .expect("convert response");

    assert_eq!(response.status(), reqwest::StatusCode::OK);
    assert_eq!(engine.calls(), 1);
}

#[tokio::test]
async fn convert_engine_failure_is_server_error() {
    let base = spawn_app(RtfmarkConfig::default(), FakeEngine::echo()).await;

    let response = reqwest::Client::new()
        .post(format!("{base}/api/convert"))
        .multipart(rtf_form("broken.rtf", "{\\rtf1 FAIL"))
        .send()
        .await
        .expect("convert response");

    assert_eq!(
        response.status(),
        reqwest::StatusCode::INTERNAL_SERVER_ERROR
    );
    assert!(error_message(response).await.contains("engine exploded"));
}

#[tokio::test]
async fn convert_rejects_non_multipart_body() {
    let engine = FakeEngine::echo();
    let base = spawn_app(RtfmarkConfig::default(), Arc::clone(&engine)).await;

    let response = reqwest::Client::new()
        .post(format!("{base}/api/convert"))
        .header(reqwest::header::CONTENT_TYPE, "text/plain")
        .body("{\\rtf1}")
        .send()
        .await
        .expect("convert response");

    assert_eq!(response.status(), reqwest::StatusCode::BAD_REQUEST);
    assert!(!error_message(response).await.is_empty());
    assert_eq!(engine.calls(), 0);
}

#[tokio::test]
async fn preview_returns_sanitized_html() {
    let base = spawn_app(RtfmarkConfig::default(), FakeEngine::echo()).await;

    let response = reqwest::Client::new()
        .post(format!("{base}/api/preview"))
        .json(&serde_json::json!({
            "markdown": "# Title\n\n<script>alert(1)</script>\n\n- [x] done\n",
        }))
        .send()
        .await
        .expect("preview response");

    assert_eq!(response.status(), reqwest::StatusCode::OK);
    let body: serde_json::Value = response.json().await.expect("json body");
    let html = body["html"].as_str().unwrap_or_default();
    assert!(html.contains("<h1>Title</h1>"), "{html}");
    assert!(!html.contains("<script"), "{html}");
    assert!(!html.contains("<input"), "{html}");
    assert_eq!(body["removedUnsafe"], 1);
}

#[tokio::test]
async fn preview_honours_extras_flag_and_config_default() {
    let mut config = RtfmarkConfig::default();
    config.preview.enable_gfm_extras = true;
    let base = spawn_app(config, FakeEngine::echo()).await;
    let client = reqwest::Client::new();

    let by_default: serde_json::Value = client
        .post(format!("{base}/api/preview"))
        .json(&serde_json::json!({ "markdown": "~~old~~" }))
        .send()
        .await
        .expect("preview response")
        .json()
        .await
        .expect("json body");
    assert!(
        by_default["html"].as_str().unwrap_or_default().contains("<del>old</del>"),
        "{by_default}"
    );

    let disabled: serde_json::Value = client
        .post(format!("{base}/api/preview"))
        .json(&serde_json::json!({ "markdown": "~~old~~", "enableGfmExtras": false }))
        .send()
        .await
        .expect("preview response")
        .json()
        .await
        .expect("json body");
    let html = disabled["html"].as_str().unwrap_or_default();
    assert!(!html.contains("<del>"), "{html}");
    assert!(html.contains("old"), "{html}");
}

#[tokio::test]
async fn cors_allow_list_is_applied() {
    let mut config = RtfmarkConfig::default();
    config.server.cors_origins = vec!["https://docs.example.com".to_string()];
    let base = spawn_app(config, FakeEngine::echo()).await;

    let response = reqwest::Client::new()
        .get(format!("{base}/health"))
        .header(reqwest::header::ORIGIN, "https://docs.example.com")
        .send()
        .await
        .expect("health response");

    assert_eq!(
        response
            .headers()
            .get(reqwest::header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .and_then(|v| v.to_str().ok()),
        Some("https://docs.example.com")
    );
}

#[test]
fn invalid_allow_list_fails_app_state() {
    let mut config = RtfmarkConfig::default();
    config.preview.allow.tags = vec!["iframe".to_string()];
    assert!(AppState::new(config, FakeEngine::echo()).is_err());
}
