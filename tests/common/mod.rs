//! Shared utilities for integration testing.
#![allow(dead_code)]

use std::future::Future;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::State;
use axum::http::HeaderMap;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use tokio::io::AsyncWriteExt;
use tokio::net::TcpListener;

use telephone::config::{HostConfig, TelephoneConfig, TransformMode};
use telephone::lifecycle::{build_relay, Shutdown};
use telephone::{Envelope, HttpServer, ACKNOWLEDGEMENT};

/// Bind an ephemeral local port.
pub async fn bind() -> (TcpListener, SocketAddr) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    (listener, addr)
}

/// Registry entry for a node listening on `addr`.
pub fn host(id: &str, addr: SocketAddr) -> HostConfig {
    HostConfig {
        id: id.to_string(),
        message_url: format!("http://{addr}/message"),
        health_url: format!("http://{addr}/health"),
    }
}

/// Config that always mutates with the local mutator and probes health.
pub fn base_config(hosts: Vec<HostConfig>) -> TelephoneConfig {
    let mut config = TelephoneConfig::default();
    config.hosts = hosts;
    config.transform.mode = TransformMode::Local;
    config.transform.trigger_probability = 1.0;
    config.health_check.timeout_secs = Some(2);
    config.forward.timeout_secs = 2;
    config
}

/// A running node. Dropping it shuts the server down.
pub struct TestNode {
    pub addr: SocketAddr,
    pub shutdown: Shutdown,
}

impl TestNode {
    pub fn message_url(&self) -> String {
        format!("http://{}/message", self.addr)
    }
}

impl Drop for TestNode {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

/// Serve a relay for `node_id` on an already bound listener.
pub async fn spawn_node(listener: TcpListener, config: &TelephoneConfig, node_id: &str) -> TestNode {
    let addr = listener.local_addr().unwrap();
    let relay = Arc::new(build_relay(config, node_id).unwrap());
    let shutdown = Shutdown::new();
    let server = HttpServer::new(&config.listener, relay);
    let server_shutdown = shutdown.subscribe();

    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    TestNode { addr, shutdown }
}

/// Client that never pools or proxies, for stable local tests.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}

/// A forwarded message as seen by the receiving side.
#[derive(Debug, Clone)]
pub struct Captured {
    pub headers: HeaderMap,
    pub envelope: Envelope,
}

/// Stand-in next hop that records every message and reports healthy.
pub struct CaptureServer {
    pub addr: SocketAddr,
    received: Arc<Mutex<Vec<Captured>>>,
}

impl CaptureServer {
    pub async fn start() -> Self {
        let received = Arc::new(Mutex::new(Vec::new()));
        let app = Router::new()
            .route("/message", post(capture))
            .route("/health", get(|| async { "OK" }))
            .with_state(received.clone());

        let (listener, addr) = bind().await;
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self { addr, received }
    }

    pub fn host(&self, id: &str) -> HostConfig {
        host(id, self.addr)
    }

    pub fn received(&self) -> Vec<Captured> {
        self.received.lock().unwrap().clone()
    }

    /// Wait until at least `count` messages arrived, or give up after 5s.
    pub async fn wait_for(&self, count: usize) -> Vec<Captured> {
        wait_until(Duration::from_secs(5), || self.received().len() >= count).await;
        self.received()
    }
}

async fn capture(
    State(received): State<Arc<Mutex<Vec<Captured>>>>,
    headers: HeaderMap,
    Json(envelope): Json<Envelope>,
) -> &'static str {
    received.lock().unwrap().push(Captured { headers, envelope });
    ACKNOWLEDGEMENT
}

/// Ollama-compatible backend answering every prompt with `reply`.
pub struct StubBackend {
    pub addr: SocketAddr,
    prompts: Arc<Mutex<Vec<String>>>,
}

impl StubBackend {
    pub async fn start(reply: &'static str) -> Self {
        let prompts = Arc::new(Mutex::new(Vec::new()));
        let recorded = prompts.clone();
        let app = Router::new().route(
            "/api/generate",
            post(move |Json(body): Json<Value>| {
                let recorded = recorded.clone();
                async move {
                    let prompt = body["prompt"].as_str().unwrap_or_default().to_string();
                    recorded.lock().unwrap().push(prompt);
                    Json(json!({ "model": body["model"], "response": reply, "done": true }))
                }
            }),
        );

        let (listener, addr) = bind().await;
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self { addr, prompts }
    }

    pub fn endpoint(&self) -> String {
        format!("http://{}/api/generate", self.addr)
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    /// Configure `config` to use this backend for opposite-word mutation.
    pub fn configure(&self, config: &mut TelephoneConfig) {
        config.transform.mode = TransformMode::Opposite;
        config.transform.ollama.endpoint = self.endpoint();
    }
}

/// Start a programmable raw HTTP server, answering every connection with
/// whatever `f` returns. Useful as a health endpoint for a dead peer.
pub async fn start_programmable_backend<F, Fut>(f: F) -> SocketAddr
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = (u16, String)> + Send + 'static,
{
    let (listener, addr) = bind().await;
    let f = Arc::new(f);

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let f = f.clone();
                    tokio::spawn(async move {
                        let (status, body) = f().await;
                        let status_text = match status {
                            200 => "200 OK",
                            404 => "404 Not Found",
                            500 => "500 Internal Server Error",
                            503 => "503 Service Unavailable",
                            _ => "200 OK",
                        };

                        let response_str = format!(
                            "HTTP/1.1 {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                            status_text,
                            body.len(),
                            body
                        );
                        let _ = socket.write_all(response_str.as_bytes()).await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    addr
}

/// Poll `condition` every 20ms until it holds or `timeout` elapses.
pub async fn wait_until<F>(timeout: Duration, condition: F) -> bool
where
    F: Fn() -> bool,
{
    let deadline = tokio::time::Instant::now() + timeout;
    while tokio::time::Instant::now() < deadline {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    condition()
}

/// POST a first-hop envelope to `url`.
pub async fn send_first_hop(url: &str, text: &str) -> reqwest::Response {
    client()
        .post(url)
        .json(&Envelope::first_hop(text))
        .send()
        .await
        .expect("node unreachable")
}
