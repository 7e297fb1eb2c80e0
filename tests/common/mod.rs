//! Shared utilities for integration and load testing.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use axum::{
    body::{Body, Bytes},
    extract::{DefaultBodyLimit, State},
    http::{header::CONTENT_LENGTH, HeaderMap, Method, StatusCode, Uri},
    response::Response,
    Router,
};
use futures_util::StreamExt;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use upload_proxy::{HttpServer, ProxyConfig, Shutdown};

/// Request header asking the mock upstream for a specific status.
pub const ECHO_STATUS: &str = "x-echo-status";
/// Request header asking the mock upstream to wait before sending headers.
pub const ECHO_DELAY_MS: &str = "x-echo-delay-ms";
/// Request header asking the mock upstream to trickle a 3-chunk body,
/// sleeping this long before each chunk.
pub const ECHO_TRICKLE_MS: &str = "x-echo-trickle-ms";

/// Origin the mock upstream always advertises; the proxy must override it.
pub const UPSTREAM_CORS_ORIGIN: &str = "https://upstream.example";

/// One request as the upstream saw it.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: Method,
    pub path_and_query: String,
    pub headers: HeaderMap,
    pub body: Bytes,
}

/// Everything the mock upstream has received.
#[derive(Debug, Clone, Default)]
pub struct UpstreamLog {
    inner: Arc<Mutex<Vec<Recorded>>>,
}

impl UpstreamLog {
    pub fn count(&self) -> usize {
        self.inner.lock().unwrap().len()
    }

    pub fn all(&self) -> Vec<Recorded> {
        self.inner.lock().unwrap().clone()
    }

    pub fn last(&self) -> Recorded {
        self.inner
            .lock()
            .unwrap()
            .last()
            .cloned()
            .expect("upstream received no requests")
    }

    fn push(&self, recorded: Recorded) {
        self.inner.lock().unwrap().push(recorded);
    }
}

/// Start an upstream that records each request and echoes its body back with
/// the same `Content-Type`.
pub async fn spawn_echo_upstream() -> (SocketAddr, UpstreamLog) {
    let log = UpstreamLog::default();
    let app = Router::new()
        .fallback(echo)
        .with_state(log.clone())
        .layer(DefaultBodyLimit::disable());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    (addr, log)
}

async fn echo(
    State(log): State<UpstreamLog>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let header_u64 = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<u64>().ok())
    };

    let status = header_u64(ECHO_STATUS)
        .and_then(|s| StatusCode::from_u16(s as u16).ok())
        .unwrap_or(StatusCode::OK);
    let delay = header_u64(ECHO_DELAY_MS);
    let trickle = header_u64(ECHO_TRICKLE_MS);
    let content_type = headers.get("content-type").cloned();

    log.push(Recorded {
        method,
        path_and_query: uri
            .path_and_query()
            .map(|pq| pq.as_str().to_string())
            .unwrap_or_default(),
        headers,
        body: body.clone(),
    });

    if let Some(ms) = delay {
        tokio::time::sleep(Duration::from_millis(ms)).await;
    }

    let body = match trickle {
        Some(ms) => Body::from_stream(futures_util::stream::iter(0..3u8).then(move |i| async move {
            tokio::time::sleep(Duration::from_millis(ms)).await;
            Ok::<_, std::io::Error>(Bytes::from(vec![b'a' + i]))
        })),
        None => Body::from(body),
    };

    let mut builder = Response::builder()
        .status(status)
        .header("access-control-allow-origin", UPSTREAM_CORS_ORIGIN)
        .header("x-upstream", "echo");
    if let Some(ct) = content_type {
        builder = builder.header("content-type", ct);
    }
    builder.body(body).unwrap()
}

/// How an upload ended, as seen by a streaming upstream handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadEnd {
    /// Every byte promised by `Content-Length` arrived.
    Complete(usize),
    /// The body errored or stopped short; holds the bytes that did arrive.
    Truncated(usize),
}

/// Observations from [`spawn_streaming_upstream`].
#[derive(Debug, Clone, Default)]
pub struct UploadWatch {
    started: Arc<AtomicBool>,
    end: Arc<Mutex<Option<UploadEnd>>>,
}

impl UploadWatch {
    /// Whether a request head reached the upstream.
    pub fn started(&self) -> bool {
        self.started.load(Ordering::SeqCst)
    }

    /// Poll until the upstream has seen the body end, or `within` passes.
    pub async fn wait_for_end(&self, within: Duration) -> Option<UploadEnd> {
        let deadline = Instant::now() + within;
        loop {
            if let Some(end) = *self.end.lock().unwrap() {
                return Some(end);
            }
            if Instant::now() >= deadline {
                return None;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    }
}

/// Start an upstream that consumes each body frame by frame and records
/// whether it ended complete or cut short.
pub async fn spawn_streaming_upstream() -> (SocketAddr, UploadWatch) {
    let watch = UploadWatch::default();
    let app = Router::new()
        .fallback(drain)
        .with_state(watch.clone())
        .layer(DefaultBodyLimit::disable());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    (addr, watch)
}

async fn drain(State(watch): State<UploadWatch>, headers: HeaderMap, body: Body) -> StatusCode {
    watch.started.store(true, Ordering::SeqCst);
    let expected = headers
        .get(CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<usize>().ok());

    // Detached so the outcome is recorded even if hyper drops this handler
    // along with the broken connection.
    let reader = tokio::spawn(async move {
        let mut frames = body.into_data_stream();
        let mut received = 0;
        let mut failed = false;
        while let Some(frame) = frames.next().await {
            match frame {
                Ok(bytes) => received += bytes.len(),
                Err(_) => {
                    failed = true;
                    break;
                }
            }
        }

        let short = expected.map_or(false, |n| received < n);
        let end = if failed || short {
            UploadEnd::Truncated(received)
        } else {
            UploadEnd::Complete(received)
        };
        *watch.end.lock().unwrap() = Some(end);
    });

    let _ = reader.await;
    StatusCode::OK
}

/// A running proxy under test.
pub struct TestProxy {
    pub addr: SocketAddr,
    pub shutdown: Shutdown,
    pub handle: JoinHandle<Result<(), std::io::Error>>,
}

impl TestProxy {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

/// Start the proxy on an ephemeral port.
pub async fn spawn_proxy(config: ProxyConfig) -> TestProxy {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = HttpServer::new(config).expect("valid test config");
    let shutdown = Shutdown::new();
    let handle = tokio::spawn(server.run(listener, shutdown.subscribe()));

    TestProxy {
        addr,
        shutdown,
        handle,
    }
}

/// Default config pointed at `upstream`, with short timeouts.
pub fn proxy_config(upstream: SocketAddr) -> ProxyConfig {
    let mut config = ProxyConfig::default();
    config.upstream.origin = format!("http://{upstream}");
    config.timeouts.connect_secs = 1;
    config.timeouts.response_header_secs = 1;
    config.timeouts.shutdown_grace_secs = 2;
    config
}

/// An address nothing is listening on.
pub async fn unused_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}
