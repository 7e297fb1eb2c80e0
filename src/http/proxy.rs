//! Upstream forwarding.
//!
//! # Responsibilities
//! - Rewrite the inbound request onto the upstream URL
//! - Stream the client body upstream and the upstream body back
//! - Classify failures (unreachable, timeout, client gone)
//!
//! # Design Decisions
//! - Bodies are never buffered; memory use is independent of upload size
//! - Upstream status and headers are relayed verbatim apart from hop-by-hop
//! - Dropping the handler future drops the in-flight upstream request
//! - The response-header deadline starts once the client body is fully sent

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::task::{ready, Poll};

use axum::{
    body::{Body, HttpBody},
    extract::ConnectInfo,
    http::{Request, Uri, Version},
    response::Response,
};
use futures_util::StreamExt;
use hyper_tls::HttpsConnector;
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::{TokioExecutor, TokioTimer},
};
use tokio::sync::oneshot;

use crate::http::error::ProxyError;
use crate::http::headers;
use crate::resilience::UpstreamTimeouts;

/// Pooled client able to reach both http and https origins.
pub type UpstreamClient = Client<HttpsConnector<HttpConnector>, Body>;

/// Forwards requests to the single upstream.
#[derive(Clone)]
pub struct Forwarder {
    client: UpstreamClient,
    timeouts: UpstreamTimeouts,
}

impl Forwarder {
    pub fn new(timeouts: UpstreamTimeouts) -> Self {
        let https = HttpsConnector::new_with_connector(timeouts.connector());
        let client = Client::builder(TokioExecutor::new())
            .pool_idle_timeout(timeouts.idle)
            .pool_timer(TokioTimer::new())
            .build(https);

        Self { client, timeouts }
    }

    /// Send `request` to `target` and hand back the upstream response with
    /// its body still streaming.
    pub async fn forward(&self, request: Request<Body>, target: &str) -> Result<Response, ProxyError> {
        let uri: Uri = target
            .parse()
            .map_err(|_| ProxyError::InvalidUpstreamUri(target.to_string()))?;

        let client_ip = request
            .extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip());

        let (mut parts, body) = request.into_parts();
        headers::prepare_upstream(&mut parts.headers, client_ip);
        parts.uri = uri;
        // The pooled client negotiates its own protocol with the upstream.
        parts.version = Version::HTTP_11;

        let client_gone = Arc::new(AtomicBool::new(false));
        let (body, upload_done) = watch_client_body(body, Arc::clone(&client_gone));
        let upstream_request = Request::from_parts(parts, body);

        let response = match self
            .timeouts
            .await_headers(upload_done, self.client.request(upstream_request))
            .await
        {
            Ok(Ok(response)) => response,
            Ok(Err(_)) if client_gone.load(Ordering::Acquire) => {
                return Err(ProxyError::ClientDisconnect)
            }
            Ok(Err(e)) => return Err(ProxyError::UpstreamUnreachable(e)),
            Err(_) => return Err(ProxyError::UpstreamTimeout(self.timeouts.response_headers)),
        };

        let (mut parts, body) = response.into_parts();
        headers::strip_hop_by_hop(&mut parts.headers);

        Ok(Response::from_parts(parts, Body::new(body)))
    }
}

/// Pass the client body through as a stream, flagging `client_gone` if it
/// errors (the client hung up mid-upload).
///
/// The returned receiver resolves once the body has ended or been dropped by
/// the upstream connection, whichever comes first. Empty bodies stay empty so
/// no chunked framing is invented for them; their receiver resolves at once.
fn watch_client_body(body: Body, client_gone: Arc<AtomicBool>) -> (Body, oneshot::Receiver<()>) {
    let (upload_open, upload_done) = oneshot::channel::<()>();

    if body.is_end_stream() {
        drop(upload_open);
        return (Body::empty(), upload_done);
    }

    let mut upload_open = Some(upload_open);
    let mut stream = body.into_data_stream();
    let watched = futures_util::stream::poll_fn(move |cx| {
        let item = ready!(stream.poll_next_unpin(cx));
        match &item {
            None => {
                upload_open.take();
            }
            Some(Err(e)) => {
                client_gone.store(true, Ordering::Release);
                tracing::warn!(error = %e, "Client body stream aborted, cancelling upstream request");
            }
            Some(Ok(_)) => {}
        }
        Poll::Ready(item)
    });

    (Body::from_stream(watched), upload_done)
}
