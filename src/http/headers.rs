//! Header manipulation between client and upstream.
//!
//! # Responsibilities
//! - Strip hop-by-hop headers in both directions
//! - Add X-Forwarded-For, X-Forwarded-Proto, X-Forwarded-Host
//! - Leave every end-to-end header (notably Content-Type) untouched

use std::net::IpAddr;

use axum::http::{
    header::{CONNECTION, HOST},
    HeaderMap, HeaderName, HeaderValue,
};

pub const X_FORWARDED_FOR: &str = "x-forwarded-for";
pub const X_FORWARDED_PROTO: &str = "x-forwarded-proto";
pub const X_FORWARDED_HOST: &str = "x-forwarded-host";

/// RFC 9110 §7.6.1 connection-specific headers, plus the legacy ones
/// still seen in the wild.
const HOP_BY_HOP: &[&str] = &[
    "connection",
    "keep-alive",
    "proxy-connection",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
];

/// Remove hop-by-hop headers, including any named by `Connection`.
pub fn strip_hop_by_hop(headers: &mut HeaderMap) {
    let listed: Vec<HeaderName> = headers
        .get_all(CONNECTION)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .filter_map(|name| HeaderName::from_bytes(name.trim().as_bytes()).ok())
        .collect();

    for name in listed {
        headers.remove(name);
    }
    for name in HOP_BY_HOP {
        headers.remove(*name);
    }
}

/// Rewrite inbound headers for the upstream hop.
///
/// `Host` is dropped so the client fills in the upstream authority.
pub fn prepare_upstream(headers: &mut HeaderMap, client_ip: Option<IpAddr>) {
    let original_host = headers.remove(HOST);
    strip_hop_by_hop(headers);

    if let Some(ip) = client_ip {
        let forwarded_for = match headers.get(X_FORWARDED_FOR).and_then(|v| v.to_str().ok()) {
            Some(existing) if !existing.trim().is_empty() => format!("{existing}, {ip}"),
            _ => ip.to_string(),
        };
        if let Ok(value) = HeaderValue::from_str(&forwarded_for) {
            headers.insert(X_FORWARDED_FOR, value);
        }
    }

    headers.insert(X_FORWARDED_PROTO, HeaderValue::from_static("http"));

    if let Some(host) = original_host {
        headers.insert(X_FORWARDED_HOST, host);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::header::{CONTENT_TYPE, TRANSFER_ENCODING};

    #[test]
    fn strips_listed_and_standard_hop_headers() {
        let mut headers = HeaderMap::new();
        headers.insert(CONNECTION, HeaderValue::from_static("keep-alive, x-session-hop"));
        headers.insert("keep-alive", HeaderValue::from_static("timeout=5"));
        headers.insert("x-session-hop", HeaderValue::from_static("1"));
        headers.insert(TRANSFER_ENCODING, HeaderValue::from_static("chunked"));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("text/plain"));

        strip_hop_by_hop(&mut headers);

        assert_eq!(headers.len(), 1);
        assert_eq!(headers[CONTENT_TYPE], "text/plain");
    }

    #[test]
    fn prepares_forwarding_headers() {
        let mut headers = HeaderMap::new();
        headers.insert(HOST, HeaderValue::from_static("proxy.local:8080"));
        headers.insert(X_FORWARDED_FOR, HeaderValue::from_static("203.0.113.7"));
        headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_static("multipart/form-data; boundary=----X"),
        );

        prepare_upstream(&mut headers, Some("10.0.0.2".parse().unwrap()));

        assert!(headers.get(HOST).is_none());
        assert_eq!(headers[X_FORWARDED_FOR], "203.0.113.7, 10.0.0.2");
        assert_eq!(headers[X_FORWARDED_HOST], "proxy.local:8080");
        assert_eq!(headers[X_FORWARDED_PROTO], "http");
        assert_eq!(headers[CONTENT_TYPE], "multipart/form-data; boundary=----X");
    }

    #[test]
    fn forwarded_for_without_prior_value() {
        let mut headers = HeaderMap::new();
        prepare_upstream(&mut headers, Some("127.0.0.1".parse().unwrap()));
        assert_eq!(headers[X_FORWARDED_FOR], "127.0.0.1");
        assert!(headers.get(X_FORWARDED_HOST).is_none());
    }
}
