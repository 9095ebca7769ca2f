//! Client context extractor
//!
//! Device fingerprint, user agent and client address of the request.

use std::convert::Infallible;
use std::net::SocketAddr;

use axum::{
    async_trait,
    extract::{ConnectInfo, FromRequestParts},
    http::{header, request::Parts, HeaderMap},
};
use deck_common::derive_fingerprint;
use deck_service::services::ClientInfo;

/// Forwarded-for header set by reverse proxies
const FORWARDED_FOR: &str = "x-forwarded-for";

#[derive(Debug, Clone)]
pub struct ClientContext(pub ClientInfo);

#[async_trait]
impl<S> FromRequestParts<S> for ClientContext
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let peer = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| *addr);

        Ok(ClientContext(client_info(&parts.headers, peer)))
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: &header::HeaderName) -> &'a str {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("")
}

/// First address in `x-forwarded-for`, else the peer address
fn client_ip(headers: &HeaderMap, peer: Option<SocketAddr>) -> String {
    headers
        .get(FORWARDED_FOR)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(str::trim)
        .filter(|ip| !ip.is_empty())
        .map(String::from)
        .or_else(|| peer.map(|addr| addr.ip().to_string()))
        .unwrap_or_else(|| "unknown".to_string())
}

fn client_info(headers: &HeaderMap, peer: Option<SocketAddr>) -> ClientInfo {
    let user_agent = header_str(headers, &header::USER_AGENT);

    ClientInfo {
        fingerprint: derive_fingerprint(
            user_agent,
            header_str(headers, &header::ACCEPT_LANGUAGE),
            header_str(headers, &header::ACCEPT_ENCODING),
        ),
        user_agent: user_agent.to_string(),
        ip_address: client_ip(headers, peer),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut headers = HeaderMap::new();
        for (name, value) in pairs {
            headers.insert(*name, HeaderValue::from_static(value));
        }
        headers
    }

    #[test]
    fn test_forwarded_for_wins() {
        let peer = Some(SocketAddr::from(([10, 0, 0, 1], 4000)));
        let forwarded = headers(&[("x-forwarded-for", "203.0.113.7, 10.0.0.1")]);

        assert_eq!(client_ip(&forwarded, peer), "203.0.113.7");
        assert_eq!(client_ip(&HeaderMap::new(), peer), "10.0.0.1");
        assert_eq!(client_ip(&HeaderMap::new(), None), "unknown");
    }

    #[test]
    fn test_fingerprint_follows_headers() {
        let laptop = headers(&[
            ("user-agent", "Firefox"),
            ("accept-language", "en-US"),
            ("accept-encoding", "gzip"),
        ]);
        let phone = headers(&[
            ("user-agent", "Safari"),
            ("accept-language", "en-US"),
            ("accept-encoding", "gzip"),
        ]);

        let a = client_info(&laptop, None);
        let b = client_info(&laptop, None);
        let c = client_info(&phone, None);

        assert_eq!(a.fingerprint, b.fingerprint);
        assert_ne!(a.fingerprint, c.fingerprint);
        assert_eq!(a.user_agent, "Firefox");
    }
}
