use axum::async_trait;
use axum::extract::{ConnectInfo, FromRequestParts};
use axum::http::header::USER_AGENT;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use std::convert::Infallible;
use std::net::SocketAddr;

/// Who is asking: network identity plus agent string.
///
/// Identity is the first `X-Forwarded-For` entry, else the peer address
/// (when the server was started with connect info), else `"unknown"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientIdentity {
    pub identity: String,
    pub agent: String,
}

impl ClientIdentity {
    pub fn from_parts(headers: &HeaderMap, peer: Option<SocketAddr>) -> Self {
        let forwarded = headers
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string);
        let identity = forwarded
            .or_else(|| peer.map(|addr| addr.ip().to_string()))
            .unwrap_or_else(|| "unknown".to_string());
        let agent = headers
            .get(USER_AGENT)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();
        Self { identity, agent }
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for ClientIdentity
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let peer = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| *addr);
        Ok(Self::from_parts(&parts.headers, peer))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_forwarded_for_wins() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static("203.0.113.7, 10.0.0.1"));
        headers.insert(USER_AGENT, HeaderValue::from_static("Mozilla/5.0"));
        let peer: SocketAddr = "127.0.0.1:5000".parse().unwrap();

        let id = ClientIdentity::from_parts(&headers, Some(peer));
        assert_eq!(id.identity, "203.0.113.7");
        assert_eq!(id.agent, "Mozilla/5.0");
    }

    #[test]
    fn test_peer_then_unknown() {
        let headers = HeaderMap::new();
        let peer: SocketAddr = "192.0.2.1:443".parse().unwrap();
        assert_eq!(ClientIdentity::from_parts(&headers, Some(peer)).identity, "192.0.2.1");

        let id = ClientIdentity::from_parts(&headers, None);
        assert_eq!(id.identity, "unknown");
        assert_eq!(id.agent, "");
    }
}
