//! Request identification.
//!
//! Every request gets an `x-request-id` (UUID v4) unless the caller already
//! sent one. The id is echoed on the response and recorded on the request span
//! together with the client address.

use std::net::{IpAddr, SocketAddr};

use axum::extract::ConnectInfo;
use axum::http::{HeaderName, Request};
use tower_http::request_id::{
    MakeRequestUuid, PropagateRequestIdLayer, RequestId, SetRequestIdLayer,
};

/// Header carrying the request id.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Proxy headers naming the original client, most specific first.
const CLIENT_IP_HEADERS: [&str; 3] = ["true-client-ip", "x-real-ip", "x-forwarded-for"];

/// Assigns request ids to incoming requests.
pub fn set_request_id_layer() -> SetRequestIdLayer<MakeRequestUuid> {
    SetRequestIdLayer::new(HeaderName::from_static(X_REQUEST_ID), MakeRequestUuid)
}

/// Copies the request id onto the response.
pub fn propagate_request_id_layer() -> PropagateRequestIdLayer {
    PropagateRequestIdLayer::new(HeaderName::from_static(X_REQUEST_ID))
}

/// Request metadata used for logging.
pub trait RequestExt {
    /// The id assigned by [`set_request_id_layer`].
    fn request_id(&self) -> &str;

    /// The originating client.
    ///
    /// A valid address in a proxy header wins over the peer address; for
    /// `x-forwarded-for` the first hop is used.
    fn client_ip(&self) -> Option<IpAddr>;
}

impl<B> RequestExt for Request<B> {
    fn request_id(&self) -> &str {
        self.extensions()
            .get::<RequestId>()
            .and_then(|id| id.header_value().to_str().ok())
            .or_else(|| {
                self.headers()
                    .get(X_REQUEST_ID)
                    .and_then(|value| value.to_str().ok())
            })
            .unwrap_or("unknown")
    }

    fn client_ip(&self) -> Option<IpAddr> {
        CLIENT_IP_HEADERS
            .iter()
            .find_map(|name| {
                let value = self.headers().get(*name)?.to_str().ok()?;
                value.split(',').next()?.trim().parse().ok()
            })
            .or_else(|| {
                self.extensions()
                    .get::<ConnectInfo<SocketAddr>>()
                    .map(|ConnectInfo(peer)| peer.ip())
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;

    fn from_peer(peer: &str) -> axum::http::request::Builder {
        let peer: SocketAddr = peer.parse().unwrap();
        let mut builder = Request::builder();
        builder
            .extensions_mut()
            .unwrap()
            .insert(ConnectInfo(peer));
        builder
    }

    #[test]
    fn falls_back_to_header_then_unknown() {
        let request = Request::builder()
            .header(X_REQUEST_ID, "abc-123")
            .body(Body::empty())
            .unwrap();
        assert_eq!(request.request_id(), "abc-123");

        let request = Request::builder().body(Body::empty()).unwrap();
        assert_eq!(request.request_id(), "unknown");
    }

    #[test]
    fn client_ip_is_the_peer_without_proxy_headers() {
        let request = from_peer("10.0.0.5:41000").body(Body::empty()).unwrap();
        assert_eq!(request.client_ip(), Some("10.0.0.5".parse().unwrap()));

        let request = Request::builder().body(Body::empty()).unwrap();
        assert_eq!(request.client_ip(), None);
    }

    #[test]
    fn proxy_headers_override_the_peer() {
        let request = from_peer("10.0.0.5:41000")
            .header("x-forwarded-for", "203.0.113.7, 10.0.0.1")
            .body(Body::empty())
            .unwrap();
        assert_eq!(request.client_ip(), Some("203.0.113.7".parse().unwrap()));

        let request = from_peer("10.0.0.5:41000")
            .header("x-forwarded-for", "203.0.113.7")
            .header("x-real-ip", "198.51.100.2")
            .body(Body::empty())
            .unwrap();
        assert_eq!(request.client_ip(), Some("198.51.100.2".parse().unwrap()));

        let request = from_peer("10.0.0.5:41000")
            .header("x-real-ip", "198.51.100.2")
            .header("true-client-ip", "2001:db8::1")
            .body(Body::empty())
            .unwrap();
        assert_eq!(request.client_ip(), Some("2001:db8::1".parse().unwrap()));
    }

    #[test]
    fn malformed_proxy_header_is_ignored() {
        let request = from_peer("10.0.0.5:41000")
            .header("x-real-ip", "not-an-ip")
            .body(Body::empty())
            .unwrap();
        assert_eq!(request.client_ip(), Some("10.0.0.5".parse().unwrap()));
    }
}
