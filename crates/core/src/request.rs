//! Request and response exchange types, plus the network seam.
//!
//! The coordinator never talks to the wire directly; it fetches through the
//! [`Network`] trait so hosts can plug in a real HTTP client and tests can
//! plug in a programmable fake.

use async_trait::async_trait;
use bytes::Bytes;
use url::Url;

use crate::Error;

/// How a request intends to use its response.
///
/// Mirrors the distinction between loading a full document and loading a
/// subresource; only navigations get the navigation strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestMode {
    /// A full page/document load.
    Navigate,
    /// Anything else: stylesheet, script, image, data fetch, ...
    Subresource,
}

/// The resource class a request is loading, when the host can tell.
///
/// Style/script/image/font requests route to the asset partition even when
/// their path falls outside the configured asset directories.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Destination {
    Document,
    Style,
    Script,
    Image,
    Font,
    Other,
}

/// An intercepted resource request.
#[derive(Debug, Clone)]
pub struct ResourceRequest {
    /// HTTP method, uppercase. Only GET requests are routed through caches.
    pub method: String,
    /// Absolute request URL.
    pub url: Url,
    pub mode: RequestMode,
    pub destination: Destination,
    /// Forwarded body for pass-through of non-GET methods.
    pub body: Option<Bytes>,
}

impl ResourceRequest {
    /// A plain GET subresource request.
    pub fn get(url: Url) -> Self {
        Self { method: "GET".into(), url, mode: RequestMode::Subresource, destination: Destination::Other, body: None }
    }

    /// A GET navigation (document load) request.
    pub fn navigate(url: Url) -> Self {
        Self { method: "GET".into(), url, mode: RequestMode::Navigate, destination: Destination::Document, body: None }
    }

    pub fn with_destination(mut self, destination: Destination) -> Self {
        self.destination = destination;
        self
    }

    pub fn is_get(&self) -> bool {
        self.method == "GET"
    }
}

/// A resource response, from the network or from a cache partition.
#[derive(Debug, Clone)]
pub struct ResourceResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: Bytes,
}

impl ResourceResponse {
    pub fn new(status: u16, content_type: Option<String>, body: Bytes) -> Self {
        Self { status, content_type, body }
    }

    /// Whether the status is in the 2xx range. Only ok responses are cached.
    pub fn is_ok(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// The coordinator's view of the network.
///
/// `fetch` resolves for any HTTP response, including error statuses; it
/// returns `Err(Error::Network)` only when the transport itself fails
/// (origin unreachable, timeout, connection reset).
#[async_trait]
pub trait Network: Send + Sync {
    async fn fetch(&self, request: &ResourceRequest) -> Result<ResourceResponse, Error>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_request_defaults() {
        let req = ResourceRequest::get(Url::parse("https://site.test/assets/css/main.css").unwrap());
        assert!(req.is_get());
        assert_eq!(req.mode, RequestMode::Subresource);
        assert_eq!(req.destination, Destination::Other);
        assert!(req.body.is_none());
    }

    #[test]
    fn test_navigate_request() {
        let req = ResourceRequest::navigate(Url::parse("https://site.test/").unwrap());
        assert_eq!(req.mode, RequestMode::Navigate);
        assert_eq!(req.destination, Destination::Document);
    }

    #[test]
    fn test_response_ok_range() {
        assert!(ResourceResponse::new(200, None, Bytes::new()).is_ok());
        assert!(ResourceResponse::new(204, None, Bytes::new()).is_ok());
        assert!(!ResourceResponse::new(304, None, Bytes::new()).is_ok());
        assert!(!ResourceResponse::new(404, None, Bytes::new()).is_ok());
        assert!(!ResourceResponse::new(503, None, Bytes::new()).is_ok());
    }
}
