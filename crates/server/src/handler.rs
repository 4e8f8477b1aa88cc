//! HTTP surface: every inbound request becomes a coordinator fetch.
//!
//! Request classification leans on the Sec-Fetch-Mode / Sec-Fetch-Dest
//! headers when the agent sends them, with Accept/extension heuristics as
//! the fallback for agents that don't.

use std::sync::Arc;

use axum::{
    Router,
    body::{Body, to_bytes},
    extract::{Request, State},
    http::{HeaderMap, Method, StatusCode, Uri, header},
    response::Response,
};
use url::Url;

use offramp_core::{Coordinator, Destination, RequestMode, ResourceRequest, ResourceResponse};

use crate::error;

/// Cap on forwarded non-GET bodies.
const MAX_FORWARD_BODY_BYTES: usize = 5 * 1024 * 1024;

/// Build the proxy router: one fallback route catches every path.
pub fn router(coordinator: Arc<Coordinator>) -> Router {
    Router::new().fallback(handle).with_state(coordinator)
}

async fn handle(State(coordinator): State<Arc<Coordinator>>, request: Request) -> Response {
    let (parts, body) = request.into_parts();

    let url = target_url(&coordinator.config().origin_url, &parts.uri);
    let destination = classify_destination(&parts.headers, parts.uri.path());
    let mode = classify_mode(&parts.headers, destination);

    let forwarded_body = if parts.method == Method::GET || parts.method == Method::HEAD {
        None
    } else {
        match to_bytes(body, MAX_FORWARD_BODY_BYTES).await {
            Ok(bytes) if bytes.is_empty() => None,
            Ok(bytes) => Some(bytes),
            Err(err) => {
                tracing::warn!(error = %err, "failed to read request body");
                return error::plain(StatusCode::BAD_REQUEST, "unreadable request body");
            }
        }
    };

    let resource_request = ResourceRequest {
        method: parts.method.as_str().to_string(),
        url,
        mode,
        destination,
        body: forwarded_body,
    };

    match coordinator.handle_fetch(&resource_request).await {
        Ok(response) => into_http(response),
        Err(err) => error::into_response(&err),
    }
}

/// Rebase the inbound path and query onto the origin.
fn target_url(origin: &Url, uri: &Uri) -> Url {
    let mut url = origin.clone();
    url.set_path(uri.path());
    url.set_query(uri.query());
    url
}

fn header_value<'h>(headers: &'h HeaderMap, name: &str) -> Option<&'h str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

fn classify_mode(headers: &HeaderMap, destination: Destination) -> RequestMode {
    match header_value(headers, "sec-fetch-mode") {
        Some("navigate") => RequestMode::Navigate,
        Some(_) => RequestMode::Subresource,
        // No fetch metadata: a document-shaped request is a navigation.
        None if destination == Destination::Document => RequestMode::Navigate,
        None => RequestMode::Subresource,
    }
}

fn classify_destination(headers: &HeaderMap, path: &str) -> Destination {
    if let Some(dest) = header_value(headers, "sec-fetch-dest") {
        return match dest {
            "document" => Destination::Document,
            "style" => Destination::Style,
            "script" | "worker" => Destination::Script,
            "image" => Destination::Image,
            "font" => Destination::Font,
            _ => Destination::Other,
        };
    }

    match path.rsplit_once('.').map(|(_, ext)| ext) {
        Some("css") => Destination::Style,
        Some("js" | "mjs") => Destination::Script,
        Some("png" | "jpg" | "jpeg" | "gif" | "svg" | "webp" | "ico") => Destination::Image,
        Some("woff" | "woff2" | "ttf" | "otf") => Destination::Font,
        Some("html" | "htm") => Destination::Document,
        // Extensionless paths count as documents when the agent asks for
        // HTML.
        None if accepts_html(headers) => Destination::Document,
        _ => Destination::Other,
    }
}

fn accepts_html(headers: &HeaderMap) -> bool {
    header_value(headers, header::ACCEPT.as_str()).is_some_and(|accept| accept.contains("text/html"))
}

fn into_http(response: ResourceResponse) -> Response {
    let mut builder = Response::builder().status(response.status);
    if let Some(content_type) = &response.content_type {
        builder = builder.header(header::CONTENT_TYPE, content_type);
    }
    match builder.body(Body::from(response.body)) {
        Ok(http_response) => http_response,
        Err(err) => {
            tracing::error!(error = %err, "failed to build response");
            error::plain(StatusCode::INTERNAL_SERVER_ERROR, "internal error")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use bytes::Bytes;

    fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(*name, HeaderValue::from_static(value));
        }
        map
    }

    #[test]
    fn test_target_url_rebases_path_and_query() {
        let origin = Url::parse("http://127.0.0.1:8000/").unwrap();
        let uri: Uri = "/pages/events.html?tab=2".parse().unwrap();
        let url = target_url(&origin, &uri);
        assert_eq!(url.as_str(), "http://127.0.0.1:8000/pages/events.html?tab=2");
    }

    #[test]
    fn test_destination_from_fetch_metadata() {
        assert_eq!(
            classify_destination(&headers(&[("sec-fetch-dest", "style")]), "/anything"),
            Destination::Style
        );
        assert_eq!(
            classify_destination(&headers(&[("sec-fetch-dest", "document")]), "/pages/map.html"),
            Destination::Document
        );
        assert_eq!(
            classify_destination(&headers(&[("sec-fetch-dest", "empty")]), "/assets/data/events.json"),
            Destination::Other
        );
    }

    #[test]
    fn test_destination_from_extension() {
        let none = HeaderMap::new();
        assert_eq!(classify_destination(&none, "/assets/css/main.css"), Destination::Style);
        assert_eq!(classify_destination(&none, "/assets/js/app.js"), Destination::Script);
        assert_eq!(classify_destination(&none, "/assets/icons/icon-192.png"), Destination::Image);
        assert_eq!(classify_destination(&none, "/fonts/inter.woff2"), Destination::Font);
        assert_eq!(classify_destination(&none, "/index.html"), Destination::Document);
        assert_eq!(classify_destination(&none, "/assets/data/events.json"), Destination::Other);
    }

    #[test]
    fn test_extensionless_path_with_html_accept_is_document() {
        let html = headers(&[("accept", "text/html,application/xhtml+xml")]);
        assert_eq!(classify_destination(&html, "/dashboard"), Destination::Document);

        let json = headers(&[("accept", "application/json")]);
        assert_eq!(classify_destination(&json, "/dashboard"), Destination::Other);
    }

    #[test]
    fn test_mode_from_fetch_metadata() {
        assert_eq!(
            classify_mode(&headers(&[("sec-fetch-mode", "navigate")]), Destination::Document),
            RequestMode::Navigate
        );
        assert_eq!(
            classify_mode(&headers(&[("sec-fetch-mode", "no-cors")]), Destination::Document),
            RequestMode::Subresource
        );
    }

    #[test]
    fn test_mode_falls_back_to_destination() {
        let none = HeaderMap::new();
        assert_eq!(classify_mode(&none, Destination::Document), RequestMode::Navigate);
        assert_eq!(classify_mode(&none, Destination::Script), RequestMode::Subresource);
    }

    #[test]
    fn test_into_http_carries_status_and_content_type() {
        let response = into_http(ResourceResponse::new(
            503,
            Some("application/json".into()),
            Bytes::from_static(b"{}"),
        ));
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE),
            Some(&HeaderValue::from_static("application/json"))
        );
    }
}
