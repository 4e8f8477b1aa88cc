//! Synthetic offline responses.
//!
//! These are the last-resort answers when both cache and network come up
//! empty: a JSON envelope for data requests and a bare 503 for navigations
//! whose offline document was never cached.

use bytes::Bytes;

use crate::request::ResourceResponse;

/// Body of the offline data envelope, byte for byte.
pub const OFFLINE_ENVELOPE_JSON: &str =
    r#"{"error":"offline","message":"Content unavailable while offline. Please reconnect and try again."}"#;

/// The offline JSON envelope served for uncached data requests.
pub fn offline_data_envelope() -> ResourceResponse {
    ResourceResponse::new(
        503,
        Some("application/json".into()),
        Bytes::from_static(OFFLINE_ENVELOPE_JSON.as_bytes()),
    )
}

/// Bare-bones 503 for navigations when even the offline document is absent.
pub fn offline_document_missing() -> ResourceResponse {
    ResourceResponse::new(503, Some("text/plain".into()), Bytes::from_static(b"Offline"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_shape() {
        let resp = offline_data_envelope();
        assert_eq!(resp.status, 503);
        assert_eq!(resp.content_type.as_deref(), Some("application/json"));

        let value: serde_json::Value = serde_json::from_slice(&resp.body).unwrap();
        assert_eq!(value["error"], "offline");
        assert_eq!(
            value["message"],
            "Content unavailable while offline. Please reconnect and try again."
        );
    }

    #[test]
    fn test_document_missing_is_503() {
        let resp = offline_document_missing();
        assert_eq!(resp.status, 503);
        assert_eq!(&resp.body[..], b"Offline");
    }
}
