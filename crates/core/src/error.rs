//! Unified error types for offramp.

use tokio_rusqlite::rusqlite;

/// Unified error types for the offramp workspace.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Database operation failed.
    #[error("cache storage error: {0}")]
    Database(tokio_rusqlite::Error),

    /// Migration failed to apply.
    #[error("cache storage error: migration failed: {0}")]
    MigrationFailed(String),

    /// A precache manifest URL could not be fetched with an ok status.
    ///
    /// Install is all-or-nothing: one of these aborts the whole step.
    #[error("precache failed for {url}: {detail}")]
    Precache { url: String, detail: String },

    /// The network (origin) was unreachable.
    ///
    /// HTTP error statuses are *not* this variant; a resolved 404 is a
    /// successful fetch. This is the transport-level failure the offline
    /// fallbacks recover from.
    #[error("network unreachable: {0}")]
    Network(String),

    /// Invalid URL or request target.
    #[error("invalid url: {0}")]
    InvalidUrl(String),
}

impl From<tokio_rusqlite::Error<Error>> for Error {
    fn from(err: tokio_rusqlite::Error<Error>) -> Self {
        match err {
            tokio_rusqlite::Error::Error(e) => e,
            tokio_rusqlite::Error::ConnectionClosed => Error::Database(tokio_rusqlite::Error::ConnectionClosed),
            tokio_rusqlite::Error::Close(c) => Error::Database(tokio_rusqlite::Error::Close(c)),
            _ => Error::Database(tokio_rusqlite::Error::ConnectionClosed),
        }
    }
}

impl From<tokio_rusqlite::Error<rusqlite::Error>> for Error {
    fn from(err: tokio_rusqlite::Error<rusqlite::Error>) -> Self {
        Error::Database(err)
    }
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Error::Database(tokio_rusqlite::Error::Error(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_precache_display() {
        let err = Error::Precache { url: "/assets/data/events.json".into(), detail: "status 404".into() };
        assert!(err.to_string().contains("/assets/data/events.json"));
        assert!(err.to_string().contains("status 404"));
    }

    #[test]
    fn test_network_display() {
        let err = Error::Network("connection refused".into());
        assert!(err.to_string().contains("network unreachable"));
    }
}
