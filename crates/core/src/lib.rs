//! Core types and shared functionality for offramp.
//!
//! This crate provides:
//! - Versioned cache partition store with SQLite backend
//! - The cache coordinator (install/activate lifecycle, fetch routing)
//! - Unified error types
//! - Configuration structures

pub mod cache;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod fallback;
pub mod request;
pub mod routes;

pub use cache::{CacheDb, StoredResponse};
pub use config::CoordinatorConfig;
pub use coordinator::Coordinator;
pub use error::Error;
pub use request::{Destination, Network, RequestMode, ResourceRequest, ResourceResponse};
pub use routes::{PartitionKind, Strategy};
