//! SQLite-backed store for versioned cache partitions.
//!
//! This module provides the persistent partition store using SQLite with
//! async access via tokio-rusqlite. It supports:
//!
//! - Named, versioned partitions holding path -> response entries
//! - Partition enumeration and en-masse deletion (activation cleanup)
//! - Transactional batch writes (all-or-nothing precache)
//! - Automatic schema migrations
//! - WAL mode for concurrent access

pub mod connection;
pub mod entries;
pub mod migrations;

pub use crate::Error;

pub use connection::CacheDb;
pub use entries::StoredResponse;
