//! Client code for offramp.
//!
//! This crate provides the HTTP implementation of the core's `Network`
//! trait, aimed at the deployment origin.

pub mod origin;

pub use origin::{OriginClient, OriginConfig};
