//! On-disk encoding of the word store
//!
//! This module provides the JSON snapshot format used to persist the
//! dictionary between runs.

pub mod snapshot;

pub use snapshot::Snapshot;
