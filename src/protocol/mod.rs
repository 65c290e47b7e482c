//! Redis protocol implementation
//!
//! This module provides RESP (REdis Serialization Protocol) parsing and the
//! dictionary command set served over it.

pub mod command;
pub mod dictionary;
pub mod ping;
pub mod resp;

pub use command::CommandFactory;
pub use resp::{Parser, Value};
