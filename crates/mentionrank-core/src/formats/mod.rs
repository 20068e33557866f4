//! # Formats Module
//!
//! Serialization formats for the ranking store.
//! Byte placement (files, databases) is handled by persistence gateways.

mod persistence;

pub use persistence::*;
