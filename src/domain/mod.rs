//! Core domain types for the order-history pipeline.
//!
//! - `order`: the normalized record handed to callers
//! - `wire`: upstream request/response payloads

pub mod order;
pub mod wire;

pub use order::{OrderField, OrderRecord};
pub use wire::RawRecord;
