//! Shared message types used across all warelay crates.

pub mod types;

pub use types::{ChatKind, InboundEvent, MessageContent, OutboundPayload};
