//! Inbound event pipeline — the glue between the transport and the
//! responder.
//!
//! Flow per event: admission check → mark read → mention resolution →
//! routing decision → responder call → dispatch (mention-tagged in groups,
//! plain otherwise, with a plain fallback when the mention send fails).
//! Events are consumed one at a time; one event's failure never blocks the
//! next.

pub mod pipeline;

pub use pipeline::{APOLOGY_REPLY, Pipeline};
