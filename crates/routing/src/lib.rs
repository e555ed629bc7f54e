//! Decide whether and how an inbound event gets a reply.
//!
//! Response rules (evaluated in order, short-circuiting):
//! 1. Not admitted → drop, no responder call
//! 2. Direct chat → respond
//! 3. Group chat → respond only when mentioned or command-prefixed (`/`)
//!
//! Addressing: group replies target the participant (mention tag + quote),
//! direct replies target the chat itself.

pub mod mention;
pub mod route;

pub use {
    mention::is_self_mentioned,
    route::{RoutingDecision, decide, fallback_payload, mention_payload},
};
