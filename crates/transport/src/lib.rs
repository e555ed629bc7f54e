//! WhatsApp transport boundary: a Baileys sidecar process speaking JSON over
//! WebSocket.
//!
//! The sidecar owns the WhatsApp session (credentials, pairing, the wire
//! protocol); this crate owns the link to it — decoding its events into
//! [`warelay_common::types::InboundEvent`], reconnecting when the session
//! drops without being logged out, and exposing the [`Transport`] trait the
//! gateway sends replies through.

pub mod decode;
pub mod error;
pub mod outbound;
pub mod sidecar;
pub mod types;

pub use {
    error::{Error, Result},
    outbound::Transport,
    sidecar::{SidecarHandle, connect_with_retry},
    types::{InboundFrame, PresenceState, SidecarCommand, SidecarEvent},
};
