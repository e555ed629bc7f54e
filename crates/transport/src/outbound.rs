//! The outbound seam the gateway sends replies through.

use {async_trait::async_trait, tracing::debug, warelay_common::types::OutboundPayload};

use crate::{
    error::Result,
    sidecar::SidecarHandle,
    types::{PresenceState, SidecarCommand},
};

/// Transport operations the gateway needs. Implemented by the sidecar link;
/// mocked in gateway tests.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send a reply payload (plain, or mention-tagged with a quote).
    async fn send_payload(&self, payload: &OutboundPayload) -> Result<()>;

    /// Update the typing indicator for a chat.
    async fn send_presence(&self, to: &str, state: PresenceState) -> Result<()>;

    /// Mark a message as read.
    async fn mark_read(&self, chat_jid: &str, message_id: &str) -> Result<()>;

    /// Our own session JID, if connected yet.
    fn self_id(&self) -> Option<String>;
}

#[async_trait]
impl Transport for SidecarHandle {
    async fn send_payload(&self, payload: &OutboundPayload) -> Result<()> {
        debug!(to = %payload.to, mention = ?payload.mention, "sending message");
        self.send_message(payload).await
    }

    async fn send_presence(&self, to: &str, state: PresenceState) -> Result<()> {
        self.send(SidecarCommand::Presence {
            to: to.to_string(),
            state,
        })
        .await
    }

    async fn mark_read(&self, chat_jid: &str, message_id: &str) -> Result<()> {
        self.send(SidecarCommand::Read {
            chat_jid: chat_jid.to_string(),
            message_id: message_id.to_string(),
        })
        .await
    }

    fn self_id(&self) -> Option<String> {
        self.self_jid()
    }
}
