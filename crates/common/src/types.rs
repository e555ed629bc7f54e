//! Core message types shared between the transport boundary, the routing
//! engine, and the gateway pipeline.

use serde::{Deserialize, Serialize};

/// Domain suffix WhatsApp uses for group JIDs.
pub const GROUP_JID_SUFFIX: &str = "@g.us";

/// Kind of conversation an event belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatKind {
    /// Direct one-to-one chat.
    Dm,
    /// Group chat; messages carry a participant JID for the actual sender.
    Group,
}

impl ChatKind {
    /// Classify a chat JID by its domain suffix.
    #[must_use]
    pub fn from_jid(jid: &str) -> Self {
        if jid.ends_with(GROUP_JID_SUFFIX) {
            Self::Group
        } else {
            Self::Dm
        }
    }
}

/// Message body, resolved once at ingestion instead of probing optional
/// transport fields ad hoc.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageContent {
    /// Plain conversation text.
    Plain(String),
    /// Extended text message (the form WhatsApp uses for replies/quotes and
    /// messages carrying mention metadata).
    Extended(String),
    /// Anything we don't relay (media, reactions, protocol messages).
    Unsupported,
}

impl MessageContent {
    /// The textual body, empty for unsupported content.
    #[must_use]
    pub fn text(&self) -> &str {
        match self {
            Self::Plain(text) | Self::Extended(text) => text,
            Self::Unsupported => "",
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.text().is_empty()
    }
}

/// A single inbound chat event as the core pipeline sees it.
///
/// Created per event at the transport boundary and discarded once the reply
/// is dispatched or the event is dropped; nothing here persists.
#[derive(Debug, Clone)]
pub struct InboundEvent {
    /// Chat JID the message arrived in (send replies here).
    pub chat: String,
    /// Sender JID within a group; `None` for direct chats.
    pub participant: Option<String>,
    /// Display name pushed by the sender, used in mention fallbacks.
    pub sender_name: String,
    /// Resolved message body.
    pub content: MessageContent,
    /// Conversation kind derived from the chat JID.
    pub chat_kind: ChatKind,
    /// Opaque message reference, used for quoting and mark-as-read.
    pub message_id: String,
    /// Explicit mention JIDs surfaced by the transport; empty when the event
    /// carried no mention metadata.
    pub mentioned_jids: Vec<String>,
}

impl InboundEvent {
    #[must_use]
    pub fn is_group(&self) -> bool {
        self.chat_kind == ChatKind::Group
    }

    /// The textual body of the event.
    #[must_use]
    pub fn text(&self) -> &str {
        self.content.text()
    }

    /// The identifier admission filtering applies to: the participant for
    /// group events, the chat itself for direct chats.
    #[must_use]
    pub fn admission_jid(&self) -> &str {
        if self.is_group() {
            self.participant.as_deref().unwrap_or_default()
        } else {
            &self.chat
        }
    }
}

/// What the gateway hands to the transport for delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundPayload {
    /// Destination chat JID.
    pub to: String,
    /// Reply body.
    pub body: String,
    /// JID to tag as a mention, if any.
    pub mention: Option<String>,
    /// Message ID to quote, if any.
    pub quote: Option<String>,
}

impl OutboundPayload {
    /// A plain text payload with no mention or quote attached.
    #[must_use]
    pub fn plain(to: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            to: to.into(),
            body: body.into(),
            mention: None,
            quote: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chat_kind_from_jid() {
        assert_eq!(ChatKind::from_jid("12036304@g.us"), ChatKind::Group);
        assert_eq!(ChatKind::from_jid("33612345678@s.whatsapp.net"), ChatKind::Dm);
        assert_eq!(ChatKind::from_jid(""), ChatKind::Dm);
    }

    #[test]
    fn admission_jid_prefers_participant_in_groups() {
        let event = InboundEvent {
            chat: "group@g.us".into(),
            participant: Some("33612345678@s.whatsapp.net".into()),
            sender_name: "Alice".into(),
            content: MessageContent::Plain("hi".into()),
            chat_kind: ChatKind::Group,
            message_id: "m1".into(),
            mentioned_jids: Vec::new(),
        };
        assert_eq!(event.admission_jid(), "33612345678@s.whatsapp.net");
    }

    #[test]
    fn admission_jid_degenerates_when_participant_missing() {
        let event = InboundEvent {
            chat: "group@g.us".into(),
            participant: None,
            sender_name: "Alice".into(),
            content: MessageContent::Plain("hi".into()),
            chat_kind: ChatKind::Group,
            message_id: "m1".into(),
            mentioned_jids: Vec::new(),
        };
        // Degenerate but never panicking; the filter evaluates it like any
        // other identifier.
        assert_eq!(event.admission_jid(), "");
    }

    #[test]
    fn unsupported_content_is_empty() {
        assert!(MessageContent::Unsupported.is_empty());
        assert_eq!(MessageContent::Unsupported.text(), "");
        assert!(!MessageContent::Plain("x".into()).is_empty());
    }
}
