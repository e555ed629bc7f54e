//! Wire types for the sidecar protocol (JSON frames over WebSocket).

use {
    serde::{Deserialize, Serialize},
    warelay_common::types::OutboundPayload,
};

/// Events the sidecar pushes to us.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SidecarEvent {
    /// Pairing QR payload; rendered for scanning while no session exists.
    Qr { qr: String },
    /// Session is up; `jid` is our own identity (with device suffix).
    Connected { jid: String },
    /// Connection dropped but the session is still paired — reconnect.
    Disconnected {
        #[serde(default)]
        reason: Option<String>,
    },
    /// The session was explicitly logged out — do not reconnect.
    LoggedOut {},
    /// An inbound chat message.
    Message(InboundFrame),
    /// Outcome of a send command we issued earlier.
    SendResult {
        request_id: String,
        success: bool,
        #[serde(default)]
        error: Option<String>,
    },
    /// Sidecar-side error not tied to a specific command.
    Error {
        #[serde(default)]
        message: Option<String>,
    },
}

/// Raw inbound message frame, before decoding into an `InboundEvent`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InboundFrame {
    pub chat_jid: String,
    pub message_id: String,
    #[serde(default)]
    pub participant_jid: Option<String>,
    #[serde(default)]
    pub sender_name: Option<String>,
    #[serde(default)]
    pub from_me: bool,
    /// Plain conversation text, when the message carries one.
    #[serde(default)]
    pub conversation: Option<String>,
    /// Extended text (replies, messages with mention metadata).
    #[serde(default)]
    pub extended_text: Option<String>,
    /// Explicit mention JIDs from the message's context info. Absent context
    /// decodes to an empty list, so mention resolution fails closed.
    #[serde(default)]
    pub mentioned_jids: Vec<String>,
}

/// Presence states we report to a chat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PresenceState {
    Composing,
    Paused,
}

/// Commands we push to the sidecar.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SidecarCommand {
    /// Send a message, optionally tagging a mention and quoting an earlier
    /// message.
    Send {
        request_id: String,
        to: String,
        body: String,
        #[serde(skip_serializing_if = "Vec::is_empty")]
        mentions: Vec<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        quote: Option<String>,
    },
    /// Update the typing indicator for a chat.
    Presence { to: String, state: PresenceState },
    /// Mark a message as read.
    Read { chat_jid: String, message_id: String },
}

impl SidecarCommand {
    /// Build a send command from an outbound payload. The caller picks the
    /// request id so it can await the correlated `SendResult`.
    #[must_use]
    pub fn send(payload: &OutboundPayload, request_id: String) -> Self {
        Self::Send {
            request_id,
            to: payload.to.clone(),
            body: payload.body.clone(),
            mentions: payload.mention.iter().cloned().collect(),
            quote: payload.quote.clone(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn inbound_message_frame_decodes() {
        let raw = r#"{
            "type": "message",
            "chat_jid": "12036304@g.us",
            "message_id": "ABCD",
            "participant_jid": "33612345678@s.whatsapp.net",
            "sender_name": "Alice",
            "extended_text": "@bot hello",
            "mentioned_jids": ["33699990000@s.whatsapp.net"]
        }"#;
        let event: SidecarEvent = serde_json::from_str(raw).unwrap();
        match event {
            SidecarEvent::Message(frame) => {
                assert_eq!(frame.chat_jid, "12036304@g.us");
                assert_eq!(frame.extended_text.as_deref(), Some("@bot hello"));
                assert_eq!(frame.mentioned_jids.len(), 1);
                assert!(!frame.from_me);
            },
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn missing_context_defaults_to_empty_mentions() {
        let raw = r#"{"type":"message","chat_jid":"a@s.whatsapp.net","message_id":"1","conversation":"hi"}"#;
        let event: SidecarEvent = serde_json::from_str(raw).unwrap();
        match event {
            SidecarEvent::Message(frame) => {
                assert!(frame.mentioned_jids.is_empty());
                assert_eq!(frame.conversation.as_deref(), Some("hi"));
            },
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn send_command_serializes_without_empty_fields() {
        let payload = OutboundPayload::plain("a@s.whatsapp.net", "hi");
        let json = serde_json::to_value(SidecarCommand::send(&payload, "r1".into())).unwrap();
        assert_eq!(json["type"], "send");
        assert_eq!(json["to"], "a@s.whatsapp.net");
        assert_eq!(json["request_id"], "r1");
        assert!(json.get("mentions").is_none());
        assert!(json.get("quote").is_none());
    }

    #[test]
    fn presence_serializes_lowercase() {
        let json = serde_json::to_value(SidecarCommand::Presence {
            to: "a@s.whatsapp.net".into(),
            state: PresenceState::Composing,
        })
        .unwrap();
        assert_eq!(json["state"], "composing");
    }
}
