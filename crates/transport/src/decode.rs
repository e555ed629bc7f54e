//! Decode raw sidecar frames into core inbound events.

use {
    tracing::debug,
    warelay_common::types::{ChatKind, InboundEvent, MessageContent},
};

use crate::types::InboundFrame;

/// Display name used when the sender pushed none.
const FALLBACK_SENDER_NAME: &str = "User";

/// Turn a raw frame into an `InboundEvent`, resolving the content variant
/// once. Returns `None` for frames the pipeline never processes: our own
/// messages and frames without any text body.
#[must_use]
pub fn decode_inbound(frame: InboundFrame) -> Option<InboundEvent> {
    if frame.from_me {
        return None;
    }

    // Prefer the extended text field when both are present.
    let content = match (frame.extended_text, frame.conversation) {
        (Some(text), _) => MessageContent::Extended(text),
        (None, Some(text)) => MessageContent::Plain(text),
        (None, None) => MessageContent::Unsupported,
    };
    if content.is_empty() {
        debug!(chat = %frame.chat_jid, "dropping frame without text content");
        return None;
    }

    let chat_kind = ChatKind::from_jid(&frame.chat_jid);
    Some(InboundEvent {
        chat: frame.chat_jid,
        participant: frame.participant_jid,
        sender_name: frame
            .sender_name
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| FALLBACK_SENDER_NAME.to_string()),
        content,
        chat_kind,
        message_id: frame.message_id,
        mentioned_jids: frame.mentioned_jids,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use {super::*, crate::types::InboundFrame};

    fn frame() -> InboundFrame {
        InboundFrame {
            chat_jid: "33612345678@s.whatsapp.net".into(),
            message_id: "m1".into(),
            sender_name: Some("Alice".into()),
            conversation: Some("hi".into()),
            ..InboundFrame::default()
        }
    }

    #[test]
    fn plain_conversation_decodes_as_dm() {
        let event = decode_inbound(frame()).unwrap();
        assert_eq!(event.chat_kind, ChatKind::Dm);
        assert_eq!(event.text(), "hi");
        assert_eq!(event.sender_name, "Alice");
    }

    #[test]
    fn extended_text_wins_over_conversation() {
        let mut raw = frame();
        raw.extended_text = Some("quoted reply".into());
        let event = decode_inbound(raw).unwrap();
        assert_eq!(event.content, MessageContent::Extended("quoted reply".into()));
    }

    #[test]
    fn own_messages_are_dropped() {
        let mut raw = frame();
        raw.from_me = true;
        assert!(decode_inbound(raw).is_none());
    }

    #[test]
    fn textless_frames_are_dropped() {
        let mut raw = frame();
        raw.conversation = None;
        assert!(decode_inbound(raw).is_none());

        let mut raw = frame();
        raw.conversation = Some(String::new());
        assert!(decode_inbound(raw).is_none());
    }

    #[test]
    fn group_jid_classifies_as_group() {
        let mut raw = frame();
        raw.chat_jid = "12036304@g.us".into();
        raw.participant_jid = Some("33612345678@s.whatsapp.net".into());
        let event = decode_inbound(raw).unwrap();
        assert!(event.is_group());
        assert_eq!(event.admission_jid(), "33612345678@s.whatsapp.net");
    }

    #[test]
    fn missing_sender_name_falls_back() {
        let mut raw = frame();
        raw.sender_name = None;
        assert_eq!(decode_inbound(raw).unwrap().sender_name, "User");

        let mut raw = frame();
        raw.sender_name = Some(String::new());
        assert_eq!(decode_inbound(raw).unwrap().sender_name, "User");
    }
}
