//! Detect whether the session's own identity is mentioned in a group event.

use {tracing::debug, warelay_common::types::InboundEvent};

/// The transport number of a session JID, i.e. the portion before the
/// colon-delimited device suffix (`33612345678:12@s.whatsapp.net` →
/// `33612345678`).
#[must_use]
pub fn self_number(self_id: &str) -> &str {
    self_id.split(':').next().unwrap_or_default()
}

/// True when the session's own identity appears in the event's explicit
/// mention list.
///
/// Only meaningful for group events; direct chats always return `false`.
/// Fails closed: an empty mention list, or an unknown self identity (the
/// transport not yet connected), yields "not mentioned" rather than an
/// error.
#[must_use]
pub fn is_self_mentioned(event: &InboundEvent, self_id: &str) -> bool {
    if !event.is_group() {
        return false;
    }
    if self_id.is_empty() {
        debug!("self identity unknown, treating as not mentioned");
        return false;
    }

    let number = self_number(self_id);
    event
        .mentioned_jids
        .iter()
        .any(|jid| jid.contains(number) || jid.contains(self_id))
}
