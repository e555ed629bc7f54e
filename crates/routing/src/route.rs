use {
    tracing::debug,
    warelay_common::types::{InboundEvent, OutboundPayload},
    warelay_filter::local_part,
};

/// Messages starting with this prefix always qualify for a reply, even in
/// groups without a mention.
pub const COMMAND_PREFIX: char = '/';

/// The outcome of routing an inbound event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutingDecision {
    /// Whether the sender passed admission filtering.
    pub admitted: bool,
    /// Whether a reply should be produced at all.
    pub should_respond: bool,
    /// Whether the session's own identity was mentioned.
    pub mentioned: bool,
    /// Where the reply is addressed: the participant JID for group events
    /// (also the mention target), the chat JID for direct chats.
    pub addressee: String,
}

/// Route an inbound event given its admission and mention verdicts.
///
/// Total and pure: a group event with no participant resolves to an empty
/// addressee rather than an error.
#[must_use]
pub fn decide(event: &InboundEvent, admitted: bool, mentioned: bool) -> RoutingDecision {
    let should_respond = admitted
        && (!event.is_group() || mentioned || event.text().starts_with(COMMAND_PREFIX));

    let addressee = if event.is_group() {
        event.participant.clone().unwrap_or_default()
    } else {
        event.chat.clone()
    };

    if !should_respond {
        debug!(chat = %event.chat, admitted, mentioned, "dropping event without reply");
    }

    RoutingDecision {
        admitted,
        should_respond,
        mentioned,
        addressee,
    }
}

/// Build the mention-tagged reply for a group participant: a visible
/// `@<number>` tag prepended to the body, the participant attached as
/// mention target, and the original message quoted.
#[must_use]
pub fn mention_payload(
    event: &InboundEvent,
    decision: &RoutingDecision,
    reply: &str,
) -> OutboundPayload {
    OutboundPayload {
        to: event.chat.clone(),
        body: format!("@{} {reply}", local_part(&decision.addressee)),
        mention: Some(decision.addressee.clone()),
        quote: Some(event.message_id.clone()),
    }
}

/// Plain-text fallback reply carrying the sender's display name instead of a
/// mention. Depends on nothing that can fail, so it is always sendable when
/// the mention path is not.
#[must_use]
pub fn fallback_payload(event: &InboundEvent, reply: &str) -> OutboundPayload {
    OutboundPayload::plain(event.chat.clone(), format!("{}: {reply}", event.sender_name))
}
