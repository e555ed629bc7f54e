use std::{sync::Arc, time::Duration};

use {
    rand::Rng,
    tokio::{sync::mpsc, time::sleep},
    tracing::{debug, error, info, warn},
};

use {
    warelay_common::types::{InboundEvent, OutboundPayload},
    warelay_config::TimingConfig,
    warelay_filter::ContactFilter,
    warelay_responder::{ChatRequest, ResponderClient},
    warelay_routing::{RoutingDecision, decide, fallback_payload, is_self_mentioned, mention_payload},
    warelay_transport::{PresenceState, Transport},
};

/// Fixed reply sent when the responder call fails; the single catch point,
/// no retry.
pub const APOLOGY_REPLY: &str =
    "Sorry, I'm running into a technical problem. Please try again later.";

/// The per-event processing chain.
///
/// Filter state is built once and read-only; the pipeline owns no mutable
/// state between events.
pub struct Pipeline {
    filter: ContactFilter,
    responder: ResponderClient,
    transport: Arc<dyn Transport>,
    timing: TimingConfig,
}

impl Pipeline {
    #[must_use]
    pub fn new(
        filter: ContactFilter,
        responder: ResponderClient,
        transport: Arc<dyn Transport>,
        timing: TimingConfig,
    ) -> Self {
        Self {
            filter,
            responder,
            transport,
            timing,
        }
    }

    /// Consume the inbound event stream until it closes.
    pub async fn run(&self, mut events: mpsc::Receiver<InboundEvent>) {
        info!(
            allow = self.filter.included_only().len(),
            deny = self.filter.excluded().len(),
            "pipeline started"
        );
        while let Some(event) = events.recv().await {
            self.handle_event(event).await;
        }
        info!("event stream closed, pipeline stopped");
    }

    /// Process a single inbound event end to end. Never errors: every
    /// failure path degrades to a log line or a fallback reply.
    pub async fn handle_event(&self, event: InboundEvent) {
        info!(
            chat = %event.chat,
            sender = %event.sender_name,
            kind = ?event.chat_kind,
            "incoming message: {}",
            event.text(),
        );

        if let Err(reason) = self.filter.check(event.admission_jid(), event.is_group()) {
            info!(%reason, jid = %event.admission_jid(), "message ignored");
            return;
        }

        if let Err(e) = self.transport.mark_read(&event.chat, &event.message_id).await {
            warn!(error = %e, "failed to mark message read");
        }

        let self_id = self.transport.self_id().unwrap_or_default();
        let mentioned = is_self_mentioned(&event, &self_id);
        let decision = decide(&event, true, mentioned);
        if !decision.should_respond {
            debug!(chat = %event.chat, "group message without mention or command, ignoring");
            return;
        }
        if mentioned {
            debug!(chat = %event.chat, "mentioned in group");
        }

        // Small fixed pause before doing anything visible.
        sleep(Duration::from_millis(self.timing.pre_reply_delay_ms)).await;

        self.spawn_typing(event.chat.clone());

        let request = ChatRequest {
            message: event.text().to_string(),
            user_id: event.chat.clone(),
            user_name: event.sender_name.clone(),
            is_group: event.is_group(),
            is_mentioned: mentioned,
            participant_id: event.participant.clone(),
        };

        let reply = match self.responder.ask(&request).await {
            Ok(reply) => {
                self.thinking_delay().await;
                reply
            },
            Err(e) => {
                error!(error = %e, "responder call failed");
                // The apology goes out plain, never mention-tagged.
                let apology = OutboundPayload::plain(event.chat.clone(), APOLOGY_REPLY);
                if let Err(e) = self.transport.send_payload(&apology).await {
                    error!(error = %e, "apology send failed");
                }
                return;
            },
        };

        self.dispatch(&event, &decision, &reply).await;
    }

    /// Send the reply. In a group with a known participant the payload
    /// carries a mention tag and quotes the original message; if that send
    /// fails we fall back to exactly one plain send with the display name,
    /// which depends on nothing that can fail to build.
    async fn dispatch(&self, event: &InboundEvent, decision: &RoutingDecision, reply: &str) {
        if event.is_group() && event.participant.is_some() {
            let payload = mention_payload(event, decision, reply);
            match self.transport.send_payload(&payload).await {
                Ok(()) => {
                    info!(to = %payload.to, "reply sent with mention");
                    return;
                },
                Err(e) => {
                    warn!(error = %e, "mention send failed, falling back to plain reply");
                },
            }
            let fallback = fallback_payload(event, reply);
            if let Err(e) = self.transport.send_payload(&fallback).await {
                error!(error = %e, "fallback send failed");
            }
        } else {
            let payload = OutboundPayload::plain(event.chat.clone(), reply);
            if let Err(e) = self.transport.send_payload(&payload).await {
                error!(error = %e, "reply send failed");
            }
        }
    }

    /// Typing indicator as a detached task: composing now, paused after the
    /// configured duration. Never joined; failures surface only as logs.
    fn spawn_typing(&self, chat: String) {
        let transport = Arc::clone(&self.transport);
        let duration = Duration::from_millis(self.timing.typing_duration_ms);
        tokio::spawn(async move {
            if let Err(e) = transport.send_presence(&chat, PresenceState::Composing).await {
                debug!(error = %e, "typing indicator failed");
                return;
            }
            sleep(duration).await;
            if let Err(e) = transport.send_presence(&chat, PresenceState::Paused).await {
                debug!(error = %e, "typing pause failed");
            }
        });
    }

    /// Randomized human-feel pause between receiving the responder's reply
    /// and dispatching it.
    async fn thinking_delay(&self) {
        let min = self.timing.thinking_min_ms;
        let max = self.timing.thinking_max_ms.max(min);
        let ms = rand::rng().random_range(min..=max);
        sleep(Duration::from_millis(ms)).await;
    }
}
