//! WebSocket link to the Baileys sidecar.
//!
//! A single task owns the socket: it forwards queued commands out, decodes
//! inbound frames into the event channel, and supervises the connection —
//! reconnecting with backoff when the session drops, stopping for good when
//! the sidecar reports an explicit logout.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex, RwLock},
};

use {
    futures_util::{SinkExt, StreamExt},
    tokio::{
        net::TcpStream,
        sync::{mpsc, oneshot},
        time::{Duration, sleep, timeout},
    },
    tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async, tungstenite::Message},
    tokio_util::sync::CancellationToken,
    tracing::{debug, info, warn},
};

use warelay_common::types::{InboundEvent, OutboundPayload};

use crate::{
    decode::decode_inbound,
    error::{Error, Result},
    types::{SidecarCommand, SidecarEvent},
};

const COMMAND_BUFFER: usize = 64;
const EVENT_BUFFER: usize = 64;
const INITIAL_RETRY_DELAY: Duration = Duration::from_millis(500);
const MAX_RETRY_DELAY: Duration = Duration::from_secs(10);
const SEND_ACK_TIMEOUT: Duration = Duration::from_secs(30);

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Waiters for `SendResult` acks, keyed by request id.
type PendingSends = Arc<Mutex<HashMap<String, oneshot::Sender<Result<()>>>>>;

/// Cloneable handle to the sidecar link. Commands are queued onto the link
/// task; message sends additionally await the sidecar's delivery verdict.
#[derive(Clone)]
pub struct SidecarHandle {
    commands: mpsc::Sender<SidecarCommand>,
    self_jid: Arc<RwLock<Option<String>>>,
    pending: PendingSends,
    cancel: CancellationToken,
}

impl SidecarHandle {
    /// Queue a command for the sidecar.
    pub async fn send(&self, command: SidecarCommand) -> Result<()> {
        self.commands.send(command).await.map_err(|_| Error::Closed)
    }

    /// Send a message and wait for the sidecar's delivery verdict.
    ///
    /// The sidecar acks each send with a `SendResult` carrying the request
    /// id; a rejected send surfaces as [`Error::Rejected`] so callers can
    /// fall back to a different payload. A missing ack within the timeout
    /// is treated as delivered.
    pub async fn send_message(&self, payload: &OutboundPayload) -> Result<()> {
        let request_id = uuid::Uuid::new_v4().to_string();
        let (ack_tx, ack_rx) = oneshot::channel();
        self.pending
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(request_id.clone(), ack_tx);

        if let Err(e) = self.send(SidecarCommand::send(payload, request_id.clone())).await {
            self.remove_pending(&request_id);
            return Err(e);
        }

        match timeout(SEND_ACK_TIMEOUT, ack_rx).await {
            Ok(Ok(verdict)) => verdict,
            // Link task went away before acking.
            Ok(Err(_)) => Err(Error::Closed),
            Err(_) => {
                self.remove_pending(&request_id);
                debug!(request_id, "no send ack within timeout, assuming delivered");
                Ok(())
            },
        }
    }

    fn remove_pending(&self, request_id: &str) {
        self.pending
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(request_id);
    }

    /// Our own session JID, once the sidecar has reported a connection.
    #[must_use]
    pub fn self_jid(&self) -> Option<String> {
        self.self_jid
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Tear the link down.
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }
}

/// Connect to the sidecar, retrying `attempts` times with backoff, then
/// spawn the link task. Returns the command handle and the stream of decoded
/// inbound events; the event channel closes when the link stops (shutdown or
/// logout).
pub async fn connect_with_retry(
    url: &str,
    attempts: u32,
) -> Result<(SidecarHandle, mpsc::Receiver<InboundEvent>)> {
    let socket = try_connect(url, attempts).await?;

    let (cmd_tx, cmd_rx) = mpsc::channel(COMMAND_BUFFER);
    let (event_tx, event_rx) = mpsc::channel(EVENT_BUFFER);
    let self_jid = Arc::new(RwLock::new(None));
    let pending: PendingSends = Arc::new(Mutex::new(HashMap::new()));
    let cancel = CancellationToken::new();

    let handle = SidecarHandle {
        commands: cmd_tx,
        self_jid: Arc::clone(&self_jid),
        pending: Arc::clone(&pending),
        cancel: cancel.clone(),
    };

    tokio::spawn(run_link(
        url.to_string(),
        socket,
        cmd_rx,
        event_tx,
        self_jid,
        pending,
        cancel,
    ));

    Ok((handle, event_rx))
}

async fn try_connect(url: &str, attempts: u32) -> Result<WsStream> {
    let mut delay = INITIAL_RETRY_DELAY;
    let mut attempt = 0u32;
    loop {
        attempt += 1;
        match connect_async(url).await {
            Ok((socket, _)) => {
                info!(url, "connected to sidecar");
                return Ok(socket);
            },
            Err(e) if attempt < attempts => {
                warn!(url, attempt, error = %e, "sidecar connect failed, retrying");
                sleep(delay).await;
                delay = (delay * 2).min(MAX_RETRY_DELAY);
            },
            Err(e) => return Err(e.into()),
        }
    }
}

/// What the link loop should do after handling one item.
enum Link {
    Continue,
    Reconnect,
    Stop,
}

async fn run_link(
    url: String,
    mut socket: WsStream,
    mut cmd_rx: mpsc::Receiver<SidecarCommand>,
    event_tx: mpsc::Sender<InboundEvent>,
    self_jid: Arc<RwLock<Option<String>>>,
    pending: PendingSends,
    cancel: CancellationToken,
) {
    loop {
        let verdict = tokio::select! {
            _ = cancel.cancelled() => {
                let _ = socket.close(None).await;
                Link::Stop
            },
            command = cmd_rx.recv() => match command {
                None => Link::Stop,
                Some(command) => forward_command(&mut socket, &command).await,
            },
            frame = socket.next() => match frame {
                Some(Ok(Message::Text(text))) => {
                    handle_frame(text.as_str(), &event_tx, &self_jid, &pending).await
                },
                Some(Ok(_)) => Link::Continue,
                Some(Err(e)) => {
                    warn!(error = %e, "sidecar socket error");
                    Link::Reconnect
                },
                None => {
                    warn!("sidecar closed the connection");
                    Link::Reconnect
                },
            },
        };

        match verdict {
            Link::Continue => {},
            Link::Stop => break,
            Link::Reconnect => {
                // Unbounded attempts: the session is still paired, so keep
                // trying until shutdown.
                let reconnected = tokio::select! {
                    _ = cancel.cancelled() => None,
                    socket = try_connect(&url, u32::MAX) => socket.ok(),
                };
                match reconnected {
                    Some(next) => socket = next,
                    None => break,
                }
            },
        }
    }
    // Dropping the waiters makes any in-flight send observe a closed link.
    pending.lock().unwrap_or_else(|e| e.into_inner()).clear();
    info!("sidecar link closed");
}

async fn forward_command(socket: &mut WsStream, command: &SidecarCommand) -> Link {
    let json = match serde_json::to_string(command) {
        Ok(json) => json,
        Err(e) => {
            warn!(error = %e, "failed to encode sidecar command");
            return Link::Continue;
        },
    };
    match socket.send(Message::text(json)).await {
        Ok(()) => Link::Continue,
        Err(e) => {
            // The command is lost; callers observe only the log line, the
            // link itself recovers.
            warn!(error = %e, "failed to push command, reconnecting");
            Link::Reconnect
        },
    }
}

async fn handle_frame(
    text: &str,
    event_tx: &mpsc::Sender<InboundEvent>,
    self_jid: &Arc<RwLock<Option<String>>>,
    pending: &PendingSends,
) -> Link {
    let event = match serde_json::from_str::<SidecarEvent>(text) {
        Ok(event) => event,
        Err(e) => {
            debug!(error = %e, "ignoring unparseable sidecar frame");
            return Link::Continue;
        },
    };

    match event {
        SidecarEvent::Qr { qr } => {
            info!("pairing QR received — scan via WhatsApp > Settings > Linked Devices:\n{qr}");
            Link::Continue
        },
        SidecarEvent::Connected { jid } => {
            info!(%jid, "whatsapp session connected");
            *self_jid.write().unwrap_or_else(|e| e.into_inner()) = Some(jid);
            Link::Continue
        },
        SidecarEvent::Disconnected { reason } => {
            warn!(?reason, "whatsapp session dropped, reconnecting");
            Link::Reconnect
        },
        SidecarEvent::LoggedOut {} => {
            warn!("whatsapp session logged out, not reconnecting");
            Link::Stop
        },
        SidecarEvent::Message(frame) => {
            if let Some(inbound) = decode_inbound(frame) {
                // Backpressure on purpose: events are processed one at a
                // time downstream.
                if event_tx.send(inbound).await.is_err() {
                    return Link::Stop;
                }
            }
            Link::Continue
        },
        SidecarEvent::SendResult {
            request_id,
            success,
            error,
        } => {
            let verdict = if success {
                Ok(())
            } else {
                Err(Error::Rejected {
                    reason: error.unwrap_or_default(),
                })
            };
            let waiter = pending
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .remove(&request_id);
            match waiter {
                Some(ack) => {
                    let _ = ack.send(verdict);
                },
                None => match verdict {
                    Ok(()) => debug!(request_id, "message delivered"),
                    Err(e) => warn!(request_id, error = %e, "message delivery failed"),
                },
            }
            Link::Continue
        },
        SidecarEvent::Error { message } => {
            warn!(?message, "sidecar reported an error");
            Link::Continue
        },
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn link_handle() -> (SidecarHandle, mpsc::Receiver<SidecarCommand>) {
        let (cmd_tx, cmd_rx) = mpsc::channel(4);
        let handle = SidecarHandle {
            commands: cmd_tx,
            self_jid: Arc::new(RwLock::new(None)),
            pending: Arc::new(Mutex::new(HashMap::new())),
            cancel: CancellationToken::new(),
        };
        (handle, cmd_rx)
    }

    fn ack_frame(request_id: &str, success: bool, error: Option<&str>) -> String {
        serde_json::json!({
            "type": "send_result",
            "request_id": request_id,
            "success": success,
            "error": error,
        })
        .to_string()
    }

    /// Pop the queued send command and feed the matching ack back through
    /// the frame handler, the way the link task would.
    async fn ack_next_send(
        cmd_rx: &mut mpsc::Receiver<SidecarCommand>,
        handle: &SidecarHandle,
        success: bool,
        error: Option<&str>,
    ) {
        let command = cmd_rx.recv().await.unwrap();
        let SidecarCommand::Send { request_id, .. } = command else {
            panic!("expected a send command, got {command:?}");
        };
        let (event_tx, _event_rx) = mpsc::channel(4);
        handle_frame(
            &ack_frame(&request_id, success, error),
            &event_tx,
            &handle.self_jid,
            &handle.pending,
        )
        .await;
    }

    #[tokio::test]
    async fn acked_send_returns_ok() {
        let (handle, mut cmd_rx) = link_handle();
        let acker = {
            let handle = handle.clone();
            tokio::spawn(async move { ack_next_send(&mut cmd_rx, &handle, true, None).await })
        };

        let payload = OutboundPayload::plain("a@s.whatsapp.net", "hi");
        assert!(handle.send_message(&payload).await.is_ok());
        acker.await.unwrap();
        assert!(handle.pending.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn rejected_send_surfaces_to_the_caller() {
        let (handle, mut cmd_rx) = link_handle();
        let acker = {
            let handle = handle.clone();
            tokio::spawn(async move {
                ack_next_send(&mut cmd_rx, &handle, false, Some("not a participant")).await;
            })
        };

        let payload = OutboundPayload::plain("12036304@g.us", "hi");
        let err = handle.send_message(&payload).await.unwrap_err();
        assert!(matches!(err, Error::Rejected { ref reason } if reason == "not a participant"));
        acker.await.unwrap();
        assert!(handle.pending.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn send_on_a_dead_link_errors_closed() {
        let (handle, cmd_rx) = link_handle();
        drop(cmd_rx);

        let payload = OutboundPayload::plain("a@s.whatsapp.net", "hi");
        let err = handle.send_message(&payload).await.unwrap_err();
        assert!(matches!(err, Error::Closed));
        assert!(handle.pending.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn unsolicited_send_result_is_ignored() {
        let (handle, _cmd_rx) = link_handle();
        let (event_tx, _event_rx) = mpsc::channel(4);
        let verdict = handle_frame(
            &ack_frame("unknown", false, Some("boom")),
            &event_tx,
            &handle.self_jid,
            &handle.pending,
        )
        .await;
        assert!(matches!(verdict, Link::Continue));
    }
}
