//! Realtime gift-event stream.
//!
//! Connects to the SelfLink realtime endpoint over WebSocket and forwards
//! coin-gift events to the wallet state. The transport delivers at least
//! once, so every event passes through the [`GiftDedupeStore`] before it is
//! forwarded; duplicates are dropped silently (logged at debug).

use futures_util::StreamExt;
use futures_util::stream::{SplitSink, SplitStream};
use serde::Deserialize;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::{debug, info, warn};
use tungstenite::Message;

use crate::Result;
use crate::dedupe::GiftDedupeStore;
use crate::models::gift::GiftEvent;

/// Write half of a realtime connection.
pub type WsWriter = SplitSink<WebSocketStream<MaybeTlsStream<TcpStream>>, Message>;

/// Read half of a realtime connection.
pub type WsReader = SplitStream<WebSocketStream<MaybeTlsStream<TcpStream>>>;

/// Frames the realtime endpoint sends.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum RealtimeFrame {
    Gift(GiftEvent),
    Heartbeat,
}

/// Establishes a WebSocket connection to the realtime endpoint.
///
/// # Errors
///
/// Returns a [`WalletError`](crate::WalletError) if the connection or TLS
/// handshake fails.
pub async fn connect(url: &str) -> Result<(WsWriter, WsReader)> {
    let (ws_stream, _) = connect_async(url).await?;
    info!("realtime handshake completed");

    Ok(ws_stream.split())
}

/// Reads gift events until the connection closes, forwarding fresh ones.
///
/// Duplicate deliveries (same `event_id` within the dedupe window) are
/// dropped. Frames that do not parse are skipped with a warning — a lossy
/// push channel must not take the whole stream down.
///
/// # Errors
///
/// Returns a [`WalletError`](crate::WalletError) if reading from the
/// WebSocket fails.
pub async fn process_gift_events(
    read: &mut WsReader,
    dedupe: &mut GiftDedupeStore,
    tx: mpsc::UnboundedSender<GiftEvent>,
) -> Result<()> {
    while let Some(msg) = read.next().await {
        let msg = msg?;

        if let Message::Text(text) = msg {
            match handle_frame(&text, dedupe) {
                FrameOutcome::Fresh(event) => {
                    info!(
                        event_id = event.event_id,
                        amount_cents = event.amount_cents,
                        "gift received"
                    );
                    if tx.send(event).is_err() {
                        // Receiver gone, nothing left to forward to.
                        return Ok(());
                    }
                }
                FrameOutcome::Duplicate(event_id) => {
                    debug!(event_id, "dropped duplicate gift event");
                }
                FrameOutcome::Heartbeat => {
                    debug!("realtime heartbeat");
                }
                FrameOutcome::Unparseable => {
                    warn!("skipping malformed realtime frame");
                }
            }
        }
    }

    Ok(())
}

enum FrameOutcome {
    Fresh(GiftEvent),
    Duplicate(String),
    Heartbeat,
    Unparseable,
}

fn handle_frame(text: &str, dedupe: &mut GiftDedupeStore) -> FrameOutcome {
    match serde_json::from_str::<RealtimeFrame>(text) {
        Ok(RealtimeFrame::Gift(event)) => {
            if dedupe.insert(&event.event_id) {
                FrameOutcome::Fresh(event)
            } else {
                FrameOutcome::Duplicate(event.event_id)
            }
        }
        Ok(RealtimeFrame::Heartbeat) => FrameOutcome::Heartbeat,
        Err(_) => FrameOutcome::Unparseable,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GIFT_FRAME: &str = r#"{
        "type": "gift",
        "event_id": "evt-1",
        "from_user_id": "u-2",
        "to_account_key": "acct-1",
        "amount_cents": 300,
        "currency": "SLC",
        "occurred_at": "2026-08-01T12:00:00Z",
        "note": "happy birthday"
    }"#;

    #[test]
    fn fresh_gift_is_forwarded_once() {
        let mut dedupe = GiftDedupeStore::new();
        assert!(matches!(
            handle_frame(GIFT_FRAME, &mut dedupe),
            FrameOutcome::Fresh(_)
        ));
        // At-least-once redelivery of the same event
        assert!(matches!(
            handle_frame(GIFT_FRAME, &mut dedupe),
            FrameOutcome::Duplicate(_)
        ));
    }

    #[test]
    fn heartbeat_frames_recognized() {
        let mut dedupe = GiftDedupeStore::new();
        assert!(matches!(
            handle_frame(r#"{"type": "heartbeat"}"#, &mut dedupe),
            FrameOutcome::Heartbeat
        ));
    }

    #[test]
    fn malformed_frames_skipped() {
        let mut dedupe = GiftDedupeStore::new();
        assert!(matches!(
            handle_frame("not json", &mut dedupe),
            FrameOutcome::Unparseable
        ));
        assert!(matches!(
            handle_frame(r#"{"type": "mystery"}"#, &mut dedupe),
            FrameOutcome::Unparseable
        ));
    }
}
