//! WebSocket handler for real-time play.
//!
//! Every connection is one player. Commands go to the table actor; the
//! actor's events are pushed back as they happen.
//!
//! # Connection Flow
//!
//! 1. Client connects via `GET /ws` and is assigned a fresh player id
//! 2. The connection subscribes to table events and receives a `snapshot`
//! 3. Server spawns a send task forwarding events and error replies
//! 4. The receive loop parses and forwards client commands
//! 5. On disconnect the player leaves the match and is unsubscribed
//!
//! # Client Messages
//!
//! ```json
//! {"type": "join", "name": "alice"}
//! {"type": "start"}
//! {"type": "claim", "amount": 3, "card_type": "A"}
//! {"type": "dispute"}
//! {"type": "leave"}
//! ```
//!
//! # Server Messages
//!
//! - Table events (`player_list`, `game_started`, `your_cards`, `new_claim`,
//!   `next_turn`, `dispute_result`, `player_eliminated`, `game_over`,
//!   `new_round`, `snapshot`), broadcast or addressed to this player
//! - `{"type": "error", "message": ...}` for this connection's rejected commands

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::Response,
};
use futures_util::{SinkExt, StreamExt};
use liars_deck::{
    entities::{CardType, PlayerId},
    table::{TableEvent, TableHandle, TableResult},
};
use log::{error, info, warn};
use serde::{Deserialize, Serialize};
use std::sync::atomic::Ordering;
use tokio::sync::mpsc;

use super::{AppState, rate_limiter::MessageLimiter};
use crate::{logging, metrics};

/// Client messages received via WebSocket
#[derive(Debug, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Take a seat under a display name
    Join { name: String },
    /// Start (or restart) the match
    Start,
    /// Claim at least `amount` cards of `card_type` across all hands
    Claim { amount: i64, card_type: CardType },
    /// Challenge the pending claim
    Dispute,
    /// Give up the seat
    Leave,
}

impl ClientMessage {
    fn kind(&self) -> &'static str {
        match self {
            Self::Join { .. } => "join",
            Self::Start => "start",
            Self::Claim { .. } => "claim",
            Self::Dispute => "dispute",
            Self::Leave => "leave",
        }
    }
}

/// Replies addressed to a single connection
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerResponse {
    Error { message: String },
}

/// Upgrade HTTP connection to WebSocket.
pub async fn websocket_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Handle an established WebSocket connection.
async fn handle_socket(socket: WebSocket, state: AppState) {
    let (mut sender, mut receiver) = socket.split();
    let player_id = PlayerId::new();

    let open = state.connections.fetch_add(1, Ordering::Relaxed) + 1;
    metrics::websocket_connections_total();
    metrics::websocket_connections_active(open);
    info!("WebSocket connected: player={player_id}");

    let mut limiter = MessageLimiter::default();

    // Error replies for this connection only
    let (response_tx, mut response_rx) = mpsc::channel::<ServerResponse>(32);
    let (event_tx, mut event_rx) = mpsc::channel::<TableEvent>(state.subscriber_buffer.max(1));

    if state.table.subscribe(player_id, event_tx).await.is_err() {
        error!("Failed to subscribe player {player_id} to table events");
        disconnected(&state);
        return;
    }

    let send_task = tokio::spawn(async move {
        loop {
            let json = tokio::select! {
                Some(event) = event_rx.recv() => serde_json::to_string(&event),
                Some(response) = response_rx.recv() => serde_json::to_string(&response),
                else => break,
            };

            let json = match json {
                Ok(json) => json,
                Err(e) => {
                    error!("Failed to serialize outgoing message: {e}");
                    continue;
                }
            };

            if sender.send(Message::Text(json.into())).await.is_err() {
                break;
            }
            metrics::websocket_messages_sent();
        }
    });

    while let Some(msg) = receiver.next().await {
        match msg {
            Ok(Message::Text(text)) => {
                metrics::websocket_messages_received();

                if let Err(throttled) = limiter.check() {
                    warn!(
                        "{} rate limit exceeded for player {player_id}. Blocking message.",
                        throttled.window()
                    );
                    metrics::rate_limit_hits_total(throttled.window());
                    let _ = response_tx
                        .send(ServerResponse::Error {
                            message: throttled.message().to_string(),
                        })
                        .await;
                    continue;
                }

                let reply = match serde_json::from_str::<ClientMessage>(&text) {
                    Ok(command) => handle_client_message(command, player_id, &state.table).await,
                    Err(e) => {
                        warn!("Failed to parse client message from {player_id}: {e}");
                        Some(ServerResponse::Error {
                            message: "Invalid message format".to_string(),
                        })
                    }
                };

                if let Some(reply) = reply
                    && response_tx.send(reply).await.is_err()
                {
                    break;
                }
            }
            Ok(Message::Close(_)) => {
                info!("WebSocket closed: player={player_id}");
                break;
            }
            Err(e) => {
                error!("WebSocket error: {e}");
                break;
            }
            _ => {}
        }
    }

    send_task.abort();

    let _ = state.table.unsubscribe(player_id).await;
    if let Err(e) = state.table.leave(player_id).await {
        warn!("Failed to leave table for player {player_id} on disconnect: {e}");
    }

    disconnected(&state);
    info!("WebSocket disconnected: player={player_id}");
}

fn disconnected(state: &AppState) {
    let open = state
        .connections
        .fetch_sub(1, Ordering::Relaxed)
        .saturating_sub(1);
    metrics::websocket_connections_active(open);
}

/// Forward a command to the table. Successful commands are answered by the
/// table's broadcast events, so only rejections produce a direct reply.
async fn handle_client_message(
    msg: ClientMessage,
    player_id: PlayerId,
    table: &TableHandle,
) -> Option<ServerResponse> {
    let kind = msg.kind();
    let result: TableResult<()> = match msg {
        ClientMessage::Join { name } => table.join(player_id, name).await,
        ClientMessage::Start => table.start(player_id).await,
        ClientMessage::Claim { amount, card_type } => {
            table.claim(player_id, amount, card_type).await
        }
        ClientMessage::Dispute => table.dispute(player_id).await,
        ClientMessage::Leave => table.leave(player_id).await,
    };

    metrics::commands_total(kind, result.is_ok());
    match result {
        Ok(()) => {
            match kind {
                "start" => metrics::matches_started_total(),
                "dispute" => metrics::disputes_total(),
                _ => {}
            }
            None
        }
        Err(e) => {
            logging::log_rejected_command(&player_id.to_string(), kind, &e.to_string());
            Some(ServerResponse::Error {
                message: e.to_string(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_client_messages() {
        let claim: ClientMessage =
            serde_json::from_str(r#"{"type":"claim","amount":3,"card_type":"B"}"#).unwrap();
        assert_eq!(
            claim,
            ClientMessage::Claim {
                amount: 3,
                card_type: CardType::B
            }
        );

        let join: ClientMessage = serde_json::from_str(r#"{"type":"join","name":"bob"}"#).unwrap();
        assert_eq!(join.kind(), "join");
        assert_eq!(
            serde_json::from_str::<ClientMessage>(r#"{"type":"dispute"}"#).unwrap(),
            ClientMessage::Dispute
        );
    }

    #[test]
    fn test_reject_unknown_card_type() {
        let parsed =
            serde_json::from_str::<ClientMessage>(r#"{"type":"claim","amount":1,"card_type":"E"}"#);
        assert!(parsed.is_err());
    }

    #[test]
    fn test_error_wire_format() {
        let json = serde_json::to_string(&ServerResponse::Error {
            message: "not your turn".to_string(),
        })
        .unwrap();
        assert_eq!(json, r#"{"type":"error","message":"not your turn"}"#);
    }
}
