use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Query, State,
    },
    response::IntoResponse,
};
use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use std::time::Duration;
use tokio::{
    sync::{broadcast::error::RecvError, mpsc},
    time,
};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::auth::jwt::validate_token;
use crate::notification::effects::Permission;
use crate::notification::push::{PushEvent, PushHub};
use crate::state::AppState;

const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(30);

/// Query parameters for WebSocket connections
#[derive(Debug, Deserialize)]
pub struct WebSocketParams {
    token: Option<String>,
}

/// Frames a dashboard client may send back.
#[derive(Debug, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ClientMessage {
    Permission { state: Permission },
}

/// Handle an invalid socket connection (authentication failure)
async fn handle_invalid_socket(mut socket: WebSocket, error_message: String) {
    let payload = serde_json::json!({ "error": error_message }).to_string();
    if let Err(e) = socket.send(Message::Text(payload)).await {
        error!("Error sending error message on WS: {}", e);
    }

    let _ = socket.close().await;
}

fn encode(event: &PushEvent) -> Option<Message> {
    match serde_json::to_string(event) {
        Ok(json) => Some(Message::Text(json)),
        Err(e) => {
            error!("Failed to serialize push event: {}", e);
            None
        }
    }
}

/// Handle a valid WebSocket connection
async fn handle_valid_connection(socket: WebSocket, operator_id: Uuid, hub: PushHub) {
    let (mut ws_sender, mut ws_receiver) = socket.split();
    let (tx, mut rx) = mpsc::channel::<Message>(100);

    // Subscribe before anything else so no event is missed.
    let mut events = hub.subscribe();

    if hub.has_pending_request(&operator_id) {
        if let Some(message) = encode(&PushEvent::PermissionRequest) {
            let _ = tx.send(message).await;
        }
    }

    // Forward hub events addressed to this operator
    let tx_events = tx.clone();
    let events_task = tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(envelope) if envelope.operator_id == operator_id => {
                    let Some(message) = encode(&envelope.event) else {
                        continue;
                    };
                    if let Err(e) = tx_events.send(message).await {
                        error!("Failed to forward push event to WebSocket: {}", e);
                        break;
                    }
                }
                Ok(_) => {}
                Err(RecvError::Lagged(skipped)) => {
                    warn!(
                        "Push subscriber for operator {} lagged, {} events dropped",
                        operator_id, skipped
                    );
                }
                Err(RecvError::Closed) => break,
            }
        }
    });

    // Forward messages from channel to WebSocket
    let forward_task = tokio::spawn(async move {
        while let Some(message) = rx.recv().await {
            if let Err(e) = ws_sender.send(message).await {
                error!("Error forwarding message to WebSocket: {}", e);
                break;
            }
        }
    });

    let tx_heartbeat = tx.clone();
    let heartbeat_task = tokio::spawn(async move {
        let mut interval = time::interval(HEARTBEAT_INTERVAL);
        loop {
            interval.tick().await;
            if let Err(e) = tx_heartbeat.send(Message::Ping(vec![])).await {
                error!("Error sending heartbeat: {}", e);
                break;
            }
        }
    });

    while let Some(result) = ws_receiver.next().await {
        match result {
            Ok(Message::Text(text)) => match serde_json::from_str::<ClientMessage>(&text) {
                Ok(ClientMessage::Permission { state }) => {
                    hub.resolve_permission(operator_id, state);
                }
                Err(e) => debug!("Ignoring unrecognized client frame: {}", e),
            },
            Ok(Message::Close(_)) => {
                info!("WebSocket closed by client");
                break;
            }
            Ok(Message::Pong(_)) => {
                debug!("Received pong from client");
            }
            Err(e) => {
                error!("WebSocket error: {}", e);
                break;
            }
            _ => {}
        }
    }

    events_task.abort();
    forward_task.abort();
    heartbeat_task.abort();

    info!("WebSocket connection closed for operator: {}", operator_id);
}

/// Handle incoming WebSocket connection
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    Query(params): Query<WebSocketParams>,
    State(state): State<AppState>,
) -> impl IntoResponse {
    let token = params.token.unwrap_or_default();

    let operator_id = match validate_token(&token, &state.jwt_secret)
        .and_then(|claims| claims.operator_id())
    {
        Ok(operator_id) => operator_id,
        Err(e) => {
            let error_message = format!("Invalid token: {}", e);
            return ws.on_upgrade(move |socket| async move {
                handle_invalid_socket(socket, error_message).await;
            });
        }
    };

    info!("Operator {} connected to notifications WebSocket", operator_id);
    // A connecting dashboard starts the operator's session if none is running
    state.sessions.open(operator_id).await;
    let hub = state.hub.clone();
    ws.on_upgrade(move |socket| async move {
        handle_valid_connection(socket, operator_id, hub).await;
    })
}
