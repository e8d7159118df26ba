use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use futures_util::{SinkExt, StreamExt};
use std::sync::Arc;
use tokio::sync::mpsc::unbounded_channel;
use tracing::{error, info};
use uuid::Uuid;

use crate::models::{ClientMessage, ServerMessage};
use crate::websocket::msg_join_handler::handle_join_message;
use crate::websocket::msg_typing_handler::handle_typing_message;
use crate::websocket::msg_update_handler::handle_update_message;
use crate::AppState;

/// WebSocket handler
pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(app_state): State<Arc<AppState>>,
) -> Response {
    info!("New WebSocket connection attempt");
    ws.on_upgrade(move |socket| handle_socket(socket, app_state))
}

/// Handle WebSocket connection
async fn handle_socket(socket: WebSocket, app_state: Arc<AppState>) {
    // Generate unique connection ID to identify this client
    let connection_id = Uuid::new_v4();
    info!("WebSocket connection established with connection_id: {}", connection_id);

    // Split the socket into sender and receiver
    let (mut sender, mut receiver) = socket.split();

    // Everything addressed to this connection goes through one queue;
    // the registry holds the sending half for broadcasts and
    // point-to-point delivery.
    let (tx, mut rx) = unbounded_channel::<ServerMessage>();
    app_state.registry.register(connection_id, tx);

    // Forward queued server messages to the client
    let mut send_task = tokio::spawn(async move {
        while let Some(server_msg) = rx.recv().await {
            let text = match serde_json::to_string(&server_msg) {
                Ok(text) => text,
                Err(e) => {
                    error!("Failed to serialize message for {}: {}", connection_id, e);
                    continue;
                }
            };
            if sender.send(Message::Text(text)).await.is_err() {
                break;
            }
        }
    });

    // Listen to the websocket for incoming messages
    let recv_state = app_state.clone();
    let mut recv_task = tokio::spawn(async move {
        while let Some(Ok(Message::Text(msg))) = receiver.next().await {
            // Parse the incoming message as JSON
            let client_msg: ClientMessage = match serde_json::from_str(&msg) {
                Ok(client_msg) => client_msg,
                Err(e) => {
                    error!("Failed to parse message from {}: {}", connection_id, e);
                    continue;
                }
            };

            // Handle different message types
            match client_msg {
                ClientMessage::JoinNote(join_msg) => {
                    handle_join_message(&join_msg, connection_id, &recv_state).await;
                }
                ClientMessage::NoteUpdate(update_msg) => {
                    handle_update_message(update_msg, connection_id, &recv_state).await;
                }
                ClientMessage::TypingStart(typing_msg) => {
                    handle_typing_message(&typing_msg, true, connection_id, &recv_state);
                }
                ClientMessage::TypingStop(typing_msg) => {
                    handle_typing_message(&typing_msg, false, connection_id, &recv_state);
                }
            }
        }
    });

    // Wait for either task to finish (and finish the other)
    tokio::select! {
        _ = (&mut send_task) => recv_task.abort(),
        _ = (&mut recv_task) => send_task.abort(),
    };

    // Disconnect: drop room membership and tell whoever remains.
    app_state.registry.unregister(connection_id);
    info!("WebSocket connection terminated: {}", connection_id);
}
