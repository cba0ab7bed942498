//! The extension's WebSocket and connection status.
//!
//! While a socket is attached the extension is the bookmark store, so the
//! shared folder index is dropped whenever the attached extension changes.

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::IntoResponse;
use axum::Json;
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::mpsc;

use crate::browser::BrowserBridge;
use crate::server::ServerState;

#[derive(Serialize)]
pub struct BrowserStatus {
    pub connected: bool,
}

/// GET /browser/ws
pub(crate) async fn ws_handler(
    State(state): State<Arc<ServerState>>,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| attach_extension(state, socket))
}

async fn attach_extension(state: Arc<ServerState>, socket: WebSocket) {
    let (sink, stream) = socket.split();
    let (commands_tx, commands_rx) = mpsc::unbounded_channel::<String>();

    let generation = state.bridge.on_connect(commands_tx).await;
    // Folders indexed from the profile file or an older extension are stale.
    state.forget_folders().await;

    tokio::select! {
        sent = send_commands(sink, commands_rx) => {
            tracing::debug!("extension {generation} stopped taking commands after {sent}");
        }
        received = receive_replies(stream, state.bridge.clone()) => {
            tracing::debug!("extension {generation} hung up after {received} replies");
        }
    }

    if state.bridge.on_disconnect(generation).await {
        state.forget_folders().await;
        tracing::debug!("dropped folder index built through extension {generation}");
    }
}

async fn send_commands(
    mut sink: SplitSink<WebSocket, Message>,
    mut commands: mpsc::UnboundedReceiver<String>,
) -> usize {
    let mut sent = 0;
    while let Some(command) = commands.recv().await {
        if let Err(error) = sink.send(Message::Text(command)).await {
            tracing::warn!("failed to send command to extension: {error}");
            break;
        }
        sent += 1;
    }
    sent
}

async fn receive_replies(
    mut stream: SplitStream<WebSocket>,
    bridge: Arc<BrowserBridge>,
) -> usize {
    let mut received = 0;
    while let Some(frame) = stream.next().await {
        match frame {
            Ok(Message::Text(reply)) => {
                bridge.on_message(&reply).await;
                received += 1;
            }
            Ok(Message::Close(_)) => break,
            Ok(_) => {}
            Err(error) => {
                tracing::warn!("extension socket error: {error}");
                break;
            }
        }
    }
    received
}

/// GET /browser/status
pub(crate) async fn status(State(state): State<Arc<ServerState>>) -> Json<BrowserStatus> {
    Json(BrowserStatus {
        connected: state.bridge.is_connected().await,
    })
}
