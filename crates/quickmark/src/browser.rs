use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use tokio::sync::{mpsc, Mutex, Notify, RwLock};

use crate::error::{CoreError, CoreResult};

const NOT_CONNECTED: &str = "browser extension not connected";

/// Commands understood by the quickmark browser extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BridgeCommand {
    GetTree,
    Create,
    QueryActiveTab,
}

impl BridgeCommand {
    pub fn method(self) -> &'static str {
        match self {
            BridgeCommand::GetTree => "bookmarks.getTree",
            BridgeCommand::Create => "bookmarks.create",
            BridgeCommand::QueryActiveTab => "tabs.queryActive",
        }
    }
}

/// Manages the WebSocket connection to the browser extension and
/// request/response matching for bookmark and tab calls.
///
/// Requests go out as `{id, method, params}`; the extension answers with
/// `{id, result}` or `{id, error}`.
pub struct BrowserBridge {
    connection: RwLock<ConnectionState>,
    pending: Mutex<HashMap<String, PendingRequest>>,
    timeout: Duration,
}

struct ConnectionState {
    sender: Option<mpsc::UnboundedSender<String>>,
    generation: u64,
}

struct PendingRequest {
    result: Option<Result<Value, String>>,
    notify: Arc<Notify>,
}

#[derive(Deserialize)]
struct BridgeReply {
    id: Option<String>,
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<Value>,
}

impl BrowserBridge {
    pub fn new(timeout: Duration) -> Self {
        Self {
            connection: RwLock::new(ConnectionState {
                sender: None,
                generation: 0,
            }),
            pending: Mutex::new(HashMap::new()),
            timeout,
        }
    }

    /// Send a command to the extension and wait for its result.
    pub async fn send_command(&self, command: BridgeCommand, params: Value) -> CoreResult<Value> {
        let id = uuid::Uuid::new_v4().to_string();
        let method = command.method();
        let message = serde_json::json!({
            "id": id,
            "method": method,
            "params": params,
        });
        let text = serde_json::to_string(&message)
            .map_err(|e| CoreError::Internal(format!("failed to serialize {method}: {e}")))?;

        let notify = Arc::new(Notify::new());

        // Register before sending so a fast reply cannot be lost.
        {
            let mut pending = self.pending.lock().await;
            pending.insert(
                id.clone(),
                PendingRequest {
                    result: None,
                    notify: notify.clone(),
                },
            );
        }

        let sent = {
            let conn = self.connection.read().await;
            conn.sender
                .as_ref()
                .is_some_and(|sender| sender.send(text).is_ok())
        };
        if !sent {
            self.pending.lock().await.remove(&id);
            return Err(CoreError::Store(NOT_CONNECTED.to_string()));
        }

        let waited = tokio::time::timeout(self.timeout, notify.notified()).await;

        let mut pending = self.pending.lock().await;
        let Some(request) = pending.remove(&id) else {
            return Err(CoreError::Store(format!("{method} was cancelled")));
        };
        match request.result {
            Some(Ok(value)) => Ok(value),
            Some(Err(error)) => Err(CoreError::Store(format!("{method} failed: {error}"))),
            None if waited.is_err() => Err(CoreError::Store(format!("{method} timed out"))),
            None => Err(CoreError::Store(format!(
                "{method} interrupted: {NOT_CONNECTED}"
            ))),
        }
    }

    /// Like [`send_command`](Self::send_command), decoding the result.
    pub async fn request<T: DeserializeOwned>(
        &self,
        command: BridgeCommand,
        params: Value,
    ) -> CoreResult<T> {
        let value = self.send_command(command, params).await?;
        serde_json::from_value(value).map_err(|e| {
            CoreError::Store(format!("unexpected {} reply: {e}", command.method()))
        })
    }

    /// Called when a new extension connects. Returns the generation ID for
    /// this connection.
    pub async fn on_connect(&self, sender: mpsc::UnboundedSender<String>) -> u64 {
        self.fail_pending().await;

        let mut conn = self.connection.write().await;
        conn.generation += 1;
        conn.sender = Some(sender);
        let generation = conn.generation;
        tracing::info!("browser extension connected (generation {generation})");
        generation
    }

    /// Called when the extension disconnects. Only clears the sender if the
    /// generation matches, so a stale disconnect cannot drop a newer connection.
    /// Returns whether the current connection was the one dropped.
    pub async fn on_disconnect(&self, generation: u64) -> bool {
        let mut conn = self.connection.write().await;
        if conn.generation != generation {
            return false;
        }
        conn.sender = None;
        drop(conn);
        tracing::info!("browser extension disconnected (generation {generation})");
        self.fail_pending().await;
        true
    }

    /// Called when a message arrives from the extension.
    pub async fn on_message(&self, text: &str) {
        let reply: BridgeReply = match serde_json::from_str(text) {
            Ok(reply) => reply,
            Err(e) => {
                tracing::warn!("invalid message from browser extension: {e}");
                return;
            }
        };
        let Some(id) = reply.id else {
            tracing::warn!("browser extension message missing 'id' field");
            return;
        };

        let result = match reply.error {
            Some(error) => Err(error
                .as_str()
                .map(str::to_string)
                .unwrap_or_else(|| error.to_string())),
            None => Ok(reply.result.unwrap_or(Value::Null)),
        };

        let mut pending = self.pending.lock().await;
        if let Some(request) = pending.get_mut(&id) {
            request.result = Some(result);
            request.notify.notify_one();
        } else {
            tracing::warn!("received response for unknown request id: {id}");
        }
    }

    pub async fn is_connected(&self) -> bool {
        self.connection.read().await.sender.is_some()
    }

    async fn fail_pending(&self) {
        let mut pending = self.pending.lock().await;
        for (_, request) in pending.drain() {
            request.notify.notify_one();
        }
    }
}
