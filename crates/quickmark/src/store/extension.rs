use async_trait::async_trait;
use folder_index::FolderNode;
use serde_json::json;
use std::sync::Arc;

use crate::browser::{BridgeCommand, BrowserBridge};
use crate::error::{CoreError, CoreResult};
use crate::store::{ActiveTab, BookmarkStore, CreateNode, StoreKind};

/// Bookmark store backed by the live browser through the extension bridge.
#[derive(Clone)]
pub struct ExtensionStore {
    bridge: Arc<BrowserBridge>,
}

impl ExtensionStore {
    pub fn new(bridge: Arc<BrowserBridge>) -> Self {
        Self { bridge }
    }
}

#[async_trait]
impl BookmarkStore for ExtensionStore {
    fn kind(&self) -> StoreKind {
        StoreKind::Extension
    }

    async fn get_tree(&self) -> CoreResult<Vec<FolderNode>> {
        self.bridge.request(BridgeCommand::GetTree, json!({})).await
    }

    async fn create(&self, node: CreateNode) -> CoreResult<FolderNode> {
        let params = serde_json::to_value(&node)
            .map_err(|e| CoreError::Internal(format!("failed to serialize create request: {e}")))?;
        self.bridge.request(BridgeCommand::Create, params).await
    }

    async fn query_active_tab(&self) -> CoreResult<ActiveTab> {
        let tab: Option<ActiveTab> = self
            .bridge
            .request(
                BridgeCommand::QueryActiveTab,
                json!({ "active": true, "currentWindow": true }),
            )
            .await
            .map_err(|e| CoreError::TabUnavailable(e.to_string()))?;
        tab.ok_or_else(|| CoreError::TabUnavailable("no active tab".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;
    use std::time::Duration;
    use tokio::sync::mpsc;

    async fn connected_store<F>(reply: F) -> ExtensionStore
    where
        F: Fn(&str, &Value) -> Value + Send + 'static,
    {
        let bridge = Arc::new(BrowserBridge::new(Duration::from_secs(5)));
        let (tx, mut rx) = mpsc::unbounded_channel::<String>();
        bridge.on_connect(tx).await;
        let responder = bridge.clone();
        tokio::spawn(async move {
            while let Some(msg) = rx.recv().await {
                let cmd: Value = serde_json::from_str(&msg).unwrap();
                let result = reply(cmd["method"].as_str().unwrap(), &cmd["params"]);
                let response = json!({ "id": cmd["id"], "result": result });
                responder.on_message(&response.to_string()).await;
            }
        });
        ExtensionStore::new(bridge)
    }

    #[tokio::test]
    async fn get_tree_decodes_browser_nodes() {
        let store = connected_store(|method, _| {
            assert_eq!(method, "bookmarks.getTree");
            json!([{ "id": "0", "title": "", "children": [
                { "id": "1", "parentId": "0", "title": "Bookmarks bar", "children": [] }
            ]}])
        })
        .await;
        let tree = store.get_tree().await.expect("tree");
        assert_eq!(tree[0].children()[0].title, "Bookmarks bar");
    }

    #[tokio::test]
    async fn create_sends_camel_case_params() {
        let store = connected_store(|method, params| {
            assert_eq!(method, "bookmarks.create");
            json!({
                "id": "42",
                "parentId": params["parentId"],
                "title": params["title"],
                "url": params["url"],
            })
        })
        .await;
        let node = store
            .create(CreateNode::bookmark("1", "Rust", "https://www.rust-lang.org/"))
            .await
            .expect("create");
        assert_eq!(node.id(), Some("42"));
        assert_eq!(node.parent_id.as_deref(), Some("1"));
        assert_eq!(node.url.as_deref(), Some("https://www.rust-lang.org/"));
    }

    #[tokio::test]
    async fn missing_tab_is_unavailable() {
        let store = connected_store(|_, _| Value::Null).await;
        assert!(matches!(
            store.query_active_tab().await,
            Err(CoreError::TabUnavailable(_))
        ));
    }

    #[tokio::test]
    async fn disconnected_tab_query_is_unavailable() {
        let store = ExtensionStore::new(Arc::new(BrowserBridge::new(Duration::from_secs(1))));
        assert!(matches!(
            store.query_active_tab().await,
            Err(CoreError::TabUnavailable(msg)) if msg.contains("not connected")
        ));
    }
}
