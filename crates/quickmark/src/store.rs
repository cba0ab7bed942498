pub mod extension;
pub mod memory;
pub mod profile;

use async_trait::async_trait;
use folder_index::FolderNode;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::browser::BrowserBridge;
use crate::error::{CoreError, CoreResult};

pub use extension::ExtensionStore;
pub use memory::MemoryStore;
pub use profile::ProfileStore;

/// The focused tab of the current window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveTab {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub url: String,
}

/// Arguments of `bookmarks.create`. Without `url` a folder is created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateNode {
    pub parent_id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl CreateNode {
    pub fn folder(parent_id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            parent_id: parent_id.into(),
            title: title.into(),
            url: None,
        }
    }

    pub fn bookmark(
        parent_id: impl Into<String>,
        title: impl Into<String>,
        url: impl Into<String>,
    ) -> Self {
        Self {
            parent_id: parent_id.into(),
            title: title.into(),
            url: Some(url.into()),
        }
    }

    pub fn is_folder(&self) -> bool {
        self.url.is_none()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum StoreKind {
    Extension,
    Profile,
    Memory,
}

/// The bookmark and tab capabilities the popup needs from the browser.
#[async_trait]
pub trait BookmarkStore: Send + Sync {
    fn kind(&self) -> StoreKind;
    async fn get_tree(&self) -> CoreResult<Vec<FolderNode>>;
    /// Creates a folder or bookmark and returns the new node.
    async fn create(&self, node: CreateNode) -> CoreResult<FolderNode>;
    async fn query_active_tab(&self) -> CoreResult<ActiveTab>;
}

pub type SharedStore = Arc<dyn BookmarkStore>;

/// Returns the id of a node the store just created.
pub fn created_id(node: &FolderNode) -> CoreResult<String> {
    node.id()
        .map(str::to_string)
        .ok_or_else(|| CoreError::Store("created node has no id".to_string()))
}

/// Reads the active tab URL, failing when there is none.
pub async fn current_tab_url(store: &dyn BookmarkStore) -> CoreResult<String> {
    let tab = store.query_active_tab().await?;
    if tab.url.trim().is_empty() {
        return Err(CoreError::TabUnavailable("active tab has no URL".to_string()));
    }
    Ok(tab.url)
}

/// Picks the store for this popup session.
///
/// A connected browser extension wins. Otherwise the profile `Bookmarks`
/// file store is used when its file exists, with `fallback_tab` standing in
/// for the active tab since a file cannot tell which tab is focused. The
/// returned profile store shares `profile`'s write lock.
pub async fn detect_store(
    bridge: &Arc<BrowserBridge>,
    profile: Option<&ProfileStore>,
    fallback_tab: Option<ActiveTab>,
) -> CoreResult<SharedStore> {
    if bridge.is_connected().await {
        tracing::debug!("using browser extension bookmark store");
        return Ok(Arc::new(ExtensionStore::new(bridge.clone())));
    }
    if let Some(profile) = profile.filter(|profile| profile.path().is_file()) {
        tracing::debug!("using profile bookmark store at {}", profile.path().display());
        return Ok(Arc::new(profile.for_tab(fallback_tab)));
    }
    Err(CoreError::UnsupportedStore)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::time::Duration;
    use tempfile::tempdir;
    use tokio::sync::mpsc;

    #[tokio::test]
    async fn no_store_available() {
        let bridge = Arc::new(BrowserBridge::new(Duration::from_secs(1)));
        let missing = ProfileStore::new(PathBuf::from("/nonexistent/Bookmarks"));
        let result = detect_store(&bridge, Some(&missing), None).await;
        assert_eq!(result.err(), Some(CoreError::UnsupportedStore));
        assert_eq!(
            detect_store(&bridge, None, None).await.err(),
            Some(CoreError::UnsupportedStore)
        );
    }

    #[tokio::test]
    async fn profile_file_used_when_extension_absent() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("Bookmarks");
        std::fs::write(&path, profile::tests::SAMPLE_PROFILE).expect("write");

        let bridge = Arc::new(BrowserBridge::new(Duration::from_secs(1)));
        let profile = ProfileStore::new(path);
        let store = detect_store(&bridge, Some(&profile), None).await.expect("store");
        assert_eq!(store.kind(), StoreKind::Profile);
    }

    #[tokio::test]
    async fn connected_extension_wins() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("Bookmarks");
        std::fs::write(&path, profile::tests::SAMPLE_PROFILE).expect("write");

        let bridge = Arc::new(BrowserBridge::new(Duration::from_secs(1)));
        let (tx, _rx) = mpsc::unbounded_channel::<String>();
        bridge.on_connect(tx).await;

        let profile = ProfileStore::new(path);
        let store = detect_store(&bridge, Some(&profile), None).await.expect("store");
        assert_eq!(store.kind(), StoreKind::Extension);
    }

    #[tokio::test]
    async fn tab_without_url_is_unavailable() {
        let store = MemoryStore::new(Vec::new()).with_active_tab(Some(ActiveTab {
            title: "New Tab".to_string(),
            url: String::new(),
        }));
        assert!(matches!(
            current_tab_url(&store).await,
            Err(CoreError::TabUnavailable(_))
        ));
    }
}
