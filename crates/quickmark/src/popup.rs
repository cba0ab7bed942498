//! One open popup: bookmark title, folder picker and the save action.

use serde::Serialize;

use crate::config::QuickmarkConfig;
use crate::error::CoreResult;
use crate::folders::FolderCache;
use crate::host::{CloseRequest, HostFrame};
use crate::picker::{FolderPicker, PickerView};
use crate::resolver::FolderResolver;
use crate::save::{save_bookmark, SaveError, SaveRequest, SavedBookmark};
use crate::store::{SharedStore, StoreKind};

/// Result of pressing the confirm button.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum ConfirmOutcome {
    /// The bookmark exists; the frontend should carry out `close`.
    Saved {
        bookmark: SavedBookmark,
        close: CloseRequest,
    },
    /// Nothing was saved; the popup stays open.
    Invalid { message: String },
    /// The save failed part way; the popup stays open for a retry.
    Failed { message: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PopupView {
    pub title: String,
    pub embedded: bool,
    pub store: StoreKind,
    pub picker: PickerView,
}

pub struct Popup {
    store: SharedStore,
    cache: FolderCache,
    resolver: FolderResolver,
    host: HostFrame,
    title: String,
    picker: FolderPicker,
}

impl Popup {
    /// Opens a popup, pre-filling the title from the active tab.
    ///
    /// Neither a missing tab nor a failed folder load keeps the popup from
    /// opening; both are logged.
    pub async fn open(store: SharedStore, config: &QuickmarkConfig, host: HostFrame) -> Self {
        let cache = FolderCache::new(store.clone());
        let resolver =
            FolderResolver::new(store.clone(), cache.clone(), config.root_folder_id.as_str());
        let mut popup = Self {
            store,
            cache,
            resolver,
            host,
            title: String::new(),
            picker: FolderPicker::new(config.blur_select_delay()),
        };

        match popup.store.query_active_tab().await {
            Ok(tab) => popup.title = tab.title,
            Err(error) => tracing::warn!("failed to read the active tab title: {error}"),
        }
        if let Err(error) = popup.refresh_folders().await {
            tracing::warn!("failed to load bookmark folders: {error}");
        }
        popup
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    pub fn picker(&self) -> &FolderPicker {
        &self.picker
    }

    pub fn picker_mut(&mut self) -> &mut FolderPicker {
        &mut self.picker
    }

    /// Re-reads the folder list from the store. Returns the folder count.
    pub async fn refresh_folders(&mut self) -> CoreResult<usize> {
        let index = self.cache.refresh().await?;
        self.picker.set_folders(index.records().to_vec());
        Ok(index.len())
    }

    pub async fn confirm(&mut self) -> ConfirmOutcome {
        let request = SaveRequest {
            title: self.title.clone(),
            folder_id: self.picker.selected_folder_id().map(str::to_string),
            folder_path: Some(self.picker.input().to_string()),
        };
        match save_bookmark(&self.store, &self.resolver, &request).await {
            Ok(bookmark) => ConfirmOutcome::Saved {
                bookmark,
                close: self.host.close_request(),
            },
            Err(error @ SaveError::MissingTitle) => ConfirmOutcome::Invalid {
                message: error.to_string(),
            },
            Err(error @ SaveError::Failed(_)) => {
                // Folders may have been created before the failure.
                if let Err(refresh_error) = self.refresh_folders().await {
                    tracing::warn!("failed to reload folders after a failed save: {refresh_error}");
                }
                ConfirmOutcome::Failed {
                    message: error.to_string(),
                }
            }
        }
    }

    pub fn cancel(&self) -> CloseRequest {
        self.host.close_request()
    }

    pub fn view(&self) -> PopupView {
        PopupView {
            title: self.title.clone(),
            embedded: self.host.is_embedded(),
            store: self.store.kind(),
            picker: self.picker.view(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{HostAction, DEFAULT_HOST_MESSAGE_TAG};
    use crate::picker::{KeyOutcome, PickerKey};
    use crate::store::{ActiveTab, CreateNode, MemoryStore};
    use folder_index::FolderNode;
    use std::sync::Arc;

    fn memory_store(tab: Option<ActiveTab>) -> Arc<MemoryStore> {
        Arc::new(
            MemoryStore::new(vec![FolderNode::folder(
                "1",
                "Bookmarks Bar",
                vec![FolderNode::folder("2", "Work", Vec::new())],
            )])
            .with_active_tab(tab),
        )
    }

    async fn standalone(store: Arc<MemoryStore>) -> Popup {
        Popup::open(store, &QuickmarkConfig::default(), HostFrame::Standalone).await
    }

    fn tab() -> Option<ActiveTab> {
        Some(ActiveTab {
            title: "This Week in Rust".to_string(),
            url: "https://this-week-in-rust.org/".to_string(),
        })
    }

    #[tokio::test]
    async fn open_prefills_title_and_folders() {
        let popup = standalone(memory_store(tab())).await;
        assert_eq!(popup.title(), "This Week in Rust");
        assert_eq!(popup.picker().matches().len(), 2);

        let view = popup.view();
        assert!(!view.embedded);
        assert_eq!(view.store, StoreKind::Memory);
    }

    #[tokio::test]
    async fn open_without_tab_leaves_title_empty() {
        let popup = standalone(memory_store(None)).await;
        assert_eq!(popup.title(), "");
        assert_eq!(popup.picker().matches().len(), 2);
    }

    #[tokio::test]
    async fn confirm_saves_into_typed_path_and_closes() {
        let store = memory_store(tab());
        let host = HostFrame::detect(true, DEFAULT_HOST_MESSAGE_TAG);
        let mut popup = Popup::open(store.clone(), &QuickmarkConfig::default(), host).await;

        popup.picker_mut().input_changed("Bookmarks Bar/News");
        assert_eq!(popup.picker_mut().key(PickerKey::Enter), KeyOutcome::Confirmed);

        match popup.confirm().await {
            ConfirmOutcome::Saved { bookmark, close } => {
                assert_eq!(bookmark.parent_id, "3");
                assert_eq!(
                    close,
                    CloseRequest::PostMessage {
                        message: crate::host::HostMessage {
                            from: DEFAULT_HOST_MESSAGE_TAG.to_string(),
                            action: HostAction::Close,
                        }
                    }
                );
            }
            other => panic!("expected save, got {other:?}"),
        }
        assert_eq!(store.created().await[0], CreateNode::folder("1", "News"));
    }

    #[tokio::test]
    async fn confirm_uses_selected_folder() {
        let store = memory_store(tab());
        let mut popup = standalone(store.clone()).await;
        popup.picker_mut().input_changed("work");
        popup.picker_mut().select(0).expect("select");

        let outcome = popup.confirm().await;
        assert!(matches!(
            outcome,
            ConfirmOutcome::Saved { ref bookmark, .. } if bookmark.parent_id == "2"
        ));
        assert_eq!(store.created_folders().await, 0);
    }

    #[tokio::test]
    async fn blank_title_is_invalid() {
        let mut popup = standalone(memory_store(tab())).await;
        popup.set_title("  ");
        assert_eq!(
            popup.confirm().await,
            ConfirmOutcome::Invalid {
                message: "Please enter a bookmark name".to_string()
            }
        );
    }

    #[tokio::test]
    async fn failed_save_reloads_created_folders() {
        let store = memory_store(None);
        let mut popup = standalone(store.clone()).await;
        popup.set_title("Later");
        popup.picker_mut().input_changed("Reading");

        let outcome = popup.confirm().await;
        assert_eq!(
            outcome,
            ConfirmOutcome::Failed {
                message: "Failed to save bookmark, please retry".to_string()
            }
        );
        assert!(popup
            .picker()
            .matches()
            .iter()
            .any(|record| record.path == "Bookmarks Bar/Reading"));
    }

    #[tokio::test]
    async fn cancel_follows_host() {
        let popup = standalone(memory_store(tab())).await;
        assert_eq!(popup.cancel(), CloseRequest::CloseWindow);
    }
}
