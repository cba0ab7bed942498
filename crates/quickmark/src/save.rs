//! Saving the current tab as a bookmark.

use folder_index::FolderPath;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::CoreError;
use crate::resolver::FolderResolver;
use crate::store::{created_id, current_tab_url, CreateNode, SharedStore};

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveRequest {
    pub title: String,
    /// A folder chosen in the picker. Takes precedence over `folder_path`.
    #[serde(default)]
    pub folder_id: Option<String>,
    /// A typed path, created when missing.
    #[serde(default)]
    pub folder_path: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedBookmark {
    pub id: String,
    pub parent_id: String,
    pub title: String,
    pub url: String,
}

/// Why a save did not happen. The messages are shown to the user as is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveError {
    MissingTitle,
    Failed(CoreError),
}

impl fmt::Display for SaveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SaveError::MissingTitle => write!(f, "Please enter a bookmark name"),
            SaveError::Failed(_) => write!(f, "Failed to save bookmark, please retry"),
        }
    }
}

impl std::error::Error for SaveError {}

/// Creates a bookmark for the active tab.
///
/// The parent is the selected folder, else the typed path (created as needed),
/// else the resolver's root folder. Folders created before a later step fails
/// are kept.
pub async fn save_bookmark(
    store: &SharedStore,
    resolver: &FolderResolver,
    request: &SaveRequest,
) -> Result<SavedBookmark, SaveError> {
    let title = request.title.trim();
    if title.is_empty() {
        return Err(SaveError::MissingTitle);
    }

    match create_bookmark(store, resolver, request, title).await {
        Ok(saved) => {
            tracing::info!(
                "saved bookmark {} ({}) under {}",
                saved.title,
                saved.id,
                saved.parent_id
            );
            Ok(saved)
        }
        Err(error) => {
            tracing::error!("failed to save bookmark {title:?}: {error}");
            Err(SaveError::Failed(error))
        }
    }
}

async fn create_bookmark(
    store: &SharedStore,
    resolver: &FolderResolver,
    request: &SaveRequest,
    title: &str,
) -> Result<SavedBookmark, CoreError> {
    let parent_id = target_folder(resolver, request).await?;
    let url = current_tab_url(store.as_ref()).await?;
    let created = store
        .create(CreateNode::bookmark(parent_id.as_str(), title, url.as_str()))
        .await?;
    Ok(SavedBookmark {
        id: created_id(&created)?,
        parent_id,
        title: title.to_string(),
        url,
    })
}

async fn target_folder(
    resolver: &FolderResolver,
    request: &SaveRequest,
) -> Result<String, CoreError> {
    if let Some(id) = request.folder_id.as_deref().filter(|id| !id.is_empty()) {
        return Ok(id.to_string());
    }
    // A path of only blanks and slashes names no folder.
    if let Some(path) = request
        .folder_path
        .as_deref()
        .filter(|path| FolderPath::parse(path).is_ok())
    {
        return resolver.resolve(path).await;
    }
    Ok(resolver.root_id().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::folders::FolderCache;
    use crate::store::{ActiveTab, MemoryStore};
    use folder_index::FolderNode;
    use std::sync::Arc;

    fn tab() -> Option<ActiveTab> {
        Some(ActiveTab {
            title: "Rust Blog".to_string(),
            url: "https://blog.rust-lang.org/".to_string(),
        })
    }

    fn setup(tab: Option<ActiveTab>) -> (Arc<MemoryStore>, SharedStore, FolderResolver) {
        let memory = Arc::new(
            MemoryStore::new(vec![FolderNode::folder(
                "1",
                "Bookmarks Bar",
                vec![FolderNode::folder("2", "Work", Vec::new())],
            )])
            .with_active_tab(tab),
        );
        let store: SharedStore = memory.clone();
        let resolver = FolderResolver::new(store.clone(), FolderCache::new(store.clone()), "1");
        (memory, store, resolver)
    }

    fn request(title: &str, folder_id: Option<&str>, folder_path: Option<&str>) -> SaveRequest {
        SaveRequest {
            title: title.to_string(),
            folder_id: folder_id.map(str::to_string),
            folder_path: folder_path.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn saves_into_new_folder_path() {
        let (memory, store, resolver) = setup(tab());

        let request = request("Rust Blog", None, Some("Bookmarks Bar/News"));
        let saved = save_bookmark(&store, &resolver, &request)
            .await
            .expect("save");

        let created = memory.created().await;
        assert_eq!(created.len(), 2);
        assert_eq!(created[0], CreateNode::folder("1", "News"));
        assert_eq!(
            created[1],
            CreateNode::bookmark("3", "Rust Blog", "https://blog.rust-lang.org/")
        );
        assert_eq!(saved.parent_id, "3");
        assert_eq!(saved.id, "4");
    }

    #[tokio::test]
    async fn selected_folder_wins_over_typed_path() {
        let (memory, store, resolver) = setup(tab());
        let saved = save_bookmark(&store, &resolver, &request("Rust", Some("2"), Some("Elsewhere")))
            .await
            .expect("save");
        assert_eq!(saved.parent_id, "2");
        assert_eq!(memory.created_folders().await, 0);
    }

    #[tokio::test]
    async fn falls_back_to_root_folder() {
        let (_memory, store, resolver) = setup(tab());
        let saved = save_bookmark(&store, &resolver, &request("Rust", None, None))
            .await
            .expect("save");
        assert_eq!(saved.parent_id, "1");

        let saved = save_bookmark(&store, &resolver, &request("Rust", Some(""), Some(" / ")))
            .await
            .expect("save");
        assert_eq!(saved.parent_id, "1");
    }

    #[tokio::test]
    async fn blank_title_is_rejected_without_store_calls() {
        let (memory, store, resolver) = setup(tab());
        let result = save_bookmark(&store, &resolver, &request("   ", None, Some("News"))).await;
        assert_eq!(result, Err(SaveError::MissingTitle));
        assert!(memory.created().await.is_empty());
    }

    #[tokio::test]
    async fn title_is_trimmed() {
        let (_memory, store, resolver) = setup(tab());
        let saved = save_bookmark(&store, &resolver, &request("  Rust Blog ", None, None))
            .await
            .expect("save");
        assert_eq!(saved.title, "Rust Blog");
    }

    #[tokio::test]
    async fn missing_tab_fails_after_creating_folders() {
        let (memory, store, resolver) = setup(None);
        let result = save_bookmark(&store, &resolver, &request("Rust", None, Some("News"))).await;

        let error = match result {
            Err(SaveError::Failed(error)) => error,
            other => panic!("expected failure, got {other:?}"),
        };
        assert!(matches!(error, CoreError::TabUnavailable(_)));
        assert_eq!(
            SaveError::Failed(error).to_string(),
            "Failed to save bookmark, please retry"
        );
        assert_eq!(memory.created_folders().await, 1);
        assert_eq!(memory.created().await.len(), 1);
    }
}
