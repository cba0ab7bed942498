//! Idempotent folder creation by path.

use folder_index::{find_folder, find_node, FolderNode, FolderPath};

use crate::error::CoreResult;
use crate::folders::FolderCache;
use crate::store::{created_id, CreateNode, SharedStore};

/// Ensures every folder of a path exists, creating only the missing suffix.
///
/// A path is looked up from the top of the tree first (`Bookmarks bar/News`)
/// and then relative to the root folder, where missing top-level parts are
/// created (`News`).
///
/// Calling [`resolve`](Self::resolve) again with the same path reuses the
/// folders created the first time. Two concurrent calls for the same new path
/// may both create it; there is no locking.
#[derive(Clone)]
pub struct FolderResolver {
    store: SharedStore,
    cache: FolderCache,
    root_id: String,
}

impl FolderResolver {
    pub fn new(store: SharedStore, cache: FolderCache, root_id: impl Into<String>) -> Self {
        Self {
            store,
            cache,
            root_id: root_id.into(),
        }
    }

    pub fn root_id(&self) -> &str {
        &self.root_id
    }

    /// Returns the id of the deepest folder of `raw_path`.
    pub async fn resolve(&self, raw_path: &str) -> CoreResult<String> {
        let path = FolderPath::parse(raw_path)?;
        let mut parent_id = self.root_id.clone();

        for prefix in path.prefixes() {
            let tree = self.store.get_tree().await?;
            if let Some(existing) = self.lookup(&tree, prefix) {
                parent_id = existing.to_string();
                continue;
            }
            let title = &prefix[prefix.len() - 1];
            let created = self
                .store
                .create(CreateNode::folder(parent_id.as_str(), title.as_str()))
                .await?;
            let id = created_id(&created)?;
            tracing::info!("created bookmark folder {title:?} ({id}) under {parent_id}");
            parent_id = id;
        }

        if let Err(error) = self.cache.refresh().await {
            tracing::warn!("failed to refresh folder index after resolving {path}: {error}");
        }
        Ok(parent_id)
    }

    fn lookup<'a>(&self, tree: &'a [FolderNode], prefix: &[String]) -> Option<&'a str> {
        find_folder(tree, prefix).or_else(|| {
            let root = find_node(tree, &self.root_id)?;
            find_folder(root.children(), prefix)
        })
    }
}
