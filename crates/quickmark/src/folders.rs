//! Cached folder index shared by the picker, resolver and server.

use folder_index::FolderIndex;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::error::CoreResult;
use crate::store::SharedStore;

/// The latest [`FolderIndex`] built from the store.
///
/// `refresh` swaps in a freshly built index; readers holding the previous
/// snapshot keep a consistent view.
#[derive(Clone)]
pub struct FolderCache {
    store: SharedStore,
    index: Arc<RwLock<Arc<FolderIndex>>>,
}

impl FolderCache {
    pub fn new(store: SharedStore) -> Self {
        Self {
            store,
            index: Arc::new(RwLock::new(Arc::new(FolderIndex::default()))),
        }
    }

    pub async fn snapshot(&self) -> Arc<FolderIndex> {
        self.index.read().await.clone()
    }

    pub async fn refresh(&self) -> CoreResult<Arc<FolderIndex>> {
        let tree = self.store.get_tree().await?;
        let index = Arc::new(FolderIndex::build(&tree));
        tracing::debug!("folder index refreshed: {} folders", index.len());
        *self.index.write().await = index.clone();
        Ok(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{BookmarkStore, CreateNode, MemoryStore};
    use folder_index::FolderNode;

    #[tokio::test]
    async fn starts_empty_until_refreshed() {
        let store = Arc::new(MemoryStore::new(vec![FolderNode::folder("1", "Bar", Vec::new())]));
        let cache = FolderCache::new(store);
        assert!(cache.snapshot().await.is_empty());

        let index = cache.refresh().await.expect("refresh");
        assert_eq!(index.len(), 1);
        assert_eq!(cache.snapshot().await.records()[0].path, "Bar");
    }

    #[tokio::test]
    async fn refresh_replaces_old_snapshot() {
        let store = Arc::new(MemoryStore::new(vec![FolderNode::folder("1", "Bar", Vec::new())]));
        let cache = FolderCache::new(store.clone());
        let before = cache.refresh().await.expect("refresh");

        store.create(CreateNode::folder("1", "News")).await.expect("create");
        let after = cache.refresh().await.expect("refresh");

        assert_eq!(before.len(), 1);
        assert_eq!(after.len(), 2);
        assert!(after.find_by_path("Bar/News").is_some());
    }
}
