//! Bookmark store over a Chromium profile `Bookmarks` file.
//!
//! The file keeps three permanent roots (`bookmark_bar` = `"1"`,
//! `other` = `"2"`, `synced` = `"3"`). They are presented under an untitled
//! root `"0"`, matching what `chrome.bookmarks.getTree` returns. The browser
//! should not be running while the file is rewritten.

use async_trait::async_trait;
use folder_index::FolderNode;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::error::{CoreError, CoreResult};
use crate::store::{ActiveTab, BookmarkStore, CreateNode, StoreKind};

const ROOT_ID: &str = "0";
const FOLDER_TYPE: &str = "folder";
const URL_TYPE: &str = "url";

/// Microseconds between 1601-01-01 (the Windows epoch Chromium uses) and 1970-01-01.
const WINDOWS_EPOCH_OFFSET_MICROS: i64 = 11_644_473_600_000_000;

/// Clones made with [`for_tab`](ProfileStore::for_tab) share one write lock,
/// so every writer of a file should derive from a single `ProfileStore`.
pub struct ProfileStore {
    path: PathBuf,
    active_tab: Option<ActiveTab>,
    write_lock: Arc<Mutex<()>>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ProfileFile {
    #[serde(default, skip_serializing)]
    checksum: Option<String>,
    roots: ProfileRoots,
    #[serde(default = "default_version")]
    version: u32,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ProfileRoots {
    bookmark_bar: ProfileNode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    other: Option<ProfileNode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    synced: Option<ProfileNode>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ProfileNode {
    id: String,
    #[serde(default)]
    name: String,
    #[serde(rename = "type")]
    kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    children: Option<Vec<ProfileNode>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    date_added: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    guid: Option<String>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

fn default_version() -> u32 {
    1
}

impl ProfileNode {
    fn is_folder(&self) -> bool {
        self.kind == FOLDER_TYPE
    }

    /// Converts to the browser API shape. Iterative so deep trees are safe.
    fn to_folder_node(&self, parent_id: Option<&str>) -> FolderNode {
        // Each frame is a converted node still collecting its children.
        let mut stack = vec![(self, Self::shallow(self, parent_id), 0usize)];
        let mut converted_root = None;
        while let Some(top) = stack.last_mut() {
            let source: &ProfileNode = top.0;
            if let Some(child) = source.children.as_deref().and_then(|c| c.get(top.2)) {
                top.2 += 1;
                stack.push((child, Self::shallow(child, Some(source.id.as_str())), 0));
                continue;
            }
            let Some((_, done, _)) = stack.pop() else {
                break;
            };
            match stack.last_mut() {
                Some(parent) => parent.1.children.get_or_insert_with(Vec::new).push(done),
                None => converted_root = Some(done),
            }
        }
        converted_root.unwrap_or_else(|| Self::shallow(self, parent_id))
    }

    fn shallow(node: &ProfileNode, parent_id: Option<&str>) -> FolderNode {
        FolderNode {
            id: Some(node.id.clone()),
            parent_id: parent_id.map(str::to_string),
            title: node.name.clone(),
            url: node.url.clone(),
            children: node.is_folder().then(Vec::new),
        }
    }
}

impl ProfileFile {
    fn roots(&self) -> impl Iterator<Item = &ProfileNode> {
        std::iter::once(&self.roots.bookmark_bar)
            .chain(self.roots.other.as_ref())
            .chain(self.roots.synced.as_ref())
    }

    fn roots_mut(&mut self) -> Vec<&mut ProfileNode> {
        let mut roots = vec![&mut self.roots.bookmark_bar];
        roots.extend(self.roots.other.as_mut());
        roots.extend(self.roots.synced.as_mut());
        roots
    }

    fn to_tree(&self) -> Vec<FolderNode> {
        let children = self
            .roots()
            .map(|node| node.to_folder_node(Some(ROOT_ID)))
            .collect();
        vec![FolderNode {
            id: Some(ROOT_ID.to_string()),
            parent_id: None,
            title: String::new(),
            url: None,
            children: Some(children),
        }]
    }

    fn max_id(&self) -> u64 {
        let mut max = 0;
        let mut stack: Vec<&ProfileNode> = self.roots().collect();
        while let Some(node) = stack.pop() {
            if let Ok(id) = node.id.parse::<u64>() {
                max = max.max(id);
            }
            if let Some(children) = node.children.as_ref() {
                stack.extend(children);
            }
        }
        max
    }

    fn find_mut(&mut self, id: &str) -> Option<&mut ProfileNode> {
        let mut stack = self.roots_mut();
        while let Some(node) = stack.pop() {
            if node.id == id {
                return Some(node);
            }
            if let Some(children) = node.children.as_mut() {
                stack.extend(children.iter_mut());
            }
        }
        None
    }
}

impl ProfileStore {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            active_tab: None,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Same file and write lock, reporting `tab` as the active tab.
    pub fn for_tab(&self, tab: Option<ActiveTab>) -> Self {
        Self {
            path: self.path.clone(),
            active_tab: tab,
            write_lock: self.write_lock.clone(),
        }
    }

    /// Tab reported by `query_active_tab`, since the file has no notion of one.
    pub fn with_active_tab(mut self, tab: Option<ActiveTab>) -> Self {
        self.active_tab = tab;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> CoreResult<ProfileFile> {
        let bytes = tokio::fs::read(&self.path).await.map_err(|error| {
            CoreError::Store(format!(
                "failed to read bookmarks file {}: {error}",
                self.path.display()
            ))
        })?;
        serde_json::from_slice(&bytes).map_err(|error| {
            CoreError::Store(format!(
                "failed to parse bookmarks file {}: {error}",
                self.path.display()
            ))
        })
    }

    async fn save(&self, file: &ProfileFile) -> CoreResult<()> {
        if file.checksum.is_some() {
            // Chromium recomputes a missing checksum but distrusts a stale one.
            tracing::debug!("dropping bookmarks checksum from {}", self.path.display());
        }
        let serialized = serde_json::to_vec_pretty(file)
            .map_err(|error| CoreError::Internal(format!("bookmarks serialize error: {error}")))?;
        let tmp = self
            .path
            .with_extension(format!("quickmark-{}.tmp", uuid::Uuid::new_v4().simple()));
        tokio::fs::write(&tmp, serialized).await.map_err(|error| {
            CoreError::Store(format!("failed to write {}: {error}", tmp.display()))
        })?;
        tokio::fs::rename(&tmp, &self.path).await.map_err(|error| {
            CoreError::Store(format!(
                "failed to replace bookmarks file {}: {error}",
                self.path.display()
            ))
        })
    }
}

#[async_trait]
impl BookmarkStore for ProfileStore {
    fn kind(&self) -> StoreKind {
        StoreKind::Profile
    }

    async fn get_tree(&self) -> CoreResult<Vec<FolderNode>> {
        Ok(self.load().await?.to_tree())
    }

    async fn create(&self, node: CreateNode) -> CoreResult<FolderNode> {
        let _guard = self.write_lock.lock().await;
        let mut file = self.load().await?;
        let id = (file.max_id() + 1).to_string();

        let created = ProfileNode {
            id: id.clone(),
            name: node.title.clone(),
            kind: (if node.is_folder() { FOLDER_TYPE } else { URL_TYPE }).to_string(),
            url: node.url.clone(),
            children: node.is_folder().then(Vec::new),
            date_added: Some(chromium_now()),
            guid: Some(uuid::Uuid::new_v4().to_string()),
            extra: Map::new(),
        };

        let parent = file.find_mut(&node.parent_id).ok_or_else(|| {
            CoreError::Store(format!("can't find parent bookmark {}", node.parent_id))
        })?;
        if !parent.is_folder() {
            return Err(CoreError::Store(format!(
                "parent {} is not a folder",
                node.parent_id
            )));
        }
        parent.children.get_or_insert_with(Vec::new).push(created.clone());

        self.save(&file).await?;
        tracing::debug!("created bookmark node {id} under {}", node.parent_id);
        Ok(ProfileNode::shallow(&created, Some(node.parent_id.as_str())))
    }

    async fn query_active_tab(&self) -> CoreResult<ActiveTab> {
        self.active_tab.clone().ok_or_else(|| {
            CoreError::TabUnavailable("no tab supplied for the bookmarks file store".to_string())
        })
    }
}

/// Current time as Chromium stores it: microseconds since 1601-01-01, as a string.
fn chromium_now() -> String {
    (chrono::Utc::now().timestamp_micros() + WINDOWS_EPOCH_OFFSET_MICROS).to_string()
}
