//! In-memory bookmark store for tests and demos.

use async_trait::async_trait;
use folder_index::FolderNode;
use tokio::sync::Mutex;

use crate::error::{CoreError, CoreResult};
use crate::store::{ActiveTab, BookmarkStore, CreateNode, StoreKind};

#[derive(Debug)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
    active_tab: Option<ActiveTab>,
}

#[derive(Debug)]
struct MemoryState {
    roots: Vec<FolderNode>,
    next_id: u64,
    created: Vec<CreateNode>,
}

impl MemoryStore {
    pub fn new(roots: Vec<FolderNode>) -> Self {
        let next_id = max_numeric_id(&roots) + 1;
        Self {
            state: Mutex::new(MemoryState {
                roots,
                next_id,
                created: Vec::new(),
            }),
            active_tab: None,
        }
    }

    pub fn with_active_tab(mut self, tab: Option<ActiveTab>) -> Self {
        self.active_tab = tab;
        self
    }

    /// Every successful `create` call, in order.
    pub async fn created(&self) -> Vec<CreateNode> {
        self.state.lock().await.created.clone()
    }

    pub async fn created_folders(&self) -> usize {
        self.state
            .lock()
            .await
            .created
            .iter()
            .filter(|node| node.is_folder())
            .count()
    }
}

#[async_trait]
impl BookmarkStore for MemoryStore {
    fn kind(&self) -> StoreKind {
        StoreKind::Memory
    }

    async fn get_tree(&self) -> CoreResult<Vec<FolderNode>> {
        Ok(self.state.lock().await.roots.clone())
    }

    async fn create(&self, node: CreateNode) -> CoreResult<FolderNode> {
        let mut state = self.state.lock().await;
        let id = state.next_id.to_string();
        let created = FolderNode {
            id: Some(id),
            parent_id: Some(node.parent_id.clone()),
            title: node.title.clone(),
            url: node.url.clone(),
            children: node.is_folder().then(Vec::new),
        };

        let parent = find_node_mut(&mut state.roots, &node.parent_id).ok_or_else(|| {
            CoreError::Store(format!("can't find parent bookmark {}", node.parent_id))
        })?;
        let Some(children) = parent.children.as_mut() else {
            return Err(CoreError::Store(format!(
                "parent {} is not a folder",
                node.parent_id
            )));
        };
        children.push(created.clone());

        state.next_id += 1;
        state.created.push(node);
        Ok(created)
    }

    async fn query_active_tab(&self) -> CoreResult<ActiveTab> {
        self.active_tab
            .clone()
            .ok_or_else(|| CoreError::TabUnavailable("no active tab".to_string()))
    }
}

fn find_node_mut<'a>(roots: &'a mut [FolderNode], id: &str) -> Option<&'a mut FolderNode> {
    let mut stack: Vec<&'a mut FolderNode> = roots.iter_mut().collect();
    while let Some(node) = stack.pop() {
        if node.id() == Some(id) {
            return Some(node);
        }
        if let Some(children) = node.children.as_mut() {
            stack.extend(children.iter_mut());
        }
    }
    None
}

fn max_numeric_id(roots: &[FolderNode]) -> u64 {
    let mut max = 0;
    let mut stack: Vec<&FolderNode> = roots.iter().collect();
    while let Some(node) = stack.pop() {
        if let Some(id) = node.id().and_then(|id| id.parse::<u64>().ok()) {
            max = max.max(id);
        }
        stack.extend(node.children());
    }
    max
}
