//! Flattened folder records derived from a bookmark tree snapshot.

use serde::{Deserialize, Serialize};

use crate::matcher::match_folders;
use crate::node::FolderNode;
use crate::path::join_path;

/// A folder together with its `/`-joined chain of ancestor titles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FolderRecord {
    pub id: String,
    pub title: String,
    pub path: String,
}

/// Flattens a bookmark tree into folder records in pre-order.
///
/// Bookmark leaves are skipped. Folders without an id, or whose derived path
/// is empty (the browser's untitled root), produce no record, but their
/// children are still visited.
pub fn index_folders(roots: &[FolderNode]) -> Vec<FolderRecord> {
    let mut records = Vec::new();
    let mut stack: Vec<(&FolderNode, String)> = roots
        .iter()
        .rev()
        .map(|node| (node, String::new()))
        .collect();

    while let Some((node, parent_path)) = stack.pop() {
        if !node.is_folder() {
            continue;
        }
        let path = join_path(&parent_path, &node.title);
        for child in node.children().iter().rev() {
            stack.push((child, path.clone()));
        }
        let Some(id) = node.id() else {
            continue;
        };
        if path.is_empty() {
            continue;
        }
        records.push(FolderRecord {
            id: id.to_string(),
            title: node.title.clone(),
            path,
        });
    }

    log::debug!("indexed {} bookmark folders", records.len());
    records
}

/// Immutable snapshot of every folder in the store.
///
/// A new index is built after each fetch of the tree; an existing index is
/// never patched in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FolderIndex {
    records: Vec<FolderRecord>,
}

impl FolderIndex {
    pub fn build(roots: &[FolderNode]) -> Self {
        Self {
            records: index_folders(roots),
        }
    }

    pub fn from_records(records: Vec<FolderRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[FolderRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&FolderRecord> {
        self.records.iter().find(|record| record.id == id)
    }

    /// First folder whose path equals `path` exactly.
    pub fn find_by_path(&self, path: &str) -> Option<&FolderRecord> {
        self.records.iter().find(|record| record.path == path)
    }

    pub fn search(&self, query: &str) -> Vec<&FolderRecord> {
        match_folders(query, &self.records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_tree() -> Vec<FolderNode> {
        vec![FolderNode::folder(
            "0",
            "",
            vec![
                FolderNode::folder(
                    "1",
                    "Bookmarks bar",
                    vec![
                        FolderNode::folder(
                            "10",
                            "Work",
                            vec![
                                FolderNode::folder("11", "Projects", Vec::new()),
                                FolderNode::bookmark("12", "Tracker", "https://example.com/t"),
                            ],
                        ),
                        FolderNode::bookmark("13", "News", "https://example.com/news"),
                    ],
                ),
                FolderNode::folder("2", "Other bookmarks", Vec::new()),
            ],
        )]
    }

    #[test]
    fn flattens_in_pre_order() {
        let records = index_folders(&sample_tree());
        let paths: Vec<&str> = records.iter().map(|r| r.path.as_str()).collect();
        assert_eq!(
            paths,
            vec![
                "Bookmarks bar",
                "Bookmarks bar/Work",
                "Bookmarks bar/Work/Projects",
                "Other bookmarks",
            ]
        );
    }

    #[test]
    fn leaves_never_appear() {
        let records = index_folders(&sample_tree());
        assert!(records.iter().all(|r| r.id != "12" && r.id != "13"));
    }

    #[test]
    fn path_extends_parent_path() {
        let records = index_folders(&sample_tree());
        let index = FolderIndex::from_records(records.clone());
        for record in &records {
            match record.path.rsplit_once('/') {
                Some((parent_path, title)) => {
                    assert_eq!(title, record.title);
                    assert!(index.find_by_path(parent_path).is_some());
                }
                None => assert_eq!(record.path, record.title),
            }
        }
    }

    #[test]
    fn folders_without_id_are_dropped_but_children_kept() {
        let mut orphan = FolderNode::folder(
            "x",
            "Loose",
            vec![FolderNode::folder("7", "Inner", Vec::new())],
        );
        orphan.id = None;
        let records = index_folders(&[orphan]);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].path, "Loose/Inner");
    }

    #[test]
    fn same_tree_gives_same_index() {
        assert_eq!(FolderIndex::build(&sample_tree()), FolderIndex::build(&sample_tree()));
    }

    #[test]
    fn deep_trees_do_not_overflow() {
        let mut node = FolderNode::folder("leaf", "d", Vec::new());
        for depth in 0..5_000 {
            node = FolderNode::folder(depth.to_string(), "d", vec![node]);
        }
        let records = index_folders(std::slice::from_ref(&node));
        assert_eq!(records.len(), 5_001);
        std::mem::forget(node);
    }
}
