//! Folder path parsing and prefix lookup inside a tree snapshot.

use std::fmt;

use crate::error::{FolderIndexError, Result};
use crate::node::FolderNode;

pub const PATH_SEPARATOR: char = '/';

/// Appends `title` to `parent`, or returns `title` alone at the root.
pub fn join_path(parent: &str, title: &str) -> String {
    if parent.is_empty() {
        title.to_string()
    } else {
        format!("{parent}{PATH_SEPARATOR}{title}")
    }
}

/// A user-typed folder path split into its title parts.
///
/// Parts are trimmed and empty parts are discarded, so `" Work / / News "`
/// parses to `["Work", "News"]`. A path is never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderPath {
    parts: Vec<String>,
}

impl FolderPath {
    pub fn parse(raw: &str) -> Result<Self> {
        let parts: Vec<String> = raw
            .split(PATH_SEPARATOR)
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(str::to_string)
            .collect();
        if parts.is_empty() {
            return Err(FolderIndexError::EmptyPath);
        }
        Ok(Self { parts })
    }

    pub fn parts(&self) -> &[String] {
        &self.parts
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// Every leading prefix, shortest first: `A`, `A/B`, `A/B/C`.
    pub fn prefixes(&self) -> impl Iterator<Item = &[String]> + '_ {
        (1..=self.parts.len()).map(move |end| &self.parts[..end])
    }
}

impl fmt::Display for FolderPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, part) in self.parts.iter().enumerate() {
            if index > 0 {
                write!(f, "{PATH_SEPARATOR}")?;
            }
            f.write_str(part)?;
        }
        Ok(())
    }
}

/// Finds the id of the folder reached by following `parts` from the tree root.
///
/// Each part must equal a folder title exactly at the matching depth. Untitled
/// folders above the first part (the browser's invisible root) are walked
/// through without consuming a part. Sibling folders sharing a title are tried
/// in order, and the first complete match in pre-order wins.
pub fn find_folder<'a>(roots: &'a [FolderNode], parts: &[String]) -> Option<&'a str> {
    let last = parts.len().checked_sub(1)?;
    let mut stack: Vec<(&FolderNode, usize)> = roots.iter().rev().map(|node| (node, 0)).collect();

    while let Some((node, depth)) = stack.pop() {
        if !node.is_folder() {
            continue;
        }
        if depth == 0 && node.title.is_empty() {
            stack.extend(node.children().iter().rev().map(|child| (child, 0)));
            continue;
        }
        if node.title != parts[depth] {
            continue;
        }
        if depth == last {
            if let Some(id) = node.id() {
                return Some(id);
            }
            continue;
        }
        stack.extend(node.children().iter().rev().map(|child| (child, depth + 1)));
    }

    None
}

/// Finds any node by id, pre-order.
pub fn find_node<'a>(roots: &'a [FolderNode], id: &str) -> Option<&'a FolderNode> {
    let mut stack: Vec<&FolderNode> = roots.iter().rev().collect();
    while let Some(node) = stack.pop() {
        if node.id() == Some(id) {
            return Some(node);
        }
        stack.extend(node.children().iter().rev());
    }
    None
}
