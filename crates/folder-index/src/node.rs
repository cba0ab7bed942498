use serde::{Deserialize, Serialize};

/// A node of the browser bookmark tree, as returned by `bookmarks.getTree`.
///
/// A node that carries `children` (even an empty list) is a folder; a node
/// without `children` is a bookmark leaf.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FolderNode {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<FolderNode>>,
}

impl FolderNode {
    pub fn folder(
        id: impl Into<String>,
        title: impl Into<String>,
        children: Vec<FolderNode>,
    ) -> Self {
        Self {
            id: Some(id.into()),
            parent_id: None,
            title: title.into(),
            url: None,
            children: Some(children),
        }
    }

    pub fn bookmark(
        id: impl Into<String>,
        title: impl Into<String>,
        url: impl Into<String>,
    ) -> Self {
        Self {
            id: Some(id.into()),
            parent_id: None,
            title: title.into(),
            url: Some(url.into()),
            children: None,
        }
    }

    pub fn is_folder(&self) -> bool {
        self.children.is_some()
    }

    /// The node id, treating an empty string the same as a missing id.
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref().filter(|id| !id.is_empty())
    }

    pub fn children(&self) -> &[FolderNode] {
        self.children.as_deref().unwrap_or(&[])
    }
}
