//! Bookmark folder indexing and path search.
//!
//! This crate holds the synchronous core of the quick-bookmark popup:
//! - Flattening a bookmark tree snapshot into folder records with paths
//! - Segment-wise path matching for the folder picker
//! - Highlight spans for rendering matches
//! - Prefix lookup of a folder path inside a tree snapshot

pub mod error;
pub mod highlight;
pub mod matcher;
pub mod node;
pub mod path;
pub mod record;

// Re-export main types
pub use error::{FolderIndexError, Result};
pub use highlight::{highlight_path, highlight_text, HighlightSpan, HighlightedSegment};
pub use matcher::{match_folders, PathQuery, SegmentMatchKind, SegmentMatcher};
pub use node::FolderNode;
pub use path::{find_folder, find_node, join_path, FolderPath, PATH_SEPARATOR};
pub use record::{index_folders, FolderIndex, FolderRecord};
