use std::fmt;

use folder_index::FolderIndexError;

/// Unified error type for the quickmark crate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// The folder path had no non-blank parts.
    EmptyPath,
    /// Neither the extension bridge nor a profile bookmarks file is available.
    UnsupportedStore,
    /// The active tab, or its URL, could not be read.
    TabUnavailable(String),
    /// A bookmark store call failed.
    Store(String),
    /// Invalid input provided by the caller.
    InvalidInput(String),
    /// Internal error.
    Internal(String),
}

impl fmt::Display for CoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoreError::EmptyPath => write!(f, "folder path cannot be empty"),
            CoreError::UnsupportedStore => write!(f, "no supported bookmark store is available"),
            CoreError::TabUnavailable(msg) => write!(f, "cannot read the current tab: {msg}"),
            CoreError::Store(msg) => write!(f, "bookmark store error: {msg}"),
            CoreError::InvalidInput(msg) => write!(f, "invalid input: {msg}"),
            CoreError::Internal(msg) => write!(f, "internal error: {msg}"),
        }
    }
}

impl std::error::Error for CoreError {}

impl From<FolderIndexError> for CoreError {
    fn from(err: FolderIndexError) -> Self {
        match err {
            FolderIndexError::EmptyPath => CoreError::EmptyPath,
        }
    }
}

/// Result type alias using [`CoreError`].
pub type CoreResult<T> = Result<T, CoreError>;
