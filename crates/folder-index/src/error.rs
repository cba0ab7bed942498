#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FolderIndexError {
    #[error("folder path is empty")]
    EmptyPath,
}

pub type Result<T> = std::result::Result<T, FolderIndexError>;
