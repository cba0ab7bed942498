pub mod server;

pub mod browser;
pub mod config;
pub mod error;
pub mod folders;
pub mod host;
pub mod picker;
pub mod popup;
pub mod resolver;
pub mod save;
pub mod store;

pub use crate::config::QuickmarkConfig;
pub use crate::error::{CoreError, CoreResult};
pub use crate::folders::FolderCache;
pub use crate::host::{CloseRequest, HostFrame};
pub use crate::picker::{FolderPicker, KeyOutcome, PickerKey};
pub use crate::popup::{ConfirmOutcome, Popup};
pub use crate::resolver::FolderResolver;
pub use crate::save::{save_bookmark, SaveError, SaveRequest, SavedBookmark};
pub use crate::server::Server;
pub use crate::store::{detect_store, ActiveTab, BookmarkStore, CreateNode, SharedStore};
