//! How the popup asks to be closed.
//!
//! A popup opened from the toolbar closes its own window. A popup injected
//! into a page as a frame cannot do that and instead posts
//! `{ "from": <tag>, "action": "close" }` to its parent frame.

use serde::{Deserialize, Serialize};

pub const DEFAULT_HOST_MESSAGE_TAG: &str = "faster-bookmark-popup";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostFrame {
    Standalone,
    Embedded { tag: String },
}

impl HostFrame {
    pub fn detect(embedded: bool, tag: &str) -> Self {
        if embedded {
            HostFrame::Embedded {
                tag: tag.to_string(),
            }
        } else {
            HostFrame::Standalone
        }
    }

    pub fn is_embedded(&self) -> bool {
        matches!(self, HostFrame::Embedded { .. })
    }

    pub fn close_request(&self) -> CloseRequest {
        match self {
            HostFrame::Standalone => CloseRequest::CloseWindow,
            HostFrame::Embedded { tag } => CloseRequest::PostMessage {
                message: HostMessage {
                    from: tag.clone(),
                    action: HostAction::Close,
                },
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HostAction {
    Close,
}

/// Message posted to the parent frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostMessage {
    pub from: String,
    pub action: HostAction,
}

/// What the frontend must do to close the popup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum CloseRequest {
    CloseWindow,
    PostMessage { message: HostMessage },
}
