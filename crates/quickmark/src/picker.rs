//! Folder picker state: the type-ahead input, its dropdown and the selection.
//!
//! The picker is driven by input events (`input_changed`, `key`, `select`,
//! `focus`, `blur`) and renders through [`FolderPicker::view`]. It never talks
//! to the store; the popup hands it a fresh folder list via `set_folders`.

use folder_index::{highlight_path, match_folders, FolderRecord, HighlightedSegment};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

use crate::error::{CoreError, CoreResult};

/// Keys the picker reacts to, named as the DOM reports them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PickerKey {
    ArrowDown,
    ArrowUp,
    Tab,
    Enter,
    Escape,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum KeyOutcome {
    /// The key should keep its default behavior.
    Ignored,
    Handled,
    /// Enter was pressed in the open dropdown; focus moves to the confirm button.
    Confirmed,
}

/// A matching folder with its path split into highlighted segments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FolderMatch {
    pub id: String,
    pub title: String,
    pub path: String,
    pub segments: Vec<HighlightedSegment>,
}

impl FolderMatch {
    pub fn new(record: &FolderRecord, query: &str) -> Self {
        Self {
            id: record.id.clone(),
            title: record.title.clone(),
            path: record.path.clone(),
            segments: highlight_path(&record.path, query),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PickerView {
    pub input: String,
    pub open: bool,
    pub matches: Vec<FolderMatch>,
    pub highlighted_index: usize,
    pub selected_folder_id: Option<String>,
    pub pending_creation: Option<String>,
}

#[derive(Debug, Clone)]
pub struct FolderPicker {
    folders: Vec<FolderRecord>,
    input: String,
    matches: Vec<FolderRecord>,
    highlighted: usize,
    open: bool,
    selected: Option<String>,
    blur_select_delay: Duration,
    blur_deadline: Option<Instant>,
}

impl FolderPicker {
    pub fn new(blur_select_delay: Duration) -> Self {
        Self {
            folders: Vec::new(),
            input: String::new(),
            matches: Vec::new(),
            highlighted: 0,
            open: false,
            selected: None,
            blur_select_delay,
            blur_deadline: None,
        }
    }

    /// Replaces the folder list and re-filters the current input.
    ///
    /// A selected folder that still exists has its path copied into the
    /// input. One that disappeared is deselected.
    pub fn set_folders(&mut self, folders: Vec<FolderRecord>) {
        self.folders = folders;
        if let Some(id) = self.selected.clone() {
            match self.folders.iter().find(|folder| folder.id == id) {
                Some(folder) => self.input = folder.path.clone(),
                None => self.selected = None,
            }
        }
        self.refilter();
        self.clamp_highlight();
    }

    pub fn input_changed(&mut self, text: impl Into<String>) {
        self.input = text.into();
        self.refilter();
        self.highlighted = 0;
        self.open = true;
        if self.selected_folder().map(|folder| folder.path.as_str()) != Some(self.input.as_str()) {
            self.selected = None;
        }
    }

    pub fn key(&mut self, key: PickerKey) -> KeyOutcome {
        if !self.open {
            return match key {
                PickerKey::ArrowDown | PickerKey::Enter => {
                    self.open = true;
                    KeyOutcome::Handled
                }
                _ => KeyOutcome::Ignored,
            };
        }

        match key {
            PickerKey::ArrowDown => {
                if self.highlighted + 1 < self.matches.len() {
                    self.highlighted += 1;
                }
                KeyOutcome::Handled
            }
            PickerKey::ArrowUp => {
                self.highlighted = self.highlighted.saturating_sub(1);
                KeyOutcome::Handled
            }
            PickerKey::Tab => {
                if self.matches.is_empty() {
                    return KeyOutcome::Ignored;
                }
                self.choose(self.highlighted);
                KeyOutcome::Handled
            }
            PickerKey::Enter => {
                if !self.matches.is_empty() {
                    self.choose(self.highlighted);
                } else if !self.input.is_empty() {
                    self.selected = None;
                }
                self.open = false;
                KeyOutcome::Confirmed
            }
            PickerKey::Escape => {
                self.open = false;
                KeyOutcome::Handled
            }
        }
    }

    /// Selects the match at `index` and closes the dropdown.
    pub fn select(&mut self, index: usize) -> CoreResult<()> {
        if index >= self.matches.len() {
            return Err(CoreError::InvalidInput(format!(
                "no folder match at index {index}"
            )));
        }
        self.choose(index);
        self.open = false;
        Ok(())
    }

    pub fn focus(&mut self) {
        self.blur_deadline = None;
    }

    /// Arms the auto-select timer; [`poll`](Self::poll) fires it.
    pub fn blur(&mut self, now: Instant) {
        self.blur_deadline = Some(now + self.blur_select_delay);
    }

    /// Fires an expired blur timer. Returns true when it selected a folder.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.blur_deadline {
            Some(deadline) if now >= deadline => self.blur_deadline = None,
            _ => return false,
        }
        if self.matches.len() == 1 && self.selected.is_none() {
            self.choose(0);
            self.open = false;
            return true;
        }
        false
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn matches(&self) -> &[FolderRecord] {
        &self.matches
    }

    pub fn highlighted_index(&self) -> usize {
        self.highlighted
    }

    pub fn blur_pending(&self) -> bool {
        self.blur_deadline.is_some()
    }

    pub fn blur_select_delay(&self) -> Duration {
        self.blur_select_delay
    }

    pub fn selected_folder_id(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn selected_folder(&self) -> Option<&FolderRecord> {
        let id = self.selected.as_deref()?;
        self.folders.iter().find(|folder| folder.id == id)
    }

    /// The typed path that saving will create, when no folder is selected.
    pub fn pending_creation(&self) -> Option<&str> {
        if self.selected.is_some() || self.input.trim().is_empty() {
            return None;
        }
        Some(&self.input)
    }

    pub fn highlighted_matches(&self) -> Vec<FolderMatch> {
        self.matches
            .iter()
            .map(|record| FolderMatch::new(record, &self.input))
            .collect()
    }

    pub fn view(&self) -> PickerView {
        PickerView {
            input: self.input.clone(),
            open: self.open,
            matches: self.highlighted_matches(),
            highlighted_index: self.highlighted,
            selected_folder_id: self.selected.clone(),
            pending_creation: self.pending_creation().map(str::to_string),
        }
    }

    fn choose(&mut self, index: usize) {
        let Some(folder) = self.matches.get(index).cloned() else {
            return;
        };
        self.input = folder.path;
        self.selected = Some(folder.id);
        self.refilter();
        self.clamp_highlight();
    }

    fn refilter(&mut self) {
        self.matches = match_folders(&self.input, &self.folders)
            .into_iter()
            .cloned()
            .collect();
    }

    fn clamp_highlight(&mut self) {
        if self.highlighted >= self.matches.len() {
            self.highlighted = self.matches.len().saturating_sub(1);
        }
    }
}
