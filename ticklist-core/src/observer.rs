//! Rendering seam: what the store tells its views

use crate::edit::EditSession;
use crate::filter::FilterMode;
use crate::task::{Task, TaskId};

/// Color scheme derived from the dark-mode preference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn from_dark_mode(dark_mode: bool) -> Self {
        if dark_mode { Theme::Dark } else { Theme::Light }
    }

    pub fn is_dark(&self) -> bool {
        matches!(self, Theme::Dark)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }
}

/// One row of the filtered view
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisibleTask {
    /// Position in the filtered view, the index intents refer to
    pub index: usize,
    pub task: Task,
    /// An edit session is open on this task
    pub editing: bool,
    /// This task carries the removal-pending marker
    pub removing: bool,
}

/// Everything a renderer needs to draw the list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreView {
    pub tasks: Vec<VisibleTask>,
    pub filter: FilterMode,
    pub remaining: usize,
    pub total: usize,
    pub edit: Option<EditSession>,
    pub removal_marker: Option<TaskId>,
    pub theme: Theme,
    pub input: String,
}

impl StoreView {
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

/// Receives state changes from a [`crate::TaskListStore`]
///
/// Both methods default to doing nothing so observers only implement what
/// they care about.
pub trait StoreObserver {
    /// Called after any operation that changed observable state
    fn state_changed(&mut self, _view: &StoreView) {}

    /// Called when the theme should be (re)applied
    fn theme_changed(&mut self, _theme: Theme) {}
}
