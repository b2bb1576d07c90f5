//! View filter over the task collection
//!
//! The filter never changes the collection; it only selects which tasks a
//! view shows, keeping their display order.

use crate::error::CoreError;
use crate::task::Task;

/// Which subset of tasks the view presents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FilterMode {
    #[default]
    All,
    Active,
    Completed,
}

impl FilterMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterMode::All => "All",
            FilterMode::Active => "Active",
            FilterMode::Completed => "Completed",
        }
    }

    /// Check if a task belongs to this view
    pub fn matches(&self, task: &Task) -> bool {
        match self {
            FilterMode::All => true,
            FilterMode::Active => !task.completed,
            FilterMode::Completed => task.completed,
        }
    }

    /// Apply the filter, preserving the input order
    pub fn apply<'a>(&self, tasks: impl IntoIterator<Item = &'a Task>) -> Vec<&'a Task> {
        tasks.into_iter().filter(|t| self.matches(t)).collect()
    }

    /// Resolve a position in the filtered view to the task at that position
    pub fn resolve<'a>(
        &self,
        tasks: impl IntoIterator<Item = &'a Task>,
        filtered_index: usize,
    ) -> Option<&'a Task> {
        tasks
            .into_iter()
            .filter(|t| self.matches(t))
            .nth(filtered_index)
    }
}

impl std::fmt::Display for FilterMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for FilterMode {
    type Err = CoreError;

    /// Parse case-insensitively
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "all" => Ok(Self::All),
            "active" | "open" => Ok(Self::Active),
            "completed" | "done" => Ok(Self::Completed),
            other => Err(CoreError::parse(format!("Unknown filter: {}", other))),
        }
    }
}
