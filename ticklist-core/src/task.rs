//! Task domain model
//!
//! Pure domain logic for the task list with no I/O operations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Newtype wrapper for task IDs
///
/// IDs are stable for the lifetime of a loaded collection but are not
/// persisted: hydration hands out fresh ones in display order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(pub u32);

impl From<u32> for TaskId {
    fn from(id: u32) -> Self {
        TaskId(id)
    }
}

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single task
///
/// Serializes to the persisted record shape
/// `{"text": .., "completed": .., "createdAt": ..}`.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    #[serde(skip)]
    pub id: TaskId,
    pub text: String,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
}

/// Persisted record as read back, before normalization
///
/// Records written before timestamps existed have no `createdAt`.
#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct StoredTask {
    text: String,
    #[serde(default)]
    completed: bool,
    #[serde(default)]
    created_at: Option<DateTime<Utc>>,
}

impl Task {
    /// Create a new, incomplete task stamped with the current time
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            id: TaskId::default(),
            text: text.into(),
            completed: false,
            created_at: Utc::now(),
        }
    }

    /// Builder method to set task ID
    pub fn with_id(mut self, id: impl Into<TaskId>) -> Self {
        self.id = id.into();
        self
    }

    /// Builder method to set the creation timestamp
    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }

    /// Toggle completion status
    pub fn toggle_complete(&mut self) {
        self.completed = !self.completed;
    }
}

/// Trim user input, rejecting text that is empty after trimming
pub fn normalize_text(raw: &str) -> Option<&str> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

/// Ordered in-memory collection of tasks
///
/// Insertion order is display order. This is a pure domain model with no
/// I/O operations; persistence is handled through [`crate::Persistence`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskCollection {
    tasks: Vec<Task>,
    next_id: u32,
}

impl Default for TaskCollection {
    fn default() -> Self {
        Self::new()
    }
}

impl TaskCollection {
    /// Create a new empty task collection
    pub fn new() -> Self {
        TaskCollection {
            tasks: Vec::new(),
            next_id: 1,
        }
    }

    /// Parse the persisted JSON array form
    ///
    /// Stored text is trimmed and blank records are dropped, so hydrated
    /// data follows the same rule as [`Self::add`]. Records without a
    /// timestamp are stamped with the load time. Every kept record gets a
    /// fresh ID. The returned flag is set when any record was changed this
    /// way, meaning the stored form is stale and should be written back
    /// once so the repair sticks.
    pub fn from_json(json: &str) -> Result<(Self, bool)> {
        let records: Vec<StoredTask> = serde_json::from_str(json)?;
        let now = Utc::now();
        let mut collection = Self::new();
        let mut repaired = false;

        for record in records {
            let Some(text) = normalize_text(&record.text) else {
                log::warn!("Dropping stored task with empty text");
                repaired = true;
                continue;
            };
            repaired |= text.len() != record.text.len() || record.created_at.is_none();

            let task = Task {
                id: TaskId::default(),
                text: text.to_string(),
                completed: record.completed,
                created_at: record.created_at.unwrap_or(now),
            };
            collection.insert(task);
        }

        Ok((collection, repaired))
    }

    /// Serialize to the persisted JSON array form
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.tasks)?)
    }

    /// Append a new task, returning its ID
    ///
    /// Returns `None` without touching the collection when `raw` is blank.
    pub fn add(&mut self, raw: &str) -> Option<TaskId> {
        let text = normalize_text(raw)?;
        let id = self.allocate_id();
        self.tasks.push(Task::new(text).with_id(id));
        Some(id)
    }

    /// Append an existing task, assigning it the next ID
    pub fn insert(&mut self, task: Task) -> TaskId {
        let id = self.allocate_id();
        self.tasks.push(task.with_id(id));
        id
    }

    fn allocate_id(&mut self) -> TaskId {
        let id = TaskId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Get a task by ID
    pub fn get(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    /// Get a mutable reference to a task by ID
    pub fn get_mut(&mut self, id: TaskId) -> Option<&mut Task> {
        self.tasks.iter_mut().find(|t| t.id == id)
    }

    /// Position of a task in display order
    pub fn position(&self, id: TaskId) -> Option<usize> {
        self.tasks.iter().position(|t| t.id == id)
    }

    /// Remove a task by ID
    pub fn remove(&mut self, id: TaskId) -> Option<Task> {
        let pos = self.position(id)?;
        Some(self.tasks.remove(pos))
    }

    /// Remove all completed tasks, returns count of removed tasks
    pub fn remove_completed(&mut self) -> usize {
        let before = self.tasks.len();
        self.tasks.retain(|t| !t.completed);
        before - self.tasks.len()
    }

    /// Iterate in display order
    pub fn iter(&self) -> std::slice::Iter<'_, Task> {
        self.tasks.iter()
    }

    /// All tasks in display order
    pub fn as_slice(&self) -> &[Task] {
        &self.tasks
    }

    /// Count total tasks
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Check if collection is empty
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Count completed tasks
    pub fn count_completed(&self) -> usize {
        self.tasks.iter().filter(|t| t.completed).count()
    }

    /// Count tasks still to do
    pub fn count_active(&self) -> usize {
        self.tasks.iter().filter(|t| !t.completed).count()
    }
}

impl<'a> IntoIterator for &'a TaskCollection {
    type Item = &'a Task;
    type IntoIter = std::slice::Iter<'a, Task>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
