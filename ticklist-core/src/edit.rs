//! In-progress edit of a single task

use crate::task::{TaskId, normalize_text};

/// An open edit: which task is being edited and its unsaved text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditSession {
    pub target: TaskId,
    pub draft: String,
}

impl EditSession {
    pub fn new(target: TaskId, draft: impl Into<String>) -> Self {
        Self {
            target,
            draft: draft.into(),
        }
    }

    /// The draft as it would be saved, or `None` if it is blank
    pub fn committed_text(&self) -> Option<&str> {
        normalize_text(&self.draft)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_committed_text_trims() {
        let session = EditSession::new(TaskId(1), "  New text ");
        assert_eq!(session.committed_text(), Some("New text"));
    }

    #[test]
    fn test_blank_draft_has_no_committed_text() {
        let session = EditSession::new(TaskId(1), " \t");
        assert_eq!(session.committed_text(), None);
    }
}
