//! The task-list state machine
//!
//! [`TaskListStore`] owns the task collection plus the view state around
//! it (filter, edit session, removal marker, theme, pending input). Every
//! intent a front end can forward is a method here. Intents that cannot
//! apply (blank text, an index outside the view, editing a completed
//! task) are silent no-ops; the return values only tell a front end
//! whether something happened.
//!
//! Tasks are addressed by their position in the *current filtered view*.
//! The position is resolved to a stable [`TaskId`] as soon as the intent
//! arrives, so deferred work (edits, pending removals) keeps pointing at
//! the right task even if the list changes underneath it.

use crate::edit::EditSession;
use crate::filter::FilterMode;
use crate::observer::{StoreObserver, StoreView, Theme, VisibleTask};
use crate::persist::{Persistence, StorageKey};
use crate::removal::PendingRemoval;
use crate::task::{Task, TaskCollection, TaskId};

pub struct TaskListStore<P: Persistence> {
    persistence: P,
    tasks: TaskCollection,
    edit: Option<EditSession>,
    filter: FilterMode,
    dark_mode: bool,
    input: String,
    removal_marker: Option<TaskId>,
    observers: Vec<Box<dyn StoreObserver>>,
}

impl<P: Persistence> TaskListStore<P> {
    /// Create an empty store; call [`Self::initialize`] to hydrate it
    pub fn new(persistence: P) -> Self {
        Self {
            persistence,
            tasks: TaskCollection::new(),
            edit: None,
            filter: FilterMode::default(),
            dark_mode: false,
            input: String::new(),
            removal_marker: None,
            observers: Vec::new(),
        }
    }

    /// Register a view that wants to hear about state and theme changes
    pub fn subscribe(&mut self, observer: Box<dyn StoreObserver>) {
        self.observers.push(observer);
    }

    /// Load the preference and the tasks, then apply the loaded theme
    ///
    /// Missing or unreadable data falls back to light mode and an empty
    /// list. Stored records that needed trimming or a timestamp are written
    /// back once, so reloading yields the same tasks.
    pub fn initialize(&mut self) {
        self.dark_mode = self.load_dark_mode();
        let (tasks, repaired) = self.load_tasks();
        self.tasks = tasks;
        self.edit = None;
        self.removal_marker = None;

        log::debug!(
            "Loaded {} task(s), dark mode {}",
            self.tasks.len(),
            self.dark_mode
        );

        if repaired {
            log::info!("Rewriting {} after normalizing stored records", StorageKey::Todos);
            self.persist_tasks();
        }

        self.apply_theme();
        self.notify();
    }

    fn load_dark_mode(&self) -> bool {
        match self.persistence.load(StorageKey::DarkMode) {
            Ok(Some(raw)) => serde_json::from_str::<bool>(raw.trim()).unwrap_or_else(|e| {
                log::warn!("Ignoring malformed {} value: {}", StorageKey::DarkMode, e);
                false
            }),
            Ok(None) => false,
            Err(e) => {
                log::warn!("Could not read {}: {}", StorageKey::DarkMode, e);
                false
            }
        }
    }

    fn load_tasks(&self) -> (TaskCollection, bool) {
        match self.persistence.load(StorageKey::Todos) {
            Ok(Some(raw)) => TaskCollection::from_json(&raw).unwrap_or_else(|e| {
                log::warn!("Ignoring malformed {} value: {}", StorageKey::Todos, e);
                (TaskCollection::new(), false)
            }),
            Ok(None) => (TaskCollection::new(), false),
            Err(e) => {
                log::warn!("Could not read {}: {}", StorageKey::Todos, e);
                (TaskCollection::new(), false)
            }
        }
    }

    /// Append a task with the trimmed text
    ///
    /// Blank text is ignored. On success the pending input is cleared.
    pub fn add_task(&mut self, raw: &str) -> Option<TaskId> {
        let id = self.tasks.add(raw)?;
        self.input.clear();
        self.persist_tasks();
        self.notify();
        Some(id)
    }

    /// Replace the text of the new-task input field
    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
        self.notify();
    }

    /// Add whatever is in the input field
    pub fn submit_input(&mut self) -> Option<TaskId> {
        let raw = self.input.clone();
        self.add_task(&raw)
    }

    /// Record that the task at `filtered_index` is about to be removed
    ///
    /// Only sets the visual marker; the collection is untouched until the
    /// returned removal is passed to [`Self::commit_removal`]. A later mark
    /// moves the marker but does not affect earlier pending removals.
    pub fn mark_for_removal(&mut self, filtered_index: usize) -> Option<PendingRemoval> {
        let id = self.resolve(filtered_index)?;
        self.removal_marker = Some(id);
        self.notify();
        Some(PendingRemoval::new(id))
    }

    /// Remove the task a pending removal points at
    ///
    /// Operates on the collection as it is now. Returns `None` if the task
    /// is already gone.
    pub fn commit_removal(&mut self, pending: PendingRemoval) -> Option<Task> {
        let id = pending.task();
        let marker_cleared = self.removal_marker == Some(id);
        if marker_cleared {
            self.removal_marker = None;
        }

        let removed = self.tasks.remove(id);
        if removed.is_some() {
            self.drop_dangling_edit();
            self.persist_tasks();
        }

        if removed.is_some() || marker_cleared {
            self.notify();
        }
        removed
    }

    /// Mark and immediately commit, for front ends without a fade-out
    pub fn remove_task(&mut self, filtered_index: usize) -> Option<Task> {
        let pending = self.mark_for_removal(filtered_index)?;
        self.commit_removal(pending)
    }

    /// Flip completion of the task at `filtered_index`, returning the new state
    ///
    /// An edit session on the same task stays open.
    pub fn toggle_complete(&mut self, filtered_index: usize) -> Option<bool> {
        let id = self.resolve(filtered_index)?;
        let task = self.tasks.get_mut(id)?;
        task.toggle_complete();
        let completed = task.completed;

        self.persist_tasks();
        self.notify();
        Some(completed)
    }

    /// Open an edit session on the task at `filtered_index`
    ///
    /// Completed tasks cannot be edited. Any previous session is abandoned
    /// without saving.
    pub fn start_edit(&mut self, filtered_index: usize) -> bool {
        let Some(task) = self.filter.resolve(&self.tasks, filtered_index) else {
            return false;
        };
        if task.completed {
            return false;
        }

        self.edit = Some(EditSession::new(task.id, task.text.clone()));
        self.notify();
        true
    }

    /// Replace the draft of the open session
    pub fn update_draft(&mut self, text: impl Into<String>) -> bool {
        let Some(session) = self.edit.as_mut() else {
            return false;
        };
        session.draft = text.into();
        self.notify();
        true
    }

    /// Write the trimmed draft into the task and close the session
    ///
    /// A blank draft keeps the session open and changes nothing.
    pub fn save_edit(&mut self) -> bool {
        let Some(session) = self.edit.as_ref() else {
            return false;
        };
        let Some(text) = session.committed_text().map(str::to_owned) else {
            return false;
        };
        let target = session.target;
        self.edit = None;

        match self.tasks.get_mut(target) {
            Some(task) => {
                task.text = text;
                self.persist_tasks();
            }
            None => log::debug!("Edited task {} no longer exists", target),
        }

        self.notify();
        true
    }

    /// Close the session, discarding the draft
    pub fn cancel_edit(&mut self) -> bool {
        if self.edit.take().is_none() {
            return false;
        }
        self.notify();
        true
    }

    /// Switch the view filter; never persisted
    pub fn set_filter(&mut self, mode: FilterMode) {
        if self.filter != mode {
            self.filter = mode;
            self.notify();
        }
    }

    /// Flip the dark-mode preference, persist it and apply the theme
    pub fn toggle_dark_mode(&mut self) -> bool {
        self.dark_mode = !self.dark_mode;
        self.persistence
            .store(StorageKey::DarkMode, self.dark_mode.to_string());

        self.apply_theme();
        self.notify();
        self.dark_mode
    }

    /// Remove every completed task, returns count of removed tasks
    pub fn clear_completed(&mut self) -> usize {
        let removed = self.tasks.remove_completed();
        if removed > 0 {
            self.drop_dangling_edit();
            self.persist_tasks();
            self.notify();
        }
        removed
    }

    /// Tasks in the current filter, in display order
    pub fn visible_tasks(&self) -> Vec<&Task> {
        self.filter.apply(&self.tasks)
    }

    /// Number of tasks not yet completed
    pub fn remaining_count(&self) -> usize {
        self.tasks.count_active()
    }

    pub fn completed_count(&self) -> usize {
        self.tasks.count_completed()
    }

    pub fn tasks(&self) -> &TaskCollection {
        &self.tasks
    }

    pub fn filter(&self) -> FilterMode {
        self.filter
    }

    pub fn edit_session(&self) -> Option<&EditSession> {
        self.edit.as_ref()
    }

    pub fn pending_removal_marker(&self) -> Option<TaskId> {
        self.removal_marker
    }

    pub fn dark_mode(&self) -> bool {
        self.dark_mode
    }

    pub fn theme(&self) -> Theme {
        Theme::from_dark_mode(self.dark_mode)
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn persistence(&self) -> &P {
        &self.persistence
    }

    /// Build the render model for the current state
    pub fn snapshot(&self) -> StoreView {
        let editing = self.edit.as_ref().map(|s| s.target);
        let tasks = self
            .visible_tasks()
            .into_iter()
            .enumerate()
            .map(|(index, task)| VisibleTask {
                index,
                task: task.clone(),
                editing: editing == Some(task.id),
                removing: self.removal_marker == Some(task.id),
            })
            .collect();

        StoreView {
            tasks,
            filter: self.filter,
            remaining: self.remaining_count(),
            total: self.tasks.len(),
            edit: self.edit.clone(),
            removal_marker: self.removal_marker,
            theme: self.theme(),
            input: self.input.clone(),
        }
    }

    fn resolve(&self, filtered_index: usize) -> Option<TaskId> {
        self.filter
            .resolve(&self.tasks, filtered_index)
            .map(|task| task.id)
    }

    fn drop_dangling_edit(&mut self) {
        if let Some(session) = &self.edit
            && self.tasks.get(session.target).is_none()
        {
            self.edit = None;
        }
    }

    fn persist_tasks(&self) {
        match self.tasks.to_json() {
            Ok(json) => self.persistence.store(StorageKey::Todos, json),
            Err(e) => log::error!("Could not serialize tasks: {}", e),
        }
    }

    fn apply_theme(&mut self) {
        let theme = self.theme();
        for observer in &mut self.observers {
            observer.theme_changed(theme);
        }
    }

    fn notify(&mut self) {
        if self.observers.is_empty() {
            return;
        }
        let view = self.snapshot();
        for observer in &mut self.observers {
            observer.state_changed(&view);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{CoreError, Result};
    use crate::persist::MemoryStore;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn store() -> TaskListStore<MemoryStore> {
        let mut store = TaskListStore::new(MemoryStore::new());
        store.initialize();
        store
    }

    fn texts<P: Persistence>(store: &TaskListStore<P>) -> Vec<String> {
        store.visible_tasks().iter().map(|t| t.text.clone()).collect()
    }

    struct FailingReads;

    impl Persistence for FailingReads {
        fn load(&self, _key: StorageKey) -> Result<Option<String>> {
            Err(CoreError::storage("disk on fire"))
        }

        fn store(&self, _key: StorageKey, _value: String) {}
    }

    #[derive(Default)]
    struct Recorder {
        themes: Rc<RefCell<Vec<Theme>>>,
        views: Rc<RefCell<Vec<StoreView>>>,
    }

    impl StoreObserver for Recorder {
        fn state_changed(&mut self, view: &StoreView) {
            self.views.borrow_mut().push(view.clone());
        }

        fn theme_changed(&mut self, theme: Theme) {
            self.themes.borrow_mut().push(theme);
        }
    }

    #[test]
    fn test_add_persists_and_clears_input() {
        let mut store = store();
        store.set_input("Buy milk");

        assert!(store.submit_input().is_some());
        assert_eq!(store.input(), "");

        let saved = store.persistence().get(StorageKey::Todos).unwrap();
        assert!(saved.contains("\"text\":\"Buy milk\""));
    }

    #[test]
    fn test_blank_add_keeps_input_and_skips_write() {
        let mut store = store();
        store.set_input("   ");

        assert!(store.submit_input().is_none());
        assert_eq!(store.input(), "   ");
        assert!(store.persistence().get(StorageKey::Todos).is_none());
    }

    #[test]
    fn test_index_resolves_against_filtered_view() {
        let mut store = store();
        store.add_task("A");
        store.add_task("B");
        store.add_task("C");
        store.toggle_complete(0);
        store.set_filter(FilterMode::Active);

        // Active view is [B, C]; index 1 is C.
        store.toggle_complete(1);
        store.set_filter(FilterMode::All);

        let flags: Vec<bool> = store.visible_tasks().iter().map(|t| t.completed).collect();
        assert_eq!(flags, vec![true, false, true]);
    }

    #[test]
    fn test_out_of_range_index_is_noop() {
        let mut store = store();
        store.add_task("A");

        assert_eq!(store.toggle_complete(5), None);
        assert!(!store.start_edit(5));
        assert!(store.mark_for_removal(5).is_none());
        assert!(store.remove_task(5).is_none());
        assert_eq!(texts(&store), vec!["A"]);
    }

    #[test]
    fn test_new_edit_abandons_previous() {
        let mut store = store();
        store.add_task("A");
        store.add_task("B");

        store.start_edit(0);
        store.update_draft("A changed");
        store.start_edit(1);

        let session = store.edit_session().unwrap();
        assert_eq!(session.draft, "B");
        assert_eq!(texts(&store), vec!["A", "B"]);
    }

    #[test]
    fn test_save_edit_trims_and_closes() {
        let mut store = store();
        store.add_task("A");
        store.start_edit(0);
        store.update_draft("  A better  ");

        assert!(store.save_edit());
        assert!(store.edit_session().is_none());
        assert_eq!(texts(&store), vec!["A better"]);
    }

    #[test]
    fn test_cancel_edit_discards_draft() {
        let mut store = store();
        store.add_task("A");
        store.start_edit(0);
        store.update_draft("never saved");

        assert!(store.cancel_edit());
        assert!(!store.cancel_edit());
        assert_eq!(texts(&store), vec!["A"]);
    }

    #[test]
    fn test_update_draft_without_session() {
        let mut store = store();
        assert!(!store.update_draft("anything"));
        assert!(!store.save_edit());
    }

    #[test]
    fn test_toggle_mid_edit_keeps_session() {
        let mut store = store();
        store.add_task("A");
        store.start_edit(0);

        store.toggle_complete(0);

        assert!(store.edit_session().is_some());
        assert!(store.save_edit());
    }

    #[test]
    fn test_second_mark_moves_marker_both_commit() {
        let mut store = store();
        store.add_task("A");
        store.add_task("B");
        store.add_task("C");

        let first = store.mark_for_removal(0).unwrap();
        let second = store.mark_for_removal(2).unwrap();
        assert_eq!(store.pending_removal_marker(), Some(second.task()));

        store.commit_removal(first);
        assert_eq!(texts(&store), vec!["B", "C"]);
        assert_eq!(store.pending_removal_marker(), Some(second.task()));

        store.commit_removal(second);
        assert_eq!(texts(&store), vec!["B"]);
        assert_eq!(store.pending_removal_marker(), None);
    }

    #[test]
    fn test_commit_reads_current_collection() {
        let mut store = store();
        store.add_task("A");
        store.add_task("B");

        let pending = store.mark_for_removal(1).unwrap();
        // An earlier task disappears before the timer fires.
        store.remove_task(0);

        let removed = store.commit_removal(pending).unwrap();
        assert_eq!(removed.text, "B");
        assert!(store.tasks().is_empty());
    }

    #[test]
    fn test_commit_twice_is_harmless() {
        let mut store = store();
        store.add_task("A");

        let pending = store.mark_for_removal(0).unwrap();
        assert!(store.commit_removal(pending).is_some());
        assert!(store.commit_removal(pending).is_none());
    }

    #[test]
    fn test_removing_edited_task_closes_session() {
        let mut store = store();
        store.add_task("A");
        store.start_edit(0);

        store.remove_task(0);
        assert!(store.edit_session().is_none());
    }

    #[test]
    fn test_clear_completed() {
        let mut store = store();
        store.add_task("A");
        store.add_task("B");
        store.toggle_complete(1);

        assert_eq!(store.clear_completed(), 1);
        assert_eq!(store.clear_completed(), 0);
        assert_eq!(texts(&store), vec!["A"]);
    }

    #[test]
    fn test_dark_mode_round_trip() {
        let backing = MemoryStore::new();
        let mut store = TaskListStore::new(backing.clone());
        store.initialize();

        assert!(store.toggle_dark_mode());
        assert_eq!(backing.get(StorageKey::DarkMode).as_deref(), Some("true"));

        let mut reloaded = TaskListStore::new(backing);
        reloaded.initialize();
        assert!(reloaded.dark_mode());
        assert_eq!(reloaded.theme(), Theme::Dark);
    }

    #[test]
    fn test_initialize_tolerates_bad_data() {
        let backing = MemoryStore::new()
            .with_entry(StorageKey::Todos, "{not json")
            .with_entry(StorageKey::DarkMode, "maybe");
        let mut store = TaskListStore::new(backing);
        store.initialize();

        assert!(store.tasks().is_empty());
        assert!(!store.dark_mode());
    }

    #[test]
    fn test_legacy_records_keep_their_timestamp_across_reloads() {
        let backing = MemoryStore::new()
            .with_entry(StorageKey::Todos, r#"[{"text":"  padded  ","completed":false}]"#);

        let mut first = TaskListStore::new(backing.clone());
        first.initialize();
        let created = first.tasks().iter().next().unwrap().created_at;
        assert_eq!(first.tasks().iter().next().unwrap().text, "padded");

        std::thread::sleep(std::time::Duration::from_millis(5));

        let mut second = TaskListStore::new(backing.clone());
        second.initialize();
        assert_eq!(second.tasks().iter().next().unwrap().created_at, created);

        let saved = backing.get(StorageKey::Todos).unwrap();
        assert!(saved.contains("\"text\":\"padded\""));
        assert!(saved.contains("createdAt"));
    }

    #[test]
    fn test_clean_records_are_not_rewritten_on_load() {
        let raw = r#"[{"text":"A","completed":true,"createdAt":"2026-01-25T10:00:00Z"}]"#;
        let backing = MemoryStore::new().with_entry(StorageKey::Todos, raw);

        let mut store = TaskListStore::new(backing.clone());
        store.initialize();

        assert_eq!(store.tasks().len(), 1);
        assert_eq!(backing.get(StorageKey::Todos).as_deref(), Some(raw));
    }

    #[test]
    fn test_initialize_tolerates_read_errors() {
        let mut store = TaskListStore::new(FailingReads);
        store.initialize();

        assert!(store.tasks().is_empty());
        assert!(!store.dark_mode());
    }

    #[test]
    fn test_observers_see_theme_and_state() {
        let backing = MemoryStore::new().with_entry(StorageKey::DarkMode, "true");
        let recorder = Recorder::default();
        let themes = recorder.themes.clone();
        let views = recorder.views.clone();

        let mut store = TaskListStore::new(backing);
        store.subscribe(Box::new(recorder));
        store.initialize();
        store.add_task("A");
        store.start_edit(0);
        store.toggle_dark_mode();

        assert_eq!(*themes.borrow(), vec![Theme::Dark, Theme::Light]);

        let views = views.borrow();
        let last = views.last().unwrap();
        assert_eq!(last.remaining, 1);
        assert!(last.tasks[0].editing);
        assert_eq!(last.theme, Theme::Light);
    }

    #[test]
    fn test_snapshot_marks_removal() {
        let mut store = store();
        store.add_task("A");
        store.add_task("B");
        store.mark_for_removal(1);

        let view = store.snapshot();
        assert!(!view.tasks[0].removing);
        assert!(view.tasks[1].removing);
        assert_eq!(view.total, 2);
    }
}
