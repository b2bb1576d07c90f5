//! Ticklist Core - Pure domain logic for a single-list to-do manager
//!
//! This crate contains no file or terminal I/O. Persistence and rendering
//! are collaborators plugged in through the [`Persistence`] and
//! [`StoreObserver`] traits.

pub mod edit;
pub mod error;
pub mod filter;
pub mod observer;
pub mod persist;
pub mod removal;
pub mod store;
pub mod task;

pub use edit::EditSession;
pub use error::{CoreError, Result};
pub use filter::FilterMode;
pub use observer::{StoreObserver, StoreView, Theme, VisibleTask};
pub use persist::{MemoryStore, Persistence, StorageKey};
pub use removal::{PendingRemoval, REMOVAL_DELAY};
pub use store::TaskListStore;
pub use task::{Task, TaskCollection, TaskId};
