//! Background persistence worker
//!
//! The store's writes are fire-and-forget: [`WorkerHandle::store`] only
//! queues a message, and a tokio task performs the actual write on the
//! blocking pool. Failures are logged there and never reach the store.

use tokio::sync::{mpsc, oneshot};
use ticklist_core::{Persistence, StorageKey};

enum WorkerMessage {
    Write { key: StorageKey, value: String },
    Flush(oneshot::Sender<()>),
}

/// Store-side handle to a running persistence worker
///
/// Reads go straight to the backend; they only happen at startup, before
/// any write has been queued.
#[derive(Clone)]
pub struct WorkerHandle<B> {
    backend: B,
    tx: mpsc::UnboundedSender<WorkerMessage>,
}

/// Spawns the worker task for a backend
pub struct PersistenceWorker;

impl PersistenceWorker {
    /// Start the worker on the current tokio runtime
    ///
    /// The task exits once every handle has been dropped and the queue is
    /// drained.
    pub fn spawn<B>(backend: B) -> WorkerHandle<B>
    where
        B: Persistence + Clone + Send + 'static,
    {
        let (tx, mut rx) = mpsc::unbounded_channel::<WorkerMessage>();
        let worker_backend = backend.clone();

        tokio::spawn(async move {
            while let Some(message) = rx.recv().await {
                match message {
                    WorkerMessage::Write { key, value } => {
                        let backend = worker_backend.clone();
                        let written =
                            tokio::task::spawn_blocking(move || backend.store(key, value)).await;
                        if let Err(e) = written {
                            log::error!("Persistence write for {} panicked: {}", key, e);
                        }
                    }
                    WorkerMessage::Flush(done) => {
                        let _ = done.send(());
                    }
                }
            }
            log::debug!("Persistence worker stopped");
        });

        WorkerHandle { backend, tx }
    }
}

impl<B> WorkerHandle<B> {
    /// Wait until every write queued before this call has been performed
    pub async fn flush(&self) {
        let (done_tx, done_rx) = oneshot::channel();
        if self.tx.send(WorkerMessage::Flush(done_tx)).is_err() {
            return;
        }
        if done_rx.await.is_err() {
            log::warn!("Persistence worker went away before flushing");
        }
    }
}

impl<B: Persistence> Persistence for WorkerHandle<B> {
    fn load(&self, key: StorageKey) -> ticklist_core::Result<Option<String>> {
        self.backend.load(key)
    }

    fn store(&self, key: StorageKey, value: String) {
        if self.tx.send(WorkerMessage::Write { key, value }).is_err() {
            log::warn!("Persistence worker is gone, dropping write to {}", key);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use ticklist_core::{MemoryStore, TaskListStore};

    #[tokio::test]
    async fn test_writes_land_after_flush() {
        let backing = MemoryStore::new();
        let handle = PersistenceWorker::spawn(backing.clone());

        handle.store(StorageKey::DarkMode, "true".to_string());
        handle.store(StorageKey::DarkMode, "false".to_string());
        handle.flush().await;

        assert_eq!(backing.get(StorageKey::DarkMode).as_deref(), Some("false"));
    }

    #[tokio::test]
    async fn test_store_round_trip_through_worker() {
        let backing = MemoryStore::new();
        let handle = PersistenceWorker::spawn(backing.clone());

        let mut store = TaskListStore::new(handle.clone());
        store.initialize();
        store.add_task("Through the worker");
        handle.flush().await;

        let mut reloaded = TaskListStore::new(PersistenceWorker::spawn(backing));
        reloaded.initialize();
        assert_eq!(reloaded.tasks().len(), 1);
        assert_eq!(
            reloaded.tasks().iter().next().unwrap().text,
            "Through the worker"
        );
    }
}
