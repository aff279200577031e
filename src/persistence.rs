//! Writing layout changes to the item store.
//!
//! The in-memory layout is the source of truth. Changes are queued as [`PersistOp`]s on an
//! unbounded channel and applied by a background thread; the layout never waits for them.

use std::thread::{self, JoinHandle};

use anyhow::Context as _;
use async_channel::{Receiver, Sender};
use serde::Serialize;

use crate::layout::grid::Cell;
use crate::layout::item::{Item, ItemId};

/// One change to the stored layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum PersistOp {
    AddItem { item: Item, page: usize, cell: Cell },
    MoveItem { id: ItemId, page: usize, cell: Cell },
    DeleteItem { id: ItemId },
    AddToFolder { item: Item, folder: ItemId },
    SetDefaultPage { page: usize },
}

/// Persistent storage of item records.
pub trait ItemStore: Send + 'static {
    fn add_item(&mut self, item: &Item, page: usize, cell: Cell) -> anyhow::Result<()>;
    fn move_item(&mut self, id: ItemId, page: usize, cell: Cell) -> anyhow::Result<()>;
    fn delete_item(&mut self, id: ItemId) -> anyhow::Result<()>;
    /// Moves the item into the folder, creating its record if needed.
    fn add_to_folder(&mut self, item: &Item, folder: ItemId) -> anyhow::Result<()>;
    fn set_default_page(&mut self, page: usize) -> anyhow::Result<()>;
}

impl PersistOp {
    pub fn apply(&self, store: &mut dyn ItemStore) -> anyhow::Result<()> {
        match self {
            PersistOp::AddItem { item, page, cell } => store
                .add_item(item, *page, *cell)
                .with_context(|| format!("error adding item {}", item.id)),
            PersistOp::MoveItem { id, page, cell } => store
                .move_item(*id, *page, *cell)
                .with_context(|| format!("error moving item {id}")),
            PersistOp::DeleteItem { id } => store
                .delete_item(*id)
                .with_context(|| format!("error deleting item {id}")),
            PersistOp::AddToFolder { item, folder } => store
                .add_to_folder(item, *folder)
                .with_context(|| format!("error adding item {} to folder {folder}", item.id)),
            PersistOp::SetDefaultPage { page } => store
                .set_default_page(*page)
                .context("error setting the default page"),
        }
    }
}

/// Sending half of the persistence queue.
#[derive(Debug, Clone)]
pub struct Persistence {
    sender: Option<Sender<PersistOp>>,
}

impl Persistence {
    /// Drops every change.
    pub fn disabled() -> Self {
        Self { sender: None }
    }

    /// Queue whose receiving half is handled by the caller.
    pub fn channel() -> (Self, Receiver<PersistOp>) {
        let (sender, receiver) = async_channel::unbounded();
        (
            Self {
                sender: Some(sender),
            },
            receiver,
        )
    }

    /// Starts a thread applying changes to `store`.
    ///
    /// The thread exits once every [`Persistence`] handle is dropped and the queue is drained.
    pub fn spawn<S: ItemStore>(mut store: S) -> anyhow::Result<(Self, JoinHandle<()>)> {
        let (persistence, receiver) = Self::channel();

        let handle = thread::Builder::new()
            .name("Item Store Writer".to_owned())
            .spawn(move || {
                while let Ok(op) = receiver.recv_blocking() {
                    if let Err(err) = op.apply(&mut store) {
                        warn!("error persisting layout change: {err:?}");
                    }
                }
                debug!("persistence queue closed");
            })
            .context("error spawning the item store thread")?;

        Ok((persistence, handle))
    }

    pub fn is_enabled(&self) -> bool {
        self.sender.is_some()
    }

    pub fn send(&self, op: PersistOp) {
        let Some(sender) = &self.sender else {
            return;
        };

        trace!("persisting {op:?}");
        if let Err(err) = sender.try_send(op) {
            warn!("error queueing layout change: {err:?}");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::layout::item::ItemKind;

    /// Records applied changes and refuses to delete anything.
    #[derive(Default, Clone)]
    struct RecordingStore {
        applied: Arc<Mutex<Vec<String>>>,
    }

    impl RecordingStore {
        fn record(&self, entry: String) -> anyhow::Result<()> {
            self.applied.lock().unwrap().push(entry);
            Ok(())
        }
    }

    impl ItemStore for RecordingStore {
        fn add_item(&mut self, item: &Item, page: usize, cell: Cell) -> anyhow::Result<()> {
            self.record(format!("add {} {page} {},{}", item.id, cell.x, cell.y))
        }

        fn move_item(&mut self, id: ItemId, page: usize, cell: Cell) -> anyhow::Result<()> {
            self.record(format!("move {id} {page} {},{}", cell.x, cell.y))
        }

        fn delete_item(&mut self, id: ItemId) -> anyhow::Result<()> {
            anyhow::bail!("item {id} is read-only")
        }

        fn add_to_folder(&mut self, item: &Item, folder: ItemId) -> anyhow::Result<()> {
            self.record(format!("fold {} {folder}", item.id))
        }

        fn set_default_page(&mut self, page: usize) -> anyhow::Result<()> {
            self.record(format!("default {page}"))
        }
    }

    #[test]
    fn worker_applies_in_order_and_survives_errors() {
        let store = RecordingStore::default();
        let applied = store.applied.clone();
        let (persistence, handle) = Persistence::spawn(store).unwrap();

        let item = Item::new(1, ItemKind::Application);
        persistence.send(PersistOp::AddItem {
            item: item.clone(),
            page: 0,
            cell: Cell::new(1, 2),
        });
        persistence.send(PersistOp::DeleteItem { id: ItemId(1) });
        persistence.send(PersistOp::MoveItem {
            id: ItemId(1),
            page: 2,
            cell: Cell::new(0, 0),
        });
        persistence.send(PersistOp::AddToFolder {
            item,
            folder: ItemId(5),
        });
        persistence.send(PersistOp::SetDefaultPage { page: 1 });
        drop(persistence);
        handle.join().unwrap();

        assert_eq!(
            *applied.lock().unwrap(),
            ["add 1 0 1,2", "move 1 2 0,0", "fold 1 5", "default 1"]
        );
    }

    #[test]
    fn apply_adds_context() {
        let mut store = RecordingStore::default();
        let err = PersistOp::DeleteItem { id: ItemId(3) }
            .apply(&mut store)
            .unwrap_err();
        assert_eq!(err.to_string(), "error deleting item 3");
        assert_eq!(err.root_cause().to_string(), "item 3 is read-only");
    }

    #[test]
    fn disabled_drops_everything() {
        let persistence = Persistence::disabled();
        assert!(!persistence.is_enabled());
        persistence.send(PersistOp::SetDefaultPage { page: 0 });

        let (persistence, receiver) = Persistence::channel();
        persistence.send(PersistOp::SetDefaultPage { page: 3 });
        assert_eq!(
            receiver.try_recv().unwrap(),
            PersistOp::SetDefaultPage { page: 3 }
        );
        drop(receiver);
        // Sending after the receiver is gone only logs.
        persistence.send(PersistOp::SetDefaultPage { page: 4 });
    }
}
