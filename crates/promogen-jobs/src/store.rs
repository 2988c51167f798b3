//! Holds the asset batch of the current generation run.
//!
//! Contents are replaced wholesale when a run completes and cleared when a new
//! run starts, so results of a superseded run are never shown next to a run in
//! flight.

use std::sync::Arc;

use promogen_core::models::AssetResult;
use tokio::sync::watch;

#[derive(Clone, Debug)]
pub struct AssetStore {
    tx: Arc<watch::Sender<Arc<[AssetResult]>>>,
}

impl Default for AssetStore {
    fn default() -> Self {
        let (tx, _rx) = watch::channel(Arc::from(Vec::new()));
        Self { tx: Arc::new(tx) }
    }
}

impl AssetStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Swap in a completed batch. Order is preserved.
    pub fn replace(&self, assets: Vec<AssetResult>) {
        self.tx.send_replace(Arc::from(assets));
    }

    pub fn clear(&self) {
        self.tx.send_if_modified(|current| {
            if current.is_empty() {
                return false;
            }
            *current = Arc::from(Vec::new());
            true
        });
    }

    /// Cheap shared view of the current batch.
    pub fn snapshot(&self) -> Arc<[AssetResult]> {
        self.tx.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.tx.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.tx.borrow().is_empty()
    }

    pub fn subscribe(&self) -> watch::Receiver<Arc<[AssetResult]>> {
        self.tx.subscribe()
    }
}
