//! Store handle for callers on several threads.
//!
//! Writers are serialized by a single mutex, so history and parent index
//! transitions never interleave. Readers take an `Arc` snapshot of the
//! document and release the lock immediately.

use crate::errors::EditorError;
use crate::patch::PatchOp;
use crate::store::{DocumentStore, HistoryOutcome, PatchOptions, StoreUpdate};
use parking_lot::Mutex;
use std::sync::Arc;
use vellum_model::EditorDocument;

#[derive(Debug, Clone)]
pub struct SharedDocumentStore {
    inner: Arc<Mutex<DocumentStore>>,
}

impl SharedDocumentStore {
    pub fn new(store: DocumentStore) -> Self {
        Self {
            inner: Arc::new(Mutex::new(store)),
        }
    }

    /// Current document. Later edits do not affect the returned value.
    pub fn snapshot(&self) -> Arc<EditorDocument> {
        self.inner.lock().document().clone()
    }

    pub fn version(&self) -> u64 {
        self.inner.lock().version()
    }

    pub fn apply_patches(&self, ops: &[PatchOp]) -> Result<StoreUpdate, EditorError> {
        self.inner.lock().apply_patches(ops)
    }

    pub fn apply_patches_with(&self, ops: &[PatchOp], options: PatchOptions) -> Result<StoreUpdate, EditorError> {
        self.inner.lock().apply_patches_with(ops, options)
    }

    pub fn undo(&self) -> Result<HistoryOutcome, EditorError> {
        self.inner.lock().undo()
    }

    pub fn redo(&self) -> Result<HistoryOutcome, EditorError> {
        self.inner.lock().redo()
    }

    /// Run `f` with exclusive access, for multi-step reads or edits
    pub fn with<R>(&self, f: impl FnOnce(&mut DocumentStore) -> R) -> R {
        let mut store = self.inner.lock();
        f(&mut store)
    }
}

impl From<DocumentStore> for SharedDocumentStore {
    fn from(store: DocumentStore) -> Self {
        Self::new(store)
    }
}
