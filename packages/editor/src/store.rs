//! # Document Store
//!
//! Owns the current document, its parent index and the undo/redo history.
//! Every change goes through [`DocumentStore::apply_patches_with`] (or undo /
//! redo), each of which swaps in a new immutable document; documents handed
//! out earlier stay valid.

use crate::applier::{apply_batch_indexed, AppliedBatch};
use crate::change_set::SceneChangeSet;
use crate::clipboard::paste_patches;
use crate::config::StoreConfig;
use crate::errors::EditorError;
use crate::parent_index::{subtree_ids, ParentIndex};
use crate::patch::{PatchOp, ValidationMode};
use crate::undo_stack::{HistoryEntry, UndoStack};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, instrument};
use vellum_common::Diagnostic;
use vellum_model::{ClipboardPayload, EditorDocument, Frame, IdGenerator, NodeId, Point};

/// Per-batch history settings
#[derive(Debug, Clone, Default)]
pub struct PatchOptions {
    /// Batches with the same group inside the coalescing window share one undo entry
    pub group: Option<String>,
    /// Defaults to now
    pub at: Option<Instant>,
    pub description: Option<String>,
}

impl PatchOptions {
    pub fn grouped(group: impl Into<String>) -> Self {
        Self {
            group: Some(group.into()),
            ..Self::default()
        }
    }

    pub fn described(description: impl Into<String>) -> Self {
        Self {
            description: Some(description.into()),
            ..Self::default()
        }
    }

    pub fn at(mut self, at: Instant) -> Self {
        self.at = Some(at);
        self
    }
}

/// The document after a change, and what the change invalidated
#[derive(Debug, Clone)]
pub struct StoreUpdate {
    pub document: Arc<EditorDocument>,
    pub changes: SceneChangeSet,
    pub version: u64,
    /// Warnings for ops skipped in lenient mode
    pub skipped: Vec<Diagnostic>,
}

#[derive(Debug, Clone)]
pub enum HistoryOutcome {
    Applied(StoreUpdate),
    /// Nothing to undo or redo
    Empty,
}

impl HistoryOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, HistoryOutcome::Applied(_))
    }

    pub fn into_update(self) -> Option<StoreUpdate> {
        match self {
            HistoryOutcome::Applied(update) => Some(update),
            HistoryOutcome::Empty => None,
        }
    }
}

#[derive(Debug)]
pub struct DocumentStore {
    document: Arc<EditorDocument>,
    parents: ParentIndex,
    history: UndoStack,
    config: StoreConfig,
    version: u64,
    ids: IdGenerator,
}

impl DocumentStore {
    pub fn new(document: EditorDocument) -> Self {
        Self::with_config(document, StoreConfig::default())
    }

    pub fn with_config(document: EditorDocument, config: StoreConfig) -> Self {
        let parents = ParentIndex::build(&document);
        let ids = IdGenerator::for_document(&document.id);
        let history = UndoStack::with_limits(config.max_undo_entries, config.coalesce_window());
        Self {
            document: Arc::new(document),
            parents,
            history,
            config,
            version: 0,
            ids,
        }
    }

    pub fn document(&self) -> &Arc<EditorDocument> {
        &self.document
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Number of batches applied, undone or redone so far
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn parent_index(&self) -> &ParentIndex {
        &self.parents
    }

    pub fn apply_patch(&mut self, op: PatchOp) -> Result<StoreUpdate, EditorError> {
        self.apply_patches(&[op])
    }

    pub fn apply_patches(&mut self, ops: &[PatchOp]) -> Result<StoreUpdate, EditorError> {
        self.apply_patches_with(ops, PatchOptions::default())
    }

    /// Apply `ops` as one atomic transaction and record it for undo
    #[instrument(skip(self, ops, options), fields(ops = ops.len(), group = ?options.group, version = self.version))]
    pub fn apply_patches_with(&mut self, ops: &[PatchOp], options: PatchOptions) -> Result<StoreUpdate, EditorError> {
        let batch = apply_batch_indexed(&self.document, &self.parents, ops, self.config.validation)?;

        // Every op that changes something yields a non-empty inverse
        if batch.inverse.is_empty() {
            debug!(skipped = batch.skipped.len(), "Batch changed nothing");
            return Ok(StoreUpdate {
                document: self.document.clone(),
                changes: SceneChangeSet::default(),
                version: self.version,
                skipped: batch.skipped,
            });
        }

        let at = options.at.unwrap_or_else(Instant::now);
        let entry = HistoryEntry::new(batch.applied.clone(), batch.inverse.clone(), at)
            .with_group(options.group)
            .with_description(options.description);
        let coalesced = self.history.record(entry);

        let update = self.commit(batch);
        debug!(version = update.version, coalesced, "Recorded batch");
        Ok(update)
    }

    /// Apply the newest history entry's inverse
    #[instrument(skip(self), fields(version = self.version))]
    pub fn undo(&mut self) -> Result<HistoryOutcome, EditorError> {
        let Some(entry) = self.history.pop_undo() else {
            return Ok(HistoryOutcome::Empty);
        };
        match apply_batch_indexed(&self.document, &self.parents, &entry.inverse, ValidationMode::Strict) {
            Ok(batch) => {
                let update = self.commit(batch);
                info!(version = update.version, description = ?entry.description, "Undo");
                self.history.push_redo(entry);
                Ok(HistoryOutcome::Applied(update))
            }
            Err(err) => {
                error!(error = %err, "Undo batch no longer applies");
                self.history.push_undo(entry);
                Err(err.into())
            }
        }
    }

    /// Reapply the newest undone entry
    #[instrument(skip(self), fields(version = self.version))]
    pub fn redo(&mut self) -> Result<HistoryOutcome, EditorError> {
        let Some(entry) = self.history.pop_redo() else {
            return Ok(HistoryOutcome::Empty);
        };
        match apply_batch_indexed(&self.document, &self.parents, &entry.forward, ValidationMode::Strict) {
            Ok(batch) => {
                let update = self.commit(batch);
                info!(version = update.version, description = ?entry.description, "Redo");
                self.history.push_undo(entry);
                Ok(HistoryOutcome::Applied(update))
            }
            Err(err) => {
                error!(error = %err, "Redo batch no longer applies");
                self.history.push_redo(entry);
                Err(err.into())
            }
        }
    }

    fn commit(&mut self, batch: AppliedBatch) -> StoreUpdate {
        self.document = Arc::new(batch.document);
        self.parents = batch.parents;
        self.version += 1;
        StoreUpdate {
            document: self.document.clone(),
            changes: batch.changes,
            version: self.version,
            skipped: batch.skipped,
        }
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn undo_levels(&self) -> usize {
        self.history.undo_levels()
    }

    pub fn redo_levels(&self) -> usize {
        self.history.redo_levels()
    }

    pub fn undo_description(&self) -> Option<&str> {
        self.history.undo_description()
    }

    pub fn redo_description(&self) -> Option<&str> {
        self.history.redo_description()
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    pub fn get_parent(&self, id: &str) -> Option<&str> {
        self.parents.parent(id)
    }

    /// Parent first
    pub fn get_ancestors(&self, id: &str) -> Vec<NodeId> {
        self.parents.ancestors(id)
    }

    /// Pre-order, excluding `id` itself
    pub fn get_descendants(&self, id: &str) -> Vec<NodeId> {
        let mut ids = subtree_ids(&self.document, id);
        if !ids.is_empty() {
            ids.remove(0);
        }
        ids
    }

    pub fn get_frame_for_node(&self, id: &str) -> Option<&Frame> {
        self.parents.frame_for(&self.document, id)
    }

    /// Snapshot the subtrees rooted at `ids`
    pub fn copy(&self, ids: &[NodeId], anchor: Point) -> Result<ClipboardPayload, EditorError> {
        Ok(ClipboardPayload::capture(&self.document, ids, anchor)?)
    }

    /// Insert a copy of `payload` under `parent_id` with fresh ids
    pub fn paste(
        &mut self,
        payload: &ClipboardPayload,
        parent_id: &str,
        index: Option<usize>,
        offset: Point,
    ) -> Result<StoreUpdate, EditorError> {
        let ops = paste_patches(&self.document, payload, parent_id, index, offset, &mut self.ids)?;
        self.apply_patches_with(&ops, PatchOptions::described("Paste"))
    }
}
