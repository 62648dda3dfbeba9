//! # Editing Pipeline
//!
//! Coordinates the document lifecycle: Patch → Expand → Compile
//!
//! The Pipeline manages:
//! - Applying batches through the store
//! - Re-expansion of the edited frame
//! - Routing each batch's dirty ids into the per-frame render compilers
//! - Caching for efficiency

use crate::change_set::SceneChangeSet;
use crate::errors::EditorError;
use crate::patch::PatchOp;
use crate::store::{DocumentStore, HistoryOutcome, PatchOptions, StoreUpdate};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, instrument};
use vellum_render::{RenderCompiler, RenderDocument};
use vellum_scene::{ExpandedScene, SceneBuilder};
use vellum_tokens::TokenResolver;

/// Store plus the scene and render caches derived from it
pub struct Pipeline {
    store: DocumentStore,
    scenes: SceneBuilder,
    compilers: HashMap<String, RenderCompiler>,
    /// Scene each compiler last saw, used to translate document ids
    compiled_scenes: HashMap<String, Arc<ExpandedScene>>,
    tokens: TokenResolver,
}

impl Pipeline {
    pub fn new(store: DocumentStore, tokens: TokenResolver) -> Self {
        Self {
            store,
            scenes: SceneBuilder::new(),
            compilers: HashMap::new(),
            compiled_scenes: HashMap::new(),
            tokens,
        }
    }

    pub fn store(&self) -> &DocumentStore {
        &self.store
    }

    pub fn tokens(&self) -> &TokenResolver {
        &self.tokens
    }

    /// Swap the token schema. Compilers notice the new generation and rebuild.
    pub fn set_tokens(&mut self, tokens: TokenResolver) {
        self.tokens = tokens;
    }

    pub fn apply(&mut self, ops: &[PatchOp]) -> Result<StoreUpdate, EditorError> {
        self.apply_with(ops, PatchOptions::default())
    }

    pub fn apply_with(&mut self, ops: &[PatchOp], options: PatchOptions) -> Result<StoreUpdate, EditorError> {
        let update = self.store.apply_patches_with(ops, options)?;
        self.route(&update.changes);
        Ok(update)
    }

    pub fn undo(&mut self) -> Result<HistoryOutcome, EditorError> {
        let outcome = self.store.undo()?;
        if let HistoryOutcome::Applied(update) = &outcome {
            self.route(&update.changes);
        }
        Ok(outcome)
    }

    pub fn redo(&mut self) -> Result<HistoryOutcome, EditorError> {
        let outcome = self.store.redo()?;
        if let HistoryOutcome::Applied(update) = &outcome {
            self.route(&update.changes);
        }
        Ok(outcome)
    }

    /// Expand and compile `frame_id` against the current document
    #[instrument(skip(self), fields(version = self.store.version()))]
    pub fn render(&mut self, frame_id: &str) -> Result<RenderDocument, EditorError> {
        let scene = self.scenes.build(self.store.document(), frame_id)?;
        let compiler = self.compilers.entry(frame_id.to_string()).or_default();
        let document = compiler.compile(&scene, &self.tokens);
        self.compiled_scenes.insert(frame_id.to_string(), scene);
        Ok(document)
    }

    /// Drop every cache (force full re-render on next call)
    pub fn clear_cache(&mut self) {
        self.scenes.clear();
        self.compilers.clear();
        self.compiled_scenes.clear();
    }

    /// Cached render nodes for `frame_id`
    pub fn cached_nodes(&self, frame_id: &str) -> usize {
        self.compilers.get(frame_id).map_or(0, RenderCompiler::cache_len)
    }

    fn route(&mut self, changes: &SceneChangeSet) {
        for frame_id in &changes.frame_dirty {
            if self.store.document().frame(frame_id).is_none() {
                self.compilers.remove(frame_id);
                self.compiled_scenes.remove(frame_id);
                self.scenes.invalidate(frame_id);
            }
        }

        for (frame_id, compiler) in self.compilers.iter_mut() {
            let Some(scene) = self.compiled_scenes.get(frame_id) else {
                continue;
            };
            let dirty = scene.expanded_ids_for(changes.dirty_nodes());
            if dirty.is_empty() {
                continue;
            }
            debug!(frame_id = %frame_id, dirty = dirty.len(), "Routing dirty ids");
            compiler.mark_dirty(dirty);
        }
    }
}
