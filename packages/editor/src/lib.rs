//! # Vellum Editor
//!
//! Patch protocol, document store and render pipeline for vellum documents.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ caller: UI commands, importers, repair tools│
//! └─────────────────────────────────────────────┘
//!                     ↓ PatchOp batches
//! ┌─────────────────────────────────────────────┐
//! │ editor: DocumentStore                       │
//! │  - Atomic batch application + inverses      │
//! │  - Undo/redo with coalescing groups         │
//! │  - Parent index and SceneChangeSet          │
//! └─────────────────────────────────────────────┘
//!                     ↓ EditorDocument + dirty ids
//! ┌─────────────────────────────────────────────┐
//! │ scene: instances → ExpandedScene            │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ render: ExpandedScene + tokens → RenderDoc  │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Core Principles
//!
//! 1. **Patches are the only writer**: every change is a `PatchOp` batch
//! 2. **Batches are atomic**: a rejected batch leaves no trace
//! 3. **Documents are immutable values**: each batch yields a new `Arc`
//! 4. **Derived views are disposable**: scenes and render trees can always be rebuilt
//!
//! ## Usage
//!
//! ```rust,ignore
//! use vellum_editor::{DocumentStore, PatchOp, Pipeline};
//! use vellum_tokens::TokenResolver;
//!
//! let mut pipeline = Pipeline::new(DocumentStore::new(document), TokenResolver::empty());
//!
//! pipeline.apply(&[PatchOp::set_prop("n_text", "/props/text", json!("Bye"))])?;
//! let render = pipeline.render("f1")?;
//!
//! pipeline.undo()?;
//! ```

mod applier;
mod change_set;
mod clipboard;
mod config;
mod errors;
mod integrity;
mod parent_index;
mod patch;
mod pipeline;
mod shared;
mod store;
mod undo_stack;

pub use applier::{apply, apply_batch, apply_batch_indexed, invert, AppliedBatch};
pub use change_set::SceneChangeSet;
pub use clipboard::paste_patches;
pub use config::StoreConfig;
pub use errors::{BatchError, EditorError, PatchError};
pub use integrity::check_document;
pub use parent_index::{subtree_ids, ParentIndex};
pub use patch::{PatchOp, ValidationMode};
pub use pipeline::Pipeline;
pub use shared::SharedDocumentStore;
pub use store::{DocumentStore, HistoryOutcome, PatchOptions, StoreUpdate};
pub use undo_stack::{HistoryEntry, UndoStack};
