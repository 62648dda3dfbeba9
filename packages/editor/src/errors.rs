//! Error types for the editor

use thiserror::Error;
use vellum_common::{Diagnostic, DiagnosticCode, Location};
use vellum_model::{ClipboardError, PathError};
use vellum_scene::SceneError;

/// Why a single op (or the batch as a whole) was rejected
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PatchError {
    #[error("Node not found: {0}")]
    NodeNotFound(String),

    #[error("Frame not found: {0}")]
    FrameNotFound(String),

    #[error("Component not found: {0}")]
    ComponentNotFound(String),

    #[error("Duplicate {kind} id: {id}")]
    DuplicateId { kind: &'static str, id: String },

    #[error("Node '{root}' is the root of both {first} and {second}")]
    DuplicateRoot {
        root: String,
        first: String,
        second: String,
    },

    #[error("Attaching '{child}' under '{parent}' would create a cycle")]
    CycleDetected { parent: String, child: String },

    #[error("Node '{child}' is already attached to '{parent}'")]
    ChildAlreadyAttached { child: String, parent: String },

    #[error("Node '{0}' is a frame or component root and cannot have a parent")]
    RootNotDetachable(String),

    #[error("Replacement node id '{found}' does not match target '{target}'")]
    IdMismatch { target: String, found: String },

    #[error("Node '{node}' must be detached before it is deleted")]
    DeleteBeforeDetach { node: String },

    #[error("Node '{0}' must be inserted before it is attached")]
    AttachBeforeInsert(String),

    #[error("Node '{0}' has no parent to move from")]
    NotAttached(String),

    #[error("Node '{parent}' references missing child '{child}'")]
    DanglingNode { parent: String, child: String },

    #[error("Instance '{instance}' references missing component '{component}'")]
    DanglingComponent { instance: String, component: String },

    #[error("Root '{root}' of '{owner}' does not exist")]
    MissingRoot { owner: String, root: String },

    #[error("Property error on '{target}': {source}")]
    Path {
        target: String,
        #[source]
        source: PathError,
    },
}

impl PatchError {
    pub fn code(&self) -> DiagnosticCode {
        match self {
            PatchError::NodeNotFound(_) => DiagnosticCode::NodeNotFound,
            PatchError::FrameNotFound(_) => DiagnosticCode::FrameNotFound,
            PatchError::ComponentNotFound(_) => DiagnosticCode::ComponentNotFound,
            PatchError::DuplicateId { .. } => DiagnosticCode::DuplicateId,
            PatchError::DuplicateRoot { .. } => DiagnosticCode::DuplicateRoot,
            PatchError::CycleDetected { .. } => DiagnosticCode::CycleDetected,
            PatchError::ChildAlreadyAttached { .. } => DiagnosticCode::ChildAlreadyAttached,
            PatchError::RootNotDetachable(_) => DiagnosticCode::RootNotDetachable,
            PatchError::IdMismatch { .. } => DiagnosticCode::IdMismatch,
            PatchError::DeleteBeforeDetach { .. } => DiagnosticCode::DeleteBeforeDetach,
            PatchError::AttachBeforeInsert(_) => DiagnosticCode::AttachBeforeInsert,
            PatchError::NotAttached(_) => DiagnosticCode::NotAttached,
            PatchError::DanglingNode { .. } => DiagnosticCode::DanglingNode,
            PatchError::DanglingComponent { .. } => DiagnosticCode::DanglingComponent,
            PatchError::MissingRoot { .. } => DiagnosticCode::MissingRoot,
            PatchError::Path { source, .. } => source.code(),
        }
    }

    /// Node or frame the error points at
    pub fn target(&self) -> Option<&str> {
        match self {
            PatchError::NodeNotFound(id)
            | PatchError::FrameNotFound(id)
            | PatchError::ComponentNotFound(id)
            | PatchError::RootNotDetachable(id)
            | PatchError::AttachBeforeInsert(id)
            | PatchError::NotAttached(id) => Some(id),
            PatchError::DuplicateId { id, .. } => Some(id),
            PatchError::DuplicateRoot { root, .. } => Some(root),
            PatchError::CycleDetected { child, .. } | PatchError::ChildAlreadyAttached { child, .. } => Some(child),
            PatchError::IdMismatch { target, .. } => Some(target),
            PatchError::DeleteBeforeDetach { node } => Some(node),
            PatchError::DanglingNode { parent, .. } => Some(parent),
            PatchError::DanglingComponent { instance, .. } => Some(instance),
            PatchError::MissingRoot { owner, .. } => Some(owner),
            PatchError::Path { target, .. } => Some(target),
        }
    }

    pub fn to_diagnostic(&self) -> Diagnostic {
        let mut diagnostic = Diagnostic::error(self.code(), self.to_string());
        if let Some(target) = self.target() {
            let mut location = Location::node(target);
            if let PatchError::Path { source, .. } = self {
                location = location.with_path(source.path());
            }
            diagnostic = diagnostic.at(location);
        }
        diagnostic
    }
}

/// A rejected batch. Nothing from the batch was applied.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BatchError {
    #[error("Op #{index} ({op}) rejected: {source}")]
    Op {
        index: usize,
        op: &'static str,
        #[source]
        source: PatchError,
    },

    #[error("Batch failed integrity check: {0}")]
    Integrity(#[source] PatchError),
}

impl BatchError {
    pub fn error(&self) -> &PatchError {
        match self {
            BatchError::Op { source, .. } => source,
            BatchError::Integrity(source) => source,
        }
    }

    pub fn op_index(&self) -> Option<usize> {
        match self {
            BatchError::Op { index, .. } => Some(*index),
            BatchError::Integrity(_) => None,
        }
    }

    pub fn code(&self) -> DiagnosticCode {
        self.error().code()
    }

    pub fn to_diagnostic(&self) -> Diagnostic {
        let mut diagnostic = self.error().to_diagnostic();
        diagnostic.message = self.to_string();
        diagnostic
    }
}

#[derive(Error, Debug)]
pub enum EditorError {
    #[error(transparent)]
    Batch(#[from] BatchError),

    #[error("Scene error: {0}")]
    Scene(#[from] SceneError),

    #[error("Clipboard error: {0}")]
    Clipboard(#[from] ClipboardError),

    #[error("Node not found: {0}")]
    NodeNotFound(String),
}

impl EditorError {
    pub fn code(&self) -> DiagnosticCode {
        match self {
            EditorError::Batch(err) => err.code(),
            EditorError::Scene(err) => err.code(),
            EditorError::Clipboard(err) => err.code(),
            EditorError::NodeNotFound(_) => DiagnosticCode::NodeNotFound,
        }
    }

    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            EditorError::Batch(err) => err.to_diagnostic(),
            EditorError::Scene(err) => err.to_diagnostic(),
            EditorError::Clipboard(err) => err.to_diagnostic(),
            EditorError::NodeNotFound(id) => {
                Diagnostic::error(self.code(), self.to_string()).at(Location::node(id.clone()))
            }
        }
    }
}
