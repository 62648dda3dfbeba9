use serde::{Deserialize, Serialize};
use std::fmt;

/// Severity level of a diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticLevel {
    Error,
    Warning,
    Info,
}

/// Machine-readable diagnostic codes.
///
/// Serialized as SCREAMING_SNAKE_CASE strings. New codes may be added, existing
/// ones are never renamed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DiagnosticCode {
    // Structural
    NodeNotFound,
    FrameNotFound,
    ComponentNotFound,
    DanglingNode,
    DanglingComponent,
    DuplicateId,
    DuplicateRoot,
    CycleDetected,
    ChildAlreadyAttached,
    RootNotDetachable,
    IdMismatch,

    // Protocol ordering
    DeleteBeforeDetach,
    AttachBeforeInsert,
    NotAttached,

    // Property
    InvalidPath,
    UnknownPath,
    TypeMismatch,
    OutOfRange,

    // Resolution (non-fatal)
    UnresolvedToken,

    // Expansion (non-fatal)
    InstanceCycle,
    InvalidOverride,
    DuplicateExpandedId,

    // Compilation (non-fatal)
    UnboundedFill,
    MissingRoot,

    // Payloads
    ForeignPayload,
    UnsupportedVersion,
    MalformedPayload,
}

impl DiagnosticCode {
    /// Stable string form, identical to the serialized representation
    pub fn as_str(&self) -> &'static str {
        match self {
            DiagnosticCode::NodeNotFound => "NODE_NOT_FOUND",
            DiagnosticCode::FrameNotFound => "FRAME_NOT_FOUND",
            DiagnosticCode::ComponentNotFound => "COMPONENT_NOT_FOUND",
            DiagnosticCode::DanglingNode => "DANGLING_NODE",
            DiagnosticCode::DanglingComponent => "DANGLING_COMPONENT",
            DiagnosticCode::DuplicateId => "DUPLICATE_ID",
            DiagnosticCode::DuplicateRoot => "DUPLICATE_ROOT",
            DiagnosticCode::CycleDetected => "CYCLE_DETECTED",
            DiagnosticCode::ChildAlreadyAttached => "CHILD_ALREADY_ATTACHED",
            DiagnosticCode::RootNotDetachable => "ROOT_NOT_DETACHABLE",
            DiagnosticCode::IdMismatch => "ID_MISMATCH",
            DiagnosticCode::DeleteBeforeDetach => "DELETE_BEFORE_DETACH",
            DiagnosticCode::AttachBeforeInsert => "ATTACH_BEFORE_INSERT",
            DiagnosticCode::NotAttached => "NOT_ATTACHED",
            DiagnosticCode::InvalidPath => "INVALID_PATH",
            DiagnosticCode::UnknownPath => "UNKNOWN_PATH",
            DiagnosticCode::TypeMismatch => "TYPE_MISMATCH",
            DiagnosticCode::OutOfRange => "OUT_OF_RANGE",
            DiagnosticCode::UnresolvedToken => "UNRESOLVED_TOKEN",
            DiagnosticCode::InstanceCycle => "INSTANCE_CYCLE",
            DiagnosticCode::InvalidOverride => "INVALID_OVERRIDE",
            DiagnosticCode::DuplicateExpandedId => "DUPLICATE_EXPANDED_ID",
            DiagnosticCode::UnboundedFill => "UNBOUNDED_FILL",
            DiagnosticCode::MissingRoot => "MISSING_ROOT",
            DiagnosticCode::ForeignPayload => "FOREIGN_PAYLOAD",
            DiagnosticCode::UnsupportedVersion => "UNSUPPORTED_VERSION",
            DiagnosticCode::MalformedPayload => "MALFORMED_PAYLOAD",
        }
    }
}

impl fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a diagnostic points to. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frame_id: Option<String>,

    /// Property path or token path
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    /// Line in an external source (DSL importers)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
}

impl Location {
    pub fn node(node_id: impl Into<String>) -> Self {
        Self {
            node_id: Some(node_id.into()),
            ..Self::default()
        }
    }

    pub fn frame(frame_id: impl Into<String>) -> Self {
        Self {
            frame_id: Some(frame_id.into()),
            ..Self::default()
        }
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn with_line(mut self, line: u32) -> Self {
        self.line = Some(line);
        self
    }
}

/// A diagnostic emitted by any stage of the core
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// The severity level
    pub level: DiagnosticLevel,

    /// Machine-readable code
    pub code: DiagnosticCode,

    /// Human-readable message
    pub message: String,

    /// Where the problem was found
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
}

impl Diagnostic {
    pub fn error(code: DiagnosticCode, message: impl Into<String>) -> Self {
        Self {
            level: DiagnosticLevel::Error,
            code,
            message: message.into(),
            location: None,
        }
    }

    pub fn warning(code: DiagnosticCode, message: impl Into<String>) -> Self {
        Self {
            level: DiagnosticLevel::Warning,
            code,
            message: message.into(),
            location: None,
        }
    }

    pub fn info(code: DiagnosticCode, message: impl Into<String>) -> Self {
        Self {
            level: DiagnosticLevel::Info,
            code,
            message: message.into(),
            location: None,
        }
    }

    pub fn at(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }

    pub fn is_error(&self) -> bool {
        self.level == DiagnosticLevel::Error
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)?;
        if let Some(location) = &self.location {
            if let Some(node_id) = &location.node_id {
                write!(f, " (node {})", node_id)?;
            }
            if let Some(frame_id) = &location.frame_id {
                write!(f, " (frame {})", frame_id)?;
            }
            if let Some(path) = &location.path {
                write!(f, " at {}", path)?;
            }
            if let Some(line) = location.line {
                write!(f, " line {}", line)?;
            }
        }
        Ok(())
    }
}
