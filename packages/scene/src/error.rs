use thiserror::Error;
use vellum_common::{Diagnostic, DiagnosticCode, Location};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SceneError {
    #[error("Frame not found: {0}")]
    FrameNotFound(String),

    #[error("Root node '{root}' of frame '{frame}' does not exist")]
    MissingRoot { frame: String, root: String },
}

impl SceneError {
    pub fn code(&self) -> DiagnosticCode {
        match self {
            SceneError::FrameNotFound(_) => DiagnosticCode::FrameNotFound,
            SceneError::MissingRoot { .. } => DiagnosticCode::MissingRoot,
        }
    }

    pub fn to_diagnostic(&self) -> Diagnostic {
        let location = match self {
            SceneError::FrameNotFound(frame) => Location::frame(frame.clone()),
            SceneError::MissingRoot { frame, root } => Location {
                frame_id: Some(frame.clone()),
                ..Location::node(root.clone())
            },
        };
        Diagnostic::error(self.code(), self.to_string()).at(location)
    }
}
