use thiserror::Error;
use vellum_common::{Diagnostic, DiagnosticCode};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TokenError {
    #[error("Unresolved token: {0}")]
    Unresolved(String),

    #[error("Token '{path}' is not a {expected}")]
    WrongKind { path: String, expected: &'static str },

    #[error("Token alias chain too deep at '{0}'")]
    AliasDepth(String),

    #[error("Invalid token schema: {0}")]
    Schema(String),
}

impl TokenError {
    pub fn code(&self) -> DiagnosticCode {
        match self {
            TokenError::Schema(_) => DiagnosticCode::MalformedPayload,
            _ => DiagnosticCode::UnresolvedToken,
        }
    }

    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            TokenError::Schema(_) => Diagnostic::error(self.code(), self.to_string()),
            _ => Diagnostic::warning(self.code(), self.to_string()),
        }
    }
}

impl From<serde_json::Error> for TokenError {
    fn from(err: serde_json::Error) -> Self {
        TokenError::Schema(err.to_string())
    }
}
