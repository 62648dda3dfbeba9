//! Shared diagnostic types for every vellum stage.
//!
//! Patch validation, scene expansion and render compilation all report problems
//! as [`Diagnostic`] values. Automated repair tooling matches on
//! [`DiagnosticCode`], never on message text.

pub mod diagnostic;

pub use diagnostic::*;
