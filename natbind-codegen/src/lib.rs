//! Generator core for natbind.
//!
//! This crate implements everything between a declaration provider and a
//! language-specific renderer:
//!
//! - [`extract`] - turns marked declarations into binding and constant descriptors
//! - [`validate`] - structural contracts for descriptors, with typed errors
//! - [`format`] - composite format evaluation for formatted constants
//! - [`tree`] - the namespace/type/member symbol tree
//! - [`grouping`] - slot assignment for native imports
//! - [`pipeline`] - diagnostics, generation context and the phase runner
//! - [`builder`] - indentation-aware text building blocks
//! - [`language`] - the trait every language backend implements
//! - [`testing`] - declaration fixture builders (feature-gated)

pub mod builder;
pub mod extract;
pub mod format;
pub mod grouping;
pub mod language;
pub mod pipeline;
pub mod tree;
pub mod validate;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use builder::{CodeBuilder, CodeFragment, Indent};
pub use language::{GenerateOutput, GenerateResult, LanguageCodegen};
pub use pipeline::{
    Diagnostic, DiagnosticFamily, DiagnosticKind, DiagnosticSink, ErrorCategory,
    GenerationContext, Phase, Pipeline, Severity,
};
