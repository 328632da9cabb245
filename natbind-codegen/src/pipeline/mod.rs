//! Generator pipelines.
//!
//! Each generator family runs a [`Pipeline`] of phases over its own state:
//!
//! - extract descriptors from the supplied members
//! - check the pass-wide gate (unsafe code, required runtime types)
//! - validate each descriptor and insert it into the symbol tree
//! - consolidate the tree
//!
//! Rendering phases are appended by the language backend. Diagnostics are
//! collected on the shared [`GenerationContext`].

mod context;
mod diagnostic;
mod phase;
pub mod phases;
mod runner;

pub use context::GenerationContext;
pub use diagnostic::{
    Diagnostic, DiagnosticFamily, DiagnosticKind, DiagnosticSink, ErrorCategory, Severity,
};
pub use phase::{Phase, PhaseInfo};
pub use runner::Pipeline;
