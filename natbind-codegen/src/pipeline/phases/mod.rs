//! Language-neutral phases shared by every backend.
//!
//! A backend builds its pipeline from these and appends its own render phase.

mod constants;
mod imports;

pub use constants::{
    BuildConstantsPhase, ConstantOutput, ConstantsState, ExtractConstantsPhase, MISSING_SPAN,
    SpanGatePhase,
};
pub use imports::{
    BuildImportsPhase, ExtractBindingsPhase, ImportsState, UNSAFE_NOT_ALLOWED, UnsafeGatePhase,
};
