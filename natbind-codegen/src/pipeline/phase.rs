//! Pipeline phase trait.

use eyre::Result;

use super::GenerationContext;

/// Information about a pipeline phase.
#[derive(Debug, Clone)]
pub struct PhaseInfo {
    pub name: &'static str,
    pub description: &'static str,
}

/// A phase in a generator pipeline.
///
/// Phases run in order over a shared state `S` owned by one generator family.
/// Per-declaration problems are reported as diagnostics on the context;
/// `Err` is reserved for internal failures.
pub trait Phase<S> {
    /// The name of this phase (used in log spans).
    fn name(&self) -> &'static str;

    fn description(&self) -> &'static str;

    /// Run this phase.
    ///
    /// # Errors
    ///
    /// Returns an error if the phase fails for a reason that is not a
    /// diagnostic about the input.
    fn run(&self, ctx: &mut GenerationContext<'_>, state: &mut S) -> Result<()>;

    fn info(&self) -> PhaseInfo {
        PhaseInfo {
            name: self.name(),
            description: self.description(),
        }
    }
}
