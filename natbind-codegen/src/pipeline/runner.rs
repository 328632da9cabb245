//! Pipeline orchestrator.

use eyre::Result;

use super::{GenerationContext, Phase, PhaseInfo};

/// Runs an ordered list of phases over one state.
///
/// # Example
///
/// ```ignore
/// let pipeline = Pipeline::new()
///     .phase(ExtractBindingsPhase)
///     .phase(UnsafeGatePhase)
///     .phase(BuildImportsPhase);
///
/// pipeline.run(&mut ctx, &mut state)?;
/// ```
pub struct Pipeline<S> {
    phases: Vec<Box<dyn Phase<S>>>,
}

impl<S> Pipeline<S> {
    pub fn new() -> Self {
        Self { phases: Vec::new() }
    }

    /// Append a phase.
    pub fn phase(mut self, phase: impl Phase<S> + 'static) -> Self {
        self.phases.push(Box::new(phase));
        self
    }

    pub fn phases(&self) -> Vec<PhaseInfo> {
        self.phases.iter().map(|p| p.info()).collect()
    }

    /// Run every phase in order.
    ///
    /// Stops early, without error, once the context is aborted.
    ///
    /// # Errors
    ///
    /// Returns an error if any phase fails fatally.
    pub fn run(&self, ctx: &mut GenerationContext<'_>, state: &mut S) -> Result<()> {
        for phase in &self.phases {
            if ctx.is_aborted() {
                tracing::debug!(phase = phase.name(), "skipped after abort");
                break;
            }
            let _span = tracing::debug_span!("phase", name = phase.name()).entered();
            phase.run(ctx, state)?;
        }
        Ok(())
    }
}

impl<S> Default for Pipeline<S> {
    fn default() -> Self {
        Self::new()
    }
}
