//! Ordered graph transformations that run between indexing and
//! analysis. Each mutator is idempotent; running the pipeline twice is
//! equivalent to running it once.

mod accessibility;
mod comment_commands;
mod entry_points;
mod external_conformance;
mod implicit_members;
mod override_chains;

pub use accessibility::AccessibilityMutator;
pub use comment_commands::CommentCommandsMutator;
pub use entry_points::EntryPointMutator;
pub use external_conformance::ExternalConformanceMutator;
pub use implicit_members::ImplicitMembersMutator;
pub use override_chains::OverrideChainsMutator;

use crate::config::Configuration;
use crate::error::Result;
use crate::graph::SourceGraph;
use tracing::debug;

/// A single graph transformation pass.
pub trait Mutator {
    fn name(&self) -> &'static str;
    fn mutate(&self, graph: &mut SourceGraph, config: &Configuration) -> Result<()>;
}

/// The fixed mutation order. Implicit members must exist before the
/// external-conformance pass so synthesized witnesses are retained too.
pub fn pipeline() -> Vec<Box<dyn Mutator>> {
    vec![
        Box::new(CommentCommandsMutator),
        Box::new(AccessibilityMutator),
        Box::new(ImplicitMembersMutator),
        Box::new(ExternalConformanceMutator),
        Box::new(OverrideChainsMutator),
        Box::new(EntryPointMutator),
    ]
}

/// Run every mutator in order. In debug builds the graph invariants are
/// checked after each pass; accessibility bounds only once the
/// accessibility pass has run.
pub fn run_all(graph: &mut SourceGraph, config: &Configuration) -> Result<()> {
    let mut check_accessibility = false;
    for mutator in pipeline() {
        debug!("running mutator: {}", mutator.name());
        mutator.mutate(graph, config)?;
        check_accessibility = check_accessibility || mutator.name() == "accessibility";
        #[cfg(debug_assertions)]
        graph.validate(check_accessibility)?;
    }
    let _ = check_accessibility;
    Ok(())
}
