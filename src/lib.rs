//! indexsweep - dead code detection driven by compiler symbol indexes
//!
//! This library finds declarations that are defined but never reached
//! from a set of entry points, working purely over the symbol graph an
//! index provider supplies. It never compiles or parses the analyzed
//! language itself.
//!
//! # Architecture
//!
//! The analysis pipeline consists of:
//! 1. **Indexing** - Materialize provider occurrence records into a graph
//! 2. **Graph Building** - Declarations, references and their indices
//! 3. **Mutation** - Ordered passes: comment directives, accessibility
//!    inference, implicit members, external conformances, override
//!    chains, entry points
//! 4. **Retention Analysis** - Worklist fixpoint over the rule set
//! 5. **Follow-up Analyses** - Unused parameters, assign-only properties
//! 6. **Reporting** - Structured results, rendered as terminal or JSON

pub mod analysis;
pub mod config;
pub mod error;
pub mod graph;
pub mod index;
pub mod mutators;
pub mod report;

pub use analysis::{AnalysisResults, Reason, UnusedItem};
pub use config::Configuration;
pub use error::{Error, Result};
pub use graph::{Accessibility, Declaration, Kind, Location, Reference, SourceGraph};
pub use index::{IndexProvider, InMemoryProvider, JsonlProvider, OccurrenceRecord, Role};
pub use report::{ReportFormat, Reporter};

use index::{CommentScanner, Indexer};

/// Run the full pipeline and return the populated graph alongside the
/// results. Useful for tests and embedders that inspect retention.
pub fn analyze_graph<P: IndexProvider>(
    provider: &P,
    config: &Configuration,
) -> Result<(SourceGraph, AnalysisResults)> {
    analyze_graph_with_scanner(provider, config, CommentScanner::new())
}

/// Like [`analyze_graph`], with a pre-seeded comment scanner.
pub fn analyze_graph_with_scanner<P: IndexProvider>(
    provider: &P,
    config: &Configuration,
    scanner: CommentScanner,
) -> Result<(SourceGraph, AnalysisResults)> {
    let mut graph = Indexer::new(provider).with_scanner(scanner).index()?;
    #[cfg(debug_assertions)]
    graph.validate(false)?;
    mutators::run_all(&mut graph, config)?;
    let results = analysis::run(&mut graph, config)?;
    Ok((graph, results))
}

/// Run the full pipeline: index, mutate, analyze.
pub fn run_analysis<P: IndexProvider>(
    provider: &P,
    config: &Configuration,
) -> Result<AnalysisResults> {
    analyze_graph(provider, config).map(|(_, results)| results)
}
