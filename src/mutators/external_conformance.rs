use super::Mutator;
use crate::config::Configuration;
use crate::error::Result;
use crate::graph::{DeclarationId, Kind, SourceGraph};
use tracing::debug;

/// Retains potential witnesses of externally-declared protocols.
///
/// When a type conforms to a protocol outside the analyzed modules the
/// requirement list cannot be enumerated, so every named member that
/// could occupy a witness slot must be assumed required.
pub struct ExternalConformanceMutator;

impl Mutator for ExternalConformanceMutator {
    fn name(&self) -> &'static str {
        "external-conformance"
    }

    fn mutate(&self, graph: &mut SourceGraph, _config: &Configuration) -> Result<()> {
        let conformers: Vec<_> = graph
            .declarations()
            .filter(|d| d.kind.is_concrete_type() || d.kind.is_extension())
            .filter(|d| {
                d.related.iter().any(|&r| {
                    let reference = graph.reference(r);
                    reference.kind == Kind::Protocol && !reference.is_resolved()
                })
            })
            .map(|d| d.id)
            .collect();

        let mut retained = 0usize;
        for conformer in conformers {
            for member in self.witness_candidates(graph, conformer) {
                let decl = graph.declaration_mut(member);
                if !decl.is_retained {
                    decl.is_retained = true;
                    retained += 1;
                }
                graph.mark_foreign_witness(member);
            }
        }
        if retained > 0 {
            debug!("{} members retained as external protocol witnesses", retained);
        }
        Ok(())
    }
}

impl ExternalConformanceMutator {
    /// Members that could fill a witness slot: named functions and
    /// variables, excluding accessors and parameters.
    fn witness_candidates(&self, graph: &SourceGraph, owner: DeclarationId) -> Vec<DeclarationId> {
        graph
            .declaration(owner)
            .declarations
            .iter()
            .copied()
            .filter(|&c| {
                let child = graph.declaration(c);
                (child.kind.is_function() || child.kind.is_variable())
                    && !child.kind.is_accessor()
                    && child.kind != Kind::VarParameter
                    && child.name.is_some()
            })
            .collect()
    }
}
