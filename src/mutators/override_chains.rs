use super::Mutator;
use crate::config::Configuration;
use crate::error::Result;
use crate::graph::{DeclarationId, SourceGraph};
use tracing::debug;

/// Links every `override` member to the nearest ancestor member with
/// the same selector. The analyzer walks these links in both
/// directions: a retained override keeps its base alive, and parameter
/// usage propagates across the whole chain.
pub struct OverrideChainsMutator;

impl Mutator for OverrideChainsMutator {
    fn name(&self) -> &'static str {
        "override-chains"
    }

    fn mutate(&self, graph: &mut SourceGraph, _config: &Configuration) -> Result<()> {
        let overrides: Vec<_> = graph
            .declarations()
            .filter(|d| d.is_override() && (d.kind.is_function() || d.kind.is_variable()))
            .map(|d| d.id)
            .collect();

        let mut linked = 0usize;
        for member in overrides {
            if let Some(base) = self.find_base(graph, member) {
                graph.link_override(member, base);
                linked += 1;
            }
        }
        if linked > 0 {
            debug!("{} override links built", linked);
        }
        Ok(())
    }
}

impl OverrideChainsMutator {
    /// Walk the superclass chain of the member's enclosing class for
    /// the nearest member with an identical selector.
    fn find_base(&self, graph: &SourceGraph, member: DeclarationId) -> Option<DeclarationId> {
        let member_decl = graph.declaration(member);
        let name = member_decl.name.as_ref()?;
        let kind = member_decl.kind;

        let owner = graph
            .ancestors(member)
            .into_iter()
            .find(|&a| graph.declaration(a).kind.is_concrete_type())?;

        let mut current = graph.superclass_of(owner);
        while let Some(ancestor) = current {
            let base = graph
                .declaration(ancestor)
                .declarations
                .iter()
                .copied()
                .find(|&c| {
                    let candidate = graph.declaration(c);
                    candidate.kind == kind && candidate.name.as_ref() == Some(name)
                });
            if base.is_some() {
                return base;
            }
            current = graph.superclass_of(ancestor);
        }
        None
    }
}
