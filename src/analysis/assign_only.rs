use crate::config::Configuration;
use crate::graph::{DeclarationId, Kind, SourceGraph};
use tracing::debug;

/// Assign-only property analysis.
///
/// A stored instance property that is only ever written can be removed
/// even though it is referenced, provided its initializer could not
/// have side effects. Properties with non-trivial initializers stay
/// retained: removing them may change program behavior. Computed
/// properties are never assignment-only.
pub fn analyze(graph: &SourceGraph, config: &Configuration) -> Vec<DeclarationId> {
    if config.retain_assign_only_properties {
        return Vec::new();
    }

    let mut assign_only = Vec::new();
    for decl in graph.declarations() {
        if decl.kind != Kind::VarInstance || !decl.is_retained {
            continue;
        }
        if graph.is_ignored(decl.id) || graph.is_computed_property(decl.id) {
            continue;
        }
        // Lazy property results are unreliable; analysis stays gated.
        if decl.has_modifier("lazy") && !config.enable_unstable_rules {
            continue;
        }

        let incoming = graph.incoming_references(decl.id);
        if incoming.is_empty() {
            continue;
        }
        if !incoming.iter().all(|&r| graph.reference(r).is_write) {
            continue;
        }
        if !has_trivial_initializer(graph, decl.id) {
            continue;
        }

        debug!("assign-only property: {}", decl.display());
        assign_only.push(decl.id);
    }
    assign_only
}

/// The property's own outgoing references describe its initializer
/// expression. No references (a literal or `nil`) or constructor
/// references alone are trivial; any other call or read is not.
fn has_trivial_initializer(graph: &SourceGraph, id: DeclarationId) -> bool {
    graph
        .declaration(id)
        .references
        .iter()
        .all(|&r| graph.reference(r).kind == Kind::FunctionConstructor)
}
