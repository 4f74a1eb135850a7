use crate::config::Configuration;
use crate::graph::{DeclarationId, Kind, SourceGraph};
use std::collections::{HashMap, HashSet, VecDeque};
use tracing::debug;

/// Unused-parameter analysis.
///
/// Functions are grouped into families that share a dispatch surface:
/// override chains, protocol requirements with their witnesses, and
/// protocol-extension default implementations. A parameter position
/// used anywhere in the family is considered used everywhere, because
/// removing it would change a signature callers reach polymorphically.
///
/// Parameters of unretained functions are never reported; dead code is
/// already reported whole.
pub fn analyze(graph: &mut SourceGraph, config: &Configuration) -> Vec<DeclarationId> {
    let mut members: Vec<DeclarationId> = graph
        .declarations()
        .filter(|d| d.kind.is_function() && !d.kind.is_accessor())
        .map(|d| d.id)
        .collect();

    // Setter parameters of requirement defaults are normally assumed
    // used; analyzing them is gated because the results are unreliable.
    if config.enable_unstable_rules {
        members.extend(
            graph
                .declarations()
                .filter(|d| {
                    d.kind == Kind::FunctionAccessorSetter && in_protocol_extension(graph, d.id)
                })
                .map(|d| d.id),
        );
    }

    let families = group_into_families(graph, &members);
    debug!("{} function families", families.len());

    let mut unused = Vec::new();
    for family in families {
        let foreign = family.iter().any(|&f| graph.is_foreign_witness(f));
        let protocol_related = family.iter().any(|&f| {
            parent_is_protocol(graph, f) || in_protocol_extension(graph, f)
        });
        let exempt =
            foreign || (config.retain_unused_protocol_func_params && protocol_related);

        let mut used_positions: HashSet<usize> = HashSet::new();
        for &function in &family {
            for (position, parameter) in parameters_of(graph, function).into_iter().enumerate() {
                if graph.has_incoming_references(parameter) {
                    used_positions.insert(position);
                }
            }
        }

        for &function in &family {
            if !graph.declaration(function).is_retained || graph.is_ignored(function) {
                continue;
            }
            let mut function_unused = Vec::new();
            for (position, parameter) in parameters_of(graph, function).into_iter().enumerate() {
                let decl = graph.declaration(parameter);
                if decl.name.as_deref() == Some("_") {
                    continue;
                }
                if graph.is_ignored(parameter) || exempt || used_positions.contains(&position) {
                    continue;
                }
                function_unused.push(parameter);
            }
            if !function_unused.is_empty() {
                unused.extend(function_unused.iter().copied());
                graph.declaration_mut(function).unused_parameters = function_unused;
            }
        }
    }

    unused
}

/// Child parameters ordered by source position.
fn parameters_of(graph: &SourceGraph, function: DeclarationId) -> Vec<DeclarationId> {
    let mut parameters: Vec<_> = graph
        .declaration(function)
        .declarations
        .iter()
        .copied()
        .filter(|&c| graph.declaration(c).kind == Kind::VarParameter)
        .collect();
    parameters.sort_by(|&a, &b| {
        graph
            .declaration(a)
            .location
            .cmp(&graph.declaration(b).location)
    });
    parameters
}

fn parent_is_protocol(graph: &SourceGraph, function: DeclarationId) -> bool {
    graph
        .nearest_declaration(graph.declaration(function).parent)
        .map(|p| graph.declaration(p).kind == Kind::Protocol)
        .unwrap_or(false)
}

fn in_protocol_extension(graph: &SourceGraph, id: DeclarationId) -> bool {
    graph.ancestors(id).into_iter().any(|a| {
        let decl = graph.declaration(a);
        if decl.kind == Kind::ExtensionProtocol {
            return true;
        }
        decl.kind.is_extension()
            && decl.related.iter().any(|&r| {
                graph
                    .reference(r)
                    .resolved
                    .map(|t| graph.declaration(t).kind == Kind::Protocol)
                    .unwrap_or(false)
            })
    })
}

/// Union of the override, witness and default-implementation links,
/// grouped into connected components.
fn group_into_families(
    graph: &SourceGraph,
    members: &[DeclarationId],
) -> Vec<Vec<DeclarationId>> {
    let member_set: HashSet<DeclarationId> = members.iter().copied().collect();
    let mut adjacency: HashMap<DeclarationId, Vec<DeclarationId>> = HashMap::new();
    let link = |adjacency: &mut HashMap<DeclarationId, Vec<DeclarationId>>,
                    a: DeclarationId,
                    b: DeclarationId| {
        adjacency.entry(a).or_default().push(b);
        adjacency.entry(b).or_default().push(a);
    };

    for &function in members {
        if let Some(base) = graph.override_base(function) {
            if member_set.contains(&base) {
                link(&mut adjacency, function, base);
            }
        }

        let Some(parent) = graph.nearest_declaration(graph.declaration(function).parent) else {
            continue;
        };
        if graph.declaration(parent).kind != Kind::Protocol {
            continue;
        }
        let Some(name) = graph.declaration(function).name.clone() else {
            continue;
        };
        let protocol_usr = graph.declaration(parent).usr.clone();

        for conformer in graph.conformers_of(&protocol_usr) {
            for &witness in &graph.declaration(conformer).declarations {
                if member_set.contains(&witness)
                    && graph.declaration(witness).name.as_ref() == Some(&name)
                {
                    link(&mut adjacency, function, witness);
                }
            }
        }
        for extension in graph.extensions_of(&protocol_usr) {
            for &default in &graph.declaration(extension).declarations {
                if member_set.contains(&default)
                    && graph.declaration(default).name.as_ref() == Some(&name)
                {
                    link(&mut adjacency, function, default);
                }
            }
        }
    }

    let mut families = Vec::new();
    let mut visited: HashSet<DeclarationId> = HashSet::new();
    for &function in members {
        if visited.contains(&function) {
            continue;
        }
        let mut family = Vec::new();
        let mut queue = VecDeque::from([function]);
        visited.insert(function);
        while let Some(current) = queue.pop_front() {
            family.push(current);
            for &next in adjacency.get(&current).into_iter().flatten() {
                if visited.insert(next) {
                    queue.push_back(next);
                }
            }
        }
        families.push(family);
    }
    families
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{Declaration, Location, Parent, Reference};

    fn decl(kind: Kind, usr: &str, name: &str, line: u32, column: u32) -> Declaration {
        Declaration::new(kind, usr, "app", Location::new("Sources/T.swift", line, column))
            .with_name(name)
    }

    fn add_function(
        graph: &mut SourceGraph,
        owner: Option<DeclarationId>,
        usr: &str,
        line: u32,
        retained: bool,
    ) -> (DeclarationId, DeclarationId) {
        let f = graph.add_declaration(decl(
            Kind::FunctionMethodInstance,
            usr,
            "handle(value:)",
            line,
            5,
        ));
        let p = graph.add_declaration(decl(
            Kind::VarParameter,
            &format!("{usr}-p0"),
            "value",
            line,
            20,
        ));
        graph.attach_child(f, p);
        if let Some(owner) = owner {
            graph.attach_child(owner, f);
        }
        graph.declaration_mut(f).is_retained = retained;
        (f, p)
    }

    fn use_parameter(graph: &mut SourceGraph, function: DeclarationId, parameter: DeclarationId) {
        let usr = graph.declaration(parameter).usr.clone();
        let line = graph.declaration(function).location.line;
        let r = graph.add_reference(Reference::new(
            Kind::VarParameter,
            usr,
            "app",
            Location::new("Sources/T.swift", line + 1, 9),
        ));
        graph.attach_reference(Parent::Decl(function), r);
        graph.resolve_reference(r, parameter);
    }

    #[test]
    fn test_unused_parameter_reported() {
        let mut graph = SourceGraph::new();
        let (_, p) = add_function(&mut graph, None, "usr-f", 1, true);
        let unused = analyze(&mut graph, &Configuration::default());
        assert_eq!(unused, vec![p]);
    }

    #[test]
    fn test_used_parameter_not_reported() {
        let mut graph = SourceGraph::new();
        let (f, p) = add_function(&mut graph, None, "usr-f", 1, true);
        use_parameter(&mut graph, f, p);
        let unused = analyze(&mut graph, &Configuration::default());
        assert!(unused.is_empty());
    }

    #[test]
    fn test_dead_function_parameters_ignored() {
        let mut graph = SourceGraph::new();
        add_function(&mut graph, None, "usr-f", 1, false);
        let unused = analyze(&mut graph, &Configuration::default());
        assert!(unused.is_empty());
    }

    #[test]
    fn test_override_family_shares_usage() {
        let mut graph = SourceGraph::new();
        let base = graph.add_declaration(decl(Kind::Class, "usr-base", "Base", 1, 1));
        let sub = graph.add_declaration(decl(Kind::Class, "usr-sub", "Sub", 10, 1));
        let (base_f, _base_p) = add_function(&mut graph, Some(base), "usr-base-f", 2, true);
        let (sub_f, sub_p) = add_function(&mut graph, Some(sub), "usr-sub-f", 11, true);
        graph.link_override(sub_f, base_f);
        use_parameter(&mut graph, sub_f, sub_p);

        let unused = analyze(&mut graph, &Configuration::default());
        assert!(unused.is_empty(), "base parameter is kept by the override's use");
    }

    #[test]
    fn test_underscore_parameter_never_reported() {
        let mut graph = SourceGraph::new();
        let f = graph.add_declaration(decl(
            Kind::FunctionFree,
            "usr-f",
            "callback(_:)",
            1,
            1,
        ));
        let p = graph.add_declaration(decl(Kind::VarParameter, "usr-p", "_", 1, 15));
        graph.attach_child(f, p);
        graph.declaration_mut(f).is_retained = true;

        let unused = analyze(&mut graph, &Configuration::default());
        assert!(unused.is_empty());
    }

    #[test]
    fn test_foreign_witness_parameters_exempt() {
        let mut graph = SourceGraph::new();
        let (f, _) = add_function(&mut graph, None, "usr-f", 1, true);
        graph.mark_foreign_witness(f);
        let unused = analyze(&mut graph, &Configuration::default());
        assert!(unused.is_empty());
    }

    #[test]
    fn test_protocol_requirement_flag_exempts_family() {
        let mut graph = SourceGraph::new();
        let proto = graph.add_declaration(decl(Kind::Protocol, "usr-p", "P", 1, 1));
        let (req, _) = add_function(&mut graph, Some(proto), "usr-req", 2, true);

        let c = graph.add_declaration(decl(Kind::Class, "usr-c", "C", 10, 1));
        let conformance = graph.add_reference(
            Reference::new(
                Kind::Protocol,
                "usr-p",
                "app",
                Location::new("Sources/T.swift", 10, 10),
            )
            .with_related(true),
        );
        graph.attach_reference(Parent::Decl(c), conformance);
        graph.resolve_reference(conformance, proto);
        let (witness, _) = add_function(&mut graph, Some(c), "usr-witness", 11, true);

        let exempting = Configuration {
            retain_unused_protocol_func_params: true,
            ..Configuration::default()
        };
        assert!(analyze(&mut graph, &exempting).is_empty());

        let strict = Configuration::default();
        let unused = analyze(&mut graph, &strict);
        assert_eq!(unused.len(), 2, "requirement and witness parameters unused");
        let _ = (req, witness);
    }

    #[test]
    fn test_unused_parameters_recorded_on_function() {
        let mut graph = SourceGraph::new();
        let (f, p) = add_function(&mut graph, None, "usr-f", 1, true);
        analyze(&mut graph, &Configuration::default());
        assert_eq!(graph.declaration(f).unused_parameters, vec![p]);
    }
}
