use super::Mutator;
use crate::config::Configuration;
use crate::error::Result;
use crate::graph::{
    Accessibility, Declaration, DeclarationId, Kind, Parent, Reference, SourceGraph,
};
use tracing::debug;

const CODABLE_NAMES: &[&str] = &["Codable", "Encodable", "Decodable"];

/// Synthesizes the members the compiler provides implicitly: memberwise
/// and default initializers, conformance members declared but not
/// user-written, and `CodingKeys` retention for codable types.
pub struct ImplicitMembersMutator;

impl Mutator for ImplicitMembersMutator {
    fn name(&self) -> &'static str {
        "implicit-members"
    }

    fn mutate(&self, graph: &mut SourceGraph, config: &Configuration) -> Result<()> {
        let types: Vec<_> = graph
            .declarations()
            .filter(|d| d.kind.is_concrete_type())
            .map(|d| d.id)
            .collect();

        for type_id in types {
            match graph.declaration(type_id).kind {
                Kind::Struct => self.synthesize_memberwise_initializer(graph, type_id),
                Kind::Class => self.synthesize_default_initializer(graph, type_id),
                _ => {}
            }
            self.synthesize_conformance_members(graph, type_id, config);
            self.retain_coding_keys(graph, type_id, config);
        }
        Ok(())
    }
}

impl ImplicitMembersMutator {
    /// Memberwise initializer for structs with no user-written
    /// initializer whose stored properties are all visible.
    fn synthesize_memberwise_initializer(&self, graph: &mut SourceGraph, type_id: DeclarationId) {
        if self.has_user_initializer(graph, type_id) {
            return;
        }
        let stored: Vec<_> = graph
            .declaration(type_id)
            .declarations
            .iter()
            .copied()
            .filter(|&c| {
                graph.declaration(c).kind == Kind::VarInstance && !graph.is_computed_property(c)
            })
            .collect();
        if stored.is_empty()
            || stored
                .iter()
                .any(|&p| graph.declaration(p).accessibility < Accessibility::Internal)
        {
            return;
        }

        let usr = format!("{}$memberwise-init", graph.declaration(type_id).usr);
        if graph.declaration_by_usr(&usr).is_some() {
            return;
        }

        debug!(
            "synthesizing memberwise initializer for {}",
            graph.declaration(type_id).display()
        );
        let init = self.synthesize_member(graph, type_id, Kind::FunctionConstructor, "init", &usr);

        // The initializer assigns every stored property.
        for property in stored {
            let property_decl = graph.declaration(property);
            let reference = Reference::new(
                property_decl.kind,
                property_decl.usr.clone(),
                property_decl.module.clone(),
                graph.declaration(init).location.clone(),
            )
            .with_write(true);
            let ref_id = graph.add_reference(reference);
            graph.attach_reference(Parent::Decl(init), ref_id);
            graph.resolve_reference(ref_id, property);
        }
    }

    /// Implicit no-argument initializer for classes without any
    /// user-written initializer.
    fn synthesize_default_initializer(&self, graph: &mut SourceGraph, type_id: DeclarationId) {
        if self.has_user_initializer(graph, type_id) {
            return;
        }
        let usr = format!("{}$default-init", graph.declaration(type_id).usr);
        if graph.declaration_by_usr(&usr).is_some() {
            return;
        }
        self.synthesize_member(graph, type_id, Kind::FunctionConstructor, "init()", &usr);
    }

    /// Conformance-declared members the user did not write:
    /// `==` for Equatable, `hash(into:)` for Hashable, `init(from:)`
    /// and `encode(to:)` for codable conformances.
    fn synthesize_conformance_members(
        &self,
        graph: &mut SourceGraph,
        type_id: DeclarationId,
        config: &Configuration,
    ) {
        let names = self.conformance_names(graph, type_id, config);
        let type_usr = graph.declaration(type_id).usr.clone();

        let mut wanted: Vec<(Kind, &str, String)> = Vec::new();
        if names.iter().any(|n| n == "Equatable") {
            wanted.push((Kind::FunctionOperatorInfix, "==", format!("{type_usr}$equals")));
        }
        if names.iter().any(|n| n == "Hashable") {
            wanted.push((
                Kind::FunctionMethodInstance,
                "hash(into:)",
                format!("{type_usr}$hash-into"),
            ));
        }
        if names.iter().any(|n| n == "Decodable" || n == "Codable" || n == "codable-by-usr") {
            wanted.push((
                Kind::FunctionConstructor,
                "init(from:)",
                format!("{type_usr}$init-from"),
            ));
        }
        if names.iter().any(|n| n == "Encodable" || n == "Codable" || n == "codable-by-usr") {
            wanted.push((
                Kind::FunctionMethodInstance,
                "encode(to:)",
                format!("{type_usr}$encode-to"),
            ));
        }

        for (kind, name, usr) in wanted {
            if graph.declaration_by_usr(&usr).is_some() {
                continue;
            }
            let user_written = graph
                .declaration(type_id)
                .declarations
                .iter()
                .any(|&c| graph.declaration(c).name.as_deref() == Some(name));
            if !user_written {
                self.synthesize_member(graph, type_id, kind, name, &usr);
            }
        }
    }

    /// `CodingKeys` is reachable through decoding whenever the
    /// enclosing type is codable, even with no direct reference.
    fn retain_coding_keys(
        &self,
        graph: &mut SourceGraph,
        type_id: DeclarationId,
        config: &Configuration,
    ) {
        let names = self.conformance_names(graph, type_id, config);
        let codable = names
            .iter()
            .any(|n| CODABLE_NAMES.contains(&n.as_str()) || n == "codable-by-usr");
        if !codable {
            return;
        }

        let coding_keys = graph
            .declaration(type_id)
            .declarations
            .iter()
            .copied()
            .find(|&c| {
                let child = graph.declaration(c);
                child.kind == Kind::Enum && child.name.as_deref() == Some("CodingKeys")
            });
        let Some(coding_keys) = coding_keys else { return };

        graph.declaration_mut(coding_keys).is_retained = true;
        for case in graph.declaration(coding_keys).declarations.clone() {
            if graph.declaration(case).kind == Kind::EnumElement {
                graph.declaration_mut(case).is_retained = true;
            }
        }
    }

    fn has_user_initializer(&self, graph: &SourceGraph, type_id: DeclarationId) -> bool {
        graph.declaration(type_id).declarations.iter().any(|&c| {
            let child = graph.declaration(c);
            child.kind == Kind::FunctionConstructor && !child.is_implicit
        })
    }

    /// Conformance names of a type, normalizing configured codable usrs
    /// to a marker so callers match on one spelling.
    fn conformance_names(
        &self,
        graph: &SourceGraph,
        type_id: DeclarationId,
        config: &Configuration,
    ) -> Vec<String> {
        graph
            .declaration(type_id)
            .related
            .iter()
            .filter_map(|&r| {
                let reference = graph.reference(r);
                if reference.kind != Kind::Protocol {
                    return None;
                }
                if config.is_codable_usr(&reference.usr) {
                    return Some("codable-by-usr".to_owned());
                }
                reference.name.clone()
            })
            .collect()
    }

    fn synthesize_member(
        &self,
        graph: &mut SourceGraph,
        type_id: DeclarationId,
        kind: Kind,
        name: &str,
        usr: &str,
    ) -> DeclarationId {
        let parent = graph.declaration(type_id);
        let mut decl = Declaration::new(
            kind,
            usr.to_owned(),
            parent.module.clone(),
            parent.location.clone(),
        )
        .with_name(name);
        decl.is_implicit = true;
        decl.accessibility = parent.accessibility.min(Accessibility::Internal);
        let id = graph.add_declaration(decl);
        graph.attach_child(type_id, id);
        id
    }
}
