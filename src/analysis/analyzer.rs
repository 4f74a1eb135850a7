use crate::config::Configuration;
use crate::error::Result;
use crate::graph::{DeclarationId, Kind, SourceGraph};
use std::collections::{HashSet, VecDeque};
use tracing::{debug, info};

/// Raw-value bases that allow runtime reconstruction of any case.
const RAW_REPRESENTABLE_NAMES: &[&str] = &[
    "String",
    "Int",
    "Character",
    "Float",
    "Double",
    "RawRepresentable",
];

/// Marks `is_retained` on every declaration reachable from the seeds
/// under the retention rules.
///
/// Retention is a monotone fixpoint over a worklist: the `processed`
/// set guards reprocessing, and the state lattice (retained or not, per
/// declaration) is finite, so the pass terminates and is insensitive to
/// processing order.
pub struct Analyzer<'a> {
    graph: &'a mut SourceGraph,
    config: &'a Configuration,
    worklist: VecDeque<DeclarationId>,
    processed: HashSet<DeclarationId>,
}

impl<'a> Analyzer<'a> {
    pub fn new(graph: &'a mut SourceGraph, config: &'a Configuration) -> Self {
        Self {
            graph,
            config,
            worklist: VecDeque::new(),
            processed: HashSet::new(),
        }
    }

    pub fn mark_retained(mut self) -> Result<()> {
        self.seed();
        info!("{} seed declarations", self.worklist.len());
        self.propagate();
        info!(
            "{} of {} declarations retained",
            self.graph.declarations().filter(|d| d.is_retained).count(),
            self.graph.declaration_count()
        );
        Ok(())
    }

    /// Mark the declarations retained without requiring an incoming
    /// reference.
    fn seed(&mut self) {
        for id in self.graph.declaration_ids() {
            if self.is_seed(id) {
                self.retain(id);
            }
        }
    }

    fn is_seed(&self, id: DeclarationId) -> bool {
        let decl = self.graph.declaration(id);

        // Entry points, external witnesses and codable machinery were
        // marked by the mutators.
        if decl.is_retained {
            return true;
        }

        if self.config.retain_public && decl.accessibility.is_exported() {
            return true;
        }

        if self.config.retain_objc_annotated && self.is_objc_exposed(id) {
            return true;
        }

        if self.is_test_harness_coupled(id) {
            return true;
        }

        if self.is_property_wrapper_member(id) {
            return true;
        }

        // A symbol named by another module cannot be proven dead from
        // this module's perspective.
        if self.is_referenced_cross_module(id) {
            return true;
        }

        false
    }

    /// `@objc`/`@objcMembers` exposure. Members of an annotated type
    /// are only exposed when `@objcMembers` appears on the type or
    /// `@objc` on the member itself.
    fn is_objc_exposed(&self, id: DeclarationId) -> bool {
        let decl = self.graph.declaration(id);
        if decl.has_attribute("@objc") || decl.has_attribute("@objcMembers") {
            return true;
        }
        self.graph
            .ancestors(id)
            .into_iter()
            .take(1)
            .any(|parent| self.graph.declaration(parent).has_attribute("@objcMembers"))
    }

    /// Subclasses of configured test-harness base classes, and their
    /// test/setUp/tearDown methods.
    fn is_test_harness_coupled(&self, id: DeclarationId) -> bool {
        let decl = self.graph.declaration(id);
        match decl.kind {
            Kind::Class => self.is_test_class(id),
            Kind::FunctionMethodInstance | Kind::FunctionMethodStatic | Kind::FunctionMethodClass => {
                let Some(name) = decl.name.as_deref() else {
                    return false;
                };
                let bare = name.split('(').next().unwrap_or(name);
                if !(bare.starts_with("test") || bare == "setUp" || bare == "tearDown") {
                    return false;
                }
                self.graph
                    .ancestors(id)
                    .into_iter()
                    .find(|&a| self.graph.declaration(a).kind.is_concrete_type())
                    .map(|owner| self.is_test_class(owner))
                    .unwrap_or(false)
            }
            _ => false,
        }
    }

    fn is_test_class(&self, id: DeclarationId) -> bool {
        self.graph
            .inherited_type_references(id)
            .into_iter()
            .any(|r| {
                let reference = self.graph.reference(r);
                !reference.is_resolved() && self.config.is_test_base_class_usr(&reference.usr)
            })
    }

    /// The compiler calls these on `@propertyWrapper` types regardless
    /// of any visible reference.
    fn is_property_wrapper_member(&self, id: DeclarationId) -> bool {
        let decl = self.graph.declaration(id);
        let Some(name) = decl.name.as_deref() else {
            return false;
        };
        if !matches!(name, "wrappedValue" | "projectedValue" | "init(wrappedValue:)") {
            return false;
        }
        self.graph
            .nearest_declaration(decl.parent)
            .map(|parent| self.graph.declaration(parent).has_attribute("@propertyWrapper"))
            .unwrap_or(false)
    }

    fn is_referenced_cross_module(&self, id: DeclarationId) -> bool {
        let module = &self.graph.declaration(id).module;
        self.graph
            .incoming_references(id)
            .into_iter()
            .any(|r| &self.graph.reference(r).module != module)
    }

    /// Worklist transitive closure.
    fn propagate(&mut self) {
        while let Some(id) = self.worklist.pop_front() {
            let mut next: Vec<DeclarationId> = Vec::new();

            // Retained declarations keep their enclosing scopes alive.
            next.extend(self.graph.ancestors(id));

            // Everything the declaration uses.
            next.extend(self.graph.outgoing_targets(id));

            // Structural edges: superclasses and typealias targets
            // propagate; conformances do not drag protocols in.
            let decl_kind = self.graph.declaration(id).kind;
            for r in self.graph.declaration(id).related.clone() {
                let Some(target) = self.graph.reference(r).resolved else {
                    continue;
                };
                let target_is_protocol = self.graph.declaration(target).kind == Kind::Protocol;
                if decl_kind == Kind::Typealias || !target_is_protocol {
                    next.push(target);
                }
            }

            match decl_kind {
                Kind::Protocol => next.extend(self.protocol_witnesses(id)),
                Kind::Enum => {
                    if self.is_raw_representable(id) {
                        next.extend(self.enum_cases(id));
                    }
                }
                kind if kind.is_concrete_type() => {
                    next.extend(self.lifecycle_members(id));
                }
                _ => {}
            }

            // A live override keeps its dispatch root alive; the
            // reverse never holds.
            if let Some(base) = self.graph.override_base(id) {
                next.push(base);
            }

            // A retained requirement keeps its default implementations
            // alive even when every conformer shadows them, because
            // removing one changes dispatch.
            next.extend(self.default_implementations(id));

            for target in next {
                self.retain(target);
            }
        }
    }

    /// Members of conforming types that occupy witness slots of a
    /// retained protocol. Only direct members: the witness table is
    /// tied to the conforming type, not its subclasses.
    fn protocol_witnesses(&self, protocol: DeclarationId) -> Vec<DeclarationId> {
        let protocol_decl = self.graph.declaration(protocol);
        let requirement_names: Vec<String> = protocol_decl
            .declarations
            .iter()
            .filter_map(|&c| {
                let child = self.graph.declaration(c);
                ((child.kind.is_function() || child.kind.is_variable())
                    && !child.kind.is_accessor())
                .then(|| child.name.clone())
                .flatten()
            })
            .collect();

        let mut witnesses = Vec::new();
        for conformer in self.graph.conformers_of(&protocol_decl.usr) {
            for &member in &self.graph.declaration(conformer).declarations {
                let member_decl = self.graph.declaration(member);
                if let Some(name) = &member_decl.name {
                    if requirement_names.contains(name) {
                        witnesses.push(member);
                    }
                }
            }
        }
        witnesses
    }

    /// Protocol-extension members providing a default for a retained
    /// requirement.
    fn default_implementations(&self, requirement: DeclarationId) -> Vec<DeclarationId> {
        let Some(parent) = self
            .graph
            .nearest_declaration(self.graph.declaration(requirement).parent)
        else {
            return Vec::new();
        };
        if self.graph.declaration(parent).kind != Kind::Protocol {
            return Vec::new();
        }
        let Some(name) = self.graph.declaration(requirement).name.clone() else {
            return Vec::new();
        };

        let protocol_usr = self.graph.declaration(parent).usr.clone();
        let mut defaults = Vec::new();
        for extension in self.graph.extensions_of(&protocol_usr) {
            for &member in &self.graph.declaration(extension).declarations {
                if self.graph.declaration(member).name.as_ref() == Some(&name) {
                    defaults.push(member);
                }
            }
        }
        defaults
    }

    fn is_raw_representable(&self, id: DeclarationId) -> bool {
        self.graph.declaration(id).related.iter().any(|&r| {
            let reference = self.graph.reference(r);
            reference
                .name
                .as_deref()
                .map(|n| RAW_REPRESENTABLE_NAMES.contains(&n))
                .unwrap_or(false)
        })
    }

    fn enum_cases(&self, id: DeclarationId) -> Vec<DeclarationId> {
        self.graph
            .declaration(id)
            .declarations
            .iter()
            .copied()
            .filter(|&c| self.graph.declaration(c).kind == Kind::EnumElement)
            .collect()
    }

    /// Destructors and implicit initializers live and die with their
    /// type.
    fn lifecycle_members(&self, id: DeclarationId) -> Vec<DeclarationId> {
        self.graph
            .declaration(id)
            .declarations
            .iter()
            .copied()
            .filter(|&c| {
                let child = self.graph.declaration(c);
                child.kind == Kind::FunctionDestructor
                    || (child.is_implicit && child.kind == Kind::FunctionConstructor)
            })
            .collect()
    }

    fn retain(&mut self, id: DeclarationId) {
        if !self.processed.insert(id) {
            return;
        }
        let decl = self.graph.declaration_mut(id);
        if !decl.is_retained {
            debug!("retaining {}", decl.display());
            decl.is_retained = true;
        }
        self.worklist.push_back(id);
    }
}
