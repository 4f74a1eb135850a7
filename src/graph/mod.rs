pub mod comment;
mod declaration;
mod kind;
mod reference;

pub use comment::{CommentCommand, DIRECTIVE_PREFIX};
pub use declaration::{Accessibility, Declaration, DeclarationId, Location, Parent};
pub use kind::Kind;
pub use reference::{Reference, ReferenceId};

use crate::error::{Error, Result};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use std::collections::{HashMap, HashSet};

/// The source graph: all declarations and references of the analyzed
/// modules, with the secondary indices the mutators and analyzer need.
///
/// Declarations and references live in arenas addressed by stable id
/// newtypes; `parent` links are back-edges, so cycles between entities
/// are harmless. A directed graph mirrors every *resolved* use edge
/// (nearest enclosing declaration → target declaration) and backs the
/// incoming/outgoing queries.
#[derive(Debug, Default)]
pub struct SourceGraph {
    decls: Vec<Declaration>,
    refs: Vec<Reference>,
    removed_decls: HashSet<DeclarationId>,
    removed_refs: HashSet<ReferenceId>,

    /// Resolved use edges, weighted by the reference that produced them.
    inner: DiGraph<DeclarationId, ReferenceId>,
    node_map: HashMap<DeclarationId, NodeIndex>,

    by_usr: HashMap<String, DeclarationId>,
    by_kind_name: HashMap<(Kind, String), HashSet<DeclarationId>>,

    /// Extensions grouped by the usr of the type they extend.
    by_extended_usr: HashMap<String, HashSet<DeclarationId>>,

    /// Conforming concrete types grouped by protocol usr.
    conformances: HashMap<String, HashSet<DeclarationId>>,

    /// Idempotency key for `add_declaration`.
    dedup: HashMap<(Kind, String, Location), DeclarationId>,

    root_declarations: HashSet<DeclarationId>,
    ignored: HashSet<DeclarationId>,
    unresolved: Vec<ReferenceId>,

    /// Override links built by the override-chains mutator.
    override_bases: HashMap<DeclarationId, DeclarationId>,
    override_subs: HashMap<DeclarationId, Vec<DeclarationId>>,

    /// Members treated as witnesses of externally-declared protocols.
    foreign_witnesses: HashSet<DeclarationId>,
}

impl SourceGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a declaration. Idempotent on `(kind, usr, location)`: a
    /// duplicate returns the existing id untouched.
    pub fn add_declaration(&mut self, mut decl: Declaration) -> DeclarationId {
        let key = (decl.kind, decl.usr.clone(), decl.location.clone());
        if let Some(&existing) = self.dedup.get(&key) {
            return existing;
        }

        let id = DeclarationId(self.decls.len() as u32);
        decl.id = id;

        let node = self.inner.add_node(id);
        self.node_map.insert(id, node);

        self.by_usr.insert(decl.usr.clone(), id);
        if let Some(name) = &decl.name {
            self.by_kind_name
                .entry((decl.kind, name.clone()))
                .or_default()
                .insert(id);
        }
        self.dedup.insert(key, id);
        self.decls.push(decl);
        id
    }

    pub fn add_reference(&mut self, mut reference: Reference) -> ReferenceId {
        let id = ReferenceId(self.refs.len() as u32);
        reference.id = id;
        self.refs.push(reference);
        id
    }

    /// Attach `child` under `parent`, replacing any previous parent link.
    pub fn attach_child(&mut self, parent: DeclarationId, child: DeclarationId) {
        self.detach_from_parent(child);
        self.decls[child.0 as usize].parent = Some(Parent::Decl(parent));
        self.decls[parent.0 as usize].declarations.push(child);
        self.root_declarations.remove(&child);
    }

    /// Attach `child` under a reference. Used for implicit declarations
    /// owned by a use-site.
    pub fn attach_child_of_reference(&mut self, parent: ReferenceId, child: DeclarationId) {
        self.detach_from_parent(child);
        self.decls[child.0 as usize].parent = Some(Parent::Ref(parent));
        self.refs[parent.0 as usize].declarations.push(child);
        self.root_declarations.remove(&child);
    }

    fn detach_from_parent(&mut self, child: DeclarationId) {
        match self.decls[child.0 as usize].parent {
            Some(Parent::Decl(old)) => {
                self.decls[old.0 as usize].declarations.retain(|c| *c != child);
            }
            Some(Parent::Ref(old)) => {
                self.refs[old.0 as usize].declarations.retain(|c| *c != child);
            }
            None => {}
        }
        self.decls[child.0 as usize].parent = None;
    }

    pub fn mark_root(&mut self, id: DeclarationId) {
        self.root_declarations.insert(id);
    }

    /// Attach a reference to its owner: related references land in the
    /// owner's `related` list, use references in `references`. Structural
    /// indices (`conformances`, `by_extended_usr`) are maintained here so
    /// they exist even while the target is unresolved.
    pub fn attach_reference(&mut self, owner: Parent, ref_id: ReferenceId) {
        self.refs[ref_id.0 as usize].parent = Some(owner);
        match owner {
            Parent::Decl(decl_id) => {
                let (is_related, ref_kind, ref_usr) = {
                    let r = &self.refs[ref_id.0 as usize];
                    (r.is_related, r.kind, r.usr.clone())
                };
                if is_related {
                    self.decls[decl_id.0 as usize].related.push(ref_id);
                    let owner_kind = self.decls[decl_id.0 as usize].kind;
                    if owner_kind.is_concrete_type() && ref_kind == Kind::Protocol {
                        self.conformances.entry(ref_usr).or_default().insert(decl_id);
                    } else if owner_kind.is_extension() {
                        self.by_extended_usr
                            .entry(ref_usr)
                            .or_default()
                            .insert(decl_id);
                    }
                } else {
                    self.decls[decl_id.0 as usize].references.push(ref_id);
                }
            }
            Parent::Ref(parent_ref) => {
                self.refs[parent_ref.0 as usize].references.push(ref_id);
            }
        }
    }

    /// Resolve a reference to its in-graph target and mirror the use
    /// edge in the directed graph.
    pub fn resolve_reference(&mut self, ref_id: ReferenceId, target: DeclarationId) {
        self.refs[ref_id.0 as usize].resolved = Some(target);
        let source = self.nearest_declaration(self.refs[ref_id.0 as usize].parent);
        if let Some(source) = source {
            let (from, to) = (self.node_map[&source], self.node_map[&target]);
            self.inner.add_edge(from, to, ref_id);
        }
    }

    pub fn mark_unresolved(&mut self, ref_id: ReferenceId) {
        self.unresolved.push(ref_id);
    }

    /// Nearest enclosing declaration of an entity, following parent
    /// back-edges through any nested references.
    pub fn nearest_declaration(&self, mut parent: Option<Parent>) -> Option<DeclarationId> {
        while let Some(p) = parent {
            match p {
                Parent::Decl(id) => return Some(id),
                Parent::Ref(id) => parent = self.refs[id.0 as usize].parent,
            }
        }
        None
    }

    pub fn declaration(&self, id: DeclarationId) -> &Declaration {
        &self.decls[id.0 as usize]
    }

    pub fn declaration_mut(&mut self, id: DeclarationId) -> &mut Declaration {
        &mut self.decls[id.0 as usize]
    }

    pub fn reference(&self, id: ReferenceId) -> &Reference {
        &self.refs[id.0 as usize]
    }

    pub fn reference_mut(&mut self, id: ReferenceId) -> &mut Reference {
        &mut self.refs[id.0 as usize]
    }

    /// All live declarations.
    pub fn declarations(&self) -> impl Iterator<Item = &Declaration> {
        self.decls
            .iter()
            .filter(|d| !self.removed_decls.contains(&d.id))
    }

    pub fn declaration_ids(&self) -> Vec<DeclarationId> {
        self.declarations().map(|d| d.id).collect()
    }

    pub fn references(&self) -> impl Iterator<Item = &Reference> {
        self.refs
            .iter()
            .filter(|r| !self.removed_refs.contains(&r.id))
    }

    pub fn declaration_by_usr(&self, usr: &str) -> Option<DeclarationId> {
        self.by_usr.get(usr).copied()
    }

    pub fn declarations_by_kind_name(&self, kind: Kind, name: &str) -> Vec<DeclarationId> {
        self.by_kind_name
            .get(&(kind, name.to_owned()))
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Extensions of the type identified by `usr`.
    pub fn extensions_of(&self, usr: &str) -> Vec<DeclarationId> {
        self.by_extended_usr
            .get(usr)
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Concrete types conforming to the protocol identified by `usr`.
    pub fn conformers_of(&self, usr: &str) -> Vec<DeclarationId> {
        self.conformances
            .get(usr)
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default()
    }

    pub fn roots(&self) -> impl Iterator<Item = DeclarationId> + '_ {
        self.root_declarations.iter().copied()
    }

    /// All incoming use edges targeting the declaration with `usr`.
    pub fn references_to(&self, usr: &str) -> Vec<ReferenceId> {
        let Some(id) = self.declaration_by_usr(usr) else {
            return Vec::new();
        };
        self.incoming_references(id)
    }

    pub fn incoming_references(&self, id: DeclarationId) -> Vec<ReferenceId> {
        let Some(&node) = self.node_map.get(&id) else {
            return Vec::new();
        };
        self.inner
            .edges_directed(node, Direction::Incoming)
            .map(|e| *e.weight())
            .filter(|r| !self.removed_refs.contains(r))
            .collect()
    }

    pub fn has_incoming_references(&self, id: DeclarationId) -> bool {
        !self.incoming_references(id).is_empty()
    }

    /// Targets of every resolved use edge originating in `id`,
    /// including edges produced by references nested under `id`'s own.
    pub fn outgoing_targets(&self, id: DeclarationId) -> Vec<DeclarationId> {
        let Some(&node) = self.node_map.get(&id) else {
            return Vec::new();
        };
        self.inner
            .edges_directed(node, Direction::Outgoing)
            .filter(|e| !self.removed_refs.contains(e.weight()))
            .filter_map(|e| self.inner.node_weight(e.target()).copied())
            .collect()
    }

    /// DFS over child declarations.
    pub fn descendants(&self, id: DeclarationId) -> Vec<DeclarationId> {
        let mut out = Vec::new();
        let mut stack: Vec<DeclarationId> = self.decls[id.0 as usize].declarations.clone();
        while let Some(next) = stack.pop() {
            if self.removed_decls.contains(&next) {
                continue;
            }
            out.push(next);
            stack.extend(self.decls[next.0 as usize].declarations.iter().copied());
        }
        out
    }

    /// Enclosing declarations from the immediate parent outward.
    pub fn ancestors(&self, id: DeclarationId) -> Vec<DeclarationId> {
        let mut out = Vec::new();
        let mut current = self.nearest_declaration(self.decls[id.0 as usize].parent);
        while let Some(ancestor) = current {
            out.push(ancestor);
            current = self.nearest_declaration(self.decls[ancestor.0 as usize].parent);
        }
        out
    }

    /// Transitive closure over `related` edges following class
    /// inheritance and protocol conformance.
    pub fn inherited_type_references(&self, id: DeclarationId) -> Vec<ReferenceId> {
        let mut out = Vec::new();
        let mut visited = HashSet::new();
        let mut stack = vec![id];
        while let Some(decl_id) = stack.pop() {
            if !visited.insert(decl_id) {
                continue;
            }
            for &ref_id in &self.decls[decl_id.0 as usize].related {
                let r = &self.refs[ref_id.0 as usize];
                if !matches!(r.kind, Kind::Class | Kind::Protocol) {
                    continue;
                }
                out.push(ref_id);
                if let Some(target) = r.resolved {
                    stack.push(target);
                }
            }
        }
        out
    }

    /// The in-graph superclass of a class declaration, if any.
    pub fn superclass_of(&self, id: DeclarationId) -> Option<DeclarationId> {
        self.decls[id.0 as usize]
            .related
            .iter()
            .filter_map(|&r| {
                let reference = &self.refs[r.0 as usize];
                (reference.kind == Kind::Class).then_some(reference.resolved).flatten()
            })
            .next()
    }

    /// Whether a variable declaration is a computed property. Stored
    /// properties never own a getter accessor; observers (willset,
    /// didset) do not make a property computed.
    pub fn is_computed_property(&self, id: DeclarationId) -> bool {
        self.decls[id.0 as usize]
            .declarations
            .iter()
            .any(|&c| self.decls[c.0 as usize].kind == Kind::FunctionAccessorGetter)
    }

    pub fn mark_ignored(&mut self, id: DeclarationId) {
        self.ignored.insert(id);
    }

    pub fn is_ignored(&self, id: DeclarationId) -> bool {
        self.ignored.contains(&id)
    }

    pub fn link_override(&mut self, sub: DeclarationId, base: DeclarationId) {
        if self.override_bases.insert(sub, base).is_none() {
            self.override_subs.entry(base).or_default().push(sub);
        }
    }

    pub fn override_base(&self, sub: DeclarationId) -> Option<DeclarationId> {
        self.override_bases.get(&sub).copied()
    }

    pub fn override_subs(&self, base: DeclarationId) -> Vec<DeclarationId> {
        self.override_subs.get(&base).cloned().unwrap_or_default()
    }

    pub fn mark_foreign_witness(&mut self, id: DeclarationId) {
        self.foreign_witnesses.insert(id);
    }

    pub fn is_foreign_witness(&self, id: DeclarationId) -> bool {
        self.foreign_witnesses.contains(&id)
    }

    pub fn unresolved_references(&self) -> &[ReferenceId] {
        &self.unresolved
    }

    pub fn declaration_count(&self) -> usize {
        self.decls.len() - self.removed_decls.len()
    }

    pub fn reference_count(&self) -> usize {
        self.refs.len() - self.removed_refs.len()
    }

    /// Remove a declaration and its descendants, maintaining all
    /// indices. Used by mutators that reinterpret edges.
    pub fn remove_declaration(&mut self, id: DeclarationId) {
        for child in self.decls[id.0 as usize].declarations.clone() {
            self.remove_declaration(child);
        }
        self.detach_from_parent(id);

        let decl = &self.decls[id.0 as usize];
        let usr = decl.usr.clone();
        let kind_name = decl.name.as_ref().map(|n| (decl.kind, n.clone()));
        let dedup_key = (decl.kind, usr.clone(), decl.location.clone());

        for ref_id in decl.references.clone().into_iter().chain(decl.related.clone()) {
            self.removed_refs.insert(ref_id);
        }

        if self.by_usr.get(&usr) == Some(&id) {
            self.by_usr.remove(&usr);
        }
        if let Some(key) = kind_name {
            if let Some(set) = self.by_kind_name.get_mut(&key) {
                set.remove(&id);
            }
        }
        for set in self.by_extended_usr.values_mut() {
            set.remove(&id);
        }
        for set in self.conformances.values_mut() {
            set.remove(&id);
        }
        self.dedup.remove(&dedup_key);
        self.root_declarations.remove(&id);
        self.ignored.remove(&id);
        self.override_bases.remove(&id);
        self.override_subs.remove(&id);
        self.foreign_witnesses.remove(&id);

        if let Some(node) = self.node_map.remove(&id) {
            let last = NodeIndex::new(self.inner.node_count() - 1);
            let swapped = (node != last).then(|| *self.inner.node_weight(last).unwrap());
            self.inner.remove_node(node);
            if let Some(moved) = swapped {
                self.node_map.insert(moved, node);
            }
        }

        self.removed_decls.insert(id);
    }

    pub fn is_removed(&self, id: DeclarationId) -> bool {
        self.removed_decls.contains(&id)
    }

    /// Debug-only consistency check run after each pass. Accessibility
    /// bounds are only enforceable once the accessibility mutator ran.
    pub fn validate(&self, check_accessibility: bool) -> Result<()> {
        for decl in self.declarations() {
            if self.by_usr.get(&decl.usr).is_none() {
                return Err(Error::inconsistency(format!(
                    "declaration {} missing from usr index",
                    decl.display()
                )));
            }

            // Parent chains must terminate, and accessors belong to vars.
            let mut hops = 0usize;
            let mut current = decl.parent;
            while let Some(parent) = current {
                hops += 1;
                if hops > self.decls.len() + self.refs.len() {
                    return Err(Error::inconsistency(format!(
                        "parent cycle at {}",
                        decl.display()
                    )));
                }
                current = match parent {
                    Parent::Decl(p) => self.decls[p.0 as usize].parent,
                    Parent::Ref(r) => self.refs[r.0 as usize].parent,
                };
            }

            if decl.kind.is_accessor() {
                let owner = self.nearest_declaration(decl.parent);
                if let Some(owner) = owner {
                    if !self.declaration(owner).kind.is_variable() {
                        return Err(Error::inconsistency(format!(
                            "accessor {} not owned by a variable",
                            decl.display()
                        )));
                    }
                }
            }

            if check_accessibility && decl.kind.is_extension() {
                for &child in &decl.declarations {
                    let child_decl = self.declaration(child);
                    if child_decl.accessibility > decl.accessibility {
                        return Err(Error::inconsistency(format!(
                            "extension member {} exceeds extension accessibility",
                            child_decl.display()
                        )));
                    }
                }
            }
        }

        for reference in self.references() {
            if let Some(target) = reference.resolved {
                let decl = self.declaration(target);
                if decl.usr != reference.usr || decl.kind != reference.kind {
                    return Err(Error::inconsistency(format!(
                        "resolved reference at {} disagrees with its target {}",
                        reference.location,
                        decl.display()
                    )));
                }
            }
        }

        Ok(())
    }
}
