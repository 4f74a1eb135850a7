use crate::error::{Error, Result};
use crate::graph::{Declaration, Kind, Location, Parent, Reference, SourceGraph};
use std::collections::HashMap;
use std::path::PathBuf;
use tracing::{debug, info, warn};

use super::provider::{IndexProvider, OccurrenceRecord, Role};
use super::scanner::CommentScanner;

/// Materializes the provider's occurrence stream into a [`SourceGraph`].
///
/// Providers may index translation units in parallel; everything here
/// runs serially, so graph insertion is a single critical section.
pub struct Indexer<'p, P: IndexProvider> {
    provider: &'p P,
    scanner: CommentScanner,
    canonical: HashMap<PathBuf, PathBuf>,
}

impl<'p, P: IndexProvider> Indexer<'p, P> {
    pub fn new(provider: &'p P) -> Self {
        Self {
            provider,
            scanner: CommentScanner::new(),
            canonical: HashMap::new(),
        }
    }

    /// Replace the comment scanner, e.g. with one pre-seeded with
    /// in-memory sources.
    pub fn with_scanner(mut self, scanner: CommentScanner) -> Self {
        self.scanner = scanner;
        self
    }

    pub fn index(mut self) -> Result<SourceGraph> {
        let records = self.provider.occurrences()?;
        info!("indexing {} occurrence records", records.len());

        let mut graph = SourceGraph::new();

        self.materialize_definitions(&mut graph, &records)?;
        self.link_definition_parents(&mut graph, &records)?;
        self.materialize_references(&mut graph, &records)?;
        self.rewire_accessors(&mut graph);
        self.rewire_members_by_position(&mut graph);
        self.resolve_references(&mut graph);

        info!(
            "indexed {} declarations, {} references",
            graph.declaration_count(),
            graph.reference_count()
        );
        Ok(graph)
    }

    /// First pass: create a declaration for every `def` occurrence.
    fn materialize_definitions(
        &mut self,
        graph: &mut SourceGraph,
        records: &[OccurrenceRecord],
    ) -> Result<()> {
        for record in records.iter().filter(|r| r.role == Role::Def) {
            let location = self.location_of(record);

            if let Some(existing) = graph.declaration_by_usr(&record.usr) {
                let existing = graph.declaration(existing);
                if existing.kind != record.kind {
                    return Err(Error::inconsistency(format!(
                        "usr '{}' reported as both {} and {} ({})",
                        record.usr,
                        existing.kind,
                        record.kind,
                        record.describe()
                    )));
                }
                if existing.location == location {
                    // Duplicate definition from another translation unit.
                    continue;
                }
                return Err(Error::inconsistency(format!(
                    "duplicate definitions for usr '{}' at {} and {}",
                    record.usr, existing.location, location
                )));
            }

            let mut decl = Declaration::new(
                record.kind,
                record.usr.clone(),
                record.module.clone(),
                location.clone(),
            );
            decl.name = record.name.clone();
            decl.attributes = record.attributes.iter().cloned().collect();
            decl.modifiers = record.modifiers.iter().cloned().collect();
            if let Some(accessibility) = record.accessibility {
                decl.accessibility = accessibility;
                decl.explicit_accessibility = true;
            }
            decl.comment_commands = self.scanner.commands_at(&location);

            graph.add_declaration(decl);
        }
        Ok(())
    }

    /// Attach every definition to its container, or mark it top-level.
    fn link_definition_parents(
        &self,
        graph: &mut SourceGraph,
        records: &[OccurrenceRecord],
    ) -> Result<()> {
        for record in records.iter().filter(|r| r.role == Role::Def) {
            let child = graph
                .declaration_by_usr(&record.usr)
                .expect("definition materialized in first pass");

            match &record.container_usr {
                Some(container) => {
                    let parent = graph.declaration_by_usr(container).ok_or_else(|| {
                        Error::inconsistency(format!(
                            "dangling container '{}' for {}",
                            container,
                            record.describe()
                        ))
                    })?;
                    graph.attach_child(parent, child);
                }
                None => graph.mark_root(child),
            }
        }
        Ok(())
    }

    /// Second pass: create reference edges for `ref` and `related`
    /// occurrences and hang them off their containers.
    fn materialize_references(
        &mut self,
        graph: &mut SourceGraph,
        records: &[OccurrenceRecord],
    ) -> Result<()> {
        for record in records.iter().filter(|r| r.role != Role::Def) {
            let container = match &record.container_usr {
                Some(container) => graph.declaration_by_usr(container).ok_or_else(|| {
                    Error::inconsistency(format!(
                        "dangling container '{}' for {}",
                        container,
                        record.describe()
                    ))
                })?,
                None => self.module_container(graph, &record.module),
            };

            let mut reference = Reference::new(
                record.kind,
                record.usr.clone(),
                record.module.clone(),
                self.location_of(record),
            )
            .with_related(record.role == Role::Related)
            .with_write(record.is_write);
            reference.name = record.name.clone();

            let ref_id = graph.add_reference(reference);
            graph.attach_reference(Parent::Decl(container), ref_id);
        }
        Ok(())
    }

    /// Container for references that occur at file scope.
    fn module_container(&self, graph: &mut SourceGraph, module: &str) -> crate::graph::DeclarationId {
        let usr = format!("module:{}", module);
        if let Some(existing) = graph.declaration_by_usr(&usr) {
            return existing;
        }
        let decl = Declaration::new(
            Kind::Module,
            usr,
            module.to_owned(),
            Location::new(format!("<{}>", module), 0, 0),
        )
        .with_name(module);
        graph.add_declaration(decl)
    }

    /// Providers sometimes report accessors as members of the enclosing
    /// type. Reparent them under the variable they accessorize.
    fn rewire_accessors(&self, graph: &mut SourceGraph) {
        let mut moves = Vec::new();
        for decl in graph.declarations() {
            if !decl.kind.is_accessor() {
                continue;
            }
            let Some(owner) = graph.nearest_declaration(decl.parent) else {
                continue;
            };
            if graph.declaration(owner).kind.is_variable() {
                continue;
            }
            let Some(name) = &decl.name else { continue };
            let var = graph
                .declaration(owner)
                .declarations
                .iter()
                .copied()
                .find(|&c| {
                    let child = graph.declaration(c);
                    child.kind.is_variable() && child.name.as_ref() == Some(name)
                });
            if let Some(var) = var {
                moves.push((var, decl.id));
            }
        }
        for (var, accessor) in moves {
            debug!("reparenting accessor {} under its variable", accessor);
            graph.attach_child(var, accessor);
        }
    }

    /// Reparent enum elements and parameters that were reported against
    /// an outer container: the owner is the innermost sibling of the
    /// right kind that precedes them in the same file.
    fn rewire_members_by_position(&self, graph: &mut SourceGraph) {
        let mut moves = Vec::new();
        for decl in graph.declarations() {
            let owner_wanted: fn(Kind) -> bool = match decl.kind {
                Kind::EnumElement => |k| k == Kind::Enum,
                Kind::VarParameter => |k| k.is_function(),
                _ => continue,
            };
            let Some(parent) = graph.nearest_declaration(decl.parent) else {
                continue;
            };
            if owner_wanted(graph.declaration(parent).kind) {
                continue;
            }
            let owner = graph
                .declaration(parent)
                .declarations
                .iter()
                .copied()
                .filter(|&c| {
                    let sibling = graph.declaration(c);
                    owner_wanted(sibling.kind)
                        && sibling.location.file == decl.location.file
                        && sibling.location < decl.location
                })
                .max_by(|&a, &b| {
                    graph
                        .declaration(a)
                        .location
                        .cmp(&graph.declaration(b).location)
                });
            if let Some(owner) = owner {
                moves.push((owner, decl.id));
            }
        }
        for (owner, member) in moves {
            graph.attach_child(owner, member);
        }
    }

    /// Resolve every reference against the usr index. Unresolved
    /// references stay in the graph as external symbols.
    fn resolve_references(&self, graph: &mut SourceGraph) {
        let ref_ids: Vec<_> = graph.references().map(|r| r.id).collect();
        let mut unresolved = 0usize;
        for ref_id in ref_ids {
            let (usr, kind, location) = {
                let r = graph.reference(ref_id);
                (r.usr.clone(), r.kind, r.location.clone())
            };
            match graph.declaration_by_usr(&usr) {
                Some(target) if graph.declaration(target).kind == kind => {
                    graph.resolve_reference(ref_id, target);
                }
                Some(target) => {
                    // Same usr, different kind: keep it external rather
                    // than wiring a contradictory edge.
                    warn!(
                        "reference at {} has kind {} but target {} has kind {}",
                        location,
                        kind,
                        usr,
                        graph.declaration(target).kind
                    );
                    graph.mark_unresolved(ref_id);
                    unresolved += 1;
                }
                None => {
                    if !Self::is_known_external_kind(kind) {
                        warn!("unresolved {} reference to '{}' at {}", kind, usr, location);
                    }
                    graph.mark_unresolved(ref_id);
                    unresolved += 1;
                }
            }
        }
        if unresolved > 0 {
            debug!("{} references left unresolved (external symbols)", unresolved);
        }
    }

    /// Kinds routinely referenced from other frameworks; their
    /// unresolved references are expected and not worth a warning.
    fn is_known_external_kind(kind: Kind) -> bool {
        kind.is_type() || kind.is_function()
    }

    fn location_of(&mut self, record: &OccurrenceRecord) -> Location {
        let file = self
            .canonical
            .entry(record.file.clone())
            .or_insert_with(|| {
                std::fs::canonicalize(&record.file).unwrap_or_else(|_| record.file.clone())
            })
            .clone();
        Location::new(file, record.line, record.column)
    }
}
