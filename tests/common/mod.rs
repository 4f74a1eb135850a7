//! Shared fixture helpers: build occurrence record streams by hand and
//! drive the full pipeline through the in-memory provider.
#![allow(dead_code)]

use indexsweep::analysis::{AnalysisResults, Reason};
use indexsweep::config::Configuration;
use indexsweep::graph::{Accessibility, Kind, SourceGraph};
use indexsweep::index::{CommentScanner, InMemoryProvider, OccurrenceRecord, Role};

pub const MODULE: &str = "app";
pub const FILE: &str = "Sources/App.swift";

fn base(role: Role, kind: Kind, usr: &str, line: u32) -> OccurrenceRecord {
    OccurrenceRecord {
        module: MODULE.into(),
        file: FILE.into(),
        line,
        column: 1,
        kind,
        name: None,
        usr: usr.into(),
        role,
        container_usr: None,
        attributes: vec![],
        modifiers: vec![],
        accessibility: None,
        is_write: false,
    }
}

/// Top-level definition.
pub fn def(kind: Kind, usr: &str, name: &str, line: u32) -> OccurrenceRecord {
    let mut r = base(Role::Def, kind, usr, line);
    r.name = Some(name.into());
    r
}

/// Member definition.
pub fn def_in(kind: Kind, usr: &str, name: &str, line: u32, container: &str) -> OccurrenceRecord {
    let mut r = def(kind, usr, name, line);
    r.container_usr = Some(container.into());
    r
}

/// Use reference from inside `container`.
pub fn ref_in(kind: Kind, usr: &str, line: u32, container: &str) -> OccurrenceRecord {
    let mut r = base(Role::Ref, kind, usr, line);
    r.container_usr = Some(container.into());
    r
}

/// Structural reference (superclass, conformance, raw-value base).
pub fn related_in(
    kind: Kind,
    usr: &str,
    name: &str,
    line: u32,
    container: &str,
) -> OccurrenceRecord {
    let mut r = base(Role::Related, kind, usr, line);
    r.name = Some(name.into());
    r.container_usr = Some(container.into());
    r
}

pub fn in_file(mut r: OccurrenceRecord, file: &str) -> OccurrenceRecord {
    r.file = file.into();
    r
}

pub fn in_module(mut r: OccurrenceRecord, module: &str) -> OccurrenceRecord {
    r.module = module.into();
    r
}

pub fn with_access(mut r: OccurrenceRecord, accessibility: Accessibility) -> OccurrenceRecord {
    r.accessibility = Some(accessibility);
    r
}

pub fn with_attr(mut r: OccurrenceRecord, attribute: &str) -> OccurrenceRecord {
    r.attributes.push(attribute.into());
    r
}

pub fn with_modifier(mut r: OccurrenceRecord, modifier: &str) -> OccurrenceRecord {
    r.modifiers.push(modifier.into());
    r
}

pub fn as_write(mut r: OccurrenceRecord) -> OccurrenceRecord {
    r.is_write = true;
    r
}

pub fn run(records: Vec<OccurrenceRecord>, config: &Configuration) -> AnalysisResults {
    let provider = InMemoryProvider::new(records);
    indexsweep::run_analysis(&provider, config).expect("analysis failed")
}

pub fn run_graph(
    records: Vec<OccurrenceRecord>,
    config: &Configuration,
) -> (SourceGraph, AnalysisResults) {
    let provider = InMemoryProvider::new(records);
    indexsweep::analyze_graph(&provider, config).expect("analysis failed")
}

pub fn run_with_sources(
    records: Vec<OccurrenceRecord>,
    config: &Configuration,
    sources: &[(&str, &str)],
) -> AnalysisResults {
    let provider = InMemoryProvider::new(records);
    let mut scanner = CommentScanner::new();
    for (path, contents) in sources {
        scanner.add_source(*path, contents);
    }
    indexsweep::analyze_graph_with_scanner(&provider, config, scanner)
        .expect("analysis failed")
        .1
}

pub fn reported_unused(results: &AnalysisResults, name: &str) -> bool {
    results
        .unreferenced_declarations
        .iter()
        .any(|i| i.name.as_deref() == Some(name) && i.reason == Reason::Unused)
}

pub fn reported_assign_only(results: &AnalysisResults, name: &str) -> bool {
    results
        .assign_only_properties
        .iter()
        .any(|i| i.name.as_deref() == Some(name))
}

pub fn reported_parameter(results: &AnalysisResults, name: &str) -> bool {
    results
        .unused_parameters
        .iter()
        .any(|i| i.name.as_deref() == Some(name))
}

pub fn unused_names(results: &AnalysisResults) -> Vec<String> {
    results
        .unreferenced_declarations
        .iter()
        .map(|i| i.name.clone().unwrap_or_default())
        .collect()
}
