mod analyzer;
mod assign_only;
mod parameters;

pub use analyzer::Analyzer;

use crate::config::Configuration;
use crate::error::Result;
use crate::graph::{Declaration, DeclarationId, Kind, Location, SourceGraph};
use serde::{Deserialize, Serialize};

/// Why a declaration appears in the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Reason {
    /// Never reached from any root.
    Unused,
    /// Referenced, but only ever written.
    AssignOnly,
    /// Parameter of a live function that no implementation uses.
    UnusedParameter,
}

impl Reason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Reason::Unused => "unused",
            Reason::AssignOnly => "assignOnly",
            Reason::UnusedParameter => "unusedParameter",
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Reason::Unused => "IS001",
            Reason::AssignOnly => "IS002",
            Reason::UnusedParameter => "IS003",
        }
    }
}

impl std::fmt::Display for Reason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One reported declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnusedItem {
    pub location: Location,
    pub kind: Kind,
    pub name: Option<String>,
    pub module: String,
    pub reason: Reason,
}

impl UnusedItem {
    fn from_declaration(decl: &Declaration, reason: Reason) -> Self {
        Self {
            location: decl.location.clone(),
            kind: decl.kind,
            name: decl.name.clone(),
            module: decl.module.clone(),
            reason,
        }
    }

    pub fn name_or_default(&self) -> &str {
        self.name.as_deref().unwrap_or("(anonymous)")
    }

    /// Report message in the terminal format.
    pub fn message(&self) -> String {
        match self.reason {
            Reason::Unused => format!(
                "{} '{}' is never used",
                self.kind.display_name(),
                self.name_or_default()
            ),
            Reason::AssignOnly => format!(
                "{} '{}' is assigned but never read",
                self.kind.display_name(),
                self.name_or_default()
            ),
            Reason::UnusedParameter => {
                format!("parameter '{}' is never used", self.name_or_default())
            }
        }
    }
}

/// Structured analysis output, each list sorted by
/// `(file, line, column, kind, name)` for deterministic reporting.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResults {
    pub unreferenced_declarations: Vec<UnusedItem>,
    pub unused_parameters: Vec<UnusedItem>,
    pub assign_only_properties: Vec<UnusedItem>,
}

impl AnalysisResults {
    pub fn total(&self) -> usize {
        self.unreferenced_declarations.len()
            + self.unused_parameters.len()
            + self.assign_only_properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// All items merged, in report order.
    pub fn all(&self) -> Vec<&UnusedItem> {
        let mut items: Vec<&UnusedItem> = self
            .unreferenced_declarations
            .iter()
            .chain(&self.unused_parameters)
            .chain(&self.assign_only_properties)
            .collect();
        sort_items_ref(&mut items);
        items
    }
}

/// Run the retention fixpoint and the two follow-up analyses over a
/// mutated graph, then collect the report.
pub fn run(graph: &mut SourceGraph, config: &Configuration) -> Result<AnalysisResults> {
    Analyzer::new(graph, config).mark_retained()?;
    let unused_parameters = parameters::analyze(graph, config);
    let assign_only = assign_only::analyze(graph, config);
    Ok(collect(graph, &unused_parameters, &assign_only))
}

fn collect(
    graph: &SourceGraph,
    unused_parameters: &[DeclarationId],
    assign_only: &[DeclarationId],
) -> AnalysisResults {
    let mut unreferenced: Vec<UnusedItem> = graph
        .declarations()
        .filter(|d| !d.is_retained && !graph.is_ignored(d.id))
        .filter(|d| is_reportable(d))
        .map(|d| UnusedItem::from_declaration(d, Reason::Unused))
        .collect();
    sort_items(&mut unreferenced);

    let mut parameters: Vec<UnusedItem> = unused_parameters
        .iter()
        .map(|&p| UnusedItem::from_declaration(graph.declaration(p), Reason::UnusedParameter))
        .collect();
    sort_items(&mut parameters);

    let mut assign_only: Vec<UnusedItem> = assign_only
        .iter()
        .map(|&p| UnusedItem::from_declaration(graph.declaration(p), Reason::AssignOnly))
        .collect();
    sort_items(&mut assign_only);

    AnalysisResults {
        unreferenced_declarations: unreferenced,
        unused_parameters: parameters,
        assign_only_properties: assign_only,
    }
}

/// Synthetic containers and compiler-synthesized members are not
/// actionable; parameters and accessors are covered by their own
/// analyses.
fn is_reportable(decl: &Declaration) -> bool {
    decl.kind != Kind::Module
        && decl.kind != Kind::VarParameter
        && !decl.kind.is_accessor()
        && !decl.is_implicit
}

fn sort_items(items: &mut [UnusedItem]) {
    items.sort_by(|a, b| {
        (&a.location, a.kind, &a.name).cmp(&(&b.location, b.kind, &b.name))
    });
}

fn sort_items_ref(items: &mut [&UnusedItem]) {
    items.sort_by(|a, b| {
        (&a.location, a.kind, &a.name).cmp(&(&b.location, b.kind, &b.name))
    });
}
