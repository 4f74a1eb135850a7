use crate::error::{Error, Result};
use crate::graph::{Accessibility, Kind};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Occurrence role as reported by the index store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Def,
    Ref,
    Related,
}

/// One raw record from the index store.
///
/// The provider must be complete (every `container_usr` resolves to a
/// definition emitted in the same run, or is absent for top-level
/// occurrences) and stable (same input, same stream).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OccurrenceRecord {
    pub module: String,
    pub file: PathBuf,
    pub line: u32,
    pub column: u32,
    pub kind: Kind,
    #[serde(default)]
    pub name: Option<String>,
    pub usr: String,
    pub role: Role,
    #[serde(default)]
    pub container_usr: Option<String>,
    #[serde(default)]
    pub attributes: Vec<String>,
    #[serde(default)]
    pub modifiers: Vec<String>,
    #[serde(default)]
    pub accessibility: Option<Accessibility>,
    /// Assignment shape of a `ref` occurrence. Reads are the default.
    #[serde(default)]
    pub is_write: bool,
}

impl OccurrenceRecord {
    /// Short rendering for error messages.
    pub fn describe(&self) -> String {
        format!(
            "{:?} {} '{}' at {}:{}:{}",
            self.role,
            self.kind,
            self.usr,
            self.file.display(),
            self.line,
            self.column
        )
    }
}

/// Source of raw index records.
///
/// Implementations may gather occurrences in parallel; the indexer
/// serializes all graph insertion on its side.
pub trait IndexProvider {
    fn occurrences(&self) -> Result<Vec<OccurrenceRecord>>;
}

/// Provider over a pre-built record list. Used by tests and by library
/// embedders that drive indexing themselves.
#[derive(Debug, Default, Clone)]
pub struct InMemoryProvider {
    records: Vec<OccurrenceRecord>,
}

impl InMemoryProvider {
    pub fn new(records: Vec<OccurrenceRecord>) -> Self {
        Self { records }
    }

    pub fn push(&mut self, record: OccurrenceRecord) {
        self.records.push(record);
    }
}

impl IndexProvider for InMemoryProvider {
    fn occurrences(&self) -> Result<Vec<OccurrenceRecord>> {
        Ok(self.records.clone())
    }
}

/// Provider reading one JSON record per line from an index export file.
///
/// Lines are parsed in parallel; record order is preserved so the
/// stream stays stable across runs.
#[derive(Debug)]
pub struct JsonlProvider {
    path: PathBuf,
}

impl JsonlProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl IndexProvider for JsonlProvider {
    fn occurrences(&self) -> Result<Vec<OccurrenceRecord>> {
        let contents = std::fs::read_to_string(&self.path)
            .map_err(|e| Error::io(self.path.clone(), e))?;

        let lines: Vec<(usize, &str)> = contents
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .collect();

        lines
            .par_iter()
            .map(|(index, line)| {
                serde_json::from_str::<OccurrenceRecord>(line).map_err(|e| Error::MalformedRecord {
                    path: self.path.clone(),
                    line: index + 1,
                    detail: e.to_string(),
                })
            })
            .collect()
    }
}
