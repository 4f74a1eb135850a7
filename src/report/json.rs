use crate::analysis::{AnalysisResults, UnusedItem};
#[cfg(test)]
use crate::analysis::Reason;
use miette::{IntoDiagnostic, Result};
use serde::Serialize;
use std::path::PathBuf;

/// JSON reporter for programmatic consumers.
pub struct JsonReporter {
    output_path: Option<PathBuf>,
}

impl JsonReporter {
    pub fn new(output_path: Option<PathBuf>) -> Self {
        Self { output_path }
    }

    pub fn report(&self, results: &AnalysisResults) -> Result<()> {
        let report = JsonReport::from_results(results);
        let json = serde_json::to_string_pretty(&report).into_diagnostic()?;

        if let Some(path) = &self.output_path {
            std::fs::write(path, &json).into_diagnostic()?;
            println!("Report written to: {}", path.display());
        } else {
            println!("{}", json);
        }
        Ok(())
    }
}

#[derive(Serialize)]
struct JsonReport {
    version: &'static str,
    total_issues: usize,
    issues: Vec<JsonIssue>,
    summary: JsonSummary,
}

#[derive(Serialize)]
struct JsonIssue {
    code: &'static str,
    reason: &'static str,
    message: String,
    file: String,
    line: u32,
    column: u32,
    kind: &'static str,
    name: Option<String>,
    module: String,
}

#[derive(Serialize)]
struct JsonSummary {
    unused: usize,
    assign_only: usize,
    unused_parameters: usize,
}

impl JsonReport {
    fn from_results(results: &AnalysisResults) -> Self {
        let issues: Vec<JsonIssue> = results.all().into_iter().map(JsonIssue::from_item).collect();
        Self {
            version: "1.0",
            total_issues: results.total(),
            issues,
            summary: JsonSummary {
                unused: results.unreferenced_declarations.len(),
                assign_only: results.assign_only_properties.len(),
                unused_parameters: results.unused_parameters.len(),
            },
        }
    }
}

impl JsonIssue {
    fn from_item(item: &UnusedItem) -> Self {
        Self {
            code: item.reason.code(),
            reason: item.reason.as_str(),
            message: item.message(),
            file: item.location.file.to_string_lossy().into_owned(),
            line: item.location.line,
            column: item.location.column,
            kind: item.kind.display_name(),
            name: item.name.clone(),
            module: item.module.clone(),
        }
    }
}
