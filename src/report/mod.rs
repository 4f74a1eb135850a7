mod json;
mod terminal;

pub use json::JsonReporter;
pub use terminal::TerminalReporter;

use crate::analysis::AnalysisResults;
use miette::Result;
use std::path::PathBuf;

/// Output format for reports.
#[derive(Debug, Clone, Default)]
pub enum ReportFormat {
    #[default]
    Terminal,
    Json,
}

/// Renders analysis results. The core itself never writes to stdout;
/// all rendering happens here.
pub struct Reporter {
    format: ReportFormat,
    output_path: Option<PathBuf>,
}

impl Reporter {
    pub fn new(format: ReportFormat, output_path: Option<PathBuf>) -> Self {
        Self {
            format,
            output_path,
        }
    }

    pub fn report(&self, results: &AnalysisResults) -> Result<()> {
        match &self.format {
            ReportFormat::Terminal => TerminalReporter::new().report(results),
            ReportFormat::Json => JsonReporter::new(self.output_path.clone()).report(results),
        }
    }
}
