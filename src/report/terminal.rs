use crate::analysis::{AnalysisResults, Reason, UnusedItem};
use colored::Colorize;
use miette::Result;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Terminal reporter with colored output, grouped by file.
pub struct TerminalReporter;

impl TerminalReporter {
    pub fn new() -> Self {
        Self
    }

    pub fn report(&self, results: &AnalysisResults) -> Result<()> {
        if results.is_empty() {
            println!("{}", "No unused code found!".green().bold());
            return Ok(());
        }

        let mut by_file: BTreeMap<PathBuf, Vec<&UnusedItem>> = BTreeMap::new();
        for item in results.all() {
            by_file
                .entry(item.location.file.clone())
                .or_default()
                .push(item);
        }

        println!();
        println!(
            "{}",
            format!("Found {} unused declarations:", results.total())
                .yellow()
                .bold()
        );
        println!();

        for (file, items) in &by_file {
            println!("{}", file.display().to_string().cyan().bold());
            for item in items {
                self.print_item(item);
            }
            println!();
        }

        self.print_summary(results);
        Ok(())
    }

    fn print_item(&self, item: &UnusedItem) {
        let location = format!("{}:{}", item.location.line, item.location.column);
        let reason = match item.reason {
            Reason::Unused => "unused".yellow().bold(),
            Reason::AssignOnly => "assign-only".blue().bold(),
            Reason::UnusedParameter => "parameter".blue().bold(),
        };
        println!(
            "  {} {} [{}] {}",
            location.dimmed(),
            reason,
            item.reason.code().dimmed(),
            item.message()
        );
    }

    fn print_summary(&self, results: &AnalysisResults) {
        println!("{}", "─".repeat(60).dimmed());

        let mut parts = Vec::new();
        if !results.unreferenced_declarations.is_empty() {
            parts.push(
                format!("{} unused", results.unreferenced_declarations.len())
                    .yellow()
                    .to_string(),
            );
        }
        if !results.assign_only_properties.is_empty() {
            parts.push(
                format!("{} assign-only", results.assign_only_properties.len())
                    .blue()
                    .to_string(),
            );
        }
        if !results.unused_parameters.is_empty() {
            parts.push(
                format!("{} unused parameters", results.unused_parameters.len())
                    .blue()
                    .to_string(),
            );
        }
        println!("Summary: {}", parts.join(", "));
        println!();
        println!(
            "{}",
            "Tip: silence a finding with an 'indexsweep:ignore' comment".dimmed()
        );
    }
}

impl Default for TerminalReporter {
    fn default() -> Self {
        Self::new()
    }
}
