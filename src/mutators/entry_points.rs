use super::Mutator;
use crate::config::Configuration;
use crate::error::{Error, Result};
use crate::graph::{Kind, SourceGraph};
use std::path::Path;
use tracing::debug;

/// Marks the analysis roots: every top-level declaration in a
/// configured entry-point file, and `@main` types with their `main`
/// entry method.
pub struct EntryPointMutator;

impl Mutator for EntryPointMutator {
    fn name(&self) -> &'static str {
        "entry-points"
    }

    fn mutate(&self, graph: &mut SourceGraph, config: &Configuration) -> Result<()> {
        for filename in &config.entry_point_filenames {
            let known = graph
                .declarations()
                .any(|d| basename_matches(&d.location.file, filename));
            if !known {
                return Err(Error::configuration(format!(
                    "entry point file '{}' matches no indexed file",
                    filename
                )));
            }
        }

        let mut retained = 0usize;

        let roots: Vec<_> = graph.roots().collect();
        for root in roots {
            let file = graph.declaration(root).location.file.clone();
            let matches = config
                .entry_point_filenames
                .iter()
                .any(|name| basename_matches(&file, name));
            if matches && !graph.declaration(root).is_retained {
                graph.declaration_mut(root).is_retained = true;
                retained += 1;
            }
        }

        let annotated: Vec<_> = graph
            .declarations()
            .filter(|d| d.has_attribute("@main"))
            .map(|d| d.id)
            .collect();
        for id in annotated {
            graph.declaration_mut(id).is_retained = true;
            let entry_method = graph
                .declaration(id)
                .declarations
                .iter()
                .copied()
                .find(|&c| {
                    let child = graph.declaration(c);
                    matches!(
                        child.kind,
                        Kind::FunctionMethodStatic | Kind::FunctionMethodClass
                    ) && matches!(child.name.as_deref(), Some("main()") | Some("main"))
                });
            if let Some(method) = entry_method {
                graph.declaration_mut(method).is_retained = true;
            }
            retained += 1;
        }

        debug!("{} entry point declarations retained", retained);
        Ok(())
    }
}

fn basename_matches(file: &Path, name: &str) -> bool {
    file.file_name()
        .map(|f| f.to_string_lossy() == name)
        .unwrap_or(false)
}
