use super::Mutator;
use crate::config::Configuration;
use crate::error::Result;
use crate::graph::{CommentCommand, Kind, SourceGraph};
use std::path::PathBuf;
use tracing::debug;

/// Applies parsed comment directives: `ignore` hides a declaration and
/// its descendants from reporting, `ignore:parameters` hides a
/// function's unused parameters, `ignore:all` hides everything from the
/// directive to the end of the file.
pub struct CommentCommandsMutator;

impl Mutator for CommentCommandsMutator {
    fn name(&self) -> &'static str {
        "comment-commands"
    }

    fn mutate(&self, graph: &mut SourceGraph, _config: &Configuration) -> Result<()> {
        let ids = graph.declaration_ids();
        let mut ignore_all_from: Vec<(PathBuf, u32)> = Vec::new();
        let mut ignored = 0usize;

        for &id in &ids {
            for command in graph.declaration(id).comment_commands.clone() {
                match command {
                    CommentCommand::Ignore => {
                        graph.mark_ignored(id);
                        for descendant in graph.descendants(id) {
                            graph.mark_ignored(descendant);
                        }
                        ignored += 1;
                    }
                    CommentCommand::IgnoreParameters => {
                        let parameters: Vec<_> = graph
                            .declaration(id)
                            .declarations
                            .iter()
                            .copied()
                            .filter(|&c| graph.declaration(c).kind == Kind::VarParameter)
                            .collect();
                        for parameter in parameters {
                            graph.mark_ignored(parameter);
                        }
                    }
                    CommentCommand::IgnoreAll => {
                        let location = &graph.declaration(id).location;
                        ignore_all_from.push((location.file.clone(), location.line));
                    }
                }
            }
        }

        for (file, line) in ignore_all_from {
            for &id in &ids {
                let location = &graph.declaration(id).location;
                if location.file == file && location.line >= line {
                    graph.mark_ignored(id);
                    for descendant in graph.descendants(id) {
                        graph.mark_ignored(descendant);
                    }
                }
            }
        }

        if ignored > 0 {
            debug!("{} declarations ignored by comment directives", ignored);
        }
        Ok(())
    }
}
