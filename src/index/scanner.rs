use crate::graph::{CommentCommand, Location};
use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Reads the comment lines immediately above a declaration and parses
/// any directives found there.
///
/// Files are read lazily and cached per path. Tests (and providers that
/// index unsaved buffers) can pre-seed sources instead of touching the
/// filesystem. A file that cannot be read simply yields no directives.
#[derive(Debug, Default)]
pub struct CommentScanner {
    sources: RefCell<HashMap<PathBuf, Option<Vec<String>>>>,
}

impl CommentScanner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-seed the scanner with in-memory file contents.
    pub fn add_source(&mut self, path: impl Into<PathBuf>, contents: &str) {
        self.sources.borrow_mut().insert(
            path.into(),
            Some(contents.lines().map(str::to_owned).collect()),
        );
    }

    /// Directives attached to the declaration at `location`: parsed from
    /// the contiguous run of comment lines directly above it.
    pub fn commands_at(&self, location: &Location) -> Vec<CommentCommand> {
        self.ensure_loaded(&location.file);

        let sources = self.sources.borrow();
        let Some(Some(lines)) = sources.get(&location.file) else {
            return Vec::new();
        };

        // Lines are 1-indexed; scan upward through the comment block.
        let mut commands = Vec::new();
        let mut index = location.line.saturating_sub(1) as usize;
        while index > 0 {
            index -= 1;
            let Some(line) = lines.get(index) else { break };
            let trimmed = line.trim();
            if !trimmed.starts_with("//") {
                break;
            }
            if let Some(command) = CommentCommand::parse_line(trimmed) {
                commands.push(command);
            }
        }
        commands.reverse();
        commands
    }

    fn ensure_loaded(&self, path: &Path) {
        let mut sources = self.sources.borrow_mut();
        if sources.contains_key(path) {
            return;
        }
        let lines = match std::fs::read_to_string(path) {
            Ok(contents) => Some(contents.lines().map(str::to_owned).collect()),
            Err(e) => {
                debug!("no comment source for {}: {}", path.display(), e);
                None
            }
        };
        sources.insert(path.to_owned(), lines);
    }
}
