use serde::{Deserialize, Serialize};

/// The comment prefix that introduces a directive, e.g.
/// `// indexsweep:ignore`.
pub const DIRECTIVE_PREFIX: &str = "indexsweep:";

/// A directive parsed from the comment lines above a declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CommentCommand {
    /// Never report this declaration or its descendants.
    Ignore,
    /// Never report unused parameters of this function.
    IgnoreParameters,
    /// Ignore everything from this declaration to the end of the file.
    IgnoreAll,
}

impl CommentCommand {
    /// Parse a single comment line. Returns `None` for ordinary comments
    /// and for directives with an unknown suffix.
    pub fn parse_line(line: &str) -> Option<CommentCommand> {
        let trimmed = line.trim();
        let body = trimmed.strip_prefix("//")?.trim();
        let directive = body.strip_prefix(DIRECTIVE_PREFIX)?;
        match directive.trim() {
            "ignore" => Some(CommentCommand::Ignore),
            "ignore:parameters" => Some(CommentCommand::IgnoreParameters),
            "ignore:all" => Some(CommentCommand::IgnoreAll),
            _ => None,
        }
    }
}
