use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::PathBuf;

use super::comment::CommentCommand;
use super::kind::Kind;
use super::reference::ReferenceId;

/// Arena index of a declaration inside a [`super::SourceGraph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DeclarationId(pub u32);

impl std::fmt::Display for DeclarationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "d{}", self.0)
    }
}

/// Back-edge to the enclosing entity. A declaration's parent is usually
/// another declaration, but a reference can own implicit declarations.
/// Never an owning link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Parent {
    Decl(DeclarationId),
    Ref(ReferenceId),
}

/// Location in source code, ordered by file, then line, then column.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Location {
    pub file: PathBuf,
    pub line: u32,
    pub column: u32,
}

impl Location {
    pub fn new(file: impl Into<PathBuf>, line: u32, column: u32) -> Self {
        Self {
            file: file.into(),
            line,
            column,
        }
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}:{}", self.file.display(), self.line, self.column)
    }
}

/// Access-control level, totally ordered from most to least restrictive.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Accessibility {
    Private,
    Fileprivate,
    #[default]
    Internal,
    Public,
    Open,
}

impl Accessibility {
    pub fn as_str(&self) -> &'static str {
        match self {
            Accessibility::Private => "private",
            Accessibility::Fileprivate => "fileprivate",
            Accessibility::Internal => "internal",
            Accessibility::Public => "public",
            Accessibility::Open => "open",
        }
    }

    pub fn parse(s: &str) -> Option<Accessibility> {
        let value = match s {
            "private" => Accessibility::Private,
            "fileprivate" => Accessibility::Fileprivate,
            "internal" => Accessibility::Internal,
            "public" => Accessibility::Public,
            "open" => Accessibility::Open,
            _ => return None,
        };
        Some(value)
    }

    /// Visible outside the defining module.
    pub fn is_exported(&self) -> bool {
        matches!(self, Accessibility::Public | Accessibility::Open)
    }
}

impl std::fmt::Display for Accessibility {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A defined symbol in the source graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Declaration {
    /// Arena id, assigned when the declaration is added to the graph.
    pub id: DeclarationId,

    pub kind: Kind,

    /// Absent for anonymous declarations such as unnamed extensions.
    pub name: Option<String>,

    /// Stable symbol id from the index provider.
    pub usr: String,

    /// Module the declaration was defined in.
    pub module: String,

    pub location: Location,

    pub accessibility: Accessibility,

    /// Whether `accessibility` was written in source, as opposed to
    /// inferred. The accessibility mutator only promotes inferred values.
    pub explicit_accessibility: bool,

    /// Attribute strings as reported by the provider, e.g. `@objc`.
    pub attributes: HashSet<String>,

    /// Modifier strings, e.g. `override`, `lazy`.
    pub modifiers: HashSet<String>,

    pub parent: Option<Parent>,

    /// Children owned by this declaration.
    pub declarations: Vec<DeclarationId>,

    /// Outgoing use edges.
    pub references: Vec<ReferenceId>,

    /// Outgoing structural edges: superclass, conformance, typealias
    /// target. Kept apart from `references` so the analyzer can treat
    /// conformance links differently from ordinary uses.
    pub related: Vec<ReferenceId>,

    /// Directives parsed from the comment lines above the declaration.
    pub comment_commands: Vec<CommentCommand>,

    /// Synthesized by the compiler or by the implicit-members mutator.
    pub is_implicit: bool,

    /// Analyzer output.
    pub is_retained: bool,

    /// Subset of child parameter declarations found unused. Filled by
    /// parameter analysis after retention completes.
    pub unused_parameters: Vec<DeclarationId>,
}

impl Declaration {
    /// Placeholder id used before the graph assigns a real one.
    pub(crate) const UNASSIGNED: DeclarationId = DeclarationId(u32::MAX);

    pub fn new(
        kind: Kind,
        usr: impl Into<String>,
        module: impl Into<String>,
        location: Location,
    ) -> Self {
        Self {
            id: Self::UNASSIGNED,
            kind,
            name: None,
            usr: usr.into(),
            module: module.into(),
            location,
            accessibility: Accessibility::default(),
            explicit_accessibility: false,
            attributes: HashSet::new(),
            modifiers: HashSet::new(),
            parent: None,
            declarations: Vec::new(),
            references: Vec::new(),
            related: Vec::new(),
            comment_commands: Vec::new(),
            is_implicit: false,
            is_retained: false,
            unused_parameters: Vec::new(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        self.attributes.contains(name)
    }

    pub fn has_modifier(&self, name: &str) -> bool {
        self.modifiers.contains(name)
    }

    /// `override` appears as a modifier in source but some providers
    /// report it among attributes.
    pub fn is_override(&self) -> bool {
        self.has_modifier("override") || self.has_attribute("override")
    }

    pub fn name_or_default(&self) -> &str {
        self.name.as_deref().unwrap_or("(anonymous)")
    }

    /// Display string for logs and reports.
    pub fn display(&self) -> String {
        format!(
            "{} '{}' ({})",
            self.kind.display_name(),
            self.name_or_default(),
            self.location
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accessibility_ordering() {
        assert!(Accessibility::Private < Accessibility::Fileprivate);
        assert!(Accessibility::Fileprivate < Accessibility::Internal);
        assert!(Accessibility::Internal < Accessibility::Public);
        assert!(Accessibility::Public < Accessibility::Open);
    }

    #[test]
    fn test_accessibility_round_trip() {
        for value in [
            Accessibility::Private,
            Accessibility::Fileprivate,
            Accessibility::Internal,
            Accessibility::Public,
            Accessibility::Open,
        ] {
            assert_eq!(Accessibility::parse(value.as_str()), Some(value));
        }
        assert_eq!(Accessibility::parse("package"), None);
    }

    #[test]
    fn test_location_ordering() {
        let a = Location::new("a.swift", 10, 1);
        let b = Location::new("a.swift", 10, 5);
        let c = Location::new("a.swift", 11, 1);
        let d = Location::new("b.swift", 1, 1);
        assert!(a < b);
        assert!(b < c);
        assert!(c < d);
    }

    #[test]
    fn test_declaration_display() {
        let decl = Declaration::new(
            Kind::Class,
            "c:@M@app@objc(cs)Session",
            "app",
            Location::new("Sources/Session.swift", 3, 7),
        )
        .with_name("Session");
        assert_eq!(decl.display(), "class 'Session' (Sources/Session.swift:3:7)");
    }

    #[test]
    fn test_anonymous_declaration() {
        let decl = Declaration::new(
            Kind::Extension,
            "s:e:ext",
            "app",
            Location::new("Sources/Ext.swift", 1, 1),
        );
        assert_eq!(decl.name_or_default(), "(anonymous)");
    }
}
