use serde::{Deserialize, Serialize};

use super::declaration::{DeclarationId, Location, Parent};
use super::kind::Kind;

/// Arena index of a reference inside a [`super::SourceGraph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ReferenceId(pub u32);

impl std::fmt::Display for ReferenceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "r{}", self.0)
    }
}

/// An edge from a use-site to a referenced symbol.
///
/// After indexer resolution, `resolved` names the in-graph declaration
/// with the same usr. Unresolved references stay in the graph and stand
/// for symbols external to the analyzed modules.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reference {
    pub id: ReferenceId,

    pub kind: Kind,

    pub name: Option<String>,

    /// Stable symbol id of the referenced declaration.
    pub usr: String,

    /// Module the referencing occurrence belongs to.
    pub module: String,

    pub location: Location,

    /// The enclosing declaration or reference.
    pub parent: Option<Parent>,

    /// Rare nesting: a reference that owns implicit declarations.
    pub declarations: Vec<DeclarationId>,

    /// Nested references.
    pub references: Vec<ReferenceId>,

    /// Structural edge (superclass, conformance, typealias target) as
    /// opposed to a use edge.
    pub is_related: bool,

    /// Assignment shape as reported by the provider. Reads are the
    /// default; the assign-only property rule inspects this.
    pub is_write: bool,

    /// Target declaration, filled during resolution.
    pub resolved: Option<DeclarationId>,
}

impl Reference {
    pub(crate) const UNASSIGNED: ReferenceId = ReferenceId(u32::MAX);

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
            parent: None,
            declarations: Vec::new(),
            references: Vec::new(),
            is_related: false,
            is_write: false,
            resolved: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_related(mut self, related: bool) -> Self {
        self.is_related = related;
        self
    }

    pub fn with_write(mut self, write: bool) -> Self {
        self.is_write = write;
        self
    }

    pub fn is_resolved(&self) -> bool {
        self.resolved.is_some()
    }
}
