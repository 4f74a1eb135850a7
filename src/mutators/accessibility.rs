use super::Mutator;
use crate::config::Configuration;
use crate::error::Result;
use crate::graph::{Accessibility, SourceGraph};

/// Infers accessibility through extensions.
///
/// An extension without an explicit modifier takes the accessibility of
/// the type it extends. A member without an explicit modifier is capped
/// by the extension: `min(extension, explicit-or-public)`.
pub struct AccessibilityMutator;

impl Mutator for AccessibilityMutator {
    fn name(&self) -> &'static str {
        "accessibility"
    }

    fn mutate(&self, graph: &mut SourceGraph, _config: &Configuration) -> Result<()> {
        let extensions: Vec<_> = graph
            .declarations()
            .filter(|d| d.kind.is_extension())
            .map(|d| d.id)
            .collect();

        for extension in extensions {
            if !graph.declaration(extension).explicit_accessibility {
                let extended = graph
                    .declaration(extension)
                    .related
                    .iter()
                    .find_map(|&r| graph.reference(r).resolved);
                if let Some(extended) = extended {
                    let inherited = graph.declaration(extended).accessibility;
                    graph.declaration_mut(extension).accessibility = inherited;
                }
            }

            let extension_accessibility = graph.declaration(extension).accessibility;
            for member in graph.declaration(extension).declarations.clone() {
                let member_decl = graph.declaration(member);
                let declared = if member_decl.explicit_accessibility {
                    member_decl.accessibility
                } else {
                    Accessibility::Public
                };
                graph.declaration_mut(member).accessibility =
                    declared.min(extension_accessibility);
            }
        }
        Ok(())
    }
}
