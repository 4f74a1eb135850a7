use miette::{IntoDiagnostic, Result, WrapErr};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Analysis configuration.
///
/// Passed explicitly into the mutators and the analyzer; there is no
/// process-global state, so tests can vary options per scenario.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Configuration {
    /// Seed-retain all `public` and `open` declarations.
    pub retain_public: bool,

    /// Seed-retain `@objc`/`@objcMembers` annotated declarations.
    pub retain_objc_annotated: bool,

    /// Suppress the assign-only property rule.
    pub retain_assign_only_properties: bool,

    /// Retain all parameters of protocol requirements and their
    /// extension default implementations.
    pub retain_unused_protocol_func_params: bool,

    /// File basenames treated as entry points: every top-level
    /// declaration in a matching file is retained.
    pub entry_point_filenames: Vec<String>,

    /// USRs of foreign test-harness base classes. Subclasses and their
    /// test methods are retained.
    pub external_test_base_class_usrs: Vec<String>,

    /// USRs of foreign codability protocols that trigger `CodingKeys`
    /// retention, in addition to the well-known names.
    pub external_codable_usrs: Vec<String>,

    /// Gate for rules with documented false results (lazy properties,
    /// get/set-only requirement defaults). Off preserves the shipped
    /// behavior.
    pub enable_unstable_rules: bool,
}

impl Configuration {
    /// Load configuration from a YAML or TOML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .into_diagnostic()
            .wrap_err_with(|| format!("Failed to read config file: {}", path.display()))?;

        let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("");

        match extension {
            "yml" | "yaml" => serde_yaml::from_str(&contents)
                .into_diagnostic()
                .wrap_err("Failed to parse YAML config"),
            "toml" => toml::from_str(&contents)
                .into_diagnostic()
                .wrap_err("Failed to parse TOML config"),
            _ => {
                if let Ok(config) = serde_yaml::from_str(&contents) {
                    Ok(config)
                } else {
                    toml::from_str(&contents)
                        .into_diagnostic()
                        .wrap_err("Failed to parse config file")
                }
            }
        }
    }

    /// Try the default config locations under the project root.
    pub fn from_default_locations(project_root: &Path) -> Result<Self> {
        let default_names = [
            ".indexsweep.yml",
            ".indexsweep.yaml",
            ".indexsweep.toml",
            "indexsweep.yml",
            "indexsweep.yaml",
            "indexsweep.toml",
        ];

        for name in &default_names {
            let path = project_root.join(name);
            if path.exists() {
                return Self::from_file(&path);
            }
        }

        Ok(Self::default())
    }

    /// Whether `usr` names a codable protocol.
    pub fn is_codable_usr(&self, usr: &str) -> bool {
        self.external_codable_usrs.iter().any(|u| u == usr)
    }

    /// Whether `usr` names a test-harness base class.
    pub fn is_test_base_class_usr(&self, usr: &str) -> bool {
        self.external_test_base_class_usrs.iter().any(|u| u == usr)
    }
}
