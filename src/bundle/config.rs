//! Build configuration for the bundling step.
//!
//! Constructed once during the sequencer's Configuring phase from the
//! loaded [`AppConfig`]; read-only afterwards. Construction performs no
//! I/O, only validation of the type-config path.

use std::path::{Path, PathBuf};

use crate::config::{AppConfig, ConfigError};

/// Output file template: `$name` expands to the bundle name.
pub const OUTPUT_TEMPLATE: &str = "$name.js";

/// Immutable build configuration shared by both bundles.
#[derive(Debug, Clone)]
pub struct BuildConfig {
    /// Source tree root (absolute).
    pub home: PathBuf,
    /// Output directory (absolute).
    pub output: PathBuf,
    /// Output file template under `output`.
    pub template: String,
    /// Target platform identifier.
    pub target: String,
    /// Skip rebuilds when sources are unchanged.
    pub cache: bool,
    /// Emit source maps.
    pub source_maps: bool,
    /// Type-config file (absolute).
    pub type_config: PathBuf,
}

impl BuildConfig {
    /// Construct the build configuration, validating the type-config path.
    ///
    /// The type-config path must be a non-empty project-relative path that
    /// stays inside the project root.
    pub fn from_app(config: &AppConfig) -> Result<Self, ConfigError> {
        let type_config = &config.build.type_config;
        validate_type_config(type_config)?;

        Ok(Self {
            home: config.build.home.clone(),
            output: config.build.output.clone(),
            template: OUTPUT_TEMPLATE.to_string(),
            target: config.build.target.clone(),
            cache: config.build.cache,
            source_maps: config.build.source_maps,
            type_config: config.root_join(type_config),
        })
    }

    /// Output file path for a bundle name, expanded from the template.
    pub fn output_file(&self, name: &str) -> PathBuf {
        self.output.join(self.template.replace("$name", name))
    }
}

/// Reject empty, absolute, or root-escaping type-config paths.
fn validate_type_config(path: &Path) -> Result<(), ConfigError> {
    if path.as_os_str().is_empty() {
        return Err(ConfigError::Validation(
            "build.type_config must not be empty".into(),
        ));
    }
    if path.is_absolute() {
        return Err(ConfigError::Validation(format!(
            "build.type_config must be relative to the project root: `{}`",
            path.display()
        )));
    }
    if path
        .components()
        .any(|c| matches!(c, std::path::Component::ParentDir))
    {
        return Err(ConfigError::Validation(format!(
            "build.type_config must stay inside the project root: `{}`",
            path.display()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_parse_config;

    #[test]
    fn test_from_app_defaults() {
        let config = test_parse_config("");
        let build = BuildConfig::from_app(&config).unwrap();

        assert_eq!(build.target, "electron");
        assert!(build.cache);
        assert!(build.source_maps);
        assert_eq!(build.template, "$name.js");
    }

    #[test]
    fn test_output_file_template() {
        let config = test_parse_config("");
        let build = BuildConfig::from_app(&config).unwrap();

        assert_eq!(build.output_file("main"), build.output.join("main.js"));
        assert_eq!(
            build.output_file("renderer"),
            build.output.join("renderer.js")
        );
    }

    #[test]
    fn test_type_config_rejects_absolute() {
        let config = test_parse_config("[build]\ntype_config = \"/etc/tsconfig.json\"");
        assert!(BuildConfig::from_app(&config).is_err());
    }

    #[test]
    fn test_type_config_rejects_escape() {
        let config = test_parse_config("[build]\ntype_config = \"../tsconfig.json\"");
        assert!(BuildConfig::from_app(&config).is_err());
    }

    #[test]
    fn test_type_config_rejects_empty() {
        let config = test_parse_config("[build]\ntype_config = \"\"");
        assert!(BuildConfig::from_app(&config).is_err());
    }
}
