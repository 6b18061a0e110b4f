//! Configuration type definitions.
//!
//! These types are pure data - no I/O or complex logic.

use serde::{Deserialize, Serialize};

use super::ConfigError;
use crate::transform::ProcessOptions;

/// Top-level htmlstage configuration.
///
/// ```yaml
/// processing:
///   strict: true
/// path_prefix: /docs/
/// plugins:
///   - name: external-links
///     extensions: html
///     priority: 0
/// url_transforms:
///   - name: path-prefix
///     priority: -1
/// transforms: [strip-comments, trim]
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Options merged into every rewriting engine call
    #[serde(default)]
    pub processing: ProcessOptions,

    /// Deployment path prefix used by the `path-prefix` URL transform
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path_prefix: Option<String>,

    /// Built-in plugin stages to register
    #[serde(default)]
    pub plugins: Vec<StageConfig>,

    /// Built-in URL transforms to register
    #[serde(default)]
    pub url_transforms: Vec<StageConfig>,

    /// Named transforms run, in order, by `htmlstage render`
    #[serde(default)]
    pub transforms: Vec<String>,
}

/// One registration of a built-in stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageConfig {
    /// Built-in name (e.g. `external-links`)
    pub name: String,
    /// Comma-separated output extensions (defaults to `html`)
    #[serde(default = "default_extensions")]
    pub extensions: String,
    /// Higher priorities run first
    #[serde(default)]
    pub priority: i32,
}

fn default_extensions() -> String {
    "html".to_string()
}

impl Config {
    /// Check the parts of the config serde cannot.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for stage in self.plugins.iter().chain(&self.url_transforms) {
            if stage.name.trim().is_empty() {
                return Err(ConfigError::Validation(
                    "invalid config: every plugin and url transform needs a 'name'".to_string(),
                ));
            }
            if crate::transform::split_extensions(&stage.extensions)
                .next()
                .is_none()
            {
                return Err(ConfigError::Validation(format!(
                    "invalid config: '{}' has no extensions",
                    stage.name
                )));
            }
        }

        if self.transforms.iter().any(|name| name.trim().is_empty()) {
            return Err(ConfigError::Validation(
                "invalid config: 'transforms' cannot contain empty names".to_string(),
            ));
        }

        Ok(())
    }
}
