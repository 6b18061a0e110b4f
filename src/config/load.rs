//! Configuration loading from files and the environment.

use std::path::Path;

use super::{Config, ConfigError};

/// Config file looked up in the working directory when none is given.
pub const DEFAULT_CONFIG_FILE: &str = "htmlstage.yaml";

/// Prefix of environment variables that override file settings.
///
/// `HTMLSTAGE_PATH_PREFIX=/docs/` sets `path_prefix`;
/// `HTMLSTAGE_PROCESSING__STRICT=false` sets `processing.strict`.
const ENV_PREFIX: &str = "HTMLSTAGE";

impl Config {
    /// Load the config from the command line argument.
    ///
    /// An explicitly given file must exist. Without one, `htmlstage.yaml` is
    /// used if present and defaults otherwise.
    pub fn load_from_arg(config_file: Option<&Path>) -> Result<Self, ConfigError> {
        let (config_file, required) = match config_file {
            Some(path) => (path, true),
            None => (Path::new(DEFAULT_CONFIG_FILE), false),
        };
        let config_file = if config_file.is_relative() {
            std::env::current_dir()
                .map_err(ConfigError::CwdFailure)?
                .join(config_file)
        } else {
            config_file.to_path_buf()
        };

        Self::load_from_file(&config_file, required)
    }

    /// Load the config from a file path, layered with environment overrides.
    pub(crate) fn load_from_file(path: &Path, required: bool) -> Result<Self, ConfigError> {
        let path_str = path
            .as_os_str()
            .to_str()
            .ok_or_else(|| ConfigError::EncodePath(path.to_path_buf()))?;

        let config = ::config::Config::builder()
            .add_source(::config::File::new(path_str, ::config::FileFormat::Yaml).required(required))
            .add_source(
                ::config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize::<Config>()?;

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn write_config(yaml: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(".yaml")
            .tempfile()
            .unwrap();
        file.write_all(yaml.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_full_config() {
        let file = write_config(
            r#"
processing:
  strict: false
path_prefix: /docs/
plugins:
  - name: external-links
    extensions: html,xml
    priority: 5
url_transforms:
  - name: path-prefix
transforms:
  - strip-comments
  - trim
"#,
        );

        let config = Config::load_from_file(file.path(), true).unwrap();
        assert_eq!(config.processing.strict, Some(false));
        assert_eq!(config.path_prefix.as_deref(), Some("/docs/"));
        assert_eq!(config.plugins[0].name, "external-links");
        assert_eq!(config.plugins[0].extensions, "html,xml");
        assert_eq!(config.plugins[0].priority, 5);
        assert_eq!(config.url_transforms[0].extensions, "html");
        assert_eq!(config.url_transforms[0].priority, 0);
        assert_eq!(config.transforms, vec!["strip-comments", "trim"]);
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let file = write_config("{}\n");
        let config = Config::load_from_file(file.path(), true).unwrap();
        assert!(config.plugins.is_empty());
        assert!(config.transforms.is_empty());
        assert_eq!(config.processing.strict, None);
    }

    #[test]
    fn test_missing_required_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.yaml");
        assert!(Config::load_from_file(&path, true).is_err());
        assert!(Config::load_from_file(&path, false).is_ok());
    }

    #[test]
    fn test_rejects_stage_without_extensions() {
        let file = write_config(
            r#"
plugins:
  - name: strip-comments
    extensions: " , "
"#,
        );
        let err = Config::load_from_file(file.path(), true).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }
}
