//! CLI configuration

use crate::error::{CliError, CliResult};
use crate::output::OutputFormat;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// CLI configuration, read from `<config dir>/jals/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CliConfig {
    /// State file used when `--state` is not given
    pub state_file: Option<PathBuf>,

    /// Output format used when `--output` is not given
    pub default_output: Option<OutputFormat>,

    /// Engine label written into saved state
    pub engine_name: Option<String>,

    /// YAML stage configuration used when `--stages` is not given
    pub stage_config: Option<PathBuf>,
}

impl CliConfig {
    /// Load configuration from file. A missing file yields the defaults.
    pub fn load(path: Option<&Path>) -> CliResult<Self> {
        let config_path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::default_config_path()?,
        };

        if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path)?;
            Ok(toml::from_str(&contents)?)
        } else {
            Ok(CliConfig::default())
        }
    }

    /// Get the default configuration file path
    fn default_config_path() -> CliResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| CliError::Config("Cannot find config directory".into()))?;
        Ok(config_dir.join("jals").join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = CliConfig::default();
        assert!(config.state_file.is_none());
        assert!(config.default_output.is_none());
    }

    #[test]
    fn test_load_missing_config() {
        let config = CliConfig::load(Some(Path::new("/nonexistent/path/config.toml"))).unwrap();
        assert!(config.engine_name.is_none());
    }

    #[test]
    fn test_load_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "state_file = \"/tmp/jals.json\"\ndefault_output = \"json\"\nengine_name = \"desk\"\n",
        )
        .unwrap();

        let config = CliConfig::load(Some(&path)).unwrap();
        assert_eq!(config.state_file, Some(PathBuf::from("/tmp/jals.json")));
        assert!(matches!(config.default_output, Some(OutputFormat::Json)));
        assert_eq!(config.engine_name.as_deref(), Some("desk"));
    }

    #[test]
    fn test_invalid_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "state_file = [").unwrap();
        assert!(matches!(CliConfig::load(Some(&path)), Err(CliError::Toml(_))));
    }
}
