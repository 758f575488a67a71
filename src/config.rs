//! Run configuration for both pipelines.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::blocklist::Source;
use crate::tool::{DEFAULT_RELEASE_URL, DEFAULT_TOOL_PATH};
use crate::Result;

/// Default directory scanned for rule-list documents.
pub const DEFAULT_RULES_DIR: &str = "mihomo/rulest";

/// Configuration for blocklist generation and batch compilation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Hosts-format blocklist sources
    pub sources: Vec<Source>,
    /// Directory scanned for rule-list documents
    pub rules_dir: PathBuf,
    /// Output directory for compiled artifacts
    pub output_dir: PathBuf,
    /// Output path of the generated blocklist document
    pub blocklist_output: PathBuf,
    /// Local path of the converter binary
    pub tool_path: PathBuf,
    /// Release index queried when the converter must be downloaded
    pub release_url: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            sources: vec![Source::new(
                "SM-Ad-FuckU-hosts",
                "https://raw.githubusercontent.com/2Gardon/SM-Ad-FuckU-hosts/master/SMAdHosts",
            )],
            rules_dir: PathBuf::from(DEFAULT_RULES_DIR),
            output_dir: PathBuf::from("mihomo/rulest/mrs"),
            blocklist_output: PathBuf::from("mihomo/rulest/app_ad.yaml"),
            tool_path: PathBuf::from(DEFAULT_TOOL_PATH),
            release_url: DEFAULT_RELEASE_URL.to_string(),
        }
    }
}

impl Config {
    /// Load configuration from a YAML file.
    ///
    /// Missing fields fall back to their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config = serde_yaml::from_str(&content)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.sources.len(), 1);
        assert_eq!(config.sources[0].name, "SM-Ad-FuckU-hosts");
        assert_eq!(config.rules_dir, PathBuf::from("mihomo/rulest"));
        assert_eq!(config.output_dir, PathBuf::from("mihomo/rulest/mrs"));
        assert_eq!(config.tool_path, PathBuf::from("./mihomo-bin"));
    }

    #[test]
    fn test_load_partial_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mrsgen.yaml");
        fs::write(
            &path,
            "sources:\n  - name: custom\n    url: https://example.com/hosts\nrules_dir: rules\n",
        )
        .unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.sources.len(), 1);
        assert_eq!(config.sources[0].name, "custom");
        assert_eq!(config.rules_dir, PathBuf::from("rules"));
        // Unspecified fields keep their defaults
        assert_eq!(config.tool_path, PathBuf::from("./mihomo-bin"));
    }

    #[test]
    fn test_config_roundtrip() {
        let config = Config::default();
        let yaml = serde_yaml::to_string(&config).unwrap();
        let parsed: Config = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_load_missing_file() {
        assert!(Config::load("/nonexistent/mrsgen.yaml").is_err());
    }
}
