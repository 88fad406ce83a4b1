//! Configuration file handling.
//!
//! This module provides loading and saving of distscan configuration
//! from a TOML file.
//!
//! # Configuration Location
//!
//! The configuration file is stored at:
//! - Linux: `~/.config/distscan/config.toml`
//! - macOS: `~/Library/Application Support/distscan/config.toml`
//! - Windows: `%APPDATA%\distscan\config.toml`
//!
//! # Example Configuration
//!
//! ```toml
//! cache_ttl_hours = 24
//! default_format = "table"
//! check_outdated = true
//! target_runtime = "3.8"
//! search_paths = ["/opt/tools/venv/lib/python3.11/site-packages"]
//!
//! [ignore]
//! packages = ["pip", "setuptools", "_distutils*"]
//! findings = ["missing-summary"]
//! ```

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::model::Source;

/// Application configuration.
///
/// This struct represents all configurable options for distscan.
/// It can be loaded from a TOML file or created with default values.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// How long to cache index API responses, in hours.
    ///
    /// Default: 24 hours
    pub cache_ttl_hours: u64,

    /// Which sources to scan by default when no `--source` flag is provided.
    ///
    /// Default: all sources
    pub default_sources: Vec<Source>,

    /// Whether to skip descriptor validation by default.
    ///
    /// Default: false (validation is enabled)
    pub skip_checks: bool,

    /// Default output format when no `--format` flag is provided.
    ///
    /// Valid values: "table", "json"
    /// Default: "table"
    pub default_format: String,

    /// Whether to check for newer index releases by default.
    ///
    /// Default: true
    pub check_outdated: bool,

    /// Runtime version that scanned descriptors should support.
    ///
    /// When set, a descriptor whose `Requires-Python` rejects this version
    /// produces an unsupported-runtime finding. Unset by default.
    pub target_runtime: Option<String>,

    /// Extra directories to scan for descriptor records, in addition to the
    /// platform's site-packages roots.
    pub search_paths: Vec<PathBuf>,

    /// Ignore list configuration for suppressing known issues.
    #[serde(default)]
    pub ignore: IgnoreConfig,
}

/// Configuration for ignoring specific distributions or findings.
///
/// Use this to suppress expected noise, e.g. build tooling that is always
/// present or finding codes a project has decided to accept.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct IgnoreConfig {
    /// Distribution names to exclude from scanning.
    ///
    /// Supports glob patterns (e.g. "pip*", "types-*").
    pub packages: Vec<String>,

    /// Finding codes to suppress (e.g. "missing-summary").
    pub findings: Vec<String>,

    /// Distribution names to exclude from outdated checks.
    ///
    /// Useful for packages intentionally pinned to older versions.
    pub outdated: Vec<String>,
}

impl IgnoreConfig {
    /// Check if a distribution should be ignored.
    pub fn should_ignore_package(&self, name: &str) -> bool {
        self.packages.iter().any(|pattern| {
            if pattern.contains('*') {
                glob_match(pattern, name)
            } else {
                pattern == name
            }
        })
    }

    /// Check if a finding code should be suppressed.
    pub fn should_ignore_finding(&self, code: &str) -> bool {
        self.findings.iter().any(|c| c == code)
    }

    /// Check if the outdated check should be skipped for a distribution.
    pub fn should_ignore_outdated(&self, name: &str) -> bool {
        self.outdated.iter().any(|pattern| {
            if pattern.contains('*') {
                glob_match(pattern, name)
            } else {
                pattern == name
            }
        })
    }
}

/// Simple glob matching (supports * as wildcard).
fn glob_match(pattern: &str, text: &str) -> bool {
    let parts: Vec<&str> = pattern.split('*').collect();

    if parts.len() == 1 {
        return pattern == text;
    }

    let mut remaining = text;

    // Check prefix (before first *)
    if !parts[0].is_empty() {
        if !remaining.starts_with(parts[0]) {
            return false;
        }
        remaining = &remaining[parts[0].len()..];
    }

    // Check suffix (after last *)
    let last_part = parts[parts.len() - 1];
    if !last_part.is_empty() {
        if !remaining.ends_with(last_part) {
            return false;
        }
        remaining = &remaining[..remaining.len() - last_part.len()];
    }

    // Check middle parts
    for part in &parts[1..parts.len() - 1] {
        if part.is_empty() {
            continue;
        }
        if let Some(pos) = remaining.find(part) {
            remaining = &remaining[pos + part.len()..];
        } else {
            return false;
        }
    }

    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cache_ttl_hours: 24,
            default_sources: vec![Source::DistInfo, Source::EggInfo],
            skip_checks: false,
            default_format: "table".to_string(),
            check_outdated: true,
            target_runtime: None,
            search_paths: Vec::new(),
            ignore: IgnoreConfig::default(),
        }
    }
}

impl Config {
    /// Loads configuration from the config file.
    ///
    /// If the config file doesn't exist, returns default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be read or parsed.
    pub fn load() -> Result<Self> {
        let path = Self::config_path();

        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Saves the configuration to the config file.
    ///
    /// Creates the parent directory if it doesn't exist.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path();

        if let Some(parent) = path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(&path, content)?;
        Ok(())
    }

    /// Returns the path to the configuration file.
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("distscan")
            .join("config.toml")
    }

    /// Generates a string containing the default configuration.
    pub fn generate_default_config() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_glob_match_exact() {
        assert!(glob_match("pandas", "pandas"));
        assert!(!glob_match("pandas", "numpy"));
    }

    #[test]
    fn test_glob_match_prefix() {
        assert!(glob_match("pip*", "pip"));
        assert!(glob_match("pip*", "pipx"));
        assert!(glob_match("types-*", "types-requests"));
        assert!(!glob_match("types-*", "requests"));
    }

    #[test]
    fn test_glob_match_suffix() {
        assert!(glob_match("*-stubs", "pandas-stubs"));
        assert!(!glob_match("*-stubs", "pandas"));
    }

    #[test]
    fn test_glob_match_contains() {
        assert!(glob_match("*convert*", "variantconvert"));
        assert!(glob_match("*convert*", "convert-tool"));
        assert!(!glob_match("*convert*", "pandas"));
    }

    #[test]
    fn test_ignore_config_packages() {
        let config = IgnoreConfig {
            packages: vec!["pip".to_string(), "types-*".to_string()],
            findings: vec![],
            outdated: vec![],
        };

        assert!(config.should_ignore_package("pip"));
        assert!(config.should_ignore_package("types-requests"));
        assert!(!config.should_ignore_package("pandas"));
        assert!(!config.should_ignore_package("pipx"));
    }

    #[test]
    fn test_ignore_config_findings() {
        let config = IgnoreConfig {
            packages: vec![],
            findings: vec!["missing-summary".to_string()],
            outdated: vec![],
        };

        assert!(config.should_ignore_finding("missing-summary"));
        assert!(!config.should_ignore_finding("invalid-name"));
    }

    #[test]
    fn test_ignore_config_outdated() {
        let config = IgnoreConfig {
            packages: vec![],
            findings: vec![],
            outdated: vec!["pandas".to_string()],
        };

        assert!(config.should_ignore_outdated("pandas"));
        assert!(!config.should_ignore_outdated("numpy"));
    }

    #[test]
    fn test_config_default() {
        let config = Config::default();

        assert_eq!(config.cache_ttl_hours, 24);
        assert_eq!(config.default_format, "table");
        assert!(config.check_outdated);
        assert!(!config.skip_checks);
        assert!(config.target_runtime.is_none());
        assert_eq!(config.default_sources.len(), 2);
        assert!(config.ignore.packages.is_empty());
    }
}
