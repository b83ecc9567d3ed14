//! Persisted user configuration
//!
//! Reads configuration from:
//! - `.grazirc.yaml` / `.grazirc.json` (project-level)
//! - `~/.grazirc.yaml` (user-level)

use crate::state::TreeState;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

const CONFIG_NAMES: [&str; 3] = [".grazirc.yaml", ".grazirc.yml", ".grazirc.json"];

/// Configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// User rule overrides
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RulesConfig {
    /// Rules enabled regardless of their default
    pub enabled: Vec<String>,

    /// Rules disabled regardless of their default (wins over `enabled`)
    pub disabled: Vec<String>,
}

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Enabled language ids (empty = all)
    pub languages: Vec<String>,

    /// Rule overrides
    pub rules: RulesConfig,

    /// Additional rule files, relative to the working directory
    pub rule_files: Vec<PathBuf>,
}

#[derive(Clone, Copy)]
enum Format {
    Yaml,
    Json,
}

fn format_for(path: &Path) -> Result<Format, ConfigError> {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    match ext {
        "yaml" | "yml" => Ok(Format::Yaml),
        "json" => Ok(Format::Json),
        _ => Err(ConfigError::Invalid(format!(
            "Unknown config file format: {}",
            ext
        ))),
    }
}

fn find_in_dirs(dirs: &[Option<PathBuf>]) -> Option<PathBuf> {
    dirs.iter()
        .flatten()
        .flat_map(|dir| CONFIG_NAMES.iter().map(move |name| dir.join(name)))
        .find(|path| path.exists())
}

fn load_from_dirs(dirs: &[Option<PathBuf>]) -> Result<Config, ConfigError> {
    match find_in_dirs(dirs) {
        Some(path) => {
            log::debug!("Loading config from {}", path.display());
            Config::load(&path)
        }
        None => {
            log::debug!("No config file found, using defaults");
            Ok(Config::default())
        }
    }
}

impl Config {
    /// Create default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let format = format_for(path)?;
        let content = std::fs::read_to_string(path)?;

        let config = match format {
            Format::Yaml => serde_yaml::from_str(&content)?,
            Format::Json => serde_json::from_str(&content)?,
        };
        Ok(config)
    }

    /// Write configuration to a file, format chosen by extension
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = match format_for(path)? {
            Format::Yaml => serde_yaml::to_string(self)?,
            Format::Json => serde_json::to_string_pretty(self)?,
        };
        std::fs::write(path, content)?;
        Ok(())
    }

    /// First existing config file in the current directory, then home
    pub fn find_default() -> Option<PathBuf> {
        find_in_dirs(&[Some(PathBuf::new()), dirs::home_dir()])
    }

    /// Load configuration from default locations
    pub fn load_default() -> Result<Self, ConfigError> {
        load_from_dirs(&[Some(PathBuf::new()), dirs::home_dir()])
    }

    /// Load an explicit config file, or the default locations when none is
    /// given. A missing explicit file yields the default configuration.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) if path.exists() => Self::load(path),
            Some(path) => {
                log::warn!("Config {} not found, using defaults", path.display());
                Ok(Self::default())
            }
            None => Self::load_default(),
        }
    }

    /// Configured override for a rule, if any
    pub fn rule_override(&self, rule_id: &str) -> Option<bool> {
        if self.rules.disabled.iter().any(|id| id == rule_id) {
            Some(false)
        } else if self.rules.enabled.iter().any(|id| id == rule_id) {
            Some(true)
        } else {
            None
        }
    }

    /// Check if a language is enabled
    pub fn is_language_enabled(&self, lang: &str) -> bool {
        self.languages.is_empty() || self.languages.iter().any(|l| l == lang)
    }

    /// Persist a tree snapshot: newly enabled rules move to `rules.enabled`,
    /// newly disabled ones to `rules.disabled`
    pub fn apply(&mut self, state: &TreeState) {
        self.rules.disabled.retain(|id| !state.enabled.contains(id));
        self.rules.enabled.retain(|id| !state.disabled.contains(id));

        self.rules.enabled.extend(state.enabled.iter().cloned());
        self.rules.disabled.extend(state.disabled.iter().cloned());

        for list in [&mut self.rules.enabled, &mut self.rules.disabled] {
            list.sort();
            list.dedup();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn ids(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_default_config() {
        let config = Config::new();
        assert!(config.is_language_enabled("en"));
        assert_eq!(config.rule_override("any"), None);
    }

    #[test]
    fn test_rule_override() {
        let mut config = Config::new();
        config.rules.enabled = ids(&["a", "both"]);
        config.rules.disabled = ids(&["b", "both"]);

        assert_eq!(config.rule_override("a"), Some(true));
        assert_eq!(config.rule_override("b"), Some(false));
        assert_eq!(config.rule_override("both"), Some(false));
        assert_eq!(config.rule_override("c"), None);
    }

    #[test]
    fn test_language_selection() {
        let config = Config {
            languages: ids(&["en"]),
            ..Config::default()
        };
        assert!(config.is_language_enabled("en"));
        assert!(!config.is_language_enabled("de"));
    }

    #[test]
    fn test_apply_state() {
        let mut config = Config::new();
        config.rules.enabled = ids(&["x"]);
        config.rules.disabled = ids(&["y", "z"]);

        let state = TreeState {
            enabled: ["y".to_string(), "w".to_string()].into_iter().collect(),
            disabled: ["x".to_string()].into_iter().collect(),
        };
        config.apply(&state);

        assert_eq!(config.rules.enabled, ids(&["w", "y"]));
        assert_eq!(config.rules.disabled, ids(&["x", "z"]));
    }

    #[test]
    fn test_apply_empty_state_keeps_config() {
        let mut config = Config::new();
        config.rules.disabled = ids(&["b", "a"]);
        config.apply(&TreeState::default());
        assert_eq!(config.rules.disabled, ids(&["a", "b"]));
    }

    #[test]
    fn test_yaml_deserialize() {
        let yaml = r#"
languages:
  - en
rules:
  disabled:
    - EN_PASSIVE_VOICE
rule_files:
  - extra/rules.yaml
"#;

        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.languages, ids(&["en"]));
        assert!(config.rules.enabled.is_empty());
        assert_eq!(config.rules.disabled, ids(&["EN_PASSIVE_VOICE"]));
        assert_eq!(config.rule_files, vec![PathBuf::from("extra/rules.yaml")]);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::new();
        config.rules.enabled = ids(&["a"]);

        for name in ["config.yaml", "config.json"] {
            let path = dir.path().join(name);
            config.save(&path).unwrap();
            assert_eq!(Config::load(&path).unwrap(), config);
        }
    }

    #[test]
    fn test_find_prefers_local_dir() {
        let local = tempfile::tempdir().unwrap();
        let home = tempfile::tempdir().unwrap();
        std::fs::write(local.path().join(".grazirc.json"), "{}").unwrap();
        std::fs::write(home.path().join(".grazirc.yaml"), "languages: [en]\n").unwrap();

        let dirs = [Some(local.path().to_path_buf()), Some(home.path().to_path_buf())];
        assert_eq!(find_in_dirs(&dirs), Some(local.path().join(".grazirc.json")));

        let dirs = [Some(PathBuf::from("does-not-exist")), Some(home.path().to_path_buf())];
        assert_eq!(find_in_dirs(&dirs), Some(home.path().join(".grazirc.yaml")));
        assert_eq!(load_from_dirs(&dirs).unwrap().languages, ids(&["en"]));
    }

    #[test]
    fn test_load_falls_back_to_default() {
        let empty = tempfile::tempdir().unwrap();
        let dirs = [Some(empty.path().to_path_buf()), None];

        assert_eq!(find_in_dirs(&dirs), None);
        assert_eq!(load_from_dirs(&dirs).unwrap(), Config::default());
    }

    #[test]
    fn test_load_or_default() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join(".grazirc.yaml");
        assert_eq!(Config::load_or_default(Some(&missing)).unwrap(), Config::default());

        let mut config = Config::new();
        config.rules.disabled = ids(&["b"]);
        config.save(&missing).unwrap();
        assert_eq!(Config::load_or_default(Some(&missing)).unwrap(), config);
    }

    #[test]
    fn test_unknown_format() {
        let err = Config::load(Path::new("config.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }
}
