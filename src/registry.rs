//! Rule registry: the source of the full hierarchy and rule baselines
//!
//! Rule files are YAML or JSON:
//!
//! ```yaml
//! version: "1.0"
//! languages:
//!   - id: en
//!     display_name: English
//! rules:
//!   - id: EN_OXFORD_COMMA
//!     lang: en
//!     category: Style
//!     description: Oxford comma
//!     enabled: false
//! ```

use crate::config::Config;
use crate::hierarchy::Hierarchy;
use crate::language::Language;
use crate::rule::Rule;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use thiserror::Error;

const BUILTIN_RULES: &str = include_str!("../rules/builtin.yaml");

/// Error loading rules
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unknown rule file format: {0}")]
    UnsupportedFormat(String),

    #[error("Rule '{rule}' references undeclared language '{lang}'")]
    UnknownLanguage { rule: String, lang: String },

    #[error("Duplicate language: {0}")]
    DuplicateLanguage(String),

    #[error("Duplicate rule: {0}")]
    DuplicateRule(String),
}

/// Supplies the unfiltered hierarchy and each rule's baseline state
pub trait RuleRegistry {
    /// All languages, categories and rules, with `enabled` set to the baseline
    fn all_rules_by_language(&self) -> Hierarchy;

    /// Baseline checked state of a rule when no override is pending
    fn is_enabled_by_default(&self, rule: &Rule) -> bool;
}

impl<T: RuleRegistry + ?Sized> RuleRegistry for &T {
    fn all_rules_by_language(&self) -> Hierarchy {
        (**self).all_rules_by_language()
    }

    fn is_enabled_by_default(&self, rule: &Rule) -> bool {
        (**self).is_enabled_by_default(rule)
    }
}

/// Rule file format (for loading from YAML/JSON)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuleFile {
    /// File format version
    #[serde(default)]
    pub version: Option<String>,

    /// Languages declared by this file
    #[serde(default)]
    pub languages: Vec<Language>,

    /// Rules defined in this file
    #[serde(default)]
    pub rules: Vec<Rule>,
}

impl RuleFile {
    /// Parse a rule file, choosing the format by extension
    pub fn load(path: &Path) -> Result<Self, RegistryError> {
        let content = std::fs::read_to_string(path)?;
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");

        match ext {
            "yaml" | "yml" => Ok(serde_yaml::from_str(&content)?),
            "json" => Ok(serde_json::from_str(&content)?),
            _ => Err(RegistryError::UnsupportedFormat(ext.to_string())),
        }
    }
}

/// In-memory registry of rule definitions, layered with user configuration
#[derive(Debug, Clone, Default)]
pub struct StaticRegistry {
    languages: Vec<Language>,
    rules: Vec<Rule>,
    config: Config,
}

impl StaticRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the bundled rule set
    pub fn builtin() -> Result<Self, RegistryError> {
        let file: RuleFile = serde_yaml::from_str(BUILTIN_RULES)?;
        let mut registry = Self::new();
        registry.add_file(file)?;
        Ok(registry)
    }

    /// Use `config` for baselines and language selection
    pub fn with_config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn set_config(&mut self, config: Config) {
        self.config = config;
    }

    /// Load a YAML/JSON rule file. Returns the number of rules added.
    pub fn load_file(&mut self, path: &Path) -> Result<usize, RegistryError> {
        let file = RuleFile::load(path)?;
        let count = self.add_file(file)?;
        log::debug!("Loaded {} rules from {}", count, path.display());
        Ok(count)
    }

    /// Add the languages and rules of a parsed rule file.
    ///
    /// The file is validated as a whole; on error nothing is added.
    pub fn add_file(&mut self, file: RuleFile) -> Result<usize, RegistryError> {
        let mut language_ids: HashSet<&str> =
            self.languages.iter().map(|l| l.id.as_str()).collect();
        for language in &file.languages {
            if !language_ids.insert(language.id.as_str()) {
                return Err(RegistryError::DuplicateLanguage(language.id.clone()));
            }
        }

        let mut rule_ids: HashSet<&str> = self.rules.iter().map(|r| r.id.as_str()).collect();
        for rule in &file.rules {
            if !language_ids.contains(rule.lang.as_str()) {
                return Err(RegistryError::UnknownLanguage {
                    rule: rule.id.clone(),
                    lang: rule.lang.clone(),
                });
            }
            if !rule_ids.insert(rule.id.as_str()) {
                return Err(RegistryError::DuplicateRule(rule.id.clone()));
            }
        }

        let count = file.rules.len();
        self.languages.extend(file.languages);
        self.rules.extend(file.rules);
        Ok(count)
    }

    /// Declared languages, in load order
    pub fn languages(&self) -> &[Language] {
        &self.languages
    }

    /// Rule definitions as loaded, before configuration is applied
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Look up a rule definition by id
    pub fn rule(&self, id: &str) -> Option<&Rule> {
        self.rules.iter().find(|r| r.id == id)
    }

    /// Baseline for a rule id: configured override first, then the rule's
    /// own default. Unknown ids are treated as disabled.
    pub fn baseline(&self, rule_id: &str) -> bool {
        match self.config.rule_override(rule_id) {
            Some(enabled) => enabled,
            None => self.rule(rule_id).is_some_and(|r| r.enabled),
        }
    }
}

impl RuleRegistry for StaticRegistry {
    fn all_rules_by_language(&self) -> Hierarchy {
        let languages: Vec<Language> = self
            .languages
            .iter()
            .filter(|l| self.config.is_language_enabled(&l.id))
            .cloned()
            .collect();

        let rules = self
            .rules
            .iter()
            .filter(|r| self.config.is_language_enabled(&r.lang))
            .map(|r| {
                let baseline = self.baseline(&r.id);
                r.clone().with_enabled(baseline)
            });

        let mut hierarchy = Hierarchy::from_rules(&languages, rules);
        hierarchy.languages.retain(|l| !l.categories.is_empty());
        hierarchy
    }

    fn is_enabled_by_default(&self, rule: &Rule) -> bool {
        self.baseline(&rule.id)
    }
}
