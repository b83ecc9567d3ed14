//! Grammar rule definition

use serde::{Deserialize, Serialize};

/// A single grammar or style check
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    /// Unique rule identifier (e.g., "EN_OXFORD_COMMA")
    pub id: String,

    /// Human-readable description, shown in the tree and matched by the filter
    pub description: String,

    /// Identifier of the language this rule belongs to
    pub lang: String,

    /// Category name within the language (e.g., "Style")
    #[serde(default = "default_category")]
    pub category: String,

    /// Baseline state. In a rule file this is the rule's own default; in a
    /// hierarchy handed out by a registry it is the resolved persisted state.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Session state while the rule is shown in a tree
    #[serde(skip)]
    pub enabled_in_tree: bool,

    /// Documentation URL
    #[serde(default)]
    pub url: Option<String>,

    /// Example of text that triggers this rule
    #[serde(default)]
    pub example_bad: Option<String>,

    /// Example of corrected text
    #[serde(default)]
    pub example_good: Option<String>,
}

fn default_category() -> String {
    "Miscellaneous".to_string()
}

fn default_true() -> bool {
    true
}

impl Rule {
    /// Create a new enabled rule with minimal required fields
    pub fn new(id: &str, lang: &str, description: &str) -> Self {
        Self {
            id: id.to_string(),
            description: description.to_string(),
            lang: lang.to_string(),
            category: default_category(),
            enabled: true,
            enabled_in_tree: true,
            url: None,
            example_bad: None,
            example_good: None,
        }
    }

    /// Set the category
    pub fn with_category(mut self, category: &str) -> Self {
        self.category = category.to_string();
        self
    }

    /// Set the baseline state (session state follows it)
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self.enabled_in_tree = enabled;
        self
    }

    /// Set documentation URL
    pub fn with_url(mut self, url: &str) -> Self {
        self.url = Some(url.to_string());
        self
    }

    /// Set bad/good examples
    pub fn with_examples(mut self, bad: &str, good: &str) -> Self {
        self.example_bad = Some(bad.to_string());
        self.example_good = Some(good.to_string());
        self
    }
}
