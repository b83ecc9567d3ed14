//! Ordered language -> category -> rule hierarchy

use crate::language::Language;
use crate::rule::Rule;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Named grouping of rules within a language
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Category {
    pub name: String,
}

impl Category {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// A category and its rules, in display order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryEntry {
    pub category: Category,
    pub rules: Vec<Rule>,
}

/// A language and its categories, in display order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageEntry {
    pub language: Language,
    pub categories: Vec<CategoryEntry>,
}

impl LanguageEntry {
    pub fn new(language: Language) -> Self {
        Self {
            language,
            categories: Vec::new(),
        }
    }

    /// Number of rules across all categories
    pub fn rule_count(&self) -> usize {
        self.categories.iter().map(|c| c.rules.len()).sum()
    }
}

/// Ordered mapping Language -> (Category -> [Rule]).
///
/// Insertion order is display order. Rule identifiers are expected to be
/// unique; duplicates are not detected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hierarchy {
    pub languages: Vec<LanguageEntry>,
}

impl Hierarchy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a hierarchy from languages (in order) and rules (in order).
    ///
    /// Languages without rules are kept as empty entries; rules whose `lang`
    /// is not among `languages` get an entry named after the identifier.
    pub fn from_rules(languages: &[Language], rules: impl IntoIterator<Item = Rule>) -> Self {
        let mut hierarchy = Self::new();
        for language in languages {
            hierarchy.add_language(language.clone());
        }
        for rule in rules {
            let language = languages
                .iter()
                .find(|l| l.id == rule.lang)
                .cloned()
                .unwrap_or_else(|| Language::new(&rule.lang, &rule.lang));
            hierarchy.insert(language, rule);
        }
        hierarchy
    }

    /// Append a language entry if not present, returning its index
    pub fn add_language(&mut self, language: Language) -> usize {
        if let Some(idx) = self
            .languages
            .iter()
            .position(|e| e.language.id == language.id)
        {
            return idx;
        }
        self.languages.push(LanguageEntry::new(language));
        self.languages.len() - 1
    }

    /// Append a rule under its language and `rule.category`, creating both
    /// entries on first sight
    pub fn insert(&mut self, language: Language, rule: Rule) {
        let lang_idx = self.add_language(language);
        let entry = &mut self.languages[lang_idx];

        match entry
            .categories
            .iter_mut()
            .find(|c| c.category.name == rule.category)
        {
            Some(category) => category.rules.push(rule),
            None => entry.categories.push(CategoryEntry {
                category: Category::new(&rule.category),
                rules: vec![rule],
            }),
        }
    }

    /// Look up a language entry by language id
    pub fn language(&self, id: &str) -> Option<&LanguageEntry> {
        self.languages.iter().find(|e| e.language.id == id)
    }

    /// Iterate over all rules in display order
    pub fn rules(&self) -> impl Iterator<Item = &Rule> {
        self.languages
            .iter()
            .flat_map(|l| l.categories.iter())
            .flat_map(|c| c.rules.iter())
    }

    /// Find a rule by identifier
    pub fn rule(&self, id: &str) -> Option<&Rule> {
        self.rules().find(|r| r.id == id)
    }

    /// Number of rules
    pub fn rule_count(&self) -> usize {
        self.languages.iter().map(|l| l.rule_count()).sum()
    }

    /// Number of categories across all languages
    pub fn category_count(&self) -> usize {
        self.languages.iter().map(|l| l.categories.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.languages.is_empty()
    }
}
