//! Grazi Rules - grammar rule browser core
//!
//! Models the rule browser of a grammar checker as a three-level tree
//! (language -> category -> rule) that can be filtered by a search string,
//! shows which rules are enabled, and records pending edits as a minimal
//! diff against the persisted baseline.
//!
//! # Architecture
//!
//! ```text
//! RuleRegistry -> Hierarchy -> filter -> RulesTree (StateTracker) -> rows / TreeState -> Config
//! ```
//!
//! The registry supplies the full hierarchy and each rule's baseline. The tree
//! rebuilds from it whenever the filter changes or the view resets, computes
//! every node's checked flag bottom-up, and hands a `TreeState` snapshot to the
//! caller, which persists it with [`Config::apply`].
//!
//! # Example
//!
//! ```no_run
//! use grazi_rules::{RulesTree, StaticRegistry};
//!
//! let registry = StaticRegistry::builtin().unwrap();
//! let mut tree = RulesTree::new(&registry);
//! tree.set_filter(Some("comma"));
//! tree.toggle_rule("EN_OXFORD_COMMA", true);
//! let state = tree.state();
//! assert!(state.enabled.contains("EN_OXFORD_COMMA"));
//! ```

pub mod config;
pub mod filter;
pub mod hierarchy;
pub mod language;
pub mod registry;
pub mod rule;
pub mod state;
pub mod tree;

// Re-export main types
pub use config::{Config, ConfigError, RulesConfig};
pub use filter::{filter, highlight_ranges, is_blank};
pub use hierarchy::{Category, CategoryEntry, Hierarchy, LanguageEntry};
pub use language::Language;
pub use registry::{RegistryError, RuleFile, RuleRegistry, StaticRegistry};
pub use rule::Rule;
pub use state::{StateTracker, TreeState};
pub use tree::{
    compute_checked, NodeKind, NodePath, Row, RulesTree, Selection, SelectionListener,
    TextStyle, TreeNode, TreeObserver,
};
