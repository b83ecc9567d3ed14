//! Pending rule overrides against the persisted baseline

use crate::rule::Rule;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

/// Minimal diff to persist: rules now enabled and rules now disabled,
/// relative to their baseline
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeState {
    pub enabled: BTreeSet<String>,
    pub disabled: BTreeSet<String>,
}

impl TreeState {
    pub fn is_empty(&self) -> bool {
        self.enabled.is_empty() && self.disabled.is_empty()
    }
}

/// Override set: rule id -> session value, holding only rules whose session
/// value differs from their baseline `enabled`
#[derive(Debug, Clone, Default)]
pub struct StateTracker {
    overrides: HashMap<String, bool>,
}

impl StateTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a new checked value for a rule. Returning to the baseline drops
    /// the override.
    pub fn toggle(&mut self, rule: &Rule, checked: bool) {
        if checked == rule.enabled {
            self.overrides.remove(&rule.id);
        } else {
            self.overrides.insert(rule.id.clone(), checked);
        }
    }

    /// Current override for a rule, if any
    pub fn get(&self, rule_id: &str) -> Option<bool> {
        self.overrides.get(rule_id).copied()
    }

    pub fn is_modified(&self) -> bool {
        !self.overrides.is_empty()
    }

    /// Number of overridden rules
    pub fn len(&self) -> usize {
        self.overrides.len()
    }

    pub fn is_empty(&self) -> bool {
        self.overrides.is_empty()
    }

    /// Partition the overrides into enabled and disabled rule ids
    pub fn snapshot(&self) -> TreeState {
        let mut state = TreeState::default();
        for (id, &enabled) in &self.overrides {
            if enabled {
                state.enabled.insert(id.clone());
            } else {
                state.disabled.insert(id.clone());
            }
        }
        state
    }

    /// Discard all pending changes
    pub fn reset(&mut self) {
        self.overrides.clear();
    }
}
