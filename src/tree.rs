//! Checkbox tree over the rule hierarchy
//!
//! Nodes are built from a (possibly filtered) hierarchy on every rebuild and
//! their checked flags are computed bottom-up: a rule shows its pending
//! override or its baseline, a language or category is checked when at least
//! one rule below it is checked. Between rebuilds only toggled nodes change.

use crate::filter::{filter, highlight_ranges};
use crate::hierarchy::{Category, Hierarchy};
use crate::language::Language;
use crate::registry::RuleRegistry;
use crate::rule::Rule;
use crate::state::{StateTracker, TreeState};
use serde::Serialize;
use std::ops::Range;

/// Index path from the top-level languages down to a node
pub type NodePath = Vec<usize>;

/// Payload of a tree node
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Language(Language),
    Category(Category),
    Rule(Rule),
}

/// Text style a renderer should use for a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TextStyle {
    Regular,
    Bold,
}

/// The entity a selection refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection<'a> {
    Language(&'a Language),
    Category(&'a Category),
    Rule(&'a Rule),
}

/// A node of the checkbox tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeNode {
    pub kind: NodeKind,
    pub checked: bool,
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            checked: false,
            children: Vec::new(),
        }
    }

    /// Display text
    pub fn text(&self) -> &str {
        match &self.kind {
            NodeKind::Language(lang) => &lang.display_name,
            NodeKind::Category(category) => &category.name,
            NodeKind::Rule(rule) => &rule.description,
        }
    }

    /// Groups are bold, rules regular
    pub fn style(&self) -> TextStyle {
        match self.kind {
            NodeKind::Language(_) | NodeKind::Category(_) => TextStyle::Bold,
            NodeKind::Rule(_) => TextStyle::Regular,
        }
    }

    pub fn selection(&self) -> Selection<'_> {
        match &self.kind {
            NodeKind::Language(lang) => Selection::Language(lang),
            NodeKind::Category(category) => Selection::Category(category),
            NodeKind::Rule(rule) => Selection::Rule(rule),
        }
    }

    pub fn rule(&self) -> Option<&Rule> {
        match &self.kind {
            NodeKind::Rule(rule) => Some(rule),
            _ => None,
        }
    }

    /// Descendant at a path relative to this node
    pub fn get(&self, path: &[usize]) -> Option<&TreeNode> {
        match path.split_first() {
            None => Some(self),
            Some((&idx, rest)) => self.children.get(idx)?.get(rest),
        }
    }

    fn get_mut(&mut self, path: &[usize]) -> Option<&mut TreeNode> {
        match path.split_first() {
            None => Some(self),
            Some((&idx, rest)) => self.children.get_mut(idx)?.get_mut(rest),
        }
    }
}

/// Build unchecked nodes for a hierarchy
pub fn build_nodes(hierarchy: &Hierarchy) -> Vec<TreeNode> {
    hierarchy
        .languages
        .iter()
        .map(|entry| {
            let mut lang_node = TreeNode::new(NodeKind::Language(entry.language.clone()));
            lang_node.children = entry
                .categories
                .iter()
                .map(|category| {
                    let mut category_node =
                        TreeNode::new(NodeKind::Category(category.category.clone()));
                    category_node.children = category
                        .rules
                        .iter()
                        .map(|rule| TreeNode::new(NodeKind::Rule(rule.clone())))
                        .collect();
                    category_node
                })
                .collect();
            lang_node
        })
        .collect()
}

/// Recompute checked flags of `node` and everything below it.
///
/// A rule takes its pending override, else the registry baseline. A group is
/// checked iff any child is checked; every child is visited.
pub fn compute_checked<R: RuleRegistry + ?Sized>(
    node: &mut TreeNode,
    tracker: &StateTracker,
    registry: &R,
) -> bool {
    node.checked = match &mut node.kind {
        NodeKind::Rule(rule) => {
            let checked = tracker
                .get(&rule.id)
                .unwrap_or_else(|| registry.is_enabled_by_default(rule));
            rule.enabled_in_tree = checked;
            checked
        }
        NodeKind::Language(_) | NodeKind::Category(_) => {
            let mut any = false;
            for child in &mut node.children {
                any |= compute_checked(child, tracker, registry);
            }
            any
        }
    };
    node.checked
}

/// Receives tree events. All methods default to no-ops.
pub trait TreeObserver {
    fn selection_changed(&mut self, _selection: &Selection<'_>) {}

    /// A rule's checked state was changed by the user
    fn node_state_changed(&mut self, _rule: &Rule, _checked: bool) {}

    /// Nodes were rebuilt after a filter change or reset
    fn tree_rebuilt(&mut self, _roots: &[TreeNode]) {}
}

/// Adapts a selection callback into an observer
pub struct SelectionListener<F>(F);

impl<F: FnMut(&Selection<'_>)> SelectionListener<F> {
    pub fn new(callback: F) -> Self {
        Self(callback)
    }
}

impl<F: FnMut(&Selection<'_>)> TreeObserver for SelectionListener<F> {
    fn selection_changed(&mut self, selection: &Selection<'_>) {
        (self.0)(selection)
    }
}

/// A flattened tree row for renderers
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Row {
    pub path: NodePath,
    pub depth: usize,
    pub text: String,
    pub checked: bool,
    pub style: TextStyle,
    /// Byte ranges of `text` matching the current filter
    pub highlights: Vec<Range<usize>>,
}

/// Rule browser session: the filtered tree, pending overrides and observers
pub struct RulesTree<R> {
    registry: R,
    tracker: StateTracker,
    filter: Option<String>,
    roots: Vec<TreeNode>,
    selected: Option<NodePath>,
    observers: Vec<Box<dyn TreeObserver>>,
}

impl<R: RuleRegistry> RulesTree<R> {
    /// Create a tree showing every rule of `registry`
    pub fn new(registry: R) -> Self {
        let mut tree = Self {
            registry,
            tracker: StateTracker::new(),
            filter: None,
            roots: Vec::new(),
            selected: None,
            observers: Vec::new(),
        };
        tree.filter_tree(None);
        tree
    }

    /// Register an observer
    pub fn subscribe(&mut self, observer: impl TreeObserver + 'static) {
        self.observers.push(Box::new(observer));
    }

    pub fn registry(&self) -> &R {
        &self.registry
    }

    pub fn roots(&self) -> &[TreeNode] {
        &self.roots
    }

    /// Node at a path
    pub fn node(&self, path: &[usize]) -> Option<&TreeNode> {
        let (&idx, rest) = path.split_first()?;
        self.roots.get(idx)?.get(rest)
    }

    /// Current filter string
    pub fn filter(&self) -> Option<&str> {
        self.filter.as_deref()
    }

    /// Change the filter and rebuild
    pub fn set_filter(&mut self, query: Option<&str>) {
        self.filter = query.map(String::from);
        let query = self.filter.clone();
        self.filter_tree(query.as_deref());
    }

    /// Rebuild the nodes from the registry, filtered by `query`
    pub fn filter_tree(&mut self, query: Option<&str>) {
        let all = self.registry.all_rules_by_language();
        let hierarchy = match query {
            Some(q) => filter(&all, q),
            None => all,
        };

        self.roots = build_nodes(&hierarchy);
        for root in &mut self.roots {
            compute_checked(root, &self.tracker, &self.registry);
        }
        self.selected = None;

        log::debug!(
            "Rebuilt rules tree: {} rules, filter {:?}",
            hierarchy.rule_count(),
            query
        );

        for observer in &mut self.observers {
            observer.tree_rebuilt(&self.roots);
        }
    }

    /// Discard pending changes and rebuild with the current filter
    pub fn reset(&mut self) {
        log::debug!("Discarding {} pending rule changes", self.tracker.len());
        self.tracker.reset();
        let query = self.filter.clone();
        self.filter_tree(query.as_deref());
    }

    /// Path of the visible node for a rule id
    pub fn find_rule(&self, rule_id: &str) -> Option<NodePath> {
        for (l, lang) in self.roots.iter().enumerate() {
            for (c, category) in lang.children.iter().enumerate() {
                for (r, node) in category.children.iter().enumerate() {
                    if node.rule().is_some_and(|rule| rule.id == rule_id) {
                        return Some(vec![l, c, r]);
                    }
                }
            }
        }
        None
    }

    /// Check or uncheck a visible rule. Returns false if it is not shown.
    pub fn toggle_rule(&mut self, rule_id: &str, checked: bool) -> bool {
        match self.find_rule(rule_id) {
            Some(path) => self.set_checked(&path, checked),
            None => false,
        }
    }

    /// Check or uncheck the node at `path`. On a group this applies to
    /// every rule below it. Ancestors are refreshed on the next rebuild.
    pub fn set_checked(&mut self, path: &[usize], checked: bool) -> bool {
        let Some((&idx, rest)) = path.split_first() else {
            return false;
        };
        let Some(node) = self.roots.get_mut(idx).and_then(|n| n.get_mut(rest)) else {
            return false;
        };

        let mut changed = Vec::new();
        apply_checked(node, checked, &mut self.tracker, &mut changed);

        for rule in &changed {
            log::debug!("Rule {} set to {}", rule.id, checked);
            for observer in &mut self.observers {
                observer.node_state_changed(rule, checked);
            }
        }
        true
    }

    /// Select the node at `path` and notify observers
    pub fn select(&mut self, path: &[usize]) -> bool {
        let Some((&idx, rest)) = path.split_first() else {
            return false;
        };
        let Some(node) = self.roots.get(idx).and_then(|n| n.get(rest)) else {
            return false;
        };

        let selection = node.selection();
        for observer in &mut self.observers {
            observer.selection_changed(&selection);
        }
        self.selected = Some(path.to_vec());
        true
    }

    /// Select the first row, if any
    pub fn reset_selection(&mut self) {
        if !self.roots.is_empty() {
            self.select(&[0]);
        }
    }

    pub fn selected(&self) -> Option<&TreeNode> {
        self.node(self.selected.as_deref()?)
    }

    /// Whether any rule differs from its baseline
    pub fn is_modified(&self) -> bool {
        self.tracker.is_modified()
    }

    /// Pending changes to persist
    pub fn state(&self) -> TreeState {
        self.tracker.snapshot()
    }

    /// Depth-first rows for rendering
    pub fn rows(&self) -> Vec<Row> {
        let mut rows = Vec::new();
        let mut path = Vec::new();
        push_rows(&self.roots, self.filter(), &mut path, &mut rows);
        rows
    }
}

fn apply_checked(
    node: &mut TreeNode,
    checked: bool,
    tracker: &mut StateTracker,
    changed: &mut Vec<Rule>,
) {
    node.checked = checked;
    match &mut node.kind {
        NodeKind::Rule(rule) => {
            if rule.enabled_in_tree != checked {
                rule.enabled_in_tree = checked;
                tracker.toggle(rule, checked);
                changed.push(rule.clone());
            }
        }
        NodeKind::Language(_) | NodeKind::Category(_) => {
            for child in &mut node.children {
                apply_checked(child, checked, tracker, changed);
            }
        }
    }
}

fn push_rows(nodes: &[TreeNode], query: Option<&str>, path: &mut NodePath, rows: &mut Vec<Row>) {
    for (idx, node) in nodes.iter().enumerate() {
        path.push(idx);
        let text = node.text();
        rows.push(Row {
            path: path.clone(),
            depth: path.len() - 1,
            text: text.to_string(),
            checked: node.checked,
            style: node.style(),
            highlights: query.map(|q| highlight_ranges(text, q)).unwrap_or_default(),
        });
        push_rows(&node.children, query, path, rows);
        path.pop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{RuleFile, StaticRegistry};
    use pretty_assertions::assert_eq;
    use std::cell::RefCell;
    use std::collections::BTreeSet;
    use std::rc::Rc;

    fn registry() -> StaticRegistry {
        let mut registry = StaticRegistry::new();
        registry
            .add_file(RuleFile {
                version: None,
                languages: vec![Language::new("en", "English"), Language::new("de", "German")],
                rules: vec![
                    Rule::new("r1", "en", "Avoid passive voice").with_category("Style"),
                    Rule::new("r2", "en", "Oxford comma")
                        .with_category("Style")
                        .with_enabled(false),
                    Rule::new("r3", "en", "Subject-verb agreement").with_category("Grammar"),
                    Rule::new("d1", "de", "Füllwörter vermeiden")
                        .with_category("Style")
                        .with_enabled(false),
                ],
            })
            .unwrap();
        registry
    }

    #[derive(Default)]
    struct Recorder {
        events: Rc<RefCell<Vec<String>>>,
    }

    impl TreeObserver for Recorder {
        fn selection_changed(&mut self, selection: &Selection<'_>) {
            let event = match selection {
                Selection::Language(lang) => format!("select language {}", lang.id),
                Selection::Category(category) => format!("select category {}", category.name),
                Selection::Rule(rule) => format!("select rule {}", rule.id),
            };
            self.events.borrow_mut().push(event);
        }

        fn node_state_changed(&mut self, rule: &Rule, checked: bool) {
            self.events
                .borrow_mut()
                .push(format!("{} -> {}", rule.id, checked));
        }

        fn tree_rebuilt(&mut self, roots: &[TreeNode]) {
            self.events
                .borrow_mut()
                .push(format!("rebuilt {}", roots.len()));
        }
    }

    #[test]
    fn test_build_checked_state() {
        let registry = registry();
        let tree = RulesTree::new(&registry);

        // English: Style has r1 on / r2 off, Grammar has r3 on
        assert!(tree.node(&[0]).unwrap().checked);
        assert!(tree.node(&[0, 0]).unwrap().checked);
        assert!(tree.node(&[0, 0, 0]).unwrap().checked);
        assert!(!tree.node(&[0, 0, 1]).unwrap().checked);

        // German: only rule is off, so its groups are off
        assert!(!tree.node(&[1]).unwrap().checked);
        assert!(!tree.node(&[1, 0]).unwrap().checked);
    }

    #[test]
    fn test_compute_checked_or_semantics() {
        let registry = registry();
        let tracker = StateTracker::new();

        let mut mixed = TreeNode::new(NodeKind::Category(Category::new("Mixed")));
        mixed.children = vec![
            TreeNode::new(NodeKind::Rule(registry.rule("r1").unwrap().clone())),
            TreeNode::new(NodeKind::Rule(registry.rule("r2").unwrap().clone())),
        ];
        assert!(compute_checked(&mut mixed, &tracker, &registry));
        assert!(mixed.children[0].checked);
        assert!(!mixed.children[1].checked);

        let mut off = TreeNode::new(NodeKind::Category(Category::new("Off")));
        off.children = vec![TreeNode::new(NodeKind::Rule(
            registry.rule("r2").unwrap().clone(),
        ))];
        assert!(!compute_checked(&mut off, &tracker, &registry));

        let mut pending = StateTracker::new();
        pending.toggle(registry.rule("r2").unwrap(), true);
        assert!(compute_checked(&mut mixed, &pending, &registry));
        let second = &mixed.children[1];
        assert!(second.checked);
        assert!(second.rule().unwrap().enabled_in_tree);

        let mut empty = TreeNode::new(NodeKind::Category(Category::new("Empty")));
        assert!(!compute_checked(&mut empty, &tracker, &registry));
    }

    #[test]
    fn test_toggle_updates_leaf_only_until_rebuild() {
        let registry = registry();
        let mut tree = RulesTree::new(&registry);

        assert!(tree.toggle_rule("d1", true));
        assert!(tree.node(&[1, 0, 0]).unwrap().checked);
        assert!(tree.node(&[1, 0, 0]).unwrap().rule().unwrap().enabled_in_tree);
        assert!(!tree.node(&[1]).unwrap().checked);

        tree.set_filter(None);
        assert!(tree.node(&[1]).unwrap().checked);
        assert!(tree.node(&[1, 0, 0]).unwrap().checked);
    }

    #[test]
    fn test_toggle_unknown_rule() {
        let registry = registry();
        let mut tree = RulesTree::new(&registry);
        assert!(!tree.toggle_rule("missing", false));
        assert!(!tree.set_checked(&[5], false));
        assert!(!tree.set_checked(&[], false));
        assert!(!tree.is_modified());
    }

    #[test]
    fn test_toggle_group_applies_to_rules() {
        let registry = registry();
        let mut tree = RulesTree::new(&registry);

        assert!(tree.set_checked(&[0, 0], false));
        assert!(!tree.node(&[0, 0]).unwrap().checked);

        // r1 was on and is now off; r2 was already off
        let state = tree.state();
        assert_eq!(state.disabled, BTreeSet::from(["r1".to_string()]));
        assert!(state.enabled.is_empty());
    }

    #[test]
    fn test_group_toggle_reports_flipped_rules_only() {
        let registry = registry();
        let mut tree = RulesTree::new(&registry);
        let recorder = Recorder::default();
        let events = recorder.events.clone();
        tree.subscribe(recorder);

        // Style holds r1 (on) and r2 (off)
        tree.set_checked(&[0, 0], false);
        assert_eq!(*events.borrow(), vec!["r1 -> false".to_string()]);

        events.borrow_mut().clear();
        tree.toggle_rule("r2", false);
        assert!(events.borrow().is_empty());
        assert_eq!(tree.state().disabled, BTreeSet::from(["r1".to_string()]));
    }

    #[test]
    fn test_state_and_modified() {
        let registry = registry();
        let mut tree = RulesTree::new(&registry);
        assert!(!tree.is_modified());

        tree.toggle_rule("r1", false);
        tree.toggle_rule("r2", true);
        assert!(tree.is_modified());

        let state = tree.state();
        assert_eq!(state.disabled, BTreeSet::from(["r1".to_string()]));
        assert_eq!(state.enabled, BTreeSet::from(["r2".to_string()]));

        tree.toggle_rule("r1", true);
        tree.toggle_rule("r2", false);
        assert!(!tree.is_modified());
    }

    #[test]
    fn test_overrides_survive_filter_changes() {
        let registry = registry();
        let mut tree = RulesTree::new(&registry);

        tree.toggle_rule("r1", false);
        tree.set_filter(Some("comma"));
        assert!(tree.find_rule("r1").is_none());
        assert!(tree.is_modified());

        tree.set_filter(Some("passive"));
        let path = tree.find_rule("r1").unwrap();
        assert!(!tree.node(&path).unwrap().checked);
        // Style now only holds the unchecked r1
        assert!(!tree.node(&[0, 0]).unwrap().checked);
    }

    #[test]
    fn test_reset_restores_baseline() {
        let registry = registry();
        let mut tree = RulesTree::new(&registry);
        let baseline = tree.roots().to_vec();

        tree.toggle_rule("r1", false);
        tree.toggle_rule("d1", true);
        tree.set_checked(&[0, 1], false);
        tree.reset();

        assert!(!tree.is_modified());
        assert_eq!(tree.roots(), baseline.as_slice());
    }

    #[test]
    fn test_reset_keeps_filter() {
        let registry = registry();
        let mut tree = RulesTree::new(&registry);
        tree.set_filter(Some("German"));
        tree.reset();

        assert_eq!(tree.filter(), Some("German"));
        assert_eq!(tree.roots().len(), 1);
    }

    #[test]
    fn test_observers() {
        let registry = registry();
        let mut tree = RulesTree::new(&registry);
        let recorder = Recorder::default();
        let events = recorder.events.clone();
        tree.subscribe(recorder);

        tree.select(&[0, 1]);
        tree.toggle_rule("r3", false);
        tree.set_filter(Some("voice"));
        tree.reset_selection();

        assert_eq!(
            *events.borrow(),
            vec![
                "select category Grammar".to_string(),
                "r3 -> false".to_string(),
                "rebuilt 1".to_string(),
                "select language en".to_string(),
            ]
        );
    }

    #[test]
    fn test_selection_listener() {
        let registry = registry();
        let mut tree = RulesTree::new(&registry);
        let selected = Rc::new(RefCell::new(None));
        let sink = selected.clone();
        tree.subscribe(SelectionListener::new(move |selection: &Selection<'_>| {
            if let Selection::Rule(rule) = selection {
                *sink.borrow_mut() = Some(rule.id.clone());
            }
        }));

        assert!(tree.select(&[0, 0, 1]));
        assert_eq!(selected.borrow().as_deref(), Some("r2"));
        assert_eq!(tree.selected().unwrap().text(), "Oxford comma");
        assert!(!tree.select(&[9, 9]));
    }

    #[test]
    fn test_rows() {
        let registry = registry();
        let mut tree = RulesTree::new(&registry);
        tree.set_filter(Some("comma"));

        let rows = tree.rows();
        let texts: Vec<(usize, &str)> = rows.iter().map(|r| (r.depth, r.text.as_str())).collect();
        assert_eq!(
            texts,
            vec![(0, "English"), (1, "Style"), (2, "Oxford comma")]
        );
        assert_eq!(rows[0].style, TextStyle::Bold);
        assert_eq!(rows[2].style, TextStyle::Regular);
        assert_eq!(rows[2].path, vec![0, 0, 0]);
        assert_eq!(rows[2].highlights, vec![7..12]);
        assert!(rows[0].highlights.is_empty());
        assert!(!rows[2].checked);
    }
}
