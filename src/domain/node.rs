//! Node and Tree: the plain data the engine operates on.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::error::{DomainError, DomainResult};

/// Tri-state selection flag.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckState {
    Checked,
    #[default]
    Unchecked,
    Indeterminate,
}

impl CheckState {
    pub fn is_checked(self) -> bool {
        self == CheckState::Checked
    }

    /// State a toggle moves to: anything but checked becomes checked.
    pub fn toggled(self) -> Self {
        match self {
            CheckState::Checked => CheckState::Unchecked,
            CheckState::Unchecked | CheckState::Indeterminate => CheckState::Checked,
        }
    }
}

impl fmt::Display for CheckState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CheckState::Checked => "checked",
            CheckState::Unchecked => "unchecked",
            CheckState::Indeterminate => "indeterminate",
        };
        write!(f, "{s}")
    }
}

/// Scalar bound to a leaf control (slider position, input, picked option).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Number(f64),
    Text(String),
}

impl Scalar {
    /// Numeric reading of the scalar; numeric strings are parsed.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Scalar::Number(n) if n.is_finite() => Some(*n),
            Scalar::Number(_) => None,
            Scalar::Text(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Scalar::Text(s) => Some(s),
            Scalar::Number(_) => None,
        }
    }

    /// Parse user input: numbers become `Number`, everything else `Text`.
    pub fn parse(input: &str) -> Self {
        match input.trim().parse::<f64>() {
            Ok(n) if n.is_finite() => Scalar::Number(n),
            _ => Scalar::Text(input.to_string()),
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Number(n) => write!(f, "{n}"),
            Scalar::Text(s) => write!(f, "{s}"),
        }
    }
}

impl From<f64> for Scalar {
    fn from(n: f64) -> Self {
        Scalar::Number(n)
    }
}

impl From<&str> for Scalar {
    fn from(s: &str) -> Self {
        Scalar::Text(s.to_string())
    }
}

/// What kind of control a leaf represents.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum LeafKind {
    /// Plain checkbox, carries no value
    #[default]
    Toggle,
    Slider {
        min: f64,
        max: f64,
        step: f64,
    },
    NumericInput,
    Picker {
        options: Vec<String>,
    },
}

impl LeafKind {
    pub fn is_toggle(&self) -> bool {
        matches!(self, LeafKind::Toggle)
    }
}

/// One entry in the filter tree.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    pub id: String,
    pub label: String,
    pub check_state: CheckState,
    pub open: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bound_value: Option<Scalar>,
    #[serde(skip_serializing_if = "LeafKind::is_toggle")]
    pub kind: LeafKind,
    pub children: Vec<Node>,
}

impl Node {
    /// Unchecked, closed leaf with a plain toggle.
    pub fn leaf(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            check_state: CheckState::Unchecked,
            open: false,
            bound_value: None,
            kind: LeafKind::Toggle,
            children: Vec::new(),
        }
    }

    /// Unchecked, closed parent owning `children`.
    pub fn group(id: impl Into<String>, label: impl Into<String>, children: Vec<Node>) -> Self {
        Self {
            children,
            ..Self::leaf(id, label)
        }
    }

    pub fn with_kind(mut self, kind: LeafKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_value(mut self, value: impl Into<Scalar>) -> Self {
        self.bound_value = Some(value.into());
        self
    }

    pub fn with_state(mut self, state: CheckState) -> Self {
        self.check_state = state;
        self
    }

    pub fn opened(mut self, open: bool) -> Self {
        self.open = open;
        self
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    pub(crate) fn find(&self, id: &str) -> Option<&Node> {
        if self.id == id {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find(id))
    }

    pub(crate) fn find_mut(&mut self, id: &str) -> Option<&mut Node> {
        if self.id == id {
            return Some(self);
        }
        self.children.iter_mut().find_map(|c| c.find_mut(id))
    }
}

/// Ordered forest of root nodes with tree-wide unique ids.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Tree {
    roots: Vec<Node>,
}

impl Tree {
    /// Build a tree, rejecting duplicate ids anywhere in the forest.
    pub fn new(roots: Vec<Node>) -> DomainResult<Self> {
        let tree = Self { roots };
        {
            let mut seen = HashSet::new();
            for (_, node) in tree.iter() {
                if !seen.insert(node.id.as_str()) {
                    return Err(DomainError::DuplicateNodeId(node.id.clone()));
                }
            }
        }
        Ok(tree)
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn roots(&self) -> &[Node] {
        &self.roots
    }

    pub(crate) fn roots_mut(&mut self) -> &mut [Node] {
        &mut self.roots
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Number of nodes in the whole forest.
    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn find(&self, id: &str) -> Option<&Node> {
        self.roots.iter().find_map(|r| r.find(id))
    }

    pub(crate) fn find_mut(&mut self, id: &str) -> Option<&mut Node> {
        self.roots.iter_mut().find_map(|r| r.find_mut(id))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.find(id).is_some()
    }

    /// Zero-based nesting depth of `id`; roots are at depth 0.
    pub fn depth_of(&self, id: &str) -> Option<usize> {
        self.iter().find(|(_, n)| n.id == id).map(|(d, _)| d)
    }

    /// Pre-order traversal yielding `(depth, node)`.
    pub fn iter(&self) -> TreeIterator<'_> {
        TreeIterator::new(self)
    }

    pub fn leaves(&self) -> impl Iterator<Item = &Node> {
        self.iter().map(|(_, n)| n).filter(|n| n.is_leaf())
    }

    /// Verify the tri-state invariants over the whole forest.
    ///
    /// Leaves never hold `Indeterminate`, and every parent's state is the
    /// aggregate of its children.
    pub fn check_invariants(&self) -> DomainResult<()> {
        for (_, node) in self.iter() {
            if node.is_leaf() {
                if node.check_state == CheckState::Indeterminate {
                    return Err(DomainError::InvariantViolation {
                        id: node.id.clone(),
                        reason: "leaf is indeterminate".to_string(),
                    });
                }
                continue;
            }
            let expected = crate::domain::toggle::aggregate(&node.children);
            if node.check_state != expected {
                return Err(DomainError::InvariantViolation {
                    id: node.id.clone(),
                    reason: format!("parent is {} but children aggregate to {}", node.check_state, expected),
                });
            }
        }
        Ok(())
    }
}

pub struct TreeIterator<'a> {
    stack: Vec<(usize, &'a Node)>,
}

impl<'a> TreeIterator<'a> {
    fn new(tree: &'a Tree) -> Self {
        let stack = tree.roots.iter().rev().map(|r| (0, r)).collect();
        Self { stack }
    }
}

impl<'a> Iterator for TreeIterator<'a> {
    type Item = (usize, &'a Node);

    fn next(&mut self) -> Option<Self::Item> {
        let (depth, node) = self.stack.pop()?;
        // Push children in reverse order for left-to-right traversal
        for child in node.children.iter().rev() {
            self.stack.push((depth + 1, child));
        }
        Some((depth, node))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Tree {
        Tree::new(vec![
            Node::group(
                "a",
                "A",
                vec![Node::leaf("b", "B"), Node::group("c", "C", vec![Node::leaf("d", "D")])],
            ),
            Node::leaf("e", "E"),
        ])
        .unwrap()
    }

    #[test]
    fn given_forest_when_iterating_then_visits_preorder_with_depth() {
        let tree = sample();
        let visited: Vec<(usize, &str)> = tree.iter().map(|(d, n)| (d, n.id.as_str())).collect();
        assert_eq!(visited, vec![(0, "a"), (1, "b"), (1, "c"), (2, "d"), (0, "e")]);
    }

    #[test]
    fn given_duplicate_ids_when_building_then_fails() {
        let result = Tree::new(vec![
            Node::group("a", "A", vec![Node::leaf("x", "X")]),
            Node::leaf("x", "X again"),
        ]);
        assert_eq!(result, Err(DomainError::DuplicateNodeId("x".to_string())));
    }

    #[test]
    fn given_nested_id_when_finding_then_returns_node_and_depth() {
        let tree = sample();
        assert_eq!(tree.find("d").map(|n| n.label.as_str()), Some("D"));
        assert_eq!(tree.depth_of("d"), Some(2));
        assert!(tree.find("missing").is_none());
        assert_eq!(tree.len(), 5);
        assert_eq!(tree.leaves().count(), 3);
    }

    #[test]
    fn given_indeterminate_leaf_when_checking_invariants_then_reports_violation() {
        let tree = Tree::new(vec![Node::leaf("x", "X").with_state(CheckState::Indeterminate)]).unwrap();
        assert!(matches!(
            tree.check_invariants(),
            Err(DomainError::InvariantViolation { id, .. }) if id == "x"
        ));
    }

    #[test]
    fn given_numeric_text_when_reading_scalar_then_parses() {
        assert_eq!(Scalar::from("0.5").as_number(), Some(0.5));
        assert_eq!(Scalar::from("high").as_number(), None);
        assert_eq!(Scalar::parse("0.25"), Scalar::Number(0.25));
        assert_eq!(Scalar::parse("night"), Scalar::Text("night".to_string()));
    }
}
