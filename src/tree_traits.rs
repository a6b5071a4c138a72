//! Text rendering of filter trees via `termtree`.

use termtree::Tree as TermTree;
use tracing::instrument;

use crate::domain::{CheckState, LeafKind, Node, Tree};

fn check_glyph(state: CheckState) -> &'static str {
    match state {
        CheckState::Checked => "[x]",
        CheckState::Unchecked => "[ ]",
        CheckState::Indeterminate => "[-]",
    }
}

/// One display line: disclosure marker, tri-state box, label, id and bound value.
pub fn node_line(node: &Node) -> String {
    let disclosure = match (node.is_leaf(), node.open) {
        (true, _) => " ",
        (false, true) => "▾",
        (false, false) => "▸",
    };
    let mut line = format!("{} {} {} ({})", disclosure, check_glyph(node.check_state), node.label, node.id);
    match (&node.bound_value, &node.kind) {
        (Some(v), _) => line.push_str(&format!(" = {v}")),
        (None, LeafKind::Toggle) => {}
        (None, _) => line.push_str(" = <unset>"),
    }
    line
}

pub trait TreeRender {
    /// Build a printable tree; closed parents hide their children unless `show_all`.
    fn to_term_tree(&self, show_all: bool) -> TermTree<String>;
}

impl TreeRender for Node {
    fn to_term_tree(&self, show_all: bool) -> TermTree<String> {
        let leaves: Vec<_> = if self.open || show_all {
            self.children.iter().map(|c| c.to_term_tree(show_all)).collect()
        } else {
            Vec::new()
        };
        TermTree::new(node_line(self)).with_leaves(leaves)
    }
}

impl TreeRender for Tree {
    #[instrument(level = "trace", skip(self))]
    fn to_term_tree(&self, show_all: bool) -> TermTree<String> {
        let leaves: Vec<_> = self.roots().iter().map(|r| r.to_term_tree(show_all)).collect();
        TermTree::new("filters".to_string()).with_leaves(leaves)
    }
}
