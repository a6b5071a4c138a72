//! Selection projector: the flat view of a tree that filtering code consumes.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::domain::node::{Scalar, Tree};

/// Effective selection set of a tree.
///
/// Only leaves contribute; parent states summarize descendants for display
/// and are not part of the projection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Projection {
    pub checked_leaf_ids: BTreeSet<String>,
    pub values: BTreeMap<String, Scalar>,
}

impl Projection {
    pub fn is_checked(&self, id: &str) -> bool {
        self.checked_leaf_ids.contains(id)
    }

    pub fn number(&self, id: &str) -> Option<f64> {
        self.values.get(id).and_then(Scalar::as_number)
    }
}

/// Walk the tree once, collecting checked leaves and bound leaf values.
#[instrument(level = "trace", skip(tree))]
pub fn project(tree: &Tree) -> Projection {
    let mut projection = Projection::default();
    for node in tree.leaves() {
        if node.check_state.is_checked() {
            projection.checked_leaf_ids.insert(node.id.clone());
        }
        if let Some(value) = &node.bound_value {
            projection.values.insert(node.id.clone(), value.clone());
        }
    }
    projection
}
