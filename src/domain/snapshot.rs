//! Snapshot codec: tree <-> persistence-neutral JSON payload.
//!
//! The payload is the tree's own shape, an array of nodes with camelCase
//! fields. Loading validates the whole payload before building anything and
//! re-runs aggregation, so a snapshot from another schema version cannot
//! leave an indeterminate leaf behind.

use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, instrument};

use crate::domain::error::{DomainError, DomainResult};
use crate::domain::node::{CheckState, LeafKind, Node, Scalar, Tree};
use crate::domain::toggle::normalize;

/// Raw node for intermediate parsing (optional fields detect "not specified").
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawNode {
    pub id: String,
    pub label: Option<String>,
    pub check_state: Option<CheckState>,
    pub open: Option<bool>,
    pub bound_value: Option<Scalar>,
    pub kind: Option<LeafKind>,
    pub children: Option<Vec<RawNode>>,
}

impl RawNode {
    pub(crate) fn into_node(self) -> DomainResult<Node> {
        if self.id.trim().is_empty() {
            return Err(DomainError::malformed("node id must not be empty"));
        }
        if let Some(Scalar::Number(n)) = &self.bound_value {
            if !n.is_finite() {
                return Err(DomainError::malformed(format!("{}: bound value {n} is not finite", self.id)));
            }
        }
        if let Some(LeafKind::Slider { min, max, step }) = &self.kind {
            if ![min, max, step].iter().all(|v| v.is_finite()) || min > max {
                return Err(DomainError::malformed(format!(
                    "{}: invalid slider range [{min}, {max}] step {step}",
                    self.id
                )));
            }
        }
        let children = self
            .children
            .unwrap_or_default()
            .into_iter()
            .map(RawNode::into_node)
            .collect::<DomainResult<Vec<_>>>()?;
        Ok(Node {
            label: self.label.unwrap_or_else(|| self.id.clone()),
            id: self.id,
            check_state: self.check_state.unwrap_or_default(),
            open: self.open.unwrap_or(false),
            bound_value: self.bound_value,
            kind: self.kind.unwrap_or_default(),
            children,
        })
    }
}

/// Build a normalized tree from raw nodes; any structural problem is a malformed snapshot.
pub(crate) fn tree_from_raw(raw: Vec<RawNode>) -> DomainResult<Tree> {
    let roots = raw
        .into_iter()
        .map(RawNode::into_node)
        .collect::<DomainResult<Vec<_>>>()?;
    let tree = Tree::new(roots).map_err(|e| match e {
        DomainError::DuplicateNodeId(id) => DomainError::malformed(format!("duplicate node id: {id}")),
        other => other,
    })?;
    Ok(normalize(tree))
}

/// Deep, order-preserving copy of the tree into a JSON value.
#[instrument(level = "debug", skip(tree))]
pub fn serialize(tree: &Tree) -> Value {
    // Tree is plain data with string keys; conversion cannot fail.
    serde_json::to_value(tree).unwrap_or_else(|_| Value::Array(Vec::new()))
}

/// Validate and load a payload, failing as a whole on any violation.
#[instrument(level = "debug", skip(payload))]
pub fn deserialize(payload: &Value) -> DomainResult<Tree> {
    if !payload.is_array() {
        return Err(DomainError::malformed("payload must be an array of nodes"));
    }
    let raw: Vec<RawNode> =
        Vec::<RawNode>::deserialize(payload).map_err(|e| DomainError::malformed(e.to_string()))?;
    let tree = tree_from_raw(raw)?;
    debug!("loaded snapshot with {} nodes", tree.len());
    Ok(tree)
}

/// Serialize to a pretty-printed JSON string.
pub fn to_json(tree: &Tree) -> String {
    serde_json::to_string_pretty(&serialize(tree)).unwrap_or_else(|_| "[]".to_string())
}

/// Parse and validate a JSON string.
pub fn from_json(s: &str) -> DomainResult<Tree> {
    let value: Value = serde_json::from_str(s).map_err(|e| DomainError::malformed(e.to_string()))?;
    deserialize(&value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::projection::project;
    use crate::domain::toggle::toggle_check;
    use serde_json::json;

    fn sample() -> Tree {
        let tree = Tree::new(vec![
            Node::group(
                "air",
                "Air",
                vec![Node::leaf("aircraft", "Aircraft"), Node::leaf("drones", "Drones")],
            )
            .opened(true),
            Node::leaf("confidence", "Confidence")
                .with_kind(LeafKind::Slider {
                    min: 0.0,
                    max: 1.0,
                    step: 0.05,
                })
                .with_value(0.5),
        ])
        .unwrap();
        toggle_check(&tree, "aircraft")
    }

    #[test]
    fn given_tree_when_serialized_then_uses_camel_case_shape() {
        let value = serialize(&sample());
        assert_eq!(value[0]["id"], "air");
        assert_eq!(value[0]["checkState"], "indeterminate");
        assert_eq!(value[0]["open"], true);
        assert_eq!(value[0]["children"][0]["checkState"], "checked");
        assert_eq!(value[1]["boundValue"], 0.5);
        assert_eq!(value[1]["kind"]["type"], "slider");
    }

    #[test]
    fn given_serialized_tree_when_loaded_then_structure_and_projection_preserved() {
        let tree = sample();
        let loaded = deserialize(&serialize(&tree)).unwrap();
        assert_eq!(loaded, tree);
        assert_eq!(project(&loaded), project(&tree));
    }

    #[test]
    fn given_partial_nodes_when_loaded_then_defaults_fill_in() {
        let loaded = deserialize(&json!([{ "id": "x" }])).unwrap();
        let node = loaded.find("x").unwrap();
        assert_eq!(node.label, "x");
        assert_eq!(node.check_state, CheckState::Unchecked);
        assert!(!node.open);
        assert_eq!(node.kind, LeafKind::Toggle);
    }

    #[test]
    fn given_stale_parent_and_indeterminate_leaf_when_loaded_then_aggregation_rerun() {
        let payload = json!([{
            "id": "p",
            "checkState": "checked",
            "children": [
                { "id": "a", "checkState": "indeterminate" },
                { "id": "b", "checkState": "checked" }
            ]
        }]);
        let loaded = deserialize(&payload).unwrap();
        assert_eq!(loaded.find("a").unwrap().check_state, CheckState::Unchecked);
        assert_eq!(loaded.find("p").unwrap().check_state, CheckState::Indeterminate);
        assert!(loaded.check_invariants().is_ok());
    }

    #[test]
    fn given_malformed_payloads_when_loaded_then_rejected() {
        let cases = [
            json!({ "id": "not-a-list" }),
            json!([{ "label": "no id" }]),
            json!([{ "id": 7 }]),
            json!([{ "id": "x", "checkState": "maybe" }]),
            json!([{ "id": "x", "children": "nope" }]),
            json!([{ "id": "x" }, { "id": "p", "children": [{ "id": "x" }] }]),
            json!([{ "id": "  " }]),
            json!([{ "id": "s", "kind": { "type": "slider", "min": 1.0, "max": 0.0, "step": 0.1 } }]),
        ];
        for payload in cases {
            assert!(
                matches!(deserialize(&payload), Err(DomainError::MalformedSnapshot { .. })),
                "payload should be rejected: {payload}"
            );
        }
    }

    #[test]
    fn given_json_string_when_round_tripped_then_equal() {
        let tree = sample();
        assert_eq!(from_json(&to_json(&tree)).unwrap(), tree);
        assert!(from_json("{not json").is_err());
    }
}
