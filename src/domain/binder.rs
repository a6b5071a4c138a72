//! Value binder: bound scalars on leaf controls and host notification hooks.

use std::collections::HashMap;
use std::fmt;

use tracing::{debug, instrument};

use crate::domain::error::{DomainError, DomainResult};
use crate::domain::node::{LeafKind, Node, Scalar, Tree};

/// Check `value` against the control kind of `node`, returning the value to store.
fn validate(node: &Node, value: Scalar) -> DomainResult<Scalar> {
    if !node.is_leaf() {
        return Err(DomainError::rejected(&node.id, "values bind to leaves only"));
    }
    match &node.kind {
        LeafKind::Toggle => Err(DomainError::rejected(&node.id, "toggle leaves carry no value")),
        LeafKind::Slider { min, max, .. } => {
            let n = value
                .as_number()
                .ok_or_else(|| DomainError::rejected(&node.id, format!("not a number: {value}")))?;
            if n < *min || n > *max {
                return Err(DomainError::rejected(
                    &node.id,
                    format!("{n} outside [{min}, {max}]"),
                ));
            }
            Ok(Scalar::Number(n))
        }
        LeafKind::NumericInput => value
            .as_number()
            .map(Scalar::Number)
            .ok_or_else(|| DomainError::rejected(&node.id, format!("not a number: {value}"))),
        LeafKind::Picker { options } => {
            // Numeric input matches an option by value, so "1.50" still finds "1.50".
            let picked = match &value {
                Scalar::Text(s) => options.iter().find(|o| *o == s),
                Scalar::Number(n) => options.iter().find(|o| o.trim().parse::<f64>().ok() == Some(*n)),
            };
            picked.map(|o| Scalar::Text(o.clone())).ok_or_else(|| {
                DomainError::rejected(&node.id, format!("{value} is not one of {}", options.join(", ")))
            })
        }
    }
}

/// Replace the bound value of leaf `id`, reporting unknown ids and rejected values.
///
/// Check and disclosure state are left untouched.
#[instrument(level = "debug", skip(tree))]
pub fn try_set_value(tree: &Tree, id: &str, value: Scalar) -> DomainResult<Tree> {
    let mut next = tree.clone();
    let target = next
        .find_mut(id)
        .ok_or_else(|| DomainError::UnknownNodeId(id.to_string()))?;
    let accepted = validate(target, value)?;
    debug!("{} = {}", id, accepted);
    target.bound_value = Some(accepted);
    Ok(next)
}

/// Replace the bound value of leaf `id`; unknown ids and rejected values are no-ops.
pub fn set_value(tree: &Tree, id: &str, value: Scalar) -> Tree {
    try_set_value(tree, id, value).unwrap_or_else(|e| {
        debug!("set_value ignored: {}", e);
        tree.clone()
    })
}

/// Callback receiving the numeric value of a bound control.
pub type ValueHook = Box<dyn Fn(f64) + Send + Sync>;

/// Applies value edits and notifies host hooks registered per node id.
///
/// Which ids have hooks, and what they do, is the host's configuration.
#[derive(Default)]
pub struct ValueBinder {
    hooks: HashMap<String, ValueHook>,
}

impl fmt::Debug for ValueBinder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut ids: Vec<&String> = self.hooks.keys().collect();
        ids.sort();
        f.debug_struct("ValueBinder").field("hooks", &ids).finish()
    }
}

impl ValueBinder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `hook` for edits of `id`, replacing any earlier hook.
    pub fn on_value(mut self, id: impl Into<String>, hook: impl Fn(f64) + Send + Sync + 'static) -> Self {
        self.hooks.insert(id.into(), Box::new(hook));
        self
    }

    pub fn has_hook(&self, id: &str) -> bool {
        self.hooks.contains_key(id)
    }

    /// Set the value and, once accepted, notify the hook for `id` if any.
    pub fn try_apply(&self, tree: &Tree, id: &str, value: Scalar) -> DomainResult<Tree> {
        let next = try_set_value(tree, id, value)?;
        if let Some(hook) = self.hooks.get(id) {
            if let Some(n) = next.find(id).and_then(|node| node.bound_value.as_ref()).and_then(Scalar::as_number) {
                debug!("notifying hook for {}: {}", id, n);
                hook(n);
            }
        }
        Ok(next)
    }

    /// Push the current numeric value of every hooked node to its hook.
    ///
    /// Hosts call this when a whole tree replaces the old one, e.g. on restore.
    pub fn sync(&self, tree: &Tree) {
        for (id, hook) in &self.hooks {
            if let Some(n) = tree.find(id).and_then(|node| node.bound_value.as_ref()).and_then(Scalar::as_number) {
                debug!("syncing hook for {}: {}", id, n);
                hook(n);
            }
        }
    }

    /// Like [`ValueBinder::try_apply`], but a failed edit returns the tree unchanged.
    pub fn apply(&self, tree: &Tree, id: &str, value: Scalar) -> Tree {
        self.try_apply(tree, id, value).unwrap_or_else(|e| {
            debug!("value edit ignored: {}", e);
            tree.clone()
        })
    }
}
