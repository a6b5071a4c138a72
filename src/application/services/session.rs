//! Filter session: the host-side holder of the current tree.
//!
//! A session owns one tree value. Each user event is dispatched against it,
//! the result replaces it, and the new tree is persisted best-effort through
//! the snapshot store. Events must be fed one at a time; the last write wins.

use std::io;
use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use crate::application::ApplicationResult;
use crate::domain::snapshot;
use crate::domain::{project, try_toggle_check, try_toggle_open, Projection, Scalar, Tree, ValueBinder};
use crate::infrastructure::traits::SnapshotStore;

/// A user interaction addressed to one node.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    ToggleCheck(String),
    ToggleOpen(String),
    SetValue(String, Scalar),
}

impl Action {
    pub fn target(&self) -> &str {
        match self {
            Action::ToggleCheck(id) | Action::ToggleOpen(id) | Action::SetValue(id, _) => id,
        }
    }
}

/// Where the session's current tree came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    Snapshot,
    Definition,
}

pub struct FilterSession {
    definition: Tree,
    current: Tree,
    origin: Origin,
    store: Arc<dyn SnapshotStore>,
    binder: ValueBinder,
}

impl FilterSession {
    /// Start from the stored snapshot, falling back to `definition`.
    ///
    /// A missing snapshot, a failed load and a malformed payload all fall back;
    /// none of them is an error for the host.
    #[instrument(level = "debug", skip_all)]
    pub fn open(definition: Tree, store: Arc<dyn SnapshotStore>, binder: ValueBinder) -> Self {
        let (current, origin) = match Self::restore(store.as_ref()) {
            Some(tree) => (tree, Origin::Snapshot),
            None => (definition.clone(), Origin::Definition),
        };
        debug!("session opened from {:?} with {} nodes", origin, current.len());
        binder.sync(&current);
        Self {
            definition,
            current,
            origin,
            store,
            binder,
        }
    }

    fn restore(store: &dyn SnapshotStore) -> Option<Tree> {
        match store.load() {
            Ok(Some(payload)) => match snapshot::from_json(&payload) {
                Ok(tree) => Some(tree),
                Err(e) => {
                    warn!("discarding snapshot: {}", e);
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                warn!("snapshot unavailable: {}", e);
                None
            }
        }
    }

    pub fn tree(&self) -> &Tree {
        &self.current
    }

    pub fn definition(&self) -> &Tree {
        &self.definition
    }

    pub fn origin(&self) -> Origin {
        self.origin
    }

    pub fn projection(&self) -> Projection {
        project(&self.current)
    }

    /// Apply `action`, reporting unknown ids and rejected values.
    ///
    /// On error the current tree is kept and nothing is persisted.
    #[instrument(level = "debug", skip(self))]
    pub fn try_dispatch(&mut self, action: Action) -> ApplicationResult<&Tree> {
        let next = match action {
            Action::ToggleCheck(id) => try_toggle_check(&self.current, &id)?,
            Action::ToggleOpen(id) => try_toggle_open(&self.current, &id)?,
            Action::SetValue(id, value) => self.binder.try_apply(&self.current, &id, value)?,
        };
        self.current = next;
        self.persist();
        Ok(&self.current)
    }

    /// Apply `action`; failures leave the tree as it was.
    pub fn dispatch(&mut self, action: Action) -> &Tree {
        if let Err(e) = self.try_dispatch(action) {
            debug!("action ignored: {}", e);
        }
        &self.current
    }

    /// Return to the definition and discard the stored snapshot.
    ///
    /// The tree is reset even when the store cannot be cleared; the error is
    /// returned so the host can report it. The next change persists again.
    pub fn reset(&mut self) -> io::Result<&Tree> {
        info!("resetting filters to definition");
        self.current = self.definition.clone();
        self.origin = Origin::Definition;
        self.binder.sync(&self.current);
        self.store.clear()?;
        Ok(&self.current)
    }

    /// Save the current tree; returns whether the store accepted it.
    pub fn persist(&self) -> bool {
        match self.store.save(&snapshot::to_json(&self.current)) {
            Ok(()) => true,
            Err(e) => {
                warn!("snapshot not saved: {}", e);
                false
            }
        }
    }
}
