//! Service container for dependency injection
//!
//! Wires the settings, the filesystem and the snapshot store into a session.

use std::sync::Arc;

use tracing::info;

use crate::application::services::FilterSession;
use crate::application::{default_definition, load_definition, ApplicationResult};
use crate::config::Settings;
use crate::domain::{Tree, ValueBinder};
use crate::infrastructure::traits::{
    FileSnapshotStore, FileSystem, MemorySnapshotStore, RealFileSystem, SnapshotStore,
};

/// Container holding the application's collaborators.
pub struct ServiceContainer {
    /// Application settings
    pub settings: Arc<Settings>,

    /// Filesystem abstraction
    pub fs: Arc<dyn FileSystem>,

    /// Snapshot persistence channel
    pub store: Arc<dyn SnapshotStore>,
}

impl ServiceContainer {
    /// Create a container with real implementations.
    ///
    /// With `persist = false` snapshots live in memory for the process only.
    pub fn new(settings: Settings) -> Self {
        let store: Arc<dyn SnapshotStore> = if settings.persist {
            Arc::new(FileSnapshotStore::new(settings.snapshot_path.clone()))
        } else {
            Arc::new(MemorySnapshotStore::new())
        };
        Self::with_deps(settings, Arc::new(RealFileSystem), store)
    }

    /// Create a container with custom dependencies (for testing).
    pub fn with_deps(settings: Settings, fs: Arc<dyn FileSystem>, store: Arc<dyn SnapshotStore>) -> Self {
        Self {
            settings: Arc::new(settings),
            fs,
            store,
        }
    }

    /// The configured definition, or the bundled one.
    pub fn definition(&self) -> ApplicationResult<Tree> {
        match &self.settings.definition {
            Some(path) => load_definition(self.fs.as_ref(), path),
            None => Ok(default_definition()),
        }
    }

    /// Open a session with the threshold hook wired to `on_threshold`.
    pub fn session_with(
        &self,
        on_threshold: impl Fn(f64) + Send + Sync + 'static,
    ) -> ApplicationResult<FilterSession> {
        let binder = ValueBinder::new().on_value(self.settings.hooks.threshold_control.clone(), on_threshold);
        Ok(FilterSession::open(self.definition()?, Arc::clone(&self.store), binder))
    }

    /// Open a session whose threshold hook only logs the new value.
    pub fn session(&self) -> ApplicationResult<FilterSession> {
        self.session_with(|v| info!("confidence threshold set to {v}"))
    }
}
