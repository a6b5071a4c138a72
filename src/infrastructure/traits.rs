//! I/O boundary traits for testability
//!
//! These traits abstract the file access and the snapshot persistence
//! channel, allowing the session to be tested with in-memory implementations.

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tempfile::NamedTempFile;
use tracing::{debug, instrument};

/// Filesystem abstraction for testability.
pub trait FileSystem: Send + Sync {
    /// Read file contents to string.
    fn read_to_string(&self, path: &Path) -> io::Result<String>;
}

/// Persistence channel for tree snapshots.
///
/// `load` returns `Ok(None)` when nothing has been saved yet. Callers treat a
/// missing snapshot and a failed load the same way.
pub trait SnapshotStore: Send + Sync {
    /// Read the last saved payload, if any.
    fn load(&self) -> io::Result<Option<String>>;

    /// Replace the saved payload.
    fn save(&self, payload: &str) -> io::Result<()>;

    /// Forget the saved payload. Clearing an empty store succeeds.
    fn clear(&self) -> io::Result<()>;
}

// ============================================================
// REAL IMPLEMENTATIONS
// ============================================================

/// Real filesystem implementation.
#[derive(Debug, Default)]
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }
}

/// Snapshot store backed by a single JSON file.
///
/// Saves go through a temp file in the same directory which is then renamed
/// over the target, so a crash never leaves a half-written snapshot.
#[derive(Debug, Clone)]
pub struct FileSnapshotStore {
    path: PathBuf,
}

impl FileSnapshotStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SnapshotStore for FileSnapshotStore {
    #[instrument(level = "debug", skip(self), fields(path = %self.path.display()))]
    fn load(&self) -> io::Result<Option<String>> {
        match std::fs::read_to_string(&self.path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("no snapshot file");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    #[instrument(level = "debug", skip(self, payload), fields(path = %self.path.display()))]
    fn save(&self, payload: &str) -> io::Result<()> {
        let dir = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        std::fs::create_dir_all(&dir)?;

        let mut tmp = NamedTempFile::new_in(&dir)?;
        tmp.write_all(payload.as_bytes())?;
        tmp.flush()?;
        tmp.persist(&self.path).map_err(|e| e.error)?;
        debug!("snapshot saved ({} bytes)", payload.len());
        Ok(())
    }

    fn clear(&self) -> io::Result<()> {
        match std::fs::remove_file(&self.path) {
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            other => other,
        }
    }
}

/// In-memory snapshot store, mainly for tests and embedding hosts.
#[derive(Debug, Default)]
pub struct MemorySnapshotStore {
    payload: Mutex<Option<String>>,
}

impl MemorySnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_payload(payload: impl Into<String>) -> Self {
        Self {
            payload: Mutex::new(Some(payload.into())),
        }
    }

    /// Current payload, for inspection.
    pub fn payload(&self) -> Option<String> {
        self.payload.lock().ok().and_then(|p| p.clone())
    }
}

fn poisoned() -> io::Error {
    io::Error::new(io::ErrorKind::Other, "snapshot store lock poisoned")
}

impl SnapshotStore for MemorySnapshotStore {
    fn load(&self) -> io::Result<Option<String>> {
        Ok(self.payload.lock().map_err(|_| poisoned())?.clone())
    }

    fn save(&self, payload: &str) -> io::Result<()> {
        *self.payload.lock().map_err(|_| poisoned())? = Some(payload.to_string());
        Ok(())
    }

    fn clear(&self) -> io::Result<()> {
        *self.payload.lock().map_err(|_| poisoned())? = None;
        Ok(())
    }
}
