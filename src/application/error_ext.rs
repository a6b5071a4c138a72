//! Error conversion helpers attaching a file path to lower-level failures.

use std::path::Path;

use crate::application::{ApplicationError, ApplicationResult};

/// Extension trait turning any std error into an `ApplicationError` with path context.
pub trait PathContext<T> {
    /// Wrap the error as `OperationFailed`, e.g. `read snapshot: /tmp/s.json`.
    fn with_path_context(self, action: &str, path: &Path) -> ApplicationResult<T>;

    /// Wrap the error as a definition problem for `path`.
    fn as_definition_error(self, path: &Path) -> ApplicationResult<T>;
}

impl<T, E> PathContext<T> for Result<T, E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn with_path_context(self, action: &str, path: &Path) -> ApplicationResult<T> {
        self.map_err(|e| ApplicationError::OperationFailed {
            context: format!("{}: {}", action, path.display()),
            source: Box::new(e),
        })
    }

    fn as_definition_error(self, path: &Path) -> ApplicationResult<T> {
        self.map_err(|e| ApplicationError::Definition {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn given_io_error_when_adding_context_then_message_names_path() {
        let result: io::Result<()> = Err(io::Error::new(io::ErrorKind::NotFound, "gone"));
        let err = result
            .with_path_context("read snapshot", Path::new("/tmp/s.json"))
            .unwrap_err();
        assert_eq!(err.to_string(), "operation failed: read snapshot: /tmp/s.json");
    }
}
