//! Domain layer: the filter tree and its pure operations
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod binder;
pub mod error;
pub mod node;
pub mod projection;
pub mod snapshot;
pub mod toggle;

pub use binder::{set_value, try_set_value, ValueBinder, ValueHook};
pub use error::{DomainError, DomainResult};
pub use node::{CheckState, LeafKind, Node, Scalar, Tree, TreeIterator};
pub use projection::{project, Projection};
pub use toggle::{normalize, toggle_check, toggle_open, try_toggle_check, try_toggle_open};
