//! Hierarchical tri-state filter tree.
//!
//! The [`domain`] layer holds the tree and its pure operations: toggling with
//! downward propagation and bottom-up aggregation, value binding, snapshots
//! and the selection projection. The [`application`] layer adds the host
//! session, definitions and detection filtering; [`infrastructure`] provides
//! snapshot stores and wiring; [`cli`] is the `filtertree` command line host.

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod tree_traits;
pub mod util;
