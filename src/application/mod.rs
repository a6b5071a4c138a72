//! Application layer: session, definitions and detection filtering
//!
//! This layer orchestrates domain logic and depends on I/O boundary traits.

pub mod definition;
pub mod error;
pub mod error_ext;
pub mod services;

pub use definition::{
    default_definition, load_definition, parse_definition, DefinitionFormat, CONFIDENCE_THRESHOLD_ID, MAP_STYLE_ID,
};
pub use error::{ApplicationError, ApplicationResult};
pub use error_ext::PathContext;
