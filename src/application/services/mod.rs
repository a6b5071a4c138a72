//! Application services

pub mod detections;
pub mod session;

pub use detections::{parse_detections, Detection, DetectionFilter};
pub use session::{Action, FilterSession, Origin};
