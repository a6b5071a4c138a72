//! Detection filtering driven by a tree projection.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::application::{ApplicationError, ApplicationResult};
use crate::domain::Projection;

/// A single detected object as reported by the detection backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub label: String,
    pub confidence: f64,
    /// `[xmin, ymin, xmax, ymax]`
    #[serde(rename = "box", default)]
    pub bbox: Vec<f64>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum DetectionsPayload {
    List(Vec<Detection>),
    Response { detections: Vec<Detection> },
}

/// Parse detections from a bare array or a `{"detections": [...]}` response.
pub fn parse_detections(content: &str) -> ApplicationResult<Vec<Detection>> {
    let payload: DetectionsPayload = serde_json::from_str(content).map_err(|e| ApplicationError::Detections {
        message: e.to_string(),
    })?;
    Ok(match payload {
        DetectionsPayload::List(list) => list,
        DetectionsPayload::Response { detections } => detections,
    })
}

/// Keeps detections whose category is selected and whose confidence clears the threshold.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectionFilter {
    categories: BTreeSet<String>,
    min_confidence: Option<f64>,
}

impl DetectionFilter {
    /// Categories are the checked leaf ids; the threshold is the numeric value bound to `threshold_id`.
    pub fn from_projection(projection: &Projection, threshold_id: &str) -> Self {
        Self {
            categories: projection
                .checked_leaf_ids
                .iter()
                .map(|id| id.to_lowercase())
                .collect(),
            min_confidence: projection.number(threshold_id),
        }
    }

    pub fn min_confidence(&self) -> Option<f64> {
        self.min_confidence
    }

    pub fn keeps(&self, detection: &Detection) -> bool {
        let category_selected = self.categories.contains(&detection.label.to_lowercase());
        let confident = self.min_confidence.map_or(true, |min| detection.confidence >= min);
        category_selected && confident
    }

    #[instrument(level = "debug", skip_all, fields(total = detections.len()))]
    pub fn apply(&self, detections: &[Detection]) -> Vec<Detection> {
        let kept: Vec<Detection> = detections.iter().filter(|d| self.keeps(d)).cloned().collect();
        debug!("kept {} detections", kept.len());
        kept
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Scalar;

    fn detection(label: &str, confidence: f64) -> Detection {
        Detection {
            label: label.to_string(),
            confidence,
            bbox: vec![0.0, 0.0, 1.0, 1.0],
        }
    }

    fn projection(checked: &[&str], threshold: Option<f64>) -> Projection {
        let mut p = Projection::default();
        p.checked_leaf_ids = checked.iter().map(|s| s.to_string()).collect();
        if let Some(t) = threshold {
            p.values.insert("confidence".to_string(), Scalar::Number(t));
        }
        p
    }

    #[test]
    fn given_selected_categories_and_threshold_when_filtering_then_both_apply() {
        let filter = DetectionFilter::from_projection(&projection(&["aircraft", "vessels"], Some(0.5)), "confidence");
        let kept = filter.apply(&[
            detection("Aircraft", 0.9),
            detection("Aircraft", 0.2),
            detection("Vessels", 0.5),
            detection("Tanks", 0.99),
        ]);
        assert_eq!(kept, vec![detection("Aircraft", 0.9), detection("Vessels", 0.5)]);
    }

    #[test]
    fn given_no_threshold_value_when_filtering_then_only_categories_apply() {
        let filter = DetectionFilter::from_projection(&projection(&["tanks"], None), "confidence");
        assert_eq!(filter.min_confidence(), None);
        assert!(filter.keeps(&detection("tanks", 0.01)));
        assert!(!filter.keeps(&detection("vessels", 0.99)));
    }

    #[test]
    fn given_response_or_list_payload_when_parsing_then_both_accepted() {
        let list = r#"[{"label":"Aircraft","confidence":0.8,"box":[1,2,3,4]}]"#;
        let response = r#"{"detections":[{"label":"Vessels","confidence":0.4}]}"#;
        assert_eq!(parse_detections(list).unwrap()[0].bbox, vec![1.0, 2.0, 3.0, 4.0]);
        assert_eq!(parse_detections(response).unwrap()[0].label, "Vessels");
        assert!(parse_detections(r#"{"items":[]}"#).is_err());
    }
}
