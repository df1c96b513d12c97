use serde::{Deserialize, Serialize};

use crate::detection::Detection;

/// One frame's detections, produced atomically by the detector worker.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DetectionBatch {
    /// Arrival time in milliseconds, stamped by the frame source.
    pub captured_at_ms: u64,
    #[serde(default)]
    pub inference_time_ms: u64,
    #[serde(default)]
    pub detections: Vec<Detection>,
}

impl DetectionBatch {
    pub fn new(captured_at_ms: u64, inference_time_ms: u64, detections: Vec<Detection>) -> Self {
        Self {
            captured_at_ms,
            inference_time_ms,
            detections,
        }
    }

    pub fn empty(captured_at_ms: u64) -> Self {
        Self::new(captured_at_ms, 0, Vec::new())
    }

    pub fn is_empty(&self) -> bool {
        self.detections.is_empty()
    }

    pub fn len(&self) -> usize {
        self.detections.len()
    }

    /// Highest-confidence detection; the first one wins a tie.
    pub fn best(&self) -> Option<&Detection> {
        self.detections.iter().fold(None, |best, candidate| match best {
            Some(current) if current.score() >= candidate.score() => Some(current),
            _ => Some(candidate),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn best_prefers_first_of_tied_maxima() {
        let batch = DetectionBatch::new(
            0,
            12,
            vec![
                Detection::labelled("A", 0.9),
                Detection::labelled("B", 0.95),
                Detection::labelled("A", 0.95),
            ],
        );
        let best = batch.best().unwrap();
        assert_eq!(best.class_name, "B");
        assert!(std::ptr::eq(best, &batch.detections[1]));
    }

    #[test]
    fn nan_confidence_never_outranks_a_scored_detection() {
        let batch = DetectionBatch::new(
            0,
            12,
            vec![
                Detection::labelled("pare", 0.95),
                Detection {
                    class_name: "ruido".into(),
                    confidence: f32::NAN,
                    geometry: Default::default(),
                },
            ],
        );
        assert_eq!(batch.best().unwrap().class_name, "pare");
    }

    #[test]
    fn best_of_empty_batch_is_none() {
        assert!(DetectionBatch::empty(10).best().is_none());
    }

    #[test]
    fn batch_parses_from_json_line() {
        let line = r#"{"captured_at_ms":1500,"inference_time_ms":33,"detections":[{"class_name":"pare","confidence":0.81}]}"#;
        let batch: DetectionBatch = serde_json::from_str(line).unwrap();
        assert_eq!(batch.captured_at_ms, 1500);
        assert_eq!(batch.len(), 1);
        assert_eq!(batch.detections[0].class_name, "pare");
    }
}
