use serde::{Deserialize, Serialize};

/// Normalised box corners as emitted by the detector. The debouncer never
/// looks inside; overlay consumers do.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
}

impl BoundingBox {
    pub fn new(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    pub fn width(&self) -> f32 {
        (self.x2 - self.x1).abs()
    }

    pub fn height(&self) -> f32 {
        (self.y2 - self.y1).abs()
    }

    pub fn center(&self) -> (f32, f32) {
        ((self.x1 + self.x2) / 2.0, (self.y1 + self.y2) / 2.0)
    }
}

/// A single labelled, scored box.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub class_name: String,
    #[serde(deserialize_with = "deserialize_confidence")]
    pub confidence: f32,
    #[serde(default)]
    pub geometry: BoundingBox,
}

impl Detection {
    pub fn new(class_name: impl Into<String>, confidence: f32, geometry: BoundingBox) -> Self {
        Self {
            class_name: class_name.into(),
            confidence: sanitize_confidence(confidence),
            geometry,
        }
    }

    /// Detection without geometry, mostly for tests and synthetic streams.
    pub fn labelled(class_name: impl Into<String>, confidence: f32) -> Self {
        Self::new(class_name, confidence, BoundingBox::default())
    }

    /// Confidence as used for ranking and thresholds. The field is public, so
    /// a literal may still carry NaN or an out-of-range value.
    pub fn score(&self) -> f32 {
        sanitize_confidence(self.confidence)
    }
}

/// Clamps into `[0, 1]`; NaN becomes zero so ordering stays total.
pub fn sanitize_confidence(confidence: f32) -> f32 {
    if confidence.is_nan() {
        0.0
    } else {
        confidence.clamp(0.0, 1.0)
    }
}

fn deserialize_confidence<'de, D>(deserializer: D) -> Result<f32, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = f32::deserialize(deserializer)?;
    Ok(sanitize_confidence(raw))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn confidence_is_clamped_on_construction() {
        assert_eq!(Detection::labelled("stop", 1.4).confidence, 1.0);
        assert_eq!(Detection::labelled("stop", -0.2).confidence, 0.0);
        assert_eq!(Detection::labelled("stop", f32::NAN).confidence, 0.0);
    }

    #[test]
    fn confidence_is_clamped_on_deserialize() {
        let detection: Detection =
            serde_json::from_str(r#"{"class_name":"ceda_el_paso","confidence":3.0}"#).unwrap();
        assert_eq!(detection.confidence, 1.0);
        assert_eq!(detection.geometry, BoundingBox::default());
    }

    #[test]
    fn score_sanitizes_literal_confidence() {
        let detection = Detection {
            class_name: "ruido".into(),
            confidence: f32::NAN,
            geometry: BoundingBox::default(),
        };
        assert_eq!(detection.score(), 0.0);
    }

    #[test]
    fn bounding_box_reports_center_and_size() {
        let bbox = BoundingBox::new(0.2, 0.2, 0.6, 0.4);
        let (cx, cy) = bbox.center();
        assert!((cx - 0.4).abs() < 1e-6);
        assert!((cy - 0.3).abs() < 1e-6);
        assert!((bbox.width() - 0.4).abs() < 1e-6);
        assert!((bbox.height() - 0.2).abs() < 1e-6);
    }
}
