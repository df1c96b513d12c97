use serde::{Deserialize, Serialize};

use crate::detection::Detection;

/// One CSV row per detection of a non-empty batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogRow {
    pub timestamp_ms: u64,
    pub class_name: String,
    pub confidence: f32,
    /// Confidence cleared the alert threshold. Ignores the cooldown.
    pub sound: bool,
    pub inference_time_ms: u64,
}

impl LogRow {
    pub fn to_csv_line(&self) -> String {
        format!(
            "{},{},{},{},{}\n",
            self.timestamp_ms,
            escape_field(&self.class_name),
            self.confidence,
            if self.sound { "1" } else { "0" },
            self.inference_time_ms
        )
    }
}

fn escape_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// Result of a non-empty batch.
#[derive(Debug, Clone, PartialEq)]
pub struct Detections {
    pub should_alert: bool,
    pub alerted_class: Option<String>,
    pub best: Detection,
    pub overlay_boxes: Vec<Detection>,
    pub log_rows: Vec<LogRow>,
}

/// What the consumer should do with a batch. All side effects live here.
#[derive(Debug, Clone, PartialEq)]
pub enum Decision {
    /// Empty batch: clear the overlay, nothing to alert or log.
    Clear,
    Detected(Detections),
}

impl Decision {
    pub fn should_alert(&self) -> bool {
        matches!(self, Decision::Detected(detections) if detections.should_alert)
    }

    pub fn alerted_class(&self) -> Option<&str> {
        match self {
            Decision::Detected(detections) => detections.alerted_class.as_deref(),
            Decision::Clear => None,
        }
    }

    pub fn log_rows(&self) -> &[LogRow] {
        match self {
            Decision::Detected(detections) => &detections.log_rows,
            Decision::Clear => &[],
        }
    }

    pub fn overlay_boxes(&self) -> &[Detection] {
        match self {
            Decision::Detected(detections) => &detections.overlay_boxes,
            Decision::Clear => &[],
        }
    }
}
