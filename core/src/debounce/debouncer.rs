use log::debug;

use crate::debounce::decision::{Decision, Detections, LogRow};
use crate::debounce::state::DebouncerState;
use crate::detection::DetectionBatch;
use crate::prelude::DebounceConfig;

/// Decides, per batch, whether to clear the overlay, log, or log and alert.
///
/// The debouncer is pure: it performs no I/O and returns every side effect in
/// the [`Decision`]. The cooldown is global, so an alert for one class
/// suppresses alerts for every other class until it elapses.
#[derive(Debug, Clone, Default)]
pub struct AlertDebouncer {
    config: DebounceConfig,
}

impl AlertDebouncer {
    pub fn new(config: DebounceConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DebounceConfig {
        &self.config
    }

    pub fn process(
        &self,
        batch: &DetectionBatch,
        now_ms: u64,
        state: &mut DebouncerState,
    ) -> Decision {
        let Some(best) = batch.best() else {
            return Decision::Clear;
        };

        let elapsed = state.elapsed_since_alert(now_ms);
        let cooled_down = elapsed.map_or(true, |gap| gap > self.config.cooldown_ms);
        let should_alert = cooled_down && self.config.is_loud(best.score());

        let alerted_class = if should_alert {
            state.record_alert(&best.class_name, now_ms);
            Some(best.class_name.clone())
        } else {
            if self.config.is_loud(best.score()) {
                debug!(
                    "suppressing {} ({:.3}), {} ms since last alert",
                    best.class_name,
                    best.score(),
                    elapsed.unwrap_or_default()
                );
            }
            None
        };

        // The sound column follows confidence alone, not whether the cooldown
        // let this batch alert.
        let log_rows = batch
            .detections
            .iter()
            .map(|detection| LogRow {
                timestamp_ms: now_ms,
                class_name: detection.class_name.clone(),
                confidence: detection.score(),
                sound: self.config.is_loud(detection.score()),
                inference_time_ms: batch.inference_time_ms,
            })
            .collect();

        Decision::Detected(Detections {
            should_alert,
            alerted_class,
            best: best.clone(),
            overlay_boxes: batch.detections.clone(),
            log_rows,
        })
    }
}
