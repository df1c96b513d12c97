use serde::Serialize;
use std::collections::VecDeque;
use std::sync::Mutex;

use crate::debounce::Decision;
use crate::math::stats::StatsHelper;

const LATENCY_WINDOW: usize = 64;

/// Pipeline counters, shared between the worker and whoever reports them.
pub struct MetricsRecorder {
    inner: Mutex<Metrics>,
}

#[derive(Default)]
struct Metrics {
    batches: usize,
    empty_batches: usize,
    alerts: usize,
    suppressed: usize,
    log_rows: usize,
    sink_errors: usize,
    recent_latency_ms: VecDeque<f32>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct MetricsSnapshot {
    pub batches: usize,
    pub empty_batches: usize,
    pub alerts: usize,
    /// Batches whose best detection was loud enough but hit the cooldown.
    pub suppressed: usize,
    pub log_rows: usize,
    pub sink_errors: usize,
    pub mean_inference_ms: f32,
}

impl MetricsRecorder {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Metrics::default()),
        }
    }

    pub fn record_decision(&self, decision: &Decision, inference_time_ms: u64, loud: bool) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.batches += 1;
            match decision {
                Decision::Clear => metrics.empty_batches += 1,
                Decision::Detected(detections) => {
                    metrics.log_rows += detections.log_rows.len();
                    if detections.should_alert {
                        metrics.alerts += 1;
                    } else if loud {
                        metrics.suppressed += 1;
                    }
                    if metrics.recent_latency_ms.len() == LATENCY_WINDOW {
                        metrics.recent_latency_ms.pop_front();
                    }
                    metrics.recent_latency_ms.push_back(inference_time_ms as f32);
                }
            }
        }
    }

    pub fn record_sink_error(&self) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.sink_errors += 1;
        }
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        if let Ok(mut metrics) = self.inner.lock() {
            let mean_inference_ms = StatsHelper::mean(metrics.recent_latency_ms.make_contiguous());
            MetricsSnapshot {
                batches: metrics.batches,
                empty_batches: metrics.empty_batches,
                alerts: metrics.alerts,
                suppressed: metrics.suppressed,
                log_rows: metrics.log_rows,
                sink_errors: metrics.sink_errors,
                mean_inference_ms,
            }
        } else {
            MetricsSnapshot::default()
        }
    }
}

impl Default for MetricsRecorder {
    fn default() -> Self {
        Self::new()
    }
}
