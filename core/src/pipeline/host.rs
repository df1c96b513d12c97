use std::sync::atomic::Ordering;

use log::{debug, info};

use crate::detection::DetectionBatch;
use crate::pipeline::worker::PipelineHandle;

/// Callbacks a host UI layer forwards into the pipeline. The pipeline never
/// learns which UI framework is calling.
pub trait HostCallbacks {
    fn on_batch(&self, batch: DetectionBatch);
    fn on_permission_result(&self, granted: bool);
}

impl HostCallbacks for PipelineHandle {
    /// Batches arriving while the camera permission is denied are dropped.
    fn on_batch(&self, batch: DetectionBatch) {
        if !self.is_permitted() {
            debug!("dropping batch at {} ms, permission denied", batch.captured_at_ms);
            return;
        }
        if !self.submit(batch) {
            debug!("pipeline stopped, batch dropped");
        }
    }

    /// A camera denial is silent: the host asks again, and batches are
    /// dropped meanwhile.
    fn on_permission_result(&self, granted: bool) {
        let previous = self.permitted.swap(granted, Ordering::SeqCst);
        if previous != granted {
            info!("camera permission {}", if granted { "granted" } else { "denied" });
        }
    }
}
