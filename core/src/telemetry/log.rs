use log::{info, warn};

use crate::debounce::Decision;
use crate::prelude::SinkError;

/// Thin wrapper over the `log` facade, tagged with the component that owns it.
pub struct LogManager {
    component: &'static str,
}

impl LogManager {
    pub fn new(component: &'static str) -> Self {
        Self { component }
    }

    pub fn record(&self, message: &str) {
        info!("[{}] {}", self.component, message);
    }

    pub fn record_decision(&self, decision: &Decision) {
        if let Some(class_name) = decision.alerted_class() {
            self.record(&format!(
                "alert {} ({} boxes)",
                class_name,
                decision.overlay_boxes().len()
            ));
        }
    }

    /// Collaborator failures are reported here and go no further.
    pub fn record_failure(&self, context: &str, error: &SinkError) {
        warn!("[{}] {}: {}", self.component, context, error);
    }
}

impl Default for LogManager {
    fn default() -> Self {
        Self::new("copilot")
    }
}
