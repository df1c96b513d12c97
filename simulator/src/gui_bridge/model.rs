use copilotcore::debounce::StateSnapshot;
use copilotcore::pipeline::OverlayView;
use copilotcore::telemetry::MetricsSnapshot;
use serde::Serialize;

/// Payload served to overlay viewers.
#[derive(Debug, Clone, Serialize, Default)]
pub struct VisualizationModel {
    pub overlay: OverlayView,
    pub alert_state: StateSnapshot,
    pub metrics: MetricsSnapshot,
}
