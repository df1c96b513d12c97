//! Alert debouncing core for the virtual co-pilot.
//!
//! Per-frame detection batches flow through a single worker that decides when
//! to clear the overlay, log, or log and sound an alert. The decision logic is
//! pure; sound, CSV logging and UI updates are collaborators fed from the
//! returned [`Decision`].

pub mod debounce;
pub mod detection;
pub mod gps;
pub mod math;
pub mod pipeline;
pub mod prelude;
pub mod sink;
pub mod telemetry;

pub use debounce::{AlertDebouncer, DebouncerState, Decision, Detections, LogRow, StateSnapshot};
pub use detection::{BoundingBox, Detection, DetectionBatch};
pub use pipeline::{HostCallbacks, OverlayView, Pipeline, PipelineHandle, PipelineReport, UiDispatcher};
pub use prelude::{DebounceConfig, FrameSource, LogSink, PlayOutcome, SinkError, SinkResult, SoundPlayer};
