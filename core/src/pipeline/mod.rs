pub mod dispatcher;
pub mod host;
pub mod worker;

pub use dispatcher::{OverlayView, UiDispatcher};
pub use host::HostCallbacks;
pub use worker::{Pipeline, PipelineHandle, PipelineReport};
