pub mod debouncer;
pub mod decision;
pub mod state;

pub use debouncer::AlertDebouncer;
pub use decision::{Decision, Detections, LogRow};
pub use state::{DebouncerState, StateSnapshot};
