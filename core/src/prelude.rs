use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::debounce::LogRow;
use crate::detection::DetectionBatch;

pub const DEFAULT_COOLDOWN_MS: u64 = 9_000;
pub const DEFAULT_CONFIDENCE_THRESHOLD: f32 = 0.7;

/// Thresholds shared by the debouncer and the log sink's `sound` column.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DebounceConfig {
    /// Minimum gap between two fired alerts, any class.
    pub cooldown_ms: u64,
    pub confidence_threshold: f32,
}

impl Default for DebounceConfig {
    fn default() -> Self {
        Self {
            cooldown_ms: DEFAULT_COOLDOWN_MS,
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
        }
    }
}

impl DebounceConfig {
    pub fn is_loud(&self, confidence: f32) -> bool {
        confidence >= self.confidence_threshold
    }
}

/// Failures raised by collaborators. They are logged by the caller and never
/// reach the debouncing logic.
#[derive(thiserror::Error, Debug)]
pub enum SinkError {
    #[error("i/o failure: {0}")]
    Io(#[from] std::io::Error),
    #[error("missing resource: {}", .0.display())]
    MissingResource(PathBuf),
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

pub type SinkResult<T> = Result<T, SinkError>;

/// Outcome of a sound request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayOutcome {
    Started(PathBuf),
    /// A clip is still playing; the request was dropped.
    Busy,
}

/// Produces detection batches in non-decreasing timestamp order.
pub trait FrameSource {
    fn next_batch(&mut self) -> Option<DetectionBatch>;
}

/// Append-only sink for per-detection log rows.
pub trait LogSink: Send {
    fn append(&mut self, rows: &[LogRow]) -> SinkResult<()>;

    fn flush(&mut self) -> SinkResult<()> {
        Ok(())
    }
}

/// Plays the alert resource associated with a class name.
pub trait SoundPlayer: Send {
    fn play(&mut self, class_name: &str) -> SinkResult<PlayOutcome>;
}

impl<S: FrameSource + ?Sized> FrameSource for Box<S> {
    fn next_batch(&mut self) -> Option<DetectionBatch> {
        (**self).next_batch()
    }
}

impl<L: LogSink + ?Sized> LogSink for Box<L> {
    fn append(&mut self, rows: &[LogRow]) -> SinkResult<()> {
        (**self).append(rows)
    }

    fn flush(&mut self) -> SinkResult<()> {
        (**self).flush()
    }
}

impl<P: SoundPlayer + ?Sized> SoundPlayer for Box<P> {
    fn play(&mut self, class_name: &str) -> SinkResult<PlayOutcome> {
        (**self).play(class_name)
    }
}
