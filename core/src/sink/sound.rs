use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::prelude::{PlayOutcome, SinkError, SinkResult, SoundPlayer};
use crate::telemetry::log::LogManager;

pub const DEFAULT_SOUND_EXTENSION: &str = "wav";
const DEFAULT_CLIP_LENGTH: Duration = Duration::from_millis(2_500);

/// Device that actually renders a clip.
pub trait AudioOutput: Send {
    fn is_playing(&self) -> bool;
    fn start(&mut self, clip: &Path) -> SinkResult<()>;
}

/// Output that logs each clip and treats it as playing for a fixed length.
pub struct LoggingOutput {
    clip_length: Duration,
    playing_until: Option<Instant>,
    logger: LogManager,
}

impl LoggingOutput {
    pub fn new(clip_length: Duration) -> Self {
        Self {
            clip_length,
            playing_until: None,
            logger: LogManager::new("audio"),
        }
    }
}

impl Default for LoggingOutput {
    fn default() -> Self {
        Self::new(DEFAULT_CLIP_LENGTH)
    }
}

impl AudioOutput for LoggingOutput {
    fn is_playing(&self) -> bool {
        self.playing_until
            .map_or(false, |until| Instant::now() < until)
    }

    fn start(&mut self, clip: &Path) -> SinkResult<()> {
        self.logger.record(&format!("playing {}", clip.display()));
        self.playing_until = Some(Instant::now() + self.clip_length);
        Ok(())
    }
}

/// Resolves `<assets_dir>/<class_name>.<ext>` and plays it.
///
/// A request while a clip is still playing is dropped, never queued.
pub struct AssetSoundPlayer<O: AudioOutput = LoggingOutput> {
    assets_dir: PathBuf,
    extension: String,
    output: O,
}

impl AssetSoundPlayer<LoggingOutput> {
    pub fn new(assets_dir: impl Into<PathBuf>) -> Self {
        Self::with_output(assets_dir, LoggingOutput::default())
    }
}

impl<O: AudioOutput> AssetSoundPlayer<O> {
    pub fn with_output(assets_dir: impl Into<PathBuf>, output: O) -> Self {
        Self {
            assets_dir: assets_dir.into(),
            extension: DEFAULT_SOUND_EXTENSION.to_string(),
            output,
        }
    }

    pub fn extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    pub fn resolve(&self, class_name: &str) -> PathBuf {
        self.assets_dir
            .join(format!("{}.{}", class_name, self.extension))
    }

    pub fn output(&self) -> &O {
        &self.output
    }
}

impl<O: AudioOutput> SoundPlayer for AssetSoundPlayer<O> {
    fn play(&mut self, class_name: &str) -> SinkResult<PlayOutcome> {
        if self.output.is_playing() {
            return Ok(PlayOutcome::Busy);
        }
        if class_name.is_empty() || class_name.contains(['/', '\\']) {
            return Err(SinkError::InvalidInput(format!(
                "unusable class name {:?}",
                class_name
            )));
        }
        let clip = self.resolve(class_name);
        if !clip.is_file() {
            return Err(SinkError::MissingResource(clip));
        }
        self.output.start(&clip)?;
        Ok(PlayOutcome::Started(clip))
    }
}
