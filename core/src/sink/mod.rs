pub mod csv;
pub mod notifier;
pub mod session;
pub mod sound;

pub use self::csv::{CsvLogSink, DETECTION_CSV_HEADER};
pub use notifier::{UiEvent, UiNotifier};
pub use session::Session;
pub use sound::{AssetSoundPlayer, AudioOutput, LoggingOutput};
