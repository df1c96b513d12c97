use std::collections::VecDeque;

use serde::Serialize;
use tokio::sync::mpsc::UnboundedReceiver;

use crate::detection::Detection;
use crate::prelude::{PlayOutcome, SinkError, SoundPlayer};
use crate::sink::UiEvent;
use crate::telemetry::log::LogManager;

const TOAST_HISTORY: usize = 16;

/// What the UI currently shows.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct OverlayView {
    pub boxes: Vec<Detection>,
    pub last_alert: Option<String>,
    pub alerts_played: usize,
    pub toasts: VecDeque<String>,
}

impl OverlayView {
    fn push_toast(&mut self, message: String) {
        if self.toasts.len() == TOAST_HISTORY {
            self.toasts.pop_front();
        }
        self.toasts.push_back(message);
    }
}

/// Consumes [`UiEvent`]s on the UI-owning context: redraws the overlay,
/// plays alert sounds and shows transient messages.
pub struct UiDispatcher<P: SoundPlayer> {
    events: UnboundedReceiver<UiEvent>,
    player: P,
    view: OverlayView,
    logger: LogManager,
}

impl<P: SoundPlayer> UiDispatcher<P> {
    pub fn new(events: UnboundedReceiver<UiEvent>, player: P) -> Self {
        Self {
            events,
            player,
            view: OverlayView::default(),
            logger: LogManager::new("ui"),
        }
    }

    pub fn view(&self) -> &OverlayView {
        &self.view
    }

    /// Handles everything queued so far without waiting.
    pub fn drain_pending(&mut self) -> usize {
        let mut handled = 0;
        while let Ok(event) = self.events.try_recv() {
            self.handle(event);
            handled += 1;
        }
        handled
    }

    /// Blocks until every sender is gone. Call from a plain thread, not from
    /// inside an async runtime.
    pub fn run(self) -> OverlayView {
        self.run_publishing(|_| {})
    }

    /// Like [`UiDispatcher::run`], handing the view to `publish` after every
    /// event.
    pub fn run_publishing<F>(mut self, mut publish: F) -> OverlayView
    where
        F: FnMut(&OverlayView),
    {
        while let Some(event) = self.events.blocking_recv() {
            self.handle(event);
            publish(&self.view);
        }
        self.view
    }

    pub fn handle(&mut self, event: UiEvent) {
        match event {
            UiEvent::Overlay { boxes } => self.view.boxes = boxes,
            UiEvent::ClearOverlay => self.view.boxes.clear(),
            UiEvent::Toast { message } => self.view.push_toast(message),
            UiEvent::Alert {
                class_name,
                confidence,
            } => {
                self.play(&class_name);
                self.view
                    .push_toast(format!("Detectado: {} [{}]", class_name, confidence));
                self.view.last_alert = Some(class_name);
            }
        }
    }

    fn play(&mut self, class_name: &str) {
        match self.player.play(class_name) {
            Ok(PlayOutcome::Started(clip)) => {
                self.view.alerts_played += 1;
                let file_name = clip
                    .file_name()
                    .map(|name| name.to_string_lossy().into_owned())
                    .unwrap_or_default();
                self.view.push_toast(format!("Sonido: {}", file_name));
            }
            Ok(PlayOutcome::Busy) => {
                self.logger
                    .record(&format!("sound busy, skipping {}", class_name));
            }
            Err(err @ SinkError::MissingResource(_)) => {
                self.logger.record_failure("resolving alert sound", &err);
            }
            Err(err) => self.logger.record_failure("playing alert sound", &err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prelude::SinkResult;
    use crate::sink::UiNotifier;
    use std::path::PathBuf;

    #[derive(Default)]
    struct RecordingPlayer {
        known: Vec<&'static str>,
        played: Vec<String>,
    }

    impl SoundPlayer for RecordingPlayer {
        fn play(&mut self, class_name: &str) -> SinkResult<PlayOutcome> {
            if !self.known.contains(&class_name) {
                return Err(SinkError::MissingResource(PathBuf::from(format!(
                    "{}.wav",
                    class_name
                ))));
            }
            self.played.push(class_name.to_string());
            Ok(PlayOutcome::Started(PathBuf::from(format!(
                "/assets/{}.wav",
                class_name
            ))))
        }
    }

    #[test]
    fn overlay_follows_latest_event() {
        let (notifier, rx) = UiNotifier::channel();
        let mut dispatcher = UiDispatcher::new(rx, RecordingPlayer::default());

        notifier.overlay(vec![Detection::labelled("pare", 0.9)]);
        dispatcher.drain_pending();
        assert_eq!(dispatcher.view().boxes.len(), 1);

        notifier.clear();
        dispatcher.drain_pending();
        assert!(dispatcher.view().boxes.is_empty());
    }

    #[test]
    fn alert_plays_sound_and_toasts() {
        let (notifier, rx) = UiNotifier::channel();
        let player = RecordingPlayer {
            known: vec!["pare"],
            ..Default::default()
        };
        let mut dispatcher = UiDispatcher::new(rx, player);

        notifier.alert("pare", 0.9);
        assert_eq!(dispatcher.drain_pending(), 1);

        let view = dispatcher.view();
        assert_eq!(view.alerts_played, 1);
        assert_eq!(view.last_alert.as_deref(), Some("pare"));
        assert_eq!(
            view.toasts.iter().cloned().collect::<Vec<_>>(),
            vec!["Sonido: pare.wav".to_string(), "Detectado: pare [0.9]".to_string()]
        );
    }

    #[test]
    fn missing_sound_still_shows_alert() {
        let (notifier, rx) = UiNotifier::channel();
        let mut dispatcher = UiDispatcher::new(rx, RecordingPlayer::default());
        notifier.alert("semaforo", 0.8);
        dispatcher.drain_pending();

        assert_eq!(dispatcher.view().alerts_played, 0);
        assert_eq!(dispatcher.view().last_alert.as_deref(), Some("semaforo"));
    }

    #[test]
    fn run_returns_final_view_when_senders_drop() {
        let (notifier, rx) = UiNotifier::channel();
        notifier.toast("hola");
        drop(notifier);
        let view = UiDispatcher::new(rx, RecordingPlayer::default()).run();
        assert_eq!(view.toasts.len(), 1);
    }

    #[test]
    fn run_publishing_reports_each_event() {
        let (notifier, rx) = UiNotifier::channel();
        notifier.overlay(vec![Detection::labelled("pare", 0.9)]);
        notifier.clear();
        drop(notifier);

        let mut box_counts = Vec::new();
        UiDispatcher::new(rx, RecordingPlayer::default())
            .run_publishing(|view| box_counts.push(view.boxes.len()));
        assert_eq!(box_counts, vec![1, 0]);
    }

    #[test]
    fn toast_history_is_bounded() {
        let (notifier, rx) = UiNotifier::channel();
        let mut dispatcher = UiDispatcher::new(rx, RecordingPlayer::default());
        for index in 0..(TOAST_HISTORY + 4) {
            notifier.toast(format!("toast {}", index));
        }
        dispatcher.drain_pending();
        assert_eq!(dispatcher.view().toasts.len(), TOAST_HISTORY);
        assert_eq!(dispatcher.view().toasts.front().unwrap(), "toast 4");
    }
}
