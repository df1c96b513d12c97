use log::debug;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::detection::Detection;

/// Messages for the UI-owning context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum UiEvent {
    Overlay { boxes: Vec<Detection> },
    ClearOverlay,
    Alert { class_name: String, confidence: f32 },
    Toast { message: String },
}

/// Fire-and-forget sender into the UI context. Sends never block and never
/// fail from the caller's point of view.
#[derive(Debug, Clone)]
pub struct UiNotifier {
    tx: UnboundedSender<UiEvent>,
}

impl UiNotifier {
    pub fn channel() -> (Self, UnboundedReceiver<UiEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    pub fn send(&self, event: UiEvent) {
        if let Err(err) = self.tx.send(event) {
            debug!("ui context gone, dropping {:?}", err.0);
        }
    }

    pub fn overlay(&self, boxes: Vec<Detection>) {
        self.send(UiEvent::Overlay { boxes });
    }

    pub fn clear(&self) {
        self.send(UiEvent::ClearOverlay);
    }

    pub fn alert(&self, class_name: impl Into<String>, confidence: f32) {
        self.send(UiEvent::Alert {
            class_name: class_name.into(),
            confidence,
        });
    }

    pub fn toast(&self, message: impl Into<String>) {
        self.send(UiEvent::Toast {
            message: message.into(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_arrive_in_send_order() {
        let (notifier, mut rx) = UiNotifier::channel();
        notifier.clear();
        notifier.alert("pare", 0.9);
        assert_eq!(rx.try_recv().unwrap(), UiEvent::ClearOverlay);
        assert_eq!(
            rx.try_recv().unwrap(),
            UiEvent::Alert {
                class_name: "pare".into(),
                confidence: 0.9
            }
        );
    }

    #[test]
    fn send_after_receiver_dropped_is_silent() {
        let (notifier, rx) = UiNotifier::channel();
        drop(rx);
        notifier.toast("nobody listening");
    }

    #[test]
    fn events_serialize_with_kind_tag() {
        let json = serde_json::to_string(&UiEvent::ClearOverlay).unwrap();
        assert_eq!(json, r#"{"kind":"clear_overlay"}"#);
    }
}
