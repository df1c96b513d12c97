use serde::{Deserialize, Serialize};

/// Alert bookkeeping owned by the single pipeline worker.
///
/// Only `AlertDebouncer::process` mutates it. Readers on other threads get a
/// [`StateSnapshot`] instead of a reference.
#[derive(Debug, Default)]
pub struct DebouncerState {
    last_alert_class_name: String,
    last_alert_timestamp_ms: Option<u64>,
}

impl DebouncerState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty when no alert has fired yet.
    pub fn last_alert_class_name(&self) -> &str {
        &self.last_alert_class_name
    }

    /// Zero when no alert has fired yet.
    pub fn last_alert_timestamp_ms(&self) -> u64 {
        self.last_alert_timestamp_ms.unwrap_or(0)
    }

    pub fn has_alerted(&self) -> bool {
        self.last_alert_timestamp_ms.is_some()
    }

    pub fn snapshot(&self) -> StateSnapshot {
        StateSnapshot {
            last_alert_class_name: self.last_alert_class_name.clone(),
            last_alert_timestamp_ms: self.last_alert_timestamp_ms(),
            has_alerted: self.has_alerted(),
        }
    }

    /// Millisecond gap since the last alert, zero if `now_ms` went backwards.
    /// `None` until the first alert fires.
    pub(crate) fn elapsed_since_alert(&self, now_ms: u64) -> Option<u64> {
        self.last_alert_timestamp_ms
            .map(|last| now_ms.saturating_sub(last))
    }

    pub(crate) fn record_alert(&mut self, class_name: &str, now_ms: u64) {
        // never move the alert clock backwards
        let last = self.last_alert_timestamp_ms.unwrap_or(0);
        self.last_alert_timestamp_ms = Some(last.max(now_ms));
        self.last_alert_class_name.clear();
        self.last_alert_class_name.push_str(class_name);
    }
}

/// Immutable copy of [`DebouncerState`] handed across threads.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateSnapshot {
    pub last_alert_class_name: String,
    pub last_alert_timestamp_ms: u64,
    pub has_alerted: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_state_has_never_alerted() {
        let state = DebouncerState::new();
        assert_eq!(state.last_alert_class_name(), "");
        assert_eq!(state.last_alert_timestamp_ms(), 0);
        assert!(!state.snapshot().has_alerted);
        assert_eq!(state.elapsed_since_alert(5_000), None);
    }

    #[test]
    fn elapsed_clamps_when_clock_goes_backwards() {
        let mut state = DebouncerState::new();
        state.record_alert("pare", 20_000);
        assert_eq!(state.elapsed_since_alert(15_000), Some(0));
        assert_eq!(state.elapsed_since_alert(29_001), Some(9_001));
    }

    #[test]
    fn alert_at_time_zero_is_not_mistaken_for_never() {
        let mut state = DebouncerState::new();
        state.record_alert("pare", 0);
        assert!(state.has_alerted());
        assert_eq!(state.last_alert_timestamp_ms(), 0);
        assert_eq!(state.elapsed_since_alert(9_000), Some(9_000));
    }

    #[test]
    fn snapshot_is_detached_from_later_writes() {
        let mut state = DebouncerState::new();
        state.record_alert("pare", 10_000);
        let snapshot = state.snapshot();
        state.record_alert("ceda_el_paso", 30_000);
        assert_eq!(snapshot.last_alert_class_name, "pare");
        assert_eq!(snapshot.last_alert_timestamp_ms, 10_000);
    }
}
