use chrono::{Local, NaiveDateTime};
use std::path::{Path, PathBuf};

const SESSION_STAMP_FORMAT: &str = "%Y%m%d_%H%M";

/// One run of the application. Log files are named after its start time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Session {
    started_at: NaiveDateTime,
}

impl Session {
    pub fn start_now() -> Self {
        Self {
            started_at: Local::now().naive_local(),
        }
    }

    /// Session with an explicit local start time.
    pub fn started_at(started_at: NaiveDateTime) -> Self {
        Self { started_at }
    }

    pub fn stamp(&self) -> String {
        self.started_at.format(SESSION_STAMP_FORMAT).to_string()
    }

    /// `<dir>/<yyyyMMdd_HHmm>_<suffix>.csv`
    pub fn file_in(&self, dir: &Path, suffix: &str) -> PathBuf {
        dir.join(format!("{}_{}.csv", self.stamp(), suffix))
    }
}
