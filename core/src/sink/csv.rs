use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::debounce::LogRow;
use crate::prelude::{LogSink, SinkResult};
use crate::sink::session::Session;

pub const DETECTION_CSV_HEADER: &str = "timestamp,clase,probabilidad,sound,inferenceTime\n";
const DETECTION_FILE_SUFFIX: &str = "yolo_data";

/// Appends detection rows to the session's CSV file.
///
/// The file and its header are created on first use. Files are never rotated.
pub struct CsvLogSink {
    path: PathBuf,
}

impl CsvLogSink {
    pub fn new(dir: impl AsRef<Path>, session: &Session) -> Self {
        Self {
            path: session.file_in(dir.as_ref(), DETECTION_FILE_SUFFIX),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl LogSink for CsvLogSink {
    fn append(&mut self, rows: &[LogRow]) -> SinkResult<()> {
        if rows.is_empty() {
            return Ok(());
        }
        let mut chunk = String::with_capacity(rows.len() * 48);
        for row in rows {
            chunk.push_str(&row.to_csv_line());
        }
        append_with_header(&self.path, DETECTION_CSV_HEADER, &chunk)
    }
}

/// Opens `path` for append, writes `header` if the file is empty, then `body`.
pub(crate) fn append_with_header(path: &Path, header: &str, body: &str) -> SinkResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    if file.metadata()?.len() == 0 {
        file.write_all(header.as_bytes())?;
    }
    file.write_all(body.as_bytes())?;
    file.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prelude::SinkError;
    use chrono::NaiveDate;
    use tempfile::tempdir;

    fn session() -> Session {
        Session::started_at(
            NaiveDate::from_ymd_opt(2024, 11, 2)
                .unwrap()
                .and_hms_opt(18, 30, 0)
                .unwrap(),
        )
    }

    fn row(class_name: &str, confidence: f32, sound: bool) -> LogRow {
        LogRow {
            timestamp_ms: 1_000,
            class_name: class_name.into(),
            confidence,
            sound,
            inference_time_ms: 37,
        }
    }

    #[test]
    fn header_is_written_once_per_session_file() {
        let dir = tempdir().unwrap();
        let mut sink = CsvLogSink::new(dir.path(), &session());
        assert!(sink.path().ends_with("20241102_1830_yolo_data.csv"));

        sink.append(&[row("pare", 0.9, true)]).unwrap();
        sink.append(&[row("ceda_el_paso", 0.5, false), row("pare", 0.75, true)])
            .unwrap();

        let contents = fs::read_to_string(sink.path()).unwrap();
        assert_eq!(
            contents,
            "timestamp,clase,probabilidad,sound,inferenceTime\n\
             1000,pare,0.9,1,37\n\
             1000,ceda_el_paso,0.5,0,37\n\
             1000,pare,0.75,1,37\n"
        );
    }

    #[test]
    fn reopening_existing_session_file_does_not_repeat_header() {
        let dir = tempdir().unwrap();
        CsvLogSink::new(dir.path(), &session())
            .append(&[row("pare", 0.9, true)])
            .unwrap();
        let mut reopened = CsvLogSink::new(dir.path(), &session());
        reopened.append(&[row("pare", 0.8, true)]).unwrap();

        let contents = fs::read_to_string(reopened.path()).unwrap();
        assert_eq!(contents.matches("timestamp,clase").count(), 1);
        assert_eq!(contents.lines().count(), 3);
    }

    #[test]
    fn empty_append_creates_nothing() {
        let dir = tempdir().unwrap();
        let mut sink = CsvLogSink::new(dir.path(), &session());
        sink.append(&[]).unwrap();
        assert!(!sink.path().exists());
    }

    #[test]
    fn unwritable_location_reports_io_error() {
        let dir = tempdir().unwrap();
        let blocker = dir.path().join("not_a_dir");
        fs::write(&blocker, b"x").unwrap();
        let mut sink = CsvLogSink::new(&blocker, &session());
        let err = sink.append(&[row("pare", 0.9, true)]).unwrap_err();
        assert!(matches!(err, SinkError::Io(_)));
    }
}
