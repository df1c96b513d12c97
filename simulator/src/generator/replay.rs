use anyhow::Context;
use copilotcore::detection::DetectionBatch;
use copilotcore::gps::LocationFix;
use copilotcore::prelude::FrameSource;
use serde::de::DeserializeOwned;
use std::fs;
use std::path::Path;

/// Replays batches recorded as JSON lines.
pub struct ReplaySource {
    batches: std::vec::IntoIter<DetectionBatch>,
}

impl ReplaySource {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let batches: Vec<DetectionBatch> = read_json_lines(path.as_ref())?;
        Ok(Self::from_batches(batches))
    }

    /// Out-of-order recordings are sorted so timestamps never go backwards.
    pub fn from_batches(mut batches: Vec<DetectionBatch>) -> Self {
        batches.sort_by_key(|batch| batch.captured_at_ms);
        Self {
            batches: batches.into_iter(),
        }
    }
}

impl FrameSource for ReplaySource {
    fn next_batch(&mut self) -> Option<DetectionBatch> {
        self.batches.next()
    }
}

pub fn load_fixes<P: AsRef<Path>>(path: P) -> anyhow::Result<Vec<LocationFix>> {
    read_json_lines(path.as_ref())
}

fn read_json_lines<T: DeserializeOwned>(path: &Path) -> anyhow::Result<Vec<T>> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("reading replay file {}", path.display()))?;
    contents
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(index, line)| {
            serde_json::from_str(line)
                .with_context(|| format!("parsing {} line {}", path.display(), index + 1))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn replay_reads_json_lines_and_skips_blanks() {
        let mut temp = NamedTempFile::new().unwrap();
        writeln!(
            temp,
            r#"{{"captured_at_ms":2000,"inference_time_ms":30,"detections":[{{"class_name":"pare","confidence":0.9}}]}}"#
        )
        .unwrap();
        writeln!(temp).unwrap();
        writeln!(temp, r#"{{"captured_at_ms":1000}}"#).unwrap();
        let path = temp.into_temp_path();

        let mut source = ReplaySource::load(&path).unwrap();
        let first = source.next_batch().unwrap();
        assert_eq!(first.captured_at_ms, 1000);
        assert!(first.is_empty());
        assert_eq!(source.next_batch().unwrap().len(), 1);
        assert!(source.next_batch().is_none());
    }

    #[test]
    fn replay_reports_bad_line_number() {
        let mut temp = NamedTempFile::new().unwrap();
        writeln!(temp, r#"{{"captured_at_ms":1}}"#).unwrap();
        writeln!(temp, "not json").unwrap();
        let path = temp.into_temp_path();

        let err = ReplaySource::load(&path).err().unwrap();
        assert!(format!("{:#}", err).contains("line 2"));
    }

    #[test]
    fn fixes_load_from_json_lines() {
        let mut temp = NamedTempFile::new().unwrap();
        writeln!(
            temp,
            r#"{{"timestamp_ms":0,"latitude":-17.39,"longitude":-66.15,"speed_mps":8.0}}"#
        )
        .unwrap();
        let path = temp.into_temp_path();
        let fixes = load_fixes(&path).unwrap();
        assert_eq!(fixes.len(), 1);
        assert_eq!(fixes[0].accuracy_m, 0.0);
    }
}
