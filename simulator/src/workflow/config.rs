use anyhow::Context;
use copilotcore::prelude::DebounceConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkflowConfig {
    pub debounce: DebounceConfig,
    /// Directory receiving the session CSV files.
    pub output_dir: PathBuf,
    /// Directory holding `<class>.<ext>` alert clips.
    pub assets_dir: PathBuf,
    pub sound_extension: String,
    pub clip_length_ms: u64,
    pub bridge_addr: SocketAddr,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            debounce: DebounceConfig::default(),
            output_dir: PathBuf::from("tools/data"),
            assets_dir: PathBuf::from("assets"),
            sound_extension: "wav".into(),
            clip_length_ms: 2_500,
            bridge_addr: SocketAddr::from(([127, 0, 0, 1], 9000)),
        }
    }
}

impl WorkflowConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref)
            .with_context(|| format!("reading workflow config {}", path_ref.display()))?;
        let config: WorkflowConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("parsing workflow config {}", path_ref.display()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        let threshold = self.debounce.confidence_threshold;
        anyhow::ensure!(
            (0.0..=1.0).contains(&threshold),
            "confidence_threshold {} outside [0, 1]",
            threshold
        );
        anyhow::ensure!(
            !self.sound_extension.is_empty(),
            "sound_extension must not be empty"
        );
        Ok(())
    }

    pub fn clip_length(&self) -> Duration {
        Duration::from_millis(self.clip_length_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn default_config_uses_alert_defaults() {
        let cfg = WorkflowConfig::default();
        assert_eq!(cfg.debounce.cooldown_ms, 9_000);
        assert_eq!(cfg.clip_length(), Duration::from_millis(2_500));
        cfg.validate().unwrap();
    }

    #[test]
    fn config_load_reads_yaml() {
        let mut temp = NamedTempFile::new().unwrap();
        temp.write_all(
            b"debounce:\n  cooldown_ms: 4000\noutput_dir: /tmp/copilot\nsound_extension: ogg\n",
        )
        .unwrap();
        let path = temp.into_temp_path();
        let cfg = WorkflowConfig::load(&path).unwrap();
        assert_eq!(cfg.debounce.cooldown_ms, 4_000);
        assert_eq!(cfg.debounce.confidence_threshold, 0.7);
        assert_eq!(cfg.output_dir, PathBuf::from("/tmp/copilot"));
        assert_eq!(cfg.sound_extension, "ogg");
    }

    #[test]
    fn config_load_rejects_out_of_range_threshold() {
        let mut temp = NamedTempFile::new().unwrap();
        temp.write_all(b"debounce:\n  confidence_threshold: 1.5\n")
            .unwrap();
        let path = temp.into_temp_path();
        assert!(WorkflowConfig::load(&path).is_err());
    }
}
