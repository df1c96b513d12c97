use crate::workflow::config::WorkflowConfig;
use anyhow::Context;
use copilotcore::gps::{GpsCsvSink, GpsRecorder, LocationFix};
use copilotcore::pipeline::{OverlayView, Pipeline, PipelineHandle, PipelineReport, UiDispatcher};
use copilotcore::prelude::FrameSource;
use copilotcore::sink::{AssetSoundPlayer, CsvLogSink, LoggingOutput, Session, UiNotifier};
use std::path::PathBuf;
use std::thread::{self, JoinHandle};

pub struct WorkflowResult {
    pub report: PipelineReport,
    pub view: OverlayView,
    pub log_path: PathBuf,
    pub batches: usize,
}

pub struct GpsSummary {
    pub fixes: usize,
    pub total_distance_m: f64,
    pub path: PathBuf,
}

/// A started pipeline whose UI context runs on its own thread.
pub struct LiveSession {
    pub handle: PipelineHandle,
    pub log_path: PathBuf,
    pub ui: JoinHandle<OverlayView>,
}

impl LiveSession {
    pub fn finish(self) -> anyhow::Result<(PipelineReport, OverlayView)> {
        // stopping drops the last notifier, which ends the ui thread
        let report = self.handle.stop();
        let view = self
            .ui
            .join()
            .map_err(|_| anyhow::anyhow!("ui dispatcher thread panicked"))?;
        Ok((report, view))
    }
}

#[derive(Clone)]
pub struct Runner {
    config: WorkflowConfig,
}

impl Runner {
    pub fn new(config: WorkflowConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &WorkflowConfig {
        &self.config
    }

    /// Starts the pipeline, handing each overlay update to `publish` on the
    /// ui thread.
    pub fn start<F>(&self, session: &Session, publish: F) -> anyhow::Result<LiveSession>
    where
        F: FnMut(&OverlayView) + Send + 'static,
    {
        let log_sink = CsvLogSink::new(&self.config.output_dir, session);
        let log_path = log_sink.path().to_path_buf();
        let (notifier, ui_rx) = UiNotifier::channel();

        let player = AssetSoundPlayer::with_output(
            self.config.assets_dir.clone(),
            LoggingOutput::new(self.config.clip_length()),
        )
        .extension(self.config.sound_extension.clone());
        let ui = thread::Builder::new()
            .name("copilot-ui".into())
            .spawn(move || UiDispatcher::new(ui_rx, player).run_publishing(publish))
            .context("spawning ui dispatcher")?;

        let handle = Pipeline::new(self.config.debounce)
            .start(log_sink, notifier)
            .context("starting detection pipeline")?;

        Ok(LiveSession {
            handle,
            log_path,
            ui,
        })
    }

    pub fn execute<S>(&self, source: &mut S, session: &Session) -> anyhow::Result<WorkflowResult>
    where
        S: FrameSource + ?Sized,
    {
        let live = self.start(session, |_| {})?;
        let batches = live.handle.pump(source);
        let log_path = live.log_path.clone();
        let (report, view) = live.finish()?;

        Ok(WorkflowResult {
            report,
            view,
            log_path,
            batches,
        })
    }

    pub fn record_gps(&self, fixes: &[LocationFix], session: &Session) -> GpsSummary {
        let mut recorder = GpsRecorder::new(GpsCsvSink::new(&self.config.output_dir, session));
        for fix in fixes {
            recorder.on_location(*fix);
        }
        GpsSummary {
            fixes: fixes.len(),
            total_distance_m: recorder.total_distance_m(),
            path: recorder.path().to_path_buf(),
        }
    }
}
