use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};
use std::thread::{self, JoinHandle};

use serde::Serialize;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::debounce::{AlertDebouncer, DebouncerState, Decision, LogRow, StateSnapshot};
use crate::detection::DetectionBatch;
use crate::prelude::{DebounceConfig, FrameSource, LogSink};
use crate::sink::UiNotifier;
use crate::telemetry::log::LogManager;
use crate::telemetry::metrics::{MetricsRecorder, MetricsSnapshot};

/// Builds the detection pipeline: one debouncing worker plus one log writer.
pub struct Pipeline {
    config: DebounceConfig,
}

impl Pipeline {
    pub fn new(config: DebounceConfig) -> Self {
        Self { config }
    }

    /// Spawns the worker and log writer threads.
    ///
    /// The worker is the only owner of the [`DebouncerState`]; it publishes a
    /// copy after every batch for readers on other threads.
    pub fn start<L>(self, log_sink: L, notifier: UiNotifier) -> std::io::Result<PipelineHandle>
    where
        L: LogSink + 'static,
    {
        let (batch_tx, batch_rx) = mpsc::unbounded_channel::<DetectionBatch>();
        let (rows_tx, rows_rx) = mpsc::unbounded_channel::<Vec<LogRow>>();
        let snapshot = Arc::new(RwLock::new(StateSnapshot::default()));
        let metrics = Arc::new(MetricsRecorder::new());

        let log_writer = thread::Builder::new()
            .name("copilot-log-writer".into())
            .spawn({
                let metrics = metrics.clone();
                move || run_log_writer(log_sink, rows_rx, metrics)
            })?;

        let worker = thread::Builder::new()
            .name("copilot-detector".into())
            .spawn({
                let worker = Worker {
                    debouncer: AlertDebouncer::new(self.config),
                    state: DebouncerState::new(),
                    notifier,
                    rows_tx,
                    snapshot: snapshot.clone(),
                    metrics: metrics.clone(),
                    logger: LogManager::new("detector"),
                };
                move || worker.run(batch_rx)
            })?;

        Ok(PipelineHandle {
            batch_tx: Some(batch_tx),
            worker: Some(worker),
            log_writer: Some(log_writer),
            snapshot,
            metrics,
            permitted: AtomicBool::new(true),
        })
    }
}

struct Worker {
    debouncer: AlertDebouncer,
    state: DebouncerState,
    notifier: UiNotifier,
    rows_tx: UnboundedSender<Vec<LogRow>>,
    snapshot: Arc<RwLock<StateSnapshot>>,
    metrics: Arc<MetricsRecorder>,
    logger: LogManager,
}

impl Worker {
    fn run(mut self, mut batch_rx: UnboundedReceiver<DetectionBatch>) {
        while let Some(batch) = batch_rx.blocking_recv() {
            self.handle(batch);
        }
        self.logger.record("batch source closed, worker exiting");
    }

    fn handle(&mut self, batch: DetectionBatch) {
        let decision = self
            .debouncer
            .process(&batch, batch.captured_at_ms, &mut self.state);
        let loud = batch
            .best()
            .map_or(false, |best| self.debouncer.config().is_loud(best.score()));
        self.metrics
            .record_decision(&decision, batch.inference_time_ms, loud);
        self.logger.record_decision(&decision);

        match decision {
            Decision::Clear => self.notifier.clear(),
            Decision::Detected(detections) => {
                self.notifier.overlay(detections.overlay_boxes);
                if let Some(class_name) = detections.alerted_class {
                    self.notifier.alert(class_name, detections.best.score());
                    self.publish_snapshot();
                }
                if self.rows_tx.send(detections.log_rows).is_err() {
                    self.metrics.record_sink_error();
                }
            }
        }
    }

    fn publish_snapshot(&self) {
        if let Ok(mut guard) = self.snapshot.write() {
            *guard = self.state.snapshot();
        }
    }
}

fn run_log_writer<L: LogSink>(
    mut sink: L,
    mut rows_rx: UnboundedReceiver<Vec<LogRow>>,
    metrics: Arc<MetricsRecorder>,
) {
    let logger = LogManager::new("log-writer");
    while let Some(rows) = rows_rx.blocking_recv() {
        if let Err(err) = sink.append(&rows) {
            metrics.record_sink_error();
            logger.record_failure("appending detection rows", &err);
        }
    }
    if let Err(err) = sink.flush() {
        logger.record_failure("flushing detection log", &err);
    }
}

/// Final counters and alert state once the pipeline has stopped.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PipelineReport {
    pub metrics: MetricsSnapshot,
    pub state: StateSnapshot,
}

/// Producer-side handle. Dropping it stops the pipeline.
pub struct PipelineHandle {
    batch_tx: Option<UnboundedSender<DetectionBatch>>,
    worker: Option<JoinHandle<()>>,
    log_writer: Option<JoinHandle<()>>,
    snapshot: Arc<RwLock<StateSnapshot>>,
    metrics: Arc<MetricsRecorder>,
    pub(crate) permitted: AtomicBool,
}

impl PipelineHandle {
    /// Queues a batch for the worker. Returns false once stopped.
    pub fn submit(&self, batch: DetectionBatch) -> bool {
        match &self.batch_tx {
            Some(tx) => tx.send(batch).is_ok(),
            None => false,
        }
    }

    /// Drains a source into the pipeline, returning how many batches were queued.
    pub fn pump<S: FrameSource + ?Sized>(&self, source: &mut S) -> usize {
        let mut queued = 0;
        while let Some(batch) = source.next_batch() {
            if !self.submit(batch) {
                break;
            }
            queued += 1;
        }
        queued
    }

    pub fn snapshot(&self) -> StateSnapshot {
        self.snapshot
            .read()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    pub fn is_permitted(&self) -> bool {
        self.permitted.load(Ordering::SeqCst)
    }

    /// Stops batch production and waits for queued batches and rows to drain.
    pub fn stop(mut self) -> PipelineReport {
        self.shutdown();
        PipelineReport {
            metrics: self.metrics.snapshot(),
            state: self.snapshot(),
        }
    }

    fn shutdown(&mut self) {
        self.batch_tx.take();
        let logger = LogManager::new("pipeline");
        // the worker owns the rows sender, so the writer drains after it
        for handle in [self.worker.take(), self.log_writer.take()]
            .into_iter()
            .flatten()
        {
            if handle.join().is_err() {
                logger.record("pipeline thread panicked");
            }
        }
    }
}

impl Drop for PipelineHandle {
    fn drop(&mut self) {
        self.shutdown();
    }
}
