use anyhow::Context;
use clap::Parser;
use copilotcore::sink::Session;
use generator::profile::{GeneratorConfig, SyntheticSource};
use generator::replay::{load_fixes, ReplaySource};
use gui_bridge::bridge::{GuiBridge, OverlayState};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::runtime::Builder as TokioBuilder;
use tokio::signal;
use workflow::config::WorkflowConfig;
use workflow::runner::Runner;

mod generator;
mod gui_bridge;
mod workflow;

const DEFAULT_COUNT: usize = 120;
const DEFAULT_SEED: u64 = 0;

#[derive(Parser)]
#[command(author, version, about = "Offline driver for the co-pilot alert pipeline")]
struct Args {
    /// Replay detection batches from a JSON-lines file
    #[arg(long)]
    batches: Option<PathBuf>,
    /// Replay GPS fixes from a JSON-lines file into the session GPS log
    #[arg(long)]
    gps: Option<PathBuf>,
    /// Load a workflow config from YAML
    #[arg(long)]
    workflow: Option<PathBuf>,
    #[arg(long)]
    cooldown_ms: Option<u64>,
    #[arg(long)]
    threshold: Option<f32>,
    #[arg(long)]
    output_dir: Option<PathBuf>,
    #[arg(long)]
    assets_dir: Option<PathBuf>,
    /// Synthetic batches to generate when no replay file is given
    #[arg(long, default_value_t = DEFAULT_COUNT)]
    count: usize,
    #[arg(long, default_value_t = DEFAULT_SEED)]
    seed: u64,
    /// Keep an HTTP overlay bridge alive for live batches
    #[arg(long, default_value_t = false)]
    serve: bool,
}

impl Args {
    fn workflow_config(&self) -> anyhow::Result<WorkflowConfig> {
        let mut config = match &self.workflow {
            Some(path) => WorkflowConfig::load(path)?,
            None => WorkflowConfig::default(),
        };
        if let Some(cooldown_ms) = self.cooldown_ms {
            config.debounce.cooldown_ms = cooldown_ms;
        }
        if let Some(threshold) = self.threshold {
            config.debounce.confidence_threshold = threshold;
        }
        if let Some(dir) = &self.output_dir {
            config.output_dir = dir.clone();
        }
        if let Some(dir) = &self.assets_dir {
            config.assets_dir = dir.clone();
        }
        config.validate()?;
        Ok(config)
    }

    /// Offline-run flags that have no effect on a live bridge session.
    fn ignored_by_serve(&self) -> Vec<&'static str> {
        let mut ignored = Vec::new();
        if self.batches.is_some() {
            ignored.push("--batches");
        }
        if self.count != DEFAULT_COUNT {
            ignored.push("--count");
        }
        if self.seed != DEFAULT_SEED {
            ignored.push("--seed");
        }
        ignored
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let workflow_config = args.workflow_config()?;
    let runner = Runner::new(workflow_config.clone());
    let session = Session::start_now();

    if let Some(path) = &args.gps {
        let fixes = load_fixes(path)?;
        let summary = runner.record_gps(&fixes, &session);
        println!(
            "GPS -> fixes {}, distance {:.1} m, log {}",
            summary.fixes,
            summary.total_distance_m,
            summary.path.display()
        );
    }

    if args.serve {
        let ignored = args.ignored_by_serve();
        if !ignored.is_empty() {
            anyhow::bail!("--serve takes batches over HTTP; drop {}", ignored.join(", "));
        }
        return serve(&runner, &session);
    }

    let result = match &args.batches {
        Some(path) => runner.execute(&mut ReplaySource::load(path)?, &session)?,
        None => {
            let generator = GeneratorConfig {
                batches: args.count,
                seed: args.seed,
                ..Default::default()
            };
            runner.execute(&mut SyntheticSource::new(generator), &session)?
        }
    };

    let metrics = &result.report.metrics;
    println!(
        "Offline run -> batches {}, alerts {}, suppressed {}, rows {}, sink errors {}, sounds played {}",
        result.batches,
        metrics.alerts,
        metrics.suppressed,
        metrics.log_rows,
        metrics.sink_errors,
        result.view.alerts_played
    );
    println!("Detection log: {}", result.log_path.display());

    let report = format!(
        "session={} batches={} alerts={} suppressed={} rows={} mean_inference_ms={:.1} last_alert={:?}\n",
        session.stamp(),
        result.batches,
        metrics.alerts,
        metrics.suppressed,
        metrics.log_rows,
        metrics.mean_inference_ms,
        result.report.state.last_alert_class_name
    );
    let report_path = workflow_config.output_dir.join("offline_runs.log");
    if let Some(parent) = report_path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&report_path)
        .with_context(|| format!("opening run report {}", report_path.display()))?;
    file.write_all(report.as_bytes())?;

    Ok(())
}

fn serve(runner: &Runner, session: &Session) -> anyhow::Result<()> {
    let state = OverlayState::default();
    let publisher = state.clone();
    let live = runner.start(session, move |view| publisher.publish(view))?;
    let handle = Arc::new(live.handle);
    let gui_bridge = GuiBridge::new(
        Arc::downgrade(&handle),
        state,
        runner.config().bridge_addr,
    );
    gui_bridge.publish_status("HTTP bridge running (Ctrl+C to stop)...");

    let runtime = TokioBuilder::new_current_thread()
        .enable_all()
        .build()
        .context("creating runtime for signal handling")?;
    runtime.block_on(async {
        signal::ctrl_c().await.context("awaiting Ctrl+C to exit")?;
        Ok::<(), anyhow::Error>(())
    })?;

    let metrics = handle.metrics();
    // an in-flight request may still hold the pipeline; it stops on last drop
    if let Ok(handle) = Arc::try_unwrap(handle) {
        handle.stop();
    }
    let overlay = gui_bridge.overlay();
    gui_bridge.publish_status(&format!(
        "stopped after {} batches, {} alerts, {} sounds played; log {}",
        metrics.batches,
        metrics.alerts,
        overlay.alerts_played,
        live.log_path.display()
    ));
    Ok(())
}
