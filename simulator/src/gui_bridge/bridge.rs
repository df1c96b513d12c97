use crate::gui_bridge::model::VisualizationModel;
use copilotcore::detection::DetectionBatch;
use copilotcore::pipeline::{HostCallbacks, OverlayView, PipelineHandle};
use log::{error, info};
use serde_json::json;
use std::{
    net::SocketAddr,
    sync::{Arc, RwLock, Weak},
    thread,
};
use tokio::runtime::Builder;
use warp::{http::StatusCode, Filter};

/// Shared view the ui thread publishes into and the HTTP bridge serves.
#[derive(Clone, Default)]
pub struct OverlayState {
    view: Arc<RwLock<OverlayView>>,
}

impl OverlayState {
    pub fn publish(&self, view: &OverlayView) {
        if let Ok(mut guard) = self.view.write() {
            *guard = view.clone();
        }
    }

    pub fn current(&self) -> OverlayView {
        self.view
            .read()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }
}

fn model_for(state: &OverlayState, pipeline: &PipelineHandle) -> VisualizationModel {
    VisualizationModel {
        overlay: state.current(),
        alert_state: pipeline.snapshot(),
        metrics: pipeline.metrics(),
    }
}

fn stopped() -> warp::reply::WithStatus<warp::reply::Json> {
    warp::reply::with_status(
        warp::reply::json(&json!({"status": "pipeline stopped"})),
        StatusCode::SERVICE_UNAVAILABLE,
    )
}

/// HTTP bridge: `GET /overlay` serves the current overlay, `POST /ingest`
/// feeds a batch to the pipeline as if the camera had produced it.
///
/// The bridge only holds a weak reference, so the owner can still stop the
/// pipeline while the server thread keeps running.
pub struct GuiBridge {
    state: OverlayState,
}

impl GuiBridge {
    pub fn new(pipeline: Weak<PipelineHandle>, state: OverlayState, addr: SocketAddr) -> Self {
        let state_for_filter = state.clone();
        let state_filter = warp::any().map(move || state_for_filter.clone());
        let pipeline_filter = warp::any().map(move || pipeline.upgrade());

        let get_route = warp::path("overlay")
            .and(warp::get())
            .and(state_filter)
            .and(pipeline_filter.clone())
            .map(|state: OverlayState, pipeline: Option<Arc<PipelineHandle>>| {
                let Some(pipeline) = pipeline else {
                    return stopped();
                };
                warp::reply::with_status(
                    warp::reply::json(&model_for(&state, &pipeline)),
                    StatusCode::OK,
                )
            });

        let post_route = warp::path("ingest")
            .and(warp::post())
            .and(warp::body::json())
            .and(pipeline_filter)
            .map(|batch: DetectionBatch, pipeline: Option<Arc<PipelineHandle>>| {
                let Some(pipeline) = pipeline else {
                    return stopped();
                };
                let accepted = pipeline.is_permitted();
                let detections = batch.len();
                pipeline.on_batch(batch);
                let status = if accepted {
                    StatusCode::ACCEPTED
                } else {
                    StatusCode::FORBIDDEN
                };
                warp::reply::with_status(
                    warp::reply::json(&json!({
                        "accepted": accepted,
                        "detections": detections,
                    })),
                    status,
                )
            });

        thread::spawn(move || {
            let routes = get_route.or(post_route);
            let runtime = match Builder::new_current_thread().enable_all().build() {
                Ok(runtime) => runtime,
                Err(err) => {
                    error!("overlay bridge runtime failed: {}", err);
                    return;
                }
            };
            info!("overlay bridge listening on http://{}", addr);
            runtime.block_on(async move {
                warp::serve(routes).run(addr).await;
            });
        });

        Self { state }
    }

    pub fn publish_status(&self, message: &str) {
        println!("[GUI] {}", message);
    }

    /// Latest overlay the ui thread published.
    pub fn overlay(&self) -> OverlayView {
        self.state.current()
    }
}
