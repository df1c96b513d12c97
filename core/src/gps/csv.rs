use std::path::{Path, PathBuf};

use crate::gps::tracker::{GpsTracker, LocationFix, TrackPoint};
use crate::prelude::SinkResult;
use crate::sink::csv::append_with_header;
use crate::sink::notifier::UiNotifier;
use crate::sink::session::Session;
use crate::telemetry::log::LogManager;

pub const LOCATION_PERMISSION_REQUIRED_MESSAGE: &str = "Location permission required";
pub const GPS_CSV_HEADER: &str = "timestamp,latitud,longitud,velocidad,precision,distancia\n";
const GPS_FILE_SUFFIX: &str = "gps_data";

/// Session CSV of track points, header created on first use.
pub struct GpsCsvSink {
    path: PathBuf,
}

impl GpsCsvSink {
    pub fn new(dir: impl AsRef<Path>, session: &Session) -> Self {
        Self {
            path: session.file_in(dir.as_ref(), GPS_FILE_SUFFIX),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn append(&mut self, point: &TrackPoint) -> SinkResult<()> {
        append_with_header(&self.path, GPS_CSV_HEADER, &point.to_csv_line())
    }
}

/// Location callback target: tracks distance and logs every fix. Write
/// failures are reported and swallowed.
///
/// Fixes are only recorded while the location permission is granted; each
/// denial toasts through the notifier when one is attached.
pub struct GpsRecorder {
    tracker: GpsTracker,
    sink: GpsCsvSink,
    logger: LogManager,
    notifier: Option<UiNotifier>,
    permitted: bool,
}

impl GpsRecorder {
    pub fn new(sink: GpsCsvSink) -> Self {
        Self {
            tracker: GpsTracker::new(),
            sink,
            logger: LogManager::new("gps"),
            notifier: None,
            permitted: true,
        }
    }

    pub fn with_notifier(mut self, notifier: UiNotifier) -> Self {
        self.notifier = Some(notifier);
        self
    }

    pub fn on_permission_result(&mut self, granted: bool) {
        self.permitted = granted;
        if granted {
            return;
        }
        log::info!("location permission denied, gps logging paused");
        if let Some(notifier) = &self.notifier {
            notifier.toast(LOCATION_PERMISSION_REQUIRED_MESSAGE);
        }
    }

    pub fn is_permitted(&self) -> bool {
        self.permitted
    }

    /// Returns `None` when the fix was dropped for lack of permission.
    pub fn on_location(&mut self, fix: LocationFix) -> Option<TrackPoint> {
        if !self.permitted {
            log::debug!("dropping fix at {} ms, permission denied", fix.timestamp_ms);
            return None;
        }
        let point = self.tracker.record(fix);
        match self.sink.append(&point) {
            Ok(()) => log::debug!(
                "fix {} lat {} lon {} speed {:.1} km/h distance {:.1} m",
                fix.timestamp_ms,
                fix.latitude,
                fix.longitude,
                point.speed_kmh,
                point.segment_distance_m
            ),
            Err(err) => self.logger.record_failure("writing gps row", &err),
        }
        Some(point)
    }

    pub fn total_distance_m(&self) -> f64 {
        self.tracker.total_distance_m()
    }

    pub fn path(&self) -> &Path {
        self.sink.path()
    }
}
