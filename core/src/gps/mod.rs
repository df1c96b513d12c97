pub mod csv;
pub mod tracker;

pub use self::csv::{GpsCsvSink, GpsRecorder, GPS_CSV_HEADER, LOCATION_PERMISSION_REQUIRED_MESSAGE};
pub use tracker::{GpsTracker, LocationFix, TrackPoint};
