use serde::{Deserialize, Serialize};

use crate::math::geo::GeoHelper;

const MPS_TO_KMH: f64 = 3.6;

/// A position report from the location provider.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LocationFix {
    pub timestamp_ms: u64,
    pub latitude: f64,
    pub longitude: f64,
    /// Ground speed in metres per second.
    #[serde(default)]
    pub speed_mps: f64,
    /// Horizontal accuracy radius in metres.
    #[serde(default)]
    pub accuracy_m: f64,
}

/// A fix enriched with derived speed and distance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrackPoint {
    pub fix: LocationFix,
    pub speed_kmh: f64,
    pub segment_distance_m: f64,
    pub total_distance_m: f64,
}

impl TrackPoint {
    pub fn to_csv_line(&self) -> String {
        format!(
            "{},{},{},{},{},{}\n",
            self.fix.timestamp_ms,
            self.fix.latitude,
            self.fix.longitude,
            self.speed_kmh,
            self.fix.accuracy_m,
            self.segment_distance_m
        )
    }
}

/// Accumulates distance over consecutive fixes.
#[derive(Debug, Default)]
pub struct GpsTracker {
    last_fix: Option<LocationFix>,
    total_distance_m: f64,
}

impl GpsTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, fix: LocationFix) -> TrackPoint {
        let segment_distance_m = self.last_fix.map_or(0.0, |previous| {
            GeoHelper::haversine_m(
                previous.latitude,
                previous.longitude,
                fix.latitude,
                fix.longitude,
            )
        });
        self.total_distance_m += segment_distance_m;
        self.last_fix = Some(fix);

        TrackPoint {
            fix,
            speed_kmh: fix.speed_mps * MPS_TO_KMH,
            segment_distance_m,
            total_distance_m: self.total_distance_m,
        }
    }

    pub fn total_distance_m(&self) -> f64 {
        self.total_distance_m
    }
}
