use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::sport::Sport;

/// One recorded sample, as decoded from a recording. Every channel is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrackPoint {
    pub time: Option<DateTime<Utc>>,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub distance: Option<f64>,
    pub speed: Option<f64>,
    pub heart_rate: Option<f64>,
    pub altitude: Option<f64>,
    pub cadence: Option<f64>,
    pub power: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileFormat {
    Gpx,
    Tcx,
    Fit,
}

impl FileFormat {
    /// Matches the canonical lowercase extension only; `RIDE.FIT` is not picked up.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext {
            "gpx" => Some(FileFormat::Gpx),
            "tcx" => Some(FileFormat::Tcx),
            "fit" => Some(FileFormat::Fit),
            _ => None,
        }
    }

    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
    }
}

/// A recording discovered on disk during one scan pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityFile {
    pub format: FileFormat,
    pub host_id: String,
    pub path: PathBuf,
    pub last_modified: DateTime<Utc>,
    pub hash: String,
}

impl ActivityFile {
    /// Identity used by file-level change tracking.
    pub fn identity(&self) -> (&str, &Path, &str) {
        (&self.host_id, &self.path, &self.hash)
    }
}

/// Output of a format decoder: zero or more logical activities.
#[derive(Debug, Clone, Default)]
pub struct ParsedEvent {
    pub activities: Vec<ParsedActivity>,
}

#[derive(Debug, Clone)]
pub struct ParsedActivity {
    /// Label from the shared external sport vocabulary.
    pub sport_label: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub points: Vec<TrackPoint>,
    pub distance: f64,
    pub ascent: f64,
    pub has_power_meter: bool,
    pub trainer: bool,
}

impl ParsedActivity {
    pub fn duration_seconds(&self) -> f64 {
        duration_seconds(self.start_time, self.end_time)
    }
}

/// Format-independent activity, before streams or derived data are attached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalActivity {
    pub id: String,
    pub sport_type: Sport,
    pub display_type: Sport,
    pub name: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub distance_raw: f64,
    pub elevation_gain_raw: f64,
    pub has_power_meter: bool,
    pub trainer: bool,
    /// Not derivable from recording files.
    pub commute: Option<bool>,
}

impl CanonicalActivity {
    pub fn duration_seconds(&self) -> f64 {
        duration_seconds(self.start_time, self.end_time)
    }

    pub fn start_time_iso(&self) -> String {
        to_iso(self.start_time)
    }
}

/// Time-aligned series for one activity. `None` means the series is unavailable;
/// present series share the length of `time`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StreamSet {
    pub time: Option<Vec<f64>>,
    pub latlng: Option<Vec<[f64; 2]>>,
    pub distance: Option<Vec<f64>>,
    pub velocity_smooth: Option<Vec<f64>>,
    pub heartrate: Option<Vec<f64>>,
    pub altitude: Option<Vec<f64>>,
    pub cadence: Option<Vec<f64>>,
    pub watts: Option<Vec<f64>>,
    pub grade_smooth: Option<Vec<f64>>,
    pub grade_adjusted_speed: Option<Vec<f64>>,
    pub watts_calc: Option<Vec<f64>>,
}

pub fn to_iso(time: DateTime<Utc>) -> String {
    time.to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}

fn duration_seconds(start: DateTime<Utc>, end: DateTime<Utc>) -> f64 {
    (end - start).num_milliseconds() as f64 / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_match_is_case_sensitive() {
        assert_eq!(FileFormat::from_extension("gpx"), Some(FileFormat::Gpx));
        assert_eq!(FileFormat::from_extension("tcx"), Some(FileFormat::Tcx));
        assert_eq!(FileFormat::from_extension("fit"), Some(FileFormat::Fit));
        assert_eq!(FileFormat::from_extension("FIT"), None);
        assert_eq!(FileFormat::from_extension("zip"), None);
        assert_eq!(FileFormat::from_path(Path::new("/a/b/run.gpx")), Some(FileFormat::Gpx));
        assert_eq!(FileFormat::from_path(Path::new("/a/b/gpx")), None);
    }

    #[test]
    fn iso_keeps_milliseconds() {
        let t = "2024-03-01T07:15:02.250Z".parse::<DateTime<Utc>>().unwrap();
        assert_eq!(to_iso(t), "2024-03-01T07:15:02.250Z");
    }
}
