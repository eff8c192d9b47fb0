mod fit;
mod gpx;
mod tcx;

use chrono::{DateTime, TimeDelta, Utc};

use crate::error::ParseError;
use crate::types::activity::{FileFormat, ParsedActivity, ParsedEvent, TrackPoint};

pub const UNKNOWN_SPORT: &str = "Unknown Sport";

pub trait ActivityParser: Send + Sync {
    fn parse(&self, bytes: &[u8], format: FileFormat) -> Result<ParsedEvent, ParseError>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FormatParser;

impl ActivityParser for FormatParser {
    fn parse(&self, bytes: &[u8], format: FileFormat) -> Result<ParsedEvent, ParseError> {
        parse(bytes, format)
    }
}

pub fn parse(bytes: &[u8], format: FileFormat) -> Result<ParsedEvent, ParseError> {
    let event = match format {
        FileFormat::Gpx => gpx::parse(bytes)?,
        FileFormat::Tcx => tcx::parse(bytes)?,
        FileFormat::Fit => fit::parse(bytes)?,
    };

    if event.activities.is_empty() {
        return Err(ParseError::EmptyFile);
    }
    Ok(event)
}

#[derive(Debug, Default)]
pub(crate) struct ActivityDraft {
    pub sport_label: Option<String>,
    pub points: Vec<TrackPoint>,
    pub start_time: Option<DateTime<Utc>>,
    pub elapsed_seconds: Option<f64>,
    pub distance: Option<f64>,
    pub ascent: Option<f64>,
}

impl ActivityDraft {
    /// Fills missing distance and speed channels and settles the activity totals.
    /// Drafts without any timestamp cannot be placed in time and are dropped.
    pub fn finish(mut self) -> Result<Option<ParsedActivity>, ParseError> {
        self.points.retain(|point| point.time.is_some());
        let first_time = self.points.first().and_then(|p| p.time);
        let last_time = self.points.last().and_then(|p| p.time);

        let Some(start_time) = self.start_time.or(first_time) else {
            return Ok(None);
        };
        let end_time = match (self.elapsed_seconds, last_time) {
            (Some(elapsed), _) => offset_by(start_time, elapsed)?,
            (None, Some(last)) => last,
            (None, None) => start_time,
        };

        fill_distance(&mut self.points);
        fill_speed(&mut self.points);

        let distance = self
            .distance
            .or_else(|| self.points.iter().rev().find_map(|p| p.distance))
            .unwrap_or(0.0);
        let ascent = self.ascent.unwrap_or_else(|| elevation_gain(&self.points));
        let has_power_meter = self.points.iter().any(|p| p.power.is_some_and(|w| w > 0.0));

        let sport_label = self.sport_label.unwrap_or_else(|| UNKNOWN_SPORT.to_string());
        let trainer = is_trainer_label(&sport_label);

        Ok(Some(ParsedActivity {
            sport_label,
            start_time,
            end_time,
            points: self.points,
            distance,
            ascent,
            has_power_meter,
            trainer,
        }))
    }
}

/// Elapsed times that are negative, not finite or past the calendar are malformed input.
pub(crate) fn offset_by(start: DateTime<Utc>, seconds: f64) -> Result<DateTime<Utc>, ParseError> {
    let millis = (seconds * 1000.0).round();
    if !millis.is_finite() || millis < 0.0 || millis >= i64::MAX as f64 {
        return Err(ParseError::InvalidDuration(seconds));
    }

    TimeDelta::try_milliseconds(millis as i64)
        .and_then(|delta| start.checked_add_signed(delta))
        .ok_or(ParseError::InvalidDuration(seconds))
}

fn is_trainer_label(label: &str) -> bool {
    matches!(
        label,
        "Indoor Cycling"
            | "Indoor Rowing"
            | "Indoor Running"
            | "Indoor Training"
            | "Treadmill"
            | "Virtual Cycling"
            | "Virtual Running"
    )
}

/// Cumulative haversine distance, only when the recording carries none.
fn fill_distance(points: &mut [TrackPoint]) {
    if points.iter().any(|p| p.distance.is_some()) {
        return;
    }
    if !points.iter().any(|p| p.lat.is_some() && p.lon.is_some()) {
        return;
    }

    let mut total = 0.0;
    let mut last_position: Option<(f64, f64)> = None;
    for point in points.iter_mut() {
        if let (Some(lat), Some(lon)) = (point.lat, point.lon) {
            if let Some((prev_lat, prev_lon)) = last_position {
                total += haversine_distance(prev_lat, prev_lon, lat, lon);
            }
            last_position = Some((lat, lon));
        }
        point.distance = Some(total);
    }
}

/// Speed from distance and time deltas, only when the recording carries none.
fn fill_speed(points: &mut [TrackPoint]) {
    if points.iter().any(|p| p.speed.is_some()) {
        return;
    }
    if !points.iter().any(|p| p.distance.is_some()) {
        return;
    }

    let mut speeds = vec![None; points.len()];
    for i in 1..points.len() {
        let (prev, curr) = (&points[i - 1], &points[i]);
        if let (Some(t0), Some(t1), Some(d0), Some(d1)) = (prev.time, curr.time, prev.distance, curr.distance) {
            let seconds = (t1 - t0).num_milliseconds() as f64 / 1000.0;
            speeds[i] = Some(if seconds > f64::EPSILON {
                ((d1 - d0) / seconds).max(0.0)
            } else {
                0.0
            });
        }
    }
    if points.len() > 1 {
        speeds[0] = Some(0.0);
    }

    for (point, speed) in points.iter_mut().zip(speeds) {
        point.speed = speed;
    }
}

fn elevation_gain(points: &[TrackPoint]) -> f64 {
    let altitudes: Vec<f64> = points.iter().filter_map(|p| p.altitude).collect();
    altitudes
        .windows(2)
        .map(|pair| (pair[1] - pair[0]).max(0.0))
        .sum()
}

pub(crate) fn haversine_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    const R: f64 = 6_371_000.0;

    let d_lat = (lat2 - lat1).to_radians();
    let d_lon = (lon2 - lon1).to_radians();

    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lon / 2.0).sin().powi(2);

    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    R * c
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(secs: i64, lat: f64, lon: f64, alt: f64) -> TrackPoint {
        TrackPoint {
            time: Some(DateTime::from_timestamp(1_700_000_000 + secs, 0).unwrap()),
            lat: Some(lat),
            lon: Some(lon),
            altitude: Some(alt),
            ..TrackPoint::default()
        }
    }

    #[test]
    fn finish_derives_distance_speed_and_gain() {
        let draft = ActivityDraft {
            sport_label: Some("Running".into()),
            points: vec![
                point(0, 45.0, 6.0, 100.0),
                point(10, 45.0005, 6.0, 104.0),
                point(20, 45.001, 6.0, 102.0),
                point(30, 45.0015, 6.0, 107.0),
            ],
            ..ActivityDraft::default()
        };

        let activity = draft.finish().unwrap().unwrap();
        let distances: Vec<f64> = activity.points.iter().map(|p| p.distance.unwrap()).collect();
        assert_eq!(distances[0], 0.0);
        assert!((distances[1] - 55.6).abs() < 0.5, "{distances:?}");
        assert!((activity.distance - distances[3]).abs() < 1e-9);

        let speed = activity.points[2].speed.unwrap();
        assert!((speed - 5.56).abs() < 0.05, "{speed}");
        assert_eq!(activity.ascent, 9.0);
        assert_eq!(activity.duration_seconds(), 30.0);
        assert!(!activity.has_power_meter);
        assert!(!activity.trainer);
    }

    #[test]
    fn finish_prefers_recorded_totals() {
        let mut points = vec![point(0, 45.0, 6.0, 100.0), point(60, 45.01, 6.0, 120.0)];
        points[1].power = Some(210.0);
        let draft = ActivityDraft {
            sport_label: Some("Virtual Cycling".into()),
            points,
            elapsed_seconds: Some(90.0),
            distance: Some(1234.0),
            ascent: Some(15.0),
            ..ActivityDraft::default()
        };

        let activity = draft.finish().unwrap().unwrap();
        assert_eq!(activity.distance, 1234.0);
        assert_eq!(activity.ascent, 15.0);
        assert_eq!(activity.duration_seconds(), 90.0);
        assert!(activity.has_power_meter);
        assert!(activity.trainer);
    }

    #[test]
    fn finish_drops_untimed_drafts() {
        let draft = ActivityDraft {
            points: vec![TrackPoint {
                lat: Some(1.0),
                lon: Some(2.0),
                ..TrackPoint::default()
            }],
            ..ActivityDraft::default()
        };
        assert!(draft.finish().unwrap().is_none());
    }

    #[test]
    fn missing_label_is_unknown_sport() {
        let draft = ActivityDraft {
            points: vec![point(0, 1.0, 1.0, 1.0)],
            ..ActivityDraft::default()
        };
        assert_eq!(draft.finish().unwrap().unwrap().sport_label, UNKNOWN_SPORT);
    }

    #[test]
    fn absurd_elapsed_time_is_rejected() {
        for elapsed in [1e20, f64::INFINITY, f64::NAN, -5.0] {
            let draft = ActivityDraft {
                points: vec![point(0, 1.0, 1.0, 1.0)],
                elapsed_seconds: Some(elapsed),
                ..ActivityDraft::default()
            };
            assert!(
                matches!(draft.finish(), Err(ParseError::InvalidDuration(_))),
                "{elapsed}"
            );
        }
    }

    #[test]
    fn offset_keeps_milliseconds() {
        let start = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        let end = offset_by(start, 12.345).unwrap();
        assert_eq!((end - start).num_milliseconds(), 12_345);
    }
}
