use chrono::{DateTime, Local, Timelike, Utc};

use crate::pipeline::identity;
use crate::types::activity::{to_iso, CanonicalActivity, ParsedActivity, ParsedEvent, StreamSet, TrackPoint};
use crate::types::sport::{map_sport, Sport};

const LATLNG_PRECISION: i32 = 8;
const SPLIT_AFTERNOON_AT: u32 = 12;
const SPLIT_EVENING_AT: u32 = 17;

pub fn normalize(event: &ParsedEvent) -> Vec<(CanonicalActivity, StreamSet)> {
    event
        .activities
        .iter()
        .map(|activity| (bare_activity(activity), extract_streams(activity)))
        .collect()
}

pub fn bare_activity(activity: &ParsedActivity) -> CanonicalActivity {
    let sport = map_sport(&activity.sport_label);
    let start_local = activity.start_time.with_timezone(&Local);

    CanonicalActivity {
        id: activity_id(activity.start_time),
        sport_type: sport,
        display_type: sport,
        name: activity_name(start_local.hour(), sport),
        start_time: activity.start_time,
        end_time: activity.end_time,
        distance_raw: activity.distance,
        elevation_gain_raw: activity.ascent,
        has_power_meter: activity.has_power_meter,
        trainer: activity.trainer,
        commute: None,
    }
}

pub fn activity_id(start_time: DateTime<Utc>) -> String {
    identity::hash(to_iso(start_time))
}

pub fn activity_name(hour: u32, sport: Sport) -> String {
    let moment = if (SPLIT_AFTERNOON_AT..=SPLIT_EVENING_AT).contains(&hour) {
        "Afternoon"
    } else if hour > SPLIT_EVENING_AT {
        "Evening"
    } else {
        "Morning"
    };
    format!("{moment} {sport}")
}

/// Each series is extracted on its own; a series no sample carries stays absent.
pub fn extract_streams(activity: &ParsedActivity) -> StreamSet {
    let points = &activity.points;
    let start = activity.start_time;

    let series = |name: &str, read: fn(&TrackPoint) -> Option<f64>| {
        let stream = aligned_by(points, read);
        if stream.is_none() {
            tracing::info!("No {} stream found for activity starting at {}", name, to_iso(start));
        }
        stream
    };

    let time = aligned_by(points, |p| {
        p.time
            .map(|t| (t - start).num_milliseconds() as f64 / 1000.0)
    });
    if time.is_none() {
        tracing::info!("No time stream found for activity starting at {}", to_iso(start));
    }

    let latlng = aligned_by(points, |p| match (p.lat, p.lon) {
        (Some(lat), Some(lon)) => Some([floor_to(lat, LATLNG_PRECISION), floor_to(lon, LATLNG_PRECISION)]),
        _ => None,
    });
    if latlng.is_none() {
        tracing::info!("No lat or lon streams found for activity starting at {}", to_iso(start));
    }

    StreamSet {
        time,
        latlng,
        distance: series("distance", |p| p.distance),
        velocity_smooth: series("speed", |p| p.speed),
        heartrate: series("heartrate", |p| p.heart_rate),
        altitude: series("altitude", |p| p.altitude),
        cadence: series("cadence", |p| p.cadence),
        watts: series("power", |p| p.power),
        ..StreamSet::default()
    }
}

/// One value per point. Gaps take the previous value; leading gaps take the first one.
fn aligned_by<T: Copy>(points: &[TrackPoint], read: impl Fn(&TrackPoint) -> Option<T>) -> Option<Vec<T>> {
    let raw: Vec<Option<T>> = points.iter().map(read).collect();
    let first = raw.iter().flatten().next().copied()?;

    let mut last = first;
    Some(
        raw.into_iter()
            .map(|value| {
                if let Some(value) = value {
                    last = value;
                }
                last
            })
            .collect(),
    )
}

fn floor_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).floor() / factor
}
