use chrono::{DateTime, Utc};
use fitparser::profile::MesgNum;
use fitparser::{FitDataRecord, Value};

use crate::error::ParseError;
use crate::pipeline::parse::{offset_by, ActivityDraft};
use crate::types::activity::{ParsedEvent, TrackPoint};

#[derive(Debug, Default)]
struct Session {
    start_time: Option<DateTime<Utc>>,
    elapsed_seconds: Option<f64>,
    distance: Option<f64>,
    ascent: Option<f64>,
    sport: Option<String>,
    sub_sport: Option<String>,
}

/// One activity per `session` message. Files without sessions yield a single activity
/// built from every `record`.
pub(crate) fn parse(bytes: &[u8]) -> Result<ParsedEvent, ParseError> {
    let data = fitparser::from_bytes(bytes)
        .map_err(|e| ParseError::InvalidFit(format!("Failed to parse FIT file: {}", e)))?;

    let mut points = Vec::new();
    let mut sessions = Vec::new();
    let mut file_sport = Session::default();

    for record in &data {
        match record.kind() {
            MesgNum::Record => points.push(read_point(record)),
            MesgNum::Session => sessions.push(read_session(record)),
            MesgNum::Sport => file_sport = read_session(record),
            _ => {}
        }
    }

    let activities = if sessions.is_empty() {
        let draft = ActivityDraft {
            sport_label: Some(sport_label(file_sport.sport.as_deref(), file_sport.sub_sport.as_deref()).to_string()),
            points,
            ..ActivityDraft::default()
        };
        draft.finish()?.into_iter().collect()
    } else {
        let last = sessions.len() - 1;
        let mut activities = Vec::new();
        for (index, session) in sessions.into_iter().enumerate() {
            activities.extend(session_draft(session, &points, index == last)?.finish()?);
        }
        activities
    };

    Ok(ParsedEvent { activities })
}

/// Sessions own `[start, end)`; the last one also keeps a record stamped at its end.
fn session_draft(
    session: Session,
    points: &[TrackPoint],
    is_last: bool,
) -> Result<ActivityDraft, ParseError> {
    let end_time = match (session.start_time, session.elapsed_seconds) {
        (Some(start), Some(elapsed)) => Some(offset_by(start, elapsed)?),
        _ => None,
    };

    let session_points = points
        .iter()
        .filter(|point| match (point.time, session.start_time, end_time) {
            (Some(time), Some(start), Some(end)) => {
                time >= start && (time < end || (is_last && time == end))
            }
            _ => true,
        })
        .cloned()
        .collect();

    Ok(ActivityDraft {
        sport_label: Some(sport_label(session.sport.as_deref(), session.sub_sport.as_deref()).to_string()),
        points: session_points,
        start_time: session.start_time,
        elapsed_seconds: session.elapsed_seconds,
        distance: session.distance,
        ascent: session.ascent,
    })
}

fn read_point(record: &FitDataRecord) -> TrackPoint {
    let mut point = TrackPoint::default();

    for field in record.fields() {
        let value = field.value();
        match field.name() {
            "timestamp" => point.time = as_time(value),
            "position_lat" => point.lat = as_f64(value).map(semicircles_to_degrees),
            "position_long" => point.lon = as_f64(value).map(semicircles_to_degrees),
            "distance" => point.distance = as_f64(value),
            "speed" | "enhanced_speed" => point.speed = as_f64(value).or(point.speed),
            "altitude" | "enhanced_altitude" => point.altitude = as_f64(value).or(point.altitude),
            "heart_rate" => point.heart_rate = as_f64(value),
            "cadence" => point.cadence = as_f64(value),
            "power" => point.power = as_f64(value),
            _ => {}
        }
    }

    point
}

fn read_session(record: &FitDataRecord) -> Session {
    let mut session = Session::default();

    for field in record.fields() {
        let value = field.value();
        match field.name() {
            "start_time" => session.start_time = as_time(value),
            "total_elapsed_time" => session.elapsed_seconds = as_f64(value),
            "total_distance" => session.distance = as_f64(value),
            "total_ascent" => session.ascent = as_f64(value),
            "sport" => session.sport = as_name(value, sport_name),
            "sub_sport" => session.sub_sport = as_name(value, sub_sport_name),
            _ => {}
        }
    }

    session
}

fn as_time(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::Timestamp(time) => Some(time.with_timezone(&Utc)),
        _ => None,
    }
}

fn as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Float64(v) => Some(*v),
        Value::Float32(v) => Some(*v as f64),
        Value::SInt8(v) => Some(*v as f64),
        Value::UInt8(v) | Value::UInt8z(v) | Value::Byte(v) => Some(*v as f64),
        Value::SInt16(v) => Some(*v as f64),
        Value::UInt16(v) | Value::UInt16z(v) => Some(*v as f64),
        Value::SInt32(v) => Some(*v as f64),
        Value::UInt32(v) | Value::UInt32z(v) => Some(*v as f64),
        Value::SInt64(v) => Some(*v as f64),
        Value::UInt64(v) | Value::UInt64z(v) => Some(*v as f64),
        _ => None,
    }
}

/// Profile enums decode to their names; raw codes fall back to `names`.
fn as_name(value: &Value, names: fn(u8) -> Option<&'static str>) -> Option<String> {
    match value {
        Value::String(name) => Some(name.clone()),
        Value::Enum(code) => names(*code).map(str::to_string),
        _ => None,
    }
}

fn sport_name(code: u8) -> Option<&'static str> {
    match code {
        0 => Some("generic"),
        1 => Some("running"),
        2 => Some("cycling"),
        4 => Some("fitness_equipment"),
        5 => Some("swimming"),
        10 => Some("training"),
        11 => Some("walking"),
        12 => Some("cross_country_skiing"),
        13 => Some("alpine_skiing"),
        15 => Some("rowing"),
        17 => Some("hiking"),
        21 => Some("e_biking"),
        _ => None,
    }
}

fn sub_sport_name(code: u8) -> Option<&'static str> {
    match code {
        1 => Some("treadmill"),
        3 => Some("trail"),
        6 => Some("indoor_cycling"),
        8 => Some("mountain"),
        14 => Some("indoor_rowing"),
        15 => Some("elliptical"),
        18 => Some("open_water"),
        20 => Some("strength_training"),
        43 => Some("yoga"),
        45 => Some("indoor_running"),
        58 => Some("virtual_activity"),
        _ => None,
    }
}

fn sport_label(sport: Option<&str>, sub_sport: Option<&str>) -> &'static str {
    match (sport.unwrap_or_default(), sub_sport.unwrap_or_default()) {
        ("running", "treadmill") => "Treadmill",
        ("running", "trail") => "Trail Running",
        ("running", "indoor_running") => "Indoor Running",
        ("running", "virtual_activity") => "Virtual Running",
        ("running", _) => "Running",
        ("cycling", "indoor_cycling") => "Indoor Cycling",
        ("cycling", "virtual_activity") => "Virtual Cycling",
        ("cycling", "mountain") => "Mountain Biking",
        ("cycling", "e_bike_fitness" | "e_bike_mountain") | ("e_biking", _) => "E-Bike Ride",
        ("cycling", _) => "Cycling",
        ("swimming", "open_water") => "Open Water Swimming",
        ("swimming", _) => "Swimming",
        ("rowing", "indoor_rowing") | ("fitness_equipment", "indoor_rowing") => "Indoor Rowing",
        ("rowing", _) => "Rowing",
        ("fitness_equipment", "elliptical") => "Elliptical Trainer",
        ("fitness_equipment", "stair_climbing") => "Stair Stepper",
        ("fitness_equipment", _) => "Fitness Equipment",
        ("training", "strength_training") => "Strength Training",
        ("training", "yoga") => "Yoga",
        ("training", _) => "Training",
        ("walking", _) => "Walking",
        ("hiking", _) => "Hiking",
        ("cross_country_skiing", _) => "Cross Country Skiing",
        ("alpine_skiing", _) => "Alpine Skiing",
        ("snowboarding", _) => "Snowboarding",
        ("snowshoeing", _) => "Snowshoeing",
        ("mountaineering", _) => "Mountaineering",
        ("rock_climbing", _) => "Rock Climbing",
        ("kayaking", _) => "Kayaking",
        ("paddling", _) => "Paddling",
        ("stand_up_paddleboarding", _) => "Stand Up Paddling",
        ("sailing", _) => "Sailing",
        ("surfing", _) => "Surfing",
        ("windsurfing", _) => "Windsurfing",
        ("kitesurfing", _) => "Kitesurfing",
        ("inline_skating", _) => "Inline Skating",
        ("ice_skating", _) => "Ice Skating",
        ("tennis", _) => "Tennis",
        ("soccer", _) => "Soccer",
        ("golf", _) => "Golf",
        ("generic", _) => "Generic",
        _ => super::UNKNOWN_SPORT,
    }
}

fn semicircles_to_degrees(semicircles: f64) -> f64 {
    semicircles * (180.0 / 2_147_483_648.0)
}
