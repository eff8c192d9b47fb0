use chrono::{DateTime, Utc};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::error::ParseError;
use crate::pipeline::parse::ActivityDraft;
use crate::types::activity::{ParsedEvent, TrackPoint};

pub(crate) fn parse(bytes: &[u8]) -> Result<ParsedEvent, ParseError> {
    let mut reader = Reader::from_reader(bytes);
    reader.trim_text(true);

    let mut activities = Vec::new();
    let mut track: Option<ActivityDraft> = None;
    let mut current_point: Option<TrackPoint> = None;
    let mut current_element = String::new();
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                let name = local_name(&e)?;
                match name.as_str() {
                    "trk" => track = Some(ActivityDraft::default()),
                    "trkpt" => current_point = Some(start_point(&e)?),
                    _ => current_element = name,
                }
            }
            Ok(Event::Empty(e)) => {
                if local_name(&e)? == "trkpt" {
                    let point = start_point(&e)?;
                    if let Some(track) = track.as_mut() {
                        track.points.push(point);
                    }
                }
            }
            Ok(Event::Text(e)) => {
                let text = e
                    .unescape()
                    .map_err(|e| ParseError::InvalidGpx(e.to_string()))?;

                if let Some(point) = current_point.as_mut() {
                    match current_element.as_str() {
                        "ele" => point.altitude = text.parse().ok(),
                        "time" => point.time = text.parse::<DateTime<Utc>>().ok(),
                        "hr" => point.heart_rate = text.parse().ok(),
                        "cad" => point.cadence = text.parse().ok(),
                        "power" | "PowerInWatts" => point.power = text.parse().ok(),
                        "speed" => point.speed = text.parse().ok(),
                        _ => {}
                    }
                } else if let Some(track) = track.as_mut() {
                    if current_element == "type" {
                        track.sport_label = Some(sport_label(&text).to_string());
                    }
                }
            }
            Ok(Event::End(e)) => {
                let name = e.local_name();
                match name.as_ref() {
                    b"trkpt" => {
                        if let (Some(point), Some(track)) = (current_point.take(), track.as_mut()) {
                            track.points.push(point);
                        }
                    }
                    b"trk" => {
                        if let Some(draft) = track.take() {
                            activities.extend(draft.finish()?);
                        }
                    }
                    _ => {}
                }
                current_element.clear();
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(ParseError::InvalidGpx(e.to_string())),
            _ => {}
        }
        buf.clear();
    }

    Ok(ParsedEvent { activities })
}

fn local_name(e: &BytesStart<'_>) -> Result<String, ParseError> {
    let name = e.local_name();
    std::str::from_utf8(name.as_ref())
        .map(str::to_string)
        .map_err(|e| ParseError::InvalidGpx(e.to_string()))
}

fn start_point(e: &BytesStart<'_>) -> Result<TrackPoint, ParseError> {
    let mut point = TrackPoint::default();

    for attr in e.attributes() {
        let attr = attr.map_err(|e| ParseError::InvalidGpx(e.to_string()))?;
        let value = std::str::from_utf8(&attr.value)
            .map_err(|e| ParseError::InvalidGpx(e.to_string()))?;

        match attr.key.as_ref() {
            b"lat" => point.lat = value.parse().ok(),
            b"lon" => point.lon = value.parse().ok(),
            _ => {}
        }
    }

    Ok(point)
}

/// GPX `<type>` values seen in the wild: Garmin/Strava names and Strava numeric codes.
fn sport_label(raw: &str) -> &'static str {
    match raw.trim().to_ascii_lowercase().as_str() {
        "running" | "run" | "street_running" | "9" => "Running",
        "trail_running" => "Trail Running",
        "treadmill_running" | "treadmill" => "Treadmill",
        "virtual_run" | "virtualrun" => "Virtual Running",
        "cycling" | "biking" | "ride" | "road_biking" | "1" => "Cycling",
        "mountain_biking" | "mountainbikeride" => "Mountain Biking",
        "virtual_ride" | "virtualride" => "Virtual Cycling",
        "indoor_cycling" => "Indoor Cycling",
        "e_bike_ride" | "ebikeride" => "E-Bike Ride",
        "hiking" | "hike" | "4" => "Hiking",
        "walking" | "walk" | "10" => "Walking",
        "swimming" | "swim" | "open_water_swimming" => "Swimming",
        "rowing" => "Rowing",
        "alpine_skiing" | "alpineski" | "resort_skiing_snowboarding" => "Alpine Skiing",
        "cross_country_skiing" | "nordicski" => "Cross Country Skiing",
        "kayaking" => "Kayaking",
        _ => super::UNKNOWN_SPORT,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TWO_TRACKS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<gpx version="1.1" creator="test" xmlns:gpxtpx="http://www.garmin.com/xmlschemas/TrackPointExtension/v1">
  <trk><name>Lunch Run</name><type>running</type><trkseg>
    <trkpt lat="45.0000" lon="6.0000"><ele>100.0</ele><time>2024-05-01T12:00:00Z</time><extensions><gpxtpx:TrackPointExtension><gpxtpx:hr>140</gpxtpx:hr><gpxtpx:cad>85</gpxtpx:cad></gpxtpx:TrackPointExtension></extensions></trkpt>
    <trkpt lat="45.0005" lon="6.0000"><ele>102.0</ele><time>2024-05-01T12:00:10Z</time><extensions><gpxtpx:TrackPointExtension><gpxtpx:hr>145</gpxtpx:hr></gpxtpx:TrackPointExtension></extensions></trkpt>
  </trkseg></trk>
  <trk><type>cycling</type><trkseg>
    <trkpt lat="45.1" lon="6.1"><time>2024-05-01T15:00:00Z</time></trkpt>
    <trkpt lat="45.2" lon="6.1"><time>2024-05-01T15:20:00Z</time></trkpt>
  </trkseg></trk>
</gpx>"#;

    #[test]
    fn one_activity_per_track() {
        let event = parse(TWO_TRACKS.as_bytes()).unwrap();
        assert_eq!(event.activities.len(), 2);

        let run = &event.activities[0];
        assert_eq!(run.sport_label, "Running");
        assert_eq!(run.points.len(), 2);
        assert_eq!(run.points[0].heart_rate, Some(140.0));
        assert_eq!(run.points[0].cadence, Some(85.0));
        assert_eq!(run.points[1].cadence, None);
        assert_eq!(run.points[1].altitude, Some(102.0));
        assert_eq!(run.duration_seconds(), 10.0);
        assert_eq!(run.ascent, 2.0);
        assert!(run.points[1].distance.unwrap() > 50.0);

        let ride = &event.activities[1];
        assert_eq!(ride.sport_label, "Cycling");
        assert!(ride.points.iter().all(|p| p.altitude.is_none()));
        assert_eq!(ride.duration_seconds(), 1200.0);
    }

    #[test]
    fn unknown_type_is_kept_as_unknown_sport() {
        let gpx = r#"<gpx><trk><type>underwater_hockey</type><trkseg>
            <trkpt lat="1" lon="1"><time>2024-01-01T00:00:00Z</time></trkpt>
        </trkseg></trk></gpx>"#;
        let event = parse(gpx.as_bytes()).unwrap();
        assert_eq!(event.activities[0].sport_label, super::super::UNKNOWN_SPORT);
    }

    #[test]
    fn malformed_xml_is_rejected() {
        let err = parse(b"<gpx><trk><trkpt lat=\"1\" lon=\"1\"></trk></gpx>").unwrap_err();
        assert!(matches!(err, ParseError::InvalidGpx(_)));
    }
}
