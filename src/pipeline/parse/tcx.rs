use chrono::{DateTime, Utc};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::error::ParseError;
use crate::pipeline::parse::ActivityDraft;
use crate::types::activity::{ParsedEvent, TrackPoint};

/// One activity per `<Activity>`; laps are folded into their activity.
pub(crate) fn parse(bytes: &[u8]) -> Result<ParsedEvent, ParseError> {
    let mut reader = Reader::from_reader(bytes);
    reader.trim_text(true);

    let mut activities = Vec::new();
    let mut activity: Option<ActivityDraft> = None;
    let mut current_point: Option<TrackPoint> = None;
    let mut stack: Vec<String> = Vec::new();
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                let name = local_name(&e)?;
                match name.as_str() {
                    "Activity" => {
                        activity = Some(ActivityDraft {
                            sport_label: Some(sport_label(sport_attribute(&e)?.as_deref()).to_string()),
                            ..ActivityDraft::default()
                        });
                    }
                    "Trackpoint" => current_point = Some(TrackPoint::default()),
                    _ => {}
                }
                stack.push(name);
            }
            Ok(Event::Text(e)) => {
                let text = e
                    .unescape()
                    .map_err(|e| ParseError::InvalidTcx(e.to_string()))?;
                let element = stack.last().map(String::as_str).unwrap_or_default();
                let parent = stack
                    .len()
                    .checked_sub(2)
                    .and_then(|i| stack.get(i))
                    .map(String::as_str)
                    .unwrap_or_default();

                if let Some(point) = current_point.as_mut() {
                    let value = text.parse::<f64>().ok();
                    match (parent, element) {
                        (_, "Time") => point.time = text.parse::<DateTime<Utc>>().ok(),
                        (_, "LatitudeDegrees") => point.lat = value,
                        (_, "LongitudeDegrees") => point.lon = value,
                        (_, "AltitudeMeters") => point.altitude = value,
                        (_, "DistanceMeters") => point.distance = value,
                        ("HeartRateBpm", "Value") => point.heart_rate = value,
                        (_, "Cadence") | (_, "RunCadence") => point.cadence = value,
                        (_, "Speed") => point.speed = value,
                        (_, "Watts") => point.power = value,
                        _ => {}
                    }
                } else if let Some(activity) = activity.as_mut() {
                    match (parent, element) {
                        ("Activity", "Id") => {
                            activity.start_time = text.parse::<DateTime<Utc>>().ok();
                        }
                        ("Lap", "TotalTimeSeconds") => {
                            if let Ok(seconds) = text.parse::<f64>() {
                                *activity.elapsed_seconds.get_or_insert(0.0) += seconds;
                            }
                        }
                        ("Lap", "DistanceMeters") => {
                            if let Ok(meters) = text.parse::<f64>() {
                                *activity.distance.get_or_insert(0.0) += meters;
                            }
                        }
                        _ => {}
                    }
                }
            }
            Ok(Event::End(e)) => {
                match e.local_name().as_ref() {
                    b"Trackpoint" => {
                        if let (Some(point), Some(activity)) = (current_point.take(), activity.as_mut()) {
                            activity.points.push(point);
                        }
                    }
                    b"Activity" => {
                        if let Some(draft) = activity.take() {
                            activities.extend(draft.finish()?);
                        }
                    }
                    _ => {}
                }
                stack.pop();
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(ParseError::InvalidTcx(e.to_string())),
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
        .map_err(|e| ParseError::InvalidTcx(e.to_string()))
}

fn sport_attribute(e: &BytesStart<'_>) -> Result<Option<String>, ParseError> {
    for attr in e.attributes() {
        let attr = attr.map_err(|e| ParseError::InvalidTcx(e.to_string()))?;
        if attr.key.local_name().as_ref() == b"Sport" {
            let value = std::str::from_utf8(&attr.value)
                .map_err(|e| ParseError::InvalidTcx(e.to_string()))?;
            return Ok(Some(value.to_string()));
        }
    }
    Ok(None)
}

/// TCX only knows `Running`, `Biking` and `Other`.
fn sport_label(sport: Option<&str>) -> &'static str {
    match sport {
        Some("Running") => "Running",
        Some("Biking") => "Cycling",
        _ => super::UNKNOWN_SPORT,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RIDE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<TrainingCenterDatabase xmlns="http://www.garmin.com/xmlschemas/TrainingCenterDatabase/v2" xmlns:ns3="http://www.garmin.com/xmlschemas/ActivityExtension/v2">
  <Activities>
    <Activity Sport="Biking">
      <Id>2024-06-02T06:30:00Z</Id>
      <Lap StartTime="2024-06-02T06:30:00Z">
        <TotalTimeSeconds>60</TotalTimeSeconds>
        <DistanceMeters>500</DistanceMeters>
        <Track>
          <Trackpoint>
            <Time>2024-06-02T06:30:00Z</Time>
            <Position><LatitudeDegrees>45.0</LatitudeDegrees><LongitudeDegrees>6.0</LongitudeDegrees></Position>
            <AltitudeMeters>200</AltitudeMeters>
            <DistanceMeters>0</DistanceMeters>
            <HeartRateBpm><Value>120</Value></HeartRateBpm>
            <Cadence>80</Cadence>
            <Extensions><ns3:TPX><ns3:Speed>8.0</ns3:Speed><ns3:Watts>180</ns3:Watts></ns3:TPX></Extensions>
          </Trackpoint>
          <Trackpoint>
            <Time>2024-06-02T06:31:00Z</Time>
            <AltitudeMeters>205</AltitudeMeters>
            <DistanceMeters>480</DistanceMeters>
            <HeartRateBpm><Value>130</Value></HeartRateBpm>
            <Extensions><ns3:TPX><ns3:Speed>8.5</ns3:Speed><ns3:Watts>0</ns3:Watts></ns3:TPX></Extensions>
          </Trackpoint>
        </Track>
      </Lap>
      <Lap StartTime="2024-06-02T06:31:00Z">
        <TotalTimeSeconds>30</TotalTimeSeconds>
        <DistanceMeters>250</DistanceMeters>
      </Lap>
    </Activity>
  </Activities>
</TrainingCenterDatabase>"#;

    #[test]
    fn reads_laps_and_trackpoints() {
        let event = parse(RIDE.as_bytes()).unwrap();
        assert_eq!(event.activities.len(), 1);

        let ride = &event.activities[0];
        assert_eq!(ride.sport_label, "Cycling");
        assert_eq!(ride.distance, 750.0);
        assert_eq!(ride.duration_seconds(), 90.0);
        assert_eq!(ride.ascent, 5.0);
        assert!(ride.has_power_meter);

        let first = &ride.points[0];
        assert_eq!(first.lat, Some(45.0));
        assert_eq!(first.heart_rate, Some(120.0));
        assert_eq!(first.cadence, Some(80.0));
        assert_eq!(first.speed, Some(8.0));
        assert_eq!(first.power, Some(180.0));
        assert_eq!(ride.points[1].lat, None);
        assert_eq!(ride.points[1].distance, Some(480.0));
    }

    #[test]
    fn other_sport_is_unknown() {
        let tcx = r#"<TrainingCenterDatabase><Activities><Activity Sport="Other">
            <Id>2024-06-02T06:30:00Z</Id>
            <Lap><Track><Trackpoint><Time>2024-06-02T06:30:00Z</Time></Trackpoint></Track></Lap>
        </Activity></Activities></TrainingCenterDatabase>"#;
        let event = parse(tcx.as_bytes()).unwrap();
        assert_eq!(event.activities[0].sport_label, super::super::UNKNOWN_SPORT);
    }
}
