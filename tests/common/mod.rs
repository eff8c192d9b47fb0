#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use activity_sync::sync::SyncHandle;
use activity_sync::types::sync::SyncEvent;
use chrono::{DateTime, Utc};

/// Seconds between the Unix epoch and the FIT epoch (1989-12-31T00:00:00Z).
const FIT_EPOCH_OFFSET: i64 = 631_065_600;

const FIT_CRC_TABLE: [u16; 16] = [
    0x0000, 0xCC01, 0xD801, 0x1400, 0xF001, 0x3C00, 0x2800, 0xE401, 0xA001, 0x6C00, 0x7800,
    0xB401, 0x5000, 0x9C01, 0x8801, 0x4400,
];

pub fn start(iso: &str) -> DateTime<Utc> {
    iso.parse().expect("valid timestamp")
}

/// A running track climbing 1 m every sample, one sample every 5 s.
pub fn gpx_run(start: DateTime<Utc>, samples: usize) -> String {
    let mut points = String::new();
    for i in 0..samples {
        let time = start + chrono::Duration::seconds(5 * i as i64);
        points.push_str(&format!(
            r#"<trkpt lat="{:.5}" lon="6.00000"><ele>{:.1}</ele><time>{}</time></trkpt>"#,
            45.0 + i as f64 * 0.0001,
            100.0 + i as f64,
            time.to_rfc3339_opts(chrono::SecondsFormat::Secs, true)
        ));
    }

    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<gpx version="1.1" creator="tests"><trk><type>running</type><trkseg>{points}</trkseg></trk></gpx>"#
    )
}

/// A road ride without power meter: `samples` records one second apart at 8 m/s on a
/// gentle climb, closed by one cycling session.
pub fn fit_ride(start: DateTime<Utc>, samples: u32) -> Vec<u8> {
    let fit_start = (start.timestamp() - FIT_EPOCH_OFFSET) as u32;
    let mut data = Vec::new();

    // file_id: type = activity
    definition(&mut data, 0, 0, &[(0, 1, 0x00)]);
    data.push(0);
    data.push(4);

    // record: timestamp, position_lat, position_long, altitude, distance, speed
    definition(
        &mut data,
        1,
        20,
        &[(253, 4, 0x86), (0, 4, 0x85), (1, 4, 0x85), (2, 2, 0x84), (5, 4, 0x86), (6, 2, 0x84)],
    );
    for i in 0..samples {
        let lat_deg = 45.0 + i as f64 * 0.00007;
        let altitude_m = 200.0 + i as f64 * 0.3;
        let distance_m = i as f64 * 8.0;

        data.push(1);
        data.extend_from_slice(&(fit_start + i).to_le_bytes());
        data.extend_from_slice(&degrees_to_semicircles(lat_deg).to_le_bytes());
        data.extend_from_slice(&degrees_to_semicircles(6.0).to_le_bytes());
        data.extend_from_slice(&(((altitude_m + 500.0) * 5.0).round() as u16).to_le_bytes());
        data.extend_from_slice(&((distance_m * 100.0).round() as u32).to_le_bytes());
        data.extend_from_slice(&8000u16.to_le_bytes());
    }

    // session: start_time, total_elapsed_time, sport = cycling
    definition(&mut data, 2, 18, &[(2, 4, 0x86), (7, 4, 0x86), (5, 1, 0x00)]);
    data.push(2);
    data.extend_from_slice(&fit_start.to_le_bytes());
    data.extend_from_slice(&((samples.saturating_sub(1)) * 1000).to_le_bytes());
    data.push(2);

    let mut file = Vec::with_capacity(data.len() + 16);
    file.push(14);
    file.push(0x10);
    file.extend_from_slice(&2093u16.to_le_bytes());
    file.extend_from_slice(&(data.len() as u32).to_le_bytes());
    file.extend_from_slice(b".FIT");
    let header_crc = fit_crc(&file);
    file.extend_from_slice(&header_crc.to_le_bytes());
    file.extend_from_slice(&data);
    let file_crc = fit_crc(&file);
    file.extend_from_slice(&file_crc.to_le_bytes());
    file
}

fn definition(data: &mut Vec<u8>, local: u8, global: u16, fields: &[(u8, u8, u8)]) {
    data.push(0x40 | local);
    data.push(0);
    data.push(0);
    data.extend_from_slice(&global.to_le_bytes());
    data.push(fields.len() as u8);
    for &(number, size, base_type) in fields {
        data.extend_from_slice(&[number, size, base_type]);
    }
}

fn degrees_to_semicircles(degrees: f64) -> i32 {
    (degrees * (2_147_483_648.0 / 180.0)).round() as i32
}

fn fit_crc(bytes: &[u8]) -> u16 {
    bytes.iter().fold(0u16, |crc, &byte| {
        let tmp = FIT_CRC_TABLE[(crc & 0xF) as usize];
        let crc = (crc >> 4) & 0x0FFF;
        let crc = crc ^ tmp ^ FIT_CRC_TABLE[(byte & 0xF) as usize];
        let tmp = FIT_CRC_TABLE[(crc & 0xF) as usize];
        let crc = (crc >> 4) & 0x0FFF;
        crc ^ tmp ^ FIT_CRC_TABLE[((byte >> 4) & 0xF) as usize]
    })
}

/// Writes `contents` to `dir/name` with a fixed modification time `offset_secs` after
/// 2023-11-14T22:13:20Z.
pub fn write_file(dir: &Path, name: &str, contents: impl AsRef<[u8]>, offset_secs: u64) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, contents).expect("write fixture");
    let modified = SystemTime::UNIX_EPOCH + Duration::from_secs(1_700_000_000 + offset_secs);
    std::fs::File::options()
        .write(true)
        .open(&path)
        .and_then(|file| file.set_modified(modified))
        .expect("set mtime");
    path
}

/// Collects every event of a pass until its channel closes.
pub async fn drain(mut handle: SyncHandle) -> Vec<SyncEvent> {
    let mut events = Vec::new();
    while let Some(event) = handle.events.recv().await {
        events.push(event);
    }
    events
}
