use std::fmt::Display;

use chrono::{Local, TimeZone};

use crate::quake::record::EarthquakeRecord;

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S %Z";

/// Hover text for a record, with the time in the local zone
pub fn format_tooltip(record: &EarthquakeRecord) -> String {
    format_tooltip_in(record, &Local)
}

/// Hover text for a record, with the time rendered in `tz`.
///
/// One line per field: magnitude, time, place, depth, then the info
/// link only when the record has one.
pub fn format_tooltip_in<Tz>(record: &EarthquakeRecord, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let magnitude = record
        .magnitude
        .map(|m| format!("{m:.1}"))
        .unwrap_or_else(|| "N/A".to_string());

    let time = record
        .time_millis
        .and_then(|ms| tz.timestamp_millis_opt(ms).single())
        .map(|t| t.format(TIME_FORMAT).to_string())
        .unwrap_or_else(|| "Unknown time".to_string());

    let place = record.place.as_deref().unwrap_or("Unknown location");

    let depth = record
        .depth_km
        .map(|d| format!("{d:.1} km"))
        .unwrap_or_else(|| "N/A".to_string());

    let mut lines = vec![
        format!("Magnitude: {magnitude}"),
        format!("Time: {time}"),
        format!("Location: {place}"),
        format!("Depth: {depth}"),
    ];
    if let Some(url) = &record.info_url {
        lines.push(format!("More info: {url}"));
    }
    lines.join("\n")
}
