//! Hourly aggregation of sensor readings.
//!
//! This module filters readings down to one room and one calendar day and
//! resamples them to hourly means.

use crate::models::{HourlyAverage, Reading};
use chrono::{NaiveDate, NaiveDateTime, Timelike};
use std::collections::BTreeMap;

/// Compute hourly mean CO2 for `room` on `date`.
///
/// The room match is exact and case-sensitive. A reading belongs to `date`
/// when its own (naive) date equals it. Hours without readings are left out,
/// so the result may have gaps and is empty when nothing matches. The result
/// is sorted by hour.
pub fn hourly_averages(readings: &[Reading], room: &str, date: NaiveDate) -> Vec<HourlyAverage> {
    let mut buckets: BTreeMap<NaiveDateTime, (f64, usize)> = BTreeMap::new();

    for reading in readings
        .iter()
        .filter(|r| r.room == room && r.timestamp.date() == date)
    {
        let bucket = buckets.entry(hour_start(reading.timestamp)).or_default();
        bucket.0 += reading.co2_ppm;
        bucket.1 += 1;
    }

    buckets
        .into_iter()
        .map(|(hour, (sum, samples))| HourlyAverage {
            room: room.to_string(),
            hour,
            mean_co2: sum / samples as f64,
            samples,
        })
        .collect()
}

/// Truncate a timestamp to the top of its hour.
pub fn hour_start(ts: NaiveDateTime) -> NaiveDateTime {
    // hour() is always a valid hour, so this never falls back
    ts.date().and_hms_opt(ts.hour(), 0, 0).unwrap_or(ts)
}

/// Mean of the hourly means, or `None` for an empty series.
pub fn daily_mean(hourly: &[HourlyAverage]) -> Option<f64> {
    if hourly.is_empty() {
        return None;
    }

    let total: f64 = hourly.iter().map(|h| h.mean_co2).sum();
    Some(total / hourly.len() as f64)
}

/// The hour with the highest mean. Ties go to the earliest hour.
pub fn peak(hourly: &[HourlyAverage]) -> Option<&HourlyAverage> {
    hourly.iter().fold(None, |best: Option<&HourlyAverage>, h| match best {
        Some(b) if b.mean_co2 >= h.mean_co2 => Some(b),
        _ => Some(h),
    })
}
