//! CSV loading for sensor readings.
//!
//! The whole file is read once into an immutable [`Dataset`] that the caller
//! owns and hands to the aggregation pipeline by reference.

use crate::error::DataFormatError;
use crate::models::Reading;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use std::collections::BTreeSet;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Room name column.
pub const COL_ROOM: &str = "Naam";
/// Timestamp column.
pub const COL_TIME: &str = "Tijd";
/// CO2 concentration column.
pub const COL_CO2: &str = "CO2";

/// Naive layouts tried in order after the offset-aware ones.
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    // Month first, then day first when the month field is out of range.
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%m-%d-%Y %H:%M:%S",
    "%m-%d-%Y %H:%M",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
    "%d-%m-%Y %H:%M:%S",
    "%d-%m-%Y %H:%M",
];

const OFFSET_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%.f%:z", "%Y-%m-%d %H:%M:%S%.f%z"];

/// In-memory, read-only table of readings.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    source: Option<PathBuf>,
    readings: Vec<Reading>,
}

impl Dataset {
    /// Wrap already-parsed readings.
    pub fn from_readings(readings: Vec<Reading>) -> Self {
        Self {
            source: None,
            readings,
        }
    }

    /// Parse CSV content from any reader.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, DataFormatError> {
        let readings = parse_readings(reader)?;
        Ok(Self::from_readings(readings))
    }

    /// Path the dataset was loaded from, if any.
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// All readings in file order.
    pub fn readings(&self) -> &[Reading] {
        &self.readings
    }

    pub fn len(&self) -> usize {
        self.readings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    /// Distinct room names, sorted.
    pub fn rooms(&self) -> Vec<String> {
        self.readings
            .iter()
            .map(|r| r.room.as_str())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .map(String::from)
            .collect()
    }

    /// Whether any reading belongs to `room`.
    pub fn has_room(&self, room: &str) -> bool {
        self.readings.iter().any(|r| r.room == room)
    }

    /// Distinct calendar dates with data, sorted. Restricted to one room
    /// when `room` is given.
    pub fn dates(&self, room: Option<&str>) -> Vec<NaiveDate> {
        self.readings
            .iter()
            .filter(|r| room.map_or(true, |name| r.room == name))
            .map(|r| r.timestamp.date())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Earliest and latest timestamps in the dataset.
    pub fn date_range(&self) -> Option<(NaiveDateTime, NaiveDateTime)> {
        let first = self.readings.iter().map(|r| r.timestamp).min()?;
        let last = self.readings.iter().map(|r| r.timestamp).max()?;
        Some((first, last))
    }
}

/// Load a CSV file into a [`Dataset`].
///
/// Fails on the first row with an unparsable timestamp or CO2 value.
pub fn load(path: &Path) -> Result<Dataset, DataFormatError> {
    info!("Loading readings from {}", path.display());

    let file = File::open(path).map_err(|source| DataFormatError::Io {
        path: path.display().to_string(),
        source,
    })?;

    let mut dataset = Dataset::from_reader(file)?;
    dataset.source = Some(path.to_path_buf());
    info!("Loaded {} readings", dataset.len());

    Ok(dataset)
}

fn parse_readings<R: Read>(reader: R) -> Result<Vec<Reading>, DataFormatError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let headers = reader.headers()?.clone();
    let room_idx = column_index(&headers, COL_ROOM)?;
    let time_idx = column_index(&headers, COL_TIME)?;
    let co2_idx = column_index(&headers, COL_CO2)?;
    debug!(
        "Column layout: {}={}, {}={}, {}={}",
        COL_ROOM, room_idx, COL_TIME, time_idx, COL_CO2, co2_idx
    );

    let mut readings = Vec::new();

    for (idx, result) in reader.records().enumerate() {
        let record = result?;
        // Fallback: records start after the header and lines are 1-based
        let line = record
            .position()
            .map(|p| p.line() as usize)
            .unwrap_or(idx + 2);

        let room = field(&record, room_idx, line, COL_ROOM)?;

        let raw_time = record.get(time_idx).unwrap_or("");
        let timestamp =
            parse_timestamp(raw_time).ok_or_else(|| DataFormatError::InvalidTimestamp {
                line,
                value: raw_time.to_string(),
            })?;

        let raw_co2 = record.get(co2_idx).unwrap_or("");
        let co2_ppm = parse_co2(raw_co2).ok_or_else(|| DataFormatError::InvalidCo2 {
            line,
            value: raw_co2.to_string(),
        })?;

        readings.push(Reading::new(room, timestamp, co2_ppm));
    }

    Ok(readings)
}

fn column_index(
    headers: &csv::StringRecord,
    name: &'static str,
) -> Result<usize, DataFormatError> {
    headers
        .iter()
        .position(|h| normalize_header(h) == name)
        .ok_or(DataFormatError::MissingColumn(name))
}

fn normalize_header(name: &str) -> &str {
    // Spreadsheet exports often prefix the first header with a BOM.
    name.trim().trim_start_matches('\u{feff}')
}

fn field<'a>(
    record: &'a csv::StringRecord,
    idx: usize,
    line: usize,
    column: &'static str,
) -> Result<&'a str, DataFormatError> {
    match record.get(idx) {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(DataFormatError::MissingField { line, column }),
    }
}

/// Parse a timestamp in one of the accepted layouts.
///
/// Offsets are dropped without conversion: `2024-05-21T08:05:00+02:00`
/// becomes `2024-05-21 08:05:00`. Numeric dates with the year last are read
/// month first (`01/02/2024` is January 2nd) and only fall back to day first
/// when that is impossible (`21/05/2024`).
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_local());
    }

    for fmt in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(raw, fmt) {
            return Some(dt.naive_local());
        }
    }

    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

fn parse_co2(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}
