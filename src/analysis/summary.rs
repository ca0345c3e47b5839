//! Per-room summaries and the dashboard view built from them.

use super::aggregator::{daily_mean, hourly_averages, peak};
use super::classifier::{advise, classify, is_alert};
use crate::data::Dataset;
use crate::models::{HourlyAverage, Severity, ThresholdConfig};
use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, warn};

/// Band, advice and alert flag for a room's daily average.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoomStatus {
    pub severity: Severity,
    pub advice: &'static str,
    pub alert: bool,
}

impl RoomStatus {
    pub fn for_average(average: f64, thresholds: &ThresholdConfig) -> Self {
        let severity = classify(average, thresholds);
        Self {
            severity,
            advice: advise(severity),
            alert: is_alert(severity),
        }
    }
}

/// Everything shown for one room on one day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoomSummary {
    pub room: String,
    /// Hourly series for the chart.
    pub hourly: Vec<HourlyAverage>,
    /// Mean of the hourly means; `None` when the room has no data that day.
    pub average: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub peak: Option<HourlyAverage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<RoomStatus>,
}

impl RoomSummary {
    pub fn has_data(&self) -> bool {
        !self.hourly.is_empty()
    }

    pub fn is_alert(&self) -> bool {
        self.status.as_ref().is_some_and(|s| s.alert)
    }
}

/// The full view for a set of rooms on one day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard {
    pub date: NaiveDate,
    pub thresholds: ThresholdConfig,
    pub rooms: Vec<RoomSummary>,
    /// True when at least one room is in the red band.
    pub any_alert: bool,
    pub alert_rooms: Vec<String>,
}

/// Aggregate and classify one room.
pub fn summarize_room(
    dataset: &Dataset,
    room: &str,
    date: NaiveDate,
    thresholds: &ThresholdConfig,
) -> RoomSummary {
    let hourly = hourly_averages(dataset.readings(), room, date);
    let average = daily_mean(&hourly);
    let status = average.map(|avg| RoomStatus::for_average(avg, thresholds));

    debug!(
        "{} on {}: {} hours, average {:?}",
        room,
        date,
        hourly.len(),
        average
    );

    RoomSummary {
        room: room.to_string(),
        peak: peak(&hourly).cloned(),
        hourly,
        average,
        status,
    }
}

/// Summarize each requested room and derive the alert banner.
///
/// Rooms are kept in the order given. Unknown rooms produce an empty
/// summary and a warning rather than an error.
pub fn build_dashboard(
    dataset: &Dataset,
    rooms: &[String],
    date: NaiveDate,
    thresholds: &ThresholdConfig,
) -> Dashboard {
    let summaries: Vec<RoomSummary> = rooms
        .iter()
        .map(|room| {
            if !dataset.has_room(room) {
                warn!("Room '{}' does not appear in the dataset", room);
            }
            summarize_room(dataset, room, date, thresholds)
        })
        .collect();

    let alert_rooms: Vec<String> = summaries
        .iter()
        .filter(|s| s.is_alert())
        .map(|s| s.room.clone())
        .collect();

    Dashboard {
        date,
        thresholds: *thresholds,
        any_alert: !alert_rooms.is_empty(),
        alert_rooms,
        rooms: summaries,
    }
}
