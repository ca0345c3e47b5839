//! Data models for the CO2 dashboard.
//!
//! This module contains the core data structures shared by the loader,
//! the aggregation pipeline, the classifier and the report renderer.

use crate::error::ConfigError;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Default upper bound of the green band, in ppm.
pub const DEFAULT_GREEN_MAX: f64 = 550.0;

/// Default upper bound of the orange band, in ppm.
pub const DEFAULT_ORANGE_MAX: f64 = 700.0;

/// A single sensor sample, as read from the CSV.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    /// Room name (`Naam` column).
    pub room: String,
    /// Sample time (`Tijd` column), kept in its original wall-clock form.
    pub timestamp: NaiveDateTime,
    /// CO2 concentration in ppm (`CO2` column).
    pub co2_ppm: f64,
}

impl Reading {
    pub fn new(room: impl Into<String>, timestamp: NaiveDateTime, co2_ppm: f64) -> Self {
        Self {
            room: room.into(),
            timestamp,
            co2_ppm,
        }
    }
}

/// Mean CO2 over one clock hour for one room.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourlyAverage {
    /// Room name.
    pub room: String,
    /// Start of the hour (minutes and seconds are zero).
    pub hour: NaiveDateTime,
    /// Arithmetic mean of the readings in this hour.
    pub mean_co2: f64,
    /// Number of readings that fell into this hour.
    pub samples: usize,
}

/// The two band boundaries used by the classifier.
///
/// Always satisfies `green_max < orange_max`; construct through
/// [`ThresholdConfig::new`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ThresholdConfig {
    green_max: f64,
    orange_max: f64,
}

impl ThresholdConfig {
    /// Validate and build a threshold pair.
    pub fn new(green_max: f64, orange_max: f64) -> Result<Self, ConfigError> {
        check_threshold("green_max", green_max)?;
        check_threshold("orange_max", orange_max)?;

        if green_max >= orange_max {
            return Err(ConfigError::InvalidThresholds {
                green_max,
                orange_max,
            });
        }

        Ok(Self {
            green_max,
            orange_max,
        })
    }

    /// Upper bound (inclusive) of the green band.
    pub fn green_max(&self) -> f64 {
        self.green_max
    }

    /// Upper bound (inclusive) of the orange band.
    pub fn orange_max(&self) -> f64 {
        self.orange_max
    }
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            green_max: DEFAULT_GREEN_MAX,
            orange_max: DEFAULT_ORANGE_MAX,
        }
    }
}

fn check_threshold(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidThresholdValue { name, value })
    }
}

/// Air quality band for an average CO2 value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// At or below `green_max`.
    Green,
    /// Above `green_max`, at or below `orange_max`.
    Orange,
    /// Above `orange_max`.
    Red,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Green => write!(f, "Green"),
            Severity::Orange => write!(f, "Orange"),
            Severity::Red => write!(f, "Red"),
        }
    }
}

impl Severity {
    /// Returns an emoji representation of the severity.
    pub fn emoji(&self) -> &'static str {
        match self {
            Severity::Green => "🟢",
            Severity::Orange => "🟠",
            Severity::Red => "🔴",
        }
    }
}
