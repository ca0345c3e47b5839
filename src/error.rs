//! Typed errors for data loading and configuration.

use thiserror::Error;

/// Errors raised while reading the sensor CSV.
///
/// Line numbers are 1-based and count the header row, so they match what an
/// editor shows for the offending row.
#[derive(Error, Debug)]
pub enum DataFormatError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Missing required column: `{0}`")]
    MissingColumn(&'static str),

    #[error("Line {line}: missing value for `{column}`")]
    MissingField { line: usize, column: &'static str },

    #[error("Line {line}: unparsable timestamp `{value}`")]
    InvalidTimestamp { line: usize, value: String },

    #[error("Line {line}: unparsable CO2 value `{value}`")]
    InvalidCo2 { line: usize, value: String },
}

/// Errors raised when validating user-supplied settings.
#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("Invalid thresholds: green_max ({green_max}) must be below orange_max ({orange_max})")]
    InvalidThresholds { green_max: f64, orange_max: f64 },

    #[error("Threshold `{name}` must be a finite, non-negative number (got {value})")]
    InvalidThresholdValue { name: &'static str, value: f64 },

    #[error("Invalid chart range: y_min ({y_min}) must be below y_max ({y_max})")]
    InvalidChartRange { y_min: f64, y_max: f64 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_include_line() {
        let err = DataFormatError::InvalidTimestamp {
            line: 7,
            value: "yesterday".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("Line 7"));
        assert!(msg.contains("yesterday"));

        let err = DataFormatError::MissingColumn("CO2");
        assert_eq!(err.to_string(), "Missing required column: `CO2`");
    }

    #[test]
    fn test_threshold_error_message() {
        let err = ConfigError::InvalidThresholds {
            green_max: 700.0,
            orange_max: 550.0,
        };
        assert!(err.to_string().contains("green_max (700)"));
    }
}
