//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use chrono::NaiveDate;
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// AirTeq - indoor CO2 monitoring
///
/// Loads timestamped CO2 readings per room, averages them per hour for one
/// day and classifies each room as green, orange or red.
///
/// Examples:
///   airteq --data airteq_subset.csv --room "Lokaal 1.12" --date 2024-05-21
///   airteq --all-rooms --date 2024-05-21 --green-max 600 --orange-max 800
///   airteq --all-rooms --date 2024-05-21 --format json --output report.json
///   airteq --list-rooms
///   airteq --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// CSV file with `Naam`, `Tijd` and `CO2` columns
    ///
    /// Defaults to the path in .airteq.toml, or airteq_subset.csv.
    #[arg(short, long, value_name = "FILE", env = "AIRTEQ_DATA")]
    pub data: Option<PathBuf>,

    /// Room(s) to show (comma-separated or repeated)
    ///
    /// Defaults to the first room in alphabetical order.
    #[arg(short, long, value_name = "ROOMS", value_delimiter = ',')]
    pub room: Option<Vec<String>>,

    /// Show every room in the dataset
    #[arg(long, conflicts_with = "room")]
    pub all_rooms: bool,

    /// Calendar date to show (YYYY-MM-DD)
    ///
    /// Defaults to today.
    #[arg(short = 'D', long, value_name = "DATE")]
    pub date: Option<NaiveDate>,

    /// Upper bound of the green band in ppm (default 550)
    #[arg(long, value_name = "PPM")]
    pub green_max: Option<f64>,

    /// Upper bound of the orange band in ppm (default 700)
    #[arg(long, value_name = "PPM")]
    pub orange_max: Option<f64>,

    /// Output format (markdown, json)
    #[arg(short, long, value_name = "FORMAT")]
    pub format: Option<OutputFormat>,

    /// Write the report to a file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .airteq.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Leave the text chart out of the Markdown report
    #[arg(long)]
    pub no_chart: bool,

    /// Print the rooms found in the data file and exit
    #[arg(long)]
    pub list_rooms: bool,

    /// Print the dates that have data (for --room, if given) and exit
    #[arg(long, conflicts_with = "list_rooms")]
    pub list_dates: bool,

    /// Exit with code 2 when any room is in the red band
    ///
    /// Useful for scripted checks.
    #[arg(long)]
    pub fail_on_alert: bool,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (errors only)
    #[arg(short, long)]
    pub quiet: bool,

    /// Generate a default .airteq.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Output format for the report.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Markdown format (default)
    #[default]
    Markdown,
    /// JSON format
    Json,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        // Check for conflicting options
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        for (name, value) in [("--green-max", self.green_max), ("--orange-max", self.orange_max)] {
            if let Some(v) = value {
                if !v.is_finite() || v < 0.0 {
                    return Err(format!("{} must be a non-negative number", name));
                }
            }
        }

        // The pair is checked again after merging with the config file
        if let (Some(green), Some(orange)) = (self.green_max, self.orange_max) {
            if green >= orange {
                return Err(format!(
                    "--green-max ({}) must be below --orange-max ({})",
                    green, orange
                ));
            }
        }

        if let Some(ref rooms) = self.room {
            if rooms.iter().any(|r| r.trim().is_empty()) {
                return Err("Room names must not be empty".to_string());
            }
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn make_args() -> Args {
        Args {
            data: None,
            room: None,
            all_rooms: false,
            date: None,
            green_max: None,
            orange_max: None,
            format: None,
            output: None,
            config: None,
            no_chart: false,
            list_rooms: false,
            list_dates: false,
            fail_on_alert: false,
            verbose: false,
            quiet: false,
            init_config: false,
        }
    }

    #[test]
    fn test_validation_ok() {
        let mut args = make_args();
        args.green_max = Some(550.0);
        args.orange_max = Some(700.0);
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_validation_thresholds_order() {
        let mut args = make_args();
        args.green_max = Some(700.0);
        args.orange_max = Some(700.0);
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_negative_threshold() {
        let mut args = make_args();
        args.green_max = Some(-5.0);
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_conflicting_options() {
        let mut args = make_args();
        args.verbose = true;
        args.quiet = true;
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_empty_room() {
        let mut args = make_args();
        args.room = Some(vec!["Aula".to_string(), " ".to_string()]);
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_parse_rooms_and_date() {
        let args = Args::try_parse_from([
            "airteq",
            "--room",
            "Aula,Lokaal 1.12",
            "--room",
            "Lokaal 2.04",
            "--date",
            "2024-05-21",
            "--format",
            "json",
        ])
        .unwrap();

        assert_eq!(
            args.room,
            Some(vec![
                "Aula".to_string(),
                "Lokaal 1.12".to_string(),
                "Lokaal 2.04".to_string()
            ])
        );
        assert_eq!(args.date, NaiveDate::from_ymd_opt(2024, 5, 21));
        assert_eq!(args.format, Some(OutputFormat::Json));
    }

    #[test]
    fn test_parse_rejects_room_with_all_rooms() {
        let result = Args::try_parse_from(["airteq", "--room", "Aula", "--all-rooms"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_log_level() {
        let mut args = make_args();
        assert_eq!(args.log_level(), tracing::Level::INFO);

        args.verbose = true;
        assert_eq!(args.log_level(), tracing::Level::DEBUG);

        args.verbose = false;
        args.quiet = true;
        assert_eq!(args.log_level(), tracing::Level::ERROR);
    }
}
