//! AirTeq - indoor CO2 monitoring dashboard
//!
//! A CLI tool that loads CO2 sensor readings from a CSV file, averages
//! them per hour for the selected rooms and day, and reports each room's
//! air quality band with advice.
//!
//! Exit codes:
//!   0 - Success (no room in the red band, or no --fail-on-alert set)
//!   1 - Runtime error (unreadable data, invalid config, etc.)
//!   2 - A room is in the red band and --fail-on-alert is set

mod analysis;
mod cli;
mod config;
mod data;
mod error;
mod models;
mod report;

use analysis::Dashboard;
use anyhow::{bail, Context, Result};
use chrono::{Local, NaiveDate, Utc};
use cli::{Args, OutputFormat};
use config::{Config, CONFIG_FILE_NAME};
use data::Dataset;
use report::{Report, ReportMetadata};
use std::path::Path;
use tracing::{debug, error, info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    // Initialize logging
    init_logging(&args);

    info!("AirTeq v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    match run(args) {
        Ok(exit_code) => {
            std::process::exit(exit_code);
        }
        Err(e) => {
            error!("Run failed: {:#}", e);
            eprintln!("\n❌ Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Handle --init-config: generate a default .airteq.toml.
fn handle_init_config() -> Result<()> {
    let path = Path::new(CONFIG_FILE_NAME);

    if path.exists() {
        eprintln!(
            "⚠️  {} already exists. Remove it first or edit it manually.",
            CONFIG_FILE_NAME
        );
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content)
        .with_context(|| format!("Failed to write {}", CONFIG_FILE_NAME))?;

    println!("✅ Created {} with default settings.", CONFIG_FILE_NAME);
    println!("   Edit it to change the data file, thresholds and chart range.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
///
/// `RUST_LOG` wins over the flags when it is set.
fn init_logging(args: &Args) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(args.log_level().to_string().to_lowercase()));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}

/// Run the dashboard for one invocation. Returns exit code (0 or 2).
fn run(args: Args) -> Result<i32> {
    // Load configuration
    let mut config = load_config(&args)?;
    config.merge_with_args(&args);

    let thresholds = config.thresholds().context("Invalid configuration")?;
    debug!(
        "Thresholds: green <= {}, orange <= {}",
        thresholds.green_max(),
        thresholds.orange_max()
    );

    // Load once; everything below borrows it
    let dataset = data::load(&config.data.path)
        .with_context(|| format!("Failed to load {}", config.data.path.display()))?;

    if args.list_rooms {
        for room in dataset.rooms() {
            println!("{}", room);
        }
        return Ok(0);
    }

    if args.list_dates {
        return handle_list_dates(&dataset, &args);
    }

    let rooms = select_rooms(&dataset, &args)?;
    let date = args.date.unwrap_or_else(|| Local::now().date_naive());
    info!("Showing {} room(s) on {}", rooms.len(), date);

    if !dataset.dates(None).contains(&date) {
        warn!("No readings on {} in {}", date, config.data.path.display());
        if let Some((first, last)) = dataset.date_range() {
            info!("Data covers {} to {}", first.date(), last.date());
        }
    }

    let dashboard = analysis::build_dashboard(&dataset, &rooms, date, &thresholds);

    if dashboard.any_alert {
        warn!("Red band reached in: {}", dashboard.alert_rooms.join(", "));
    }

    let report = Report {
        metadata: ReportMetadata {
            data_file: dataset
                .source()
                .unwrap_or(config.data.path.as_path())
                .display()
                .to_string(),
            generated_at: Utc::now(),
            readings_loaded: dataset.len(),
        },
        dashboard,
    };

    let output = match config.report.format {
        OutputFormat::Json => report::generate_json_report(&report)?,
        OutputFormat::Markdown => {
            report::generate_markdown_report(&report, &config.report, &config.chart)
        }
    };

    match args.output {
        Some(ref path) => {
            std::fs::write(path, &output)
                .with_context(|| format!("Failed to write report to {}", path.display()))?;
            info!("Report saved to: {}", path.display());
        }
        None => print!("{}", output),
    }

    let exit_code = alert_exit_code(args.fail_on_alert, &report.dashboard);
    if exit_code != 0 {
        eprintln!("\n⛔ At least one room is in the red band. Failing (exit code 2).");
    }

    Ok(exit_code)
}

/// Handle --list-dates: print the days that have readings.
fn handle_list_dates(dataset: &Dataset, args: &Args) -> Result<i32> {
    let rooms = args.room.clone().unwrap_or_default();

    for date in list_dates(dataset, &rooms) {
        println!("{}", date.format("%Y-%m-%d"));
    }
    Ok(0)
}

/// Sorted dates with data for any of `rooms`, or for the whole dataset when
/// no room is given.
fn list_dates(dataset: &Dataset, rooms: &[String]) -> Vec<NaiveDate> {
    if rooms.is_empty() {
        return dataset.dates(None);
    }

    let mut dates: Vec<NaiveDate> = rooms
        .iter()
        .flat_map(|room| dataset.dates(Some(room.trim())))
        .collect();
    dates.sort();
    dates.dedup();
    dates
}

/// Resolve the rooms to show: explicit list, every room, or the first one.
fn select_rooms(dataset: &Dataset, args: &Args) -> Result<Vec<String>> {
    if let Some(ref rooms) = args.room {
        // Repeated names keep their first position
        let mut selected: Vec<String> = Vec::with_capacity(rooms.len());
        for room in rooms.iter().map(|r| r.trim()) {
            if !selected.iter().any(|s| s == room) {
                selected.push(room.to_string());
            }
        }
        return Ok(selected);
    }

    if dataset.is_empty() {
        bail!("The data file contains no readings");
    }

    let all = dataset.rooms();

    if args.all_rooms {
        Ok(all)
    } else {
        debug!("No room selected, defaulting to '{}'", all[0]);
        Ok(all.into_iter().take(1).collect())
    }
}

/// Exit code for a finished run: 2 when a room is red and the caller asked
/// to fail on alerts.
fn alert_exit_code(fail_on_alert: bool, dashboard: &Dashboard) -> i32 {
    if fail_on_alert && dashboard.any_alert {
        2
    } else {
        0
    }
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    load_config_in(args, Path::new("."))
}

/// Resolve the config for a run started in `dir`.
///
/// A config file that exists but does not parse is an error, never a silent
/// fallback to the built-in thresholds.
fn load_config_in(args: &Args, dir: &Path) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        return Config::load(config_path);
    }

    match Config::load_from_dir(dir)? {
        Some(config) => {
            info!("Loaded default config from {}", CONFIG_FILE_NAME);
            Ok(config)
        }
        None => {
            debug!("No config file found, using defaults");
            Ok(Config::default())
        }
    }
}
