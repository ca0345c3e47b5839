//! Report generation.
//!
//! This module renders a [`Dashboard`] as a Markdown report with an alert
//! banner, a summary table and one section per room, or as JSON.

use super::chart::{legend, render_chart};
use crate::analysis::classifier::classify;
use crate::analysis::{Dashboard, RoomSummary};
use crate::config::{ChartConfig, ReportConfig};
use crate::models::ThresholdConfig;
use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Metadata about a report run.
#[derive(Debug, Clone, Serialize)]
pub struct ReportMetadata {
    /// CSV the readings came from.
    pub data_file: String,
    /// When the report was produced.
    pub generated_at: DateTime<Utc>,
    /// Number of readings in the loaded dataset.
    pub readings_loaded: usize,
}

/// A dashboard together with its run metadata.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub metadata: ReportMetadata,
    #[serde(flatten)]
    pub dashboard: Dashboard,
}

/// Generate a complete Markdown report.
pub fn generate_markdown_report(
    report: &Report,
    options: &ReportConfig,
    chart: &ChartConfig,
) -> String {
    let dashboard = &report.dashboard;
    let mut output = String::new();

    output.push_str("# AirTeq CO₂ Report\n\n");
    output.push_str(&generate_metadata_section(report));
    output.push_str(&generate_alert_banner(dashboard));
    output.push_str(&generate_summary_section(dashboard));

    output.push_str("## Rooms\n\n");
    for room in &dashboard.rooms {
        output.push_str(&generate_room_section(room, dashboard, options, chart));
    }

    output.push_str(&generate_footer());

    output
}

/// Generate the metadata section.
fn generate_metadata_section(report: &Report) -> String {
    let metadata = &report.metadata;
    let dashboard = &report.dashboard;
    let mut section = String::new();

    section.push_str("## Metadata\n\n");
    section.push_str(&format!("- **Data File:** `{}`\n", metadata.data_file));
    section.push_str(&format!("- **Date:** {}\n", dashboard.date.format("%Y-%m-%d")));
    section.push_str(&format!(
        "- **Generated:** {}\n",
        metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    section.push_str(&format!(
        "- **Readings Loaded:** {}\n",
        metadata.readings_loaded
    ));
    section.push_str(&format!(
        "- **Thresholds:** {}\n",
        describe_thresholds(&dashboard.thresholds)
    ));
    section.push_str(&format!("- **Rooms:** {}\n", dashboard.rooms.len()));
    section.push('\n');

    section
}

fn describe_thresholds(thresholds: &ThresholdConfig) -> String {
    format!(
        "green ≤ {} ppm, orange ≤ {} ppm",
        thresholds.green_max(),
        thresholds.orange_max()
    )
}

/// Generate the alert banner, empty when no room is red.
fn generate_alert_banner(dashboard: &Dashboard) -> String {
    if !dashboard.any_alert {
        return String::new();
    }

    format!(
        "> 🚨 **ALERT:** CO₂ above {} ppm in {}. Ventilate now.\n\n",
        dashboard.thresholds.orange_max(),
        dashboard.alert_rooms.join(", ")
    )
}

/// Generate the summary table.
fn generate_summary_section(dashboard: &Dashboard) -> String {
    let mut section = String::new();

    section.push_str("## Summary\n\n");
    section.push_str("| Room | Average (ppm) | Peak Hour | Status | Advice |\n");
    section.push_str("|:---|:---:|:---:|:---:|:---|\n");

    for room in &dashboard.rooms {
        match (room.average, &room.status) {
            (Some(avg), Some(status)) => {
                let peak = room
                    .peak
                    .as_ref()
                    .map(|p| format!("{} ({:.1})", p.hour.format("%H:%M"), p.mean_co2))
                    .unwrap_or_default();
                section.push_str(&format!(
                    "| {} | {:.1} | {} | {} {} | {} |\n",
                    escape_cell(&room.room),
                    avg,
                    peak,
                    status.severity.emoji(),
                    status.severity,
                    status.advice
                ));
            }
            _ => {
                section.push_str(&format!(
                    "| {} | - | - | No data | - |\n",
                    escape_cell(&room.room)
                ));
            }
        }
    }
    section.push('\n');

    section
}

/// Escape a value for use inside a Markdown table cell.
fn escape_cell(value: &str) -> String {
    value.replace('|', "\\|")
}

/// Generate the section for a single room.
fn generate_room_section(
    room: &RoomSummary,
    dashboard: &Dashboard,
    options: &ReportConfig,
    chart: &ChartConfig,
) -> String {
    let mut section = String::new();

    section.push_str(&format!(
        "### {} on {}\n\n",
        room.room,
        dashboard.date.format("%Y-%m-%d")
    ));

    let (average, status) = match (room.average, &room.status) {
        (Some(avg), Some(status)) if room.has_data() => (avg, status),
        _ => {
            section.push_str(&format!(
                "*No data for this room on {}.*\n\n",
                dashboard.date.format("%Y-%m-%d")
            ));
            return section;
        }
    };

    section.push_str(&format!(
        "**Average:** {:.1} ppm | {} **{}**\n\n",
        average,
        status.severity.emoji(),
        status.severity.to_string().to_uppercase()
    ));
    section.push_str(&format!("> 💡 {}\n\n", status.advice));

    if options.include_table {
        section.push_str("| Hour | Mean CO₂ (ppm) | Samples | Band |\n");
        section.push_str("|:---:|:---:|:---:|:---:|\n");
        for h in &room.hourly {
            let severity = classify(h.mean_co2, &dashboard.thresholds);
            section.push_str(&format!(
                "| {} | {:.1} | {} | {} {} |\n",
                h.hour.format("%H:%M"),
                h.mean_co2,
                h.samples,
                severity.emoji(),
                severity
            ));
        }
        section.push('\n');
    }

    if options.include_chart {
        section.push_str("```text\n");
        section.push_str(&render_chart(&room.hourly, &dashboard.thresholds, chart));
        section.push_str("```\n\n");
    } else if !options.include_table {
        section.push_str(&legend(&dashboard.thresholds));
        section.push('\n');
    }

    section.push_str("---\n\n");

    section
}

/// Generate the report footer.
fn generate_footer() -> String {
    "*Report generated by AirTeq*\n".to_string()
}

/// Generate a JSON report.
pub fn generate_json_report(report: &Report) -> Result<String> {
    serde_json::to_string_pretty(report).map_err(Into::into)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::build_dashboard;
    use crate::data::Dataset;
    use crate::models::Reading;
    use chrono::NaiveDate;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 21).unwrap()
    }

    fn create_test_report() -> Report {
        let at = |h: u32, m: u32| day().and_hms_opt(h, m, 0).unwrap();
        let dataset = Dataset::from_readings(vec![
            Reading::new("Aula", at(10, 5), 900.0),
            Reading::new("Aula", at(10, 40), 1000.0),
            Reading::new("Lokaal 1.12", at(8, 5), 500.0),
            Reading::new("Lokaal 1.12", at(8, 40), 600.0),
        ]);
        let rooms = vec![
            "Aula".to_string(),
            "Lokaal 1.12".to_string(),
            "Kelder".to_string(),
        ];
        let dashboard = build_dashboard(&dataset, &rooms, day(), &ThresholdConfig::default());

        Report {
            metadata: ReportMetadata {
                data_file: "airteq_subset.csv".to_string(),
                generated_at: Utc::now(),
                readings_loaded: dataset.len(),
            },
            dashboard,
        }
    }

    #[test]
    fn test_generate_markdown_report() {
        let report = create_test_report();
        let markdown =
            generate_markdown_report(&report, &ReportConfig::default(), &ChartConfig::default());

        assert!(markdown.contains("# AirTeq CO₂ Report"));
        assert!(markdown.contains("## Metadata"));
        assert!(markdown.contains("## Summary"));
        assert!(markdown.contains("### Aula on 2024-05-21"));
        assert!(markdown.contains("| Lokaal 1.12 | 550.0 | 08:00 (550.0) | 🟢 Green |"));
        assert!(markdown.contains("| Kelder | - | - | No data | - |"));
        assert!(markdown.contains("*No data for this room on 2024-05-21.*"));
        assert!(markdown.contains("```text"));
    }

    #[test]
    fn test_alert_banner() {
        let report = create_test_report();
        let banner = generate_alert_banner(&report.dashboard);

        assert!(banner.contains("ALERT"));
        assert!(banner.contains("Aula"));
        assert!(!banner.contains("Lokaal"));
    }

    #[test]
    fn test_no_banner_without_alert() {
        let mut report = create_test_report();
        report.dashboard.any_alert = false;
        report.dashboard.alert_rooms.clear();
        assert!(generate_alert_banner(&report.dashboard).is_empty());
    }

    #[test]
    fn test_room_section_without_chart_or_table() {
        let report = create_test_report();
        let options = ReportConfig {
            include_chart: false,
            include_table: false,
            ..ReportConfig::default()
        };
        let section = generate_room_section(
            &report.dashboard.rooms[0],
            &report.dashboard,
            &options,
            &ChartConfig::default(),
        );

        assert!(section.contains("**Average:** 950.0 ppm | 🔴 **RED**"));
        assert!(!section.contains("| Hour |"));
        assert!(!section.contains("```text"));
        assert!(section.contains("🟠 550-700 ppm"));
    }

    #[test]
    fn test_summary_escapes_pipes_in_room_names() {
        let at = day().and_hms_opt(8, 5, 0).unwrap();
        let dataset = Dataset::from_readings(vec![Reading::new("Lab A|B", at, 500.0)]);
        let rooms = vec!["Lab A|B".to_string(), "Kelder|Oost".to_string()];
        let dashboard = build_dashboard(&dataset, &rooms, day(), &ThresholdConfig::default());
        let section = generate_summary_section(&dashboard);

        assert!(section.contains("| Lab A\\|B | 500.0 |"));
        assert!(section.contains("| Kelder\\|Oost | - | - | No data | - |"));
        // Every row keeps the six column separators of the header
        for line in section.lines().filter(|l| l.starts_with('|')) {
            assert_eq!(line.replace("\\|", "").matches('|').count(), 6);
        }
    }

    #[test]
    fn test_generate_metadata_section() {
        let report = create_test_report();
        let section = generate_metadata_section(&report);

        assert!(section.contains("`airteq_subset.csv`"));
        assert!(section.contains("**Readings Loaded:** 4"));
        assert!(section.contains("green ≤ 550 ppm, orange ≤ 700 ppm"));
    }

    #[test]
    fn test_generate_json_report() {
        let report = create_test_report();
        let json = generate_json_report(&report).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["date"], "2024-05-21");
        assert_eq!(value["any_alert"], true);
        assert_eq!(value["thresholds"]["green_max"], 550.0);
        assert_eq!(value["rooms"][0]["status"]["severity"], "red");
        assert_eq!(value["rooms"][1]["hourly"][0]["mean_co2"], 550.0);
        assert_eq!(value["metadata"]["readings_loaded"], 4);
        assert!(value["rooms"][2]["status"].is_null());
    }
}
