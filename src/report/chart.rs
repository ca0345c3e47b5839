//! Text rendering of an hourly series against the threshold bands.

use crate::analysis::classifier::classify;
use crate::config::ChartConfig;
use crate::models::{HourlyAverage, Severity, ThresholdConfig};

const BAR: char = '█';
const BAND_MARK: char = '┊';

/// Render one line per hour: a bar scaled to the chart axis with the band
/// boundaries marked, followed by the value and its band.
pub fn render_chart(
    hourly: &[HourlyAverage],
    thresholds: &ThresholdConfig,
    chart: &ChartConfig,
) -> String {
    let width = chart.width.max(1);
    let marks = [
        scale(thresholds.green_max(), chart, width),
        scale(thresholds.orange_max(), chart, width),
    ];

    let mut out = String::new();

    out.push_str(&format!(
        "{:>5} {}  {:.0}..{:.0} ppm\n",
        "",
        axis_line(width, &marks),
        chart.y_min,
        chart.y_max
    ));

    for h in hourly {
        let filled = scale(h.mean_co2, chart, width);
        let severity = classify(h.mean_co2, thresholds);

        out.push_str(&format!(
            "{} │{}│ {:>7.1} {}\n",
            h.hour.format("%H:%M"),
            bar(filled, width, &marks),
            h.mean_co2,
            severity.emoji()
        ));
    }

    out.push_str(&legend(thresholds));
    out
}

/// Band legend, e.g. `🟢 ≤ 550 ppm | 🟠 550-700 ppm | 🔴 > 700 ppm`.
pub fn legend(thresholds: &ThresholdConfig) -> String {
    format!(
        "{} ≤ {} ppm | {} {}-{} ppm | {} > {} ppm\n",
        Severity::Green.emoji(),
        thresholds.green_max(),
        Severity::Orange.emoji(),
        thresholds.green_max(),
        thresholds.orange_max(),
        Severity::Red.emoji(),
        thresholds.orange_max()
    )
}

/// Map a value onto `0..=width`, clamping to the axis range.
fn scale(value: f64, chart: &ChartConfig, width: usize) -> usize {
    let span = chart.y_max - chart.y_min;
    if span <= 0.0 {
        return 0;
    }

    let ratio = ((value - chart.y_min) / span).clamp(0.0, 1.0);
    (ratio * width as f64).round() as usize
}

fn axis_line(width: usize, marks: &[usize]) -> String {
    (0..=width + 1)
        .map(|i| match i {
            0 => '├',
            i if i == width + 1 => '┤',
            i if marks.contains(&(i - 1)) => '┼',
            _ => '─',
        })
        .collect()
}

fn bar(filled: usize, width: usize, marks: &[usize]) -> String {
    (0..width)
        .map(|i| {
            if i < filled {
                BAR
            } else if marks.contains(&i) {
                BAND_MARK
            } else {
                ' '
            }
        })
        .collect()
}
