//! Threshold classification and advisory text.

use crate::models::{Severity, ThresholdConfig};

const ADVICE_GREEN: &str = "Air quality is good. No action needed.";
const ADVICE_ORANGE: &str = "CO2 is elevated. Ventilate the room soon.";
const ADVICE_RED: &str = "CO2 is too high. Ventilate the room now.";

/// Map an average CO2 value to its band.
///
/// Both boundaries belong to the lower band: a value equal to `green_max`
/// is Green and a value equal to `orange_max` is Orange.
pub fn classify(mean_co2: f64, config: &ThresholdConfig) -> Severity {
    if mean_co2 <= config.green_max() {
        Severity::Green
    } else if mean_co2 <= config.orange_max() {
        Severity::Orange
    } else {
        Severity::Red
    }
}

/// Fixed advisory text for a band.
pub fn advise(severity: Severity) -> &'static str {
    match severity {
        Severity::Green => ADVICE_GREEN,
        Severity::Orange => ADVICE_ORANGE,
        Severity::Red => ADVICE_RED,
    }
}

/// Whether a band should raise the alert banner.
pub fn is_alert(severity: Severity) -> bool {
    severity == Severity::Red
}
