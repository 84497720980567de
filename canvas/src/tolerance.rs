//! Tolerance parsing: derives a structured min/max/middle annotation from a
//! zone's recognized text, for engineering-drawing reporting.
//!
//! Zone text on a drawing typically leads with a nominal dimension
//! (`"12.5"`, `"Ø6 H7"`) optionally followed by a symmetric (`±0.1`) or
//! split (`+0.2/-0.1`) tolerance. Parsing is total: any text that does not
//! lead with a number simply yields no annotation.

#[cfg(test)]
#[path = "tolerance_test.rs"]
mod tolerance_test;

use serde::{Deserialize, Serialize};

/// Kind of tolerance annotation parsed from zone text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToleranceType {
    /// `±t` — symmetric about the nominal value.
    Symmetric,
    /// `+a/-b` — independent upper and lower deviations.
    Deviation,
    /// No explicit tolerance; general tolerances apply.
    General,
}

/// Structured numeric annotation derived from a zone's text.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ToleranceInfo {
    /// Lower limit of the dimension.
    #[serde(rename = "minTolerance")]
    pub min_tolerance: f64,
    /// Upper limit of the dimension.
    #[serde(rename = "maxTolerance")]
    pub max_tolerance: f64,
    /// Midpoint of the limits (the nominal value for symmetric tolerances).
    #[serde(rename = "middleValue")]
    pub middle_value: f64,
    #[serde(rename = "toleranceType")]
    pub tolerance_type: ToleranceType,
    /// Whether the dimension carried a diameter prefix (`Ø`).
    #[serde(rename = "isDiameter")]
    pub is_diameter: bool,
}

/// Parse a leading numeric value and optional tolerance suffix from zone
/// text. Returns `None` when the text does not lead with a number.
#[must_use]
pub fn parse_tolerance(text: &str) -> Option<ToleranceInfo> {
    let trimmed = text.trim_start();
    let (is_diameter, rest) = strip_diameter(trimmed);
    let (nominal, rest) = leading_number(rest)?;

    if let Some(tol) = symmetric_suffix(rest) {
        return Some(ToleranceInfo {
            min_tolerance: nominal - tol,
            max_tolerance: nominal + tol,
            middle_value: nominal,
            tolerance_type: ToleranceType::Symmetric,
            is_diameter,
        });
    }

    if let Some((upper, lower)) = deviation_suffix(rest) {
        let max = nominal + upper;
        let min = nominal - lower;
        return Some(ToleranceInfo {
            min_tolerance: min,
            max_tolerance: max,
            middle_value: (min + max) / 2.0,
            tolerance_type: ToleranceType::Deviation,
            is_diameter,
        });
    }

    Some(ToleranceInfo {
        min_tolerance: nominal,
        max_tolerance: nominal,
        middle_value: nominal,
        tolerance_type: ToleranceType::General,
        is_diameter,
    })
}

/// Strip a diameter prefix (`Ø`, `⌀`, or `DIA`) and report whether one was
/// present.
fn strip_diameter(text: &str) -> (bool, &str) {
    for prefix in ["Ø", "⌀", "DIA ", "DIA."] {
        if let Some(rest) = text.strip_prefix(prefix) {
            return (true, rest.trim_start());
        }
    }
    (false, text)
}

/// Extract the leading number, accepting `,` as a decimal separator.
/// Returns the value and the unparsed remainder.
fn leading_number(text: &str) -> Option<(f64, &str)> {
    let mut end = 0;
    let mut seen_digit = false;
    let mut seen_separator = false;
    for (i, c) in text.char_indices() {
        match c {
            '0'..='9' => {
                seen_digit = true;
                end = i + c.len_utf8();
            }
            '-' if i == 0 => {
                end = i + c.len_utf8();
            }
            '.' | ',' if seen_digit && !seen_separator => {
                seen_separator = true;
                end = i + c.len_utf8();
            }
            _ => break,
        }
    }
    if !seen_digit {
        return None;
    }
    let raw = text[..end].replace(',', ".");
    let Ok(value) = raw.trim_end_matches('.').parse::<f64>() else {
        return None;
    };
    Some((value, text[end..].trim_start()))
}

/// Match a `±t` suffix; returns the tolerance magnitude.
fn symmetric_suffix(text: &str) -> Option<f64> {
    let rest = text
        .strip_prefix('±')
        .or_else(|| text.strip_prefix("+/-"))?;
    leading_number(rest.trim_start()).map(|(value, _)| value)
}

/// Match a `+a/-b` (or `+a -b`) suffix; returns the upper and lower
/// deviation magnitudes.
fn deviation_suffix(text: &str) -> Option<(f64, f64)> {
    let rest = text.strip_prefix('+')?;
    let (upper, rest) = leading_number(rest.trim_start())?;
    let rest = rest.trim_start_matches('/').trim_start();
    let rest = rest.strip_prefix('-')?;
    let (lower, _) = leading_number(rest.trim_start())?;
    Some((upper, lower))
}
