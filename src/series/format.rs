//! Display formatting for indicator values.

use crate::domain::IndicatorKey;

/// Indicators shown as whole numbers with thousands separators.
const GROUPED_KEYS: [IndicatorKey; 2] = [IndicatorKey::Sp500, IndicatorKey::NonfarmPayroll];

/// Format a value for display.
///
/// - S&P 500 and nonfarm payroll: `1,235` (no decimals)
/// - `%` unit: `4.20%`
/// - otherwise: `4.20`
///
/// Non-finite values render as `n/a`.
pub fn format_value(value: f64, unit: &str, key: &str) -> String {
    if !value.is_finite() {
        return "n/a".to_string();
    }
    if GROUPED_KEYS.iter().any(|k| k.as_str() == key) {
        return group_thousands(value);
    }
    if unit == "%" {
        return format!("{value:.2}%");
    }
    format!("{value:.2}")
}

/// Signed change with an explicit `+`, e.g. `+0.05` or `-1.20%`.
pub fn format_delta(value: f64, unit: &str) -> String {
    if !value.is_finite() {
        return "n/a".to_string();
    }
    let sign = if value >= 0.0 { "+" } else { "" };
    if unit == "%" {
        format!("{sign}{value:.2}%")
    } else {
        format!("{sign}{value:.2}")
    }
}

/// Round half away from zero and insert `,` every three digits.
fn group_thousands(value: f64) -> String {
    let rounded = value.round();
    let digits = format!("{:.0}", rounded.abs());

    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if rounded < 0.0 {
        out.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
