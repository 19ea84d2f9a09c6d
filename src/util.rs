// Parsing and formatting helpers shared by the pipeline.
//
// This module centralizes the "dirty" CSV/number handling so the rest of the
// code can assume clean, typed values, and owns the fixed display precision
// used throughout the report (one decimal for percentages, two for means).
use num_format::{Locale, ToFormattedString};

/// Parse a survey cell into `f64` while being forgiving about formatting
/// issues that are common in form exports (stray spaces, text, blanks).
///
/// Returns `None` for anything that cannot be safely parsed; missing numeric
/// answers stay missing instead of turning into zeros.
pub fn parse_f64_safe(s: &str) -> Option<f64> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    if s.chars().any(|c| c.is_ascii_alphabetic()) {
        return None;
    }
    let s = s.replace(',', ".");
    s.parse::<f64>().ok()
}

/// Parse a checkbox indicator cell ("1" when the option was ticked).
pub fn parse_flag(s: &str) -> bool {
    matches!(s.trim(), "1" | "1.0")
}

/// Arithmetic mean; `None` for an empty slice so empty subgroups surface as
/// an explicit no-data state rather than a silent zero.
pub fn mean(v: &[f64]) -> Option<f64> {
    if v.is_empty() {
        return None;
    }
    let sum: f64 = v.iter().copied().sum();
    Some(sum / v.len() as f64)
}

/// Pearson correlation of paired observations; `None` when fewer than two
/// pairs exist or either side has zero variance.
pub fn pearson(pairs: &[(f64, f64)]) -> Option<f64> {
    if pairs.len() < 2 {
        return None;
    }
    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|(x, _)| x).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|(_, y)| y).sum::<f64>() / n;
    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (x, y) in pairs {
        cov += (x - mean_x) * (y - mean_y);
        var_x += (x - mean_x).powi(2);
        var_y += (y - mean_y).powi(2);
    }
    if var_x == 0.0 || var_y == 0.0 {
        return None;
    }
    Some(cov / (var_x.sqrt() * var_y.sqrt()))
}

/// Percentage string at the report's fixed precision, e.g. `63.2%`.
pub fn format_pct(value: f64) -> String {
    format!("{:.1}%", value)
}

/// Mean/average string at two decimal places, e.g. `15.97`.
pub fn format_mean(value: f64) -> String {
    format!("{:.2}", value)
}

pub fn format_int<T>(n: T) -> String
where
    T: ToFormattedString,
{
    // Thin wrapper around `num-format` for integer-like values, used for row
    // counts in console messages.
    n.to_formatted_string(&Locale::en)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_f64_safe_handles_survey_cells() {
        assert_eq!(parse_f64_safe("16"), Some(16.0));
        assert_eq!(parse_f64_safe(" 13 "), Some(13.0));
        assert_eq!(parse_f64_safe("12,5"), Some(12.5));
        assert_eq!(parse_f64_safe(""), None);
        assert_eq!(parse_f64_safe("neviem"), None);
    }

    #[test]
    fn mean_is_none_for_empty_input() {
        assert_eq!(mean(&[]), None);
        assert_eq!(mean(&[1.0, 2.0, 3.0]), Some(2.0));
    }

    #[test]
    fn pearson_matches_known_correlations() {
        let perfect: Vec<(f64, f64)> = (0..5).map(|i| (i as f64, 2.0 * i as f64)).collect();
        assert!((pearson(&perfect).unwrap() - 1.0).abs() < 1e-9);

        let inverse: Vec<(f64, f64)> = (0..5).map(|i| (i as f64, -(i as f64))).collect();
        assert!((pearson(&inverse).unwrap() + 1.0).abs() < 1e-9);

        assert_eq!(pearson(&[(1.0, 2.0)]), None);
        assert_eq!(pearson(&[(1.0, 2.0), (1.0, 3.0)]), None);
    }

    #[test]
    fn percent_formatting_is_one_decimal() {
        assert_eq!(format_pct(6.0 / 10.0 * 100.0), "60.0%");
        assert_eq!(format_pct(100.0 / 3.0), "33.3%");
    }
}
