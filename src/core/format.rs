//! Locale-aware number formatting for display strings.
//!
//! Grouping follows the es-CO convention: `.` separates thousands and `,`
//! marks decimals. The grouped string is built by hand (reverse-group the
//! integer digits by three) so the separators never depend on a host locale
//! database. Compact mode keeps `.` as its decimal point; that inconsistency
//! with the other modes is intentional and relied upon by callers.
//!
//! Every operation is pure and infallible: the single failure class,
//! non-numeric or missing input, is normalized to `0` by
//! [`parse_numeric_input`] so a display never crashes on bad upstream data.

use crate::domain::model::{FormatMode, FormatSpec};

/// Separator pair used when building grouped-digit strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Separators {
    pub grouping: char,
    pub decimal: char,
}

/// es-CO separators: `100.000` / `1.234,56`.
pub const ES_CO: Separators = Separators {
    grouping: '.',
    decimal: ',',
};

pub const DEFAULT_CURRENCY_SYMBOL: &str = "$";

/// Coerces a raw display value to a number, degrading to `0.0` on anything
/// that is not a finite number. This is the only coercion point; none of the
/// formatting operations ever surface an error.
pub fn parse_numeric_input(raw: &str) -> f64 {
    let value: f64 = raw.trim().parse().unwrap_or(0.0);
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

/// Grouped-digit rendering with exactly `decimals` fractional digits.
///
/// `format_number(100000.0, 0)` → `"100.000"`,
/// `format_number(1234.56, 2)` → `"1.234,56"`.
pub fn format_number(value: f64, decimals: u32) -> String {
    format_grouped(value, decimals, ES_CO)
}

/// Currency rendering: the symbol immediately followed by the grouped
/// number, no space and no locale placement logic.
///
/// `format_currency(1500000.50, "$", 2)` → `"$1.500.000,50"`.
pub fn format_currency(value: f64, symbol: &str, decimals: u32) -> String {
    format!("{}{}", symbol, format_number(value, decimals))
}

/// Percentage rendering. A value strictly below 1 is a fraction and gets
/// multiplied by 100; anything else is already a percentage magnitude, so an
/// input of exactly 1 renders as `1,0%`, not `100%`.
///
/// `format_percentage(0.855, 1)` → `"85,5%"`.
pub fn format_percentage(value: f64, decimals: u32) -> String {
    let magnitude = if value < 1.0 { value * 100.0 } else { value };
    format!("{}%", format_number(magnitude, decimals))
}

/// Magnitude-abbreviated rendering with K/M/B suffixes at powers of 1000,
/// largest threshold first. Below 1000 the value renders with the default
/// `f64` display, ungrouped.
///
/// `format_compact(1500.0)` → `"1.5K"`, `format_compact(999.0)` → `"999"`.
pub fn format_compact(value: f64) -> String {
    if value >= 1_000_000_000.0 {
        format!("{:.1}B", value / 1_000_000_000.0)
    } else if value >= 1_000_000.0 {
        format!("{:.1}M", value / 1_000_000.0)
    } else if value >= 1_000.0 {
        format!("{:.1}K", value / 1_000.0)
    } else {
        value.to_string()
    }
}

/// Dispatches on the mode, filling in per-mode defaults: 0 decimals
/// for plain and currency, 1 for percentage, `$` for the currency symbol.
pub fn apply(spec: &FormatSpec, value: f64) -> String {
    match spec.mode {
        FormatMode::Plain => format_number(value, spec.decimals.unwrap_or(0)),
        FormatMode::Currency => format_currency(
            value,
            spec.symbol.as_deref().unwrap_or(DEFAULT_CURRENCY_SYMBOL),
            spec.decimals.unwrap_or(0),
        ),
        FormatMode::Percentage => format_percentage(value, spec.decimals.unwrap_or(1)),
        FormatMode::Compact => format_compact(value),
    }
}

/// Coerce-then-format convenience for raw display text.
pub fn apply_to_input(spec: &FormatSpec, raw: &str) -> String {
    apply(spec, parse_numeric_input(raw))
}

fn format_grouped(value: f64, decimals: u32, sep: Separators) -> String {
    let fixed = format!("{:.*}", decimals as usize, value);
    let (int_part, frac_part) = match fixed.split_once('.') {
        Some((int_part, frac_part)) => (int_part, Some(frac_part)),
        None => (fixed.as_str(), None),
    };
    let (sign, digits) = match int_part.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", int_part),
    };

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (count, ch) in digits.chars().rev().enumerate() {
        if count > 0 && count % 3 == 0 {
            grouped.push(sep.grouping);
        }
        grouped.push(ch);
    }
    let grouped: String = grouped.chars().rev().collect();

    match frac_part {
        Some(frac) => format!("{}{}{}{}", sign, grouped, sep.decimal, frac),
        None => format!("{}{}", sign, grouped),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{FormatMode, FormatSpec};

    #[test]
    fn test_format_number_grouping() {
        assert_eq!(format_number(100000.0, 0), "100.000");
        assert_eq!(format_number(1234.56, 2), "1.234,56");
        assert_eq!(format_number(0.0, 0), "0");
        assert_eq!(format_number(999.0, 0), "999");
        assert_eq!(format_number(1000.0, 0), "1.000");
        assert_eq!(format_number(1234567890.0, 0), "1.234.567.890");
    }

    #[test]
    fn test_format_number_pads_decimals() {
        assert_eq!(format_number(5.0, 2), "5,00");
        assert_eq!(format_number(1000.0, 3), "1.000,000");
    }

    #[test]
    fn test_format_number_negative_sign_before_first_cluster() {
        assert_eq!(format_number(-1234.56, 2), "-1.234,56");
        assert_eq!(format_number(-100000.0, 0), "-100.000");
    }

    #[test]
    fn test_format_number_cluster_property() {
        // Clusters of three separated by `.`, most-significant cluster 1-3 digits.
        for (value, decimals) in [
            (1.0_f64, 0u32),
            (12.0, 0),
            (123.0, 0),
            (1234.0, 0),
            (12345.0, 1),
            (123456.0, 2),
            (1234567.0, 0),
            (98765432.1, 3),
        ] {
            let rendered = format_number(value, decimals);
            let integer = rendered.split(',').next().unwrap();
            let clusters: Vec<&str> = integer.split('.').collect();
            assert!((1..=3).contains(&clusters[0].len()), "{rendered}");
            for cluster in &clusters[1..] {
                assert_eq!(cluster.len(), 3, "{rendered}");
            }
            if decimals > 0 {
                let frac = rendered.split(',').nth(1).unwrap();
                assert_eq!(frac.len(), decimals as usize, "{rendered}");
            } else {
                assert!(!rendered.contains(','), "{rendered}");
            }
        }
    }

    #[test]
    fn test_format_currency() {
        assert_eq!(format_currency(100000.0, "$", 0), "$100.000");
        assert_eq!(format_currency(1500000.50, "$", 2), "$1.500.000,50");
        assert_eq!(format_currency(0.0, "COP ", 0), "COP 0");
    }

    #[test]
    fn test_format_percentage_fraction_is_scaled() {
        assert_eq!(format_percentage(0.855, 1), "85,5%");
        assert_eq!(format_percentage(0.5, 0), "50%");
    }

    #[test]
    fn test_format_percentage_magnitude_passes_through() {
        assert_eq!(format_percentage(75.0, 0), "75%");
        assert_eq!(format_percentage(1250.0, 0), "1.250%");
    }

    #[test]
    fn test_format_percentage_boundary_at_one() {
        // Exactly 1 is not `< 1`, so it is already a percentage: 1%, never 100%.
        assert_eq!(format_percentage(1.0, 1), "1,0%");
    }

    #[test]
    fn test_format_compact_thresholds() {
        assert_eq!(format_compact(1500.0), "1.5K");
        assert_eq!(format_compact(2500000.0), "2.5M");
        assert_eq!(format_compact(3200000000.0), "3.2B");
        assert_eq!(format_compact(1000.0), "1.0K");
    }

    #[test]
    fn test_format_compact_below_threshold_is_plain_display() {
        assert_eq!(format_compact(999.0), "999");
        assert_eq!(format_compact(999.5), "999.5");
        assert_eq!(format_compact(0.0), "0");
    }

    #[test]
    fn test_parse_numeric_input_degrades_to_zero() {
        assert_eq!(parse_numeric_input(""), 0.0);
        assert_eq!(parse_numeric_input("   "), 0.0);
        assert_eq!(parse_numeric_input("abc"), 0.0);
        assert_eq!(parse_numeric_input("12abc"), 0.0);
        assert_eq!(parse_numeric_input("NaN"), 0.0);
        assert_eq!(parse_numeric_input("inf"), 0.0);
    }

    #[test]
    fn test_parse_numeric_input_accepts_numbers() {
        assert_eq!(parse_numeric_input("100000"), 100000.0);
        assert_eq!(parse_numeric_input(" 1234.56 "), 1234.56);
        assert_eq!(parse_numeric_input("-42"), -42.0);
    }

    #[test]
    fn test_non_numeric_matches_zero_for_every_operation() {
        for raw in ["", "n/a", "sin datos"] {
            let value = parse_numeric_input(raw);
            assert_eq!(format_number(value, 0), format_number(0.0, 0));
            assert_eq!(format_currency(value, "$", 0), "$0");
            assert_eq!(format_percentage(value, 1), "0,0%");
            assert_eq!(format_compact(value), "0");
        }
    }

    #[test]
    fn test_apply_uses_mode_defaults() {
        let plain = FormatSpec::new(FormatMode::Plain);
        let currency = FormatSpec::new(FormatMode::Currency);
        let percentage = FormatSpec::new(FormatMode::Percentage);
        let compact = FormatSpec::new(FormatMode::Compact);

        assert_eq!(apply(&plain, 100000.0), "100.000");
        assert_eq!(apply(&currency, 100000.0), "$100.000");
        assert_eq!(apply(&percentage, 0.855), "85,5%");
        assert_eq!(apply(&compact, 1500.0), "1.5K");
    }

    #[test]
    fn test_apply_honors_explicit_options() {
        let spec = FormatSpec {
            mode: FormatMode::Currency,
            decimals: Some(2),
            symbol: Some("€".to_string()),
        };
        assert_eq!(apply(&spec, 1500000.50), "€1.500.000,50");
    }

    #[test]
    fn test_apply_to_input_coerces() {
        let spec = FormatSpec::new(FormatMode::Currency);
        assert_eq!(apply_to_input(&spec, "100000"), "$100.000");
        assert_eq!(apply_to_input(&spec, "no disponible"), "$0");
    }
}
