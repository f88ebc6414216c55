//! Text formatting shared by tooltips, axes and the hero metrics.

/// Placeholder shown when a record lacks the value.
pub const NOT_AVAILABLE: &str = "N/A";

/// Fixed-point number with thousands separators, e.g. `1,234.5`.
pub fn number(value: f64, decimals: usize) -> String {
    if !value.is_finite() {
        return NOT_AVAILABLE.to_string();
    }
    let formatted = format!("{:.*}", decimals, value.abs());
    let (integer, fraction) = formatted
        .split_once('.')
        .map_or((formatted.as_str(), None), |(i, f)| (i, Some(f)));

    let mut grouped = String::with_capacity(formatted.len() + integer.len() / 3 + 1);
    for (index, digit) in integer.chars().enumerate() {
        if index > 0 && (integer.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    if let Some(fraction) = fraction {
        grouped.push('.');
        grouped.push_str(fraction);
    }

    let is_zero = grouped.chars().all(|c| matches!(c, '0' | '.' | ','));
    if value.is_sign_negative() && !is_zero {
        format!("-{grouped}")
    } else {
        grouped
    }
}

/// A 0..1 share rendered as a percentage, e.g. `0.364` -> `36.4%`.
pub fn percent(share: f64, decimals: usize) -> String {
    if !share.is_finite() {
        return NOT_AVAILABLE.to_string();
    }
    format!("{}%", number(share * 100.0, decimals))
}

/// A value already in percent units, always signed, e.g. `+20.0%`.
pub fn signed_percent(value: f64, decimals: usize) -> String {
    if !value.is_finite() {
        return NOT_AVAILABLE.to_string();
    }
    let body = number(value, decimals);
    if body.starts_with('-') {
        format!("{body}%")
    } else {
        format!("+{body}%")
    }
}

pub fn optional(value: Option<f64>, render: impl FnOnce(f64) -> String) -> String {
    value.map_or_else(|| NOT_AVAILABLE.to_string(), render)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn groups_thousands() {
        assert_eq!(number(1234.5, 1), "1,234.5");
        assert_eq!(number(999.0, 0), "999");
        assert_eq!(number(1_000_000.0, 0), "1,000,000");
        assert_eq!(number(-4321.0, 0), "-4,321");
    }

    #[test]
    fn negative_zero_has_no_sign() {
        assert_eq!(number(-0.01, 1), "0.0");
        assert_eq!(signed_percent(-0.01, 1), "+0.0%");
    }

    #[test]
    fn percent_and_signed_percent() {
        assert_eq!(percent(0.364, 1), "36.4%");
        assert_eq!(signed_percent(20.0, 1), "+20.0%");
        assert_eq!(signed_percent(-3.26, 1), "-3.3%");
        assert_eq!(percent(f64::NAN, 1), NOT_AVAILABLE);
    }

    #[test]
    fn optional_falls_back_to_placeholder() {
        assert_eq!(optional(None, |v| percent(v, 1)), "N/A");
        assert_eq!(optional(Some(0.5), |v| percent(v, 0)), "50%");
    }
}
