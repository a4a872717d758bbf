//! Number formatting for human output.

/// Round to milliseconds for display
pub fn round_secs(secs: f64) -> f64 {
    (secs * 1000.0).round() / 1000.0
}

/// Format a rate: whole numbers above 1000, otherwise up to three decimals,
/// with thousands separators.
pub fn format_number(value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }

    let text = if value.abs() > 1000.0 {
        format!("{:.0}", value.round())
    } else {
        let fixed = format!("{:.3}", value);
        fixed.trim_end_matches('0').trim_end_matches('.').to_string()
    };

    let (sign, unsigned) = match text.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", text.as_str()),
    };
    let (integer, fraction) = match unsigned.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (unsigned, None),
    };

    let mut grouped = String::with_capacity(integer.len() + integer.len() / 3);
    for (i, ch) in integer.chars().enumerate() {
        if i > 0 && (integer.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    match fraction {
        Some(f) => format!("{sign}{grouped}.{f}"),
        None => format!("{sign}{grouped}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(1_234_567.89), "1,234,568");
        assert_eq!(format_number(999.5), "999.5");
        assert_eq!(format_number(12.3456), "12.346");
        assert_eq!(format_number(100.0), "100");
        assert_eq!(format_number(1000.4), "1,000");
        assert_eq!(format_number(0.0), "0");
    }

    #[test]
    fn test_round_secs() {
        assert_eq!(round_secs(1.23456), 1.235);
    }
}
