//! Unit inference for literal research figures such as `"$5.2B"` or `"12.5%"`.

/// What a literal value measures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueUnit {
    Currency,
    Percent,
    Plain,
    Unknown,
}

impl ValueUnit {
    /// Infer the unit from the formatting of a sample value
    pub fn detect(sample: &str) -> Self {
        let s = sample.trim();
        if s.contains('$') || magnitude_suffix(s).is_some() {
            Self::Currency
        } else if s.contains('%') {
            Self::Percent
        } else if s.chars().any(|c| c.is_ascii_digit()) {
            Self::Plain
        } else {
            Self::Unknown
        }
    }

    pub fn axis_label(&self) -> &'static str {
        match self {
            Self::Currency => "Market Size ($ Billions)",
            Self::Percent => "Percentage (%)",
            Self::Plain => "Metric Value",
            Self::Unknown => "Value",
        }
    }
}

/// Multiplier into billions for a trailing magnitude word or letter
fn magnitude_suffix(s: &str) -> Option<f64> {
    let lower = s.to_lowercase();
    let word: String = lower
        .trim_end_matches(|c: char| !c.is_alphanumeric())
        .chars()
        .rev()
        .take_while(|c| c.is_ascii_alphabetic())
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();

    // Only counts as a suffix when a number precedes it
    let head = &lower[..lower.rfind(&word).unwrap_or(0)];
    if word.is_empty() || !head.chars().any(|c| c.is_ascii_digit()) {
        return None;
    }

    match word.as_str() {
        "t" | "tn" | "trillion" => Some(1_000.0),
        "b" | "bn" | "billion" => Some(1.0),
        "m" | "mm" | "mn" | "million" => Some(0.001),
        "k" | "thousand" => Some(0.000_001),
        _ => None,
    }
}

/// First decimal number in the text, ignoring thousands separators
pub fn first_number(s: &str) -> Option<f64> {
    let mut digits = String::new();
    let mut started = false;
    for c in s.chars() {
        if c.is_ascii_digit() || (c == '.' && started) || (c == '-' && !started) {
            digits.push(c);
            started |= c.is_ascii_digit();
        } else if c == ',' && started {
            continue;
        } else if started {
            break;
        } else {
            digits.clear();
        }
    }
    digits.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Currency amount expressed in billions (`"$800M"` → 0.8)
pub fn to_billions(s: &str) -> Option<f64> {
    let value = first_number(s)?;
    let multiplier = magnitude_suffix(s.trim()).unwrap_or(1e-9);
    Some(value * multiplier)
}

/// Percentage as a number (`"12.5%"` → 12.5)
pub fn to_percent(s: &str) -> Option<f64> {
    first_number(s)
}

/// Parse a literal according to a unit
pub fn parse_as(unit: ValueUnit, s: &str) -> Option<f64> {
    match unit {
        ValueUnit::Currency => to_billions(s),
        ValueUnit::Percent => to_percent(s),
        ValueUnit::Plain => first_number(s),
        ValueUnit::Unknown => None,
    }
}

/// `periods` values of `base * (1 + rate)^i`
pub fn compound_series(base: f64, rate: f64, periods: usize) -> Vec<f64> {
    (0..periods)
        .map(|i| base * (1.0 + rate).powi(i as i32))
        .collect()
}

/// Compact number formatting for labels
pub fn format_number(value: f64) -> String {
    let formatted = format!("{:.2}", value);
    formatted
        .trim_end_matches('0')
        .trim_end_matches('.')
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_axis_label_inference() {
        assert_eq!(ValueUnit::detect("$5.2B").axis_label(), "Market Size ($ Billions)");
        assert_eq!(ValueUnit::detect("800M").axis_label(), "Market Size ($ Billions)");
        assert_eq!(ValueUnit::detect("12K").axis_label(), "Market Size ($ Billions)");
        assert_eq!(ValueUnit::detect("12.5%").axis_label(), "Percentage (%)");
        assert_eq!(ValueUnit::detect("4200").axis_label(), "Metric Value");
        assert_eq!(ValueUnit::detect("n/a").axis_label(), "Value");
        assert_eq!(ValueUnit::detect("Mid-market").axis_label(), "Value");
    }

    #[test]
    fn test_to_billions() {
        assert_eq!(to_billions("$5.2B"), Some(5.2));
        assert!((to_billions("$800M").unwrap() - 0.8).abs() < 1e-9);
        assert_eq!(to_billions("$1.5 trillion"), Some(1500.0));
        assert_eq!(to_billions("USD 3 bn"), Some(3.0));
        assert!(to_billions("unknown").is_none());
    }

    #[test]
    fn test_first_number() {
        assert_eq!(first_number("$1,200"), Some(1200.0));
        assert_eq!(first_number("approx. 15.2% CAGR"), Some(15.2));
        assert_eq!(first_number("-20%"), Some(-20.0));
        assert_eq!(first_number("none"), None);
    }

    #[test]
    fn test_compound_series_ten_percent() {
        let series = compound_series(100.0, 0.10, 5);
        let expected = [100.0, 110.0, 121.0, 133.1, 146.41];
        assert_eq!(series.len(), 5);
        for (got, want) in series.iter().zip(expected) {
            assert!((got - want).abs() < 1e-9, "{} != {}", got, want);
        }
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(5.2), "5.2");
        assert_eq!(format_number(0.8), "0.8");
        assert_eq!(format_number(100.0), "100");
        assert_eq!(format_number(146.41), "146.41");
    }
}
