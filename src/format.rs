//! Locale-aware rendering of KPI values. Missing values render as `—`.

use num_format::{Locale, ToFormattedString};

/// Placeholder for values that could not be computed.
pub const MISSING: &str = "—";

/// Map a user-provided locale tag to a num-format Locale and decimal separator.
/// Supported tags (case-insensitive): "en", "us", "en_US", "de", "de_DE", "german", "fr", "es", "it", "pt", "nl"
pub fn map_locale(tag: &str) -> (&'static Locale, char) {
    match tag.to_lowercase().replace('-', "_").as_str() {
        "de" | "de_de" | "german" => (&Locale::de, ','),
        "fr" | "fr_fr" => (&Locale::fr, ','),
        "es" | "es_es" => (&Locale::es, ','),
        "it" | "it_it" => (&Locale::it, ','),
        "pt" | "pt_pt" | "pt_br" => (&Locale::pt, ','),
        "nl" | "nl_nl" => (&Locale::nl, ','),
        _ => (&Locale::en, '.'),
    }
}

/// Whole number with thousands separators, e.g. `8,119,000,000`.
pub fn fmt_num(v: Option<f64>, locale_tag: &str) -> String {
    match v {
        Some(x) if x.is_finite() => {
            let (locale, _) = map_locale(locale_tag);
            (x.round() as i64).to_formatted_string(locale)
        }
        _ => MISSING.to_string(),
    }
}

/// Fraction rendered as a percentage with two decimals (`0.0123` → `1.23%`).
pub fn fmt_pct(v: Option<f64>, locale_tag: &str) -> String {
    match v {
        Some(x) if x.is_finite() => {
            let (_, dec) = map_locale(locale_tag);
            let s = format!("{:.2}%", x * 100.0);
            if dec == '.' { s } else { s.replace('.', &dec.to_string()) }
        }
        _ => MISSING.to_string(),
    }
}

/// Growth cell: `+1,234 (0.52%)`, or `—` when growth is unavailable.
pub fn fmt_growth(abs: Option<f64>, pct: Option<f64>, locale_tag: &str) -> String {
    match abs {
        Some(a) if a.is_finite() => {
            let sign = if a > 0.0 { "+" } else { "" };
            format!(
                "{}{} ({})",
                sign,
                fmt_num(Some(a), locale_tag),
                fmt_pct(pct, locale_tag)
            )
        }
        _ => MISSING.to_string(),
    }
}

pub fn fmt_year(y: Option<i32>) -> String {
    y.map(|y| y.to_string()).unwrap_or_else(|| MISSING.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_use_locale_grouping() {
        assert_eq!(fmt_num(Some(1_234_567.4), "en"), "1,234,567");
        assert_eq!(fmt_num(Some(1_234_567.0), "de"), "1.234.567");
        assert_eq!(fmt_num(None, "en"), MISSING);
    }

    #[test]
    fn percentages_follow_decimal_separator() {
        assert_eq!(fmt_pct(Some(0.0123), "en"), "1.23%");
        assert_eq!(fmt_pct(Some(0.0123), "de"), "1,23%");
        assert_eq!(fmt_pct(Some(f64::NAN), "en"), MISSING);
    }

    #[test]
    fn growth_combines_both_parts() {
        assert_eq!(fmt_growth(Some(100.0), Some(1.0), "en"), "+100 (100.00%)");
        assert_eq!(fmt_growth(None, None, "en"), MISSING);
    }
}
