//! Date helper functions

use chrono::{DateTime, Datelike, FixedOffset, TimeZone};

/// Month naming used when rendering publication dates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Locale {
    PtBr,
    En,
}

impl Locale {
    /// Resolve a language tag such as `pt-BR` or `en_US`; unknown tags fall
    /// back to Brazilian Portuguese.
    pub fn from_tag(tag: &str) -> Self {
        let lang = tag
            .split(['-', '_'])
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase();
        match lang.as_str() {
            "en" => Locale::En,
            "pt" => Locale::PtBr,
            _ => {
                tracing::debug!("No month names for {:?}, using pt-BR", tag);
                Locale::PtBr
            }
        }
    }

    /// Abbreviated month names, January first
    pub fn months(self) -> [&'static str; 12] {
        match self {
            Locale::PtBr => [
                "jan", "fev", "mar", "abr", "mai", "jun", "jul", "ago", "set", "out", "nov", "dez",
            ],
            Locale::En => [
                "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
            ],
        }
    }
}

/// Parse a CMS timestamp. Accepts RFC 3339 and the `+0000` offset form.
///
/// # Examples
/// ```ignore
/// parse_timestamp("2021-03-25T19:25:28+0000")
/// ```
pub fn parse_timestamp(value: &str) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(value)
        .or_else(|_| DateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%z"))
        .or_else(|_| DateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f%z"))
        .ok()
}

/// Format a date as "DD Mon YYYY"
///
/// # Examples
/// ```ignore
/// format_date(&date, Locale::PtBr) // -> "25 mar 2021"
/// ```
pub fn format_date<Tz: TimeZone>(date: &DateTime<Tz>, locale: Locale) -> String {
    let month = locale.months()[date.month0() as usize];
    format!("{:02} {} {}", date.day(), month, date.year())
}

/// Format an optional CMS timestamp in `tz`. Missing or unparsable values
/// render as an empty string.
pub fn format_publication_date<Tz: TimeZone>(value: Option<&str>, locale: Locale, tz: &Tz) -> String {
    let Some(value) = value else {
        return String::new();
    };
    match parse_timestamp(value) {
        Some(date) => format_date(&date.with_timezone(tz), locale),
        None => {
            tracing::warn!("Unparsable publication date {:?}", value);
            String::new()
        }
    }
}
