// Date normalization for upstream filing records
//
// The two upstream schema generations disagree on date layout, and some
// values went through a date-to-string conversion that produced
// "Thu Mar 10 2022 00:00:00 GMT+0530 (India Standard Time)". A wrong format
// choice is silent (01/02 vs 02/01), so every rule names an ordering per
// schema generation.
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Plausible years for a filing date; anything outside is a misparse
const YEAR_RANGE: std::ops::RangeInclusive<i32> = 1900..=2200;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateFormat {
    /// 10/03/2022
    DayMonthYearSlash,
    /// 10-03-2022
    DayMonthYearDash,
    /// 03/10/2022 (legacy records)
    MonthDayYearSlash,
    /// 2022-03-10
    IsoDate,
    /// Thu Mar 10 2022
    WeekdayMonthDayYear,
}

/// Current-schema company records: day first, legacy month-first as last resort
pub const COMPANY_DATE_FORMATS: &[DateFormat] = &[
    DateFormat::DayMonthYearSlash,
    DateFormat::DayMonthYearDash,
    DateFormat::IsoDate,
    DateFormat::WeekdayMonthDayYear,
    DateFormat::MonthDayYearSlash,
];

/// Records migrated from the legacy schema, which stored slash dates month first
pub const LEGACY_DATE_FORMATS: &[DateFormat] = &[
    DateFormat::MonthDayYearSlash,
    DateFormat::DayMonthYearDash,
    DateFormat::WeekdayMonthDayYear,
    DateFormat::IsoDate,
];

/// LLP records mostly carry converted weekday strings
pub const LLP_DATE_FORMATS: &[DateFormat] = &[
    DateFormat::WeekdayMonthDayYear,
    DateFormat::DayMonthYearSlash,
    DateFormat::DayMonthYearDash,
    DateFormat::IsoDate,
];

pub const GST_DATE_FORMATS: &[DateFormat] = &[
    DateFormat::DayMonthYearDash,
    DateFormat::DayMonthYearSlash,
    DateFormat::IsoDate,
];

impl DateFormat {
    pub fn pattern(&self) -> &'static str {
        match self {
            DateFormat::DayMonthYearSlash => "%d/%m/%Y",
            DateFormat::DayMonthYearDash => "%d-%m-%Y",
            DateFormat::MonthDayYearSlash => "%m/%d/%Y",
            DateFormat::IsoDate => "%Y-%m-%d",
            DateFormat::WeekdayMonthDayYear => "%a %b %d %Y",
        }
    }

    /// Parse a single value in this format, ignoring any trailing time of day
    pub fn parse(&self, input: &str) -> Option<NaiveDate> {
        let candidate = match self {
            DateFormat::WeekdayMonthDayYear => {
                let tokens: Vec<&str> = input.split_whitespace().take(4).collect();
                if tokens.len() < 4 {
                    return None;
                }
                tokens.join(" ")
            }
            DateFormat::IsoDate => input
                .split_whitespace()
                .next()?
                .split('T')
                .next()?
                .to_string(),
            _ => input.split_whitespace().next()?.to_string(),
        };

        NaiveDate::parse_from_str(&candidate, self.pattern())
            .ok()
            .filter(|date| YEAR_RANGE.contains(&date.year()))
    }

    pub fn format(&self, date: NaiveDate) -> String {
        date.format(self.pattern()).to_string()
    }
}

/// Returns the first date any candidate format can read, or `None` when the
/// value is unparseable under all of them
pub fn normalize(input: &str, candidates: &[DateFormat]) -> Option<NaiveDate> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }
    candidates.iter().find_map(|format| format.parse(input))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_ambiguous_slash_date_under_each_ordering() {
        let ambiguous = "01/02/2020";
        assert_eq!(normalize(ambiguous, COMPANY_DATE_FORMATS), Some(date(2020, 2, 1)));
        assert_eq!(normalize(ambiguous, LEGACY_DATE_FORMATS), Some(date(2020, 1, 2)));
        assert_eq!(normalize(ambiguous, LLP_DATE_FORMATS), Some(date(2020, 2, 1)));
        assert_eq!(normalize(ambiguous, GST_DATE_FORMATS), Some(date(2020, 2, 1)));
    }

    #[test]
    fn test_unambiguous_month_first_falls_through() {
        // Day 25 cannot be a month, so the company ordering reaches its legacy fallback
        assert_eq!(normalize("03/25/2020", COMPANY_DATE_FORMATS), Some(date(2020, 3, 25)));
        // Legacy ordering fails month-first on day-first input and has no slash fallback
        assert_eq!(normalize("25/03/2020", LEGACY_DATE_FORMATS), None);
        assert_eq!(normalize("25-03-2020", LEGACY_DATE_FORMATS), Some(date(2020, 3, 25)));
    }

    #[test]
    fn test_weekday_string_with_time_suffix() {
        let converted = "Thu Mar 10 2022 00:00:00 GMT+0530 (India Standard Time)";
        assert_eq!(normalize(converted, LLP_DATE_FORMATS), Some(date(2022, 3, 10)));
        assert_eq!(normalize(converted, COMPANY_DATE_FORMATS), Some(date(2022, 3, 10)));
        // GST records never carry this form
        assert_eq!(normalize(converted, GST_DATE_FORMATS), None);
    }

    #[test]
    fn test_weekday_must_agree_with_date() {
        assert_eq!(DateFormat::WeekdayMonthDayYear.parse("Mon Mar 10 2022"), None);
    }

    #[test]
    fn test_trailing_time_and_iso_timestamps() {
        assert_eq!(
            normalize("10/03/2022 12:00:00 AM", COMPANY_DATE_FORMATS),
            Some(date(2022, 3, 10))
        );
        assert_eq!(
            normalize("2022-03-10T00:00:00Z", GST_DATE_FORMATS),
            Some(date(2022, 3, 10))
        );
    }

    #[test]
    fn test_unparseable_values() {
        assert_eq!(normalize("", COMPANY_DATE_FORMATS), None);
        assert_eq!(normalize("   ", COMPANY_DATE_FORMATS), None);
        assert_eq!(normalize("not a date", COMPANY_DATE_FORMATS), None);
        assert_eq!(normalize("31/02/2022", COMPANY_DATE_FORMATS), None);
        // Two-digit years read as year 22 AD and are rejected
        assert_eq!(normalize("10/03/22", COMPANY_DATE_FORMATS), None);
    }

    #[test]
    fn test_format_matches_pattern() {
        let d = date(2022, 3, 10);
        assert_eq!(DateFormat::DayMonthYearSlash.format(d), "10/03/2022");
        assert_eq!(DateFormat::DayMonthYearDash.format(d), "10-03-2022");
        assert_eq!(DateFormat::MonthDayYearSlash.format(d), "03/10/2022");
        assert_eq!(DateFormat::IsoDate.format(d), "2022-03-10");
        assert_eq!(DateFormat::WeekdayMonthDayYear.format(d), "Thu Mar 10 2022");
    }
}
