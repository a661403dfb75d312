use chrono::{Datelike, Local, NaiveDate, Weekday};
use std::ops::RangeInclusive;

pub const MONTH_NAMES: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

pub fn current_year() -> i32 {
    Local::now().year()
}

pub fn current_month() -> u32 {
    Local::now().month0()
}

/// Years the calendar can represent.
pub fn supported_years() -> RangeInclusive<i32> {
    NaiveDate::MIN.year()..=NaiveDate::MAX.year()
}

pub fn clamp_year(year: i32) -> i32 {
    let years = supported_years();
    year.clamp(*years.start(), *years.end())
}

/// Year strings that are not plain integers, or fall outside the supported
/// range, count as absent.
pub fn parse_year(raw: &str) -> Option<i32> {
    raw.trim()
        .parse::<i32>()
        .ok()
        .filter(|year| supported_years().contains(year))
}

/// Zero-based month owning ISO week `week_number` of `year`.
///
/// A week belongs to the month of its Thursday, which always falls inside the
/// ISO year. Out-of-range week numbers are clamped to the year's weeks.
pub fn month_from_week(week_number: u32, year: i32) -> u32 {
    let last_week = NaiveDate::from_ymd_opt(year, 12, 28)
        .map(|date| date.iso_week().week())
        .unwrap_or(52);
    let week = week_number.clamp(1, last_week);

    NaiveDate::from_isoywd_opt(year, week, Weekday::Thu)
        .map(|thursday| thursday.month0())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_week_belongs_to_january_even_when_it_starts_in_december() {
        // 2025-W01 runs from 2024-12-30 to 2025-01-05.
        assert_eq!(month_from_week(1, 2025), 0);
        assert_eq!(month_from_week(1, 2024), 0);
    }

    #[test]
    fn last_week_belongs_to_december() {
        assert_eq!(month_from_week(52, 2024), 11);
        // 2020 has 53 ISO weeks.
        assert_eq!(month_from_week(53, 2020), 11);
    }

    #[test]
    fn mid_year_weeks_map_to_their_thursday() {
        // 2024-W14 Thursday is 2024-04-04.
        assert_eq!(month_from_week(14, 2024), 3);
        // 2024-W27 Thursday is 2024-07-04.
        assert_eq!(month_from_week(27, 2024), 6);
    }

    #[test]
    fn out_of_range_weeks_are_clamped() {
        assert_eq!(month_from_week(0, 2024), 0);
        assert_eq!(month_from_week(60, 2024), 11);
    }

    #[test]
    fn parse_year_rejects_non_numeric_input() {
        assert_eq!(parse_year("2021"), Some(2021));
        assert_eq!(parse_year(" 2021 "), Some(2021));
        assert_eq!(parse_year("20x1"), None);
        assert_eq!(parse_year(""), None);
        assert_eq!(parse_year("abc"), None);
    }

    #[test]
    fn parse_year_rejects_years_outside_the_calendar() {
        assert_eq!(parse_year(&i32::MIN.to_string()), None);
        assert_eq!(parse_year(&i32::MAX.to_string()), None);
        let max = NaiveDate::MAX.year();
        assert_eq!(parse_year(&max.to_string()), Some(max));
        assert_eq!(parse_year(&(max + 1).to_string()), None);
    }

    #[test]
    fn clamp_year_pulls_extremes_into_range() {
        assert_eq!(clamp_year(i32::MIN), NaiveDate::MIN.year());
        assert_eq!(clamp_year(i32::MAX), NaiveDate::MAX.year());
        assert_eq!(clamp_year(2024), 2024);
    }

    #[test]
    fn month_from_week_handles_calendar_extremes() {
        assert!(month_from_week(1, NaiveDate::MIN.year()) <= 11);
        assert!(month_from_week(53, NaiveDate::MAX.year()) <= 11);
    }
}
