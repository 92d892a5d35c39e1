//! Month-end calendar used as the sampling grid for monthly close prices.
//!
//! A month-end date is the last calendar day of a month. Only fully closed
//! months are eligible: the month containing "now" is included only when
//! "now" is itself its last day.

use chrono::{Datelike, Months, NaiveDate};

/// Date format of the month-end keys written to and read from sheets.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Returns the last calendar day of the month containing `date`.
#[must_use]
pub fn month_end(date: NaiveDate) -> NaiveDate {
    let (year, month) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1)
        .and_then(|first| first.pred_opt())
        .unwrap_or(NaiveDate::MAX)
}

/// All month-end dates `d` with `start <= d <= end`, ascending.
#[must_use]
pub fn month_ends_between(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    let mut dates = Vec::new();
    let mut current = month_end(start);
    while current <= end {
        if current >= start {
            dates.push(current);
        }
        let Some(next) = current.succ_opt() else {
            break;
        };
        current = month_end(next);
    }
    dates
}

/// Month-end dates from `years` years before `now` up to `now`.
///
/// The month containing `now` is dropped unless `now` is its last day.
#[must_use]
pub fn eligible_month_ends(now: NaiveDate, years: u32) -> Vec<NaiveDate> {
    let start = now
        .checked_sub_months(Months::new(years.saturating_mul(12)))
        .unwrap_or(NaiveDate::MIN);
    month_ends_between(start, now)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_month_end() {
        assert_eq!(month_end(date(2024, 2, 10)), date(2024, 2, 29));
        assert_eq!(month_end(date(2023, 2, 1)), date(2023, 2, 28));
        assert_eq!(month_end(date(2024, 12, 5)), date(2024, 12, 31));
        assert_eq!(month_end(date(2024, 4, 30)), date(2024, 4, 30));
    }

    #[test]
    fn test_incomplete_month_excluded() {
        let dates = eligible_month_ends(date(2024, 3, 15), 20);
        assert_eq!(dates.last(), Some(&date(2024, 2, 29)));
        assert_eq!(dates.first(), Some(&date(2004, 3, 31)));
        assert_eq!(dates.len(), 240);
    }

    #[test]
    fn test_month_end_now_included() {
        let dates = eligible_month_ends(date(2024, 2, 29), 20);
        assert_eq!(dates.last(), Some(&date(2024, 2, 29)));
        assert_eq!(dates.first(), Some(&date(2004, 2, 29)));
        assert_eq!(dates.len(), 241);
    }

    #[test]
    fn test_month_ends_between_is_ascending_and_bounded() {
        let dates = month_ends_between(date(2023, 11, 30), date(2024, 1, 30));
        assert_eq!(dates, vec![date(2023, 11, 30), date(2023, 12, 31)]);
    }

    #[test]
    fn test_zero_years() {
        assert!(eligible_month_ends(date(2024, 3, 15), 0).is_empty());
        assert_eq!(
            eligible_month_ends(date(2024, 3, 31), 0),
            vec![date(2024, 3, 31)]
        );
    }
}
