//! Calendar helpers for year-end and month-end dates.

use chrono::{Datelike, NaiveDate};

/// December 31 of `year`.
pub fn year_end(year: i32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, 12, 31)
}

/// Last day of the given month.
pub fn month_end(year: i32, month: u32) -> Option<NaiveDate> {
    let (ny, nm) = if month == 12 { (year + 1, 1) } else { (year, month + 1) };
    NaiveDate::from_ymd_opt(ny, nm, 1)?.pred_opt()
}

/// `n` consecutive month-ends, starting with the first month-end on or after
/// `anchor`.
///
/// Anchor 2022-12-01 gives 2022-12-31, 2023-01-31, ..., 2023-11-30 for `n = 12`.
pub fn month_ends_from(anchor: NaiveDate, n: usize) -> Vec<NaiveDate> {
    let mut out = Vec::with_capacity(n);
    let mut year = anchor.year();
    let mut month = anchor.month();
    while out.len() < n {
        let Some(end) = month_end(year, month) else { break };
        out.push(end);
        if month == 12 {
            year += 1;
            month = 1;
        } else {
            month += 1;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn month_end_handles_leap_years() {
        assert_eq!(month_end(2024, 2), Some(d(2024, 2, 29)));
        assert_eq!(month_end(2023, 2), Some(d(2023, 2, 28)));
        assert_eq!(month_end(2022, 12), Some(d(2022, 12, 31)));
    }

    #[test]
    fn month_ends_from_reference_anchor() {
        let dates = month_ends_from(d(2022, 12, 1), 12);
        assert_eq!(dates.len(), 12);
        assert_eq!(dates[0], d(2022, 12, 31));
        assert_eq!(dates[1], d(2023, 1, 31));
        assert_eq!(dates[11], d(2023, 11, 30));
        assert!(dates.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn anchor_on_month_end_is_included() {
        let dates = month_ends_from(d(2023, 1, 31), 2);
        assert_eq!(dates, vec![d(2023, 1, 31), d(2023, 2, 28)]);
    }
}
