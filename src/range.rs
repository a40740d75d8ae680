//! Inclusive calendar-date ranges used to filter records before aggregation.

use chrono::NaiveDate;
use serde::Serialize;

use crate::error::RangeError;

/// An inclusive `[start, end]` range of calendar days, always `start <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, RangeError> {
        if start > end {
            return Err(RangeError { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Smallest range covering every date yielded, or `None` for no dates.
    pub fn spanning(dates: impl IntoIterator<Item = NaiveDate>) -> Option<Self> {
        dates.into_iter().fold(None, |acc, d| match acc {
            None => Some(Self { start: d, end: d }),
            Some(r) => Some(Self {
                start: r.start.min(d),
                end: r.end.max(d),
            }),
        })
    }

    /// Every day in the range, ascending.
    pub fn days(self) -> impl Iterator<Item = NaiveDate> {
        let end = self.end;
        self.start.iter_days().take_while(move |d| *d <= end)
    }

    /// The range a viewer starts with: the whole data span, but ending no
    /// later than `today` unless `today` precedes the data entirely.
    pub fn default_view(bounds: DateRange, today: NaiveDate) -> Self {
        let end = bounds.end.min(today);
        if end < bounds.start {
            bounds
        } else {
            Self {
                start: bounds.start,
                end,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_reversed_bounds() {
        let err = DateRange::new(d(2025, 12, 3), d(2025, 12, 1)).unwrap_err();

        assert_eq!(err.start, d(2025, 12, 3));
    }

    #[test]
    fn test_contains_is_inclusive() {
        let range = DateRange::new(d(2025, 12, 1), d(2025, 12, 3)).unwrap();

        assert!(range.contains(d(2025, 12, 1)));
        assert!(range.contains(d(2025, 12, 3)));
        assert!(!range.contains(d(2025, 11, 30)));
        assert!(!range.contains(d(2025, 12, 4)));
    }

    #[test]
    fn test_single_day_range() {
        let range = DateRange::new(d(2025, 12, 1), d(2025, 12, 1)).unwrap();

        assert_eq!(range.days().collect::<Vec<_>>(), vec![d(2025, 12, 1)]);
    }

    #[test]
    fn test_days_crosses_month_boundary() {
        let range = DateRange::new(d(2025, 11, 29), d(2025, 12, 2)).unwrap();

        assert_eq!(range.days().count(), 4);
    }

    #[test]
    fn test_spanning() {
        assert_eq!(DateRange::spanning([]), None);

        let range = DateRange::spanning([d(2025, 12, 5), d(2025, 11, 20), d(2025, 12, 1)]).unwrap();
        assert_eq!(range.start(), d(2025, 11, 20));
        assert_eq!(range.end(), d(2025, 12, 5));
    }

    #[test]
    fn test_default_view_caps_end_at_today() {
        let bounds = DateRange::new(d(2025, 11, 1), d(2026, 2, 15)).unwrap();

        let view = DateRange::default_view(bounds, d(2026, 1, 10));
        assert_eq!(view.start(), d(2025, 11, 1));
        assert_eq!(view.end(), d(2026, 1, 10));

        let later = DateRange::default_view(bounds, d(2026, 10, 19));
        assert_eq!(later, bounds);
    }

    #[test]
    fn test_default_view_before_data_uses_full_bounds() {
        let bounds = DateRange::new(d(2025, 11, 1), d(2025, 12, 1)).unwrap();

        assert_eq!(DateRange::default_view(bounds, d(2025, 1, 1)), bounds);
    }

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }
}
