use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::range::DateRange;

/// Computes the arithmetic mean of a slice of values. Returns 0.0 for empty input.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Groups `items` by `key` and folds each group into a fresh `A`.
///
/// Items whose key is `None` are skipped. Groups come back in ascending key
/// order.
pub fn group_by<I, K, A>(
    items: impl IntoIterator<Item = I>,
    key: impl Fn(&I) -> Option<K>,
    mut fold: impl FnMut(&mut A, &I),
) -> BTreeMap<K, A>
where
    K: Ord,
    A: Default,
{
    let mut groups: BTreeMap<K, A> = BTreeMap::new();
    for item in items {
        if let Some(k) = key(&item) {
            fold(groups.entry(k).or_default(), &item);
        }
    }
    groups
}

/// A per-day aggregate row that can stand in for a day with no activity.
pub trait DailyRow {
    fn date(&self) -> NaiveDate;
    fn zero(date: NaiveDate) -> Self;
}

/// Expands per-day rows into a contiguous, ascending daily series.
///
/// Every day from the earliest to the latest input date appears exactly
/// once; missing days are filled with [`DailyRow::zero`]. Input should hold
/// at most one row per date (a later duplicate replaces an earlier one).
/// Empty input gives an empty series.
pub fn fill_daily<R: DailyRow>(rows: impl IntoIterator<Item = R>) -> Vec<R> {
    let mut by_date: BTreeMap<NaiveDate, R> = rows.into_iter().map(|r| (r.date(), r)).collect();

    let Some(range) = DateRange::spanning(by_date.keys().copied()) else {
        return Vec::new();
    };

    range
        .days()
        .map(|day| by_date.remove(&day).unwrap_or_else(|| R::zero(day)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Day {
        date: NaiveDate,
        value: u32,
        note: String,
    }

    impl DailyRow for Day {
        fn date(&self) -> NaiveDate {
            self.date
        }

        fn zero(date: NaiveDate) -> Self {
            Day {
                date,
                value: 0,
                note: String::new(),
            }
        }
    }

    #[test]
    fn test_mean() {
        assert_eq!(mean(&[]), 0.0);
        assert_eq!(mean(&[2.0, 4.0]), 3.0);
    }

    #[test]
    fn test_group_by_skips_missing_keys_and_sorts() {
        let words = ["pear", "apple", "plum", "", "avocado"];

        let groups = group_by(
            words,
            |w| w.chars().next(),
            |count: &mut usize, _| *count += 1,
        );

        assert_eq!(groups.into_iter().collect::<Vec<_>>(), vec![('a', 2), ('p', 2)]);
    }

    #[test]
    fn test_fill_daily_inserts_zero_rows() {
        let rows = vec![day(2025, 12, 3, 4, "late"), day(2025, 12, 1, 10, "early")];

        let filled = fill_daily(rows);

        assert_eq!(filled.len(), 3);
        assert_eq!(filled[0], day(2025, 12, 1, 10, "early"));
        assert_eq!(filled[1], Day::zero(d(2025, 12, 2)));
        assert_eq!(filled[2], day(2025, 12, 3, 4, "late"));
    }

    #[test]
    fn test_fill_daily_empty_input() {
        let filled: Vec<Day> = fill_daily(Vec::new());

        assert!(filled.is_empty());
    }

    #[test]
    fn test_fill_daily_is_contiguous_across_months() {
        let filled = fill_daily(vec![day(2025, 11, 28, 1, ""), day(2026, 1, 2, 1, "")]);

        assert_eq!(filled.len(), 36);
        for pair in filled.windows(2) {
            assert_eq!(pair[0].date.succ_opt(), Some(pair[1].date));
        }
    }

    fn day(y: i32, m: u32, dd: u32, value: u32, note: &str) -> Day {
        Day {
            date: d(y, m, dd),
            value,
            note: note.to_string(),
        }
    }

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }
}
