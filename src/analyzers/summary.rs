use serde::Serialize;

use crate::analyzers::aggregate::daily_totals;
use crate::analyzers::utility::mean;
use crate::range::DateRange;
use crate::records::FlightTable;

/// Headline numbers shown alongside the charts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    /// Days of the gap-filled series inside the range, including days
    /// without flights.
    pub days: usize,
    pub days_with_flights: usize,
    pub total: f64,
    pub observed: f64,
    pub estimated: f64,
    /// Mean daily total over `days`.
    pub average_per_day: f64,
}

impl Summary {
    /// Summarizes `range` of the daily series built over the whole table.
    ///
    /// Gaps are filled across every counted record before the range is
    /// applied, so empty days at either edge of the range still count.
    /// Days outside the data's own bounds do not.
    pub fn for_range(flights: &FlightTable, range: DateRange) -> Self {
        let daily: Vec<_> = daily_totals(flights.counted())
            .into_iter()
            .filter(|d| range.contains(d.date))
            .collect();
        let totals: Vec<f64> = daily.iter().map(|d| d.total).collect();

        Summary {
            days: daily.len(),
            days_with_flights: totals.iter().filter(|&&t| t > 0.0).count(),
            total: totals.iter().sum(),
            observed: daily.iter().map(|d| d.observed).sum(),
            estimated: daily.iter().map(|d| d.estimated).sum(),
            average_per_day: mean(&totals),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::FlightRecord;
    use chrono::NaiveDate;

    #[test]
    fn test_summary_counts_gap_days_in_average() {
        let flights = FlightTable::new(vec![
            FlightRecord::new(d(2025, 12, 1), Some(10.0), 6.0),
            FlightRecord::new(d(2025, 12, 1), Some(0.0), 0.0),
            FlightRecord::new(d(2025, 12, 4), Some(2.0), 2.0),
            FlightRecord::new(d(2025, 12, 9), None, 0.0),
        ]);
        let range = DateRange::new(d(2025, 11, 1), d(2025, 12, 31)).unwrap();

        let summary = Summary::for_range(&flights, range);

        assert_eq!(summary.days, 4);
        assert_eq!(summary.days_with_flights, 2);
        assert_eq!(summary.total, 12.0);
        assert_eq!(summary.observed, 8.0);
        assert_eq!(summary.estimated, 4.0);
        assert_eq!(summary.average_per_day, 3.0);
    }

    #[test]
    fn test_range_edges_on_gap_days_count_as_days() {
        let flights = FlightTable::new(vec![
            FlightRecord::new(d(2025, 12, 1), Some(10.0), 10.0),
            FlightRecord::new(d(2025, 12, 5), Some(10.0), 10.0),
            FlightRecord::new(d(2025, 12, 10), Some(10.0), 10.0),
        ]);
        let range = DateRange::new(d(2025, 12, 3), d(2025, 12, 7)).unwrap();

        let summary = Summary::for_range(&flights, range);

        assert_eq!(summary.days, 5);
        assert_eq!(summary.days_with_flights, 1);
        assert_eq!(summary.total, 10.0);
        assert_eq!(summary.average_per_day, 2.0);
    }

    #[test]
    fn test_range_past_the_data_is_clipped() {
        let flights = FlightTable::new(vec![
            FlightRecord::new(d(2025, 12, 1), Some(3.0), 3.0),
            FlightRecord::new(d(2025, 12, 2), Some(5.0), 1.0),
        ]);
        let range = DateRange::new(d(2025, 11, 25), d(2025, 12, 20)).unwrap();

        let summary = Summary::for_range(&flights, range);

        assert_eq!(summary.days, 2);
        assert_eq!(summary.average_per_day, 4.0);
    }

    #[test]
    fn test_summary_of_nothing() {
        let flights = FlightTable::new(Vec::new());
        let range = DateRange::new(d(2025, 12, 1), d(2025, 12, 31)).unwrap();

        let summary = Summary::for_range(&flights, range);

        assert_eq!(summary.days, 0);
        assert_eq!(summary.total, 0.0);
        assert_eq!(summary.average_per_day, 0.0);
    }

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }
}
