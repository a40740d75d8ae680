use std::collections::BTreeSet;

use crate::analyzers::types::{
    Category, CategoryTotal, DailyTotal, FlightCount, OffloadedCount,
};
use crate::analyzers::utility::{fill_daily, group_by};
use crate::methods::{EstMethod, summarize};
use crate::records::FlightRecord;

/// Running sums for one bucket.
#[derive(Default)]
struct Tally {
    total: f64,
    observed: f64,
    estimated: f64,
    methods: BTreeSet<EstMethod>,
}

impl Tally {
    fn add(&mut self, record: &FlightRecord) {
        self.total += record.total.unwrap_or_default();
        self.observed += record.observed;
        self.estimated += record.estimated.unwrap_or_default();
        self.methods.extend(record.est_method);
    }

    fn est_method(&self) -> String {
        summarize(self.methods.iter().copied())
    }
}

/// Only records with a total take part in any aggregate.
fn counted<'a>(
    records: impl IntoIterator<Item = &'a FlightRecord>,
) -> impl Iterator<Item = &'a FlightRecord> {
    records.into_iter().filter(|r| r.is_counted())
}

/// Sums total, observed and estimated detainees per day, merging the
/// estimation methods used that day, over a gap-free date axis.
pub fn daily_totals<'a>(records: impl IntoIterator<Item = &'a FlightRecord>) -> Vec<DailyTotal> {
    let groups = group_by(counted(records), |r| Some(r.date), |t: &mut Tally, r| t.add(r));

    fill_daily(groups.into_iter().map(|(date, t)| DailyTotal {
        date,
        total: t.total,
        observed: t.observed,
        estimated: t.estimated,
        est_method: t.est_method(),
    }))
}

/// Number of flight records per day over a gap-free date axis.
pub fn flights_per_day<'a>(records: impl IntoIterator<Item = &'a FlightRecord>) -> Vec<FlightCount> {
    let groups = group_by(
        counted(records),
        |r| Some(r.date),
        |n: &mut usize, _| *n += 1,
    );

    fill_daily(
        groups
            .into_iter()
            .map(|(date, flights)| FlightCount { date, flights }),
    )
}

/// Detainees offloaded per day over a gap-free date axis.
pub fn offloaded_per_day<'a>(
    records: impl IntoIterator<Item = &'a FlightRecord>,
) -> Vec<OffloadedCount> {
    let groups = group_by(
        counted(records),
        |r| Some(r.date),
        |sum: &mut f64, r| *sum += r.offloaded,
    );

    fill_daily(
        groups
            .into_iter()
            .map(|(date, offloaded)| OffloadedCount { date, offloaded }),
    )
}

/// Sums detainees per `category` value, skipping records without one.
///
/// Rows are sorted ascending by total, so the largest bucket comes last;
/// equal totals keep ascending key order.
pub fn by_category<'a>(
    records: impl IntoIterator<Item = &'a FlightRecord>,
    category: Category,
) -> Vec<CategoryTotal> {
    let groups = group_by(
        counted(records),
        |r| category.key(r),
        |t: &mut Tally, r| t.add(r),
    );

    let mut rows: Vec<CategoryTotal> = groups
        .into_iter()
        .map(|(key, t)| CategoryTotal {
            key,
            total: t.total,
            observed: t.observed,
            estimated: t.estimated,
            est_method: t.est_method(),
        })
        .collect();

    rows.sort_by(|a, b| a.total.total_cmp(&b.total));
    rows
}

pub fn by_airline<'a>(records: impl IntoIterator<Item = &'a FlightRecord>) -> Vec<CategoryTotal> {
    by_category(records, Category::Airline)
}

pub fn by_destination<'a>(
    records: impl IntoIterator<Item = &'a FlightRecord>,
) -> Vec<CategoryTotal> {
    by_category(records, Category::Destination)
}

pub fn by_final_destination<'a>(
    records: impl IntoIterator<Item = &'a FlightRecord>,
) -> Vec<CategoryTotal> {
    by_category(records, Category::FinalDestination)
}

pub fn by_tail<'a>(records: impl IntoIterator<Item = &'a FlightRecord>) -> Vec<CategoryTotal> {
    by_category(records, Category::Tail)
}
