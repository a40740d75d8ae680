use std::fmt;
use std::str::FromStr;

use tracing::debug;

use crate::analyzers::aggregate::{by_category, daily_totals, flights_per_day, offloaded_per_day};
use crate::analyzers::types::{Category, CategoryTotal, DailyTotal, FlightCount, OffloadedCount};
use crate::range::DateRange;
use crate::records::{FlightRecord, FlightTable};

/// The charts a viewer can switch between.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    DailyDetainees,
    FlightsPerDay,
    DetaineesOffloaded,
    DetaineesByAirline,
    DetaineesByDestination,
    DetaineesByFinalDestination,
    DetaineesByTail,
}

static VIEW_NAMES: &[(View, &str)] = &[
    (View::DailyDetainees, "daily-detainees"),
    (View::FlightsPerDay, "flights-per-day"),
    (View::DetaineesOffloaded, "detainees-offloaded"),
    (View::DetaineesByAirline, "detainees-by-airline"),
    (View::DetaineesByDestination, "detainees-by-destination"),
    (View::DetaineesByFinalDestination, "detainees-by-final-destination"),
    (View::DetaineesByTail, "detainees-by-tail"),
];

impl View {
    pub fn title(self) -> &'static str {
        match self {
            View::DailyDetainees => "Daily Detainees Flown",
            View::FlightsPerDay => "Flights per Day",
            View::DetaineesOffloaded => "Detainees Offloaded per Day",
            View::DetaineesByAirline => "Detainees by Airline",
            View::DetaineesByDestination => "Detainees by Destination",
            View::DetaineesByFinalDestination => "Detainees by Final Destination",
            View::DetaineesByTail => "Detainees by Aircraft",
        }
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = VIEW_NAMES
            .iter()
            .find(|(v, _)| v == self)
            .map(|(_, name)| *name)
            .unwrap_or("unknown");
        f.write_str(name)
    }
}

impl FromStr for View {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('_', "-");
        VIEW_NAMES
            .iter()
            .find(|(_, name)| *name == wanted)
            .map(|(v, _)| *v)
            .ok_or_else(|| {
                let known: Vec<&str> = VIEW_NAMES.iter().map(|(_, n)| *n).collect();
                format!("unknown view `{s}` (expected one of: {})", known.join(", "))
            })
    }
}

/// Aggregated rows for one view.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewData {
    Daily(Vec<DailyTotal>),
    Flights(Vec<FlightCount>),
    Offloaded(Vec<OffloadedCount>),
    Categories(Category, Vec<CategoryTotal>),
}

impl ViewData {
    pub fn len(&self) -> usize {
        match self {
            ViewData::Daily(rows) => rows.len(),
            ViewData::Flights(rows) => rows.len(),
            ViewData::Offloaded(rows) => rows.len(),
            ViewData::Categories(_, rows) => rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Filters `flights` to `range` and builds the rows behind `view`.
pub fn build_view(flights: &FlightTable, range: DateRange, view: View) -> ViewData {
    let records = flights.within(range);
    debug!(%view, records = records.len(), start = %range.start(), end = %range.end(), "Building view");

    let records = records.into_iter();
    match view {
        View::DailyDetainees => ViewData::Daily(daily_totals(records)),
        View::FlightsPerDay => ViewData::Flights(flights_per_day(records)),
        View::DetaineesOffloaded => ViewData::Offloaded(offloaded_per_day(records)),
        View::DetaineesByAirline => category(records, Category::Airline),
        View::DetaineesByDestination => category(records, Category::Destination),
        View::DetaineesByFinalDestination => category(records, Category::FinalDestination),
        View::DetaineesByTail => category(records, Category::Tail),
    }
}

fn category<'a>(
    records: impl IntoIterator<Item = &'a FlightRecord>,
    category: Category,
) -> ViewData {
    ViewData::Categories(category, by_category(records, category))
}
