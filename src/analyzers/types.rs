//! Row types produced by the aggregators and handed to the chart layer.

use chrono::NaiveDate;
use serde::Serialize;

use crate::analyzers::utility::DailyRow;
use crate::records::{FlightRecord, normalize_airline};

/// Detainee counts for one calendar day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyTotal {
    pub date: NaiveDate,
    pub total: f64,
    pub observed: f64,
    pub estimated: f64,
    pub est_method: String,
}

/// Number of flights on one calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlightCount {
    pub date: NaiveDate,
    pub flights: usize,
}

/// Detainees offloaded on one calendar day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OffloadedCount {
    pub date: NaiveDate,
    pub offloaded: f64,
}

/// Detainee counts for one airline, airport or aircraft.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryTotal {
    pub key: String,
    pub total: f64,
    pub observed: f64,
    pub estimated: f64,
    pub est_method: String,
}

/// Record field a categorical breakdown is keyed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Airline,
    Destination,
    FinalDestination,
    Tail,
}

impl Category {
    /// Bucket key for `record`, or `None` when the field is missing.
    pub fn key(self, record: &FlightRecord) -> Option<String> {
        let field = match self {
            Category::Airline => return record.airline.as_deref().and_then(normalize_airline),
            Category::Destination => record.destination.as_deref(),
            Category::FinalDestination => record.final_destination.as_deref(),
            Category::Tail => record.tail.as_deref(),
        };
        field
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    }
}

impl DailyRow for DailyTotal {
    fn date(&self) -> NaiveDate {
        self.date
    }

    fn zero(date: NaiveDate) -> Self {
        DailyTotal {
            date,
            total: 0.0,
            observed: 0.0,
            estimated: 0.0,
            est_method: String::new(),
        }
    }
}

impl DailyRow for FlightCount {
    fn date(&self) -> NaiveDate {
        self.date
    }

    fn zero(date: NaiveDate) -> Self {
        FlightCount { date, flights: 0 }
    }
}

impl DailyRow for OffloadedCount {
    fn date(&self) -> NaiveDate {
        self.date
    }

    fn zero(date: NaiveDate) -> Self {
        OffloadedCount {
            date,
            offloaded: 0.0,
        }
    }
}
