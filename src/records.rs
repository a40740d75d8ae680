//! Flight records and the normalizer that builds them from a raw table.
//!
//! Normalization runs in two steps. Each data row is first coerced into a
//! bare [`FlightRecord`] (date and counts typed, text fields trimmed), then
//! the records pass through a fixed list of pure stages that fill in the
//! derived fields.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Offset, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::LoadError;
use crate::methods::EstMethod;
use crate::parser::{Cell, RawRow, RawTable, TableLayout, TableSource, read_table};
use crate::range::DateRange;

const DATE: &str = "Date";
const DAY: &str = "Day";
const ARRIVE: &str = "Arrive";
const TOTAL: &str = "Deportees";
const OBSERVED: &str = "Deportee (observed)";
const EST_METHOD: &[&str] = &[
    "Est Method (Vehicle, Average, Observer Estimate)",
    "Est Method",
    "Est_Method",
];
const ROUTE: &[&str] = &["Day’s Route", "Day's Route"];
const AIRLINE: &str = "Airline";
const DESTINATION: &str = "To";
const TAIL: &str = "Tail";
const OFFLOADED: &str = "Deportees Off";

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y", "%a %b %d %Y", "%b %d, %Y", "%d %b %Y"];
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %I:%M %p",
];

/// One flight leg.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlightRecord {
    /// 1-based line of the source row, 0 for records built in memory.
    pub line: usize,
    pub date: NaiveDate,
    pub total: Option<f64>,
    pub observed: f64,
    /// `total - observed`; `None` exactly when `total` is.
    pub estimated: Option<f64>,
    pub airline: Option<String>,
    pub destination: Option<String>,
    pub route: Option<String>,
    pub final_destination: Option<String>,
    pub tail: Option<String>,
    pub est_method: Option<EstMethod>,
    pub offloaded: f64,
}

impl FlightRecord {
    pub fn new(date: NaiveDate, total: Option<f64>, observed: f64) -> Self {
        with_estimate(FlightRecord {
            line: 0,
            date,
            total,
            observed,
            estimated: None,
            airline: None,
            destination: None,
            route: None,
            final_destination: None,
            tail: None,
            est_method: None,
            offloaded: 0.0,
        })
    }

    pub fn with_airline(mut self, airline: &str) -> Self {
        self.airline = normalize_airline(airline);
        self
    }

    pub fn with_destination(mut self, destination: &str) -> Self {
        self.destination = trimmed(destination);
        self
    }

    /// Sets the route and derives the final destination from it.
    pub fn with_route(mut self, route: &str) -> Self {
        self.route = trimmed(route);
        with_final_destination(self)
    }

    pub fn with_tail(mut self, tail: &str) -> Self {
        self.tail = trimmed(tail);
        self
    }

    pub fn with_method(mut self, method: EstMethod) -> Self {
        self.est_method = Some(method);
        self
    }

    pub fn with_offloaded(mut self, offloaded: f64) -> Self {
        self.offloaded = offloaded;
        self
    }

    /// Whether the record takes part in aggregation.
    pub fn is_counted(&self) -> bool {
        self.total.is_some()
    }
}

/// Trims and title-cases an airline name; blank names become `None`.
pub fn normalize_airline(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    let mut out = String::with_capacity(trimmed.len());
    let mut prev_cased = false;
    for ch in trimmed.chars() {
        if prev_cased {
            out.extend(ch.to_lowercase());
        } else {
            out.extend(ch.to_uppercase());
        }
        prev_cased = ch.is_alphabetic();
    }
    Some(out)
}

/// Where the detainees on a dash-separated route were taken.
///
/// A closing leg back to the route's origin (an aircraft returning to base)
/// is ignored. The last remaining stop is the destination, or the stop before
/// it when the route ends back at MSP.
pub fn final_destination(route: &str) -> Option<String> {
    let mut stops: Vec<&str> = route
        .split('-')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();

    if stops.len() >= 3 && stops[0].eq_ignore_ascii_case(stops[stops.len() - 1]) {
        stops.pop();
    }

    let stop = match stops.as_slice() {
        [] => return None,
        [.., prev, last] if last.eq_ignore_ascii_case("MSP") => prev,
        [.., last] => last,
    };
    Some(stop.to_uppercase())
}

type Stage = fn(FlightRecord) -> FlightRecord;

/// Derivations applied, in order, to every coerced record.
const STAGES: &[Stage] = &[with_estimate, with_final_destination, with_normalized_airline];

fn with_estimate(mut record: FlightRecord) -> FlightRecord {
    record.estimated = record.total.map(|total| total - record.observed);
    record
}

fn with_final_destination(mut record: FlightRecord) -> FlightRecord {
    record.final_destination = record.route.as_deref().and_then(final_destination);
    record
}

fn with_normalized_airline(mut record: FlightRecord) -> FlightRecord {
    record.airline = record.airline.as_deref().and_then(normalize_airline);
    record
}

/// Summary of a load, logged once the table is built.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LoadReport {
    pub data_rows: usize,
    pub blank_rows: usize,
    pub records: usize,
    pub counted: usize,
    pub negative_estimates: usize,
}

/// The immutable, normalized record set.
#[derive(Debug, Clone, Default)]
pub struct FlightTable {
    records: Vec<FlightRecord>,
    report: LoadReport,
}

impl FlightTable {
    pub fn new(records: Vec<FlightRecord>) -> Self {
        let report = LoadReport {
            data_rows: records.len(),
            records: records.len(),
            counted: records.iter().filter(|r| r.is_counted()).count(),
            negative_estimates: records
                .iter()
                .filter(|r| r.estimated.is_some_and(|e| e < 0.0))
                .count(),
            blank_rows: 0,
        };
        Self { records, report }
    }

    /// Every normalized record, including those without a total.
    pub fn records(&self) -> &[FlightRecord] {
        &self.records
    }

    pub fn report(&self) -> &LoadReport {
        &self.report
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records with a total, the set every aggregate is built from.
    pub fn counted(&self) -> impl Iterator<Item = &FlightRecord> {
        self.records.iter().filter(|r| r.is_counted())
    }

    /// Counted records dated within `range`.
    pub fn within(&self, range: DateRange) -> Vec<&FlightRecord> {
        self.counted().filter(|r| range.contains(r.date)).collect()
    }

    /// First and last day with a counted record.
    pub fn date_bounds(&self) -> Option<DateRange> {
        DateRange::spanning(self.counted().map(|r| r.date))
    }
}

/// How to read and interpret a source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadOptions {
    pub layout: TableLayout,
    /// Offset used to turn zoned timestamps into calendar dates.
    pub arrival_offset: FixedOffset,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            layout: TableLayout::default(),
            arrival_offset: utc(),
        }
    }
}

pub(crate) fn utc() -> FixedOffset {
    Utc.fix()
}

/// Reads `source` and normalizes it into a [`FlightTable`].
///
/// # Errors
///
/// Any [`LoadError`]; nothing is returned from a partially read source.
#[tracing::instrument(skip(source), fields(layout = ?options.layout))]
pub fn load(source: &impl TableSource, options: &LoadOptions) -> Result<FlightTable, LoadError> {
    let table = read_table(source, options.layout)?;
    info!(
        columns = table.headers.len(),
        rows = table.rows.len(),
        "Raw table read"
    );
    normalize(&table, options.arrival_offset)
}

/// Coerces every non-blank row of `table` and applies the derivation stages.
///
/// # Errors
///
/// [`LoadError::MissingColumn`] when the total or every date column is
/// missing, [`LoadError::Coercion`] when a row's date or total is unreadable.
pub fn normalize(table: &RawTable, arrival_offset: FixedOffset) -> Result<FlightTable, LoadError> {
    let columns = Columns::resolve(table)?;

    let mut blank_rows = 0;
    let mut coerced = Vec::with_capacity(table.rows.len());
    for row in &table.rows {
        if row.is_blank() {
            debug!(line = row.line, "Skipping blank row");
            blank_rows += 1;
            continue;
        }
        coerced.push(columns.coerce(row, &arrival_offset)?);
    }

    let records: Vec<FlightRecord> = coerced
        .into_iter()
        .map(|record| STAGES.iter().fold(record, |r, stage| stage(r)))
        .collect();

    for r in records.iter().filter(|r| r.estimated.is_some_and(|e| e < 0.0)) {
        warn!(
            line = r.line,
            date = %r.date,
            total = ?r.total,
            observed = r.observed,
            "Observed count exceeds total; keeping negative estimate"
        );
    }

    let mut flights = FlightTable::new(records);
    flights.report.data_rows = table.rows.len();
    flights.report.blank_rows = blank_rows;

    let report = &flights.report;
    info!(
        data_rows = report.data_rows,
        blank_rows = report.blank_rows,
        records = report.records,
        counted = report.counted,
        negative_estimates = report.negative_estimates,
        "Flight records normalized"
    );

    Ok(flights)
}

#[derive(Debug, Clone, Copy)]
enum DateColumn {
    Date(usize),
    Day(usize),
    Arrive(usize),
}

impl DateColumn {
    fn index(self) -> usize {
        match self {
            DateColumn::Date(i) | DateColumn::Day(i) | DateColumn::Arrive(i) => i,
        }
    }

    fn name(self) -> &'static str {
        match self {
            DateColumn::Date(_) => DATE,
            DateColumn::Day(_) => DAY,
            DateColumn::Arrive(_) => ARRIVE,
        }
    }
}

/// Column positions resolved once per table.
#[derive(Debug)]
struct Columns {
    date: DateColumn,
    total: usize,
    observed: Option<usize>,
    est_method: Option<usize>,
    route: Option<usize>,
    airline: Option<usize>,
    destination: Option<usize>,
    tail: Option<usize>,
    offloaded: Option<usize>,
}

impl Columns {
    fn resolve(table: &RawTable) -> Result<Self, LoadError> {
        let date = table
            .column(&[DATE])
            .map(DateColumn::Date)
            .or_else(|| table.column(&[DAY]).map(DateColumn::Day))
            .or_else(|| table.column(&[ARRIVE]).map(DateColumn::Arrive))
            .ok_or_else(|| LoadError::MissingColumn(DATE.to_string()))?;

        let total = table
            .column(&[TOTAL])
            .ok_or_else(|| LoadError::MissingColumn(TOTAL.to_string()))?;

        debug!(date_column = date.name(), "Resolved date column");

        Ok(Self {
            date,
            total,
            observed: table.column(&[OBSERVED]),
            est_method: table.column(EST_METHOD),
            route: table.column(ROUTE),
            airline: table.column(&[AIRLINE]),
            destination: table.column(&[DESTINATION]),
            tail: table.column(&[TAIL]),
            offloaded: table.column(&[OFFLOADED]),
        })
    }

    fn coerce(&self, row: &RawRow, arrival_offset: &FixedOffset) -> Result<FlightRecord, LoadError> {
        let date_cell = row.cell(self.date.index());
        let date = parse_date(date_cell, arrival_offset)
            .ok_or_else(|| coercion_error(row, self.date.name(), date_cell))?;

        let total_cell = row.cell(self.total);
        let total = parse_number(total_cell).ok_or_else(|| coercion_error(row, TOTAL, total_cell))?;

        let observed = lenient_number(row, self.observed, OBSERVED);
        let offloaded = lenient_number(row, self.offloaded, OFFLOADED);

        let est_method = text(row, self.est_method).and_then(|code| {
            let method = EstMethod::from_code(&code);
            if method.is_none() {
                debug!(line = row.line, code = %code, "Ignoring unknown estimation method");
            }
            method
        });

        Ok(FlightRecord {
            line: row.line,
            date,
            total,
            observed,
            estimated: None,
            airline: text(row, self.airline),
            destination: text(row, self.destination),
            route: text(row, self.route),
            final_destination: None,
            tail: text(row, self.tail),
            est_method,
            offloaded,
        })
    }
}

fn coercion_error(row: &RawRow, column: &str, cell: &Cell) -> LoadError {
    LoadError::Coercion {
        line: row.line,
        column: column.to_string(),
        value: cell.as_text().map(|t| t.into_owned()).unwrap_or_default(),
    }
}

fn text(row: &RawRow, idx: Option<usize>) -> Option<String> {
    idx.and_then(|i| row.cell(i).as_text().map(|t| t.into_owned()))
}

fn trimmed(raw: &str) -> Option<String> {
    let t = raw.trim();
    (!t.is_empty()).then(|| t.to_string())
}

/// Optional numeric field: absent or unreadable values count as zero.
fn lenient_number(row: &RawRow, idx: Option<usize>, column: &str) -> f64 {
    let Some(cell) = idx.map(|i| row.cell(i)) else {
        return 0.0;
    };
    match parse_number(cell) {
        Some(value) => value.unwrap_or(0.0),
        None => {
            debug!(line = row.line, column, value = ?cell, "Unreadable number treated as 0");
            0.0
        }
    }
}

/// `Some(None)` for an empty cell, `None` when the cell holds something
/// that is not a finite number.
fn parse_number(cell: &Cell) -> Option<Option<f64>> {
    match cell {
        Cell::Empty => Some(None),
        Cell::Number(n) if n.is_finite() => Some(Some(*n)),
        Cell::Number(_) | Cell::Date(_) => None,
        Cell::Text(_) => match cell.as_text() {
            None => Some(None),
            Some(text) => {
                let value: f64 = text.replace(',', "").parse().ok()?;
                value.is_finite().then_some(Some(value))
            }
        },
    }
}

fn parse_date(cell: &Cell, arrival_offset: &FixedOffset) -> Option<NaiveDate> {
    match cell {
        Cell::Date(dt) => Some(dt.date()),
        Cell::Text(_) => parse_date_text(&cell.as_text()?, arrival_offset),
        Cell::Empty | Cell::Number(_) => None,
    }
}

/// Zoned timestamps are shifted into `arrival_offset` before the date is
/// taken; plain dates and naive timestamps are used as written.
fn parse_date_text(text: &str, arrival_offset: &FixedOffset) -> Option<NaiveDate> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(text) {
        return Some(ts.with_timezone(arrival_offset).date_naive());
    }
    if let Some(date) = DATE_FORMATS
        .iter()
        .find_map(|f| NaiveDate::parse_from_str(text, f).ok())
    {
        return Some(date);
    }
    DATETIME_FORMATS
        .iter()
        .find_map(|f| NaiveDateTime::parse_from_str(text, f).ok())
        .map(|dt| dt.date())
}
