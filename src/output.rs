//! Output formatting for aggregated views.
//!
//! Debug logging of values plus CSV and JSON writers for view rows.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use anyhow::{Context, Result};
use csv::WriterBuilder;
use serde::Serialize;
use tracing::{debug, info};

use crate::analyzers::analyzer::ViewData;

/// Serialization format for view rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Format {
    #[default]
    Csv,
    Json,
}

impl std::str::FromStr for Format {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(Format::Csv),
            "json" => Ok(Format::Json),
            other => Err(format!("unknown format `{other}` (expected csv or json)")),
        }
    }
}

/// Logs a value using Rust's debug pretty-print format.
pub fn print_pretty(value: &impl std::fmt::Debug) {
    debug!("{:#?}", value);
}

/// Writes `rows` as CSV with a header line.
pub fn write_csv<W: Write, T: Serialize>(writer: W, rows: &[T]) -> Result<()> {
    let mut writer = WriterBuilder::new().has_headers(true).from_writer(writer);

    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;

    Ok(())
}

/// Writes `rows` as a pretty-printed JSON array.
pub fn write_json<W: Write, T: Serialize>(mut writer: W, rows: &[T]) -> Result<()> {
    serde_json::to_writer_pretty(&mut writer, rows)?;
    writeln!(writer)?;
    Ok(())
}

/// Writes the rows of `data` in `format`.
pub fn write_view<W: Write>(writer: W, data: &ViewData, format: Format) -> Result<()> {
    match data {
        ViewData::Daily(rows) => write_rows(writer, rows, format),
        ViewData::Flights(rows) => write_rows(writer, rows, format),
        ViewData::Offloaded(rows) => write_rows(writer, rows, format),
        ViewData::Categories(_, rows) => write_rows(writer, rows, format),
    }
}

fn write_rows<W: Write, T: Serialize>(writer: W, rows: &[T], format: Format) -> Result<()> {
    match format {
        Format::Csv => write_csv(writer, rows),
        Format::Json => write_json(writer, rows),
    }
}

/// Writes `data` to the file at `path`, or to stdout when `path` is `None`.
pub fn emit_view(path: Option<&Path>, data: &ViewData, format: Format) -> Result<()> {
    match path {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("creating output file {}", path.display()))?;
            write_view(file, data, format)?;
            info!(path = %path.display(), rows = data.len(), "View written");
        }
        None => write_view(io::stdout().lock(), data, format)?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzers::types::{Category, CategoryTotal, DailyTotal};
    use chrono::NaiveDate;
    use std::fs;

    #[test]
    fn test_print_pretty_does_not_panic() {
        print_pretty(&daily_rows());
    }

    #[test]
    fn test_write_csv_daily_rows() {
        let mut buf = Vec::new();
        write_csv(&mut buf, &daily_rows()).unwrap();

        let content = String::from_utf8(buf).unwrap();
        let lines: Vec<_> = content.lines().collect();
        assert_eq!(lines[0], "date,total,observed,estimated,est_method");
        assert_eq!(lines[1], "2025-12-01,10.0,6.0,4.0,");
        assert_eq!(lines.len(), 2);
    }

    #[test]
    fn test_write_json_category_rows() {
        let data = ViewData::Categories(
            Category::Airline,
            vec![CategoryTotal {
                key: "Delta".to_string(),
                total: 5.0,
                observed: 3.0,
                estimated: 2.0,
                est_method: String::new(),
            }],
        );

        let mut buf = Vec::new();
        write_view(&mut buf, &data, Format::Json).unwrap();

        let parsed: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(parsed[0]["key"], "Delta");
        assert_eq!(parsed[0]["total"], 5.0);
    }

    #[test]
    fn test_emit_view_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("daily.csv");

        emit_view(Some(&path), &ViewData::Daily(daily_rows()), Format::Csv).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("date,"));
        assert_eq!(content.lines().count(), 2);
    }

    #[test]
    fn test_emit_view_to_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope").join("daily.csv");

        assert!(emit_view(Some(&path), &ViewData::Daily(vec![]), Format::Csv).is_err());
    }

    #[test]
    fn test_format_from_str() {
        assert_eq!("JSON".parse::<Format>(), Ok(Format::Json));
        assert!("xml".parse::<Format>().is_err());
    }

    fn daily_rows() -> Vec<DailyTotal> {
        vec![DailyTotal {
            date: NaiveDate::from_ymd_opt(2025, 12, 1).unwrap(),
            total: 10.0,
            observed: 6.0,
            estimated: 4.0,
            est_method: String::new(),
        }]
    }
}
