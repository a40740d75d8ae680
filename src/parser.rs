//! Raw table reader for the flight spreadsheet.
//!
//! Turns a loosely shaped table (title row, header row, trailing spacer and
//! totals rows) into a header list plus untyped data rows.

use std::borrow::Cow;
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use tracing::debug;

use crate::error::LoadError;

/// A single untyped cell as supplied by a table source.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Text(String),
    Number(f64),
    Date(NaiveDateTime),
}

impl Cell {
    /// Builds a cell from raw text, treating blank text as [`Cell::Empty`].
    pub fn from_text(raw: &str) -> Self {
        if raw.trim().is_empty() {
            Cell::Empty
        } else {
            Cell::Text(raw.to_string())
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }

    /// Trimmed textual form of the cell, or `None` when empty.
    pub fn as_text(&self) -> Option<Cow<'_, str>> {
        match self {
            Cell::Empty => None,
            Cell::Text(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    None
                } else {
                    Some(Cow::Borrowed(trimmed))
                }
            }
            Cell::Number(n) => Some(Cow::Owned(n.to_string())),
            Cell::Date(d) => Some(Cow::Owned(d.to_string())),
        }
    }
}

/// Row positions used to locate the header and data in a source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TableLayout {
    /// Title row, header row at index 1, data from index 2, and a blank
    /// spacer plus totals row at the end.
    #[default]
    Spreadsheet,
    /// Header row at index 0 followed directly by data rows.
    Export,
}

impl TableLayout {
    fn header_index(self) -> usize {
        match self {
            TableLayout::Spreadsheet => 1,
            TableLayout::Export => 0,
        }
    }

    fn trailing_rows(self) -> usize {
        match self {
            TableLayout::Spreadsheet => 2,
            TableLayout::Export => 0,
        }
    }

    fn min_rows(self) -> usize {
        match self {
            TableLayout::Spreadsheet => 4,
            TableLayout::Export => 1,
        }
    }
}

impl std::str::FromStr for TableLayout {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "spreadsheet" => Ok(TableLayout::Spreadsheet),
            "export" => Ok(TableLayout::Export),
            other => Err(format!("unknown table layout `{other}`")),
        }
    }
}

/// Anything that can hand over the full grid of cells, row by row.
pub trait TableSource {
    fn read_rows(&self) -> Result<Vec<Vec<Cell>>, LoadError>;
}

impl TableSource for Vec<Vec<Cell>> {
    fn read_rows(&self) -> Result<Vec<Vec<Cell>>, LoadError> {
        Ok(self.clone())
    }
}

/// A CSV file read without header interpretation; every line becomes a row,
/// empty lines included.
pub struct CsvSource {
    path: PathBuf,
}

impl CsvSource {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl TableSource for CsvSource {
    fn read_rows(&self) -> Result<Vec<Vec<Cell>>, LoadError> {
        let bytes = std::fs::read(&self.path)?;
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(bytes.as_slice());

        let mut rows = Vec::new();
        for result in rdr.records() {
            let record = result?;
            // csv skips empty lines; put them back so row positions hold.
            if let Some(pos) = record.position() {
                let blanks = blank_lines_before(&bytes, pos.byte() as usize);
                rows.extend(std::iter::repeat_with(Vec::new).take(blanks));
            }
            rows.push(record.iter().map(Cell::from_text).collect());
        }

        debug!(path = %self.path.display(), rows = rows.len(), "CSV source read");
        Ok(rows)
    }
}

/// Number of empty lines directly before the record that starts at or after
/// byte `from`.
fn blank_lines_before(bytes: &[u8], from: usize) -> usize {
    let is_break = |b: &u8| matches!(b, b'\r' | b'\n');

    let from = from.min(bytes.len());
    let content = from + bytes[from..].iter().take_while(|b| is_break(b)).count();
    let run_start = bytes[..content]
        .iter()
        .rposition(|b| !is_break(b))
        .map_or(0, |i| i + 1);

    let run = &bytes[run_start..content];
    let breaks = run
        .iter()
        .enumerate()
        .filter(|&(i, &b)| b == b'\n' || (b == b'\r' && run.get(i + 1) != Some(&b'\n')))
        .count();

    // Past the first record, one break in the run ends the previous record.
    if run_start == 0 {
        breaks
    } else {
        breaks.saturating_sub(1)
    }
}

/// One data row, remembering its 1-based position in the source.
#[derive(Debug, Clone)]
pub struct RawRow {
    pub line: usize,
    pub cells: Vec<Cell>,
}

impl RawRow {
    /// Cell at column `idx`; short rows read as empty.
    pub fn cell(&self, idx: usize) -> &Cell {
        self.cells.get(idx).unwrap_or(&Cell::Empty)
    }

    pub fn is_blank(&self) -> bool {
        self.cells.iter().all(Cell::is_empty)
    }
}

/// Header names plus data rows, exactly as the source laid them out.
#[derive(Debug, Clone)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<RawRow>,
}

impl RawTable {
    /// Position of the first header equal to any of `names`, tried in order.
    pub fn column(&self, names: &[&str]) -> Option<usize> {
        names
            .iter()
            .find_map(|name| self.headers.iter().position(|h| h == name))
    }
}

/// Reads `source` and slices it according to `layout`.
///
/// # Errors
///
/// Returns [`LoadError::TooFewRows`] when the source is smaller than the
/// layout requires, or any error raised by the source itself.
pub fn read_table(source: &impl TableSource, layout: TableLayout) -> Result<RawTable, LoadError> {
    let mut rows = source.read_rows()?;

    if rows.len() < layout.min_rows() {
        return Err(LoadError::TooFewRows {
            found: rows.len(),
            min: layout.min_rows(),
        });
    }

    rows.truncate(rows.len() - layout.trailing_rows());

    let header_idx = layout.header_index();
    let headers = rows[header_idx]
        .iter()
        .map(|c| c.as_text().map(|t| t.into_owned()).unwrap_or_default())
        .collect();

    let rows = rows
        .into_iter()
        .enumerate()
        .skip(header_idx + 1)
        .map(|(i, cells)| RawRow { line: i + 1, cells })
        .collect();

    Ok(RawTable { headers, rows })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spreadsheet_layout_skips_title_and_trailer() {
        let source = grid(&[
            &["Flights out of MSP", "", ""],
            &["Date", "Deportees", "Airline"],
            &["2025-12-01", "10", "Delta"],
            &["2025-12-02", "4", ""],
            &["", "", ""],
            &["", "14", ""],
        ]);

        let table = read_table(&source, TableLayout::Spreadsheet).unwrap();

        assert_eq!(table.headers, vec!["Date", "Deportees", "Airline"]);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0].line, 3);
        assert_eq!(table.rows[1].cell(1), &Cell::Text("4".to_string()));
        assert!(table.rows[1].cell(2).is_empty());
    }

    #[test]
    fn test_spreadsheet_with_only_header_and_trailer_has_no_rows() {
        let source = grid(&[&["Title"], &["Date"], &[""], &["0"]]);

        let table = read_table(&source, TableLayout::Spreadsheet).unwrap();

        assert!(table.rows.is_empty());
    }

    #[test]
    fn test_too_few_rows_is_fatal() {
        let source = grid(&[&["Title"], &["Date"], &["2025-12-01"]]);

        let err = read_table(&source, TableLayout::Spreadsheet).unwrap_err();

        assert!(matches!(err, LoadError::TooFewRows { found: 3, min: 4 }));
    }

    #[test]
    fn test_export_layout_keeps_every_data_row() {
        let source = grid(&[&["Date", "Deportees"], &["2025-12-01", "3"]]);

        let table = read_table(&source, TableLayout::Export).unwrap();

        assert_eq!(table.headers, vec!["Date", "Deportees"]);
        assert_eq!(table.rows.len(), 1);
        assert_eq!(table.rows[0].line, 2);
    }

    #[test]
    fn test_empty_export_is_fatal() {
        let source: Vec<Vec<Cell>> = vec![];

        assert!(read_table(&source, TableLayout::Export).is_err());
    }

    #[test]
    fn test_short_row_reads_as_empty() {
        let row = RawRow {
            line: 1,
            cells: vec![Cell::Text("a".into())],
        };

        assert!(row.cell(5).is_empty());
    }

    #[test]
    fn test_column_lookup_tries_aliases_in_order() {
        let table = RawTable {
            headers: vec!["Day's Route".into(), "To".into()],
            rows: vec![],
        };

        assert_eq!(table.column(&["Day’s Route", "Day's Route"]), Some(0));
        assert_eq!(table.column(&["Tail"]), None);
    }

    #[test]
    fn test_layout_from_str() {
        assert_eq!("Export".parse::<TableLayout>(), Ok(TableLayout::Export));
        assert_eq!(
            "spreadsheet".parse::<TableLayout>(),
            Ok(TableLayout::Spreadsheet)
        );
        assert!("numbers".parse::<TableLayout>().is_err());
    }

    #[test]
    fn test_csv_source_reads_ragged_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("flights.csv");
        std::fs::write(&path, "Title\nDate,Deportees\n2025-12-01,5\n\n,5\n").unwrap();

        let rows = CsvSource::new(&path).read_rows().unwrap();

        assert_eq!(rows.len(), 5);
        assert_eq!(rows[0], vec![Cell::Text("Title".into())]);
        assert_eq!(rows[2][1], Cell::Text("5".into()));
        assert!(rows[3].is_empty());
        assert!(rows.last().unwrap()[0].is_empty());
    }

    #[test]
    fn test_csv_source_keeps_empty_lines_in_place() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("flights.csv");
        std::fs::write(
            &path,
            "\r\nTitle\r\nDate,Route\r\n2025-12-01,\"MSP-\r\n\r\nELP\"\r\n\r\n\r\n,5\r\n\r\n",
        )
        .unwrap();

        let rows = CsvSource::new(&path).read_rows().unwrap();

        assert_eq!(rows.len(), 7);
        assert!(rows[0].is_empty());
        assert_eq!(rows[1], vec![Cell::Text("Title".into())]);
        assert_eq!(rows[3][1], Cell::Text("MSP-\r\n\r\nELP".into()));
        assert!(rows[4].is_empty());
        assert!(rows[5].is_empty());
        assert_eq!(rows[6][1], Cell::Text("5".into()));
    }

    #[test]
    fn test_blank_lines_before() {
        assert_eq!(blank_lines_before(b"a\n\n\nb\n", 2), 2);
        assert_eq!(blank_lines_before(b"a\r\n\r\nb", 3), 1);
        assert_eq!(blank_lines_before(b"a\r\nb", 3), 0);
        assert_eq!(blank_lines_before(b"\n\na", 0), 2);
        assert_eq!(blank_lines_before(b"a,\"x\n\"\n\nb", 7), 1);
    }

    fn grid(rows: &[&[&str]]) -> Vec<Vec<Cell>> {
        rows.iter()
            .map(|r| r.iter().map(|c| Cell::from_text(c)).collect())
            .collect()
    }
}
