//! Runtime settings, read from the environment (and `.env` via `dotenvy`).
//!
//! ```text
//! MSP_FLIGHTS_SOURCE=msp-ice-flights.csv
//! MSP_FLIGHTS_LAYOUT=spreadsheet        # or "export"
//! MSP_FLIGHTS_ARRIVAL_OFFSET=-06:00     # offset applied to Arrive timestamps
//! ```

use std::path::PathBuf;

use chrono::FixedOffset;

use crate::error::LoadError;
use crate::parser::TableLayout;
use crate::records::{LoadOptions, utc};

pub const SOURCE_VAR: &str = "MSP_FLIGHTS_SOURCE";
pub const LAYOUT_VAR: &str = "MSP_FLIGHTS_LAYOUT";
pub const ARRIVAL_OFFSET_VAR: &str = "MSP_FLIGHTS_ARRIVAL_OFFSET";

const DEFAULT_SOURCE: &str = "msp-ice-flights.csv";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub source: PathBuf,
    pub layout: TableLayout,
    pub arrival_offset: FixedOffset,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            source: PathBuf::from(DEFAULT_SOURCE),
            layout: TableLayout::default(),
            arrival_offset: utc(),
        }
    }
}

impl Settings {
    /// Reads settings from the process environment.
    pub fn from_env() -> Result<Self, LoadError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads settings through `lookup`, falling back to defaults for unset
    /// variables.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, LoadError> {
        let mut settings = Settings::default();

        if let Some(source) = lookup(SOURCE_VAR) {
            settings.source = PathBuf::from(source);
        }
        if let Some(layout) = lookup(LAYOUT_VAR) {
            settings.layout = layout.parse().map_err(|_| LoadError::InvalidSetting {
                name: LAYOUT_VAR,
                value: layout,
            })?;
        }
        if let Some(offset) = lookup(ARRIVAL_OFFSET_VAR) {
            settings.arrival_offset = parse_offset(&offset).ok_or(LoadError::InvalidSetting {
                name: ARRIVAL_OFFSET_VAR,
                value: offset,
            })?;
        }

        Ok(settings)
    }

    pub fn load_options(&self) -> LoadOptions {
        LoadOptions {
            layout: self.layout,
            arrival_offset: self.arrival_offset,
        }
    }
}

/// Parses `+HH:MM`, `-HH:MM` or `Z`.
pub fn parse_offset(raw: &str) -> Option<FixedOffset> {
    let raw = raw.trim();
    if raw.eq_ignore_ascii_case("z") || raw.eq_ignore_ascii_case("utc") {
        return Some(utc());
    }

    let (sign, rest) = match raw.as_bytes().first()? {
        b'+' => (1, &raw[1..]),
        b'-' => (-1, &raw[1..]),
        _ => return None,
    };
    let (hours, minutes) = rest.split_once(':')?;
    let hours: i32 = hours.parse().ok()?;
    let minutes: i32 = minutes.parse().ok()?;
    if !(0..60).contains(&minutes) {
        return None;
    }

    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}
