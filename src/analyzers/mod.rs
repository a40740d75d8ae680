//! Aggregation of flight records into chart-ready views.
//!
//! Records are filtered to a date range, grouped by day or by category, and
//! reduced into detainee totals with merged estimation methods. Day-keyed
//! results are gap-filled so every day in the span has a row.

pub mod aggregate;
pub mod analyzer;
pub mod summary;
pub mod types;
pub mod utility;
