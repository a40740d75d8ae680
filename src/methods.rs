//! Estimation method codes and their merged descriptions.

use std::collections::BTreeSet;

use serde::Serialize;

/// How an estimated detainee count was derived.
///
/// Variants are declared in alphabetical order of their codes so that the
/// derived `Ord` sorts them the same way the codes sort.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum EstMethod {
    Average,
    Observer,
    Vehicle,
}

impl EstMethod {
    /// Parses a single-letter code. Surrounding whitespace is ignored;
    /// anything outside the vocabulary yields `None`.
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim() {
            "A" => Some(EstMethod::Average),
            "O" => Some(EstMethod::Observer),
            "V" => Some(EstMethod::Vehicle),
            _ => None,
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            EstMethod::Vehicle => {
                "Formula based on the number and types of vehicles bringing detainees to the flight"
            }
            EstMethod::Average => "Average based on similar flights in same timeframe",
            EstMethod::Observer => {
                "Estimate based on an observer who was present, but not directly counting"
            }
        }
    }
}

/// Joins the descriptions of the distinct `methods`, alphabetical by code,
/// with `"; "`. No methods gives an empty string.
pub fn summarize(methods: impl IntoIterator<Item = EstMethod>) -> String {
    methods
        .into_iter()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(EstMethod::description)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Same as [`summarize`], starting from raw codes; unknown codes are dropped.
pub fn summarize_codes<S: AsRef<str>>(codes: impl IntoIterator<Item = S>) -> String {
    summarize(
        codes
            .into_iter()
            .filter_map(|c| EstMethod::from_code(c.as_ref())),
    )
}
