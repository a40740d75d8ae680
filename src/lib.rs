pub mod analyzers;
pub mod config;
pub mod error;
pub mod methods;
pub mod output;
pub mod parser;
pub mod range;
pub mod records;

pub use error::{LoadError, RangeError};
pub use records::{FlightRecord, FlightTable, LoadOptions, load};
