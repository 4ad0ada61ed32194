//! Error types for the dashboard.
//!
//! Load-cycle failures (`LoadError`) stop the whole view until the next
//! refresh. Per-country failures (`SeriesError`) only affect the pane that
//! asked for that country.

use chrono::NaiveDate;
use std::path::PathBuf;
use thiserror::Error;

/// Configuration could not be read or is invalid.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("cannot read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("cannot parse {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("population for {country} must be a positive integer, got {value}")]
    Population { country: String, value: i64 },

    #[error("invalid setting {key}: {message}")]
    Invalid { key: &'static str, message: String },
}

/// The CSV document could not be acquired or parsed.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("request to {url} failed: {source}")]
    Http {
        url: String,
        source: reqwest::Error,
    },

    #[error("request to {url} timed out")]
    Timeout { url: String },

    #[error("{url} answered with status {status}")]
    Status { url: String, status: u16 },

    #[error("cannot read {}: {source}", .path.display())]
    File {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("malformed CSV at line {line}: {message}")]
    Malformed { line: u64, message: String },
}

impl From<csv::Error> for FetchError {
    fn from(err: csv::Error) -> Self {
        let line = err.position().map(|p| p.line()).unwrap_or(0);
        FetchError::Malformed {
            line,
            message: err.to_string(),
        }
    }
}

/// Anything that aborts a load cycle.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("invalid date column {header:?}: {reason}")]
    DateParse { header: String, reason: String },
}

/// Recoverable, per-country failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SeriesError {
    #[error("country not found: {0}")]
    CountryNotFound(String),

    #[error("{query:?} matches several rows: {}", .candidates.join(", "))]
    AmbiguousCountry {
        query: String,
        candidates: Vec<String>,
    },

    #[error("insufficient data for incidence calculation: {country} has no report for {date}")]
    Lookup { country: String, date: NaiveDate },

    #[error("Can't calculate incidence stats for {0}, no population data!")]
    NoPopulationData(String),

    #[error("no reporting dates for {0}")]
    EmptySeries(String),
}

pub type LoadResult<T> = std::result::Result<T, LoadError>;
