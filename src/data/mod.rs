mod table;

pub use table::{normalize, parse_date_header, RawTable, TableRow, DATE_FMT};

use crate::error::{FetchError, LoadResult};
use log::{debug, info};
use std::fs;
use std::path::Path;
use std::time::{Duration, Instant};

/// Where the confirmed-cases CSV comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source<'a> {
    Http(&'a str),
    File(&'a Path),
}

impl<'a> Source<'a> {
    /// `http://` and `https://` are fetched, anything else is a local path
    pub fn parse(location: &'a str) -> Self {
        let lower = location.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            Source::Http(location)
        } else {
            Source::File(Path::new(location))
        }
    }
}

/// Download (or read) the raw CSV document
pub fn fetch_csv(location: &str, timeout: Duration) -> Result<String, FetchError> {
    let started = Instant::now();
    let body = match Source::parse(location) {
        Source::Http(url) => fetch_http(url, timeout)?,
        Source::File(path) => fs::read_to_string(path).map_err(|source| FetchError::File {
            path: path.to_path_buf(),
            source,
        })?,
    };
    info!(
        "fetched {} bytes from {} in {:?}",
        body.len(),
        location,
        started.elapsed()
    );
    Ok(body)
}

fn fetch_http(url: &str, timeout: Duration) -> Result<String, FetchError> {
    let classify = |source: reqwest::Error| {
        if source.is_timeout() {
            FetchError::Timeout {
                url: url.to_string(),
            }
        } else {
            FetchError::Http {
                url: url.to_string(),
                source,
            }
        }
    };

    let client = reqwest::blocking::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(classify)?;

    let response = client.get(url).send().map_err(classify)?;
    let status = response.status();
    debug!("GET {} -> {}", url, status);
    if !status.is_success() {
        return Err(FetchError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    response.text().map_err(classify)
}

/// Fetch and normalize in one step
pub fn load_table(location: &str, timeout: Duration) -> LoadResult<RawTable> {
    let body = fetch_csv(location, timeout)?;
    let table = normalize(&body)?;
    info!(
        "normalized table: {} rows, {} date columns",
        table.rows().len(),
        table.dates().len()
    );
    Ok(table)
}
