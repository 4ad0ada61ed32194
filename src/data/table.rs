use crate::error::{FetchError, LoadError, LoadResult};
use chrono::NaiveDate;
use csv::{ReaderBuilder, StringRecord, WriterBuilder};

/// Display format of date columns after normalization
pub const DATE_FMT: &str = "%d/%m/%Y";
/// Date format used by the published CSV headers
const SOURCE_DATE_FMT: &str = "%m/%d/%y";

const LEADING_COLUMNS: usize = 4;
const STATE_HEADERS: [&str; 2] = ["Province/State", "State"];
const COUNTRY_HEADERS: [&str; 2] = ["Country/Region", "Country"];

/// One (Country, State) row of the wide table
#[derive(Debug, Clone, PartialEq)]
pub struct TableRow {
    pub state: Option<String>,
    pub country: String,
    pub lat: Option<f64>,
    pub long: Option<f64>,
    /// Cumulative counts, one per entry of `RawTable::dates`
    pub cumulative: Vec<u64>,
}

impl TableRow {
    /// `Country` or `Country / State`
    pub fn label(&self) -> String {
        match &self.state {
            Some(state) => format!("{} / {}", self.country, state),
            None => self.country.clone(),
        }
    }
}

/// Normalized wide table: typed rows and strictly increasing date columns
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawTable {
    dates: Vec<NaiveDate>,
    rows: Vec<TableRow>,
}

impl RawTable {
    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn rows(&self) -> &[TableRow] {
        &self.rows
    }

    /// Canonical column names: State, Country, Lat, Long, then dd/mm/yyyy dates
    pub fn column_names(&self) -> Vec<String> {
        let mut names: Vec<String> = ["State", "Country", "Lat", "Long"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        names.extend(self.dates.iter().map(|d| d.format(DATE_FMT).to_string()));
        names
    }

    /// Unique country names in order of first appearance
    pub fn countries(&self) -> Vec<String> {
        let mut seen = std::collections::HashSet::new();
        self.rows
            .iter()
            .filter(|row| seen.insert(row.country.as_str()))
            .map(|row| row.country.clone())
            .collect()
    }

    /// Serialize back to CSV using the canonical column names
    pub fn to_csv(&self) -> Result<String, FetchError> {
        let mut writer = WriterBuilder::new().from_writer(Vec::new());
        writer.write_record(self.column_names())?;

        for row in &self.rows {
            let mut record = vec![
                row.state.clone().unwrap_or_default(),
                row.country.clone(),
                row.lat.map(|v| v.to_string()).unwrap_or_default(),
                row.long.map(|v| v.to_string()).unwrap_or_default(),
            ];
            record.extend(row.cumulative.iter().map(|c| c.to_string()));
            writer.write_record(&record)?;
        }

        let bytes = writer.into_inner().map_err(|e| FetchError::Malformed {
            line: 0,
            message: e.to_string(),
        })?;
        String::from_utf8(bytes).map_err(|e| FetchError::Malformed {
            line: 0,
            message: e.to_string(),
        })
    }
}

/// Parse the wide CSV into a `RawTable`.
///
/// Accepts both the published headers (`Province/State`, `Country/Region`,
/// `m/d/yy`) and the canonical ones written by `RawTable::to_csv`.
pub fn normalize(raw_csv: &str) -> LoadResult<RawTable> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(false)
        .from_reader(raw_csv.as_bytes());

    let headers = reader.headers().map_err(FetchError::from)?.clone();
    check_leading_headers(&headers)?;

    let dates = parse_date_headers(headers.iter().skip(LEADING_COLUMNS))?;

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(FetchError::from)?;
        rows.push(parse_row(&record, dates.len())?);
    }

    Ok(RawTable { dates, rows })
}

fn check_leading_headers(headers: &StringRecord) -> Result<(), FetchError> {
    let expected: [&[&str]; LEADING_COLUMNS] =
        [&STATE_HEADERS, &COUNTRY_HEADERS, &["Lat"], &["Long", "Long_"]];

    for (idx, accepted) in expected.iter().enumerate() {
        let found = headers.get(idx).map(str::trim).unwrap_or("");
        if !accepted.contains(&found) {
            return Err(FetchError::Malformed {
                line: 1,
                message: format!(
                    "column {} is {:?}, expected one of {:?}",
                    idx + 1,
                    found,
                    accepted
                ),
            });
        }
    }
    Ok(())
}

/// Parse every date header, requiring strictly increasing dates
fn parse_date_headers<'a>(headers: impl Iterator<Item = &'a str>) -> LoadResult<Vec<NaiveDate>> {
    let mut dates: Vec<NaiveDate> = Vec::new();
    for header in headers {
        let date = parse_date_header(header)?;
        if let Some(prev) = dates.last() {
            if date <= *prev {
                return Err(LoadError::DateParse {
                    header: header.to_string(),
                    reason: format!(
                        "not after previous column {}",
                        prev.format(DATE_FMT)
                    ),
                });
            }
        }
        dates.push(date);
    }
    Ok(dates)
}

/// `m/d/yy` (source) or `dd/mm/yyyy` (canonical), told apart by the year width
pub fn parse_date_header(header: &str) -> LoadResult<NaiveDate> {
    let header = header.trim();
    let year_len = header.rsplit('/').next().map(str::len).unwrap_or(0);
    let fmt = match year_len {
        4 => DATE_FMT,
        2 => SOURCE_DATE_FMT,
        _ => {
            return Err(LoadError::DateParse {
                header: header.to_string(),
                reason: "expected m/d/yy or dd/mm/yyyy".into(),
            })
        }
    };
    NaiveDate::parse_from_str(header, fmt).map_err(|e| LoadError::DateParse {
        header: header.to_string(),
        reason: e.to_string(),
    })
}

fn parse_row(record: &StringRecord, num_dates: usize) -> Result<TableRow, FetchError> {
    let line = record.position().map(|p| p.line()).unwrap_or(0);
    let malformed = |message: String| FetchError::Malformed { line, message };

    let field = |idx: usize| record.get(idx).map(str::trim).unwrap_or("");
    let optional_f64 = |idx: usize, name: &str| -> Result<Option<f64>, FetchError> {
        let value = field(idx);
        if value.is_empty() {
            return Ok(None);
        }
        value
            .parse::<f64>()
            .map(Some)
            .map_err(|_| malformed(format!("{} is not a number: {:?}", name, value)))
    };

    let state = Some(field(0)).filter(|s| !s.is_empty()).map(str::to_string);
    let country = field(1).to_string();
    if country.is_empty() {
        return Err(malformed("empty Country".into()));
    }
    let lat = optional_f64(2, "Lat")?;
    let long = optional_f64(3, "Long")?;

    let mut cumulative = Vec::with_capacity(num_dates);
    for value in record.iter().skip(LEADING_COLUMNS) {
        let value = value.trim();
        let count = value.parse::<u64>().map_err(|_| {
            malformed(format!(
                "count for {} is not a non-negative integer: {:?}",
                country, value
            ))
        })?;
        cumulative.push(count);
    }

    Ok(TableRow {
        state,
        country,
        lat,
        long,
        cumulative,
    })
}
