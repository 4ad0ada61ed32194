use crate::data::{RawTable, TableRow};
use crate::error::SeriesError;
use chrono::NaiveDate;

/// How a country query selects table rows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatchPolicy {
    /// Country equals the query; per-province rows are summed per date
    #[default]
    Exact,
    /// Country contains the query; must resolve to exactly one row
    Substring,
    /// Country contains the query; the first matching row wins
    FirstMatch,
}

/// One reporting date of a country series
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeriesPoint {
    pub date: NaiveDate,
    pub cumulative: u64,
    /// `None` for the first point
    pub daily: Option<i64>,
}

/// Per-date cumulative and daily counts for one country, dates ascending
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountrySeries {
    country: String,
    points: Vec<SeriesPoint>,
}

impl CountrySeries {
    /// Build from `(date, cumulative)` pairs; sorts by date and derives deltas
    pub fn from_cumulative(
        country: impl Into<String>,
        mut counts: Vec<(NaiveDate, u64)>,
    ) -> Self {
        counts.sort_by_key(|(date, _)| *date);

        let mut points = Vec::with_capacity(counts.len());
        let mut prev: Option<u64> = None;
        for (date, cumulative) in counts {
            let daily = prev.map(|p| cumulative as i64 - p as i64);
            points.push(SeriesPoint {
                date,
                cumulative,
                daily,
            });
            prev = Some(cumulative);
        }

        Self {
            country: country.into(),
            points,
        }
    }

    pub(crate) fn with_points(&self, points: Vec<SeriesPoint>) -> Self {
        Self {
            country: self.country.clone(),
            points,
        }
    }

    pub fn country(&self) -> &str {
        &self.country
    }

    pub fn points(&self) -> &[SeriesPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.points.first().map(|p| p.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.points.last().map(|p| p.date)
    }

    /// Cumulative count reported on exactly `date`
    pub fn cumulative_on(&self, date: NaiveDate) -> Option<u64> {
        self.points
            .binary_search_by_key(&date, |p| p.date)
            .ok()
            .map(|idx| self.points[idx].cumulative)
    }
}

/// Select the rows for `query` and transpose their date columns into a series
pub fn extract_series(
    table: &RawTable,
    query: &str,
    policy: MatchPolicy,
) -> Result<CountrySeries, SeriesError> {
    let matched: Vec<&TableRow> = match policy {
        MatchPolicy::Exact => table.rows().iter().filter(|r| r.country == query).collect(),
        MatchPolicy::Substring | MatchPolicy::FirstMatch => table
            .rows()
            .iter()
            .filter(|r| r.country.contains(query))
            .collect(),
    };

    let Some(first) = matched.first() else {
        return Err(SeriesError::CountryNotFound(query.to_string()));
    };

    let counts: Vec<u64> = match policy {
        MatchPolicy::Exact => sum_rows(&matched, table.dates().len()),
        MatchPolicy::Substring if matched.len() > 1 => {
            return Err(SeriesError::AmbiguousCountry {
                query: query.to_string(),
                candidates: matched.iter().map(|r| r.label()).collect(),
            });
        }
        MatchPolicy::Substring | MatchPolicy::FirstMatch => first.cumulative.clone(),
    };

    let country = match policy {
        MatchPolicy::Exact => query.to_string(),
        _ => first.country.clone(),
    };

    Ok(CountrySeries::from_cumulative(
        country,
        table.dates().iter().copied().zip(counts).collect(),
    ))
}

fn sum_rows(rows: &[&TableRow], num_dates: usize) -> Vec<u64> {
    let mut totals = vec![0u64; num_dates];
    for row in rows {
        for (total, count) in totals.iter_mut().zip(&row.cumulative) {
            *total = total.saturating_add(*count);
        }
    }
    totals
}
