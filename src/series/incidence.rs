use super::CountrySeries;
use crate::error::SeriesError;
use chrono::{Duration, NaiveDate};
use std::fmt;

/// Rates are normalized to this many inhabitants
pub const PER_POPULATION: f64 = 100_000.0;

/// Trailing 7-day and 14-day incidence for one country
#[derive(Debug, Clone, PartialEq)]
pub struct IncidenceReport {
    pub country: String,
    pub last_date: NaiveDate,
    /// New cases over the last 7 reporting days (may be negative after revisions)
    pub inc7: i64,
    pub inc14: i64,
    pub rate7: f64,
    pub rate14: f64,
    /// Last week carries at least half of the last fortnight's cases
    pub possible_wave: bool,
}

/// Compute incidence for `series`, or explain why it cannot be computed
pub fn incidence(
    series: &CountrySeries,
    population: Option<u64>,
) -> Result<IncidenceReport, SeriesError> {
    let country = series.country().to_string();
    let population = population.ok_or_else(|| SeriesError::NoPopulationData(country.clone()))?;

    let last = series
        .last_date()
        .ok_or_else(|| SeriesError::EmptySeries(country.clone()))?;
    let d7 = last - Duration::days(6);
    let d14 = last - Duration::days(13);

    let lookup = |date: NaiveDate| {
        series.cumulative_on(date).ok_or_else(|| SeriesError::Lookup {
            country: country.clone(),
            date,
        })
    };

    let cum_last = lookup(last)? as i64;
    let inc7 = cum_last - lookup(d7)? as i64;
    let inc14 = cum_last - lookup(d14)? as i64;

    let per = |count: i64| count as f64 * PER_POPULATION / population as f64;

    Ok(IncidenceReport {
        last_date: last,
        inc7,
        inc14,
        rate7: per(inc7),
        rate14: per(inc14),
        possible_wave: 2 * inc7 >= inc14,
        country,
    })
}

impl fmt::Display for IncidenceReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} - incidence rates per 100000:", self.country)?;
        writeln!(f, " 7 days: {:.2}", self.rate7)?;
        writeln!(f, "14 days: {:.2}", self.rate14)?;
        if self.possible_wave {
            write!(f, "7-day incidence indicates a possible wave!!")
        } else {
            write!(f, "7-day incidence is within normal value!")
        }
    }
}
