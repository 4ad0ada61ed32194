//! Pure derivation of everything the dashboard shows from the loaded data
//! and the user's current selection. Nothing here is cached; the shell calls
//! `build_view` again after every interaction.

use crate::chart::{comparison_chart, windowed_chart, BarChart, GraphMode};
use crate::config::{Config, PopulationTable};
use crate::data::{load_table, RawTable};
use crate::error::{LoadResult, SeriesError};
use crate::series::{extract_series, incidence, CountrySeries, MatchPolicy};
use chrono::{DateTime, Local};
use log::warn;

/// Data shared by every view: the table and population of one load cycle
#[derive(Debug, Clone)]
pub struct Context {
    pub table: RawTable,
    pub population: PopulationTable,
    /// Where the table came from
    pub source: String,
    pub downloaded_at: DateTime<Local>,
}

impl Context {
    pub fn new(table: RawTable, population: PopulationTable, source: impl Into<String>) -> Self {
        Self {
            table,
            population,
            source: source.into(),
            downloaded_at: Local::now(),
        }
    }

    /// Fetch and normalize the configured source
    pub fn load(config: &Config) -> LoadResult<Self> {
        let table = load_table(&config.url, config.fetch_timeout)?;
        Ok(Self::new(table, config.population.clone(), config.url.clone()))
    }

    /// Series for one country, using the dashboard's match policy
    pub fn series(&self, country: &str) -> Result<CountrySeries, SeriesError> {
        extract_series(&self.table, country, MatchPolicy::Exact)
    }

    /// Incidence text for one country: the report, or why there is none
    pub fn incidence_text(&self, country: &str) -> String {
        let result = self
            .series(country)
            .and_then(|series| incidence(&series, self.population.get(country)));
        match result {
            Ok(report) => report.to_string(),
            Err(err @ SeriesError::NoPopulationData(_)) => err.to_string(),
            Err(err) => {
                warn!("incidence for {}: {}", country, err);
                err.to_string()
            }
        }
    }
}

/// Everything the user can change
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserParams {
    pub mode: GraphMode,
    pub country: String,
    pub num_weeks: u32,
}

/// What the dashboard draws for one set of parameters
#[derive(Debug, Clone, PartialEq)]
pub struct ViewModel {
    pub comparison: Result<BarChart, SeriesError>,
    pub windowed: Result<BarChart, SeriesError>,
    pub incidence: String,
}

/// Build the comparison chart for the fixed pair and the windowed view and
/// incidence for the selected country. A failing country only blanks the
/// part of the view that needs it.
pub fn build_view(ctx: &Context, compare: &[String; 2], params: &UserParams) -> ViewModel {
    let comparison = ctx.series(&compare[0]).and_then(|a| {
        let b = ctx.series(&compare[1])?;
        Ok(comparison_chart(&a, &b, params.mode))
    });
    if let Err(err) = &comparison {
        warn!("comparison chart: {}", err);
    }

    let windowed = ctx
        .series(&params.country)
        .map(|series| windowed_chart(&series, params.num_weeks));

    ViewModel {
        comparison,
        windowed,
        incidence: ctx.incidence_text(&params.country),
    }
}
