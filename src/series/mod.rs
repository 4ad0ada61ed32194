mod country;
mod incidence;
mod window;

pub use country::{extract_series, CountrySeries, MatchPolicy, SeriesPoint};
pub use incidence::{incidence, IncidenceReport, PER_POPULATION};
pub use window::{week_window, window_series};
