use crate::chart::GraphMode;
use crate::config::Config;
use crate::error::LoadResult;
use crate::view::{build_view, Context, UserParams, ViewModel};
use log::{error, info};

/// Rows moved by PageUp / PageDown in the country list
const PAGE: usize = 10;

/// Application state
pub struct App {
    pub config: Config,
    /// Loaded data, or the message of the load that failed
    pub data: Result<Context, String>,
    /// Unique countries of the loaded table, in table order
    pub countries: Vec<String>,
    /// Index into `countries`
    pub selected: usize,
    pub mode: GraphMode,
    pub num_weeks: u32,
    /// View for the current parameters, rebuilt after every change
    pub view: Option<ViewModel>,
    /// A fetch is in progress (drawn as a loading banner)
    pub loading: bool,
    pub should_quit: bool,
}

impl App {
    pub fn new(config: Config) -> Self {
        let num_weeks = config.default_weeks;
        Self {
            config,
            data: Err("no data loaded yet".to_string()),
            countries: Vec::new(),
            selected: 0,
            mode: GraphMode::default(),
            num_weeks,
            view: None,
            loading: false,
            should_quit: false,
        }
    }

    /// Fetch the data again and rebuild the view
    pub fn refresh(&mut self) {
        info!("refreshing from {}", self.config.url);
        let result = Context::load(&self.config);
        self.apply_load(result);
    }

    /// Install the outcome of a load. A failure keeps the app running so the
    /// user can retry.
    pub fn apply_load(&mut self, result: LoadResult<Context>) {
        self.loading = false;
        match result {
            Ok(ctx) => {
                let previous = self.selected_country().map(str::to_string);
                self.countries = ctx.table.countries();
                self.selected = previous
                    .as_deref()
                    .or(Some(self.config.compare[0].as_str()))
                    .and_then(|name| self.countries.iter().position(|c| c == name))
                    .unwrap_or(0);
                self.data = Ok(ctx);
            }
            Err(err) => {
                error!("load failed: {}", err);
                self.countries.clear();
                self.selected = 0;
                self.data = Err(err.to_string());
            }
        }
        self.recompute();
    }

    pub fn selected_country(&self) -> Option<&str> {
        self.countries.get(self.selected).map(String::as_str)
    }

    pub fn params(&self) -> Option<UserParams> {
        Some(UserParams {
            mode: self.mode,
            country: self.selected_country()?.to_string(),
            num_weeks: self.num_weeks,
        })
    }

    /// Rebuild the view from scratch for the current parameters
    pub fn recompute(&mut self) {
        self.view = match (&self.data, self.params()) {
            (Ok(ctx), Some(params)) => Some(build_view(ctx, &self.config.compare, &params)),
            _ => None,
        };
    }

    pub fn toggle_mode(&mut self) {
        self.mode = self.mode.toggle();
        self.recompute();
    }

    /// Move the country selection by `delta`, clamped to the list
    pub fn move_selection(&mut self, delta: isize) {
        if self.countries.is_empty() {
            return;
        }
        let last = self.countries.len() as isize - 1;
        let next = (self.selected as isize + delta).clamp(0, last) as usize;
        if next != self.selected {
            self.selected = next;
            self.recompute();
        }
    }

    pub fn select_next(&mut self) {
        self.move_selection(1);
    }

    pub fn select_prev(&mut self) {
        self.move_selection(-1);
    }

    pub fn page_down(&mut self) {
        self.move_selection(PAGE as isize);
    }

    pub fn page_up(&mut self) {
        self.move_selection(-(PAGE as isize));
    }

    pub fn select_first(&mut self) {
        self.move_selection(isize::MIN / 2);
    }

    pub fn select_last(&mut self) {
        self.move_selection(isize::MAX / 2);
    }

    /// Change the week count, clamped to 1..=max_weeks
    pub fn adjust_weeks(&mut self, delta: i64) {
        let weeks = self.config.clamp_weeks(self.num_weeks as i64 + delta);
        if weeks != self.num_weeks {
            self.num_weeks = weeks;
            self.recompute();
        }
    }

    /// Request quit
    pub fn quit(&mut self) {
        self.should_quit = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PopulationTable;
    use crate::data::normalize;
    use crate::error::{FetchError, LoadError};
    use std::time::Duration;

    const CSV: &str = "\
Province/State,Country/Region,Lat,Long,1/1/21,1/2/21,1/3/21
,Afghanistan,33,65,1,2,3
,Bulgaria,42,25,1,3,6
,Spain,40,-4,5,9,20
";

    fn config() -> Config {
        Config {
            url: "confirmed.csv".into(),
            population: PopulationTable::default(),
            fetch_timeout: Duration::from_secs(5),
            compare: ["Spain".into(), "Bulgaria".into()],
            default_weeks: 20,
            max_weeks: 80,
        }
    }

    fn loaded() -> App {
        let mut app = App::new(config());
        let ctx = Context::new(normalize(CSV).unwrap(), PopulationTable::default(), "confirmed.csv");
        app.apply_load(Ok(ctx));
        app
    }

    #[test]
    fn test_initial_selection_is_first_compared_country() {
        let app = loaded();
        assert_eq!(app.countries, vec!["Afghanistan", "Bulgaria", "Spain"]);
        assert_eq!(app.selected_country(), Some("Spain"));
        assert!(app.view.is_some());
    }

    #[test]
    fn test_selection_clamps() {
        let mut app = loaded();
        app.select_next();
        assert_eq!(app.selected_country(), Some("Spain"));
        app.page_up();
        assert_eq!(app.selected_country(), Some("Afghanistan"));
        app.select_last();
        assert_eq!(app.selected, 2);
        app.select_first();
        assert_eq!(app.selected, 0);
    }

    #[test]
    fn test_weeks_clamp() {
        let mut app = loaded();
        app.adjust_weeks(100);
        assert_eq!(app.num_weeks, 80);
        app.adjust_weeks(-200);
        assert_eq!(app.num_weeks, 1);
        let title = &app.view.as_ref().unwrap().windowed.as_ref().unwrap().title;
        assert!(title.contains("last 1 weeks"));
    }

    #[test]
    fn test_mode_change_rebuilds_view() {
        let mut app = loaded();
        app.toggle_mode();
        let view = app.view.as_ref().unwrap();
        assert_eq!(
            view.comparison.as_ref().unwrap().title,
            "Cumulative cases for Spain and Bulgaria"
        );
    }

    #[test]
    fn test_failed_load_keeps_running() {
        let mut app = loaded();
        app.apply_load(Err(LoadError::Fetch(FetchError::Status {
            url: "https://example.org".into(),
            status: 503,
        })));
        assert!(app.data.is_err());
        assert!(app.view.is_none());
        assert!(app.countries.is_empty());
        app.select_next();
        assert!(!app.should_quit);
    }

    #[test]
    fn test_refresh_keeps_selected_country() {
        let mut app = loaded();
        app.select_first();
        let ctx = Context::new(normalize(CSV).unwrap(), PopulationTable::default(), "confirmed.csv");
        app.apply_load(Ok(ctx));
        assert_eq!(app.selected_country(), Some("Afghanistan"));
    }
}
