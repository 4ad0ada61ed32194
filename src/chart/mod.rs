mod canvas;
mod raster;

pub use canvas::{glyph, BrailleCanvas, BLANK};
pub use raster::{rasterize, ChartLayers};

use crate::data::DATE_FMT;
use crate::series::{week_window, window_series, CountrySeries, SeriesPoint};
use chrono::NaiveDate;

/// Which curve the comparison chart shows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GraphMode {
    #[default]
    Daily,
    Cumulative,
}

impl GraphMode {
    pub fn label(&self) -> &'static str {
        match self {
            GraphMode::Daily => "Daily",
            GraphMode::Cumulative => "Cumulative",
        }
    }

    pub fn toggle(self) -> Self {
        match self {
            GraphMode::Daily => GraphMode::Cumulative,
            GraphMode::Cumulative => GraphMode::Daily,
        }
    }

    /// Bar value of a point in this mode; the first point has no daily value
    pub fn value(&self, point: &SeriesPoint) -> Option<f64> {
        match self {
            GraphMode::Daily => point.daily.map(|d| d as f64),
            GraphMode::Cumulative => Some(point.cumulative as f64),
        }
    }
}

/// Y axis a bar series is scaled against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Primary,
    Secondary,
}

/// One named set of bars
#[derive(Debug, Clone, PartialEq)]
pub struct BarSeries {
    pub name: String,
    pub axis: Axis,
    pub bars: Vec<(NaiveDate, Option<f64>)>,
}

impl BarSeries {
    fn from_series(series: &CountrySeries, mode: GraphMode, axis: Axis) -> Self {
        Self {
            name: series.country().to_string(),
            axis,
            bars: series
                .points()
                .iter()
                .map(|p| (p.date, mode.value(p)))
                .collect(),
        }
    }

    /// Largest bar value, 0 when there are no positive bars
    pub fn max_value(&self) -> f64 {
        self.bars
            .iter()
            .filter_map(|(_, v)| *v)
            .fold(0.0, f64::max)
    }
}

/// A bar chart ready for rasterizing
#[derive(Debug, Clone, PartialEq)]
pub struct BarChart {
    pub title: String,
    pub series: Vec<BarSeries>,
}

impl BarChart {
    pub fn series_on(&self, axis: Axis) -> Option<&BarSeries> {
        self.series.iter().find(|s| s.axis == axis)
    }

    pub fn is_dual_axis(&self) -> bool {
        self.series_on(Axis::Secondary).is_some()
    }

    /// Earliest and latest date over all series
    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        let dates = self.series.iter().flat_map(|s| s.bars.iter().map(|(d, _)| *d));
        dates.fold(None, |range, d| match range {
            None => Some((d, d)),
            Some((lo, hi)) => Some((lo.min(d), hi.max(d))),
        })
    }
}

/// Dual-axis comparison of two countries: `a` on the left axis, `b` on the right
pub fn comparison_chart(a: &CountrySeries, b: &CountrySeries, mode: GraphMode) -> BarChart {
    BarChart {
        title: format!(
            "{} cases for {} and {}",
            mode.label(),
            a.country(),
            b.country()
        ),
        series: vec![
            BarSeries::from_series(a, mode, Axis::Primary),
            BarSeries::from_series(b, mode, Axis::Secondary),
        ],
    }
}

/// Daily new cases over the last `num_weeks` weeks
pub fn windowed_chart(series: &CountrySeries, num_weeks: u32) -> BarChart {
    let title = match series.last_date() {
        Some(d_max) => {
            let (start, end) = week_window(d_max, num_weeks);
            format!(
                "{}: number of new cases in the last {} weeks ({} to {})",
                series.country(),
                num_weeks,
                start.format(DATE_FMT),
                end.format(DATE_FMT)
            )
        }
        None => format!("{}: no reporting dates", series.country()),
    };

    let windowed = window_series(series, num_weeks);
    BarChart {
        title,
        series: vec![BarSeries::from_series(&windowed, GraphMode::Daily, Axis::Primary)],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn series(country: &str, start: NaiveDate, counts: &[u64]) -> CountrySeries {
        CountrySeries::from_cumulative(
            country,
            counts
                .iter()
                .enumerate()
                .map(|(i, c)| (start + Duration::days(i as i64), *c))
                .collect(),
        )
    }

    fn start() -> NaiveDate {
        NaiveDate::from_ymd_opt(2020, 11, 2).unwrap()
    }

    #[test]
    fn test_comparison_chart_daily() {
        let spain = series("Spain", start(), &[10, 30, 35]);
        let bulgaria = series("Bulgaria", start(), &[1, 2, 4]);
        let chart = comparison_chart(&spain, &bulgaria, GraphMode::Daily);

        assert_eq!(chart.title, "Daily cases for Spain and Bulgaria");
        assert!(chart.is_dual_axis());
        let primary = chart.series_on(Axis::Primary).unwrap();
        assert_eq!(primary.name, "Spain");
        assert_eq!(primary.bars[0].1, None);
        assert_eq!(primary.bars[1].1, Some(20.0));
        assert_eq!(primary.max_value(), 20.0);
        assert_eq!(chart.series_on(Axis::Secondary).unwrap().max_value(), 2.0);
    }

    #[test]
    fn test_comparison_chart_cumulative() {
        let spain = series("Spain", start(), &[10, 30, 35]);
        let bulgaria = series("Bulgaria", start() + Duration::days(1), &[1, 2, 4]);
        let chart = comparison_chart(&spain, &bulgaria, GraphMode::Cumulative);

        assert_eq!(chart.title, "Cumulative cases for Spain and Bulgaria");
        assert_eq!(chart.series[0].bars[0].1, Some(10.0));
        assert_eq!(
            chart.date_range(),
            Some((start(), start() + Duration::days(3)))
        );
    }

    #[test]
    fn test_windowed_chart_title() {
        // 2020-11-02 is a Monday, last date Friday 2020-11-20
        let s = series("Bulgaria", start(), &(0..19).map(|i| i * 3).collect::<Vec<u64>>());
        let chart = windowed_chart(&s, 1);

        assert_eq!(
            chart.title,
            "Bulgaria: number of new cases in the last 1 weeks (09/11/2020 to 20/11/2020)"
        );
        assert!(!chart.is_dual_axis());
        assert_eq!(chart.series[0].bars.len(), 12);
        assert!(chart.series[0].bars.iter().all(|(_, v)| *v == Some(3.0)));
    }

    #[test]
    fn test_windowed_chart_empty_series() {
        let s = series("Nowhere", start(), &[]);
        let chart = windowed_chart(&s, 4);
        assert_eq!(chart.title, "Nowhere: no reporting dates");
        assert_eq!(chart.date_range(), None);
    }

    #[test]
    fn test_mode_toggle() {
        assert_eq!(GraphMode::Daily.toggle(), GraphMode::Cumulative);
        assert_eq!(GraphMode::Cumulative.toggle().label(), "Daily");
    }
}
