use super::CountrySeries;
use chrono::{Datelike, Duration, NaiveDate};

/// First and last date covered by a window of `num_weeks` ending at `d_max`.
/// The window opens on the Monday `num_weeks` weeks before `d_max`'s own week,
/// or at the earliest representable date when that Monday is out of range.
pub fn week_window(d_max: NaiveDate, num_weeks: u32) -> (NaiveDate, NaiveDate) {
    let back = d_max.weekday().num_days_from_monday() as i64;
    let start = Duration::try_days(back)
        .and_then(|offset| d_max.checked_sub_signed(offset))
        .and_then(|monday| {
            Duration::try_weeks(num_weeks as i64)
                .and_then(|span| monday.checked_sub_signed(span))
        })
        .unwrap_or(NaiveDate::MIN);
    (start, d_max)
}

/// Points of `series` that fall inside `week_window(last_date, num_weeks)`
pub fn window_series(series: &CountrySeries, num_weeks: u32) -> CountrySeries {
    let Some(d_max) = series.last_date() else {
        return series.clone();
    };
    let (start, end) = week_window(d_max, num_weeks);

    let points = series
        .points()
        .iter()
        .filter(|p| p.date >= start && p.date <= end)
        .copied()
        .collect();
    series.with_points(points)
}
