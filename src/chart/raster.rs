use super::{Axis, BarChart, BarSeries, BrailleCanvas};

/// Braille layers of one chart, one per axis, plus each axis' scale
pub struct ChartLayers {
    pub primary: BrailleCanvas,
    pub secondary: Option<BrailleCanvas>,
    /// Value of a full-height bar on each axis
    pub primary_max: f64,
    pub secondary_max: Option<f64>,
}

/// Draw `chart` onto canvases of `width` x `height` characters.
///
/// Single-axis charts use both dot columns of every cell. Dual-axis charts
/// interleave: primary bars in the left dot column, secondary in the right.
pub fn rasterize(chart: &BarChart, width: usize, height: usize) -> ChartLayers {
    let dual = chart.is_dual_axis();
    let mut primary = BrailleCanvas::new(width, height);
    let mut primary_max = 0.0;

    if let Some(series) = chart.series_on(Axis::Primary) {
        primary_max = series.max_value();
        let (columns, offset, stride) = if dual { (width, 0, 2) } else { (width * 2, 0, 1) };
        draw_bars(&mut primary, series, primary_max, columns, offset, stride);
    }

    let (secondary, secondary_max) = match chart.series_on(Axis::Secondary) {
        Some(series) => {
            let max = series.max_value();
            let mut canvas = BrailleCanvas::new(width, height);
            draw_bars(&mut canvas, series, max, width, 1, 2);
            (Some(canvas), Some(max))
        }
        None => (None, None),
    };

    ChartLayers {
        primary,
        secondary,
        primary_max,
        secondary_max,
    }
}

/// Bucket the bars into `columns` pixel columns (x = offset + column * stride)
/// and draw the largest value of each bucket.
fn draw_bars(
    canvas: &mut BrailleCanvas,
    series: &BarSeries,
    max: f64,
    columns: usize,
    offset: usize,
    stride: usize,
) {
    let n = series.bars.len();
    if n == 0 || columns == 0 || max <= 0.0 {
        return;
    }

    let pixel_height = canvas.pixel_height();
    for column in 0..columns {
        let lo = column * n / columns;
        let hi = ((column + 1) * n / columns).clamp(lo + 1, n);

        let value = series.bars[lo..hi]
            .iter()
            .filter_map(|(_, v)| *v)
            .fold(f64::NEG_INFINITY, f64::max);
        if value <= 0.0 {
            continue;
        }

        let bar = ((value / max) * pixel_height as f64).round() as usize;
        canvas.fill_column(offset + column * stride, bar.max(1));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::{comparison_chart, GraphMode};
    use crate::series::CountrySeries;
    use chrono::{Duration, NaiveDate};

    fn series(country: &str, counts: &[u64]) -> CountrySeries {
        let start = NaiveDate::from_ymd_opt(2021, 1, 4).unwrap();
        CountrySeries::from_cumulative(
            country,
            counts
                .iter()
                .enumerate()
                .map(|(i, c)| (start + Duration::days(i as i64), *c))
                .collect(),
        )
    }

    fn single(values: &[Option<f64>]) -> BarChart {
        let start = NaiveDate::from_ymd_opt(2021, 1, 4).unwrap();
        BarChart {
            title: "t".into(),
            series: vec![BarSeries {
                name: "x".into(),
                axis: Axis::Primary,
                bars: values
                    .iter()
                    .enumerate()
                    .map(|(i, v)| (start + Duration::days(i as i64), *v))
                    .collect(),
            }],
        }
    }

    #[test]
    fn test_single_axis_uses_every_dot_column() {
        let chart = single(&[Some(4.0), Some(2.0)]);
        let layers = rasterize(&chart, 1, 1);
        assert!(layers.secondary.is_none());
        assert_eq!(layers.primary_max, 4.0);
        // left column full, right column half
        assert_eq!(layers.primary.cell(0, 0), 0x01 | 0x02 | 0x04 | 0x40 | 0x20 | 0x80);
    }

    #[test]
    fn test_absent_and_negative_values_draw_nothing() {
        let chart = single(&[None, Some(-3.0), Some(0.0), Some(8.0)]);
        let layers = rasterize(&chart, 2, 1);
        assert_eq!(layers.primary.cell(0, 0), 0);
        // only the last bar, in the right dot column of the second cell
        assert_eq!(layers.primary.cell(1, 0), 0xb8);
        assert_eq!(layers.primary.rows().next().unwrap().chars().count(), 2);
    }

    #[test]
    fn test_bucket_keeps_maximum() {
        // 8 bars squeezed into 2 pixel columns
        let values: Vec<Option<f64>> = (1..=8).map(|v| Some(v as f64)).collect();
        let layers = rasterize(&single(&values), 1, 2);
        // left bucket max 4 of 8 -> half of 8 pixels, right bucket full
        assert_eq!(layers.primary.cell(0, 0) & 0x47, 0);
        assert_eq!(layers.primary.cell(0, 1) & 0x47, 0x47);
        assert_eq!(layers.primary.cell(0, 0) & 0xb8, 0xb8);
    }

    #[test]
    fn test_dual_axis_interleaves_and_scales_separately() {
        let spain = series("Spain", &[0, 1000, 3000]);
        let bulgaria = series("Bulgaria", &[0, 10, 30]);
        let chart = comparison_chart(&spain, &bulgaria, GraphMode::Cumulative);
        let layers = rasterize(&chart, 3, 1);

        let secondary = layers.secondary.as_ref().unwrap();
        assert_eq!(layers.primary_max, 3000.0);
        assert_eq!(layers.secondary_max, Some(30.0));
        for cx in 0..3 {
            // primary only in the left dot column, secondary only in the right
            assert_eq!(layers.primary.cell(cx, 0) & 0xb8, 0);
            assert_eq!(secondary.cell(cx, 0) & 0x47, 0);
        }
        // same relative heights on both axes
        assert_eq!(layers.primary.cell(2, 0), 0x47);
        assert_eq!(secondary.cell(2, 0), 0xb8);
    }

    #[test]
    fn test_empty_chart() {
        let layers = rasterize(&single(&[]), 4, 2);
        assert!(layers.primary.rows().all(|r| r.chars().all(|c| c == crate::chart::BLANK)));
    }
}
