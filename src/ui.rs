use crate::app::App;
use crate::chart::{glyph, rasterize, Axis, BarChart, ChartLayers};
use crate::data::DATE_FMT;
use crate::error::SeriesError;
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Widget, Wrap},
    Frame,
};

const PRIMARY_COLOR: Color = Color::Cyan;
const SECONDARY_COLOR: Color = Color::Yellow;
/// Cells where bars of both axes meet
const OVERLAP_COLOR: Color = Color::White;

/// Render the UI
pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();

    // Header, body, status bar
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title and captions
            Constraint::Min(10),   // Sidebar + charts
            Constraint::Length(1), // Status bar
        ])
        .split(area);

    render_header(frame, app, chunks[0]);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(28), Constraint::Min(20)])
        .split(chunks[1]);

    render_sidebar(frame, app, body[0]);
    render_main(frame, app, body[1]);
    render_status_bar(frame, app, chunks[2]);
}

fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let caption = Style::default().fg(Color::DarkGray);
    let mut lines = vec![
        Line::from(Span::styled(
            "Evolution of Covid 19 cases",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(format!("source: {}", app.config.url), caption)),
    ];
    if let Ok(ctx) = &app.data {
        lines.push(Line::from(Span::styled(
            format!(
                "Data downloaded on {}",
                ctx.downloaded_at.format("%a, %d/%m/%Y, %H:%M")
            ),
            caption,
        )));
    }
    frame.render_widget(Paragraph::new(lines), area);
}

fn render_sidebar(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Graph mode
            Constraint::Length(3), // Weeks
            Constraint::Min(3),    // Countries
        ])
        .split(area);

    let mode = Paragraph::new(Line::from(vec![
        Span::styled(app.mode.label(), Style::default().fg(Color::Green)),
        Span::styled("  [m]", Style::default().fg(Color::DarkGray)),
    ]))
    .block(sidebar_block(" Graph "));
    frame.render_widget(mode, chunks[0]);

    let weeks = Paragraph::new(Line::from(vec![
        Span::styled(app.num_weeks.to_string(), Style::default().fg(Color::Green)),
        Span::styled(
            format!(" / {}  [+/-]", app.config.max_weeks),
            Style::default().fg(Color::DarkGray),
        ),
    ]))
    .block(sidebar_block(" Weeks "));
    frame.render_widget(weeks, chunks[1]);

    let items: Vec<ListItem> = app
        .countries
        .iter()
        .map(|c| ListItem::new(c.as_str()))
        .collect();
    let list = List::new(items)
        .block(sidebar_block(" Windowed graph for "))
        .highlight_style(
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        );
    let mut state = ListState::default().with_selected(app.selected_country().map(|_| app.selected));
    frame.render_stateful_widget(list, chunks[2], &mut state);
}

fn sidebar_block(title: &str) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(Span::styled(title, Style::default().fg(Color::Cyan)))
}

fn render_main(frame: &mut Frame, app: &App, area: Rect) {
    let Some(view) = &app.view else {
        render_message(frame, app, area);
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(45), // Graphs since the beginning
            Constraint::Min(6),         // Windowed graph
            Constraint::Length(6),      // Incidence statistics
        ])
        .split(area);

    render_chart(frame, &view.comparison, chunks[0]);
    render_chart(frame, &view.windowed, chunks[1]);

    let incidence = Paragraph::new(view.incidence.as_str())
        .wrap(Wrap { trim: false })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray))
                .title(Span::styled(" Incidence ", Style::default().fg(Color::Cyan))),
        );
    frame.render_widget(incidence, chunks[2]);
}

/// Loading banner, or the load error with a retry hint
fn render_message(frame: &mut Frame, app: &App, area: Rect) {
    let (text, color) = if app.loading {
        (format!("Downloading {} ...", app.config.url), Color::Yellow)
    } else {
        match &app.data {
            Err(message) => (
                format!("Could not load data:\n{}\n\nPress r to retry.", message),
                Color::Red,
            ),
            Ok(_) => ("No countries in the data set.".to_string(), Color::Red),
        }
    };

    let paragraph = Paragraph::new(text)
        .style(Style::default().fg(color))
        .wrap(Wrap { trim: false })
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(paragraph, area);
}

fn render_chart(frame: &mut Frame, chart: &Result<BarChart, SeriesError>, area: Rect) {
    let chart = match chart {
        Ok(chart) => chart,
        Err(err) => {
            let paragraph = Paragraph::new(err.to_string())
                .style(Style::default().fg(Color::Red))
                .wrap(Wrap { trim: false })
                .block(Block::default().borders(Borders::ALL));
            frame.render_widget(paragraph, area);
            return;
        }
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(Span::styled(
            format!(" {} ", chart.title),
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ))
        .title_bottom(legend(chart));

    let inner = block.inner(area);
    frame.render_widget(block, area);
    if inner.width == 0 || inner.height < 2 {
        return;
    }

    // Last row holds the date axis
    let layers = rasterize(chart, inner.width as usize, inner.height as usize - 1);
    let widget = ChartWidget {
        layers,
        dates: chart.date_range().map(|(start, end)| {
            (
                start.format(DATE_FMT).to_string(),
                end.format(DATE_FMT).to_string(),
            )
        }),
    };
    frame.render_widget(widget, inner);
}

fn legend(chart: &BarChart) -> Line<'static> {
    let mut spans = vec![Span::raw(" ")];
    for series in &chart.series {
        let (color, side) = match series.axis {
            Axis::Primary => (PRIMARY_COLOR, "left"),
            Axis::Secondary => (SECONDARY_COLOR, "right"),
        };
        spans.push(Span::styled("■ ", Style::default().fg(color)));
        let label = if chart.is_dual_axis() {
            format!("{} ({} axis) ", series.name, side)
        } else {
            format!("{} ", series.name)
        };
        spans.push(Span::styled(label, Style::default().fg(Color::Gray)));
    }
    Line::from(spans)
}

/// Custom widget that renders braille bar layers with axis labels overlaid
struct ChartWidget {
    layers: ChartLayers,
    dates: Option<(String, String)>,
}

impl ChartWidget {
    fn put_str(buf: &mut Buffer, area: Rect, x: u16, y: u16, text: &str, style: Style) {
        for (i, ch) in text.chars().enumerate() {
            let px = x + i as u16;
            if px >= area.x + area.width {
                break;
            }
            buf[(px, y)].set_char(ch).set_style(style);
        }
    }
}

impl Widget for ChartWidget {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let plot_height = area.height.saturating_sub(1);

        // Bars: merge both axes per cell, colored by which axis owns the dots
        for row in 0..plot_height {
            for col in 0..area.width {
                let p = self.layers.primary.cell(col as usize, row as usize);
                let s = self
                    .layers
                    .secondary
                    .as_ref()
                    .map(|c| c.cell(col as usize, row as usize))
                    .unwrap_or(0);
                let color = match (p != 0, s != 0) {
                    (false, false) => continue,
                    (true, false) => PRIMARY_COLOR,
                    (false, true) => SECONDARY_COLOR,
                    (true, true) => OVERLAP_COLOR,
                };
                buf[(area.x + col, area.y + row)]
                    .set_char(glyph(p | s))
                    .set_fg(color);
            }
        }

        // Axis maxima in the top corners
        let label = Style::default().fg(Color::DarkGray);
        if self.layers.primary_max > 0.0 {
            let text = format!("▲{}", format_count(self.layers.primary_max));
            Self::put_str(buf, area, area.x, area.y, &text, label.fg(PRIMARY_COLOR));
        }
        if let Some(max) = self.layers.secondary_max.filter(|m| *m > 0.0) {
            let text = format!("{}▲", format_count(max));
            let x = (area.x + area.width).saturating_sub(text.chars().count() as u16);
            Self::put_str(buf, area, x.max(area.x), area.y, &text, label.fg(SECONDARY_COLOR));
        }

        // Date axis
        if let Some((start, end)) = &self.dates {
            let y = area.y + plot_height;
            Self::put_str(buf, area, area.x, y, start, label);
            let x = (area.x + area.width).saturating_sub(end.chars().count() as u16);
            if x > area.x + start.chars().count() as u16 {
                Self::put_str(buf, area, x, y, end, label);
            }
        }
    }
}

/// Compact axis label: 950, 12.3k, 4.1M
pub fn format_count(value: f64) -> String {
    if value >= 1_000_000.0 {
        format!("{:.1}M", value / 1_000_000.0)
    } else if value >= 1_000.0 {
        format!("{:.1}k", value / 1_000.0)
    } else {
        format!("{:.0}", value)
    }
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let country = app.selected_country().unwrap_or("-");

    let status = Line::from(vec![
        Span::styled(" Graph: ", Style::default().fg(Color::DarkGray)),
        Span::styled(app.mode.label(), Style::default().fg(Color::Yellow)),
        Span::styled(" | Country: ", Style::default().fg(Color::DarkGray)),
        Span::styled(country, Style::default().fg(Color::Magenta)),
        Span::styled(" | Weeks: ", Style::default().fg(Color::DarkGray)),
        Span::styled(app.num_weeks.to_string(), Style::default().fg(Color::Green)),
        Span::styled(
            " | m:mode j/k:country +/-:weeks r:refresh q:quit",
            Style::default().fg(Color::DarkGray),
        ),
    ]);

    let paragraph = Paragraph::new(status).alignment(Alignment::Left);
    frame.render_widget(paragraph, area);
}
