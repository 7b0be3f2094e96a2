//! Ratatui-based terminal UI.
//!
//! The TUI provides a settings panel for choosing a dataset and scrubbing the
//! selected year, then renders the filtered series as a line chart. Fetches
//! run on a background thread; the event loop polls for completions so the
//! interface stays responsive while a request is in flight.

use std::io;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Wrap},
    Terminal,
};

use crate::cli::QueryArgs;
use crate::data::{ApiClient, FetchHandle, FetchState};
use crate::domain::{Dataset, DerivedSeries};
use crate::error::AppError;

mod chart;

use chart::{ChartLine, TrendChart, SERIES_PALETTE};

/// Start the TUI.
pub fn run(args: &QueryArgs) -> Result<(), AppError> {
    let _guard = TerminalGuard::new()?;

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)
        .map_err(|e| AppError::new(4, format!("Failed to initialize terminal: {e}")))?;

    let mut app = App::new(args)?;
    app.event_loop(&mut terminal)
}

/// Ensures the terminal is restored (raw mode, alternate screen) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode().map_err(|e| AppError::new(4, format!("Failed to enable raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(AppError::new(4, format!("Failed to enter alternate screen: {e}")));
        }
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

struct App {
    client: ApiClient,
    fetch: FetchHandle,
    dataset: Dataset,
    year: i32,
    year_input: String,
    editing_year: bool,
    selected_field: usize,
    state: FetchState,
    series: Option<DerivedSeries>,
    status: String,
}

impl App {
    fn new(args: &QueryArgs) -> Result<Self, AppError> {
        let client = ApiClient::from_env()?;
        let dataset = args.dataset;
        let year = dataset.clamp_year(args.year.unwrap_or_else(|| dataset.default_year()));

        let mut app = Self {
            client,
            fetch: FetchHandle::new(),
            dataset,
            year,
            year_input: String::new(),
            editing_year: false,
            selected_field: 0,
            state: FetchState::Loading,
            series: None,
            status: String::new(),
        };
        app.start_fetch();
        Ok(app)
    }

    fn event_loop<B: ratatui::backend::Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<(), AppError> {
        let mut needs_redraw = true;
        loop {
            if self.poll_fetch() {
                needs_redraw = true;
            }

            if needs_redraw {
                terminal
                    .draw(|f| self.draw(f))
                    .map_err(|e| AppError::new(4, format!("Terminal draw error: {e}")))?;
                needs_redraw = false;
            }

            if !event::poll(Duration::from_millis(100))
                .map_err(|e| AppError::new(4, format!("Event poll error: {e}")))? {
                continue;
            }

            match event::read().map_err(|e| AppError::new(4, format!("Event read error: {e}")))? {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if self.handle_key(key.code) {
                        break;
                    }
                    needs_redraw = true;
                }
                Event::Resize(_, _) => {
                    needs_redraw = true;
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Apply any completed fetch. Stale generations were already discarded by
    /// the handle; whatever arrives here belongs to the latest request.
    fn poll_fetch(&mut self) -> bool {
        let Some(state) = self.fetch.poll() else {
            return false;
        };

        self.state = state;
        if let FetchState::Failed(reason) = &self.state {
            self.status = format!("Fetch failed: {reason}");
            self.series = None;
            return true;
        }

        self.recompute_series();
        if let Some(series) = &self.series {
            self.status = format!(
                "{}: {} points for {}",
                self.dataset.display_name(),
                series.len(),
                self.year
            );
        }
        true
    }

    fn start_fetch(&mut self) {
        self.state = FetchState::Loading;
        self.series = None;
        self.status = format!("Fetching {}...", self.dataset.display_name());

        let client = self.client.clone();
        let dataset = self.dataset;
        self.fetch.spawn(move || client.fetch(dataset));
    }

    /// Pure recomputation from the already-fetched records; no network.
    fn recompute_series(&mut self) {
        if let FetchState::Ready(records) = &self.state {
            self.series = Some(crate::series::project(records, self.dataset, self.year));
        }
    }

    fn handle_key(&mut self, code: KeyCode) -> bool {
        if self.editing_year {
            self.handle_year_edit(code);
            return false;
        }

        match code {
            KeyCode::Char('q') => return true,
            KeyCode::Up => {
                if self.selected_field > 0 {
                    self.selected_field -= 1;
                }
            }
            KeyCode::Down => {
                if self.selected_field < 1 {
                    self.selected_field += 1;
                }
            }
            KeyCode::Left => self.adjust_field(-1),
            KeyCode::Right => self.adjust_field(1),
            KeyCode::Enter => {
                if self.selected_field == 1 {
                    self.editing_year = true;
                    self.year_input.clear();
                    self.status = "Editing year (digits). Enter to apply, Esc to cancel.".to_string();
                }
            }
            KeyCode::Char('r') => {
                self.start_fetch();
            }
            _ => {}
        }

        false
    }

    fn handle_year_edit(&mut self, code: KeyCode) {
        match code {
            KeyCode::Esc => {
                self.editing_year = false;
                self.status = "Year edit canceled.".to_string();
            }
            KeyCode::Enter => {
                self.editing_year = false;
                self.apply_year_input();
            }
            KeyCode::Backspace => {
                self.year_input.pop();
            }
            KeyCode::Char(c) => {
                if c.is_ascii_digit() && self.year_input.len() < 4 {
                    self.year_input.push(c);
                }
            }
            _ => {}
        }
    }

    fn adjust_field(&mut self, delta: i32) {
        match self.selected_field {
            0 => {
                self.dataset = if delta >= 0 {
                    self.dataset.next()
                } else {
                    self.dataset.prev()
                };
                // Carry the year across, clamped into the new dataset's range.
                self.year = self.dataset.clamp_year(self.year);
                self.start_fetch();
            }
            1 => {
                let next = self.dataset.clamp_year(self.year + delta);
                if next != self.year {
                    self.year = next;
                    self.recompute_series();
                }
                self.status = format!("year: {}", self.year);
            }
            _ => {}
        }
    }

    fn apply_year_input(&mut self) {
        let trimmed = self.year_input.trim();
        if trimmed.is_empty() {
            self.status = "Year unchanged.".to_string();
            return;
        }
        let year: i32 = match trimmed.parse() {
            Ok(y) => y,
            Err(e) => {
                self.status = format!("Invalid year '{trimmed}': {e}");
                return;
            }
        };
        self.year = self.dataset.clamp_year(year);
        self.recompute_series();
        self.status = format!("year: {}", self.year);
    }

    fn draw(&mut self, frame: &mut ratatui::Frame<'_>) {
        let size = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(5), Constraint::Min(0), Constraint::Length(3)])
            .split(size);

        self.draw_header(frame, chunks[0]);
        self.draw_body(frame, chunks[1]);
        self.draw_footer(frame, chunks[2]);
    }

    fn draw_header(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let mut lines: Vec<Line> = Vec::new();
        lines.push(Line::from(vec![
            Span::styled("gwt", Style::default().fg(Color::Cyan)),
            Span::raw(" — climate-indicator trends"),
        ]));

        let (lo, hi) = self.dataset.year_bounds();
        let n = self.series.as_ref().map_or(0, DerivedSeries::len);
        lines.push(Line::from(Span::styled(
            format!(
                "dataset: {} | year: {} [{lo}-{hi}] | unit: {} | n={n}",
                self.dataset.display_name(),
                self.year,
                self.dataset.y_axis().unit,
            ),
            Style::default().fg(Color::Gray),
        )));

        // Legend, colored to match the chart lines.
        let mut legend: Vec<Span> = Vec::new();
        for (idx, field) in self.dataset.fields().iter().enumerate() {
            if idx > 0 {
                legend.push(Span::raw("  "));
            }
            let (color, _) = SERIES_PALETTE[idx % SERIES_PALETTE.len()];
            legend.push(Span::styled(format!("── {}", field.label), Style::default().fg(color)));
        }
        lines.push(Line::from(legend));

        let p = Paragraph::new(Text::from(lines)).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_body(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(8)])
            .split(area);

        self.draw_chart(frame, chunks[0]);
        self.draw_settings(frame, chunks[1]);
    }

    fn draw_chart(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let block = Block::default()
            .title(format!("{} — {}", self.dataset.display_name(), self.year))
            .borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(Clear, inner);

        match &self.state {
            FetchState::Loading => {
                let msg = Paragraph::new("Waiting for data...")
                    .style(Style::default().fg(Color::Yellow));
                frame.render_widget(msg, inner);
                return;
            }
            FetchState::Failed(reason) => {
                // The failure reason replaces the chart area verbatim.
                let msg = Paragraph::new(format!("Error: {reason}"))
                    .style(Style::default().fg(Color::Red))
                    .wrap(Wrap { trim: true });
                frame.render_widget(msg, inner);
                return;
            }
            FetchState::Ready(_) => {}
        }

        let Some(series) = &self.series else {
            return;
        };

        if series.is_empty() {
            let msg = Paragraph::new(crate::report::format_no_data(self.dataset, self.year))
                .style(Style::default().fg(Color::Gray));
            frame.render_widget(msg, inner);
            return;
        }

        let lines = chart_lines(series);
        let x_bounds = [1.0, 13.0];
        let y_bounds = chart_y_bounds(series);

        let (chart_rect, insets) = chart_layout(inner);
        let widget = TrendChart {
            lines: &lines,
            x_bounds,
            y_bounds,
            x_label: "month",
            y_label: self.dataset.y_axis().unit.to_string(),
            fmt_x: fmt_axis_month,
            fmt_y: fmt_axis_value,
        };

        frame.render_widget(widget, chart_rect);
        if let Some(insets) = insets {
            draw_axis_ticks(frame, inner, chart_rect, insets, y_bounds);
        }
    }

    fn draw_settings(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let (lo, hi) = self.dataset.year_bounds();
        let skipped = self.series.as_ref().map_or(0, |s| s.skipped);

        let year_label = if self.editing_year {
            format!("{}_", self.year_input)
        } else {
            self.year.to_string()
        };

        let mut items = Vec::new();
        items.push(ListItem::new(format!("Dataset: {}", self.dataset.display_name())));
        items.push(ListItem::new(format!("Year: {year_label}")));
        items.push(ListItem::new(format!("Range: {lo}-{hi}")));
        items.push(ListItem::new(format!(
            "Points: {} (skipped {skipped})",
            self.series.as_ref().map_or(0, DerivedSeries::len)
        )));

        let list = List::new(items)
            .block(Block::default().title("Settings").borders(Borders::ALL))
            .highlight_style(Style::default().fg(Color::Black).bg(Color::White))
            .highlight_symbol("» ");

        let mut state = ratatui::widgets::ListState::default();
        state.select(Some(self.selected_field));
        frame.render_stateful_widget(list, area, &mut state);

        if self.editing_year {
            let hint = Paragraph::new("Editing year…")
                .style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD));
            let rect = Rect {
                x: area.x + 2,
                y: area.y + area.height.saturating_sub(2),
                width: area.width.saturating_sub(4),
                height: 1,
            };
            frame.render_widget(hint, rect);
        }
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let help = "↑/↓ select  ←/→ adjust  Enter edit year  r refresh  q quit";
        let line = Line::from(vec![
            Span::styled(help, Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled(&self.status, Style::default().fg(Color::Yellow)),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }
}

/// Build one chart line per measurement field.
fn chart_lines(series: &DerivedSeries) -> Vec<ChartLine> {
    series
        .dataset
        .fields()
        .iter()
        .enumerate()
        .map(|(idx, field)| ChartLine {
            label: field.label.to_string(),
            points: series.field_series(idx),
        })
        .collect()
}

/// Resolve y bounds: fixed for temperature anomaly, padded data range otherwise.
fn chart_y_bounds(series: &DerivedSeries) -> [f64; 2] {
    if let Some(bounds) = series.dataset.y_axis().fixed_bounds {
        return bounds;
    }

    let Some([mut y_min, mut y_max]) = series.value_bounds() else {
        return [0.0, 1.0];
    };
    if y_max <= y_min {
        // A flat series still needs a visible band.
        y_min -= 0.5;
        y_max += 0.5;
    }

    let pad = ((y_max - y_min).abs() * 0.05).max(1e-12);
    [y_min - pad, y_max + pad]
}

fn fmt_axis_month(v: f64) -> String {
    let month = v.floor() as u32;
    if (1..=12).contains(&month) {
        crate::series::month_name(month).to_string()
    } else {
        String::new()
    }
}

fn fmt_axis_value(v: f64) -> String {
    format!("{v:.1}")
}

#[derive(Debug, Clone, Copy)]
struct AxisInsets {
    left: u16,
    right: u16,
    top: u16,
    bottom: u16,
}

fn chart_layout(inner: Rect) -> (Rect, Option<AxisInsets>) {
    let insets = AxisInsets {
        left: 8,
        right: 2,
        top: 1,
        bottom: 2,
    };

    if inner.width <= insets.left + insets.right + 10
        || inner.height <= insets.top + insets.bottom + 5
    {
        return (inner, None);
    }

    let rect = Rect {
        x: inner.x + insets.left,
        y: inner.y + insets.top,
        width: inner.width - insets.left - insets.right,
        height: inner.height - insets.top - insets.bottom,
    };

    (rect, Some(insets))
}

fn draw_axis_ticks(
    frame: &mut ratatui::Frame<'_>,
    inner: Rect,
    chart: Rect,
    insets: AxisInsets,
    y_bounds: [f64; 2],
) {
    let style = Style::default().fg(Color::Gray);

    // Month ticks along the bottom (every other month keeps them readable).
    for month in (1u32..=12).step_by(2) {
        let u = f64::from(month - 1) / 12.0;
        let x = chart.x + ((chart.width - 1) as f64 * u).round() as u16;
        let label = crate::series::month_name(month);
        let y = chart.y + chart.height;
        if y >= inner.y + inner.height - 1 {
            continue;
        }
        if x + label.len() as u16 > inner.x + inner.width {
            continue;
        }
        frame.render_widget(
            Paragraph::new(label).style(style),
            Rect {
                x,
                y,
                width: label.len() as u16,
                height: 1,
            },
        );
    }

    // Value ticks along the left edge.
    let ticks = 5usize;
    for i in 0..ticks {
        let u = i as f64 / (ticks as f64 - 1.0);
        let y_val = y_bounds[0] + u * (y_bounds[1] - y_bounds[0]);
        let y = chart.y + (chart.height - 1) - ((chart.height - 1) as f64 * u).round() as u16;
        let label = format!("{y_val:.1}");
        let label_len = label.len() as u16;
        let x = inner.x + insets.left.saturating_sub(1);
        let start = x.saturating_sub(label.len() as u16);
        if start < inner.x {
            continue;
        }
        frame.render_widget(
            Paragraph::new(label).style(style),
            Rect {
                x: start,
                y,
                width: label_len,
                height: 1,
            },
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{RawRecord, RawValue, RecordDate};

    fn temp_series(values: &[(&str, &str, &str)]) -> DerivedSeries {
        let records: Vec<RawRecord> = values
            .iter()
            .map(|(time, land, station)| RawRecord {
                date: RecordDate::Fractional(time.to_string()),
                values: vec![
                    RawValue::Text(land.to_string()),
                    RawValue::Text(station.to_string()),
                ],
            })
            .collect();
        crate::series::project(&records, Dataset::Temperature, 1900)
    }

    #[test]
    fn temperature_uses_fixed_bounds() {
        let series = temp_series(&[("1900.042", "-0.38", "-0.27")]);
        assert_eq!(chart_y_bounds(&series), [-2.0, 2.0]);
    }

    #[test]
    fn auto_bounds_pad_the_data_range() {
        let records = vec![RawRecord {
            date: RecordDate::Dotted("2004.1".to_string()),
            values: vec![
                RawValue::Text("318.0".to_string()),
                RawValue::Text("319.0".to_string()),
            ],
        }];
        let series = crate::series::project(&records, Dataset::Nitrous, 2004);
        let [lo, hi] = chart_y_bounds(&series);
        assert!(lo < 318.0);
        assert!(hi > 319.0);
    }

    #[test]
    fn chart_lines_match_field_count() {
        let series = temp_series(&[("1900.042", "-0.38", "-0.27"), ("1900.125", "-0.45", "-0.41")]);
        let lines = chart_lines(&series);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].label, "Land");
        assert_eq!(lines[0].points.len(), 2);
    }

    #[test]
    fn month_axis_formatter_names_in_range_months_only() {
        assert_eq!(fmt_axis_month(1.0), "Jan");
        assert_eq!(fmt_axis_month(12.9), "Dec");
        assert_eq!(fmt_axis_month(13.0), "");
    }
}
