//! Ratatui-based terminal dashboard.
//!
//! Shows the daily bar chart (alert bars in red), the current-month rollup per
//! category and the monthly totals with their trend line. The whole render
//! cycle re-runs every `refresh_secs`.

use std::io;
use std::time::{Duration, Instant};

use chrono::{Local, NaiveDate};
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
    widgets::{Bar, BarChart, BarGroup, Block, Borders, Clear, Paragraph},
    Terminal,
};
use tracing::{debug, warn};

use crate::app::pipeline::{CycleOutput, SourceRows, load_source, run_cycle};
use crate::data::{HolidayProvider, holiday_set_for, provider_for};
use crate::domain::{BoardConfig, HolidaySet, Metric};
use crate::error::AppError;
use crate::report::fmt_value;

mod plotters_chart;

use plotters_chart::TrendPlottersChart;

/// Longest window the dashboard lets you dial in.
const MAX_DAYS: u32 = 62;

/// Start the dashboard.
///
/// With `follow_today`, every refresh moves the window end to the current date.
pub fn run(config: BoardConfig, follow_today: bool) -> Result<(), AppError> {
    let provider = provider_for(&config)?;

    let _guard = TerminalGuard::new()?;

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)
        .map_err(|e| AppError::new(4, format!("Failed to initialize terminal: {e}")))?;

    let mut app = App::new(config, follow_today, provider);
    app.refresh();
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
    config: BoardConfig,
    follow_today: bool,
    provider: Box<dyn HolidayProvider>,
    holidays: HolidaySet,
    holiday_years: Vec<i32>,
    source: Option<SourceRows>,
    run: Option<CycleOutput>,
    last_refresh: Instant,
    refreshed_at: Option<chrono::DateTime<Local>>,
    status: String,
    /// Data source read on every refresh.
    load: fn(&BoardConfig) -> Result<SourceRows, AppError>,
    /// Wall-clock date used when following today.
    today: fn() -> NaiveDate,
}

impl App {
    fn new(config: BoardConfig, follow_today: bool, provider: Box<dyn HolidayProvider>) -> Self {
        Self {
            config,
            follow_today,
            provider,
            holidays: HolidaySet::new(),
            holiday_years: Vec::new(),
            source: None,
            run: None,
            last_refresh: Instant::now(),
            refreshed_at: None,
            status: "Loading...".to_string(),
            load: load_source,
            today: crate::app::today,
        }
    }

    fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.config.refresh_secs)
    }

    fn event_loop<B: ratatui::backend::Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<(), AppError> {
        let mut needs_redraw = true;
        let mut shown_secs_left = u64::MAX;
        loop {
            if self.tick(self.last_refresh.elapsed()) {
                needs_redraw = true;
            }

            // Keep the countdown in the header ticking.
            let secs_left = self.secs_until_refresh();
            if secs_left != shown_secs_left {
                shown_secs_left = secs_left;
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

    /// Runs the render cycle once `since_refresh` reaches `refresh_secs`.
    /// Returns `true` when a refresh ran.
    fn tick(&mut self, since_refresh: Duration) -> bool {
        if since_refresh < self.refresh_interval() {
            return false;
        }
        self.refresh();
        true
    }

    fn secs_until_refresh(&self) -> u64 {
        self.refresh_interval()
            .saturating_sub(self.last_refresh.elapsed())
            .as_secs()
    }

    /// Returns `true` when the user asked to quit.
    fn handle_key(&mut self, code: KeyCode) -> bool {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Char('r') => self.refresh(),
            KeyCode::Left => {
                self.config.days = self.config.days.saturating_sub(1).max(1);
                self.recompute();
                self.status = format!("window: {} days", self.config.days);
            }
            KeyCode::Right => {
                // Never shrink a window that started above the key limit.
                self.config.days = self.config.days.saturating_add(1).min(MAX_DAYS.max(self.config.days));
                self.recompute();
                self.status = format!("window: {} days", self.config.days);
            }
            KeyCode::Char('+') | KeyCode::Char('=') => {
                self.config.threshold += threshold_step(self.config.metric);
                self.recompute();
                self.status = format!("target: {}", fmt_value(self.config.threshold, self.config.metric));
            }
            KeyCode::Char('-') => {
                self.config.threshold = (self.config.threshold - threshold_step(self.config.metric)).max(0.0);
                self.recompute();
                self.status = format!("target: {}", fmt_value(self.config.threshold, self.config.metric));
            }
            KeyCode::Char('e') => self.export(),
            _ => {}
        }
        false
    }

    /// Full render cycle: re-read the data source, then recompute.
    fn refresh(&mut self) {
        self.last_refresh = Instant::now();
        if self.follow_today {
            self.config.end = (self.today)();
        }

        match (self.load)(&self.config) {
            Ok(source) => {
                debug!(rows = source.rows.len(), "data source reloaded");
                self.source = Some(source);
                self.refreshed_at = Some(Local::now());
                self.recompute();
            }
            Err(err) => {
                warn!("refresh failed: {err}");
                self.status = format!("Refresh failed: {err}");
            }
        }
    }

    /// Recompute the cycle from cached rows (settings changes).
    fn recompute(&mut self) {
        if let Err(err) = self.try_recompute() {
            warn!("recompute failed: {err}");
            self.status = err.to_string();
        }
    }

    fn try_recompute(&mut self) -> Result<(), AppError> {
        let Some(source) = &self.source else {
            return Ok(());
        };

        // Holidays are fetched once per set of years, not on every tick.
        let years = self.config.interval().years();
        if years != self.holiday_years {
            self.holidays = holiday_set_for(self.provider.as_ref(), &years)?;
            self.holiday_years = years;
        }

        let run = run_cycle(&self.config, source, &self.holidays, &self.provider.describe())?;
        self.status = format!(
            "{} of {} business days below target",
            run.series.alert_days(),
            run.series.business_days()
        );
        self.run = Some(run);
        Ok(())
    }

    fn export(&mut self) {
        let Some(run) = &self.run else {
            self.status = "Nothing to export yet.".to_string();
            return;
        };
        let path = self
            .config
            .export_csv
            .clone()
            .unwrap_or_else(|| format!("board_series_{}.csv", run.interval.end).into());
        self.status = match crate::io::write_series_csv(&path, &run.series) {
            Ok(()) => format!("Wrote {}", path.display()),
            Err(err) => format!("Export failed: {err}"),
        };
    }

    fn draw(&self, frame: &mut ratatui::Frame<'_>) {
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
        let metric = self.config.metric;
        let mut lines: Vec<Line> = Vec::new();
        lines.push(Line::from(vec![
            Span::styled("board", Style::default().fg(Color::Cyan)),
            Span::raw(" - daily activity"),
        ]));

        lines.push(Line::from(Span::styled(
            format!(
                "window: {} ({} days) | metric: {} | target: {} | holidays: {}",
                self.config.interval(),
                self.config.days,
                metric.display_name(),
                fmt_value(self.config.threshold, metric),
                self.provider.describe(),
            ),
            Style::default().fg(Color::Gray),
        )));

        let refreshed = self
            .refreshed_at
            .map(|t| t.format("%H:%M:%S").to_string())
            .unwrap_or_else(|| "-".to_string());
        let source = self
            .source
            .as_ref()
            .map(|s| s.label.clone())
            .unwrap_or_else(|| "-".to_string());
        lines.push(Line::from(Span::styled(
            format!(
                "source: {source} | refreshed: {refreshed} | next refresh in {}s",
                self.secs_until_refresh()
            ),
            Style::default().fg(Color::Gray),
        )));

        let p = Paragraph::new(Text::from(lines)).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_body(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
            .split(area);
        let top = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(65), Constraint::Percentage(35)])
            .split(rows[0]);

        self.draw_daily(frame, top[0]);
        self.draw_rollup(frame, top[1]);
        self.draw_monthly(frame, rows[1]);
    }

    fn draw_daily(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let metric = self.config.metric;
        let title = format!(
            "Per day ({}) - red: business day below {}",
            metric.display_name(),
            fmt_value(self.config.threshold, metric)
        );
        let block = Block::default().title(title).borders(Borders::ALL);

        let Some(run) = &self.run else {
            render_waiting(frame, block, area);
            return;
        };

        let bars: Vec<Bar> = run
            .series
            .iter()
            .map(|p| {
                let color = if p.is_alert() {
                    Color::Red
                } else if p.is_business_day {
                    Color::Green
                } else {
                    Color::DarkGray
                };
                Bar::default()
                    .value(bar_value(p.value))
                    .text_value(fmt_value(p.value, metric))
                    .label(Line::from(p.date.format("%d/%m").to_string()))
                    .style(Style::default().fg(color))
                    .value_style(Style::default().fg(Color::Black).bg(color))
            })
            .collect();

        let n = bars.len().max(1) as u16;
        let inner_width = area.width.saturating_sub(2);
        let bar_width = (inner_width.saturating_sub(n - 1) / n).clamp(1, 9);
        let max = run
            .series
            .iter()
            .map(|p| bar_value(p.value))
            .chain(std::iter::once(bar_value(self.config.threshold)))
            .max()
            .unwrap_or(1)
            .max(1);

        let chart = BarChart::default()
            .block(block)
            .data(BarGroup::default().bars(&bars))
            .bar_width(bar_width)
            .bar_gap(1)
            .max(max);
        frame.render_widget(chart, area);
    }

    fn draw_rollup(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let metric = self.config.metric;
        let title = self
            .run
            .as_ref()
            .map(|r| format!("Per category ({})", r.period))
            .unwrap_or_else(|| "Per category".to_string());
        let block = Block::default().title(title).borders(Borders::ALL);

        let Some(run) = &self.run else {
            render_waiting(frame, block, area);
            return;
        };
        if run.rollup.is_empty() {
            let msg = Paragraph::new("No categorised rows this month.")
                .style(Style::default().fg(Color::Yellow))
                .block(block);
            frame.render_widget(msg, area);
            return;
        }

        // Largest on top.
        let bars: Vec<Bar> = run
            .rollup
            .iter()
            .rev()
            .map(|t| {
                Bar::default()
                    .value(bar_value(t.total))
                    .text_value(fmt_value(t.total, metric))
                    .label(Line::from(t.category.clone()))
                    .style(Style::default().fg(Color::Cyan))
                    .value_style(Style::default().fg(Color::Black).bg(Color::Cyan))
            })
            .collect();

        let chart = BarChart::default()
            .block(block)
            .direction(Direction::Horizontal)
            .data(BarGroup::default().bars(&bars))
            .bar_width(1)
            .bar_gap(0);
        frame.render_widget(chart, area);
    }

    fn draw_monthly(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let block = Block::default().title("Per month (yellow: trend)").borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(Clear, inner);

        let Some(run) = &self.run else {
            return;
        };
        if run.monthly.is_empty() {
            return;
        }

        let (totals, trend, x_bounds, y_bounds) = monthly_series(run);
        let labels: Vec<String> = run.monthly.iter().map(|m| m.period.label()).collect();
        let widget = TrendPlottersChart {
            totals: &totals,
            trend: &trend,
            x_bounds,
            y_bounds,
            x_labels: &labels,
            y_label: self.config.metric.display_name().to_string(),
            fmt_y: match self.config.metric {
                Metric::Count => fmt_axis_count,
                Metric::Sum => fmt_axis_sum,
            },
        };
        frame.render_widget(widget, inner);
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let help = "←/→ days  +/- target  r refresh  e export  q quit";
        let line = Line::from(vec![
            Span::styled(help, Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled(&self.status, Style::default().fg(Color::Yellow)),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }
}

fn render_waiting(frame: &mut ratatui::Frame<'_>, block: Block<'_>, area: Rect) {
    let msg = Paragraph::new("Waiting for data...")
        .style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
        .block(block);
    frame.render_widget(msg, area);
}

fn threshold_step(metric: Metric) -> f64 {
    match metric {
        Metric::Count => 1.0,
        Metric::Sum => 100.0,
    }
}

/// Bar heights are integers; negative or non-finite values draw as empty.
fn bar_value(v: f64) -> u64 {
    if v.is_finite() && v > 0.0 { v.round() as u64 } else { 0 }
}

/// Build chart series for Plotters: monthly totals and the trend line, with bounds.
fn monthly_series(run: &CycleOutput) -> (Vec<(f64, f64)>, Vec<(f64, f64)>, [f64; 2], [f64; 2]) {
    let totals: Vec<(f64, f64)> = run
        .monthly
        .iter()
        .enumerate()
        .map(|(i, m)| (i as f64, m.total))
        .collect();

    let trend: Vec<(f64, f64)> = match &run.trend {
        Some(t) => (0..run.monthly.len()).map(|i| (i as f64, t.value_at(i as f64))).collect(),
        None => Vec::new(),
    };

    let x_bounds = [-0.5, run.monthly.len() as f64 - 0.5];

    let (mut y_min, mut y_max) = (0.0_f64, f64::NEG_INFINITY);
    for &(_, y) in totals.iter().chain(trend.iter()) {
        y_min = y_min.min(y);
        y_max = y_max.max(y);
    }
    if !y_max.is_finite() || y_max <= y_min {
        y_max = y_min + 1.0;
    }
    let pad = ((y_max - y_min).abs() * 0.05).max(1e-12);
    let y_bounds = [y_min - pad, y_max + pad];

    (totals, trend, x_bounds, y_bounds)
}

fn fmt_axis_count(v: f64) -> String {
    format!("{v:.0}")
}

fn fmt_axis_sum(v: f64) -> String {
    if v.abs() >= 1_000.0 {
        format!("{:.0}k", v / 1_000.0)
    } else {
        format!("{v:.0}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    use crate::data::NoHolidays;
    use crate::domain::{ColumnNames, Holiday, HolidaySource, RecordRow};

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn board_config(end: NaiveDate) -> BoardConfig {
        BoardConfig {
            data_path: None,
            columns: ColumnNames::default(),
            metric: Metric::Count,
            days: 10,
            end,
            threshold: 2.0,
            region: "BR".to_string(),
            holiday_source: HolidaySource::None,
            sample_seed: 1,
            history_days: 30,
            refresh_secs: 60,
            plot_height: 8,
            plot_width: 40,
            export_csv: None,
            export_json: None,
        }
    }

    fn fixed_source(_config: &BoardConfig) -> Result<SourceRows, AppError> {
        Ok(SourceRows {
            rows: vec![
                RecordRow { date: d(2025, 3, 6), value: 1.0, category: Some("ana".to_string()) },
                RecordRow { date: d(2025, 3, 10), value: 1.0, category: Some("bob".to_string()) },
            ],
            skipped: 0,
            label: "fixed".to_string(),
        })
    }

    fn fixed_today() -> NaiveDate {
        d(2025, 3, 10)
    }

    fn test_app(config: BoardConfig, follow_today: bool, provider: Box<dyn HolidayProvider>) -> App {
        let mut app = App::new(config, follow_today, provider);
        app.load = fixed_source;
        app.today = fixed_today;
        app
    }

    /// Counts year lookups so tests can see when holidays are refetched.
    struct CountingHolidays {
        calls: Rc<Cell<usize>>,
    }

    impl HolidayProvider for CountingHolidays {
        fn holidays_for_year(&self, year: i32) -> Result<Vec<Holiday>, AppError> {
            self.calls.set(self.calls.get() + 1);
            Ok(vec![Holiday { date: d(year, 1, 1), name: "New Year".to_string() }])
        }

        fn describe(&self) -> String {
            "counting".to_string()
        }
    }

    #[test]
    fn tick_waits_for_the_refresh_interval() {
        let mut app = test_app(board_config(d(2025, 3, 10)), false, Box::new(NoHolidays));

        assert!(!app.tick(Duration::from_secs(59)));
        assert!(app.source.is_none());
        assert!(app.run.is_none());

        assert!(app.tick(Duration::from_secs(60)));
        let run = app.run.as_ref().unwrap();
        assert_eq!(run.series.len(), 10);
        assert_eq!(run.series.total(), 2.0);
        assert!(app.refreshed_at.is_some());
    }

    #[test]
    fn follow_today_moves_the_window_end() {
        let mut following = test_app(board_config(d(2025, 1, 15)), true, Box::new(NoHolidays));
        following.tick(Duration::from_secs(60));
        assert_eq!(following.config.end, d(2025, 3, 10));
        assert_eq!(following.run.as_ref().unwrap().interval.end, d(2025, 3, 10));

        let mut pinned = test_app(board_config(d(2025, 1, 15)), false, Box::new(NoHolidays));
        pinned.tick(Duration::from_secs(60));
        assert_eq!(pinned.config.end, d(2025, 1, 15));
    }

    #[test]
    fn holidays_are_fetched_once_per_year_set() {
        let calls = Rc::new(Cell::new(0));
        let provider = CountingHolidays { calls: Rc::clone(&calls) };
        let mut app = test_app(board_config(d(2025, 3, 10)), false, Box::new(provider));

        app.tick(Duration::from_secs(60));
        app.tick(Duration::from_secs(61));
        app.handle_key(KeyCode::Char('+'));
        assert_eq!(calls.get(), 1);
        assert_eq!(app.holiday_years, vec![2025]);

        // A window reaching back into 2024 needs both years.
        app.config.end = d(2025, 1, 3);
        app.tick(Duration::from_secs(60));
        assert_eq!(app.holiday_years, vec![2024, 2025]);
        assert_eq!(calls.get(), 3);
        assert!(app.holidays.contains(d(2025, 1, 1)));
    }

    #[test]
    fn widening_never_shrinks_or_overflows() {
        let mut app = test_app(board_config(d(2025, 3, 10)), false, Box::new(NoHolidays));

        app.config.days = 10;
        app.handle_key(KeyCode::Right);
        assert_eq!(app.config.days, 11);

        app.config.days = MAX_DAYS;
        app.handle_key(KeyCode::Right);
        assert_eq!(app.config.days, MAX_DAYS);

        app.config.days = 90;
        app.handle_key(KeyCode::Right);
        assert_eq!(app.config.days, 90);
        app.handle_key(KeyCode::Left);
        assert_eq!(app.config.days, 89);

        app.config.days = u32::MAX;
        app.handle_key(KeyCode::Right);
        assert_eq!(app.config.days, u32::MAX);
    }

    #[test]
    fn bar_values_round_and_clamp() {
        assert_eq!(bar_value(2.5), 3);
        assert_eq!(bar_value(-1.0), 0);
        assert_eq!(bar_value(f64::NAN), 0);
    }

    #[test]
    fn monthly_series_bounds_cover_zero_and_trend() {
        let end = d(2025, 3, 10);
        let config = BoardConfig {
            data_path: None,
            columns: ColumnNames::default(),
            metric: Metric::Sum,
            days: 10,
            end,
            threshold: 100.0,
            region: "BR".to_string(),
            holiday_source: HolidaySource::None,
            sample_seed: 1,
            history_days: 1,
            refresh_secs: 60,
            plot_height: 8,
            plot_width: 40,
            export_csv: None,
            export_json: None,
        };
        let source = SourceRows {
            rows: vec![
                RecordRow { date: NaiveDate::from_ymd_opt(2025, 1, 5).unwrap(), value: 100.0, category: None },
                RecordRow { date: NaiveDate::from_ymd_opt(2025, 3, 5).unwrap(), value: 300.0, category: None },
            ],
            skipped: 0,
            label: "test".to_string(),
        };
        let run = run_cycle(&config, &source, &HolidaySet::new(), "none").unwrap();

        let (totals, trend, x_bounds, y_bounds) = monthly_series(&run);
        assert_eq!(totals.len(), 3);
        assert_eq!(trend.len(), 3);
        assert_eq!(x_bounds, [-0.5, 2.5]);
        assert!(y_bounds[0] < 0.0);
        assert!(y_bounds[1] > 300.0);
    }
}
