//! Ratatui-based terminal UI.
//!
//! The TUI provides a settings panel for the year range and the removal
//! percentage, then renders both dashboard bindings: category counts, top
//! drugs, rating box statistics and the original vs imputed lines.

use std::io;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use rand::SeedableRng;
use rand::rngs::StdRng;
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{BarChart, Block, Borders, Clear, List, ListItem, ListState, Paragraph},
};

use crate::analysis::{COL_RATING, COL_USEFUL};
use crate::dashboard::{Dashboard, ImputationView, YearRangeView};
use crate::domain::{PERCENT_MAX, PERCENT_MIN, Percentage, YEAR_MAX, YEAR_MIN, YearRange};
use crate::error::AppError;
use crate::missing::Table;

mod plotters_chart;

use plotters_chart::ImputationChart;

const FIELD_START: usize = 0;
const FIELD_END: usize = 1;
const FIELD_PERCENT: usize = 2;
const PERCENT_STEP: u32 = 5;

/// Start the TUI.
pub fn run(dashboard: Dashboard) -> Result<(), AppError> {
    let mut app = App::new(dashboard)?;

    let _guard = TerminalGuard::new()?;
    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)
        .map_err(|e| AppError::runtime(format!("Failed to initialize terminal: {e}")))?;

    app.event_loop(&mut terminal)
}

/// Ensures the terminal is restored (raw mode, alternate screen) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode().map_err(|e| AppError::runtime(format!("Failed to enable raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(AppError::runtime(format!("Failed to enter alternate screen: {e}")));
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
    dashboard: Dashboard,
    start: i32,
    end: i32,
    percent: Option<Percentage>,
    percent_input: String,
    /// Seed for the current simulation; `r` replaces it.
    sample_seed: u64,
    selected_field: usize,
    editing_percent: bool,
    status: String,
    years: YearRangeView,
    imputation: ImputationView,
}

impl App {
    fn new(dashboard: Dashboard) -> Result<Self, AppError> {
        let sample_seed = dashboard.seed().unwrap_or_else(rand::random);
        let range = YearRange::full();
        let years = dashboard.year_range_view(range);
        let mut rng = StdRng::seed_from_u64(sample_seed);
        let imputation = dashboard.imputation_view_with_rng(None, &mut rng)?;

        Ok(Self {
            status: format!("{} reviews loaded.", dashboard.records().len()),
            dashboard,
            start: range.start,
            end: range.end,
            percent: None,
            percent_input: String::new(),
            sample_seed,
            selected_field: FIELD_START,
            editing_percent: false,
            years,
            imputation,
        })
    }

    fn event_loop<B: ratatui::backend::Backend>(
        &mut self,
        terminal: &mut Terminal<B>,
    ) -> Result<(), AppError> {
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal
                    .draw(|f| self.draw(f))
                    .map_err(|e| AppError::runtime(format!("Terminal draw error: {e}")))?;
                needs_redraw = false;
            }

            if !event::poll(Duration::from_millis(100))
                .map_err(|e| AppError::runtime(format!("Event poll error: {e}")))?
            {
                continue;
            }

            match event::read().map_err(|e| AppError::runtime(format!("Event read error: {e}")))? {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if self.handle_key(key.code)? {
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

    fn handle_key(&mut self, code: KeyCode) -> Result<bool, AppError> {
        if self.editing_percent {
            return self.handle_percent_edit(code);
        }

        match code {
            KeyCode::Char('q') => return Ok(true),
            KeyCode::Up => {
                self.selected_field = self.selected_field.saturating_sub(1);
            }
            KeyCode::Down => {
                if self.selected_field < FIELD_PERCENT {
                    self.selected_field += 1;
                }
            }
            KeyCode::Left => self.adjust_field(-1)?,
            KeyCode::Right => self.adjust_field(1)?,
            KeyCode::Enter => {
                if self.selected_field == FIELD_PERCENT {
                    self.editing_percent = true;
                    self.percent_input = self
                        .percent
                        .map(|p| p.value().to_string())
                        .unwrap_or_default();
                    self.status = format!(
                        "Editing percentage ({PERCENT_MIN}-{PERCENT_MAX}). Enter to apply, Esc to cancel."
                    );
                }
            }
            KeyCode::Char('x') => {
                self.percent = None;
                self.recompute_imputation()?;
                self.status = "Percentage cleared.".to_string();
            }
            KeyCode::Char('r') => {
                self.sample_seed = next_seed(self.dashboard.seed(), self.sample_seed);
                self.recompute_imputation()?;
                self.status = format!("Re-ran simulation (seed {}).", self.sample_seed);
            }
            _ => {}
        }

        Ok(false)
    }

    fn handle_percent_edit(&mut self, code: KeyCode) -> Result<bool, AppError> {
        match code {
            KeyCode::Esc => {
                self.editing_percent = false;
                self.status = "Percentage edit canceled.".to_string();
            }
            KeyCode::Enter => {
                self.editing_percent = false;
                self.apply_percent_input()?;
            }
            KeyCode::Backspace => {
                self.percent_input.pop();
            }
            KeyCode::Char(c) => {
                if c.is_ascii_digit() && self.percent_input.len() < 3 {
                    self.percent_input.push(c);
                }
            }
            _ => {}
        }
        Ok(false)
    }

    fn adjust_field(&mut self, delta: i32) -> Result<(), AppError> {
        match self.selected_field {
            FIELD_START => {
                self.start = (self.start + delta).clamp(YEAR_MIN, self.end);
                self.recompute_years()?;
            }
            FIELD_END => {
                self.end = (self.end + delta).clamp(self.start, YEAR_MAX);
                self.recompute_years()?;
            }
            FIELD_PERCENT => {
                self.percent = step_percent(self.percent, delta)?;
                self.recompute_imputation()?;
                self.status = self.imputation.label.clone();
            }
            _ => {}
        }
        Ok(())
    }

    fn apply_percent_input(&mut self) -> Result<(), AppError> {
        let trimmed = self.percent_input.trim();
        if trimmed.is_empty() {
            self.percent = None;
        } else {
            let parsed = trimmed
                .parse::<u32>()
                .map_err(|e| AppError::usage(format!("Invalid percentage '{trimmed}': {e}")))
                .and_then(Percentage::new);
            match parsed {
                Ok(p) => self.percent = Some(p),
                Err(err) => {
                    self.status = err.message().to_string();
                    return Ok(());
                }
            }
        }
        self.recompute_imputation()?;
        self.status = self.imputation.label.clone();
        Ok(())
    }

    fn recompute_years(&mut self) -> Result<(), AppError> {
        let range = YearRange::new(self.start, self.end)?;
        self.years = self.dashboard.year_range_view(range);
        self.status = format!("{range}: {} reviews", self.years.rows);
        Ok(())
    }

    fn recompute_imputation(&mut self) -> Result<(), AppError> {
        let mut rng = StdRng::seed_from_u64(self.sample_seed);
        self.imputation = self
            .dashboard
            .imputation_view_with_rng(self.percent, &mut rng)?;
        Ok(())
    }

    fn draw(&mut self, frame: &mut ratatui::Frame<'_>) {
        let size = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(4), Constraint::Min(0), Constraint::Length(3)])
            .split(size);

        self.draw_header(frame, chunks[0]);
        self.draw_body(frame, chunks[1]);
        self.draw_footer(frame, chunks[2]);
    }

    fn draw_header(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let lines = vec![
            Line::from(vec![
                Span::styled("drugdash", Style::default().fg(Color::Cyan)),
                Span::raw(" | drug review dashboard"),
            ]),
            Line::from(Span::styled(
                format!(
                    "years: {} | reviews: {} | {}",
                    self.years.range, self.years.rows, self.imputation.label
                ),
                Style::default().fg(Color::Gray),
            )),
        ];
        let p = Paragraph::new(Text::from(lines)).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_body(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Percentage(45),
                Constraint::Min(0),
                Constraint::Length(5),
            ])
            .split(area);
        let top = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
            .split(rows[0]);
        let bottom = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
            .split(rows[1]);

        self.draw_categories(frame, top[0]);
        self.draw_top_drugs(frame, top[1]);
        self.draw_box_stats(frame, bottom[0]);
        self.draw_imputation_chart(frame, bottom[1]);
        self.draw_settings(frame, rows[2]);
    }

    fn draw_categories(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let block = Block::default().title("Reviews per condition").borders(Borders::ALL);
        let bars: Vec<(&str, u64)> = self
            .years
            .category_counts
            .iter()
            .map(|c| (c.condition.label(), c.count as u64))
            .collect();
        if bars.is_empty() {
            frame.render_widget(no_data(block), area);
            return;
        }

        let slots = bars.len() as u16;
        let bar_width = (area.width.saturating_sub(2) / slots).saturating_sub(1).clamp(3, 12);
        let chart = BarChart::default()
            .block(block)
            .data(bars.as_slice())
            .bar_width(bar_width)
            .bar_gap(1)
            .bar_style(Style::default().fg(Color::Cyan))
            .value_style(Style::default().fg(Color::Black).bg(Color::Cyan));
        frame.render_widget(chart, area);
    }

    fn draw_top_drugs(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let block = Block::default().title("Top drugs").borders(Borders::ALL);
        if self.years.top_drugs.is_empty() {
            frame.render_widget(no_data(block), area);
            return;
        }

        let items: Vec<ListItem> = self
            .years
            .top_drugs
            .iter()
            .map(|d| {
                ListItem::new(Line::from(vec![
                    Span::styled(
                        format!("{:<20}", d.condition.label()),
                        Style::default().fg(Color::Gray),
                    ),
                    Span::raw(format!("{} ({})", d.drug_name, d.count)),
                ]))
            })
            .collect();
        frame.render_widget(List::new(items).block(block), area);
    }

    fn draw_box_stats(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let block = Block::default().title("Ratings of top drugs").borders(Borders::ALL);
        let mut lines = vec![Line::from(Span::styled(
            format!("{:<20}{:>5}{:>6}{:>6}{:>6}{:>6}{:>6}", "condition", "n", "min", "q1", "med", "q3", "max"),
            Style::default().add_modifier(Modifier::BOLD),
        ))];
        for group in &self.years.ratings {
            let Some(s) = group.stats else {
                continue;
            };
            lines.push(Line::from(format!(
                "{:<20}{:>5}{:>6.1}{:>6.1}{:>6.1}{:>6.1}{:>6.1}",
                group.condition.label(),
                s.n,
                s.min,
                s.q1,
                s.median,
                s.q3,
                s.max
            )));
        }
        if lines.len() == 1 {
            frame.render_widget(no_data(block), area);
            return;
        }
        frame.render_widget(Paragraph::new(Text::from(lines)).block(block), area);
    }

    fn draw_imputation_chart(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let block = Block::default()
            .title("Mean usefulness by rating: original (white) vs imputed (cyan)")
            .borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(Clear, inner);

        let Some(series) = ChartSeries::build(&self.imputation) else {
            let msg = Paragraph::new("No rating data.").style(Style::default().fg(Color::Yellow));
            frame.render_widget(msg, inner);
            return;
        };

        let widget = ImputationChart {
            original: &series.original,
            imputed: &series.imputed,
            filled: &series.filled,
            x_bounds: series.x_bounds,
            y_bounds: series.y_bounds,
            x_label: "rating",
            y_label: "useful",
        };
        frame.render_widget(widget, inner);
    }

    fn draw_settings(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let percent_label = if self.editing_percent {
            format!("{}_", self.percent_input)
        } else {
            self.percent
                .map(|p| format!("{}%", p.value()))
                .unwrap_or_else(|| "none".to_string())
        };

        let items = vec![
            ListItem::new(format!("Start year: {}", self.start)),
            ListItem::new(format!("End year:   {}", self.end)),
            ListItem::new(format!("Removed:    {percent_label}")),
        ];

        let list = List::new(items)
            .block(Block::default().title("Settings").borders(Borders::ALL))
            .highlight_style(Style::default().fg(Color::Black).bg(Color::White))
            .highlight_symbol("» ");

        let mut state = ListState::default();
        state.select(Some(self.selected_field));
        frame.render_stateful_widget(list, area, &mut state);
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let help = "↑/↓ select  ←/→ adjust  Enter edit %  x clear %  r re-run  q quit";
        let line = Line::from(vec![
            Span::styled(help, Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled(&self.status, Style::default().fg(Color::Yellow)),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }
}

fn no_data(block: Block<'_>) -> Paragraph<'_> {
    Paragraph::new("No reviews in this range.")
        .style(Style::default().fg(Color::Yellow))
        .block(block)
}

/// Seeded runs step through a reproducible sequence; unseeded runs draw
/// fresh randomness.
fn next_seed(configured: Option<u64>, current: u64) -> u64 {
    match configured {
        Some(_) => current.wrapping_add(1),
        None => rand::random(),
    }
}

/// `None` steps up to the first multiple of the step; stepping down from the
/// minimum clears the percentage.
fn step_percent(current: Option<Percentage>, delta: i32) -> Result<Option<Percentage>, AppError> {
    let next = match (current.map(Percentage::value), delta >= 0) {
        (None, true) => PERCENT_STEP,
        (None, false) => return Ok(None),
        (Some(v), true) => (u32::from(v) + PERCENT_STEP).min(u32::from(PERCENT_MAX)),
        (Some(v), false) if u32::from(v) <= u32::from(PERCENT_MIN) => return Ok(None),
        (Some(v), false) => u32::from(v)
            .saturating_sub(PERCENT_STEP)
            .max(u32::from(PERCENT_MIN)),
    };
    Percentage::new(next).map(Some)
}

/// Series and bounds for the Plotters widget.
struct ChartSeries {
    original: Vec<(f64, f64)>,
    imputed: Vec<(f64, f64)>,
    /// Imputed points whose simulated row had a blank cell.
    filled: Vec<(f64, f64)>,
    x_bounds: [f64; 2],
    y_bounds: [f64; 2],
}

impl ChartSeries {
    fn build(view: &ImputationView) -> Option<Self> {
        let original = crate::charts::line_points(&view.original);
        let imputed = crate::charts::line_points(&view.imputed);
        let filled = filled_points(&view.simulated, &view.imputed);

        let all = original.iter().chain(&imputed);
        let (mut x0, mut x1, mut y0, mut y1) =
            (f64::INFINITY, f64::NEG_INFINITY, f64::INFINITY, f64::NEG_INFINITY);
        for &(x, y) in all {
            x0 = x0.min(x);
            x1 = x1.max(x);
            y0 = y0.min(y);
            y1 = y1.max(y);
        }
        if !(x0.is_finite() && x1.is_finite() && y0.is_finite() && y1.is_finite()) {
            return None;
        }
        if x1 <= x0 {
            x0 -= 0.5;
            x1 += 0.5;
        }
        let pad = ((y1 - y0).abs() * 0.05).max(0.5);

        Some(Self {
            original,
            imputed,
            filled,
            x_bounds: [x0, x1],
            y_bounds: [y0 - pad, y1 + pad],
        })
    }
}

fn filled_points(simulated: &Table, imputed: &Table) -> Vec<(f64, f64)> {
    let row_had_gap = |row: usize| {
        simulated
            .columns()
            .iter()
            .any(|c| c.values.get(row).is_some_and(Option::is_none))
    };
    let (Some(xs), Some(ys)) = (imputed.column(COL_RATING), imputed.column(COL_USEFUL)) else {
        return Vec::new();
    };
    xs.values
        .iter()
        .zip(&ys.values)
        .enumerate()
        .filter(|(row, _)| row_had_gap(*row))
        .filter_map(|(_, (x, y))| Some(((*x)?, (*y)?)))
        .collect()
}
