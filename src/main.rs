use std::io;
use std::sync::mpsc;
use std::time::{Duration, Instant};

use chrono::Utc;
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::prelude::*;
use ratatui::widgets::{Axis, Block, Borders, Chart, Clear, Dataset, GraphType, Paragraph};

use pitwall::aggregate;
use pitwall::api::Resource;
use pitwall::control::{
    apply_delta, AppState, Command, Countdown, Delta, OverviewFocus, Screen, RECENT_WINDOW,
    SUPPORTED_SEASONS,
};
use pitwall::model::RaceResults;
use pitwall::provider::spawn_provider;
use pitwall::view;

struct App {
    state: AppState,
    should_quit: bool,
    cmd_tx: mpsc::Sender<Command>,
}

impl App {
    fn new(cmd_tx: mpsc::Sender<Command>) -> Self {
        Self {
            state: AppState::new(),
            should_quit: false,
            cmd_tx,
        }
    }

    fn on_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('?') => self.state.help_overlay = !self.state.help_overlay,
            KeyCode::Char('[') => {
                if let Some(year) = self.state.prev_year() {
                    self.switch_year(year);
                }
            }
            KeyCode::Char(']') => {
                if let Some(year) = self.state.next_year() {
                    self.switch_year(year);
                }
            }
            KeyCode::Char('r') => self.reload_current(),
            KeyCode::Tab | KeyCode::Char('t') => {
                if self.state.screen == Screen::RaceDetail {
                    self.state.cycle_tab();
                }
            }
            KeyCode::Char('j') | KeyCode::Down => self.state.select_next(),
            KeyCode::Char('k') | KeyCode::Up => self.state.select_prev(),
            KeyCode::Char('h') | KeyCode::Left => self.state.focus = OverviewFocus::Schedule,
            KeyCode::Char('l') | KeyCode::Right => self.state.focus = OverviewFocus::Drivers,
            KeyCode::Enter | KeyCode::Char('d') => self.open_detail(),
            KeyCode::Char('b') | KeyCode::Esc => {
                if self.state.screen != Screen::Overview {
                    self.state.screen = Screen::Overview;
                    if self.state.overview.is_none() {
                        self.request(Command::LoadOverview {
                            year: self.state.year,
                        });
                    }
                }
            }
            _ => {}
        }
    }

    /// Year switch: every data slot goes back to its placeholder and the
    /// countdown is disarmed before the new batch is requested, so nothing
    /// from the previous year stays on screen.
    fn switch_year(&mut self, year: u16) {
        self.state.switch_year(year);
        self.state.push_log(format!("[INFO] Switched to season {year}"));
        self.reload_current();
    }

    fn reload_current(&mut self) {
        match self.state.screen {
            Screen::Overview => {
                self.state.overview = None;
                self.state.countdown = Countdown::Idle;
            }
            Screen::RaceDetail => {
                self.state.race_detail = None;
                if let Some(round) = self.state.race_round {
                    self.request(Command::LoadRace {
                        year: self.state.year,
                        round,
                    });
                }
            }
            Screen::DriverDetail => {
                self.state.driver_detail = None;
                if let Some(driver_id) = self.state.driver_id.clone() {
                    self.request(Command::LoadDriver {
                        year: self.state.year,
                        driver_id,
                    });
                }
            }
        }
        // The overview backs every screen, so it is refetched whenever empty.
        if self.state.overview.is_none() {
            self.request(Command::LoadOverview {
                year: self.state.year,
            });
        }
    }

    fn open_detail(&mut self) {
        if self.state.screen != Screen::Overview {
            return;
        }
        match self.state.focus {
            OverviewFocus::Schedule => {
                let round = self.state.selected_round();
                self.state.race_round = round;
                self.state.race_detail = None;
                self.state.active_tab = 0;
                self.state.screen = Screen::RaceDetail;
                match round {
                    Some(round) => self.request(Command::LoadRace {
                        year: self.state.year,
                        round,
                    }),
                    // Without a round there is nothing to fetch; the screen
                    // shows its "not specified" message instead.
                    None => self.state.push_log("[INFO] No race selected"),
                }
            }
            OverviewFocus::Drivers => {
                let driver_id = self.state.selected_driver_id();
                self.state.driver_id = driver_id.clone();
                self.state.driver_detail = None;
                self.state.screen = Screen::DriverDetail;
                match driver_id {
                    Some(driver_id) => self.request(Command::LoadDriver {
                        year: self.state.year,
                        driver_id,
                    }),
                    None => self.state.push_log("[INFO] No driver selected"),
                }
            }
        }
    }

    fn request(&mut self, cmd: Command) {
        if self.cmd_tx.send(cmd).is_err() {
            self.state.push_log("[WARN] Fetch worker unavailable");
        }
    }
}

fn main() -> io::Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::dotenv();

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = ratatui::Terminal::new(backend)?;

    let (tx, rx) = mpsc::channel();
    let (cmd_tx, cmd_rx) = mpsc::channel();
    spawn_provider(tx, cmd_rx);

    let mut app = App::new(cmd_tx);
    app.request(Command::LoadOverview {
        year: app.state.year,
    });
    let res = run_app(&mut terminal, &mut app, rx);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("error: {err}");
    }
    Ok(())
}

fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    rx: mpsc::Receiver<Delta>,
) -> io::Result<()> {
    let tick_rate = Duration::from_millis(250);
    let mut last_tick = Instant::now();

    loop {
        let now = Utc::now();
        while let Ok(delta) = rx.try_recv() {
            apply_delta(&mut app.state, delta, now);
        }
        app.state.tick(now);

        terminal.draw(|f| ui(f, app))?;

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or(Duration::ZERO);
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.on_key(key);
                }
            }
        }

        if last_tick.elapsed() >= tick_rate {
            last_tick = Instant::now();
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn ui(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(1),
        ])
        .split(frame.size());

    let header =
        Paragraph::new(header_text(&app.state)).block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(header, chunks[0]);

    match app.state.screen {
        Screen::Overview => render_overview(frame, chunks[1], &app.state),
        Screen::RaceDetail => render_race_detail(frame, chunks[1], &app.state),
        Screen::DriverDetail => render_driver_detail(frame, chunks[1], &app.state),
    }

    let footer = Paragraph::new(footer_text(&app.state));
    frame.render_widget(footer, chunks[2]);

    if app.state.help_overlay {
        render_help_overlay(frame, frame.size());
    }
}

fn header_text(state: &AppState) -> Text<'static> {
    let screen = match state.screen {
        Screen::Overview => "SEASON",
        Screen::RaceDetail => "RACE",
        Screen::DriverDetail => "DRIVER",
    };
    let seasons = SUPPORTED_SEASONS
        .iter()
        .map(|year| {
            if *year == state.year {
                format!("[{year}]")
            } else {
                format!(" {year} ")
            }
        })
        .collect::<Vec<_>>()
        .join("");
    Text::from(vec![
        Line::styled(
            format!("PITWALL · Formula 1 {}  ·  {screen}", state.year),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Line::styled(
            format!("Seasons: {seasons}"),
            Style::default().fg(Color::DarkGray),
        ),
    ])
}

fn footer_text(state: &AppState) -> String {
    let hints = match state.screen {
        Screen::Overview => {
            "[/] Year  h/l Focus  j/k Move  Enter Open  r Refresh  ? Help  q Quit"
        }
        Screen::RaceDetail => "Tab Tabs  [/] Year  b/Esc Back  r Refresh  ? Help  q Quit",
        Screen::DriverDetail => "[/] Year  b/Esc Back  r Refresh  ? Help  q Quit",
    };
    match state.logs.back() {
        Some(line) => format!("{hints}  ·  {line}"),
        None => hints.to_string(),
    }
}

fn render_overview(frame: &mut Frame, area: Rect, state: &AppState) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(54),
            Constraint::Min(40),
            Constraint::Length(58),
        ])
        .split(area);

    let left = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(7), Constraint::Min(1)])
        .split(columns[0]);

    let right = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(12)])
        .split(columns[2]);

    let now = Utc::now();
    let (hero, schedule, last_race, drivers, teams) = match &state.overview {
        Some(data) => (
            view::next_race_text(&data.schedule, state.year, &state.countdown, now),
            view::schedule_text(
                &data.schedule,
                state.year,
                now,
                (state.focus == OverviewFocus::Schedule).then_some(state.schedule_selected),
            ),
            view::last_race_text(&data.last_race, data.last_race_season),
            view::driver_standings_text(
                &data.driver_standings,
                &data.recent,
                (state.focus == OverviewFocus::Drivers).then_some(state.standings_selected),
            ),
            view::team_standings_text(&data.team_standings),
        ),
        None => (
            view::loading_text(),
            view::loading_text(),
            view::loading_text(),
            view::loading_text(),
            view::loading_text(),
        ),
    };

    frame.render_widget(
        Paragraph::new(hero).block(Block::default().title("Next Race").borders(Borders::ALL)),
        left[0],
    );

    let schedule_title = match state.focus {
        OverviewFocus::Schedule => "Schedule ◂",
        OverviewFocus::Drivers => "Schedule",
    };
    frame.render_widget(
        Paragraph::new(schedule)
            .block(Block::default().title(schedule_title).borders(Borders::ALL))
            .scroll((list_scroll(state.schedule_selected, left[1]), 0)),
        left[1],
    );

    frame.render_widget(
        Paragraph::new(last_race)
            .block(Block::default().title("Last Race").borders(Borders::ALL)),
        columns[1],
    );

    let drivers_title = match state.focus {
        OverviewFocus::Drivers => "Driver Standings ◂",
        OverviewFocus::Schedule => "Driver Standings",
    };
    frame.render_widget(
        Paragraph::new(drivers)
            .block(Block::default().title(drivers_title).borders(Borders::ALL))
            .scroll((list_scroll(state.standings_selected, right[0]), 0)),
        right[0],
    );

    frame.render_widget(
        Paragraph::new(teams).block(
            Block::default()
                .title("Constructor Standings")
                .borders(Borders::ALL),
        ),
        right[1],
    );
}

/// Keeps the selected list row inside the visible window.
fn list_scroll(selected: usize, area: Rect) -> u16 {
    let visible = area.height.saturating_sub(2);
    if visible == 0 {
        return 0;
    }
    (selected as u16).saturating_sub(visible / 2)
}

fn render_race_detail(frame: &mut Frame, area: Rect, state: &AppState) {
    if state.race_round.is_none() {
        frame.render_widget(
            Paragraph::new("No race specified")
                .block(Block::default().title("Race").borders(Borders::ALL)),
            area,
        );
        return;
    }

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Min(1),
        ])
        .split(area);

    let (title, stats) = match &state.race_detail {
        Some(data) => (
            view::race_title_line(&data.race, state.year),
            view::race_stats_text(&data.race, &data.qualifying),
        ),
        None => (
            view::race_title_line(&Resource::Absent, state.year),
            view::loading_text(),
        ),
    };
    let mut header_lines = vec![title];
    header_lines.extend(stats.lines);
    frame.render_widget(
        Paragraph::new(Text::from(header_lines))
            .block(Block::default().borders(Borders::BOTTOM)),
        rows[0],
    );

    let tabs = state.active_tabs();
    let active = state.active_tab.min(tabs.len().saturating_sub(1));
    frame.render_widget(Paragraph::new(view::tab_bar_line(&tabs, active)), rows[1]);

    // Switching tabs replaces only this pane.
    let content = match &state.race_detail {
        Some(data) => view::tab_content_text(tabs[active], data),
        None => view::loading_text(),
    };
    frame.render_widget(
        Paragraph::new(content).block(Block::default().borders(Borders::TOP)),
        rows[2],
    );
}

fn render_driver_detail(frame: &mut Frame, area: Rect, state: &AppState) {
    if state.driver_id.is_none() {
        frame.render_widget(
            Paragraph::new("No driver specified")
                .block(Block::default().title("Driver").borders(Borders::ALL)),
            area,
        );
        return;
    }

    let Some(data) = &state.driver_detail else {
        frame.render_widget(
            Paragraph::new(view::loading_text())
                .block(Block::default().title("Driver").borders(Borders::ALL)),
            area,
        );
        return;
    };

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(2),
            Constraint::Min(1),
        ])
        .split(area);

    frame.render_widget(
        Paragraph::new(view::driver_title_text(&data.races, state.year))
            .block(Block::default().borders(Borders::BOTTOM)),
        rows[0],
    );

    let races = data.races.loaded().map(|r| r.as_slice()).unwrap_or(&[]);
    let results: Vec<_> = races
        .iter()
        .filter_map(|round| round.results.first().cloned())
        .collect();
    let stats = aggregate::season_stats(&results);

    let window_start = races.len().saturating_sub(RECENT_WINDOW);
    let recent = &races[window_start..];
    let driver_id = state.driver_id.as_deref().unwrap_or_default();
    let outcomes = aggregate::form_map(recent)
        .remove(driver_id)
        .unwrap_or_default();

    let mut summary_lines = view::driver_stats_text(&stats).lines;
    summary_lines.push(view::form_line(&outcomes));
    frame.render_widget(Paragraph::new(Text::from(summary_lines)), rows[1]);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(56), Constraint::Length(50)])
        .split(rows[2]);

    let races_text = match &data.races {
        Resource::Loaded(races) => view::driver_races_text(races),
        Resource::Absent => Text::from("Failed to load driver data"),
    };
    frame.render_widget(
        Paragraph::new(races_text)
            .block(Block::default().title("Race by Race").borders(Borders::ALL)),
        body[0],
    );

    let side = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(4), Constraint::Min(1)])
        .split(body[1]);

    let h2h = match &data.standings {
        Resource::Loaded(standings) => match view::teammate_pair(standings, driver_id) {
            Some((driver, teammate)) => view::head_to_head_text(driver, teammate),
            None => Text::from("No standings entry for driver"),
        },
        Resource::Absent => Text::from("Failed to load standings"),
    };
    frame.render_widget(
        Paragraph::new(h2h).block(Block::default().title("Head to Head").borders(Borders::ALL)),
        side[0],
    );

    render_trend_chart(frame, side[1], recent);
}

fn render_trend_chart(frame: &mut Frame, area: Rect, recent: &[RaceResults]) {
    let block = Block::default().title("Points Trend").borders(Borders::ALL);
    if recent.is_empty() {
        frame.render_widget(Paragraph::new("No completed rounds yet").block(block), area);
        return;
    }

    let trend = view::trend_lines(recent);
    let max_points = trend
        .iter()
        .flat_map(|line| line.points.iter().map(|p| p.1))
        .fold(1.0f64, f64::max);
    let rounds = recent.len() as f64;

    let datasets: Vec<Dataset> = trend
        .iter()
        .map(|line| {
            Dataset::default()
                .name(line.label.clone())
                .marker(symbols::Marker::Braille)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(line.color))
                .data(&line.points)
        })
        .collect();

    let chart = Chart::new(datasets)
        .block(block)
        .x_axis(
            Axis::default()
                .title("Round")
                .bounds([1.0, rounds.max(2.0)])
                .labels(vec!["1".into(), format!("{}", recent.len()).into()]),
        )
        .y_axis(
            Axis::default()
                .title("Pts")
                .bounds([0.0, max_points])
                .labels(vec!["0".into(), format!("{max_points:.0}").into()]),
        );
    frame.render_widget(chart, area);
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let popup_area = centered_rect(60, 60, area);
    frame.render_widget(Clear, popup_area);

    let text = [
        "Global:",
        "  [ / ]        Previous / next season",
        "  r            Refresh current screen",
        "  b / Esc      Back to season overview",
        "  ?            Toggle help",
        "  q            Quit",
        "",
        "Overview:",
        "  h / l        Focus schedule / driver standings",
        "  j/k or ↑/↓   Move selection",
        "  Enter        Open race or driver detail",
        "",
        "Race detail:",
        "  Tab          Cycle Race / Qualifying / Pit Stops / Sprint",
    ]
    .join("\n");

    frame.render_widget(
        Paragraph::new(text).block(Block::default().title("Help").borders(Borders::ALL)),
        popup_area,
    );
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1]);

    horizontal[1]
}
