use chrono::{DateTime, NaiveDate, Utc};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};

use crate::aggregate::{self, Outcome, SeasonStats};
use crate::api::Resource;
use crate::control::{Countdown, ResultTab, RaceData};
use crate::lookup;
use crate::model::{
    DriverStanding, PitStop, QualifyingResult, Race, RaceResult, RaceResults, TeamStanding,
};

const TOP_PIT_STOPS: usize = 10;
const TREND_DRIVERS: usize = 5;

const GOLD: Color = Color::Rgb(0xFF, 0xD7, 0x00);
const SILVER: Color = Color::Rgb(0xC0, 0xC0, 0xC0);
const BRONZE: Color = Color::Rgb(0xCD, 0x7F, 0x32);
const DIM: Color = Color::DarkGray;

// ---------------------------------------------------------------------------
// Position classification. One classifier, reused by standings rows, form
// dots, race rows, and sprint rows.
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PosClass {
    P1,
    P2,
    P3,
    Points,
    Dnf,
    NoClass,
}

pub fn pos_class(position: Option<u32>, status: &str) -> PosClass {
    if aggregate::is_dnf(status) {
        return PosClass::Dnf;
    }
    match position {
        Some(1) => PosClass::P1,
        Some(2) => PosClass::P2,
        Some(3) => PosClass::P3,
        Some(pos) if pos <= 10 => PosClass::Points,
        _ => PosClass::NoClass,
    }
}

pub fn class_color(class: PosClass) -> Color {
    match class {
        PosClass::P1 => GOLD,
        PosClass::P2 => SILVER,
        PosClass::P3 => BRONZE,
        PosClass::Points => Color::Green,
        PosClass::Dnf => Color::Red,
        PosClass::NoClass => DIM,
    }
}

fn pos_display(position: Option<u32>, status: &str) -> String {
    if aggregate::is_dnf(status) {
        "DNF".to_string()
    } else {
        position.map(|p| p.to_string()).unwrap_or_else(|| "—".to_string())
    }
}

/// Winner shows the absolute race time, other finishers a "+" gap, and
/// non-finishers their status verbatim.
fn time_display(result: &RaceResult) -> String {
    if aggregate::is_dnf(&result.status) {
        return result.status.clone();
    }
    match (&result.time, result.position) {
        (Some(time), Some(1)) => time.clone(),
        (Some(time), _) => format!("+{time}"),
        (None, _) => result.status.clone(),
    }
}

/// Driver id of the fastest-lap holder: rank 1, at most one per event.
pub fn fastest_lap_driver(results: &[RaceResult]) -> Option<&str> {
    results
        .iter()
        .find(|r| r.fastest_lap_rank == Some(1))
        .map(|r| r.driver.id.as_str())
}

fn fl_badge() -> Span<'static> {
    Span::styled(" FL", Style::default().fg(Color::Magenta).add_modifier(Modifier::BOLD))
}

fn nat_tag(nationality: &str) -> String {
    match lookup::nationality_code(nationality) {
        Some(code) => format!("[{code}] "),
        None => String::new(),
    }
}

fn format_date(date: NaiveDate) -> String {
    date.format("%a %e %b %Y").to_string()
}

// ---------------------------------------------------------------------------
// Placeholders. Absent and empty-but-valid read differently.
// ---------------------------------------------------------------------------

pub fn loading_text() -> Text<'static> {
    Text::from(Line::styled("Loading…", Style::default().fg(DIM)))
}

fn placeholder(msg: impl Into<String>) -> Text<'static> {
    Text::from(Line::styled(msg.into(), Style::default().fg(DIM)))
}

// ---------------------------------------------------------------------------
// Next-race hero with countdown
// ---------------------------------------------------------------------------

pub fn next_race_text(
    schedule: &Resource<Vec<Race>>,
    year: u16,
    countdown: &Countdown,
    now: DateTime<Utc>,
) -> Text<'static> {
    let races = match schedule {
        Resource::Loaded(races) => races,
        Resource::Absent => return placeholder("Failed to load schedule"),
    };
    if races.is_empty() {
        return placeholder(format!("{year} season schedule not yet available"));
    }
    let Some(race) = crate::control::next_race(races, now) else {
        return placeholder(format!("The {year} season is complete"));
    };

    let flag = lookup::country_flag(&race.circuit.country);
    let mut lines = vec![
        Line::styled(
            format!("NEXT RACE · ROUND {}", race.round),
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        ),
        Line::styled(
            format!("{flag} {}", race.name),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Line::raw(format!(
            "{} • {}, {}",
            race.circuit.name, race.circuit.locality, race.circuit.country
        )),
        Line::styled(format_date(race.date), Style::default().fg(DIM)),
    ];
    lines.push(countdown_line(countdown, now));
    Text::from(lines)
}

/// Countdown fragment. Once the start instant has passed the terminal state
/// is rendered; components are never negative.
pub fn countdown_line(countdown: &Countdown, now: DateTime<Utc>) -> Line<'static> {
    match countdown {
        Countdown::Idle => Line::raw(""),
        Countdown::Expired => Line::styled(
            "Race underway!",
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        ),
        Countdown::Armed(target) => {
            if now >= *target {
                return Line::styled(
                    "Race underway!",
                    Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
                );
            }
            let remaining = (*target - now).num_seconds();
            let days = remaining / 86_400;
            let hours = (remaining % 86_400) / 3_600;
            let minutes = (remaining % 3_600) / 60;
            let seconds = remaining % 60;
            Line::styled(
                format!("{days}d : {hours:02}h : {minutes:02}m : {seconds:02}s"),
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            )
        }
    }
}

// ---------------------------------------------------------------------------
// Schedule list
// ---------------------------------------------------------------------------

pub fn schedule_text(
    schedule: &Resource<Vec<Race>>,
    year: u16,
    now: DateTime<Utc>,
    selected: Option<usize>,
) -> Text<'static> {
    let races = match schedule {
        Resource::Loaded(races) => races,
        Resource::Absent => return placeholder("Failed to load schedule"),
    };
    if races.is_empty() {
        return placeholder(format!("{year} schedule not yet available"));
    }

    let next_round = crate::control::next_race(races, now).map(|race| race.round);
    let mut lines = Vec::with_capacity(races.len());
    for (idx, race) in races.iter().enumerate() {
        let is_past = race.start_utc() <= now;
        let is_next = Some(race.round) == next_round;
        let marker = if selected == Some(idx) { "> " } else { "  " };
        let flag = lookup::country_flag(&race.circuit.country);
        let sprint = if race.has_sprint() { " [Sprint]" } else { "" };

        let mut style = Style::default();
        if is_past {
            style = style.fg(DIM);
        }
        if is_next {
            style = Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD);
        }
        if selected == Some(idx) {
            style = style.bg(Color::DarkGray).fg(Color::White);
        }
        lines.push(Line::styled(
            format!(
                "{marker}R{:<2} {flag} {}{sprint}  {}",
                race.round,
                race.name,
                format_date(race.date)
            ),
            style,
        ));
    }
    Text::from(lines)
}

// ---------------------------------------------------------------------------
// Standings tables with points-share bars
// ---------------------------------------------------------------------------

fn points_bar(points: f32, max_points: f32, color: Color) -> Span<'static> {
    let pct = aggregate::share_of_max(points, max_points);
    let filled = (pct as usize / 10).min(10);
    let mut bar = String::new();
    for i in 0..10 {
        bar.push(if i < filled { '▰' } else { '▱' });
    }
    Span::styled(bar, Style::default().fg(color))
}

pub fn driver_standings_text(
    standings: &Resource<Vec<DriverStanding>>,
    recent: &Resource<Vec<RaceResults>>,
    selected: Option<usize>,
) -> Text<'static> {
    let rows = match standings {
        Resource::Loaded(rows) => rows,
        Resource::Absent => return placeholder("Failed to load driver standings"),
    };
    if rows.is_empty() {
        return placeholder("Standings will appear after the first race");
    }

    let form = recent
        .loaded()
        .map(|races| aggregate::form_map(races))
        .unwrap_or_default();
    let max_points = rows.first().map(|row| row.points).unwrap_or(0.0);
    let mut lines = Vec::with_capacity(rows.len());
    for (idx, row) in rows.iter().enumerate() {
        let color = lookup::team_color(&row.team.id);
        let marker = if selected == Some(idx) { "> " } else { "  " };
        let base = if selected == Some(idx) {
            Style::default().bg(Color::DarkGray).fg(Color::White)
        } else {
            Style::default()
        };
        let mut spans = vec![
            Span::styled(format!("{marker}{:>2} ", row.position), base),
            Span::styled(format!("{:<18}", row.driver.short_name()), base),
            Span::styled(format!("{:<12}", row.team.name), base.fg(color)),
            points_bar(row.points, max_points, color),
            Span::styled(format!(" {:>5} pts", row.points), base),
        ];
        if let Some(outcomes) = form.get(&row.driver.id) {
            spans.push(Span::raw("  "));
            spans.extend(form_dots(outcomes));
        }
        lines.push(Line::from(spans));
    }
    Text::from(lines)
}

pub fn team_standings_text(standings: &Resource<Vec<TeamStanding>>) -> Text<'static> {
    let rows = match standings {
        Resource::Loaded(rows) => rows,
        Resource::Absent => return placeholder("Failed to load constructor standings"),
    };
    if rows.is_empty() {
        return placeholder("Standings will appear after the first race");
    }

    let max_points = rows.first().map(|row| row.points).unwrap_or(0.0);
    let mut lines = Vec::with_capacity(rows.len());
    for row in rows {
        let color = lookup::team_color(&row.team.id);
        lines.push(Line::from(vec![
            Span::styled(format!("  {:>2} ", row.position), Style::default().fg(color)),
            Span::raw(format!("{:<14}", row.team.name)),
            points_bar(row.points, max_points, color),
            Span::raw(format!(" {:>5} pts", row.points)),
        ]));
    }
    Text::from(lines)
}

// ---------------------------------------------------------------------------
// Podium + result rows
// ---------------------------------------------------------------------------

/// Three podium lines with the winner in the centre slot. Each slot is found
/// by the result's own position field, so input order does not matter.
pub fn podium_lines(results: &[RaceResult], fl_driver: Option<&str>) -> Vec<Line<'static>> {
    [2u32, 1, 3]
        .iter()
        .map(|slot| {
            let result = results.iter().find(|r| r.position == Some(*slot));
            podium_slot(*slot, result, fl_driver)
        })
        .collect()
}

fn podium_slot(slot: u32, result: Option<&RaceResult>, fl_driver: Option<&str>) -> Line<'static> {
    let Some(result) = result else {
        return Line::styled(format!("   {slot}  —"), Style::default().fg(DIM));
    };
    let color = lookup::team_color(&result.team.id);
    let class_style = Style::default()
        .fg(class_color(pos_class(Some(slot), &result.status)))
        .add_modifier(Modifier::BOLD);
    let time = if slot == 1 {
        "Winner".to_string()
    } else {
        match &result.time {
            Some(time) => format!("+{time}"),
            None => result.status.clone(),
        }
    };
    let mut spans = vec![
        Span::styled(format!("   {slot}  "), class_style),
        Span::raw(format!(
            "{}{:<18}",
            nat_tag(&result.driver.nationality),
            result.driver.short_name()
        )),
        Span::styled(format!("{:<14}", result.team.name), Style::default().fg(color)),
        Span::styled(time, Style::default().fg(DIM)),
    ];
    if fl_driver == Some(result.driver.id.as_str()) {
        spans.push(fl_badge());
    }
    Line::from(spans)
}

fn result_row(result: &RaceResult, fl_driver: Option<&str>) -> Line<'static> {
    let class = pos_class(result.position, &result.status);
    let color = lookup::team_color(&result.team.id);
    let mut spans = vec![
        Span::styled(
            format!("  {:>3} ", pos_display(result.position, &result.status)),
            Style::default().fg(class_color(class)).add_modifier(Modifier::BOLD),
        ),
        Span::raw(format!(
            "{}{:<18}",
            nat_tag(&result.driver.nationality),
            result.driver.short_name()
        )),
        Span::styled(format!("{:<14}", result.team.name), Style::default().fg(color)),
        Span::styled(format!("P{:<3}", result.grid), Style::default().fg(DIM)),
        Span::raw(format!("{:<14}", time_display(result))),
        Span::styled(
            format!("{:>5} pts", result.points),
            Style::default().fg(DIM),
        ),
    ];
    if fl_driver == Some(result.driver.id.as_str()) {
        spans.push(fl_badge());
    }
    Line::from(spans)
}

// ---------------------------------------------------------------------------
// Last-race panel (overview)
// ---------------------------------------------------------------------------

pub fn last_race_text(last: &Resource<Option<RaceResults>>, season: u16) -> Text<'static> {
    let payload = match last {
        Resource::Loaded(payload) => payload,
        Resource::Absent => return placeholder("Failed to load race data"),
    };
    let Some(round) = payload else {
        return placeholder("No race results available yet");
    };
    if round.results.is_empty() {
        return placeholder("No results available");
    }

    let flag = lookup::country_flag(&round.race.circuit.country);
    let fl_driver = fastest_lap_driver(&round.results);
    let mut lines = vec![
        Line::styled(
            format!("{flag} {} · {} ", round.race.name, season),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Line::styled(format_date(round.race.date), Style::default().fg(DIM)),
        Line::raw(""),
    ];
    lines.extend(podium_lines(&round.results, fl_driver));
    lines.push(Line::raw(""));
    for result in round
        .results
        .iter()
        .filter(|r| matches!(r.position, Some(pos) if (4..=10).contains(&pos)))
    {
        lines.push(result_row(result, fl_driver));
    }
    Text::from(lines)
}

// ---------------------------------------------------------------------------
// Race-detail tabs
// ---------------------------------------------------------------------------

pub fn tab_bar_line(tabs: &[ResultTab], active: usize) -> Line<'static> {
    let mut spans = Vec::new();
    for (idx, tab) in tabs.iter().enumerate() {
        let style = if idx == active {
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(DIM)
        };
        spans.push(Span::styled(format!(" {} ", tab.label()), style));
        if idx + 1 < tabs.len() {
            spans.push(Span::styled("|", Style::default().fg(DIM)));
        }
    }
    Line::from(spans)
}

/// Content pane for the active tab. Only this fragment changes on a tab
/// switch.
pub fn tab_content_text(tab: ResultTab, data: &RaceData) -> Text<'static> {
    match tab {
        ResultTab::Race => race_tab_text(&data.race),
        ResultTab::Qualifying => qualifying_tab_text(&data.qualifying),
        ResultTab::PitStops => pit_stops_tab_text(&data.pit_stops, &data.race),
        ResultTab::Sprint => sprint_tab_text(&data.sprint),
    }
}

fn race_tab_text(race: &Resource<Option<RaceResults>>) -> Text<'static> {
    let payload = match race {
        Resource::Loaded(payload) => payload,
        Resource::Absent => return placeholder("Failed to load race results"),
    };
    let Some(round) = payload else {
        return placeholder("No data found");
    };
    let fl_driver = fastest_lap_driver(&round.results);
    let mut lines = podium_lines(&round.results, fl_driver);
    lines.push(Line::raw(""));
    for result in &round.results {
        lines.push(result_row(result, fl_driver));
    }
    Text::from(lines)
}

fn sprint_tab_text(sprint: &Resource<Option<RaceResults>>) -> Text<'static> {
    let payload = match sprint {
        Resource::Loaded(payload) => payload,
        Resource::Absent => return placeholder("Failed to load sprint results"),
    };
    let Some(round) = payload else {
        return placeholder("No sprint data available");
    };
    let fl_driver = fastest_lap_driver(&round.results);
    let lines: Vec<Line<'static>> = round
        .results
        .iter()
        .map(|result| result_row(result, fl_driver))
        .collect();
    if lines.is_empty() {
        return placeholder("No sprint data available");
    }
    Text::from(lines)
}

fn qualifying_tab_text(qualifying: &Resource<Vec<QualifyingResult>>) -> Text<'static> {
    let rows = match qualifying {
        Resource::Loaded(rows) => rows,
        Resource::Absent => return placeholder("Failed to load qualifying"),
    };
    if rows.is_empty() {
        return placeholder("No qualifying data available");
    }

    let mut lines = Vec::with_capacity(rows.len());
    for (idx, row) in rows.iter().enumerate() {
        let is_pole = idx == 0;
        let color = lookup::team_color(&row.team.id);
        let pos_style = if is_pole {
            Style::default().fg(GOLD).add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        let mut spans = vec![
            Span::styled(format!("  {:>2} ", row.position), pos_style),
            Span::raw(format!(
                "{}{:<18}",
                nat_tag(&row.driver.nationality),
                row.driver.short_name()
            )),
            Span::styled(format!("{:<14}", row.team.name), Style::default().fg(color)),
        ];
        for (label, value) in [("Q1", &row.q1), ("Q2", &row.q2), ("Q3", &row.q3)] {
            if let Some(time) = value {
                let style = if label == "Q3" && is_pole {
                    Style::default().fg(GOLD)
                } else {
                    Style::default().fg(DIM)
                };
                spans.push(Span::styled(format!("{label} {time}  "), style));
            }
        }
        lines.push(Line::from(spans));
    }
    Text::from(lines)
}

/// Pit-stop ranking: data-artifact stops (non-positive duration) excluded,
/// ascending by duration, capped, fastest highlighted.
fn pit_stops_tab_text(
    pit_stops: &Resource<Vec<PitStop>>,
    race: &Resource<Option<RaceResults>>,
) -> Text<'static> {
    let stops = match pit_stops {
        Resource::Loaded(stops) => stops,
        Resource::Absent => return placeholder("Failed to load pit stops"),
    };
    if stops.is_empty() {
        return placeholder("No pit stop data available");
    }

    let results = race
        .loaded()
        .and_then(|payload| payload.as_ref())
        .map(|round| round.results.as_slice())
        .unwrap_or(&[]);

    let mut ranked: Vec<&PitStop> = stops.iter().filter(|stop| stop.duration > 0.0).collect();
    ranked.sort_by(|a, b| a.duration.total_cmp(&b.duration));
    ranked.truncate(TOP_PIT_STOPS);
    if ranked.is_empty() {
        return placeholder("No pit stop data available");
    }

    let mut lines = Vec::with_capacity(ranked.len());
    for (idx, stop) in ranked.iter().enumerate() {
        let fastest = idx == 0;
        let row = results.iter().find(|r| r.driver.id == stop.driver_id);
        let name = row
            .map(|r| r.driver.short_name())
            .unwrap_or_else(|| stop.driver_id.clone());
        let color = row
            .map(|r| lookup::team_color(&r.team.id))
            .unwrap_or(lookup::FALLBACK_TEAM_COLOR);
        let rank_style = if fastest {
            Style::default().fg(GOLD).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(DIM)
        };
        let mut spans = vec![
            Span::styled(format!("  {:>2} ", idx + 1), rank_style),
            Span::styled(format!("{name:<18}"), Style::default().fg(color)),
            Span::styled(
                format!("Lap {:<3} Stop {:<2} ", stop.lap, stop.stop),
                Style::default().fg(DIM),
            ),
            Span::styled(
                format!("{:.3}s", stop.duration),
                if fastest {
                    Style::default().fg(Color::Magenta).add_modifier(Modifier::BOLD)
                } else {
                    Style::default()
                },
            ),
        ];
        if fastest {
            spans.push(Span::styled(
                " FAST",
                Style::default().fg(Color::Magenta).add_modifier(Modifier::BOLD),
            ));
        }
        lines.push(Line::from(spans));
    }
    Text::from(lines)
}

// ---------------------------------------------------------------------------
// Race-detail stat cards
// ---------------------------------------------------------------------------

pub fn race_stats_text(
    race: &Resource<Option<RaceResults>>,
    qualifying: &Resource<Vec<QualifyingResult>>,
) -> Text<'static> {
    let Some(Some(round)) = race.loaded() else {
        return loading_race_header(race);
    };
    if round.results.is_empty() {
        return placeholder("No data found");
    }

    let winner = round.results.iter().find(|r| r.position == Some(1));
    let fl_result = round.results.iter().find(|r| r.fastest_lap_rank == Some(1));
    let pole = qualifying.loaded().and_then(|rows| rows.first());
    let circuit = lookup::circuit_info(&round.race.circuit.id);

    let mut cards: Vec<(&str, String)> = vec![
        ("Date", format_date(round.race.date)),
        (
            "Winner",
            winner
                .map(|r| r.driver.short_name())
                .unwrap_or_else(|| "—".to_string()),
        ),
        (
            "Pole",
            pole.map(|q| q.driver.short_name())
                .unwrap_or_else(|| "—".to_string()),
        ),
        (
            "Fastest Lap",
            fl_result
                .map(|r| r.driver.short_name())
                .unwrap_or_else(|| "—".to_string()),
        ),
    ];
    if let Some(time) = fl_result.and_then(|r| r.fastest_lap_time.clone()) {
        cards.push(("FL Time", time));
    }
    if let Some(info) = circuit {
        cards.push(("Laps", info.laps.to_string()));
        cards.push(("Length", info.length.to_string()));
    }

    let spans: Vec<Span<'static>> = cards
        .into_iter()
        .flat_map(|(label, value)| {
            vec![
                Span::styled(format!("{label}: "), Style::default().fg(DIM)),
                Span::styled(value, Style::default().add_modifier(Modifier::BOLD)),
                Span::raw("   "),
            ]
        })
        .collect();
    Text::from(Line::from(spans))
}

fn loading_race_header(race: &Resource<Option<RaceResults>>) -> Text<'static> {
    match race {
        Resource::Absent => placeholder("Failed to load race data"),
        Resource::Loaded(_) => placeholder("No data found"),
    }
}

pub fn race_title_line(race: &Resource<Option<RaceResults>>, year: u16) -> Line<'static> {
    match race.loaded().and_then(|payload| payload.as_ref()) {
        Some(round) => {
            let flag = lookup::country_flag(&round.race.circuit.country);
            Line::styled(
                format!(
                    "R{} {flag} {} — {} · {}, {}",
                    round.race.round,
                    round.race.name,
                    round.race.circuit.name,
                    round.race.circuit.locality,
                    round.race.circuit.country
                ),
                Style::default().add_modifier(Modifier::BOLD),
            )
        }
        None => Line::styled(format!("Race · {year}"), Style::default().fg(DIM)),
    }
}

// ---------------------------------------------------------------------------
// Driver detail
// ---------------------------------------------------------------------------

pub fn driver_title_text(races: &Resource<Vec<RaceResults>>, year: u16) -> Text<'static> {
    let rounds = match races {
        Resource::Loaded(rounds) => rounds,
        Resource::Absent => return placeholder("Failed to load driver data"),
    };
    // The latest entry carries the driver's current team.
    let Some(result) = rounds.iter().rev().find_map(|round| round.results.first()) else {
        return placeholder("No data found");
    };
    let number = result
        .driver
        .permanent_number
        .map(|n| format!("#{n} "))
        .unwrap_or_default();
    let color = lookup::team_color(&result.team.id);
    Text::from(vec![
        Line::from(vec![
            Span::styled(
                format!(
                    "{number}{}{} {}",
                    nat_tag(&result.driver.nationality),
                    result.driver.given_name,
                    result.driver.family_name
                ),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!("  {} · {year}", result.team.name),
                Style::default().fg(color),
            ),
        ]),
        Line::styled(
            result.driver.nationality.clone(),
            Style::default().fg(DIM),
        ),
    ])
}

/// Standings rows for a driver and the first other entry sharing their team.
pub fn teammate_pair<'a>(
    standings: &'a [DriverStanding],
    driver_id: &str,
) -> Option<(&'a DriverStanding, Option<&'a DriverStanding>)> {
    let own = standings.iter().find(|row| row.driver.id == driver_id)?;
    let teammate = standings
        .iter()
        .find(|row| row.team.id == own.team.id && row.driver.id != driver_id);
    Some((own, teammate))
}

pub fn driver_stats_text(stats: &SeasonStats) -> Text<'static> {
    let best = match stats.best_finish {
        Some(1) => Span::styled("P1 🏆", Style::default().fg(GOLD).add_modifier(Modifier::BOLD)),
        Some(pos) => Span::styled(format!("P{pos}"), Style::default().add_modifier(Modifier::BOLD)),
        None => Span::raw("—"),
    };
    let wins_style = if stats.wins > 0 {
        Style::default().fg(GOLD).add_modifier(Modifier::BOLD)
    } else {
        Style::default().add_modifier(Modifier::BOLD)
    };
    Text::from(Line::from(vec![
        Span::styled("Points: ", Style::default().fg(DIM)),
        Span::styled(format!("{}", stats.points), Style::default().add_modifier(Modifier::BOLD)),
        Span::styled("   Wins: ", Style::default().fg(DIM)),
        Span::styled(format!("{}", stats.wins), wins_style),
        Span::styled("   Podiums: ", Style::default().fg(DIM)),
        Span::styled(format!("{}", stats.podiums), Style::default().add_modifier(Modifier::BOLD)),
        Span::styled("   DNFs: ", Style::default().fg(DIM)),
        Span::styled(format!("{}", stats.dnfs), Style::default().add_modifier(Modifier::BOLD)),
        Span::styled("   Best: ", Style::default().fg(DIM)),
        best,
        Span::styled("   Races: ", Style::default().fg(DIM)),
        Span::styled(format!("{}", stats.races), Style::default().add_modifier(Modifier::BOLD)),
    ]))
}

pub fn driver_races_text(races: &[RaceResults]) -> Text<'static> {
    if races.is_empty() {
        return placeholder("No data found");
    }
    let mut lines = Vec::with_capacity(races.len());
    for round in races {
        let Some(result) = round.results.first() else {
            continue;
        };
        let class = pos_class(result.position, &result.status);
        let flag = lookup::country_flag(&round.race.circuit.country);
        let pos = if aggregate::is_dnf(&result.status) {
            "DNF".to_string()
        } else {
            result
                .position
                .map(|p| format!("P{p}"))
                .unwrap_or_else(|| "—".to_string())
        };
        let mut spans = vec![
            Span::styled(format!("  R{:<2} ", round.race.round), Style::default().fg(DIM)),
            Span::raw(format!("{flag} {:<28}", round.race.name)),
            Span::styled(format!("P{:<2} → ", result.grid), Style::default().fg(DIM)),
            Span::styled(
                format!("{pos:<4}"),
                Style::default().fg(class_color(class)).add_modifier(Modifier::BOLD),
            ),
            Span::styled(format!("{:>5} pts", result.points), Style::default().fg(DIM)),
        ];
        if result.fastest_lap_rank == Some(1) {
            spans.push(fl_badge());
        }
        lines.push(Line::from(spans));
    }
    Text::from(lines)
}

/// One colored dot per sampled round, oldest first.
fn form_dots(outcomes: &[Outcome]) -> Vec<Span<'static>> {
    outcomes
        .iter()
        .map(|outcome| {
            let color = match outcome {
                Outcome::Win => GOLD,
                Outcome::Points => Color::Green,
                Outcome::Finish => DIM,
                Outcome::Dnf => Color::Red,
            };
            Span::styled("● ", Style::default().fg(color))
        })
        .collect()
}

/// Compact recent-form strip.
pub fn form_line(outcomes: &[Outcome]) -> Line<'static> {
    if outcomes.is_empty() {
        return Line::styled("no recent results", Style::default().fg(DIM));
    }
    let mut spans = vec![Span::styled("Form: ", Style::default().fg(DIM))];
    spans.extend(form_dots(outcomes));
    spans.push(Span::styled(
        format!("(last {} rounds)", outcomes.len()),
        Style::default().fg(DIM),
    ));
    Line::from(spans)
}

/// Teammate head-to-head split bar; both shares always sum to 100.
pub fn head_to_head_text(
    driver: &DriverStanding,
    teammate: Option<&DriverStanding>,
) -> Text<'static> {
    let Some(teammate) = teammate else {
        return placeholder("No teammate data");
    };
    let Some((left, right)) = aggregate::head_to_head(driver.points, teammate.points) else {
        return placeholder("Head-to-head appears once points are scored");
    };
    let color = lookup::team_color(&driver.team.id);
    let width = 24usize;
    let filled = (left as usize * width) / 100;
    let mut bar = String::new();
    for i in 0..width {
        bar.push(if i < filled { '▰' } else { '▱' });
    }
    Text::from(vec![
        Line::styled(
            format!(
                "vs {} ({})",
                teammate.driver.short_name(),
                teammate.team.name
            ),
            Style::default().fg(DIM),
        ),
        Line::from(vec![
            Span::styled(format!("{left:>3}% "), Style::default().add_modifier(Modifier::BOLD)),
            Span::styled(bar, Style::default().fg(color)),
            Span::styled(format!(" {right:>3}%"), Style::default().fg(DIM)),
        ]),
    ])
}

// ---------------------------------------------------------------------------
// Trend chart series
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct TrendLine {
    pub label: String,
    pub color: Color,
    pub points: Vec<(f64, f64)>,
}

/// Cumulative-points series for the chart, one point per sampled round,
/// shared x axis. Limited to the strongest drivers of the window so the plot
/// stays legible.
pub fn trend_lines(recent: &[RaceResults]) -> Vec<TrendLine> {
    let series = aggregate::trend_series(recent);
    let mut labels: std::collections::HashMap<&str, (String, Color)> =
        std::collections::HashMap::new();
    for round in recent {
        for result in &round.results {
            labels.entry(result.driver.id.as_str()).or_insert_with(|| {
                let label = result
                    .driver
                    .code
                    .clone()
                    .unwrap_or_else(|| result.driver.family_name.clone());
                (label, lookup::team_color(&result.team.id))
            });
        }
    }

    let mut lines: Vec<TrendLine> = series
        .into_iter()
        .map(|(driver_id, values)| {
            let (label, color) = labels
                .get(driver_id.as_str())
                .cloned()
                .unwrap_or_else(|| (driver_id.clone(), lookup::FALLBACK_TEAM_COLOR));
            TrendLine {
                label,
                color,
                points: values
                    .iter()
                    .enumerate()
                    .map(|(idx, total)| ((idx + 1) as f64, *total as f64))
                    .collect(),
            }
        })
        .collect();
    lines.sort_by(|a, b| {
        let last_a = a.points.last().map(|p| p.1).unwrap_or(0.0);
        let last_b = b.points.last().map(|p| p.1).unwrap_or(0.0);
        last_b.total_cmp(&last_a).then_with(|| a.label.cmp(&b.label))
    });
    lines.truncate(TREND_DRIVERS);
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Driver, Team};
    use chrono::TimeZone;

    fn result(id: &str, pos: Option<u32>, status: &str, time: Option<&str>) -> RaceResult {
        RaceResult {
            driver: Driver {
                id: id.to_string(),
                code: None,
                given_name: "A".to_string(),
                family_name: id.to_string(),
                nationality: "Dutch".to_string(),
                permanent_number: None,
            },
            team: Team {
                id: "red_bull".to_string(),
                name: "Red Bull".to_string(),
            },
            position: pos,
            grid: 1,
            points: 0.0,
            status: status.to_string(),
            time: time.map(str::to_string),
            fastest_lap_rank: None,
            fastest_lap_time: None,
        }
    }

    #[test]
    fn pos_class_bands() {
        assert_eq!(pos_class(Some(1), "Finished"), PosClass::P1);
        assert_eq!(pos_class(Some(2), "Finished"), PosClass::P2);
        assert_eq!(pos_class(Some(3), "Finished"), PosClass::P3);
        assert_eq!(pos_class(Some(4), "Finished"), PosClass::Points);
        assert_eq!(pos_class(Some(10), "+1 Lap"), PosClass::Points);
        assert_eq!(pos_class(Some(11), "Finished"), PosClass::NoClass);
        assert_eq!(pos_class(Some(5), "Accident"), PosClass::Dnf);
        assert_eq!(pos_class(None, "Engine"), PosClass::Dnf);
    }

    #[test]
    fn time_display_rules() {
        assert_eq!(
            time_display(&result("a", Some(1), "Finished", Some("1:30:00.000"))),
            "1:30:00.000"
        );
        assert_eq!(
            time_display(&result("b", Some(2), "Finished", Some("5.123"))),
            "+5.123"
        );
        assert_eq!(time_display(&result("c", Some(15), "+1 Lap", None)), "+1 Lap");
        assert_eq!(time_display(&result("d", None, "Accident", None)), "Accident");
    }

    #[test]
    fn podium_centre_slot_is_winner_regardless_of_order() {
        // Shuffled input: P3, P1, P2.
        let results = vec![
            result("third", Some(3), "Finished", Some("12.0")),
            result("first", Some(1), "Finished", Some("1:30:00")),
            result("second", Some(2), "Finished", Some("5.0")),
        ];
        let lines = podium_lines(&results, None);
        assert_eq!(lines.len(), 3);
        let rendered: Vec<String> = lines
            .iter()
            .map(|line| {
                line.spans
                    .iter()
                    .map(|span| span.content.as_ref())
                    .collect::<String>()
            })
            .collect();
        assert!(rendered[0].contains("second"));
        assert!(rendered[1].contains("first"));
        assert!(rendered[1].contains("Winner"));
        assert!(rendered[2].contains("third"));
    }

    #[test]
    fn countdown_never_negative() {
        let target = Utc.with_ymd_and_hms(2025, 6, 1, 13, 0, 0).unwrap();
        let after = Utc.with_ymd_and_hms(2025, 6, 1, 14, 0, 0).unwrap();
        let line = countdown_line(&Countdown::Armed(target), after);
        let rendered: String = line.spans.iter().map(|s| s.content.as_ref()).collect();
        assert_eq!(rendered, "Race underway!");
        assert!(!rendered.contains('-'));
    }

    #[test]
    fn countdown_components_format() {
        let target = Utc.with_ymd_and_hms(2025, 6, 3, 15, 4, 5).unwrap();
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 13, 0, 0).unwrap();
        let line = countdown_line(&Countdown::Armed(target), now);
        let rendered: String = line.spans.iter().map(|s| s.content.as_ref()).collect();
        assert_eq!(rendered, "2d : 02h : 04m : 05s");
    }

    #[test]
    fn fastest_lap_is_rank_one_only() {
        let mut results = vec![
            result("a", Some(1), "Finished", Some("1:30:00")),
            result("b", Some(2), "Finished", Some("2.0")),
        ];
        results[1].fastest_lap_rank = Some(1);
        results[0].fastest_lap_rank = Some(2);
        assert_eq!(fastest_lap_driver(&results), Some("b"));
    }
}
