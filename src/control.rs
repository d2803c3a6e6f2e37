use std::collections::VecDeque;

use chrono::{DateTime, Utc};

use crate::api::Resource;
use crate::model::{DriverStanding, QualifyingResult, PitStop, Race, RaceResults, TeamStanding};

pub const SUPPORTED_SEASONS: [u16; 4] = [2023, 2024, 2025, 2026];
const LOG_CAP: usize = 100;

/// How many completed rounds feed the form strip and trend chart.
pub const RECENT_WINDOW: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Screen {
    Overview,
    RaceDetail,
    DriverDetail,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverviewFocus {
    Schedule,
    Drivers,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultTab {
    Race,
    Qualifying,
    PitStops,
    Sprint,
}

impl ResultTab {
    pub fn label(self) -> &'static str {
        match self {
            ResultTab::Race => "Race",
            ResultTab::Qualifying => "Qualifying",
            ResultTab::PitStops => "Pit Stops",
            ResultTab::Sprint => "Sprint",
        }
    }
}

/// Countdown lifecycle for the next-race hero. Armed when a schedule resolves
/// a next race; expires exactly once, after which the hero renders its
/// terminal "underway" state. Any reset disarms it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Countdown {
    Idle,
    Armed(DateTime<Utc>),
    Expired,
}

/// Settled fetch batch for the overview page. Each slot is an independent
/// success/absent variant; one failing member never blanks the others.
#[derive(Debug, Clone, PartialEq)]
pub struct OverviewData {
    pub schedule: Resource<Vec<Race>>,
    pub driver_standings: Resource<Vec<DriverStanding>>,
    pub team_standings: Resource<Vec<TeamStanding>>,
    /// `Loaded(None)` is the empty-but-valid case (season not started), kept
    /// distinct from transport failure.
    pub last_race: Resource<Option<RaceResults>>,
    /// Season the last-race payload belongs to; differs from the requested
    /// year when the prior-season fallback kicked in.
    pub last_race_season: u16,
    /// Results of the last completed rounds, oldest first.
    pub recent: Resource<Vec<RaceResults>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RaceData {
    pub race: Resource<Option<RaceResults>>,
    pub qualifying: Resource<Vec<QualifyingResult>>,
    pub pit_stops: Resource<Vec<PitStop>>,
    pub sprint: Resource<Option<RaceResults>>,
}

impl RaceData {
    pub fn has_sprint_results(&self) -> bool {
        matches!(
            self.sprint.loaded(),
            Some(Some(sprint)) if !sprint.results.is_empty()
        )
    }

    /// Tab set for this payload. Sprint appears only when sprint results
    /// exist for the event.
    pub fn tabs(&self) -> Vec<ResultTab> {
        let mut tabs = vec![ResultTab::Race, ResultTab::Qualifying, ResultTab::PitStops];
        if self.has_sprint_results() {
            tabs.push(ResultTab::Sprint);
        }
        tabs
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DriverData {
    pub races: Resource<Vec<RaceResults>>,
    pub standings: Resource<Vec<DriverStanding>>,
}

/// Requests handled by the provider thread.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    LoadOverview { year: u16 },
    LoadRace { year: u16, round: u32 },
    LoadDriver { year: u16, driver_id: String },
}

/// Messages from the provider thread back to the controller. Data deltas are
/// stamped with the context they were fetched for so stale responses can be
/// dropped after a year switch.
#[derive(Debug, Clone, PartialEq)]
pub enum Delta {
    Overview {
        year: u16,
        data: OverviewData,
    },
    RaceDetail {
        year: u16,
        round: u32,
        data: RaceData,
    },
    DriverDetail {
        year: u16,
        driver_id: String,
        data: DriverData,
    },
    Log(String),
}

#[derive(Debug, Clone)]
pub struct AppState {
    pub screen: Screen,
    pub year: u16,
    pub overview: Option<OverviewData>,
    pub race_round: Option<u32>,
    pub race_detail: Option<RaceData>,
    pub active_tab: usize,
    pub driver_id: Option<String>,
    pub driver_detail: Option<DriverData>,
    pub countdown: Countdown,
    pub focus: OverviewFocus,
    pub schedule_selected: usize,
    pub standings_selected: usize,
    pub logs: VecDeque<String>,
    pub help_overlay: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

impl AppState {
    pub fn new() -> Self {
        Self {
            screen: Screen::Overview,
            year: SUPPORTED_SEASONS[SUPPORTED_SEASONS.len() - 1],
            overview: None,
            race_round: None,
            race_detail: None,
            active_tab: 0,
            driver_id: None,
            driver_detail: None,
            countdown: Countdown::Idle,
            focus: OverviewFocus::Schedule,
            schedule_selected: 0,
            standings_selected: 0,
            logs: VecDeque::new(),
            help_overlay: false,
        }
    }

    pub fn push_log(&mut self, line: impl Into<String>) {
        if self.logs.len() >= LOG_CAP {
            self.logs.pop_front();
        }
        self.logs.push_back(line.into());
    }

    /// Year switch: full teardown. Every data slot goes back to its loading
    /// placeholder and the countdown is disarmed before any fetch is issued,
    /// so stale content from the previous year is never visible.
    pub fn switch_year(&mut self, year: u16) {
        self.year = year;
        self.reset_page_state();
    }

    pub fn reset_page_state(&mut self) {
        self.overview = None;
        self.race_detail = None;
        self.driver_detail = None;
        self.countdown = Countdown::Idle;
        self.active_tab = 0;
        self.schedule_selected = 0;
        self.standings_selected = 0;
    }

    pub fn prev_year(&self) -> Option<u16> {
        let idx = SUPPORTED_SEASONS.iter().position(|y| *y == self.year)?;
        idx.checked_sub(1).map(|i| SUPPORTED_SEASONS[i])
    }

    pub fn next_year(&self) -> Option<u16> {
        let idx = SUPPORTED_SEASONS.iter().position(|y| *y == self.year)?;
        SUPPORTED_SEASONS.get(idx + 1).copied()
    }

    /// Countdown state machine step; transitions `Armed -> Expired` once the
    /// target instant has passed. Never produces negative remainders.
    pub fn tick(&mut self, now: DateTime<Utc>) {
        if let Countdown::Armed(target) = self.countdown {
            if now >= target {
                self.countdown = Countdown::Expired;
            }
        }
    }

    pub fn selected_round(&self) -> Option<u32> {
        let overview = self.overview.as_ref()?;
        let schedule = overview.schedule.loaded()?;
        schedule.get(self.schedule_selected).map(|race| race.round)
    }

    pub fn selected_driver_id(&self) -> Option<String> {
        let overview = self.overview.as_ref()?;
        let standings = overview.driver_standings.loaded()?;
        standings
            .get(self.standings_selected)
            .map(|row| row.driver.id.clone())
    }

    pub fn select_next(&mut self) {
        let len = self.focused_list_len();
        if len > 0 {
            let selected = self.focused_selected_mut();
            *selected = (*selected + 1).min(len - 1);
        }
    }

    pub fn select_prev(&mut self) {
        let selected = self.focused_selected_mut();
        *selected = selected.saturating_sub(1);
    }

    fn focused_list_len(&self) -> usize {
        let Some(overview) = self.overview.as_ref() else {
            return 0;
        };
        match self.focus {
            OverviewFocus::Schedule => overview
                .schedule
                .loaded()
                .map(|races| races.len())
                .unwrap_or(0),
            OverviewFocus::Drivers => overview
                .driver_standings
                .loaded()
                .map(|rows| rows.len())
                .unwrap_or(0),
        }
    }

    fn focused_selected_mut(&mut self) -> &mut usize {
        match self.focus {
            OverviewFocus::Schedule => &mut self.schedule_selected,
            OverviewFocus::Drivers => &mut self.standings_selected,
        }
    }

    pub fn active_tabs(&self) -> Vec<ResultTab> {
        self.race_detail
            .as_ref()
            .map(|data| data.tabs())
            .unwrap_or_else(|| vec![ResultTab::Race, ResultTab::Qualifying, ResultTab::PitStops])
    }

    /// Switching tabs only changes the active index; the content pane is
    /// re-rendered from it, the tab bar is not rebuilt.
    pub fn cycle_tab(&mut self) {
        let count = self.active_tabs().len();
        if count > 0 {
            self.active_tab = (self.active_tab + 1) % count;
        }
    }
}

/// Accepts a delta only when its stamp matches the controller's current
/// context; anything else is a stale fetch from before a switch and is
/// dropped.
pub fn apply_delta(state: &mut AppState, delta: Delta, now: DateTime<Utc>) {
    match delta {
        Delta::Overview { year, data } => {
            if year != state.year {
                return;
            }
            state.countdown = match data
                .schedule
                .loaded()
                .and_then(|races| next_race(races, now))
            {
                Some(race) => Countdown::Armed(race.start_utc()),
                None => Countdown::Idle,
            };
            state.overview = Some(data);
            state.tick(now);
        }
        Delta::RaceDetail { year, round, data } => {
            if year != state.year || state.race_round != Some(round) {
                return;
            }
            let tab_count = data.tabs().len();
            if state.active_tab >= tab_count {
                state.active_tab = 0;
            }
            state.race_detail = Some(data);
        }
        Delta::DriverDetail {
            year,
            driver_id,
            data,
        } => {
            if year != state.year || state.driver_id.as_deref() != Some(driver_id.as_str()) {
                return;
            }
            state.driver_detail = Some(data);
        }
        Delta::Log(line) => state.push_log(line),
    }
}

/// Earliest event strictly after `now`.
pub fn next_race(races: &[Race], now: DateTime<Utc>) -> Option<&Race> {
    races
        .iter()
        .filter(|race| race.start_utc() > now)
        .min_by_key(|race| race.start_utc())
}

/// Most recent event at or before `now`.
pub fn last_completed(races: &[Race], now: DateTime<Utc>) -> Option<&Race> {
    races
        .iter()
        .filter(|race| race.start_utc() <= now)
        .max_by_key(|race| race.start_utc())
}

/// Round numbers of completed events, calendar order.
pub fn completed_rounds(races: &[Race], now: DateTime<Utc>) -> Vec<u32> {
    races
        .iter()
        .filter(|race| race.start_utc() <= now)
        .map(|race| race.round)
        .collect()
}
