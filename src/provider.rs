use std::env;
use std::sync::mpsc::{Receiver, Sender};
use std::thread;

use anyhow::Result;

use crate::api::{self, Resource};
use crate::control::{
    completed_rounds, Command, Delta, DriverData, OverviewData, RaceData, RECENT_WINDOW,
};
use crate::model::{self, RaceResults};

/// Background fetch thread. Commands come from the controller; each one turns
/// into a settled batch delta stamped with the context it was fetched for.
pub fn spawn_provider(tx: Sender<Delta>, cmd_rx: Receiver<Command>) {
    thread::spawn(move || {
        let pool = build_fetch_pool();
        while let Ok(cmd) = cmd_rx.recv() {
            match cmd {
                Command::LoadOverview { year } => {
                    let data = load_overview(year, &pool);
                    log_overview_gaps(&tx, &data);
                    let _ = tx.send(Delta::Overview { year, data });
                }
                Command::LoadRace { year, round } => {
                    let data = load_race(year, round, &pool);
                    if data.race.is_absent() {
                        let _ = tx.send(Delta::Log(format!(
                            "[WARN] Results for round {round} unavailable"
                        )));
                    }
                    let _ = tx.send(Delta::RaceDetail { year, round, data });
                }
                Command::LoadDriver { year, driver_id } => {
                    let data = load_driver(year, &driver_id, &pool);
                    if data.races.is_absent() {
                        let _ = tx.send(Delta::Log(format!(
                            "[WARN] Season results for {driver_id} unavailable"
                        )));
                    }
                    let _ = tx.send(Delta::DriverDetail {
                        year,
                        driver_id,
                        data,
                    });
                }
            }
        }
    });
}

/// Fetch-then-parse with every failure mode collapsed to `Absent`: transport
/// errors, non-success statuses, and malformed bodies all degrade the same
/// way.
fn fetch_parse<T>(url: &str, parse: impl Fn(&str) -> Result<T>) -> Resource<T> {
    match api::fetch_resource(url) {
        Resource::Loaded(body) => match parse(&body) {
            Ok(value) => Resource::Loaded(value),
            Err(_) => Resource::Absent,
        },
        Resource::Absent => Resource::Absent,
    }
}

/// Two-phase overview load. The schedule fetch runs alone first because the
/// completed-round window is derived from it; everything else is one
/// settle-all batch of independent slots.
fn load_overview(year: u16, pool: &Option<rayon::ThreadPool>) -> OverviewData {
    let schedule = fetch_parse(&api::schedule_url(year), model::parse_schedule_json);

    let now = chrono::Utc::now();
    let recent_rounds: Vec<u32> = schedule
        .loaded()
        .map(|races| {
            let mut rounds = completed_rounds(races, now);
            let skip = rounds.len().saturating_sub(RECENT_WINDOW);
            rounds.drain(..skip);
            rounds
        })
        .unwrap_or_default();

    let mut driver_standings = Resource::Absent;
    let mut team_standings = Resource::Absent;
    let mut last_race = Resource::Absent;
    let mut last_race_season = year;
    let mut recent = Resource::Absent;

    with_fetch_pool(pool, || {
        rayon::scope(|scope| {
            scope.spawn(|_| {
                driver_standings = fetch_parse(
                    &api::driver_standings_url(year),
                    model::parse_driver_standings_json,
                );
            });
            scope.spawn(|_| {
                team_standings = fetch_parse(
                    &api::constructor_standings_url(year),
                    model::parse_constructor_standings_json,
                );
            });
            scope.spawn(|_| {
                let (payload, season) = load_last_race_with_fallback(year);
                last_race = payload;
                last_race_season = season;
            });
            scope.spawn(|_| {
                recent = load_recent_rounds(year, &recent_rounds);
            });
        });
    });

    OverviewData {
        schedule,
        driver_standings,
        team_standings,
        last_race,
        last_race_season,
        recent,
    }
}

/// Last-race slot with the prior-season fallback: a future season with no
/// published results falls back one year so the page is never empty, and the
/// payload is labeled with the season it actually belongs to.
fn load_last_race_with_fallback(year: u16) -> (Resource<Option<RaceResults>>, u16) {
    let current = fetch_parse(&api::last_results_url(year), model::parse_results_json);
    let has_results = matches!(
        current.loaded(),
        Some(Some(round)) if !round.results.is_empty()
    );
    if has_results || current.is_absent() {
        return (current, year);
    }

    let prior_year = year - 1;
    let prior = fetch_parse(&api::last_results_url(prior_year), model::parse_results_json);
    match prior.loaded() {
        Some(Some(round)) if !round.results.is_empty() => (prior, prior_year),
        _ => (current, year),
    }
}

/// Results of the last completed rounds, oldest first, for the form strip and
/// trend chart. Individual round failures shrink the window instead of
/// dropping it.
fn load_recent_rounds(year: u16, rounds: &[u32]) -> Resource<Vec<RaceResults>> {
    if rounds.is_empty() {
        return Resource::Loaded(Vec::new());
    }
    use rayon::prelude::*;
    let fetched: Vec<Option<RaceResults>> = rounds
        .par_iter()
        .map(|round| {
            fetch_parse(&api::race_results_url(year, *round), model::parse_results_json)
                .loaded()
                .cloned()
                .flatten()
        })
        .collect();
    Resource::Loaded(fetched.into_iter().flatten().collect())
}

fn load_race(year: u16, round: u32, pool: &Option<rayon::ThreadPool>) -> RaceData {
    let mut race = Resource::Absent;
    let mut qualifying = Resource::Absent;
    let mut pit_stops = Resource::Absent;
    let mut sprint = Resource::Absent;

    with_fetch_pool(pool, || {
        rayon::scope(|scope| {
            scope.spawn(|_| {
                race = fetch_parse(&api::race_results_url(year, round), model::parse_results_json);
            });
            scope.spawn(|_| {
                qualifying = fetch_parse(
                    &api::qualifying_url(year, round),
                    model::parse_qualifying_json,
                );
            });
            scope.spawn(|_| {
                pit_stops = fetch_parse(
                    &api::pit_stops_url(year, round),
                    model::parse_pit_stops_json,
                );
            });
            scope.spawn(|_| {
                sprint = fetch_parse(&api::sprint_url(year, round), model::parse_sprint_json);
            });
        });
    });

    RaceData {
        race,
        qualifying,
        pit_stops,
        sprint,
    }
}

fn load_driver(year: u16, driver_id: &str, pool: &Option<rayon::ThreadPool>) -> DriverData {
    let mut races = Resource::Absent;
    let mut standings = Resource::Absent;

    with_fetch_pool(pool, || {
        rayon::scope(|scope| {
            scope.spawn(|_| {
                races = fetch_parse(
                    &api::driver_results_url(year, driver_id),
                    model::parse_driver_results_json,
                );
            });
            scope.spawn(|_| {
                standings = fetch_parse(
                    &api::driver_standings_url(year),
                    model::parse_driver_standings_json,
                );
            });
        });
    });

    DriverData { races, standings }
}

fn log_overview_gaps(tx: &Sender<Delta>, data: &OverviewData) {
    let gaps: [(&str, bool); 4] = [
        ("Schedule", data.schedule.is_absent()),
        ("Driver standings", data.driver_standings.is_absent()),
        ("Constructor standings", data.team_standings.is_absent()),
        ("Last race", data.last_race.is_absent()),
    ];
    for (label, absent) in gaps {
        if absent {
            let _ = tx.send(Delta::Log(format!("[WARN] {label} unavailable")));
        }
    }
}

fn build_fetch_pool() -> Option<rayon::ThreadPool> {
    rayon::ThreadPoolBuilder::new()
        .num_threads(fetch_parallelism())
        .build()
        .ok()
}

fn with_fetch_pool<T>(pool: &Option<rayon::ThreadPool>, action: impl FnOnce() -> T + Send) -> T
where
    T: Send,
{
    if let Some(pool) = pool.as_ref() {
        pool.install(action)
    } else {
        action()
    }
}

fn fetch_parallelism() -> usize {
    env::var("FETCH_PARALLELISM")
        .ok()
        .and_then(|val| val.parse::<usize>().ok())
        .unwrap_or(6)
        .clamp(2, 32)
}
