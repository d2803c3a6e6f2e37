use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::Deserialize;

/// Start time assumed when the schedule carries a date but no time, matching
/// upstream convention for provisional calendars.
const DEFAULT_START_TIME: (u32, u32, u32) = (12, 0, 0);

// ---------------------------------------------------------------------------
// Domain records. Everything downstream of the parse boundary operates on
// these owned, typed shapes; raw JSON never leaves this module.
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct Driver {
    pub id: String,
    pub code: Option<String>,
    pub given_name: String,
    pub family_name: String,
    pub nationality: String,
    pub permanent_number: Option<u32>,
}

impl Driver {
    /// "M. Verstappen" style display name.
    pub fn short_name(&self) -> String {
        match self.given_name.chars().next() {
            Some(initial) => format!("{initial}. {}", self.family_name),
            None => self.family_name.clone(),
        }
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.given_name, self.family_name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Team {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Circuit {
    pub id: String,
    pub name: String,
    pub locality: String,
    pub country: String,
}

/// One timed sub-session of a race weekend (practice, qualifying, sprint).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Session {
    pub date: NaiveDate,
    pub time: Option<NaiveTime>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Race {
    pub season: u16,
    pub round: u32,
    pub name: String,
    pub circuit: Circuit,
    pub date: NaiveDate,
    pub time: Option<NaiveTime>,
    pub practice: Vec<Session>,
    pub qualifying: Option<Session>,
    pub sprint: Option<Session>,
}

impl Race {
    pub fn start_utc(&self) -> DateTime<Utc> {
        let (h, m, s) = DEFAULT_START_TIME;
        let time = self
            .time
            .unwrap_or_else(|| NaiveTime::from_hms_opt(h, m, s).expect("valid default time"));
        Utc.from_utc_datetime(&self.date.and_time(time))
    }

    pub fn has_sprint(&self) -> bool {
        self.sprint.is_some()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RaceResult {
    pub driver: Driver,
    pub team: Team,
    pub position: Option<u32>,
    pub grid: u32,
    pub points: f32,
    pub status: String,
    pub time: Option<String>,
    pub fastest_lap_rank: Option<u32>,
    pub fastest_lap_time: Option<String>,
}

/// A race together with its classification, as returned by the results and
/// sprint resources.
#[derive(Debug, Clone, PartialEq)]
pub struct RaceResults {
    pub race: Race,
    pub results: Vec<RaceResult>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct QualifyingResult {
    pub position: u32,
    pub driver: Driver,
    pub team: Team,
    pub q1: Option<String>,
    pub q2: Option<String>,
    pub q3: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PitStop {
    pub driver_id: String,
    pub lap: u32,
    pub stop: u32,
    /// Seconds. Unparseable upstream strings become 0.0 and are excluded by
    /// the pit-stop ranking.
    pub duration: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DriverStanding {
    pub position: u32,
    pub points: f32,
    pub wins: u32,
    pub driver: Driver,
    pub team: Team,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TeamStanding {
    pub position: u32,
    pub points: f32,
    pub wins: u32,
    pub team: Team,
}

// ---------------------------------------------------------------------------
// Raw upstream envelope. The API wraps everything in MRData and encodes every
// number as a string.
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(rename = "MRData")]
    mr_data: MrData,
}

#[derive(Debug, Deserialize, Default)]
struct MrData {
    #[serde(rename = "RaceTable", default)]
    race_table: Option<RawRaceTable>,
    #[serde(rename = "StandingsTable", default)]
    standings_table: Option<RawStandingsTable>,
}

#[derive(Debug, Deserialize, Default)]
struct RawRaceTable {
    #[serde(rename = "Races", default)]
    races: Vec<RawRace>,
}

#[derive(Debug, Deserialize)]
struct RawRace {
    season: String,
    round: String,
    #[serde(rename = "raceName")]
    race_name: String,
    #[serde(rename = "Circuit")]
    circuit: RawCircuit,
    date: String,
    #[serde(default)]
    time: Option<String>,
    #[serde(rename = "FirstPractice", default)]
    first_practice: Option<RawSession>,
    #[serde(rename = "SecondPractice", default)]
    second_practice: Option<RawSession>,
    #[serde(rename = "ThirdPractice", default)]
    third_practice: Option<RawSession>,
    #[serde(rename = "Qualifying", default)]
    qualifying: Option<RawSession>,
    #[serde(rename = "Sprint", default)]
    sprint: Option<RawSession>,
    #[serde(rename = "Results", default)]
    results: Vec<RawResult>,
    #[serde(rename = "SprintResults", default)]
    sprint_results: Vec<RawResult>,
    #[serde(rename = "QualifyingResults", default)]
    qualifying_results: Vec<RawQualifyingResult>,
    #[serde(rename = "PitStops", default)]
    pit_stops: Vec<RawPitStop>,
}

#[derive(Debug, Deserialize)]
struct RawCircuit {
    #[serde(rename = "circuitId")]
    circuit_id: String,
    #[serde(rename = "circuitName")]
    circuit_name: String,
    #[serde(rename = "Location")]
    location: RawLocation,
}

#[derive(Debug, Deserialize)]
struct RawLocation {
    #[serde(default)]
    locality: String,
    #[serde(default)]
    country: String,
}

#[derive(Debug, Deserialize)]
struct RawSession {
    date: String,
    #[serde(default)]
    time: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawResult {
    #[serde(default)]
    position: Option<String>,
    #[serde(default)]
    points: Option<String>,
    #[serde(default)]
    grid: Option<String>,
    #[serde(default)]
    status: Option<String>,
    #[serde(rename = "Driver")]
    driver: RawDriver,
    #[serde(rename = "Constructor")]
    constructor: RawConstructor,
    #[serde(rename = "Time", default)]
    time: Option<RawTime>,
    #[serde(rename = "FastestLap", default)]
    fastest_lap: Option<RawFastestLap>,
}

#[derive(Debug, Deserialize)]
struct RawDriver {
    #[serde(rename = "driverId")]
    driver_id: String,
    #[serde(default)]
    code: Option<String>,
    #[serde(rename = "permanentNumber", default)]
    permanent_number: Option<String>,
    #[serde(rename = "givenName", default)]
    given_name: String,
    #[serde(rename = "familyName", default)]
    family_name: String,
    #[serde(default)]
    nationality: String,
}

#[derive(Debug, Deserialize)]
struct RawConstructor {
    #[serde(rename = "constructorId")]
    constructor_id: String,
    #[serde(default)]
    name: String,
}

#[derive(Debug, Deserialize)]
struct RawTime {
    #[serde(default)]
    time: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawFastestLap {
    #[serde(default)]
    rank: Option<String>,
    #[serde(rename = "Time", default)]
    time: Option<RawTime>,
}

#[derive(Debug, Deserialize)]
struct RawQualifyingResult {
    #[serde(default)]
    position: Option<String>,
    #[serde(rename = "Driver")]
    driver: RawDriver,
    #[serde(rename = "Constructor")]
    constructor: RawConstructor,
    #[serde(rename = "Q1", default)]
    q1: Option<String>,
    #[serde(rename = "Q2", default)]
    q2: Option<String>,
    #[serde(rename = "Q3", default)]
    q3: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawPitStop {
    #[serde(rename = "driverId")]
    driver_id: String,
    #[serde(default)]
    lap: Option<String>,
    #[serde(default)]
    stop: Option<String>,
    #[serde(default)]
    duration: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
struct RawStandingsTable {
    #[serde(rename = "StandingsLists", default)]
    standings_lists: Vec<RawStandingsList>,
}

#[derive(Debug, Deserialize)]
struct RawStandingsList {
    #[serde(rename = "DriverStandings", default)]
    driver_standings: Vec<RawDriverStanding>,
    #[serde(rename = "ConstructorStandings", default)]
    constructor_standings: Vec<RawConstructorStanding>,
}

#[derive(Debug, Deserialize)]
struct RawDriverStanding {
    #[serde(default)]
    position: Option<String>,
    #[serde(default)]
    points: Option<String>,
    #[serde(default)]
    wins: Option<String>,
    #[serde(rename = "Driver")]
    driver: RawDriver,
    #[serde(rename = "Constructors", default)]
    constructors: Vec<RawConstructor>,
}

#[derive(Debug, Deserialize)]
struct RawConstructorStanding {
    #[serde(default)]
    position: Option<String>,
    #[serde(default)]
    points: Option<String>,
    #[serde(default)]
    wins: Option<String>,
    #[serde(rename = "Constructor")]
    constructor: RawConstructor,
}

// ---------------------------------------------------------------------------
// Parse functions. Empty or `null` bodies are well-formed absence of data and
// parse to empty collections, distinct from transport failure upstream.
// ---------------------------------------------------------------------------

pub fn parse_schedule_json(raw: &str) -> Result<Vec<Race>> {
    let races = race_table(raw)?;
    Ok(races.into_iter().filter_map(build_race).collect())
}

/// First race of the results payload, with its classification. `None` when
/// the season has no completed round yet.
pub fn parse_results_json(raw: &str) -> Result<Option<RaceResults>> {
    let mut races = race_table(raw)?;
    if races.is_empty() {
        return Ok(None);
    }
    let raw_race = races.remove(0);
    let results = raw_race.results.iter().map(build_result).collect();
    Ok(build_race(raw_race).map(|race| RaceResults { race, results }))
}

/// Per-driver season results: one race per entry, each carrying exactly the
/// requested driver's result row.
pub fn parse_driver_results_json(raw: &str) -> Result<Vec<RaceResults>> {
    let races = race_table(raw)?;
    Ok(races
        .into_iter()
        .filter_map(|raw_race| {
            let results: Vec<RaceResult> = raw_race.results.iter().map(build_result).collect();
            build_race(raw_race).map(|race| RaceResults { race, results })
        })
        .collect())
}

pub fn parse_sprint_json(raw: &str) -> Result<Option<RaceResults>> {
    let mut races = race_table(raw)?;
    if races.is_empty() {
        return Ok(None);
    }
    let raw_race = races.remove(0);
    let results = raw_race.sprint_results.iter().map(build_result).collect();
    Ok(build_race(raw_race).map(|race| RaceResults { race, results }))
}

pub fn parse_qualifying_json(raw: &str) -> Result<Vec<QualifyingResult>> {
    let races = race_table(raw)?;
    let Some(raw_race) = races.into_iter().next() else {
        return Ok(Vec::new());
    };
    Ok(raw_race
        .qualifying_results
        .iter()
        .map(|q| QualifyingResult {
            position: parse_u32(q.position.as_deref()).unwrap_or(0),
            driver: build_driver(&q.driver),
            team: build_team(&q.constructor),
            q1: clean_opt(q.q1.clone()),
            q2: clean_opt(q.q2.clone()),
            q3: clean_opt(q.q3.clone()),
        })
        .collect())
}

pub fn parse_pit_stops_json(raw: &str) -> Result<Vec<PitStop>> {
    let races = race_table(raw)?;
    let Some(raw_race) = races.into_iter().next() else {
        return Ok(Vec::new());
    };
    Ok(raw_race
        .pit_stops
        .iter()
        .map(|p| PitStop {
            driver_id: p.driver_id.clone(),
            lap: parse_u32(p.lap.as_deref()).unwrap_or(0),
            stop: parse_u32(p.stop.as_deref()).unwrap_or(0),
            duration: p
                .duration
                .as_deref()
                .and_then(|d| d.trim().parse::<f64>().ok())
                .unwrap_or(0.0),
        })
        .collect())
}

pub fn parse_driver_standings_json(raw: &str) -> Result<Vec<DriverStanding>> {
    let table = standings_table(raw)?;
    let Some(list) = table.into_iter().next() else {
        return Ok(Vec::new());
    };
    Ok(list
        .driver_standings
        .iter()
        .map(|s| DriverStanding {
            position: parse_u32(s.position.as_deref()).unwrap_or(0),
            points: parse_f32(s.points.as_deref()),
            wins: parse_u32(s.wins.as_deref()).unwrap_or(0),
            driver: build_driver(&s.driver),
            team: s
                .constructors
                .first()
                .map(build_team)
                .unwrap_or_else(unknown_team),
        })
        .collect())
}

pub fn parse_constructor_standings_json(raw: &str) -> Result<Vec<TeamStanding>> {
    let table = standings_table(raw)?;
    let Some(list) = table.into_iter().next() else {
        return Ok(Vec::new());
    };
    Ok(list
        .constructor_standings
        .iter()
        .map(|s| TeamStanding {
            position: parse_u32(s.position.as_deref()).unwrap_or(0),
            points: parse_f32(s.points.as_deref()),
            wins: parse_u32(s.wins.as_deref()).unwrap_or(0),
            team: build_team(&s.constructor),
        })
        .collect())
}

fn race_table(raw: &str) -> Result<Vec<RawRace>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok(Vec::new());
    }
    let envelope: Envelope = serde_json::from_str(trimmed).context("invalid results json")?;
    Ok(envelope
        .mr_data
        .race_table
        .map(|table| table.races)
        .unwrap_or_default())
}

fn standings_table(raw: &str) -> Result<Vec<RawStandingsList>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok(Vec::new());
    }
    let envelope: Envelope = serde_json::from_str(trimmed).context("invalid standings json")?;
    Ok(envelope
        .mr_data
        .standings_table
        .map(|table| table.standings_lists)
        .unwrap_or_default())
}

fn build_race(raw: RawRace) -> Option<Race> {
    let date = NaiveDate::parse_from_str(&raw.date, "%Y-%m-%d").ok()?;
    let mut practice = Vec::new();
    for session in [
        &raw.first_practice,
        &raw.second_practice,
        &raw.third_practice,
    ] {
        if let Some(session) = session.as_ref().and_then(build_session) {
            practice.push(session);
        }
    }
    Some(Race {
        season: raw.season.trim().parse().unwrap_or(0),
        round: raw.round.trim().parse().unwrap_or(0),
        name: raw.race_name,
        circuit: Circuit {
            id: raw.circuit.circuit_id,
            name: raw.circuit.circuit_name,
            locality: raw.circuit.location.locality,
            country: raw.circuit.location.country,
        },
        date,
        time: raw.time.as_deref().and_then(parse_time),
        practice,
        qualifying: raw.qualifying.as_ref().and_then(build_session),
        sprint: raw.sprint.as_ref().and_then(build_session),
    })
}

fn build_session(raw: &RawSession) -> Option<Session> {
    let date = NaiveDate::parse_from_str(&raw.date, "%Y-%m-%d").ok()?;
    Some(Session {
        date,
        time: raw.time.as_deref().and_then(parse_time),
    })
}

fn build_result(raw: &RawResult) -> RaceResult {
    RaceResult {
        driver: build_driver(&raw.driver),
        team: build_team(&raw.constructor),
        position: parse_u32(raw.position.as_deref()),
        grid: parse_u32(raw.grid.as_deref()).unwrap_or(0),
        points: parse_f32(raw.points.as_deref()),
        status: raw.status.clone().unwrap_or_default(),
        time: raw.time.as_ref().and_then(|t| clean_opt(t.time.clone())),
        fastest_lap_rank: raw
            .fastest_lap
            .as_ref()
            .and_then(|fl| parse_u32(fl.rank.as_deref())),
        fastest_lap_time: raw
            .fastest_lap
            .as_ref()
            .and_then(|fl| fl.time.as_ref())
            .and_then(|t| clean_opt(t.time.clone())),
    }
}

fn build_driver(raw: &RawDriver) -> Driver {
    Driver {
        id: raw.driver_id.clone(),
        code: clean_opt(raw.code.clone()),
        given_name: raw.given_name.clone(),
        family_name: raw.family_name.clone(),
        nationality: raw.nationality.clone(),
        permanent_number: parse_u32(raw.permanent_number.as_deref()),
    }
}

fn build_team(raw: &RawConstructor) -> Team {
    Team {
        id: raw.constructor_id.clone(),
        name: raw.name.clone(),
    }
}

fn unknown_team() -> Team {
    Team {
        id: String::new(),
        name: "—".to_string(),
    }
}

fn parse_time(raw: &str) -> Option<NaiveTime> {
    let trimmed = raw.trim().trim_end_matches('Z');
    NaiveTime::parse_from_str(trimmed, "%H:%M:%S").ok()
}

fn clean_opt(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

fn parse_u32(raw: Option<&str>) -> Option<u32> {
    raw.and_then(|v| v.trim().parse::<u32>().ok())
}

fn parse_f32(raw: Option<&str>) -> f32 {
    raw.and_then(|v| v.trim().parse::<f32>().ok()).unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_bodies_parse_to_empty() {
        assert!(parse_schedule_json("null").expect("null ok").is_empty());
        assert!(parse_results_json("").expect("empty ok").is_none());
        assert!(parse_driver_standings_json("null").expect("null ok").is_empty());
        assert!(parse_pit_stops_json("null").expect("null ok").is_empty());
    }

    #[test]
    fn default_start_time_is_midday_utc() {
        let race = Race {
            season: 2025,
            round: 1,
            name: "Test GP".to_string(),
            circuit: Circuit {
                id: "test".to_string(),
                name: "Test Circuit".to_string(),
                locality: "Testville".to_string(),
                country: "UK".to_string(),
            },
            date: NaiveDate::from_ymd_opt(2025, 3, 16).expect("valid date"),
            time: None,
            practice: Vec::new(),
            qualifying: None,
            sprint: None,
        };
        assert_eq!(race.start_utc().to_rfc3339(), "2025-03-16T12:00:00+00:00");
    }

    #[test]
    fn short_name_uses_initial() {
        let driver = Driver {
            id: "max_verstappen".to_string(),
            code: Some("VER".to_string()),
            given_name: "Max".to_string(),
            family_name: "Verstappen".to_string(),
            nationality: "Dutch".to_string(),
            permanent_number: Some(1),
        };
        assert_eq!(driver.short_name(), "M. Verstappen");
    }
}
