use std::time::Duration;

use anyhow::{Context, Result};
use once_cell::sync::OnceCell;
use reqwest::blocking::Client;
use reqwest::header::USER_AGENT;

const DEFAULT_BASE: &str = "https://api.jolpi.ca/ergast/f1/";
const REQUEST_TIMEOUT_SECS: u64 = 10;

/// The season the upstream API aliases as `current`.
pub const CURRENT_SEASON: u16 = 2026;

static CLIENT: OnceCell<Client> = OnceCell::new();

pub fn http_client() -> Result<&'static Client> {
    CLIENT.get_or_try_init(|| {
        Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .context("failed to build http client")
    })
}

pub fn api_base() -> String {
    match std::env::var("PITWALL_API_BASE") {
        Ok(base) if !base.trim().is_empty() => {
            let mut base = base.trim().to_string();
            if !base.ends_with('/') {
                base.push('/');
            }
            base
        }
        _ => DEFAULT_BASE.to_string(),
    }
}

/// A fetched resource, or an explicit marker that it could not be fetched.
/// Absence is an expected outcome (the API is incomplete for future seasons),
/// so callers match on the tag instead of handling errors.
#[derive(Debug, Clone, PartialEq)]
pub enum Resource<T> {
    Loaded(T),
    Absent,
}

impl<T> Resource<T> {
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Resource<U> {
        match self {
            Resource::Loaded(value) => Resource::Loaded(f(value)),
            Resource::Absent => Resource::Absent,
        }
    }

    pub fn as_ref(&self) -> Resource<&T> {
        match self {
            Resource::Loaded(value) => Resource::Loaded(value),
            Resource::Absent => Resource::Absent,
        }
    }

    pub fn loaded(&self) -> Option<&T> {
        match self {
            Resource::Loaded(value) => Some(value),
            Resource::Absent => None,
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Resource::Absent)
    }
}

/// Single attempt, no retry. Transport failures and non-success statuses both
/// collapse to `Absent`; the caller proceeds with whatever else settled.
pub fn fetch_resource(url: &str) -> Resource<String> {
    match fetch_body(url) {
        Ok(body) => Resource::Loaded(body),
        Err(_) => Resource::Absent,
    }
}

fn fetch_body(url: &str) -> Result<String> {
    let client = http_client()?;
    let resp = client
        .get(url)
        .header(USER_AGENT, "pitwall/0.1")
        .send()
        .context("request failed")?;
    let status = resp.status();
    let body = resp.text().context("failed reading body")?;
    if !status.is_success() {
        return Err(anyhow::anyhow!("http {status}"));
    }
    Ok(body)
}

/// Season path segment. The in-progress season is addressed as `current`
/// upstream; archived seasons by their year.
pub fn season_path(year: u16) -> String {
    if year == CURRENT_SEASON {
        "current".to_string()
    } else {
        year.to_string()
    }
}

pub fn schedule_url(year: u16) -> String {
    format!("{}{}.json?limit=30", api_base(), season_path(year))
}

pub fn race_results_url(year: u16, round: u32) -> String {
    format!("{}{}/{}/results.json", api_base(), season_path(year), round)
}

pub fn last_results_url(year: u16) -> String {
    format!("{}{}/last/results.json", api_base(), season_path(year))
}

pub fn qualifying_url(year: u16, round: u32) -> String {
    format!("{}{}/{}/qualifying.json", api_base(), season_path(year), round)
}

pub fn pit_stops_url(year: u16, round: u32) -> String {
    format!(
        "{}{}/{}/pitstops.json?limit=100",
        api_base(),
        season_path(year),
        round
    )
}

pub fn sprint_url(year: u16, round: u32) -> String {
    format!("{}{}/{}/sprint.json", api_base(), season_path(year), round)
}

pub fn driver_standings_url(year: u16) -> String {
    format!("{}{}/driverStandings.json", api_base(), season_path(year))
}

pub fn constructor_standings_url(year: u16) -> String {
    format!(
        "{}{}/constructorStandings.json",
        api_base(),
        season_path(year)
    )
}

pub fn driver_results_url(year: u16, driver_id: &str) -> String {
    format!(
        "{}{}/drivers/{}/results.json?limit=30",
        api_base(),
        season_path(year),
        driver_id
    )
}
