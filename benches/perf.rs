use std::hint::black_box;

use chrono::NaiveDate;
use criterion::{criterion_group, criterion_main, Criterion};

use pitwall::aggregate::{form_map, season_stats, trend_series};
use pitwall::model::{
    parse_results_json, Circuit, Driver, Race, RaceResult, RaceResults, Team,
};
use pitwall::view::trend_lines;

const DRIVERS: u32 = 20;
const ROUNDS: u32 = 24;

fn sample_result(driver: u32, position: u32) -> RaceResult {
    let points = match position {
        1 => 25.0,
        2 => 18.0,
        3 => 15.0,
        4..=10 => (12 - position) as f32,
        _ => 0.0,
    };
    RaceResult {
        driver: Driver {
            id: format!("driver{driver}"),
            code: Some(format!("D{driver:02}")),
            given_name: "Given".to_string(),
            family_name: format!("Family{driver}"),
            nationality: "British".to_string(),
            permanent_number: Some(driver),
        },
        team: Team {
            id: format!("team{}", driver / 2),
            name: format!("Team {}", driver / 2),
        },
        position: Some(position),
        grid: position,
        points,
        status: if position % 9 == 0 {
            "Accident".to_string()
        } else {
            "Finished".to_string()
        },
        time: None,
        fastest_lap_rank: (position == 1).then_some(1),
        fastest_lap_time: None,
    }
}

fn sample_season() -> Vec<RaceResults> {
    (1..=ROUNDS)
        .map(|round| RaceResults {
            race: Race {
                season: 2025,
                round,
                name: format!("Round {round} GP"),
                circuit: Circuit {
                    id: format!("circuit{round}"),
                    name: format!("Circuit {round}"),
                    locality: "Town".to_string(),
                    country: "Country".to_string(),
                },
                date: NaiveDate::from_ymd_opt(2025, 3, 1)
                    .expect("valid date")
                    .checked_add_days(chrono::Days::new(u64::from(round) * 14))
                    .expect("in range"),
                time: None,
                practice: Vec::new(),
                qualifying: None,
                sprint: None,
            },
            // Rotate positions so every driver sees every finishing spot.
            results: (0..DRIVERS)
                .map(|driver| sample_result(driver, (driver + round) % DRIVERS + 1))
                .collect(),
        })
        .collect()
}

fn results_payload_json() -> String {
    let rows: Vec<String> = (0..DRIVERS)
        .map(|driver| {
            format!(
                r#"{{"position":"{pos}","points":"10","grid":"{pos}","status":"Finished","Driver":{{"driverId":"driver{driver}","givenName":"Given","familyName":"Family{driver}","nationality":"British"}},"Constructor":{{"constructorId":"team{team}","name":"Team {team}"}},"Time":{{"time":"+{pos}.000"}}}}"#,
                pos = driver + 1,
                team = driver / 2,
            )
        })
        .collect();
    format!(
        r#"{{"MRData":{{"RaceTable":{{"Races":[{{"season":"2025","round":"1","raceName":"Bench GP","Circuit":{{"circuitId":"bench","circuitName":"Bench Circuit","Location":{{"locality":"Town","country":"Country"}}}},"date":"2025-03-16","Results":[{rows}]}}]}}}}}}"#,
        rows = rows.join(",")
    )
}

fn bench_parse_results(c: &mut Criterion) {
    let raw = results_payload_json();
    c.bench_function("parse_results_json", |b| {
        b.iter(|| parse_results_json(black_box(&raw)).expect("valid payload"))
    });
}

fn bench_season_stats(c: &mut Criterion) {
    let season = sample_season();
    let driver_rows: Vec<RaceResult> = season
        .iter()
        .filter_map(|round| round.results.first().cloned())
        .collect();
    c.bench_function("season_stats_full_season", |b| {
        b.iter(|| season_stats(black_box(&driver_rows)))
    });
}

fn bench_form_map(c: &mut Criterion) {
    let season = sample_season();
    let recent = &season[season.len() - 5..];
    c.bench_function("form_map_recent_window", |b| {
        b.iter(|| form_map(black_box(recent)))
    });
}

fn bench_trend(c: &mut Criterion) {
    let season = sample_season();
    let recent = &season[season.len() - 5..];
    c.bench_function("trend_series_recent_window", |b| {
        b.iter(|| trend_series(black_box(recent)))
    });
    c.bench_function("trend_lines_recent_window", |b| {
        b.iter(|| trend_lines(black_box(recent)))
    });
}

criterion_group!(
    benches,
    bench_parse_results,
    bench_season_stats,
    bench_form_map,
    bench_trend
);
criterion_main!(benches);
