use chrono::{NaiveDate, TimeZone, Utc};

use pitwall::api::Resource;
use pitwall::control::{Countdown, RaceData, ResultTab};
use pitwall::model::{
    Circuit, Driver, DriverStanding, PitStop, Race, RaceResult, RaceResults, Team,
};
use pitwall::view;
use ratatui::text::Text;

fn plain(text: &Text<'_>) -> String {
    text.lines
        .iter()
        .map(|line| {
            line.spans
                .iter()
                .map(|span| span.content.as_ref())
                .collect::<String>()
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn race(round: u32, date: (i32, u32, u32)) -> Race {
    Race {
        season: 2025,
        round,
        name: format!("Round {round} GP"),
        circuit: Circuit {
            id: "circuit".to_string(),
            name: "Circuit".to_string(),
            locality: "Town".to_string(),
            country: "Netherlands".to_string(),
        },
        date: NaiveDate::from_ymd_opt(date.0, date.1, date.2).expect("valid date"),
        time: None,
        practice: Vec::new(),
        qualifying: None,
        sprint: None,
    }
}

fn result(id: &str, pos: Option<u32>, status: &str, points: f32) -> RaceResult {
    RaceResult {
        driver: Driver {
            id: id.to_string(),
            code: None,
            given_name: "Test".to_string(),
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
        points,
        status: status.to_string(),
        time: None,
        fastest_lap_rank: None,
        fastest_lap_time: None,
    }
}

fn standing(id: &str, team: &str, position: u32, points: f32) -> DriverStanding {
    DriverStanding {
        position,
        points,
        wins: 0,
        driver: Driver {
            id: id.to_string(),
            code: None,
            given_name: "Test".to_string(),
            family_name: id.to_string(),
            nationality: "Dutch".to_string(),
            permanent_number: None,
        },
        team: Team {
            id: team.to_string(),
            name: team.to_string(),
        },
    }
}

#[test]
fn failed_slots_render_messages_not_blanks() {
    // Settled batch with one failed member: the failed slot gets its own
    // message while the others still render their data.
    let now = Utc.with_ymd_and_hms(2025, 3, 18, 0, 0, 0).unwrap();
    let schedule = Resource::Loaded(vec![race(1, (2025, 3, 16)), race(2, (2025, 3, 23))]);

    let schedule_text = plain(&view::schedule_text(&schedule, 2025, now, None));
    assert!(schedule_text.contains("Round 1 GP"));
    assert!(schedule_text.contains("Round 2 GP"));

    let standings_text = plain(&view::driver_standings_text(
        &Resource::Absent,
        &Resource::Loaded(Vec::new()),
        None,
    ));
    assert_eq!(standings_text, "Failed to load driver standings");
}

#[test]
fn empty_but_valid_reads_differently_from_failure() {
    let absent = plain(&view::last_race_text(&Resource::Absent, 2025));
    let empty = plain(&view::last_race_text(&Resource::Loaded(None), 2025));
    assert_eq!(absent, "Failed to load race data");
    assert_eq!(empty, "No race results available yet");
    assert_ne!(absent, empty);
}

#[test]
fn hero_distinguishes_missing_schedule_from_finished_season() {
    let now = Utc.with_ymd_and_hms(2025, 12, 20, 0, 0, 0).unwrap();
    let empty = plain(&view::next_race_text(
        &Resource::Loaded(Vec::new()),
        2026,
        &Countdown::Idle,
        now,
    ));
    assert!(empty.contains("not yet available"));

    let done = plain(&view::next_race_text(
        &Resource::Loaded(vec![race(1, (2025, 3, 16))]),
        2025,
        &Countdown::Idle,
        now,
    ));
    assert!(done.contains("season is complete"));
}

#[test]
fn last_race_lists_podium_then_points_rows() {
    let results = vec![
        result("first", Some(1), "Finished", 25.0),
        result("second", Some(2), "Finished", 18.0),
        result("third", Some(3), "Finished", 15.0),
        result("fourth", Some(4), "Finished", 12.0),
        result("eleventh", Some(11), "Finished", 0.0),
    ];
    let payload = Resource::Loaded(Some(RaceResults {
        race: race(1, (2025, 3, 16)),
        results,
    }));
    let rendered = plain(&view::last_race_text(&payload, 2025));
    assert!(rendered.contains("first"));
    assert!(rendered.contains("fourth"));
    // Outside the points: not part of the overview panel.
    assert!(!rendered.contains("eleventh"));
}

#[test]
fn head_to_head_prefers_same_team_entry() {
    let standings = vec![
        standing("max_verstappen", "red_bull", 1, 100.0),
        standing("norris", "mclaren", 2, 90.0),
        standing("tsunoda", "red_bull", 10, 20.0),
    ];
    let (own, teammate) =
        view::teammate_pair(&standings, "max_verstappen").expect("driver in standings");
    assert_eq!(own.driver.id, "max_verstappen");
    assert_eq!(teammate.map(|t| t.driver.id.as_str()), Some("tsunoda"));

    let rendered = plain(&view::head_to_head_text(own, teammate));
    assert!(rendered.contains("83%"));
    assert!(rendered.contains("17%"));
}

#[test]
fn driver_title_uses_latest_team() {
    let mut early = result("norris", Some(1), "Finished", 25.0);
    early.team = Team {
        id: "mclaren".to_string(),
        name: "McLaren".to_string(),
    };
    let late = result("norris", Some(2), "Finished", 18.0);
    let races = Resource::Loaded(vec![
        RaceResults {
            race: race(1, (2025, 3, 16)),
            results: vec![early],
        },
        RaceResults {
            race: race(2, (2025, 3, 23)),
            results: vec![late],
        },
    ]);
    let rendered = plain(&view::driver_title_text(&races, 2025));
    assert!(rendered.contains("Red Bull"));
    assert!(rendered.contains("2025"));
}

#[test]
fn standings_rows_carry_recent_form_dots() {
    let standings = Resource::Loaded(vec![
        standing("max_verstappen", "red_bull", 1, 100.0),
        standing("norris", "mclaren", 2, 90.0),
    ]);
    let recent = Resource::Loaded(vec![
        RaceResults {
            race: race(1, (2025, 3, 16)),
            results: vec![result("max_verstappen", Some(1), "Finished", 25.0)],
        },
        RaceResults {
            race: race(2, (2025, 3, 23)),
            results: vec![result("max_verstappen", None, "Accident", 0.0)],
        },
    ]);
    let rendered = plain(&view::driver_standings_text(&standings, &recent, None));

    let ver_row = rendered
        .lines()
        .find(|line| line.contains("max_verstappen"))
        .expect("row for leader");
    assert_eq!(ver_row.matches('●').count(), 2);

    // No sampled result, no dots; the row itself still renders.
    let nor_row = rendered
        .lines()
        .find(|line| line.contains("norris"))
        .expect("row for runner-up");
    assert_eq!(nor_row.matches('●').count(), 0);
}

#[test]
fn pit_stop_ranking_filters_sorts_and_caps() {
    // Eleven real stops slowest-first plus a zero-duration data artifact.
    let mut stops: Vec<PitStop> = (0..11u32)
        .map(|i| PitStop {
            driver_id: format!("driver{i}"),
            lap: 10 + i,
            stop: 1,
            duration: 30.0 - f64::from(i),
        })
        .collect();
    stops.push(PitStop {
        driver_id: "ghost".to_string(),
        lap: 5,
        stop: 1,
        duration: 0.0,
    });
    let data = RaceData {
        race: Resource::Loaded(None),
        qualifying: Resource::Loaded(Vec::new()),
        pit_stops: Resource::Loaded(stops),
        sprint: Resource::Loaded(None),
    };

    let rendered = plain(&view::tab_content_text(ResultTab::PitStops, &data));
    let rows: Vec<&str> = rendered.lines().collect();

    assert_eq!(rows.len(), 10);
    assert!(!rendered.contains("ghost"));
    // Ascending by duration: the 20.0s stop leads and the 30.0s stop fell
    // past the cap.
    assert!(rows[0].contains("20.000s"));
    assert!(rows[9].contains("29.000s"));
    assert!(!rendered.contains("30.000s"));
    assert!(rows[0].contains("FAST"));
    assert_eq!(rendered.matches("FAST").count(), 1);
}

#[test]
fn trend_lines_limited_and_sorted_by_total() {
    let rounds: Vec<RaceResults> = (1..=3)
        .map(|round| RaceResults {
            race: race(round, (2025, 3, round)),
            results: (0..8u32)
                .map(|i| {
                    result(
                        &format!("driver{i}"),
                        Some(i + 1),
                        "Finished",
                        (25 - i * 3) as f32,
                    )
                })
                .collect(),
        })
        .collect();
    let lines = view::trend_lines(&rounds);
    assert_eq!(lines.len(), 5);
    assert_eq!(lines[0].label, "driver0");
    // Every series spans all sampled rounds.
    assert!(lines.iter().all(|line| line.points.len() == 3));
    let totals: Vec<f64> = lines
        .iter()
        .map(|line| line.points.last().map(|p| p.1).unwrap_or(0.0))
        .collect();
    assert!(totals.windows(2).all(|pair| pair[0] >= pair[1]));
}
