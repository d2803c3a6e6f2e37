use std::collections::HashMap;

use crate::model::{RaceResult, RaceResults};

/// A result counts as a DNF iff its status is not "Finished" and does not
/// mention "Lap" — lapped cars ("+1 Lap") are classified finishers.
pub fn is_dnf(status: &str) -> bool {
    status != "Finished" && !status.contains("Lap")
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SeasonStats {
    pub points: f32,
    pub wins: u32,
    pub podiums: u32,
    pub dnfs: u32,
    pub best_finish: Option<u32>,
    pub races: usize,
}

pub fn season_stats(results: &[RaceResult]) -> SeasonStats {
    let mut stats = SeasonStats {
        races: results.len(),
        ..SeasonStats::default()
    };
    for result in results {
        stats.points += result.points;
        if result.position == Some(1) {
            stats.wins += 1;
        }
        if matches!(result.position, Some(pos) if pos <= 3) {
            stats.podiums += 1;
        }
        if is_dnf(&result.status) {
            stats.dnfs += 1;
        }
        if let Some(pos) = result.position {
            stats.best_finish = Some(stats.best_finish.map_or(pos, |best| best.min(pos)));
        }
    }
    stats
}

/// Outcome classification for the compact recent-form strip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Win,
    Points,
    Finish,
    Dnf,
}

pub fn outcome_of(result: &RaceResult) -> Outcome {
    if is_dnf(&result.status) {
        Outcome::Dnf
    } else if result.position == Some(1) {
        Outcome::Win
    } else if result.points > 0.0 {
        Outcome::Points
    } else {
        Outcome::Finish
    }
}

/// Per-driver outcome sequences in the order the races are supplied (callers
/// pass the last completed rounds oldest-first). A driver absent from one of
/// the sampled rounds simply has a shorter sequence; the data cannot tell
/// "did not race" apart from missing data.
pub fn form_map(races: &[RaceResults]) -> HashMap<String, Vec<Outcome>> {
    let mut map: HashMap<String, Vec<Outcome>> = HashMap::new();
    for round in races {
        for result in &round.results {
            map.entry(result.driver.id.clone())
                .or_default()
                .push(outcome_of(result));
        }
    }
    map
}

/// Relative points share between two teammates. Defined only when the combined
/// points are positive. The right share is derived as `100 - left` so the two
/// always sum to exactly 100 despite rounding.
pub fn head_to_head(points_a: f32, points_b: f32) -> Option<(u8, u8)> {
    let total = points_a + points_b;
    if total <= 0.0 {
        return None;
    }
    let left = (points_a / total * 100.0).round() as u8;
    Some((left, 100 - left))
}

/// Cumulative points per supplied round for every driver appearing anywhere
/// in the window. Rounds a driver missed contribute 0, so all series have one
/// value per round and can share a plot axis.
pub fn trend_series(races: &[RaceResults]) -> HashMap<String, Vec<f32>> {
    let mut series: HashMap<String, Vec<f32>> = HashMap::new();
    for round in races {
        for result in &round.results {
            series.entry(result.driver.id.clone()).or_default();
        }
    }
    for (round_idx, round) in races.iter().enumerate() {
        let mut scored: HashMap<&str, f32> = HashMap::new();
        for result in &round.results {
            scored.insert(result.driver.id.as_str(), result.points);
        }
        for (driver_id, values) in series.iter_mut() {
            let prev = if round_idx == 0 {
                0.0
            } else {
                values[round_idx - 1]
            };
            values.push(prev + scored.get(driver_id.as_str()).copied().unwrap_or(0.0));
        }
    }
    series
}

/// Percentage of `value` against `max`, rounded. A non-positive `max` is
/// treated as 1, so the result is 0 instead of a division error.
pub fn share_of_max(value: f32, max: f32) -> u16 {
    let max = if max <= 0.0 { 1.0 } else { max };
    (value / max * 100.0).round().max(0.0) as u16
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Driver, Team};

    fn result(pos: Option<u32>, status: &str, points: f32) -> RaceResult {
        result_for("driver", pos, status, points)
    }

    fn result_for(id: &str, pos: Option<u32>, status: &str, points: f32) -> RaceResult {
        RaceResult {
            driver: Driver {
                id: id.to_string(),
                code: None,
                given_name: "Test".to_string(),
                family_name: id.to_string(),
                nationality: "British".to_string(),
                permanent_number: None,
            },
            team: Team {
                id: "test".to_string(),
                name: "Test".to_string(),
            },
            position: pos,
            grid: 0,
            points,
            status: status.to_string(),
            time: None,
            fastest_lap_rank: None,
            fastest_lap_time: None,
        }
    }

    #[test]
    fn dnf_classification() {
        assert!(!is_dnf("Finished"));
        assert!(!is_dnf("+1 Lap"));
        assert!(!is_dnf("+2 Laps"));
        assert!(is_dnf("Accident"));
        assert!(is_dnf("Engine"));
        assert!(is_dnf("Retired"));
    }

    #[test]
    fn season_stats_example() {
        let results = vec![
            result(Some(1), "Finished", 25.0),
            result(Some(2), "Finished", 18.0),
            result(Some(3), "+1 Lap", 15.0),
            result(None, "Accident", 0.0),
        ];
        let stats = season_stats(&results);
        assert_eq!(stats.wins, 1);
        assert_eq!(stats.podiums, 3);
        assert_eq!(stats.dnfs, 1);
        assert_eq!(stats.best_finish, Some(1));
        assert_eq!(stats.points, 58.0);
        assert_eq!(stats.races, 4);
    }

    #[test]
    fn season_stats_empty_input() {
        let stats = season_stats(&[]);
        assert_eq!(stats.races, 0);
        assert_eq!(stats.best_finish, None);
        assert_eq!(stats.points, 0.0);
    }

    #[test]
    fn head_to_head_shares_sum_to_100() {
        for (a, b) in [(1.0, 2.0), (333.0, 1.0), (12.5, 12.5), (0.0, 7.0), (57.0, 86.0)] {
            let (left, right) = head_to_head(a, b).expect("positive total");
            assert_eq!(left as u16 + right as u16, 100, "points {a}/{b}");
        }
    }

    #[test]
    fn head_to_head_undefined_without_points() {
        assert!(head_to_head(0.0, 0.0).is_none());
    }

    #[test]
    fn share_of_max_zero_max_is_zero() {
        assert_eq!(share_of_max(0.0, 0.0), 0);
        assert_eq!(share_of_max(5.0, 0.0), 500);
        assert_eq!(share_of_max(50.0, 100.0), 50);
        assert_eq!(share_of_max(100.0, 100.0), 100);
    }

    #[test]
    fn outcome_classes() {
        assert_eq!(outcome_of(&result(Some(1), "Finished", 25.0)), Outcome::Win);
        assert_eq!(outcome_of(&result(Some(8), "Finished", 4.0)), Outcome::Points);
        assert_eq!(outcome_of(&result(Some(14), "+1 Lap", 0.0)), Outcome::Finish);
        assert_eq!(outcome_of(&result(None, "Gearbox", 0.0)), Outcome::Dnf);
    }

    fn round_of(results: Vec<RaceResult>, round: u32) -> RaceResults {
        use crate::model::{Circuit, Race};
        RaceResults {
            race: Race {
                season: 2025,
                round,
                name: format!("Round {round}"),
                circuit: Circuit {
                    id: "test".to_string(),
                    name: "Test".to_string(),
                    locality: "T".to_string(),
                    country: "UK".to_string(),
                },
                date: chrono::NaiveDate::from_ymd_opt(2025, 3, 1).expect("valid date"),
                time: None,
                practice: Vec::new(),
                qualifying: None,
                sprint: None,
            },
            results,
        }
    }

    #[test]
    fn form_map_preserves_round_order() {
        let races = vec![
            round_of(vec![result_for("a", Some(1), "Finished", 25.0)], 1),
            round_of(vec![result_for("a", None, "Accident", 0.0)], 2),
            round_of(vec![result_for("a", Some(6), "Finished", 8.0)], 3),
        ];
        let map = form_map(&races);
        assert_eq!(
            map.get("a").expect("driver present"),
            &vec![Outcome::Win, Outcome::Dnf, Outcome::Points]
        );
    }

    #[test]
    fn trend_series_aligned_across_missing_rounds() {
        let races = vec![
            round_of(vec![result_for("a", Some(1), "Finished", 25.0)], 1),
            round_of(
                vec![
                    result_for("a", Some(2), "Finished", 18.0),
                    result_for("b", Some(1), "Finished", 25.0),
                ],
                2,
            ),
        ];
        let series = trend_series(&races);
        // Driver b missed round 1: contributes 0 there but keeps a slot.
        assert_eq!(series.get("a").expect("a present"), &vec![25.0, 43.0]);
        assert_eq!(series.get("b").expect("b present"), &vec![0.0, 25.0]);
    }
}
