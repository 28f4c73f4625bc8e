//! Statistics and ranking
//!
//! Turns the raw iteration counts of one group into throughput figures and,
//! when comparison is enabled, a winner plus each test's percentage
//! distance from it.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Iteration counts of one group, in execution order
pub type RawResult = Vec<(String, u64)>;

/// Figures reported for a single test
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestStats {
    pub name: String,
    pub count: u64,
    /// Percentage deviation from the winner; absent for the winner itself
    /// and when comparison is off
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub diff: Option<f64>,
    pub ops_sec: f64,
}

/// Ranked results of one group, ordered by descending count
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedResult {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub winner: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub winner_count: Option<u64>,
    pub results: Vec<TestStats>,
}

impl RankedResult {
    pub fn get(&self, name: &str) -> Option<&TestStats> {
        self.results.iter().find(|r| r.name == name)
    }
}

/// Count normalised to a one second window
pub fn ops_per_sec(count: u64, duration: Duration) -> f64 {
    let micros = duration.as_micros() as f64;
    if micros == 0.0 {
        return 0.0;
    }
    count as f64 * 1_000_000.0 / micros
}

/// First entry holding the maximum count. Later entries only win with a
/// strictly greater count, so ties go to the earliest registration.
fn select_winner(raw: &[(String, u64)]) -> Option<(&str, u64)> {
    let mut best: Option<(&str, u64)> = None;
    for (name, count) in raw {
        match best {
            Some((_, best_count)) if *count <= best_count => {}
            _ => best = Some((name.as_str(), *count)),
        }
    }
    best
}

/// Rank one group's raw counts
pub fn rank(raw: &[(String, u64)], duration: Duration, compare: bool) -> RankedResult {
    let winner = if compare { select_winner(raw) } else { None };

    let mut results: Vec<TestStats> = raw
        .iter()
        .map(|(name, count)| {
            let diff = match winner {
                Some((winner_name, _)) if winner_name == name => None,
                Some((_, 0)) => Some(0.0),
                Some((_, winner_count)) => {
                    Some((*count as f64 - winner_count as f64) / winner_count as f64 * 100.0)
                }
                None => None,
            };
            TestStats {
                name: name.clone(),
                count: *count,
                diff,
                ops_sec: ops_per_sec(*count, duration),
            }
        })
        .collect();

    // sort_by is stable: equal counts keep their execution order
    results.sort_by(|a, b| b.count.cmp(&a.count));

    RankedResult {
        winner: winner.map(|(name, _)| name.to_string()),
        winner_count: winner.map(|(_, count)| count),
        results,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(entries: &[(&str, u64)]) -> RawResult {
        entries.iter().map(|(n, c)| (n.to_string(), *c)).collect()
    }

    #[test]
    fn test_ops_sec_is_count_per_second() {
        assert_eq!(ops_per_sec(100, Duration::from_secs(1)), 100.0);
        assert_eq!(ops_per_sec(20, Duration::from_millis(100)), 200.0);
        assert_eq!(ops_per_sec(7, Duration::from_micros(500)), 14_000.0);
        assert_eq!(ops_per_sec(5, Duration::ZERO), 0.0);
    }

    #[test]
    fn test_without_compare_there_is_no_winner_or_diff() {
        let ranked = rank(&raw(&[("a", 10), ("b", 30)]), Duration::from_secs(1), false);
        assert!(ranked.winner.is_none());
        assert!(ranked.winner_count.is_none());
        assert!(ranked.results.iter().all(|r| r.diff.is_none()));
        assert_eq!(ranked.results[0].name, "b");
    }

    #[test]
    fn test_compare_picks_highest_count() {
        let ranked = rank(
            &raw(&[("slow", 50), ("fast", 200), ("mid", 100)]),
            Duration::from_millis(100),
            true,
        );
        assert_eq!(ranked.winner.as_deref(), Some("fast"));
        assert_eq!(ranked.winner_count, Some(200));

        let names: Vec<_> = ranked.results.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["fast", "mid", "slow"]);

        assert_eq!(ranked.get("fast").unwrap().diff, None);
        assert_eq!(ranked.get("mid").unwrap().diff, Some(-50.0));
        assert_eq!(ranked.get("slow").unwrap().diff, Some(-75.0));
        assert_eq!(ranked.get("fast").unwrap().ops_sec, 2000.0);
        assert_eq!(
            ranked.results.iter().filter(|r| r.diff.is_none()).count(),
            1
        );
    }

    #[test]
    fn test_ties_go_to_first_registered() {
        let ranked = rank(
            &raw(&[("low", 1), ("first", 9), ("second", 9)]),
            Duration::from_secs(1),
            true,
        );
        assert_eq!(ranked.winner.as_deref(), Some("first"));
        assert_eq!(ranked.get("second").unwrap().diff, Some(0.0));

        let names: Vec<_> = ranked.results.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["first", "second", "low"]);
    }

    #[test]
    fn test_all_zero_counts() {
        let ranked = rank(&raw(&[("a", 0), ("b", 0)]), Duration::from_secs(1), true);
        assert_eq!(ranked.winner.as_deref(), Some("a"));
        assert_eq!(ranked.winner_count, Some(0));
        assert_eq!(ranked.get("b").unwrap().diff, Some(0.0));
    }

    #[test]
    fn test_empty_group() {
        let ranked = rank(&[], Duration::from_secs(1), true);
        assert!(ranked.winner.is_none());
        assert!(ranked.results.is_empty());
    }

    #[test]
    fn test_serialized_field_names() {
        let ranked = rank(&raw(&[("a", 2), ("b", 1)]), Duration::from_secs(1), true);
        let json = serde_json::to_value(&ranked).unwrap();
        assert_eq!(json["winner"], "a");
        assert_eq!(json["winnerCount"], 2);
        assert!(json["results"][0].get("diff").is_none());
        assert_eq!(json["results"][1]["diff"], -50.0);
        assert_eq!(json["results"][1]["opsSec"], 1.0);

        let plain = rank(&raw(&[("a", 2)]), Duration::from_secs(1), false);
        let json = serde_json::to_value(&plain).unwrap();
        assert!(json.get("winner").is_none());
        assert!(json.get("winnerCount").is_none());
    }
}
