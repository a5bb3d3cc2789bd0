// Aggregator: per-player totals and derived batting rates.

use crate::error::{ReferenceKind, StatsError};
use crictrack_core::{PerformanceRecord, Player};
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

// ---------------------------------------------------------------------------
// PlayerSummary
// ---------------------------------------------------------------------------

/// Totals and rates for one player over a set of innings. Recomputed on
/// every run; never persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerSummary {
    pub player_id: String,
    pub total_runs: u64,
    pub total_balls: u64,
    pub total_wickets: u64,
    pub total_not_outs: u64,
    /// Number of performance records for the player.
    pub innings: u64,
    /// `innings - total_not_outs`.
    pub dismissals: u64,
    /// Runs per dismissal. `None` when the player has never been dismissed.
    pub batting_average_by_dismissal: Option<f64>,
    /// Runs per innings, ignoring not-outs. `None` when there are no innings.
    pub batting_average_naive: Option<f64>,
    /// Runs per 100 balls faced; 0 when no balls were faced.
    pub strike_rate: f64,
}

impl PlayerSummary {
    /// Summarize the given innings for `player_id`. The caller is responsible
    /// for passing only that player's records.
    pub fn from_records<'a, I>(player_id: &str, records: I) -> Self
    where
        I: IntoIterator<Item = &'a PerformanceRecord>,
    {
        let mut total_runs = 0u64;
        let mut total_balls = 0u64;
        let mut total_wickets = 0u64;
        let mut total_not_outs = 0u64;
        let mut innings = 0u64;

        for record in records {
            total_runs += u64::from(record.runs);
            total_balls += u64::from(record.balls_faced);
            total_wickets += u64::from(record.wickets);
            total_not_outs += u64::from(record.not_out);
            innings += 1;
        }

        let dismissals = innings - total_not_outs;

        let batting_average_by_dismissal =
            (dismissals > 0).then(|| total_runs as f64 / dismissals as f64);
        let batting_average_naive = (innings > 0).then(|| total_runs as f64 / innings as f64);
        let strike_rate = if total_balls > 0 {
            total_runs as f64 / total_balls as f64 * 100.0
        } else {
            0.0
        };

        Self {
            player_id: player_id.to_string(),
            total_runs,
            total_balls,
            total_wickets,
            total_not_outs,
            innings,
            dismissals,
            batting_average_by_dismissal,
            batting_average_naive,
            strike_rate,
        }
    }

    /// The batting average used for tables and high-performer filtering:
    /// runs per dismissal.
    pub fn batting_average(&self) -> Option<f64> {
        self.batting_average_by_dismissal
    }
}

// ---------------------------------------------------------------------------
// Ordering
// ---------------------------------------------------------------------------

/// Row order for league-wide output. Every order breaks ties by ascending
/// player id.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SummaryOrder {
    /// Most runs first.
    #[default]
    TotalRuns,
    /// Highest dismissal-based average first; players without one last.
    BattingAverage,
    StrikeRate,
    Wickets,
    PlayerId,
}

impl SummaryOrder {
    pub fn compare(self, a: &PlayerSummary, b: &PlayerSummary) -> Ordering {
        let primary = match self {
            SummaryOrder::TotalRuns => b.total_runs.cmp(&a.total_runs),
            SummaryOrder::BattingAverage => {
                match (a.batting_average(), b.batting_average()) {
                    (Some(x), Some(y)) => y.total_cmp(&x),
                    (Some(_), None) => Ordering::Less,
                    (None, Some(_)) => Ordering::Greater,
                    (None, None) => Ordering::Equal,
                }
            }
            SummaryOrder::StrikeRate => b.strike_rate.total_cmp(&a.strike_rate),
            SummaryOrder::Wickets => b.total_wickets.cmp(&a.total_wickets),
            SummaryOrder::PlayerId => Ordering::Equal,
        };
        primary.then_with(|| a.player_id.cmp(&b.player_id))
    }
}

// ---------------------------------------------------------------------------
// Grouping
// ---------------------------------------------------------------------------

/// Group performance records by player, resolving each group's player.
///
/// Fails on the first record (in input order) whose player id is not in
/// `players`. Groups come back in ascending player-id order; players with
/// no records produce no group.
pub(crate) fn group_by_player<'a>(
    players: &'a [Player],
    performances: &'a [PerformanceRecord],
) -> Result<Vec<(&'a Player, Vec<&'a PerformanceRecord>)>, StatsError> {
    let roster: HashMap<&str, &Player> = players
        .iter()
        .map(|p| (p.player_id.as_str(), p))
        .collect();

    let mut groups: BTreeMap<&str, (&Player, Vec<&PerformanceRecord>)> = BTreeMap::new();
    for record in performances {
        let Some(player) = roster.get(record.player_id.as_str()) else {
            return Err(StatsError::ReferentialIntegrity {
                perf_id: record.perf_id,
                kind: ReferenceKind::Player,
                id: record.player_id.clone(),
            });
        };
        groups
            .entry(record.player_id.as_str())
            .or_insert_with(|| (*player, Vec::new()))
            .1
            .push(record);
    }

    Ok(groups.into_values().collect())
}

/// Compute one `PlayerSummary` per player that has at least one performance
/// record, sorted by `order`.
///
/// Every performance must reference a player in `players`; an orphan record
/// fails the whole call with `StatsError::ReferentialIntegrity`.
pub fn summarize(
    players: &[Player],
    performances: &[PerformanceRecord],
    order: SummaryOrder,
) -> Result<Vec<PlayerSummary>, StatsError> {
    let mut summaries: Vec<PlayerSummary> = group_by_player(players, performances)?
        .into_iter()
        .map(|(player, records)| PlayerSummary::from_records(&player.player_id, records))
        .collect();

    summaries.sort_by(|a, b| order.compare(a, b));
    Ok(summaries)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crictrack_core::PlayerRole;

    fn player(id: &str, name: &str) -> Player {
        Player {
            player_id: id.into(),
            full_name: name.into(),
            role: PlayerRole::Batter,
        }
    }

    fn perf(
        perf_id: i64,
        player_id: &str,
        match_id: &str,
        runs: u32,
        balls_faced: u32,
        not_out: bool,
    ) -> PerformanceRecord {
        PerformanceRecord {
            perf_id,
            player_id: player_id.into(),
            match_id: match_id.into(),
            runs,
            balls_faced,
            wickets: 0,
            not_out,
        }
    }

    fn find<'a>(rows: &'a [PlayerSummary], id: &str) -> &'a PlayerSummary {
        rows.iter().find(|s| s.player_id == id).unwrap()
    }

    // -- Derived metrics --

    #[test]
    fn sharma_two_innings_one_not_out() {
        let players = vec![player("P001", "A. Sharma")];
        let perfs = vec![
            perf(1, "P001", "M1", 45, 50, false),
            perf(2, "P001", "M2", 30, 40, true),
        ];

        let rows = summarize(&players, &perfs, SummaryOrder::default()).unwrap();
        assert_eq!(rows.len(), 1);
        let s = &rows[0];
        assert_eq!(s.total_runs, 75);
        assert_eq!(s.total_balls, 90);
        assert_eq!(s.innings, 2);
        assert_eq!(s.total_not_outs, 1);
        assert_eq!(s.dismissals, 1);
        assert!((s.batting_average().unwrap() - 75.0).abs() < f64::EPSILON);
        assert!((s.strike_rate - 83.333_333).abs() < 1e-4);
        assert!((s.batting_average_naive.unwrap() - 37.5).abs() < f64::EPSILON);
    }

    #[test]
    fn never_dismissed_has_no_average() {
        let players = vec![player("P001", "A. Sharma")];
        let perfs = vec![
            perf(1, "P001", "M1", 120, 100, true),
            perf(2, "P001", "M2", 64, 50, true),
        ];

        let rows = summarize(&players, &perfs, SummaryOrder::default()).unwrap();
        assert_eq!(rows[0].dismissals, 0);
        assert_eq!(rows[0].total_runs, 184);
        assert!(rows[0].batting_average().is_none());
        assert!(rows[0].batting_average_naive.is_some());
    }

    #[test]
    fn zero_balls_faced_strike_rate_is_zero() {
        let players = vec![player("P001", "A. Sharma")];
        let perfs = vec![perf(1, "P001", "M1", 10, 0, false)];

        let rows = summarize(&players, &perfs, SummaryOrder::default()).unwrap();
        assert_eq!(rows[0].strike_rate, 0.0);
        assert!((rows[0].batting_average().unwrap() - 10.0).abs() < f64::EPSILON);
    }

    #[test]
    fn no_records_summary_is_all_zero() {
        let s = PlayerSummary::from_records("P001", std::iter::empty());
        assert_eq!(s.innings, 0);
        assert_eq!(s.dismissals, 0);
        assert_eq!(s.total_runs, 0);
        assert!(s.batting_average().is_none());
        assert!(s.batting_average_naive.is_none());
        assert_eq!(s.strike_rate, 0.0);
    }

    #[test]
    fn wickets_summed() {
        let players = vec![player("P002", "R. Khan")];
        let mut a = perf(1, "P002", "M1", 4, 9, false);
        a.wickets = 3;
        let mut b = perf(2, "P002", "M2", 0, 0, true);
        b.wickets = 2;

        let rows = summarize(&players, &[a, b], SummaryOrder::default()).unwrap();
        assert_eq!(rows[0].total_wickets, 5);
    }

    // -- Grouping --

    #[test]
    fn run_totals_conserved_under_grouping() {
        let players = vec![
            player("P001", "A. Sharma"),
            player("P002", "R. Khan"),
            player("P003", "S. Patel"),
        ];
        let perfs = vec![
            perf(1, "P001", "M1", 45, 50, false),
            perf(2, "P002", "M1", 7, 12, false),
            perf(3, "P003", "M1", 101, 80, true),
            perf(4, "P001", "M2", 0, 1, false),
            perf(5, "P003", "M2", 33, 29, false),
        ];

        let rows = summarize(&players, &perfs, SummaryOrder::default()).unwrap();
        let grouped: u64 = rows.iter().map(|s| s.total_runs).sum();
        let raw: u64 = perfs.iter().map(|p| u64::from(p.runs)).sum();
        assert_eq!(grouped, raw);

        let innings: u64 = rows.iter().map(|s| s.innings).sum();
        assert_eq!(innings, perfs.len() as u64);
    }

    #[test]
    fn players_without_records_are_omitted() {
        let players = vec![player("P001", "A. Sharma"), player("P002", "R. Khan")];
        let perfs = vec![perf(1, "P001", "M1", 45, 50, false)];

        let rows = summarize(&players, &perfs, SummaryOrder::default()).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].player_id, "P001");
    }

    #[test]
    fn empty_inputs_are_valid() {
        let rows = summarize(&[], &[], SummaryOrder::default()).unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn orphan_record_is_referential_integrity_error() {
        let players = vec![player("P001", "A. Sharma")];
        let perfs = vec![
            perf(1, "P001", "M1", 45, 50, false),
            perf(7, "P999", "M1", 12, 10, false),
        ];

        let err = summarize(&players, &perfs, SummaryOrder::default()).unwrap_err();
        match err {
            StatsError::ReferentialIntegrity { perf_id, kind, id } => {
                assert_eq!(perf_id, 7);
                assert_eq!(kind, ReferenceKind::Player);
                assert_eq!(id, "P999");
            }
            other => panic!("expected ReferentialIntegrity, got: {other}"),
        }
    }

    #[test]
    fn player_id_lookup_is_case_sensitive() {
        let players = vec![player("P001", "A. Sharma")];
        let perfs = vec![perf(1, "p001", "M1", 45, 50, false)];
        assert!(matches!(
            summarize(&players, &perfs, SummaryOrder::default()),
            Err(StatsError::ReferentialIntegrity { .. })
        ));
    }

    // -- Ordering --

    #[test]
    fn default_order_runs_desc_then_id_asc() {
        let players = vec![
            player("P003", "S. Patel"),
            player("P001", "A. Sharma"),
            player("P002", "R. Khan"),
        ];
        let perfs = vec![
            perf(1, "P003", "M1", 50, 40, false),
            perf(2, "P001", "M1", 50, 60, false),
            perf(3, "P002", "M1", 80, 70, false),
        ];

        let rows = summarize(&players, &perfs, SummaryOrder::default()).unwrap();
        let ids: Vec<&str> = rows.iter().map(|s| s.player_id.as_str()).collect();
        assert_eq!(ids, vec!["P002", "P001", "P003"]);
    }

    #[test]
    fn average_order_puts_no_value_last() {
        let players = vec![
            player("P001", "A. Sharma"),
            player("P002", "R. Khan"),
            player("P003", "S. Patel"),
        ];
        let perfs = vec![
            perf(1, "P001", "M1", 200, 150, true),
            perf(2, "P002", "M1", 20, 30, false),
            perf(3, "P003", "M1", 60, 45, false),
        ];

        let rows = summarize(&players, &perfs, SummaryOrder::BattingAverage).unwrap();
        let ids: Vec<&str> = rows.iter().map(|s| s.player_id.as_str()).collect();
        assert_eq!(ids, vec!["P003", "P002", "P001"]);
    }

    #[test]
    fn strike_rate_and_wicket_orders() {
        let players = vec![player("P001", "A. Sharma"), player("P002", "R. Khan")];
        let mut a = perf(1, "P001", "M1", 30, 60, false);
        a.wickets = 1;
        let mut b = perf(2, "P002", "M1", 30, 20, false);
        b.wickets = 0;
        let perfs = vec![a, b];

        let by_sr = summarize(&players, &perfs, SummaryOrder::StrikeRate).unwrap();
        assert_eq!(by_sr[0].player_id, "P002");

        let by_wkts = summarize(&players, &perfs, SummaryOrder::Wickets).unwrap();
        assert_eq!(by_wkts[0].player_id, "P001");

        let by_id = summarize(&players, &perfs, SummaryOrder::PlayerId).unwrap();
        assert_eq!(by_id[0].player_id, "P001");
    }

    #[test]
    fn grouping_sums_per_player() {
        let players = vec![player("P001", "A. Sharma"), player("P002", "R. Khan")];
        let perfs = vec![
            perf(1, "P001", "M1", 10, 10, false),
            perf(2, "P002", "M1", 5, 10, false),
            perf(3, "P001", "M2", 20, 10, true),
        ];
        let rows = summarize(&players, &perfs, SummaryOrder::PlayerId).unwrap();
        let sharma = find(&rows, "P001");
        assert_eq!(sharma.total_runs, 30);
        assert_eq!(sharma.innings, 2);
        assert!((sharma.strike_rate - 150.0).abs() < f64::EPSILON);
        assert_eq!(find(&rows, "P002").total_runs, 5);
    }
}
