// Report builder: league-wide table and single-player detail.

use crate::error::{ReferenceKind, StatsError};
use crate::summary::{group_by_player, PlayerSummary, SummaryOrder};
use chrono::NaiveDate;
use crictrack_core::{Match, PerformanceRecord, Player, PlayerRole};
use serde::Serialize;
use std::collections::HashMap;

/// Average a player must exceed to be listed as a high performer when the
/// caller does not supply one.
pub const DEFAULT_HIGH_PERFORMER_THRESHOLD: f64 = 40.0;

// ---------------------------------------------------------------------------
// League report
// ---------------------------------------------------------------------------

/// One row of the league table: a summary joined with player identity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeagueRow {
    pub full_name: String,
    pub role: PlayerRole,
    #[serde(flatten)]
    pub summary: PlayerSummary,
}

impl LeagueRow {
    pub fn player_id(&self) -> &str {
        &self.summary.player_id
    }

    /// More than one innings and a dismissal-based average above
    /// `threshold`. A player without an average never qualifies.
    pub fn is_high_performer(&self, threshold: f64) -> bool {
        self.summary.innings > 1
            && self
                .summary
                .batting_average()
                .is_some_and(|avg| avg > threshold)
    }
}

/// League-wide table, ordered for display.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LeagueReport {
    pub rows: Vec<LeagueRow>,
}

impl LeagueReport {
    /// Re-sort the rows. Ties are broken by ascending player id.
    pub fn reorder(&mut self, order: SummaryOrder) {
        self.rows
            .sort_by(|a, b| order.compare(&a.summary, &b.summary));
    }

    /// Rows for players with more than one innings whose batting average is
    /// above `threshold`, in table order.
    pub fn high_performers(&self, threshold: f64) -> Vec<&LeagueRow> {
        self.rows
            .iter()
            .filter(|row| row.is_high_performer(threshold))
            .collect()
    }

    /// Look up a row by exact player id.
    pub fn find(&self, player_id: &str) -> Option<&LeagueRow> {
        self.rows.iter().find(|row| row.player_id() == player_id)
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Build the league table: one row per player with at least one innings,
/// most runs first.
pub fn build_league_report(
    players: &[Player],
    performances: &[PerformanceRecord],
) -> Result<LeagueReport, StatsError> {
    build_league_report_ordered(players, performances, SummaryOrder::default())
}

/// Build the league table in a caller-chosen order.
pub fn build_league_report_ordered(
    players: &[Player],
    performances: &[PerformanceRecord],
    order: SummaryOrder,
) -> Result<LeagueReport, StatsError> {
    let rows = group_by_player(players, performances)?
        .into_iter()
        .map(|(player, records)| LeagueRow {
            full_name: player.full_name.clone(),
            role: player.role.clone(),
            summary: PlayerSummary::from_records(&player.player_id, records),
        })
        .collect();

    let mut report = LeagueReport { rows };
    report.reorder(order);
    Ok(report)
}

// ---------------------------------------------------------------------------
// Player report
// ---------------------------------------------------------------------------

/// One innings joined with its match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InningsLine {
    pub perf_id: i64,
    pub match_id: String,
    pub date: NaiveDate,
    pub opponent: String,
    pub runs: u32,
    pub balls_faced: u32,
    pub wickets: u32,
    pub not_out: bool,
}

/// Detail for a single player: identity, the same metrics as the league
/// table, and a chronological per-match breakdown.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerReport {
    pub full_name: String,
    pub role: PlayerRole,
    pub summary: PlayerSummary,
    /// Sorted by match date ascending.
    pub breakdown: Vec<InningsLine>,
}

impl PlayerReport {
    pub fn player_id(&self) -> &str {
        &self.summary.player_id
    }
}

/// Build the detail report for `player_id`.
///
/// The id must match a roster entry exactly (no trimming, no case folding);
/// otherwise `StatsError::NotFound`. A player with no innings gets a report
/// with zero totals and an empty breakdown. An innings whose match is not in
/// `matches` fails with `StatsError::ReferentialIntegrity`.
pub fn build_player_report(
    player_id: &str,
    players: &[Player],
    matches: &[Match],
    performances: &[PerformanceRecord],
) -> Result<PlayerReport, StatsError> {
    let player = players
        .iter()
        .find(|p| p.player_id == player_id)
        .ok_or_else(|| StatsError::NotFound(player_id.to_string()))?;

    let records: Vec<&PerformanceRecord> = performances
        .iter()
        .filter(|r| r.player_id == player_id)
        .collect();

    let fixtures: HashMap<&str, &Match> =
        matches.iter().map(|m| (m.match_id.as_str(), m)).collect();

    let mut breakdown = records
        .iter()
        .map(|record| {
            let fixture = fixtures.get(record.match_id.as_str()).ok_or_else(|| {
                StatsError::ReferentialIntegrity {
                    perf_id: record.perf_id,
                    kind: ReferenceKind::Match,
                    id: record.match_id.clone(),
                }
            })?;
            Ok(InningsLine {
                perf_id: record.perf_id,
                match_id: record.match_id.clone(),
                date: fixture.date,
                opponent: fixture.opponent.clone(),
                runs: record.runs,
                balls_faced: record.balls_faced,
                wickets: record.wickets,
                not_out: record.not_out,
            })
        })
        .collect::<Result<Vec<_>, StatsError>>()?;

    breakdown.sort_by(|a, b| {
        a.date
            .cmp(&b.date)
            .then_with(|| a.match_id.cmp(&b.match_id))
            .then_with(|| a.perf_id.cmp(&b.perf_id))
    });

    Ok(PlayerReport {
        full_name: player.full_name.clone(),
        role: player.role.clone(),
        summary: PlayerSummary::from_records(&player.player_id, records),
        breakdown,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
