// One analysis run over an immutable snapshot of the record store.

use crate::error::StatsError;
use crate::report::{build_league_report_ordered, build_player_report, LeagueReport, PlayerReport};
use crate::series::{self, BinSpec, DatedRuns, HistogramBin, PlayerRuns};
use crate::summary::SummaryOrder;
use crictrack_core::{RecordStore, Snapshot};
use tracing::{debug, info};

/// The snapshot read at the start of a run and the league table computed
/// from it. Every report and series of the run is derived from the same
/// snapshot, so a concurrent reload of the store cannot tear the output.
#[derive(Debug, Clone)]
pub struct Analysis {
    snapshot: Snapshot,
    league: LeagueReport,
}

impl Analysis {
    /// Read one snapshot from `store` and aggregate it. A store failure or
    /// an orphan performance record aborts the run.
    pub fn run<S: RecordStore + ?Sized>(store: &S, order: SummaryOrder) -> Result<Self, StatsError> {
        let snapshot = store.snapshot()?;
        info!(
            "Analysing {} players, {} matches, {} performance records",
            snapshot.players.len(),
            snapshot.matches.len(),
            snapshot.performances.len()
        );
        Self::from_snapshot(snapshot, order)
    }

    pub fn from_snapshot(snapshot: Snapshot, order: SummaryOrder) -> Result<Self, StatsError> {
        let league =
            build_league_report_ordered(&snapshot.players, &snapshot.performances, order)?;
        debug!("league table has {} rows", league.rows.len());
        Ok(Self { snapshot, league })
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    pub fn league(&self) -> &LeagueReport {
        &self.league
    }

    /// Single-player detail from this run's snapshot.
    pub fn player_report(&self, player_id: &str) -> Result<PlayerReport, StatsError> {
        build_player_report(
            player_id,
            &self.snapshot.players,
            &self.snapshot.matches,
            &self.snapshot.performances,
        )
    }

    pub fn runs_per_player(&self) -> Vec<PlayerRuns> {
        series::runs_per_player(&self.league)
    }

    pub fn runs_histogram(&self, spec: BinSpec) -> Vec<HistogramBin> {
        series::bucket_runs(&series::innings_runs(&self.snapshot.performances), spec)
    }

    pub fn runs_over_time(&self, player_id: &str) -> Result<Vec<DatedRuns>, StatsError> {
        Ok(series::runs_over_time(&self.player_report(player_id)?))
    }
}
