// Flat series for charting. No I/O here; rendering and file output live in
// the CLI.

use crate::report::{LeagueReport, PlayerReport};
use chrono::NaiveDate;
use crictrack_core::PerformanceRecord;
use serde::Serialize;
use std::num::NonZeroU32;

// ---------------------------------------------------------------------------
// Total runs per player
// ---------------------------------------------------------------------------

/// One bar of the runs-per-player chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlayerRuns {
    pub player_id: String,
    pub full_name: String,
    pub total_runs: u64,
}

/// Total runs per player, ordered by name (then id) so chart axis labels
/// are stable between runs.
pub fn runs_per_player(league: &LeagueReport) -> Vec<PlayerRuns> {
    let mut series: Vec<PlayerRuns> = league
        .rows
        .iter()
        .map(|row| PlayerRuns {
            player_id: row.player_id().to_string(),
            full_name: row.full_name.clone(),
            total_runs: row.summary.total_runs,
        })
        .collect();
    series.sort_by(|a, b| {
        a.full_name
            .cmp(&b.full_name)
            .then_with(|| a.player_id.cmp(&b.player_id))
    });
    series
}

// ---------------------------------------------------------------------------
// Runs distribution
// ---------------------------------------------------------------------------

/// Every innings' runs, unfiltered, in record order.
pub fn innings_runs(performances: &[PerformanceRecord]) -> Vec<u32> {
    performances.iter().map(|p| p.runs).collect()
}

const DEFAULT_BIN_WIDTH: NonZeroU32 = match NonZeroU32::new(10) {
    Some(width) => width,
    None => panic!("bin width must be non-zero"),
};

/// Fixed-width binning over `[0, limit)` plus an overflow bucket for
/// values at or above `limit`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BinSpec {
    width: NonZeroU32,
    limit: u32,
}

impl BinSpec {
    /// Returns `None` when `width` or `limit` is zero. When `limit` is not a
    /// multiple of `width` the last regular bin is narrower.
    pub fn new(width: u32, limit: u32) -> Option<Self> {
        let width = NonZeroU32::new(width)?;
        (limit > 0).then_some(Self { width, limit })
    }

    pub fn width(&self) -> u32 {
        self.width.get()
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    fn regular_bins(&self) -> u32 {
        self.limit.div_ceil(self.width.get())
    }
}

impl Default for BinSpec {
    /// Width 10 over 0-100.
    fn default() -> Self {
        Self {
            width: DEFAULT_BIN_WIDTH,
            limit: 100,
        }
    }
}

/// One histogram bucket. `upper` is exclusive; `None` marks the overflow
/// bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HistogramBin {
    pub lower: u32,
    pub upper: Option<u32>,
    pub count: usize,
}

impl HistogramBin {
    /// Axis label, e.g. `"10-19"` or `"100+"`.
    pub fn label(&self) -> String {
        match self.upper {
            Some(upper) if upper > self.lower + 1 => format!("{}-{}", self.lower, upper - 1),
            Some(_) => self.lower.to_string(),
            None => format!("{}+", self.lower),
        }
    }

    pub fn is_overflow(&self) -> bool {
        self.upper.is_none()
    }
}

/// Bucket per-innings runs. Always returns every regular bin followed by
/// the overflow bin, even when empty, so no value is ever dropped.
pub fn bucket_runs(runs: &[u32], spec: BinSpec) -> Vec<HistogramBin> {
    let width = spec.width();
    let mut bins: Vec<HistogramBin> = (0..spec.regular_bins())
        .map(|i| {
            let lower = i * width;
            HistogramBin {
                lower,
                upper: Some(lower.saturating_add(width).min(spec.limit)),
                count: 0,
            }
        })
        .collect();
    bins.push(HistogramBin {
        lower: spec.limit,
        upper: None,
        count: 0,
    });

    let overflow = bins.len() - 1;
    for &value in runs {
        let idx = if value >= spec.limit {
            overflow
        } else {
            (value / width) as usize
        };
        bins[idx].count += 1;
    }
    bins
}

// ---------------------------------------------------------------------------
// Runs over time
// ---------------------------------------------------------------------------

/// One point of a player's runs-over-time series.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DatedRuns {
    pub date: NaiveDate,
    pub match_id: String,
    pub runs: u32,
}

/// A player's runs per innings as (date, runs) points, oldest first.
pub fn runs_over_time(report: &PlayerReport) -> Vec<DatedRuns> {
    let mut points: Vec<DatedRuns> = report
        .breakdown
        .iter()
        .map(|line| DatedRuns {
            date: line.date,
            match_id: line.match_id.clone(),
            runs: line.runs,
        })
        .collect();
    points.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.match_id.cmp(&b.match_id)));
    points
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::{build_league_report, build_player_report};
    use crictrack_core::{Match, Player, PlayerRole};

    fn counts(bins: &[HistogramBin]) -> Vec<usize> {
        bins.iter().map(|b| b.count).collect()
    }

    // -- Histogram --

    #[test]
    fn default_spec_has_ten_bins_plus_overflow() {
        let bins = bucket_runs(&[], BinSpec::default());
        assert_eq!(bins.len(), 11);
        assert_eq!(bins[0].label(), "0-9");
        assert_eq!(bins[9].label(), "90-99");
        assert_eq!(bins[10].label(), "100+");
        assert!(bins[10].is_overflow());
        assert!(counts(&bins).iter().all(|&c| c == 0));
    }

    #[test]
    fn centuries_land_in_overflow() {
        let runs = [0, 9, 10, 45, 99, 100, 102, 250];
        let bins = bucket_runs(&runs, BinSpec::default());

        assert_eq!(counts(&bins), vec![2, 1, 0, 0, 1, 0, 0, 0, 0, 1, 3]);
        let total: usize = bins.iter().map(|b| b.count).sum();
        assert_eq!(total, runs.len());
    }

    #[test]
    fn ragged_limit_truncates_last_bin() {
        let spec = BinSpec::new(10, 25).unwrap();
        let bins = bucket_runs(&[24, 25, 5], spec);
        assert_eq!(bins.len(), 4);
        assert_eq!(bins[2].label(), "20-24");
        assert_eq!(counts(&bins), vec![1, 0, 1, 1]);
    }

    #[test]
    fn single_value_bins_label_without_range() {
        let bins = bucket_runs(&[0, 1, 1], BinSpec::new(1, 2).unwrap());
        assert_eq!(bins[0].label(), "0");
        assert_eq!(bins[1].label(), "1");
        assert_eq!(counts(&bins), vec![1, 2, 0]);
    }

    #[test]
    fn bin_spec_rejects_zero() {
        assert!(BinSpec::new(0, 100).is_none());
        assert!(BinSpec::new(10, 0).is_none());
        assert_eq!(BinSpec::default(), BinSpec::new(10, 100).unwrap());
    }

    // -- Other series --

    fn sample() -> (Vec<Player>, Vec<Match>, Vec<PerformanceRecord>) {
        let players = vec![
            Player {
                player_id: "P002".into(),
                full_name: "Zed Ali".into(),
                role: PlayerRole::Bowler,
            },
            Player {
                player_id: "P001".into(),
                full_name: "Amit Rao".into(),
                role: PlayerRole::Batter,
            },
        ];
        let matches = vec![
            Match {
                match_id: "M1".into(),
                date: NaiveDate::from_ymd_opt(2024, 3, 9).unwrap(),
                opponent: "Rovers".into(),
            },
            Match {
                match_id: "M2".into(),
                date: NaiveDate::from_ymd_opt(2024, 3, 2).unwrap(),
                opponent: "Strikers".into(),
            },
        ];
        let perf = |perf_id, player_id: &str, match_id: &str, runs| PerformanceRecord {
            perf_id,
            player_id: player_id.into(),
            match_id: match_id.into(),
            runs,
            balls_faced: 10,
            wickets: 0,
            not_out: false,
        };
        let perfs = vec![
            perf(1, "P002", "M1", 80),
            perf(2, "P001", "M1", 12),
            perf(3, "P001", "M2", 30),
        ];
        (players, matches, perfs)
    }

    #[test]
    fn runs_per_player_ordered_by_name() {
        let (players, _, perfs) = sample();
        let league = build_league_report(&players, &perfs).unwrap();
        // League table puts Zed Ali first (most runs); the chart sorts by name.
        assert_eq!(league.rows[0].full_name, "Zed Ali");

        let series = runs_per_player(&league);
        let names: Vec<&str> = series.iter().map(|p| p.full_name.as_str()).collect();
        assert_eq!(names, vec!["Amit Rao", "Zed Ali"]);
        assert_eq!(series[0].total_runs, 42);
    }

    #[test]
    fn innings_runs_is_unfiltered() {
        let (_, _, perfs) = sample();
        assert_eq!(innings_runs(&perfs), vec![80, 12, 30]);
    }

    #[test]
    fn runs_over_time_sorted_by_date() {
        let (players, matches, perfs) = sample();
        let report = build_player_report("P001", &players, &matches, &perfs).unwrap();

        let points = runs_over_time(&report);
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].date, NaiveDate::from_ymd_opt(2024, 3, 2).unwrap());
        assert_eq!(points[0].runs, 30);
        assert_eq!(points[1].runs, 12);
    }
}
