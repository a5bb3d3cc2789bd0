// Chart series written as CSV files under the plots directory so they can
// be plotted with external tools.

use anyhow::Context;
use crictrack_stats::{DatedRuns, HistogramBin, PlayerRuns};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::info;

pub const RUNS_PER_PLAYER_FILE: &str = "total_runs_per_player.csv";
pub const RUNS_DISTRIBUTION_FILE: &str = "runs_distribution.csv";

/// File name of one player's runs-over-time series. Characters other than
/// ASCII letters, digits, `-` and `_` become `_`, so the name never leaves
/// the plots directory.
pub fn runs_over_time_file(player_id: &str) -> String {
    let safe: String = player_id
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    format!("runs_over_time_{safe}.csv")
}

#[derive(Debug, Serialize)]
struct DistributionRow {
    bin: String,
    lower: u32,
    upper: Option<u32>,
    count: usize,
}

impl From<&HistogramBin> for DistributionRow {
    fn from(bin: &HistogramBin) -> Self {
        Self {
            bin: bin.label(),
            lower: bin.lower,
            upper: bin.upper,
            count: bin.count,
        }
    }
}

fn write_rows<T: Serialize>(path: &Path, rows: impl IntoIterator<Item = T>) -> anyhow::Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    for row in rows {
        writer
            .serialize(row)
            .with_context(|| format!("failed to write row to {}", path.display()))?;
    }
    writer
        .flush()
        .with_context(|| format!("failed to flush {}", path.display()))?;
    Ok(())
}

/// Series exported by one `charts` run.
#[derive(Debug, Default)]
pub struct ChartSeries<'a> {
    pub runs_per_player: &'a [PlayerRuns],
    pub distribution: &'a [HistogramBin],
    /// Player id and that player's points, when a player was selected.
    pub runs_over_time: Option<(&'a str, &'a [DatedRuns])>,
}

/// Write every series in `series` to `dir`, creating it when missing.
/// Returns the written paths in order.
pub fn write_chart_series(dir: &Path, series: &ChartSeries<'_>) -> anyhow::Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create plots directory {}", dir.display()))?;

    let mut written = Vec::new();

    let path = dir.join(RUNS_PER_PLAYER_FILE);
    write_rows(&path, series.runs_per_player)?;
    written.push(path);

    let path = dir.join(RUNS_DISTRIBUTION_FILE);
    write_rows(&path, series.distribution.iter().map(DistributionRow::from))?;
    written.push(path);

    if let Some((player_id, points)) = series.runs_over_time {
        let path = dir.join(runs_over_time_file(player_id));
        write_rows(&path, points)?;
        written.push(path);
    }

    info!("Wrote {} chart series to {}", written.len(), dir.display());
    Ok(written)
}
