// Subcommand handlers. Each one writes its report to `out` so the binary
// can hand it stdout and tests can hand it a buffer.

use crate::export::{self, ChartSeries};
use crate::render;
use anyhow::{bail, Context};
use crictrack_core::config::{self, Config, DataPaths};
use crictrack_core::db::{Database, LoadCounts};
use crictrack_core::ingest;
use crictrack_stats::series::runs_over_time;
use crictrack_stats::{Analysis, BinSpec, SummaryOrder};
use serde_json::json;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

/// Config values with every path resolved against the base directory.
#[derive(Debug, Clone)]
pub struct Settings {
    pub db_path: String,
    pub data_paths: DataPaths,
    pub threshold: f64,
    pub bins: BinSpec,
    pub plots_dir: PathBuf,
    pub default_player: Option<String>,
}

fn resolve(base_dir: &Path, path: &str) -> String {
    if path == ":memory:" {
        return path.to_string();
    }
    base_dir.join(path).to_string_lossy().into_owned()
}

impl Settings {
    pub fn from_config(config: &Config, base_dir: &Path) -> anyhow::Result<Self> {
        let report = &config.report;
        let Some(bins) = BinSpec::new(report.histogram_bin_width, report.histogram_limit) else {
            bail!(
                "invalid histogram bins: width {} limit {}",
                report.histogram_bin_width,
                report.histogram_limit
            );
        };
        Ok(Self {
            db_path: resolve(base_dir, &config.db_path),
            data_paths: DataPaths {
                players: resolve(base_dir, &config.data_paths.players),
                matches: resolve(base_dir, &config.data_paths.matches),
                performances: resolve(base_dir, &config.data_paths.performances),
            },
            threshold: report.high_performer_threshold,
            bins,
            plots_dir: base_dir.join(&report.plots_dir),
            default_player: report.default_player.clone(),
        })
    }

    /// The explicit threshold after the same check the config applies,
    /// else the configured one.
    pub fn threshold_or_default(&self, threshold: Option<f64>) -> anyhow::Result<f64> {
        match threshold {
            Some(t) => Ok(config::validate_threshold(t).context("invalid --threshold")?),
            None => Ok(self.threshold),
        }
    }

    /// The explicit player id, else the configured default.
    pub fn player_or_default(&self, player_id: Option<String>) -> anyhow::Result<String> {
        match player_id.or_else(|| self.default_player.clone()) {
            Some(id) => Ok(id),
            None => bail!("no player id given and report.default_player is not set"),
        }
    }
}

// ---------------------------------------------------------------------------
// load
// ---------------------------------------------------------------------------

/// Read the CSV files and swap them into the database in one transaction.
pub fn load(db: &Database, paths: &DataPaths) -> anyhow::Result<LoadCounts> {
    let snapshot = ingest::load_dataset(paths).context("failed to read CSV data")?;
    let counts = db
        .replace_all(&snapshot)
        .context("failed to store records")?;
    info!(
        "Load complete: {} players, {} matches, {} performances",
        counts.players, counts.matches, counts.performances
    );
    Ok(counts)
}

pub fn print_load(out: &mut impl Write, counts: &LoadCounts) -> anyhow::Result<()> {
    writeln!(
        out,
        "Loaded {} players, {} matches, {} performance records.",
        counts.players, counts.matches, counts.performances
    )?;
    Ok(())
}

// ---------------------------------------------------------------------------
// summary / report
// ---------------------------------------------------------------------------

pub fn summary(
    out: &mut impl Write,
    analysis: &Analysis,
    threshold: f64,
    as_json: bool,
) -> anyhow::Result<()> {
    let league = analysis.league();
    let high = league.high_performers(threshold);

    if as_json {
        let value = json!({
            "rows": league.rows,
            "high_performer_threshold": threshold,
            "high_performers": high,
        });
        serde_json::to_writer_pretty(&mut *out, &value)?;
        writeln!(out)?;
    } else {
        write!(out, "{}", render::league_summary(&league.rows, &high, threshold))?;
    }
    Ok(())
}

pub fn report(
    out: &mut impl Write,
    analysis: &Analysis,
    player_id: &str,
    as_json: bool,
) -> anyhow::Result<()> {
    let report = analysis
        .player_report(player_id)
        .with_context(|| format!("cannot build report for {player_id}"))?;

    if as_json {
        serde_json::to_writer_pretty(&mut *out, &report)?;
        writeln!(out)?;
    } else {
        write!(out, "{}", render::player_report(&report))?;
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// charts
// ---------------------------------------------------------------------------

/// Print the text charts and, when `plots_dir` is set, write their series as
/// CSV. Returns the written files.
pub fn charts(
    out: &mut impl Write,
    analysis: &Analysis,
    bins: BinSpec,
    player_id: Option<&str>,
    plots_dir: Option<&Path>,
) -> anyhow::Result<Vec<PathBuf>> {
    let per_player = analysis.runs_per_player();
    let distribution = analysis.runs_histogram(bins);

    writeln!(out, "{}", render::runs_per_player_chart(&per_player, render::BAR_WIDTH))?;
    writeln!(out, "{}", render::runs_histogram_chart(&distribution, render::BAR_WIDTH))?;

    let player = match player_id {
        Some(id) => {
            let report = analysis
                .player_report(id)
                .with_context(|| format!("cannot chart runs over time for {id}"))?;
            let points = runs_over_time(&report);
            writeln!(
                out,
                "{}",
                render::runs_over_time_chart(&report.full_name, &points, render::BAR_WIDTH)
            )?;
            Some((id, points))
        }
        None => None,
    };

    let Some(dir) = plots_dir else {
        return Ok(vec![]);
    };
    let series = ChartSeries {
        runs_per_player: &per_player,
        distribution: &distribution,
        runs_over_time: player.as_ref().map(|(id, points)| (*id, points.as_slice())),
    };
    let written = export::write_chart_series(dir, &series)?;
    for path in &written {
        writeln!(out, "Wrote {}", path.display())?;
    }
    Ok(written)
}

// ---------------------------------------------------------------------------
// analyze
// ---------------------------------------------------------------------------

/// Summary, charts and one player's report, all from the same snapshot.
pub fn analyze(
    out: &mut impl Write,
    analysis: &Analysis,
    settings: &Settings,
    player_id: Option<&str>,
) -> anyhow::Result<Vec<PathBuf>> {
    summary(out, analysis, settings.threshold, false)?;
    writeln!(out)?;
    let written = charts(
        out,
        analysis,
        settings.bins,
        player_id,
        Some(&settings.plots_dir),
    )?;
    if let Some(id) = player_id {
        writeln!(out)?;
        report(out, analysis, id, false)?;
    }
    Ok(written)
}

/// Open the database and take the snapshot every read command works from.
pub fn open_analysis(db_path: &str, order: SummaryOrder) -> anyhow::Result<Analysis> {
    let db = Database::open(db_path).with_context(|| format!("failed to open database {db_path}"))?;
    Analysis::run(&db, order).context("analysis failed")
}
