// Text rendering for the terminal: tables via comfy-table, charts as
// horizontal bars.

use comfy_table::{CellAlignment, Table};
use crictrack_stats::{DatedRuns, HistogramBin, LeagueRow, PlayerReport, PlayerRuns};
use std::fmt::Write as _;

/// Width in characters of the longest bar in a chart.
pub const BAR_WIDTH: usize = 40;

const BAR_CHAR: char = '#';

// ---------------------------------------------------------------------------
// Number formatting
// ---------------------------------------------------------------------------

/// Two decimals, or `-` when there is no value.
pub fn fmt_average(avg: Option<f64>) -> String {
    match avg {
        Some(v) => format!("{v:.2}"),
        None => "-".to_string(),
    }
}

pub fn fmt_rate(rate: f64) -> String {
    format!("{rate:.2}")
}

fn align_right(table: &mut Table, columns: std::ops::Range<usize>) {
    for idx in columns {
        if let Some(column) = table.column_mut(idx) {
            column.set_cell_alignment(CellAlignment::Right);
        }
    }
}

// ---------------------------------------------------------------------------
// Tables
// ---------------------------------------------------------------------------

/// League batting summary, one row per player in the given order.
pub fn league_table<'a>(rows: impl IntoIterator<Item = &'a LeagueRow>) -> String {
    let mut table = Table::new();
    table.set_header(vec![
        "Player ID", "Name", "Role", "Runs", "Wkts", "Inns", "NO", "Avg", "SR",
    ]);
    for row in rows {
        let s = &row.summary;
        table.add_row(vec![
            s.player_id.clone(),
            row.full_name.clone(),
            row.role.to_string(),
            s.total_runs.to_string(),
            s.total_wickets.to_string(),
            s.innings.to_string(),
            s.total_not_outs.to_string(),
            fmt_average(s.batting_average()),
            fmt_rate(s.strike_rate),
        ]);
    }
    align_right(&mut table, 3..9);
    table.to_string()
}

/// Summary section: the full table followed by the high performers.
pub fn league_summary(rows: &[LeagueRow], high_performers: &[&LeagueRow], threshold: f64) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Batting Summary:");
    if rows.is_empty() {
        let _ = writeln!(out, "  (no performance records)");
    } else {
        let _ = writeln!(out, "{}", league_table(rows));
    }

    let _ = writeln!(
        out,
        "\nHigh performers (more than 1 innings, average above {threshold:.2}):"
    );
    if high_performers.is_empty() {
        let _ = writeln!(out, "  (none)");
    } else {
        let _ = writeln!(out, "{}", league_table(high_performers.iter().copied()));
    }
    out
}

/// Single-player report: identity and totals, then the match-wise breakdown.
pub fn player_report(report: &PlayerReport) -> String {
    let s = &report.summary;
    let mut out = String::new();
    let _ = writeln!(out, "Player Performance Report:");
    let _ = writeln!(out, "  Player ID   : {}", s.player_id);
    let _ = writeln!(out, "  Player Name : {}", report.full_name);
    let _ = writeln!(out, "  Role        : {}", report.role);
    let _ = writeln!(out, "  Total Runs  : {}", s.total_runs);
    let _ = writeln!(out, "  Total Wkts  : {}", s.total_wickets);
    let _ = writeln!(out, "  Innings     : {}", s.innings);
    let _ = writeln!(out, "  Not Outs    : {}", s.total_not_outs);
    let _ = writeln!(out, "  Average     : {}", fmt_average(s.batting_average()));
    let _ = writeln!(out, "  Avg/Innings : {}", fmt_average(s.batting_average_naive));
    let _ = writeln!(out, "  Strike Rate : {}", fmt_rate(s.strike_rate));

    let _ = writeln!(out, "\nMatch-wise Breakdown:");
    if report.breakdown.is_empty() {
        let _ = writeln!(out, "  (no innings)");
        return out;
    }

    let mut table = Table::new();
    table.set_header(vec![
        "Match", "Date", "Opponent", "Runs", "Balls", "Wkts", "Not Out",
    ]);
    for line in &report.breakdown {
        table.add_row(vec![
            line.match_id.clone(),
            line.date.format("%Y-%m-%d").to_string(),
            line.opponent.clone(),
            line.runs.to_string(),
            line.balls_faced.to_string(),
            line.wickets.to_string(),
            if line.not_out { "yes" } else { "no" }.to_string(),
        ]);
    }
    align_right(&mut table, 3..6);
    let _ = writeln!(out, "{table}");
    out
}

// ---------------------------------------------------------------------------
// Charts
// ---------------------------------------------------------------------------

/// Bar length for `value` when `max` gets the full `width`. Non-zero values
/// always get at least one character.
fn bar_len(value: u64, max: u64, width: usize) -> usize {
    if value == 0 || max == 0 {
        return 0;
    }
    let scaled = (value as f64 / max as f64 * width as f64).round() as usize;
    scaled.clamp(1, width)
}

fn bar_rows(title: &str, rows: &[(String, u64)], width: usize) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{title}");
    if rows.is_empty() {
        let _ = writeln!(out, "  (no data)");
        return out;
    }
    let label_w = rows.iter().map(|(l, _)| l.chars().count()).max().unwrap_or(0);
    let max = rows.iter().map(|(_, v)| *v).max().unwrap_or(0);
    for (label, value) in rows {
        let bar: String = std::iter::repeat(BAR_CHAR)
            .take(bar_len(*value, max, width))
            .collect();
        let _ = writeln!(out, "  {label:<label_w$} | {bar} {value}");
    }
    out
}

/// "Total Runs by Player" bar chart.
pub fn runs_per_player_chart(series: &[PlayerRuns], width: usize) -> String {
    let rows: Vec<(String, u64)> = series
        .iter()
        .map(|p| (p.full_name.clone(), p.total_runs))
        .collect();
    bar_rows("Total Runs by Player", &rows, width)
}

/// "Distribution of Runs per Innings" histogram, overflow bucket last.
pub fn runs_histogram_chart(bins: &[HistogramBin], width: usize) -> String {
    let rows: Vec<(String, u64)> = bins
        .iter()
        .map(|b| (b.label(), b.count as u64))
        .collect();
    bar_rows("Distribution of Runs per Innings", &rows, width)
}

/// One player's runs per innings, oldest first.
pub fn runs_over_time_chart(name: &str, points: &[DatedRuns], width: usize) -> String {
    let rows: Vec<(String, u64)> = points
        .iter()
        .map(|p| {
            (
                format!("{} {}", p.date.format("%Y-%m-%d"), p.match_id),
                u64::from(p.runs),
            )
        })
        .collect();
    bar_rows(&format!("Runs over Time: {name}"), &rows, width)
}
