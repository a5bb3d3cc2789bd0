// Statistics aggregation and reporting engine.
//
// Pipeline: RecordStore snapshot -> summarize -> league / player reports
// -> flat series for the presentation layer. Everything here is pure
// computation over its inputs.

pub mod analysis;
pub mod error;
pub mod report;
pub mod series;
pub mod summary;

pub use analysis::Analysis;
pub use error::{ReferenceKind, StatsError};
pub use report::{
    build_league_report, build_league_report_ordered, build_player_report, InningsLine,
    LeagueReport, LeagueRow, PlayerReport, DEFAULT_HIGH_PERFORMER_THRESHOLD,
};
pub use series::{BinSpec, DatedRuns, HistogramBin, PlayerRuns};
pub use summary::{summarize, PlayerSummary, SummaryOrder};
