// Error taxonomy of the analysis core.

use crictrack_core::DataSourceError;
use std::fmt;
use thiserror::Error;

/// Which foreign key of a performance record failed to resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceKind {
    Player,
    Match,
}

impl fmt::Display for ReferenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReferenceKind::Player => f.write_str("player"),
            ReferenceKind::Match => f.write_str("match"),
        }
    }
}

#[derive(Debug, Error)]
pub enum StatsError {
    /// A performance record points at a player (or match) that is not in
    /// the reference set. Fatal to the call that found it.
    #[error("performance record {perf_id} references unknown {kind} `{id}`")]
    ReferentialIntegrity {
        perf_id: i64,
        kind: ReferenceKind,
        id: String,
    },

    /// The requested player id is not in the roster. Matching is exact.
    #[error("player `{0}` not found")]
    NotFound(String),

    /// Reading the record store failed. Never retried here.
    #[error(transparent)]
    DataSource(#[from] DataSourceError),
}
