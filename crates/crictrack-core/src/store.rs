// Record store accessor contract.
//
// The analysis core never opens its own connection: it is handed something
// implementing `RecordStore` and reads one `Snapshot` per run.

use crate::error::DataSourceError;
use crate::model::{Match, PerformanceRecord, Player, Snapshot};

/// Read access to the three record sets. Each fetch returns the complete set,
/// ordered by primary key; no filtering is pushed down.
pub trait RecordStore {
    fn fetch_players(&self) -> Result<Vec<Player>, DataSourceError>;

    fn fetch_matches(&self) -> Result<Vec<Match>, DataSourceError>;

    fn fetch_performances(&self) -> Result<Vec<PerformanceRecord>, DataSourceError>;

    /// Read all three sets as one snapshot.
    ///
    /// The default implementation issues the three fetches back to back.
    /// Stores that can be refreshed concurrently must override this so the
    /// three reads observe the same state.
    fn snapshot(&self) -> Result<Snapshot, DataSourceError> {
        Ok(Snapshot {
            players: self.fetch_players()?,
            matches: self.fetch_matches()?,
            performances: self.fetch_performances()?,
        })
    }
}

/// A `RecordStore` over records held in memory. Used for fixtures and for
/// analysing data that never touched the database.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    data: Snapshot,
}

impl InMemoryStore {
    pub fn new(data: Snapshot) -> Self {
        Self { data }
    }
}

impl From<Snapshot> for InMemoryStore {
    fn from(data: Snapshot) -> Self {
        Self::new(data)
    }
}

impl RecordStore for InMemoryStore {
    fn fetch_players(&self) -> Result<Vec<Player>, DataSourceError> {
        Ok(self.data.players.clone())
    }

    fn fetch_matches(&self) -> Result<Vec<Match>, DataSourceError> {
        Ok(self.data.matches.clone())
    }

    fn fetch_performances(&self) -> Result<Vec<PerformanceRecord>, DataSourceError> {
        Ok(self.data.performances.clone())
    }

    fn snapshot(&self) -> Result<Snapshot, DataSourceError> {
        Ok(self.data.clone())
    }
}
