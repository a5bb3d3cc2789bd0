// Record types, the record store accessor, SQLite storage, CSV ingestion,
// and configuration shared by the stats engine and the CLI.

pub mod config;
pub mod db;
pub mod error;
pub mod ingest;
pub mod model;
pub mod store;

pub use error::DataSourceError;
pub use model::{Match, PerformanceRecord, Player, PlayerRole, Snapshot};
pub use store::{InMemoryStore, RecordStore};
