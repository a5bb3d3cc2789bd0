// SQLite record store: players, matches, and per-innings performances.

use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::NaiveDate;
use rusqlite::{params, Connection};
use tracing::{debug, info};

use crate::error::{DataSourceError, QueryContext};
use crate::model::{Match, PerformanceRecord, Player, PlayerRole, Snapshot};
use crate::store::RecordStore;

/// Date format used for the `matches.date` column.
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Row counts written by a load, or currently held by the store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadCounts {
    pub players: usize,
    pub matches: usize,
    pub performances: usize,
}

/// SQLite-backed record store.
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    /// Open (or create) a SQLite database at `path` and ensure all tables
    /// exist. Pass `":memory:"` for an ephemeral in-memory database (useful
    /// for tests).
    pub fn open(path: &str) -> Result<Self, DataSourceError> {
        let conn = Connection::open(path).map_err(|source| DataSourceError::Open {
            path: path.to_string(),
            source,
        })?;

        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA busy_timeout = 5000;
             PRAGMA foreign_keys = ON;",
        )
        .context("set database pragmas")?;

        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS players (
                player_id TEXT PRIMARY KEY,
                full_name TEXT NOT NULL,
                role      TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS matches (
                match_id TEXT PRIMARY KEY,
                date     TEXT NOT NULL,
                opponent TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS performances (
                perf_id     INTEGER PRIMARY KEY,
                player_id   TEXT NOT NULL REFERENCES players(player_id),
                match_id    TEXT NOT NULL REFERENCES matches(match_id),
                runs        INTEGER NOT NULL CHECK (runs >= 0),
                balls_faced INTEGER NOT NULL CHECK (balls_faced >= 0),
                wickets     INTEGER NOT NULL CHECK (wickets >= 0),
                not_out     INTEGER NOT NULL DEFAULT 0
            );

            CREATE INDEX IF NOT EXISTS idx_performances_player_id
                ON performances(player_id);
            ",
        )
        .context("create database schema")?;

        debug!("record store ready at {}", path);

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Acquire the database connection. A poisoned lock still guards a
    /// usable connection: every write goes through a transaction, so a
    /// panicking holder leaves no partial state behind.
    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Replace the entire contents of the store with `data`.
    ///
    /// The old rows are deleted and the new rows inserted inside a single
    /// transaction, so readers see either the previous load or the new one,
    /// never a mix. Any failed insert (e.g. a foreign key violation) rolls the
    /// whole swap back and leaves the previous data in place.
    pub fn replace_all(&self, data: &Snapshot) -> Result<LoadCounts, DataSourceError> {
        let mut conn = self.conn();
        let tx = conn.transaction().context("begin load transaction")?;

        tx.execute("DELETE FROM performances", [])
            .context("clear performances")?;
        tx.execute("DELETE FROM matches", []).context("clear matches")?;
        tx.execute("DELETE FROM players", []).context("clear players")?;

        {
            let mut stmt = tx
                .prepare("INSERT INTO players (player_id, full_name, role) VALUES (?1, ?2, ?3)")
                .context("prepare player insert")?;
            for player in &data.players {
                stmt.execute(params![
                    player.player_id,
                    player.full_name,
                    player.role.as_str()
                ])
                .context("insert player")?;
            }

            let mut stmt = tx
                .prepare("INSERT INTO matches (match_id, date, opponent) VALUES (?1, ?2, ?3)")
                .context("prepare match insert")?;
            for m in &data.matches {
                stmt.execute(params![
                    m.match_id,
                    m.date.format(DATE_FORMAT).to_string(),
                    m.opponent
                ])
                .context("insert match")?;
            }

            let mut stmt = tx
                .prepare(
                    "INSERT INTO performances
                        (perf_id, player_id, match_id, runs, balls_faced, wickets, not_out)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                )
                .context("prepare performance insert")?;
            for perf in &data.performances {
                stmt.execute(params![
                    perf.perf_id,
                    perf.player_id,
                    perf.match_id,
                    perf.runs,
                    perf.balls_faced,
                    perf.wickets,
                    perf.not_out,
                ])
                .context("insert performance")?;
            }
        }

        tx.commit().context("commit load")?;

        let counts = LoadCounts {
            players: data.players.len(),
            matches: data.matches.len(),
            performances: data.performances.len(),
        };
        info!(
            "Loaded {} players, {} matches, {} performance records",
            counts.players, counts.matches, counts.performances
        );
        Ok(counts)
    }

    /// Number of rows currently held in each table.
    pub fn counts(&self) -> Result<LoadCounts, DataSourceError> {
        let conn = self.conn();
        let count = |sql: &str| -> Result<usize, DataSourceError> {
            let n: i64 = conn
                .query_row(sql, [], |row| row.get(0))
                .context("count rows")?;
            Ok(n as usize)
        };
        Ok(LoadCounts {
            players: count("SELECT COUNT(*) FROM players")?,
            matches: count("SELECT COUNT(*) FROM matches")?,
            performances: count("SELECT COUNT(*) FROM performances")?,
        })
    }
}

impl RecordStore for Database {
    fn fetch_players(&self) -> Result<Vec<Player>, DataSourceError> {
        query_players(&self.conn())
    }

    fn fetch_matches(&self) -> Result<Vec<Match>, DataSourceError> {
        query_matches(&self.conn())
    }

    fn fetch_performances(&self) -> Result<Vec<PerformanceRecord>, DataSourceError> {
        query_performances(&self.conn())
    }

    /// Read all three tables inside one transaction so a concurrent
    /// `replace_all` cannot produce a torn read.
    fn snapshot(&self) -> Result<Snapshot, DataSourceError> {
        let mut conn = self.conn();
        let tx = conn.transaction().context("begin snapshot transaction")?;
        let snapshot = Snapshot {
            players: query_players(&tx)?,
            matches: query_matches(&tx)?,
            performances: query_performances(&tx)?,
        };
        tx.commit().context("end snapshot transaction")?;

        debug!(
            "snapshot: {} players, {} matches, {} performances",
            snapshot.players.len(),
            snapshot.matches.len(),
            snapshot.performances.len()
        );
        Ok(snapshot)
    }
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

fn query_players(conn: &Connection) -> Result<Vec<Player>, DataSourceError> {
    let mut stmt = conn
        .prepare("SELECT player_id, full_name, role FROM players ORDER BY player_id")
        .context("prepare players query")?;

    let players = stmt
        .query_map([], |row| {
            let role: String = row.get(2)?;
            Ok(Player {
                player_id: row.get(0)?,
                full_name: row.get(1)?,
                role: PlayerRole::parse(&role),
            })
        })
        .context("query players")?
        .collect::<Result<Vec<_>, _>>()
        .context("map player rows")?;

    Ok(players)
}

fn query_matches(conn: &Connection) -> Result<Vec<Match>, DataSourceError> {
    let mut stmt = conn
        .prepare("SELECT match_id, date, opponent FROM matches ORDER BY match_id")
        .context("prepare matches query")?;

    let rows = stmt
        .query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
            ))
        })
        .context("query matches")?
        .collect::<Result<Vec<_>, _>>()
        .context("map match rows")?;

    rows.into_iter()
        .map(|(match_id, date, opponent)| {
            let date = NaiveDate::parse_from_str(&date, DATE_FORMAT).map_err(|e| {
                DataSourceError::InvalidValue {
                    table: "matches",
                    column: "date",
                    message: format!("match {match_id}: '{date}' is not a YYYY-MM-DD date ({e})"),
                }
            })?;
            Ok(Match {
                match_id,
                date,
                opponent,
            })
        })
        .collect()
}

fn query_performances(conn: &Connection) -> Result<Vec<PerformanceRecord>, DataSourceError> {
    let mut stmt = conn
        .prepare(
            "SELECT perf_id, player_id, match_id, runs, balls_faced, wickets, not_out
             FROM performances ORDER BY perf_id",
        )
        .context("prepare performances query")?;

    let performances = stmt
        .query_map([], |row| {
            Ok(PerformanceRecord {
                perf_id: row.get(0)?,
                player_id: row.get(1)?,
                match_id: row.get(2)?,
                runs: row.get(3)?,
                balls_faced: row.get(4)?,
                wickets: row.get(5)?,
                not_out: row.get(6)?,
            })
        })
        .context("query performances")?
        .collect::<Result<Vec<_>, _>>()
        .context("map performance rows")?;

    Ok(performances)
}
