// CSV ingestion: players.csv, matches.csv, performances.csv.
//
// Produces a `Snapshot` ready to be swapped into the record store with
// `Database::replace_all`. Malformed rows are logged and skipped; no
// cross-file integrity checks are made here.

use crate::config::DataPaths;
use crate::model::{Match, PerformanceRecord, Player, PlayerRole, Snapshot};
use chrono::NaiveDate;
use serde::Deserialize;
use std::io::Read;
use std::path::Path;
use tracing::{info, warn};

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("failed to read file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("CSV error in {path}: {source}")]
    Csv { path: String, source: csv::Error },

    #[error("{path} has no '{column}' column")]
    MissingColumn { path: String, column: &'static str },
}

/// Reader-level failure; the path wrappers attach the file name.
#[derive(Debug)]
enum ReadError {
    Csv(csv::Error),
    MissingColumn(&'static str),
}

impl From<csv::Error> for ReadError {
    fn from(e: csv::Error) -> Self {
        ReadError::Csv(e)
    }
}

// ---------------------------------------------------------------------------
// Raw CSV serde structs (private)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct RawPlayer {
    player_id: String,
    full_name: String,
    #[serde(default)]
    role: String,
}

#[derive(Debug, Deserialize)]
struct RawMatch {
    match_id: String,
    date: String,
    #[serde(default)]
    opponent: String,
}

#[derive(Debug, Deserialize)]
struct RawPerformance {
    perf_id: i64,
    player_id: String,
    match_id: String,
    runs: u32,
    balls_faced: u32,
    #[serde(default)]
    wickets: u32,
    #[serde(default)]
    not_out: String,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Parse a not-out flag. An empty cell means the batter was dismissed.
fn parse_not_out(s: &str) -> Option<bool> {
    match s.trim().to_lowercase().as_str() {
        "1" | "true" | "t" | "yes" | "y" => Some(true),
        "" | "0" | "false" | "f" | "no" | "n" => Some(false),
        _ => None,
    }
}

const PLAYER_COLUMNS: &[&str] = &["player_id", "full_name"];
const MATCH_COLUMNS: &[&str] = &["match_id", "date"];
const PERFORMANCE_COLUMNS: &[&str] = &["perf_id", "player_id", "match_id", "runs", "balls_faced"];

/// Open a trimming CSV reader over a header that carries every column in
/// `required`.
fn csv_reader<R: Read>(rdr: R, required: &[&'static str]) -> Result<csv::Reader<R>, ReadError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(rdr);
    let headers = reader.headers()?;
    if let Some(column) = required
        .iter()
        .find(|column| !headers.iter().any(|h| h == **column))
    {
        return Err(ReadError::MissingColumn(*column));
    }
    Ok(reader)
}

// ---------------------------------------------------------------------------
// Reader-based loaders (private, enable testing without temp files)
// ---------------------------------------------------------------------------

fn load_players_from_reader<R: Read>(rdr: R) -> Result<Vec<Player>, ReadError> {
    let mut reader = csv_reader(rdr, PLAYER_COLUMNS)?;
    let mut players = Vec::new();
    for result in reader.deserialize::<RawPlayer>() {
        match result {
            Ok(raw) => {
                if raw.player_id.is_empty() {
                    warn!("skipping player '{}': empty player_id", raw.full_name);
                    continue;
                }
                players.push(Player {
                    player_id: raw.player_id,
                    full_name: raw.full_name,
                    role: PlayerRole::parse(&raw.role),
                });
            }
            Err(e) => {
                warn!("skipping malformed player row: {}", e);
            }
        }
    }
    Ok(players)
}

fn load_matches_from_reader<R: Read>(rdr: R) -> Result<Vec<Match>, ReadError> {
    let mut reader = csv_reader(rdr, MATCH_COLUMNS)?;
    let mut matches = Vec::new();
    for result in reader.deserialize::<RawMatch>() {
        match result {
            Ok(raw) => {
                let Ok(date) = NaiveDate::parse_from_str(&raw.date, "%Y-%m-%d") else {
                    warn!("skipping match '{}': unparseable date '{}'", raw.match_id, raw.date);
                    continue;
                };
                matches.push(Match {
                    match_id: raw.match_id,
                    date,
                    opponent: raw.opponent,
                });
            }
            Err(e) => {
                warn!("skipping malformed match row: {}", e);
            }
        }
    }
    Ok(matches)
}

fn load_performances_from_reader<R: Read>(rdr: R) -> Result<Vec<PerformanceRecord>, ReadError> {
    let mut reader = csv_reader(rdr, PERFORMANCE_COLUMNS)?;
    let mut performances = Vec::new();
    for result in reader.deserialize::<RawPerformance>() {
        match result {
            Ok(raw) => {
                let Some(not_out) = parse_not_out(&raw.not_out) else {
                    warn!(
                        "skipping performance {}: unrecognized not_out value '{}'",
                        raw.perf_id, raw.not_out
                    );
                    continue;
                };
                performances.push(PerformanceRecord {
                    perf_id: raw.perf_id,
                    player_id: raw.player_id,
                    match_id: raw.match_id,
                    runs: raw.runs,
                    balls_faced: raw.balls_faced,
                    wickets: raw.wickets,
                    not_out,
                });
            }
            Err(e) => {
                warn!("skipping malformed performance row: {}", e);
            }
        }
    }
    Ok(performances)
}

// ---------------------------------------------------------------------------
// Public path-based loaders
// ---------------------------------------------------------------------------

fn open(path: &Path) -> Result<std::fs::File, IngestError> {
    std::fs::File::open(path).map_err(|e| IngestError::Io {
        path: path.display().to_string(),
        source: e,
    })
}

fn read_error(path: &Path) -> impl FnOnce(ReadError) -> IngestError + '_ {
    move |e| {
        let path = path.display().to_string();
        match e {
            ReadError::Csv(source) => IngestError::Csv { path, source },
            ReadError::MissingColumn(column) => IngestError::MissingColumn { path, column },
        }
    }
}

/// Load the roster from a players CSV file.
pub fn load_players(path: &Path) -> Result<Vec<Player>, IngestError> {
    load_players_from_reader(open(path)?).map_err(read_error(path))
}

/// Load fixtures from a matches CSV file.
pub fn load_matches(path: &Path) -> Result<Vec<Match>, IngestError> {
    load_matches_from_reader(open(path)?).map_err(read_error(path))
}

/// Load per-innings records from a performances CSV file.
pub fn load_performances(path: &Path) -> Result<Vec<PerformanceRecord>, IngestError> {
    load_performances_from_reader(open(path)?).map_err(read_error(path))
}

/// Load all three CSV files into one snapshot. Header-only files are valid
/// and produce empty record sets; a file without a header is not.
pub fn load_dataset(paths: &DataPaths) -> Result<Snapshot, IngestError> {
    let players = load_players(Path::new(&paths.players))?;
    let matches = load_matches(Path::new(&paths.matches))?;
    let performances = load_performances(Path::new(&paths.performances))?;

    info!(
        "Read {} players, {} matches, {} performance records from CSV",
        players.len(),
        matches.len(),
        performances.len()
    );

    Ok(Snapshot::new(players, matches, performances))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // -- Players --

    #[test]
    fn players_csv_roundtrip() {
        let csv_data = "\
player_id,full_name,role
P001,A. Sharma,batter
P002,R. Khan,Bowler";

        let players = load_players_from_reader(csv_data.as_bytes()).unwrap();
        assert_eq!(players.len(), 2);
        assert_eq!(players[0].player_id, "P001");
        assert_eq!(players[0].full_name, "A. Sharma");
        assert_eq!(players[0].role, PlayerRole::Batter);
        assert_eq!(players[1].role, PlayerRole::Bowler);
    }

    #[test]
    fn players_fields_trimmed_and_extra_columns_ignored() {
        let csv_data = "\
player_id,full_name,role,batting_hand
  P001  ,  A. Sharma  , all-rounder ,right";

        let players = load_players_from_reader(csv_data.as_bytes()).unwrap();
        assert_eq!(players.len(), 1);
        assert_eq!(players[0].player_id, "P001");
        assert_eq!(players[0].full_name, "A. Sharma");
        assert_eq!(players[0].role, PlayerRole::AllRounder);
    }

    #[test]
    fn player_with_empty_id_skipped() {
        let csv_data = "\
player_id,full_name,role
,Nobody,batter
P001,A. Sharma,batter";

        let players = load_players_from_reader(csv_data.as_bytes()).unwrap();
        assert_eq!(players.len(), 1);
        assert_eq!(players[0].player_id, "P001");
    }

    // -- Matches --

    #[test]
    fn matches_csv_parses_iso_dates() {
        let csv_data = "\
match_id,date,opponent
M1,2024-03-01,Strikers
M2,2024-03-09,Rovers";

        let matches = load_matches_from_reader(csv_data.as_bytes()).unwrap();
        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].date, NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
        assert_eq!(matches[1].opponent, "Rovers");
    }

    #[test]
    fn match_with_bad_date_skipped() {
        let csv_data = "\
match_id,date,opponent
M1,01/03/2024,Strikers
M2,2024-03-09,Rovers";

        let matches = load_matches_from_reader(csv_data.as_bytes()).unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].match_id, "M2");
    }

    // -- Performances --

    #[test]
    fn performances_csv_roundtrip() {
        let csv_data = "\
perf_id,player_id,match_id,runs,balls_faced,wickets,not_out
1,P001,M1,45,50,0,0
2,P001,M2,30,40,0,1";

        let perfs = load_performances_from_reader(csv_data.as_bytes()).unwrap();
        assert_eq!(perfs.len(), 2);
        assert_eq!(perfs[0].perf_id, 1);
        assert_eq!(perfs[0].runs, 45);
        assert_eq!(perfs[0].balls_faced, 50);
        assert!(!perfs[0].not_out);
        assert!(perfs[1].not_out);
    }

    #[test]
    fn not_out_accepts_boolean_spellings() {
        let csv_data = "\
perf_id,player_id,match_id,runs,balls_faced,wickets,not_out
1,P001,M1,1,1,0,TRUE
2,P001,M1,1,1,0,False
3,P001,M1,1,1,0,yes
4,P001,M1,1,1,0,";

        let perfs = load_performances_from_reader(csv_data.as_bytes()).unwrap();
        let flags: Vec<bool> = perfs.iter().map(|p| p.not_out).collect();
        assert_eq!(flags, vec![true, false, true, false]);
    }

    #[test]
    fn malformed_performance_rows_skipped() {
        let csv_data = "\
perf_id,player_id,match_id,runs,balls_faced,wickets,not_out
1,P001,M1,45,50,0,0
2,P001,M2,-3,40,0,0
3,P001,M3,many,40,0,0
4,P001,M4,12,10,1,maybe
5,P002,M1,8,9,2,1";

        let perfs = load_performances_from_reader(csv_data.as_bytes()).unwrap();
        let ids: Vec<i64> = perfs.iter().map(|p| p.perf_id).collect();
        assert_eq!(ids, vec![1, 5]);
        assert_eq!(perfs[1].wickets, 2);
    }

    #[test]
    fn header_only_csv_returns_empty_vec() {
        let csv_data = "perf_id,player_id,match_id,runs,balls_faced,wickets,not_out";
        let perfs = load_performances_from_reader(csv_data.as_bytes()).unwrap();
        assert!(perfs.is_empty());
    }

    #[test]
    fn misnamed_performance_column_is_an_error() {
        let csv_data = "\
perf_id,player_id,match_id,runs,balls,wickets,not_out
1,P001,M1,45,50,0,0
2,P001,M2,30,40,0,1";

        match load_performances_from_reader(csv_data.as_bytes()) {
            Err(ReadError::MissingColumn(column)) => assert_eq!(column, "balls_faced"),
            other => panic!("expected missing balls_faced column, got: {other:?}"),
        }
    }

    #[test]
    fn optional_columns_may_be_absent() {
        let csv_data = "\
perf_id,player_id,match_id,runs,balls_faced
1,P001,M1,45,50";

        let perfs = load_performances_from_reader(csv_data.as_bytes()).unwrap();
        assert_eq!(perfs.len(), 1);
        assert_eq!(perfs[0].wickets, 0);
        assert!(!perfs[0].not_out);

        let players = load_players_from_reader("player_id,full_name\nP001,A. Sharma".as_bytes()).unwrap();
        assert_eq!(players[0].role, PlayerRole::parse(""));
    }

    #[test]
    fn file_without_header_is_an_error() {
        assert!(matches!(
            load_players_from_reader("".as_bytes()),
            Err(ReadError::MissingColumn("player_id"))
        ));
        assert!(matches!(
            load_matches_from_reader("match_id,opponent\nM1,Strikers".as_bytes()),
            Err(ReadError::MissingColumn("date"))
        ));
    }

    // -- Paths --

    #[test]
    fn missing_column_names_the_file() {
        let tmp = std::env::temp_dir().join("ingest_test_missing_column");
        let _ = std::fs::remove_dir_all(&tmp);
        std::fs::create_dir_all(&tmp).unwrap();
        let path = tmp.join("performances.csv");
        std::fs::write(
            &path,
            "perf_id,player_id,match_id,runs,balls,wickets,not_out\n1,P001,M1,45,50,0,0\n",
        )
        .unwrap();

        match load_performances(&path).unwrap_err() {
            IngestError::MissingColumn { path, column } => {
                assert!(path.ends_with("performances.csv"));
                assert_eq!(column, "balls_faced");
            }
            other => panic!("expected MissingColumn error, got: {other}"),
        }

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = load_players(Path::new("definitely/not/here/players.csv")).unwrap_err();
        match err {
            IngestError::Io { path, .. } => assert!(path.ends_with("players.csv")),
            other => panic!("expected Io error, got: {other}"),
        }
    }

    #[test]
    fn load_dataset_from_files() {
        let tmp = std::env::temp_dir().join("ingest_test_dataset");
        let _ = std::fs::remove_dir_all(&tmp);
        std::fs::create_dir_all(&tmp).unwrap();

        std::fs::write(
            tmp.join("players.csv"),
            "player_id,full_name,role\nP001,A. Sharma,batter\n",
        )
        .unwrap();
        std::fs::write(
            tmp.join("matches.csv"),
            "match_id,date,opponent\nM1,2024-03-01,Strikers\n",
        )
        .unwrap();
        std::fs::write(
            tmp.join("performances.csv"),
            "perf_id,player_id,match_id,runs,balls_faced,wickets,not_out\n1,P001,M1,45,50,0,0\n",
        )
        .unwrap();

        let paths = DataPaths {
            players: tmp.join("players.csv").display().to_string(),
            matches: tmp.join("matches.csv").display().to_string(),
            performances: tmp.join("performances.csv").display().to_string(),
        };
        let snapshot = load_dataset(&paths).unwrap();
        assert_eq!(snapshot.players.len(), 1);
        assert_eq!(snapshot.matches.len(), 1);
        assert_eq!(snapshot.performances.len(), 1);

        let _ = std::fs::remove_dir_all(&tmp);
    }
}
