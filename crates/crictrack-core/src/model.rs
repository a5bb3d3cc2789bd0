// Reference and performance records as held by the record store.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Player role
// ---------------------------------------------------------------------------

/// A player's role in the side. Unrecognized roles are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PlayerRole {
    Batter,
    Bowler,
    AllRounder,
    WicketKeeper,
    Other(String),
}

impl PlayerRole {
    /// Parse a role string.
    ///
    /// Matching is case-insensitive and accepts the common spellings found in
    /// scorecards:
    /// - "batter" / "batsman" / "batting" -> Batter
    /// - "bowler" / "bowling" -> Bowler
    /// - "all-rounder" / "allrounder" / "all_rounder" / "all rounder" -> AllRounder
    /// - "wicket-keeper" / "wicketkeeper" / "keeper" / "wk" -> WicketKeeper
    pub fn parse(s: &str) -> Self {
        let trimmed = s.trim();
        match trimmed.to_lowercase().as_str() {
            "batter" | "batsman" | "batting" => PlayerRole::Batter,
            "bowler" | "bowling" => PlayerRole::Bowler,
            "all-rounder" | "allrounder" | "all_rounder" | "all rounder" => {
                PlayerRole::AllRounder
            }
            "wicket-keeper" | "wicketkeeper" | "wicket_keeper" | "keeper" | "wk" => {
                PlayerRole::WicketKeeper
            }
            _ => PlayerRole::Other(trimmed.to_string()),
        }
    }

    /// Canonical display string for this role.
    pub fn as_str(&self) -> &str {
        match self {
            PlayerRole::Batter => "batter",
            PlayerRole::Bowler => "bowler",
            PlayerRole::AllRounder => "all-rounder",
            PlayerRole::WicketKeeper => "wicket-keeper",
            PlayerRole::Other(s) => s,
        }
    }
}

impl From<String> for PlayerRole {
    fn from(s: String) -> Self {
        PlayerRole::parse(&s)
    }
}

impl From<PlayerRole> for String {
    fn from(role: PlayerRole) -> Self {
        role.as_str().to_string()
    }
}

impl fmt::Display for PlayerRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// Roster entry. Immutable reference data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub player_id: String,
    pub full_name: String,
    pub role: PlayerRole,
}

/// A fixture the side played.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Match {
    pub match_id: String,
    pub date: NaiveDate,
    pub opponent: String,
}

/// One player's innings in one match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PerformanceRecord {
    pub perf_id: i64,
    pub player_id: String,
    pub match_id: String,
    pub runs: u32,
    pub balls_faced: u32,
    pub wickets: u32,
    pub not_out: bool,
}

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

/// An immutable read of the full record store taken at the start of one
/// analysis run. All three sets come from the same point in time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    pub players: Vec<Player>,
    pub matches: Vec<Match>,
    pub performances: Vec<PerformanceRecord>,
}

impl Snapshot {
    pub fn new(
        players: Vec<Player>,
        matches: Vec<Match>,
        performances: Vec<PerformanceRecord>,
    ) -> Self {
        Self {
            players,
            matches,
            performances,
        }
    }

    /// True when the store held no records at all.
    pub fn is_empty(&self) -> bool {
        self.players.is_empty() && self.matches.is_empty() && self.performances.is_empty()
    }
}
