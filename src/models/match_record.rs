use std::fmt;

use chrono::NaiveDate;
use serde::Serialize;

/// Column names of the CSV export, in order
pub const CSV_HEADER: [&str; 16] = [
    "date",
    "championship",
    "series_id",
    "map_number",
    "hawk_match_id",
    "team1",
    "team2",
    "team1_heroes",
    "team2_heroes",
    "winner",
    "delta",
    "delta_favored_team",
    "team1_odds",
    "team2_odds",
    "game_time_seconds",
    "game_time_minutes",
];

/// Label used when the delta is exactly zero
pub const EVEN_LABEL: &str = "Even";

/// One exported map: listing facts plus the enrichment results
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchRecord {
    pub date: NaiveDate,
    pub championship: String,
    pub series_id: Option<i64>,
    pub map_number: Option<i64>,
    pub match_id: i64,
    pub team1: String,
    pub team2: String,
    pub team1_heroes: Vec<String>,
    pub team2_heroes: Vec<String>,
    pub winner: String,
    pub delta: f64,
    pub favored: String,
    /// Earliest quoted odds, already oriented to team1/team2
    pub odds: Option<OddsObservation>,
    pub game_time: Option<GameClock>,
}

/// A single bookmaker quote for both teams
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OddsObservation {
    pub team1_odds: String,
    pub team2_odds: String,
    pub provider: Option<String>,
    pub created_at: Option<String>,
}

/// Final recorded game time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GameClock {
    pub seconds: u64,
}

impl fmt::Display for GameClock {
    /// `minutes:seconds` with the seconds zero-padded
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{:02}", self.seconds / 60, self.seconds % 60)
    }
}

/// Why a match was left out of the export
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The picks did not split into five heroes per team
    IncompleteRoster { team1: usize, team2: usize },
    /// A picked hero is missing from the hero dataset
    UnknownHero,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::IncompleteRoster { team1, team2 } => {
                write!(f, "incomplete roster ({} vs {} heroes)", team1, team2)
            }
            SkipReason::UnknownHero => write!(f, "unknown hero"),
        }
    }
}

/// Name of the team the delta favors
pub fn favored_label<'a>(delta: f64, team1: &'a str, team2: &'a str) -> &'a str {
    if delta > 0.0 {
        team1
    } else if delta < 0.0 {
        team2
    } else {
        EVEN_LABEL
    }
}

impl MatchRecord {
    /// Flatten into CSV fields matching `CSV_HEADER`
    pub fn to_row(&self) -> [String; 16] {
        let (team1_odds, team2_odds) = match &self.odds {
            Some(o) => (o.team1_odds.clone(), o.team2_odds.clone()),
            None => (String::new(), String::new()),
        };

        [
            self.date.format("%Y-%m-%d").to_string(),
            self.championship.clone(),
            optional(self.series_id),
            optional(self.map_number),
            self.match_id.to_string(),
            self.team1.clone(),
            self.team2.clone(),
            self.team1_heroes.join("|"),
            self.team2_heroes.join("|"),
            self.winner.clone(),
            format!("{:.2}", self.delta),
            self.favored.clone(),
            team1_odds,
            team2_odds,
            optional(self.game_time.map(|c| c.seconds)),
            self.game_time.map(|c| c.to_string()).unwrap_or_default(),
        ]
    }
}

fn optional<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}
