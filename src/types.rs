use crate::error::{Result, TabError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Hosting platform a tab site lives on. Detection is substring-based on the
/// URL because tournaments use throwaway subdomains (`hhiv2020.calicotab.com`,
/// `westerniv.herokuapp.com`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Platform {
    Calicotab,
    Heroku,
}

impl Platform {
    pub fn from_url(url: &str) -> Option<Self> {
        if url.contains("calico") {
            Some(Platform::Calicotab)
        } else if url.contains("heroku") {
            Some(Platform::Heroku)
        } else {
            None
        }
    }
}

/// What a page is expected to contain, inferred from its URL path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PageKind {
    MotionsList,
    MotionStatistics,
    SpeakerTab,
    TeamTab,
    Results,
}

impl PageKind {
    pub fn from_url(url: &str) -> Self {
        if url.contains("motions") {
            if url.contains("statistics") {
                PageKind::MotionStatistics
            } else {
                PageKind::MotionsList
            }
        } else if url.contains("tab/speaker") {
            PageKind::SpeakerTab
        } else if url.contains("tab/team") {
            PageKind::TeamTab
        } else {
            PageKind::Results
        }
    }
}

/// Selector set for motions-style pages built from a list of "round cards".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundSelectors {
    pub container: &'static str,
    pub round_name: &'static str,
    pub motion: &'static str,
    pub info_panel: &'static str,
}

/// Selector set for tabular pages. `fallback` covers deployments where the
/// wrapper div is absent and the class sits on the `<table>` itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableSelectors {
    pub table: &'static str,
    pub fallback: Option<&'static str>,
}

/// Extraction rules chosen per URL. Immutable once selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrapeProfile {
    Rounds(&'static RoundSelectors),
    Tab(&'static TableSelectors),
}

/// One round's motion as published on a motions page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundRecord {
    pub round: String,
    pub motion: String,
    /// Newline-joined info slide paragraphs; empty when no slide was released.
    pub info_slide: String,
}

/// A scraped tab table: ordered column names plus one cell per column per row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TabTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl TabTable {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Cell lookup by column name, behaving as the row's name -> value map.
    pub fn cell(&self, row: usize, name: &str) -> Option<&str> {
        let col = self.column(name)?;
        self.rows.get(row)?.get(col).map(String::as_str)
    }
}

/// Which side of the house a position argues for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Bench {
    Government,
    Opposition,
}

/// Two teams per room (e.g. Australs) or four (British Parliamentary).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DebateFormat {
    TwoTeam,
    FourTeam,
}

/// A team's assigned speaking role within a room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Position {
    OpeningGov,
    OpeningOpp,
    ClosingGov,
    ClosingOpp,
    /// Two-team government bench (codes P, G, A across circuits).
    Proposition,
    /// Two-team opposition bench (codes O, N).
    Opposition,
}

impl Position {
    /// Maps a scraped position code to its canonical role. Codes outside the
    /// known set are an error, never silently dropped.
    pub fn from_code(code: &str) -> Result<Self> {
        match code {
            "OG" => Ok(Position::OpeningGov),
            "OO" => Ok(Position::OpeningOpp),
            "CG" => Ok(Position::ClosingGov),
            "CO" => Ok(Position::ClosingOpp),
            "P" | "G" | "A" => Ok(Position::Proposition),
            "O" | "N" => Ok(Position::Opposition),
            other => Err(TabError::UnknownPosition(other.to_string())),
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Position::OpeningGov => "OG",
            Position::OpeningOpp => "OO",
            Position::ClosingGov => "CG",
            Position::ClosingOpp => "CO",
            Position::Proposition => "P",
            Position::Opposition => "O",
        }
    }

    pub fn bench(&self) -> Bench {
        match self {
            Position::OpeningGov | Position::ClosingGov | Position::Proposition => {
                Bench::Government
            }
            Position::OpeningOpp | Position::ClosingOpp | Position::Opposition => {
                Bench::Opposition
            }
        }
    }

    pub fn format(&self) -> DebateFormat {
        match self {
            Position::Proposition | Position::Opposition => DebateFormat::TwoTeam,
            _ => DebateFormat::FourTeam,
        }
    }
}

/// One team's result within a room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankingEntry {
    pub score: i64,
    pub team: String,
    pub position: Position,
}

impl fmt::Display for RankingEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} ({})", self.score, self.team, self.position.code())
    }
}

/// One judged debate: the adjudicator panel plus its teams ranked by score
/// descending.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DebateRoom {
    pub panel: String,
    pub entries: Vec<RankingEntry>,
}

impl DebateRoom {
    /// Validates room invariants and consolidates entries into rank order
    /// (stable descending by score, ties keep insertion order).
    pub fn new(panel: String, mut entries: Vec<RankingEntry>) -> Result<Self> {
        let format = match entries.first() {
            Some(e) => e.position.format(),
            None => {
                return Err(TabError::NonStandardScoring {
                    room: panel,
                    scores: vec![],
                })
            }
        };
        let expected = match format {
            DebateFormat::TwoTeam => 2,
            DebateFormat::FourTeam => 4,
        };
        let mixed = entries.iter().any(|e| e.position.format() != format);
        let mut positions: Vec<&'static str> =
            entries.iter().map(|e| e.position.code()).collect();
        positions.sort_unstable();
        positions.dedup();
        let mut scores: Vec<i64> = entries.iter().map(|e| e.score).collect();
        scores.sort_unstable();
        let standard: Vec<i64> = (0..expected as i64).collect();
        if mixed || entries.len() != expected || positions.len() != expected || scores != standard
        {
            return Err(TabError::NonStandardScoring {
                room: panel,
                scores: entries.iter().map(|e| e.score).collect(),
            });
        }
        entries.sort_by_key(|e| std::cmp::Reverse(e.score));
        Ok(Self { panel, entries })
    }

    /// Renders the rankings column in its legacy wire shape,
    /// `['3 Team A (OG)', '2 Team B (OO)', ...]`.
    pub fn rankings_string(&self) -> String {
        let parts: Vec<String> = self.entries.iter().map(|e| format!("'{e}'")).collect();
        format!("[{}]", parts.join(", "))
    }
}

/// All rooms of one round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundResults {
    pub round: String,
    pub rooms: Vec<DebateRoom>,
}

/// Outcome of an idempotent save.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SaveOutcome {
    Written(PathBuf),
    /// The target file already exists; treated as already-collected and left
    /// byte-identical.
    SkippedExisting(PathBuf),
    /// Nothing scraped; no file written.
    Empty,
}

/// JSON envelope every CLI command prints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub ok: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            ok: true,
            data: Some(data),
            error: None,
        }
    }
    pub fn err(msg: impl Into<String>) -> Self {
        Self {
            ok: false,
            data: None,
            error: Some(msg.into()),
        }
    }
}
