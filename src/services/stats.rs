//! Aggregation: position score balance, motion word frequency, and the
//! derived per-tournament motions tab.

use crate::error::{Result, TabError};
use crate::types::{DebateRoom, Position, RankingEntry, RoundRecord, TabTable};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Position markers inside a teams-tab round cell, e.g. `(OG)`.
static POSITION_MARK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\([OC][GO]\)").expect("valid position marker pattern"));

/// Fixed English stopword list for motion word frequency. Deliberately keeps
/// negations ("not", "no"): they flip a motion's meaning.
pub const STOPWORDS: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "but", "by", "could", "do", "does", "for", "from",
    "had", "has", "have", "he", "her", "his", "how", "i", "if", "in", "into", "is", "it", "its",
    "of", "on", "or", "our", "she", "should", "so", "some", "such", "than", "that", "the", "their",
    "them", "then", "there", "these", "they", "this", "those", "to", "was", "we", "were", "what",
    "when", "where", "which", "who", "whose", "why", "will", "with", "would", "you", "your",
];

/// Accumulated score totals per speaking position across any number of
/// tournaments. Two-team and four-team formats tally separately.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionTally {
    two: [i64; 2],
    four: [i64; 4],
    debates: usize,
}

impl PositionTally {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_entry(&mut self, entry: &RankingEntry) {
        match entry.position {
            Position::OpeningGov => self.four[0] += entry.score,
            Position::OpeningOpp => self.four[1] += entry.score,
            Position::ClosingGov => self.four[2] += entry.score,
            Position::ClosingOpp => self.four[3] += entry.score,
            Position::Proposition => self.two[0] += entry.score,
            Position::Opposition => self.two[1] += entry.score,
        }
    }

    pub fn add_room(&mut self, room: &DebateRoom) {
        self.debates += 1;
        for entry in &room.entries {
            self.add_entry(entry);
        }
    }

    /// Counts one debate per ranking row read from stored results.
    pub fn count_debate(&mut self) {
        self.debates += 1;
    }

    pub fn debates(&self) -> usize {
        self.debates
    }

    pub fn has_two_team(&self) -> bool {
        self.two.iter().any(|s| *s != 0)
    }

    pub fn has_four_team(&self) -> bool {
        self.four.iter().any(|s| *s != 0)
    }

    /// Two-team buckets scaled to a target sum of 3: one debate awards
    /// win/loss points totalling roughly 3 under the source convention.
    pub fn normalized_two(&self) -> Result<[f64; 2]> {
        let total: i64 = self.two.iter().sum();
        if total == 0 {
            return Err(TabError::NoScores("two-team positions".to_string()));
        }
        Ok(self.two.map(|score| score as f64 * 3.0 / total as f64))
    }

    /// Four-team buckets scaled to a target sum of 6 (3+2+1+0 per room).
    pub fn normalized_four(&self) -> Result<[f64; 4]> {
        let total: i64 = self.four.iter().sum();
        if total == 0 {
            return Err(TabError::NoScores("four-team positions".to_string()));
        }
        Ok(self.four.map(|score| score as f64 * 6.0 / total as f64))
    }

    /// Government vs. opposition bench, each the average of its two
    /// normalized four-team buckets.
    pub fn gov_opp(&self) -> Result<[f64; 2]> {
        let n = self.normalized_four()?;
        Ok([(n[0] + n[2]) / 2.0, (n[1] + n[3]) / 2.0])
    }

    /// Opening vs. closing half, same pairing on the other axis.
    pub fn opening_closing(&self) -> Result<[f64; 2]> {
        let n = self.normalized_four()?;
        Ok([(n[0] + n[1]) / 2.0, (n[2] + n[3]) / 2.0])
    }
}

/// Case-folded, stopword-filtered word counts over motion texts, sorted by
/// count descending with an alphabetical tie-break so output is
/// deterministic.
pub fn word_frequencies<'a, I>(motions: I) -> Vec<(String, usize)>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for text in motions {
        for token in text.split_whitespace() {
            let cleaned: String = token
                .to_lowercase()
                .chars()
                .filter(|c| c.is_alphanumeric())
                .collect();
            if cleaned.is_empty() || STOPWORDS.contains(&cleaned.as_str()) {
                continue;
            }
            *counts.entry(cleaned).or_insert(0) += 1;
        }
    }
    let mut out: Vec<(String, usize)> = counts.into_iter().collect();
    out.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    out
}

/// One row of the derived motions tab.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MotionsTabRow {
    pub round: String,
    pub motion: String,
    pub info_slide: String,
    /// Total score per position [OG, OO, CG, CO] in this round.
    pub position_scores: [i64; 4],
    pub gov: i64,
    pub opp: i64,
    pub opening: i64,
    pub closing: i64,
}

/// Derives per-round position statistics by joining a tournament's motions
/// against its teams tab.
pub fn motions_tab(teams: &TabTable, motions: &[RoundRecord]) -> Vec<MotionsTabRow> {
    motions
        .iter()
        .map(|record| {
            let scores = round_position_scores(teams, &record.round);
            MotionsTabRow {
                round: record.round.clone(),
                motion: record.motion.clone(),
                info_slide: record.info_slide.clone(),
                position_scores: scores,
                gov: scores[0] + scores[2],
                opp: scores[1] + scores[3],
                opening: scores[0] + scores[1],
                closing: scores[2] + scores[3],
            }
        })
        .collect()
}

/// Total score per position [OG, OO, CG, CO] for one round, read from the
/// teams tab. A round cell looks like
/// `"Alpha (OG) Beta (OO) Gamma (CG) Delta (CO) 3"`: the trailing digit is
/// the team's score, and the team's seat is its index among the
/// position-marker splits.
pub fn round_position_scores(teams: &TabTable, round: &str) -> [i64; 4] {
    let mut scores = [0i64; 4];
    let (Some(team_col), Some(round_col)) = (teams.column("Team"), teams.column(round)) else {
        return scores;
    };
    for row in &teams.rows {
        let (Some(team), Some(cell)) = (row.get(team_col), row.get(round_col)) else {
            continue;
        };
        // Teams that sat the round out have no seat in the cell.
        if team.is_empty() || !cell.contains(team.as_str()) {
            continue;
        }
        let Some(score) = cell
            .trim_end()
            .chars()
            .next_back()
            .and_then(|c| c.to_digit(10))
        else {
            continue;
        };
        let mut seats: Vec<&str> = POSITION_MARK.split(cell).map(str::trim).collect();
        // The split tail after the last marker is the score, not a seat.
        seats.pop();
        if let Some(seat) = seats.iter().position(|s| *s == team.as_str()) {
            if seat < 4 {
                scores[seat] += i64::from(score);
            }
        }
    }
    scores
}
