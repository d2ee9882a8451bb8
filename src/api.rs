use crate::engine::{BatchSummary, Engine, TournamentSummary};
use crate::error::Result;
use crate::services::log::ActivityLogger;
use crate::services::store::{read_column, read_manifest, Artifact, CsvStore};
use crate::services::{results, stats};
use crate::types::SaveOutcome;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Instant;

// Helper functions for logging - ignore errors to not break main operations
fn log_info(tournament: Option<&str>, event: &str, details: Option<&str>) -> Result<()> {
    match ActivityLogger::new() {
        Ok(logger) => logger.info(tournament, event, details),
        Err(_) => Ok(()),
    }
}

fn log_error(tournament: Option<&str>, event: &str, details: Option<&str>) -> Result<()> {
    match ActivityLogger::new() {
        Ok(logger) => logger.error(tournament, event, details),
        Err(_) => Ok(()),
    }
}

/* ------------ scraping entrypoints ------------ */

pub fn scrape_tournament(
    engine: &Engine<'_>,
    tournament: &str,
    url: &str,
) -> Result<TournamentSummary> {
    let start_time = Instant::now();
    let result = engine.scrape_tournament(tournament, url);
    let duration = start_time.elapsed();
    match &result {
        Ok(_) => {
            let details = format!("succeeded in {}ms", duration.as_millis());
            let _ = log_info(Some(tournament), "scrape_tournament", Some(&details));
        }
        Err(e) => {
            let details = format!("failed in {}ms: {e}", duration.as_millis());
            let _ = log_error(Some(tournament), "scrape_tournament", Some(&details));
        }
    }
    result
}

pub fn run_manifest(engine: &Engine<'_>, manifest: &Path) -> Result<BatchSummary> {
    let start_time = Instant::now();
    let entries = read_manifest(manifest)?;
    let summary = engine.run_manifest(&entries);
    let details = format!(
        "{} scraped, {} failed, {} skipped in {}ms",
        summary.scraped.len(),
        summary.failures.len(),
        summary.skipped_urls.len(),
        start_time.elapsed().as_millis()
    );
    let _ = log_info(None, "run_manifest", Some(&details));
    Ok(summary)
}

/* ------------ statistics entrypoints ------------ */

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PositionStats {
    pub debates: usize,
    /// [government, opposition], scaled to sum 3. Absent without two-team data.
    pub two_team: Option<[f64; 2]>,
    /// [OG, OO, CG, CO], scaled to sum 6. Absent without four-team data.
    pub four_team: Option<[f64; 4]>,
    pub gov_opp: Option<[f64; 2]>,
    pub opening_closing: Option<[f64; 2]>,
    /// Rows that failed to parse, with file and row context. Reported, never
    /// silently dropped.
    pub warnings: Vec<String>,
}

/// Folds every scraped results file into position-balance statistics.
pub fn position_stats(store: &CsvStore) -> Result<PositionStats> {
    let start_time = Instant::now();
    let mut tally = stats::PositionTally::new();
    let mut warnings = Vec::new();

    for file in store.results_files()? {
        for (index, ranking) in read_column(&file, "Rankings")?.iter().enumerate() {
            match results::parse_rankings(ranking) {
                Ok(entries) => {
                    tally.count_debate();
                    for entry in &entries {
                        tally.add_entry(entry);
                    }
                }
                Err(e) => warnings.push(format!("{}, row {index}: {e}", file.display())),
            }
        }
    }

    let two_team = tally
        .has_two_team()
        .then(|| tally.normalized_two())
        .transpose()?;
    let four_team = tally
        .has_four_team()
        .then(|| tally.normalized_four())
        .transpose()?;
    let gov_opp = tally.has_four_team().then(|| tally.gov_opp()).transpose()?;
    let opening_closing = tally
        .has_four_team()
        .then(|| tally.opening_closing())
        .transpose()?;

    let details = format!(
        "{} debates, {} warnings in {}ms",
        tally.debates(),
        warnings.len(),
        start_time.elapsed().as_millis()
    );
    let _ = log_info(None, "position_stats", Some(&details));

    Ok(PositionStats {
        debates: tally.debates(),
        two_team,
        four_team,
        gov_opp,
        opening_closing,
        warnings,
    })
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordCount {
    pub word: String,
    pub count: usize,
}

/// Motion word frequencies across every scraped motions file.
pub fn word_stats(store: &CsvStore, top: usize) -> Result<Vec<WordCount>> {
    let mut motions = Vec::new();
    for file in store.motions_files()? {
        motions.extend(read_column(&file, "Motion")?);
    }
    let mut freqs = stats::word_frequencies(motions.iter().map(String::as_str));
    freqs.truncate(top);
    let _ = log_info(
        None,
        "word_stats",
        Some(&format!("{} motions", motions.len())),
    );
    Ok(freqs
        .into_iter()
        .map(|(word, count)| WordCount { word, count })
        .collect())
}

/// Derives and writes one tournament's motions tab from its stored Teams and
/// Motions files.
pub fn motions_tab(store: &CsvStore, tournament: &str) -> Result<SaveOutcome> {
    let start_time = Instant::now();
    let result = (|| {
        let teams = store.load_table(tournament, Artifact::Teams)?;
        let motions = store.load_motions(tournament)?;
        let rows = stats::motions_tab(&teams, &motions);
        store.save_motions_tab(tournament, &rows)
    })();
    let duration = start_time.elapsed();
    match &result {
        Ok(_) => {
            let details = format!("succeeded in {}ms", duration.as_millis());
            let _ = log_info(Some(tournament), "motions_tab", Some(&details));
        }
        Err(e) => {
            let details = format!("failed in {}ms: {e}", duration.as_millis());
            let _ = log_error(Some(tournament), "motions_tab", Some(&details));
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{DebateRoom, RoundRecord, RoundResults, TabTable};
    use pretty_assertions::assert_eq;

    fn room(rankings: &str) -> DebateRoom {
        DebateRoom::new(
            "Panel".into(),
            results::parse_rankings(rankings).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn position_stats_reports_bad_rows_and_keeps_going() {
        let dir = tempfile::tempdir().unwrap();
        let store = CsvStore::new(dir.path()).unwrap();
        store
            .save_results(
                "BP Open",
                &[RoundResults {
                    round: "Round 1".into(),
                    rooms: vec![room(
                        "['3 Team A (OG)', '2 Team B (OO)', '1 Team C (CG)', '0 Team D (CO)']",
                    )],
                }],
            )
            .unwrap();
        // A legacy file with one damaged row.
        std::fs::write(
            store.root().join("Legacy - Results.csv"),
            "Round Name,Panel,Rankings\nRound 1,Old,\"['3 Team X (ZZ)']\"\n",
        )
        .unwrap();

        let stats = position_stats(&store).unwrap();
        assert_eq!(stats.debates, 1);
        assert_eq!(stats.four_team, Some([3.0, 2.0, 1.0, 0.0]));
        assert_eq!(stats.two_team, None);
        assert_eq!(stats.warnings.len(), 1);
        assert!(stats.warnings[0].contains("ZZ"));
    }

    #[test]
    fn word_stats_counts_across_files() {
        let dir = tempfile::tempdir().unwrap();
        let store = CsvStore::new(dir.path()).unwrap();
        for (name, motion) in [("A", "The UN should act"), ("B", "The UN should not act")] {
            store
                .save_motions(
                    name,
                    &[RoundRecord {
                        round: "Round 1".into(),
                        motion: motion.into(),
                        info_slide: String::new(),
                    }],
                )
                .unwrap();
        }
        let words = word_stats(&store, 2).unwrap();
        assert_eq!(
            words,
            vec![
                WordCount {
                    word: "act".into(),
                    count: 2
                },
                WordCount {
                    word: "un".into(),
                    count: 2
                },
            ]
        );
    }

    #[test]
    fn motions_tab_joins_stored_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let store = CsvStore::new(dir.path()).unwrap();
        store
            .save_table(
                "T",
                Artifact::Teams,
                &TabTable {
                    headers: vec!["Team".into(), "R1".into()],
                    rows: vec![
                        vec!["Alpha".into(), "Alpha (OG) Beta (OO) Gamma (CG) Delta (CO) 3".into()],
                        vec!["Beta".into(), "Alpha (OG) Beta (OO) Gamma (CG) Delta (CO) 2".into()],
                        vec!["Gamma".into(), "Alpha (OG) Beta (OO) Gamma (CG) Delta (CO) 1".into()],
                        vec!["Delta".into(), "Alpha (OG) Beta (OO) Gamma (CG) Delta (CO) 0".into()],
                    ],
                },
            )
            .unwrap();
        store
            .save_motions(
                "T",
                &[RoundRecord {
                    round: "R1".into(),
                    motion: "THW ban zoos".into(),
                    info_slide: String::new(),
                }],
            )
            .unwrap();

        let outcome = motions_tab(&store, "T").unwrap();
        assert!(matches!(outcome, SaveOutcome::Written(_)));
        let tab = store.load_table("T", Artifact::MotionsTab).unwrap();
        assert_eq!(tab.cell(0, "Position Scores"), Some("3 2 1 0"));
        assert_eq!(tab.cell(0, "Gov"), Some("4"));
        assert_eq!(tab.cell(0, "Closing"), Some("1"));
    }
}
