//! CSV persistence: one file per (tournament, artifact), plus the manifest
//! reader for batch runs.

use crate::error::{Result, TabError};
use crate::services::stats::MotionsTabRow;
use crate::types::{RoundRecord, RoundResults, SaveOutcome, TabTable};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Artifact {
    Results,
    Motions,
    Speakers,
    Teams,
    MotionsTab,
}

impl Artifact {
    pub fn label(self) -> &'static str {
        match self {
            Artifact::Results => "Results",
            Artifact::Motions => "Motions",
            Artifact::Speakers => "Speakers",
            Artifact::Teams => "Teams",
            Artifact::MotionsTab => "Motions Tab",
        }
    }
}

/// Filesystem store rooted at the scraped-data directory.
///
/// Saves are idempotent: an existing target file means the tournament was
/// already collected, so the save is skipped and the file stays
/// byte-identical. Empty record sets are never written.
pub struct CsvStore {
    root: PathBuf,
}

impl CsvStore {
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_for(&self, tournament: &str, artifact: Artifact) -> PathBuf {
        self.root
            .join(format!("{} - {}.csv", tournament, artifact.label()))
    }

    pub fn exists(&self, tournament: &str, artifact: Artifact) -> bool {
        self.path_for(tournament, artifact).exists()
    }

    pub fn save_motions(&self, tournament: &str, rounds: &[RoundRecord]) -> Result<SaveOutcome> {
        let path = self.path_for(tournament, Artifact::Motions);
        if path.exists() {
            return Ok(SaveOutcome::SkippedExisting(path));
        }
        if rounds.is_empty() {
            return Ok(SaveOutcome::Empty);
        }
        let mut wtr = csv::Writer::from_path(&path)?;
        wtr.write_record(["Round", "Info Slide", "Motion"])?;
        for record in rounds {
            wtr.write_record([&record.round, &record.info_slide, &record.motion])?;
        }
        wtr.flush()?;
        Ok(SaveOutcome::Written(path))
    }

    pub fn save_results(&self, tournament: &str, rounds: &[RoundResults]) -> Result<SaveOutcome> {
        let path = self.path_for(tournament, Artifact::Results);
        if path.exists() {
            return Ok(SaveOutcome::SkippedExisting(path));
        }
        if rounds.iter().all(|r| r.rooms.is_empty()) {
            return Ok(SaveOutcome::Empty);
        }
        let mut wtr = csv::Writer::from_path(&path)?;
        wtr.write_record(["Round Name", "Panel", "Rankings"])?;
        for round in rounds {
            for room in &round.rooms {
                wtr.write_record([&round.round, &room.panel, &room.rankings_string()])?;
            }
        }
        wtr.flush()?;
        Ok(SaveOutcome::Written(path))
    }

    pub fn save_table(
        &self,
        tournament: &str,
        artifact: Artifact,
        table: &TabTable,
    ) -> Result<SaveOutcome> {
        let path = self.path_for(tournament, artifact);
        if path.exists() {
            return Ok(SaveOutcome::SkippedExisting(path));
        }
        if table.is_empty() {
            return Ok(SaveOutcome::Empty);
        }
        let mut wtr = csv::Writer::from_path(&path)?;
        wtr.write_record(&table.headers)?;
        for row in &table.rows {
            wtr.write_record(row)?;
        }
        wtr.flush()?;
        Ok(SaveOutcome::Written(path))
    }

    pub fn save_motions_tab(&self, tournament: &str, rows: &[MotionsTabRow]) -> Result<SaveOutcome> {
        let path = self.path_for(tournament, Artifact::MotionsTab);
        if path.exists() {
            return Ok(SaveOutcome::SkippedExisting(path));
        }
        if rows.is_empty() {
            return Ok(SaveOutcome::Empty);
        }
        let mut wtr = csv::Writer::from_path(&path)?;
        wtr.write_record([
            "Round",
            "Info Slide",
            "Motion",
            "Position Scores",
            "Gov",
            "Opp",
            "Opening",
            "Closing",
        ])?;
        for row in rows {
            let scores = row
                .position_scores
                .iter()
                .map(|s| s.to_string())
                .collect::<Vec<_>>()
                .join(" ");
            let record = [
                row.round.clone(),
                row.info_slide.clone(),
                row.motion.clone(),
                scores,
                row.gov.to_string(),
                row.opp.to_string(),
                row.opening.to_string(),
                row.closing.to_string(),
            ];
            wtr.write_record(&record)?;
        }
        wtr.flush()?;
        Ok(SaveOutcome::Written(path))
    }

    pub fn load_table(&self, tournament: &str, artifact: Artifact) -> Result<TabTable> {
        let path = self.path_for(tournament, artifact);
        let mut rdr = csv::Reader::from_path(&path)?;
        let headers = rdr.headers()?.iter().map(str::to_string).collect();
        let mut rows = Vec::new();
        for record in rdr.records() {
            rows.push(record?.iter().map(str::to_string).collect());
        }
        Ok(TabTable { headers, rows })
    }

    pub fn load_motions(&self, tournament: &str) -> Result<Vec<RoundRecord>> {
        let table = self.load_table(tournament, Artifact::Motions)?;
        let path = self.path_for(tournament, Artifact::Motions);
        let column = |name: &str| {
            table.column(name).ok_or_else(|| TabError::MalformedRow {
                url: path.display().to_string(),
                index: 0,
                reason: format!("motions file has no {name} column"),
            })
        };
        let (round, info, motion) = (column("Round")?, column("Info Slide")?, column("Motion")?);
        Ok(table
            .rows
            .iter()
            .map(|row| RoundRecord {
                round: row.get(round).cloned().unwrap_or_default(),
                info_slide: row.get(info).cloned().unwrap_or_default(),
                motion: row.get(motion).cloned().unwrap_or_default(),
            })
            .collect())
    }

    pub fn results_files(&self) -> Result<Vec<PathBuf>> {
        self.files_with_suffix(" - Results.csv")
    }

    pub fn motions_files(&self) -> Result<Vec<PathBuf>> {
        self.files_with_suffix(" - Motions.csv")
    }

    fn files_with_suffix(&self, suffix: &str) -> Result<Vec<PathBuf>> {
        let mut out = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let path = entry?.path();
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            if name.ends_with(suffix) {
                out.push(path);
            }
        }
        out.sort();
        Ok(out)
    }
}

/// Reads one named column out of a CSV file.
pub fn read_column(path: &Path, column: &str) -> Result<Vec<String>> {
    let mut rdr = csv::Reader::from_path(path)?;
    let col = rdr
        .headers()?
        .iter()
        .position(|h| h == column)
        .ok_or_else(|| TabError::MalformedRow {
            url: path.display().to_string(),
            index: 0,
            reason: format!("file has no {column} column"),
        })?;
    let mut out = Vec::new();
    for record in rdr.records() {
        out.push(record?.get(col).unwrap_or("").to_string());
    }
    Ok(out)
}

/// One manifest row worth scraping: a display name plus its candidate URLs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub tournament: String,
    pub links: Vec<String>,
}

/// Reads the tournament manifest: columns `Date`, `Tournament`, `Event_Link`
/// (whitespace-separated candidate URLs). Rows without a link are skipped and
/// repeated rows dedupe.
pub fn read_manifest(path: &Path) -> Result<Vec<ManifestEntry>> {
    let mut rdr = csv::Reader::from_path(path)?;
    let headers = rdr.headers()?.clone();
    let column = |name: &str| {
        headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| TabError::MalformedRow {
                url: path.display().to_string(),
                index: 0,
                reason: format!("manifest has no {name} column"),
            })
    };
    let (date, tournament, link) = (
        column("Date")?,
        column("Tournament")?,
        column("Event_Link")?,
    );

    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for record in rdr.records() {
        let record = record?;
        let links_field = record.get(link).unwrap_or("").trim();
        if links_field.is_empty() || links_field == "nan" {
            continue;
        }
        let name = format!(
            "{} {}",
            record.get(date).unwrap_or("").trim(),
            record.get(tournament).unwrap_or("").trim()
        );
        if !seen.insert(format!("{name}\x1f{links_field}")) {
            continue;
        }
        out.push(ManifestEntry {
            tournament: name,
            links: links_field.split_whitespace().map(str::to_string).collect(),
        });
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    fn store() -> (tempfile::TempDir, CsvStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = CsvStore::new(dir.path()).unwrap();
        (dir, store)
    }

    fn sample_motions() -> Vec<RoundRecord> {
        vec![RoundRecord {
            round: "Round 1".into(),
            motion: "THW ban zoos".into(),
            info_slide: String::new(),
        }]
    }

    #[test]
    fn second_save_skips_and_leaves_file_byte_identical() {
        let (_dir, store) = store();
        let first = store.save_motions("HHIV 2020", &sample_motions()).unwrap();
        let path = match first {
            SaveOutcome::Written(path) => path,
            other => panic!("expected write, got {other:?}"),
        };
        let before = fs::read(&path).unwrap();

        let second = store
            .save_motions(
                "HHIV 2020",
                &[RoundRecord {
                    round: "Different".into(),
                    motion: "Entirely".into(),
                    info_slide: String::new(),
                }],
            )
            .unwrap();
        assert_eq!(second, SaveOutcome::SkippedExisting(path.clone()));
        assert_eq!(fs::read(&path).unwrap(), before);
    }

    #[test]
    fn empty_results_are_not_written() {
        let (_dir, store) = store();
        let outcome = store.save_results("HHIV 2020", &[]).unwrap();
        assert_eq!(outcome, SaveOutcome::Empty);
        assert!(!store.exists("HHIV 2020", Artifact::Results));
    }

    #[test]
    fn table_round_trips_through_csv() {
        let (_dir, store) = store();
        let table = TabTable {
            headers: vec!["Rank".into(), "Team".into()],
            rows: vec![
                vec!["1".into(), "Alpha".into()],
                vec!["2".into(), "Beta".into()],
            ],
        };
        store
            .save_table("HHIV 2020", Artifact::Teams, &table)
            .unwrap();
        let loaded = store.load_table("HHIV 2020", Artifact::Teams).unwrap();
        assert_eq!(loaded, table);
    }

    #[test]
    fn motions_round_trip_and_artifact_naming() {
        let (_dir, store) = store();
        store.save_motions("HHIV 2020", &sample_motions()).unwrap();
        assert!(store
            .path_for("HHIV 2020", Artifact::Motions)
            .ends_with("HHIV 2020 - Motions.csv"));
        assert_eq!(store.load_motions("HHIV 2020").unwrap(), sample_motions());
    }

    #[test]
    fn file_scan_only_matches_the_artifact() {
        let (_dir, store) = store();
        store.save_motions("A", &sample_motions()).unwrap();
        let rooms = crate::services::results::parse_rankings("['1 Alpha (P)', '0 Beta (O)']")
            .map(|entries| crate::types::DebateRoom::new("Smith".into(), entries).unwrap())
            .unwrap();
        store
            .save_results(
                "A",
                &[RoundResults {
                    round: "Round 1".into(),
                    rooms: vec![rooms],
                }],
            )
            .unwrap();
        assert_eq!(store.results_files().unwrap().len(), 1);
        assert_eq!(store.motions_files().unwrap().len(), 1);
    }

    #[test]
    fn manifest_skips_linkless_rows_and_splits_links() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("manifest.csv");
        let mut f = fs::File::create(&path).unwrap();
        writeln!(f, "Date,Tournament,Event_Link").unwrap();
        writeln!(f, "2020-02-01,HHIV,https://hhiv2020.calicotab.com/hhiv2020/").unwrap();
        writeln!(f, "2020-03-01,Ghost,").unwrap();
        writeln!(f, "2020-04-01,Nan Cup,nan").unwrap();
        writeln!(
            f,
            "2021-07-07,WUDC,https://a.calicotab.com/a/ https://b.herokuapp.com/b/"
        )
        .unwrap();
        drop(f);

        let entries = read_manifest(&path).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].tournament, "2020-02-01 HHIV");
        assert_eq!(entries[1].links.len(), 2);
    }

    #[test]
    fn manifest_without_required_columns_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("manifest.csv");
        fs::write(&path, "Date,Name\n2020,HHIV\n").unwrap();
        assert!(read_manifest(&path).is_err());
    }

    #[test]
    fn read_column_reports_missing_columns() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("x.csv");
        fs::write(&path, "A,B\n1,2\n").unwrap();
        assert_eq!(read_column(&path, "B").unwrap(), vec!["2"]);
        assert!(read_column(&path, "Rankings").is_err());
    }
}
