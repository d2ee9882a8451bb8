use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum LogLevel {
    Info,
    Error,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    pub level: LogLevel,
    pub tournament: Option<String>,
    pub event: String,
    pub details: Option<String>,
}

/// Append-only activity log under the user's home directory, one line per
/// scrape/stats operation.
pub struct ActivityLogger {
    log_path: PathBuf,
}

impl ActivityLogger {
    pub fn new() -> crate::Result<Self> {
        let user_dirs = directories::UserDirs::new().ok_or_else(|| {
            std::io::Error::other("could not determine home directory")
        })?;
        let dir = user_dirs.home_dir().join(".tabscrape");
        fs::create_dir_all(&dir)?;
        Ok(Self {
            log_path: dir.join("activity.log"),
        })
    }

    /// Logger writing to an explicit path; used by tests.
    pub fn at(log_path: impl Into<PathBuf>) -> Self {
        Self {
            log_path: log_path.into(),
        }
    }

    pub fn log(
        &self,
        level: LogLevel,
        tournament: Option<&str>,
        event: &str,
        details: Option<&str>,
    ) -> crate::Result<()> {
        let entry = LogEntry {
            timestamp: Utc::now(),
            level,
            tournament: tournament.map(|t| t.to_string()),
            event: event.to_string(),
            details: details.map(|d| d.to_string()),
        };

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_path)?;
        writeln!(file, "{}", serde_json::to_string(&entry).map_err(std::io::Error::other)?)?;
        Ok(())
    }

    pub fn info(
        &self,
        tournament: Option<&str>,
        event: &str,
        details: Option<&str>,
    ) -> crate::Result<()> {
        self.log(LogLevel::Info, tournament, event, details)
    }

    pub fn error(
        &self,
        tournament: Option<&str>,
        event: &str,
        details: Option<&str>,
    ) -> crate::Result<()> {
        self.log(LogLevel::Error, tournament, event, details)
    }

    /// Recorded entries, most recent first. Unreadable lines are skipped so a
    /// damaged log never blocks an operation.
    pub fn read_entries(&self, tournament_filter: Option<&str>) -> crate::Result<Vec<LogEntry>> {
        if !self.log_path.exists() {
            return Ok(vec![]);
        }
        let reader = BufReader::new(fs::File::open(&self.log_path)?);
        let mut entries = Vec::new();
        for line in reader.lines() {
            let line = line?;
            let Ok(entry) = serde_json::from_str::<LogEntry>(&line) else {
                continue;
            };
            if let Some(filter) = tournament_filter {
                if entry.tournament.as_deref() != Some(filter) {
                    continue;
                }
            }
            entries.push(entry);
        }
        entries.reverse();
        Ok(entries)
    }
}
