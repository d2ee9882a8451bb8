use crate::error::{Result, TabError};
use crate::services::fetch::Fetcher;
use crate::services::store::{Artifact, CsvStore, ManifestEntry};
use crate::services::{results, rounds, table};
use crate::types::{Platform, RoundRecord, RoundResults, SaveOutcome, ScrapeProfile, TabTable};
use serde::{Deserialize, Serialize};
use url::Url;

/// Per-tournament save outcomes, one per artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TournamentSummary {
    pub tournament: String,
    pub motions: SaveOutcome,
    pub speakers: SaveOutcome,
    pub teams: SaveOutcome,
    pub results: SaveOutcome,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchFailure {
    pub tournament: String,
    pub url: String,
    pub error: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub scraped: Vec<TournamentSummary>,
    pub skipped_urls: Vec<String>,
    pub failures: Vec<BatchFailure>,
}

/// Orchestrates fetch -> profile -> extract -> persist. The fetcher is an
/// injected capability so tests run on canned HTML.
pub struct Engine<'a> {
    pub fetcher: &'a dyn Fetcher,
    pub store: &'a CsvStore,
}

impl<'a> Engine<'a> {
    pub fn new(fetcher: &'a dyn Fetcher, store: &'a CsvStore) -> Self {
        Self { fetcher, store }
    }

    pub fn scrape_motions(&self, url: &str) -> Result<Vec<RoundRecord>> {
        let ScrapeProfile::Rounds(selectors) = ScrapeProfile::resolve(url)? else {
            return Err(TabError::InvalidUrl(url.to_string()));
        };
        let html = self.fetcher.fetch(url)?;
        rounds::extract_rounds(url, &html, selectors)
    }

    /// Speaker and team tabs share this one implementation; the page kind is
    /// carried entirely by the URL.
    pub fn scrape_tab(&self, url: &str) -> Result<TabTable> {
        let ScrapeProfile::Tab(selectors) = ScrapeProfile::resolve(url)? else {
            return Err(TabError::InvalidUrl(url.to_string()));
        };
        let html = self.fetcher.fetch(url)?;
        Ok(table::clean_table(table::extract_table(
            url, &html, selectors,
        )?))
    }

    /// All rounds' results reachable from the tournament landing page. No
    /// rounds dropdown means nothing published yet: an empty, valid result.
    pub fn scrape_results(&self, base_url: &str) -> Result<Vec<RoundResults>> {
        if Platform::from_url(base_url).is_none() {
            return Err(TabError::UnsupportedSite(base_url.to_string()));
        }
        let html = self.fetcher.fetch(base_url)?;
        let mut out = Vec::new();
        for link in results::round_links(base_url, &html)? {
            let ScrapeProfile::Tab(selectors) = ScrapeProfile::resolve(&link)? else {
                return Err(TabError::InvalidUrl(link));
            };
            let html = self.fetcher.fetch(&link)?;
            out.push(results::extract_round_results(&link, &html, selectors)?);
        }
        Ok(out)
    }

    pub fn save_motions(&self, tournament: &str, base_url: &str) -> Result<SaveOutcome> {
        if self.store.exists(tournament, Artifact::Motions) {
            return Ok(SaveOutcome::SkippedExisting(
                self.store.path_for(tournament, Artifact::Motions),
            ));
        }
        let url = join_url(base_url, "motions/")?;
        let rounds = self.scrape_motions(&url)?;
        self.store.save_motions(tournament, &rounds)
    }

    pub fn save_speakers(&self, tournament: &str, base_url: &str) -> Result<SaveOutcome> {
        self.save_tab(tournament, base_url, Artifact::Speakers, "tab/speaker/")
    }

    pub fn save_teams(&self, tournament: &str, base_url: &str) -> Result<SaveOutcome> {
        self.save_tab(tournament, base_url, Artifact::Teams, "tab/team/")
    }

    fn save_tab(
        &self,
        tournament: &str,
        base_url: &str,
        artifact: Artifact,
        path: &str,
    ) -> Result<SaveOutcome> {
        if self.store.exists(tournament, artifact) {
            return Ok(SaveOutcome::SkippedExisting(
                self.store.path_for(tournament, artifact),
            ));
        }
        let url = join_url(base_url, path)?;
        let table = self.scrape_tab(&url)?;
        self.store.save_table(tournament, artifact, &table)
    }

    pub fn save_results(&self, tournament: &str, base_url: &str) -> Result<SaveOutcome> {
        if self.store.exists(tournament, Artifact::Results) {
            return Ok(SaveOutcome::SkippedExisting(
                self.store.path_for(tournament, Artifact::Results),
            ));
        }
        let rounds = self.scrape_results(base_url)?;
        self.store.save_results(tournament, &rounds)
    }

    /// Every artifact for one tournament. Existing output files short-circuit
    /// before any fetch happens.
    pub fn scrape_tournament(&self, tournament: &str, base_url: &str) -> Result<TournamentSummary> {
        Ok(TournamentSummary {
            tournament: tournament.to_string(),
            motions: self.save_motions(tournament, base_url)?,
            speakers: self.save_speakers(tournament, base_url)?,
            teams: self.save_teams(tournament, base_url)?,
            results: self.save_results(tournament, base_url)?,
        })
    }

    /// The batch loop: one tournament at a time, one fetch at a time.
    /// Unparsable URLs and unknown platforms are skipped; a failing
    /// tournament is recorded and the batch continues. Never retries.
    pub fn run_manifest(&self, entries: &[ManifestEntry]) -> BatchSummary {
        let mut summary = BatchSummary::default();
        for entry in entries {
            for url in &entry.links {
                if Url::parse(url).is_err() || Platform::from_url(url).is_none() {
                    summary.skipped_urls.push(url.clone());
                    continue;
                }
                match self.scrape_tournament(&entry.tournament, url) {
                    Ok(s) => summary.scraped.push(s),
                    Err(e) => summary.failures.push(BatchFailure {
                        tournament: entry.tournament.clone(),
                        url: url.clone(),
                        error: e.to_string(),
                    }),
                }
            }
        }
        summary
    }
}

fn join_url(base: &str, path: &str) -> Result<String> {
    let base = if base.ends_with('/') {
        base.to_string()
    } else {
        format!("{base}/")
    };
    let parsed = Url::parse(&base).map_err(|_| TabError::InvalidUrl(base.clone()))?;
    let joined = parsed
        .join(path)
        .map_err(|_| TabError::InvalidUrl(format!("{base}{path}")))?;
    Ok(joined.to_string())
}
