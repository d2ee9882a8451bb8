//! Results scraping and the ranking-string normalizer.
//!
//! A results page is one table per round: each row is one team in one room,
//! keyed by the adjudicator panel. Rooms consolidate into [`DebateRoom`]s
//! ranked by score. The rankings column persists in a legacy bracketed shape
//! (`['3 Team A (OG)', ...]`) which [`parse_rankings`] reads back for
//! aggregation.

use crate::error::{Result, TabError};
use crate::selectors::{
    ADJUDICATOR_CELL, BODY_ROWS, CELLS, DROPDOWN_ITEM, ROUNDS_DROPDOWN, SMALL, TOOLTIP_TRIGGER,
};
use crate::services::table::{element_text, find_table, header_names};
use crate::types::{DebateRoom, Position, RankingEntry, RoundResults, TableSelectors};
use scraper::Html;
use url::Url;

/// Discovers the per-round results links from the rounds dropdown on a
/// tournament's landing page. No dropdown means no published results yet,
/// a valid empty outcome.
pub fn round_links(base_url: &str, html: &str) -> Result<Vec<String>> {
    let base = Url::parse(base_url).map_err(|_| TabError::InvalidUrl(base_url.to_string()))?;
    let doc = Html::parse_document(html);
    let menu = match doc.select(&ROUNDS_DROPDOWN).next() {
        Some(menu) => menu,
        None => return Ok(Vec::new()),
    };
    let mut links = Vec::new();
    for item in menu.select(&DROPDOWN_ITEM) {
        if let Some(href) = item.value().attr("href") {
            if let Ok(joined) = base.join(href) {
                links.push(joined.to_string());
            }
        }
    }
    Ok(links)
}

/// Extracts every room of one round's results table.
pub fn extract_round_results(
    url: &str,
    html: &str,
    selectors: &TableSelectors,
) -> Result<RoundResults> {
    let doc = Html::parse_document(html);
    let table =
        find_table(&doc, selectors).ok_or_else(|| TabError::MissingTable(url.to_string()))?;
    let headers = header_names(&table);

    // Insertion order is room order on the page.
    let mut rooms: Vec<(String, Vec<RankingEntry>)> = Vec::new();
    for (index, tr) in table.select(&BODY_ROWS).enumerate() {
        let Some(panel) = panel_name(&tr) else {
            // Rows without an adjudicator (byes, header repeats) carry no room.
            continue;
        };
        let entry = ranking_entry(url, index, &tr, &headers)?;
        match rooms.iter_mut().find(|(name, _)| *name == panel) {
            Some((_, entries)) => entries.push(entry),
            None => rooms.push((panel, vec![entry])),
        }
    }

    let rooms = rooms
        .into_iter()
        .map(|(panel, entries)| DebateRoom::new(panel, entries))
        .collect::<Result<Vec<_>>>()?;

    Ok(RoundResults {
        round: round_name(&doc),
        rooms,
    })
}

fn round_name(doc: &Html) -> String {
    let text = doc
        .select(&SMALL)
        .next()
        .map(|el| element_text(&el))
        .unwrap_or_default();
    match text.strip_prefix("for ") {
        Some(stripped) => stripped.to_string(),
        None => text,
    }
}

fn panel_name(tr: &scraper::ElementRef<'_>) -> Option<String> {
    let cell = tr
        .select(&ADJUDICATOR_CELL)
        .next()
        .or_else(|| tr.select(&CELLS).find(|td| td.html().contains("adj")))?;
    let name = element_text(&cell.select(&TOOLTIP_TRIGGER).next()?);
    if name.is_empty() {
        None
    } else {
        Some(name)
    }
}

fn ranking_entry(
    url: &str,
    index: usize,
    tr: &scraper::ElementRef<'_>,
    headers: &[String],
) -> Result<RankingEntry> {
    let cells: Vec<scraper::ElementRef<'_>> = tr.select(&CELLS).collect();
    let team = span_text(&cells, headers, "Team", url, index)?;
    let side = span_text(&cells, headers, "Side", url, index)?;
    let result = span_text(&cells, headers, "Result", url, index)?;

    let rank: i64 = result.parse().map_err(|_| TabError::MalformedRow {
        url: url.to_string(),
        index,
        reason: format!("Result {result:?} is not an integer"),
    })?;
    let position = Position::from_code(&side_code(&side))?;

    Ok(RankingEntry {
        // Ranks count from 1st place; scores are points, 1st of four = 3.
        score: rank - 1,
        team,
        position,
    })
}

fn span_text(
    cells: &[scraper::ElementRef<'_>],
    headers: &[String],
    column: &str,
    url: &str,
    index: usize,
) -> Result<String> {
    let malformed = |reason: String| TabError::MalformedRow {
        url: url.to_string(),
        index,
        reason,
    };
    let col = headers
        .iter()
        .position(|h| h == column)
        .ok_or_else(|| malformed(format!("table has no {column} column")))?;
    let cell = cells
        .get(col)
        .ok_or_else(|| malformed(format!("row has no cell for {column}")))?;
    let span = cell
        .select(&crate::selectors::SPAN)
        .next()
        .ok_or_else(|| malformed(format!("{column} cell has no label element")))?;
    Ok(element_text(&span))
}

/// Abbreviates a side label to its position code: first letter of each of the
/// first two words ("Opening Government" -> "OG", "Negative" -> "N").
fn side_code(side: &str) -> String {
    side.split_whitespace()
        .take(2)
        .filter_map(|word| word.chars().next())
        .collect()
}

/// Tokenizer for the legacy rankings string, grammar
/// `'[' entry (', ' entry)* ']'` with single-quoted entries of the shape
/// `<score> <team name> (<position code>)`. Fails explicitly on structural
/// damage instead of slicing blind. Listed order is rank order and is
/// preserved.
pub fn parse_rankings(input: &str) -> Result<Vec<RankingEntry>> {
    let malformed = |reason: &str| TabError::MalformedRanking {
        input: input.to_string(),
        reason: reason.to_string(),
    };
    let inner = input
        .strip_prefix("['")
        .ok_or_else(|| malformed("expected leading ['"))?
        .strip_suffix("']")
        .ok_or_else(|| malformed("expected trailing ']"))?;

    let mut entries = Vec::new();
    for entry in inner.split("', '") {
        let (body, code) = entry
            .rsplit_once(" (")
            .ok_or_else(|| malformed("entry has no position code"))?;
        let code = code
            .strip_suffix(')')
            .ok_or_else(|| malformed("unterminated position code"))?;
        let (score, team) = body
            .split_once(' ')
            .ok_or_else(|| malformed("entry has no team name"))?;
        let score: i64 = score
            .parse()
            .map_err(|_| malformed("score is not an integer"))?;
        if team.trim().is_empty() {
            return Err(malformed("empty team name"));
        }
        entries.push(RankingEntry {
            score,
            team: team.to_string(),
            position: Position::from_code(code)?,
        });
    }
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const RESULTS: TableSelectors = TableSelectors {
        table: "div.table-responsive-md",
        fallback: Some("table.table-responsive-md"),
    };

    const URL: &str = "https://hhiv2020.calicotab.com/hhiv2020/results/round/1/";

    fn team_row(team: &str, side: &str, result: u32, adj: &str) -> String {
        format!(
            r#"<tr>
              <td><span>{team}</span></td>
              <td><span>{side}</span></td>
              <td><span>{result}</span></td>
              <td class="adjudicator-name"><span class="tooltip-trigger">{adj}</span></td>
            </tr>"#
        )
    }

    fn results_page(rows: &str) -> String {
        format!(
            r#"<html><body><small>for Round 1</small>
            <div class="table-responsive-md"><table>
              <thead><tr>
                <th><span>Team</span></th><th><span>Side</span></th>
                <th><span>Result</span></th><th><span>Adjudicators</span></th>
              </tr></thead>
              <tbody>{rows}</tbody>
            </table></div></body></html>"#
        )
    }

    #[test]
    fn groups_rows_into_rooms_ranked_descending() {
        let rows = [
            team_row("Alpha", "Opening Government", 2, "Smith"),
            team_row("Beta", "Opening Opposition", 4, "Smith"),
            team_row("Gamma", "Closing Government", 1, "Smith"),
            team_row("Delta", "Closing Opposition", 3, "Smith"),
            team_row("Echo", "Opening Government", 4, "Jones"),
            team_row("Foxtrot", "Opening Opposition", 3, "Jones"),
            team_row("Golf", "Closing Government", 2, "Jones"),
            team_row("Hotel", "Closing Opposition", 1, "Jones"),
        ]
        .join("");
        let round = extract_round_results(URL, &results_page(&rows), &RESULTS).unwrap();

        assert_eq!(round.round, "Round 1");
        assert_eq!(round.rooms.len(), 2);
        assert_eq!(round.rooms[0].panel, "Smith");
        assert_eq!(
            round.rooms[0].rankings_string(),
            "['3 Beta (OO)', '2 Delta (CO)', '1 Alpha (OG)', '0 Gamma (CG)']"
        );
        assert_eq!(round.rooms[1].panel, "Jones");
        assert_eq!(round.rooms[1].entries[0].team, "Echo");
    }

    #[test]
    fn rows_without_adjudicator_are_skipped() {
        let rows = format!(
            r#"<tr><td><span>Bye</span></td><td><span>-</span></td><td><span>-</span></td><td></td></tr>
            {}{}"#,
            team_row("Alpha", "Government", 2, "Smith"),
            team_row("Beta", "Opposition", 1, "Smith"),
        );
        let round = extract_round_results(URL, &results_page(&rows), &RESULTS).unwrap();
        assert_eq!(round.rooms.len(), 1);
        assert_eq!(
            round.rooms[0].rankings_string(),
            "['1 Alpha (P)', '0 Beta (O)']"
        );
    }

    #[test]
    fn finals_scoring_surfaces_as_error() {
        let rows = [
            team_row("Alpha", "Opening Government", 3, "GF panel"),
            team_row("Beta", "Opening Opposition", 2, "GF panel"),
            team_row("Gamma", "Closing Government", 2, "GF panel"),
            team_row("Delta", "Closing Opposition", 2, "GF panel"),
        ]
        .join("");
        let err = extract_round_results(URL, &results_page(&rows), &RESULTS).unwrap_err();
        assert!(matches!(err, TabError::NonStandardScoring { .. }));
    }

    #[test]
    fn round_links_resolve_against_base() {
        let html = r#"<html><body>
          <div class="dropdown-menu" aria-labelledby="roundsDrop">
            <a class="dropdown-item" href="results/round/1/">Round 1</a>
            <a class="dropdown-item" href="/hhiv2020/results/round/2/">Round 2</a>
          </div>
        </body></html>"#;
        let links = round_links("https://hhiv2020.calicotab.com/hhiv2020/", html).unwrap();
        assert_eq!(
            links,
            vec![
                "https://hhiv2020.calicotab.com/hhiv2020/results/round/1/",
                "https://hhiv2020.calicotab.com/hhiv2020/results/round/2/",
            ]
        );
    }

    #[test]
    fn no_rounds_dropdown_is_a_valid_empty_result() {
        let links =
            round_links("https://hhiv2020.calicotab.com/hhiv2020/", "<html></html>").unwrap();
        assert!(links.is_empty());
    }

    #[test]
    fn parse_rankings_preserves_listed_order() {
        let entries =
            parse_rankings("['0 Team A (OG)', '1 Team B (OO)', '2 Team C (CG)', '3 Team D (CO)']")
                .unwrap();
        let scores: Vec<i64> = entries.iter().map(|e| e.score).collect();
        assert_eq!(scores, vec![0, 1, 2, 3]);
        let positions: Vec<Position> = entries.iter().map(|e| e.position).collect();
        assert_eq!(
            positions,
            vec![
                Position::OpeningGov,
                Position::OpeningOpp,
                Position::ClosingGov,
                Position::ClosingOpp,
            ]
        );
        assert_eq!(entries[0].team, "Team A");
    }

    #[test]
    fn parse_rankings_keeps_multiword_team_names() {
        let entries = parse_rankings("['3 St Andrews A (OG)', '2 Trinity B (OO)']").unwrap();
        assert_eq!(entries[0].team, "St Andrews A");
        assert_eq!(entries[1].team, "Trinity B");
    }

    #[test]
    fn parse_rankings_rejects_structural_damage() {
        for bad in [
            "3 Team A (OG)",
            "['3 Team A (OG)'",
            "['Team A (OG)']",
            "['3  (OG)']",
            "['3 Team A OG']",
        ] {
            let err = parse_rankings(bad).unwrap_err();
            assert!(
                matches!(err, TabError::MalformedRanking { .. }),
                "expected malformed for {bad:?}, got {err}"
            );
        }
    }

    #[test]
    fn parse_rankings_reports_unknown_codes() {
        let err = parse_rankings("['3 Team A (ZZ)']").unwrap_err();
        assert!(matches!(err, TabError::UnknownPosition(code) if code == "ZZ"));
    }
}
