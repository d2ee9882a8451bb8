//! Table Row Extractor.
//!
//! Turns a rendered tab table into a [`TabTable`]: column names from the
//! header row, one cleaned value per column per body row. Tabbycat renders
//! the same logical table slightly differently across deployments, so the
//! rules are column-name driven rather than markup driven.

use crate::error::{Result, TabError};
use crate::selectors::{BODY_ROWS, CELLS, HEADER_CELLS, HIDDEN_SPAN, POPOVER_BODY, SPAN};
use crate::types::{TabTable, TableSelectors};
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};

/// Columns holding a per-round score, e.g. `R1`, `R12`.
static ROUND_COLUMN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^R[0-9]+$").expect("valid round column pattern"));

/// Fixed label on the first line of a round-score popover.
const POPOVER_PREFIX: &str = "Teams in debate:";

/// Headers that render the same value twice (a visible and a sort copy);
/// cleaning keeps the last token only.
const COLLAPSE_COLUMNS: &[&str] = &[
    "Rank",
    "Avg",
    "Total",
    "Stdev",
    "Trim",
    "Pts",
    "Spks",
    "1sts",
    "2nds",
    "Points",
    "Total speaker score",
    "Speaker score standard deviation",
    "Number of firsts",
    "Number of seconds",
];

pub fn extract_table(url: &str, html: &str, selectors: &TableSelectors) -> Result<TabTable> {
    let doc = Html::parse_document(html);
    let table =
        find_table(&doc, selectors).ok_or_else(|| TabError::MissingTable(url.to_string()))?;
    let headers = header_names(&table);
    let mut rows = Vec::new();
    for (index, tr) in table.select(&BODY_ROWS).enumerate() {
        rows.push(extract_row(url, index, &tr, &headers)?);
    }
    Ok(TabTable { headers, rows })
}

pub(crate) fn find_table<'a>(doc: &'a Html, selectors: &TableSelectors) -> Option<ElementRef<'a>> {
    let primary = Selector::parse(selectors.table).expect("valid profile table selector");
    if let Some(el) = doc.select(&primary).next() {
        return Some(el);
    }
    let fallback = selectors.fallback?;
    let fallback = Selector::parse(fallback).expect("valid profile fallback selector");
    doc.select(&fallback).next()
}

/// Builds the ordered column-name list. A descriptive `data-original-title`
/// attribute wins over nested label text, because labels are sometimes empty
/// (icon-only headers) or visually duplicated. Cells with neither are
/// skipped. Repeated names keep their first-occurrence position and the
/// repeat gains a numeric suffix, so no column is lost.
pub(crate) fn header_names(table: &ElementRef<'_>) -> Vec<String> {
    let mut headers: Vec<String> = Vec::new();
    for th in table.select(&HEADER_CELLS) {
        let name = match th.value().attr("data-original-title") {
            Some(title) if !title.trim().is_empty() => title.trim().to_string(),
            _ => match th.select(&SPAN).next() {
                Some(span) => {
                    let label = element_text(&span);
                    if label.is_empty() {
                        continue;
                    }
                    label
                }
                None => continue,
            },
        };
        headers.push(unique_name(&headers, name));
    }
    headers
}

fn unique_name(taken: &[String], name: String) -> String {
    if !taken.iter().any(|h| *h == name) {
        return name;
    }
    let mut n = 2;
    loop {
        let candidate = format!("{name} ({n})");
        if !taken.iter().any(|h| *h == candidate) {
            return candidate;
        }
        n += 1;
    }
}

fn extract_row(
    url: &str,
    index: usize,
    tr: &ElementRef<'_>,
    headers: &[String],
) -> Result<Vec<String>> {
    let cells: Vec<ElementRef<'_>> = tr.select(&CELLS).collect();
    if cells.len() < headers.len() {
        return Err(TabError::MalformedRow {
            url: url.to_string(),
            index,
            reason: format!("{} cells for {} columns", cells.len(), headers.len()),
        });
    }

    let mut values = Vec::with_capacity(headers.len());
    for (col, name) in headers.iter().enumerate() {
        let cell = &cells[col];
        let value = if name == "Team" {
            // Team names are cleanest in the nested label span; raw cell text
            // drags in emoji flags and break markup.
            match cell.select(&SPAN).next() {
                Some(span) => element_text(&span),
                None => {
                    return Err(TabError::MalformedRow {
                        url: url.to_string(),
                        index,
                        reason: "Team cell has no label element".to_string(),
                    })
                }
            }
        } else if ROUND_COLUMN.is_match(name) {
            round_cell_value(url, index, cell)?
        } else {
            element_text(cell)
        };
        values.push(value);
    }
    Ok(values)
}

/// A round-score cell either holds plain text, or a hover popover listing the
/// other teams in the debate next to a hidden copy of the visible score.
fn round_cell_value(url: &str, index: usize, cell: &ElementRef<'_>) -> Result<String> {
    let popover = match cell.select(&POPOVER_BODY).next() {
        None => return Ok(element_text(cell)),
        Some(p) => p,
    };
    let ranking = match cell.select(&HIDDEN_SPAN).next() {
        Some(span) => element_text(&span),
        None => {
            return Err(TabError::MalformedRow {
                url: url.to_string(),
                index,
                reason: "round cell has a popover but no summary value".to_string(),
            })
        }
    };
    let mut parts: Vec<String> = popover
        .select(&SPAN)
        .map(|span| element_text(&span))
        .collect();
    if let Some(first) = parts.first_mut() {
        if let Some(stripped) = first.strip_prefix(POPOVER_PREFIX) {
            *first = stripped.trim().to_string();
        }
    }
    parts.push(ranking);
    Ok(parts.join(" "))
}

/// Renames the terse headers some deployments use and collapses duplicated
/// cell values ("1 1" -> "1") in the known numeric columns.
pub fn clean_table(mut table: TabTable) -> TabTable {
    for header in &mut table.headers {
        let renamed = match header.as_str() {
            "Rk" => "Rank",
            "name" => "Debater",
            "team" => "Team",
            "category" | "categories" => "Categories",
            _ => continue,
        };
        *header = renamed.to_string();
    }
    for name in COLLAPSE_COLUMNS {
        let Some(col) = table.column(name) else {
            continue;
        };
        for row in &mut table.rows {
            if let Some(cell) = row.get_mut(col) {
                if let Some(last) = cell.split(' ').next_back() {
                    *cell = last.to_string();
                }
            }
        }
    }
    table
}

pub(crate) fn element_text(el: &ElementRef<'_>) -> String {
    el.text().collect::<String>().trim().to_string()
}
