//! Round Block Extractor.
//!
//! Motions pages are not tabular: each round is a card with a name badge, the
//! motion text, and sometimes a modal info slide.

use crate::error::{Result, TabError};
use crate::selectors::PARAGRAPH;
use crate::services::table::element_text;
use crate::types::{RoundRecord, RoundSelectors};
use scraper::{Html, Selector};

pub fn extract_rounds(url: &str, html: &str, selectors: &RoundSelectors) -> Result<Vec<RoundRecord>> {
    let doc = Html::parse_document(html);
    let container = Selector::parse(selectors.container).expect("valid profile container selector");
    let round_name =
        Selector::parse(selectors.round_name).expect("valid profile round name selector");
    let motion = Selector::parse(selectors.motion).expect("valid profile motion selector");
    let info_panel =
        Selector::parse(selectors.info_panel).expect("valid profile info panel selector");

    let mut out = Vec::new();
    for (index, block) in doc.select(&container).enumerate() {
        // A nameless round card means the profile does not fit this page.
        let round = block
            .select(&round_name)
            .next()
            .map(|el| element_text(&el))
            .ok_or(TabError::MissingRoundName {
                url: url.to_string(),
                index,
            })?;

        // No motion text is valid: motions are released round by round.
        let motion = block
            .select(&motion)
            .next()
            .map(|el| element_text(&el))
            .unwrap_or_default();

        let info_slide = block
            .select(&info_panel)
            .next()
            .map(|panel| {
                panel
                    .select(&PARAGRAPH)
                    .map(|p| element_text(&p))
                    .collect::<Vec<_>>()
                    .join("\n")
            })
            .unwrap_or_default();

        out.push(RoundRecord {
            round,
            motion,
            info_slide,
        });
    }
    Ok(out)
}
