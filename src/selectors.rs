//! Shared Selectors
//!
//! Markup that looks the same on every profile: table scaffolding, popovers,
//! the rounds dropdown. Page-specific selectors live in [`crate::profile`].

use once_cell::sync::Lazy;
use scraper::Selector;

/// Header cells of a tab table.
pub static HEADER_CELLS: Lazy<Selector> =
    Lazy::new(|| Selector::parse("thead tr th").expect("valid header selector"));

/// Body rows of a tab table.
pub static BODY_ROWS: Lazy<Selector> =
    Lazy::new(|| Selector::parse("tbody tr").expect("valid row selector"));

/// Cells within a body row.
pub static CELLS: Lazy<Selector> = Lazy::new(|| Selector::parse("td").expect("valid td selector"));

pub static SPAN: Lazy<Selector> =
    Lazy::new(|| Selector::parse("span").expect("valid span selector"));

pub static PARAGRAPH: Lazy<Selector> =
    Lazy::new(|| Selector::parse("p").expect("valid p selector"));

/// Hover detail revealed on round-score cells.
pub static POPOVER_BODY: Lazy<Selector> =
    Lazy::new(|| Selector::parse("div.popover-body").expect("valid popover selector"));

/// Hidden sort value carrying the cell's visible summary number.
pub static HIDDEN_SPAN: Lazy<Selector> =
    Lazy::new(|| Selector::parse("span[hidden]").expect("valid hidden span selector"));

/// Adjudicator cell on a results row.
pub static ADJUDICATOR_CELL: Lazy<Selector> =
    Lazy::new(|| Selector::parse("td.adjudicator-name").expect("valid adjudicator selector"));

pub static TOOLTIP_TRIGGER: Lazy<Selector> =
    Lazy::new(|| Selector::parse("span.tooltip-trigger").expect("valid tooltip selector"));

/// The rounds dropdown on a tournament's landing page.
pub static ROUNDS_DROPDOWN: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(r#"div.dropdown-menu[aria-labelledby="roundsDrop"]"#)
        .expect("valid dropdown selector")
});

pub static DROPDOWN_ITEM: Lazy<Selector> =
    Lazy::new(|| Selector::parse("a.dropdown-item").expect("valid dropdown item selector"));

/// Round-name caption on a results page.
pub static SMALL: Lazy<Selector> =
    Lazy::new(|| Selector::parse("small").expect("valid small selector"));
