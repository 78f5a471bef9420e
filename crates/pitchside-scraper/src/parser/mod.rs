//! HTML parsers, one per page family.
//!
//! Every parser takes the serialized DOM and returns finished records.
//! Missing sub-fields fall back to fixed defaults; a page that parses but
//! holds no entries is a [`ScrapeError::NoDataFound`].

pub mod contests;
pub mod fixtures;
pub mod live;
pub mod roster;
pub mod scoreboard;

pub use contests::parse_contests;
pub use fixtures::parse_fixtures;
pub use live::parse_live_detail;
pub use roster::{has_marker, parse_categories, parse_players};
pub use scoreboard::parse_scoreboard;

use crate::error::{Result, ScrapeError};
use scraper::{ElementRef, Selector};

pub(crate) fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| ScrapeError::Parse(format!("selector '{css}': {e}")))
}

pub(crate) fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

/// Trimmed text of the first match under `element`, empty if none.
pub(crate) fn text_of(element: ElementRef<'_>, selector: &Selector) -> String {
    element
        .select(selector)
        .next()
        .map(element_text)
        .unwrap_or_default()
}

/// Trimmed text of the `index`-th match under `element`, empty if none.
pub(crate) fn nth_text(element: ElementRef<'_>, selector: &Selector, index: usize) -> String {
    element
        .select(selector)
        .nth(index)
        .map(element_text)
        .unwrap_or_default()
}

pub(crate) fn or_default(value: String, default: &str) -> String {
    if value.is_empty() {
        default.to_string()
    } else {
        value
    }
}

/// Names of the first and last `.sc-teamInfoName` under `root`.
pub(crate) fn header_team_names(root: ElementRef<'_>) -> Result<(Option<String>, Option<String>)> {
    let names = selector(".sc-headTeamInfo .sc-teamInfoName")?;
    let found: Vec<String> = root
        .select(&names)
        .map(element_text)
        .filter(|name| !name.is_empty())
        .collect();
    Ok((found.first().cloned(), found.last().cloned()))
}
