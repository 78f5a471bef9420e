//! Full scoreboard with per-innings batting and bowling cards.

use super::{header_team_names, nth_text, or_default, selector, text_of};
use crate::error::{Result, ScrapeError};
use pitchside_core::{Innings, MatchId, Scoreboard, ScorecardBatsman, ScorecardBowler, TeamPair};
use scraper::{ElementRef, Html, Selector};

struct RowSelectors {
    row: Selector,
    name: Selector,
    status: Selector,
    runs: Selector,
    col1: Selector,
    col2: Selector,
}

impl RowSelectors {
    fn new() -> Result<Self> {
        Ok(Self {
            row: selector(".row:not(.header):not(.total)")?,
            name: selector(".col-6 div")?,
            status: selector(".col-6 .status")?,
            runs: selector(".col-1.runs")?,
            col1: selector(".col-1")?,
            col2: selector(".col-2")?,
        })
    }

    fn batsmen(&self, table: ElementRef<'_>) -> Vec<ScorecardBatsman> {
        table
            .select(&self.row)
            .filter_map(|row| {
                let name = text_of(row, &self.name);
                (!name.is_empty()).then(|| ScorecardBatsman {
                    name,
                    status: or_default(text_of(row, &self.status), "Not out"),
                    runs: or_default(text_of(row, &self.runs), "0"),
                    balls: or_default(nth_text(row, &self.col1, 1), "0"),
                    fours: or_default(nth_text(row, &self.col1, 2), "0"),
                    sixes: or_default(nth_text(row, &self.col1, 3), "0"),
                    strike_rate: or_default(text_of(row, &self.col2), "0.00"),
                })
            })
            .collect()
    }

    fn bowlers(&self, table: ElementRef<'_>) -> Vec<ScorecardBowler> {
        table
            .select(&self.row)
            .filter_map(|row| {
                let name = text_of(row, &self.name);
                (!name.is_empty()).then(|| ScorecardBowler {
                    name,
                    overs: or_default(nth_text(row, &self.col1, 0), "0"),
                    maidens: or_default(nth_text(row, &self.col1, 1), "0"),
                    runs: or_default(nth_text(row, &self.col1, 2), "0"),
                    wickets: or_default(nth_text(row, &self.col1, 3), "0"),
                    economy: or_default(text_of(row, &self.col2), "0.00"),
                })
            })
            .collect()
    }
}

/// The element directly after `el`, if it carries `class`.
fn next_with_class<'a>(el: ElementRef<'a>, class: &str) -> Option<ElementRef<'a>> {
    el.next_siblings()
        .find_map(ElementRef::wrap)
        .filter(|next| next.value().classes().any(|c| c == class))
}

/// Parse the scoreboard page of one match.
///
/// Each `.inning-banner` is followed by an `.innings-card`; its first score
/// table lists batsmen and, when there is more than one, its last lists
/// bowlers.
pub fn parse_scoreboard(html: &str, match_id: &MatchId) -> Result<Scoreboard> {
    let document = Html::parse_document(html);
    let container = selector(".page_coninner_autoheight")?;
    let root = document
        .select(&container)
        .next()
        .unwrap_or_else(|| document.root_element());

    let current_score = selector(".text-black-50.small.text-center")?;
    let banner = selector(".inning-banner")?;
    let team_name = selector(".team-name")?;
    let score = selector(".inning-score .score")?;
    let run_rate = selector(".inning-run-rate")?;
    let extras = selector(".row.header .col-2")?;
    let total = selector(".row.total .col-5 span")?;
    let table = selector(".score-table")?;
    let rows = RowSelectors::new()?;

    let (team_a, team_b) = header_team_names(root)?;

    let innings: Vec<Innings> = root
        .select(&banner)
        .map(|el| {
            let card = next_with_class(el, "innings-card");
            let tables: Vec<ElementRef<'_>> =
                card.map(|c| c.select(&table).collect()).unwrap_or_default();

            Innings {
                team_name: or_default(text_of(el, &team_name), "N/A"),
                score: or_default(text_of(el, &score), "0/0"),
                run_rate: or_default(text_of(el, &run_rate), "0.00"),
                extras: or_default(card.map(|c| text_of(c, &extras)).unwrap_or_default(), "0"),
                total: or_default(card.map(|c| text_of(c, &total)).unwrap_or_default(), "0/0"),
                batsmen: tables.first().map(|t| rows.batsmen(*t)).unwrap_or_default(),
                bowlers: if tables.len() > 1 {
                    tables.last().map(|t| rows.bowlers(*t)).unwrap_or_default()
                } else {
                    Vec::new()
                },
            }
        })
        .collect();

    if innings.is_empty() {
        return Err(ScrapeError::NoDataFound(format!(
            "no innings on the scoreboard of match {match_id}"
        )));
    }

    Ok(Scoreboard {
        match_id: match_id.clone(),
        teams: TeamPair {
            a: team_a.unwrap_or_else(|| "N/A".to_string()),
            b: team_b.unwrap_or_else(|| "N/A".to_string()),
        },
        current_score: or_default(text_of(root, &current_score), "N/A"),
        innings,
    })
}
