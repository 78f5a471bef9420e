//! Contest cards on the contests page.

use super::{or_default, selector, text_of};
use crate::error::{Result, ScrapeError};
use pitchside_core::{Contest, ContestList, ContestType, MatchId, TeamsJoined};
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::sync::OnceLock;

/// Contest card containers, plain and id-suffixed.
pub const CONTEST_CARD: &str = "div[id^=\"ft-contest-card\"]";
const CARD_ID_PREFIX: &str = "ft-contest-card-";

fn digit_groups() -> &'static Regex {
    static DIGITS: OnceLock<Regex> = OnceLock::new();
    DIGITS.get_or_init(|| Regex::new(r"\d[\d,]*").expect("valid regex"))
}

fn first_number() -> &'static Regex {
    static NUMBER: OnceLock<Regex> = OnceLock::new();
    NUMBER.get_or_init(|| Regex::new(r"\d+\.?\d*").expect("valid regex"))
}

/// True if an ancestor of `el` is itself a card; ids such as
/// `ft-contest-card-header` also match the prefix selector.
fn inside_card(el: ElementRef<'_>, card: &Selector) -> bool {
    el.ancestors()
        .filter_map(ElementRef::wrap)
        .any(|ancestor| card.matches(&ancestor))
}

/// Parse every contest card on the contests page of one match.
pub fn parse_contests(html: &str, match_id: &MatchId) -> Result<ContestList> {
    let document = Html::parse_document(html);
    let card = selector(CONTEST_CARD)?;
    let name = selector(".contestRewampLeftHeader")?;
    let prize = selector("[testid^=\"newContestCardPrizeAmount\"]")?;
    let entry_fee = selector("[testid^=\"entry-fee\"]")?;
    let winners = selector("[testid^=\"newContestnoOfWinners\"]")?;
    let teams_joined = selector("[testid^=\"wc-ps-teams-joined-count\"]")?;
    let progress_bar = selector(".progress-bar")?;

    let mut contests = Vec::new();

    for (index, el) in document
        .select(&card)
        .filter(|el| !inside_card(*el, &card))
        .enumerate()
    {
        let contest_id = el
            .value()
            .attr("contestid")
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(ToString::to_string)
            .or_else(|| {
                el.value()
                    .id()
                    .and_then(|id| id.strip_prefix(CARD_ID_PREFIX))
                    .filter(|id| !id.is_empty())
                    .map(ToString::to_string)
            })
            .unwrap_or_else(|| format!("{match_id}-{index}"));

        let entry_text = text_of(el, &entry_fee);
        let contest_type = if entry_text.eq_ignore_ascii_case("free") {
            ContestType::Practice
        } else {
            ContestType::Cash
        };

        let (total_prize, entry_fee_value) = match contest_type {
            ContestType::Practice => (Contest::PRACTICE_PRIZE.to_string(), "0".to_string()),
            ContestType::Cash => (
                or_default(text_of(el, &prize), "0"),
                or_default(entry_text, "0"),
            ),
        };

        let winners_text = text_of(el, &winners);
        let winners_value = winners_text
            .strip_prefix("Winners :")
            .unwrap_or(&winners_text)
            .trim()
            .to_string();

        let joined_text = text_of(el, &teams_joined);
        let mut groups = digit_groups()
            .find_iter(&joined_text)
            .map(|m| m.as_str().replace(',', ""));
        let current = groups.next().unwrap_or_else(|| "0".to_string());
        let max = groups.next().unwrap_or_else(|| "0".to_string());

        let progress = el
            .select(&progress_bar)
            .next()
            .and_then(|bar| bar.value().attr("style"))
            .and_then(|style| first_number().find(style))
            .map_or_else(|| "0".to_string(), |m| m.as_str().to_string());

        contests.push(Contest {
            contest_id,
            match_id: match_id.clone(),
            name: or_default(text_of(el, &name), "Unnamed Contest"),
            total_prize,
            entry_fee: entry_fee_value,
            winners: or_default(winners_value, "0"),
            teams_joined: TeamsJoined { current, max },
            progress,
            contest_type,
        });
    }

    if contests.is_empty() {
        return Err(ScrapeError::NoDataFound(format!(
            "no contest cards for match {match_id}"
        )));
    }

    Ok(ContestList {
        match_id: match_id.clone(),
        contests,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONTESTS_PAGE: &str = r#"
        <h1>Contests</h1>
        <div id="ft-contest-card-5501" class="contest-card">
            <div class="contestRewampLeftHeader">Mega Contest</div>
            <span testid="newContestCardPrizeAmount-1">₹10,00,000</span>
            <span testid="entry-fee-1">₹49</span>
            <span testid="newContestnoOfWinners-1">Winners : 4,500</span>
            <span testid="wc-ps-teams-joined-count-1">12,345 / 50,000 teams</span>
            <div class="progress-bar" style="width: 24.69%;"></div>
        </div>
        <div id="ft-contest-card" contestid="5502">
            <div class="contestRewampLeftHeader">Beginners Practice</div>
            <span testid="newContestCardPrizeAmount-2">₹500</span>
            <span testid="entry-fee-2">Free</span>
        </div>
        <div id="ft-contest-card">
            <span testid="entry-fee-3">₹10</span>
        </div>
    "#;

    fn match_id() -> MatchId {
        MatchId::new("3001").unwrap()
    }

    #[test]
    fn test_parse_cash_contest() {
        let list = parse_contests(CONTESTS_PAGE, &match_id()).expect("parse should succeed");
        let mega = &list.contests[0];

        assert_eq!(list.contests.len(), 3);
        assert_eq!(mega.contest_id, "5501");
        assert_eq!(mega.name, "Mega Contest");
        assert_eq!(mega.total_prize, "₹10,00,000");
        assert_eq!(mega.entry_fee, "₹49");
        assert_eq!(mega.winners, "4,500");
        assert_eq!(mega.teams_joined.current, "12345");
        assert_eq!(mega.teams_joined.max, "50000");
        assert_eq!(mega.progress, "24.69");
        assert_eq!(mega.contest_type, ContestType::Cash);
    }

    #[test]
    fn test_free_entry_is_practice_contest() {
        let list = parse_contests(CONTESTS_PAGE, &match_id()).unwrap();
        let practice = &list.contests[1];

        assert_eq!(practice.contest_id, "5502");
        assert_eq!(practice.entry_fee, "0");
        assert_eq!(practice.contest_type, ContestType::Practice);
        assert_eq!(practice.total_prize, "Practice Contest");

        let json = serde_json::to_value(practice).unwrap();
        assert_eq!(json["type"], "PRACTICE");
        assert_eq!(json["entryFee"], "0");
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let list = parse_contests(CONTESTS_PAGE, &match_id()).unwrap();
        let bare = &list.contests[2];

        assert_eq!(bare.contest_id, "3001-2");
        assert_eq!(bare.name, "Unnamed Contest");
        assert_eq!(bare.total_prize, "0");
        assert_eq!(bare.winners, "0");
        assert_eq!(bare.teams_joined.current, "0");
        assert_eq!(bare.teams_joined.max, "0");
        assert_eq!(bare.progress, "0");
    }

    #[test]
    fn test_nested_card_ids_are_not_separate_contests() {
        let html = r#"
            <div id="ft-contest-card-7001">
                <div id="ft-contest-card-header">
                    <div class="contestRewampLeftHeader">Head to Head</div>
                </div>
                <span testid="entry-fee-1">₹25</span>
            </div>
            <div id="ft-contest-card-7002">
                <div class="contestRewampLeftHeader">Small League</div>
            </div>
        "#;
        let list = parse_contests(html, &match_id()).unwrap();

        let ids: Vec<&str> = list.contests.iter().map(|c| c.contest_id.as_str()).collect();
        assert_eq!(ids, vec!["7001", "7002"]);
        assert_eq!(list.contests[0].name, "Head to Head");
        assert_eq!(list.contests[0].entry_fee, "₹25");
    }

    #[test]
    fn test_no_cards_is_no_data() {
        let result = parse_contests("<h1>Contests</h1>", &match_id());
        assert!(matches!(result, Err(ScrapeError::NoDataFound(_))));
    }
}
