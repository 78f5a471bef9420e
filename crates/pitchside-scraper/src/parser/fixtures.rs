//! Fixture cards on the lobby tabs.

use super::{or_default, selector, text_of};
use crate::error::{Result, ScrapeError};
use pitchside_core::{Match, MatchId, MatchStatus, Team, TeamPair};
use scraper::Html;
use tracing::warn;

/// Fixture card containers on every lobby tab.
pub const FIXTURE_CARD: &str = "div[id^='ft-fixture-card-new']";

/// Parse the fixture cards of the lobby tab for `status`.
pub fn parse_fixtures(html: &str, status: MatchStatus) -> Result<Vec<Match>> {
    let document = Html::parse_document(html);
    let card = selector(FIXTURE_CARD)?;
    let series = selector(".fixture-card-header")?;
    let team_a = selector("span[testid^='team-a']")?;
    let team_b = selector("span[testid^='team-b']")?;
    let logos = selector("div#ft-team-badge .flag-containerNew img")?;
    let match_time = selector("div[testid^='match-status']")?;

    let mut matches = Vec::new();

    for el in document.select(&card) {
        let Some(raw_id) = el.value().attr("matchid") else {
            warn!("Skipping fixture card without a matchid attribute");
            continue;
        };
        let match_id = match MatchId::new(raw_id.trim()) {
            Ok(id) => id,
            Err(e) => {
                warn!("Skipping fixture card: {}", e);
                continue;
            }
        };

        let logo_srcs: Vec<&str> = el
            .select(&logos)
            .filter_map(|img| img.value().attr("src"))
            .collect();

        matches.push(Match {
            match_id,
            series_name: or_default(text_of(el, &series), "N/A"),
            teams: TeamPair {
                a: Team {
                    name: or_default(text_of(el, &team_a), "N/A"),
                    logo: logo_srcs.first().map(ToString::to_string),
                },
                b: Team {
                    name: or_default(text_of(el, &team_b), "N/A"),
                    logo: logo_srcs.last().map(ToString::to_string),
                },
            },
            match_time: or_default(text_of(el, &match_time), "N/A"),
            status,
        });
    }

    if matches.is_empty() {
        return Err(ScrapeError::NoDataFound(format!(
            "no {status} fixture cards on the lobby page"
        )));
    }

    Ok(matches)
}

#[cfg(test)]
mod tests {
    use super::*;

    const LOBBY: &str = r#"
        <div testid="ft_Tabs_Upcoming"></div>
        <div id="ft-fixture-card-new-1" matchid="1001">
            <div class="fixture-card-header">Big Bash League</div>
            <div id="ft-team-badge">
                <div class="flag-containerNew"><img src="https://cdn.example/six.png"></div>
                <div class="flag-containerNew"><img src="https://cdn.example/heat.png"></div>
            </div>
            <span testid="team-a-name">SYS</span>
            <span testid="team-b-name">BRH</span>
            <div testid="match-status-1">2h 15m</div>
        </div>
        <div id="ft-fixture-card-new-2" matchid="1002">
            <span testid="team-a-name">IND</span>
            <span testid="team-b-name">AUS</span>
        </div>
        <div id="ft-fixture-card-new-3" matchid="../bad">
            <span testid="team-a-name">X</span>
        </div>
    "#;

    #[test]
    fn test_parse_fixture_cards_in_page_order() {
        let matches = parse_fixtures(LOBBY, MatchStatus::Upcoming).expect("parse should succeed");

        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].match_id.as_str(), "1001");
        assert_eq!(matches[0].series_name, "Big Bash League");
        assert_eq!(matches[0].teams.a.name, "SYS");
        assert_eq!(matches[0].teams.b.name, "BRH");
        assert_eq!(
            matches[0].teams.a.logo.as_deref(),
            Some("https://cdn.example/six.png")
        );
        assert_eq!(
            matches[0].teams.b.logo.as_deref(),
            Some("https://cdn.example/heat.png")
        );
        assert_eq!(matches[0].match_time, "2h 15m");
        assert_eq!(matches[0].status, MatchStatus::Upcoming);
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let matches = parse_fixtures(LOBBY, MatchStatus::Live).unwrap();
        let second = &matches[1];
        assert_eq!(second.series_name, "N/A");
        assert_eq!(second.match_time, "N/A");
        assert!(second.teams.a.logo.is_none());
        assert_eq!(second.status, MatchStatus::Live);
    }

    #[test]
    fn test_no_cards_is_no_data() {
        let result = parse_fixtures("<div testid='ft_Tabs_Live'></div>", MatchStatus::Live);
        assert!(matches!(result, Err(ScrapeError::NoDataFound(_))));
    }
}
