//! Live score page of one match.

use super::{element_text, header_team_names, or_default, selector, text_of};
use crate::error::{Result, ScrapeError};
use pitchside_core::{BatsmanLine, BowlerLine, LiveMatchDetail, LiveSummary, MatchId, TeamPair};
use scraper::Html;

/// Parse the live-contests page of one match.
///
/// Fails with [`ScrapeError::NoDataFound`] when neither team name rendered.
pub fn parse_live_detail(html: &str, match_id: &MatchId) -> Result<LiveMatchDetail> {
    let document = Html::parse_document(html);
    let root = document.root_element();

    let (team_a, team_b) = header_team_names(root)?;
    if team_a.is_none() && team_b.is_none() {
        return Err(ScrapeError::NoDataFound(format!(
            "no team names on the live page of match {match_id}"
        )));
    }

    let title = selector(".sc-headTeamInfo .sc-match-title")?;
    let batsman = selector(".batsmen .batsman")?;
    let bowler = selector(".bowlers .bowler")?;
    let delivery = selector(".score-book .delivery")?;
    let name = selector(".name")?;
    let runs = selector(".runs")?;
    let balls = selector(".ball")?;
    let fours = selector(".fours")?;
    let sixes = selector(".sixes")?;
    let wickets = selector(".wickets")?;
    let maidens = selector(".maidens")?;
    let summary_score = selector(".match-summary .score")?;
    let summary_overs = selector(".match-summary .overs")?;
    let summary_rate = selector(".match-summary .run-rate")?;

    let batsmen = document
        .select(&batsman)
        .filter_map(|row| {
            let player = text_of(row, &name);
            (!player.is_empty()).then(|| BatsmanLine {
                name: player,
                runs: or_default(text_of(row, &runs), "0"),
                balls: or_default(text_of(row, &balls), "0"),
                fours: or_default(text_of(row, &fours), "0"),
                sixes: or_default(text_of(row, &sixes), "0"),
                strike: row.value().classes().any(|class| class == "strike"),
            })
        })
        .collect();

    // On the bowler row `.ball` holds overs
    let bowlers = document
        .select(&bowler)
        .filter_map(|row| {
            let player = text_of(row, &name);
            (!player.is_empty()).then(|| BowlerLine {
                name: player,
                overs: or_default(text_of(row, &balls), "0"),
                maidens: or_default(text_of(row, &maidens), "0"),
                runs: or_default(text_of(row, &runs), "0"),
                wickets: or_default(text_of(row, &wickets), "0"),
            })
        })
        .collect();

    let this_over = document
        .select(&delivery)
        .map(element_text)
        .filter(|token| !token.is_empty())
        .collect();

    Ok(LiveMatchDetail {
        match_id: match_id.clone(),
        title: or_default(text_of(root, &title), "N/A"),
        teams: TeamPair {
            a: team_a.unwrap_or_else(|| "N/A".to_string()),
            b: team_b.unwrap_or_else(|| "N/A".to_string()),
        },
        batsmen,
        bowlers,
        this_over,
        summary: LiveSummary {
            score: or_default(text_of(root, &summary_score), "0/0"),
            overs: or_default(text_of(root, &summary_overs), "0.0"),
            run_rate: or_default(text_of(root, &summary_rate), "0.00"),
        },
    })
}
