//! Team-builder page: category tabs and player boxes.

use super::{element_text, selector, text_of};
use crate::error::Result;
use pitchside_core::{PlayerRole, PlayerRosterEntry};
use regex::Regex;
use scraper::Html;
use std::sync::OnceLock;

/// One player on the team-builder page.
pub const PLAYER_BOX: &str = ".player-box";

fn player_id_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"players/(\d+)").expect("valid regex"))
}

fn leading_number_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^\s*[-+]?(\d+\.?\d*|\.\d+)").expect("valid regex"))
}

/// True if any element matches `css`.
pub fn has_marker(html: &str, css: &str) -> Result<bool> {
    let document = Html::parse_document(html);
    let marker = selector(css)?;
    Ok(document.select(&marker).next().is_some())
}

/// `data-filter` tokens of the category tabs under `bar`, in page order.
pub fn parse_categories(html: &str, bar: &str) -> Result<Vec<String>> {
    let document = Html::parse_document(html);
    let items = selector(&format!("{bar} .nav-item[data-filter]"))?;

    let mut categories: Vec<String> = Vec::new();
    for item in document.select(&items) {
        let Some(token) = item.value().attr("data-filter").map(str::trim) else {
            continue;
        };
        if !token.is_empty() && !categories.iter().any(|c| c == token) {
            categories.push(token.to_string());
        }
    }
    Ok(categories)
}

/// CSS selector of the tab for `category` under `bar`.
///
/// The token is quoted as a CSS string, so quotes and backslashes in it are
/// escaped.
#[must_use]
pub fn category_tab_selector(bar: &str, category: &str) -> String {
    let mut quoted = String::with_capacity(category.len());
    for ch in category.chars() {
        match ch {
            '"' | '\\' => {
                quoted.push('\\');
                quoted.push(ch);
            }
            '\n' => quoted.push_str("\\a "),
            _ => quoted.push(ch),
        }
    }
    format!("{bar} [data-filter=\"{quoted}\"]")
}

/// Leading number of `text` ("8.5 Cr" is 8.5), or 0 when there is none.
fn parse_number(text: &str) -> f64 {
    leading_number_pattern()
        .find(text)
        .and_then(|m| m.as_str().trim().parse().ok())
        .unwrap_or(0.0)
}

/// Players currently listed on the team-builder page, all tagged `role`.
///
/// An empty list is not an error here; a tab may legitimately hold nobody.
pub fn parse_players(html: &str, role: PlayerRole) -> Result<Vec<PlayerRosterEntry>> {
    let document = Html::parse_document(html);
    let player_box = selector(PLAYER_BOX)?;
    let name = selector(".player-name")?;
    let team = selector(".team-name")?;
    let credits = selector(".player-credits")?;
    let points = selector(".player-points")?;
    let selected_by = selector(".selected-by")?;
    let recent = selector(".recent-performance span")?;
    let image = selector(".player-img img")?;

    let players = document
        .select(&player_box)
        .filter_map(|el| {
            let player_name = text_of(el, &name);
            if player_name.is_empty() {
                return None;
            }

            let team_text = text_of(el, &team);
            let team_name = team_text
                .strip_prefix("Team:")
                .unwrap_or(&team_text)
                .trim()
                .to_string();

            let player_id = el
                .select(&image)
                .next()
                .and_then(|img| img.value().attr("src"))
                .and_then(|src| player_id_pattern().captures(src))
                .map(|caps| caps[1].to_string())
                .unwrap_or_default();

            Some(PlayerRosterEntry {
                player_id,
                name: player_name,
                team: team_name,
                role,
                credits: parse_number(&text_of(el, &credits)),
                points: parse_number(&text_of(el, &points)),
                selected_by: text_of(el, &selected_by),
                recent_performance: el
                    .select(&recent)
                    .map(element_text)
                    .filter(|s| !s.is_empty())
                    .collect(),
                is_selected: el.value().classes().any(|c| c == "selected"),
            })
        })
        .collect();

    Ok(players)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEAM_BUILDER: &str = r#"
        <ul class="player-category-tabs">
            <li class="nav-item" data-filter="ft_wk">WK (2)</li>
            <li class="nav-item" data-filter="ft_bat">BAT</li>
            <li class="nav-item" data-filter="ft_allr">ALL</li>
            <li class="nav-item" data-filter="ft_bat">BAT</li>
            <li class="nav-item" data-filter="">?</li>
        </ul>
        <div class="player-box selected">
            <div class="player-img"><img src="https://cdn.example/players/1413/head.png"></div>
            <div class="player-name">Ishan Kishan</div>
            <div class="team-name">Team: MI</div>
            <div class="player-credits">8.5</div>
            <div class="player-points">312</div>
            <div class="selected-by">64.2%</div>
            <div class="recent-performance"><span>45</span><span></span><span>12</span></div>
        </div>
        <div class="player-box">
            <div class="player-name">Unknown Keeper</div>
            <div class="player-credits">n/a</div>
        </div>
        <div class="player-box"><div class="player-name"> </div></div>
    "#;

    #[test]
    fn test_parse_categories_dedupes_in_order() {
        let categories = parse_categories(TEAM_BUILDER, ".player-category-tabs").unwrap();
        assert_eq!(categories, vec!["ft_wk", "ft_bat", "ft_allr"]);
    }

    #[test]
    fn test_category_tab_selector() {
        assert_eq!(
            category_tab_selector(".player-category-tabs", "ft_wk"),
            ".player-category-tabs [data-filter=\"ft_wk\"]"
        );
    }

    #[test]
    fn test_parse_players() {
        let players = parse_players(TEAM_BUILDER, PlayerRole::Wk).unwrap();
        assert_eq!(players.len(), 2);

        let first = &players[0];
        assert_eq!(first.player_id, "1413");
        assert_eq!(first.name, "Ishan Kishan");
        assert_eq!(first.team, "MI");
        assert_eq!(first.role, PlayerRole::Wk);
        assert!((first.credits - 8.5).abs() < f64::EPSILON);
        assert!((first.points - 312.0).abs() < f64::EPSILON);
        assert_eq!(first.selected_by, "64.2%");
        assert_eq!(first.recent_performance, vec!["45", "12"]);
        assert!(first.is_selected);

        let second = &players[1];
        assert_eq!(second.player_id, "");
        assert_eq!(second.credits, 0.0);
        assert!(!second.is_selected);
    }

    #[test]
    fn test_category_tab_selector_escapes_quotes() {
        let css = category_tab_selector(".player-category-tabs", r#"ft_"wk"\x"#);
        assert_eq!(css, r#".player-category-tabs [data-filter="ft_\"wk\"\\x"]"#);

        let html = r#"<ul class="player-category-tabs"><li data-filter='ft_"wk"\x'>WK</li></ul>"#;
        assert!(has_marker(html, &css).unwrap());
    }

    #[test]
    fn test_parse_number_keeps_leading_value() {
        assert_eq!(parse_number("8.5 Cr"), 8.5);
        assert_eq!(parse_number("312 pts"), 312.0);
        assert_eq!(parse_number("  9"), 9.0);
        assert_eq!(parse_number("-1.5"), -1.5);
        assert_eq!(parse_number(".5"), 0.5);
        assert_eq!(parse_number("7."), 7.0);
        assert_eq!(parse_number("n/a"), 0.0);
        assert_eq!(parse_number("Cr 8.5"), 0.0);
        assert_eq!(parse_number(""), 0.0);
    }

    #[test]
    fn test_suffixed_credits_and_points() {
        let html = r#"
            <div class="player-box">
                <div class="player-name">Jasprit Bumrah</div>
                <div class="player-credits">9.5 Cr</div>
                <div class="player-points">412 pts</div>
            </div>
        "#;
        let players = parse_players(html, PlayerRole::Bowl).unwrap();
        assert_eq!(players[0].credits, 9.5);
        assert_eq!(players[0].points, 412.0);
    }

    #[test]
    fn test_has_marker() {
        assert!(has_marker(TEAM_BUILDER, ".player-category-tabs").unwrap());
        assert!(!has_marker(TEAM_BUILDER, "input[name=\"mobile\"]").unwrap());
    }

    #[test]
    fn test_empty_page_has_no_players() {
        assert!(parse_players("<html></html>", PlayerRole::Bat).unwrap().is_empty());
    }
}
