//! Plain-text rendering for command output.

use std::fmt::Write;

use chrono::NaiveDate;

use crate::config::{DisplayConfig, SeriesView};
use crate::dates::date_to_pretty;
use crate::model::{Bowler, Game, League, MatchPlayResult, Series, Team, NUMBER_OF_BALLS};
use crate::statistics::StatisticsReport;

const HIGHLIGHT: &str = " *";
const UNPLAYED_BALL: &str = "-----";

/// One line per bowler.
#[must_use]
pub fn bowlers(bowlers: &[Bowler]) -> String {
    bowlers
        .iter()
        .map(|b| format!("#{:<5} {}", b.id.unwrap_or_default(), b.name))
        .collect::<Vec<_>>()
        .join("\n")
}

/// One line per team, with member IDs in lineup order.
#[must_use]
pub fn teams(teams: &[Team]) -> String {
    teams
        .iter()
        .map(|t| {
            let members: Vec<String> = t.members.iter().map(|m| format!("#{m}")).collect();
            format!(
                "#{:<5} {} ({})",
                t.id.unwrap_or_default(),
                t.name,
                members.join(", ")
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// One line per league.
#[must_use]
pub fn leagues(leagues: &[League]) -> String {
    leagues
        .iter()
        .map(|l| {
            let kind = if l.is_event { "event" } else { "league" };
            format!(
                "#{:<5} {} [{kind}, {} game(s), highlights {}/{}]",
                l.id.unwrap_or_default(),
                l.name,
                l.games_per_series,
                l.game_highlight,
                l.series_highlight
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// A league's series, in the configured view.
///
/// Scores and totals at or above the league's highlights are marked when the
/// display settings ask for it.
#[must_use]
pub fn series_list(
    series: &[Series],
    league: &League,
    display: &DisplayConfig,
    today: NaiveDate,
) -> String {
    let game_mark = |score: u32| {
        if display.highlight_scores && score >= league.game_highlight {
            HIGHLIGHT
        } else {
            ""
        }
    };
    let series_mark = |total: u32| {
        if display.highlight_series && total >= league.series_highlight {
            HIGHLIGHT
        } else {
            ""
        }
    };

    let mut out = String::new();
    for s in series {
        let total = s.total();
        let date = date_to_pretty(&s.date, today);
        let id = s.id.unwrap_or_default();
        match display.series_view {
            SeriesView::Expanded => {
                let _ = writeln!(out, "#{id:<5} {date}  {total}{}", series_mark(total));
                for game in &s.games {
                    let score = game.score();
                    let _ = writeln!(
                        out,
                        "    Game {} (#{})  {score}{}",
                        game.ordinal,
                        game.id.unwrap_or_default(),
                        game_mark(score)
                    );
                }
            }
            SeriesView::Condensed => {
                let scores: Vec<String> = s
                    .games
                    .iter()
                    .map(|g| {
                        let score = g.score();
                        format!("{score}{}", game_mark(score).trim())
                    })
                    .collect();
                let _ = writeln!(
                    out,
                    "#{id:<5} {date}  {}  = {total}{}",
                    scores.join(" "),
                    series_mark(total)
                );
            }
        }
    }
    out.trim_end().to_string()
}

/// A game with its frames, balls and running totals.
#[must_use]
pub fn game(game: &Game) -> String {
    let mut out = String::new();
    let mut flags = Vec::new();
    if game.is_manual {
        flags.push("manual");
    }
    if game.is_locked {
        flags.push("locked");
    }
    let flags = if flags.is_empty() {
        String::new()
    } else {
        format!("  [{}]", flags.join(", "))
    };
    let _ = writeln!(
        out,
        "Game {} (#{})  Score {}{flags}",
        game.ordinal,
        game.id.unwrap_or_default(),
        game.score()
    );

    let match_play = &game.match_play;
    if match_play.result != MatchPlayResult::None {
        let _ = write!(out, "Match play: {}", match_play.result);
        if let Some(name) = &match_play.opponent_name {
            let _ = write!(out, " vs {name}");
        }
        if let Some(score) = match_play.opponent_score {
            let _ = write!(out, " ({score})");
        }
        out.push('\n');
    }

    if game.is_manual {
        return out.trim_end().to_string();
    }

    let _ = writeln!(out, "Frame  Ball 1  Ball 2  Ball 3  Total");
    let totals = game.frame_scores();
    for (frame, total) in game.frames.iter().zip(totals) {
        let balls: Vec<String> = (0..NUMBER_OF_BALLS)
            .map(|i| {
                if frame.is_accessed {
                    let foul = if frame.fouls[i] { "F" } else { "" };
                    format!("{}{foul}", frame.balls[i])
                } else {
                    UNPLAYED_BALL.to_string()
                }
            })
            .collect();
        let total = if frame.is_accessed {
            total.to_string()
        } else {
            String::new()
        };
        let _ = writeln!(
            out,
            "{:>5}  {:<6}  {:<6}  {:<6}  {total:>5}",
            frame.ordinal, balls[0], balls[1], balls[2]
        );
    }
    let fouls = game.foul_count();
    if fouls > 0 {
        let _ = writeln!(out, "Fouls: {fouls}");
    }
    out.trim_end().to_string()
}

/// Statistics grouped under category headings.
#[must_use]
pub fn report(report: &StatisticsReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Statistics for {}", report.name);
    for group in &report.groups {
        let _ = writeln!(out);
        let _ = writeln!(out, "{}", group.title);
        for entry in &group.entries {
            let _ = writeln!(out, "  {:<32} {}", entry.title, entry.display);
        }
    }
    out.trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Deck, MatchPlay};

    fn day(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2019, m, d).unwrap()
    }

    fn manual(id: i64, ordinal: u8, score: u32) -> Game {
        let mut game = Game::new(1, ordinal);
        game.id = Some(id);
        game.set_manual_score(score).unwrap();
        game
    }

    fn sample_series() -> (Series, League) {
        let mut league = League::new(1, "Monday", 2);
        league.game_highlight = 250;
        league.series_highlight = 500;
        let series = Series {
            id: Some(4),
            league_id: 1,
            date: day(1, 1).and_hms_opt(0, 0, 0).unwrap(),
            games: vec![manual(10, 1, 260), manual(11, 2, 240)],
        };
        (series, league)
    }

    #[test]
    fn test_series_expanded() {
        let (series, league) = sample_series();
        let display = DisplayConfig::default();

        let text = series_list(&[series], &league, &display, day(1, 2));

        assert_eq!(
            text,
            "#4     Yesterday  500 *\n    Game 1 (#10)  260 *\n    Game 2 (#11)  240"
        );
    }

    #[test]
    fn test_series_condensed_without_highlights() {
        let (series, league) = sample_series();
        let display = DisplayConfig {
            series_view: SeriesView::Condensed,
            highlight_series: false,
            highlight_scores: false,
        };

        let text = series_list(&[series], &league, &display, day(6, 1));

        assert_eq!(text, "#4     January 1, 2019  260 240  = 500");
    }

    #[test]
    fn test_series_condensed_with_highlights() {
        let (series, league) = sample_series();
        let display = DisplayConfig {
            series_view: SeriesView::Condensed,
            ..DisplayConfig::default()
        };

        let text = series_list(&[series], &league, &display, day(6, 1));

        assert_eq!(text, "#4     January 1, 2019  260* 240  = 500 *");
    }

    #[test]
    fn test_game_frames() {
        let mut game = Game::new(1, 1);
        game.id = Some(3);
        game.set_ball(1, 0, "11111".parse::<Deck>().unwrap(), false)
            .unwrap();
        game.set_ball(2, 0, "01110".parse::<Deck>().unwrap(), true)
            .unwrap();

        let text = super::game(&game);
        let lines: Vec<&str> = text.lines().collect();

        assert!(lines[0].starts_with("Game 1 (#3)  Score"));
        assert!(lines[2].contains("11111"));
        assert!(lines[3].contains("01110F"));
        assert!(lines[4].contains(UNPLAYED_BALL));
        assert_eq!(lines.last(), Some(&"Fouls: 1"));
    }

    #[test]
    fn test_manual_game_with_match_play() {
        let mut game = manual(5, 2, 280);
        game.match_play = MatchPlay {
            result: MatchPlayResult::Won,
            opponent_name: Some("Sam".to_string()),
            opponent_score: Some(240),
        };

        assert_eq!(
            super::game(&game),
            "Game 2 (#5)  Score 280  [manual]\nMatch play: won vs Sam (240)"
        );
    }

    #[test]
    fn test_lists() {
        let mut bowler = Bowler::new("Joseph");
        bowler.id = Some(1);
        assert_eq!(bowlers(&[bowler]), "#1     Joseph");

        let mut team = Team::new("Pinheads", vec![1, 2]);
        team.id = Some(3);
        assert_eq!(teams(&[team]), "#3     Pinheads (#1, #2)");

        let mut league = League::open(1);
        league.id = Some(2);
        assert_eq!(
            leagues(&[league]),
            "#2     Open [league, 1 game(s), highlights 300/800]"
        );
    }
}
