//! Derived statistics over recorded games.
//!
//! A [`StatisticsSource`] holds the series a [`StatisticsUnit`] covers.
//! [`compute`] feeds every frame, game and series of the source through the
//! statistics that apply to the unit and groups the results by [`Category`].

mod average;
mod first_ball;
mod fouls;
mod match_play;
mod overall;
mod pins_left;

use std::collections::BTreeSet;
use std::fmt;

use serde::Serialize;
use tracing::debug;

use crate::model::{Frame, Game, League, Series, MAX_GAMES_PER_SERIES};

/// What a set of statistics is computed for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum StatisticsUnit {
    /// Every league of a bowler.
    Bowler(i64),
    /// Every league of every team member.
    Team(i64),
    /// One league or event.
    League(i64),
    /// One series.
    Series(i64),
    /// One game.
    Game(i64),
}

impl StatisticsUnit {
    /// Whether the unit spans more than one series.
    #[must_use]
    pub fn spans_series(&self) -> bool {
        matches!(self, Self::Bowler(_) | Self::Team(_) | Self::League(_))
    }
}

impl fmt::Display for StatisticsUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bowler(id) => write!(f, "bowler {id}"),
            Self::Team(id) => write!(f, "team {id}"),
            Self::League(id) => write!(f, "league {id}"),
            Self::Series(id) => write!(f, "series {id}"),
            Self::Game(id) => write!(f, "game {id}"),
        }
    }
}

/// A series together with the highlights of the league it was bowled in.
#[derive(Debug, Clone)]
pub struct SourceSeries {
    /// Game highlight of the league.
    pub game_highlight: u32,
    /// Series highlight of the league.
    pub series_highlight: u32,
    /// The series and the games that belong to the unit.
    pub series: Series,
}

/// Everything a unit's statistics are computed from.
#[derive(Debug, Clone)]
pub struct StatisticsSource {
    /// The unit.
    pub unit: StatisticsUnit,
    /// Display name of the unit.
    pub name: String,
    /// Leagues whose additional pinfall and games count toward averages.
    pub leagues: Vec<League>,
    /// Series covered by the unit.
    pub series: Vec<SourceSeries>,
}

/// Totals of the played games of one series.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeriesSummary {
    /// Number of played games.
    pub games: usize,
    /// Sum of their scores.
    pub total: u32,
    /// Series highlight of the league.
    pub series_highlight: u32,
}

/// Grouping shown to users.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Scores, games and series.
    Overall,
    /// Average per game slot.
    Average,
    /// Outcome of first balls.
    FirstBall,
    /// Fouls.
    Fouls,
    /// Pins standing after the last ball.
    PinsLeftOnDeck,
    /// Results against opponents.
    MatchPlay,
}

impl Category {
    /// Categories in display order.
    pub const ALL: [Category; 6] = [
        Category::Overall,
        Category::Average,
        Category::FirstBall,
        Category::Fouls,
        Category::PinsLeftOnDeck,
        Category::MatchPlay,
    ];

    /// Heading for the category.
    #[must_use]
    pub fn title(self) -> &'static str {
        match self {
            Self::Overall => "Overall",
            Self::Average => "Average",
            Self::FirstBall => "First Ball",
            Self::Fouls => "Fouls",
            Self::PinsLeftOnDeck => "Pins Left on Deck",
            Self::MatchPlay => "Match Play",
        }
    }
}

/// The value of a statistic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StatisticValue {
    /// A plain count.
    Count(u32),
    /// A game or series score.
    Score(u32),
    /// `total / divisor`, 0 when nothing was counted.
    Average {
        /// Sum of the values.
        total: u32,
        /// Number of values.
        divisor: u32,
    },
    /// `numerator` out of `denominator`.
    Percentage {
        /// Matching occurrences.
        numerator: u32,
        /// All occurrences.
        denominator: u32,
    },
}

impl StatisticValue {
    /// The value as a number; percentages are scaled to 0..=100.
    #[must_use]
    pub fn as_f64(&self) -> f64 {
        match *self {
            Self::Count(n) | Self::Score(n) => f64::from(n),
            Self::Average { total, divisor } => ratio(total, divisor),
            Self::Percentage {
                numerator,
                denominator,
            } => ratio(numerator, denominator) * 100.0,
        }
    }
}

fn ratio(numerator: u32, denominator: u32) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        f64::from(numerator) / f64::from(denominator)
    }
}

impl fmt::Display for StatisticValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::Count(n) | Self::Score(n) => write!(f, "{n}"),
            Self::Average { .. } => write!(f, "{:.1}", self.as_f64()),
            Self::Percentage {
                numerator,
                denominator,
            } => write!(f, "{numerator}/{denominator} ({:.1}%)", self.as_f64()),
        }
    }
}

/// A value accumulated over the frames, games and series of a unit.
///
/// Hooks are only called when the matching `is_modified_by_*` returns true.
pub trait Statistic: fmt::Debug + Send {
    /// Stable identifier.
    fn id(&self) -> String;

    /// Display title.
    fn title(&self) -> String;

    /// Group the statistic is shown in.
    fn category(&self) -> Category;

    /// Current value.
    fn value(&self) -> StatisticValue;

    /// Whether the statistic is shown for the unit.
    fn applies_to(&self, _unit: &StatisticsUnit) -> bool {
        true
    }

    /// Whether [`Statistic::modify_with_frame`] should be called.
    fn is_modified_by_frame(&self) -> bool {
        false
    }

    /// Whether [`Statistic::modify_with_game`] should be called.
    fn is_modified_by_game(&self) -> bool {
        false
    }

    /// Whether [`Statistic::modify_with_series`] should be called.
    fn is_modified_by_series(&self) -> bool {
        false
    }

    /// Account for one recorded frame.
    fn modify_with_frame(&mut self, _frame: &Frame) {}

    /// Account for one played game.
    fn modify_with_game(&mut self, _game: &Game, _series: &SourceSeries) {}

    /// Account for one series with at least one played game.
    fn modify_with_series(&mut self, _series: &SeriesSummary) {}

    /// Account for pinfall bowled before a league was tracked.
    fn modify_with_league(&mut self, _league: &League) {}
}

/// One computed statistic.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatisticEntry {
    /// Stable identifier.
    pub id: String,
    /// Display title.
    pub title: String,
    /// Raw value.
    pub value: StatisticValue,
    /// Formatted value.
    pub display: String,
}

/// Statistics of one category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatisticGroup {
    /// The category.
    pub category: Category,
    /// Heading for the category.
    pub title: &'static str,
    /// Statistics in display order.
    pub entries: Vec<StatisticEntry>,
}

impl StatisticGroup {
    /// Find an entry by id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&StatisticEntry> {
        self.entries.iter().find(|e| e.id == id)
    }
}

/// All statistics of a unit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatisticsReport {
    /// The unit.
    pub unit: StatisticsUnit,
    /// Display name of the unit.
    pub name: String,
    /// Groups in display order, empty groups left out.
    pub groups: Vec<StatisticGroup>,
}

impl StatisticsReport {
    /// Find an entry by id in any group.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&StatisticEntry> {
        self.groups.iter().find_map(|g| g.get(id))
    }
}

/// A game counts once it has a manual score or a recorded frame.
#[must_use]
pub fn is_played(game: &Game) -> bool {
    game.is_manual || game.frames.iter().any(|f| f.is_accessed)
}

/// Every statistic for a source with the given shape.
fn all_statistics(max_ordinal: u8, series_sizes: &BTreeSet<usize>) -> Vec<Box<dyn Statistic>> {
    let mut statistics = overall::statistics(series_sizes);
    statistics.extend(average::per_game_statistics(max_ordinal));
    statistics.extend(first_ball::statistics());
    statistics.extend(fouls::statistics());
    statistics.extend(pins_left::statistics());
    statistics.extend(match_play::statistics());
    statistics
}

/// Compute every statistic that applies to the source's unit.
#[must_use]
pub fn compute(source: &StatisticsSource) -> StatisticsReport {
    let played: Vec<(&SourceSeries, Vec<&Game>)> = source
        .series
        .iter()
        .map(|s| (s, s.series.games.iter().filter(|g| is_played(g)).collect()))
        .collect();

    let max_ordinal = played
        .iter()
        .flat_map(|(_, games)| games.iter().map(|g| g.ordinal))
        .max()
        .unwrap_or(0)
        .min(MAX_GAMES_PER_SERIES);
    let series_sizes: BTreeSet<usize> = played
        .iter()
        .map(|(_, games)| games.len())
        .filter(|n| *n > 1)
        .collect();

    let mut statistics: Vec<Box<dyn Statistic>> = all_statistics(max_ordinal, &series_sizes)
        .into_iter()
        .filter(|s| s.applies_to(&source.unit))
        .collect();

    for league in &source.leagues {
        for statistic in &mut statistics {
            statistic.modify_with_league(league);
        }
    }

    for (series, games) in &played {
        for game in games {
            for statistic in &mut statistics {
                if statistic.is_modified_by_frame() {
                    for frame in game.accessed_frames() {
                        statistic.modify_with_frame(frame);
                    }
                }
                if statistic.is_modified_by_game() {
                    statistic.modify_with_game(game, series);
                }
            }
        }

        if games.is_empty() {
            continue;
        }
        let summary = SeriesSummary {
            games: games.len(),
            total: games.iter().map(|g| g.score()).sum(),
            series_highlight: series.series_highlight,
        };
        for statistic in &mut statistics {
            if statistic.is_modified_by_series() {
                statistic.modify_with_series(&summary);
            }
        }
    }

    let groups = Category::ALL
        .iter()
        .filter_map(|category| {
            let entries: Vec<StatisticEntry> = statistics
                .iter()
                .filter(|s| s.category() == *category)
                .map(|s| {
                    let value = s.value();
                    StatisticEntry {
                        id: s.id(),
                        title: s.title(),
                        value,
                        display: value.to_string(),
                    }
                })
                .collect();
            (!entries.is_empty()).then(|| StatisticGroup {
                category: *category,
                title: category.title(),
                entries,
            })
        })
        .collect();

    debug!(
        "Computed statistics for {} over {} series",
        source.unit,
        source.series.len()
    );

    StatisticsReport {
        unit: source.unit,
        name: source.name.clone(),
        groups,
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::model::{Deck, MatchPlayResult, NUMBER_OF_FRAMES};

    /// A game where every frame is the same three cumulative balls.
    pub(crate) fn played_game(ordinal: u8, balls: [&str; 3]) -> Game {
        let mut game = Game::new(1, ordinal);
        for frame in 1..=NUMBER_OF_FRAMES {
            for (ball, deck) in balls.iter().enumerate() {
                game.set_ball(frame, ball, deck.parse().unwrap(), false)
                    .unwrap();
            }
        }
        game
    }

    pub(crate) fn manual_game(ordinal: u8, score: u32) -> Game {
        let mut game = Game::new(1, ordinal);
        game.set_manual_score(score).unwrap();
        game
    }

    pub(crate) fn source_series(games: Vec<Game>) -> SourceSeries {
        SourceSeries {
            game_highlight: 300,
            series_highlight: 800,
            series: Series {
                id: Some(1),
                league_id: 1,
                date: NaiveDate::from_ymd_opt(2019, 1, 1)
                    .unwrap()
                    .and_hms_opt(0, 0, 0)
                    .unwrap(),
                games,
            },
        }
    }

    pub(crate) fn source(unit: StatisticsUnit, series: Vec<SourceSeries>) -> StatisticsSource {
        StatisticsSource {
            unit,
            name: "Test".to_string(),
            leagues: Vec::new(),
            series,
        }
    }

    #[test]
    fn test_value_display() {
        assert_eq!(StatisticValue::Count(3).to_string(), "3");
        assert_eq!(
            StatisticValue::Average {
                total: 500,
                divisor: 3
            }
            .to_string(),
            "166.7"
        );
        assert_eq!(
            StatisticValue::Average {
                total: 0,
                divisor: 0
            }
            .to_string(),
            "0.0"
        );
        assert_eq!(
            StatisticValue::Percentage {
                numerator: 1,
                denominator: 4
            }
            .to_string(),
            "1/4 (25.0%)"
        );
        assert_eq!(
            StatisticValue::Percentage {
                numerator: 0,
                denominator: 0
            }
            .as_f64(),
            0.0
        );
    }

    #[test]
    fn test_unplayed_games_are_ignored() {
        let series = source_series(vec![manual_game(1, 250), Game::new(1, 2)]);
        let report = compute(&source(StatisticsUnit::Series(1), vec![series]));

        assert_eq!(
            report.get("number_of_games").unwrap().value,
            StatisticValue::Count(1)
        );
        assert_eq!(
            report.get("average").unwrap().value,
            StatisticValue::Average {
                total: 250,
                divisor: 1
            }
        );
    }

    #[test]
    fn test_empty_source() {
        let report = compute(&source(StatisticsUnit::Bowler(1), Vec::new()));
        assert_eq!(report.name, "Test");
        assert_eq!(report.get("average").unwrap().display, "0.0");
        assert!(report.get("average_game_1").is_none());
        assert!(report.groups.iter().all(|g| !g.entries.is_empty()));
    }

    #[test]
    fn test_groups_in_category_order() {
        let series = source_series(vec![played_game(1, ["00100", "01100", "01100"])]);
        let report = compute(&source(StatisticsUnit::League(1), vec![series]));

        let categories: Vec<_> = report.groups.iter().map(|g| g.category).collect();
        let mut sorted = categories.clone();
        sorted.sort();
        assert_eq!(categories, sorted);
        assert_eq!(categories[0], Category::Overall);
    }

    #[test]
    fn test_game_unit_hides_series_statistics() {
        let mut game = played_game(2, ["11111", "11111", "11111"]);
        game.match_play.result = MatchPlayResult::Won;
        let series = source_series(vec![game]);
        let report = compute(&source(StatisticsUnit::Game(5), vec![series]));

        assert!(report.get("number_of_series").is_none());
        assert!(report.get("average_game_2").is_none());
        assert_eq!(
            report.get("high_single").unwrap().value,
            StatisticValue::Score(450)
        );
        assert_eq!(
            report.get("match_play_won").unwrap().value,
            StatisticValue::Count(1)
        );
    }

    #[test]
    fn test_league_additional_pinfall() {
        let mut league = League::new(1, "Monday", 3);
        league.additional_games = 2;
        league.additional_pinfall = 500;

        let mut source = source(
            StatisticsUnit::League(1),
            vec![source_series(vec![manual_game(1, 200)])],
        );
        source.leagues.push(league);

        let report = compute(&source);
        assert_eq!(
            report.get("average").unwrap().value,
            StatisticValue::Average {
                total: 700,
                divisor: 3
            }
        );
        assert_eq!(
            report.get("total_pinfall").unwrap().value,
            StatisticValue::Count(200)
        );
    }

    #[test]
    fn test_json_shape() {
        let series = source_series(vec![manual_game(1, 300)]);
        let report = compute(&source(StatisticsUnit::Series(9), vec![series]));
        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(json["unit"]["kind"], "series");
        assert_eq!(json["unit"]["id"], 9);
        assert_eq!(json["groups"][0]["category"], "overall");
        assert!(json["groups"][0]["entries"].is_array());
    }

    #[test]
    fn test_is_played() {
        assert!(!is_played(&Game::new(1, 1)));
        assert!(is_played(&manual_game(1, 0)));

        let mut game = Game::new(1, 1);
        game.set_ball(1, 0, Deck::standing(), false).unwrap();
        assert!(is_played(&game));
    }
}
