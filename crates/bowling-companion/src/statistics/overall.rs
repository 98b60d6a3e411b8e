//! Scores, games and series.

use std::collections::BTreeSet;

use super::average::OverallAverage;
use super::{Category, SeriesSummary, SourceSeries, Statistic, StatisticValue, StatisticsUnit};
use crate::model::Game;

pub(super) fn statistics(series_sizes: &BTreeSet<usize>) -> Vec<Box<dyn Statistic>> {
    let mut statistics: Vec<Box<dyn Statistic>> = vec![
        Box::new(OverallAverage::default()),
        Box::new(HighSingle::default()),
    ];
    statistics.extend(
        series_sizes
            .iter()
            .map(|games| Box::new(HighSeries::new(*games)) as Box<dyn Statistic>),
    );
    statistics.push(Box::new(TotalPinfall::default()));
    statistics.push(Box::new(NumberOfGames::default()));
    statistics.push(Box::new(NumberOfSeries::default()));
    statistics.push(Box::new(GamesOverHighlight::default()));
    statistics.push(Box::new(SeriesOverHighlight::default()));
    statistics
}

/// Best single game.
#[derive(Debug, Default)]
pub(super) struct HighSingle {
    best: u32,
}

impl Statistic for HighSingle {
    fn id(&self) -> String {
        "high_single".to_string()
    }

    fn title(&self) -> String {
        "High Single".to_string()
    }

    fn category(&self) -> Category {
        Category::Overall
    }

    fn value(&self) -> StatisticValue {
        StatisticValue::Score(self.best)
    }

    fn is_modified_by_game(&self) -> bool {
        true
    }

    fn modify_with_game(&mut self, game: &Game, _series: &SourceSeries) {
        self.best = self.best.max(game.score());
    }
}

/// Best series among series of one size.
#[derive(Debug)]
pub(super) struct HighSeries {
    games: usize,
    best: u32,
}

impl HighSeries {
    pub(super) fn new(games: usize) -> Self {
        Self { games, best: 0 }
    }
}

impl Statistic for HighSeries {
    fn id(&self) -> String {
        format!("high_series_{}", self.games)
    }

    fn title(&self) -> String {
        format!("High {} Game Series", self.games)
    }

    fn category(&self) -> Category {
        Category::Overall
    }

    fn value(&self) -> StatisticValue {
        StatisticValue::Score(self.best)
    }

    fn applies_to(&self, unit: &StatisticsUnit) -> bool {
        !matches!(unit, StatisticsUnit::Game(_))
    }

    fn is_modified_by_series(&self) -> bool {
        true
    }

    fn modify_with_series(&mut self, series: &SeriesSummary) {
        if series.games == self.games {
            self.best = self.best.max(series.total);
        }
    }
}

#[derive(Debug, Default)]
pub(super) struct TotalPinfall {
    total: u32,
}

impl Statistic for TotalPinfall {
    fn id(&self) -> String {
        "total_pinfall".to_string()
    }

    fn title(&self) -> String {
        "Total Pinfall".to_string()
    }

    fn category(&self) -> Category {
        Category::Overall
    }

    fn value(&self) -> StatisticValue {
        StatisticValue::Count(self.total)
    }

    fn is_modified_by_game(&self) -> bool {
        true
    }

    fn modify_with_game(&mut self, game: &Game, _series: &SourceSeries) {
        self.total = self.total.saturating_add(game.score());
    }
}

#[derive(Debug, Default)]
pub(super) struct NumberOfGames {
    count: u32,
}

impl Statistic for NumberOfGames {
    fn id(&self) -> String {
        "number_of_games".to_string()
    }

    fn title(&self) -> String {
        "Number of Games".to_string()
    }

    fn category(&self) -> Category {
        Category::Overall
    }

    fn value(&self) -> StatisticValue {
        StatisticValue::Count(self.count)
    }

    fn is_modified_by_game(&self) -> bool {
        true
    }

    fn modify_with_game(&mut self, _game: &Game, _series: &SourceSeries) {
        self.count += 1;
    }
}

#[derive(Debug, Default)]
pub(super) struct NumberOfSeries {
    count: u32,
}

impl Statistic for NumberOfSeries {
    fn id(&self) -> String {
        "number_of_series".to_string()
    }

    fn title(&self) -> String {
        "Number of Series".to_string()
    }

    fn category(&self) -> Category {
        Category::Overall
    }

    fn value(&self) -> StatisticValue {
        StatisticValue::Count(self.count)
    }

    fn applies_to(&self, unit: &StatisticsUnit) -> bool {
        unit.spans_series()
    }

    fn is_modified_by_series(&self) -> bool {
        true
    }

    fn modify_with_series(&mut self, _series: &SeriesSummary) {
        self.count += 1;
    }
}

/// Games at or above their league's game highlight.
#[derive(Debug, Default)]
pub(super) struct GamesOverHighlight {
    count: u32,
}

impl Statistic for GamesOverHighlight {
    fn id(&self) -> String {
        "games_over_highlight".to_string()
    }

    fn title(&self) -> String {
        "Games Over Highlight".to_string()
    }

    fn category(&self) -> Category {
        Category::Overall
    }

    fn value(&self) -> StatisticValue {
        StatisticValue::Count(self.count)
    }

    fn is_modified_by_game(&self) -> bool {
        true
    }

    fn modify_with_game(&mut self, game: &Game, series: &SourceSeries) {
        if game.score() >= series.game_highlight {
            self.count += 1;
        }
    }
}

/// Series at or above their league's series highlight.
#[derive(Debug, Default)]
pub(super) struct SeriesOverHighlight {
    count: u32,
}

impl Statistic for SeriesOverHighlight {
    fn id(&self) -> String {
        "series_over_highlight".to_string()
    }

    fn title(&self) -> String {
        "Series Over Highlight".to_string()
    }

    fn category(&self) -> Category {
        Category::Overall
    }

    fn value(&self) -> StatisticValue {
        StatisticValue::Count(self.count)
    }

    fn applies_to(&self, unit: &StatisticsUnit) -> bool {
        !matches!(unit, StatisticsUnit::Game(_))
    }

    fn is_modified_by_series(&self) -> bool {
        true
    }

    fn modify_with_series(&mut self, series: &SeriesSummary) {
        if series.total >= series.series_highlight {
            self.count += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::{manual_game, source, source_series};
    use super::super::{compute, StatisticValue, StatisticsUnit};

    #[test]
    fn test_overall_statistics() {
        let first = source_series(vec![
            manual_game(1, 250),
            manual_game(2, 310),
            manual_game(3, 290),
        ]);
        let second = source_series(vec![
            manual_game(1, 200),
            manual_game(2, 220),
            manual_game(3, 180),
        ]);
        let single = source_series(vec![manual_game(1, 305)]);

        let report = compute(&source(
            StatisticsUnit::Bowler(1),
            vec![first, second, single],
        ));

        let value = |id: &str| report.get(id).unwrap().value;
        assert_eq!(value("high_single"), StatisticValue::Score(310));
        assert_eq!(value("high_series_3"), StatisticValue::Score(850));
        assert!(report.get("high_series_1").is_none());
        assert_eq!(value("total_pinfall"), StatisticValue::Count(1755));
        assert_eq!(value("number_of_games"), StatisticValue::Count(7));
        assert_eq!(value("number_of_series"), StatisticValue::Count(3));
        assert_eq!(value("games_over_highlight"), StatisticValue::Count(2));
        assert_eq!(value("series_over_highlight"), StatisticValue::Count(1));
    }

    #[test]
    fn test_high_series_per_size() {
        let two = source_series(vec![manual_game(1, 100), manual_game(2, 100)]);
        let four = source_series(vec![
            manual_game(1, 100),
            manual_game(2, 100),
            manual_game(3, 100),
            manual_game(4, 100),
        ]);

        let report = compute(&source(StatisticsUnit::League(1), vec![two, four]));
        assert_eq!(
            report.get("high_series_2").unwrap().value,
            StatisticValue::Score(200)
        );
        assert_eq!(
            report.get("high_series_4").unwrap().title,
            "High 4 Game Series"
        );
    }
}
