//! Averages over all games and per game slot.

use super::{Category, SourceSeries, Statistic, StatisticValue, StatisticsUnit};
use crate::model::{Game, League};

pub(super) fn per_game_statistics(max_ordinal: u8) -> Vec<Box<dyn Statistic>> {
    (1..=max_ordinal)
        .map(|ordinal| Box::new(PerGameAverage::new(ordinal)) as Box<dyn Statistic>)
        .collect()
}

/// Average of every game, plus pinfall bowled before tracking started.
#[derive(Debug, Default)]
pub(super) struct OverallAverage {
    total: u32,
    divisor: u32,
}

impl Statistic for OverallAverage {
    fn id(&self) -> String {
        "average".to_string()
    }

    fn title(&self) -> String {
        "Average".to_string()
    }

    fn category(&self) -> Category {
        Category::Overall
    }

    fn value(&self) -> StatisticValue {
        StatisticValue::Average {
            total: self.total,
            divisor: self.divisor,
        }
    }

    fn is_modified_by_game(&self) -> bool {
        true
    }

    fn modify_with_game(&mut self, game: &Game, _series: &SourceSeries) {
        self.total = self.total.saturating_add(game.score());
        self.divisor += 1;
    }

    fn modify_with_league(&mut self, league: &League) {
        self.total = self.total.saturating_add(league.additional_pinfall);
        self.divisor = self.divisor.saturating_add(league.additional_games);
    }
}

/// Average of the games bowled in one slot of a series.
#[derive(Debug)]
pub(super) struct PerGameAverage {
    ordinal: u8,
    total: u32,
    divisor: u32,
}

impl PerGameAverage {
    pub(super) fn new(ordinal: u8) -> Self {
        Self {
            ordinal,
            total: 0,
            divisor: 0,
        }
    }
}

impl Statistic for PerGameAverage {
    fn id(&self) -> String {
        format!("average_game_{}", self.ordinal)
    }

    fn title(&self) -> String {
        format!("Average in Game {}", self.ordinal)
    }

    fn category(&self) -> Category {
        Category::Average
    }

    fn value(&self) -> StatisticValue {
        StatisticValue::Average {
            total: self.total,
            divisor: self.divisor,
        }
    }

    fn applies_to(&self, unit: &StatisticsUnit) -> bool {
        !matches!(unit, StatisticsUnit::Game(_))
    }

    fn is_modified_by_game(&self) -> bool {
        true
    }

    fn modify_with_game(&mut self, game: &Game, _series: &SourceSeries) {
        if game.ordinal == self.ordinal {
            self.total = self.total.saturating_add(game.score());
            self.divisor += 1;
        }
    }
}
