//! Fouls.

use super::{Category, SourceSeries, Statistic, StatisticValue};
use crate::model::{Frame, Game};

pub(super) fn statistics() -> Vec<Box<dyn Statistic>> {
    vec![
        Box::new(Fouls::default()),
        Box::new(FoulsPerGame::default()),
    ]
}

#[derive(Debug, Default)]
pub(super) struct Fouls {
    count: u32,
}

impl Statistic for Fouls {
    fn id(&self) -> String {
        "fouls".to_string()
    }

    fn title(&self) -> String {
        "Fouls".to_string()
    }

    fn category(&self) -> Category {
        Category::Fouls
    }

    fn value(&self) -> StatisticValue {
        StatisticValue::Count(self.count)
    }

    fn is_modified_by_frame(&self) -> bool {
        true
    }

    fn modify_with_frame(&mut self, frame: &Frame) {
        self.count += frame.foul_count();
    }
}

/// Fouls over games scored frame by frame.
#[derive(Debug, Default)]
pub(super) struct FoulsPerGame {
    fouls: u32,
    games: u32,
}

impl Statistic for FoulsPerGame {
    fn id(&self) -> String {
        "fouls_per_game".to_string()
    }

    fn title(&self) -> String {
        "Fouls per Game".to_string()
    }

    fn category(&self) -> Category {
        Category::Fouls
    }

    fn value(&self) -> StatisticValue {
        StatisticValue::Average {
            total: self.fouls,
            divisor: self.games,
        }
    }

    fn is_modified_by_frame(&self) -> bool {
        true
    }

    fn is_modified_by_game(&self) -> bool {
        true
    }

    fn modify_with_frame(&mut self, frame: &Frame) {
        self.fouls += frame.foul_count();
    }

    fn modify_with_game(&mut self, game: &Game, _series: &SourceSeries) {
        if !game.is_manual {
            self.games += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::{manual_game, played_game, source, source_series};
    use super::super::{compute, StatisticValue, StatisticsUnit};

    #[test]
    fn test_fouls() {
        let mut fouled = played_game(1, ["00100", "01100", "01100"]);
        fouled
            .set_ball(1, 0, "00100".parse().unwrap(), true)
            .unwrap();
        fouled
            .set_ball(4, 2, "01100".parse().unwrap(), true)
            .unwrap();
        let clean = played_game(2, ["00100", "01100", "01100"]);

        let report = compute(&source(
            StatisticsUnit::Series(1),
            vec![source_series(vec![fouled, clean, manual_game(3, 200)])],
        ));

        assert_eq!(report.get("fouls").unwrap().value, StatisticValue::Count(2));
        assert_eq!(
            report.get("fouls_per_game").unwrap().value,
            StatisticValue::Average {
                total: 2,
                divisor: 2
            }
        );
        assert_eq!(report.get("fouls_per_game").unwrap().display, "1.0");
    }
}
