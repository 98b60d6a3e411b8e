//! Results against opponents.

use super::{Category, SourceSeries, Statistic, StatisticValue};
use crate::model::{Game, MatchPlayResult};

pub(super) fn statistics() -> Vec<Box<dyn Statistic>> {
    [
        MatchPlayResult::Won,
        MatchPlayResult::Lost,
        MatchPlayResult::Tied,
    ]
    .into_iter()
    .map(|result| Box::new(MatchPlayCount::new(result)) as Box<dyn Statistic>)
    .collect()
}

/// Games with one match play result.
#[derive(Debug)]
pub(super) struct MatchPlayCount {
    result: MatchPlayResult,
    count: u32,
}

impl MatchPlayCount {
    fn new(result: MatchPlayResult) -> Self {
        Self { result, count: 0 }
    }
}

impl Statistic for MatchPlayCount {
    fn id(&self) -> String {
        format!("match_play_{}", self.result)
    }

    fn title(&self) -> String {
        match self.result {
            MatchPlayResult::Won => "Games Won",
            MatchPlayResult::Lost => "Games Lost",
            MatchPlayResult::Tied => "Games Tied",
            MatchPlayResult::None => "Games Without Match Play",
        }
        .to_string()
    }

    fn category(&self) -> Category {
        Category::MatchPlay
    }

    fn value(&self) -> StatisticValue {
        StatisticValue::Count(self.count)
    }

    fn is_modified_by_game(&self) -> bool {
        true
    }

    fn modify_with_game(&mut self, game: &Game, _series: &SourceSeries) {
        if game.match_play.result == self.result {
            self.count += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::{manual_game, source, source_series};
    use super::super::{compute, StatisticValue, StatisticsUnit};
    use crate::model::MatchPlayResult;

    #[test]
    fn test_match_play_counts() {
        let games: Vec<_> = [
            MatchPlayResult::Won,
            MatchPlayResult::Won,
            MatchPlayResult::Lost,
            MatchPlayResult::None,
        ]
        .into_iter()
        .enumerate()
        .map(|(i, result)| {
            let mut game = manual_game(u8::try_from(i + 1).unwrap(), 200);
            game.match_play.result = result;
            game
        })
        .collect();

        let report = compute(&source(
            StatisticsUnit::League(1),
            vec![source_series(games)],
        ));

        let value = |id: &str| report.get(id).unwrap().value;
        assert_eq!(value("match_play_won"), StatisticValue::Count(2));
        assert_eq!(value("match_play_lost"), StatisticValue::Count(1));
        assert_eq!(value("match_play_tied"), StatisticValue::Count(0));
        assert_eq!(report.get("match_play_won").unwrap().title, "Games Won");
    }
}
