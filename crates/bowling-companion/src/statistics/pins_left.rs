//! Pins left standing at the end of frames.

use super::{Category, SourceSeries, Statistic, StatisticValue};
use crate::model::{Frame, Game};

pub(super) fn statistics() -> Vec<Box<dyn Statistic>> {
    vec![
        Box::new(PinsLeftOnDeck::default()),
        Box::new(AveragePinsLeftOnDeck::default()),
    ]
}

/// Value of the pins standing after the last ball of each frame.
#[derive(Debug, Default)]
pub(super) struct PinsLeftOnDeck {
    total: u32,
}

impl Statistic for PinsLeftOnDeck {
    fn id(&self) -> String {
        "pins_left_on_deck".to_string()
    }

    fn title(&self) -> String {
        "Total Pins Left".to_string()
    }

    fn category(&self) -> Category {
        Category::PinsLeftOnDeck
    }

    fn value(&self) -> StatisticValue {
        StatisticValue::Count(self.total)
    }

    fn is_modified_by_frame(&self) -> bool {
        true
    }

    fn modify_with_frame(&mut self, frame: &Frame) {
        self.total += frame.pins_left_on_deck();
    }
}

#[derive(Debug, Default)]
pub(super) struct AveragePinsLeftOnDeck {
    total: u32,
    games: u32,
}

impl Statistic for AveragePinsLeftOnDeck {
    fn id(&self) -> String {
        "average_pins_left_on_deck".to_string()
    }

    fn title(&self) -> String {
        "Average Pins Left".to_string()
    }

    fn category(&self) -> Category {
        Category::PinsLeftOnDeck
    }

    fn value(&self) -> StatisticValue {
        StatisticValue::Average {
            total: self.total,
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
        self.total += frame.pins_left_on_deck();
    }

    fn modify_with_game(&mut self, game: &Game, _series: &SourceSeries) {
        if !game.is_manual {
            self.games += 1;
        }
    }
}
