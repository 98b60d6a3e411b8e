//! First ball outcomes and how often they were spared.

use super::{Category, Statistic, StatisticValue};
use crate::model::{FirstBallKind, Frame};

pub(super) fn statistics() -> Vec<Box<dyn Statistic>> {
    let mut statistics: Vec<Box<dyn Statistic>> = vec![
        Box::new(FirstBallCount::new(Group::MiddleHit)),
        Box::new(FirstBallCount::new(Group::Strike)),
        Box::new(SpareConversions::default()),
    ];
    for group in Group::SPARED {
        statistics.push(Box::new(FirstBallCount::new(group)));
        statistics.push(Box::new(Spared::new(group)));
    }
    statistics
}

/// First ball outcomes tracked as statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Group {
    MiddleHit,
    Strike,
    Left,
    Right,
    Ace,
    LeftChopOff,
    RightChopOff,
    LeftSplit,
    RightSplit,
    HeadPin,
}

impl Group {
    /// Groups reported along with how often they were spared.
    const SPARED: [Group; 8] = [
        Group::Left,
        Group::Right,
        Group::Ace,
        Group::LeftChopOff,
        Group::RightChopOff,
        Group::LeftSplit,
        Group::RightSplit,
        Group::HeadPin,
    ];

    fn matches(self, kind: FirstBallKind) -> bool {
        match self {
            Self::MiddleHit => kind.is_middle_hit(),
            Self::Strike => kind == FirstBallKind::Strike,
            Self::Left => kind == FirstBallKind::Left,
            Self::Right => kind == FirstBallKind::Right,
            Self::Ace => kind == FirstBallKind::Ace,
            Self::LeftChopOff => kind == FirstBallKind::LeftChopOff,
            Self::RightChopOff => kind == FirstBallKind::RightChopOff,
            Self::LeftSplit => matches!(
                kind,
                FirstBallKind::LeftSplit | FirstBallKind::LeftSplitWithBonus
            ),
            Self::RightSplit => matches!(
                kind,
                FirstBallKind::RightSplit | FirstBallKind::RightSplitWithBonus
            ),
            Self::HeadPin => kind.is_head_pin(),
        }
    }

    fn id(self) -> &'static str {
        match self {
            Self::MiddleHit => "middle_hits",
            Self::Strike => "strikes",
            Self::Left => "lefts",
            Self::Right => "rights",
            Self::Ace => "aces",
            Self::LeftChopOff => "left_chop_offs",
            Self::RightChopOff => "right_chop_offs",
            Self::LeftSplit => "left_splits",
            Self::RightSplit => "right_splits",
            Self::HeadPin => "head_pins",
        }
    }

    fn title(self) -> &'static str {
        match self {
            Self::MiddleHit => "Middle Hits",
            Self::Strike => "Strikes",
            Self::Left => "Lefts",
            Self::Right => "Rights",
            Self::Ace => "Aces",
            Self::LeftChopOff => "Left Chop Offs",
            Self::RightChopOff => "Right Chop Offs",
            Self::LeftSplit => "Left Splits",
            Self::RightSplit => "Right Splits",
            Self::HeadPin => "Head Pins",
        }
    }
}

/// Share of first balls that ended in a group.
#[derive(Debug)]
pub(super) struct FirstBallCount {
    group: Group,
    count: u32,
    first_balls: u32,
}

impl FirstBallCount {
    fn new(group: Group) -> Self {
        Self {
            group,
            count: 0,
            first_balls: 0,
        }
    }
}

impl Statistic for FirstBallCount {
    fn id(&self) -> String {
        self.group.id().to_string()
    }

    fn title(&self) -> String {
        self.group.title().to_string()
    }

    fn category(&self) -> Category {
        Category::FirstBall
    }

    fn value(&self) -> StatisticValue {
        StatisticValue::Percentage {
            numerator: self.count,
            denominator: self.first_balls,
        }
    }

    fn is_modified_by_frame(&self) -> bool {
        true
    }

    fn modify_with_frame(&mut self, frame: &Frame) {
        self.first_balls += 1;
        if self.group.matches(frame.first_ball_kind()) {
            self.count += 1;
        }
    }
}

/// Share of a group's first balls that were spared.
#[derive(Debug)]
pub(super) struct Spared {
    group: Group,
    spared: u32,
    chances: u32,
}

impl Spared {
    fn new(group: Group) -> Self {
        Self {
            group,
            spared: 0,
            chances: 0,
        }
    }
}

impl Statistic for Spared {
    fn id(&self) -> String {
        format!("{}_spared", self.group.id())
    }

    fn title(&self) -> String {
        format!("{} Spared", self.group.title())
    }

    fn category(&self) -> Category {
        Category::FirstBall
    }

    fn value(&self) -> StatisticValue {
        StatisticValue::Percentage {
            numerator: self.spared,
            denominator: self.chances,
        }
    }

    fn is_modified_by_frame(&self) -> bool {
        true
    }

    fn modify_with_frame(&mut self, frame: &Frame) {
        if self.group.matches(frame.first_ball_kind()) {
            self.chances += 1;
            if frame.is_spare() {
                self.spared += 1;
            }
        }
    }
}

/// Share of non-strike frames that were spared.
#[derive(Debug, Default)]
pub(super) struct SpareConversions {
    spared: u32,
    chances: u32,
}

impl Statistic for SpareConversions {
    fn id(&self) -> String {
        "spare_conversions".to_string()
    }

    fn title(&self) -> String {
        "Spare Conversions".to_string()
    }

    fn category(&self) -> Category {
        Category::FirstBall
    }

    fn value(&self) -> StatisticValue {
        StatisticValue::Percentage {
            numerator: self.spared,
            denominator: self.chances,
        }
    }

    fn is_modified_by_frame(&self) -> bool {
        true
    }

    fn modify_with_frame(&mut self, frame: &Frame) {
        if !frame.is_strike() {
            self.chances += 1;
            if frame.is_spare() {
                self.spared += 1;
            }
        }
    }
}
