//! Five-pin deck representation.
//!
//! A deck is stored left to right: left two, left three, head pin, right
//! three, right two. A `true` entry means the pin has been knocked down.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Number of pins on a five-pin deck.
pub const NUMBER_OF_PINS: usize = 5;

/// Value of a fully cleared deck.
pub const MAX_DECK_VALUE: u32 = 15;

/// A single pin, in left-to-right order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Pin {
    /// Far left pin, worth 2.
    LeftTwoPin,
    /// Inner left pin, worth 3.
    LeftThreePin,
    /// Center pin, worth 5.
    HeadPin,
    /// Inner right pin, worth 3.
    RightThreePin,
    /// Far right pin, worth 2.
    RightTwoPin,
}

impl Pin {
    /// All pins in deck order.
    pub const ALL: [Pin; NUMBER_OF_PINS] = [
        Pin::LeftTwoPin,
        Pin::LeftThreePin,
        Pin::HeadPin,
        Pin::RightThreePin,
        Pin::RightTwoPin,
    ];

    /// Point value of the pin.
    #[must_use]
    pub fn value(self) -> u32 {
        match self {
            Self::LeftTwoPin | Self::RightTwoPin => 2,
            Self::LeftThreePin | Self::RightThreePin => 3,
            Self::HeadPin => 5,
        }
    }

    /// Position of the pin in a [`Deck`].
    #[must_use]
    pub fn index(self) -> usize {
        self as usize
    }
}

/// State of the five pins after a ball.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Deck([bool; NUMBER_OF_PINS]);

impl Deck {
    /// A deck with every pin standing.
    #[must_use]
    pub fn standing() -> Self {
        Self([false; NUMBER_OF_PINS])
    }

    /// A deck with every pin down.
    #[must_use]
    pub fn cleared() -> Self {
        Self([true; NUMBER_OF_PINS])
    }

    /// Build a deck from a down/standing array in pin order.
    #[must_use]
    pub fn new(pins: [bool; NUMBER_OF_PINS]) -> Self {
        Self(pins)
    }

    /// Build a deck from a bitmask where bit 0 is the left two pin.
    #[must_use]
    pub fn from_mask(mask: u8) -> Self {
        let mut pins = [false; NUMBER_OF_PINS];
        for (i, pin) in pins.iter_mut().enumerate() {
            *pin = mask & (1 << i) != 0;
        }
        Self(pins)
    }

    /// Bitmask of downed pins, bit 0 being the left two pin.
    #[must_use]
    pub fn to_mask(&self) -> u8 {
        self.0
            .iter()
            .enumerate()
            .filter(|(_, down)| **down)
            .fold(0, |mask, (i, _)| mask | (1 << i))
    }

    /// Check whether a pin is down.
    #[must_use]
    pub fn is_down(&self, pin: Pin) -> bool {
        self.0[pin.index()]
    }

    /// Knock a pin down.
    pub fn knock_down(&mut self, pin: Pin) {
        self.0[pin.index()] = true;
    }

    /// Total value of the downed pins.
    #[must_use]
    pub fn value(&self) -> u32 {
        Pin::ALL
            .iter()
            .filter(|pin| self.is_down(**pin))
            .map(|pin| pin.value())
            .sum()
    }

    /// Value of the pins still standing.
    #[must_use]
    pub fn pins_left_value(&self) -> u32 {
        MAX_DECK_VALUE - self.value()
    }

    /// Whether every pin is down.
    #[must_use]
    pub fn is_cleared(&self) -> bool {
        self.0.iter().all(|down| *down)
    }

    /// Whether every pin down in `other` is also down here.
    #[must_use]
    pub fn contains(&self, other: &Deck) -> bool {
        self.0.iter().zip(other.0.iter()).all(|(a, b)| *a || !*b)
    }

    /// Union of the downed pins of both decks.
    #[must_use]
    pub fn merge(&self, other: &Deck) -> Deck {
        let mut pins = self.0;
        for (pin, down) in pins.iter_mut().zip(other.0.iter()) {
            *pin |= *down;
        }
        Deck(pins)
    }

    /// Classify this deck as the result of a first ball.
    #[must_use]
    pub fn first_ball_kind(&self) -> FirstBallKind {
        FirstBallKind::classify(self)
    }
}

impl fmt::Display for Deck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for down in self.0 {
            write!(f, "{}", if down { '1' } else { '0' })?;
        }
        Ok(())
    }
}

impl FromStr for Deck {
    type Err = Error;

    /// Parse five `0`/`1` characters in pin order, `1` meaning down.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let chars: Vec<char> = s.trim().chars().collect();
        if chars.len() != NUMBER_OF_PINS {
            return Err(Error::invalid_input(format!(
                "deck must have {NUMBER_OF_PINS} pins, got '{s}'"
            )));
        }

        let mut pins = [false; NUMBER_OF_PINS];
        for (pin, c) in pins.iter_mut().zip(chars) {
            *pin = match c {
                '1' => true,
                '0' => false,
                other => {
                    return Err(Error::invalid_input(format!(
                        "invalid pin '{other}' in '{s}', expected 0 or 1"
                    )))
                }
            };
        }
        Ok(Self(pins))
    }
}

/// Outcome of the first ball of a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FirstBallKind {
    /// All five pins.
    Strike,
    /// Everything except the left two pin.
    Left,
    /// Everything except the right two pin.
    Right,
    /// Head pin and both threes.
    Ace,
    /// Head pin with the left three and left two.
    LeftChopOff,
    /// Head pin with the right three and right two.
    RightChopOff,
    /// Head pin, left three and right two.
    LeftSplitWithBonus,
    /// Head pin, right three and left two.
    RightSplitWithBonus,
    /// Head pin and left three.
    LeftSplit,
    /// Head pin and right three.
    RightSplit,
    /// Head pin alone.
    HeadPin,
    /// Head pin and one two pin.
    HeadPinTwo,
    /// Any other ball that took the head pin.
    MiddleHit,
    /// The head pin is still standing.
    Miss,
}

impl FirstBallKind {
    fn classify(deck: &Deck) -> Self {
        let [l2, l3, h, r3, r2] = deck.0;
        if !h {
            return Self::Miss;
        }

        match (l2, l3, r3, r2) {
            (true, true, true, true) => Self::Strike,
            (false, true, true, true) => Self::Left,
            (true, true, true, false) => Self::Right,
            (false, true, true, false) => Self::Ace,
            (true, true, false, false) => Self::LeftChopOff,
            (false, false, true, true) => Self::RightChopOff,
            (false, true, false, true) => Self::LeftSplitWithBonus,
            (true, false, true, false) => Self::RightSplitWithBonus,
            (false, true, false, false) => Self::LeftSplit,
            (false, false, true, false) => Self::RightSplit,
            (false, false, false, false) => Self::HeadPin,
            (true, false, false, false) | (false, false, false, true) => Self::HeadPinTwo,
            (true, false, false, true) | (true, false, true, true) | (true, true, false, true) => {
                Self::MiddleHit
            }
        }
    }

    /// Whether the head pin went down.
    #[must_use]
    pub fn is_middle_hit(self) -> bool {
        self != Self::Miss
    }

    /// Left or right.
    #[must_use]
    pub fn is_left_or_right(self) -> bool {
        matches!(self, Self::Left | Self::Right)
    }

    /// Either chop off.
    #[must_use]
    pub fn is_chop_off(self) -> bool {
        matches!(self, Self::LeftChopOff | Self::RightChopOff)
    }

    /// Any split, with or without the bonus two pin.
    #[must_use]
    pub fn is_split(self) -> bool {
        matches!(
            self,
            Self::LeftSplit | Self::RightSplit | Self::LeftSplitWithBonus | Self::RightSplitWithBonus
        )
    }

    /// Head pin alone or with a two pin.
    #[must_use]
    pub fn is_head_pin(self) -> bool {
        matches!(self, Self::HeadPin | Self::HeadPinTwo)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn deck(s: &str) -> Deck {
        s.parse().unwrap()
    }

    #[test]
    fn test_pin_values_total_fifteen() {
        let total: u32 = Pin::ALL.iter().map(|p| p.value()).sum();
        assert_eq!(total, MAX_DECK_VALUE);
    }

    #[test]
    fn test_deck_value() {
        assert_eq!(Deck::standing().value(), 0);
        assert_eq!(Deck::cleared().value(), 15);
        assert_eq!(deck("00100").value(), 5);
        assert_eq!(deck("01110").value(), 11);
        assert_eq!(deck("10001").value(), 4);
    }

    #[test]
    fn test_pins_left_value() {
        assert_eq!(deck("01111").pins_left_value(), 2);
        assert_eq!(Deck::standing().pins_left_value(), 15);
    }

    #[test]
    fn test_mask_conversion() {
        let d = deck("10100");
        assert_eq!(d.to_mask(), 0b00101);
        assert_eq!(Deck::from_mask(0b00101), d);
        assert_eq!(Deck::from_mask(0b11111), Deck::cleared());
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert!("0101".parse::<Deck>().is_err());
        assert!("01x10".parse::<Deck>().is_err());
        assert!("011100".parse::<Deck>().is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(deck("01110").to_string(), "01110");
    }

    #[test]
    fn test_contains_and_merge() {
        let first = deck("00100");
        let second = deck("01110");
        assert!(second.contains(&first));
        assert!(!first.contains(&second));
        assert_eq!(first.merge(&deck("10000")), deck("10100"));
    }

    #[test]
    fn test_first_ball_kinds() {
        assert_eq!(deck("11111").first_ball_kind(), FirstBallKind::Strike);
        assert_eq!(deck("01111").first_ball_kind(), FirstBallKind::Left);
        assert_eq!(deck("11110").first_ball_kind(), FirstBallKind::Right);
        assert_eq!(deck("01110").first_ball_kind(), FirstBallKind::Ace);
        assert_eq!(deck("11100").first_ball_kind(), FirstBallKind::LeftChopOff);
        assert_eq!(deck("00111").first_ball_kind(), FirstBallKind::RightChopOff);
        assert_eq!(
            deck("01101").first_ball_kind(),
            FirstBallKind::LeftSplitWithBonus
        );
        assert_eq!(
            deck("10110").first_ball_kind(),
            FirstBallKind::RightSplitWithBonus
        );
        assert_eq!(deck("01100").first_ball_kind(), FirstBallKind::LeftSplit);
        assert_eq!(deck("00110").first_ball_kind(), FirstBallKind::RightSplit);
        assert_eq!(deck("00100").first_ball_kind(), FirstBallKind::HeadPin);
        assert_eq!(deck("10100").first_ball_kind(), FirstBallKind::HeadPinTwo);
        assert_eq!(deck("00101").first_ball_kind(), FirstBallKind::HeadPinTwo);
        assert_eq!(deck("10101").first_ball_kind(), FirstBallKind::MiddleHit);
        assert_eq!(deck("11011").first_ball_kind(), FirstBallKind::Miss);
    }

    #[test]
    fn test_kind_groups() {
        assert!(FirstBallKind::Strike.is_middle_hit());
        assert!(!FirstBallKind::Miss.is_middle_hit());
        assert!(FirstBallKind::Left.is_left_or_right());
        assert!(FirstBallKind::RightChopOff.is_chop_off());
        assert!(FirstBallKind::LeftSplitWithBonus.is_split());
        assert!(!FirstBallKind::Ace.is_split());
        assert!(FirstBallKind::HeadPinTwo.is_head_pin());
    }
}
