//! Dice expressions and injectable dice sources.

use std::collections::VecDeque;
use std::fmt;
use std::str::FromStr;

use crate::error::{ErrorSeverity, GameError};

use super::rng::{PcgRng, RngOracle, compute_seed};

/// A dice expression such as `3d6`, `1d8+2`, `2d4-1` or a flat `5`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "String", into = "String"))]
pub struct DiceExpr {
    pub count: u32,
    pub sides: u32,
    pub bonus: i32,
}

impl DiceExpr {
    pub const MAX_DICE: u32 = 100;
    pub const MAX_SIDES: u32 = 1000;

    pub const fn new(count: u32, sides: u32, bonus: i32) -> Self {
        Self {
            count,
            sides,
            bonus,
        }
    }

    pub const fn flat(value: i32) -> Self {
        Self {
            count: 0,
            sides: 0,
            bonus: value,
        }
    }

    /// Rolls the expression. Totals never go below zero.
    pub fn roll(&self, dice: &mut dyn DiceSource) -> u32 {
        let mut total = i64::from(self.bonus);
        for _ in 0..self.count {
            total = total.saturating_add(i64::from(dice.roll_die(self.sides)));
        }
        total.clamp(0, i64::from(u32::MAX)) as u32
    }
}

impl fmt::Display for DiceExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.count == 0 {
            return write!(f, "{}", self.bonus);
        }
        write!(f, "{}d{}", self.count, self.sides)?;
        match self.bonus {
            0 => Ok(()),
            b if b > 0 => write!(f, "+{b}"),
            b => write!(f, "{b}"),
        }
    }
}

impl FromStr for DiceExpr {
    type Err = DiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text: String = s.chars().filter(|c| !c.is_whitespace()).collect();
        if text.is_empty() {
            return Err(DiceError::Empty);
        }
        let malformed = || DiceError::Malformed(s.to_string());

        let Some((count, rest)) = text.split_once(['d', 'D']) else {
            let value = text.parse::<i32>().map_err(|_| malformed())?;
            return Ok(Self::flat(value));
        };

        let count = if count.is_empty() {
            1
        } else {
            count.parse::<u32>().map_err(|_| malformed())?
        };

        let (sides, bonus) = match rest.find(['+', '-']) {
            Some(idx) => {
                let (sides, bonus) = rest.split_at(idx);
                (sides, bonus.parse::<i32>().map_err(|_| malformed())?)
            }
            None => (rest, 0),
        };
        let sides = sides.parse::<u32>().map_err(|_| malformed())?;

        if sides == 0 {
            return Err(DiceError::ZeroSides(s.to_string()));
        }
        if count > Self::MAX_DICE {
            return Err(DiceError::TooManyDice(s.to_string()));
        }
        if sides > Self::MAX_SIDES {
            return Err(DiceError::TooManySides(s.to_string()));
        }
        Ok(Self::new(count, sides, bonus))
    }
}

impl TryFrom<String> for DiceExpr {
    type Error = DiceError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<DiceExpr> for String {
    fn from(value: DiceExpr) -> Self {
        value.to_string()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum DiceError {
    #[error("dice expression is empty")]
    Empty,

    #[error("malformed dice expression '{0}'")]
    Malformed(String),

    #[error("dice expression '{0}' has zero-sided dice")]
    ZeroSides(String),

    #[error("dice expression '{0}' rolls too many dice")]
    TooManyDice(String),

    #[error("dice expression '{0}' has too many sides per die")]
    TooManySides(String),
}

impl GameError for DiceError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Validation
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::Empty => "DICE_EMPTY",
            Self::Malformed(_) => "DICE_MALFORMED",
            Self::ZeroSides(_) => "DICE_ZERO_SIDES",
            Self::TooManyDice(_) => "DICE_TOO_MANY",
            Self::TooManySides(_) => "DICE_TOO_MANY_SIDES",
        }
    }
}

/// Source of die rolls consumed by the resolvers.
pub trait DiceSource {
    /// Rolls one die, returning a value in `1..=sides`.
    fn roll_die(&mut self, sides: u32) -> u32;

    fn d20(&mut self) -> u32 {
        self.roll_die(20)
    }
}

/// Reproducible dice driven by a combat seed and a roll counter.
#[derive(Clone, Debug)]
pub struct SeededDice<R: RngOracle = PcgRng> {
    rng: R,
    seed: u64,
    nonce: u64,
}

impl SeededDice<PcgRng> {
    pub fn new(seed: u64) -> Self {
        Self::with_rng(PcgRng, seed)
    }
}

impl<R: RngOracle> SeededDice<R> {
    pub fn with_rng(rng: R, seed: u64) -> Self {
        Self {
            rng,
            seed,
            nonce: 0,
        }
    }

    /// Number of dice rolled so far.
    pub fn rolls(&self) -> u64 {
        self.nonce
    }
}

impl<R: RngOracle> DiceSource for SeededDice<R> {
    fn roll_die(&mut self, sides: u32) -> u32 {
        let seed = compute_seed(self.seed, self.nonce, 0, sides);
        self.nonce += 1;
        self.rng.roll_die(seed, sides)
    }
}

/// Replays a fixed sequence of die faces.
///
/// Each scripted value is clamped into `1..=sides` of the die being rolled.
/// Once the script is exhausted every roll returns 1.
#[derive(Clone, Debug, Default)]
pub struct ScriptedDice {
    rolls: VecDeque<u32>,
}

impl ScriptedDice {
    pub fn new(rolls: impl IntoIterator<Item = u32>) -> Self {
        Self {
            rolls: rolls.into_iter().collect(),
        }
    }

    pub fn push(&mut self, roll: u32) {
        self.rolls.push_back(roll);
    }

    pub fn remaining(&self) -> usize {
        self.rolls.len()
    }
}

impl DiceSource for ScriptedDice {
    fn roll_die(&mut self, sides: u32) -> u32 {
        if sides == 0 {
            return 0;
        }
        self.rolls.pop_front().unwrap_or(1).clamp(1, sides)
    }
}
