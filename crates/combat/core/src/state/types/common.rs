use std::fmt;
use std::ops::{Add, AddAssign};

/// Unique identifier for a combatant within one combat session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CombatantId(pub u32);

impl fmt::Display for CombatantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Discrete grid position expressed in cell coordinates. `y` grows southward.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const ORIGIN: Self = Self { x: 0, y: 0 };

    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    /// Returns the adjacent position one cell in `direction`.
    pub const fn step(self, direction: Direction) -> Self {
        let (dx, dy) = direction.delta();
        self.offset(dx, dy)
    }

    pub const fn distance_squared(self, other: Self) -> i32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }

    /// Chebyshev distance, the number of king moves between two cells.
    pub fn chebyshev(self, other: Self) -> i32 {
        (self.x - other.x).abs().max((self.y - other.y).abs())
    }
}

impl From<(i32, i32)> for Position {
    fn from((x, y): (i32, i32)) -> Self {
        Self::new(x, y)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Eight-way grid direction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::EnumString, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(ascii_case_insensitive)]
pub enum Direction {
    North,
    NorthEast,
    East,
    SouthEast,
    South,
    SouthWest,
    West,
    NorthWest,
}

impl Direction {
    pub const ALL: [Direction; 8] = [
        Direction::North,
        Direction::NorthEast,
        Direction::East,
        Direction::SouthEast,
        Direction::South,
        Direction::SouthWest,
        Direction::West,
        Direction::NorthWest,
    ];

    pub const fn delta(self) -> (i32, i32) {
        match self {
            Direction::North => (0, -1),
            Direction::NorthEast => (1, -1),
            Direction::East => (1, 0),
            Direction::SouthEast => (1, 1),
            Direction::South => (0, 1),
            Direction::SouthWest => (-1, 1),
            Direction::West => (-1, 0),
            Direction::NorthWest => (-1, -1),
        }
    }

    pub fn from_delta(dx: i32, dy: i32) -> Option<Self> {
        match (dx.signum(), dy.signum()) {
            (0, -1) => Some(Direction::North),
            (1, -1) => Some(Direction::NorthEast),
            (1, 0) => Some(Direction::East),
            (1, 1) => Some(Direction::SouthEast),
            (0, 1) => Some(Direction::South),
            (-1, 1) => Some(Direction::SouthWest),
            (-1, 0) => Some(Direction::West),
            (-1, -1) => Some(Direction::NorthWest),
            _ => None,
        }
    }

    /// Direction that moves `target` further away from `origin`.
    ///
    /// Returns `None` when both positions coincide.
    pub fn away_from(origin: Position, target: Position) -> Option<Self> {
        Self::from_delta(target.x - origin.x, target.y - origin.y)
    }

    /// Delta rotated a quarter turn clockwise, used to widen cones.
    pub const fn perpendicular(self) -> (i32, i32) {
        let (dx, dy) = self.delta();
        (-dy, dx)
    }
}

/// Allegiance used for friend/foe checks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Faction {
    Party,
    Hostile,
}

/// Current and maximum health. Current is always clamped to `[0, max]`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Health {
    current: u32,
    max: u32,
}

impl Health {
    pub const fn full(max: u32) -> Self {
        Self { current: max, max }
    }

    pub fn new(current: u32, max: u32) -> Self {
        Self {
            current: current.min(max),
            max,
        }
    }

    pub const fn current(&self) -> u32 {
        self.current
    }

    pub const fn max(&self) -> u32 {
        self.max
    }

    pub const fn is_alive(&self) -> bool {
        self.current > 0
    }

    /// Removes up to `amount` health, returning the amount actually removed.
    pub fn damage(&mut self, amount: u32) -> u32 {
        let dealt = amount.min(self.current);
        self.current -= dealt;
        dealt
    }

    /// Restores up to `amount` health, returning the amount actually restored.
    pub fn heal(&mut self, amount: u32) -> u32 {
        let healed = amount.min(self.max - self.current);
        self.current += healed;
        healed
    }

    /// Whole-number percentage of max health remaining, rounded down.
    pub fn percent(&self) -> u32 {
        if self.max == 0 {
            return 0;
        }
        (u64::from(self.current) * 100 / u64::from(self.max)) as u32
    }

    /// True when health is at or below `threshold` percent of max.
    ///
    /// Compared without division so 49.5% is not rounded onto a 50% threshold.
    pub fn at_or_below_percent(&self, threshold: u32) -> bool {
        u64::from(self.current) * 100 <= u64::from(threshold) * u64::from(self.max)
    }
}

/// Flat modifiers to attack, defense, and saving throws.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct StatModifiers {
    pub attack: i32,
    pub defense: i32,
    pub save: i32,
}

impl StatModifiers {
    pub const NONE: Self = Self {
        attack: 0,
        defense: 0,
        save: 0,
    };

    pub const fn is_empty(&self) -> bool {
        self.attack == 0 && self.defense == 0 && self.save == 0
    }

    pub const fn scaled(self, factor: i32) -> Self {
        Self {
            attack: self.attack * factor,
            defense: self.defense * factor,
            save: self.save * factor,
        }
    }
}

impl Add for StatModifiers {
    type Output = StatModifiers;

    fn add(self, rhs: Self) -> Self {
        Self {
            attack: self.attack + rhs.attack,
            defense: self.defense + rhs.defense,
            save: self.save + rhs.save,
        }
    }
}

impl AddAssign for StatModifiers {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}
