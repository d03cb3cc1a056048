use std::collections::BTreeSet;
use std::fmt;

use crate::env::ZoneEffectSpec;

use super::{CombatantId, Position};

/// Identifier of a live zone, unique within one combat.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ZoneInstanceId(pub u32);

impl fmt::Display for ZoneInstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "zone-{}", self.0)
    }
}

/// An area effect bound to a fixed set of cells.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ZoneInstance {
    pub id: ZoneInstanceId,
    pub zone_id: String,
    pub name: String,
    pub caster: CombatantId,
    pub center: Position,
    pub cells: BTreeSet<Position>,
    /// Cells whose terrain this zone changed, restored on removal.
    pub reshaped: BTreeSet<Position>,
    pub remaining_turns: u32,
    pub effect: ZoneEffectSpec,
    pub affects_friendly: bool,
    pub affects_enemy: bool,
}

impl ZoneInstance {
    pub fn contains(&self, position: Position) -> bool {
        self.cells.contains(&position)
    }

    /// Counts down one round. Returns true once the zone has run out.
    pub fn tick_down(&mut self) -> bool {
        self.remaining_turns = self.remaining_turns.saturating_sub(1);
        self.remaining_turns == 0
    }
}
