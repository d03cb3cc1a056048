use crate::combat::DamageRoll;
use crate::state::Terrain;

use super::DiceExpr;

/// Static description of an area effect.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ZoneDefinition {
    pub id: String,
    pub name: String,
    pub shape: ZoneShape,
    pub radius: u32,
    /// Lifetime in rounds, at least 1.
    pub duration: u32,
    pub effect: ZoneEffectSpec,
    pub affects_friendly: bool,
    pub affects_enemy: bool,
}

/// The payload a zone applies to combatants inside it.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ZoneEffectSpec {
    pub kind: ZoneEffectKind,
    pub damage: Option<DamageRoll>,
    pub heal: Option<DiceExpr>,
    pub status_effect: Option<String>,
    pub status_scope: StatusScope,
    /// Terrain laid over plain cells while the zone lasts.
    pub terrain_modifier: Option<Terrain>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::EnumString, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(ascii_case_insensitive)]
pub enum ZoneShape {
    Circle,
    Square,
    Line,
    Cone,
    Ring,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::EnumString, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(ascii_case_insensitive)]
pub enum ZoneEffectKind {
    Damage,
    Heal,
    Buff,
    Debuff,
    Terrain,
}

/// When a zone's status effect is applied and removed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, strum::EnumString, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(ascii_case_insensitive)]
pub enum StatusScope {
    /// Applied on each zone tick and left to run its own duration.
    #[default]
    OnTick,
    /// Applied on entry and removed on exit.
    WhileInside,
}

pub trait ZoneOracle {
    fn zone(&self, id: &str) -> Option<&ZoneDefinition>;
}
