use crate::combat::DamageRoll;

bitflags::bitflags! {
    /// Behavioral flags attached to a hazard.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct HazardFlags: u8 {
        /// Entering traps the combatant until a successful climb.
        const REQUIRES_CLIMB_OUT = 0b0000_0001;
        /// Each exposure wears down equipped armor.
        const DEGRADES_ARMOR = 0b0000_0010;
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::EnumString, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(ascii_case_insensitive)]
pub enum HazardKind {
    Pit,
    Lava,
    Spikes,
    Acid,
    Fire,
    Ice,
    Poison,
    Electric,
}

/// Static description of an environmental hazard.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HazardDefinition {
    pub id: String,
    pub name: String,
    pub kind: HazardKind,
    /// Damage taken once when entering. Fall damage for pits.
    pub entry_damage: Option<DamageRoll>,
    /// Damage taken at each round start while standing in the hazard.
    pub turn_damage: Option<DamageRoll>,
    pub status_effect: Option<String>,
    pub flags: HazardFlags,
    /// Armor durability lost per exposure when [`HazardFlags::DEGRADES_ARMOR`] is set.
    pub armor_degradation: u32,
    /// DC of the climb-out check; the configured default applies when absent.
    pub climb_dc: Option<i32>,
}

pub trait HazardOracle {
    fn hazard(&self, id: &str) -> Option<&HazardDefinition>;
}
