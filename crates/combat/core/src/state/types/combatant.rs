use std::collections::BTreeMap;

use crate::env::DiceExpr;

use super::{
    CombatantId, ComboProgress, Faction, Health, Position, StatModifiers, StatusEffects,
};

/// Raw STR and DEX scores. Modifiers follow `(score - 10) / 2`, rounded down.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Attributes {
    pub strength: i32,
    pub dexterity: i32,
}

impl Attributes {
    pub const fn new(strength: i32, dexterity: i32) -> Self {
        Self {
            strength,
            dexterity,
        }
    }

    pub const fn modifier(score: i32) -> i32 {
        (score - 10).div_euclid(2)
    }

    pub const fn strength_mod(&self) -> i32 {
        Self::modifier(self.strength)
    }

    pub const fn dexterity_mod(&self) -> i32 {
        Self::modifier(self.dexterity)
    }
}

impl Default for Attributes {
    fn default() -> Self {
        Self::new(10, 10)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ArmorWeight {
    Light,
    Medium,
    Heavy,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Armor {
    pub name: String,
    pub weight: ArmorWeight,
    pub durability: u32,
}

/// Equipment relevant to defensive actions and hazards.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Loadout {
    /// Defense bonus of the equipped shield, if any.
    pub shield_bonus: Option<u32>,
    pub armor: Option<Armor>,
    /// Damage dice of the equipped melee weapon, if any.
    pub melee_weapon: Option<DiceExpr>,
}

impl Loadout {
    pub fn wears_heavy_armor(&self) -> bool {
        self.armor
            .as_ref()
            .is_some_and(|armor| armor.weight == ArmorWeight::Heavy)
    }
}

/// Active stance plus the modifiers it currently grants.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StanceState {
    pub stance_id: String,
    pub modifiers: StatModifiers,
    /// Set once the round's change allowance is used; cleared at round start.
    pub changed_this_round: bool,
}

impl StanceState {
    pub fn new(stance_id: impl Into<String>, modifiers: StatModifiers) -> Self {
        Self {
            stance_id: stance_id.into(),
            modifiers,
            changed_this_round: false,
        }
    }
}

/// A participant in combat.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Combatant {
    pub id: CombatantId,
    pub name: String,
    pub faction: Faction,
    pub health: Health,
    pub position: Position,
    pub attributes: Attributes,
    pub loadout: Loadout,
    pub stance: StanceState,
    pub reaction_available: bool,
    /// Took the defend action; grants a bonus to reactions until the next turn.
    pub defending: bool,
    pub status_effects: StatusEffects,
    pub combos: BTreeMap<String, ComboProgress>,
    pub initiative: i32,
    /// Stuck in a hazard that requires a climb action to leave.
    pub trapped: bool,
    /// Boss that summoned this combatant, if any.
    pub summoned_by: Option<CombatantId>,
}

impl Combatant {
    /// Creates a combatant at full health in the given stance.
    pub fn new(
        id: CombatantId,
        name: impl Into<String>,
        faction: Faction,
        max_health: u32,
        position: Position,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            faction,
            health: Health::full(max_health),
            position,
            attributes: Attributes::default(),
            loadout: Loadout::default(),
            stance: StanceState::new(String::new(), StatModifiers::NONE),
            reaction_available: true,
            defending: false,
            status_effects: StatusEffects::empty(),
            combos: BTreeMap::new(),
            initiative: 0,
            trapped: false,
            summoned_by: None,
        }
    }

    pub fn with_attributes(mut self, attributes: Attributes) -> Self {
        self.attributes = attributes;
        self
    }

    pub fn with_loadout(mut self, loadout: Loadout) -> Self {
        self.loadout = loadout;
        self
    }

    pub fn with_initiative(mut self, initiative: i32) -> Self {
        self.initiative = initiative;
        self
    }

    pub fn with_health(mut self, current: u32) -> Self {
        self.health = Health::new(current, self.health.max());
        self
    }

    pub fn is_alive(&self) -> bool {
        self.health.is_alive()
    }

    pub fn is_friendly_to(&self, other: &Combatant) -> bool {
        self.faction == other.faction
    }
}
