use crate::combat::DamageType;

use super::DiceExpr;

/// A multi-step ability sequence that grants bonuses when finished in time.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ComboDefinition {
    pub id: String,
    pub name: String,
    /// Turns allowed between consecutive steps.
    pub window_turns: u32,
    /// At least two steps.
    pub steps: Vec<ComboStep>,
    pub bonuses: Vec<ComboBonus>,
}

impl ComboDefinition {
    pub fn total_steps(&self) -> u32 {
        self.steps.len() as u32
    }

    /// Step by 1-based index.
    pub fn step(&self, number: u32) -> Option<&ComboStep> {
        number
            .checked_sub(1)
            .and_then(|idx| self.steps.get(idx as usize))
    }

    pub fn starting_ability(&self) -> Option<&str> {
        self.steps.first().map(|step| step.ability_id.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ComboStep {
    pub ability_id: String,
    pub target: StepTarget,
}

/// Constraint on the target of a combo step relative to the previous step.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, strum::EnumString, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(ascii_case_insensitive)]
pub enum StepTarget {
    #[default]
    Any,
    SameTarget,
    DifferentTarget,
    #[strum(serialize = "SelfTarget", serialize = "self")]
    SelfTarget,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ComboBonus {
    pub effect: BonusEffect,
    pub target: BonusTarget,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BonusEffect {
    ExtraDamage {
        dice: DiceExpr,
        damage_type: DamageType,
    },
    /// Reported to the caller, which scales the finishing hit.
    DamageMultiplier { percent: u32 },
    ApplyStatus { effect_id: String },
    Heal { dice: DiceExpr },
    /// Reported to the caller, which owns cooldown bookkeeping.
    ResetCooldown { ability_id: String },
    /// Reported to the caller, which owns resource pools.
    RefundResource { resource: String, amount: u32 },
    /// Damage to every enemy within `radius` cells of the resolved target.
    AreaEffect {
        dice: DiceExpr,
        damage_type: DamageType,
        radius: u32,
    },
}

impl BonusEffect {
    pub fn kind(&self) -> BonusKind {
        match self {
            Self::ExtraDamage { .. } => BonusKind::ExtraDamage,
            Self::DamageMultiplier { .. } => BonusKind::DamageMultiplier,
            Self::ApplyStatus { .. } => BonusKind::ApplyStatus,
            Self::Heal { .. } => BonusKind::Heal,
            Self::ResetCooldown { .. } => BonusKind::ResetCooldown,
            Self::RefundResource { .. } => BonusKind::RefundResource,
            Self::AreaEffect { .. } => BonusKind::AreaEffect,
        }
    }
}

/// Discriminant of [`BonusEffect`], used in events and content files.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::EnumString, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(ascii_case_insensitive)]
pub enum BonusKind {
    ExtraDamage,
    DamageMultiplier,
    ApplyStatus,
    Heal,
    ResetCooldown,
    RefundResource,
    AreaEffect,
}

/// Who receives a combo bonus.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, strum::EnumString, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(ascii_case_insensitive)]
pub enum BonusTarget {
    #[default]
    LastTarget,
    #[strum(serialize = "Self", serialize = "Performer")]
    Performer,
    AllEnemies,
    AllAllies,
}

pub trait ComboOracle {
    fn combo(&self, id: &str) -> Option<&ComboDefinition>;

    /// Combos whose first step uses `ability_id`, in definition order.
    fn combos_starting_with(&self, ability_id: &str) -> Vec<&ComboDefinition>;
}
