use crate::combat::DamageType;
use crate::state::StatModifiers;

use super::DiceExpr;

/// Static description of a status effect.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StatusEffectDefinition {
    pub id: String,
    pub name: String,
    pub category: StatusCategory,
    pub stacking: StackingRule,
    /// Upper bound on stacks; only meaningful for [`StackingRule::Stack`].
    pub max_stacks: u32,
    /// Duration in turns. `None` lasts until removed.
    pub duration: Option<u32>,
    pub tick: Option<TickEffect>,
    pub cleansable: bool,
    pub dispellable: bool,
    /// Per-stack modifiers while the effect is active.
    pub modifiers: StatModifiers,
}

impl StatusEffectDefinition {
    pub fn is_harmful(&self) -> bool {
        matches!(
            self.category,
            StatusCategory::Debuff | StatusCategory::Control | StatusCategory::DamageOverTime
        )
    }

    pub fn is_beneficial(&self) -> bool {
        matches!(
            self.category,
            StatusCategory::Buff | StatusCategory::HealOverTime
        )
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::EnumString, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(ascii_case_insensitive)]
pub enum StatusCategory {
    Buff,
    Debuff,
    Control,
    #[strum(serialize = "DamageOverTime", serialize = "dot")]
    DamageOverTime,
    #[strum(serialize = "HealOverTime", serialize = "hot")]
    HealOverTime,
}

/// What happens when an effect is applied to a target that already has it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::EnumString, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(ascii_case_insensitive)]
pub enum StackingRule {
    /// Only the duration is refreshed.
    #[strum(serialize = "Refresh", serialize = "none")]
    Refresh,
    /// Stacks increase up to the cap, then the duration is refreshed.
    Stack,
    /// The old instance is removed and a fresh one applied.
    Replace,
}

/// Per-turn damage or healing carried by an effect.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TickEffect {
    Damage { dice: DiceExpr, damage_type: DamageType },
    Heal { dice: DiceExpr },
}

pub trait StatusEffectOracle {
    fn status_effect(&self, id: &str) -> Option<&StatusEffectDefinition>;
}
