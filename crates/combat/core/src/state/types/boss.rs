use crate::env::SummonConfig;

use super::{CombatantId, StatModifiers};

/// Runtime state of one boss instance.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BossState {
    pub boss_id: String,
    pub combatant: CombatantId,
    /// Never decreases.
    pub phase: u32,
    pub vulnerable_turns: u32,
    pub summon: Option<SummonCadence>,
    pub active_summons: u32,
    /// Abilities the boss may use in the current phase.
    pub ability_pool: Vec<String>,
    pub stat_modifiers: StatModifiers,
    pub defeated: bool,
}

impl BossState {
    pub fn new(boss_id: impl Into<String>, combatant: CombatantId) -> Self {
        Self {
            boss_id: boss_id.into(),
            combatant,
            phase: 1,
            vulnerable_turns: 0,
            summon: None,
            active_summons: 0,
            ability_pool: Vec::new(),
            stat_modifiers: StatModifiers::NONE,
            defeated: false,
        }
    }

    pub fn is_vulnerable(&self) -> bool {
        self.vulnerable_turns > 0
    }
}

/// Summon schedule started by a phase.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SummonCadence {
    pub config: SummonConfig,
    /// Boss turns since the last summon.
    pub turns_since_summon: u32,
}

impl SummonCadence {
    pub fn new(config: SummonConfig) -> Self {
        Self {
            config,
            turns_since_summon: 0,
        }
    }
}
