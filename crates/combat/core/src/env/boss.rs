use crate::state::StatModifiers;

/// Static description of a multi-phase boss encounter.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BossDefinition {
    pub id: String,
    pub name: String,
    /// Ordered by phase number; phase 1 has a threshold of 100.
    pub phases: Vec<BossPhase>,
    pub loot: Vec<LootEntry>,
}

impl BossDefinition {
    pub fn phase(&self, number: u32) -> Option<&BossPhase> {
        self.phases.iter().find(|phase| phase.number == number)
    }

    /// Highest-numbered phase whose threshold has been reached, if above `current`.
    pub fn phase_for_health(
        &self,
        current: u32,
        reached: impl Fn(u32) -> bool,
    ) -> Option<&BossPhase> {
        self.phases
            .iter()
            .filter(|phase| phase.number > current && reached(phase.health_threshold))
            .max_by_key(|phase| phase.number)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BossPhase {
    pub number: u32,
    pub name: String,
    /// Percentage of max health at or below which this phase begins.
    pub health_threshold: u32,
    pub transition_text: Option<String>,
    /// Replaces the boss's usable abilities when non-empty.
    pub ability_pool: Vec<String>,
    pub stat_modifiers: StatModifiers,
    pub summon: Option<SummonConfig>,
    /// Opens a vulnerability window of this many boss turns on entry.
    pub vulnerable_turns: Option<u32>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SummonConfig {
    pub monster_id: String,
    pub count: u32,
    pub interval_turns: u32,
    pub max_active: u32,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LootEntry {
    pub item_id: String,
    pub amount: u32,
    /// Drop chance in percent, `0..=100`.
    pub chance: u32,
}

pub trait BossOracle {
    fn boss(&self, id: &str) -> Option<&BossDefinition>;
}
