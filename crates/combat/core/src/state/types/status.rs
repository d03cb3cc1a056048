//! Status effect instances carried by a combatant.
//!
//! Instances keep application order. Each instance refers to its definition by
//! id; stacking, duration, and tick rules come from the definition.

use arrayvec::ArrayVec;

use crate::config::CombatConfig;

use super::CombatantId;

/// One applied status effect.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StatusEffectInstance {
    pub effect_id: String,
    /// At least 1 and never above the definition's cap.
    pub stacks: u32,
    /// Turns left. `None` lasts until removed.
    pub remaining_turns: Option<u32>,
    pub source: Option<CombatantId>,
    /// Per-stack damage or healing rolled at application, 0 for effects without a tick.
    pub tick_amount: u32,
}

impl StatusEffectInstance {
    pub fn new(effect_id: impl Into<String>, remaining_turns: Option<u32>) -> Self {
        Self {
            effect_id: effect_id.into(),
            stacks: 1,
            remaining_turns,
            source: None,
            tick_amount: 0,
        }
    }

    pub fn with_source(mut self, source: Option<CombatantId>) -> Self {
        self.source = source;
        self
    }

    pub fn with_tick_amount(mut self, amount: u32) -> Self {
        self.tick_amount = amount;
        self
    }

    /// Counts down one turn. Returns true when the instance has run out.
    pub fn tick_down(&mut self) -> bool {
        match self.remaining_turns.as_mut() {
            Some(turns) => {
                *turns = turns.saturating_sub(1);
                *turns == 0
            }
            None => false,
        }
    }
}

/// Active status effects on a combatant, in application order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StatusEffects {
    effects: ArrayVec<StatusEffectInstance, { CombatConfig::MAX_STATUS_EFFECTS }>,
}

impl StatusEffects {
    pub fn empty() -> Self {
        Self {
            effects: ArrayVec::new(),
        }
    }

    pub fn get(&self, effect_id: &str) -> Option<&StatusEffectInstance> {
        self.effects.iter().find(|e| e.effect_id == effect_id)
    }

    pub fn get_mut(&mut self, effect_id: &str) -> Option<&mut StatusEffectInstance> {
        self.effects.iter_mut().find(|e| e.effect_id == effect_id)
    }

    pub fn contains(&self, effect_id: &str) -> bool {
        self.get(effect_id).is_some()
    }

    /// Appends a new instance, handing it back if every slot is taken.
    pub fn insert(&mut self, instance: StatusEffectInstance) -> Result<(), StatusEffectInstance> {
        self.effects.try_push(instance).map_err(|err| err.element())
    }

    pub fn remove(&mut self, effect_id: &str) -> Option<StatusEffectInstance> {
        let idx = self.effects.iter().position(|e| e.effect_id == effect_id)?;
        Some(self.effects.remove(idx))
    }

    pub fn clear(&mut self) -> Vec<StatusEffectInstance> {
        self.effects.drain(..).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &StatusEffectInstance> {
        self.effects.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut StatusEffectInstance> {
        self.effects.iter_mut()
    }

    pub fn ids(&self) -> Vec<String> {
        self.effects.iter().map(|e| e.effect_id.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.effects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.effects.is_full()
    }
}
