use crate::config::CombatConfig;
use crate::env::{CombatEnv, DiceSource};
use crate::error::CombatResult;
use crate::event::{CombatEvent, EventBus};
use crate::state::CombatState;

/// Everything a resolver needs for one call: mutable state, read-only
/// definitions, the dice, and the event sink.
pub struct CombatContext<'a> {
    pub state: &'a mut CombatState,
    pub env: CombatEnv<'a>,
    pub dice: &'a mut dyn DiceSource,
    pub events: &'a mut EventBus,
}

impl<'a> CombatContext<'a> {
    pub fn new(
        state: &'a mut CombatState,
        env: CombatEnv<'a>,
        dice: &'a mut dyn DiceSource,
        events: &'a mut EventBus,
    ) -> Self {
        Self {
            state,
            env,
            dice,
            events,
        }
    }

    /// Publishes an event stamped with the current round.
    pub fn emit(&mut self, event: CombatEvent) {
        self.events.publish(self.state.round, event);
    }

    pub fn config(&self) -> CombatResult<&'a CombatConfig> {
        Ok(self.env.config()?)
    }

    pub fn round(&self) -> u32 {
        self.state.round
    }
}
