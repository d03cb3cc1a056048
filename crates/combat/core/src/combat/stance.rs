//! Stance selection with a once-per-round change allowance.

use crate::env::StatusCategory;
use crate::error::CombatResult;
use crate::event::CombatEvent;
use crate::state::{CombatantId, StanceState, StatModifiers};

use super::{CombatContext, status};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StanceRejection {
    /// The round's change allowance is already spent.
    AlreadyChanged,
    /// Under a control effect.
    Incapacitated,
    Defeated,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StanceChangeOutcome {
    Changed { old: String, new: String },
    /// The requested stance is already active; the allowance is untouched.
    AlreadyInStance,
    Rejected(StanceRejection),
}

/// Puts a combatant in the default stance without publishing events.
///
/// A default id with no matching definition grants no modifiers.
pub fn assign_default(ctx: &mut CombatContext<'_>, combatant: CombatantId) -> CombatResult<()> {
    let stance_id = ctx.env.default_stance_id()?;
    let modifiers = ctx
        .env
        .stance(&stance_id)
        .map(|def| def.modifiers)
        .unwrap_or(StatModifiers::NONE);
    ctx.state.combatant_mut(combatant)?.stance = StanceState::new(stance_id, modifiers);
    Ok(())
}

/// Switches `combatant` into `stance_id`.
///
/// # Errors
///
/// Unknown stance ids are configuration errors.
pub fn change_stance(
    ctx: &mut CombatContext<'_>,
    combatant: CombatantId,
    stance_id: &str,
) -> CombatResult<StanceChangeOutcome> {
    let config = ctx.config()?;
    let def = ctx.env.stance(stance_id)?;
    let env = ctx.env;
    let current = ctx.state.combatant(combatant)?;

    if current.stance.stance_id == def.id {
        return Ok(StanceChangeOutcome::AlreadyInStance);
    }
    let rejection = if !current.is_alive() {
        Some(StanceRejection::Defeated)
    } else if current.stance.changed_this_round {
        Some(StanceRejection::AlreadyChanged)
    } else if current.status_effects.iter().any(|instance| {
        env.status_effect(&instance.effect_id)
            .is_ok_and(|def| def.category == StatusCategory::Control)
    }) {
        Some(StanceRejection::Incapacitated)
    } else {
        None
    };
    if let Some(reason) = rejection {
        tracing::debug!("stance change for {} rejected: {:?}", combatant, reason);
        if reason == StanceRejection::Incapacitated
            && config.rejected_stance_change_consumes_allowance
        {
            ctx.state.combatant_mut(combatant)?.stance.changed_this_round = true;
        }
        return Ok(StanceChangeOutcome::Rejected(reason));
    }

    let target = ctx.state.combatant_mut(combatant)?;
    let old = std::mem::replace(&mut target.stance, StanceState::new(def.id.clone(), def.modifiers));
    target.stance.changed_this_round = true;
    tracing::debug!(
        "{} switched stance {} -> {}",
        target.name,
        old.stance_id,
        def.id
    );

    ctx.emit(CombatEvent::StanceModifiersRemoved {
        combatant,
        stance_id: old.stance_id.clone(),
        modifiers: old.modifiers,
    });
    ctx.emit(CombatEvent::StanceModifiersApplied {
        combatant,
        stance_id: def.id.clone(),
        modifiers: def.modifiers,
    });
    ctx.emit(CombatEvent::StanceChanged {
        combatant,
        old_stance: old.stance_id.clone(),
        new_stance: def.id.clone(),
    });
    Ok(StanceChangeOutcome::Changed {
        old: old.stance_id,
        new: def.id.clone(),
    })
}

/// Re-enables one stance change for everyone. Runs at round start.
pub fn reset_round(ctx: &mut CombatContext<'_>) -> u32 {
    let mut combatants_reset = 0;
    for combatant in ctx.state.combatants_mut() {
        if combatant.stance.changed_this_round {
            combatant.stance.changed_this_round = false;
            combatants_reset += 1;
        }
    }
    let round = ctx.round();
    ctx.emit(CombatEvent::StanceChangeReset {
        round,
        combatants_reset,
    });
    combatants_reset
}

/// Stance plus status effect modifiers currently on `combatant`.
pub fn effective_modifiers(
    ctx: &CombatContext<'_>,
    combatant: CombatantId,
) -> CombatResult<StatModifiers> {
    let stance = ctx.state.combatant(combatant)?.stance.modifiers;
    Ok(stance + status::modifiers(ctx, combatant)?)
}
