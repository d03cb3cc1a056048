//! Status effect lifecycle: apply, stack, refresh, replace, tick, cleanse,
//! dispel, and removal on death.

use std::collections::BTreeMap;

use crate::env::{StackingRule, StatusEffectDefinition, TickEffect};
use crate::error::{CombatError, CombatResult};
use crate::event::{CombatEvent, EffectRemovalReason};
use crate::state::{CombatantId, StatModifiers, StatusEffectInstance};

use super::{CombatContext, damage};

/// What [`apply`] did to the target.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ApplyOutcome {
    Applied,
    Stacked { stacks: u32 },
    Refreshed,
    Replaced,
    /// The target is defeated; nothing was applied.
    TargetDefeated,
}

/// Totals from one [`tick`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TickSummary {
    pub damage: u32,
    pub healing: u32,
    pub expired: Vec<String>,
    pub killed: bool,
}

/// Applies `effect_id` to `target`.
///
/// # Errors
///
/// Unknown effect ids are configuration errors. A target with every status
/// slot in use yields [`CombatError::StatusSlotsExhausted`].
pub fn apply(
    ctx: &mut CombatContext<'_>,
    target: CombatantId,
    effect_id: &str,
    source: Option<CombatantId>,
) -> CombatResult<ApplyOutcome> {
    let def = ctx.env.status_effect(effect_id)?;
    let combatant = ctx.state.combatant(target)?;
    if !combatant.is_alive() {
        return Ok(ApplyOutcome::TargetDefeated);
    }

    let Some(existing) = combatant.status_effects.get(effect_id) else {
        insert_new(ctx, target, def, source)?;
        return Ok(ApplyOutcome::Applied);
    };

    let stacks = existing.stacks;
    match def.stacking {
        StackingRule::Stack if stacks < def.max_stacks => {
            let combatant = ctx.state.combatant_mut(target)?;
            let stacks = stacks + 1;
            if let Some(instance) = combatant.status_effects.get_mut(effect_id) {
                instance.stacks = stacks;
                instance.remaining_turns = def.duration;
            }
            tracing::debug!("{} on {} stacked to {}", effect_id, target, stacks);
            ctx.emit(CombatEvent::EffectStacked {
                target,
                effect_id: effect_id.to_string(),
                stacks,
                max_stacks: def.max_stacks,
            });
            Ok(ApplyOutcome::Stacked { stacks })
        }
        StackingRule::Stack | StackingRule::Refresh => {
            let combatant = ctx.state.combatant_mut(target)?;
            if let Some(instance) = combatant.status_effects.get_mut(effect_id) {
                instance.remaining_turns = def.duration;
            }
            ctx.emit(CombatEvent::EffectRefreshed {
                target,
                effect_id: effect_id.to_string(),
                duration: def.duration,
            });
            Ok(ApplyOutcome::Refreshed)
        }
        StackingRule::Replace => {
            remove(ctx, target, effect_id, EffectRemovalReason::Replaced)?;
            insert_new(ctx, target, def, source)?;
            Ok(ApplyOutcome::Replaced)
        }
    }
}

fn insert_new(
    ctx: &mut CombatContext<'_>,
    target: CombatantId,
    def: &StatusEffectDefinition,
    source: Option<CombatantId>,
) -> CombatResult<()> {
    let tick_amount = match def.tick {
        Some(TickEffect::Damage { dice, .. }) | Some(TickEffect::Heal { dice }) => {
            dice.roll(&mut *ctx.dice)
        }
        None => 0,
    };
    let instance = StatusEffectInstance::new(def.id.clone(), def.duration)
        .with_source(source)
        .with_tick_amount(tick_amount);

    let combatant = ctx.state.combatant_mut(target)?;
    combatant
        .status_effects
        .insert(instance)
        .map_err(|rejected| CombatError::StatusSlotsExhausted {
            target,
            effect_id: rejected.effect_id,
        })?;
    tracing::debug!("{} applied to {}", def.id, combatant.name);

    ctx.emit(CombatEvent::EffectApplied {
        target,
        effect_id: def.id.clone(),
        stacks: 1,
        duration: def.duration,
        source,
    });
    Ok(())
}

/// Removes one effect, publishing `EffectRemoved`. Returns false if absent.
pub fn remove(
    ctx: &mut CombatContext<'_>,
    target: CombatantId,
    effect_id: &str,
    reason: EffectRemovalReason,
) -> CombatResult<bool> {
    let removed = ctx
        .state
        .combatant_mut(target)?
        .status_effects
        .remove(effect_id);
    if removed.is_none() {
        return Ok(false);
    }
    ctx.emit(CombatEvent::EffectRemoved {
        target,
        effect_id: effect_id.to_string(),
        reason,
    });
    Ok(true)
}

/// Runs one turn of every effect on `target`.
///
/// DoT damage is summed into a single `DoTDamageDealt` and HoT healing into a
/// single `HoTHealingDone`. Effects that run out are then removed as `Expired`.
/// A target killed by its DoTs loses everything with reason `Death` instead.
pub fn tick(ctx: &mut CombatContext<'_>, target: CombatantId) -> CombatResult<TickSummary> {
    let mut summary = TickSummary::default();
    if !ctx.state.combatant(target)?.is_alive() {
        return Ok(summary);
    }

    let env = ctx.env;
    let mut damage_breakdown = BTreeMap::new();
    let mut heal_breakdown = BTreeMap::new();
    let combatant = ctx.state.combatant_mut(target)?;
    for instance in combatant.status_effects.iter_mut() {
        let def = env.status_effect(&instance.effect_id)?;
        let amount = instance.tick_amount.saturating_mul(instance.stacks);
        match def.tick {
            Some(TickEffect::Damage { .. }) => {
                *damage_breakdown.entry(instance.effect_id.clone()).or_insert(0) += amount;
            }
            Some(TickEffect::Heal { .. }) => {
                *heal_breakdown.entry(instance.effect_id.clone()).or_insert(0) += amount;
            }
            None => {}
        }
        if instance.tick_down() {
            summary.expired.push(instance.effect_id.clone());
        }
    }

    if !damage_breakdown.is_empty() {
        let total: u32 = damage_breakdown.values().sum();
        let outcome = damage::apply_damage(ctx, target, total)?;
        summary.damage = outcome.dealt;
        ctx.emit(CombatEvent::DoTDamageDealt {
            target,
            total_damage: outcome.dealt,
            breakdown: damage_breakdown,
            remaining_health: outcome.remaining_health,
        });
        damage::settle(ctx, &outcome, None)?;
        if outcome.killed {
            summary.killed = true;
            summary.expired.clear();
            return Ok(summary);
        }
    }

    if !heal_breakdown.is_empty() {
        let total: u32 = heal_breakdown.values().sum();
        summary.healing = damage::heal(ctx, target, total)?;
        let current_health = ctx.state.combatant(target)?.health.current();
        ctx.emit(CombatEvent::HoTHealingDone {
            target,
            total_healing: summary.healing,
            breakdown: heal_breakdown,
            current_health,
        });
    }

    for effect_id in &summary.expired {
        remove(ctx, target, effect_id, EffectRemovalReason::Expired)?;
    }
    Ok(summary)
}

/// Removes cleansable effects matching `filter`, returning their ids.
pub fn cleanse(
    ctx: &mut CombatContext<'_>,
    target: CombatantId,
    filter: impl Fn(&StatusEffectDefinition) -> bool,
) -> CombatResult<Vec<String>> {
    let removed = remove_where(ctx, target, EffectRemovalReason::Cleansed, |def| {
        def.cleansable && filter(def)
    })?;
    if !removed.is_empty() {
        ctx.emit(CombatEvent::EffectsCleansed {
            target,
            removed: removed.clone(),
        });
    }
    Ok(removed)
}

/// Removes dispellable effects matching `filter`, returning their ids.
pub fn dispel(
    ctx: &mut CombatContext<'_>,
    target: CombatantId,
    filter: impl Fn(&StatusEffectDefinition) -> bool,
) -> CombatResult<Vec<String>> {
    let removed = remove_where(ctx, target, EffectRemovalReason::Dispelled, |def| {
        def.dispellable && filter(def)
    })?;
    if !removed.is_empty() {
        ctx.emit(CombatEvent::EffectsDispelled {
            target,
            removed: removed.clone(),
        });
    }
    Ok(removed)
}

fn remove_where(
    ctx: &mut CombatContext<'_>,
    target: CombatantId,
    reason: EffectRemovalReason,
    select: impl Fn(&StatusEffectDefinition) -> bool,
) -> CombatResult<Vec<String>> {
    let env = ctx.env;
    let mut matching = Vec::new();
    for instance in ctx.state.combatant(target)?.status_effects.iter() {
        if select(env.status_effect(&instance.effect_id)?) {
            matching.push(instance.effect_id.clone());
        }
    }
    for effect_id in &matching {
        remove(ctx, target, effect_id, reason)?;
    }
    Ok(matching)
}

/// Strips every effect from a defeated combatant with reason `Death`.
pub fn remove_on_death(ctx: &mut CombatContext<'_>, target: CombatantId) -> CombatResult<()> {
    let removed = ctx.state.combatant_mut(target)?.status_effects.clear();
    for instance in removed {
        ctx.emit(CombatEvent::EffectRemoved {
            target,
            effect_id: instance.effect_id,
            reason: EffectRemovalReason::Death,
        });
    }
    Ok(())
}

/// Sum of the per-stack modifiers of every active effect on `target`.
pub fn modifiers(ctx: &CombatContext<'_>, target: CombatantId) -> CombatResult<StatModifiers> {
    let mut total = StatModifiers::NONE;
    for instance in ctx.state.combatant(target)?.status_effects.iter() {
        let def = ctx.env.status_effect(&instance.effect_id)?;
        total += def.modifiers.scaled(instance.stacks as i32);
    }
    Ok(total)
}
