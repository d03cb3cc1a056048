//! Damage and healing applied through a single pipeline.
//!
//! Every source of damage (attacks, hazards, zones, DoTs, combo bonuses,
//! parry counters) goes through [`apply_damage`] and then [`settle`], so boss
//! vulnerability, boss phase checks, and defeat handling happen in one place.
//! Callers publish their own damage event between the two calls, which keeps
//! the event stream in cause-then-consequence order.

use crate::config::CombatConfig;
use crate::error::CombatResult;
use crate::event::CombatEvent;
use crate::state::CombatantId;

use super::{CombatContext, boss, combo, status};
use crate::env::DiceExpr;

// ============================================================================
// Damage Type
// ============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::EnumString, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(ascii_case_insensitive, serialize_all = "lowercase")]
pub enum DamageType {
    Physical,
    Fire,
    Cold,
    Lightning,
    Poison,
    Acid,
    Necrotic,
    Radiant,
    /// Untyped magical damage.
    Magic,
    /// Ignores all resistances.
    True,
}

/// Dice plus the type of damage they deal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DamageRoll {
    pub dice: DiceExpr,
    pub damage_type: DamageType,
}

impl DamageRoll {
    pub const fn new(dice: DiceExpr, damage_type: DamageType) -> Self {
        Self { dice, damage_type }
    }
}

// ============================================================================
// Pipeline
// ============================================================================

/// Result of one application of damage.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DamageOutcome {
    pub target: CombatantId,
    /// Health actually removed.
    pub dealt: u32,
    pub remaining_health: u32,
    /// True only if this application took the target from alive to dead.
    pub killed: bool,
}

/// Removes health from `target`, scaling for an open boss vulnerability window.
///
/// Damage against an already defeated combatant is ignored.
pub fn apply_damage(
    ctx: &mut CombatContext<'_>,
    target: CombatantId,
    amount: u32,
) -> CombatResult<DamageOutcome> {
    let amount = match ctx.state.bosses.get(&target) {
        Some(boss) if boss.is_vulnerable() => {
            CombatConfig::scale_percent(amount, ctx.config()?.vulnerability_multiplier_percent)
        }
        _ => amount,
    };

    let combatant = ctx.state.combatant_mut(target)?;
    if !combatant.is_alive() {
        return Ok(DamageOutcome {
            target,
            dealt: 0,
            remaining_health: 0,
            killed: false,
        });
    }
    let dealt = combatant.health.damage(amount);
    let remaining_health = combatant.health.current();
    tracing::debug!(
        "{} took {} damage ({} remaining)",
        combatant.name,
        dealt,
        remaining_health
    );

    Ok(DamageOutcome {
        target,
        dealt,
        remaining_health,
        killed: remaining_health == 0,
    })
}

/// Runs the consequences of a damage application: defeat handling for a
/// killing blow, otherwise a boss phase check.
pub fn settle(
    ctx: &mut CombatContext<'_>,
    outcome: &DamageOutcome,
    source: Option<CombatantId>,
) -> CombatResult<()> {
    if outcome.killed {
        return resolve_defeat(ctx, outcome.target, source);
    }
    if outcome.dealt > 0 && ctx.state.bosses.contains_key(&outcome.target) {
        boss::check_phase_transition(ctx, outcome.target)?;
    }
    Ok(())
}

/// Damage from a direct attack or ability, published as `DamageApplied`.
pub fn deal_damage(
    ctx: &mut CombatContext<'_>,
    target: CombatantId,
    amount: u32,
    damage_type: DamageType,
    source: Option<CombatantId>,
) -> CombatResult<DamageOutcome> {
    let outcome = apply_damage(ctx, target, amount)?;
    if outcome.dealt > 0 {
        ctx.emit(CombatEvent::DamageApplied {
            target,
            source,
            amount: outcome.dealt,
            damage_type,
            remaining_health: outcome.remaining_health,
        });
    }
    settle(ctx, &outcome, source)?;
    Ok(outcome)
}

/// Restores health, returning the amount actually healed. The dead stay dead.
pub fn heal(ctx: &mut CombatContext<'_>, target: CombatantId, amount: u32) -> CombatResult<u32> {
    let combatant = ctx.state.combatant_mut(target)?;
    if !combatant.is_alive() {
        return Ok(0);
    }
    Ok(combatant.health.heal(amount))
}

/// Cleans up a combatant whose health reached zero.
///
/// Status effects are removed with reason `Death`, combo progress is cleared,
/// the grid cell is vacated, and boss bookkeeping runs.
fn resolve_defeat(
    ctx: &mut CombatContext<'_>,
    target: CombatantId,
    source: Option<CombatantId>,
) -> CombatResult<()> {
    status::remove_on_death(ctx, target)?;
    if !ctx.state.combatant(target)?.combos.is_empty() {
        combo::reset(ctx, target)?;
    }

    let combatant = ctx.state.combatant_mut(target)?;
    combatant.trapped = false;
    combatant.reaction_available = false;
    combatant.defending = false;
    let summoned_by = combatant.summoned_by;
    tracing::info!("{} was defeated", combatant.name);

    ctx.state.grid.remove(target);
    ctx.emit(CombatEvent::CombatantDefeated {
        combatant: target,
        source,
    });

    if ctx.state.bosses.contains_key(&target) {
        boss::on_defeated(ctx, target)?;
    }
    if let Some(boss_id) = summoned_by {
        boss::on_summon_defeated(ctx, boss_id);
    }
    Ok(())
}
