//! Environmental hazards: entry effects, per-round damage, trapping, and
//! armor wear.

use crate::error::CombatResult;
use crate::event::CombatEvent;
use crate::state::{CombatantId, HazardInstance, Position};

use super::{CombatContext, damage, status};

/// Puts a hazard from the catalog onto a cell.
pub fn place_hazard(
    ctx: &mut CombatContext<'_>,
    hazard_id: &str,
    position: Position,
) -> CombatResult<()> {
    let def = ctx.env.hazard(hazard_id)?;
    ctx.state
        .grid
        .place_hazard(position, HazardInstance::from(def))?;
    Ok(())
}

/// What entering a hazard did to a combatant.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct HazardEntry {
    pub damage: u32,
    pub trapped: bool,
    pub killed: bool,
}

/// Runs entry effects for the hazard under `combatant`, if any.
///
/// Publishes `HazardEntered` first, then entry damage. A lethal entry stops
/// there; otherwise the status effect, armor wear, and trapping follow.
pub fn on_entered(
    ctx: &mut CombatContext<'_>,
    combatant: CombatantId,
    pusher_name: Option<String>,
) -> CombatResult<HazardEntry> {
    let entrant = ctx.state.combatant(combatant)?;
    if !entrant.is_alive() {
        return Ok(HazardEntry::default());
    }
    let position = entrant.position;
    let Some(hazard) = ctx.state.grid.hazard_at(position).cloned() else {
        return Ok(HazardEntry::default());
    };
    tracing::debug!("{} entered {} at {}", entrant.name, hazard.name, position);

    ctx.emit(CombatEvent::HazardEntered {
        combatant,
        hazard_id: hazard.hazard_id.clone(),
        kind: hazard.kind,
        position,
        was_pushed: pusher_name.is_some(),
        pusher_name,
    });

    let mut entry = HazardEntry::default();
    if let Some(roll) = hazard.entry_damage {
        let amount = roll.dice.roll(&mut *ctx.dice);
        let outcome = damage::apply_damage(ctx, combatant, amount)?;
        entry.damage = outcome.dealt;
        ctx.emit(CombatEvent::HazardDamageDealt {
            combatant,
            hazard_id: hazard.hazard_id.clone(),
            damage_dealt: outcome.dealt,
            damage_type: roll.damage_type,
            remaining_health: outcome.remaining_health,
            was_entry_damage: true,
        });
        if outcome.killed {
            entry.killed = true;
            ctx.emit(CombatEvent::CombatantKilledByHazard {
                combatant,
                hazard_id: hazard.hazard_id.clone(),
                damage: outcome.dealt,
            });
            damage::settle(ctx, &outcome, None)?;
            return Ok(entry);
        }
        damage::settle(ctx, &outcome, None)?;
    }

    if let Some(effect_id) = &hazard.status_effect {
        let applied = status::apply(ctx, combatant, effect_id, None)?;
        if applied != status::ApplyOutcome::TargetDefeated {
            ctx.emit(CombatEvent::HazardStatusEffectApplied {
                combatant,
                hazard_id: hazard.hazard_id.clone(),
                effect_id: effect_id.clone(),
            });
        }
    }
    if hazard.degrades_armor() {
        degrade_armor(ctx, combatant, hazard.armor_degradation)?;
    }
    if hazard.requires_climb_out() {
        ctx.state.combatant_mut(combatant)?.trapped = true;
        entry.trapped = true;
        ctx.emit(CombatEvent::CombatantTrapped {
            combatant,
            hazard_id: hazard.hazard_id.clone(),
            fall_damage: entry.damage,
        });
    }
    Ok(entry)
}

/// Totals from one round-start hazard pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct HazardTickSummary {
    pub combatants_affected: u32,
    pub total_damage: u32,
}

/// Applies per-round hazard effects to everyone standing in a hazard.
///
/// Publishes one `HazardTickProcessed` when anyone was affected.
pub fn tick_hazards(ctx: &mut CombatContext<'_>) -> CombatResult<HazardTickSummary> {
    let standing: Vec<(CombatantId, HazardInstance)> = ctx
        .state
        .grid
        .occupants()
        .filter_map(|(id, pos)| Some((id, ctx.state.grid.hazard_at(pos)?.clone())))
        .collect();

    let mut summary = HazardTickSummary::default();
    for (combatant, hazard) in standing {
        if !ctx.state.combatant(combatant)?.is_alive() {
            continue;
        }
        let mut affected = false;

        if let Some(roll) = hazard.turn_damage {
            let amount = roll.dice.roll(&mut *ctx.dice);
            let outcome = damage::apply_damage(ctx, combatant, amount)?;
            affected = true;
            summary.total_damage += outcome.dealt;
            ctx.emit(CombatEvent::HazardDamageDealt {
                combatant,
                hazard_id: hazard.hazard_id.clone(),
                damage_dealt: outcome.dealt,
                damage_type: roll.damage_type,
                remaining_health: outcome.remaining_health,
                was_entry_damage: false,
            });
            if outcome.killed {
                ctx.emit(CombatEvent::CombatantKilledByHazard {
                    combatant,
                    hazard_id: hazard.hazard_id.clone(),
                    damage: outcome.dealt,
                });
                damage::settle(ctx, &outcome, None)?;
                summary.combatants_affected += 1;
                continue;
            }
            damage::settle(ctx, &outcome, None)?;
        }
        if hazard.degrades_armor() && degrade_armor(ctx, combatant, hazard.armor_degradation)? > 0
        {
            affected = true;
        }
        if affected {
            summary.combatants_affected += 1;
        }
    }

    if summary.combatants_affected > 0 {
        let round = ctx.round();
        ctx.emit(CombatEvent::HazardTickProcessed {
            round,
            combatants_affected: summary.combatants_affected,
            total_damage: summary.total_damage,
        });
    }
    Ok(summary)
}

/// Wears down equipped armor, returning the durability actually lost.
pub fn degrade_armor(
    ctx: &mut CombatContext<'_>,
    combatant: CombatantId,
    amount: u32,
) -> CombatResult<u32> {
    let target = ctx.state.combatant_mut(combatant)?;
    let Some(armor) = target.loadout.armor.as_mut() else {
        return Ok(0);
    };
    let lost = amount.min(armor.durability);
    if lost == 0 {
        return Ok(0);
    }
    armor.durability -= lost;
    let event = CombatEvent::ArmorDegraded {
        combatant,
        armor: armor.name.clone(),
        amount: lost,
        remaining_durability: armor.durability,
    };
    ctx.emit(event);
    Ok(lost)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClimbOutcome {
    Escaped { total: i32, dc: i32 },
    Failed { total: i32, dc: i32 },
    NotTrapped,
}

/// `d20 + STR` against the hazard's climb DC to escape a trapping hazard.
pub fn climb_out(ctx: &mut CombatContext<'_>, combatant: CombatantId) -> CombatResult<ClimbOutcome> {
    let default_dc = ctx.config()?.climb_out_dc;
    let climber = ctx.state.combatant(combatant)?;
    if !climber.trapped || !climber.is_alive() {
        return Ok(ClimbOutcome::NotTrapped);
    }
    let dc = ctx
        .state
        .grid
        .hazard_at(climber.position)
        .and_then(|hazard| hazard.climb_dc)
        .unwrap_or(default_dc);
    let bonus = climber.attributes.strength_mod();

    let total = ctx.dice.d20() as i32 + bonus;
    if total < dc {
        ctx.emit(CombatEvent::ClimbOutFailed {
            combatant,
            total,
            dc,
        });
        return Ok(ClimbOutcome::Failed { total, dc });
    }
    ctx.state.combatant_mut(combatant)?.trapped = false;
    ctx.emit(CombatEvent::CombatantClimbedOut {
        combatant,
        total,
        dc,
    });
    Ok(ClimbOutcome::Escaped { total, dc })
}
