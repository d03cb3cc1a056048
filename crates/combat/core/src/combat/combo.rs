//! Multi-step combo tracking with turn windows and completion bonuses.
//!
//! Each combatant carries one [`ComboProgress`] per combo it has started. An
//! ability use advances every tracked combo whose next step matches, fails
//! every tracked combo whose next step does not, and starts any combo whose
//! first step matches and is not already being advanced by the same use.

use std::collections::BTreeSet;

use crate::env::{BonusEffect, BonusTarget, ComboBonus, ComboDefinition, StepTarget};
use crate::error::CombatResult;
use crate::event::{CombatEvent, ComboFailureReason};
use crate::state::{CombatantId, ComboProgress, Position};

use super::{CombatContext, damage, status};

/// What one ability use did to one combo.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ComboOutcome {
    Started {
        combo_id: String,
    },
    Progressed {
        combo_id: String,
        current_step: u32,
    },
    Completed {
        combo_id: String,
        bonuses_applied: u32,
    },
    Failed {
        combo_id: String,
        reason: ComboFailureReason,
    },
}

/// Feeds an ability use into the performer's combo trackers.
///
/// # Errors
///
/// Fails if no combo provider is configured or a tracked combo id no longer
/// resolves.
pub fn on_ability_used(
    ctx: &mut CombatContext<'_>,
    performer: CombatantId,
    ability_id: &str,
    target: Option<CombatantId>,
) -> CombatResult<Vec<ComboOutcome>> {
    let env = ctx.env;
    let oracle = env.combos()?;
    let combatant = ctx.state.combatant(performer)?;
    if !combatant.is_alive() {
        return Ok(Vec::new());
    }

    let tracked: Vec<ComboProgress> = combatant.combos.values().cloned().collect();
    let mut outcomes = Vec::new();
    let mut handled = BTreeSet::new();

    for progress in tracked {
        let def = env.combo(&progress.combo_id)?;
        let expected = def.step(progress.next_step());
        let reason = match expected {
            Some(step) if step.ability_id == ability_id => {
                if target_satisfied(step.target, performer, progress.last_target, target) {
                    None
                } else {
                    Some(ComboFailureReason::TargetMismatch)
                }
            }
            _ => Some(ComboFailureReason::WrongAbility),
        };

        if let Some(reason) = reason {
            fail(ctx, performer, &progress, reason)?;
            outcomes.push(ComboOutcome::Failed {
                combo_id: progress.combo_id,
                reason,
            });
            continue;
        }

        handled.insert(def.id.clone());
        outcomes.push(advance(ctx, performer, def, progress, target)?);
    }

    for def in oracle.combos_starting_with(ability_id) {
        if handled.contains(&def.id) {
            continue;
        }
        let first = def.step(1).map(|step| step.target).unwrap_or_default();
        if !target_satisfied(first, performer, None, target) {
            continue;
        }
        outcomes.push(start(ctx, performer, def, target)?);
    }

    Ok(outcomes)
}

/// Counts down every combo window for `combatant`. Runs at the start of its turn.
///
/// Combos whose window reaches zero fail with `WindowExpired`.
pub fn tick_windows(
    ctx: &mut CombatContext<'_>,
    combatant: CombatantId,
) -> CombatResult<Vec<String>> {
    let target = ctx.state.combatant_mut(combatant)?;
    let mut expired = Vec::new();
    for progress in target.combos.values_mut() {
        progress.window_remaining = progress.window_remaining.saturating_sub(1);
        if progress.window_remaining == 0 {
            expired.push(progress.clone());
        }
    }
    for progress in &expired {
        target.combos.remove(&progress.combo_id);
    }

    let mut ids = Vec::with_capacity(expired.len());
    for progress in expired {
        tracing::debug!(
            "combo {} for {} expired at step {}",
            progress.combo_id,
            combatant,
            progress.current_step
        );
        ctx.emit(CombatEvent::ComboFailed {
            combatant,
            combo_id: progress.combo_id.clone(),
            reason: ComboFailureReason::WindowExpired,
            step_reached: progress.current_step,
        });
        ids.push(progress.combo_id);
    }
    Ok(ids)
}

/// Clears all combo progress for `combatant`, returning how many were cleared.
pub fn reset(ctx: &mut CombatContext<'_>, combatant: CombatantId) -> CombatResult<u32> {
    let target = ctx.state.combatant_mut(combatant)?;
    let combos_cleared = target.combos.len() as u32;
    target.combos.clear();
    ctx.emit(CombatEvent::ComboProgressReset {
        combatant,
        combos_cleared,
    });
    Ok(combos_cleared)
}

fn target_satisfied(
    requirement: StepTarget,
    performer: CombatantId,
    previous: Option<CombatantId>,
    target: Option<CombatantId>,
) -> bool {
    match requirement {
        StepTarget::Any => true,
        StepTarget::SameTarget => previous.is_none_or(|prev| target == Some(prev)),
        StepTarget::DifferentTarget => previous.is_none_or(|prev| target != Some(prev)),
        StepTarget::SelfTarget => target.is_none_or(|t| t == performer),
    }
}

fn start(
    ctx: &mut CombatContext<'_>,
    performer: CombatantId,
    def: &ComboDefinition,
    target: Option<CombatantId>,
) -> CombatResult<ComboOutcome> {
    let total_steps = def.total_steps();
    ctx.emit(CombatEvent::ComboStarted {
        combatant: performer,
        combo_id: def.id.clone(),
        total_steps,
        window_turns: def.window_turns,
    });
    if total_steps <= 1 {
        return complete(ctx, performer, def, target);
    }
    tracing::debug!("{} started combo {}", performer, def.id);
    ctx.state.combatant_mut(performer)?.combos.insert(
        def.id.clone(),
        ComboProgress::start(def.id.clone(), total_steps, def.window_turns, target),
    );
    Ok(ComboOutcome::Started {
        combo_id: def.id.clone(),
    })
}

fn advance(
    ctx: &mut CombatContext<'_>,
    performer: CombatantId,
    def: &ComboDefinition,
    progress: ComboProgress,
    target: Option<CombatantId>,
) -> CombatResult<ComboOutcome> {
    let current_step = progress.next_step();
    if current_step >= progress.total_steps {
        ctx.state.combatant_mut(performer)?.combos.remove(&def.id);
        return complete(ctx, performer, def, target);
    }

    let combatant = ctx.state.combatant_mut(performer)?;
    if let Some(tracked) = combatant.combos.get_mut(&def.id) {
        tracked.current_step = current_step;
        tracked.last_target = target;
    }
    ctx.emit(CombatEvent::ComboProgressed {
        combatant: performer,
        combo_id: def.id.clone(),
        current_step,
        total_steps: progress.total_steps,
        window_remaining: progress.window_remaining,
    });
    Ok(ComboOutcome::Progressed {
        combo_id: def.id.clone(),
        current_step,
    })
}

fn fail(
    ctx: &mut CombatContext<'_>,
    performer: CombatantId,
    progress: &ComboProgress,
    reason: ComboFailureReason,
) -> CombatResult<()> {
    ctx.state
        .combatant_mut(performer)?
        .combos
        .remove(&progress.combo_id);
    tracing::debug!(
        "combo {} for {} failed: {}",
        progress.combo_id,
        performer,
        reason
    );
    ctx.emit(CombatEvent::ComboFailed {
        combatant: performer,
        combo_id: progress.combo_id.clone(),
        reason,
        step_reached: progress.current_step,
    });
    Ok(())
}

fn complete(
    ctx: &mut CombatContext<'_>,
    performer: CombatantId,
    def: &ComboDefinition,
    target: Option<CombatantId>,
) -> CombatResult<ComboOutcome> {
    let mut bonuses_applied = 0;
    for bonus in &def.bonuses {
        apply_bonus(ctx, performer, def, bonus, target)?;
        bonuses_applied += 1;
    }
    tracing::info!("{} completed combo {}", performer, def.name);
    ctx.emit(CombatEvent::ComboCompleted {
        combatant: performer,
        combo_id: def.id.clone(),
        bonus_effects_applied: bonuses_applied,
    });
    Ok(ComboOutcome::Completed {
        combo_id: def.id.clone(),
        bonuses_applied,
    })
}

fn apply_bonus(
    ctx: &mut CombatContext<'_>,
    performer: CombatantId,
    def: &ComboDefinition,
    bonus: &ComboBonus,
    target: Option<CombatantId>,
) -> CombatResult<()> {
    let targets = resolve_targets(ctx, performer, bonus.target, target)?;
    let mut settled = Vec::new();

    let (targets, value) = match &bonus.effect {
        BonusEffect::ExtraDamage { dice, .. } => {
            let amount = dice.roll(&mut *ctx.dice);
            for &id in &targets {
                settled.push(damage::apply_damage(ctx, id, amount)?);
            }
            (targets, amount)
        }
        BonusEffect::AreaEffect { dice, radius, .. } => {
            let center = match targets.first() {
                Some(&id) => ctx.state.combatant(id)?.position,
                None => ctx.state.combatant(performer)?.position,
            };
            let victims = enemies_within(ctx, performer, center, *radius)?;
            let amount = dice.roll(&mut *ctx.dice);
            for &id in &victims {
                settled.push(damage::apply_damage(ctx, id, amount)?);
            }
            (victims, amount)
        }
        BonusEffect::Heal { dice } => {
            let amount = dice.roll(&mut *ctx.dice);
            for &id in &targets {
                damage::heal(ctx, id, amount)?;
            }
            (targets, amount)
        }
        BonusEffect::ApplyStatus { effect_id } => {
            for &id in &targets {
                status::apply(ctx, id, effect_id, Some(performer))?;
            }
            (targets, 0)
        }
        BonusEffect::DamageMultiplier { percent } => (targets, *percent),
        BonusEffect::ResetCooldown { .. } => (targets, 0),
        BonusEffect::RefundResource { amount, .. } => (targets, *amount),
    };

    ctx.emit(CombatEvent::ComboBonusApplied {
        combatant: performer,
        combo_id: def.id.clone(),
        kind: bonus.effect.kind(),
        targets,
        value,
    });
    for outcome in settled {
        damage::settle(ctx, &outcome, Some(performer))?;
    }
    Ok(())
}

fn resolve_targets(
    ctx: &CombatContext<'_>,
    performer: CombatantId,
    selector: BonusTarget,
    target: Option<CombatantId>,
) -> CombatResult<Vec<CombatantId>> {
    let actor = ctx.state.combatant(performer)?;
    let targets = match selector {
        BonusTarget::Performer => vec![performer],
        BonusTarget::LastTarget => target
            .filter(|&id| ctx.state.combatant(id).is_ok_and(|c| c.is_alive()))
            .into_iter()
            .collect(),
        BonusTarget::AllEnemies => ctx
            .state
            .combatants()
            .filter(|c| c.is_alive() && !c.is_friendly_to(actor))
            .map(|c| c.id)
            .collect(),
        BonusTarget::AllAllies => ctx
            .state
            .combatants()
            .filter(|c| c.is_alive() && c.is_friendly_to(actor))
            .map(|c| c.id)
            .collect(),
    };
    Ok(targets)
}

fn enemies_within(
    ctx: &CombatContext<'_>,
    performer: CombatantId,
    center: Position,
    radius: u32,
) -> CombatResult<Vec<CombatantId>> {
    let actor = ctx.state.combatant(performer)?;
    Ok(ctx
        .state
        .combatants()
        .filter(|c| c.is_alive() && !c.is_friendly_to(actor))
        .filter(|c| c.position.chebyshev(center) <= radius as i32)
        .map(|c| c.id)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::Harness;

    fn setup() -> (Harness, CombatantId, CombatantId) {
        let mut h = Harness::new(6, 6);
        let hero = h.spawn_hero(1, (0, 0), 30);
        let foe = h.spawn_foe(2, (1, 0), 40);
        (h, hero, foe)
    }

    #[test]
    fn window_expiry_fails_with_last_step() {
        let (mut h, hero, foe) = setup();
        let mut ctx = h.ctx();
        on_ability_used(&mut ctx, hero, "fire-bolt", Some(foe)).unwrap();
        for _ in 0..3 {
            tick_windows(&mut ctx, hero).unwrap();
        }
        let events = h.events();
        assert!(matches!(
            &events[0],
            CombatEvent::ComboStarted { combo_id, total_steps: 3, window_turns: 3, .. }
                if combo_id == "elemental-burst"
        ));
        assert!(matches!(
            events.last(),
            Some(CombatEvent::ComboFailed {
                reason: ComboFailureReason::WindowExpired,
                step_reached: 1,
                ..
            })
        ));
        assert!(h.combatant(hero).combos.is_empty());
    }

    #[test]
    fn window_is_carried_not_reset_on_progress() {
        let (mut h, hero, foe) = setup();
        let mut ctx = h.ctx();
        on_ability_used(&mut ctx, hero, "fire-bolt", Some(foe)).unwrap();
        tick_windows(&mut ctx, hero).unwrap();
        let outcomes = on_ability_used(&mut ctx, hero, "frost-bolt", Some(foe)).unwrap();
        assert_eq!(
            outcomes,
            vec![ComboOutcome::Progressed {
                combo_id: "elemental-burst".into(),
                current_step: 2
            }]
        );
        assert!(matches!(
            h.events().last(),
            Some(CombatEvent::ComboProgressed {
                window_remaining: 2,
                ..
            })
        ));
    }

    #[test]
    fn completion_applies_bonuses_then_completes() {
        let (mut h, hero, foe) = setup();
        // ExtraDamage 2d6 -> 4 + 5
        h.roll([4, 5]);
        let mut ctx = h.ctx();
        on_ability_used(&mut ctx, hero, "fire-bolt", Some(foe)).unwrap();
        on_ability_used(&mut ctx, hero, "frost-bolt", Some(foe)).unwrap();
        let outcomes = on_ability_used(&mut ctx, hero, "lightning-bolt", Some(foe)).unwrap();
        assert_eq!(
            outcomes,
            vec![ComboOutcome::Completed {
                combo_id: "elemental-burst".into(),
                bonuses_applied: 2
            }]
        );
        assert_eq!(h.combatant(foe).health.current(), 31);
        let kinds = h.kinds();
        assert_eq!(
            kinds[kinds.len() - 4..],
            [
                "ComboBonusApplied",
                "EffectApplied",
                "ComboBonusApplied",
                "ComboCompleted"
            ]
        );
        assert!(h.combatant(hero).combos.is_empty());
    }

    #[test]
    fn wrong_ability_fails_in_progress_combo() {
        let (mut h, hero, foe) = setup();
        let mut ctx = h.ctx();
        on_ability_used(&mut ctx, hero, "fire-bolt", Some(foe)).unwrap();
        let outcomes = on_ability_used(&mut ctx, hero, "slash", Some(foe)).unwrap();
        assert!(outcomes.contains(&ComboOutcome::Failed {
            combo_id: "elemental-burst".into(),
            reason: ComboFailureReason::WrongAbility
        }));
    }

    #[test]
    fn target_mismatch_fails_combo() {
        let (mut h, hero, foe) = setup();
        let other = h.spawn_foe(3, (2, 0), 20);
        let mut ctx = h.ctx();
        on_ability_used(&mut ctx, hero, "slash", Some(foe)).unwrap();
        let outcomes = on_ability_used(&mut ctx, hero, "thrust", Some(other)).unwrap();
        assert_eq!(
            outcomes,
            vec![ComboOutcome::Failed {
                combo_id: "twin-strike".into(),
                reason: ComboFailureReason::TargetMismatch
            }]
        );
    }

    #[test]
    fn failed_combo_can_restart_on_same_use() {
        let (mut h, hero, foe) = setup();
        let mut ctx = h.ctx();
        on_ability_used(&mut ctx, hero, "fire-bolt", Some(foe)).unwrap();
        let outcomes = on_ability_used(&mut ctx, hero, "fire-bolt", Some(foe)).unwrap();
        assert_eq!(
            outcomes,
            vec![
                ComboOutcome::Failed {
                    combo_id: "elemental-burst".into(),
                    reason: ComboFailureReason::WrongAbility
                },
                ComboOutcome::Started {
                    combo_id: "elemental-burst".into()
                }
            ]
        );
        assert_eq!(h.combatant(hero).combos.len(), 1);
    }

    #[test]
    fn area_bonus_hits_enemies_near_target() {
        let (mut h, hero, foe) = setup();
        let near = h.spawn_foe(3, (2, 1), 20);
        let far = h.spawn_foe(4, (5, 5), 20);
        h.roll([6]);
        let mut ctx = h.ctx();
        on_ability_used(&mut ctx, hero, "slash", Some(foe)).unwrap();
        on_ability_used(&mut ctx, hero, "thrust", Some(foe)).unwrap();
        assert_eq!(h.combatant(foe).health.current(), 34);
        assert_eq!(h.combatant(near).health.current(), 14);
        assert_eq!(h.combatant(far).health.current(), 20);
        assert_eq!(h.combatant(hero).health.current(), 30);
    }

    #[test]
    fn reset_reports_cleared_count() {
        let (mut h, hero, foe) = setup();
        let mut ctx = h.ctx();
        on_ability_used(&mut ctx, hero, "fire-bolt", Some(foe)).unwrap();
        assert_eq!(reset(&mut ctx, hero).unwrap(), 1);
        assert_eq!(reset(&mut ctx, hero).unwrap(), 0);
        let resets = h
            .kinds()
            .into_iter()
            .filter(|kind| *kind == "ComboProgressReset")
            .count();
        assert_eq!(resets, 2);
    }
}
