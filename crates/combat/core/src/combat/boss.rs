//! Boss phase state machine: one-way transitions on health thresholds,
//! vulnerability windows, and summon cadence.

use crate::env::BossPhase;
use crate::error::{CombatError, CombatResult};
use crate::event::CombatEvent;
use crate::state::{BossState, CombatantId, SummonCadence};

use super::CombatContext;

/// Marks `combatant` as an instance of boss `boss_id` and enters phase 1.
///
/// Phase 1 entry publishes nothing beyond an opening vulnerability window.
pub fn register_boss(
    ctx: &mut CombatContext<'_>,
    combatant: CombatantId,
    boss_id: &str,
) -> CombatResult<()> {
    let def = ctx.env.boss(boss_id)?;
    let name = ctx.state.combatant(combatant)?.name.clone();
    ctx.state
        .bosses
        .insert(combatant, BossState::new(def.id.clone(), combatant));
    if let Some(first) = def.phase(1) {
        enter_phase(ctx, combatant, first)?;
    }
    tracing::info!("{} registered as boss {}", name, def.name);
    check_phase_transition(ctx, combatant)?;
    Ok(())
}

/// Moves the boss to the highest phase whose threshold its health has reached.
///
/// Returns the new phase number when a transition happened.
pub fn check_phase_transition(
    ctx: &mut CombatContext<'_>,
    boss: CombatantId,
) -> CombatResult<Option<u32>> {
    let state = ctx.state.boss(boss)?;
    if state.defeated {
        return Ok(None);
    }
    let def = ctx.env.boss(&state.boss_id)?;
    let health = ctx.state.combatant(boss)?.health;
    let old_phase = state.phase;
    let Some(next) = def.phase_for_health(old_phase, |threshold| {
        health.at_or_below_percent(threshold)
    }) else {
        return Ok(None);
    };

    ctx.state.boss_mut(boss)?.phase = next.number;
    tracing::info!(
        "{} entered phase {} ({}) at {}% health",
        def.name,
        next.number,
        next.name,
        health.percent()
    );
    ctx.emit(CombatEvent::BossPhaseChanged {
        boss,
        boss_id: def.id.clone(),
        old_phase,
        new_phase: next.number,
        phase_name: next.name.clone(),
        transition_text: next.transition_text.clone(),
    });
    enter_phase(ctx, boss, next)?;
    Ok(Some(next.number))
}

fn enter_phase(ctx: &mut CombatContext<'_>, boss: CombatantId, phase: &BossPhase) -> CombatResult<()> {
    let multiplier_percent = ctx.config()?.vulnerability_multiplier_percent;
    let state = ctx.state.boss_mut(boss)?;
    if !phase.ability_pool.is_empty() {
        state.ability_pool = phase.ability_pool.clone();
    }
    state.stat_modifiers = phase.stat_modifiers;
    if let Some(summon) = &phase.summon {
        state.summon = Some(SummonCadence::new(summon.clone()));
    }
    if let Some(turns) = phase.vulnerable_turns.filter(|turns| *turns > 0) {
        state.vulnerable_turns = turns;
        ctx.emit(CombatEvent::BossVulnerable {
            boss,
            turns,
            multiplier_percent,
        });
    }
    Ok(())
}

/// Summons requested by the boss this turn, for the scheduler to spawn.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SummonRequest {
    pub monster_id: String,
    pub count: u32,
}

/// Runs the boss's start-of-turn bookkeeping: the vulnerability countdown and
/// the summon cadence.
pub fn on_boss_turn(
    ctx: &mut CombatContext<'_>,
    boss: CombatantId,
) -> CombatResult<Option<SummonRequest>> {
    tick_vulnerability(ctx, boss)?;
    tick_summons(ctx, boss)
}

/// Counts one boss turn off an open vulnerability window.
///
/// Returns true when the window closed this turn.
pub fn tick_vulnerability(ctx: &mut CombatContext<'_>, boss: CombatantId) -> CombatResult<bool> {
    let state = ctx.state.boss_mut(boss)?;
    if state.defeated || state.vulnerable_turns == 0 {
        return Ok(false);
    }
    state.vulnerable_turns -= 1;
    if state.vulnerable_turns > 0 {
        return Ok(false);
    }
    ctx.emit(CombatEvent::BossVulnerabilityEnded { boss });
    Ok(true)
}

/// Advances the summon cadence by one boss turn.
pub fn tick_summons(
    ctx: &mut CombatContext<'_>,
    boss: CombatantId,
) -> CombatResult<Option<SummonRequest>> {
    let state = ctx.state.boss_mut(boss)?;
    if state.defeated {
        return Ok(None);
    }
    let active = state.active_summons;
    let Some(cadence) = state.summon.as_mut() else {
        return Ok(None);
    };
    cadence.turns_since_summon += 1;
    if cadence.turns_since_summon < cadence.config.interval_turns {
        return Ok(None);
    }
    cadence.turns_since_summon = 0;
    let count = cadence
        .config
        .count
        .min(cadence.config.max_active.saturating_sub(active));
    if count == 0 {
        tracing::debug!("{} summon skipped: {} already active", boss, active);
        return Ok(None);
    }
    let monster_id = cadence.config.monster_id.clone();
    ctx.emit(CombatEvent::BossSummonTriggered {
        boss,
        monster_id: monster_id.clone(),
        count,
        active_summons: active,
    });
    Ok(Some(SummonRequest { monster_id, count }))
}

/// Links a spawned summon to its boss.
pub fn register_summon(
    ctx: &mut CombatContext<'_>,
    boss: CombatantId,
    summon: CombatantId,
) -> CombatResult<()> {
    if !ctx.state.bosses.contains_key(&boss) {
        return Err(CombatError::NotABoss(boss));
    }
    ctx.state.combatant_mut(summon)?.summoned_by = Some(boss);
    ctx.state.boss_mut(boss)?.active_summons += 1;
    Ok(())
}

pub(crate) fn on_summon_defeated(ctx: &mut CombatContext<'_>, boss: CombatantId) {
    if let Some(state) = ctx.state.bosses.get_mut(&boss) {
        state.active_summons = state.active_summons.saturating_sub(1);
    }
}

pub(crate) fn on_defeated(ctx: &mut CombatContext<'_>, boss: CombatantId) -> CombatResult<()> {
    let state = ctx.state.boss_mut(boss)?;
    state.defeated = true;
    state.vulnerable_turns = 0;
    state.summon = None;
    let def = ctx.env.boss(&state.boss_id)?;
    tracing::info!("{} was defeated", def.name);
    ctx.emit(CombatEvent::BossDefeated {
        boss,
        boss_id: def.id.clone(),
        loot: def.loot.clone(),
    });
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat::damage::{self, DamageType};
    use crate::testing::Harness;

    fn setup() -> (Harness, CombatantId) {
        let mut h = Harness::new(6, 6);
        let boss = h.spawn_foe(9, (3, 3), 100);
        register_boss(&mut h.ctx(), boss, "lich-king").unwrap();
        (h, boss)
    }

    fn hit(h: &mut Harness, boss: CombatantId, amount: u32) {
        damage::deal_damage(&mut h.ctx(), boss, amount, DamageType::Physical, None).unwrap();
    }

    #[test]
    fn crossing_one_threshold_enters_that_phase_only() {
        let (mut h, boss) = setup();
        hit(&mut h, boss, 52);
        assert_eq!(h.state.boss(boss).unwrap().phase, 2);
        assert_eq!(
            h.kinds(),
            vec!["DamageApplied", "BossPhaseChanged", "BossVulnerable"]
        );
        assert!(matches!(
            &h.events()[1],
            CombatEvent::BossPhaseChanged { old_phase: 1, new_phase: 2, transition_text: Some(_), .. }
        ));
    }

    #[test]
    fn large_hit_skips_to_highest_reached_phase() {
        let (mut h, boss) = setup();
        hit(&mut h, boss, 80);
        assert!(matches!(
            &h.events()[1],
            CombatEvent::BossPhaseChanged { old_phase: 1, new_phase: 3, .. }
        ));
    }

    #[test]
    fn healing_never_reverts_phase() {
        let (mut h, boss) = setup();
        hit(&mut h, boss, 60);
        damage::heal(&mut h.ctx(), boss, 60).unwrap();
        hit(&mut h, boss, 1);
        assert_eq!(h.state.boss(boss).unwrap().phase, 2);
    }

    #[test]
    fn vulnerability_scales_damage_until_window_closes() {
        let (mut h, boss) = setup();
        hit(&mut h, boss, 50);
        let mut ctx = h.ctx();
        assert_eq!(damage::apply_damage(&mut ctx, boss, 10).unwrap().dealt, 15);
        on_boss_turn(&mut ctx, boss).unwrap();
        on_boss_turn(&mut ctx, boss).unwrap();
        assert_eq!(damage::apply_damage(&mut ctx, boss, 10).unwrap().dealt, 10);
        assert!(h.kinds().contains(&"BossVulnerabilityEnded"));
    }

    #[test]
    fn summons_respect_interval_and_cap() {
        let (mut h, boss) = setup();
        hit(&mut h, boss, 80);
        let minions: Vec<CombatantId> = (20..23)
            .map(|id| h.spawn_foe(id, (id as i32 - 20, 0), 5))
            .collect();
        let mut ctx = h.ctx();
        assert_eq!(on_boss_turn(&mut ctx, boss).unwrap(), None);
        let first = on_boss_turn(&mut ctx, boss).unwrap().unwrap();
        assert_eq!(first.count, 2);
        register_summon(&mut ctx, boss, minions[0]).unwrap();
        register_summon(&mut ctx, boss, minions[1]).unwrap();
        on_boss_turn(&mut ctx, boss).unwrap();
        let second = on_boss_turn(&mut ctx, boss).unwrap().unwrap();
        assert_eq!(second.count, 1);
        register_summon(&mut ctx, boss, minions[2]).unwrap();
        on_boss_turn(&mut ctx, boss).unwrap();
        assert_eq!(on_boss_turn(&mut ctx, boss).unwrap(), None);

        damage::deal_damage(&mut ctx, minions[0], 5, DamageType::Fire, None).unwrap();
        assert_eq!(ctx.state.boss(boss).unwrap().active_summons, 2);
    }

    #[test]
    fn defeat_publishes_loot_and_stops_phases() {
        let (mut h, boss) = setup();
        hit(&mut h, boss, 100);
        let state = h.state.boss(boss).unwrap();
        assert!(state.defeated);
        assert_eq!(state.phase, 1);
        match h.events().last() {
            Some(CombatEvent::BossDefeated { loot, .. }) => {
                assert_eq!(loot[0].item_id, "phylactery-shard");
            }
            other => panic!("unexpected event {other:?}"),
        }
        assert!(!h.kinds().contains(&"BossPhaseChanged"));
    }

    #[test]
    fn registering_non_boss_id_fails() {
        let mut h = Harness::new(3, 3);
        let id = h.spawn_foe(1, (0, 0), 10);
        assert!(register_boss(&mut h.ctx(), id, "goblin").is_err());
        assert!(on_boss_turn(&mut h.ctx(), id).is_err());
    }
}
