//! Block, dodge, and parry, gated by the once-per-turn reaction.

use crate::config::CombatConfig;
use crate::error::CombatResult;
use crate::event::{CombatEvent, ReactionKind};
use crate::state::CombatantId;

use super::{CombatContext, damage};

/// Why a defensive action was refused before any roll.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DefenseRejection {
    NoReactionAvailable,
    NoShield,
    HeavyArmor,
    NoMeleeWeapon,
    Defeated,
}

/// Outcome of a gated defensive action.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DefenseOutcome<T> {
    Resolved(T),
    Rejected(DefenseRejection),
}

impl<T> DefenseOutcome<T> {
    pub fn resolved(self) -> Option<T> {
        match self {
            Self::Resolved(value) => Some(value),
            Self::Rejected(_) => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BlockResult {
    pub incoming: u32,
    pub final_damage: u32,
    pub prevented: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DodgeResult {
    pub roll: u32,
    pub total: i32,
    pub attack_roll: i32,
    pub success: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ParryResult {
    pub roll: u32,
    pub total: i32,
    pub dc: i32,
    pub success: bool,
    /// Damage dealt by the counter-attack, 0 on failure.
    pub counter_damage: u32,
}

/// Reduces incoming damage with a shield. Never consumes the reaction.
///
/// The caller applies `final_damage` to the defender.
pub fn block(
    ctx: &mut CombatContext<'_>,
    defender: CombatantId,
    attacker: Option<CombatantId>,
    incoming: u32,
) -> CombatResult<DefenseOutcome<BlockResult>> {
    let config = ctx.config()?;
    let combatant = ctx.state.combatant(defender)?;
    if !combatant.is_alive() {
        return Ok(DefenseOutcome::Rejected(DefenseRejection::Defeated));
    }
    let Some(shield_bonus) = combatant.loadout.shield_bonus else {
        return Ok(DefenseOutcome::Rejected(DefenseRejection::NoShield));
    };

    let reduced = CombatConfig::scale_percent(incoming, config.block_reduction_percent);
    let prevented = reduced.saturating_add(shield_bonus).min(incoming);
    let result = BlockResult {
        incoming,
        final_damage: incoming - prevented,
        prevented,
    };
    tracing::debug!(
        "{} blocked {} of {} damage",
        combatant.name,
        prevented,
        incoming
    );

    ctx.emit(CombatEvent::Blocked {
        defender,
        attacker,
        incoming,
        final_damage: result.final_damage,
        prevented,
    });
    Ok(DefenseOutcome::Resolved(result))
}

/// Attempts to evade an attack: `d20 + DEX` against the attack roll.
pub fn dodge(
    ctx: &mut CombatContext<'_>,
    defender: CombatantId,
    attacker: CombatantId,
    attack_roll: i32,
) -> CombatResult<DefenseOutcome<DodgeResult>> {
    let config = ctx.config()?;
    let combatant = ctx.state.combatant(defender)?;
    if let Some(rejection) = reaction_gate(combatant) {
        return Ok(DefenseOutcome::Rejected(rejection));
    }
    if combatant.loadout.wears_heavy_armor() {
        return Ok(DefenseOutcome::Rejected(DefenseRejection::HeavyArmor));
    }
    let bonus = combatant.attributes.dexterity_mod() + defending_bonus(combatant.defending, config);

    let roll = ctx.dice.d20();
    let total = roll as i32 + bonus;
    let success = if config.dodge_ties_favor_defender {
        total >= attack_roll
    } else {
        total > attack_roll
    };
    let combatant = ctx.state.combatant_mut(defender)?;
    combatant.reaction_available = false;
    tracing::debug!(
        "{} dodge: {} vs {} -> {}",
        combatant.name,
        total,
        attack_roll,
        if success { "evaded" } else { "hit" }
    );

    ctx.emit(CombatEvent::ReactionUsed {
        combatant: defender,
        reaction: ReactionKind::Dodge,
    });
    ctx.emit(CombatEvent::DodgeAttempted {
        defender,
        attacker,
        roll,
        total,
        attack_roll,
        success,
    });
    Ok(DefenseOutcome::Resolved(DodgeResult {
        roll,
        total,
        attack_roll,
        success,
    }))
}

/// Attempts to deflect an attack: `d20 + DEX` against `attack_roll + parry bonus`.
///
/// A successful parry counter-attacks with the defender's melee weapon dice plus
/// STR. The reaction is spent whether or not the parry lands.
pub fn parry(
    ctx: &mut CombatContext<'_>,
    defender: CombatantId,
    attacker: CombatantId,
    attack_roll: i32,
) -> CombatResult<DefenseOutcome<ParryResult>> {
    let config = ctx.config()?;
    let combatant = ctx.state.combatant(defender)?;
    if let Some(rejection) = reaction_gate(combatant) {
        return Ok(DefenseOutcome::Rejected(rejection));
    }
    let Some(weapon) = combatant.loadout.melee_weapon else {
        return Ok(DefenseOutcome::Rejected(DefenseRejection::NoMeleeWeapon));
    };
    let bonus = combatant.attributes.dexterity_mod() + defending_bonus(combatant.defending, config);
    let strength = combatant.attributes.strength_mod();

    let dc = attack_roll + config.parry_dc_bonus;
    let roll = ctx.dice.d20();
    let total = roll as i32 + bonus;
    let success = total >= dc;
    ctx.state.combatant_mut(defender)?.reaction_available = false;
    ctx.emit(CombatEvent::ReactionUsed {
        combatant: defender,
        reaction: ReactionKind::Parry,
    });

    if !success {
        tracing::debug!("parry by {} failed: {} vs DC {}", defender, total, dc);
        ctx.emit(CombatEvent::ParryFailed {
            defender,
            attacker,
            roll,
            total,
            dc,
        });
        return Ok(DefenseOutcome::Resolved(ParryResult {
            roll,
            total,
            dc,
            success,
            counter_damage: 0,
        }));
    }

    let counter = (weapon.roll(&mut *ctx.dice) as i32 + strength).max(0) as u32;
    let outcome = damage::apply_damage(ctx, attacker, counter)?;
    tracing::debug!(
        "parry by {} succeeded: {} vs DC {}, countered for {}",
        defender,
        total,
        dc,
        outcome.dealt
    );
    ctx.emit(CombatEvent::ParrySuccess {
        defender,
        attacker,
        roll,
        total,
        dc,
        counter_damage: outcome.dealt,
    });
    damage::settle(ctx, &outcome, Some(defender))?;

    Ok(DefenseOutcome::Resolved(ParryResult {
        roll,
        total,
        dc,
        success,
        counter_damage: outcome.dealt,
    }))
}

/// Restores the reaction at the start of the combatant's turn.
///
/// Publishes `ReactionReset` only if the reaction had been spent.
pub fn reset_reaction(ctx: &mut CombatContext<'_>, combatant: CombatantId) -> CombatResult<bool> {
    let target = ctx.state.combatant_mut(combatant)?;
    target.defending = false;
    if target.reaction_available || !target.is_alive() {
        return Ok(false);
    }
    target.reaction_available = true;
    ctx.emit(CombatEvent::ReactionReset { combatant });
    Ok(true)
}

/// Takes a defending posture until the combatant's next turn.
pub fn start_defending(ctx: &mut CombatContext<'_>, combatant: CombatantId) -> CombatResult<()> {
    ctx.state.combatant_mut(combatant)?.defending = true;
    Ok(())
}

fn reaction_gate(combatant: &crate::state::Combatant) -> Option<DefenseRejection> {
    if !combatant.is_alive() {
        Some(DefenseRejection::Defeated)
    } else if !combatant.reaction_available {
        Some(DefenseRejection::NoReactionAvailable)
    } else {
        None
    }
}

fn defending_bonus(defending: bool, config: &CombatConfig) -> i32 {
    if defending { config.defending_bonus } else { 0 }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::DiceExpr;
    use crate::state::{Armor, ArmorWeight, Attributes, Loadout};
    use crate::testing::Harness;

    fn shield(bonus: u32) -> Loadout {
        Loadout {
            shield_bonus: Some(bonus),
            ..Loadout::default()
        }
    }

    fn sword() -> Loadout {
        Loadout {
            melee_weapon: Some(DiceExpr::new(1, 8, 0)),
            ..Loadout::default()
        }
    }

    #[test]
    fn block_halves_and_adds_shield() {
        let mut h = Harness::new(3, 3);
        let id = h.spawn(h.hero(1, (0, 0), 30).with_loadout(shield(2)));
        let result = block(&mut h.ctx(), id, None, 11).unwrap().resolved().unwrap();
        assert_eq!(result.prevented, 7);
        assert_eq!(result.final_damage, 4);
    }

    #[test]
    fn block_never_prevents_more_than_incoming() {
        let mut h = Harness::new(3, 3);
        let id = h.spawn(h.hero(1, (0, 0), 30).with_loadout(shield(10)));
        let result = block(&mut h.ctx(), id, None, 4).unwrap().resolved().unwrap();
        assert_eq!(result.prevented, 4);
        assert_eq!(result.final_damage, 0);
    }

    #[test]
    fn block_is_repeatable_and_ungated() {
        let mut h = Harness::new(3, 3);
        let id = h.spawn(h.hero(1, (0, 0), 30).with_loadout(shield(0)));
        h.state.combatant_mut(id).unwrap().reaction_available = false;
        let mut ctx = h.ctx();
        assert!(block(&mut ctx, id, None, 10).unwrap().resolved().is_some());
        assert!(block(&mut ctx, id, None, 10).unwrap().resolved().is_some());
    }

    #[test]
    fn block_requires_shield() {
        let mut h = Harness::new(3, 3);
        let id = h.spawn_hero(1, (0, 0), 30);
        assert_eq!(
            block(&mut h.ctx(), id, None, 10).unwrap(),
            DefenseOutcome::Rejected(DefenseRejection::NoShield)
        );
    }

    #[test]
    fn dodge_tie_goes_to_defender_by_default() {
        let mut h = Harness::new(3, 3);
        let id = h.spawn(h.hero(1, (0, 0), 30).with_attributes(Attributes::new(10, 14)));
        let foe = h.spawn_foe(2, (1, 0), 30);
        h.roll([13]);
        let result = dodge(&mut h.ctx(), id, foe, 15).unwrap().resolved().unwrap();
        assert_eq!(result.total, 15);
        assert!(result.success);
        assert_eq!(h.kinds(), vec!["ReactionUsed", "DodgeAttempted"]);
        assert!(!h.combatant(id).reaction_available);
    }

    #[test]
    fn strict_dodge_policy_gives_ties_to_attacker() {
        let mut h = Harness::new(3, 3);
        h.config.dodge_ties_favor_defender = false;
        let id = h.spawn_hero(1, (0, 0), 30);
        let foe = h.spawn_foe(2, (1, 0), 30);
        h.roll([15]);
        let result = dodge(&mut h.ctx(), id, foe, 15).unwrap().resolved().unwrap();
        assert!(!result.success);
    }

    #[test]
    fn second_reaction_is_rejected_without_rolling() {
        let mut h = Harness::new(3, 3);
        let id = h.spawn(h.hero(1, (0, 0), 30).with_loadout(sword()));
        let foe = h.spawn_foe(2, (1, 0), 30);
        h.roll([2, 20]);
        let mut ctx = h.ctx();
        dodge(&mut ctx, id, foe, 18).unwrap();
        assert_eq!(
            parry(&mut ctx, id, foe, 10).unwrap(),
            DefenseOutcome::Rejected(DefenseRejection::NoReactionAvailable)
        );
        assert_eq!(h.dice.remaining(), 1);
    }

    #[test]
    fn dodge_is_blocked_by_heavy_armor() {
        let mut h = Harness::new(3, 3);
        let plate = Loadout {
            armor: Some(Armor {
                name: "plate".into(),
                weight: ArmorWeight::Heavy,
                durability: 50,
            }),
            ..Loadout::default()
        };
        let id = h.spawn(h.hero(1, (0, 0), 30).with_loadout(plate));
        let foe = h.spawn_foe(2, (1, 0), 30);
        assert_eq!(
            dodge(&mut h.ctx(), id, foe, 10).unwrap(),
            DefenseOutcome::Rejected(DefenseRejection::HeavyArmor)
        );
        assert!(h.combatant(id).reaction_available);
    }

    #[test]
    fn parry_success_counters_attacker() {
        let mut h = Harness::new(3, 3);
        let id = h.spawn(
            h.hero(1, (0, 0), 30)
                .with_loadout(sword())
                .with_attributes(Attributes::new(14, 12)),
        );
        let foe = h.spawn_foe(2, (1, 0), 30);
        // d20 = 15 (+1 DEX = 16 vs DC 12), weapon 1d8 = 5 (+2 STR = 7)
        h.roll([15, 5]);
        let result = parry(&mut h.ctx(), id, foe, 10).unwrap().resolved().unwrap();
        assert!(result.success);
        assert_eq!(result.dc, 12);
        assert_eq!(result.counter_damage, 7);
        assert_eq!(h.combatant(foe).health.current(), 23);
        assert_eq!(h.kinds(), vec!["ReactionUsed", "ParrySuccess"]);
    }

    #[test]
    fn parry_failure_still_spends_reaction() {
        let mut h = Harness::new(3, 3);
        let id = h.spawn(h.hero(1, (0, 0), 30).with_loadout(sword()));
        let foe = h.spawn_foe(2, (1, 0), 30);
        h.roll([11]);
        let result = parry(&mut h.ctx(), id, foe, 10).unwrap().resolved().unwrap();
        assert!(!result.success);
        assert!(!h.combatant(id).reaction_available);
        assert_eq!(h.kinds(), vec!["ReactionUsed", "ParryFailed"]);
    }

    #[test]
    fn parry_requires_melee_weapon() {
        let mut h = Harness::new(3, 3);
        let id = h.spawn_hero(1, (0, 0), 30);
        let foe = h.spawn_foe(2, (1, 0), 30);
        assert_eq!(
            parry(&mut h.ctx(), id, foe, 10).unwrap(),
            DefenseOutcome::Rejected(DefenseRejection::NoMeleeWeapon)
        );
    }

    #[test]
    fn defending_adds_to_reaction_rolls() {
        let mut h = Harness::new(3, 3);
        let id = h.spawn_hero(1, (0, 0), 30);
        let foe = h.spawn_foe(2, (1, 0), 30);
        h.roll([12]);
        let mut ctx = h.ctx();
        start_defending(&mut ctx, id).unwrap();
        let result = dodge(&mut ctx, id, foe, 14).unwrap().resolved().unwrap();
        assert_eq!(result.total, 14);
        assert!(result.success);
    }

    #[test]
    fn reset_only_reports_spent_reactions() {
        let mut h = Harness::new(3, 3);
        let id = h.spawn_hero(1, (0, 0), 30);
        let mut ctx = h.ctx();
        assert!(!reset_reaction(&mut ctx, id).unwrap());
        ctx.state.combatant_mut(id).unwrap().reaction_available = false;
        assert!(reset_reaction(&mut ctx, id).unwrap());
        assert_eq!(h.kinds(), vec!["ReactionReset"]);
    }
}
