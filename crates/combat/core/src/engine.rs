//! Round and turn scheduling hooks plus a facade over the resolvers.
//!
//! The [`CombatEngine`] does not decide who acts. An external scheduler calls
//! [`CombatEngine::start_round`] once per round, [`CombatEngine::start_turn`]
//! before each combatant acts, and then one resolver entry point per action.
//! Boundary processing runs in a fixed order so identical seeds produce
//! identical event streams.

use crate::combat::{
    CombatContext, DamageOutcome, DamageType, boss, combo, damage, defense, hazard, movement,
    stance, status, zone,
};
use crate::env::{CombatEnv, DiceSource};
use crate::error::CombatResult;
use crate::event::{CombatEvent, EventBus};
use crate::state::{CombatState, Combatant, CombatantId, Direction, Position, ZoneInstanceId};

/// Everything start-of-turn processing did to the acting combatant.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TurnStart {
    pub status: status::TickSummary,
    pub expired_combos: Vec<String>,
    /// Set when the acting combatant is a boss whose summon cadence fired.
    pub summon: Option<boss::SummonRequest>,
}

/// Per-round summary from [`CombatEngine::start_round`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RoundStart {
    pub round: u32,
    pub stances_reset: u32,
    pub hazards: hazard::HazardTickSummary,
    pub expired_zones: Vec<ZoneInstanceId>,
}

pub struct CombatEngine<'a> {
    ctx: CombatContext<'a>,
}

impl<'a> CombatEngine<'a> {
    pub fn new(
        state: &'a mut CombatState,
        env: CombatEnv<'a>,
        dice: &'a mut dyn DiceSource,
        events: &'a mut EventBus,
    ) -> Self {
        Self {
            ctx: CombatContext::new(state, env, dice, events),
        }
    }

    pub fn state(&self) -> &CombatState {
        self.ctx.state
    }

    /// Direct access for resolvers without a facade method.
    pub fn context(&mut self) -> &mut CombatContext<'a> {
        &mut self.ctx
    }

    // ========================================================================
    // Roster
    // ========================================================================

    /// Adds a combatant, places it on the grid, and puts it in the default stance.
    pub fn add_combatant(&mut self, combatant: Combatant) -> CombatResult<CombatantId> {
        let id = combatant.id;
        self.ctx.state.add_combatant(combatant)?;
        stance::assign_default(&mut self.ctx, id)?;
        tracing::debug!("{} joined combat", id);
        Ok(id)
    }

    pub fn register_boss(&mut self, combatant: CombatantId, boss_id: &str) -> CombatResult<()> {
        boss::register_boss(&mut self.ctx, combatant, boss_id)
    }

    /// Adds a boss summon to the roster and links it to the boss.
    pub fn add_summon(&mut self, boss_id: CombatantId, summon: Combatant) -> CombatResult<CombatantId> {
        let id = self.add_combatant(summon)?;
        boss::register_summon(&mut self.ctx, boss_id, id)?;
        Ok(id)
    }

    // ========================================================================
    // Boundaries
    // ========================================================================

    /// Advances the round counter and runs round-start processing:
    /// stance allowance reset, hazard ticks, then zone ticks.
    pub fn start_round(&mut self) -> CombatResult<RoundStart> {
        self.ctx.state.round += 1;
        let round = self.ctx.state.round;
        tracing::debug!("round {} begins", round);
        self.ctx.emit(CombatEvent::RoundStarted { round });

        let stances_reset = stance::reset_round(&mut self.ctx);
        let hazards = hazard::tick_hazards(&mut self.ctx)?;
        let expired_zones = zone::tick_zones(&mut self.ctx)?;
        Ok(RoundStart {
            round,
            stances_reset,
            hazards,
            expired_zones,
        })
    }

    /// Runs start-of-turn processing for `combatant`: reaction reset, the boss
    /// vulnerability countdown, status ticks, combo windows, then the summon
    /// cadence.
    ///
    /// A vulnerability window opened by this turn's status ticks keeps its
    /// full length.
    pub fn start_turn(&mut self, combatant: CombatantId) -> CombatResult<TurnStart> {
        let round = self.ctx.round();
        self.ctx.emit(CombatEvent::TurnStarted { combatant, round });

        let mut turn = TurnStart::default();
        let is_boss = self.ctx.state.bosses.contains_key(&combatant);
        defense::reset_reaction(&mut self.ctx, combatant)?;
        if is_boss {
            boss::tick_vulnerability(&mut self.ctx, combatant)?;
        }
        turn.status = status::tick(&mut self.ctx, combatant)?;
        if !self.ctx.state.combatant(combatant)?.is_alive() {
            return Ok(turn);
        }
        turn.expired_combos = combo::tick_windows(&mut self.ctx, combatant)?;
        if is_boss {
            turn.summon = boss::tick_summons(&mut self.ctx, combatant)?;
        }
        Ok(turn)
    }

    /// Clears zones and combo progress and publishes `CombatEnded`.
    pub fn end_combat(&mut self) -> CombatResult<()> {
        zone::clear_zones(&mut self.ctx)?;
        for id in self.ctx.state.combatant_ids() {
            combo::reset(&mut self.ctx, id)?;
        }
        let round = self.ctx.round();
        tracing::info!("combat ended after {} rounds", round);
        self.ctx.emit(CombatEvent::CombatEnded { round });
        Ok(())
    }

    // ========================================================================
    // Actions
    // ========================================================================

    pub fn deal_damage(
        &mut self,
        target: CombatantId,
        amount: u32,
        damage_type: DamageType,
        source: Option<CombatantId>,
    ) -> CombatResult<DamageOutcome> {
        damage::deal_damage(&mut self.ctx, target, amount, damage_type, source)
    }

    pub fn heal(&mut self, target: CombatantId, amount: u32) -> CombatResult<u32> {
        damage::heal(&mut self.ctx, target, amount)
    }

    pub fn apply_status(
        &mut self,
        target: CombatantId,
        effect_id: &str,
        source: Option<CombatantId>,
    ) -> CombatResult<status::ApplyOutcome> {
        status::apply(&mut self.ctx, target, effect_id, source)
    }

    /// Removes every cleansable harmful effect.
    pub fn cleanse(&mut self, target: CombatantId) -> CombatResult<Vec<String>> {
        status::cleanse(&mut self.ctx, target, |def| def.is_harmful())
    }

    /// Removes every dispellable beneficial effect.
    pub fn dispel(&mut self, target: CombatantId) -> CombatResult<Vec<String>> {
        status::dispel(&mut self.ctx, target, |def| def.is_beneficial())
    }

    pub fn block(
        &mut self,
        defender: CombatantId,
        attacker: Option<CombatantId>,
        incoming: u32,
    ) -> CombatResult<defense::DefenseOutcome<defense::BlockResult>> {
        defense::block(&mut self.ctx, defender, attacker, incoming)
    }

    pub fn dodge(
        &mut self,
        defender: CombatantId,
        attacker: CombatantId,
        attack_roll: i32,
    ) -> CombatResult<defense::DefenseOutcome<defense::DodgeResult>> {
        defense::dodge(&mut self.ctx, defender, attacker, attack_roll)
    }

    pub fn parry(
        &mut self,
        defender: CombatantId,
        attacker: CombatantId,
        attack_roll: i32,
    ) -> CombatResult<defense::DefenseOutcome<defense::ParryResult>> {
        defense::parry(&mut self.ctx, defender, attacker, attack_roll)
    }

    pub fn defend(&mut self, combatant: CombatantId) -> CombatResult<()> {
        defense::start_defending(&mut self.ctx, combatant)
    }

    pub fn change_stance(
        &mut self,
        combatant: CombatantId,
        stance_id: &str,
    ) -> CombatResult<stance::StanceChangeOutcome> {
        stance::change_stance(&mut self.ctx, combatant, stance_id)
    }

    /// Records an ability use for combo tracking.
    pub fn use_ability(
        &mut self,
        performer: CombatantId,
        ability_id: &str,
        target: Option<CombatantId>,
    ) -> CombatResult<Vec<combo::ComboOutcome>> {
        combo::on_ability_used(&mut self.ctx, performer, ability_id, target)
    }

    pub fn move_to(
        &mut self,
        combatant: CombatantId,
        to: Position,
    ) -> CombatResult<movement::MoveOutcome> {
        movement::move_to(&mut self.ctx, combatant, to)
    }

    pub fn push(
        &mut self,
        pusher: CombatantId,
        target: CombatantId,
    ) -> CombatResult<movement::PushOutcome> {
        movement::push(&mut self.ctx, pusher, target)
    }

    pub fn knockback(
        &mut self,
        source: Option<CombatantId>,
        target: CombatantId,
        direction: Direction,
        cells: u32,
    ) -> CombatResult<Option<movement::MovementResolution>> {
        movement::knockback(&mut self.ctx, source, target, direction, cells)
    }

    pub fn critical_knockback(
        &mut self,
        attacker: CombatantId,
        target: CombatantId,
    ) -> CombatResult<Option<movement::MovementResolution>> {
        movement::critical_knockback(&mut self.ctx, attacker, target)
    }

    pub fn climb_out(&mut self, combatant: CombatantId) -> CombatResult<hazard::ClimbOutcome> {
        hazard::climb_out(&mut self.ctx, combatant)
    }

    pub fn place_hazard(&mut self, hazard_id: &str, position: Position) -> CombatResult<()> {
        hazard::place_hazard(&mut self.ctx, hazard_id, position)
    }

    pub fn create_zone(
        &mut self,
        caster: CombatantId,
        zone_id: &str,
        center: Position,
        direction: Option<Direction>,
    ) -> CombatResult<ZoneInstanceId> {
        zone::create_zone(&mut self.ctx, caster, zone_id, center, direction)
    }

    pub fn remove_zone(&mut self, zone_id: ZoneInstanceId) -> CombatResult<bool> {
        zone::remove_zone(&mut self.ctx, zone_id, zone::REASON_REMOVED)
    }
}
