//! The closed set of events published by the resolvers.

use std::collections::BTreeMap;

use crate::combat::DamageType;
use crate::env::{BonusKind, HazardKind, LootEntry};
use crate::state::{CombatantId, Direction, Position, StatModifiers, ZoneInstanceId};

/// Why a status effect instance left its target.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EffectRemovalReason {
    Expired,
    Cleansed,
    Dispelled,
    Death,
    Replaced,
    /// Removed when the bearer stepped out of the zone that applied it.
    LeftZone,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ComboFailureReason {
    WindowExpired,
    WrongAbility,
    TargetMismatch,
}

/// Reactions that consume the once-per-turn reaction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ReactionKind {
    Dodge,
    Parry,
}

/// What stopped a forced or voluntary move.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BlockedBy {
    Impassable(Position),
    Occupant(CombatantId),
    GridEdge(Position),
}

/// Every observable outcome of combat resolution.
#[derive(Clone, Debug, PartialEq, Eq, strum::IntoStaticStr)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CombatEvent {
    // ========================================================================
    // Turn structure
    // ========================================================================
    RoundStarted {
        round: u32,
    },
    TurnStarted {
        combatant: CombatantId,
        round: u32,
    },
    CombatEnded {
        round: u32,
    },
    CombatantDefeated {
        combatant: CombatantId,
        source: Option<CombatantId>,
    },
    /// Direct damage from an attack or ability resolved outside this crate.
    DamageApplied {
        target: CombatantId,
        source: Option<CombatantId>,
        amount: u32,
        damage_type: DamageType,
        remaining_health: u32,
    },

    // ========================================================================
    // Status effects
    // ========================================================================
    EffectApplied {
        target: CombatantId,
        effect_id: String,
        stacks: u32,
        duration: Option<u32>,
        source: Option<CombatantId>,
    },
    EffectStacked {
        target: CombatantId,
        effect_id: String,
        stacks: u32,
        max_stacks: u32,
    },
    EffectRefreshed {
        target: CombatantId,
        effect_id: String,
        duration: Option<u32>,
    },
    EffectRemoved {
        target: CombatantId,
        effect_id: String,
        reason: EffectRemovalReason,
    },
    /// All damage-over-time ticks for one target, keyed by effect id.
    DoTDamageDealt {
        target: CombatantId,
        total_damage: u32,
        breakdown: BTreeMap<String, u32>,
        remaining_health: u32,
    },
    HoTHealingDone {
        target: CombatantId,
        total_healing: u32,
        breakdown: BTreeMap<String, u32>,
        current_health: u32,
    },
    EffectsCleansed {
        target: CombatantId,
        removed: Vec<String>,
    },
    EffectsDispelled {
        target: CombatantId,
        removed: Vec<String>,
    },

    // ========================================================================
    // Defensive actions
    // ========================================================================
    ReactionUsed {
        combatant: CombatantId,
        reaction: ReactionKind,
    },
    ReactionReset {
        combatant: CombatantId,
    },
    Blocked {
        defender: CombatantId,
        attacker: Option<CombatantId>,
        incoming: u32,
        final_damage: u32,
        prevented: u32,
    },
    DodgeAttempted {
        defender: CombatantId,
        attacker: CombatantId,
        roll: u32,
        total: i32,
        attack_roll: i32,
        success: bool,
    },
    ParrySuccess {
        defender: CombatantId,
        attacker: CombatantId,
        roll: u32,
        total: i32,
        dc: i32,
        counter_damage: u32,
    },
    ParryFailed {
        defender: CombatantId,
        attacker: CombatantId,
        roll: u32,
        total: i32,
        dc: i32,
    },

    // ========================================================================
    // Stances
    // ========================================================================
    StanceModifiersRemoved {
        combatant: CombatantId,
        stance_id: String,
        modifiers: StatModifiers,
    },
    StanceModifiersApplied {
        combatant: CombatantId,
        stance_id: String,
        modifiers: StatModifiers,
    },
    StanceChanged {
        combatant: CombatantId,
        old_stance: String,
        new_stance: String,
    },
    StanceChangeReset {
        round: u32,
        combatants_reset: u32,
    },

    // ========================================================================
    // Combos
    // ========================================================================
    ComboStarted {
        combatant: CombatantId,
        combo_id: String,
        total_steps: u32,
        window_turns: u32,
    },
    ComboProgressed {
        combatant: CombatantId,
        combo_id: String,
        current_step: u32,
        total_steps: u32,
        window_remaining: u32,
    },
    ComboCompleted {
        combatant: CombatantId,
        combo_id: String,
        bonus_effects_applied: u32,
    },
    ComboFailed {
        combatant: CombatantId,
        combo_id: String,
        reason: ComboFailureReason,
        step_reached: u32,
    },
    ComboBonusApplied {
        combatant: CombatantId,
        combo_id: String,
        kind: BonusKind,
        targets: Vec<CombatantId>,
        /// Rolled damage or healing per target, or the flat value of the bonus.
        value: u32,
    },
    ComboProgressReset {
        combatant: CombatantId,
        combos_cleared: u32,
    },

    // ========================================================================
    // Movement and hazards
    // ========================================================================
    CombatantMoved {
        combatant: CombatantId,
        from: Position,
        to: Position,
    },
    CombatantPushed {
        pusher: CombatantId,
        target: CombatantId,
        from: Position,
        to: Position,
        pusher_total: i32,
        target_total: i32,
    },
    PushResisted {
        pusher: CombatantId,
        target: CombatantId,
        position: Position,
        pusher_total: i32,
        target_total: i32,
    },
    CombatantKnockedBack {
        source: Option<CombatantId>,
        target: CombatantId,
        from: Position,
        to: Position,
        cells_moved: u32,
    },
    MovementBlocked {
        combatant: CombatantId,
        position: Position,
        cells_requested: u32,
        cells_moved_before_block: u32,
        blocked_by: BlockedBy,
    },
    CriticalKnockbackTriggered {
        attacker: CombatantId,
        target: CombatantId,
        direction: Direction,
        cells: u32,
    },
    HazardEntered {
        combatant: CombatantId,
        hazard_id: String,
        kind: HazardKind,
        position: Position,
        was_pushed: bool,
        pusher_name: Option<String>,
    },
    HazardDamageDealt {
        combatant: CombatantId,
        hazard_id: String,
        damage_dealt: u32,
        damage_type: DamageType,
        remaining_health: u32,
        was_entry_damage: bool,
    },
    HazardStatusEffectApplied {
        combatant: CombatantId,
        hazard_id: String,
        effect_id: String,
    },
    CombatantTrapped {
        combatant: CombatantId,
        hazard_id: String,
        fall_damage: u32,
    },
    CombatantKilledByHazard {
        combatant: CombatantId,
        hazard_id: String,
        damage: u32,
    },
    ArmorDegraded {
        combatant: CombatantId,
        armor: String,
        amount: u32,
        remaining_durability: u32,
    },
    HazardTickProcessed {
        round: u32,
        combatants_affected: u32,
        total_damage: u32,
    },
    CombatantClimbedOut {
        combatant: CombatantId,
        total: i32,
        dc: i32,
    },
    ClimbOutFailed {
        combatant: CombatantId,
        total: i32,
        dc: i32,
    },

    // ========================================================================
    // Zones
    // ========================================================================
    ZoneCreated {
        zone: ZoneInstanceId,
        zone_id: String,
        caster: CombatantId,
        center: Position,
        cell_count: u32,
        duration: u32,
    },
    ZoneDamage {
        zone: ZoneInstanceId,
        zone_id: String,
        target: CombatantId,
        damage: u32,
        damage_type: DamageType,
        remaining_health: u32,
    },
    ZoneHeal {
        zone: ZoneInstanceId,
        zone_id: String,
        target: CombatantId,
        amount: u32,
        current_health: u32,
    },
    ZoneStatusApplied {
        zone: ZoneInstanceId,
        zone_id: String,
        target: CombatantId,
        effect_id: String,
    },
    ZoneEntered {
        zone: ZoneInstanceId,
        zone_id: String,
        combatant: CombatantId,
        position: Position,
    },
    ZoneExited {
        zone: ZoneInstanceId,
        zone_id: String,
        combatant: CombatantId,
        position: Position,
    },
    ZoneExpired {
        zone: ZoneInstanceId,
        zone_id: String,
        reason: String,
    },

    // ========================================================================
    // Bosses
    // ========================================================================
    BossPhaseChanged {
        boss: CombatantId,
        boss_id: String,
        old_phase: u32,
        new_phase: u32,
        phase_name: String,
        transition_text: Option<String>,
    },
    BossVulnerable {
        boss: CombatantId,
        turns: u32,
        multiplier_percent: u32,
    },
    BossVulnerabilityEnded {
        boss: CombatantId,
    },
    BossSummonTriggered {
        boss: CombatantId,
        monster_id: String,
        count: u32,
        active_summons: u32,
    },
    BossDefeated {
        boss: CombatantId,
        boss_id: String,
        loot: Vec<LootEntry>,
    },
}

impl CombatEvent {
    /// Variant name, for logging and subscriber filtering.
    pub fn kind(&self) -> &'static str {
        self.into()
    }
}
