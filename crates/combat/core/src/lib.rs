//! Deterministic tactical combat resolution.
//!
//! `combat-core` owns the turn- and round-scoped mechanics of a grid-based
//! combat encounter: status effects, the reaction economy for block, dodge
//! and parry, stances, combos, forced movement with hazards, area zones, and
//! multi-phase bosses. Every mutation publishes a [`CombatEvent`] through the
//! [`EventBus`] in mutation order.
//!
//! Static definitions come from oracle traits bundled in [`CombatEnv`]; dice
//! come from an injected [`DiceSource`], so identical seeds reproduce
//! identical event streams. [`engine::CombatEngine`] is the entry point for
//! schedulers; the [`combat`] resolvers can also be driven directly.
pub mod combat;
pub mod config;
pub mod engine;
pub mod env;
pub mod error;
pub mod event;
pub mod state;

#[cfg(test)]
pub(crate) mod testing;

pub use combat::{CombatContext, DamageOutcome, DamageRoll, DamageType};
pub use config::{CombatConfig, SummonDefaults};
pub use engine::{CombatEngine, RoundStart, TurnStart};
pub use env::{
    BonusEffect, BonusKind, BonusTarget, BossDefinition, BossOracle, BossPhase, CombatEnv,
    ComboBonus, ComboDefinition, ComboOracle, ComboStep, DefinitionOracle, DiceError, DiceExpr,
    DiceSource, HazardDefinition, HazardFlags, HazardKind, HazardOracle, LootEntry, OracleError,
    PcgRng, RngOracle, ScriptedDice, SeededDice, StackingRule, StanceDefinition, StanceOracle,
    StatusCategory, StatusEffectDefinition, StatusEffectOracle, StatusScope, StepTarget,
    SummonConfig, TickEffect, ZoneDefinition, ZoneEffectKind, ZoneEffectSpec, ZoneOracle,
    ZoneShape, compute_seed,
};
pub use error::{CombatError, CombatResult, ErrorContext, ErrorSeverity, GameError};
pub use event::{
    BlockedBy, ComboFailureReason, CombatEvent, EffectRemovalReason, EventBus, EventRecord,
    EventSubscriber, ReactionKind,
};
pub use state::{
    Armor, ArmorWeight, Attributes, BossState, CombatGrid, CombatState, Combatant, CombatantId,
    ComboProgress, Direction, Faction, GridCell, GridError, Health, HazardInstance, Loadout,
    Position, StanceState, StatModifiers, StatusEffectInstance, StatusEffects, Terrain,
    ZoneInstance, ZoneInstanceId,
};
