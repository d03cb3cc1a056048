//! Combat resolvers.
//!
//! Each submodule is a set of free functions over a [`CombatContext`]. They
//! mutate [`crate::state::CombatState`] and publish events in mutation order.
//!
//! # Modules
//!
//! - `status`: apply, stack, tick, cleanse, dispel
//! - `defense`: block, dodge, parry and the reaction gate
//! - `stance`: stance changes with a once-per-round allowance
//! - `combo`: multi-step combo tracking
//! - `movement` / `hazard`: forced movement, hazard entry and ticks
//! - `zone`: area effects
//! - `boss`: phase transitions, vulnerability, summons
//!
//! All damage goes through [`damage::apply_damage`] followed by
//! [`damage::settle`].

mod context;

pub mod boss;
pub mod combo;
pub mod damage;
pub mod defense;
pub mod hazard;
pub mod movement;
pub mod stance;
pub mod status;
pub mod zone;

#[cfg(test)]
mod properties;

pub use context::CombatContext;
pub use damage::{DamageOutcome, DamageRoll, DamageType};
