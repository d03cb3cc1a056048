mod boss;
mod combatant;
mod combo;
mod common;
mod grid;
mod status;
mod zone;

pub use boss::{BossState, SummonCadence};
pub use combatant::{Armor, ArmorWeight, Attributes, Combatant, Loadout, StanceState};
pub use combo::ComboProgress;
pub use common::{CombatantId, Direction, Faction, Health, Position, StatModifiers};
pub use grid::{CombatGrid, GridCell, GridError, HazardInstance, Terrain};
pub use status::{StatusEffectInstance, StatusEffects};
pub use zone::{ZoneInstance, ZoneInstanceId};
