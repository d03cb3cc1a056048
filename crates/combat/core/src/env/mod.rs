//! Read-only definition data consumed by the resolvers.
//!
//! Each definition family is exposed through its own oracle trait. The
//! [`CombatEnv`] aggregate bundles them, together with the combat tunables, so
//! the resolvers can look up anything they need without depending on how the
//! definitions were loaded.
mod boss;
mod combo;
mod dice;
mod error;
mod hazard;
mod rng;
mod stance;
mod status;
mod zone;

pub use boss::{BossDefinition, BossOracle, BossPhase, LootEntry, SummonConfig};
pub use combo::{
    BonusEffect, BonusKind, BonusTarget, ComboBonus, ComboDefinition, ComboOracle, ComboStep,
    StepTarget,
};
pub use dice::{DiceError, DiceExpr, DiceSource, ScriptedDice, SeededDice};
pub use error::OracleError;
pub use hazard::{HazardDefinition, HazardFlags, HazardKind, HazardOracle};
pub use rng::{PcgRng, RngOracle, compute_seed};
pub use stance::{StanceDefinition, StanceOracle};
pub use status::{StackingRule, StatusCategory, StatusEffectDefinition, StatusEffectOracle, TickEffect};
pub use zone::{StatusScope, ZoneDefinition, ZoneEffectKind, ZoneEffectSpec, ZoneOracle, ZoneShape};

use crate::config::CombatConfig;

/// Every definition family at once, for catalogs that serve them all.
pub trait DefinitionOracle:
    StatusEffectOracle + ComboOracle + StanceOracle + HazardOracle + ZoneOracle + BossOracle
{
}

impl<T> DefinitionOracle for T where
    T: StatusEffectOracle + ComboOracle + StanceOracle + HazardOracle + ZoneOracle + BossOracle
{
}

/// Aggregates the read-only oracles required by the resolvers.
#[derive(Clone, Copy)]
pub struct CombatEnv<'a> {
    config: Option<&'a CombatConfig>,
    statuses: Option<&'a dyn StatusEffectOracle>,
    combos: Option<&'a dyn ComboOracle>,
    stances: Option<&'a dyn StanceOracle>,
    hazards: Option<&'a dyn HazardOracle>,
    zones: Option<&'a dyn ZoneOracle>,
    bosses: Option<&'a dyn BossOracle>,
}

impl<'a> CombatEnv<'a> {
    pub fn empty() -> Self {
        Self {
            config: None,
            statuses: None,
            combos: None,
            stances: None,
            hazards: None,
            zones: None,
            bosses: None,
        }
    }

    pub fn with_all<O: DefinitionOracle>(config: &'a CombatConfig, oracle: &'a O) -> Self {
        Self {
            config: Some(config),
            statuses: Some(oracle),
            combos: Some(oracle),
            stances: Some(oracle),
            hazards: Some(oracle),
            zones: Some(oracle),
            bosses: Some(oracle),
        }
    }

    pub fn with_config(mut self, config: &'a CombatConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn with_statuses(mut self, oracle: &'a dyn StatusEffectOracle) -> Self {
        self.statuses = Some(oracle);
        self
    }

    pub fn with_combos(mut self, oracle: &'a dyn ComboOracle) -> Self {
        self.combos = Some(oracle);
        self
    }

    pub fn with_stances(mut self, oracle: &'a dyn StanceOracle) -> Self {
        self.stances = Some(oracle);
        self
    }

    pub fn with_hazards(mut self, oracle: &'a dyn HazardOracle) -> Self {
        self.hazards = Some(oracle);
        self
    }

    pub fn with_zones(mut self, oracle: &'a dyn ZoneOracle) -> Self {
        self.zones = Some(oracle);
        self
    }

    pub fn with_bosses(mut self, oracle: &'a dyn BossOracle) -> Self {
        self.bosses = Some(oracle);
        self
    }

    /// # Errors
    ///
    /// Returns `OracleError::ConfigNotAvailable` if no config was provided.
    pub fn config(&self) -> Result<&'a CombatConfig, OracleError> {
        self.config.ok_or(OracleError::ConfigNotAvailable)
    }

    pub fn statuses(&self) -> Result<&'a dyn StatusEffectOracle, OracleError> {
        self.statuses.ok_or(OracleError::StatusEffectsNotAvailable)
    }

    pub fn combos(&self) -> Result<&'a dyn ComboOracle, OracleError> {
        self.combos.ok_or(OracleError::CombosNotAvailable)
    }

    pub fn stances(&self) -> Result<&'a dyn StanceOracle, OracleError> {
        self.stances.ok_or(OracleError::StancesNotAvailable)
    }

    pub fn hazards(&self) -> Result<&'a dyn HazardOracle, OracleError> {
        self.hazards.ok_or(OracleError::HazardsNotAvailable)
    }

    pub fn zones(&self) -> Result<&'a dyn ZoneOracle, OracleError> {
        self.zones.ok_or(OracleError::ZonesNotAvailable)
    }

    pub fn bosses(&self) -> Result<&'a dyn BossOracle, OracleError> {
        self.bosses.ok_or(OracleError::BossesNotAvailable)
    }

    /// Looks up a status effect definition, failing on unknown ids.
    pub fn status_effect(&self, id: &str) -> Result<&'a StatusEffectDefinition, OracleError> {
        self.statuses()?
            .status_effect(id)
            .ok_or_else(|| OracleError::UnknownStatusEffect(id.to_string()))
    }

    pub fn combo(&self, id: &str) -> Result<&'a ComboDefinition, OracleError> {
        self.combos()?
            .combo(id)
            .ok_or_else(|| OracleError::UnknownCombo(id.to_string()))
    }

    pub fn stance(&self, id: &str) -> Result<&'a StanceDefinition, OracleError> {
        self.stances()?
            .stance(id)
            .ok_or_else(|| OracleError::UnknownStance(id.to_string()))
    }

    pub fn hazard(&self, id: &str) -> Result<&'a HazardDefinition, OracleError> {
        self.hazards()?
            .hazard(id)
            .ok_or_else(|| OracleError::UnknownHazard(id.to_string()))
    }

    pub fn zone(&self, id: &str) -> Result<&'a ZoneDefinition, OracleError> {
        self.zones()?
            .zone(id)
            .ok_or_else(|| OracleError::UnknownZone(id.to_string()))
    }

    pub fn boss(&self, id: &str) -> Result<&'a BossDefinition, OracleError> {
        self.bosses()?
            .boss(id)
            .ok_or_else(|| OracleError::UnknownBoss(id.to_string()))
    }

    /// Id of the stance combatants start in.
    ///
    /// Uses the definition marked as default, falling back to the configured id.
    pub fn default_stance_id(&self) -> Result<String, OracleError> {
        if let Some(stance) = self.stances.and_then(|oracle| oracle.default_stance()) {
            return Ok(stance.id.clone());
        }
        Ok(self.config()?.default_stance.clone())
    }
}

impl core::fmt::Debug for CombatEnv<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("CombatEnv")
            .field("config", &self.config)
            .field("statuses", &self.statuses.is_some())
            .field("combos", &self.combos.is_some())
            .field("stances", &self.stances.is_some())
            .field("hazards", &self.hazards.is_some())
            .field("zones", &self.zones.is_some())
            .field("bosses", &self.bosses.is_some())
            .finish()
    }
}
