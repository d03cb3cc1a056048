//! Owned, validated definition catalog.
//!
//! A [`Catalog`] holds every definition family the combat core consumes and
//! implements all of its oracle traits, so one catalog can back a whole
//! [`CombatEnv`].

use std::collections::BTreeMap;

use combat_core::{
    BonusEffect, BossDefinition, BossOracle, CombatConfig, CombatEnv, ComboDefinition,
    ComboOracle, DiceError, ErrorSeverity, GameError, HazardDefinition, HazardOracle,
    StanceDefinition, StanceOracle, StatusEffectDefinition, StatusEffectOracle, ZoneDefinition,
    ZoneOracle, ZoneShape,
};

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    #[error("duplicate {kind} id '{id}'")]
    Duplicate { kind: &'static str, id: String },

    #[error("'{id}': unknown {field} '{value}'")]
    UnknownVariant {
        id: String,
        field: &'static str,
        value: String,
    },

    #[error("'{id}': {source}")]
    InvalidDice { id: String, source: DiceError },

    #[error("'{id}': {field} is required")]
    MissingField { id: String, field: &'static str },

    #[error("'{owner}' references unknown status effect '{effect_id}'")]
    UnknownStatusReference { owner: String, effect_id: String },

    #[error("status effect '{0}' has a stack cap of 0")]
    ZeroStackCap(String),

    #[error("stances '{first}' and '{second}' are both marked default")]
    MultipleDefaultStances { first: String, second: String },

    #[error("combo '{id}' has {steps} steps; expected 2 to {max}")]
    ComboLength { id: String, steps: usize, max: usize },

    #[error("combo '{0}' has a window of 0 turns")]
    ZeroComboWindow(String),

    #[error("ring zone '{0}' has a radius of 0 and covers no cells")]
    EmptyRing(String),

    #[error("boss '{boss}' has {phases} phases; expected 1 to {max}")]
    PhaseCount {
        boss: String,
        phases: usize,
        max: usize,
    },

    #[error("boss '{boss}' phase {found} is out of order; expected phase {expected}")]
    PhaseNumbering {
        boss: String,
        expected: u32,
        found: u32,
    },

    #[error("boss '{boss}' phase 1 threshold is {threshold}%; must be 100%")]
    FirstPhaseThreshold { boss: String, threshold: u32 },

    #[error("boss '{boss}' phase {phase} threshold does not decrease")]
    ThresholdsNotDecreasing { boss: String, phase: u32 },

    #[error("boss '{boss}' loot '{item}' has chance {chance}%")]
    LootChance {
        boss: String,
        item: String,
        chance: u32,
    },
}

impl GameError for CatalogError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Validation
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::Duplicate { .. } => "CATALOG_DUPLICATE_ID",
            Self::UnknownVariant { .. } => "CATALOG_UNKNOWN_VARIANT",
            Self::InvalidDice { .. } => "CATALOG_INVALID_DICE",
            Self::MissingField { .. } => "CATALOG_MISSING_FIELD",
            Self::UnknownStatusReference { .. } => "CATALOG_UNKNOWN_STATUS",
            Self::ZeroStackCap(_) => "CATALOG_ZERO_STACK_CAP",
            Self::MultipleDefaultStances { .. } => "CATALOG_MULTIPLE_DEFAULT_STANCES",
            Self::ComboLength { .. } => "CATALOG_COMBO_LENGTH",
            Self::ZeroComboWindow(_) => "CATALOG_ZERO_COMBO_WINDOW",
            Self::EmptyRing(_) => "CATALOG_EMPTY_RING",
            Self::PhaseCount { .. } => "CATALOG_PHASE_COUNT",
            Self::PhaseNumbering { .. } => "CATALOG_PHASE_NUMBERING",
            Self::FirstPhaseThreshold { .. } => "CATALOG_FIRST_PHASE_THRESHOLD",
            Self::ThresholdsNotDecreasing { .. } => "CATALOG_THRESHOLDS_NOT_DECREASING",
            Self::LootChance { .. } => "CATALOG_LOOT_CHANCE",
        }
    }
}

/// Every definition family plus the tunables they were loaded with.
#[derive(Clone, Debug, Default)]
pub struct Catalog {
    config: CombatConfig,
    statuses: BTreeMap<String, StatusEffectDefinition>,
    stances: BTreeMap<String, StanceDefinition>,
    combos: BTreeMap<String, ComboDefinition>,
    /// Combo ids keyed by their first step's ability.
    combos_by_start: BTreeMap<String, Vec<String>>,
    hazards: BTreeMap<String, HazardDefinition>,
    zones: BTreeMap<String, ZoneDefinition>,
    bosses: BTreeMap<String, BossDefinition>,
}

impl Catalog {
    pub fn new(config: CombatConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &CombatConfig {
        &self.config
    }

    /// Environment backed by this catalog for every oracle.
    pub fn env(&self) -> CombatEnv<'_> {
        CombatEnv::with_all(&self.config, self)
    }

    pub fn add_status(&mut self, def: StatusEffectDefinition) -> Result<(), CatalogError> {
        insert(&mut self.statuses, "status effect", def.id.clone(), def)
    }

    pub fn add_stance(&mut self, def: StanceDefinition) -> Result<(), CatalogError> {
        insert(&mut self.stances, "stance", def.id.clone(), def)
    }

    pub fn add_combo(&mut self, def: ComboDefinition) -> Result<(), CatalogError> {
        let start = def.starting_ability().map(str::to_string);
        let id = def.id.clone();
        insert(&mut self.combos, "combo", id.clone(), def)?;
        if let Some(start) = start {
            self.combos_by_start.entry(start).or_default().push(id);
        }
        Ok(())
    }

    pub fn add_hazard(&mut self, def: HazardDefinition) -> Result<(), CatalogError> {
        insert(&mut self.hazards, "hazard", def.id.clone(), def)
    }

    pub fn add_zone(&mut self, def: ZoneDefinition) -> Result<(), CatalogError> {
        insert(&mut self.zones, "zone", def.id.clone(), def)
    }

    pub fn add_boss(&mut self, def: BossDefinition) -> Result<(), CatalogError> {
        insert(&mut self.bosses, "boss", def.id.clone(), def)
    }

    pub fn statuses(&self) -> impl Iterator<Item = &StatusEffectDefinition> {
        self.statuses.values()
    }

    pub fn stances(&self) -> impl Iterator<Item = &StanceDefinition> {
        self.stances.values()
    }

    pub fn combos(&self) -> impl Iterator<Item = &ComboDefinition> {
        self.combos.values()
    }

    pub fn hazards(&self) -> impl Iterator<Item = &HazardDefinition> {
        self.hazards.values()
    }

    pub fn zones(&self) -> impl Iterator<Item = &ZoneDefinition> {
        self.zones.values()
    }

    pub fn bosses(&self) -> impl Iterator<Item = &BossDefinition> {
        self.bosses.values()
    }

    /// Checks structural rules and cross references between families.
    ///
    /// # Errors
    ///
    /// Returns the first violation found, checking families in the order
    /// statuses, stances, combos, hazards, zones, bosses.
    pub fn validate(&self) -> Result<(), CatalogError> {
        for status in self.statuses.values() {
            if status.max_stacks == 0 {
                return Err(CatalogError::ZeroStackCap(status.id.clone()));
            }
        }

        let mut defaults = self.stances.values().filter(|stance| stance.is_default);
        if let (Some(first), Some(second)) = (defaults.next(), defaults.next()) {
            return Err(CatalogError::MultipleDefaultStances {
                first: first.id.clone(),
                second: second.id.clone(),
            });
        }

        for combo in self.combos.values() {
            self.validate_combo(combo)?;
        }

        for hazard in self.hazards.values() {
            self.check_status_ref(&hazard.id, hazard.status_effect.as_deref())?;
        }

        for zone in self.zones.values() {
            if zone.shape == ZoneShape::Ring && zone.radius == 0 {
                return Err(CatalogError::EmptyRing(zone.id.clone()));
            }
            self.check_status_ref(&zone.id, zone.effect.status_effect.as_deref())?;
        }

        for boss in self.bosses.values() {
            validate_boss(boss)?;
        }
        Ok(())
    }

    fn validate_combo(&self, combo: &ComboDefinition) -> Result<(), CatalogError> {
        let max = CombatConfig::MAX_COMBO_STEPS;
        if !(2..=max).contains(&combo.steps.len()) {
            return Err(CatalogError::ComboLength {
                id: combo.id.clone(),
                steps: combo.steps.len(),
                max,
            });
        }
        if combo.window_turns == 0 {
            return Err(CatalogError::ZeroComboWindow(combo.id.clone()));
        }
        for bonus in &combo.bonuses {
            if let BonusEffect::ApplyStatus { effect_id } = &bonus.effect {
                self.check_status_ref(&combo.id, Some(effect_id))?;
            }
        }
        Ok(())
    }

    fn check_status_ref(&self, owner: &str, effect_id: Option<&str>) -> Result<(), CatalogError> {
        match effect_id {
            Some(id) if !self.statuses.contains_key(id) => {
                Err(CatalogError::UnknownStatusReference {
                    owner: owner.to_string(),
                    effect_id: id.to_string(),
                })
            }
            _ => Ok(()),
        }
    }
}

fn insert<T>(
    map: &mut BTreeMap<String, T>,
    kind: &'static str,
    id: String,
    def: T,
) -> Result<(), CatalogError> {
    if map.contains_key(&id) {
        return Err(CatalogError::Duplicate { kind, id });
    }
    map.insert(id, def);
    Ok(())
}

fn validate_boss(boss: &BossDefinition) -> Result<(), CatalogError> {
    let max = CombatConfig::MAX_BOSS_PHASES;
    if !(1..=max).contains(&boss.phases.len()) {
        return Err(CatalogError::PhaseCount {
            boss: boss.id.clone(),
            phases: boss.phases.len(),
            max,
        });
    }

    let mut previous_threshold = None;
    for (expected, phase) in (1u32..).zip(&boss.phases) {
        if phase.number != expected {
            return Err(CatalogError::PhaseNumbering {
                boss: boss.id.clone(),
                expected,
                found: phase.number,
            });
        }
        match previous_threshold {
            None if phase.health_threshold != 100 => {
                return Err(CatalogError::FirstPhaseThreshold {
                    boss: boss.id.clone(),
                    threshold: phase.health_threshold,
                });
            }
            Some(previous) if phase.health_threshold >= previous => {
                return Err(CatalogError::ThresholdsNotDecreasing {
                    boss: boss.id.clone(),
                    phase: phase.number,
                });
            }
            _ => {}
        }
        previous_threshold = Some(phase.health_threshold);
    }

    if let Some(entry) = boss.loot.iter().find(|entry| entry.chance > 100) {
        return Err(CatalogError::LootChance {
            boss: boss.id.clone(),
            item: entry.item_id.clone(),
            chance: entry.chance,
        });
    }
    Ok(())
}

impl StatusEffectOracle for Catalog {
    fn status_effect(&self, id: &str) -> Option<&StatusEffectDefinition> {
        self.statuses.get(id)
    }
}

impl StanceOracle for Catalog {
    fn stance(&self, id: &str) -> Option<&StanceDefinition> {
        self.stances.get(id)
    }

    fn default_stance(&self) -> Option<&StanceDefinition> {
        self.stances.values().find(|stance| stance.is_default)
    }
}

impl ComboOracle for Catalog {
    fn combo(&self, id: &str) -> Option<&ComboDefinition> {
        self.combos.get(id)
    }

    fn combos_starting_with(&self, ability_id: &str) -> Vec<&ComboDefinition> {
        self.combos_by_start
            .get(ability_id)
            .map(|ids| ids.iter().filter_map(|id| self.combos.get(id)).collect())
            .unwrap_or_default()
    }
}

impl HazardOracle for Catalog {
    fn hazard(&self, id: &str) -> Option<&HazardDefinition> {
        self.hazards.get(id)
    }
}

impl ZoneOracle for Catalog {
    fn zone(&self, id: &str) -> Option<&ZoneDefinition> {
        self.zones.get(id)
    }
}

impl BossOracle for Catalog {
    fn boss(&self, id: &str) -> Option<&BossDefinition> {
        self.bosses.get(id)
    }
}
