//! RON definition formats and their conversion into core definitions.
//!
//! Enum-valued fields are plain strings in the data files and are parsed
//! case-insensitively; an unrecognized string is a load error, never a
//! silent default.

use std::str::FromStr;

use combat_core::{
    BonusEffect, BonusKind, BonusTarget, BossDefinition, BossPhase, ComboBonus, ComboDefinition,
    ComboStep, DamageRoll, DamageType, DiceExpr, HazardDefinition, HazardFlags, HazardKind,
    LootEntry, StackingRule, StanceDefinition, StatModifiers, StatusCategory,
    StatusEffectDefinition, StatusScope, StepTarget, SummonConfig, SummonDefaults, Terrain,
    TickEffect, ZoneDefinition, ZoneEffectKind, ZoneEffectSpec, ZoneShape,
};
use serde::{Deserialize, Serialize};

use crate::catalog::CatalogError;

type SpecResult<T> = Result<T, CatalogError>;

// ============================================================================
// Status effects
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusFile {
    pub effects: Vec<StatusEffectSpec>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusEffectSpec {
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub category: String,
    #[serde(default = "default_stacking")]
    pub stacking: String,
    #[serde(default = "one")]
    pub max_stacks: u32,
    /// Turns; 0 lasts until removed.
    #[serde(default)]
    pub duration: u32,
    #[serde(default)]
    pub tick: Option<TickSpec>,
    #[serde(default)]
    pub cleansable: bool,
    #[serde(default)]
    pub dispellable: bool,
    #[serde(default)]
    pub modifiers: StatModifiers,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TickSpec {
    /// `damage` or `heal`.
    pub kind: String,
    pub dice: String,
    #[serde(default)]
    pub damage_type: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::EnumString)]
#[strum(ascii_case_insensitive)]
enum TickKind {
    Damage,
    Heal,
}

impl StatusEffectSpec {
    pub fn into_definition(self) -> SpecResult<StatusEffectDefinition> {
        let category = parse_field(&self.id, "category", &self.category)?;
        let stacking = parse_field(&self.id, "stacking rule", &self.stacking)?;
        let tick = self
            .tick
            .as_ref()
            .map(|tick| tick.to_effect(&self.id))
            .transpose()?;
        Ok(StatusEffectDefinition {
            name: name_or_id(self.name, &self.id),
            category,
            stacking,
            max_stacks: self.max_stacks,
            duration: (self.duration > 0).then_some(self.duration),
            tick,
            cleansable: self.cleansable,
            dispellable: self.dispellable,
            modifiers: self.modifiers,
            id: self.id,
        })
    }
}

impl TickSpec {
    fn to_effect(&self, owner: &str) -> SpecResult<TickEffect> {
        let dice = parse_dice(owner, &self.dice)?;
        Ok(match parse_field::<TickKind>(owner, "tick kind", &self.kind)? {
            TickKind::Damage => TickEffect::Damage {
                dice,
                damage_type: parse_or(owner, "damage type", &self.damage_type, DamageType::Physical)?,
            },
            TickKind::Heal => TickEffect::Heal { dice },
        })
    }
}

// ============================================================================
// Stances
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StanceFile {
    pub stances: Vec<StanceSpec>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StanceSpec {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub modifiers: StatModifiers,
    #[serde(default)]
    pub is_default: bool,
}

impl StanceSpec {
    pub fn into_definition(self) -> StanceDefinition {
        StanceDefinition {
            name: name_or_id(self.name, &self.id),
            id: self.id,
            modifiers: self.modifiers,
            is_default: self.is_default,
        }
    }
}

// ============================================================================
// Combos
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComboFile {
    pub combos: Vec<ComboSpec>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComboSpec {
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub window_turns: u32,
    pub steps: Vec<StepSpec>,
    #[serde(default)]
    pub bonuses: Vec<BonusSpec>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepSpec {
    pub ability: String,
    #[serde(default)]
    pub target: String,
}

/// One bonus; only the fields its effect kind uses need to be present.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BonusSpec {
    pub effect: String,
    pub target: String,
    pub dice: String,
    pub damage_type: String,
    pub percent: u32,
    pub status: String,
    pub ability: String,
    pub resource: String,
    pub amount: u32,
    pub radius: u32,
}

impl ComboSpec {
    pub fn into_definition(self) -> SpecResult<ComboDefinition> {
        let steps = self
            .steps
            .iter()
            .map(|step| {
                Ok(ComboStep {
                    ability_id: step.ability.clone(),
                    target: parse_or(&self.id, "step target", &step.target, StepTarget::Any)?,
                })
            })
            .collect::<SpecResult<Vec<_>>>()?;
        let bonuses = self
            .bonuses
            .iter()
            .map(|bonus| bonus.to_bonus(&self.id))
            .collect::<SpecResult<Vec<_>>>()?;
        Ok(ComboDefinition {
            name: name_or_id(self.name, &self.id),
            id: self.id,
            window_turns: self.window_turns,
            steps,
            bonuses,
        })
    }
}

impl BonusSpec {
    fn to_bonus(&self, owner: &str) -> SpecResult<ComboBonus> {
        let damage_type = || parse_or(owner, "damage type", &self.damage_type, DamageType::Physical);
        let effect = match parse_field::<BonusKind>(owner, "bonus effect", &self.effect)? {
            BonusKind::ExtraDamage => BonusEffect::ExtraDamage {
                dice: parse_dice(owner, &self.dice)?,
                damage_type: damage_type()?,
            },
            BonusKind::DamageMultiplier => BonusEffect::DamageMultiplier {
                percent: self.percent,
            },
            BonusKind::ApplyStatus => BonusEffect::ApplyStatus {
                effect_id: required(owner, "status", &self.status)?,
            },
            BonusKind::Heal => BonusEffect::Heal {
                dice: parse_dice(owner, &self.dice)?,
            },
            BonusKind::ResetCooldown => BonusEffect::ResetCooldown {
                ability_id: required(owner, "ability", &self.ability)?,
            },
            BonusKind::RefundResource => BonusEffect::RefundResource {
                resource: required(owner, "resource", &self.resource)?,
                amount: self.amount,
            },
            BonusKind::AreaEffect => BonusEffect::AreaEffect {
                dice: parse_dice(owner, &self.dice)?,
                damage_type: damage_type()?,
                radius: self.radius,
            },
        };
        Ok(ComboBonus {
            effect,
            target: parse_or(owner, "bonus target", &self.target, BonusTarget::LastTarget)?,
        })
    }
}

// ============================================================================
// Hazards
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HazardFile {
    pub hazards: Vec<HazardSpec>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DamageSpec {
    pub dice: String,
    #[serde(default)]
    pub damage_type: String,
}

impl DamageSpec {
    fn to_roll(&self, owner: &str, default_type: DamageType) -> SpecResult<DamageRoll> {
        Ok(DamageRoll::new(
            parse_dice(owner, &self.dice)?,
            parse_or(owner, "damage type", &self.damage_type, default_type)?,
        ))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HazardSpec {
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub kind: String,
    #[serde(default)]
    pub entry_damage: Option<DamageSpec>,
    #[serde(default)]
    pub turn_damage: Option<DamageSpec>,
    #[serde(default)]
    pub status_effect: Option<String>,
    #[serde(default)]
    pub requires_climb_out: bool,
    #[serde(default)]
    pub degrades_armor: bool,
    #[serde(default)]
    pub armor_degradation: u32,
    #[serde(default)]
    pub climb_dc: Option<i32>,
}

impl HazardSpec {
    pub fn into_definition(self) -> SpecResult<HazardDefinition> {
        let kind: HazardKind = parse_field(&self.id, "hazard kind", &self.kind)?;
        let roll = |spec: &Option<DamageSpec>| {
            spec.as_ref()
                .map(|spec| spec.to_roll(&self.id, DamageType::Physical))
                .transpose()
        };
        let entry_damage = roll(&self.entry_damage)?;
        let turn_damage = roll(&self.turn_damage)?;

        let mut flags = HazardFlags::empty();
        flags.set(HazardFlags::REQUIRES_CLIMB_OUT, self.requires_climb_out);
        flags.set(HazardFlags::DEGRADES_ARMOR, self.degrades_armor);

        Ok(HazardDefinition {
            name: name_or_id(self.name, &self.id),
            id: self.id,
            kind,
            entry_damage,
            turn_damage,
            status_effect: self.status_effect,
            flags,
            armor_degradation: self.armor_degradation,
            climb_dc: self.climb_dc,
        })
    }
}

// ============================================================================
// Zones
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ZoneFile {
    pub zones: Vec<ZoneSpec>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ZoneSpec {
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub shape: String,
    pub radius: u32,
    pub duration: u32,
    pub effect: String,
    #[serde(default)]
    pub damage: Option<DamageSpec>,
    #[serde(default)]
    pub heal: Option<String>,
    #[serde(default)]
    pub status_effect: Option<String>,
    #[serde(default)]
    pub status_scope: String,
    #[serde(default)]
    pub terrain_modifier: Option<String>,
    #[serde(default)]
    pub affects_friendly: bool,
    #[serde(default = "yes")]
    pub affects_enemy: bool,
}

impl ZoneSpec {
    pub fn into_definition(self) -> SpecResult<ZoneDefinition> {
        let shape: ZoneShape = parse_field(&self.id, "zone shape", &self.shape)?;
        let kind: ZoneEffectKind = parse_field(&self.id, "zone effect", &self.effect)?;
        let damage = self
            .damage
            .as_ref()
            .map(|spec| spec.to_roll(&self.id, DamageType::Magic))
            .transpose()?;
        let heal = self
            .heal
            .as_deref()
            .map(|dice| parse_dice(&self.id, dice))
            .transpose()?;
        let status_scope =
            parse_or(&self.id, "status scope", &self.status_scope, StatusScope::OnTick)?;
        let terrain_modifier = self
            .terrain_modifier
            .as_deref()
            .map(|terrain| parse_field::<Terrain>(&self.id, "terrain modifier", terrain))
            .transpose()?;

        Ok(ZoneDefinition {
            name: name_or_id(self.name, &self.id),
            id: self.id,
            shape,
            radius: self.radius,
            duration: self.duration,
            effect: ZoneEffectSpec {
                kind,
                damage,
                heal,
                status_effect: self.status_effect,
                status_scope,
                terrain_modifier,
            },
            affects_friendly: self.affects_friendly,
            affects_enemy: self.affects_enemy,
        })
    }
}

// ============================================================================
// Bosses
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BossFile {
    pub bosses: Vec<BossSpec>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BossSpec {
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub phases: Vec<PhaseSpec>,
    #[serde(default)]
    pub loot: Vec<LootSpec>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhaseSpec {
    pub number: u32,
    #[serde(default)]
    pub name: String,
    /// Health percentage at or below which the phase begins.
    pub threshold: u32,
    #[serde(default)]
    pub transition_text: Option<String>,
    #[serde(default)]
    pub abilities: Vec<String>,
    #[serde(default)]
    pub modifiers: StatModifiers,
    #[serde(default)]
    pub summon: Option<SummonSpec>,
    #[serde(default)]
    pub vulnerable_turns: Option<u32>,
}

/// Omitted fields take the configured summon defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummonSpec {
    pub monster_id: String,
    #[serde(default)]
    pub count: Option<u32>,
    #[serde(default)]
    pub interval_turns: Option<u32>,
    #[serde(default)]
    pub max_active: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LootSpec {
    pub item_id: String,
    #[serde(default = "one")]
    pub amount: u32,
    #[serde(default = "hundred")]
    pub chance: u32,
}

impl BossSpec {
    pub fn into_definition(self, defaults: &SummonDefaults) -> BossDefinition {
        let phases = self
            .phases
            .into_iter()
            .map(|phase| BossPhase {
                name: if phase.name.is_empty() {
                    format!("Phase {}", phase.number)
                } else {
                    phase.name
                },
                number: phase.number,
                health_threshold: phase.threshold,
                transition_text: phase.transition_text,
                ability_pool: phase.abilities,
                stat_modifiers: phase.modifiers,
                summon: phase.summon.map(|summon| SummonConfig {
                    monster_id: summon.monster_id,
                    count: summon.count.unwrap_or(defaults.count),
                    interval_turns: summon.interval_turns.unwrap_or(defaults.interval_turns),
                    max_active: summon.max_active.unwrap_or(defaults.max_active),
                }),
                vulnerable_turns: phase.vulnerable_turns,
            })
            .collect();
        let loot = self
            .loot
            .into_iter()
            .map(|entry| LootEntry {
                item_id: entry.item_id,
                amount: entry.amount,
                chance: entry.chance,
            })
            .collect();
        BossDefinition {
            name: name_or_id(self.name, &self.id),
            id: self.id,
            phases,
            loot,
        }
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn parse_field<T: FromStr>(id: &str, field: &'static str, value: &str) -> SpecResult<T> {
    value
        .trim()
        .parse()
        .map_err(|_| CatalogError::UnknownVariant {
            id: id.to_string(),
            field,
            value: value.to_string(),
        })
}

/// Like [`parse_field`], but an empty string selects `default`.
fn parse_or<T: FromStr>(id: &str, field: &'static str, value: &str, default: T) -> SpecResult<T> {
    if value.trim().is_empty() {
        return Ok(default);
    }
    parse_field(id, field, value)
}

fn parse_dice(id: &str, text: &str) -> SpecResult<DiceExpr> {
    text.parse().map_err(|source| CatalogError::InvalidDice {
        id: id.to_string(),
        source,
    })
}

fn required(id: &str, field: &'static str, value: &str) -> SpecResult<String> {
    if value.trim().is_empty() {
        return Err(CatalogError::MissingField {
            id: id.to_string(),
            field,
        });
    }
    Ok(value.to_string())
}

fn name_or_id(name: String, id: &str) -> String {
    if name.is_empty() { id.to_string() } else { name }
}

fn default_stacking() -> String {
    "refresh".to_string()
}

fn one() -> u32 {
    1
}

fn hundred() -> u32 {
    100
}

fn yes() -> bool {
    true
}
