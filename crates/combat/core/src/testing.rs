//! Shared fixtures for unit tests: a small in-memory catalog and a harness
//! that owns state, dice, and the event bus.

use std::collections::BTreeMap;

use crate::combat::{CombatContext, DamageRoll, DamageType};
use crate::config::CombatConfig;
use crate::env::{
    BonusEffect, BonusTarget, BossDefinition, BossOracle, BossPhase, CombatEnv, ComboBonus,
    ComboDefinition, ComboOracle, ComboStep, DiceExpr, HazardDefinition, HazardFlags, HazardKind,
    HazardOracle, LootEntry, ScriptedDice, StackingRule, StanceDefinition, StanceOracle,
    StatusCategory, StatusEffectDefinition, StatusEffectOracle, StatusScope, StepTarget,
    SummonConfig, TickEffect, ZoneDefinition, ZoneEffectKind, ZoneEffectSpec, ZoneOracle,
    ZoneShape,
};
use crate::event::{CombatEvent, EventBus};
use crate::state::{
    CombatGrid, CombatState, Combatant, CombatantId, Faction, Position, StatModifiers, Terrain,
};

#[derive(Debug, Default)]
pub(crate) struct TestCatalog {
    statuses: BTreeMap<String, StatusEffectDefinition>,
    stances: BTreeMap<String, StanceDefinition>,
    combos: BTreeMap<String, ComboDefinition>,
    combos_by_start: BTreeMap<String, Vec<String>>,
    hazards: BTreeMap<String, HazardDefinition>,
    zones: BTreeMap<String, ZoneDefinition>,
    bosses: BTreeMap<String, BossDefinition>,
}

impl TestCatalog {
    pub(crate) fn standard() -> Self {
        let mut catalog = Self::default();
        for def in [
            status(
                "burning",
                StatusCategory::DamageOverTime,
                StackingRule::Stack,
                3,
                Some(3),
            )
            .with_tick(TickEffect::Damage {
                dice: DiceExpr::new(1, 4, 0),
                damage_type: DamageType::Fire,
            })
            .cleansable(),
            status(
                "poisoned",
                StatusCategory::DamageOverTime,
                StackingRule::Refresh,
                1,
                Some(2),
            )
            .with_tick(TickEffect::Damage {
                dice: DiceExpr::flat(2),
                damage_type: DamageType::Poison,
            })
            .cleansable(),
            status(
                "regeneration",
                StatusCategory::HealOverTime,
                StackingRule::Refresh,
                1,
                Some(3),
            )
            .with_tick(TickEffect::Heal {
                dice: DiceExpr::flat(3),
            }),
            status("stunned", StatusCategory::Control, StackingRule::Replace, 1, Some(1))
                .cleansable(),
            status("slowed", StatusCategory::Debuff, StackingRule::Refresh, 1, None).cleansable(),
            StatusEffectDefinition {
                duration: Some(3),
                ..buff("blessed")
            },
        ] {
            catalog.add_status(def);
        }

        for (id, modifiers, is_default) in [
            ("balanced", StatModifiers::NONE, true),
            ("aggressive", mods(2, -2), false),
            ("defensive", mods(-1, 2), false),
        ] {
            catalog.stances.insert(
                id.to_string(),
                StanceDefinition {
                    id: id.to_string(),
                    name: id.to_string(),
                    modifiers,
                    is_default,
                },
            );
        }

        catalog.add_combo(ComboDefinition {
            id: "elemental-burst".into(),
            name: "Elemental Burst".into(),
            window_turns: 3,
            steps: vec![
                step("fire-bolt", StepTarget::Any),
                step("frost-bolt", StepTarget::SameTarget),
                step("lightning-bolt", StepTarget::SameTarget),
            ],
            bonuses: vec![
                ComboBonus {
                    effect: BonusEffect::ExtraDamage {
                        dice: DiceExpr::new(2, 6, 0),
                        damage_type: DamageType::Lightning,
                    },
                    target: BonusTarget::LastTarget,
                },
                ComboBonus {
                    effect: BonusEffect::ApplyStatus {
                        effect_id: "burning".into(),
                    },
                    target: BonusTarget::LastTarget,
                },
            ],
        });
        catalog.add_combo(ComboDefinition {
            id: "twin-strike".into(),
            name: "Twin Strike".into(),
            window_turns: 2,
            steps: vec![
                step("slash", StepTarget::Any),
                step("thrust", StepTarget::SameTarget),
            ],
            bonuses: vec![ComboBonus {
                effect: BonusEffect::AreaEffect {
                    dice: DiceExpr::new(1, 6, 0),
                    damage_type: DamageType::Physical,
                    radius: 1,
                },
                target: BonusTarget::LastTarget,
            }],
        });

        catalog.add_hazard(hazard("lava", HazardKind::Lava, HazardFlags::empty()).with_damage(
            Some(DamageRoll::new(DiceExpr::new(3, 6, 0), DamageType::Fire)),
            Some(DamageRoll::new(DiceExpr::new(1, 6, 0), DamageType::Fire)),
        ));
        catalog.add_hazard(HazardDefinition {
            climb_dc: Some(15),
            ..hazard("pit", HazardKind::Pit, HazardFlags::REQUIRES_CLIMB_OUT).with_damage(
                Some(DamageRoll::new(DiceExpr::new(2, 6, 0), DamageType::Physical)),
                None,
            )
        });
        catalog.add_hazard(HazardDefinition {
            armor_degradation: 2,
            ..hazard("acid-pool", HazardKind::Acid, HazardFlags::DEGRADES_ARMOR).with_damage(
                None,
                Some(DamageRoll::new(DiceExpr::new(1, 4, 0), DamageType::Acid)),
            )
        });
        catalog.add_hazard(HazardDefinition {
            status_effect: Some("burning".into()),
            ..hazard("burning-ground", HazardKind::Fire, HazardFlags::empty()).with_damage(
                Some(DamageRoll::new(DiceExpr::new(1, 4, 0), DamageType::Fire)),
                None,
            )
        });

        catalog.add_zone(ZoneDefinition {
            effect: ZoneEffectSpec {
                damage: Some(DamageRoll::new(DiceExpr::new(1, 6, 0), DamageType::Fire)),
                ..zone_effect(ZoneEffectKind::Damage)
            },
            ..zone("fire-field", ZoneShape::Circle, 1, 2, false, true)
        });
        catalog.add_zone(ZoneDefinition {
            effect: ZoneEffectSpec {
                heal: Some(DiceExpr::new(1, 6, 0)),
                ..zone_effect(ZoneEffectKind::Heal)
            },
            ..zone("healing-circle", ZoneShape::Circle, 1, 2, true, false)
        });
        catalog.add_zone(ZoneDefinition {
            effect: ZoneEffectSpec {
                status_effect: Some("slowed".into()),
                status_scope: StatusScope::WhileInside,
                ..zone_effect(ZoneEffectKind::Debuff)
            },
            ..zone("slowing-mire", ZoneShape::Square, 1, 3, false, true)
        });
        catalog.add_zone(ZoneDefinition {
            effect: ZoneEffectSpec {
                terrain_modifier: Some(Terrain::Difficult),
                ..zone_effect(ZoneEffectKind::Terrain)
            },
            ..zone("tangle-thicket", ZoneShape::Square, 1, 3, true, true)
        });

        catalog.add_boss(BossDefinition {
            id: "lich-king".into(),
            name: "The Lich King".into(),
            phases: vec![
                phase(1, "Mortal", 100),
                BossPhase {
                    transition_text: Some("The phylactery cracks!".into()),
                    ability_pool: vec!["soul-drain".into()],
                    vulnerable_turns: Some(2),
                    ..phase(2, "Unbound", 50)
                },
                BossPhase {
                    stat_modifiers: mods(3, 0),
                    summon: Some(SummonConfig {
                        monster_id: "skeleton".into(),
                        count: 2,
                        interval_turns: 2,
                        max_active: 3,
                    }),
                    ..phase(3, "Undying", 25)
                },
            ],
            loot: vec![LootEntry {
                item_id: "phylactery-shard".into(),
                amount: 1,
                chance: 100,
            }],
        });
        catalog
    }

    pub(crate) fn add_status(&mut self, def: StatusEffectDefinition) {
        self.statuses.insert(def.id.clone(), def);
    }

    fn add_combo(&mut self, def: ComboDefinition) {
        if let Some(first) = def.starting_ability() {
            self.combos_by_start
                .entry(first.to_string())
                .or_default()
                .push(def.id.clone());
        }
        self.combos.insert(def.id.clone(), def);
    }

    fn add_hazard(&mut self, def: HazardDefinition) {
        self.hazards.insert(def.id.clone(), def);
    }

    fn add_zone(&mut self, def: ZoneDefinition) {
        self.zones.insert(def.id.clone(), def);
    }

    fn add_boss(&mut self, def: BossDefinition) {
        self.bosses.insert(def.id.clone(), def);
    }
}

impl StatusEffectOracle for TestCatalog {
    fn status_effect(&self, id: &str) -> Option<&StatusEffectDefinition> {
        self.statuses.get(id)
    }
}

impl StanceOracle for TestCatalog {
    fn stance(&self, id: &str) -> Option<&StanceDefinition> {
        self.stances.get(id)
    }

    fn default_stance(&self) -> Option<&StanceDefinition> {
        self.stances.values().find(|stance| stance.is_default)
    }
}

impl ComboOracle for TestCatalog {
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

impl HazardOracle for TestCatalog {
    fn hazard(&self, id: &str) -> Option<&HazardDefinition> {
        self.hazards.get(id)
    }
}

impl ZoneOracle for TestCatalog {
    fn zone(&self, id: &str) -> Option<&ZoneDefinition> {
        self.zones.get(id)
    }
}

impl BossOracle for TestCatalog {
    fn boss(&self, id: &str) -> Option<&BossDefinition> {
        self.bosses.get(id)
    }
}

/// A permanent, dispellable buff granting +1 attack.
pub(crate) fn buff(id: &str) -> StatusEffectDefinition {
    StatusEffectDefinition {
        dispellable: true,
        modifiers: mods(1, 0),
        ..status(id, StatusCategory::Buff, StackingRule::Refresh, 1, None)
    }
}

fn status(
    id: &str,
    category: StatusCategory,
    stacking: StackingRule,
    max_stacks: u32,
    duration: Option<u32>,
) -> StatusEffectDefinition {
    StatusEffectDefinition {
        id: id.to_string(),
        name: id.to_string(),
        category,
        stacking,
        max_stacks,
        duration,
        tick: None,
        cleansable: false,
        dispellable: false,
        modifiers: StatModifiers::NONE,
    }
}

trait StatusBuilder {
    fn with_tick(self, tick: TickEffect) -> Self;
    fn cleansable(self) -> Self;
}

impl StatusBuilder for StatusEffectDefinition {
    fn with_tick(mut self, tick: TickEffect) -> Self {
        self.tick = Some(tick);
        self
    }

    fn cleansable(mut self) -> Self {
        self.cleansable = true;
        self
    }
}

fn mods(attack: i32, defense: i32) -> StatModifiers {
    StatModifiers {
        attack,
        defense,
        save: 0,
    }
}

fn step(ability_id: &str, target: StepTarget) -> ComboStep {
    ComboStep {
        ability_id: ability_id.to_string(),
        target,
    }
}

fn hazard(id: &str, kind: HazardKind, flags: HazardFlags) -> HazardDefinition {
    HazardDefinition {
        id: id.to_string(),
        name: id.to_string(),
        kind,
        entry_damage: None,
        turn_damage: None,
        status_effect: None,
        flags,
        armor_degradation: 0,
        climb_dc: None,
    }
}

trait HazardBuilder {
    fn with_damage(self, entry: Option<DamageRoll>, turn: Option<DamageRoll>) -> Self;
}

impl HazardBuilder for HazardDefinition {
    fn with_damage(mut self, entry: Option<DamageRoll>, turn: Option<DamageRoll>) -> Self {
        self.entry_damage = entry;
        self.turn_damage = turn;
        self
    }
}

fn zone_effect(kind: ZoneEffectKind) -> ZoneEffectSpec {
    ZoneEffectSpec {
        kind,
        damage: None,
        heal: None,
        status_effect: None,
        status_scope: StatusScope::OnTick,
        terrain_modifier: None,
    }
}

fn zone(
    id: &str,
    shape: ZoneShape,
    radius: u32,
    duration: u32,
    affects_friendly: bool,
    affects_enemy: bool,
) -> ZoneDefinition {
    ZoneDefinition {
        id: id.to_string(),
        name: id.to_string(),
        shape,
        radius,
        duration,
        effect: zone_effect(ZoneEffectKind::Damage),
        affects_friendly,
        affects_enemy,
    }
}

fn phase(number: u32, name: &str, health_threshold: u32) -> BossPhase {
    BossPhase {
        number,
        name: name.to_string(),
        health_threshold,
        transition_text: None,
        ability_pool: Vec::new(),
        stat_modifiers: StatModifiers::NONE,
        summon: None,
        vulnerable_turns: None,
    }
}

/// Owns everything a [`CombatContext`] borrows.
pub(crate) struct Harness {
    pub(crate) state: CombatState,
    pub(crate) catalog: TestCatalog,
    pub(crate) config: CombatConfig,
    pub(crate) dice: ScriptedDice,
    pub(crate) events: EventBus,
}

impl Harness {
    pub(crate) fn new(width: u32, height: u32) -> Self {
        Self {
            state: CombatState::new(CombatGrid::new(width, height)),
            catalog: TestCatalog::standard(),
            config: CombatConfig::default(),
            dice: ScriptedDice::default(),
            events: EventBus::new(),
        }
    }

    pub(crate) fn ctx(&mut self) -> CombatContext<'_> {
        CombatContext::new(
            &mut self.state,
            CombatEnv::with_all(&self.config, &self.catalog),
            &mut self.dice,
            &mut self.events,
        )
    }

    pub(crate) fn hero(&self, id: u32, at: (i32, i32), max_health: u32) -> Combatant {
        Combatant::new(
            CombatantId(id),
            format!("hero-{id}"),
            Faction::Party,
            max_health,
            Position::from(at),
        )
    }

    pub(crate) fn foe(&self, id: u32, at: (i32, i32), max_health: u32) -> Combatant {
        Combatant::new(
            CombatantId(id),
            format!("foe-{id}"),
            Faction::Hostile,
            max_health,
            Position::from(at),
        )
    }

    pub(crate) fn spawn(&mut self, combatant: Combatant) -> CombatantId {
        let id = combatant.id;
        self.state.add_combatant(combatant).unwrap();
        id
    }

    pub(crate) fn spawn_hero(&mut self, id: u32, at: (i32, i32), max_health: u32) -> CombatantId {
        self.spawn(self.hero(id, at, max_health))
    }

    pub(crate) fn spawn_foe(&mut self, id: u32, at: (i32, i32), max_health: u32) -> CombatantId {
        self.spawn(self.foe(id, at, max_health))
    }

    /// Queues exact die results, consumed in order.
    pub(crate) fn roll(&mut self, rolls: impl IntoIterator<Item = u32>) {
        for roll in rolls {
            self.dice.push(roll);
        }
    }

    pub(crate) fn events(&self) -> Vec<CombatEvent> {
        self.events
            .events()
            .iter()
            .map(|record| record.event.clone())
            .collect()
    }

    pub(crate) fn kinds(&self) -> Vec<&'static str> {
        self.events
            .events()
            .iter()
            .map(|record| record.event.kind())
            .collect()
    }

    pub(crate) fn combatant(&self, id: CombatantId) -> &Combatant {
        self.state.combatant(id).unwrap()
    }
}
