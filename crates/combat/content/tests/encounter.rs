use combat_content::Catalog;
use combat_core::combat::movement::PushOutcome;
use combat_core::combat::stance::{StanceChangeOutcome, StanceRejection};
use combat_core::{
    Attributes, CombatEngine, CombatEvent, CombatGrid, CombatState, Combatant, CombatantId,
    DamageType, EventBus, Faction, Position, ScriptedDice,
};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn combatant(id: u32, name: &str, faction: Faction, at: (i32, i32), hp: u32) -> Combatant {
    Combatant::new(CombatantId(id), name, faction, hp, Position::from(at))
}

/// A full boss fight against the shipped Lich King definition:
/// 1. Stance change allowance
/// 2. Phase 2 with its vulnerability window
/// 3. Phase 3 and the summon cadence
/// 4. Summon death and boss defeat
#[test]
fn lich_king_encounter() {
    init_tracing();
    let catalog = Catalog::load_embedded().expect("embedded content should load");
    let mut state = CombatState::new(CombatGrid::new(8, 8));
    let mut dice = ScriptedDice::default();
    let mut events = EventBus::new();
    let mut engine = CombatEngine::new(&mut state, catalog.env(), &mut dice, &mut events);

    let knight = engine
        .add_combatant(
            combatant(1, "knight", Faction::Party, (1, 3), 40).with_attributes(Attributes::new(14, 12)),
        )
        .unwrap();
    let lich = engine
        .add_combatant(combatant(9, "lich", Faction::Hostile, (2, 3), 100))
        .unwrap();
    engine.register_boss(lich, "lich-king").unwrap();

    // ================================================================
    // Round 1: stances
    // ================================================================
    engine.start_round().unwrap();
    assert_eq!(
        engine.change_stance(knight, "aggressive").unwrap(),
        StanceChangeOutcome::Changed {
            old: "balanced".into(),
            new: "aggressive".into()
        }
    );
    assert_eq!(
        engine.change_stance(knight, "defensive").unwrap(),
        StanceChangeOutcome::Rejected(StanceRejection::AlreadyChanged)
    );

    // ================================================================
    // Phase 2: vulnerable for two boss turns
    // ================================================================
    engine.deal_damage(lich, 55, DamageType::Radiant, Some(knight)).unwrap();
    assert_eq!(engine.state().boss(lich).unwrap().phase, 2);
    let hit = engine.deal_damage(lich, 10, DamageType::Radiant, Some(knight)).unwrap();
    assert_eq!(hit.dealt, 15);

    // ================================================================
    // Phase 3: summons every second boss turn
    // ================================================================
    engine.deal_damage(lich, 4, DamageType::Radiant, Some(knight)).unwrap();
    assert_eq!(engine.state().boss(lich).unwrap().phase, 3);
    assert_eq!(engine.start_turn(lich).unwrap().summon, None);
    let request = engine.start_turn(lich).unwrap().summon.unwrap();
    assert_eq!(request.monster_id, "skeleton");
    assert_eq!(request.count, 2);
    assert!(!engine.state().boss(lich).unwrap().is_vulnerable());

    let skeletons: Vec<CombatantId> = (0..request.count)
        .map(|idx| {
            let summon = combatant(20 + idx, "skeleton", Faction::Hostile, (5 + idx as i32, 5), 8);
            engine.add_summon(lich, summon).unwrap()
        })
        .collect();
    assert_eq!(engine.state().boss(lich).unwrap().active_summons, 2);
    let killed = engine
        .deal_damage(skeletons[0], 10, DamageType::Physical, Some(knight))
        .unwrap();
    assert!(killed.killed);
    assert_eq!(engine.state().boss(lich).unwrap().active_summons, 1);

    // ================================================================
    // Defeat
    // ================================================================
    let finisher = engine.deal_damage(lich, 50, DamageType::Radiant, Some(knight)).unwrap();
    assert!(finisher.killed);
    engine.end_combat().unwrap();
    drop(engine);

    let records = events.take_events();
    assert!(
        records
            .iter()
            .enumerate()
            .all(|(idx, record)| record.sequence == idx as u64)
    );
    let phase_changes: Vec<(u32, u32)> = records
        .iter()
        .filter_map(|record| match &record.event {
            CombatEvent::BossPhaseChanged {
                old_phase,
                new_phase,
                ..
            } => Some((*old_phase, *new_phase)),
            _ => None,
        })
        .collect();
    assert_eq!(phase_changes, vec![(1, 2), (2, 3)]);
    assert!(records.iter().any(|record| matches!(
        &record.event,
        CombatEvent::BossDefeated { loot, .. } if loot.iter().any(|entry| entry.item_id == "phylactery-shard")
    )));
    assert!(matches!(
        records.last().map(|record| &record.event),
        Some(CombatEvent::CombatEnded { round: 1 })
    ));
    assert!(!state.combatant(lich).unwrap().is_alive());
}

/// Shoving a goblin into shipped lava: entry damage on the push, the kill on
/// the next round's hazard tick.
#[test]
fn pushed_into_lava() {
    init_tracing();
    let catalog = Catalog::load_embedded().expect("embedded content should load");
    let mut state = CombatState::new(CombatGrid::new(6, 3));
    // push contest 15 vs 3, lava entry 3d6 = 18, lava turn damage 1d6 = 5
    let mut dice = ScriptedDice::new([15, 3, 6, 6, 6, 5]);
    let mut events = EventBus::new();
    let mut engine = CombatEngine::new(&mut state, catalog.env(), &mut dice, &mut events);

    let knight = engine
        .add_combatant(
            combatant(1, "knight", Faction::Party, (1, 1), 40).with_attributes(Attributes::new(16, 10)),
        )
        .unwrap();
    let goblin = engine
        .add_combatant(combatant(2, "goblin", Faction::Hostile, (2, 1), 20))
        .unwrap();
    engine.place_hazard("lava", Position::new(3, 1)).unwrap();

    let outcome = engine.push(knight, goblin).unwrap();
    assert!(matches!(outcome, PushOutcome::Pushed { .. }));
    assert_eq!(engine.state().combatant(goblin).unwrap().health.current(), 2);

    let round = engine.start_round().unwrap();
    assert_eq!(round.hazards.combatants_affected, 1);
    assert_eq!(round.hazards.total_damage, 2);
    drop(engine);

    assert!(!state.combatant(goblin).unwrap().is_alive());
    assert_eq!(state.grid.position_of(goblin), None);
    assert!(events.events().iter().any(|record| matches!(
        record.event,
        CombatEvent::CombatantKilledByHazard { .. }
    )));
}
