//! Randomized checks of resolver invariants.

use std::collections::BTreeSet;

use proptest::prelude::*;
use proptest::sample::subsequence;

use super::damage::{self, DamageType};
use super::movement::{self, PushOutcome};
use super::{boss, combo, status};
use crate::event::BlockedBy;
use crate::state::{Attributes, CombatantId, Direction, Position, Terrain};
use crate::testing::{Harness, buff};

const LASTING_HARMFUL: [&str; 3] = ["burning", "poisoned", "slowed"];

proptest! {
    #[test]
    fn stacks_never_exceed_cap(applications in 1usize..12) {
        let mut h = Harness::new(3, 3);
        let id = h.spawn_hero(1, (0, 0), 50);
        let mut ctx = h.ctx();
        for _ in 0..applications {
            status::apply(&mut ctx, id, "burning", None).unwrap();
            let stacks = ctx.state.combatant(id).unwrap().status_effects.get("burning").unwrap().stacks;
            prop_assert!(stacks <= 3);
        }
        let stacks = h.combatant(id).status_effects.get("burning").unwrap().stacks;
        prop_assert_eq!(stacks, applications.min(3) as u32);
    }

    #[test]
    fn push_needs_a_strictly_higher_total(
        pusher_roll in 1u32..=20,
        target_roll in 1u32..=20,
        pusher_str in 6i32..=18,
        target_str in 6i32..=18,
    ) {
        let mut h = Harness::new(5, 5);
        let pusher = h.spawn(h.hero(1, (1, 2), 20).with_attributes(Attributes::new(pusher_str, 10)));
        let target = h.spawn(h.foe(2, (2, 2), 20).with_attributes(Attributes::new(target_str, 10)));
        h.roll([pusher_roll, target_roll]);

        let outcome = movement::push(&mut h.ctx(), pusher, target).unwrap();
        let wins = pusher_roll as i32 + Attributes::modifier(pusher_str)
            > target_roll as i32 + Attributes::modifier(target_str);
        let moved = h.combatant(target).position != Position::new(2, 2);
        prop_assert_eq!(moved, wins);
        prop_assert_eq!(matches!(outcome, PushOutcome::Pushed { .. }), wins);
        if pusher_roll == target_roll && pusher_str == target_str {
            prop_assert!(!moved);
        }
    }

    #[test]
    fn combo_window_counts_down_to_removal(ticks in 0u32..6) {
        let mut h = Harness::new(4, 4);
        let hero = h.spawn_hero(1, (0, 0), 30);
        let foe = h.spawn_foe(2, (1, 0), 30);
        let mut ctx = h.ctx();
        combo::on_ability_used(&mut ctx, hero, "fire-bolt", Some(foe)).unwrap();

        let mut last = 3;
        for _ in 0..ticks {
            combo::tick_windows(&mut ctx, hero).unwrap();
            match ctx.state.combatant(hero).unwrap().combos.get("elemental-burst") {
                Some(progress) => {
                    prop_assert!(progress.window_remaining > 0);
                    prop_assert_eq!(progress.window_remaining, last - 1);
                    last = progress.window_remaining;
                }
                None => {
                    prop_assert_eq!(last, 1);
                    break;
                }
            }
        }
    }

    #[test]
    fn knockback_stays_within_request(
        obstacles in proptest::collection::vec((0i32..7, 0i32..7, any::<bool>()), 0..12),
        start in (0i32..7, 0i32..7),
        direction in 0usize..8,
        cells in 0u32..8,
    ) {
        let mut h = Harness::new(7, 7);
        let target = h.spawn_foe(1, start, 20);
        let mut taken = BTreeSet::from([Position::from(start)]);
        for (idx, (x, y, wall)) in obstacles.into_iter().enumerate() {
            let position = Position::new(x, y);
            if !taken.insert(position) {
                continue;
            }
            if wall {
                h.state.grid.set_terrain(position, Terrain::Impassable).unwrap();
            } else {
                h.spawn_hero(100 + idx as u32, (x, y), 10);
            }
        }
        let before: Vec<(CombatantId, Position)> = h
            .state
            .grid
            .occupants()
            .filter(|(id, _)| *id != target)
            .collect();

        let direction = Direction::ALL[direction];
        let resolution = movement::knockback(&mut h.ctx(), None, target, direction, cells)
            .unwrap()
            .unwrap();

        prop_assert!(resolution.cells_moved <= cells);
        prop_assert_eq!(h.combatant(target).position, resolution.end_position);
        let after: Vec<(CombatantId, Position)> = h
            .state
            .grid
            .occupants()
            .filter(|(id, _)| *id != target)
            .collect();
        prop_assert_eq!(&after, &before);
        if let Some(BlockedBy::Occupant(blocker)) = resolution.blocked_by {
            prop_assert_eq!(
                h.state.grid.position_of(blocker),
                Some(resolution.end_position.step(direction))
            );
        }
    }

    #[test]
    fn boss_phase_never_decreases(ops in proptest::collection::vec((any::<bool>(), 1u32..40), 1..20)) {
        let mut h = Harness::new(6, 6);
        let lich = h.spawn_foe(9, (3, 3), 100);
        let mut ctx = h.ctx();
        boss::register_boss(&mut ctx, lich, "lich-king").unwrap();

        let mut last = 1;
        for (heal, amount) in ops {
            if !ctx.state.combatant(lich).unwrap().is_alive() {
                break;
            }
            if heal {
                damage::heal(&mut ctx, lich, amount).unwrap();
            } else {
                damage::deal_damage(&mut ctx, lich, amount, DamageType::Physical, None).unwrap();
            }
            let phase = ctx.state.boss(lich).unwrap().phase;
            prop_assert!(phase >= last);
            last = phase;
        }
    }

    #[test]
    fn dispel_restores_prior_effects(
        prior in subsequence(LASTING_HARMFUL.to_vec(), 0..=LASTING_HARMFUL.len()),
        buffs in 1usize..4,
    ) {
        let mut h = Harness::new(3, 3);
        let id = h.spawn_hero(1, (0, 0), 50);
        for idx in 0..buffs {
            h.catalog.add_status(buff(&format!("ward-{idx}")));
        }
        let mut ctx = h.ctx();
        for effect in &prior {
            status::apply(&mut ctx, id, effect, None).unwrap();
        }
        let mut before = ctx.state.combatant(id).unwrap().status_effects.ids();
        before.sort();

        for idx in 0..buffs {
            status::apply(&mut ctx, id, &format!("ward-{idx}"), None).unwrap();
        }
        let removed = status::dispel(&mut ctx, id, |_| true).unwrap();
        prop_assert_eq!(removed.len(), buffs);

        let mut after = h.combatant(id).status_effects.ids();
        after.sort();
        prop_assert_eq!(after, before);
    }
}
