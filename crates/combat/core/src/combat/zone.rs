//! Area effects bound to a fixed set of grid cells.

use std::collections::BTreeSet;

use crate::env::{StatusScope, ZoneShape};
use crate::error::CombatResult;
use crate::event::{CombatEvent, EffectRemovalReason};
use crate::state::{
    CombatGrid, CombatantId, Direction, Position, Terrain, ZoneInstance, ZoneInstanceId,
};

use super::{CombatContext, damage, status};

pub const REASON_DURATION: &str = "Duration";
pub const REASON_REMOVED: &str = "Removed";
pub const REASON_COMBAT_ENDED: &str = "Combat Ended";

/// Cells covered by a shape, clipped to the grid.
///
/// `direction` orients lines and cones; other shapes ignore it.
pub fn zone_cells(
    grid: &CombatGrid,
    shape: ZoneShape,
    center: Position,
    radius: u32,
    direction: Direction,
) -> BTreeSet<Position> {
    let r = radius as i32;
    let mut cells = BTreeSet::new();
    match shape {
        ZoneShape::Circle | ZoneShape::Square | ZoneShape::Ring => {
            for dy in -r..=r {
                for dx in -r..=r {
                    let d2 = dx * dx + dy * dy;
                    let inside = match shape {
                        ZoneShape::Circle => d2 <= r * r,
                        ZoneShape::Ring => (r - 1) * (r - 1) < d2 && d2 <= r * r,
                        _ => true,
                    };
                    if inside {
                        cells.insert(center.offset(dx, dy));
                    }
                }
            }
        }
        ZoneShape::Line => {
            let (dx, dy) = direction.delta();
            for i in 0..=r {
                cells.insert(center.offset(dx * i, dy * i));
            }
        }
        ZoneShape::Cone => {
            let (dx, dy) = direction.delta();
            let (px, py) = direction.perpendicular();
            for i in 0..=r {
                for w in -i..=i {
                    cells.insert(center.offset(dx * i + px * w, dy * i + py * w));
                }
            }
        }
    }
    cells.retain(|cell| grid.contains(*cell));
    cells
}

/// Creates a zone from the catalog centered on `center`.
///
/// Lines and cones face `direction`, or away from the caster when omitted.
/// A caster at its zone cap loses its oldest zone first.
pub fn create_zone(
    ctx: &mut CombatContext<'_>,
    caster: CombatantId,
    zone_id: &str,
    center: Position,
    direction: Option<Direction>,
) -> CombatResult<ZoneInstanceId> {
    let config = ctx.config()?;
    let def = ctx.env.zone(zone_id)?;
    let origin = ctx.state.combatant(caster)?.position;
    let direction = direction
        .or_else(|| Direction::away_from(origin, center))
        .unwrap_or(Direction::North);

    let owned: Vec<ZoneInstanceId> = ctx
        .state
        .zones
        .iter()
        .filter(|zone| zone.caster == caster)
        .map(|zone| zone.id)
        .collect();
    if owned.len() >= config.max_zones_per_caster {
        if let Some(&oldest) = owned.first() {
            tracing::warn!(
                "{} is at the zone cap of {}, removing {}",
                caster,
                config.max_zones_per_caster,
                oldest
            );
            remove_zone(ctx, oldest, REASON_REMOVED)?;
        }
    }

    let cells = zone_cells(&ctx.state.grid, def.shape, center, def.radius, direction);
    let id = ctx.state.allocate_zone_id();
    let mut reshaped = BTreeSet::new();
    for cell in &cells {
        if let Some(grid_cell) = ctx.state.grid.cell_mut(*cell) {
            grid_cell.zones.insert(id);
            // Only plain ground is reshaped, and only by one zone at a time.
            if let Some(terrain) = def.effect.terrain_modifier {
                if grid_cell.terrain == Terrain::Normal && terrain != Terrain::Normal {
                    grid_cell.terrain = terrain;
                    reshaped.insert(*cell);
                }
            }
        }
    }
    let cell_count = cells.len() as u32;
    let zone = ZoneInstance {
        id,
        zone_id: def.id.clone(),
        name: def.name.clone(),
        caster,
        center,
        cells,
        reshaped,
        remaining_turns: def.duration,
        effect: def.effect.clone(),
        affects_friendly: def.affects_friendly,
        affects_enemy: def.affects_enemy,
    };
    let occupants = occupants_of(ctx, &zone);
    ctx.state.zones.push(zone.clone());
    tracing::info!("{} created {} ({}) at {}", caster, def.name, id, center);

    ctx.emit(CombatEvent::ZoneCreated {
        zone: id,
        zone_id: def.id.clone(),
        caster,
        center,
        cell_count,
        duration: def.duration,
    });
    if zone.effect.status_scope == StatusScope::WhileInside {
        for target in occupants {
            apply_status(ctx, &zone, target)?;
        }
    }
    Ok(id)
}

/// Applies every zone's effect to the combatants inside it, then counts
/// durations down. Returns the zones that expired.
pub fn tick_zones(ctx: &mut CombatContext<'_>) -> CombatResult<Vec<ZoneInstanceId>> {
    let snapshot = ctx.state.zones.clone();
    let mut expired = Vec::new();

    for zone in &snapshot {
        for target in occupants_of(ctx, zone) {
            if !ctx.state.combatant(target)?.is_alive() {
                continue;
            }
            apply_tick(ctx, zone, target)?;
        }
        let ended = ctx
            .state
            .zones
            .iter_mut()
            .find(|live| live.id == zone.id)
            .is_some_and(ZoneInstance::tick_down);
        if ended {
            remove_zone(ctx, zone.id, REASON_DURATION)?;
            expired.push(zone.id);
        }
    }
    Ok(expired)
}

fn apply_tick(ctx: &mut CombatContext<'_>, zone: &ZoneInstance, target: CombatantId) -> CombatResult<()> {
    let source = ctx.state.contains(zone.caster).then_some(zone.caster);

    if let Some(roll) = zone.effect.damage {
        let amount = roll.dice.roll(&mut *ctx.dice);
        let outcome = damage::apply_damage(ctx, target, amount)?;
        ctx.emit(CombatEvent::ZoneDamage {
            zone: zone.id,
            zone_id: zone.zone_id.clone(),
            target,
            damage: outcome.dealt,
            damage_type: roll.damage_type,
            remaining_health: outcome.remaining_health,
        });
        damage::settle(ctx, &outcome, source)?;
        if outcome.killed {
            return Ok(());
        }
    }
    if let Some(dice) = zone.effect.heal {
        let amount = dice.roll(&mut *ctx.dice);
        let healed = damage::heal(ctx, target, amount)?;
        let current_health = ctx.state.combatant(target)?.health.current();
        ctx.emit(CombatEvent::ZoneHeal {
            zone: zone.id,
            zone_id: zone.zone_id.clone(),
            target,
            amount: healed,
            current_health,
        });
    }
    if zone.effect.status_scope == StatusScope::OnTick {
        apply_status(ctx, zone, target)?;
    }
    Ok(())
}

fn apply_status(ctx: &mut CombatContext<'_>, zone: &ZoneInstance, target: CombatantId) -> CombatResult<()> {
    let Some(effect_id) = &zone.effect.status_effect else {
        return Ok(());
    };
    let source = ctx.state.contains(zone.caster).then_some(zone.caster);
    if status::apply(ctx, target, effect_id, source)? != status::ApplyOutcome::TargetDefeated {
        ctx.emit(CombatEvent::ZoneStatusApplied {
            zone: zone.id,
            zone_id: zone.zone_id.clone(),
            target,
            effect_id: effect_id.clone(),
        });
    }
    Ok(())
}

/// Publishes zone enter/exit for a combatant that moved from `from` to `to`,
/// applying or stripping while-inside status effects.
pub fn on_moved(
    ctx: &mut CombatContext<'_>,
    combatant: CombatantId,
    from: Position,
    to: Position,
) -> CombatResult<()> {
    let zones: Vec<ZoneInstance> = ctx
        .state
        .zones
        .iter()
        .filter(|zone| zone.contains(from) != zone.contains(to))
        .cloned()
        .collect();

    for zone in zones {
        let while_inside = zone.effect.status_scope == StatusScope::WhileInside
            && affects(ctx, &zone, combatant);
        if zone.contains(to) {
            ctx.emit(CombatEvent::ZoneEntered {
                zone: zone.id,
                zone_id: zone.zone_id.clone(),
                combatant,
                position: to,
            });
            if while_inside && ctx.state.combatant(combatant)?.is_alive() {
                apply_status(ctx, &zone, combatant)?;
            }
        } else {
            ctx.emit(CombatEvent::ZoneExited {
                zone: zone.id,
                zone_id: zone.zone_id.clone(),
                combatant,
                position: from,
            });
            if let (true, Some(effect_id)) = (while_inside, &zone.effect.status_effect) {
                if !held_elsewhere(ctx, &zone, combatant, to) {
                    status::remove(ctx, combatant, effect_id, EffectRemovalReason::LeftZone)?;
                }
            }
        }
    }
    Ok(())
}

/// Removes one zone, publishing `ZoneExpired` with `reason`.
pub fn remove_zone(
    ctx: &mut CombatContext<'_>,
    zone: ZoneInstanceId,
    reason: &str,
) -> CombatResult<bool> {
    let Some(index) = ctx.state.zones.iter().position(|z| z.id == zone) else {
        return Ok(false);
    };
    let removed = ctx.state.zones.remove(index);
    for cell in &removed.cells {
        if let Some(grid_cell) = ctx.state.grid.cell_mut(*cell) {
            grid_cell.zones.remove(&removed.id);
        }
    }
    for cell in &removed.reshaped {
        if let Some(grid_cell) = ctx.state.grid.cell_mut(*cell) {
            if Some(grid_cell.terrain) == removed.effect.terrain_modifier {
                grid_cell.terrain = Terrain::Normal;
            }
        }
    }
    if let (StatusScope::WhileInside, Some(effect_id)) =
        (removed.effect.status_scope, &removed.effect.status_effect)
    {
        for target in occupants_of(ctx, &removed) {
            let Ok(position) = ctx.state.combatant(target).map(|c| c.position) else {
                continue;
            };
            if !held_elsewhere(ctx, &removed, target, position) {
                status::remove(ctx, target, effect_id, EffectRemovalReason::LeftZone)?;
            }
        }
    }
    tracing::debug!("{} ({}) ended: {}", removed.name, removed.id, reason);
    ctx.emit(CombatEvent::ZoneExpired {
        zone: removed.id,
        zone_id: removed.zone_id,
        reason: reason.to_string(),
    });
    Ok(true)
}

/// Removes every zone cast by `caster`.
pub fn remove_zones_by_caster(ctx: &mut CombatContext<'_>, caster: CombatantId) -> CombatResult<u32> {
    let ids: Vec<ZoneInstanceId> = ctx
        .state
        .zones
        .iter()
        .filter(|zone| zone.caster == caster)
        .map(|zone| zone.id)
        .collect();
    for id in &ids {
        remove_zone(ctx, *id, REASON_REMOVED)?;
    }
    Ok(ids.len() as u32)
}

/// Removes every zone at the end of combat.
pub fn clear_zones(ctx: &mut CombatContext<'_>) -> CombatResult<u32> {
    let ids: Vec<ZoneInstanceId> = ctx.state.zones.iter().map(|zone| zone.id).collect();
    for id in &ids {
        remove_zone(ctx, *id, REASON_COMBAT_ENDED)?;
    }
    Ok(ids.len() as u32)
}

/// Friend/foe filter relative to the caster. The caster counts as friendly
/// to itself; without a known caster everyone counts as an enemy.
fn affects(ctx: &CombatContext<'_>, zone: &ZoneInstance, target: CombatantId) -> bool {
    if target == zone.caster {
        return zone.affects_friendly;
    }
    let friendly = match (ctx.state.combatant(zone.caster), ctx.state.combatant(target)) {
        (Ok(caster), Ok(target)) => caster.is_friendly_to(target),
        _ => false,
    };
    if friendly {
        zone.affects_friendly
    } else {
        zone.affects_enemy
    }
}

/// True when another live zone at `position` keeps the same while-inside
/// status on `combatant`.
fn held_elsewhere(
    ctx: &CombatContext<'_>,
    zone: &ZoneInstance,
    combatant: CombatantId,
    position: Position,
) -> bool {
    ctx.state.zones.iter().any(|other| {
        other.id != zone.id
            && other.contains(position)
            && other.effect.status_scope == StatusScope::WhileInside
            && other.effect.status_effect == zone.effect.status_effect
            && affects(ctx, other, combatant)
    })
}

/// Affected combatants standing in the zone, in cell order.
fn occupants_of(ctx: &CombatContext<'_>, zone: &ZoneInstance) -> Vec<CombatantId> {
    zone.cells
        .iter()
        .filter_map(|cell| ctx.state.grid.occupant_at(*cell))
        .filter(|id| affects(ctx, zone, *id))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat::movement;
    use crate::testing::Harness;

    #[test]
    fn shapes_cover_expected_cells() {
        let grid = CombatGrid::new(9, 9);
        let c = Position::new(4, 4);
        assert_eq!(zone_cells(&grid, ZoneShape::Circle, c, 1, Direction::North).len(), 5);
        assert_eq!(zone_cells(&grid, ZoneShape::Square, c, 1, Direction::North).len(), 9);
        assert_eq!(zone_cells(&grid, ZoneShape::Ring, c, 1, Direction::North).len(), 4);
        assert!(!zone_cells(&grid, ZoneShape::Ring, c, 2, Direction::North).contains(&c));
        let line = zone_cells(&grid, ZoneShape::Line, c, 3, Direction::East);
        assert_eq!(line.len(), 4);
        assert!(line.contains(&Position::new(7, 4)));
        let cone = zone_cells(&grid, ZoneShape::Cone, c, 2, Direction::South);
        assert_eq!(cone.len(), 9);
        assert!(cone.contains(&Position::new(2, 6)));
    }

    #[test]
    fn shapes_are_clipped_to_grid() {
        let grid = CombatGrid::new(3, 3);
        let cells = zone_cells(&grid, ZoneShape::Square, Position::new(0, 0), 1, Direction::North);
        assert_eq!(cells.len(), 4);
    }

    #[test]
    fn damage_zone_skips_friendlies_and_expires() {
        let mut h = Harness::new(7, 7);
        let caster = h.spawn_hero(1, (0, 0), 30);
        let ally = h.spawn_hero(2, (3, 2), 30);
        let foe = h.spawn_foe(3, (3, 3), 30);
        h.roll([4, 5]);
        let mut ctx = h.ctx();
        let zone = create_zone(&mut ctx, caster, "fire-field", (3, 3).into(), None).unwrap();
        tick_zones(&mut ctx).unwrap();
        let expired = tick_zones(&mut ctx).unwrap();
        assert_eq!(expired, vec![zone]);
        assert_eq!(h.combatant(ally).health.current(), 30);
        assert_eq!(h.combatant(foe).health.current(), 21);
        assert!(h.state.zones.is_empty());
        assert!(h.state.grid.cell((3, 3).into()).unwrap().zones.is_empty());
        assert!(matches!(
            h.events().last(),
            Some(CombatEvent::ZoneExpired { reason, .. }) if reason == REASON_DURATION
        ));
    }

    #[test]
    fn heal_zone_reports_current_health() {
        let mut h = Harness::new(5, 5);
        let caster = h.spawn(h.hero(1, (2, 2), 30).with_health(20));
        h.roll([6]);
        let mut ctx = h.ctx();
        create_zone(&mut ctx, caster, "healing-circle", (2, 2).into(), None).unwrap();
        tick_zones(&mut ctx).unwrap();
        assert!(matches!(
            h.events().last(),
            Some(CombatEvent::ZoneHeal { amount: 6, current_health: 26, .. })
        ));
    }

    #[test]
    fn cap_evicts_oldest_zone() {
        let mut h = Harness::new(9, 9);
        h.config.max_zones_per_caster = 2;
        let caster = h.spawn_hero(1, (0, 0), 30);
        let mut ctx = h.ctx();
        let first = create_zone(&mut ctx, caster, "fire-field", (4, 4).into(), None).unwrap();
        create_zone(&mut ctx, caster, "fire-field", (6, 6).into(), None).unwrap();
        create_zone(&mut ctx, caster, "fire-field", (2, 6).into(), None).unwrap();
        assert_eq!(h.state.zones.len(), 2);
        assert!(h.state.zone(first).is_none());
        assert!(h.events().iter().any(|event| matches!(
            event,
            CombatEvent::ZoneExpired { zone, reason, .. } if *zone == first && reason == REASON_REMOVED
        )));
    }

    #[test]
    fn while_inside_status_follows_membership() {
        let mut h = Harness::new(7, 7);
        let caster = h.spawn_hero(1, (0, 0), 30);
        let foe = h.spawn_foe(2, (6, 3), 30);
        let mut ctx = h.ctx();
        create_zone(&mut ctx, caster, "slowing-mire", (3, 3).into(), None).unwrap();
        movement::move_to(&mut ctx, foe, (4, 3).into()).unwrap();
        assert!(ctx.state.combatant(foe).unwrap().status_effects.contains("slowed"));
        movement::move_to(&mut ctx, foe, (6, 6).into()).unwrap();
        assert!(!h.combatant(foe).status_effects.contains("slowed"));
        let kinds = h.kinds();
        assert_eq!(
            kinds,
            vec![
                "ZoneCreated",
                "CombatantMoved",
                "ZoneEntered",
                "EffectApplied",
                "ZoneStatusApplied",
                "CombatantMoved",
                "ZoneExited",
                "EffectRemoved"
            ]
        );
    }

    #[test]
    fn overlapping_mires_keep_slow_until_the_last_one_is_left() {
        let mut h = Harness::new(9, 7);
        let caster = h.spawn_hero(1, (0, 0), 30);
        let foe = h.spawn_foe(2, (8, 3), 30);
        let mut ctx = h.ctx();
        let west = create_zone(&mut ctx, caster, "slowing-mire", (3, 3).into(), None).unwrap();
        let east = create_zone(&mut ctx, caster, "slowing-mire", (5, 3).into(), None).unwrap();
        movement::move_to(&mut ctx, foe, (4, 3).into()).unwrap();
        movement::move_to(&mut ctx, foe, (5, 3).into()).unwrap();
        assert!(!ctx.state.zone(west).unwrap().contains((5, 3).into()));
        assert!(ctx.state.combatant(foe).unwrap().status_effects.contains("slowed"));

        movement::move_to(&mut ctx, foe, (4, 3).into()).unwrap();
        remove_zone(&mut ctx, east, REASON_REMOVED).unwrap();
        assert!(ctx.state.combatant(foe).unwrap().status_effects.contains("slowed"));

        remove_zone(&mut ctx, west, REASON_REMOVED).unwrap();
        assert!(!h.combatant(foe).status_effects.contains("slowed"));
        let removals = h
            .events()
            .iter()
            .filter(|event| {
                matches!(
                    event,
                    CombatEvent::EffectRemoved { reason: EffectRemovalReason::LeftZone, .. }
                )
            })
            .count();
        assert_eq!(removals, 1);
    }

    #[test]
    fn terrain_zone_reshapes_plain_ground_for_its_lifetime() {
        let mut h = Harness::new(7, 7);
        let caster = h.spawn_hero(1, (0, 0), 30);
        h.state.grid.set_terrain((4, 3).into(), Terrain::Impassable).unwrap();
        let mut ctx = h.ctx();
        let zone = create_zone(&mut ctx, caster, "tangle-thicket", (3, 3).into(), None).unwrap();
        assert_eq!(ctx.state.grid.cell((3, 3).into()).unwrap().terrain, Terrain::Difficult);
        assert_eq!(ctx.state.grid.cell((4, 3).into()).unwrap().terrain, Terrain::Impassable);
        remove_zone(&mut ctx, zone, REASON_REMOVED).unwrap();
        assert_eq!(h.state.grid.cell((3, 3).into()).unwrap().terrain, Terrain::Normal);
        assert_eq!(h.state.grid.cell((4, 3).into()).unwrap().terrain, Terrain::Impassable);
    }

    #[test]
    fn combat_end_clears_all_zones() {
        let mut h = Harness::new(7, 7);
        let caster = h.spawn_hero(1, (0, 0), 30);
        let mut ctx = h.ctx();
        create_zone(&mut ctx, caster, "fire-field", (3, 3).into(), None).unwrap();
        create_zone(&mut ctx, caster, "healing-circle", (5, 5).into(), None).unwrap();
        assert_eq!(clear_zones(&mut ctx).unwrap(), 2);
        assert!(h.state.zones.is_empty());
    }
}
