//! Grid movement: walking, opposed pushes, knockback, and critical knockback.
//!
//! All forced movement runs through [`resolve_movement`], which only reads the
//! grid. Callers commit the resolved end position and then run zone and
//! hazard entry for the destination.

use crate::error::CombatResult;
use crate::event::{BlockedBy, CombatEvent};
use crate::state::{CombatGrid, CombatantId, Direction, Position, Terrain};

use super::{CombatContext, hazard, zone};

/// Where a straight-line move would end.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MovementResolution {
    pub start: Position,
    pub end_position: Position,
    pub cells_requested: u32,
    pub cells_moved: u32,
    pub blocked: bool,
    pub blocked_by: Option<BlockedBy>,
}

/// Steps from `start` towards `direction` one cell at a time, stopping before
/// the grid edge, impassable terrain, or another combatant.
pub fn resolve_movement(
    grid: &CombatGrid,
    start: Position,
    direction: Direction,
    max_cells: u32,
) -> MovementResolution {
    let mut resolution = MovementResolution {
        start,
        end_position: start,
        cells_requested: max_cells,
        cells_moved: 0,
        blocked: false,
        blocked_by: None,
    };

    while resolution.cells_moved < max_cells {
        let next = resolution.end_position.step(direction);
        let blocker = match grid.cell(next) {
            None => Some(BlockedBy::GridEdge(next)),
            Some(cell) if cell.terrain == Terrain::Impassable => Some(BlockedBy::Impassable(next)),
            Some(cell) => cell.occupant.map(BlockedBy::Occupant),
        };
        if let Some(blocker) = blocker {
            resolution.blocked = true;
            resolution.blocked_by = Some(blocker);
            break;
        }
        resolution.end_position = next;
        resolution.cells_moved += 1;
    }
    resolution
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MoveRejection {
    Trapped,
    Defeated,
    Occupied,
    Impassable,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MoveOutcome {
    Moved { from: Position, to: Position },
    Rejected(MoveRejection),
}

/// Voluntary movement to `to`. Pathing is the caller's concern.
///
/// # Errors
///
/// A destination outside the grid is a state-consistency error.
pub fn move_to(
    ctx: &mut CombatContext<'_>,
    combatant: CombatantId,
    to: Position,
) -> CombatResult<MoveOutcome> {
    let Some(cell) = ctx.state.grid.cell(to) else {
        return Err(crate::state::GridError::OutOfBounds(to).into());
    };
    let mover = ctx.state.combatant(combatant)?;
    if !mover.is_alive() {
        return Ok(MoveOutcome::Rejected(MoveRejection::Defeated));
    }
    if mover.trapped {
        tracing::warn!("{} tried to walk while trapped", mover.name);
        return Ok(MoveOutcome::Rejected(MoveRejection::Trapped));
    }
    let from = mover.position;
    if from == to {
        return Ok(MoveOutcome::Moved { from, to });
    }
    if cell.terrain == Terrain::Impassable {
        return Ok(MoveOutcome::Rejected(MoveRejection::Impassable));
    }
    if cell.occupant.is_some() {
        return Ok(MoveOutcome::Rejected(MoveRejection::Occupied));
    }

    ctx.state.relocate(combatant, to)?;
    ctx.emit(CombatEvent::CombatantMoved {
        combatant,
        from,
        to,
    });
    arrive(ctx, combatant, from, to, None)?;
    Ok(MoveOutcome::Moved { from, to })
}

/// Result of an opposed push.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PushOutcome {
    Pushed {
        from: Position,
        to: Position,
        pusher_total: i32,
        target_total: i32,
    },
    /// The target matched or beat the pusher's check.
    Resisted {
        pusher_total: i32,
        target_total: i32,
    },
    /// The pusher won but nothing could give way.
    Blocked {
        blocked_by: BlockedBy,
    },
    /// Trapped, defeated, or sharing the pusher's cell.
    Immovable,
}

/// Opposed `d20 + STR` push of one cell directly away from the pusher.
///
/// The pusher must strictly exceed the target's total.
pub fn push(
    ctx: &mut CombatContext<'_>,
    pusher: CombatantId,
    target: CombatantId,
) -> CombatResult<PushOutcome> {
    let actor = ctx.state.combatant(pusher)?;
    let victim = ctx.state.combatant(target)?;
    let Some(direction) = Direction::away_from(actor.position, victim.position) else {
        return Ok(PushOutcome::Immovable);
    };
    if !actor.is_alive() || !victim.is_alive() || victim.trapped {
        return Ok(PushOutcome::Immovable);
    }
    let pusher_mod = actor.attributes.strength_mod();
    let target_mod = victim.attributes.strength_mod();
    let pusher_name = actor.name.clone();
    let start = victim.position;

    let pusher_total = ctx.dice.d20() as i32 + pusher_mod;
    let target_total = ctx.dice.d20() as i32 + target_mod;
    if pusher_total <= target_total {
        tracing::debug!(
            "push resisted: {} vs {}",
            pusher_total,
            target_total
        );
        ctx.emit(CombatEvent::PushResisted {
            pusher,
            target,
            position: start,
            pusher_total,
            target_total,
        });
        return Ok(PushOutcome::Resisted {
            pusher_total,
            target_total,
        });
    }

    let resolution = resolve_movement(&ctx.state.grid, start, direction, 1);
    if resolution.cells_moved == 0 {
        let blocked_by = resolution.blocked_by.unwrap_or(BlockedBy::GridEdge(start));
        ctx.emit(CombatEvent::MovementBlocked {
            combatant: target,
            position: start,
            cells_requested: 1,
            cells_moved_before_block: 0,
            blocked_by,
        });
        return Ok(PushOutcome::Blocked { blocked_by });
    }

    let to = resolution.end_position;
    ctx.state.relocate(target, to)?;
    ctx.emit(CombatEvent::CombatantPushed {
        pusher,
        target,
        from: start,
        to,
        pusher_total,
        target_total,
    });
    arrive(ctx, target, start, to, Some(pusher_name))?;
    Ok(PushOutcome::Pushed {
        from: start,
        to,
        pusher_total,
        target_total,
    })
}

/// Unopposed forced movement of up to `cells` cells.
///
/// Returns `None` when the target cannot be moved at all (defeated or trapped).
pub fn knockback(
    ctx: &mut CombatContext<'_>,
    source: Option<CombatantId>,
    target: CombatantId,
    direction: Direction,
    cells: u32,
) -> CombatResult<Option<MovementResolution>> {
    let victim = ctx.state.combatant(target)?;
    if !victim.is_alive() {
        return Ok(None);
    }
    if victim.trapped {
        tracing::warn!("{} is trapped and cannot be knocked back", victim.name);
        return Ok(None);
    }
    let start = victim.position;
    let source_name = match source {
        Some(id) => Some(ctx.state.combatant(id)?.name.clone()),
        None => None,
    };

    let resolution = resolve_movement(&ctx.state.grid, start, direction, cells);
    let to = resolution.end_position;
    if resolution.cells_moved > 0 {
        ctx.state.relocate(target, to)?;
    }
    match resolution.blocked_by {
        Some(blocked_by) => ctx.emit(CombatEvent::MovementBlocked {
            combatant: target,
            position: to,
            cells_requested: cells,
            cells_moved_before_block: resolution.cells_moved,
            blocked_by,
        }),
        None => ctx.emit(CombatEvent::CombatantKnockedBack {
            source,
            target,
            from: start,
            to,
            cells_moved: resolution.cells_moved,
        }),
    }
    if resolution.cells_moved > 0 {
        arrive(ctx, target, start, to, source_name)?;
    }
    Ok(Some(resolution))
}

/// Knocks the target directly away from the attacker after a critical hit.
pub fn critical_knockback(
    ctx: &mut CombatContext<'_>,
    attacker: CombatantId,
    target: CombatantId,
) -> CombatResult<Option<MovementResolution>> {
    let cells = ctx.config()?.critical_knockback_cells;
    let origin = ctx.state.combatant(attacker)?.position;
    let at = ctx.state.combatant(target)?.position;
    let Some(direction) = Direction::away_from(origin, at) else {
        return Ok(None);
    };
    ctx.emit(CombatEvent::CriticalKnockbackTriggered {
        attacker,
        target,
        direction,
        cells,
    });
    knockback(ctx, Some(attacker), target, direction, cells)
}

/// Zone enter/exit and hazard entry for a combatant that just changed cells.
fn arrive(
    ctx: &mut CombatContext<'_>,
    combatant: CombatantId,
    from: Position,
    to: Position,
    pusher_name: Option<String>,
) -> CombatResult<()> {
    zone::on_moved(ctx, combatant, from, to)?;
    if ctx.state.grid.hazard_at(to).is_some() {
        hazard::on_entered(ctx, combatant, pusher_name)?;
    }
    Ok(())
}
