//! Mutable combat state: combatants, the grid, live zones, and boss trackers.
//!
//! [`CombatState`] owns everything the resolvers mutate. Combatant positions are
//! mirrored in the grid's occupant index; move combatants only through
//! [`CombatState::relocate`] so both stay in sync.
mod types;

use std::collections::BTreeMap;

pub use types::*;

use crate::error::{CombatError, CombatResult, ErrorContext};

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CombatState {
    /// Current round, starting at 0 before the first round begins.
    pub round: u32,
    pub grid: CombatGrid,
    combatants: BTreeMap<CombatantId, Combatant>,
    /// Live zones in creation order.
    pub zones: Vec<ZoneInstance>,
    next_zone_id: u32,
    pub bosses: BTreeMap<CombatantId, BossState>,
}

impl CombatState {
    pub fn new(grid: CombatGrid) -> Self {
        Self {
            round: 0,
            grid,
            combatants: BTreeMap::new(),
            zones: Vec::new(),
            next_zone_id: 0,
            bosses: BTreeMap::new(),
        }
    }

    /// Registers a combatant and places it on the grid at its position.
    pub fn add_combatant(&mut self, combatant: Combatant) -> CombatResult<()> {
        if self.combatants.contains_key(&combatant.id) {
            return Err(CombatError::DuplicateCombatant(combatant.id));
        }
        self.grid.place(combatant.id, combatant.position)?;
        self.combatants.insert(combatant.id, combatant);
        Ok(())
    }

    pub fn combatant(&self, id: CombatantId) -> CombatResult<&Combatant> {
        self.combatants
            .get(&id)
            .ok_or(CombatError::UnknownCombatant(id))
    }

    pub fn combatant_mut(&mut self, id: CombatantId) -> CombatResult<&mut Combatant> {
        self.combatants
            .get_mut(&id)
            .ok_or(CombatError::UnknownCombatant(id))
    }

    pub fn contains(&self, id: CombatantId) -> bool {
        self.combatants.contains_key(&id)
    }

    pub fn combatants(&self) -> impl Iterator<Item = &Combatant> {
        self.combatants.values()
    }

    pub fn combatants_mut(&mut self) -> impl Iterator<Item = &mut Combatant> {
        self.combatants.values_mut()
    }

    pub fn combatant_ids(&self) -> Vec<CombatantId> {
        self.combatants.keys().copied().collect()
    }

    /// Living combatants ordered by initiative, highest first, ties by id.
    pub fn initiative_order(&self) -> Vec<CombatantId> {
        let mut ids: Vec<&Combatant> = self.combatants.values().filter(|c| c.is_alive()).collect();
        ids.sort_by(|a, b| b.initiative.cmp(&a.initiative).then(a.id.cmp(&b.id)));
        ids.into_iter().map(|c| c.id).collect()
    }

    /// Moves a combatant on the grid and updates its stored position.
    pub fn relocate(&mut self, id: CombatantId, to: Position) -> CombatResult<Position> {
        let stored = self.combatant(id)?.position;
        if self.grid.position_of(id) != Some(stored) {
            return Err(CombatError::InvariantViolated {
                message: "grid occupant index disagrees with combatant position",
                context: ErrorContext::new(self.round)
                    .with_combatant(id)
                    .with_position(stored),
            });
        }
        let from = self.grid.relocate(id, to)?;
        self.combatant_mut(id)?.position = to;
        Ok(from)
    }

    /// Reserves the next zone instance id.
    pub fn allocate_zone_id(&mut self) -> ZoneInstanceId {
        let id = ZoneInstanceId(self.next_zone_id);
        self.next_zone_id += 1;
        id
    }

    pub fn zone(&self, id: ZoneInstanceId) -> Option<&ZoneInstance> {
        self.zones.iter().find(|zone| zone.id == id)
    }

    pub fn boss(&self, id: CombatantId) -> CombatResult<&BossState> {
        self.bosses.get(&id).ok_or(CombatError::NotABoss(id))
    }

    pub fn boss_mut(&mut self, id: CombatantId) -> CombatResult<&mut BossState> {
        self.bosses.get_mut(&id).ok_or(CombatError::NotABoss(id))
    }
}
