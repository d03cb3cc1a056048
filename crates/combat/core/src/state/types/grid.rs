//! Combat grid: terrain, occupancy, hazards, and zone membership per cell.

use std::collections::{BTreeMap, BTreeSet};

use crate::combat::DamageRoll;
use crate::error::{ErrorSeverity, GameError};
use crate::env::{HazardDefinition, HazardFlags, HazardKind};

use super::{CombatantId, Position, ZoneInstanceId};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::EnumString, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(ascii_case_insensitive)]
pub enum Terrain {
    #[default]
    Normal,
    Difficult,
    Hazardous,
    Impassable,
}

/// A hazard placed on a cell, copied from its definition at placement time.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HazardInstance {
    pub hazard_id: String,
    pub name: String,
    pub kind: HazardKind,
    pub entry_damage: Option<DamageRoll>,
    pub turn_damage: Option<DamageRoll>,
    pub status_effect: Option<String>,
    pub flags: HazardFlags,
    pub armor_degradation: u32,
    pub climb_dc: Option<i32>,
}

impl HazardInstance {
    pub fn requires_climb_out(&self) -> bool {
        self.flags.contains(HazardFlags::REQUIRES_CLIMB_OUT)
    }

    pub fn degrades_armor(&self) -> bool {
        self.flags.contains(HazardFlags::DEGRADES_ARMOR)
    }
}

impl From<&HazardDefinition> for HazardInstance {
    fn from(def: &HazardDefinition) -> Self {
        Self {
            hazard_id: def.id.clone(),
            name: def.name.clone(),
            kind: def.kind,
            entry_damage: def.entry_damage,
            turn_damage: def.turn_damage,
            status_effect: def.status_effect.clone(),
            flags: def.flags,
            armor_degradation: def.armor_degradation,
            climb_dc: def.climb_dc,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GridCell {
    pub position: Position,
    pub terrain: Terrain,
    pub occupant: Option<CombatantId>,
    pub hazard: Option<HazardInstance>,
    pub zones: BTreeSet<ZoneInstanceId>,
}

impl GridCell {
    fn new(position: Position) -> Self {
        Self {
            position,
            terrain: Terrain::Normal,
            occupant: None,
            hazard: None,
            zones: BTreeSet::new(),
        }
    }

    /// True when nothing stops a combatant from stepping into this cell.
    pub fn is_open(&self) -> bool {
        self.terrain != Terrain::Impassable && self.occupant.is_none()
    }
}

/// Rectangular grid of cells with an occupant index.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CombatGrid {
    width: u32,
    height: u32,
    cells: Vec<GridCell>,
    occupants: BTreeMap<CombatantId, Position>,
}

impl CombatGrid {
    pub fn new(width: u32, height: u32) -> Self {
        let mut cells = Vec::with_capacity((width * height) as usize);
        for y in 0..height as i32 {
            for x in 0..width as i32 {
                cells.push(GridCell::new(Position::new(x, y)));
            }
        }
        Self {
            width,
            height,
            cells,
            occupants: BTreeMap::new(),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn contains(&self, position: Position) -> bool {
        position.x >= 0
            && position.y >= 0
            && (position.x as u32) < self.width
            && (position.y as u32) < self.height
    }

    fn index(&self, position: Position) -> Option<usize> {
        self.contains(position)
            .then(|| (position.y as u32 * self.width + position.x as u32) as usize)
    }

    pub fn cell(&self, position: Position) -> Option<&GridCell> {
        self.index(position).map(|idx| &self.cells[idx])
    }

    pub fn cell_mut(&mut self, position: Position) -> Option<&mut GridCell> {
        self.index(position).map(move |idx| &mut self.cells[idx])
    }

    fn cell_or_err(&mut self, position: Position) -> Result<&mut GridCell, GridError> {
        self.cell_mut(position)
            .ok_or(GridError::OutOfBounds(position))
    }

    pub fn cells(&self) -> impl Iterator<Item = &GridCell> {
        self.cells.iter()
    }

    pub fn occupant_at(&self, position: Position) -> Option<CombatantId> {
        self.cell(position).and_then(|cell| cell.occupant)
    }

    pub fn position_of(&self, id: CombatantId) -> Option<Position> {
        self.occupants.get(&id).copied()
    }

    pub fn hazard_at(&self, position: Position) -> Option<&HazardInstance> {
        self.cell(position).and_then(|cell| cell.hazard.as_ref())
    }

    /// Open means inside the grid, passable, and unoccupied.
    pub fn is_open(&self, position: Position) -> bool {
        self.cell(position).is_some_and(GridCell::is_open)
    }

    pub fn set_terrain(&mut self, position: Position, terrain: Terrain) -> Result<(), GridError> {
        self.cell_or_err(position)?.terrain = terrain;
        Ok(())
    }

    /// Places a hazard and marks the cell hazardous.
    pub fn place_hazard(
        &mut self,
        position: Position,
        hazard: HazardInstance,
    ) -> Result<(), GridError> {
        let cell = self.cell_or_err(position)?;
        cell.terrain = Terrain::Hazardous;
        cell.hazard = Some(hazard);
        Ok(())
    }

    pub fn remove_hazard(&mut self, position: Position) -> Result<Option<HazardInstance>, GridError> {
        let cell = self.cell_or_err(position)?;
        if cell.terrain == Terrain::Hazardous {
            cell.terrain = Terrain::Normal;
        }
        Ok(cell.hazard.take())
    }

    /// Puts a combatant on an empty cell.
    pub fn place(&mut self, id: CombatantId, position: Position) -> Result<(), GridError> {
        if let Some(existing) = self.occupants.get(&id) {
            return Err(GridError::AlreadyPlaced {
                combatant: id,
                position: *existing,
            });
        }
        let cell = self.cell_or_err(position)?;
        if let Some(occupant) = cell.occupant {
            return Err(GridError::CellOccupied { position, occupant });
        }
        cell.occupant = Some(id);
        self.occupants.insert(id, position);
        Ok(())
    }

    /// Moves a placed combatant to an empty cell.
    pub fn relocate(&mut self, id: CombatantId, to: Position) -> Result<Position, GridError> {
        let from = self
            .position_of(id)
            .ok_or(GridError::NotOnGrid(id))?;
        if from == to {
            return Ok(from);
        }
        if let Some(occupant) = self.cell(to).ok_or(GridError::OutOfBounds(to))?.occupant {
            return Err(GridError::CellOccupied {
                position: to,
                occupant,
            });
        }
        self.cell_or_err(from)?.occupant = None;
        self.cell_or_err(to)?.occupant = Some(id);
        self.occupants.insert(id, to);
        Ok(from)
    }

    /// Takes a combatant off the grid, returning the cell it vacated.
    pub fn remove(&mut self, id: CombatantId) -> Option<Position> {
        let position = self.occupants.remove(&id)?;
        if let Some(cell) = self.cell_mut(position) {
            cell.occupant = None;
        }
        Some(position)
    }

    pub fn occupants(&self) -> impl Iterator<Item = (CombatantId, Position)> + '_ {
        self.occupants.iter().map(|(id, pos)| (*id, *pos))
    }
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum GridError {
    #[error("position {0} is outside the grid")]
    OutOfBounds(Position),

    #[error("cell {position} is already occupied by {occupant}")]
    CellOccupied {
        position: Position,
        occupant: CombatantId,
    },

    #[error("combatant {combatant} is already placed at {position}")]
    AlreadyPlaced {
        combatant: CombatantId,
        position: Position,
    },

    #[error("combatant {0} is not on the grid")]
    NotOnGrid(CombatantId),
}

impl GameError for GridError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::OutOfBounds(_) => ErrorSeverity::Fatal,
            Self::CellOccupied { .. } | Self::AlreadyPlaced { .. } | Self::NotOnGrid(_) => {
                ErrorSeverity::Internal
            }
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::OutOfBounds(_) => "GRID_OUT_OF_BOUNDS",
            Self::CellOccupied { .. } => "GRID_CELL_OCCUPIED",
            Self::AlreadyPlaced { .. } => "GRID_ALREADY_PLACED",
            Self::NotOnGrid(_) => "GRID_NOT_ON_GRID",
        }
    }
}
