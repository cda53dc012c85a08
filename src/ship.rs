//! Ship shapes and hit tracking.

use std::collections::BTreeSet;

use crate::common::{Coord, PlacementRejection};

/// A ship placed on a board: fixed shape plus the cells hit so far.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ship {
    kind: String,
    length: usize,
    positions: Vec<Coord>,
    hit_cells: BTreeSet<Coord>,
}

impl Ship {
    /// Create a ship of `kind` covering `positions`.
    /// The positions must match `length`.
    pub fn new(
        kind: impl Into<String>,
        length: usize,
        positions: Vec<Coord>,
    ) -> Result<Self, PlacementRejection> {
        if length == 0 || positions.len() != length {
            return Err(PlacementRejection::LengthMismatch);
        }
        Ok(Ship {
            kind: kind.into(),
            length,
            positions,
            hit_cells: BTreeSet::new(),
        })
    }

    /// Register a hit at `cell`. Returns `true` only when the cell belongs to
    /// the ship and had not been hit before.
    pub fn hit(&mut self, cell: Coord) -> bool {
        self.contains(cell) && self.hit_cells.insert(cell)
    }

    /// Check if the ship is sunk (all segments hit).
    pub fn is_sunk(&self) -> bool {
        self.hit_cells.len() == self.length
    }

    /// Whether `cell` is one of the ship's positions.
    pub fn contains(&self, cell: Coord) -> bool {
        self.positions.contains(&cell)
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn length(&self) -> usize {
        self.length
    }

    /// Occupied cells, anchor first.
    pub fn positions(&self) -> &[Coord] {
        &self.positions
    }

    /// Cells hit so far.
    pub fn hit_cells(&self) -> &BTreeSet<Coord> {
        &self.hit_cells
    }
}

/// `true` when every ship in `ships` is sunk.
pub fn all_sunk(ships: &[Ship]) -> bool {
    ships.iter().all(Ship::is_sunk)
}
