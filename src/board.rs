//! Game board state: cell occupancy, attack marks and the owning fleet.

use core::fmt;

use crate::common::{ActionError, Coord, Orientation, PlacementRejection, ShipId, ShotResult};
use crate::ship::{self, Ship};

/// Attack state of a single cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mark {
    #[default]
    Untouched,
    Hit,
    Miss,
}

/// Cells covered by a ship of `length` anchored at `anchor`, extending along
/// `orientation`. Returns `None` if any cell would fall outside `[0, size)`.
pub fn compute_positions(
    size: usize,
    anchor: Coord,
    length: usize,
    orientation: Orientation,
) -> Option<Vec<Coord>> {
    let (dr, dc) = orientation.step();
    let (row, col) = anchor;
    (0..length)
        .map(|i| {
            let (r, c) = (row + dr * i, col + dc * i);
            (r < size && c < size).then_some((r, c))
        })
        .collect()
}

/// An N×N board owning its fleet. Cells store indices into the fleet.
#[derive(Clone, PartialEq, Eq)]
pub struct Board {
    size: usize,
    cells: Vec<Option<ShipId>>,
    marks: Vec<Mark>,
    ships: Vec<Ship>,
}

impl Board {
    /// Create an empty board of `size`×`size` cells.
    pub fn new(size: usize) -> Self {
        Board {
            size,
            cells: vec![None; size * size],
            marks: vec![Mark::Untouched; size * size],
            ships: Vec::new(),
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn in_bounds(&self, (row, col): Coord) -> bool {
        row < self.size && col < self.size
    }

    fn index(&self, (row, col): Coord) -> usize {
        row * self.size + col
    }

    /// Ship occupying `cell`, if any. Out-of-bounds cells are empty.
    pub fn ship_at(&self, cell: Coord) -> Option<ShipId> {
        if !self.in_bounds(cell) {
            return None;
        }
        self.cells[self.index(cell)]
    }

    /// Attack mark at `cell`; out-of-bounds cells read as untouched.
    pub fn mark(&self, cell: Coord) -> Mark {
        if !self.in_bounds(cell) {
            return Mark::Untouched;
        }
        self.marks[self.index(cell)]
    }

    /// Whether `cell` has already been hit or missed.
    pub fn is_attacked(&self, cell: Coord) -> bool {
        self.mark(cell) != Mark::Untouched
    }

    /// The fleet placed on this board, indexed by [`ShipId`].
    pub fn ships(&self) -> &[Ship] {
        &self.ships
    }

    pub fn ship(&self, id: ShipId) -> Option<&Ship> {
        self.ships.get(id)
    }

    /// Returns `true` when a fleet is present and all of it is sunk.
    pub fn all_sunk(&self) -> bool {
        !self.ships.is_empty() && ship::all_sunk(&self.ships)
    }

    /// `true` iff every position is in-bounds and currently empty.
    pub fn is_placement_legal(&self, positions: &[Coord]) -> bool {
        self.check_placement(positions).is_ok()
    }

    fn check_placement(&self, positions: &[Coord]) -> Result<(), PlacementRejection> {
        if positions.iter().any(|&p| !self.in_bounds(p)) {
            return Err(PlacementRejection::OutOfBounds);
        }
        if positions.iter().any(|&p| self.ship_at(p).is_some()) {
            return Err(PlacementRejection::Overlap);
        }
        Ok(())
    }

    /// Add `ship` to the fleet. The board is untouched unless the placement
    /// is legal.
    pub fn place(&mut self, ship: Ship) -> Result<ShipId, ActionError> {
        self.check_placement(ship.positions())?;
        let id = self.ships.len();
        for &p in ship.positions() {
            let idx = self.index(p);
            self.cells[idx] = Some(id);
        }
        self.ships.push(ship);
        Ok(id)
    }

    /// Resolve an attack on a single cell, marking it hit or miss. A sink is
    /// reported only on the hit that finishes the ship.
    pub fn fire(&mut self, cell: Coord) -> Result<ShotResult, ActionError> {
        if !self.in_bounds(cell) {
            return Err(ActionError::OutOfBounds);
        }
        if self.is_attacked(cell) {
            return Err(ActionError::DuplicateTarget);
        }
        let idx = self.index(cell);
        match self.cells[idx] {
            Some(id) => {
                self.marks[idx] = Mark::Hit;
                let ship = &mut self.ships[id];
                let was_sunk = ship.is_sunk();
                ship.hit(cell);
                if ship.is_sunk() && !was_sunk {
                    Ok(ShotResult::Sink {
                        ship: id,
                        kind: ship.kind().to_owned(),
                    })
                } else {
                    Ok(ShotResult::Hit { ship: id })
                }
            }
            None => {
                self.marks[idx] = Mark::Miss;
                Ok(ShotResult::Miss)
            }
        }
    }

    /// All cells not yet attacked, in row-major order.
    pub fn untouched_cells(&self) -> Vec<Coord> {
        (0..self.size)
            .flat_map(|r| (0..self.size).map(move |c| (r, c)))
            .filter(|&cell| !self.is_attacked(cell))
            .collect()
    }
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Board {{ size: {}, ships: {:?} }}", self.size, self.ships)?;
        for r in 0..self.size {
            for c in 0..self.size {
                let ch = match (self.mark((r, c)), self.ship_at((r, c))) {
                    (Mark::Hit, _) => 'X',
                    (Mark::Miss, _) => 'o',
                    (Mark::Untouched, Some(_)) => 'S',
                    (Mark::Untouched, None) => '.',
                };
                write!(f, "{}", ch)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
