//! Uniform-random opponent: fleet placement with bounded retry and
//! non-repeating target selection.

use std::collections::HashSet;

use log::{debug, warn};
use rand::Rng;

use crate::board::{compute_positions, Board};
use crate::common::{ActionError, Coord, Orientation};
use crate::config::{
    GameConfig, ShipSpec, FLEET_RESTARTS, PLACEMENT_ATTEMPTS, SHIP_RETRY_ROUNDS,
    TARGETING_ATTEMPTS,
};
use crate::ship::Ship;

fn random_orientation<R: Rng + ?Sized>(rng: &mut R) -> Orientation {
    if rng.random() {
        Orientation::Horizontal
    } else {
        Orientation::Vertical
    }
}

/// Returns a random legal `(anchor, orientation)` for a ship of `length`, or
/// `None` after `PLACEMENT_ATTEMPTS` rejected samples.
pub fn random_placement<R: Rng + ?Sized>(
    board: &Board,
    rng: &mut R,
    length: usize,
) -> Option<(Coord, Orientation)> {
    let size = board.size();
    if size == 0 {
        return None;
    }
    for _ in 0..PLACEMENT_ATTEMPTS {
        let orientation = random_orientation(rng);
        let anchor = (rng.random_range(0..size), rng.random_range(0..size));
        if let Some(positions) = compute_positions(size, anchor, length, orientation) {
            if board.is_placement_legal(&positions) {
                return Some((anchor, orientation));
            }
        }
    }
    None
}

/// Place one ship of `spec` at a random legal spot, retrying the same ship
/// for `SHIP_RETRY_ROUNDS` rounds.
fn place_one<R: Rng + ?Sized>(board: &mut Board, rng: &mut R, spec: &ShipSpec) -> bool {
    for round in 0..SHIP_RETRY_ROUNDS {
        if let Some((anchor, orientation)) = random_placement(board, rng, spec.size) {
            let placed = compute_positions(board.size(), anchor, spec.size, orientation)
                .and_then(|positions| Ship::new(spec.name.as_str(), spec.size, positions).ok())
                .map(|ship| board.place(ship).is_ok())
                .unwrap_or(false);
            if placed {
                return true;
            }
        }
        warn!(
            "could not place {} after {} attempts (round {}), retrying",
            spec.name,
            PLACEMENT_ATTEMPTS,
            round + 1
        );
    }
    false
}

/// Place `quantity` ships of every roster entry in `specs` onto `board`.
///
/// Ships already on `board` are kept. On failure the board is restored to
/// its original state and the whole fleet is restarted, up to
/// `FLEET_RESTARTS` times.
pub fn place_ships<R: Rng + ?Sized>(
    board: &mut Board,
    rng: &mut R,
    specs: &[(ShipSpec, usize)],
) -> Result<(), ActionError> {
    let original = board.clone();
    for restart in 0..=FLEET_RESTARTS {
        if restart > 0 {
            warn!("restarting random fleet placement ({}/{})", restart, FLEET_RESTARTS);
            *board = original.clone();
        }
        let mut complete = true;
        'fleet: for (spec, quantity) in specs {
            for _ in 0..*quantity {
                if !place_one(board, rng, spec) {
                    complete = false;
                    break 'fleet;
                }
            }
        }
        if complete {
            debug!("placed {} ships at random", board.ships().len() - original.ships().len());
            return Ok(());
        }
    }
    *board = original;
    Err(ActionError::PlacementExhausted)
}

/// A fresh board for `config` with the full roster placed at random.
pub fn place_fleet<R: Rng + ?Sized>(config: &GameConfig, rng: &mut R) -> Result<Board, ActionError> {
    let mut board = Board::new(config.board_size);
    let specs: Vec<(ShipSpec, usize)> = config
        .ships
        .iter()
        .map(|spec| (spec.clone(), spec.quantity))
        .collect();
    place_ships(&mut board, rng, &specs)?;
    Ok(board)
}

/// Uniform-random targeting that never fires twice at the same cell while an
/// unshot cell remains.
#[derive(Debug, Clone, Default)]
pub struct Targeter {
    history: HashSet<Coord>,
}

impl Targeter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cells fired at so far.
    pub fn history(&self) -> &HashSet<Coord> {
        &self.history
    }

    /// Choose the next cell on a `size`×`size` board and record it.
    ///
    /// Draws up to `TARGETING_ATTEMPTS` uniform samples, then falls back to a
    /// uniform pick among unshot cells. Only if every cell has been shot does
    /// it return a repeat; the flag in the result is `true` in that case.
    pub fn next_target<R: Rng + ?Sized>(&mut self, rng: &mut R, size: usize) -> (Coord, bool) {
        for _ in 0..TARGETING_ATTEMPTS {
            let cell = (rng.random_range(0..size), rng.random_range(0..size));
            if self.history.insert(cell) {
                return (cell, false);
            }
        }
        let remaining: Vec<Coord> = (0..size)
            .flat_map(|r| (0..size).map(move |c| (r, c)))
            .filter(|cell| !self.history.contains(cell))
            .collect();
        if remaining.is_empty() {
            let cell = (rng.random_range(0..size), rng.random_range(0..size));
            warn!("every cell has been targeted, repeating {:?}", cell);
            return (cell, true);
        }
        debug!(
            "random sampling exhausted, choosing among {} unshot cells",
            remaining.len()
        );
        let cell = remaining[rng.random_range(0..remaining.len())];
        self.history.insert(cell);
        (cell, false)
    }
}
