//! Common types for the engine: coordinates, sides, shot results and the
//! action error taxonomy.

use core::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::game::Phase;

/// A `(row, col)` cell on a board.
pub type Coord = (usize, usize);

/// Index of a ship inside the fleet owned by a [`Board`](crate::Board).
pub type ShipId = usize;

/// Orientation of a ship, or of a missile's flight path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    /// Row-constant: extends to increasing columns.
    #[default]
    Horizontal,
    /// Column-constant: extends to increasing rows.
    Vertical,
}

impl Orientation {
    /// Unit step along this orientation as `(d_row, d_col)`.
    pub fn step(self) -> Coord {
        match self {
            Orientation::Horizontal => (0, 1),
            Orientation::Vertical => (1, 0),
        }
    }
}

/// The two sides of a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    #[serde(rename = "Jugador")]
    Player,
    #[serde(rename = "PC")]
    Opponent,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Player => f.write_str("Jugador"),
            Side::Opponent => f.write_str("PC"),
        }
    }
}

/// Outcome of a single cell being attacked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ShotResult {
    /// Empty water.
    Miss,
    /// A ship segment was hit but the ship is still afloat.
    Hit { ship: ShipId },
    /// The hit sank the ship, carrying its kind.
    Sink { ship: ShipId, kind: String },
    /// The cell had already been attacked; nothing changed.
    Repeat,
}

impl ShotResult {
    /// `true` for `Hit` and `Sink`.
    pub fn is_hit(&self) -> bool {
        matches!(self, ShotResult::Hit { .. } | ShotResult::Sink { .. })
    }
}

/// Why a placement was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PlacementRejection {
    #[error("the ship would extend past the edge of the board")]
    OutOfBounds,
    #[error("the ship would overlap another ship")]
    Overlap,
    #[error("the ship length does not match its positions")]
    LengthMismatch,
}

/// Rejected player or engine actions. Every rejection leaves state unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActionError {
    /// Ship placement is out of bounds or overlaps another ship.
    #[error("invalid placement: {0}")]
    InvalidPlacement(#[from] PlacementRejection),
    /// At least one target cell was already attacked.
    #[error("one or more target cells were already attacked")]
    DuplicateTarget,
    /// The aim point or the whole target set lies off the board.
    #[error("target is outside the board")]
    OutOfBounds,
    /// The action is not allowed in the current phase.
    #[error("cannot {action} during the {phase:?} phase")]
    PhaseViolation { action: &'static str, phase: Phase },
    /// The opponent has not answered the previous attack yet.
    #[error("the opponent's turn is still pending")]
    TurnPending,
    /// `opponent_turn` was called without a player attack to answer.
    #[error("no opponent turn is pending")]
    NoTurnPending,
    /// The roster index does not name a ship in the configuration.
    #[error("unknown roster entry {0}")]
    UnknownShip(usize),
    /// Every ship of this roster entry has already been placed.
    #[error("no ships of this kind remain to be placed")]
    RosterExhausted,
    /// The battle cannot start before the whole roster is placed.
    #[error("{remaining} ship(s) still need to be placed")]
    FleetIncomplete { remaining: usize },
    /// The weapon is not (or no longer) in the arsenal.
    #[error("weapon {0:?} is not available")]
    WeaponUnavailable(crate::weapon::WeaponKind),
    /// Random placement gave up; the roster is too dense for the board.
    #[error("could not place the fleet after exhausting all retries")]
    PlacementExhausted,
}
