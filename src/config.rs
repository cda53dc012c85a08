//! Game configuration: board size, ship roster, special weapons and the
//! history key. Classic and war presets are built in; custom modes can be
//! loaded from JSON.

use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::weapon::WeaponKind;

/// Largest board side; columns are labelled `A` to `Z`.
pub const MAX_BOARD_SIZE: usize = 26;
/// Maximum number of entries kept in a mode's match history.
pub const MAX_HISTORY: usize = 10;
/// Uses granted to the bomb at the start of a match.
pub const BOMB_USES: u32 = 2;
/// Uses granted to the missile at the start of a match.
pub const MISSILE_USES: u32 = 3;
/// Cells covered by a missile.
pub const MISSILE_LENGTH: usize = 3;
/// Random anchors tried per opponent ship before the ship is retried.
pub const PLACEMENT_ATTEMPTS: usize = 500;
/// Retry rounds for a single opponent ship before the fleet is restarted.
pub const SHIP_RETRY_ROUNDS: usize = 3;
/// Full fleet restarts before placement is reported as exhausted.
pub const FLEET_RESTARTS: usize = 25;
/// Random samples the opponent draws before scanning for an unshot cell.
pub const TARGETING_ATTEMPTS: usize = 200;

pub const CLASSIC_HISTORY_KEY: &str = "battleshipHistory";
pub const WAR_HISTORY_KEY: &str = "battleshipHistoryWar";

/// One roster entry: a ship kind and how many of it each side fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShipSpec {
    pub name: String,
    pub size: usize,
    pub quantity: usize,
    /// Display hint for front ends, e.g. `#FF6B6B`.
    #[serde(default)]
    pub color: String,
}

impl ShipSpec {
    pub fn new(name: &str, size: usize, quantity: usize, color: &str) -> Self {
        Self {
            name: name.to_owned(),
            size,
            quantity,
            color: color.to_owned(),
        }
    }
}

/// Built-in game modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum Mode {
    #[default]
    Classic,
    War,
}

impl Mode {
    pub fn config(self) -> GameConfig {
        match self {
            Mode::Classic => GameConfig::classic(),
            Mode::War => GameConfig::war(),
        }
    }
}

/// Configuration problems detected by [`GameConfig::validate`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("board size must be at least 1")]
    EmptyBoard,
    #[error("board size {size} exceeds the maximum of {max}")]
    BoardTooLarge { size: usize, max: usize },
    #[error("the ship roster is empty")]
    EmptyRoster,
    #[error("ship {name:?} has size {size}, which does not fit a {board_size}x{board_size} board")]
    ShipTooLarge {
        name: String,
        size: usize,
        board_size: usize,
    },
    #[error("the roster needs {cells} cells but the board only has {capacity}")]
    TooDense { cells: usize, capacity: usize },
    #[error("history key must not be empty")]
    EmptyHistoryKey,
}

/// Immutable description of a game mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameConfig {
    pub board_size: usize,
    pub ships: Vec<ShipSpec>,
    #[serde(default)]
    pub weapons: Vec<WeaponKind>,
    #[serde(alias = "storageKey")]
    pub history_key: String,
}

impl GameConfig {
    /// 10×10 board, five ships, no special weapons.
    pub fn classic() -> Self {
        Self {
            board_size: 10,
            ships: vec![
                ShipSpec::new("Portaviones", 5, 1, "#FF6B6B"),
                ShipSpec::new("Acorazado", 4, 1, "#4ECDC4"),
                ShipSpec::new("Submarino", 3, 2, "#45B7D1"),
                ShipSpec::new("Destructor", 2, 1, "#96CEB4"),
            ],
            weapons: Vec::new(),
            history_key: CLASSIC_HISTORY_KEY.to_owned(),
        }
    }

    /// 12×12 board, ten ships, bomb and missile enabled.
    pub fn war() -> Self {
        Self {
            board_size: 12,
            ships: vec![
                ShipSpec::new("Portaviones", 5, 2, "#FF6B6B"),
                ShipSpec::new("Acorazado", 4, 2, "#4ECDC4"),
                ShipSpec::new("Submarino", 3, 4, "#45B7D1"),
                ShipSpec::new("Destructor", 2, 2, "#96CEB4"),
            ],
            weapons: vec![WeaponKind::Bomb, WeaponKind::Missile],
            history_key: WAR_HISTORY_KEY.to_owned(),
        }
    }

    /// Parse and validate a configuration from JSON.
    pub fn from_json_str(json: &str) -> anyhow::Result<Self> {
        let config: GameConfig =
            serde_json::from_str(json).context("failed to parse game configuration")?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a configuration file.
    pub fn from_path(path: &Path) -> anyhow::Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Self::from_json_str(&json)
    }

    /// Total number of ships each side places.
    pub fn total_ships(&self) -> usize {
        self.ships
            .iter()
            .fold(0, |total: usize, s| total.saturating_add(s.quantity))
    }

    /// Total number of cells the roster occupies.
    pub fn total_ship_cells(&self) -> usize {
        self.ships.iter().fold(0, |total: usize, s| {
            total.saturating_add(s.size.saturating_mul(s.quantity))
        })
    }

    pub fn weapon_enabled(&self, kind: WeaponKind) -> bool {
        self.weapons.contains(&kind)
    }

    /// Reject configurations the engine cannot play.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.board_size == 0 {
            return Err(ConfigError::EmptyBoard);
        }
        if self.board_size > MAX_BOARD_SIZE {
            return Err(ConfigError::BoardTooLarge {
                size: self.board_size,
                max: MAX_BOARD_SIZE,
            });
        }
        if self.total_ships() == 0 {
            return Err(ConfigError::EmptyRoster);
        }
        if self.history_key.is_empty() {
            return Err(ConfigError::EmptyHistoryKey);
        }
        if let Some(ship) = self
            .ships
            .iter()
            .find(|s| s.quantity > 0 && (s.size == 0 || s.size > self.board_size))
        {
            return Err(ConfigError::ShipTooLarge {
                name: ship.name.clone(),
                size: ship.size,
                board_size: self.board_size,
            });
        }
        let capacity = self.board_size * self.board_size;
        let cells = self.total_ship_cells();
        if cells > capacity {
            return Err(ConfigError::TooDense { cells, capacity });
        }
        Ok(())
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::classic()
    }
}
