//! Battleship engine with classic and war modes.
//!
//! The core is a pure request/response API around [`MatchEngine`]: place
//! ships, start the battle, fire weapons and let the uniform-random opponent
//! reply. Rendering lives in [`ui`] and [`player_cli`] and only calls into
//! the engine.

mod board;
mod common;
mod config;
mod game;
mod history;
mod logging;
mod opponent;
pub mod player_ai;
pub mod player_cli;
pub mod prelude;
mod ship;
pub mod ui;
mod weapon;

pub use board::*;
pub use common::*;
pub use config::*;
pub use game::*;
pub use history::*;
pub use logging::{init_logging, init_logging_with, level_from_env};
pub use opponent::{place_fleet, place_ships, random_placement, Targeter};
pub use player_ai::{simulate, RandomPlayer, SimSummary};
pub use ship::*;
pub use weapon::*;
