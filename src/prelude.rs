//! Commonly used types and utilities for ease of import.

pub use crate::{
    ActionError, AttackResult, GameConfig, HistoryStore, JsonFileHistoryStore, MatchEngine,
    MemoryHistoryStore, Mode, Orientation, Phase, ShotResult, Side, WeaponKind,
};
