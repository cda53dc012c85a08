//! Match engine: the SETUP → BATTLE → END state machine.
//!
//! A turn is two explicit steps. [`MatchEngine::fire_at`] resolves the
//! player's attack and, unless the match ended, leaves the opponent's reply
//! pending; [`MatchEngine::opponent_turn`] resolves that reply. No further
//! player attack is accepted while a reply is pending.
//! [`MatchEngine::play_turn`] runs both steps back to back.

use std::time::Instant;

use log::{debug, error, info};
use rand::rngs::SmallRng;
use rand::SeedableRng;
use serde::Serialize;

use crate::board::{compute_positions, Board};
use crate::common::{
    ActionError, Coord, Orientation, PlacementRejection, ShipId, ShotResult, Side,
};
use crate::config::{ConfigError, GameConfig, ShipSpec};
use crate::history::{self, HistoryEntry, HistoryStore, MemoryHistoryStore};
use crate::opponent::{self, Targeter};
use crate::ship::Ship;
use crate::weapon::{Arsenal, WeaponKind};

/// Stage of a match. Transitions only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Phase {
    Setup,
    Battle,
    End,
}

/// Running counters for the current match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stats {
    pub player_hits: u32,
    pub opponent_hits: u32,
    pub player_shots: u32,
    pub opponent_shots: u32,
    pub started_at: Instant,
}

impl Stats {
    fn new() -> Self {
        Self {
            player_hits: 0,
            opponent_hits: 0,
            player_shots: 0,
            opponent_shots: 0,
            started_at: Instant::now(),
        }
    }

    /// Whole seconds since the match started.
    pub fn elapsed_secs(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}

/// Result for one target cell of an attack.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CellReport {
    pub cell: Coord,
    pub result: ShotResult,
}

/// Outcome of one player weapon activation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttackResult {
    pub weapon: WeaponKind,
    pub cells: Vec<CellReport>,
    /// Cells fired at by this activation.
    pub shots: u32,
    /// Cells that hit a ship.
    pub hits: u32,
    /// Set when this attack ended the match.
    pub winner: Option<Side>,
    /// `true` when the opponent must reply before the next attack.
    pub opponent_turn_pending: bool,
}

impl AttackResult {
    /// Kinds of the ships sunk by this attack.
    pub fn sunk(&self) -> Vec<&str> {
        self.cells
            .iter()
            .filter_map(|report| match &report.result {
                ShotResult::Sink { kind, .. } => Some(kind.as_str()),
                _ => None,
            })
            .collect()
    }
}

/// Outcome of the opponent's reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OpponentShot {
    pub cell: Coord,
    pub result: ShotResult,
    /// The targeter ran out of unshot cells and fired at a repeat.
    pub repeated: bool,
    pub winner: Option<Side>,
}

/// Both halves of a turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TurnReport {
    pub attack: AttackResult,
    pub reply: Option<OpponentShot>,
}

/// Build a ship of `spec` anchored at `anchor`, checking only the board edge.
fn ship_at(
    spec: &ShipSpec,
    board_size: usize,
    anchor: Coord,
    orientation: Orientation,
) -> Result<Ship, ActionError> {
    let positions = compute_positions(board_size, anchor, spec.size, orientation)
        .ok_or(PlacementRejection::OutOfBounds)?;
    Ok(Ship::new(spec.name.as_str(), spec.size, positions)?)
}

/// Orchestrates a match between the player and the random opponent.
pub struct MatchEngine<S: HistoryStore = MemoryHistoryStore> {
    config: GameConfig,
    rng: SmallRng,
    store: S,
    phase: Phase,
    player_board: Board,
    opponent_board: Board,
    placed: Vec<usize>,
    arsenal: Arsenal,
    targeter: Targeter,
    stats: Stats,
    reply_pending: bool,
    winner: Option<Side>,
}

impl<S: HistoryStore> MatchEngine<S> {
    /// Create an engine with an entropy-seeded RNG.
    pub fn new(config: GameConfig, store: S) -> Result<Self, ConfigError> {
        let rng = SmallRng::from_rng(&mut rand::rng());
        Self::with_rng(config, store, rng)
    }

    /// Create an engine whose random choices are reproducible from `seed`.
    pub fn with_seed(config: GameConfig, store: S, seed: u64) -> Result<Self, ConfigError> {
        Self::with_rng(config, store, SmallRng::seed_from_u64(seed))
    }

    fn with_rng(config: GameConfig, store: S, rng: SmallRng) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            player_board: Board::new(config.board_size),
            opponent_board: Board::new(config.board_size),
            placed: vec![0; config.ships.len()],
            arsenal: Arsenal::new(&config),
            targeter: Targeter::new(),
            stats: Stats::new(),
            phase: Phase::Setup,
            reply_pending: false,
            winner: None,
            config,
            rng,
            store,
        })
    }

    /// Discard the current match and start over with the same configuration.
    pub fn new_game(&mut self) {
        let size = self.config.board_size;
        self.player_board = Board::new(size);
        self.opponent_board = Board::new(size);
        self.placed = vec![0; self.config.ships.len()];
        self.arsenal = Arsenal::new(&self.config);
        self.targeter = Targeter::new();
        self.stats = Stats::new();
        self.phase = Phase::Setup;
        self.reply_pending = false;
        self.winner = None;
        info!("new game started ({})", self.config.history_key);
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn stats(&self) -> &Stats {
        &self.stats
    }

    pub fn player_board(&self) -> &Board {
        &self.player_board
    }

    pub fn opponent_board(&self) -> &Board {
        &self.opponent_board
    }

    pub fn arsenal(&self) -> &Arsenal {
        &self.arsenal
    }

    /// Cells the opponent has fired at this match.
    pub fn opponent_shot_history(&self) -> &std::collections::HashSet<Coord> {
        self.targeter.history()
    }

    /// The winner once the match is over.
    pub fn winner(&self) -> Option<Side> {
        self.winner
    }

    /// Whether an attack is waiting for the opponent's reply.
    pub fn reply_pending(&self) -> bool {
        self.reply_pending
    }

    /// Past matches for this mode, newest first.
    pub fn history(&self) -> anyhow::Result<Vec<HistoryEntry>> {
        self.store.load(&self.config.history_key)
    }

    /// Ships of roster entry `roster_index` still to be placed.
    pub fn remaining_to_place(&self, roster_index: usize) -> Option<usize> {
        let spec = self.config.ships.get(roster_index)?;
        Some(spec.quantity.saturating_sub(self.placed[roster_index]))
    }

    /// Ships still to be placed across the whole roster.
    pub fn ships_remaining(&self) -> usize {
        (0..self.config.ships.len())
            .filter_map(|i| self.remaining_to_place(i))
            .sum()
    }

    /// `true` in SETUP once the whole roster is placed.
    pub fn can_start_battle(&self) -> bool {
        self.phase == Phase::Setup && self.ships_remaining() == 0
    }

    fn require_phase(&self, phase: Phase, action: &'static str) -> Result<(), ActionError> {
        if self.phase == phase {
            Ok(())
        } else {
            debug!("rejected {} during {:?}", action, self.phase);
            Err(ActionError::PhaseViolation {
                action,
                phase: self.phase,
            })
        }
    }

    /// Place one ship of roster entry `roster_index` on the player's board.
    pub fn place_ship(
        &mut self,
        roster_index: usize,
        anchor: Coord,
        orientation: Orientation,
    ) -> Result<ShipId, ActionError> {
        self.require_phase(Phase::Setup, "place a ship")?;
        let spec = self
            .config
            .ships
            .get(roster_index)
            .ok_or(ActionError::UnknownShip(roster_index))?;
        if self.placed[roster_index] >= spec.quantity {
            return Err(ActionError::RosterExhausted);
        }
        let result = ship_at(spec, self.config.board_size, anchor, orientation)
            .and_then(|ship| self.player_board.place(ship));
        match result {
            Ok(id) => {
                self.placed[roster_index] += 1;
                debug!(
                    "placed {} at {:?} {:?}",
                    self.config.ships[roster_index].name, anchor, orientation
                );
                Ok(id)
            }
            Err(e) => {
                debug!("rejected placement at {:?}: {}", anchor, e);
                Err(e)
            }
        }
    }

    /// Place every ship still missing from the player's roster at random.
    pub fn auto_place(&mut self) -> Result<(), ActionError> {
        self.require_phase(Phase::Setup, "place ships")?;
        let specs: Vec<(ShipSpec, usize)> = self
            .config
            .ships
            .iter()
            .zip(&self.placed)
            .map(|(spec, &placed)| (spec.clone(), spec.quantity.saturating_sub(placed)))
            .collect();
        opponent::place_ships(&mut self.player_board, &mut self.rng, &specs)?;
        for (placed, spec) in self.placed.iter_mut().zip(&self.config.ships) {
            *placed = spec.quantity;
        }
        Ok(())
    }

    /// Move from SETUP to BATTLE, placing the opponent's fleet.
    pub fn start_battle(&mut self) -> Result<(), ActionError> {
        self.require_phase(Phase::Setup, "start the battle")?;
        let remaining = self.ships_remaining();
        if remaining > 0 {
            return Err(ActionError::FleetIncomplete { remaining });
        }
        let board = opponent::place_fleet(&self.config, &mut self.rng)?;
        debug_assert_eq!(board.ships().len(), self.config.total_ships());
        self.opponent_board = board;
        self.phase = Phase::Battle;
        info!(
            "battle started: {} ships per side on a {}x{} board",
            self.config.total_ships(),
            self.config.board_size,
            self.config.board_size
        );
        Ok(())
    }

    /// Select the weapon used by the next attack.
    pub fn select_weapon(&mut self, kind: WeaponKind) -> Result<(), ActionError> {
        self.require_phase(Phase::Battle, "select a weapon")?;
        if self.arsenal.select(kind) {
            Ok(())
        } else {
            Err(ActionError::WeaponUnavailable(kind))
        }
    }

    /// Set the flight orientation of the missile.
    pub fn set_missile_orientation(&mut self, orientation: Orientation) -> Result<(), ActionError> {
        if self.arsenal.set_missile_orientation(orientation) {
            Ok(())
        } else {
            Err(ActionError::WeaponUnavailable(WeaponKind::Missile))
        }
    }

    /// Fire the selected weapon at `aim` on the opponent's board.
    ///
    /// The attack is rejected as a whole, with no use consumed, when any
    /// target cell was already attacked.
    pub fn fire_at(&mut self, aim: Coord) -> Result<AttackResult, ActionError> {
        self.require_phase(Phase::Battle, "fire")?;
        if self.reply_pending {
            return Err(ActionError::TurnPending);
        }
        if !self.opponent_board.in_bounds(aim) {
            return Err(ActionError::OutOfBounds);
        }
        let weapon = self.arsenal.selected();
        let targets = weapon.targets(aim, self.config.board_size);
        if targets.is_empty() {
            return Err(ActionError::OutOfBounds);
        }
        if targets.iter().any(|&cell| self.opponent_board.is_attacked(cell)) {
            debug!("rejected attack at {:?}: already attacked", aim);
            return Err(ActionError::DuplicateTarget);
        }
        self.arsenal.consume_selected();

        let mut cells = Vec::with_capacity(targets.len());
        let mut hits = 0;
        for cell in targets {
            let result = self.opponent_board.fire(cell)?;
            self.stats.player_shots += 1;
            if result.is_hit() {
                self.stats.player_hits += 1;
                hits += 1;
            }
            if let ShotResult::Sink { kind, .. } = &result {
                info!("player sank the opponent's {}", kind);
            }
            cells.push(CellReport { cell, result });
        }
        let shots = cells.len() as u32;
        debug!(
            "player fired {:?} at {:?}: {} shot(s), {} hit(s)",
            weapon.kind(),
            aim,
            shots,
            hits
        );

        if self.opponent_board.all_sunk() {
            self.finish(Side::Player);
        } else {
            self.reply_pending = true;
        }
        Ok(AttackResult {
            weapon: weapon.kind(),
            cells,
            shots,
            hits,
            winner: self.winner,
            opponent_turn_pending: self.reply_pending,
        })
    }

    /// Resolve the opponent's single-cell reply to the last attack.
    pub fn opponent_turn(&mut self) -> Result<OpponentShot, ActionError> {
        self.require_phase(Phase::Battle, "take the opponent's turn")?;
        if !self.reply_pending {
            return Err(ActionError::NoTurnPending);
        }
        let (cell, repeated) = self
            .targeter
            .next_target(&mut self.rng, self.config.board_size);
        let result = match self.player_board.fire(cell) {
            Ok(result) => result,
            Err(ActionError::DuplicateTarget) => ShotResult::Repeat,
            Err(e) => return Err(e),
        };
        self.reply_pending = false;
        self.stats.opponent_shots += 1;
        if result.is_hit() {
            self.stats.opponent_hits += 1;
        }
        if let ShotResult::Sink { kind, .. } = &result {
            info!("opponent sank the player's {}", kind);
        }
        debug!("opponent fired at {:?}: {:?}", cell, result);

        if self.player_board.all_sunk() {
            self.finish(Side::Opponent);
        }
        Ok(OpponentShot {
            cell,
            result,
            repeated,
            winner: self.winner,
        })
    }

    /// Fire at `aim` and, if the match continues, let the opponent reply.
    pub fn play_turn(&mut self, aim: Coord) -> Result<TurnReport, ActionError> {
        let attack = self.fire_at(aim)?;
        let reply = if attack.opponent_turn_pending {
            Some(self.opponent_turn()?)
        } else {
            None
        };
        Ok(TurnReport { attack, reply })
    }

    fn finish(&mut self, winner: Side) {
        self.phase = Phase::End;
        self.winner = Some(winner);
        self.reply_pending = false;
        let entry = HistoryEntry {
            date: history::now_string(),
            winner,
            player_hits: self.stats.player_hits,
            opponent_hits: self.stats.opponent_hits,
            duration_secs: self.stats.elapsed_secs(),
        };
        info!(
            "match over, winner: {} (player hits {}, opponent hits {}, {}s)",
            winner, entry.player_hits, entry.opponent_hits, entry.duration_secs
        );
        if let Err(e) = history::record_match(&mut self.store, &self.config.history_key, entry) {
            error!("failed to save match history: {:#}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine(config: GameConfig) -> MatchEngine {
        MatchEngine::with_seed(config, MemoryHistoryStore::new(), 11).unwrap()
    }

    fn place_classic(engine: &mut MatchEngine) {
        // One ship per row, all anchored at column 0.
        let mut row = 0;
        for (i, spec) in GameConfig::classic().ships.iter().enumerate() {
            for _ in 0..spec.quantity {
                engine.place_ship(i, (row, 0), Orientation::Horizontal).unwrap();
                row += 2;
            }
        }
    }

    #[test]
    fn start_requires_full_roster() {
        let mut engine = engine(GameConfig::classic());
        assert!(!engine.can_start_battle());
        engine.place_ship(0, (0, 0), Orientation::Horizontal).unwrap();
        assert_eq!(
            engine.start_battle().unwrap_err(),
            ActionError::FleetIncomplete { remaining: 4 }
        );
        assert_eq!(engine.phase(), Phase::Setup);
    }

    #[test]
    fn roster_counter_limits_placements() {
        let mut engine = engine(GameConfig::classic());
        engine.place_ship(2, (0, 0), Orientation::Vertical).unwrap();
        assert_eq!(engine.remaining_to_place(2), Some(1));
        engine.place_ship(2, (0, 1), Orientation::Vertical).unwrap();
        assert_eq!(engine.remaining_to_place(2), Some(0));
        assert_eq!(
            engine.place_ship(2, (0, 2), Orientation::Vertical).unwrap_err(),
            ActionError::RosterExhausted
        );
        assert_eq!(
            engine.place_ship(9, (0, 2), Orientation::Vertical).unwrap_err(),
            ActionError::UnknownShip(9)
        );
    }

    #[test]
    fn illegal_placement_leaves_counters_alone() {
        let mut engine = engine(GameConfig::classic());
        assert!(matches!(
            engine.place_ship(0, (0, 6), Orientation::Horizontal),
            Err(ActionError::InvalidPlacement(_))
        ));
        engine.place_ship(1, (0, 0), Orientation::Horizontal).unwrap();
        assert!(matches!(
            engine.place_ship(0, (0, 3), Orientation::Vertical),
            Err(ActionError::InvalidPlacement(_))
        ));
        assert_eq!(engine.remaining_to_place(0), Some(1));
        assert_eq!(engine.player_board().ships().len(), 1);
    }

    #[test]
    fn actions_outside_their_phase_are_rejected() {
        let mut engine = engine(GameConfig::war());
        assert!(matches!(
            engine.fire_at((0, 0)),
            Err(ActionError::PhaseViolation { phase: Phase::Setup, .. })
        ));
        assert!(matches!(
            engine.select_weapon(WeaponKind::Bomb),
            Err(ActionError::PhaseViolation { .. })
        ));
        assert_eq!(
            engine.opponent_turn().unwrap_err().to_string(),
            "cannot take the opponent's turn during the Setup phase"
        );
        engine.auto_place().unwrap();
        engine.start_battle().unwrap();
        assert!(matches!(
            engine.place_ship(0, (0, 0), Orientation::Horizontal),
            Err(ActionError::PhaseViolation { phase: Phase::Battle, .. })
        ));
    }

    #[test]
    fn reply_must_happen_before_next_attack() {
        let mut engine = engine(GameConfig::classic());
        place_classic(&mut engine);
        engine.start_battle().unwrap();
        assert_eq!(engine.opponent_turn().unwrap_err(), ActionError::NoTurnPending);

        let attack = engine.fire_at((0, 0)).unwrap();
        assert!(attack.opponent_turn_pending);
        assert_eq!(engine.fire_at((0, 1)).unwrap_err(), ActionError::TurnPending);
        let reply = engine.opponent_turn().unwrap();
        assert!(!reply.repeated);
        assert_eq!(engine.stats().opponent_shots, 1);
        assert!(engine.fire_at((0, 1)).is_ok());
    }

    #[test]
    fn bomb_consumes_one_use_per_activation() {
        let mut engine = engine(GameConfig::war());
        engine.auto_place().unwrap();
        engine.start_battle().unwrap();
        engine.select_weapon(WeaponKind::Bomb).unwrap();

        let first = engine.play_turn((5, 5)).unwrap();
        assert_eq!(first.attack.shots, 9);
        assert_eq!(engine.stats().player_shots, 9);
        assert_eq!(engine.arsenal().selected().uses(), Some(1));

        let second = engine.play_turn((0, 0)).unwrap();
        assert_eq!(second.attack.weapon, WeaponKind::Bomb);
        assert_eq!(second.attack.shots, 4);
        assert!(!engine.arsenal().contains(WeaponKind::Bomb));
        assert_eq!(engine.arsenal().selected_kind(), WeaponKind::Single);
        assert_eq!(
            engine.select_weapon(WeaponKind::Bomb).unwrap_err(),
            ActionError::WeaponUnavailable(WeaponKind::Bomb)
        );
    }

    #[test]
    fn overlapping_attack_is_rejected_without_cost() {
        let mut engine = engine(GameConfig::war());
        engine.auto_place().unwrap();
        engine.start_battle().unwrap();
        engine.play_turn((3, 3)).unwrap();

        engine.select_weapon(WeaponKind::Missile).unwrap();
        engine.set_missile_orientation(Orientation::Horizontal).unwrap();
        let stats = *engine.stats();
        let before = engine.opponent_board().clone();
        assert_eq!(engine.fire_at((3, 1)).unwrap_err(), ActionError::DuplicateTarget);
        assert_eq!(*engine.stats(), stats);
        assert_eq!(engine.opponent_board(), &before);
        assert_eq!(engine.arsenal().selected().uses(), Some(3));
    }

    #[test]
    fn new_game_resets_everything() {
        let mut engine = engine(GameConfig::war());
        engine.auto_place().unwrap();
        engine.start_battle().unwrap();
        engine.select_weapon(WeaponKind::Missile).unwrap();
        engine.play_turn((0, 0)).unwrap();

        engine.new_game();
        assert_eq!(engine.phase(), Phase::Setup);
        assert!(engine.player_board().ships().is_empty());
        assert!(engine.opponent_board().ships().is_empty());
        assert!(engine.opponent_shot_history().is_empty());
        assert_eq!(engine.stats().player_shots, 0);
        assert_eq!(engine.ships_remaining(), 10);
        assert_eq!(engine.arsenal().get(WeaponKind::Missile).and_then(|w| w.uses()), Some(3));
        assert_eq!(engine.winner(), None);
    }
}
