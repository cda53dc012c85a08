use log::debug;
use rand::Rng;
use serde::Serialize;

use crate::common::{ActionError, Coord, Side};
use crate::game::{MatchEngine, Phase};
use crate::history::HistoryStore;

/// Automatic player that fires single shots at random unattacked cells.
pub struct RandomPlayer;

impl RandomPlayer {
    pub fn new() -> Self {
        Self
    }

    /// Pick an unattacked cell on the opponent's board, if one remains.
    pub fn select_target<S: HistoryStore, R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        engine: &MatchEngine<S>,
    ) -> Option<Coord> {
        let open = engine.opponent_board().untouched_cells();
        if open.is_empty() {
            return None;
        }
        Some(open[rng.random_range(0..open.len())])
    }
}

impl Default for RandomPlayer {
    fn default() -> Self {
        Self::new()
    }
}

/// Summary of an automatic match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimSummary {
    pub winner: Option<Side>,
    pub turns: u32,
    pub player_shots: u32,
    pub player_hits: u32,
    #[serde(rename = "pcShots")]
    pub opponent_shots: u32,
    #[serde(rename = "pcHits")]
    pub opponent_hits: u32,
}

/// Place the rest of the player's fleet at random, start the battle and let
/// `player` fire until the match ends.
pub fn simulate<S: HistoryStore, R: Rng + ?Sized>(
    engine: &mut MatchEngine<S>,
    player: &mut RandomPlayer,
    rng: &mut R,
) -> Result<SimSummary, ActionError> {
    if engine.phase() == Phase::Setup {
        engine.auto_place()?;
        engine.start_battle()?;
    }
    let mut turns = 0;
    while engine.phase() == Phase::Battle {
        let Some(aim) = player.select_target(rng, engine) else {
            break;
        };
        engine.play_turn(aim)?;
        turns += 1;
    }
    debug!("simulated match finished after {} turns", turns);
    let stats = engine.stats();
    Ok(SimSummary {
        winner: engine.winner(),
        turns,
        player_shots: stats.player_shots,
        player_hits: stats.player_hits,
        opponent_shots: stats.opponent_shots,
        opponent_hits: stats.opponent_hits,
    })
}
