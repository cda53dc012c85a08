use std::collections::HashSet;

use armada::{
    ActionError, GameConfig, MatchEngine, MemoryHistoryStore, Orientation, Phase, WeaponKind,
};
use proptest::prelude::*;
use rand::{rngs::SmallRng, Rng, SeedableRng};

fn battle_engine(config: GameConfig, seed: u64) -> MatchEngine {
    let mut engine = MatchEngine::with_seed(config, MemoryHistoryStore::new(), seed).unwrap();
    engine.auto_place().unwrap();
    engine.start_battle().unwrap();
    engine
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn opponent_never_repeats_a_cell(seed in any::<u64>()) {
        let mut engine = battle_engine(GameConfig::classic(), seed);
        let mut rng = SmallRng::seed_from_u64(seed ^ 0xA5A5);
        let mut seen = HashSet::new();
        while engine.phase() == Phase::Battle {
            let open = engine.opponent_board().untouched_cells();
            let aim = open[rng.random_range(0..open.len())];
            let turn = engine.play_turn(aim).unwrap();
            if let Some(reply) = turn.reply {
                prop_assert!(!reply.repeated);
                prop_assert!(seen.insert(reply.cell));
            }
        }
        prop_assert_eq!(seen.len() as u32, engine.stats().opponent_shots);
        prop_assert!(engine.winner().is_some());
    }

    #[test]
    fn counters_match_board_marks(seed in any::<u64>(), turns in 1..40usize) {
        let mut engine = battle_engine(GameConfig::war(), seed);
        let mut rng = SmallRng::seed_from_u64(seed.wrapping_add(3));
        for _ in 0..turns {
            if engine.phase() != Phase::Battle {
                break;
            }
            let kind = match rng.random_range(0..3) {
                0 => WeaponKind::Single,
                1 => WeaponKind::Bomb,
                _ => WeaponKind::Missile,
            };
            let _ = engine.select_weapon(kind);
            if rng.random_bool(0.5) {
                let _ = engine.set_missile_orientation(Orientation::Vertical);
            }
            let aim = (rng.random_range(0..12), rng.random_range(0..12));
            match engine.play_turn(aim) {
                Ok(_) | Err(ActionError::DuplicateTarget) => {}
                Err(e) => prop_assert!(false, "unexpected error {:?}", e),
            }
        }
        let board = engine.opponent_board();
        let attacked = 144 - board.untouched_cells().len();
        prop_assert_eq!(engine.stats().player_shots as usize, attacked);
        let hit_cells: usize = board.ships().iter().map(|s| s.hit_cells().len()).sum();
        prop_assert_eq!(engine.stats().player_hits as usize, hit_cells);
        prop_assert!(!engine.reply_pending());
    }

    #[test]
    fn rejected_attack_changes_nothing(seed in any::<u64>(), row in 0..10usize, col in 0..10usize) {
        let mut engine = battle_engine(GameConfig::classic(), seed);
        engine.play_turn((row, col)).unwrap();
        prop_assume!(engine.phase() == Phase::Battle);
        let stats = *engine.stats();
        let board = engine.opponent_board().clone();
        prop_assert_eq!(engine.fire_at((row, col)).unwrap_err(), ActionError::DuplicateTarget);
        prop_assert_eq!(*engine.stats(), stats);
        prop_assert_eq!(engine.opponent_board(), &board);
        prop_assert!(!engine.reply_pending());
    }
}
