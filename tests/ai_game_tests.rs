use armada::{simulate, GameConfig, MatchEngine, MemoryHistoryStore, Phase, RandomPlayer, Side};
use rand::rngs::SmallRng;
use rand::SeedableRng;

fn run(config: GameConfig, seed: u64) -> (MatchEngine, armada::SimSummary) {
    let mut engine = MatchEngine::with_seed(config, MemoryHistoryStore::new(), seed).unwrap();
    let mut rng = SmallRng::seed_from_u64(seed + 1);
    let summary = simulate(&mut engine, &mut RandomPlayer::new(), &mut rng).unwrap();
    (engine, summary)
}

#[test]
fn test_random_classic_game_finishes() {
    let (engine, summary) = run(GameConfig::classic(), 123);
    assert_eq!(engine.phase(), Phase::End);
    let winner = summary.winner.unwrap();
    match winner {
        Side::Player => assert_eq!(summary.player_hits, 17),
        Side::Opponent => assert_eq!(summary.opponent_hits, 17),
    }
    assert!(summary.turns <= 100);
    assert_eq!(summary.player_shots, summary.turns);
    let history = engine.history().unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].winner, winner);
}

#[test]
fn test_random_war_game_finishes() {
    let (engine, summary) = run(GameConfig::war(), 321);
    assert_eq!(engine.phase(), Phase::End);
    assert!(summary.winner.is_some());
    assert!(summary.turns <= 144);
    assert!(engine.history().unwrap()[0].player_hits <= 34);
}

#[test]
fn test_same_seed_same_game() {
    let (_, first) = run(GameConfig::war(), 99);
    let (_, second) = run(GameConfig::war(), 99);
    assert_eq!(first, second);
}

#[test]
fn test_summary_json_uses_legacy_names() {
    let (_, summary) = run(GameConfig::classic(), 4);
    let v = serde_json::to_value(&summary).unwrap();
    assert!(v["winner"] == "Jugador" || v["winner"] == "PC");
    assert!(v["pcHits"].is_u64());
    assert!(v["playerShots"].is_u64());
}
