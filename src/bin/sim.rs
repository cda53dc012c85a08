use armada::{simulate, GameConfig, MatchEngine, MemoryHistoryStore, RandomPlayer};
use rand::{rngs::SmallRng, SeedableRng};
use serde_json::json;

fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 || args.len() > 3 {
        eprintln!("Usage: {} <seed> [classic|war]", args[0]);
        std::process::exit(1);
    }
    let seed: u64 = args[1].parse()?;
    let config = match args.get(2).map(String::as_str) {
        None | Some("classic") => GameConfig::classic(),
        Some("war") => GameConfig::war(),
        Some(other) => anyhow::bail!("unknown mode {:?}", other),
    };

    let mut engine = MatchEngine::with_seed(config, MemoryHistoryStore::new(), seed)?;
    let mut rng = SmallRng::seed_from_u64(seed.wrapping_add(1));
    let summary = simulate(&mut engine, &mut RandomPlayer::new(), &mut rng)?;
    let history = engine.history()?;

    let result = json!({
        "seed": seed,
        "summary": summary,
        "winner": summary.winner.map(|w| w.to_string()),
        "history": history,
    });

    println!("{}", serde_json::to_string(&result)?);
    Ok(())
}
