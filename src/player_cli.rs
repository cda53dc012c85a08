//! Interactive terminal session driving a [`MatchEngine`].

use std::io::{BufRead, Write};

use crate::common::{Coord, Orientation};
use crate::game::{MatchEngine, Phase};
use crate::history::HistoryStore;
use crate::ui;
use crate::weapon::WeaponKind;

/// A parsed line of player input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `place <roster#> <cell> <h|v>`; roster numbers are 1-based.
    Place {
        roster_index: usize,
        anchor: Coord,
        orientation: Orientation,
    },
    Auto,
    Start,
    Weapon(WeaponKind),
    Orient(Orientation),
    Fire(Coord),
    NewGame,
    History,
    Show,
    Help,
    Quit,
}

const HELP: &str = "\
Commands:
  place <n> <cell> <h|v>   place one ship of roster entry n (e.g. place 1 A1 h)
  auto                     place the remaining ships at random
  start                    start the battle once every ship is placed
  weapon <single|bomb|missile>
  orient <h|v>             missile direction
  fire <cell>              attack the enemy board (e.g. fire C7); a bare cell also fires
  show                     redraw the boards
  new                      start a new game
  history                  list recent matches
  quit
";

fn parse_orientation(word: &str) -> Option<Orientation> {
    match word.to_ascii_lowercase().as_str() {
        "h" | "horizontal" => Some(Orientation::Horizontal),
        "v" | "vertical" => Some(Orientation::Vertical),
        _ => None,
    }
}

fn parse_weapon(word: &str) -> Option<WeaponKind> {
    match word.to_ascii_lowercase().as_str() {
        "single" | "shot" | "s" => Some(WeaponKind::Single),
        "bomb" | "b" => Some(WeaponKind::Bomb),
        "missile" | "m" => Some(WeaponKind::Missile),
        _ => None,
    }
}

/// Parse one line of input. Returns `None` when it is not a valid command.
pub fn parse_command(line: &str) -> Option<Command> {
    let mut parts = line.split_whitespace();
    let head = parts.next()?.to_ascii_lowercase();
    let command = match head.as_str() {
        "place" | "p" => {
            let n: usize = parts.next()?.parse().ok()?;
            let anchor = ui::parse_coord(parts.next()?)?;
            let orientation = parts
                .next()
                .map(parse_orientation)
                .unwrap_or(Some(Orientation::Horizontal))?;
            Command::Place {
                roster_index: n.checked_sub(1)?,
                anchor,
                orientation,
            }
        }
        "auto" => Command::Auto,
        "start" => Command::Start,
        "weapon" | "w" => Command::Weapon(parse_weapon(parts.next()?)?),
        "orient" | "o" => Command::Orient(parse_orientation(parts.next()?)?),
        "fire" | "f" => Command::Fire(ui::parse_coord(parts.next()?)?),
        "new" => Command::NewGame,
        "history" => Command::History,
        "show" => Command::Show,
        "help" | "?" => Command::Help,
        "quit" | "exit" | "q" => Command::Quit,
        _ => Command::Fire(ui::parse_coord(&head)?),
    };
    if parts.next().is_some() {
        return None;
    }
    Some(command)
}

fn print_roster<S: HistoryStore, W: Write>(
    engine: &MatchEngine<S>,
    out: &mut W,
) -> std::io::Result<()> {
    for (i, spec) in engine.config().ships.iter().enumerate() {
        writeln!(
            out,
            "  {}. {} (size {}) - {} left",
            i + 1,
            spec.name,
            spec.size,
            engine.remaining_to_place(i).unwrap_or(0)
        )?;
    }
    Ok(())
}

fn print_boards<S: HistoryStore, W: Write>(
    engine: &MatchEngine<S>,
    out: &mut W,
) -> std::io::Result<()> {
    if engine.phase() != Phase::Setup {
        writeln!(out, "Enemy board:")?;
        write!(out, "{}", ui::render_target_board(engine.opponent_board()))?;
        writeln!(out, "Weapons: {}", ui::render_arsenal(engine.arsenal()))?;
    }
    writeln!(out, "Your board:")?;
    write!(out, "{}", ui::render_own_board(engine.player_board()))?;
    if engine.phase() == Phase::Setup {
        print_roster(engine, out)?;
    }
    Ok(())
}

/// Run commands from `input` until `quit` or end of input.
pub fn run_session<S, R, W>(
    engine: &mut MatchEngine<S>,
    input: R,
    out: &mut W,
) -> anyhow::Result<()>
where
    S: HistoryStore,
    R: BufRead,
    W: Write,
{
    write!(out, "{}", HELP)?;
    print_boards(engine, out)?;
    for line in input.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let Some(command) = parse_command(&line) else {
            writeln!(out, "Unrecognized command, type `help`.")?;
            continue;
        };
        let outcome = match command {
            Command::Quit => break,
            Command::Help => {
                write!(out, "{}", HELP)?;
                Ok(())
            }
            Command::Show => Ok(()),
            Command::History => {
                match engine.history() {
                    Ok(entries) => write!(out, "{}", ui::render_history(&entries))?,
                    Err(e) => writeln!(out, "Could not read history: {:#}", e)?,
                }
                continue;
            }
            Command::NewGame => {
                engine.new_game();
                Ok(())
            }
            Command::Place {
                roster_index,
                anchor,
                orientation,
            } => engine
                .place_ship(roster_index, anchor, orientation)
                .map(|_| ()),
            Command::Auto => engine.auto_place(),
            Command::Start => match engine.start_battle() {
                Ok(()) => {
                    writeln!(out, "The battle has begun.")?;
                    Ok(())
                }
                Err(e) => Err(e),
            },
            Command::Weapon(kind) => engine.select_weapon(kind),
            Command::Orient(orientation) => engine.set_missile_orientation(orientation),
            Command::Fire(aim) => match engine.play_turn(aim) {
                Ok(turn) => {
                    writeln!(out, "{}", ui::describe_attack(&turn.attack))?;
                    if let Some(reply) = &turn.reply {
                        writeln!(out, "{}", ui::describe_reply(reply))?;
                    }
                    Ok(())
                }
                Err(e) => Err(e),
            },
        };
        if let Err(e) = outcome {
            writeln!(out, "Rejected: {}", e)?;
            continue;
        }
        print_boards(engine, out)?;
        if let Some(winner) = engine.winner() {
            let stats = engine.stats();
            writeln!(
                out,
                "Game over, winner: {}. Your hits: {}, PC hits: {}. Type `new` to play again.",
                winner, stats.player_hits, stats.opponent_hits
            )?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::history::MemoryHistoryStore;

    #[test]
    fn parses_commands() {
        assert_eq!(
            parse_command("place 3 b2 v"),
            Some(Command::Place {
                roster_index: 2,
                anchor: (1, 1),
                orientation: Orientation::Vertical
            })
        );
        assert_eq!(parse_command("fire C7"), Some(Command::Fire((6, 2))));
        assert_eq!(parse_command("c7"), Some(Command::Fire((6, 2))));
        assert_eq!(parse_command("weapon bomb"), Some(Command::Weapon(WeaponKind::Bomb)));
        assert_eq!(parse_command("orient v"), Some(Command::Orient(Orientation::Vertical)));
        assert_eq!(parse_command("place 0 A1 h"), None);
        assert_eq!(parse_command("fire C7 now"), None);
        assert_eq!(parse_command("dance"), None);
    }

    /// Accepts writes until one contains `needle`.
    struct FailingOutput {
        needle: &'static str,
    }

    impl Write for FailingOutput {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            if String::from_utf8_lossy(buf).contains(self.needle) {
                Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "closed"))
            } else {
                Ok(buf.len())
            }
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn write_failures_end_the_session() {
        for needle in ["The battle has begun.", "You fired"] {
            let mut engine =
                MatchEngine::with_seed(GameConfig::classic(), MemoryHistoryStore::new(), 6)
                    .unwrap();
            let mut out = FailingOutput { needle };
            let result = run_session(&mut engine, "auto\nstart\nfire A1\n".as_bytes(), &mut out);
            assert!(result.is_err(), "write of {:?} was not reported", needle);
        }
    }

    #[test]
    fn scripted_session_reaches_battle() {
        let mut engine =
            MatchEngine::with_seed(GameConfig::classic(), MemoryHistoryStore::new(), 5).unwrap();
        let script = "place 1 A1 h\nauto\nstart\nfire J10\nfire J10\nquit\nfire A1\n";
        let mut out = Vec::new();
        run_session(&mut engine, script.as_bytes(), &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert_eq!(engine.phase(), Phase::Battle);
        assert_eq!(engine.stats().player_shots, 1);
        assert!(text.contains("The battle has begun."));
        assert!(text.contains("Rejected: one or more target cells were already attacked"));
    }
}
