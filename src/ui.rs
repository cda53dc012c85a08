//! Text rendering of boards, weapons and history for terminal front ends.

use std::fmt::Write;

use crate::board::{Board, Mark};
use crate::common::{Coord, ShotResult};
use crate::game::{AttackResult, OpponentShot};
use crate::history::HistoryEntry;
use crate::weapon::{Arsenal, Weapon};

fn column_label(col: usize) -> char {
    (b'A'..=b'Z').nth(col).map_or('?', char::from)
}

/// Format a cell as column letter plus 1-based row, e.g. `(4, 1)` → `B5`.
pub fn coord_to_string((row, col): Coord) -> String {
    format!("{}{}", column_label(col), row + 1)
}

/// Parse `B5`-style input. Returns `None` on malformed input; bounds are
/// checked by the engine.
pub fn parse_coord(input: &str) -> Option<Coord> {
    let input = input.trim();
    let mut chars = input.chars();
    let col_ch = chars.next()?.to_ascii_uppercase();
    if !col_ch.is_ascii_uppercase() {
        return None;
    }
    let col = (col_ch as u8 - b'A') as usize;
    let row: usize = chars.as_str().parse().ok()?;
    if row == 0 {
        return None;
    }
    Some((row - 1, col))
}

fn header(out: &mut String, size: usize) {
    out.push_str("   ");
    for c in 0..size {
        let _ = write!(out, " {}", column_label(c));
    }
    out.push('\n');
}

fn render(board: &Board, reveal: bool) -> String {
    let size = board.size();
    let mut out = String::new();
    header(&mut out, size);
    for r in 0..size {
        let _ = write!(out, "{:2} ", r + 1);
        for c in 0..size {
            let sunk = board
                .ship_at((r, c))
                .and_then(|id| board.ship(id))
                .is_some_and(|ship| ship.is_sunk());
            let ch = match board.mark((r, c)) {
                Mark::Hit if sunk => '#',
                Mark::Hit => 'X',
                Mark::Miss => 'o',
                Mark::Untouched if reveal && board.ship_at((r, c)).is_some() => 'S',
                Mark::Untouched => '.',
            };
            let _ = write!(out, " {}", ch);
        }
        out.push('\n');
    }
    out
}

/// The player's own board with ships revealed.
pub fn render_own_board(board: &Board) -> String {
    render(board, true)
}

/// The opponent's board as the player sees it: only hits and misses.
pub fn render_target_board(board: &Board) -> String {
    render(board, false)
}

fn weapon_label(weapon: &Weapon) -> String {
    match *weapon {
        Weapon::SingleShot => "single".to_owned(),
        Weapon::Bomb { uses } => format!("bomb ({})", uses),
        Weapon::Missile { uses, orientation } => {
            format!("missile ({}, {:?})", uses, orientation).to_lowercase()
        }
    }
}

/// One line listing the arsenal, the selected weapon marked with `*`.
pub fn render_arsenal(arsenal: &Arsenal) -> String {
    arsenal
        .weapons()
        .iter()
        .map(|w| {
            let marker = if w.kind() == arsenal.selected_kind() { "*" } else { "" };
            format!("{}{}", marker, weapon_label(w))
        })
        .collect::<Vec<_>>()
        .join("  ")
}

/// Short text for a single cell result.
pub fn describe_shot(cell: Coord, result: &ShotResult) -> String {
    let at = coord_to_string(cell);
    match result {
        ShotResult::Miss => format!("{} miss", at),
        ShotResult::Hit { .. } => format!("{} hit", at),
        ShotResult::Sink { kind, .. } => format!("{} hit, {} sunk", at, kind),
        ShotResult::Repeat => format!("{} already attacked", at),
    }
}

/// Summary of a player attack.
pub fn describe_attack(attack: &AttackResult) -> String {
    let cells = attack
        .cells
        .iter()
        .map(|report| describe_shot(report.cell, &report.result))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "You fired {:?}: {} ({} shot(s), {} hit(s))",
        attack.weapon, cells, attack.shots, attack.hits
    )
}

pub fn describe_reply(reply: &OpponentShot) -> String {
    format!("Opponent fired: {}", describe_shot(reply.cell, &reply.result))
}

/// Table of past matches, newest first.
pub fn render_history(entries: &[HistoryEntry]) -> String {
    if entries.is_empty() {
        return "No matches recorded yet.\n".to_owned();
    }
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<22} {:<8} {:>6} {:>6} {:>8}",
        "Date", "Winner", "Hits", "PC", "Seconds"
    );
    for e in entries {
        let _ = writeln!(
            out,
            "{:<22} {:<8} {:>6} {:>6} {:>8}",
            e.date,
            e.winner.to_string(),
            e.player_hits,
            e.opponent_hits,
            e.duration_secs
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ship::Ship;

    #[test]
    fn coords_round_trip_through_text() {
        assert_eq!(parse_coord("b5"), Some((4, 1)));
        assert_eq!(parse_coord(" L12 "), Some((11, 11)));
        assert_eq!(coord_to_string((4, 1)), "B5");
        assert_eq!(parse_coord("A0"), None);
        assert_eq!(parse_coord("5B"), None);
        assert_eq!(parse_coord(""), None);
    }

    #[test]
    fn columns_past_z_render_without_letters() {
        assert_eq!(coord_to_string((0, 25)), "Z1");
        assert_eq!(coord_to_string((0, 200)), "?1");
        let header = render_own_board(&Board::new(200));
        let first = header.lines().next().unwrap();
        assert!(first.contains(" Y Z ? ?"));
        assert!(first.ends_with(" ?"));
    }

    #[test]
    fn target_board_hides_ships() {
        let mut board = Board::new(3);
        board
            .place(Ship::new("Destructor", 2, vec![(0, 0), (0, 1)]).unwrap())
            .unwrap();
        board.fire((0, 0)).unwrap();
        board.fire((2, 2)).unwrap();
        assert_eq!(
            render_target_board(&board),
            "    A B C\n 1  X . .\n 2  . . .\n 3  . . o\n"
        );
        assert_eq!(
            render_own_board(&board),
            "    A B C\n 1  X S .\n 2  . . .\n 3  . . o\n"
        );
        board.fire((0, 1)).unwrap();
        assert!(render_target_board(&board).starts_with("    A B C\n 1  # # .\n"));
    }
}
