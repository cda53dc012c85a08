//! Weapons and the player's arsenal.
//!
//! Every weapon shares one capability, [`Weapon::targets`], which turns an
//! aim point into the set of cells the activation resolves against. Limited
//! weapons lose one use per activation and leave the arsenal at zero.

use serde::{Deserialize, Serialize};

use crate::common::{Coord, Orientation};
use crate::config::{GameConfig, BOMB_USES, MISSILE_LENGTH, MISSILE_USES};

/// Identifier of a weapon type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeaponKind {
    Single,
    Bomb,
    Missile,
}

/// A weapon with its remaining uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Weapon {
    /// One cell, unlimited uses.
    SingleShot,
    /// 3×3 block centred on the aim point.
    Bomb { uses: u32 },
    /// Three cells in a line starting at the aim point.
    Missile { uses: u32, orientation: Orientation },
}

impl Weapon {
    pub fn bomb() -> Self {
        Weapon::Bomb { uses: BOMB_USES }
    }

    pub fn missile() -> Self {
        Weapon::Missile {
            uses: MISSILE_USES,
            orientation: Orientation::Horizontal,
        }
    }

    pub fn kind(&self) -> WeaponKind {
        match self {
            Weapon::SingleShot => WeaponKind::Single,
            Weapon::Bomb { .. } => WeaponKind::Bomb,
            Weapon::Missile { .. } => WeaponKind::Missile,
        }
    }

    /// Remaining uses, `None` for unlimited weapons.
    pub fn uses(&self) -> Option<u32> {
        match *self {
            Weapon::SingleShot => None,
            Weapon::Bomb { uses } | Weapon::Missile { uses, .. } => Some(uses),
        }
    }

    /// In-bounds cells hit when aiming at `aim` on a `size`×`size` board.
    pub fn targets(&self, aim: Coord, size: usize) -> Vec<Coord> {
        let (row, col) = aim;
        match *self {
            Weapon::SingleShot => {
                if row < size && col < size {
                    vec![aim]
                } else {
                    Vec::new()
                }
            }
            Weapon::Bomb { .. } => {
                let rows = row.saturating_sub(1)..=(row + 1).min(size.saturating_sub(1));
                rows.flat_map(|r| {
                    let cols = col.saturating_sub(1)..=(col + 1).min(size.saturating_sub(1));
                    cols.map(move |c| (r, c))
                })
                .filter(|&(r, c)| r < size && c < size)
                .collect()
            }
            Weapon::Missile { orientation, .. } => {
                let (dr, dc) = orientation.step();
                (0..MISSILE_LENGTH)
                    .map(|i| (row + dr * i, col + dc * i))
                    .take_while(|&(r, c)| r < size && c < size)
                    .collect()
            }
        }
    }

    /// Spend one use. Returns `true` when the weapon is now depleted.
    fn consume(&mut self) -> bool {
        match self {
            Weapon::SingleShot => false,
            Weapon::Bomb { uses } | Weapon::Missile { uses, .. } => {
                *uses = uses.saturating_sub(1);
                *uses == 0
            }
        }
    }
}

/// Weapons available to the player plus the current selection.
///
/// `SingleShot` is always present and is the fallback selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Arsenal {
    weapons: Vec<Weapon>,
    selected: WeaponKind,
}

impl Arsenal {
    /// Arsenal for a fresh match under `config`.
    pub fn new(config: &GameConfig) -> Self {
        let mut weapons = vec![Weapon::SingleShot];
        if config.weapon_enabled(WeaponKind::Bomb) {
            weapons.push(Weapon::bomb());
        }
        if config.weapon_enabled(WeaponKind::Missile) {
            weapons.push(Weapon::missile());
        }
        Self {
            weapons,
            selected: WeaponKind::Single,
        }
    }

    pub fn weapons(&self) -> &[Weapon] {
        &self.weapons
    }

    pub fn get(&self, kind: WeaponKind) -> Option<&Weapon> {
        self.weapons.iter().find(|w| w.kind() == kind)
    }

    pub fn contains(&self, kind: WeaponKind) -> bool {
        self.get(kind).is_some()
    }

    pub fn selected_kind(&self) -> WeaponKind {
        self.selected
    }

    /// The selected weapon.
    pub fn selected(&self) -> Weapon {
        self.get(self.selected).copied().unwrap_or(Weapon::SingleShot)
    }

    /// Select `kind`; returns `false` if it is not in the arsenal.
    pub fn select(&mut self, kind: WeaponKind) -> bool {
        if self.contains(kind) {
            self.selected = kind;
            true
        } else {
            false
        }
    }

    /// Change the missile's flight orientation; `false` without a missile.
    pub fn set_missile_orientation(&mut self, orientation: Orientation) -> bool {
        for weapon in self.weapons.iter_mut() {
            if let Weapon::Missile {
                orientation: current,
                ..
            } = weapon
            {
                *current = orientation;
                return true;
            }
        }
        false
    }

    /// Consume one use of the selected weapon, removing it when depleted and
    /// falling back to `SingleShot`.
    pub(crate) fn consume_selected(&mut self) {
        let selected = self.selected;
        let Some(pos) = self.weapons.iter().position(|w| w.kind() == selected) else {
            self.selected = WeaponKind::Single;
            return;
        };
        if self.weapons[pos].consume() {
            self.weapons.remove(pos);
            self.selected = WeaponKind::Single;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bomb_clips_at_corner() {
        let targets = Weapon::bomb().targets((0, 0), 10);
        assert_eq!(targets, vec![(0, 0), (0, 1), (1, 0), (1, 1)]);
    }

    #[test]
    fn bomb_covers_nine_in_the_open() {
        assert_eq!(Weapon::bomb().targets((4, 4), 10).len(), 9);
        assert_eq!(Weapon::bomb().targets((9, 5), 10).len(), 6);
    }

    #[test]
    fn missile_clips_at_edge() {
        let horizontal = Weapon::missile();
        assert_eq!(horizontal.targets((5, 8), 10), vec![(5, 8), (5, 9)]);
        let vertical = Weapon::Missile {
            uses: 1,
            orientation: Orientation::Vertical,
        };
        assert_eq!(vertical.targets((2, 3), 10), vec![(2, 3), (3, 3), (4, 3)]);
        assert_eq!(vertical.targets((9, 3), 10), vec![(9, 3)]);
    }

    #[test]
    fn single_shot_off_board_is_empty() {
        assert!(Weapon::SingleShot.targets((10, 0), 10).is_empty());
        assert_eq!(Weapon::SingleShot.targets((3, 4), 10), vec![(3, 4)]);
    }

    #[test]
    fn depleted_weapon_falls_back_to_single() {
        let mut arsenal = Arsenal::new(&GameConfig::war());
        assert!(arsenal.select(WeaponKind::Bomb));
        arsenal.consume_selected();
        assert_eq!(arsenal.selected_kind(), WeaponKind::Bomb);
        assert_eq!(arsenal.selected().uses(), Some(1));
        arsenal.consume_selected();
        assert!(!arsenal.contains(WeaponKind::Bomb));
        assert_eq!(arsenal.selected_kind(), WeaponKind::Single);
        assert!(!arsenal.select(WeaponKind::Bomb));
    }

    #[test]
    fn classic_arsenal_only_has_single_shot() {
        let mut arsenal = Arsenal::new(&GameConfig::classic());
        assert_eq!(arsenal.weapons(), &[Weapon::SingleShot]);
        assert!(!arsenal.set_missile_orientation(Orientation::Vertical));
        arsenal.consume_selected();
        assert_eq!(arsenal.weapons().len(), 1);
    }

    #[test]
    fn missile_orientation_is_weapon_state() {
        let mut arsenal = Arsenal::new(&GameConfig::war());
        assert!(arsenal.set_missile_orientation(Orientation::Vertical));
        assert_eq!(
            arsenal.get(WeaponKind::Missile).map(|w| w.targets((0, 0), 12)),
            Some(vec![(0, 0), (1, 0), (2, 0)])
        );
    }
}
