#![no_std]

extern crate alloc;

use core::ops::RangeInclusive;
use serde::{Deserialize, Serialize};

pub use board::*;
pub use error::*;
pub use generator::*;
pub use ledger::*;
pub use memory::*;
pub use payout::*;
pub use reveal::*;
pub use rng::*;
pub use round::*;
pub use tile::*;
pub use types::*;

mod board;
mod error;
mod generator;
mod ledger;
mod memory;
mod payout;
mod reveal;
mod rng;
mod round;
mod tile;
mod types;

/// Grid size and mine count for one round.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfig {
    pub grid_size: Coord,
    pub mine_count: CellCount,
}

impl GameConfig {
    pub const MIN_GRID_SIZE: Coord = 2;
    pub const MAX_GRID_SIZE: Coord = 32;
    /// Grid sizes offered by the classic game screen.
    pub const CLASSIC_GRID_SIZES: [Coord; 6] = [3, 4, 5, 6, 7, 8];

    pub const fn new_unchecked(grid_size: Coord, mine_count: CellCount) -> Self {
        Self {
            grid_size,
            mine_count,
        }
    }

    /// Builds a config that satisfies the round rules: a grid between [`Self::MIN_GRID_SIZE`] and
    /// [`Self::MAX_GRID_SIZE`], and between one mine and 40% of the tiles.
    pub fn new(grid_size: Coord, mine_count: CellCount) -> Result<Self> {
        let config = Self::new_unchecked(grid_size, mine_count);
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.grid_size < Self::MIN_GRID_SIZE {
            return Err(GameError::config(ConfigIssue::GridTooSmall));
        }
        if self.grid_size > Self::MAX_GRID_SIZE {
            return Err(GameError::config(ConfigIssue::GridTooLarge));
        }
        if self.mine_count == 0 {
            return Err(GameError::config(ConfigIssue::NoMines));
        }
        if self.mine_count > Self::max_mines(self.grid_size) {
            return Err(GameError::config(ConfigIssue::TooManyMines));
        }
        Ok(())
    }

    /// Looser check used by board generation: any non-empty grid with at least one mine and one safe tile.
    pub fn validate_layout(&self) -> Result<()> {
        if self.grid_size == 0 {
            return Err(GameError::config(ConfigIssue::GridTooSmall));
        }
        if self.mine_count == 0 {
            return Err(GameError::config(ConfigIssue::NoMines));
        }
        if self.mine_count >= self.total_tiles() {
            return Err(GameError::config(ConfigIssue::TooManyMines));
        }
        Ok(())
    }

    pub const fn total_tiles(&self) -> CellCount {
        mult(self.grid_size, self.grid_size)
    }

    pub const fn safe_tiles(&self) -> CellCount {
        self.total_tiles().saturating_sub(self.mine_count)
    }

    /// `floor(grid_size² · 0.4)`
    pub const fn max_mines(grid_size: Coord) -> CellCount {
        (mult(grid_size, grid_size) as u32 * 2 / 5) as CellCount
    }

    pub const fn mine_options(&self) -> RangeInclusive<CellCount> {
        1..=Self::max_mines(self.grid_size)
    }

    /// Chance that a single blind pick on a fresh board is safe.
    pub fn success_rate(&self) -> f64 {
        f64::from(self.safe_tiles()) / f64::from(self.total_tiles())
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::new_unchecked(5, 3)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn max_mines_is_forty_percent_floored() {
        assert_eq!(GameConfig::max_mines(2), 1);
        assert_eq!(GameConfig::max_mines(3), 3);
        assert_eq!(GameConfig::max_mines(5), 10);
        assert_eq!(GameConfig::max_mines(7), 19);
        assert_eq!(GameConfig::max_mines(8), 25);
    }

    #[test]
    fn classic_sizes_accept_their_whole_mine_range() {
        for grid_size in GameConfig::CLASSIC_GRID_SIZES {
            let options = GameConfig::new_unchecked(grid_size, 1).mine_options();
            for mines in options {
                assert!(GameConfig::new(grid_size, mines).is_ok());
            }
        }
    }

    #[test]
    fn rejects_out_of_range_values() {
        use ConfigIssue::*;

        let issue = |grid, mines| match GameConfig::new(grid, mines) {
            Err(GameError::InvalidConfiguration(issue)) => Some(issue),
            _ => None,
        };
        assert_eq!(issue(1, 1), Some(GridTooSmall));
        assert_eq!(issue(33, 1), Some(GridTooLarge));
        assert_eq!(issue(5, 0), Some(NoMines));
        assert_eq!(issue(5, 11), Some(TooManyMines));
        assert_eq!(issue(5, 10), None);
    }

    #[test]
    fn layout_check_only_needs_a_safe_tile() {
        assert!(GameConfig::new_unchecked(3, 8).validate_layout().is_ok());
        assert!(GameConfig::new_unchecked(3, 9).validate_layout().is_err());
        assert!(GameConfig::new_unchecked(0, 1).validate_layout().is_err());
        assert!(GameConfig::new_unchecked(1, 1).validate_layout().is_err());
    }

    #[test]
    fn success_rate_matches_safe_fraction() {
        let config = GameConfig::default();
        assert_eq!(config.safe_tiles(), 22);
        assert!((config.success_rate() - 0.88).abs() < 1e-12);
    }
}
