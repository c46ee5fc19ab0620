use alloc::string::{String, ToString};
use ndarray::Array2;

use super::*;

/// Rejection-sampling generator driven by a [`SeededRng`].
///
/// Each draw picks a row and then a column with `floor(next * grid_size)`; draws that land on a mine are discarded, so
/// the layout depends only on the seed and the config.
#[derive(Clone, Debug, PartialEq)]
pub struct SeededBoardGenerator {
    seed: String,
}

impl SeededBoardGenerator {
    pub fn new(seed: impl Into<String>) -> Self {
        Self { seed: seed.into() }
    }
}

impl From<&str> for SeededBoardGenerator {
    fn from(seed: &str) -> Self {
        Self::new(seed.to_string())
    }
}

impl BoardGenerator for SeededBoardGenerator {
    fn generate(self, config: GameConfig) -> Result<Board> {
        config.validate_layout()?;

        let size = (config.grid_size, config.grid_size);
        let mut tiles: Array2<Tile> = Array2::default(size.to_nd_index());
        let mut rng = SeededRng::new(&self.seed);
        let mut mines_placed: CellCount = 0;
        let mut draws: u32 = 0;

        while mines_placed < config.mine_count {
            let row = rng.next_index(config.grid_size);
            let col = rng.next_index(config.grid_size);
            draws += 1;

            let tile = &mut tiles[(row, col).to_nd_index()];
            if !tile.is_mine() {
                *tile = Tile::hidden(TileKind::Mine);
                mines_placed += 1;
                log::trace!("Placed mine {} at {:?}", mines_placed, (row, col));
            }
        }

        log::debug!(
            "Generated {}x{} board with {} mines in {} draws",
            config.grid_size,
            config.grid_size,
            mines_placed,
            draws
        );
        Ok(Board::from_tiles(config.grid_size, tiles))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(grid_size: Coord, mine_count: CellCount) -> GameConfig {
        GameConfig::new_unchecked(grid_size, mine_count)
    }

    #[test]
    fn same_seed_same_board() {
        let a = generate_board(config(5, 3), "xyz").unwrap();
        let b = generate_board(config(5, 3), "xyz").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn places_exact_mine_count() {
        for (grid_size, mines) in [(3, 1), (5, 3), (8, 25), (3, 8)] {
            let board = generate_board(config(grid_size, mines), "count").unwrap();
            assert_eq!(board.mine_count(), mines);
            assert_eq!(board.mine_coords().len(), usize::from(mines));
            assert_eq!(board.revealed_count(), 0);
        }
    }

    #[test]
    fn seed_changes_layout() {
        let boards: alloc::vec::Vec<_> = ["a", "b", "c", "d"]
            .iter()
            .map(|seed| generate_board(config(8, 10), seed).unwrap())
            .collect();
        assert!(boards.windows(2).any(|pair| !pair[0].same_layout(&pair[1])));
    }

    #[test]
    fn rejects_impossible_configs() {
        use ConfigIssue::*;

        assert_eq!(
            generate_board(config(3, 9), "full"),
            Err(GameError::config(TooManyMines))
        );
        assert_eq!(
            generate_board(config(3, 0), "empty"),
            Err(GameError::config(NoMines))
        );
        assert_eq!(
            generate_board(config(0, 1), "none"),
            Err(GameError::config(GridTooSmall))
        );
    }

    #[test]
    fn verify_matches_only_the_committed_seed() {
        let cfg = config(5, 3);
        let board = generate_board(cfg, "commit").unwrap();
        let (played, _) = board.reveal((0, 0)).unwrap();

        assert!(verify_board(cfg, "commit", &played));
        assert!(!verify_board(config(5, 4), "commit", &played));
        assert!(!verify_board(config(3, 9), "commit", &played));
    }

    #[test]
    fn generator_matches_shorthand() {
        let generator = SeededBoardGenerator::from("abc");
        assert_eq!(
            generator.generate(config(3, 1)),
            generate_board(config(3, 1), "abc")
        );
    }
}
