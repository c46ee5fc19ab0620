use crate::*;
pub use seeded::*;

mod seeded;

pub trait BoardGenerator {
    fn generate(self, config: GameConfig) -> Result<Board>;
}

/// Generates the board a seed commits to.
pub fn generate_board(config: GameConfig, seed: &str) -> Result<Board> {
    SeededBoardGenerator::new(seed).generate(config)
}

/// Checks that `board` is exactly the layout `seed` produces for `config`.
pub fn verify_board(config: GameConfig, seed: &str, board: &Board) -> bool {
    match generate_board(config, seed) {
        Ok(expected) => expected.same_layout(board),
        Err(err) => {
            log::debug!("Cannot verify board for {:?}: {}", config, err);
            false
        }
    }
}
