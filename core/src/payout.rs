use crate::*;

/// Multiplier reached once every safe tile is revealed.
pub const BASE_MULTIPLIER: f64 = 1.2;

/// Payout multiplier after `revealed_safe` gems on a board shaped like `config`.
///
/// Grows along `BASE_MULTIPLIER ^ progress` where progress is the revealed fraction of safe tiles: exactly 1.0 before
/// the first gem and exactly [`BASE_MULTIPLIER`] when the board is cleared.
pub fn multiplier(revealed_safe: CellCount, config: GameConfig) -> Result<f64> {
    let safe_tiles = config.safe_tiles();
    if safe_tiles == 0 {
        return Err(GameError::config(ConfigIssue::TooManyMines));
    }

    let progress = f64::from(revealed_safe.min(safe_tiles)) / f64::from(safe_tiles);
    Ok(1.0 + (libm::pow(BASE_MULTIPLIER, progress) - 1.0))
}

/// [`multiplier`] with loose arguments.
pub fn multiplier_for(revealed_safe: CellCount, mine_count: CellCount, grid_size: Coord) -> Result<f64> {
    multiplier(revealed_safe, GameConfig::new_unchecked(grid_size, mine_count))
}

/// `stake * multiplier`, unrounded.
pub fn potential_reward(stake: f64, multiplier: f64) -> f64 {
    stake * multiplier
}

/// Accepts only finite, strictly positive amounts.
pub fn validate_stake(amount: f64) -> Result<f64> {
    if amount.is_finite() && amount > 0.0 {
        Ok(amount)
    } else {
        Err(GameError::config(ConfigIssue::InvalidStake))
    }
}
