use anyhow::Context;
use mines_core::{GameConfig, RoundState, iter_coords};
use rand_chacha::ChaCha8Rng;
use serde::Serialize;

use crate::config::CliConfig;
use crate::session::Session;

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct SimulationReport {
    pub rounds: u32,
    pub wins: u32,
    pub losses: u32,
    pub staked: f64,
    pub paid: f64,
}

impl SimulationReport {
    /// Share of staked coins paid back.
    pub fn return_to_player(&self) -> f64 {
        if self.staked > 0.0 { self.paid / self.staked } else { 0.0 }
    }
}

/// Plays `rounds` rounds, each revealing tiles in row-major order until `reveals` gems are found, then cashing out.
pub async fn simulate(
    config: &CliConfig,
    game: GameConfig,
    stake: f64,
    rounds: u32,
    reveals: u16,
    entropy: ChaCha8Rng,
) -> anyhow::Result<SimulationReport> {
    let mut session = Session::new(config, game, stake, entropy)?;
    let player = config.player_account();
    session
        .round()
        .settlement()
        .ledger()
        .deposit(&player, stake * f64::from(rounds));
    let target = reveals.clamp(1, game.safe_tiles());

    let mut report = SimulationReport::default();
    for n in 0..rounds {
        let round = session.round_mut();
        if n > 0 {
            round.restart()?;
        }
        round.request_stake(stake).await.context("Stake failed")?;
        report.rounds += 1;
        report.staked += stake;

        for coords in iter_coords(game.grid_size) {
            if round.snapshot().revealed_safe_count >= target {
                break;
            }
            if round.click_tile(coords).await?.ends_round() {
                break;
            }
        }

        match round.state() {
            RoundState::Lost => report.losses += 1,
            RoundState::Won => {
                // cleared boards already paid inside click_tile
                report.wins += 1;
                report.paid += round.snapshot().potential_reward;
            }
            _ => {
                let receipt = round.cash_out().await?;
                report.wins += 1;
                report.paid += receipt.amount;
            }
        }
        log::trace!("Round {} finished {}", n, round.state());
    }

    log::info!(
        "Simulated {} rounds: {} won, {} lost, RTP {:.4}",
        report.rounds,
        report.wins,
        report.losses,
        report.return_to_player()
    );
    Ok(report)
}
