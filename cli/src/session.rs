use anyhow::{Context, bail};
use mines_core::{
    GameConfig, GameError, MemoryLedger, MemoryWallet, RevealOutcome, RoundController, RoundState, Settlement, Timer,
};
use mines_protocol::{Command, Notice, RoundView};
use rand_chacha::ChaCha8Rng;
use std::future::Future;
use std::time::Duration;

use crate::config::CliConfig;
use crate::view;

/// Deadlines backed by the tokio clock.
#[derive(Copy, Clone, Debug, Default)]
pub struct TokioTimer;

impl Timer for TokioTimer {
    fn sleep(&self, duration: Duration) -> impl Future<Output = ()> {
        tokio::time::sleep(duration)
    }
}

pub type CliController = RoundController<MemoryLedger, MemoryWallet, TokioTimer, ChaCha8Rng>;

/// One terminal player against the in-memory ledger.
pub struct Session {
    round: CliController,
}

impl Session {
    pub fn new(config: &CliConfig, game: GameConfig, stake: f64, entropy: ChaCha8Rng) -> anyhow::Result<Self> {
        let settlement = Settlement::new(
            config.ledger(),
            MemoryWallet::connected(config.player_account()),
            TokioTimer,
            config.settlement_config(),
        );
        let round = RoundController::new(settlement, entropy, game, stake).context("Could not set up the first round")?;
        Ok(Self { round })
    }

    pub fn round(&self) -> &CliController {
        &self.round
    }

    pub fn round_mut(&mut self) -> &mut CliController {
        &mut self.round
    }

    pub fn view(&self) -> RoundView {
        view::round_view(self.round.snapshot(), self.round.payout_status())
    }

    pub fn balance(&self) -> f64 {
        let player = self.round.settlement().player();
        player
            .and_then(|account| self.round.settlement().ledger().balance(&account))
            .unwrap_or_default()
    }

    /// Applies one command. Failures come back as notices; the round is left as it was.
    pub async fn apply(&mut self, command: Command) -> Vec<Notice> {
        log::debug!("Applying {:?}", command);
        match self.dispatch(command).await {
            Ok(notices) => notices,
            Err(err) => {
                log::debug!("Command rejected: {}", err);
                vec![self.failure_notice(&err)]
            }
        }
    }

    async fn dispatch(&mut self, command: Command) -> Result<Vec<Notice>, GameError> {
        let round = &mut self.round;
        Ok(match command {
            Command::NewGame => {
                let snapshot = round.restart()?;
                vec![Notice::info(format!("New board dealt, hash {}", snapshot.seed_hash))]
            }
            Command::ChangeConfig {
                grid_size,
                mine_count,
            } => {
                let config = GameConfig::new(grid_size, mine_count)?;
                round.change_config(config)?;
                vec![Notice::info(format!(
                    "{} mine{} in a {}x{} grid",
                    mine_count,
                    if mine_count == 1 { "" } else { "s" },
                    grid_size,
                    grid_size
                ))]
            }
            Command::SetStake { amount } => {
                let reward = round.set_stake(amount)?;
                vec![Notice::info(format!("Bet {amount:.2}, potential win {reward:.2}"))]
            }
            Command::Stake { amount } => {
                round.request_stake(amount).await?;
                vec![Notice::info(format!("Stake of {amount:.2} placed, find the gems!"))]
            }
            Command::Click { row, col } => match round.click_tile((row, col)).await? {
                RevealOutcome::NoChange => vec![],
                RevealOutcome::Safe => vec![Notice::info(format!(
                    "Gem! Multiplier {:.2}x, potential win {:.2}",
                    round.snapshot().multiplier,
                    round.snapshot().potential_reward
                ))],
                RevealOutcome::HitMine => vec![Notice::failure("You hit a mine! Game over.")],
                RevealOutcome::Cleared => vec![Notice::success(format!(
                    "Board cleared! You won {:.2} coins!",
                    round.snapshot().potential_reward
                ))],
            },
            Command::CashOut => {
                let receipt = round.cash_out().await?;
                vec![Notice::success(format!(
                    "Congratulations! You've won {:.2} coins!",
                    receipt.amount
                ))]
            }
            Command::RetryPayout => {
                let receipt = round.settle_payout().await?;
                vec![Notice::success(format!("Paid {:.2} coins in {}", receipt.amount, receipt.tx_id))]
            }
        })
    }

    fn failure_notice(&self, err: &GameError) -> Notice {
        let owed = self.round.snapshot().potential_reward;
        match err {
            GameError::PayoutOwed => Notice::failure(format!(
                "Your {owed:.2} coins from the last round are still owed; type `retry` to collect them first"
            )),
            _ if self.round.state() == RoundState::Won && self.round.payout_status().is_owed() => {
                Notice::failure(format!(
                    "You won {owed:.2} coins but the payout failed ({err}); type `retry` to try again"
                ))
            }
            _ => Notice::failure(err.to_string()),
        }
    }
}

/// One line typed at the prompt.
#[derive(Clone, Debug, PartialEq)]
pub enum Input {
    Command(Command),
    Show,
    Help,
    Quit,
}

pub const HELP: &str = "\
commands:
  stake [amount]        place the stake and start playing (defaults to the current bet)
  bet <amount>          change the bet before staking
  <row> <col>           reveal a tile (also: click <row> <col>)
  cash                  cash out at the current multiplier
  retry                 retry a failed payout
  new                   deal a new board
  config <grid> <mines> change grid size and mine count
  show | help | quit
JSON commands such as {\"type\":\"click\",\"row\":0,\"col\":1} are accepted too.";

/// Parses a prompt line. `current_stake` fills in a bare `stake`.
pub fn parse_input(line: &str, current_stake: f64) -> anyhow::Result<Input> {
    let line = line.trim();
    if line.starts_with('{') {
        return Ok(Input::Command(Command::from_json(line).context("Invalid JSON command")?));
    }

    let words: Vec<&str> = line.split_whitespace().collect();
    let command = match words.as_slice() {
        [] | ["show"] => return Ok(Input::Show),
        ["help"] | ["?"] => return Ok(Input::Help),
        ["quit"] | ["exit"] | ["q"] => return Ok(Input::Quit),
        ["stake"] => Command::Stake {
            amount: current_stake,
        },
        ["stake", amount] => Command::Stake {
            amount: amount.parse().context("Stake must be a number")?,
        },
        ["bet", amount] => Command::SetStake {
            amount: amount.parse().context("Bet must be a number")?,
        },
        ["click", row, col] | [row, col] => Command::Click {
            row: row.parse().context("Row must be a tile index")?,
            col: col.parse().context("Column must be a tile index")?,
        },
        ["cash"] | ["cashout"] => Command::CashOut,
        ["retry"] => Command::RetryPayout,
        ["new"] => Command::NewGame,
        ["config", grid, mines] => Command::ChangeConfig {
            grid_size: grid.parse().context("Grid size must be a number")?,
            mine_count: mines.parse().context("Mine count must be a number")?,
        },
        _ => bail!("Unknown command `{line}`, type `help`"),
    };
    Ok(Input::Command(command))
}

#[cfg(test)]
mod tests {
    use super::*;
    use mines_core::LedgerError;
    use mines_protocol::{NoticeLevel, Phase};
    use rand::SeedableRng;

    fn session() -> Session {
        let config = CliConfig::default();
        Session::new(&config, GameConfig::default(), 1.0, ChaCha8Rng::seed_from_u64(3)).unwrap()
    }

    fn tile(session: &Session, mine: bool) -> Command {
        let (row, col) = session
            .round()
            .board()
            .iter()
            .find(|(_, tile)| tile.is_mine() == mine && !tile.is_revealed())
            .map(|(coords, _)| coords)
            .unwrap();
        Command::Click { row, col }
    }

    #[test]
    fn parses_prompt_lines() {
        assert_eq!(parse_input("", 1.0).unwrap(), Input::Show);
        assert_eq!(
            parse_input("stake", 2.5).unwrap(),
            Input::Command(Command::Stake { amount: 2.5 })
        );
        assert_eq!(
            parse_input(" 1 4 ", 1.0).unwrap(),
            Input::Command(Command::Click { row: 1, col: 4 })
        );
        assert_eq!(
            parse_input("config 6 5", 1.0).unwrap(),
            Input::Command(Command::ChangeConfig {
                grid_size: 6,
                mine_count: 5
            })
        );
        assert_eq!(
            parse_input(r#"{"type":"cash_out"}"#, 1.0).unwrap(),
            Input::Command(Command::CashOut)
        );
        assert!(parse_input("click a b", 1.0).is_err());
        assert!(parse_input("dance", 1.0).is_err());
    }

    #[tokio::test]
    async fn click_before_stake_is_a_notice() {
        let mut session = session();
        let click = tile(&session, false);

        let notices = session.apply(click).await;

        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].level, NoticeLevel::Failure);
        assert_eq!(session.view().phase, Phase::Waiting);
    }

    #[tokio::test]
    async fn stake_then_cash_out_pays_player() {
        let mut session = session();
        session.apply(Command::Stake { amount: 10.0 }).await;
        let gem = tile(&session, false);
        session.apply(gem).await;
        let owed = session.view().potential_reward;

        let notices = session.apply(Command::CashOut).await;

        assert_eq!(notices[0].level, NoticeLevel::Success);
        assert_eq!(session.view().phase, Phase::Won);
        assert!((session.balance() - (90.0 + owed)).abs() < 1e-9);
    }

    #[tokio::test]
    async fn mine_ends_round() {
        let mut session = session();
        session.apply(Command::Stake { amount: 1.0 }).await;
        let mine = tile(&session, true);

        let notices = session.apply(mine).await;

        assert_eq!(notices, [Notice::failure("You hit a mine! Game over.")]);
        assert_eq!(session.view().phase, Phase::Lost);
        assert_eq!(session.view().hidden_count(), 25 - 3);
    }

    #[tokio::test]
    async fn failed_payout_on_cleared_board_still_reports_the_win() {
        let config = CliConfig::default();
        let game = GameConfig::new(3, 1).unwrap();
        let mut session = Session::new(&config, game, 1.0, ChaCha8Rng::seed_from_u64(8)).unwrap();
        session.apply(Command::Stake { amount: 5.0 }).await;
        for _ in 1..game.safe_tiles() {
            let gem = tile(&session, false);
            session.apply(gem).await;
        }
        session
            .round()
            .settlement()
            .ledger()
            .reject_next(LedgerError::Rejected("busy".into()));

        let last = tile(&session, false);
        let notices = session.apply(last).await;

        assert_eq!(notices[0].level, NoticeLevel::Failure);
        assert!(notices[0].message.starts_with("You won 6.00 coins"));
        assert_eq!(session.view().phase, Phase::Won);
        assert_eq!(session.view().hidden_count(), 1);
    }

    #[tokio::test]
    async fn new_game_waits_for_owed_payout() {
        let mut session = session();
        session.apply(Command::Stake { amount: 10.0 }).await;
        session
            .round()
            .settlement()
            .ledger()
            .reject_next(LedgerError::Rejected("busy".into()));
        session.apply(Command::CashOut).await;

        let notices = session.apply(Command::NewGame).await;
        assert_eq!(notices[0].level, NoticeLevel::Failure);
        assert!(notices[0].message.contains("still owed"));
        assert_eq!(session.view().phase, Phase::Won);

        let notices = session.apply(Command::RetryPayout).await;
        assert_eq!(notices[0].level, NoticeLevel::Success);
        assert!((session.balance() - 100.0).abs() < 1e-9);
        let notices = session.apply(Command::NewGame).await;
        assert_eq!(notices[0].level, NoticeLevel::Info);
    }

    #[tokio::test]
    async fn config_change_is_locked_while_playing() {
        let mut session = session();
        session.apply(Command::Stake { amount: 1.0 }).await;

        let notices = session
            .apply(Command::ChangeConfig {
                grid_size: 3,
                mine_count: 1,
            })
            .await;

        assert_eq!(notices[0].level, NoticeLevel::Failure);
        assert_eq!(session.view().grid_size, 5);
    }
}
