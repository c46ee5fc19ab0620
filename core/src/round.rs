use alloc::string::String;
use core::fmt;
use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::*;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoundState {
    Waiting,
    Playing,
    Won,
    Lost,
}

impl RoundState {
    pub const fn is_waiting(self) -> bool {
        matches!(self, Self::Waiting)
    }

    pub const fn is_playing(self) -> bool {
        matches!(self, Self::Playing)
    }

    pub const fn is_finished(self) -> bool {
        matches!(self, Self::Won | Self::Lost)
    }
}

impl Default for RoundState {
    fn default() -> Self {
        Self::Waiting
    }
}

impl fmt::Display for RoundState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Waiting => "waiting",
            Self::Playing => "playing",
            Self::Won => "won",
            Self::Lost => "lost",
        })
    }
}

/// Player-facing operations, used to describe rejected transitions.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    SetStake,
    Stake,
    Reveal,
    CashOut,
    Payout,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::SetStake => "change the stake",
            Self::Stake => "place a stake",
            Self::Reveal => "reveal a tile",
            Self::CashOut => "cash out",
            Self::Payout => "collect a payout",
        })
    }
}

/// Whether a new round still needs its stake transferred.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum StakeMode {
    /// Round opens in `Waiting` until [`RoundController::request_stake`] succeeds.
    Unstaked,
    /// The stake was confirmed together with the round start, so it opens in `Playing`.
    PreConfirmed,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum PayoutStatus {
    NotDue,
    Due,
    Pending,
    Paid(TxReceipt),
    /// The last attempt failed; the round stays won and the payout can be retried.
    Unresolved(LedgerError),
}

impl PayoutStatus {
    pub const fn is_owed(&self) -> bool {
        matches!(self, Self::Due | Self::Unresolved(_))
    }
}

/// A transfer the round wants the ledger to perform.
#[derive(Clone, Debug, PartialEq)]
pub struct TransferRequest {
    pub amount: f64,
    pub from: Account,
    pub to: Account,
}

/// Everything about the live round. Replaced wholesale when a new round starts.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RoundSnapshot {
    pub config: GameConfig,
    pub board: Board,
    pub state: RoundState,
    pub revealed_safe_count: CellCount,
    pub multiplier: f64,
    pub stake: f64,
    pub potential_reward: f64,
    /// Seed the board was generated from, shown to the player as the round's commitment.
    pub seed_hash: String,
}

impl RoundSnapshot {
    fn new(config: GameConfig, seed_hash: String, stake: f64, state: RoundState) -> Result<Self> {
        let board = generate_board(config, &seed_hash)?;
        Ok(Self {
            config,
            board,
            state,
            revealed_safe_count: 0,
            multiplier: 1.0,
            stake,
            potential_reward: stake,
            seed_hash,
        })
    }

    /// Whether the board this round shows is the one its seed commits to.
    pub fn verify(&self) -> bool {
        verify_board(self.config, &self.seed_hash, &self.board)
    }
}

/// Owns the live round and is the only thing allowed to move it between states.
///
/// Every transition is one call against the current snapshot. Ledger interactions come in two flavours: the `async`
/// methods ([`Self::request_stake`], [`Self::click_tile`], [`Self::cash_out`], [`Self::settle_payout`]) drive the
/// transfer through the [`Settlement`] themselves, while the `begin_*`/`complete_*` pairs let an event-loop host run
/// the transfer and report back. Between a `begin_*` and its `complete_*` the round refuses anything that could race
/// the transfer.
pub struct RoundController<L, W, T, E> {
    settlement: Settlement<L, W, T>,
    entropy: E,
    snapshot: RoundSnapshot,
    stake_in_flight: Option<TransferRequest>,
    payout: PayoutStatus,
    player: Option<Account>,
}

impl<L: Ledger, W: WalletProvider, T: Timer, E: RngCore> RoundController<L, W, T, E> {
    /// Creates a controller with a fresh round in `Waiting`.
    pub fn new(settlement: Settlement<L, W, T>, mut entropy: E, config: GameConfig, stake: f64) -> Result<Self> {
        config.validate()?;
        let stake = validate_stake(stake)?;
        let seed = fresh_seed(&mut entropy);
        let snapshot = RoundSnapshot::new(config, seed, stake, RoundState::Waiting)?;
        log::debug!("Round ready: {:?}, seed {}", config, snapshot.seed_hash);

        Ok(Self {
            settlement,
            entropy,
            snapshot,
            stake_in_flight: None,
            payout: PayoutStatus::NotDue,
            player: None,
        })
    }

    pub fn snapshot(&self) -> &RoundSnapshot {
        &self.snapshot
    }

    pub fn state(&self) -> RoundState {
        self.snapshot.state
    }

    pub fn config(&self) -> GameConfig {
        self.snapshot.config
    }

    pub fn board(&self) -> &Board {
        &self.snapshot.board
    }

    pub fn payout_status(&self) -> &PayoutStatus {
        &self.payout
    }

    pub fn is_stake_in_flight(&self) -> bool {
        self.stake_in_flight.is_some()
    }

    pub fn settlement(&self) -> &Settlement<L, W, T> {
        &self.settlement
    }

    /// Discards the current round and deals a new board under a fresh seed.
    ///
    /// Allowed from any state, but a round in `Playing` can only be restarted with its own config; its stake is
    /// forfeit. Refused while a transfer is outstanding or a won round still has its payout owed.
    pub fn start(&mut self, config: GameConfig, stake: f64, mode: StakeMode) -> Result<&RoundSnapshot> {
        self.check_idle()?;
        if self.payout.is_owed() {
            return Err(GameError::PayoutOwed);
        }
        if self.snapshot.state.is_playing() && config != self.snapshot.config {
            return Err(GameError::ConfigLocked);
        }
        config.validate()?;
        let stake = validate_stake(stake)?;

        let state = match mode {
            StakeMode::Unstaked => RoundState::Waiting,
            StakeMode::PreConfirmed => RoundState::Playing,
        };
        let seed = fresh_seed(&mut self.entropy);
        let snapshot = RoundSnapshot::new(config, seed, stake, state)?;

        if self.snapshot.state.is_playing() {
            log::warn!("Abandoning round {} in progress", self.snapshot.seed_hash);
        }
        log::debug!("Round started: {:?}, {:?}, seed {}", config, mode, snapshot.seed_hash);
        self.snapshot = snapshot;
        self.payout = PayoutStatus::NotDue;
        self.player = None;
        Ok(&self.snapshot)
    }

    /// New round with the current config and stake.
    pub fn restart(&mut self) -> Result<&RoundSnapshot> {
        self.start(self.snapshot.config, self.snapshot.stake, StakeMode::Unstaked)
    }

    /// Switches grid size or mine count, which deals a new round. Locked while playing.
    pub fn change_config(&mut self, config: GameConfig) -> Result<&RoundSnapshot> {
        if self.snapshot.state.is_playing() {
            return Err(GameError::ConfigLocked);
        }
        self.start(config, self.snapshot.stake, StakeMode::Unstaked)
    }

    /// Edits the wager before it is placed, returning the new potential reward.
    pub fn set_stake(&mut self, amount: f64) -> Result<f64> {
        let amount = validate_stake(amount)?;
        self.check_idle()?;
        self.check_state(RoundState::Waiting, Action::SetStake)?;

        self.snapshot.stake = amount;
        self.snapshot.potential_reward = potential_reward(amount, self.snapshot.multiplier);
        Ok(self.snapshot.potential_reward)
    }

    /// Validates a stake and takes the in-flight guard. The caller must report back through
    /// [`Self::complete_stake`].
    pub fn begin_stake(&mut self, amount: f64) -> Result<TransferRequest> {
        let amount = validate_stake(amount)?;
        if self.stake_in_flight.is_some() {
            return Err(GameError::StakeInFlight);
        }
        self.check_state(RoundState::Waiting, Action::Stake)?;
        let player = self.settlement.player().ok_or(GameError::NoWalletConnected)?;

        let request = TransferRequest {
            amount,
            from: player,
            to: self.settlement.house().clone(),
        };
        log::debug!("Stake of {} from {} in flight", amount, request.from);
        self.stake_in_flight = Some(request.clone());
        Ok(request)
    }

    /// Applies the ledger's answer to the outstanding stake: `Playing` on success, still `Waiting` on failure.
    pub fn complete_stake(&mut self, result: LedgerResult<TxReceipt>) -> Result<&RoundSnapshot> {
        let Some(request) = self.stake_in_flight.take() else {
            return Err(GameError::InvalidTransition {
                from: self.snapshot.state,
                action: Action::Stake,
            });
        };

        match result {
            Ok(receipt) => {
                log::debug!("Stake confirmed in {}", receipt.tx_id);
                self.snapshot.stake = request.amount;
                self.snapshot.potential_reward = potential_reward(request.amount, self.snapshot.multiplier);
                self.snapshot.state = RoundState::Playing;
                self.player = Some(request.from);
                Ok(&self.snapshot)
            }
            Err(err) => {
                log::warn!("Stake of {} failed: {}", request.amount, err);
                Err(err.into())
            }
        }
    }

    /// Moves the stake from the player to the house and starts play.
    pub async fn request_stake(&mut self, amount: f64) -> Result<&RoundSnapshot> {
        let request = self.begin_stake(amount)?;
        let result = self
            .settlement
            .transfer(request.amount, &request.from, &request.to)
            .await;
        self.complete_stake(result)
    }

    /// Reveals one tile without touching the ledger. A cleared board leaves the payout due.
    pub fn reveal_tile(&mut self, coords: Coord2) -> Result<RevealOutcome> {
        if self.stake_in_flight.is_some() {
            return Err(GameError::StakeInFlight);
        }
        self.check_state(RoundState::Playing, Action::Reveal)?;
        let coords = self.snapshot.board.validate_coords(coords)?;
        if self.snapshot.board[coords].is_revealed() {
            return Ok(RevealOutcome::NoChange);
        }

        let (board, kind) = self.snapshot.board.reveal(coords)?;
        match kind {
            TileKind::Mine => {
                self.snapshot.board = board.reveal_all_mines();
                self.snapshot.state = RoundState::Lost;
                log::debug!("Mine at {:?}, round {} lost", coords, self.snapshot.seed_hash);
                Ok(RevealOutcome::HitMine)
            }
            TileKind::Gem => {
                let config = self.snapshot.config;
                let revealed = self.snapshot.revealed_safe_count + 1;
                let multiplier = multiplier(revealed, config)?;

                self.snapshot.board = board;
                self.snapshot.revealed_safe_count = revealed;
                self.snapshot.multiplier = multiplier;
                self.snapshot.potential_reward = potential_reward(self.snapshot.stake, multiplier);
                log::debug!("Gem at {:?}, {}/{} safe, x{:.4}", coords, revealed, config.safe_tiles(), multiplier);

                if revealed == config.safe_tiles() {
                    self.win();
                    Ok(RevealOutcome::Cleared)
                } else {
                    Ok(RevealOutcome::Safe)
                }
            }
        }
    }

    /// Reveals a tile and, if that clears the board, collects the payout.
    ///
    /// A failed payout is returned as an error but the round stays won; see [`Self::payout_status`].
    pub async fn click_tile(&mut self, coords: Coord2) -> Result<RevealOutcome> {
        let outcome = self.reveal_tile(coords)?;
        if outcome == RevealOutcome::Cleared {
            self.settle_payout().await?;
        }
        Ok(outcome)
    }

    /// Ends play at the current multiplier, returning the amount now owed.
    pub fn lock_cash_out(&mut self) -> Result<f64> {
        if self.stake_in_flight.is_some() {
            return Err(GameError::StakeInFlight);
        }
        self.check_state(RoundState::Playing, Action::CashOut)?;
        self.win();
        Ok(self.snapshot.potential_reward)
    }

    /// Stops the round and collects `stake * multiplier`.
    pub async fn cash_out(&mut self) -> Result<TxReceipt> {
        self.lock_cash_out()?;
        self.settle_payout().await
    }

    /// Picks up an owed payout. The caller must report back through [`Self::complete_payout`].
    pub fn begin_payout(&mut self) -> Result<TransferRequest> {
        self.check_state(RoundState::Won, Action::Payout)?;
        match self.payout {
            PayoutStatus::Due | PayoutStatus::Unresolved(_) => {}
            PayoutStatus::Pending => return Err(GameError::PayoutInFlight),
            PayoutStatus::NotDue | PayoutStatus::Paid(_) => return Err(GameError::PayoutNotDue),
        }
        let player = self
            .player
            .clone()
            .or_else(|| self.settlement.player())
            .ok_or(GameError::NoWalletConnected)?;

        let request = TransferRequest {
            amount: self.snapshot.potential_reward,
            from: self.settlement.house().clone(),
            to: player,
        };
        log::debug!("Payout of {} to {} in flight", request.amount, request.to);
        self.payout = PayoutStatus::Pending;
        Ok(request)
    }

    /// Records the ledger's answer for the pending payout. Failure never reverts the win.
    pub fn complete_payout(&mut self, result: LedgerResult<TxReceipt>) -> Result<TxReceipt> {
        if self.payout != PayoutStatus::Pending {
            return Err(GameError::PayoutNotDue);
        }

        match result {
            Ok(receipt) => {
                log::debug!("Payout settled in {}", receipt.tx_id);
                self.payout = PayoutStatus::Paid(receipt.clone());
                Ok(receipt)
            }
            Err(err) => {
                log::warn!("Payout for round {} unresolved: {}", self.snapshot.seed_hash, err);
                self.payout = PayoutStatus::Unresolved(err.clone());
                Err(err.into())
            }
        }
    }

    /// Transfers the owed reward from the house to the player. Safe to call again after a failure.
    pub async fn settle_payout(&mut self) -> Result<TxReceipt> {
        let request = self.begin_payout()?;
        let result = self
            .settlement
            .transfer(request.amount, &request.from, &request.to)
            .await;
        self.complete_payout(result)
    }

    fn win(&mut self) {
        self.snapshot.state = RoundState::Won;
        self.payout = PayoutStatus::Due;
        log::debug!(
            "Round {} won at x{:.4}, reward {}",
            self.snapshot.seed_hash,
            self.snapshot.multiplier,
            self.snapshot.potential_reward
        );
    }

    fn check_state(&self, expected: RoundState, action: Action) -> Result<()> {
        if self.snapshot.state == expected {
            Ok(())
        } else {
            log::debug!("Rejected {:?} while {}", action, self.snapshot.state);
            Err(GameError::InvalidTransition {
                from: self.snapshot.state,
                action,
            })
        }
    }

    fn check_idle(&self) -> Result<()> {
        if self.stake_in_flight.is_some() {
            Err(GameError::StakeInFlight)
        } else if self.payout == PayoutStatus::Pending {
            Err(GameError::PayoutInFlight)
        } else {
            Ok(())
        }
    }
}
