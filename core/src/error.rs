use alloc::string::String;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{Action, RoundState};

/// Which configuration rule a rejected value broke.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ConfigIssue {
    GridTooSmall,
    GridTooLarge,
    NoMines,
    TooManyMines,
    InvalidStake,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum GameError {
    #[error("Invalid configuration: {0:?}")]
    InvalidConfiguration(ConfigIssue),
    #[error("Invalid coordinates")]
    InvalidCoords,
    #[error("No wallet connected")]
    NoWalletConnected,
    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),
    #[error("Cannot {action} while the round is {from}")]
    InvalidTransition { from: RoundState, action: Action },
    #[error("A stake transfer is already in flight")]
    StakeInFlight,
    #[error("A payout transfer is already in flight")]
    PayoutInFlight,
    #[error("Grid size and mine count are locked while playing")]
    ConfigLocked,
    #[error("No payout is owed for this round")]
    PayoutNotDue,
    #[error("The won round's payout has not been collected yet")]
    PayoutOwed,
}

impl GameError {
    pub const fn config(issue: ConfigIssue) -> Self {
        Self::InvalidConfiguration(issue)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LedgerError {
    #[error("Transfer rejected: {0}")]
    Rejected(String),
    #[error("Insufficient funds")]
    InsufficientFunds,
    #[error("Unknown account")]
    UnknownAccount,
    #[error("Transfer amount must be positive")]
    InvalidAmount,
    #[error("Ledger did not answer within {after_ms}ms")]
    Timeout { after_ms: u64 },
}

pub type Result<T> = core::result::Result<T, GameError>;

pub type LedgerResult<T> = core::result::Result<T, LedgerError>;
