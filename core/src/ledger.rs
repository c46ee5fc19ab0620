use alloc::string::String;
use core::fmt;
use core::future::Future;
use core::pin::pin;
use core::time::Duration;
use futures_util::future::{Either, select};
use serde::{Deserialize, Serialize};

use crate::*;

/// Opaque address of a funds holder on the ledger.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Account(String);

impl Account {
    pub fn new(address: impl Into<String>) -> Self {
        Self(address.into())
    }
}

impl fmt::Display for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Account {
    fn from(address: &str) -> Self {
        Self::new(address)
    }
}

/// Proof that a transfer went through.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TxReceipt {
    pub tx_id: String,
    pub amount: f64,
    pub from: Account,
    pub to: Account,
}

/// Moves funds between accounts. Calls are not assumed idempotent, so the round logic issues at most one per event.
pub trait Ledger {
    fn transfer(
        &self,
        amount: f64,
        from: &Account,
        to: &Account,
    ) -> impl Future<Output = LedgerResult<TxReceipt>>;
}

/// The account the player currently has connected, if any.
pub trait WalletProvider {
    fn current_account(&self) -> Option<Account>;
}

/// Source of deadlines for ledger calls; each host brings its own runtime's sleep.
pub trait Timer {
    fn sleep(&self, duration: Duration) -> impl Future<Output = ()>;
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SettlementConfig {
    /// Account that receives stakes and funds payouts.
    pub house: Account,
    pub ledger_timeout: Duration,
}

impl SettlementConfig {
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

    pub fn new(house: Account) -> Self {
        Self {
            house,
            ledger_timeout: Self::DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, ledger_timeout: Duration) -> Self {
        self.ledger_timeout = ledger_timeout;
        self
    }
}

impl Default for SettlementConfig {
    fn default() -> Self {
        Self::new(Account::new("house"))
    }
}

/// The collaborators a round needs to move money, bundled with the house account and the ledger deadline.
///
/// The house credential lives inside the ledger implementation; nothing here can read it.
#[derive(Debug)]
pub struct Settlement<L, W, T> {
    ledger: L,
    wallet: W,
    timer: T,
    config: SettlementConfig,
}

impl<L: Ledger, W: WalletProvider, T: Timer> Settlement<L, W, T> {
    pub fn new(ledger: L, wallet: W, timer: T, config: SettlementConfig) -> Self {
        Self {
            ledger,
            wallet,
            timer,
            config,
        }
    }

    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    pub fn wallet(&self) -> &W {
        &self.wallet
    }

    pub fn config(&self) -> &SettlementConfig {
        &self.config
    }

    pub fn house(&self) -> &Account {
        &self.config.house
    }

    pub fn player(&self) -> Option<Account> {
        self.wallet.current_account()
    }

    /// Runs one ledger transfer, giving up with [`LedgerError::Timeout`] once the configured deadline passes.
    pub async fn transfer(&self, amount: f64, from: &Account, to: &Account) -> LedgerResult<TxReceipt> {
        if !(amount.is_finite() && amount > 0.0) {
            return Err(LedgerError::InvalidAmount);
        }

        let timeout = self.config.ledger_timeout;
        let transfer = pin!(self.ledger.transfer(amount, from, to));
        let deadline = pin!(self.timer.sleep(timeout));

        match select(transfer, deadline).await {
            Either::Left((result, _)) => result,
            Either::Right(((), _)) => {
                let after_ms = timeout.as_millis() as u64;
                log::warn!("Transfer of {} from {} to {} timed out after {}ms", amount, from, to, after_ms);
                Err(LedgerError::Timeout { after_ms })
            }
        }
    }
}
