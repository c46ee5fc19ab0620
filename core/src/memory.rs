use alloc::collections::BTreeMap;
use alloc::format;
use alloc::vec::Vec;
use core::cell::{Cell, RefCell};
use core::future::{self, Future};
use core::time::Duration;

use crate::*;

/// Ledger that keeps balances in memory and settles every transfer instantly.
#[derive(Debug, Default)]
pub struct MemoryLedger {
    balances: RefCell<BTreeMap<Account, f64>>,
    history: RefCell<Vec<TxReceipt>>,
    next_tx: Cell<u64>,
    reject_next: RefCell<Option<LedgerError>>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_balances(balances: impl IntoIterator<Item = (Account, f64)>) -> Self {
        let ledger = Self::new();
        ledger.balances.borrow_mut().extend(balances);
        ledger
    }

    pub fn deposit(&self, account: &Account, amount: f64) {
        *self.balances.borrow_mut().entry(account.clone()).or_default() += amount;
    }

    pub fn balance(&self, account: &Account) -> Option<f64> {
        self.balances.borrow().get(account).copied()
    }

    /// Makes the next transfer fail with `err` without touching balances.
    pub fn reject_next(&self, err: LedgerError) {
        *self.reject_next.borrow_mut() = Some(err);
    }

    /// Every settled transfer, oldest first.
    pub fn history(&self) -> Vec<TxReceipt> {
        self.history.borrow().clone()
    }

    fn apply(&self, amount: f64, from: &Account, to: &Account) -> LedgerResult<TxReceipt> {
        if let Some(err) = self.reject_next.borrow_mut().take() {
            return Err(err);
        }
        if !(amount.is_finite() && amount > 0.0) {
            return Err(LedgerError::InvalidAmount);
        }

        let mut balances = self.balances.borrow_mut();
        let available = *balances.get(from).ok_or(LedgerError::UnknownAccount)?;
        if !balances.contains_key(to) {
            return Err(LedgerError::UnknownAccount);
        }
        if available < amount {
            return Err(LedgerError::InsufficientFunds);
        }

        *balances.entry(from.clone()).or_default() -= amount;
        *balances.entry(to.clone()).or_default() += amount;

        let id = self.next_tx.get() + 1;
        self.next_tx.set(id);
        let receipt = TxReceipt {
            tx_id: format!("mem-{id:06}"),
            amount,
            from: from.clone(),
            to: to.clone(),
        };
        self.history.borrow_mut().push(receipt.clone());
        Ok(receipt)
    }
}

impl Ledger for MemoryLedger {
    fn transfer(
        &self,
        amount: f64,
        from: &Account,
        to: &Account,
    ) -> impl Future<Output = LedgerResult<TxReceipt>> {
        future::ready(self.apply(amount, from, to))
    }
}

/// Wallet whose connected account can be swapped at will.
#[derive(Debug, Default)]
pub struct MemoryWallet {
    account: RefCell<Option<Account>>,
}

impl MemoryWallet {
    pub fn connected(account: Account) -> Self {
        Self {
            account: RefCell::new(Some(account)),
        }
    }

    pub fn disconnected() -> Self {
        Self::default()
    }

    pub fn connect(&self, account: Account) {
        *self.account.borrow_mut() = Some(account);
    }

    pub fn disconnect(&self) {
        self.account.borrow_mut().take();
    }
}

impl WalletProvider for MemoryWallet {
    fn current_account(&self) -> Option<Account> {
        self.account.borrow().clone()
    }
}

/// Timer that never fires, for ledgers that always answer immediately.
#[derive(Copy, Clone, Debug, Default)]
pub struct NeverTimer;

impl Timer for NeverTimer {
    fn sleep(&self, _duration: Duration) -> impl Future<Output = ()> {
        future::pending()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;

    fn accounts() -> (Account, Account) {
        (Account::new("player"), Account::new("house"))
    }

    #[test]
    fn transfer_moves_funds_and_records_receipt() {
        let (player, house) = accounts();
        let ledger = MemoryLedger::with_balances([(player.clone(), 10.0), (house.clone(), 100.0)]);

        let receipt = block_on(ledger.transfer(4.0, &player, &house)).unwrap();

        assert_eq!(receipt.tx_id, "mem-000001");
        assert_eq!(ledger.balance(&player), Some(6.0));
        assert_eq!(ledger.balance(&house), Some(104.0));
        assert_eq!(ledger.history(), [receipt]);
    }

    #[test]
    fn transfer_rejects_overdraft_and_unknown_accounts() {
        let (player, house) = accounts();
        let ledger = MemoryLedger::with_balances([(player.clone(), 1.0)]);

        assert_eq!(
            block_on(ledger.transfer(0.5, &player, &house)),
            Err(LedgerError::UnknownAccount)
        );
        ledger.deposit(&house, 0.0);
        assert_eq!(
            block_on(ledger.transfer(2.0, &player, &house)),
            Err(LedgerError::InsufficientFunds)
        );
        assert_eq!(ledger.balance(&player), Some(1.0));
        assert!(ledger.history().is_empty());
    }

    #[test]
    fn scripted_rejection_is_one_shot() {
        let (player, house) = accounts();
        let ledger = MemoryLedger::with_balances([(player.clone(), 5.0), (house.clone(), 5.0)]);
        ledger.reject_next(LedgerError::Rejected("offline".into()));

        assert!(block_on(ledger.transfer(1.0, &player, &house)).is_err());
        assert!(block_on(ledger.transfer(1.0, &player, &house)).is_ok());
    }

    #[test]
    fn wallet_connects_and_disconnects() {
        let wallet = MemoryWallet::disconnected();
        assert_eq!(wallet.current_account(), None);

        wallet.connect(Account::new("alice"));
        assert_eq!(wallet.current_account(), Some(Account::new("alice")));

        wallet.disconnect();
        assert_eq!(wallet.current_account(), None);
    }
}
