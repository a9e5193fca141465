use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use safar_core::{SettlementError, SettlementResult};
use safar_ledger::{AccountBalance, JournalEntry, JournalRepository};
use safar_shared::Currency;
use uuid::Uuid;

use crate::models::{Booking, BookingStatus, CommissionModel};
use crate::refund::{Refund, RefundRepository};
use crate::repository::{
    BookingRepository, CommissionModelRepository, RefundPayout, SettlementUnitOfWork,
};
use crate::wallet::{Wallet, WalletRepository, WalletTransaction, WalletTransactionKind};

#[derive(Default)]
struct Inner {
    wallets: HashMap<(Uuid, Currency), Wallet>,
    journal: Vec<JournalEntry>,
    refunds: HashMap<Uuid, Refund>,
    bookings: HashMap<Uuid, Booking>,
    commission_models: HashMap<Uuid, CommissionModel>,
}

/// All ports over one mutex-guarded map set. The single lock gives the same
/// guarantees the Postgres store gets from row locks and transactions:
/// per-wallet operations are serialized and the refund payout commits its
/// four writes with nothing observable in between. Used by the test suites
/// and by callers that want the reference semantics without a database.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_booking(&self, booking: Booking) {
        self.inner.lock().unwrap().bookings.insert(booking.id, booking);
    }

    /// Validate and store reference data, like an admin saving a model.
    pub fn insert_model(&self, model: CommissionModel) -> SettlementResult<()> {
        model.validate()?;
        self.inner
            .lock()
            .unwrap()
            .commission_models
            .insert(model.id, model);
        Ok(())
    }

    pub fn booking(&self, id: Uuid) -> Option<Booking> {
        self.inner.lock().unwrap().bookings.get(&id).cloned()
    }

    pub fn wallet(&self, user_id: Uuid, currency: Currency) -> Option<Wallet> {
        self.inner.lock().unwrap().wallets.get(&(user_id, currency)).cloned()
    }

    /// Snapshot of every journal entry, oldest first.
    pub fn journal_snapshot(&self) -> Vec<JournalEntry> {
        self.inner.lock().unwrap().journal.clone()
    }
}

fn require_positive(amount: i64) -> SettlementResult<()> {
    if amount <= 0 {
        return Err(SettlementError::ValidationError(format!(
            "wallet operation amount must be positive, got {amount}"
        )));
    }
    Ok(())
}

fn apply_credit(
    inner: &mut Inner,
    user_id: Uuid,
    currency: Currency,
    amount: i64,
    kind: WalletTransactionKind,
    description: &str,
) -> WalletTransaction {
    let wallet = inner
        .wallets
        .entry((user_id, currency))
        .or_insert_with(|| Wallet::empty(user_id, currency));
    let tx = WalletTransaction::new(amount, kind, description);
    wallet.balance += amount;
    wallet.transactions.push(tx.clone());
    tx
}

#[async_trait]
impl WalletRepository for MemoryStore {
    async fn get(&self, user_id: Uuid, currency: Currency) -> SettlementResult<Option<Wallet>> {
        Ok(self.inner.lock().unwrap().wallets.get(&(user_id, currency)).cloned())
    }

    async fn debit(
        &self,
        user_id: Uuid,
        currency: Currency,
        amount: i64,
        kind: WalletTransactionKind,
        description: &str,
    ) -> SettlementResult<WalletTransaction> {
        require_positive(amount)?;
        let mut inner = self.inner.lock().unwrap();
        let balance = inner
            .wallets
            .get(&(user_id, currency))
            .map(|w| w.balance)
            .unwrap_or(0);
        if balance < amount {
            return Err(SettlementError::InsufficientFunds { balance, requested: amount });
        }
        let wallet = inner
            .wallets
            .get_mut(&(user_id, currency))
            .expect("balance check found the wallet");
        let tx = WalletTransaction::new(-amount, kind, description);
        wallet.balance -= amount;
        wallet.transactions.push(tx.clone());
        Ok(tx)
    }

    async fn credit(
        &self,
        user_id: Uuid,
        currency: Currency,
        amount: i64,
        kind: WalletTransactionKind,
        description: &str,
    ) -> SettlementResult<WalletTransaction> {
        require_positive(amount)?;
        let mut inner = self.inner.lock().unwrap();
        Ok(apply_credit(&mut inner, user_id, currency, amount, kind, description))
    }
}

#[async_trait]
impl JournalRepository for MemoryStore {
    async fn append(&self, entry: &JournalEntry) -> SettlementResult<()> {
        self.inner.lock().unwrap().journal.push(entry.clone());
        Ok(())
    }

    async fn entries_for_user(&self, user_id: Uuid) -> SettlementResult<Vec<JournalEntry>> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .journal
            .iter()
            .filter(|e| e.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn balance_of(
        &self,
        account_code: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> SettlementResult<AccountBalance> {
        let inner = self.inner.lock().unwrap();
        let mut balance = AccountBalance {
            account_code: account_code.to_string(),
            debit_total: 0,
            credit_total: 0,
        };
        for entry in &inner.journal {
            if entry.posted_at < from || entry.posted_at > to {
                continue;
            }
            for line in &entry.transactions {
                if line.account_code == account_code {
                    balance.debit_total += line.debit;
                    balance.credit_total += line.credit;
                }
            }
        }
        Ok(balance)
    }
}

#[async_trait]
impl RefundRepository for MemoryStore {
    async fn create(&self, refund: &Refund) -> SettlementResult<()> {
        self.inner.lock().unwrap().refunds.insert(refund.id, refund.clone());
        Ok(())
    }

    async fn get(&self, id: Uuid) -> SettlementResult<Option<Refund>> {
        Ok(self.inner.lock().unwrap().refunds.get(&id).cloned())
    }

    async fn update_if_version(&self, refund: &Refund, expected_version: i64) -> SettlementResult<()> {
        let mut inner = self.inner.lock().unwrap();
        let stored = inner.refunds.get_mut(&refund.id).ok_or(SettlementError::NotFound {
            entity: "refund",
            id: refund.id.to_string(),
        })?;
        if stored.version != expected_version {
            return Err(SettlementError::Conflict {
                entity: "refund",
                id: refund.id.to_string(),
            });
        }
        let mut updated = refund.clone();
        updated.version = expected_version + 1;
        *stored = updated;
        Ok(())
    }
}

#[async_trait]
impl BookingRepository for MemoryStore {
    async fn get(&self, id: Uuid) -> SettlementResult<Option<Booking>> {
        Ok(self.inner.lock().unwrap().bookings.get(&id).cloned())
    }

    async fn set_status(&self, id: Uuid, status: BookingStatus) -> SettlementResult<()> {
        let mut inner = self.inner.lock().unwrap();
        let booking = inner.bookings.get_mut(&id).ok_or(SettlementError::NotFound {
            entity: "booking",
            id: id.to_string(),
        })?;
        booking.status = status;
        Ok(())
    }
}

#[async_trait]
impl CommissionModelRepository for MemoryStore {
    async fn create(&self, model: &CommissionModel) -> SettlementResult<()> {
        model.validate()?;
        self.inner
            .lock()
            .unwrap()
            .commission_models
            .insert(model.id, model.clone());
        Ok(())
    }

    async fn get(&self, id: Uuid) -> SettlementResult<Option<CommissionModel>> {
        Ok(self.inner.lock().unwrap().commission_models.get(&id).cloned())
    }
}

#[async_trait]
impl SettlementUnitOfWork for MemoryStore {
    async fn commit_refund_payout(&self, payout: RefundPayout) -> SettlementResult<()> {
        let mut inner = self.inner.lock().unwrap();

        // Every check runs before the first mutation so a failure leaves the
        // store untouched, matching the database transaction semantics.
        let stored_version = inner
            .refunds
            .get(&payout.refund.id)
            .ok_or(SettlementError::NotFound {
                entity: "refund",
                id: payout.refund.id.to_string(),
            })?
            .version;
        if stored_version != payout.expected_version {
            return Err(SettlementError::Conflict {
                entity: "refund",
                id: payout.refund.id.to_string(),
            });
        }
        if !inner.bookings.contains_key(&payout.booking_id) {
            return Err(SettlementError::NotFound {
                entity: "booking",
                id: payout.booking_id.to_string(),
            });
        }
        require_positive(payout.credit.amount)?;

        apply_credit(
            &mut inner,
            payout.credit.user_id,
            payout.credit.currency,
            payout.credit.amount,
            payout.credit.kind,
            &payout.credit.description,
        );
        inner.journal.push(payout.reversing_entry.clone());
        inner
            .bookings
            .get_mut(&payout.booking_id)
            .expect("checked above")
            .status = BookingStatus::Refunded;
        let mut updated = payout.refund.clone();
        updated.version = payout.expected_version + 1;
        inner.refunds.insert(updated.id, updated);
        Ok(())
    }
}
