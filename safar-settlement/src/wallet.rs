use async_trait::async_trait;
use chrono::{DateTime, Utc};
use safar_core::SettlementResult;
use safar_shared::Currency;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WalletTransactionKind {
    BookingPayment,
    Refund,
    CommissionPayout,
    ManualCharge,
}

impl WalletTransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            WalletTransactionKind::BookingPayment => "BOOKING_PAYMENT",
            WalletTransactionKind::Refund => "REFUND",
            WalletTransactionKind::CommissionPayout => "COMMISSION_PAYOUT",
            WalletTransactionKind::ManualCharge => "MANUAL_CHARGE",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "BOOKING_PAYMENT" => Some(WalletTransactionKind::BookingPayment),
            "REFUND" => Some(WalletTransactionKind::Refund),
            "COMMISSION_PAYOUT" => Some(WalletTransactionKind::CommissionPayout),
            "MANUAL_CHARGE" => Some(WalletTransactionKind::ManualCharge),
            _ => None,
        }
    }
}

/// One movement on a wallet. `amount` is signed: debits are recorded
/// negative, credits positive. Records are append-only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletTransaction {
    pub id: Uuid,
    pub amount: i64,
    pub kind: WalletTransactionKind,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

impl WalletTransaction {
    pub fn new(amount: i64, kind: WalletTransactionKind, description: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            amount,
            kind,
            description: description.into(),
            created_at: Utc::now(),
        }
    }
}

/// Per-user, per-currency balance with its full movement history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Wallet {
    pub user_id: Uuid,
    pub currency: Currency,
    pub balance: i64,
    pub transactions: Vec<WalletTransaction>,
}

impl Wallet {
    pub fn empty(user_id: Uuid, currency: Currency) -> Self {
        Self {
            user_id,
            currency,
            balance: 0,
            transactions: Vec::new(),
        }
    }

    /// The wallet invariant: the balance is always the sum of the history.
    pub fn is_consistent(&self) -> bool {
        self.balance == self.transactions.iter().map(|t| t.amount).sum::<i64>()
    }
}

/// Wallet storage port. Implementations must serialize operations per
/// (user_id, currency) pair — a row lock in Postgres, a store mutex in
/// memory — so two concurrent debits cannot both pass the balance check
/// against a stale value.
#[async_trait]
pub trait WalletRepository: Send + Sync {
    async fn get(&self, user_id: Uuid, currency: Currency) -> SettlementResult<Option<Wallet>>;

    /// Atomic check-and-decrement. Fails with `InsufficientFunds` before
    /// anything is written; on success the appended transaction carries the
    /// negated amount.
    async fn debit(
        &self,
        user_id: Uuid,
        currency: Currency,
        amount: i64,
        kind: WalletTransactionKind,
        description: &str,
    ) -> SettlementResult<WalletTransaction>;

    /// Atomic increment; creates the wallet on first use. No upper bound.
    async fn credit(
        &self,
        user_id: Uuid,
        currency: Currency,
        amount: i64,
        kind: WalletTransactionKind,
        description: &str,
    ) -> SettlementResult<WalletTransaction>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wallet_consistency() {
        let mut wallet = Wallet::empty(Uuid::new_v4(), Currency::IRR);
        assert!(wallet.is_consistent());

        wallet.transactions.push(WalletTransaction::new(
            1_000_000,
            WalletTransactionKind::ManualCharge,
            "top up",
        ));
        wallet.balance = 1_000_000;
        assert!(wallet.is_consistent());

        wallet.balance = 999_999;
        assert!(!wallet.is_consistent());
    }

    #[test]
    fn test_kind_string_roundtrip() {
        for kind in [
            WalletTransactionKind::BookingPayment,
            WalletTransactionKind::Refund,
            WalletTransactionKind::CommissionPayout,
            WalletTransactionKind::ManualCharge,
        ] {
            assert_eq!(WalletTransactionKind::parse(kind.as_str()), Some(kind));
        }
        assert_eq!(WalletTransactionKind::parse("TRANSFER"), None);
    }
}
