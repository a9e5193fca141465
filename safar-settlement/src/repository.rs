use async_trait::async_trait;
use safar_core::SettlementResult;
use safar_ledger::JournalEntry;
use safar_shared::Currency;
use uuid::Uuid;

use crate::models::{Booking, BookingStatus, CommissionModel};
use crate::refund::Refund;
use crate::wallet::WalletTransactionKind;

/// Booking data access. The storefront owns creation and passenger data;
/// settlement only reads bookings and moves their status.
#[async_trait]
pub trait BookingRepository: Send + Sync {
    async fn get(&self, id: Uuid) -> SettlementResult<Option<Booking>>;

    async fn set_status(&self, id: Uuid, status: BookingStatus) -> SettlementResult<()>;
}

/// Commission model lookup. Reference data, admin-managed; `create` runs the
/// configuration-time rate validation before persisting.
#[async_trait]
pub trait CommissionModelRepository: Send + Sync {
    async fn create(&self, model: &CommissionModel) -> SettlementResult<()>;

    async fn get(&self, id: Uuid) -> SettlementResult<Option<CommissionModel>>;
}

/// A wallet credit prepared ahead of time so the unit of work can apply it
/// inside its transaction.
#[derive(Debug, Clone)]
pub struct WalletCredit {
    pub user_id: Uuid,
    pub currency: Currency,
    pub amount: i64,
    pub kind: WalletTransactionKind,
    pub description: String,
}

/// Everything a completed refund has to make durable at once.
#[derive(Debug, Clone)]
pub struct RefundPayout {
    pub refund: Refund,
    pub expected_version: i64,
    pub credit: WalletCredit,
    pub reversing_entry: JournalEntry,
    pub booking_id: Uuid,
}

/// The transactional boundary for refund payout. Implementations commit the
/// refund row update, the wallet credit, the reversing journal entry and the
/// booking status flip as one durable transaction; if any write fails, none
/// of them is observable. There is no compensating-rollback path.
#[async_trait]
pub trait SettlementUnitOfWork: Send + Sync {
    async fn commit_refund_payout(&self, payout: RefundPayout) -> SettlementResult<()>;
}
