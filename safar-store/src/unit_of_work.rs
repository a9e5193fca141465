use async_trait::async_trait;
use safar_core::{SettlementError, SettlementResult};
use safar_settlement::models::BookingStatus;
use safar_settlement::repository::{RefundPayout, SettlementUnitOfWork};
use safar_settlement::wallet::WalletTransaction;
use sqlx::PgPool;
use tracing::info;

use crate::booking_repo::set_booking_status;
use crate::journal_repo::insert_entry;
use crate::refund_repo::update_refund_if_version;
use crate::wallet_repo::{insert_wallet_transaction, upsert_wallet_balance};

pub struct PgSettlementUnitOfWork {
    pool: PgPool,
}

impl PgSettlementUnitOfWork {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SettlementUnitOfWork for PgSettlementUnitOfWork {
    /// One database transaction around the refund row, the wallet credit,
    /// the reversing entry and the booking flip. A failure anywhere rolls
    /// the whole payout back; there is no compensating path to get wrong.
    async fn commit_refund_payout(&self, payout: RefundPayout) -> SettlementResult<()> {
        if payout.credit.amount <= 0 {
            return Err(SettlementError::ValidationError(format!(
                "refund payout amount must be positive, got {}",
                payout.credit.amount
            )));
        }

        let mut tx = self.pool.begin().await.map_err(SettlementError::storage)?;

        // The version check runs first: if another admin already advanced
        // this refund, nothing below executes.
        update_refund_if_version(&mut tx, &payout.refund, payout.expected_version).await?;

        upsert_wallet_balance(
            &mut tx,
            payout.credit.user_id,
            payout.credit.currency,
            payout.credit.amount,
        )
        .await?;
        let record = WalletTransaction::new(
            payout.credit.amount,
            payout.credit.kind,
            payout.credit.description.clone(),
        );
        insert_wallet_transaction(&mut tx, payout.credit.user_id, payout.credit.currency, &record)
            .await?;

        insert_entry(&mut tx, &payout.reversing_entry).await?;
        set_booking_status(&mut tx, payout.booking_id, BookingStatus::Refunded).await?;

        tx.commit().await.map_err(SettlementError::storage)?;
        info!(
            refund_id = %payout.refund.id,
            booking_id = %payout.booking_id,
            amount = payout.credit.amount,
            "refund payout committed"
        );
        Ok(())
    }
}
