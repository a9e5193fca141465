use std::sync::Arc;

use chrono::Utc;
use safar_core::{Actor, SettlementError, SettlementResult};
use safar_ledger::Ledger;
use safar_shared::events::{BookingSettled, RefundStatusChanged};
use safar_shared::Currency;
use tracing::{error, info};
use uuid::Uuid;

use crate::commission::CommissionCalculator;
use crate::factory::JournalEntryFactory;
use crate::models::{Booking, BookingStatus, CommissionModel};
use crate::refund::{Refund, RefundRepository};
use crate::repository::{
    BookingRepository, CommissionModelRepository, RefundPayout, SettlementUnitOfWork, WalletCredit,
};
use crate::wallet::{WalletRepository, WalletTransaction, WalletTransactionKind};

/// The façade the booking/cancellation/refund-admin handlers call. Sequences
/// wallet, factory and ledger so that the first step that can fail runs
/// before any durable write, and hands the refund payout to the unit of
/// work as one transaction.
pub struct SettlementOrchestrator {
    ledger: Arc<Ledger>,
    wallets: Arc<dyn WalletRepository>,
    refunds: Arc<dyn RefundRepository>,
    bookings: Arc<dyn BookingRepository>,
    commission_models: Arc<dyn CommissionModelRepository>,
    unit_of_work: Arc<dyn SettlementUnitOfWork>,
    factory: JournalEntryFactory,
}

impl SettlementOrchestrator {
    pub fn new(
        ledger: Arc<Ledger>,
        wallets: Arc<dyn WalletRepository>,
        refunds: Arc<dyn RefundRepository>,
        bookings: Arc<dyn BookingRepository>,
        commission_models: Arc<dyn CommissionModelRepository>,
        unit_of_work: Arc<dyn SettlementUnitOfWork>,
    ) -> Self {
        Self {
            ledger,
            wallets,
            refunds,
            bookings,
            commission_models,
            unit_of_work,
            factory: JournalEntryFactory::new(),
        }
    }

    /// Settle a booking: charge the customer's wallet, post the six-line
    /// settlement entry, confirm the booking, pay out the creator share.
    /// If the wallet debit fails nothing has been written; a ledger failure
    /// after it is a programmer/configuration error and is surfaced, never
    /// papered over.
    pub async fn settle_booking(&self, booking: &Booking) -> SettlementResult<BookingSettled> {
        if booking.status != BookingStatus::Pending {
            return Err(SettlementError::InvalidTransition {
                from: booking.status.as_str().to_string(),
                to: BookingStatus::Confirmed.as_str().to_string(),
            });
        }

        let model = self.resolve_model(booking).await?;
        let split = CommissionCalculator::compute(&model, booking.base_price, booking.passenger_count);

        // Pure steps first: the entry is built and checked before any money
        // moves.
        let entry = self.factory.for_booking_create(booking, &model)?;
        self.ledger.validate(&entry)?;

        let total = booking.total_charge();
        self.wallets
            .debit(
                booking.user_id,
                booking.currency,
                total,
                WalletTransactionKind::BookingPayment,
                &format!("Payment for booking {}", booking.id),
            )
            .await?;

        if let Err(err) = self.ledger.append(&entry).await {
            error!(booking_id = %booking.id, %err, "ledger append failed after wallet debit");
            return Err(err);
        }
        self.bookings.set_status(booking.id, BookingStatus::Confirmed).await?;

        if split.creator > 0 {
            self.wallets
                .credit(
                    booking.flight_creator_id,
                    booking.currency,
                    split.creator,
                    WalletTransactionKind::CommissionPayout,
                    &format!("Creator commission for booking {}", booking.id),
                )
                .await?;
        }

        info!(booking_id = %booking.id, total, "booking settled");
        Ok(BookingSettled::new(
            booking.id,
            booking.user_id,
            total,
            booking.currency,
            Utc::now().timestamp(),
        ))
    }

    /// Open the refund workflow for a cancelled booking.
    pub async fn submit_refund(
        &self,
        booking_id: Uuid,
        original_amount: i64,
        penalty_amount: i64,
    ) -> SettlementResult<Refund> {
        let booking = self.require_booking(booking_id).await?;
        let refund = Refund::submit(&booking, original_amount, penalty_amount)?;
        self.refunds.create(&refund).await?;
        info!(refund_id = %refund.id, booking_id = %booking_id, amount = refund.refund_amount, "refund submitted");
        Ok(refund)
    }

    pub async fn expert_approve_refund(
        &self,
        refund_id: Uuid,
        actor: &Actor,
    ) -> SettlementResult<RefundStatusChanged> {
        self.advance_refund(refund_id, actor, |refund, actor| refund.expert_approve(actor))
            .await
    }

    pub async fn financial_approve_refund(
        &self,
        refund_id: Uuid,
        actor: &Actor,
    ) -> SettlementResult<RefundStatusChanged> {
        self.advance_refund(refund_id, actor, |refund, actor| refund.financial_approve(actor))
            .await
    }

    pub async fn reject_refund(
        &self,
        refund_id: Uuid,
        actor: &Actor,
        reason: &str,
    ) -> SettlementResult<RefundStatusChanged> {
        self.advance_refund(refund_id, actor, |refund, actor| refund.reject(actor, reason))
            .await
    }

    /// PENDING_PAYMENT -> COMPLETED with its three side effects — wallet
    /// credit, reversing entry, booking marked refunded — committed together
    /// with the refund row in one unit-of-work transaction.
    pub async fn complete_refund(
        &self,
        refund_id: Uuid,
        actor: &Actor,
    ) -> SettlementResult<RefundStatusChanged> {
        let mut refund = self.require_refund(refund_id).await?;
        let expected_version = refund.version;
        let old_status = refund.status;

        refund.process_payment(actor)?;

        let booking = self.require_booking(refund.booking_id).await?;
        let model = self.resolve_model(&booking).await?;
        let reversing_entry = self.factory.for_booking_cancel_or_refund(&booking, &model)?;
        self.ledger.validate(&reversing_entry)?;

        let credit = WalletCredit {
            user_id: refund.user_id,
            currency: booking.currency,
            amount: refund.refund_amount,
            kind: WalletTransactionKind::Refund,
            description: format!("Refund payout for booking {}", booking.id),
        };

        self.unit_of_work
            .commit_refund_payout(RefundPayout {
                refund: refund.clone(),
                expected_version,
                credit,
                reversing_entry,
                booking_id: booking.id,
            })
            .await?;

        info!(refund_id = %refund.id, amount = refund.refund_amount, "refund paid out");
        Ok(RefundStatusChanged::new(
            refund.id,
            refund.booking_id,
            refund.user_id,
            old_status.as_str(),
            refund.status.as_str(),
            &actor.name,
            Utc::now().timestamp(),
        ))
    }

    /// Admin balance correction. The acting admin goes into the transaction
    /// description so the wallet history itself carries the attribution.
    pub async fn manual_adjustment(
        &self,
        user_id: Uuid,
        currency: Currency,
        amount: i64,
        actor: &Actor,
        note: &str,
    ) -> SettlementResult<WalletTransaction> {
        let description = format!("Manual adjustment by {}: {}", actor.name, note);
        if amount >= 0 {
            self.wallets
                .credit(user_id, currency, amount, WalletTransactionKind::ManualCharge, &description)
                .await
        } else {
            self.wallets
                .debit(user_id, currency, -amount, WalletTransactionKind::ManualCharge, &description)
                .await
        }
    }

    async fn advance_refund<F>(
        &self,
        refund_id: Uuid,
        actor: &Actor,
        transition: F,
    ) -> SettlementResult<RefundStatusChanged>
    where
        F: FnOnce(&mut Refund, &Actor) -> SettlementResult<()>,
    {
        let mut refund = self.require_refund(refund_id).await?;
        let expected_version = refund.version;
        let old_status = refund.status;

        transition(&mut refund, actor)?;
        self.refunds.update_if_version(&refund, expected_version).await?;

        info!(
            refund_id = %refund.id,
            from = old_status.as_str(),
            to = refund.status.as_str(),
            actor = %actor.name,
            "refund transitioned"
        );
        Ok(RefundStatusChanged::new(
            refund.id,
            refund.booking_id,
            refund.user_id,
            old_status.as_str(),
            refund.status.as_str(),
            &actor.name,
            Utc::now().timestamp(),
        ))
    }

    async fn resolve_model(&self, booking: &Booking) -> SettlementResult<CommissionModel> {
        let model_id = booking
            .commission_model_id
            .ok_or(SettlementError::NoCommissionModel(booking.id))?;
        self.commission_models
            .get(model_id)
            .await?
            .ok_or(SettlementError::NoCommissionModel(model_id))
    }

    async fn require_booking(&self, id: Uuid) -> SettlementResult<Booking> {
        self.bookings
            .get(id)
            .await?
            .ok_or(SettlementError::NotFound { entity: "booking", id: id.to_string() })
    }

    async fn require_refund(&self, id: Uuid) -> SettlementResult<Refund> {
        self.refunds
            .get(id)
            .await?
            .ok_or(SettlementError::NotFound { entity: "refund", id: id.to_string() })
    }
}
