use async_trait::async_trait;
use chrono::{DateTime, Utc};
use safar_core::{Actor, SettlementError, SettlementResult};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{Booking, BookingStatus};

/// Refund approval stages. A refund request passes an expert review and a
/// financial review before payment; rejection is reachable from any
/// non-terminal stage.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RefundStatus {
    PendingExpertReview,
    PendingFinancialReview,
    PendingPayment,
    Completed,
    Rejected,
}

impl RefundStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RefundStatus::PendingExpertReview => "PENDING_EXPERT_REVIEW",
            RefundStatus::PendingFinancialReview => "PENDING_FINANCIAL_REVIEW",
            RefundStatus::PendingPayment => "PENDING_PAYMENT",
            RefundStatus::Completed => "COMPLETED",
            RefundStatus::Rejected => "REJECTED",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "PENDING_EXPERT_REVIEW" => Some(RefundStatus::PendingExpertReview),
            "PENDING_FINANCIAL_REVIEW" => Some(RefundStatus::PendingFinancialReview),
            "PENDING_PAYMENT" => Some(RefundStatus::PendingPayment),
            "COMPLETED" => Some(RefundStatus::Completed),
            "REJECTED" => Some(RefundStatus::Rejected),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, RefundStatus::Completed | RefundStatus::Rejected)
    }
}

/// The single mutable record driving a refund. Never deleted; it only
/// advances through `RefundStatus` and accumulates per-stage audit fields.
/// `refund_amount` is computed once at submission and frozen.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Refund {
    pub id: Uuid,
    pub booking_id: Uuid,
    pub user_id: Uuid,
    pub requested_at: DateTime<Utc>,
    pub status: RefundStatus,
    pub original_amount: i64,
    pub penalty_amount: i64,
    pub refund_amount: i64,
    /// Optimistic concurrency counter, bumped by the repository on every
    /// successful update.
    pub version: i64,

    pub expert_reviewed_by: Option<String>,
    pub expert_reviewed_at: Option<DateTime<Utc>>,
    pub financial_reviewed_by: Option<String>,
    pub financial_reviewed_at: Option<DateTime<Utc>>,
    pub paid_by: Option<String>,
    pub paid_at: Option<DateTime<Utc>>,
    pub rejected_by: Option<String>,
    pub rejected_at: Option<DateTime<Utc>>,
    pub rejection_reason: Option<String>,
}

impl Refund {
    /// Create the request for a cancelled booking. The penalty is withheld
    /// by the agency; the remainder is what a completed workflow pays out.
    pub fn submit(booking: &Booking, original_amount: i64, penalty_amount: i64) -> SettlementResult<Self> {
        if booking.status != BookingStatus::Cancelled {
            return Err(SettlementError::InvalidTransition {
                from: booking.status.as_str().to_string(),
                to: "REFUND_REQUESTED".to_string(),
            });
        }
        if original_amount <= 0 {
            return Err(SettlementError::ValidationError(
                "refund original amount must be positive".to_string(),
            ));
        }
        if penalty_amount < 0 || penalty_amount > original_amount {
            return Err(SettlementError::ValidationError(format!(
                "penalty {penalty_amount} outside [0, {original_amount}]"
            )));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            booking_id: booking.id,
            user_id: booking.user_id,
            requested_at: Utc::now(),
            status: RefundStatus::PendingExpertReview,
            original_amount,
            penalty_amount,
            refund_amount: original_amount - penalty_amount,
            version: 0,
            expert_reviewed_by: None,
            expert_reviewed_at: None,
            financial_reviewed_by: None,
            financial_reviewed_at: None,
            paid_by: None,
            paid_at: None,
            rejected_by: None,
            rejected_at: None,
            rejection_reason: None,
        })
    }

    /// PENDING_EXPERT_REVIEW -> PENDING_FINANCIAL_REVIEW
    pub fn expert_approve(&mut self, actor: &Actor) -> SettlementResult<()> {
        self.expect(RefundStatus::PendingExpertReview, RefundStatus::PendingFinancialReview)?;
        self.status = RefundStatus::PendingFinancialReview;
        self.expert_reviewed_by = Some(actor.name.clone());
        self.expert_reviewed_at = Some(Utc::now());
        Ok(())
    }

    /// PENDING_FINANCIAL_REVIEW -> PENDING_PAYMENT
    pub fn financial_approve(&mut self, actor: &Actor) -> SettlementResult<()> {
        self.expect(RefundStatus::PendingFinancialReview, RefundStatus::PendingPayment)?;
        self.status = RefundStatus::PendingPayment;
        self.financial_reviewed_by = Some(actor.name.clone());
        self.financial_reviewed_at = Some(Utc::now());
        Ok(())
    }

    /// PENDING_PAYMENT -> COMPLETED. Only the status change happens here;
    /// the wallet credit, reversing entry and booking update are committed
    /// together with this record by the orchestrator's unit of work.
    pub fn process_payment(&mut self, actor: &Actor) -> SettlementResult<()> {
        self.expect(RefundStatus::PendingPayment, RefundStatus::Completed)?;
        self.status = RefundStatus::Completed;
        self.paid_by = Some(actor.name.clone());
        self.paid_at = Some(Utc::now());
        Ok(())
    }

    /// Any non-terminal state -> REJECTED. The reason is mandatory; no
    /// monetary side effects.
    pub fn reject(&mut self, actor: &Actor, reason: &str) -> SettlementResult<()> {
        if self.status.is_terminal() {
            return Err(SettlementError::InvalidTransition {
                from: self.status.as_str().to_string(),
                to: RefundStatus::Rejected.as_str().to_string(),
            });
        }
        if reason.trim().is_empty() {
            return Err(SettlementError::ValidationError(
                "a rejection reason is required".to_string(),
            ));
        }
        self.status = RefundStatus::Rejected;
        self.rejected_by = Some(actor.name.clone());
        self.rejected_at = Some(Utc::now());
        self.rejection_reason = Some(reason.to_string());
        Ok(())
    }

    /// Guard for the straight-line transitions. Calling a transition whose
    /// source state has already been left is an error, never a silent
    /// re-application; this is what keeps a refund from paying out twice.
    fn expect(&self, from: RefundStatus, to: RefundStatus) -> SettlementResult<()> {
        if self.status != from {
            return Err(SettlementError::InvalidTransition {
                from: self.status.as_str().to_string(),
                to: to.as_str().to_string(),
            });
        }
        Ok(())
    }
}

/// Refund storage port with an optimistic version check: `update_if_version`
/// persists only if the stored row still carries `expected_version`, bumping
/// it by one, so two admins cannot both advance the same refund.
#[async_trait]
pub trait RefundRepository: Send + Sync {
    async fn create(&self, refund: &Refund) -> SettlementResult<()>;

    async fn get(&self, id: Uuid) -> SettlementResult<Option<Refund>>;

    async fn update_if_version(&self, refund: &Refund, expected_version: i64) -> SettlementResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use safar_shared::Currency;

    fn cancelled_booking() -> Booking {
        Booking {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            flight_id: Uuid::new_v4(),
            flight_creator_id: Uuid::new_v4(),
            commission_model_id: None,
            base_price: 47_000_000,
            taxes: 500_000,
            passenger_count: 1,
            currency: Currency::IRR,
            status: BookingStatus::Cancelled,
            created_at: Utc::now(),
        }
    }

    fn reviewer(name: &str) -> Actor {
        Actor::admin(name)
    }

    #[test]
    fn test_submit_computes_frozen_refund_amount() {
        let refund = Refund::submit(&cancelled_booking(), 47_500_000, 4_750_000).unwrap();
        assert_eq!(refund.status, RefundStatus::PendingExpertReview);
        assert_eq!(refund.refund_amount, 42_750_000);
    }

    #[test]
    fn test_submit_requires_cancelled_booking() {
        let mut booking = cancelled_booking();
        booking.status = BookingStatus::Confirmed;
        let err = Refund::submit(&booking, 1_000, 0).unwrap_err();
        assert!(matches!(err, SettlementError::InvalidTransition { .. }));
    }

    #[test]
    fn test_submit_rejects_bad_penalty() {
        let booking = cancelled_booking();
        assert!(Refund::submit(&booking, 1_000, -1).is_err());
        assert!(Refund::submit(&booking, 1_000, 1_001).is_err());
        assert!(Refund::submit(&booking, 0, 0).is_err());
    }

    #[test]
    fn test_full_approval_walk() {
        let mut refund = Refund::submit(&cancelled_booking(), 1_000_000, 100_000).unwrap();

        refund.expert_approve(&reviewer("expert")).unwrap();
        assert_eq!(refund.status, RefundStatus::PendingFinancialReview);
        assert_eq!(refund.expert_reviewed_by.as_deref(), Some("expert"));

        refund.financial_approve(&reviewer("finance")).unwrap();
        assert_eq!(refund.status, RefundStatus::PendingPayment);

        refund.process_payment(&reviewer("cashier")).unwrap();
        assert_eq!(refund.status, RefundStatus::Completed);
        assert_eq!(refund.paid_by.as_deref(), Some("cashier"));
    }

    #[test]
    fn test_transitions_reject_wrong_source_state() {
        let mut refund = Refund::submit(&cancelled_booking(), 1_000_000, 0).unwrap();

        // Cannot skip straight to financial review or payment
        assert!(matches!(
            refund.financial_approve(&reviewer("finance")),
            Err(SettlementError::InvalidTransition { .. })
        ));
        assert!(matches!(
            refund.process_payment(&reviewer("cashier")),
            Err(SettlementError::InvalidTransition { .. })
        ));

        // A second expert approval is a no-op error, not a re-application
        refund.expert_approve(&reviewer("expert")).unwrap();
        let err = refund.expert_approve(&reviewer("expert2")).unwrap_err();
        assert!(matches!(err, SettlementError::InvalidTransition { .. }));
        assert_eq!(refund.expert_reviewed_by.as_deref(), Some("expert"));
    }

    #[test]
    fn test_reject_from_each_pending_state() {
        for advance in 0..3 {
            let mut refund = Refund::submit(&cancelled_booking(), 1_000_000, 0).unwrap();
            if advance >= 1 {
                refund.expert_approve(&reviewer("expert")).unwrap();
            }
            if advance >= 2 {
                refund.financial_approve(&reviewer("finance")).unwrap();
            }
            refund.reject(&reviewer("admin"), "documents missing").unwrap();
            assert_eq!(refund.status, RefundStatus::Rejected);
            assert_eq!(refund.rejection_reason.as_deref(), Some("documents missing"));
        }
    }

    #[test]
    fn test_reject_requires_reason_and_non_terminal_state() {
        let mut refund = Refund::submit(&cancelled_booking(), 1_000_000, 0).unwrap();
        assert!(matches!(
            refund.reject(&reviewer("admin"), "  "),
            Err(SettlementError::ValidationError(_))
        ));

        refund.reject(&reviewer("admin"), "fare rules").unwrap();
        assert!(matches!(
            refund.reject(&reviewer("admin"), "again"),
            Err(SettlementError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn test_status_string_roundtrip() {
        for status in [
            RefundStatus::PendingExpertReview,
            RefundStatus::PendingFinancialReview,
            RefundStatus::PendingPayment,
            RefundStatus::Completed,
            RefundStatus::Rejected,
        ] {
            assert_eq!(RefundStatus::parse(status.as_str()), Some(status));
        }
    }
}
