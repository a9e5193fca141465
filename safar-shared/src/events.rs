//! Payloads handed to the storefront's notification glue (Telegram/WhatsApp).
//! This crate only produces them; delivery is the consumer's problem.

use uuid::Uuid;

use crate::currency::{format_amount, Currency};

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone)]
pub struct RefundStatusChanged {
    pub refund_id: Uuid,
    pub booking_id: Uuid,
    pub user_id: Uuid,
    pub old_status: String,
    pub new_status: String,
    pub actor: String,
    pub occurred_at: i64,
    /// Ready-to-send message text, e.g. for a Telegram bot.
    pub description: String,
}

impl RefundStatusChanged {
    pub fn new(
        refund_id: Uuid,
        booking_id: Uuid,
        user_id: Uuid,
        old_status: &str,
        new_status: &str,
        actor: &str,
        occurred_at: i64,
    ) -> Self {
        let description = format!(
            "Refund {} for booking {} moved from {} to {} by {}",
            refund_id, booking_id, old_status, new_status, actor
        );
        Self {
            refund_id,
            booking_id,
            user_id,
            old_status: old_status.to_string(),
            new_status: new_status.to_string(),
            actor: actor.to_string(),
            occurred_at,
            description,
        }
    }
}

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone)]
pub struct BookingSettled {
    pub booking_id: Uuid,
    pub user_id: Uuid,
    pub total_charged: i64,
    pub currency: Currency,
    pub occurred_at: i64,
    pub description: String,
}

impl BookingSettled {
    pub fn new(
        booking_id: Uuid,
        user_id: Uuid,
        total_charged: i64,
        currency: Currency,
        occurred_at: i64,
    ) -> Self {
        let description = format!(
            "Booking {} settled, wallet charged {}",
            booking_id,
            format_amount(total_charged, currency)
        );
        Self {
            booking_id,
            user_id,
            total_charged,
            currency,
            occurred_at,
            description,
        }
    }
}
