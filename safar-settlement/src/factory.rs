use safar_core::SettlementResult;
use safar_ledger::{chart, JournalEntry, Transaction};

use crate::commission::CommissionCalculator;
use crate::models::{Booking, CommissionModel};

/// Builds the journal entries for booking settlement events. The factory
/// takes an already-resolved commission model; deciding what to do when a
/// booking has none is the orchestrator's policy, not defaulted here.
pub struct JournalEntryFactory;

impl JournalEntryFactory {
    pub fn new() -> Self {
        Self
    }

    /// The six-line settlement entry: the customer receivable on the debit
    /// side, the three commission shares, net ticket revenue and taxes on
    /// the credit side.
    pub fn for_booking_create(
        &self,
        booking: &Booking,
        model: &CommissionModel,
    ) -> SettlementResult<JournalEntry> {
        let split = CommissionCalculator::compute(model, booking.base_price, booking.passenger_count);
        let net_revenue = split.net_revenue(booking.base_price);

        JournalEntry::new(
            booking.user_id,
            Some(booking.id),
            format!("Settlement of booking {}", booking.id),
            vec![
                Transaction::debit(chart::ACCOUNTS_RECEIVABLE, booking.total_charge()),
                Transaction::credit(chart::CHARTER_COMMISSION_PAYABLE, split.charter),
                Transaction::credit(chart::CREATOR_COMMISSION_PAYABLE, split.creator),
                Transaction::credit(chart::WEB_SERVICE_REVENUE, split.web_service),
                Transaction::credit(chart::TICKET_SALES_REVENUE, net_revenue),
                Transaction::credit(chart::TAXES_PAYABLE, booking.taxes),
            ],
        )
    }

    /// The exact mirror of the settlement entry. Appending both leaves every
    /// touched account net zero for the booking.
    pub fn for_booking_cancel_or_refund(
        &self,
        booking: &Booking,
        model: &CommissionModel,
    ) -> SettlementResult<JournalEntry> {
        let entry = self.for_booking_create(booking, model)?;
        Ok(entry.reversed(format!("Reversal for cancelled booking {}", booking.id)))
    }
}

impl Default for JournalEntryFactory {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BookingStatus, CalculationType};
    use chrono::Utc;
    use safar_shared::Currency;
    use std::collections::HashMap;
    use uuid::Uuid;

    fn booking() -> Booking {
        Booking {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            flight_id: Uuid::new_v4(),
            flight_creator_id: Uuid::new_v4(),
            commission_model_id: None,
            // 2 adult passengers at 2,500,000 fare, 150,000 tax combined
            base_price: 5_000_000,
            taxes: 300_000,
            passenger_count: 2,
            currency: Currency::IRR,
            status: BookingStatus::Pending,
            created_at: Utc::now(),
        }
    }

    fn model() -> CommissionModel {
        CommissionModel {
            id: Uuid::new_v4(),
            name: "standard web".to_string(),
            local_name: None,
            calculation_type: CalculationType::Percentage,
            charter_rate: 5.0,
            creator_rate: 2.0,
            web_service_rate: 1.0,
        }
    }

    fn line_amount(entry: &JournalEntry, code: &str) -> (i64, i64) {
        let line = entry
            .transactions
            .iter()
            .find(|t| t.account_code == code)
            .expect("line missing");
        (line.debit, line.credit)
    }

    #[test]
    fn test_booking_create_entry_layout() {
        let entry = JournalEntryFactory::new()
            .for_booking_create(&booking(), &model())
            .unwrap();

        assert_eq!(entry.transactions.len(), 6);
        assert_eq!(line_amount(&entry, chart::ACCOUNTS_RECEIVABLE), (5_300_000, 0));
        assert_eq!(line_amount(&entry, chart::CHARTER_COMMISSION_PAYABLE), (0, 250_000));
        assert_eq!(line_amount(&entry, chart::CREATOR_COMMISSION_PAYABLE), (0, 100_000));
        assert_eq!(line_amount(&entry, chart::WEB_SERVICE_REVENUE), (0, 50_000));
        assert_eq!(line_amount(&entry, chart::TICKET_SALES_REVENUE), (0, 4_600_000));
        assert_eq!(line_amount(&entry, chart::TAXES_PAYABLE), (0, 300_000));
        assert!(entry.is_balanced());
        assert_eq!(entry.debit_total(), 5_300_000);
    }

    #[test]
    fn test_create_then_reverse_nets_to_zero_per_account() {
        let booking = booking();
        let model = model();
        let factory = JournalEntryFactory::new();

        let create = factory.for_booking_create(&booking, &model).unwrap();
        let reverse = factory.for_booking_cancel_or_refund(&booking, &model).unwrap();

        let mut net: HashMap<&str, i64> = HashMap::new();
        for line in create.transactions.iter().chain(&reverse.transactions) {
            *net.entry(line.account_code.as_str()).or_insert(0) += line.debit - line.credit;
        }
        assert!(net.values().all(|v| *v == 0), "unbalanced accounts: {net:?}");
    }

    #[test]
    fn test_entry_tagged_with_booking_and_user() {
        let booking = booking();
        let entry = JournalEntryFactory::new()
            .for_booking_create(&booking, &model())
            .unwrap();
        assert_eq!(entry.booking_id, Some(booking.id));
        assert_eq!(entry.user_id, booking.user_id);
    }

    #[test]
    fn test_zero_tax_booking_still_balances() {
        let mut booking = booking();
        booking.taxes = 0;
        let entry = JournalEntryFactory::new()
            .for_booking_create(&booking, &model())
            .unwrap();
        assert!(entry.is_balanced());
        assert_eq!(entry.debit_total(), 5_000_000);
    }
}
