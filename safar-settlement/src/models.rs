use chrono::{DateTime, Utc};
use safar_core::{SettlementError, SettlementResult};
use safar_shared::Currency;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Booking lifecycle as the settlement core sees it. The storefront owns
/// search, passenger forms and seat handling; settlement only moves a booking
/// between these states.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Cancelled,
    Refunded,
    Expired,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "PENDING",
            BookingStatus::Confirmed => "CONFIRMED",
            BookingStatus::Cancelled => "CANCELLED",
            BookingStatus::Refunded => "REFUNDED",
            BookingStatus::Expired => "EXPIRED",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "PENDING" => Some(BookingStatus::Pending),
            "CONFIRMED" => Some(BookingStatus::Confirmed),
            "CANCELLED" => Some(BookingStatus::Cancelled),
            "REFUNDED" => Some(BookingStatus::Refunded),
            "EXPIRED" => Some(BookingStatus::Expired),
            _ => None,
        }
    }
}

/// Booking record consumed from the storefront layer. `base_price` is the
/// fare total across all passengers; `taxes` comes on top of it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    pub id: Uuid,
    pub user_id: Uuid,
    pub flight_id: Uuid,
    /// Payout target for the creator commission share
    pub flight_creator_id: Uuid,
    pub commission_model_id: Option<Uuid>,
    pub base_price: i64,
    pub taxes: i64,
    pub passenger_count: u32,
    pub currency: Currency,
    pub status: BookingStatus,
    pub created_at: DateTime<Utc>,
}

impl Booking {
    /// Amount actually charged to the customer's wallet.
    pub fn total_charge(&self) -> i64 {
        self.base_price + self.taxes
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CalculationType {
    /// Rates are percentages of the base price total
    Percentage,
    /// Rates are minor-unit amounts charged per passenger
    FixedAmount,
}

impl CalculationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CalculationType::Percentage => "PERCENTAGE",
            CalculationType::FixedAmount => "FIXED_AMOUNT",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "PERCENTAGE" => Some(CalculationType::Percentage),
            "FIXED_AMOUNT" => Some(CalculationType::FixedAmount),
            _ => None,
        }
    }
}

/// Immutable reference data describing the three-way commission split.
/// Looked up by id at settlement time, never mutated mid-settlement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommissionModel {
    pub id: Uuid,
    pub name: String,
    pub local_name: Option<String>,
    pub calculation_type: CalculationType,
    pub charter_rate: f64,
    pub creator_rate: f64,
    pub web_service_rate: f64,
}

impl CommissionModel {
    /// Configuration-time guard: a percentage model whose rates sum above
    /// 100 would drive net revenue negative at settlement, so it is rejected
    /// here instead of surfacing mid-settlement.
    pub fn validate(&self) -> SettlementResult<()> {
        let rates = [self.charter_rate, self.creator_rate, self.web_service_rate];
        if rates.iter().any(|r| !r.is_finite() || *r < 0.0) {
            return Err(SettlementError::InvalidCommissionModel(format!(
                "model {} has a negative or non-finite rate",
                self.name
            )));
        }
        if self.calculation_type == CalculationType::Percentage {
            let sum: f64 = rates.iter().sum();
            if sum > 100.0 {
                return Err(SettlementError::InvalidCommissionModel(format!(
                    "model {} percentage rates sum to {sum}, above 100",
                    self.name
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model(calculation_type: CalculationType, rates: [f64; 3]) -> CommissionModel {
        CommissionModel {
            id: Uuid::new_v4(),
            name: "standard".to_string(),
            local_name: None,
            calculation_type,
            charter_rate: rates[0],
            creator_rate: rates[1],
            web_service_rate: rates[2],
        }
    }

    #[test]
    fn test_valid_percentage_model() {
        assert!(model(CalculationType::Percentage, [5.0, 2.0, 1.0]).validate().is_ok());
        assert!(model(CalculationType::Percentage, [50.0, 30.0, 20.0]).validate().is_ok());
    }

    #[test]
    fn test_percentage_rates_above_100_rejected() {
        let err = model(CalculationType::Percentage, [60.0, 30.0, 20.0])
            .validate()
            .unwrap_err();
        assert!(matches!(err, SettlementError::InvalidCommissionModel(_)));
    }

    #[test]
    fn test_negative_rate_rejected() {
        let err = model(CalculationType::FixedAmount, [-1.0, 0.0, 0.0])
            .validate()
            .unwrap_err();
        assert!(matches!(err, SettlementError::InvalidCommissionModel(_)));
    }

    #[test]
    fn test_fixed_amount_sum_not_bounded() {
        // Fixed amounts are per passenger, the 100 bound only applies to
        // percentages.
        assert!(model(CalculationType::FixedAmount, [200_000.0, 100_000.0, 50_000.0])
            .validate()
            .is_ok());
    }

    #[test]
    fn test_total_charge_includes_taxes() {
        let booking = Booking {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            flight_id: Uuid::new_v4(),
            flight_creator_id: Uuid::new_v4(),
            commission_model_id: None,
            base_price: 5_000_000,
            taxes: 300_000,
            passenger_count: 2,
            currency: Currency::IRR,
            status: BookingStatus::Pending,
            created_at: Utc::now(),
        };
        assert_eq!(booking.total_charge(), 5_300_000);
    }
}
