use crate::models::{CalculationType, CommissionModel};

/// The three-way split of a booking's base price.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommissionSplit {
    pub charter: i64,
    pub creator: i64,
    pub web_service: i64,
}

impl CommissionSplit {
    pub fn total(&self) -> i64 {
        self.charter + self.creator + self.web_service
    }

    /// Residual that lands on the ticket sales revenue account. Derived on
    /// demand, never stored.
    pub fn net_revenue(&self, base_price_total: i64) -> i64 {
        base_price_total - self.total()
    }
}

/// Deterministic, side-effect-free commission math. Anything that needs a
/// split (settlement, reports, batch jobs, tests) calls this directly; there
/// is no cached state to go stale.
pub struct CommissionCalculator;

impl CommissionCalculator {
    pub fn compute(
        model: &CommissionModel,
        base_price_total: i64,
        passenger_count: u32,
    ) -> CommissionSplit {
        match model.calculation_type {
            CalculationType::Percentage => CommissionSplit {
                charter: percentage_share(base_price_total, model.charter_rate),
                creator: percentage_share(base_price_total, model.creator_rate),
                web_service: percentage_share(base_price_total, model.web_service_rate),
            },
            CalculationType::FixedAmount => CommissionSplit {
                charter: per_passenger(model.charter_rate, passenger_count),
                creator: per_passenger(model.creator_rate, passenger_count),
                web_service: per_passenger(model.web_service_rate, passenger_count),
            },
        }
    }
}

/// `base * rate / 100`, rounded down to the minor unit. The rate is turned
/// into whole basis points first so the amount path stays in integer math;
/// flooring means a commission is never overstated against the base.
fn percentage_share(base: i64, rate: f64) -> i64 {
    let basis_points = (rate * 100.0).round() as i128;
    ((base as i128 * basis_points) / 10_000) as i64
}

fn per_passenger(rate: f64, passenger_count: u32) -> i64 {
    (rate as i64) * (passenger_count as i64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn percentage_model(charter: f64, creator: f64, web: f64) -> CommissionModel {
        CommissionModel {
            id: Uuid::new_v4(),
            name: "standard".to_string(),
            local_name: None,
            calculation_type: CalculationType::Percentage,
            charter_rate: charter,
            creator_rate: creator,
            web_service_rate: web,
        }
    }

    #[test]
    fn test_percentage_split() {
        // The storefront's reference scenario: 2 passengers at 2,500,000
        // fare each.
        let model = percentage_model(5.0, 2.0, 1.0);
        let split = CommissionCalculator::compute(&model, 5_000_000, 2);

        assert_eq!(split.charter, 250_000);
        assert_eq!(split.creator, 100_000);
        assert_eq!(split.web_service, 50_000);
        assert_eq!(split.net_revenue(5_000_000), 4_600_000);
    }

    #[test]
    fn test_percentage_rounds_down() {
        let model = percentage_model(0.1, 0.0, 0.0);
        // 0.1% of 999 = 0.999, floors to 0
        let split = CommissionCalculator::compute(&model, 999, 1);
        assert_eq!(split.charter, 0);

        // 2.5% of 1001 = 25.025, floors to 25
        let model = percentage_model(2.5, 0.0, 0.0);
        let split = CommissionCalculator::compute(&model, 1001, 1);
        assert_eq!(split.charter, 25);
    }

    #[test]
    fn test_percentage_never_exceeds_base() {
        let bases = [0i64, 1, 999, 1_000, 5_000_000, 47_500_000, i64::MAX / 20_000];
        let rate_sets = [
            (5.0, 2.0, 1.0),
            (33.3, 33.3, 33.3),
            (100.0, 0.0, 0.0),
            (0.0, 0.0, 0.0),
            (1.5, 2.25, 0.75),
        ];
        for base in bases {
            for (c, r, w) in rate_sets {
                let split = CommissionCalculator::compute(&percentage_model(c, r, w), base, 1);
                assert!(
                    split.total() <= base,
                    "split {:?} exceeds base {} for rates ({c}, {r}, {w})",
                    split,
                    base
                );
                assert!(split.net_revenue(base) >= 0);
            }
        }
    }

    #[test]
    fn test_fixed_amount_multiplies_passengers() {
        let model = CommissionModel {
            id: Uuid::new_v4(),
            name: "charter flat".to_string(),
            local_name: None,
            calculation_type: CalculationType::FixedAmount,
            charter_rate: 200_000.0,
            creator_rate: 50_000.0,
            web_service_rate: 25_000.0,
        };
        let split = CommissionCalculator::compute(&model, 10_000_000, 3);
        assert_eq!(split.charter, 600_000);
        assert_eq!(split.creator, 150_000);
        assert_eq!(split.web_service, 75_000);
    }

    #[test]
    fn test_zero_rates_zero_split() {
        let split = CommissionCalculator::compute(&percentage_model(0.0, 0.0, 0.0), 5_000_000, 2);
        assert_eq!(split.total(), 0);
        assert_eq!(split.net_revenue(5_000_000), 5_000_000);
    }
}
