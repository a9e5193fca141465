//! Account codes the settlement flow posts against. The same rows are seeded
//! by migration `0002_seed_chart` for the Postgres store.

use crate::account::{Account, AccountType};

pub const ASSETS: &str = "1000";
pub const ACCOUNTS_RECEIVABLE: &str = "1020";

pub const LIABILITIES: &str = "2000";
pub const CHARTER_COMMISSION_PAYABLE: &str = "2010";
pub const CREATOR_COMMISSION_PAYABLE: &str = "2020";
pub const TAXES_PAYABLE: &str = "2030";

pub const REVENUE: &str = "4000";
pub const WEB_SERVICE_REVENUE: &str = "4010";
pub const TICKET_SALES_REVENUE: &str = "4020";

/// The chart used by in-memory ledgers and by tests. Parents aggregate for
/// display only; only leaf accounts are postable.
pub fn default_chart() -> Vec<Account> {
    vec![
        Account::parent(ASSETS, "Assets", Some("دارایی‌ها"), AccountType::Asset),
        Account::new(
            ACCOUNTS_RECEIVABLE,
            "Accounts Receivable",
            Some("حساب‌های دریافتنی"),
            AccountType::Asset,
        ),
        Account::parent(LIABILITIES, "Liabilities", Some("بدهی‌ها"), AccountType::Liability),
        Account::new(
            CHARTER_COMMISSION_PAYABLE,
            "Charter Commission Payable",
            Some("کمیسیون چارترکننده"),
            AccountType::Liability,
        ),
        Account::new(
            CREATOR_COMMISSION_PAYABLE,
            "Creator Commission Payable",
            Some("کمیسیون ایجادکننده پرواز"),
            AccountType::Liability,
        ),
        Account::new(
            TAXES_PAYABLE,
            "Taxes Payable",
            Some("مالیات پرداختنی"),
            AccountType::Liability,
        ),
        Account::parent(REVENUE, "Revenue", Some("درآمد"), AccountType::Revenue),
        Account::new(
            WEB_SERVICE_REVENUE,
            "Web Service Commission Revenue",
            Some("درآمد کمیسیون وب‌سرویس"),
            AccountType::Revenue,
        ),
        Account::new(
            TICKET_SALES_REVENUE,
            "Ticket Sales Revenue",
            Some("درآمد فروش بلیت"),
            AccountType::Revenue,
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_chart_codes_unique() {
        let chart = default_chart();
        let mut codes: Vec<&str> = chart.iter().map(|a| a.code.as_str()).collect();
        codes.sort();
        codes.dedup();
        assert_eq!(codes.len(), chart.len());
    }

    #[test]
    fn test_postable_accounts_are_leaves() {
        for account in default_chart() {
            let top_level = matches!(account.code.as_str(), ASSETS | LIABILITIES | REVENUE);
            assert_eq!(account.is_parent, top_level, "account {}", account.code);
        }
    }
}
