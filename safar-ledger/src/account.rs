use serde::{Deserialize, Serialize};

/// Account classification in the chart of accounts
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccountType {
    Asset,
    Liability,
    Revenue,
    Expense,
    Equity,
}

impl AccountType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountType::Asset => "ASSET",
            AccountType::Liability => "LIABILITY",
            AccountType::Revenue => "REVENUE",
            AccountType::Expense => "EXPENSE",
            AccountType::Equity => "EQUITY",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "ASSET" => Some(AccountType::Asset),
            "LIABILITY" => Some(AccountType::Liability),
            "REVENUE" => Some(AccountType::Revenue),
            "EXPENSE" => Some(AccountType::Expense),
            "EQUITY" => Some(AccountType::Equity),
            _ => None,
        }
    }
}

/// A chart-of-accounts entry. Accounts are created at system setup and are
/// immutable once a journal transaction references them. Parent accounts are
/// display-only aggregates; posting to one is rejected by the ledger.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    /// Stable code, e.g. "1020"
    pub code: String,
    pub name: String,
    /// Persian display name for the storefront's report screens
    pub local_name: Option<String>,
    pub account_type: AccountType,
    pub is_parent: bool,
}

impl Account {
    pub fn new(
        code: impl Into<String>,
        name: impl Into<String>,
        local_name: Option<&str>,
        account_type: AccountType,
    ) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            local_name: local_name.map(String::from),
            account_type,
            is_parent: false,
        }
    }

    pub fn parent(
        code: impl Into<String>,
        name: impl Into<String>,
        local_name: Option<&str>,
        account_type: AccountType,
    ) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            local_name: local_name.map(String::from),
            account_type,
            is_parent: true,
        }
    }

    /// Name shown to storefront users, falling back to the English name.
    pub fn display_name(&self) -> &str {
        self.local_name.as_deref().unwrap_or(&self.name)
    }
}
