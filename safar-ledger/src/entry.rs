use chrono::{DateTime, Utc};
use safar_core::{SettlementError, SettlementResult};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single journal line. A line is a debit line or a credit line, never
/// both; corrections are reversing entries, not edits.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Transaction {
    pub account_code: String,
    pub debit: i64,
    pub credit: i64,
}

impl Transaction {
    pub fn debit(account_code: impl Into<String>, amount: i64) -> Self {
        Self {
            account_code: account_code.into(),
            debit: amount,
            credit: 0,
        }
    }

    pub fn credit(account_code: impl Into<String>, amount: i64) -> Self {
        Self {
            account_code: account_code.into(),
            debit: 0,
            credit: amount,
        }
    }

    /// Mirror line with debit and credit swapped.
    pub fn reversed(&self) -> Self {
        Self {
            account_code: self.account_code.clone(),
            debit: self.credit,
            credit: self.debit,
        }
    }

    fn validate(&self) -> SettlementResult<()> {
        if self.debit < 0 || self.credit < 0 {
            return Err(SettlementError::ValidationError(format!(
                "negative journal line on account {}",
                self.account_code
            )));
        }
        if self.debit != 0 && self.credit != 0 {
            return Err(SettlementError::ValidationError(format!(
                "journal line on account {} has both debit and credit",
                self.account_code
            )));
        }
        Ok(())
    }
}

/// One balanced accounting event. Construction fails rather than produce an
/// unbalanced entry, and entries are append-only once in the ledger.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JournalEntry {
    pub id: Uuid,
    /// Customer the entry is reported under
    pub user_id: Uuid,
    pub booking_id: Option<Uuid>,
    pub description: String,
    pub posted_at: DateTime<Utc>,
    pub transactions: Vec<Transaction>,
}

impl JournalEntry {
    pub fn new(
        user_id: Uuid,
        booking_id: Option<Uuid>,
        description: impl Into<String>,
        transactions: Vec<Transaction>,
    ) -> SettlementResult<Self> {
        if transactions.is_empty() {
            return Err(SettlementError::ValidationError(
                "journal entry has no lines".to_string(),
            ));
        }
        for line in &transactions {
            line.validate()?;
        }
        let debits: i64 = transactions.iter().map(|t| t.debit).sum();
        let credits: i64 = transactions.iter().map(|t| t.credit).sum();
        if debits != credits {
            return Err(SettlementError::UnbalancedEntry { debits, credits });
        }
        Ok(Self {
            id: Uuid::new_v4(),
            user_id,
            booking_id,
            description: description.into(),
            posted_at: Utc::now(),
            transactions,
        })
    }

    pub fn debit_total(&self) -> i64 {
        self.transactions.iter().map(|t| t.debit).sum()
    }

    pub fn credit_total(&self) -> i64 {
        self.transactions.iter().map(|t| t.credit).sum()
    }

    pub fn is_balanced(&self) -> bool {
        self.debit_total() == self.credit_total()
    }

    /// Reversing entry: every line's debit/credit swapped, fresh id and
    /// timestamp, same owner and booking tag. Appending both entries nets
    /// each touched account to zero.
    pub fn reversed(&self, description: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id: self.user_id,
            booking_id: self.booking_id,
            description: description.into(),
            posted_at: Utc::now(),
            transactions: self.transactions.iter().map(Transaction::reversed).collect(),
        }
    }
}
