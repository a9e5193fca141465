use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use safar_core::{SettlementError, SettlementResult};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::account::Account;
use crate::entry::JournalEntry;

/// Debit/credit totals for one account over a date range.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountBalance {
    pub account_code: String,
    pub debit_total: i64,
    pub credit_total: i64,
}

/// Durable journal storage. Entries handed to `append` have already passed
/// the ledger's validation; implementations only persist.
#[async_trait]
pub trait JournalRepository: Send + Sync {
    async fn append(&self, entry: &JournalEntry) -> SettlementResult<()>;

    async fn entries_for_user(&self, user_id: Uuid) -> SettlementResult<Vec<JournalEntry>>;

    async fn balance_of(
        &self,
        account_code: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> SettlementResult<AccountBalance>;
}

/// Chart-of-accounts holder and invariant checker in front of the journal
/// store. There are no update or delete operations anywhere on this path;
/// correcting an error always means appending a reversing entry.
pub struct Ledger {
    chart: HashMap<String, Account>,
    repo: Arc<dyn JournalRepository>,
}

impl Ledger {
    pub fn new(chart: Vec<Account>, repo: Arc<dyn JournalRepository>) -> Self {
        let chart = chart.into_iter().map(|a| (a.code.clone(), a)).collect();
        Self { chart, repo }
    }

    pub fn account(&self, code: &str) -> Option<&Account> {
        self.chart.get(code)
    }

    /// Balance and account checks are pure in-memory arithmetic; appends for
    /// different entries may run concurrently.
    pub fn validate(&self, entry: &JournalEntry) -> SettlementResult<()> {
        let debits = entry.debit_total();
        let credits = entry.credit_total();
        if debits != credits {
            return Err(SettlementError::UnbalancedEntry { debits, credits });
        }
        for line in &entry.transactions {
            match self.chart.get(&line.account_code) {
                None => return Err(SettlementError::UnknownAccount(line.account_code.clone())),
                Some(account) if account.is_parent => {
                    return Err(SettlementError::UnknownAccount(line.account_code.clone()));
                }
                Some(_) => {}
            }
        }
        Ok(())
    }

    pub async fn append(&self, entry: &JournalEntry) -> SettlementResult<()> {
        self.validate(entry)?;
        self.repo.append(entry).await
    }

    /// Read-only aggregation used by reporting, not the settlement hot path.
    pub async fn balance_of(
        &self,
        account_code: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> SettlementResult<AccountBalance> {
        if !self.chart.contains_key(account_code) {
            return Err(SettlementError::UnknownAccount(account_code.to_string()));
        }
        self.repo.balance_of(account_code, from, to).await
    }

    /// Customer-ledger listing for the storefront's account statement screen.
    pub async fn entries_for_user(&self, user_id: Uuid) -> SettlementResult<Vec<JournalEntry>> {
        self.repo.entries_for_user(user_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart;
    use crate::entry::Transaction;
    use std::sync::Mutex;

    struct VecRepo {
        entries: Mutex<Vec<JournalEntry>>,
    }

    #[async_trait]
    impl JournalRepository for VecRepo {
        async fn append(&self, entry: &JournalEntry) -> SettlementResult<()> {
            self.entries.lock().unwrap().push(entry.clone());
            Ok(())
        }

        async fn entries_for_user(&self, user_id: Uuid) -> SettlementResult<Vec<JournalEntry>> {
            Ok(self
                .entries
                .lock()
                .unwrap()
                .iter()
                .filter(|e| e.user_id == user_id)
                .cloned()
                .collect())
        }

        async fn balance_of(
            &self,
            account_code: &str,
            from: DateTime<Utc>,
            to: DateTime<Utc>,
        ) -> SettlementResult<AccountBalance> {
            let mut balance = AccountBalance {
                account_code: account_code.to_string(),
                debit_total: 0,
                credit_total: 0,
            };
            for entry in self.entries.lock().unwrap().iter() {
                if entry.posted_at < from || entry.posted_at > to {
                    continue;
                }
                for line in &entry.transactions {
                    if line.account_code == account_code {
                        balance.debit_total += line.debit;
                        balance.credit_total += line.credit;
                    }
                }
            }
            Ok(balance)
        }
    }

    fn ledger() -> (Ledger, Arc<VecRepo>) {
        let repo = Arc::new(VecRepo { entries: Mutex::new(Vec::new()) });
        (Ledger::new(chart::default_chart(), repo.clone()), repo)
    }

    fn entry(user_id: Uuid) -> JournalEntry {
        JournalEntry::new(
            user_id,
            None,
            "test entry",
            vec![
                Transaction::debit(chart::ACCOUNTS_RECEIVABLE, 1_000),
                Transaction::credit(chart::TICKET_SALES_REVENUE, 1_000),
            ],
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_append_valid_entry() {
        let (ledger, repo) = ledger();
        ledger.append(&entry(Uuid::new_v4())).await.unwrap();
        assert_eq!(repo.entries.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_append_rejects_unknown_account() {
        let (ledger, repo) = ledger();
        let mut bad = entry(Uuid::new_v4());
        bad.transactions[0].account_code = "9999".to_string();
        let err = ledger.append(&bad).await.unwrap_err();
        assert!(matches!(err, SettlementError::UnknownAccount(code) if code == "9999"));
        assert!(repo.entries.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_append_rejects_parent_account() {
        let (ledger, _) = ledger();
        let mut bad = entry(Uuid::new_v4());
        bad.transactions[0].account_code = chart::ASSETS.to_string();
        let err = ledger.append(&bad).await.unwrap_err();
        assert!(matches!(err, SettlementError::UnknownAccount(_)));
    }

    #[tokio::test]
    async fn test_append_rejects_tampered_unbalanced_entry() {
        let (ledger, repo) = ledger();
        let mut bad = entry(Uuid::new_v4());
        bad.transactions[0].debit += 5;
        let err = ledger.append(&bad).await.unwrap_err();
        assert!(matches!(err, SettlementError::UnbalancedEntry { .. }));
        assert!(repo.entries.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_balance_of_aggregates_range() {
        let (ledger, _) = ledger();
        let user = Uuid::new_v4();
        ledger.append(&entry(user)).await.unwrap();
        ledger.append(&entry(user)).await.unwrap();

        let from = Utc::now() - chrono::Duration::hours(1);
        let to = Utc::now() + chrono::Duration::hours(1);
        let balance = ledger
            .balance_of(chart::ACCOUNTS_RECEIVABLE, from, to)
            .await
            .unwrap();
        assert_eq!(balance.debit_total, 2_000);
        assert_eq!(balance.credit_total, 0);
    }

    #[tokio::test]
    async fn test_entries_for_user_filters_owner() {
        let (ledger, _) = ledger();
        let user = Uuid::new_v4();
        ledger.append(&entry(user)).await.unwrap();
        ledger.append(&entry(Uuid::new_v4())).await.unwrap();

        let entries = ledger.entries_for_user(user).await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].user_id, user);
    }
}
