use async_trait::async_trait;
use chrono::{DateTime, Utc};
use safar_core::{SettlementError, SettlementResult};
use safar_ledger::{AccountBalance, JournalEntry, JournalRepository, Transaction};
use sqlx::PgPool;
use uuid::Uuid;

pub struct PgJournalRepository {
    pool: PgPool,
}

impl PgJournalRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct EntryRow {
    id: Uuid,
    user_id: Uuid,
    booking_id: Option<Uuid>,
    description: String,
    posted_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct LineRow {
    entry_id: Uuid,
    account_code: String,
    debit: i64,
    credit: i64,
}

/// Insert the entry header and its lines inside the caller's transaction.
pub(crate) async fn insert_entry(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    entry: &JournalEntry,
) -> SettlementResult<()> {
    sqlx::query(
        r#"
        INSERT INTO journal_entries (id, user_id, booking_id, description, posted_at)
        VALUES ($1, $2, $3, $4, $5)
        "#,
    )
    .bind(entry.id)
    .bind(entry.user_id)
    .bind(entry.booking_id)
    .bind(&entry.description)
    .bind(entry.posted_at)
    .execute(&mut **tx)
    .await
    .map_err(SettlementError::storage)?;

    for line in &entry.transactions {
        sqlx::query(
            r#"
            INSERT INTO journal_transactions (entry_id, account_code, debit, credit)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(entry.id)
        .bind(&line.account_code)
        .bind(line.debit)
        .bind(line.credit)
        .execute(&mut **tx)
        .await
        .map_err(SettlementError::storage)?;
    }
    Ok(())
}

#[async_trait]
impl JournalRepository for PgJournalRepository {
    async fn append(&self, entry: &JournalEntry) -> SettlementResult<()> {
        let mut tx = self.pool.begin().await.map_err(SettlementError::storage)?;
        insert_entry(&mut tx, entry).await?;
        tx.commit().await.map_err(SettlementError::storage)?;
        Ok(())
    }

    async fn entries_for_user(&self, user_id: Uuid) -> SettlementResult<Vec<JournalEntry>> {
        let entry_rows: Vec<EntryRow> = sqlx::query_as(
            r#"
            SELECT id, user_id, booking_id, description, posted_at
            FROM journal_entries
            WHERE user_id = $1
            ORDER BY posted_at, id
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(SettlementError::storage)?;

        if entry_rows.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<Uuid> = entry_rows.iter().map(|r| r.id).collect();
        let line_rows: Vec<LineRow> = sqlx::query_as(
            r#"
            SELECT entry_id, account_code, debit, credit
            FROM journal_transactions
            WHERE entry_id = ANY($1)
            ORDER BY id
            "#,
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await
        .map_err(SettlementError::storage)?;

        let mut entries: Vec<JournalEntry> = entry_rows
            .into_iter()
            .map(|row| JournalEntry {
                id: row.id,
                user_id: row.user_id,
                booking_id: row.booking_id,
                description: row.description,
                posted_at: row.posted_at,
                transactions: Vec::new(),
            })
            .collect();

        for line in line_rows {
            if let Some(entry) = entries.iter_mut().find(|e| e.id == line.entry_id) {
                entry.transactions.push(Transaction {
                    account_code: line.account_code,
                    debit: line.debit,
                    credit: line.credit,
                });
            }
        }

        Ok(entries)
    }

    async fn balance_of(
        &self,
        account_code: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> SettlementResult<AccountBalance> {
        let (debit_total, credit_total): (i64, i64) = sqlx::query_as(
            r#"
            SELECT COALESCE(SUM(t.debit), 0)::BIGINT, COALESCE(SUM(t.credit), 0)::BIGINT
            FROM journal_transactions t
            JOIN journal_entries e ON e.id = t.entry_id
            WHERE t.account_code = $1 AND e.posted_at BETWEEN $2 AND $3
            "#,
        )
        .bind(account_code)
        .bind(from)
        .bind(to)
        .fetch_one(&self.pool)
        .await
        .map_err(SettlementError::storage)?;

        Ok(AccountBalance {
            account_code: account_code.to_string(),
            debit_total,
            credit_total,
        })
    }
}
