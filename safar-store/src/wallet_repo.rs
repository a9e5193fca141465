use async_trait::async_trait;
use chrono::{DateTime, Utc};
use safar_core::{SettlementError, SettlementResult};
use safar_settlement::wallet::{Wallet, WalletRepository, WalletTransaction, WalletTransactionKind};
use safar_shared::Currency;
use sqlx::{PgPool, Row};
use uuid::Uuid;

pub struct PgWalletRepository {
    pool: PgPool,
}

impl PgWalletRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct WalletTransactionRow {
    id: Uuid,
    amount: i64,
    kind: String,
    description: String,
    created_at: DateTime<Utc>,
}

impl WalletTransactionRow {
    fn into_transaction(self) -> SettlementResult<WalletTransaction> {
        let kind = WalletTransactionKind::parse(&self.kind).ok_or_else(|| {
            SettlementError::Storage(
                format!("unknown wallet transaction kind in store: {}", self.kind).into(),
            )
        })?;
        Ok(WalletTransaction {
            id: self.id,
            amount: self.amount,
            kind,
            description: self.description,
            created_at: self.created_at,
        })
    }
}

fn require_positive(amount: i64) -> SettlementResult<()> {
    if amount <= 0 {
        return Err(SettlementError::ValidationError(format!(
            "wallet operation amount must be positive, got {amount}"
        )));
    }
    Ok(())
}

/// Insert one movement row inside the caller's transaction.
pub(crate) async fn insert_wallet_transaction(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    user_id: Uuid,
    currency: Currency,
    record: &WalletTransaction,
) -> SettlementResult<()> {
    sqlx::query(
        r#"
        INSERT INTO wallet_transactions (id, user_id, currency, amount, kind, description, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        "#,
    )
    .bind(record.id)
    .bind(user_id)
    .bind(currency.as_str())
    .bind(record.amount)
    .bind(record.kind.as_str())
    .bind(&record.description)
    .bind(record.created_at)
    .execute(&mut **tx)
    .await
    .map_err(SettlementError::storage)?;
    Ok(())
}

/// Upsert the wallet row and add `amount` to its balance, inside the
/// caller's transaction.
pub(crate) async fn upsert_wallet_balance(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    user_id: Uuid,
    currency: Currency,
    amount: i64,
) -> SettlementResult<()> {
    sqlx::query(
        r#"
        INSERT INTO wallets (user_id, currency, balance)
        VALUES ($1, $2, $3)
        ON CONFLICT (user_id, currency) DO UPDATE SET balance = wallets.balance + $3
        "#,
    )
    .bind(user_id)
    .bind(currency.as_str())
    .bind(amount)
    .execute(&mut **tx)
    .await
    .map_err(SettlementError::storage)?;
    Ok(())
}

#[async_trait]
impl WalletRepository for PgWalletRepository {
    async fn get(&self, user_id: Uuid, currency: Currency) -> SettlementResult<Option<Wallet>> {
        let row = sqlx::query(
            "SELECT balance FROM wallets WHERE user_id = $1 AND currency = $2",
        )
        .bind(user_id)
        .bind(currency.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(SettlementError::storage)?;

        let Some(row) = row else {
            return Ok(None);
        };
        let balance: i64 = row.try_get("balance").map_err(SettlementError::storage)?;

        let transaction_rows: Vec<WalletTransactionRow> = sqlx::query_as(
            r#"
            SELECT id, amount, kind, description, created_at
            FROM wallet_transactions
            WHERE user_id = $1 AND currency = $2
            ORDER BY created_at, id
            "#,
        )
        .bind(user_id)
        .bind(currency.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(SettlementError::storage)?;

        let transactions = transaction_rows
            .into_iter()
            .map(WalletTransactionRow::into_transaction)
            .collect::<SettlementResult<Vec<_>>>()?;

        Ok(Some(Wallet {
            user_id,
            currency,
            balance,
            transactions,
        }))
    }

    async fn debit(
        &self,
        user_id: Uuid,
        currency: Currency,
        amount: i64,
        kind: WalletTransactionKind,
        description: &str,
    ) -> SettlementResult<WalletTransaction> {
        require_positive(amount)?;
        let mut tx = self.pool.begin().await.map_err(SettlementError::storage)?;

        // Row lock serializes concurrent debits on the same wallet so the
        // balance check cannot run against a stale value.
        let balance: Option<i64> = sqlx::query_scalar(
            "SELECT balance FROM wallets WHERE user_id = $1 AND currency = $2 FOR UPDATE",
        )
        .bind(user_id)
        .bind(currency.as_str())
        .fetch_optional(&mut *tx)
        .await
        .map_err(SettlementError::storage)?;

        let balance = balance.unwrap_or(0);
        if balance < amount {
            return Err(SettlementError::InsufficientFunds { balance, requested: amount });
        }

        sqlx::query(
            "UPDATE wallets SET balance = balance - $3 WHERE user_id = $1 AND currency = $2",
        )
        .bind(user_id)
        .bind(currency.as_str())
        .bind(amount)
        .execute(&mut *tx)
        .await
        .map_err(SettlementError::storage)?;

        let record = WalletTransaction::new(-amount, kind, description);
        insert_wallet_transaction(&mut tx, user_id, currency, &record).await?;

        tx.commit().await.map_err(SettlementError::storage)?;
        Ok(record)
    }

    async fn credit(
        &self,
        user_id: Uuid,
        currency: Currency,
        amount: i64,
        kind: WalletTransactionKind,
        description: &str,
    ) -> SettlementResult<WalletTransaction> {
        require_positive(amount)?;
        let mut tx = self.pool.begin().await.map_err(SettlementError::storage)?;

        upsert_wallet_balance(&mut tx, user_id, currency, amount).await?;
        let record = WalletTransaction::new(amount, kind, description);
        insert_wallet_transaction(&mut tx, user_id, currency, &record).await?;

        tx.commit().await.map_err(SettlementError::storage)?;
        Ok(record)
    }
}
