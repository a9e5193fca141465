use async_trait::async_trait;
use chrono::{DateTime, Utc};
use safar_core::{SettlementError, SettlementResult};
use safar_settlement::refund::{Refund, RefundRepository, RefundStatus};
use sqlx::PgPool;
use uuid::Uuid;

pub struct PgRefundRepository {
    pool: PgPool,
}

impl PgRefundRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct RefundRow {
    id: Uuid,
    booking_id: Uuid,
    user_id: Uuid,
    requested_at: DateTime<Utc>,
    status: String,
    original_amount: i64,
    penalty_amount: i64,
    refund_amount: i64,
    version: i64,
    expert_reviewed_by: Option<String>,
    expert_reviewed_at: Option<DateTime<Utc>>,
    financial_reviewed_by: Option<String>,
    financial_reviewed_at: Option<DateTime<Utc>>,
    paid_by: Option<String>,
    paid_at: Option<DateTime<Utc>>,
    rejected_by: Option<String>,
    rejected_at: Option<DateTime<Utc>>,
    rejection_reason: Option<String>,
}

impl RefundRow {
    fn into_refund(self) -> SettlementResult<Refund> {
        let status = RefundStatus::parse(&self.status).ok_or_else(|| {
            SettlementError::Storage(
                format!("unknown refund status in store: {}", self.status).into(),
            )
        })?;
        Ok(Refund {
            id: self.id,
            booking_id: self.booking_id,
            user_id: self.user_id,
            requested_at: self.requested_at,
            status,
            original_amount: self.original_amount,
            penalty_amount: self.penalty_amount,
            refund_amount: self.refund_amount,
            version: self.version,
            expert_reviewed_by: self.expert_reviewed_by,
            expert_reviewed_at: self.expert_reviewed_at,
            financial_reviewed_by: self.financial_reviewed_by,
            financial_reviewed_at: self.financial_reviewed_at,
            paid_by: self.paid_by,
            paid_at: self.paid_at,
            rejected_by: self.rejected_by,
            rejected_at: self.rejected_at,
            rejection_reason: self.rejection_reason,
        })
    }
}

const SELECT_REFUND: &str = r#"
    SELECT id, booking_id, user_id, requested_at, status,
           original_amount, penalty_amount, refund_amount, version,
           expert_reviewed_by, expert_reviewed_at,
           financial_reviewed_by, financial_reviewed_at,
           paid_by, paid_at,
           rejected_by, rejected_at, rejection_reason
    FROM refunds
"#;

/// Optimistic update inside the caller's transaction: writes the mutable
/// fields only where the stored version still matches, bumping it by one.
/// Zero rows touched means another admin got there first.
pub(crate) async fn update_refund_if_version(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    refund: &Refund,
    expected_version: i64,
) -> SettlementResult<()> {
    let result = sqlx::query(
        r#"
        UPDATE refunds SET
            status = $3,
            version = $2 + 1,
            expert_reviewed_by = $4, expert_reviewed_at = $5,
            financial_reviewed_by = $6, financial_reviewed_at = $7,
            paid_by = $8, paid_at = $9,
            rejected_by = $10, rejected_at = $11, rejection_reason = $12
        WHERE id = $1 AND version = $2
        "#,
    )
    .bind(refund.id)
    .bind(expected_version)
    .bind(refund.status.as_str())
    .bind(&refund.expert_reviewed_by)
    .bind(refund.expert_reviewed_at)
    .bind(&refund.financial_reviewed_by)
    .bind(refund.financial_reviewed_at)
    .bind(&refund.paid_by)
    .bind(refund.paid_at)
    .bind(&refund.rejected_by)
    .bind(refund.rejected_at)
    .bind(&refund.rejection_reason)
    .execute(&mut **tx)
    .await
    .map_err(SettlementError::storage)?;

    if result.rows_affected() == 0 {
        let exists: Option<i64> = sqlx::query_scalar("SELECT 1 FROM refunds WHERE id = $1")
            .bind(refund.id)
            .fetch_optional(&mut **tx)
            .await
            .map_err(SettlementError::storage)?;
        return Err(match exists {
            Some(_) => SettlementError::Conflict { entity: "refund", id: refund.id.to_string() },
            None => SettlementError::NotFound { entity: "refund", id: refund.id.to_string() },
        });
    }
    Ok(())
}

#[async_trait]
impl RefundRepository for PgRefundRepository {
    async fn create(&self, refund: &Refund) -> SettlementResult<()> {
        sqlx::query(
            r#"
            INSERT INTO refunds (id, booking_id, user_id, requested_at, status,
                                 original_amount, penalty_amount, refund_amount, version)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(refund.id)
        .bind(refund.booking_id)
        .bind(refund.user_id)
        .bind(refund.requested_at)
        .bind(refund.status.as_str())
        .bind(refund.original_amount)
        .bind(refund.penalty_amount)
        .bind(refund.refund_amount)
        .bind(refund.version)
        .execute(&self.pool)
        .await
        .map_err(SettlementError::storage)?;
        Ok(())
    }

    async fn get(&self, id: Uuid) -> SettlementResult<Option<Refund>> {
        let row: Option<RefundRow> = sqlx::query_as(&format!("{SELECT_REFUND} WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(SettlementError::storage)?;
        row.map(RefundRow::into_refund).transpose()
    }

    async fn update_if_version(&self, refund: &Refund, expected_version: i64) -> SettlementResult<()> {
        let mut tx = self.pool.begin().await.map_err(SettlementError::storage)?;
        update_refund_if_version(&mut tx, refund, expected_version).await?;
        tx.commit().await.map_err(SettlementError::storage)?;
        Ok(())
    }
}
