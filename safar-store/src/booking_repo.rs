use async_trait::async_trait;
use chrono::{DateTime, Utc};
use safar_core::{SettlementError, SettlementResult};
use safar_settlement::models::{Booking, BookingStatus};
use safar_settlement::repository::BookingRepository;
use safar_shared::Currency;
use sqlx::PgPool;
use uuid::Uuid;

pub struct PgBookingRepository {
    pool: PgPool,
}

impl PgBookingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct BookingRow {
    id: Uuid,
    user_id: Uuid,
    flight_id: Uuid,
    flight_creator_id: Uuid,
    commission_model_id: Option<Uuid>,
    base_price: i64,
    taxes: i64,
    passenger_count: i32,
    currency: String,
    status: String,
    created_at: DateTime<Utc>,
}

impl BookingRow {
    fn into_booking(self) -> SettlementResult<Booking> {
        let currency = Currency::parse(&self.currency).ok_or_else(|| {
            SettlementError::Storage(format!("unknown currency in store: {}", self.currency).into())
        })?;
        let status = BookingStatus::parse(&self.status).ok_or_else(|| {
            SettlementError::Storage(
                format!("unknown booking status in store: {}", self.status).into(),
            )
        })?;
        Ok(Booking {
            id: self.id,
            user_id: self.user_id,
            flight_id: self.flight_id,
            flight_creator_id: self.flight_creator_id,
            commission_model_id: self.commission_model_id,
            base_price: self.base_price,
            taxes: self.taxes,
            passenger_count: self.passenger_count as u32,
            currency,
            status,
            created_at: self.created_at,
        })
    }
}

/// Flip the status inside the caller's transaction.
pub(crate) async fn set_booking_status(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    id: Uuid,
    status: BookingStatus,
) -> SettlementResult<()> {
    let result = sqlx::query("UPDATE bookings SET status = $2 WHERE id = $1")
        .bind(id)
        .bind(status.as_str())
        .execute(&mut **tx)
        .await
        .map_err(SettlementError::storage)?;
    if result.rows_affected() == 0 {
        return Err(SettlementError::NotFound { entity: "booking", id: id.to_string() });
    }
    Ok(())
}

#[async_trait]
impl BookingRepository for PgBookingRepository {
    async fn get(&self, id: Uuid) -> SettlementResult<Option<Booking>> {
        let row: Option<BookingRow> = sqlx::query_as(
            r#"
            SELECT id, user_id, flight_id, flight_creator_id, commission_model_id,
                   base_price, taxes, passenger_count, currency, status, created_at
            FROM bookings
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(SettlementError::storage)?;
        row.map(BookingRow::into_booking).transpose()
    }

    async fn set_status(&self, id: Uuid, status: BookingStatus) -> SettlementResult<()> {
        let mut tx = self.pool.begin().await.map_err(SettlementError::storage)?;
        set_booking_status(&mut tx, id, status).await?;
        tx.commit().await.map_err(SettlementError::storage)?;
        Ok(())
    }
}
