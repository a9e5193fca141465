use safar_core::{SettlementError, SettlementResult};
use safar_ledger::{Account, AccountType};
use sqlx::postgres::PgPoolOptions;
use sqlx::{Pool, Postgres};
use std::time::Duration;
use tracing::info;

#[derive(Clone)]
pub struct DbClient {
    pub pool: Pool<Postgres>,
}

impl DbClient {
    pub async fn new(connection_string: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(Duration::from_secs(3))
            .connect(connection_string)
            .await?;

        Ok(Self { pool })
    }

    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        info!("Running database migrations...");
        sqlx::migrate!("../migrations")
            .run(&self.pool)
            .await?;
        info!("Migrations completed successfully.");
        Ok(())
    }

    /// Load the seeded chart of accounts for `Ledger::new`.
    pub async fn load_chart(&self) -> SettlementResult<Vec<Account>> {
        // Struct to map SQL result
        #[derive(sqlx::FromRow)]
        struct AccountRow {
            code: String,
            name: String,
            local_name: Option<String>,
            account_type: String,
            is_parent: bool,
        }

        let rows: Vec<AccountRow> = sqlx::query_as(
            "SELECT code, name, local_name, account_type, is_parent FROM accounts ORDER BY code",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(SettlementError::storage)?;

        rows.into_iter()
            .map(|row| {
                let account_type = AccountType::parse(&row.account_type).ok_or_else(|| {
                    SettlementError::Storage(
                        format!("unknown account type in store: {}", row.account_type).into(),
                    )
                })?;
                Ok(Account {
                    code: row.code,
                    name: row.name,
                    local_name: row.local_name,
                    account_type,
                    is_parent: row.is_parent,
                })
            })
            .collect()
    }
}
