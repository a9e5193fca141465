use async_trait::async_trait;
use safar_core::{SettlementError, SettlementResult};
use safar_settlement::models::{CalculationType, CommissionModel};
use safar_settlement::repository::CommissionModelRepository;
use sqlx::PgPool;
use uuid::Uuid;

pub struct PgCommissionModelRepository {
    pool: PgPool,
}

impl PgCommissionModelRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct ModelRow {
    id: Uuid,
    name: String,
    local_name: Option<String>,
    calculation_type: String,
    charter_rate: f64,
    creator_rate: f64,
    web_service_rate: f64,
}

impl ModelRow {
    fn into_model(self) -> SettlementResult<CommissionModel> {
        let calculation_type = CalculationType::parse(&self.calculation_type).ok_or_else(|| {
            SettlementError::Storage(
                format!("unknown calculation type in store: {}", self.calculation_type).into(),
            )
        })?;
        Ok(CommissionModel {
            id: self.id,
            name: self.name,
            local_name: self.local_name,
            calculation_type,
            charter_rate: self.charter_rate,
            creator_rate: self.creator_rate,
            web_service_rate: self.web_service_rate,
        })
    }
}

#[async_trait]
impl CommissionModelRepository for PgCommissionModelRepository {
    /// Rate validation runs here, at configuration time, so a model that
    /// would drive net revenue negative never reaches settlement.
    async fn create(&self, model: &CommissionModel) -> SettlementResult<()> {
        model.validate()?;
        sqlx::query(
            r#"
            INSERT INTO commission_models
                (id, name, local_name, calculation_type, charter_rate, creator_rate, web_service_rate)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(model.id)
        .bind(&model.name)
        .bind(&model.local_name)
        .bind(model.calculation_type.as_str())
        .bind(model.charter_rate)
        .bind(model.creator_rate)
        .bind(model.web_service_rate)
        .execute(&self.pool)
        .await
        .map_err(SettlementError::storage)?;
        Ok(())
    }

    async fn get(&self, id: Uuid) -> SettlementResult<Option<CommissionModel>> {
        let row: Option<ModelRow> = sqlx::query_as(
            r#"
            SELECT id, name, local_name, calculation_type,
                   charter_rate, creator_rate, web_service_rate
            FROM commission_models
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(SettlementError::storage)?;
        row.map(ModelRow::into_model).transpose()
    }
}
