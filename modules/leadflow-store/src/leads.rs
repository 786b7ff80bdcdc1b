use anyhow::Result;
use sqlx::PgPool;
use uuid::Uuid;

use leadflow_common::{Lead, Stage};

#[derive(Clone)]
pub struct LeadStore {
    pool: PgPool,
}

impl LeadStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a lead for a company at the entry stage.
    pub async fn create(&self, company_id: Uuid) -> Result<Lead> {
        let lead = sqlx::query_as::<_, Lead>(
            r#"
            INSERT INTO lead_pipeline (company_id, stage)
            VALUES ($1, 'new_lead')
            RETURNING id, company_id, stage, updated_at
            "#,
        )
        .bind(company_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(lead)
    }

    pub async fn get(&self, id: Uuid) -> Result<Option<Lead>> {
        let lead = sqlx::query_as::<_, Lead>(
            "SELECT id, company_id, stage, updated_at FROM lead_pipeline WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(lead)
    }

    pub async fn list_by_company(&self, company_id: Uuid) -> Result<Vec<Lead>> {
        let leads = sqlx::query_as::<_, Lead>(
            r#"
            SELECT id, company_id, stage, updated_at
            FROM lead_pipeline
            WHERE company_id = $1
            ORDER BY updated_at DESC
            "#,
        )
        .bind(company_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(leads)
    }

    /// Write the lead's stage. No transition graph is enforced; any stage
    /// may move to any other.
    pub async fn set_stage(&self, id: Uuid, stage: Stage) -> Result<()> {
        sqlx::query("UPDATE lead_pipeline SET stage = $1, updated_at = now() WHERE id = $2")
            .bind(stage.as_str())
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    pub async fn exists(&self, id: Uuid) -> Result<bool> {
        let row = sqlx::query_as::<_, (bool,)>(
            "SELECT EXISTS(SELECT 1 FROM lead_pipeline WHERE id = $1)",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.0)
    }
}
