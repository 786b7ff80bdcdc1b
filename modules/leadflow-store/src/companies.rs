use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use leadflow_common::Company;

#[derive(Clone)]
pub struct CompanyStore {
    pool: PgPool,
}

impl CompanyStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, name: &str, slug: &str) -> Result<Company> {
        let row = sqlx::query_as::<_, (Uuid, DateTime<Utc>)>(
            r#"
            INSERT INTO companies (name, slug)
            VALUES ($1, $2)
            RETURNING id, created_at
            "#,
        )
        .bind(name)
        .bind(slug)
        .fetch_one(&self.pool)
        .await?;

        Ok(Company {
            id: row.0,
            name: name.to_string(),
            slug: slug.to_string(),
            created_at: row.1,
        })
    }

    pub async fn exists(&self, id: Uuid) -> Result<bool> {
        let row = sqlx::query_as::<_, (bool,)>(
            "SELECT EXISTS(SELECT 1 FROM companies WHERE id = $1)",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.0)
    }
}
