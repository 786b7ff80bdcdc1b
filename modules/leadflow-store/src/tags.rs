//! TagStore — categorical labels on leads.
//!
//! At most one tag of a given type is active per lead. The unique index on
//! `(lead_id, tag_type)` backs the idempotent add: a duplicate is reported
//! as `TagAdd::Duplicate`, never an error.

use anyhow::Result;
use sqlx::PgPool;
use uuid::Uuid;

use leadflow_common::{Tag, TagType};

/// Outcome of an add. Duplicate adds are an expected success path.
#[derive(Debug, Clone)]
pub enum TagAdd {
    Added(Tag),
    Duplicate,
}

#[derive(Clone)]
pub struct TagStore {
    pool: PgPool,
}

impl TagStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn add(
        &self,
        lead_id: Uuid,
        tag_type: TagType,
        created_by: &str,
        is_auto_generated: bool,
        metadata: serde_json::Value,
    ) -> Result<TagAdd> {
        let row = sqlx::query_as::<_, Tag>(
            r#"
            INSERT INTO lead_tags (lead_id, tag_type, tag_value, is_auto_generated, created_by, metadata)
            VALUES ($1, $2, $2, $3, $4, $5)
            ON CONFLICT (lead_id, tag_type) DO NOTHING
            RETURNING id, lead_id, tag_type, tag_value, is_auto_generated, created_by, metadata, created_at
            "#,
        )
        .bind(lead_id)
        .bind(tag_type.as_str())
        .bind(is_auto_generated)
        .bind(created_by)
        .bind(&metadata)
        .fetch_optional(&self.pool)
        .await?;

        Ok(match row {
            Some(tag) => TagAdd::Added(tag),
            None => TagAdd::Duplicate,
        })
    }

    /// All tags on a lead, oldest first.
    pub async fn for_lead(&self, lead_id: Uuid) -> Result<Vec<Tag>> {
        let rows = sqlx::query_as::<_, Tag>(
            r#"
            SELECT id, lead_id, tag_type, tag_value, is_auto_generated, created_by, metadata, created_at
            FROM lead_tags
            WHERE lead_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(lead_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}
