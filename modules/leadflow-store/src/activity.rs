//! ActivityLog — append-only fact store for operator and visitor actions.
//!
//! Rows are immutable once written. No dedup: repeated identical activities
//! are all stored. The session counters are derived from this log at
//! session close.

use anyhow::Result;
use sqlx::PgPool;
use uuid::Uuid;

use leadflow_common::{actions, Activity, NewActivity};

#[derive(Clone)]
pub struct ActivityLog {
    pool: PgPool,
}

impl ActivityLog {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Append one immutable row. The store assigns id and created_at.
    pub async fn record(&self, activity: NewActivity) -> Result<Activity> {
        let stored = sqlx::query_as::<_, Activity>(
            r#"
            INSERT INTO activity_log (session_id, lead_id, company_id, user_name, action, action_data)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, session_id, lead_id, company_id, user_name, action, action_data, created_at
            "#,
        )
        .bind(activity.session_id)
        .bind(activity.lead_id)
        .bind(activity.company_id)
        .bind(&activity.user_name)
        .bind(&activity.action)
        .bind(&activity.action_data)
        .fetch_one(&self.pool)
        .await?;

        Ok(stored)
    }

    /// All activities for a lead, oldest first.
    pub async fn for_lead(&self, lead_id: Uuid) -> Result<Vec<Activity>> {
        let rows = sqlx::query_as::<_, Activity>(
            r#"
            SELECT id, session_id, lead_id, company_id, user_name, action, action_data, created_at
            FROM activity_log
            WHERE lead_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(lead_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// All activities for a session, oldest first.
    pub async fn for_session(&self, session_id: Uuid) -> Result<Vec<Activity>> {
        let rows = sqlx::query_as::<_, Activity>(
            r#"
            SELECT id, session_id, lead_id, company_id, user_name, action, action_data, created_at
            FROM activity_log
            WHERE session_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(session_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Count of recorded site visits for a lead. Feeds the return-visitor rule.
    pub async fn site_visit_count(&self, lead_id: Uuid) -> Result<i64> {
        let row = sqlx::query_as::<_, (i64,)>(
            "SELECT COUNT(*) FROM activity_log WHERE lead_id = $1 AND action = $2",
        )
        .bind(lead_id)
        .bind(actions::WEBSITE_VISITED)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.0)
    }
}
