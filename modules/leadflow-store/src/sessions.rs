//! SessionStore — cold-call session lifecycle and summary counters.
//!
//! At most one session per operator is open at a time. Starting a new one
//! seals any prior open session first (last-start-wins). Counters are
//! aggregated from the activity log at close, not maintained incrementally.

use anyhow::Result;
use sqlx::PgPool;
use uuid::Uuid;

use leadflow_common::{actions, Session};

#[derive(Clone)]
pub struct SessionStore {
    pool: PgPool,
}

impl SessionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Open a session for an operator. Any prior open session for the same
    /// operator is ended (with its counters computed) first.
    pub async fn start(&self, user_name: &str) -> Result<Session> {
        self.end_open(user_name).await?;

        let session = sqlx::query_as::<_, Session>(
            r#"
            INSERT INTO cold_call_sessions (user_name)
            VALUES ($1)
            RETURNING id, user_name, start_time, end_time,
                      leads_processed, calls_made, contacts_made, voicemails_left
            "#,
        )
        .bind(user_name)
        .fetch_one(&self.pool)
        .await?;

        Ok(session)
    }

    /// The operator's open session, if any. Newest first if several exist
    /// (possible only through races; the newest is the live one).
    pub async fn active(&self, user_name: &str) -> Result<Option<Session>> {
        let session = sqlx::query_as::<_, Session>(
            r#"
            SELECT id, user_name, start_time, end_time,
                   leads_processed, calls_made, contacts_made, voicemails_left
            FROM cold_call_sessions
            WHERE user_name = $1 AND end_time IS NULL
            ORDER BY start_time DESC
            LIMIT 1
            "#,
        )
        .bind(user_name)
        .fetch_optional(&self.pool)
        .await?;

        Ok(session)
    }

    /// Seal the operator's open session: aggregate its activity rows into
    /// the summary counters, stamp end_time, and return the sealed session.
    /// Returns `None` when there is no open session — a no-op success.
    pub async fn end_open(&self, user_name: &str) -> Result<Option<Session>> {
        let Some(open) = self.active(user_name).await? else {
            return Ok(None);
        };

        let (leads_processed, calls_made, contacts_made, voicemails_left) =
            self.summarize(open.id).await?;

        let sealed = sqlx::query_as::<_, Session>(
            r#"
            UPDATE cold_call_sessions
            SET end_time = now(),
                leads_processed = $1,
                calls_made = $2,
                contacts_made = $3,
                voicemails_left = $4
            WHERE id = $5
            RETURNING id, user_name, start_time, end_time,
                      leads_processed, calls_made, contacts_made, voicemails_left
            "#,
        )
        .bind(leads_processed)
        .bind(calls_made)
        .bind(contacts_made)
        .bind(voicemails_left)
        .bind(open.id)
        .fetch_one(&self.pool)
        .await?;

        Ok(Some(sealed))
    }

    async fn summarize(&self, session_id: Uuid) -> Result<(i64, i64, i64, i64)> {
        let row = sqlx::query_as::<_, (i64, i64, i64, i64)>(
            r#"
            SELECT COUNT(DISTINCT lead_id),
                   COUNT(*) FILTER (WHERE action = $2),
                   COUNT(*) FILTER (WHERE action = $3),
                   COUNT(*) FILTER (WHERE action = $4)
            FROM activity_log
            WHERE session_id = $1
            "#,
        )
        .bind(session_id)
        .bind(actions::CALL_STARTED)
        .bind(actions::OWNER_EMAIL_ADDED)
        .bind(actions::SMS_VOICEMAIL_2_SENT)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }
}
