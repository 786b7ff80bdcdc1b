//! Schema bootstrap. Idempotent; safe to run on every startup.

use anyhow::Result;
use sqlx::PgPool;

/// Create the workflow tables if they do not exist.
pub async fn ensure_schema(pool: &PgPool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS companies (
            id         UUID         PRIMARY KEY DEFAULT gen_random_uuid(),
            name       TEXT         NOT NULL,
            slug       TEXT         NOT NULL UNIQUE,
            created_at TIMESTAMPTZ  NOT NULL DEFAULT now()
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS lead_pipeline (
            id         UUID         PRIMARY KEY DEFAULT gen_random_uuid(),
            company_id UUID         NOT NULL REFERENCES companies(id),
            stage      TEXT         NOT NULL DEFAULT 'new_lead',
            updated_at TIMESTAMPTZ  NOT NULL DEFAULT now()
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS cold_call_sessions (
            id              UUID         PRIMARY KEY DEFAULT gen_random_uuid(),
            user_name       TEXT         NOT NULL,
            start_time      TIMESTAMPTZ  NOT NULL DEFAULT now(),
            end_time        TIMESTAMPTZ,
            leads_processed BIGINT       NOT NULL DEFAULT 0,
            calls_made      BIGINT       NOT NULL DEFAULT 0,
            contacts_made   BIGINT       NOT NULL DEFAULT 0,
            voicemails_left BIGINT       NOT NULL DEFAULT 0
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS activity_log (
            id          UUID         PRIMARY KEY DEFAULT gen_random_uuid(),
            session_id  UUID         REFERENCES cold_call_sessions(id),
            lead_id     UUID         NOT NULL REFERENCES lead_pipeline(id),
            company_id  UUID         NOT NULL REFERENCES companies(id),
            user_name   TEXT         NOT NULL,
            action      TEXT         NOT NULL,
            action_data JSONB        NOT NULL DEFAULT '{}',
            created_at  TIMESTAMPTZ  NOT NULL DEFAULT now()
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS lead_tags (
            id                UUID         PRIMARY KEY DEFAULT gen_random_uuid(),
            lead_id           UUID         NOT NULL REFERENCES lead_pipeline(id),
            tag_type          TEXT         NOT NULL,
            tag_value         TEXT         NOT NULL,
            is_auto_generated BOOLEAN      NOT NULL DEFAULT false,
            created_by        TEXT         NOT NULL,
            metadata          JSONB        NOT NULL DEFAULT '{}',
            created_at        TIMESTAMPTZ  NOT NULL DEFAULT now()
        )
        "#,
    )
    .execute(pool)
    .await?;

    // One active tag of a given type per lead. Backs the idempotent add.
    sqlx::query(
        "CREATE UNIQUE INDEX IF NOT EXISTS idx_lead_tags_lead_type ON lead_tags(lead_id, tag_type)",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_activity_log_session ON activity_log(session_id)",
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_activity_log_lead ON activity_log(lead_id)")
        .execute(pool)
        .await?;

    Ok(())
}
