use std::sync::Arc;

use anyhow::Result;
use axum::{
    routing::{get, post},
    Router,
};
use sqlx::postgres::PgPoolOptions;
use tracing::info;
use tracing_subscriber::EnvFilter;

use leadflow_common::Config;
use leadflow_pipeline::PipelineController;
use leadflow_store::{schema, ActivityLog, CompanyStore, LeadStore, SessionStore, TagStore};

mod rest;

pub struct AppState {
    pub controller: PipelineController,
    pub sessions: SessionStore,
    pub tags: TagStore,
    pub activity: ActivityLog,
    pub leads: LeadStore,
    pub companies: CompanyStore,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("leadflow=info".parse()?))
        .init();

    let config = Config::from_env();

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&config.database_url)
        .await?;

    schema::ensure_schema(&pool).await?;

    let state = Arc::new(AppState {
        controller: PipelineController::new(
            LeadStore::new(pool.clone()),
            TagStore::new(pool.clone()),
            ActivityLog::new(pool.clone()),
            CompanyStore::new(pool.clone()),
        ),
        sessions: SessionStore::new(pool.clone()),
        tags: TagStore::new(pool.clone()),
        activity: ActivityLog::new(pool.clone()),
        leads: LeadStore::new(pool.clone()),
        companies: CompanyStore::new(pool),
    });

    let app = Router::new()
        // Health check
        .route("/", get(|| async { "ok" }))
        // Activity recorder
        .route("/api/activity/track", post(rest::api_track_activity))
        .route("/api/activity/lead/{lead_id}", get(rest::api_lead_activities))
        // Tag engine
        .route("/api/tags/add", post(rest::api_add_tag))
        .route("/api/tags/lead/{lead_id}", get(rest::api_lead_tags))
        // Sessions
        .route("/api/sessions/start", post(rest::api_start_session))
        .route("/api/sessions/end", post(rest::api_end_session))
        .route("/api/sessions/active", get(rest::api_active_session))
        // Pipeline
        .route("/api/pipeline/move-lead", post(rest::api_move_lead))
        .route("/api/pipeline/notes", post(rest::api_add_note))
        .route("/api/pipeline/leads", post(rest::api_create_lead).get(rest::api_list_leads))
        .route("/api/pipeline/leads/{id}", get(rest::api_lead_detail))
        // Tenants
        .route("/api/companies", post(rest::api_create_company))
        .with_state(state)
        // CORS
        .layer(
            tower_http::cors::CorsLayer::new()
                .allow_origin(tower_http::cors::Any)
                .allow_methods(tower_http::cors::Any)
                .allow_headers(tower_http::cors::Any),
        )
        // Logging layer: method + path + status + latency only
        .layer(
            tower_http::trace::TraceLayer::new_for_http().make_span_with(
                |request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        path = %request.uri().path(),
                    )
                },
            ),
        );

    let addr = format!("{}:{}", config.web_host, config.web_port);
    info!("Leadflow API starting on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
