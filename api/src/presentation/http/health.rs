use std::sync::Arc;

use axum::{Json, Router, extract::State, routing::get};
use serde::Serialize;
use sqlx::PgPool;
use utoipa::ToSchema;

use crate::application::ports::document_cache::DocumentCache;

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResp {
    pub status: &'static str,
    pub database: bool,
    pub cached_documents: usize,
}

#[derive(Clone)]
pub struct HealthState {
    pub pool: PgPool,
    pub cache: Arc<dyn DocumentCache>,
}

#[utoipa::path(
    get,
    path = "/api/health",
    tag = "Health",
    responses((status = 200, body = HealthResp))
)]
pub async fn health(State(state): State<HealthState>) -> Json<HealthResp> {
    let db_ok = crate::infrastructure::db::ping(&state.pool).await;
    let status = if db_ok { "ok" } else { "degraded" };
    Json(HealthResp {
        status,
        database: db_ok,
        cached_documents: state.cache.len(),
    })
}

pub fn routes(pool: PgPool, cache: Arc<dyn DocumentCache>) -> Router {
    Router::new()
        .route("/health", get(health))
        .with_state(HealthState { pool, cache })
}
