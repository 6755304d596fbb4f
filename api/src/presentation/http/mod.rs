pub mod auth;
pub mod documents;
pub mod envelope;
pub mod health;

use axum::Router;

use crate::bootstrap::app_context::AppContext;

/// Auth and document endpoints, mounted under `/api`.
pub fn api_routes(ctx: AppContext) -> Router {
    Router::new().nest(
        "/api",
        auth::routes(ctx.clone()).merge(documents::routes(ctx)),
    )
}
