use std::collections::HashMap;
use std::time::Duration;

use axum::{
    Json, Router,
    extract::{FromRequestParts, Path, Query, State},
    http::request::Parts,
    routing::post,
};
use serde::{Deserialize, Serialize};
use tracing::warn;
use utoipa::ToSchema;

use crate::application::use_cases::auth::login::{Login as LoginUc, LoginRequest as LoginDto};
use crate::application::use_cases::auth::logout::Logout;
use crate::application::use_cases::auth::register::{
    Register as RegisterUc, RegisterRequest as RegisterDto,
};
use crate::application::use_cases::auth::validate_session::ValidateSession;
use crate::bootstrap::app_context::AppContext;
use crate::domain::documents::DocumentError;
use crate::presentation::http::envelope::{ApiError, ApiResp, ok_response};

const TOKEN_VALIDATION_TIMEOUT: Duration = Duration::from_secs(2);

#[derive(Debug, Deserialize, ToSchema)]
pub struct RegisterRequest {
    pub login: String,
    pub password: String,
    /// Admin token authorising the registration.
    pub token: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RegisterResponse {
    pub login: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub login: String,
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    pub token: String,
}

pub fn routes(ctx: AppContext) -> Router {
    Router::new()
        .route("/register", post(register))
        .route("/auth", post(login))
        .route("/auth/:token", post(logout))
        .with_state(ctx)
}

#[utoipa::path(post, path = "/api/register", tag = "Auth", request_body = RegisterRequest, responses(
    (status = 200, body = RegisterResponse),
    (status = 400, description = "Invalid admin token or credentials"),
    (status = 409, description = "Username exists")
))]
pub async fn register(
    State(ctx): State<AppContext>,
    Json(req): Json<RegisterRequest>,
) -> Result<Json<ApiResp<RegisterResponse>>, ApiError> {
    let repo = ctx.user_repo();
    let uc = RegisterUc {
        repo: repo.as_ref(),
        admin_token: &ctx.cfg.admin_token,
    };
    let dto = RegisterDto {
        login: req.login,
        password: req.password,
        token: req.token,
    };
    let user = uc.execute(&dto).await?;
    Ok(ok_response(RegisterResponse {
        login: user.username,
    }))
}

#[utoipa::path(post, path = "/api/auth", tag = "Auth", request_body = LoginRequest, responses(
    (status = 200, body = LoginResponse),
    (status = 400, description = "Invalid login or password")
))]
pub async fn login(
    State(ctx): State<AppContext>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<ApiResp<LoginResponse>>, ApiError> {
    let users = ctx.user_repo();
    let sessions = ctx.session_repo();
    let uc = LoginUc {
        users: users.as_ref(),
        sessions: sessions.as_ref(),
        session_ttl: ctx.cfg.session_ttl(),
    };
    let dto = LoginDto {
        login: req.login,
        password: req.password,
    };
    let issued = uc.execute(&dto).await?;
    Ok(ok_response(LoginResponse {
        token: issued.token,
    }))
}

#[utoipa::path(post, path = "/api/auth/{token}", tag = "Auth",
    params(("token" = String, Path, description = "Session token to revoke")),
    responses((status = 200, description = "`response.{token}` is true"), (status = 400, description = "Invalid token")))]
pub async fn logout(
    State(ctx): State<AppContext>,
    Path(token): Path<String>,
) -> Result<Json<ApiResp<HashMap<String, bool>>>, ApiError> {
    let uc = Logout {
        sessions: ctx.session_repo(),
    };
    uc.execute(&token).await?;
    Ok(ok_response(HashMap::from([(token, true)])))
}

// --- Session extractor ---

#[derive(Debug, Deserialize)]
struct TokenQuery {
    token: Option<String>,
}

/// Session token from `Authorization: Bearer` or, failing that, `?token=`.
pub(crate) fn token_from_parts(parts: &Parts) -> Option<String> {
    if let Some(auth) = parts
        .headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
    {
        if let Some(t) = auth.strip_prefix("Bearer ") {
            let t = t.trim();
            if !t.is_empty() {
                return Some(t.to_string());
            }
        }
    }
    Query::<TokenQuery>::try_from_uri(&parts.uri)
        .ok()
        .and_then(|Query(q)| q.token)
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
}

pub(crate) async fn authenticate(ctx: &AppContext, token: &str) -> Result<i64, ApiError> {
    let uc = ValidateSession {
        sessions: ctx.session_repo(),
    };
    match tokio::time::timeout(TOKEN_VALIDATION_TIMEOUT, uc.execute(token)).await {
        Ok(res) => res.map_err(ApiError::from),
        Err(_) => {
            warn!("token_validation_timed_out");
            Err(DocumentError::Timeout.into())
        }
    }
}

/// Id of the user owning the request's session token.
pub struct AuthUser(pub i64);

#[axum::async_trait]
impl FromRequestParts<AppContext> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        ctx: &AppContext,
    ) -> Result<Self, Self::Rejection> {
        let token = token_from_parts(parts).ok_or_else(ApiError::unauthorized)?;
        authenticate(ctx, &token).await.map(AuthUser)
    }
}
