use std::collections::HashMap;

use axum::{
    Json, Router,
    extract::{FromRequestParts, Multipart, Path, Query, State},
    http::{StatusCode, header, request::Parts},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::application::use_cases::documents::create_document::{
    CreateDocument, CreateDocumentRequest, UploadedFile,
};
use crate::application::use_cases::documents::delete_document::DeleteDocument;
use crate::application::use_cases::documents::get_document::{DocumentContent, GetDocument};
use crate::application::use_cases::documents::list_documents::{
    ListDocuments, ListDocumentsQuery,
};
use crate::bootstrap::app_context::AppContext;
use crate::domain::documents::DocumentSummary;
use crate::presentation::http::auth::{self, AuthUser};
use crate::presentation::http::envelope::{ApiError, ApiResp, INVALID_DATA, ok_data, ok_response};

pub const DEFAULT_LIST_LIMIT: i64 = 50;
const CREATED_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Serialize, ToSchema)]
pub struct DocumentItem {
    pub id: Uuid,
    pub name: String,
    pub mime: String,
    pub file: bool,
    pub public: bool,
    /// `YYYY-MM-DD HH:MM:SS`, UTC.
    pub created: String,
    pub grant: Vec<String>,
}

impl From<DocumentSummary> for DocumentItem {
    fn from(d: DocumentSummary) -> Self {
        Self {
            id: d.id,
            name: d.name,
            mime: d.mime,
            file: d.is_file,
            public: d.public,
            created: d.created_at.format(CREATED_FORMAT).to_string(),
            grant: d.granted_users,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DocumentListResponse {
    pub docs: Vec<DocumentItem>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UploadResponse {
    pub id: Uuid,
    #[schema(value_type = Option<Object>)]
    pub json: Option<Value>,
    /// Name of the created document.
    pub file: String,
}

/// The `meta` multipart part.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UploadMeta {
    pub name: String,
    #[serde(default)]
    pub file: bool,
    #[serde(default)]
    pub public: bool,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub mime: Option<String>,
    #[serde(default)]
    pub grant: Vec<String>,
}

#[derive(ToSchema)]
#[allow(dead_code)]
pub struct UploadDocumentMultipart {
    /// JSON-encoded `UploadMeta`
    meta: String,
    /// Inline JSON payload (json documents)
    json: Option<String>,
    /// Binary payload (file documents)
    #[schema(value_type = Option<String>, format = Binary)]
    file: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListParams {
    /// Filter column: name, mime, is_file, public or created_at
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub value: String,
    /// Browse this user's public and shared documents instead of your own
    pub login: Option<String>,
    /// 0, empty or absent means 50
    pub limit: Option<String>,
}

/// Negative values pass through and fail filter validation.
fn parse_limit(raw: Option<&str>) -> Result<i64, ApiError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(DEFAULT_LIST_LIMIT),
        Some(s) => match s.parse::<i64>() {
            Ok(0) => Ok(DEFAULT_LIST_LIMIT),
            Ok(n) => Ok(n),
            Err(_) => Err(ApiError::bad_request(INVALID_DATA)),
        },
    }
}

pub fn routes(ctx: AppContext) -> Router {
    Router::new()
        .route(
            "/docs",
            post(upload_document).get(list_documents).head(head_ok),
        )
        .route(
            "/docs/:id",
            get(get_document).head(head_ok).delete(delete_document),
        )
        .with_state(ctx)
}

/// Session token found in the headers or query string, if any.
pub struct MaybeToken(pub Option<String>);

#[axum::async_trait]
impl<S> FromRequestParts<S> for MaybeToken
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(MaybeToken(auth::token_from_parts(parts)))
    }
}

#[utoipa::path(post, path = "/api/docs", tag = "Documents",
    request_body(content = UploadDocumentMultipart, content_type = "multipart/form-data"),
    responses(
        (status = 200, body = UploadResponse),
        (status = 400, description = "Malformed upload or invalid token"),
        (status = 415, description = "File type not allowed")
    ))]
pub async fn upload_document(
    State(ctx): State<AppContext>,
    MaybeToken(header_token): MaybeToken,
    mut multipart: Multipart,
) -> Result<Json<ApiResp<(), UploadResponse>>, ApiError> {
    let mut meta: Option<UploadMeta> = None;
    let mut json: Option<Value> = None;
    let mut file: Option<UploadedFile> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|_| ApiError::bad_request(INVALID_DATA))?
    {
        let name = field.name().map(|s| s.to_string());
        match name.as_deref() {
            Some("meta") => {
                let raw = field
                    .text()
                    .await
                    .map_err(|_| ApiError::bad_request(INVALID_DATA))?;
                meta = Some(
                    serde_json::from_str(&raw).map_err(|_| ApiError::bad_request("invalid meta"))?,
                );
            }
            Some("json") => {
                let raw = field
                    .text()
                    .await
                    .map_err(|_| ApiError::bad_request(INVALID_DATA))?;
                if !raw.trim().is_empty() {
                    json = Some(
                        serde_json::from_str(&raw)
                            .map_err(|_| ApiError::bad_request("invalid json"))?,
                    );
                }
            }
            Some("file") => {
                let filename = field.file_name().map(|s| s.to_string());
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|_| ApiError::bad_request(INVALID_DATA))?;
                file = Some(UploadedFile {
                    bytes: bytes.to_vec(),
                    filename,
                });
            }
            _ => {}
        }
    }

    let meta = meta.ok_or_else(|| ApiError::bad_request("meta is required"))?;
    let token = meta
        .token
        .clone()
        .filter(|t| !t.trim().is_empty())
        .or(header_token)
        .ok_or_else(ApiError::unauthorized)?;
    let owner_id = auth::authenticate(&ctx, &token).await?;

    let repo = ctx.document_repo();
    let blobs = ctx.blob_store();
    let uc = CreateDocument {
        repo: repo.as_ref(),
        blobs: blobs.as_ref(),
        deadline: ctx.cfg.request_timeout(),
    };
    let created = uc
        .execute(CreateDocumentRequest {
            owner_id,
            name: meta.name,
            mime: meta.mime,
            public: meta.public,
            is_file: meta.file,
            grants: meta.grant,
            json,
            file,
        })
        .await?;

    Ok(ok_data(UploadResponse {
        id: created.id,
        json: created.json,
        file: created.name,
    }))
}

#[utoipa::path(get, path = "/api/docs", tag = "Documents",
    params(ListParams, ("token" = Option<String>, Query, description = "Session token when no bearer header is sent")),
    responses(
        (status = 200, body = DocumentListResponse),
        (status = 400, description = "Invalid filter")
    ))]
pub async fn list_documents(
    State(ctx): State<AppContext>,
    AuthUser(user_id): AuthUser,
    Query(params): Query<ListParams>,
) -> Result<Json<ApiResp<(), DocumentListResponse>>, ApiError> {
    let limit = parse_limit(params.limit.as_deref())?;
    let repo = ctx.document_repo();
    let identities = ctx.identity_resolver();
    let uc = ListDocuments {
        repo: repo.as_ref(),
        identities: identities.as_ref(),
        deadline: ctx.cfg.request_timeout(),
    };
    let docs = uc
        .execute(&ListDocumentsQuery {
            requester_id: user_id,
            key: params.key,
            value: params.value,
            login: params.login,
            limit,
        })
        .await?;
    Ok(ok_data(DocumentListResponse {
        docs: docs.into_iter().map(DocumentItem::from).collect(),
    }))
}

pub async fn head_ok(_user: AuthUser) -> StatusCode {
    StatusCode::OK
}

fn parse_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw.trim()).map_err(|_| ApiError::bad_request(INVALID_DATA))
}

#[utoipa::path(get, path = "/api/docs/{id}", tag = "Documents",
    params(("id" = Uuid, Path, description = "Document ID")),
    responses(
        (status = 200, description = "Raw bytes for files, `data` holds the JSON payload otherwise"),
        (status = 400, description = "Document not found")
    ))]
pub async fn get_document(
    State(ctx): State<AppContext>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let id = parse_id(&id)?;
    let repo = ctx.document_repo();
    let blobs = ctx.blob_store();
    let cache = ctx.document_cache();
    let uc = GetDocument {
        repo: repo.as_ref(),
        blobs: blobs.as_ref(),
        cache: cache.as_ref(),
        cache_ttl: ctx.cfg.cache_ttl(),
        deadline: ctx.cfg.request_timeout(),
    };
    let resp = match uc.execute(user_id, id).await? {
        DocumentContent::Binary { bytes, mime } => {
            ([(header::CONTENT_TYPE, mime)], bytes).into_response()
        }
        DocumentContent::Json(value) => ok_data(value).into_response(),
    };
    Ok(resp)
}

#[utoipa::path(delete, path = "/api/docs/{id}", tag = "Documents",
    params(("id" = Uuid, Path, description = "Document ID")),
    responses(
        (status = 200, description = "`response.{id}` is true"),
        (status = 403, description = "Not the owner")
    ))]
pub async fn delete_document(
    State(ctx): State<AppContext>,
    AuthUser(user_id): AuthUser,
    Path(raw_id): Path<String>,
) -> Result<Json<ApiResp<HashMap<String, bool>>>, ApiError> {
    let id = parse_id(&raw_id)?;
    let repo = ctx.document_repo();
    let cache = ctx.document_cache();
    let uc = DeleteDocument {
        repo: repo.as_ref(),
        cache: cache.as_ref(),
        deadline: ctx.cfg.request_timeout(),
    };
    uc.execute(user_id, id).await?;
    Ok(ok_response(HashMap::from([(id.to_string(), true)])))
}
