//! Response envelope shared by every endpoint:
//! `{ "error": {code, text}?, "response": ...?, "data": ...? }`.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use tracing::error;
use utoipa::ToSchema;

use crate::domain::documents::DocumentError;
use crate::domain::users::AuthError;

pub const INVALID_DATA: &str = "invalid data";
pub const INVALID_TOKEN: &str = "invalid token";
const SOMETHING_WRONG: &str = "something went wrong";

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ApiErrorBody {
    pub code: u16,
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct ApiResp<R = (), D = ()> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ApiErrorBody>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<R>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<D>,
}

pub fn ok_response<R: Serialize>(response: R) -> Json<ApiResp<R, ()>> {
    Json(ApiResp {
        error: None,
        response: Some(response),
        data: None,
    })
}

pub fn ok_data<D: Serialize>(data: D) -> Json<ApiResp<(), D>> {
    Json(ApiResp {
        error: None,
        response: None,
        data: Some(data),
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub status: StatusCode,
    pub text: String,
}

impl ApiError {
    pub fn new(status: StatusCode, text: impl Into<String>) -> Self {
        Self {
            status,
            text: text.into(),
        }
    }

    pub fn bad_request(text: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, text)
    }

    pub fn unauthorized() -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "unauthorized")
    }

    pub fn internal() -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, SOMETHING_WRONG)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body: ApiResp = ApiResp {
            error: Some(ApiErrorBody {
                code: self.status.as_u16(),
                text: self.text,
            }),
            response: None,
            data: None,
        };
        (self.status, Json(body)).into_response()
    }
}

impl From<DocumentError> for ApiError {
    fn from(e: DocumentError) -> Self {
        match e {
            DocumentError::InvalidFilter(_)
            | DocumentError::NotFound
            | DocumentError::InvalidPayload(_) => ApiError::bad_request(e.to_string()),
            DocumentError::Forbidden => ApiError::new(StatusCode::FORBIDDEN, e.to_string()),
            DocumentError::ConstraintViolation => {
                ApiError::new(StatusCode::CONFLICT, e.to_string())
            }
            DocumentError::UnsupportedMediaType(_) => {
                ApiError::new(StatusCode::UNSUPPORTED_MEDIA_TYPE, e.to_string())
            }
            DocumentError::Timeout => ApiError::new(StatusCode::GATEWAY_TIMEOUT, "request timed out"),
            DocumentError::BackendUnavailable(_)
            | DocumentError::CreateFailed(_)
            | DocumentError::Internal(_) => {
                error!(error = %e, "document_request_failed");
                ApiError::internal()
            }
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::InvalidCredentials | AuthError::InvalidData(_) => {
                ApiError::bad_request(INVALID_DATA)
            }
            AuthError::InvalidToken => ApiError::bad_request(INVALID_TOKEN),
            AuthError::UsernameTaken => ApiError::new(StatusCode::CONFLICT, "username exists"),
            AuthError::Backend(inner) => {
                error!(error = ?inner, "auth_request_failed");
                ApiError::internal()
            }
        }
    }
}
