use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde_json::Value;
use uuid::Uuid;

use super::error::DocumentError;

pub const DEFAULT_JSON_MIME: &str = "application/json";

/// Content of a document. A document is either an inline JSON blob or a file
/// kept on the blob store and addressed by an opaque locator.
#[derive(Debug, Clone, PartialEq)]
pub enum DocumentPayload {
    Json(Value),
    File { locator: String },
}

impl DocumentPayload {
    pub fn is_file(&self) -> bool {
        matches!(self, DocumentPayload::File { .. })
    }

    pub fn json_column(&self) -> Option<&Value> {
        match self {
            DocumentPayload::Json(v) => Some(v),
            DocumentPayload::File { .. } => None,
        }
    }

    pub fn file_path_column(&self) -> Option<&str> {
        match self {
            DocumentPayload::Json(_) => None,
            DocumentPayload::File { locator } => Some(locator.as_str()),
        }
    }

    /// Rebuilds the payload from the persisted `is_file`, `json_data` and
    /// `file_path` columns. Exactly one of json / file path must be set and it
    /// must agree with `is_file`.
    pub fn from_columns(
        is_file: bool,
        json: Option<Value>,
        file_path: Option<String>,
    ) -> Result<Self, DocumentError> {
        let json = json.filter(|v| !v.is_null());
        let file_path = file_path.filter(|p| !p.is_empty());
        match (is_file, json, file_path) {
            (true, None, Some(locator)) => Ok(DocumentPayload::File { locator }),
            (false, Some(v), None) => Ok(DocumentPayload::Json(v)),
            (is_file, json, path) => Err(DocumentError::Internal(format!(
                "document row violates payload shape (is_file={}, json={}, file_path={})",
                is_file,
                json.is_some(),
                path.is_some()
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: Uuid,
    pub owner_id: i64,
    pub name: String,
    pub mime: String,
    pub public: bool,
    pub created_at: DateTime<Utc>,
    pub payload: DocumentPayload,
}

/// Listing row: metadata plus the grant set, never the payload.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentSummary {
    pub id: Uuid,
    pub owner_id: i64,
    pub name: String,
    pub mime: String,
    pub is_file: bool,
    pub public: bool,
    pub created_at: DateTime<Utc>,
    pub granted_users: Vec<String>,
    pub granted_user_ids: Vec<i64>,
}

impl DocumentSummary {
    /// `name` ascending, ties broken newest first.
    pub fn listing_order(a: &Self, b: &Self) -> Ordering {
        a.name
            .cmp(&b.name)
            .then_with(|| b.created_at.cmp(&a.created_at))
    }
}

pub fn sort_for_listing(docs: &mut [DocumentSummary]) {
    docs.sort_by(DocumentSummary::listing_order);
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewDocument {
    pub owner_id: i64,
    pub name: String,
    pub mime: String,
    pub public: bool,
    pub payload: DocumentPayload,
    pub grants: Vec<String>,
}

/// Trims grant usernames, drops blanks and repeated names while keeping the
/// first-seen order.
pub fn normalize_grantees(usernames: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(usernames.len());
    for name in usernames {
        let trimmed = name.trim();
        if trimmed.is_empty() || out.iter().any(|n| n == trimmed) {
            continue;
        }
        out.push(trimmed.to_string());
    }
    out
}
