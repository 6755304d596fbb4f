use chrono::{DateTime, NaiveDateTime, Utc};

use super::error::DocumentError;

/// Columns a listing may filter on. Anything outside this set is rejected
/// before a query is built, so column names never come from caller input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterColumn {
    Name,
    Mime,
    IsFile,
    Public,
    CreatedAt,
}

/// Filter operand, typed to match its column.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    Text(String),
    Bool(bool),
    Timestamp(DateTime<Utc>),
}

impl FilterColumn {
    pub const ALL: [FilterColumn; 5] = [
        FilterColumn::Name,
        FilterColumn::Mime,
        FilterColumn::IsFile,
        FilterColumn::Public,
        FilterColumn::CreatedAt,
    ];

    pub fn parse(key: &str) -> Result<Self, DocumentError> {
        match key {
            "name" => Ok(FilterColumn::Name),
            "mime" => Ok(FilterColumn::Mime),
            "is_file" => Ok(FilterColumn::IsFile),
            "public" => Ok(FilterColumn::Public),
            "created_at" => Ok(FilterColumn::CreatedAt),
            other => Err(DocumentError::InvalidFilter(format!(
                "unknown filter key {other:?}"
            ))),
        }
    }

    pub fn column(self) -> &'static str {
        match self {
            FilterColumn::Name => "name",
            FilterColumn::Mime => "mime",
            FilterColumn::IsFile => "is_file",
            FilterColumn::Public => "public",
            FilterColumn::CreatedAt => "created_at",
        }
    }

    pub fn parse_value(self, raw: &str) -> Result<FilterValue, DocumentError> {
        match self {
            FilterColumn::Name | FilterColumn::Mime => Ok(FilterValue::Text(raw.to_string())),
            FilterColumn::IsFile | FilterColumn::Public => parse_bool(raw)
                .map(FilterValue::Bool)
                .ok_or_else(|| {
                    DocumentError::InvalidFilter(format!(
                        "{} expects a boolean, got {raw:?}",
                        self.column()
                    ))
                }),
            FilterColumn::CreatedAt => parse_timestamp(raw)
                .map(FilterValue::Timestamp)
                .ok_or_else(|| {
                    DocumentError::InvalidFilter(format!(
                        "created_at expects a timestamp, got {raw:?}"
                    ))
                }),
        }
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "t" | "1" | "yes" => Some(true),
        "false" | "f" | "0" | "no" => Some(false),
        _ => None,
    }
}

// Accepts RFC 3339 and the "%Y-%m-%d %H:%M:%S" form used in listing output (read as UTC).
fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
        .ok()
        .map(|naive| naive.and_utc())
}

/// Which library a listing looks at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListScope {
    /// The requester's own documents.
    Owner,
    /// Another user's documents seen through the public / grant lens.
    Shared { owner_id: i64 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ListFilter {
    pub column: FilterColumn,
    pub value: FilterValue,
    pub scope: ListScope,
    pub limit: i64,
}

impl ListFilter {
    /// Validates the raw key / value pair. Does not touch any store.
    pub fn parse_condition(key: &str, value: &str) -> Result<(FilterColumn, FilterValue), DocumentError> {
        let column = FilterColumn::parse(key)?;
        let value = column.parse_value(value)?;
        Ok((column, value))
    }
}
