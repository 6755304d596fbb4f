use async_trait::async_trait;
use serde_json::Value;
use sqlx::postgres::{PgArguments, PgRow};
use sqlx::query::Query;
use sqlx::{Postgres, Row, Transaction};
use tracing::{error, warn};
use uuid::Uuid;

use crate::application::ports::document_repository::DocumentRepository;
use crate::domain::documents::{
    Document, DocumentError, DocumentPayload, DocumentSummary, FilterValue, ListFilter, ListScope,
    NewDocument,
};
use crate::infrastructure::db::PgPool;
use crate::infrastructure::db::repositories::user_repository_sqlx::resolve_user_ids;
use crate::infrastructure::db::visibility_query::build_list_query;

pub struct SqlxDocumentRepository {
    pub pool: PgPool,
}

impl SqlxDocumentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn insert_in_tx(
        tx: &mut Transaction<'_, Postgres>,
        id: Uuid,
        doc: &NewDocument,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"INSERT INTO documents (id, name, public, is_file, mime, json_data, file_path, own_id)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8)"#,
        )
        .bind(id)
        .bind(&doc.name)
        .bind(doc.public)
        .bind(doc.payload.is_file())
        .bind(&doc.mime)
        .bind(doc.payload.json_column())
        .bind(doc.payload.file_path_column())
        .bind(doc.owner_id)
        .execute(&mut **tx)
        .await?;

        if doc.grants.is_empty() {
            return Ok(());
        }
        let grantee_ids = resolve_user_ids(&mut **tx, &doc.grants).await?;
        if grantee_ids.len() < doc.grants.len() {
            warn!(document_id = %id, requested = doc.grants.len(), resolved = grantee_ids.len(), "unknown_grantees_skipped");
        }
        if grantee_ids.is_empty() {
            return Ok(());
        }
        sqlx::query(
            r#"INSERT INTO document_grants (document_id, granted_user_id)
               SELECT $1, UNNEST($2::BIGINT[])
               ON CONFLICT (document_id, granted_user_id) DO NOTHING"#,
        )
        .bind(id)
        .bind(&grantee_ids)
        .execute(&mut **tx)
        .await?;
        Ok(())
    }
}

fn map_create_error(e: sqlx::Error) -> DocumentError {
    let unique = e
        .as_database_error()
        .map(|db| db.is_unique_violation())
        .unwrap_or(false);
    if unique {
        DocumentError::ConstraintViolation
    } else {
        DocumentError::CreateFailed(e.to_string())
    }
}

fn unavailable(e: sqlx::Error) -> DocumentError {
    error!(error = ?e, "document_store_failed");
    DocumentError::BackendUnavailable(e.to_string())
}

fn bind_value<'q>(
    q: Query<'q, Postgres, PgArguments>,
    value: &'q FilterValue,
) -> Query<'q, Postgres, PgArguments> {
    match value {
        FilterValue::Text(v) => q.bind(v),
        FilterValue::Bool(v) => q.bind(*v),
        FilterValue::Timestamp(v) => q.bind(*v),
    }
}

fn decoded<T>(res: Result<T, sqlx::Error>, column: &str) -> Result<T, DocumentError> {
    res.map_err(|e| {
        error!(column, error = ?e, "document_column_decode_failed");
        DocumentError::Internal(format!("cannot decode {column}: {e}"))
    })
}

fn summary_from_row(r: &PgRow) -> Result<DocumentSummary, DocumentError> {
    Ok(DocumentSummary {
        id: r.get("id"),
        owner_id: r.get("own_id"),
        name: r.get("name"),
        mime: r.get("mime"),
        is_file: r.get("is_file"),
        public: r.get("public"),
        created_at: r.get("created_at"),
        granted_users: decoded(r.try_get("granted_users"), "granted_users")?,
        granted_user_ids: decoded(r.try_get("granted_user_ids"), "granted_user_ids")?,
    })
}

#[async_trait]
impl DocumentRepository for SqlxDocumentRepository {
    async fn create(&self, doc: &NewDocument) -> Result<Uuid, DocumentError> {
        let id = Uuid::new_v4();
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DocumentError::BackendUnavailable(e.to_string()))?;

        if let Err(e) = Self::insert_in_tx(&mut tx, id, doc).await {
            if let Err(rb) = tx.rollback().await {
                warn!(document_id = %id, error = ?rb, "rollback_failed");
            }
            error!(document_id = %id, error = ?e, "document_create_failed");
            return Err(map_create_error(e));
        }
        tx.commit().await.map_err(map_create_error)?;
        Ok(id)
    }

    async fn get_owned(&self, requester_id: i64, id: Uuid) -> Result<Document, DocumentError> {
        let row = sqlx::query(
            r#"SELECT id, own_id, name, mime, public, is_file, json_data, file_path, created_at
               FROM documents
               WHERE id = $1 AND own_id = $2"#,
        )
        .bind(id)
        .bind(requester_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(unavailable)?
        .ok_or(DocumentError::NotFound)?;

        let json: Option<Value> = decoded(row.try_get("json_data"), "json_data")?;
        let file_path: Option<String> = decoded(row.try_get("file_path"), "file_path")?;
        let payload = DocumentPayload::from_columns(row.get("is_file"), json, file_path)?;

        Ok(Document {
            id: row.get("id"),
            owner_id: row.get("own_id"),
            name: row.get("name"),
            mime: row.get("mime"),
            public: row.get("public"),
            created_at: row.get("created_at"),
            payload,
        })
    }

    async fn list(
        &self,
        requester_id: i64,
        filter: &ListFilter,
    ) -> Result<Vec<DocumentSummary>, DocumentError> {
        let sql = build_list_query(&filter.scope, filter.column);
        let q = match filter.scope {
            ListScope::Owner => bind_value(sqlx::query(&sql).bind(requester_id), &filter.value),
            ListScope::Shared { owner_id } => bind_value(
                sqlx::query(&sql).bind(owner_id).bind(requester_id),
                &filter.value,
            ),
        };
        let rows = q
            .bind(filter.limit)
            .fetch_all(&self.pool)
            .await
            .map_err(unavailable)?;
        rows.iter().map(summary_from_row).collect()
    }

    async fn delete_owned(&self, owner_id: i64, id: Uuid) -> Result<(), DocumentError> {
        let res = sqlx::query("DELETE FROM documents WHERE id = $1 AND own_id = $2")
            .bind(id)
            .bind(owner_id)
            .execute(&self.pool)
            .await
            .map_err(unavailable)?;
        if res.rows_affected() == 0 {
            return Err(DocumentError::Forbidden);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn undecodable_grant_column_is_an_internal_error() {
        let missing: Result<Vec<i64>, sqlx::Error> =
            Err(sqlx::Error::ColumnNotFound("granted_user_ids".into()));
        assert!(matches!(
            decoded(missing, "granted_user_ids"),
            Err(DocumentError::Internal(msg)) if msg.contains("granted_user_ids")
        ));
        assert_eq!(decoded(Ok::<_, sqlx::Error>(vec![3_i64]), "granted_user_ids"), Ok(vec![3]));
    }

    #[test]
    fn other_insert_errors_are_create_failures() {
        assert!(matches!(
            map_create_error(sqlx::Error::RowNotFound),
            DocumentError::CreateFailed(_)
        ));
    }
}
