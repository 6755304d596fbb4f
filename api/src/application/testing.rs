//! In-memory port implementations for unit tests.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::application::ports::blob_store::{BlobStore, BlobStoreError, StoredBlob};
use crate::application::ports::document_repository::DocumentRepository;
use crate::application::ports::identity_resolver::IdentityResolver;
use crate::application::ports::session_repository::{SessionRepository, SessionRow};
use crate::application::ports::user_repository::{UserRepository, UserRow};
use crate::domain::documents::document::sort_for_listing;
use crate::domain::documents::{
    Document, DocumentError, DocumentPayload, DocumentSummary, FilterColumn, FilterValue,
    ListFilter, ListScope, NewDocument,
};
use crate::infrastructure::storage::sniff;

#[derive(Debug, Clone)]
struct StoredDocument {
    id: Uuid,
    owner_id: i64,
    name: String,
    mime: String,
    public: bool,
    created_at: DateTime<Utc>,
    payload: DocumentPayload,
}

#[derive(Default)]
struct State {
    users: Vec<UserRow>,
    sessions: HashMap<String, SessionRow>,
    documents: Vec<StoredDocument>,
    grants: Vec<(Uuid, i64)>,
    next_token_id: i64,
    created: i64,
}

#[derive(Default)]
pub struct InMemoryStore {
    state: Mutex<State>,
    repo_calls: AtomicUsize,
    unavailable: AtomicBool,
    leaky_listing: AtomicBool,
    latency: Mutex<Option<Duration>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_user(&self, username: &str) -> i64 {
        let mut state = self.state.lock().unwrap();
        let id = state.users.len() as i64 + 1;
        state.users.push(UserRow {
            id,
            username: username.to_string(),
            pass_hash: Some(String::new()),
        });
        id
    }

    pub fn add_session(&self, user_id: i64, token: &str, expire_at: DateTime<Utc>) {
        let mut state = self.state.lock().unwrap();
        state.next_token_id += 1;
        let row = SessionRow {
            token_id: state.next_token_id,
            user_id,
            created_at: Utc::now(),
            expire_at,
        };
        state.sessions.insert(token.to_string(), row);
    }

    pub fn session_count(&self) -> usize {
        self.state.lock().unwrap().sessions.len()
    }

    pub fn document_exists(&self, id: Uuid) -> bool {
        self.state
            .lock()
            .unwrap()
            .documents
            .iter()
            .any(|d| d.id == id)
    }

    pub fn grants_for(&self, id: Uuid) -> Vec<i64> {
        let mut ids: Vec<i64> = self
            .state
            .lock()
            .unwrap()
            .grants
            .iter()
            .filter(|(doc, _)| *doc == id)
            .map(|(_, user)| *user)
            .collect();
        ids.sort_unstable();
        ids
    }

    /// Number of document repository calls made so far.
    pub fn repo_calls(&self) -> usize {
        self.repo_calls.load(Ordering::SeqCst)
    }

    pub fn set_unavailable(&self, down: bool) {
        self.unavailable.store(down, Ordering::SeqCst);
    }

    /// Makes `list` ignore visibility rules, emulating a broken query.
    pub fn set_leaky_listing(&self, leaky: bool) {
        self.leaky_listing.store(leaky, Ordering::SeqCst);
    }

    pub fn set_latency(&self, latency: Duration) {
        *self.latency.lock().unwrap() = Some(latency);
    }

    async fn enter(&self) -> Result<(), DocumentError> {
        self.repo_calls.fetch_add(1, Ordering::SeqCst);
        let latency = *self.latency.lock().unwrap();
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(DocumentError::BackendUnavailable("store offline".into()));
        }
        Ok(())
    }

    fn grant_names(state: &State, id: Uuid) -> (Vec<String>, Vec<i64>) {
        let ids: Vec<i64> = state
            .grants
            .iter()
            .filter(|(doc, _)| *doc == id)
            .map(|(_, user)| *user)
            .collect();
        let names = state
            .users
            .iter()
            .filter(|u| ids.contains(&u.id))
            .map(|u| u.username.clone())
            .collect();
        (names, ids)
    }

    fn matches(doc: &StoredDocument, column: FilterColumn, value: &FilterValue) -> bool {
        match (column, value) {
            (FilterColumn::Name, FilterValue::Text(v)) => &doc.name == v,
            (FilterColumn::Mime, FilterValue::Text(v)) => &doc.mime == v,
            (FilterColumn::IsFile, FilterValue::Bool(v)) => doc.payload.is_file() == *v,
            (FilterColumn::Public, FilterValue::Bool(v)) => doc.public == *v,
            (FilterColumn::CreatedAt, FilterValue::Timestamp(v)) => doc.created_at == *v,
            _ => false,
        }
    }
}

#[async_trait]
impl DocumentRepository for InMemoryStore {
    async fn create(&self, doc: &NewDocument) -> Result<Uuid, DocumentError> {
        self.enter().await?;
        let mut state = self.state.lock().unwrap();
        let id = Uuid::new_v4();
        state.created += 1;
        let created_at = Utc::now() + chrono::Duration::seconds(state.created);
        state.documents.push(StoredDocument {
            id,
            owner_id: doc.owner_id,
            name: doc.name.clone(),
            mime: doc.mime.clone(),
            public: doc.public,
            created_at,
            payload: doc.payload.clone(),
        });
        let grantees: Vec<i64> = state
            .users
            .iter()
            .filter(|u| doc.grants.contains(&u.username))
            .map(|u| u.id)
            .collect();
        for user_id in grantees {
            if !state.grants.contains(&(id, user_id)) {
                state.grants.push((id, user_id));
            }
        }
        Ok(id)
    }

    async fn get_owned(&self, requester_id: i64, id: Uuid) -> Result<Document, DocumentError> {
        self.enter().await?;
        let state = self.state.lock().unwrap();
        let doc = state
            .documents
            .iter()
            .find(|d| d.id == id && d.owner_id == requester_id)
            .ok_or(DocumentError::NotFound)?;
        Ok(Document {
            id: doc.id,
            owner_id: doc.owner_id,
            name: doc.name.clone(),
            mime: doc.mime.clone(),
            public: doc.public,
            created_at: doc.created_at,
            payload: doc.payload.clone(),
        })
    }

    async fn list(
        &self,
        requester_id: i64,
        filter: &ListFilter,
    ) -> Result<Vec<DocumentSummary>, DocumentError> {
        self.enter().await?;
        let leaky = self.leaky_listing.load(Ordering::SeqCst);
        let state = self.state.lock().unwrap();
        let mut out: Vec<DocumentSummary> = state
            .documents
            .iter()
            .filter(|d| Self::matches(d, filter.column, &filter.value))
            .filter_map(|d| {
                let (granted_users, granted_user_ids) = Self::grant_names(&state, d.id);
                let visible = leaky
                    || match filter.scope {
                        ListScope::Owner => d.owner_id == requester_id,
                        ListScope::Shared { owner_id } => {
                            d.owner_id == owner_id
                                && (d.public || granted_user_ids.contains(&requester_id))
                        }
                    };
                visible.then(|| DocumentSummary {
                    id: d.id,
                    owner_id: d.owner_id,
                    name: d.name.clone(),
                    mime: d.mime.clone(),
                    is_file: d.payload.is_file(),
                    public: d.public,
                    created_at: d.created_at,
                    granted_users,
                    granted_user_ids,
                })
            })
            .collect();
        sort_for_listing(&mut out);
        out.truncate(filter.limit.max(0) as usize);
        Ok(out)
    }

    async fn delete_owned(&self, owner_id: i64, id: Uuid) -> Result<(), DocumentError> {
        self.enter().await?;
        let mut state = self.state.lock().unwrap();
        let before = state.documents.len();
        state
            .documents
            .retain(|d| !(d.id == id && d.owner_id == owner_id));
        if state.documents.len() == before {
            return Err(DocumentError::Forbidden);
        }
        state.grants.retain(|(doc, _)| *doc != id);
        Ok(())
    }
}

#[async_trait]
impl IdentityResolver for InMemoryStore {
    async fn resolve_username(&self, username: &str) -> anyhow::Result<Option<i64>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .users
            .iter()
            .find(|u| u.username == username)
            .map(|u| u.id))
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn create_user(
        &self,
        username: &str,
        pass_hash: &str,
    ) -> anyhow::Result<Option<UserRow>> {
        let mut state = self.state.lock().unwrap();
        if state.users.iter().any(|u| u.username == username) {
            return Ok(None);
        }
        let row = UserRow {
            id: state.users.len() as i64 + 1,
            username: username.to_string(),
            pass_hash: Some(pass_hash.to_string()),
        };
        state.users.push(row.clone());
        Ok(Some(row))
    }

    async fn find_by_username(&self, username: &str) -> anyhow::Result<Option<UserRow>> {
        let state = self.state.lock().unwrap();
        Ok(state.users.iter().find(|u| u.username == username).cloned())
    }
}

#[async_trait]
impl SessionRepository for InMemoryStore {
    async fn upsert_session(
        &self,
        user_id: i64,
        token: &str,
        created_at: DateTime<Utc>,
        expire_at: DateTime<Utc>,
    ) -> anyhow::Result<()> {
        let mut state = self.state.lock().unwrap();
        state.sessions.retain(|_, s| s.user_id != user_id);
        state.next_token_id += 1;
        let row = SessionRow {
            token_id: state.next_token_id,
            user_id,
            created_at,
            expire_at,
        };
        state.sessions.insert(token.to_string(), row);
        Ok(())
    }

    async fn find_by_token(&self, token: &str) -> anyhow::Result<Option<SessionRow>> {
        Ok(self.state.lock().unwrap().sessions.get(token).cloned())
    }

    async fn delete_for_user(&self, user_id: i64) -> anyhow::Result<bool> {
        let mut state = self.state.lock().unwrap();
        let before = state.sessions.len();
        state.sessions.retain(|_, s| s.user_id != user_id);
        Ok(state.sessions.len() < before)
    }
}

#[derive(Default)]
pub struct MemBlobStore {
    blobs: Mutex<HashMap<String, Vec<u8>>>,
    fail_reads: AtomicBool,
    reads: AtomicUsize,
}

impl MemBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    pub fn len(&self) -> usize {
        self.blobs.lock().unwrap().len()
    }
}

#[async_trait]
impl BlobStore for MemBlobStore {
    async fn store(
        &self,
        bytes: &[u8],
        _original_filename: Option<&str>,
    ) -> Result<StoredBlob, BlobStoreError> {
        let mime = sniff::detect_mime(bytes).ok_or_else(|| {
            BlobStoreError::UnsupportedMediaType("application/octet-stream".into())
        })?;
        let locator = format!("{}.bin", Uuid::new_v4());
        self.blobs
            .lock()
            .unwrap()
            .insert(locator.clone(), bytes.to_vec());
        Ok(StoredBlob {
            locator,
            mime: mime.to_string(),
        })
    }

    async fn read(&self, locator: &str) -> Result<Vec<u8>, BlobStoreError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(BlobStoreError::Io(std::io::Error::other("disk gone")));
        }
        self.blobs
            .lock()
            .unwrap()
            .get(locator)
            .cloned()
            .ok_or(BlobStoreError::NotFound)
    }
}

/// Smallest byte prefix the sniffer recognises as PNG.
pub fn png_bytes() -> Vec<u8> {
    let mut bytes = vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
    bytes.extend_from_slice(&[0u8; 24]);
    bytes
}
