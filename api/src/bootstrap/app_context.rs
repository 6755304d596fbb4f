use std::sync::Arc;

use crate::application::ports::blob_store::BlobStore;
use crate::application::ports::document_cache::DocumentCache;
use crate::application::ports::document_repository::DocumentRepository;
use crate::application::ports::identity_resolver::IdentityResolver;
use crate::application::ports::session_repository::SessionRepository;
use crate::application::ports::user_repository::UserRepository;
use crate::bootstrap::config::Config;

#[derive(Clone)]
pub struct AppContext {
    pub cfg: Config,
    services: Arc<AppServices>,
}

#[derive(Clone)]
pub struct AppServices {
    document_repo: Arc<dyn DocumentRepository>,
    identity_resolver: Arc<dyn IdentityResolver>,
    user_repo: Arc<dyn UserRepository>,
    session_repo: Arc<dyn SessionRepository>,
    blob_store: Arc<dyn BlobStore>,
    document_cache: Arc<dyn DocumentCache>,
}

impl AppServices {
    pub fn new(
        document_repo: Arc<dyn DocumentRepository>,
        identity_resolver: Arc<dyn IdentityResolver>,
        user_repo: Arc<dyn UserRepository>,
        session_repo: Arc<dyn SessionRepository>,
        blob_store: Arc<dyn BlobStore>,
        document_cache: Arc<dyn DocumentCache>,
    ) -> Self {
        Self {
            document_repo,
            identity_resolver,
            user_repo,
            session_repo,
            blob_store,
            document_cache,
        }
    }
}

impl AppContext {
    pub fn new(cfg: Config, services: AppServices) -> Self {
        Self {
            cfg,
            services: Arc::new(services),
        }
    }

    pub fn document_repo(&self) -> Arc<dyn DocumentRepository> {
        self.services.document_repo.clone()
    }

    pub fn identity_resolver(&self) -> Arc<dyn IdentityResolver> {
        self.services.identity_resolver.clone()
    }

    pub fn user_repo(&self) -> Arc<dyn UserRepository> {
        self.services.user_repo.clone()
    }

    pub fn session_repo(&self) -> Arc<dyn SessionRepository> {
        self.services.session_repo.clone()
    }

    pub fn blob_store(&self) -> Arc<dyn BlobStore> {
        self.services.blob_store.clone()
    }

    pub fn document_cache(&self) -> Arc<dyn DocumentCache> {
        self.services.document_cache.clone()
    }
}
