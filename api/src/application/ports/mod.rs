pub mod blob_store;
pub mod document_cache;
pub mod document_repository;
pub mod identity_resolver;
pub mod session_repository;
pub mod user_repository;
