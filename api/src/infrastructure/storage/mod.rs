pub mod fs_blob_store;
pub mod sniff;

pub use fs_blob_store::FsBlobStore;
