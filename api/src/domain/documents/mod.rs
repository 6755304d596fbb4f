pub mod document;
pub mod error;
pub mod filter;

pub use document::{DEFAULT_JSON_MIME, Document, DocumentPayload, DocumentSummary, NewDocument};
pub use error::DocumentError;
pub use filter::{FilterColumn, FilterValue, ListFilter, ListScope};
