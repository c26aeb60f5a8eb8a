//! Persistence boundary for documents and their saved views.
//!
//! Every store method returns a local future; callers must not assume any
//! ordering between overlapping writes to the same record.

mod json_file;
mod memory;

use std::fmt;
use std::io;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use futures::future::LocalBoxFuture;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::geometry::Point;
use crate::transform::TransformState;

pub use json_file::JsonFileStore;
pub use memory::MemoryStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("missing HOME environment variable")]
    MissingHomeDirectory,
    #[error("invalid document id {0:?}")]
    InvalidId(String),
    #[error("document {0} not found")]
    NotFound(DocumentId),
    #[error("failed to read {path}")]
    Read { path: PathBuf, source: io::Error },
    #[error("failed to write {path}")]
    Write { path: PathBuf, source: io::Error },
    #[error("failed to remove {path}")]
    Remove { path: PathBuf, source: io::Error },
    #[error("failed to parse document record {path}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("failed to serialize document record")]
    Serialize(#[from] serde_json::Error),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

pub type StoreFuture<'a, T> = LocalBoxFuture<'a, StoreResult<T>>;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(String);

impl DocumentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Persisted subset of a [`TransformState`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SavedView {
    pub position: Point,
    pub scale: f64,
    pub rotation: f64,
}

impl SavedView {
    /// `None` when the stored values would break transform invariants.
    pub fn to_transform(&self) -> Option<TransformState> {
        TransformState::new(self.position, self.scale, self.rotation)
    }
}

impl From<TransformState> for SavedView {
    fn from(transform: TransformState) -> Self {
        Self {
            position: transform.position(),
            scale: transform.scale(),
            rotation: transform.rotation(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentRecord {
    pub id: DocumentId,
    pub name: String,
    pub content: String,
    pub created_at: u64,
    #[serde(default)]
    pub last_opened_at: Option<u64>,
    #[serde(default)]
    pub saved_view: Option<SavedView>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentSummary {
    pub id: DocumentId,
    pub name: String,
    pub last_opened_at: Option<u64>,
    pub saved_view: Option<SavedView>,
}

impl From<&DocumentRecord> for DocumentSummary {
    fn from(record: &DocumentRecord) -> Self {
        Self {
            id: record.id.clone(),
            name: record.name.clone(),
            last_opened_at: record.last_opened_at,
            saved_view: record.saved_view,
        }
    }
}

pub trait DocumentStore {
    fn create_document<'a>(
        &'a self,
        name: &'a str,
        content: &'a str,
        opened_at: u64,
    ) -> StoreFuture<'a, DocumentId>;

    fn get_document<'a>(&'a self, id: &'a DocumentId) -> StoreFuture<'a, Option<DocumentRecord>>;

    /// Most recently opened first; never-opened documents last.
    fn list_documents(&self) -> StoreFuture<'_, Vec<DocumentSummary>>;

    fn update_saved_view<'a>(&'a self, id: &'a DocumentId, view: SavedView)
        -> StoreFuture<'a, ()>;

    fn update_last_opened<'a>(&'a self, id: &'a DocumentId, opened_at: u64)
        -> StoreFuture<'a, ()>;

    fn delete_document<'a>(&'a self, id: &'a DocumentId) -> StoreFuture<'a, ()>;
}

/// Orders by `last_opened_at` descending, unopened last, then by name.
pub fn sort_by_last_opened(summaries: &mut [DocumentSummary]) {
    summaries.sort_by(|a, b| {
        b.last_opened_at
            .cmp(&a.last_opened_at)
            .then_with(|| a.name.cmp(&b.name))
    });
}

/// Milliseconds since the Unix epoch.
pub fn unix_millis_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX))
        .unwrap_or(0)
}
