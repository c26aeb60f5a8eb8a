pub mod config;
pub mod controller;
pub mod document;
pub mod error;
pub mod geometry;
pub mod input;
pub mod logging;
pub mod notification;
pub mod scheduler;
pub mod session;
pub mod storage;
pub mod transform;
pub mod view;
pub mod viewer;

pub use error::{AppError, AppResult};
pub use geometry::{Point, Size, Vector};
pub use session::{SessionOptions, ViewportSession};
pub use storage::{DocumentId, DocumentStore, JsonFileStore, MemoryStore, SavedView};
pub use transform::TransformState;
pub use viewer::Viewer;

use config::AppConfig;

/// File store rooted at the configured data directory, or the XDG default.
pub fn open_store(config: &AppConfig) -> AppResult<JsonFileStore> {
    let store = match &config.data_dir {
        Some(dir) => JsonFileStore::with_dir(dir)?,
        None => JsonFileStore::with_default_paths()?,
    };
    tracing::debug!(dir = %store.dir().display(), "document store opened");
    Ok(store)
}
