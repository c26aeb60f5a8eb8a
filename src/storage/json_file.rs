use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use futures::future::{self, FutureExt};

use super::{
    sort_by_last_opened, DocumentId, DocumentRecord, DocumentStore, DocumentSummary, SavedView,
    StoreError, StoreFuture, StoreResult,
};

const APP_DIR: &str = "mapview";
const DOCUMENTS_SUBDIR: &str = "documents";
const RECORD_EXTENSION: &str = "json";

/// One pretty-printed JSON file per document under a single directory.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    pub fn with_dir(dir: impl Into<PathBuf>) -> StoreResult<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|source| StoreError::Write {
            path: dir.clone(),
            source,
        })?;
        Ok(Self { dir })
    }

    /// `$XDG_DATA_HOME/mapview/documents`, else `~/.local/share/mapview/documents`.
    pub fn with_default_paths() -> StoreResult<Self> {
        let xdg_data_home = std::env::var_os("XDG_DATA_HOME").map(PathBuf::from);
        let home = std::env::var_os("HOME").map(PathBuf::from);
        Self::with_dir(default_documents_dir(
            xdg_data_home.as_deref(),
            home.as_deref(),
        )?)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn record_path(&self, id: &DocumentId) -> StoreResult<PathBuf> {
        validate_id(id)?;
        let mut path = self.dir.clone();
        path.push(format!("{id}.{RECORD_EXTENSION}"));
        Ok(path)
    }

    fn read_record(&self, id: &DocumentId) -> StoreResult<Option<DocumentRecord>> {
        let path = self.record_path(id)?;
        match fs::read_to_string(&path) {
            Ok(contents) => serde_json::from_str(&contents)
                .map(Some)
                .map_err(|source| StoreError::Parse { path, source }),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StoreError::Read { path, source }),
        }
    }

    fn write_record(&self, record: &DocumentRecord) -> StoreResult<()> {
        let path = self.record_path(&record.id)?;
        let json = serde_json::to_string_pretty(record)?;
        let staging = path.with_extension(format!("{RECORD_EXTENSION}.tmp"));
        let written = fs::write(&staging, json)
            .map_err(|source| StoreError::Write {
                path: staging.clone(),
                source,
            })
            .and_then(|()| {
                fs::rename(&staging, &path).map_err(|source| StoreError::Write {
                    path: path.clone(),
                    source,
                })
            });
        if written.is_err() {
            discard_staging(&staging);
        }
        written
    }

    fn modify(
        &self,
        id: &DocumentId,
        change: impl FnOnce(&mut DocumentRecord),
    ) -> StoreResult<()> {
        let mut record = self
            .read_record(id)?
            .ok_or_else(|| StoreError::NotFound(id.clone()))?;
        change(&mut record);
        self.write_record(&record)
    }

    fn create(&self, name: &str, content: &str, opened_at: u64) -> StoreResult<DocumentId> {
        let record = DocumentRecord {
            id: DocumentId::generate(),
            name: name.to_string(),
            content: content.to_string(),
            created_at: opened_at,
            last_opened_at: Some(opened_at),
            saved_view: None,
        };
        self.write_record(&record)?;
        tracing::debug!(id = %record.id, name, "document created");
        Ok(record.id)
    }

    fn list(&self) -> StoreResult<Vec<DocumentSummary>> {
        let entries = fs::read_dir(&self.dir).map_err(|source| StoreError::Read {
            path: self.dir.clone(),
            source,
        })?;

        let mut summaries = Vec::new();
        for entry in entries {
            let path = match entry {
                Ok(entry) => entry.path(),
                Err(err) => {
                    tracing::warn!(?err, dir = %self.dir.display(), "failed to read directory entry");
                    continue;
                }
            };
            if path.extension().and_then(|ext| ext.to_str()) != Some(RECORD_EXTENSION) {
                continue;
            }
            let parsed = fs::read_to_string(&path)
                .map_err(|err| err.to_string())
                .and_then(|contents| {
                    serde_json::from_str::<DocumentRecord>(&contents).map_err(|err| err.to_string())
                });
            match parsed {
                Ok(record) => summaries.push(DocumentSummary::from(&record)),
                Err(err) => {
                    tracing::warn!(%err, path = %path.display(), "skipping unreadable document record");
                }
            }
        }

        sort_by_last_opened(&mut summaries);
        Ok(summaries)
    }

    fn delete(&self, id: &DocumentId) -> StoreResult<()> {
        let path = self.record_path(id)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                Err(StoreError::NotFound(id.clone()))
            }
            Err(source) => Err(StoreError::Remove { path, source }),
        }
    }
}

impl DocumentStore for JsonFileStore {
    fn create_document<'a>(
        &'a self,
        name: &'a str,
        content: &'a str,
        opened_at: u64,
    ) -> StoreFuture<'a, DocumentId> {
        future::ready(self.create(name, content, opened_at)).boxed_local()
    }

    fn get_document<'a>(&'a self, id: &'a DocumentId) -> StoreFuture<'a, Option<DocumentRecord>> {
        future::ready(self.read_record(id)).boxed_local()
    }

    fn list_documents(&self) -> StoreFuture<'_, Vec<DocumentSummary>> {
        future::ready(self.list()).boxed_local()
    }

    fn update_saved_view<'a>(
        &'a self,
        id: &'a DocumentId,
        view: SavedView,
    ) -> StoreFuture<'a, ()> {
        future::ready(self.modify(id, |record| record.saved_view = Some(view))).boxed_local()
    }

    fn update_last_opened<'a>(
        &'a self,
        id: &'a DocumentId,
        opened_at: u64,
    ) -> StoreFuture<'a, ()> {
        future::ready(self.modify(id, |record| record.last_opened_at = Some(opened_at)))
            .boxed_local()
    }

    fn delete_document<'a>(&'a self, id: &'a DocumentId) -> StoreFuture<'a, ()> {
        future::ready(self.delete(id)).boxed_local()
    }
}

pub(crate) fn default_documents_dir(
    xdg_data_home: Option<&Path>,
    home: Option<&Path>,
) -> StoreResult<PathBuf> {
    let mut path = match xdg_data_home.filter(|path| !path.as_os_str().is_empty()) {
        Some(xdg) => xdg.to_path_buf(),
        None => home
            .ok_or(StoreError::MissingHomeDirectory)?
            .join(".local")
            .join("share"),
    };
    path.push(APP_DIR);
    path.push(DOCUMENTS_SUBDIR);
    Ok(path)
}

fn discard_staging(staging: &Path) {
    match fs::remove_file(staging) {
        Ok(()) => {}
        Err(err) if err.kind() == io::ErrorKind::NotFound => {}
        Err(err) => {
            tracing::warn!(path = %staging.display(), ?err, "failed to remove staging file");
        }
    }
}

fn validate_id(id: &DocumentId) -> StoreResult<()> {
    let raw = id.as_str();
    let valid = !raw.is_empty()
        && raw
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || ch == '-' || ch == '_');
    if valid {
        Ok(())
    } else {
        Err(StoreError::InvalidId(raw.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point;
    use futures::executor::block_on;

    fn store() -> (tempfile::TempDir, JsonFileStore) {
        let dir = tempfile::tempdir().expect("create temp dir");
        let store = JsonFileStore::with_dir(dir.path().join("documents")).expect("open store");
        (dir, store)
    }

    #[test]
    fn create_then_get_reads_the_record_back() {
        let (_dir, store) = store();
        let id = block_on(store.create_document("city", "<svg viewBox=\"0 0 10 10\"/>", 42))
            .expect("create");

        let record = block_on(store.get_document(&id))
            .expect("get")
            .expect("record exists");
        assert_eq!(record.name, "city");
        assert_eq!(record.created_at, 42);
        assert_eq!(record.last_opened_at, Some(42));
        assert!(record.saved_view.is_none());
        assert!(store.dir().join(format!("{id}.json")).exists());
    }

    #[test]
    fn saved_view_survives_reopening_the_store() {
        let (dir, store) = store();
        let id = block_on(store.create_document("coast", "", 1)).expect("create");
        let view = SavedView {
            position: Point::new(-30.0, 12.5),
            scale: 3.0,
            rotation: 270.0,
        };
        block_on(store.update_saved_view(&id, view)).expect("update");
        drop(store);

        let reopened = JsonFileStore::with_dir(dir.path().join("documents")).expect("reopen");
        let record = block_on(reopened.get_document(&id))
            .expect("get")
            .expect("record exists");
        assert_eq!(record.saved_view, Some(view));
    }

    #[test]
    fn list_skips_corrupt_files_and_sorts() {
        let (_dir, store) = store();
        let older = block_on(store.create_document("older", "", 10)).expect("create");
        let newer = block_on(store.create_document("newer", "", 20)).expect("create");
        fs::write(store.dir().join("broken.json"), "{ not json").expect("write corrupt file");
        fs::write(store.dir().join("notes.txt"), "ignored").expect("write stray file");

        let listed = block_on(store.list_documents()).expect("list");
        let ids: Vec<&DocumentId> = listed.iter().map(|summary| &summary.id).collect();
        assert_eq!(ids, vec![&newer, &older]);
    }

    #[test]
    fn unknown_ids_report_not_found() {
        let (_dir, store) = store();
        let missing = DocumentId::new("0000");
        assert!(block_on(store.get_document(&missing))
            .expect("get")
            .is_none());
        assert!(matches!(
            block_on(store.update_last_opened(&missing, 5)),
            Err(StoreError::NotFound(_))
        ));
        assert!(matches!(
            block_on(store.delete_document(&missing)),
            Err(StoreError::NotFound(_))
        ));
    }

    #[test]
    fn path_like_ids_are_rejected() {
        let (_dir, store) = store();
        let sneaky = DocumentId::new("../escape");
        assert!(matches!(
            block_on(store.get_document(&sneaky)),
            Err(StoreError::InvalidId(_))
        ));
    }

    #[test]
    fn delete_removes_the_file() {
        let (_dir, store) = store();
        let id = block_on(store.create_document("gone", "", 1)).expect("create");
        block_on(store.delete_document(&id)).expect("delete");
        assert!(!store.dir().join(format!("{id}.json")).exists());
    }

    #[test]
    fn failed_write_leaves_no_staging_file() {
        let (_dir, store) = store();
        let record = DocumentRecord {
            id: DocumentId::new("blocked"),
            name: "blocked".to_string(),
            content: String::new(),
            created_at: 1,
            last_opened_at: None,
            saved_view: None,
        };
        fs::create_dir(store.dir().join("blocked.json")).expect("occupy target path");

        let result = store.write_record(&record);

        assert!(matches!(result, Err(StoreError::Write { .. })));
        assert!(!store.dir().join("blocked.json.tmp").exists());
    }

    #[test]
    fn default_documents_dir_prefers_xdg_data_home() {
        let path = default_documents_dir(Some(Path::new("/tmp/data")), Some(Path::new("/tmp/home")))
            .expect("path should resolve");
        assert_eq!(path, PathBuf::from("/tmp/data/mapview/documents"));
    }

    #[test]
    fn default_documents_dir_falls_back_to_local_share() {
        let path = default_documents_dir(None, Some(Path::new("/tmp/home")))
            .expect("path should resolve");
        assert_eq!(path, PathBuf::from("/tmp/home/.local/share/mapview/documents"));
    }

    #[test]
    fn default_documents_dir_errors_without_home() {
        assert!(matches!(
            default_documents_dir(None, None),
            Err(StoreError::MissingHomeDirectory)
        ));
    }
}
