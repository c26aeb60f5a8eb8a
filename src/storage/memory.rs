use std::cell::RefCell;
use std::collections::BTreeMap;

use futures::future::{self, FutureExt};

use super::{
    sort_by_last_opened, DocumentId, DocumentRecord, DocumentStore, DocumentSummary, SavedView,
    StoreError, StoreFuture, StoreResult,
};

/// Store that keeps every record in memory for the life of the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: RefCell<BTreeMap<DocumentId, DocumentRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.borrow().is_empty()
    }

    fn modify(
        &self,
        id: &DocumentId,
        change: impl FnOnce(&mut DocumentRecord),
    ) -> StoreResult<()> {
        let mut records = self.records.borrow_mut();
        let record = records
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(id.clone()))?;
        change(record);
        Ok(())
    }
}

impl DocumentStore for MemoryStore {
    fn create_document<'a>(
        &'a self,
        name: &'a str,
        content: &'a str,
        opened_at: u64,
    ) -> StoreFuture<'a, DocumentId> {
        let id = DocumentId::generate();
        let record = DocumentRecord {
            id: id.clone(),
            name: name.to_string(),
            content: content.to_string(),
            created_at: opened_at,
            last_opened_at: Some(opened_at),
            saved_view: None,
        };
        self.records.borrow_mut().insert(id.clone(), record);
        future::ready(Ok(id)).boxed_local()
    }

    fn get_document<'a>(&'a self, id: &'a DocumentId) -> StoreFuture<'a, Option<DocumentRecord>> {
        let record = self.records.borrow().get(id).cloned();
        future::ready(Ok(record)).boxed_local()
    }

    fn list_documents(&self) -> StoreFuture<'_, Vec<DocumentSummary>> {
        let mut summaries: Vec<DocumentSummary> =
            self.records.borrow().values().map(DocumentSummary::from).collect();
        sort_by_last_opened(&mut summaries);
        future::ready(Ok(summaries)).boxed_local()
    }

    fn update_saved_view<'a>(
        &'a self,
        id: &'a DocumentId,
        view: SavedView,
    ) -> StoreFuture<'a, ()> {
        let result = self.modify(id, |record| record.saved_view = Some(view));
        future::ready(result).boxed_local()
    }

    fn update_last_opened<'a>(
        &'a self,
        id: &'a DocumentId,
        opened_at: u64,
    ) -> StoreFuture<'a, ()> {
        let result = self.modify(id, |record| record.last_opened_at = Some(opened_at));
        future::ready(result).boxed_local()
    }

    fn delete_document<'a>(&'a self, id: &'a DocumentId) -> StoreFuture<'a, ()> {
        let removed = self.records.borrow_mut().remove(id);
        let result = match removed {
            Some(_) => Ok(()),
            None => Err(StoreError::NotFound(id.clone())),
        };
        future::ready(result).boxed_local()
    }
}
