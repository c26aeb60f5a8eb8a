use std::rc::Rc;

use futures::task::LocalSpawn;

use crate::geometry::Size;
use crate::notification::{DesktopNotifier, Notifier};
use crate::scheduler::FrameClock;
use crate::session::{SessionError, SessionOptions, SessionResult, ViewportSession};
use crate::storage::{unix_millis_now, DocumentId, DocumentStore, DocumentSummary};

/// Host-facing owner of the current session and the document list.
pub struct Viewer<S: DocumentStore + 'static> {
    store: Rc<S>,
    clock: Rc<dyn FrameClock>,
    spawner: Rc<dyn LocalSpawn>,
    notifier: Rc<dyn Notifier>,
    options: SessionOptions,
    session: Option<ViewportSession<S>>,
    documents: Vec<DocumentSummary>,
}

impl<S: DocumentStore + 'static> Viewer<S> {
    pub fn new(
        store: Rc<S>,
        clock: Rc<dyn FrameClock>,
        spawner: Rc<dyn LocalSpawn>,
        notifier: Rc<dyn Notifier>,
        options: SessionOptions,
    ) -> Self {
        Self {
            store,
            clock,
            spawner,
            notifier,
            options,
            session: None,
            documents: Vec::new(),
        }
    }

    /// Same as [`Self::new`], reporting failures as desktop notifications.
    pub fn with_desktop_notifier(
        store: Rc<S>,
        clock: Rc<dyn FrameClock>,
        spawner: Rc<dyn LocalSpawn>,
        options: SessionOptions,
    ) -> Self {
        Self::new(store, clock, spawner, Rc::new(DesktopNotifier), options)
    }

    pub fn store(&self) -> &Rc<S> {
        &self.store
    }

    pub fn documents(&self) -> &[DocumentSummary] {
        &self.documents
    }

    pub fn session(&self) -> Option<&ViewportSession<S>> {
        self.session.as_ref()
    }

    pub async fn refresh_documents(&mut self) -> SessionResult<&[DocumentSummary]> {
        match self.store.list_documents().await {
            Ok(documents) => {
                self.documents = documents;
                Ok(&self.documents)
            }
            Err(err) => {
                tracing::warn!(?err, "failed to list documents");
                self.notifier
                    .notify(&format!("Could not load the document list: {err}"));
                Err(err.into())
            }
        }
    }

    /// Replaces the current session with one for `id`.
    ///
    /// Returns `Ok(false)` when the document has disappeared; the list is
    /// refreshed and the user told, and no session is open afterwards.
    pub async fn open(&mut self, id: DocumentId, viewport: Size) -> SessionResult<bool> {
        self.close();
        let started = ViewportSession::start(
            Rc::clone(&self.store),
            id,
            viewport,
            self.clock.as_ref(),
            self.options.clone(),
            Rc::clone(&self.notifier),
        )
        .await;

        match started {
            Ok(session) => {
                self.session = Some(session);
                Ok(true)
            }
            Err(SessionError::DocumentNotFound(id)) => {
                tracing::warn!(id = %id, "document vanished before it could be opened");
                self.notifier
                    .notify("That document no longer exists. The list has been refreshed.");
                if let Err(err) = self.refresh_documents().await {
                    tracing::debug!(?err, "refresh after missing document failed");
                }
                Ok(false)
            }
            Err(err) => Err(err),
        }
    }

    /// Ends the current session, if any. Its saved-view write runs in the
    /// background.
    pub fn close(&mut self) -> bool {
        match self.session.take() {
            Some(session) => {
                session.end(self.spawner.as_ref());
                true
            }
            None => false,
        }
    }

    pub async fn import(&mut self, name: &str, content: &str) -> SessionResult<DocumentId> {
        let id = self
            .store
            .create_document(name, content, unix_millis_now())
            .await?;
        tracing::info!(id = %id, name, "document imported");
        self.refresh_documents().await?;
        Ok(id)
    }

    /// Deletes a document. An open session on it is dropped without saving.
    pub async fn delete(&mut self, id: &DocumentId) -> SessionResult<()> {
        if self
            .session
            .as_ref()
            .is_some_and(|session| session.document_id() == id)
        {
            self.session = None;
        }
        self.store.delete_document(id).await?;
        self.refresh_documents().await?;
        Ok(())
    }
}

impl<S: DocumentStore + 'static> Drop for Viewer<S> {
    fn drop(&mut self) {
        self.close();
    }
}
