//! One viewing session of one document.
//!
//! A session owns the live [`ViewCell`] and the three controllers wired to
//! it. It loads the initial transform from the store when it starts and
//! writes the final one back exactly once when it ends.

use std::rc::Rc;

use futures::task::LocalSpawnExt;
use thiserror::Error;

use crate::config::AppConfig;
use crate::controller::{
    KeyboardMotionController, MotionSettings, PointerDragController, WheelZoomController,
    DEFAULT_WHEEL_ZOOM_BASE,
};
use crate::document;
use crate::geometry::{Point, Size};
use crate::input::{KeyModifiers, MotionBindings, PointerButton};
use crate::notification::Notifier;
use crate::scheduler::FrameClock;
use crate::storage::{unix_millis_now, DocumentId, DocumentStore, SavedView, StoreError};
use crate::transform::TransformState;
use crate::view::{SubscriptionId, ViewCell};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("document {0} does not exist")]
    DocumentNotFound(DocumentId),
    #[error(transparent)]
    Store(#[from] StoreError),
}

pub type SessionResult<T> = std::result::Result<T, SessionError>;

/// Tunables handed to the controllers of every new session.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionOptions {
    pub motion: MotionSettings,
    pub wheel_zoom_base: f64,
    pub bindings: MotionBindings,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            motion: MotionSettings::default(),
            wheel_zoom_base: DEFAULT_WHEEL_ZOOM_BASE,
            bindings: MotionBindings::default(),
        }
    }
}

impl From<&AppConfig> for SessionOptions {
    fn from(config: &AppConfig) -> Self {
        Self {
            motion: config.motion_settings(),
            wheel_zoom_base: config.wheel_zoom_base,
            bindings: config.bindings(),
        }
    }
}

pub struct ViewportSession<S: DocumentStore + 'static> {
    store: Rc<S>,
    id: DocumentId,
    name: String,
    content_size: Size,
    view: Rc<ViewCell>,
    pointer: PointerDragController,
    wheel: WheelZoomController,
    keyboard: KeyboardMotionController,
    bindings: MotionBindings,
    notifier: Rc<dyn Notifier>,
}

impl<S: DocumentStore + 'static> ViewportSession<S> {
    pub async fn start(
        store: Rc<S>,
        id: DocumentId,
        viewport: Size,
        clock: &dyn FrameClock,
        options: SessionOptions,
        notifier: Rc<dyn Notifier>,
    ) -> SessionResult<Self> {
        let record = store
            .get_document(&id)
            .await?
            .ok_or_else(|| SessionError::DocumentNotFound(id.clone()))?;

        let content_size = document::intrinsic_size(&record.content);
        let initial = initial_transform(record.saved_view, content_size, viewport);

        if let Err(err) = store.update_last_opened(&id, unix_millis_now()).await {
            tracing::warn!(?err, id = %id, "failed to record document open time");
            notifier.notify(&format!("Could not update \"{}\": {err}", record.name));
        }

        let view = Rc::new(ViewCell::new(initial, viewport));
        let pointer = PointerDragController::new(Rc::clone(&view), clock.stream());
        let wheel = WheelZoomController::new(Rc::clone(&view), options.wheel_zoom_base);
        let keyboard =
            KeyboardMotionController::new(Rc::clone(&view), clock.stream(), options.motion);

        tracing::debug!(
            id = %id,
            scale = initial.scale(),
            rotation = initial.rotation(),
            "viewport session started"
        );

        Ok(Self {
            store,
            id,
            name: record.name,
            content_size,
            view,
            pointer,
            wheel,
            keyboard,
            bindings: options.bindings,
            notifier,
        })
    }

    pub fn document_id(&self) -> &DocumentId {
        &self.id
    }

    pub fn document_name(&self) -> &str {
        &self.name
    }

    pub fn content_size(&self) -> Size {
        self.content_size
    }

    pub fn transform(&self) -> TransformState {
        self.view.transform()
    }

    pub fn view(&self) -> Rc<ViewCell> {
        Rc::clone(&self.view)
    }

    pub fn subscribe(&self, observer: impl Fn(&TransformState) + 'static) -> SubscriptionId {
        self.view.subscribe(observer)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.view.unsubscribe(id)
    }

    pub fn pointer_press(&self, position: Point, button: PointerButton) -> bool {
        self.pointer.press(position, button)
    }

    pub fn pointer_move(&self, position: Point) -> bool {
        self.pointer.move_to(position)
    }

    pub fn pointer_release(&self, position: Option<Point>) -> bool {
        self.pointer.release(position)
    }

    pub fn pointer_leave(&self) -> bool {
        self.pointer.leave()
    }

    pub fn wheel(&self, cursor: Point, delta_y: f64) -> bool {
        self.wheel.wheel(cursor, delta_y)
    }

    /// Returns whether the key is a motion key and was consumed.
    pub fn key_down(&self, key_name: &str, modifiers: KeyModifiers) -> bool {
        match self.bindings.resolve(key_name, modifiers) {
            Some(key) => {
                self.keyboard.key_down(key);
                true
            }
            None => false,
        }
    }

    /// Releases ignore modifiers so a chord pressed mid-hold cannot strand a key.
    pub fn key_up(&self, key_name: &str) -> bool {
        match self.bindings.resolve(key_name, KeyModifiers::default()) {
            Some(key) => {
                self.keyboard.key_up(key);
                true
            }
            None => false,
        }
    }

    pub fn focus_lost(&self) {
        self.keyboard.release_all();
    }

    pub fn set_viewport_size(&self, viewport: Size) {
        self.view.set_viewport(viewport);
    }

    /// Re-fits the document into the current viewport.
    pub fn reset_view(&self) -> bool {
        match TransformState::fit_to_bounds(self.content_size, self.view.viewport()) {
            Some(fitted) => {
                self.view.set(fitted);
                true
            }
            None => false,
        }
    }

    /// Stops the controllers and spawns the single saved-view write.
    pub fn end<Sp: futures::task::LocalSpawn + ?Sized>(self, spawner: &Sp) {
        let (store, id, view, notifier) = self.teardown();
        let task = persist_view(store, id.clone(), view, Rc::clone(&notifier));
        if let Err(err) = spawner.spawn_local(async move {
            let _ = task.await;
        }) {
            tracing::warn!(?err, id = %id, "failed to schedule saved view write");
            notifier.notify("Could not save the current view: the executor is shut down");
        }
    }

    /// Like [`Self::end`] but waits for the write and returns its outcome.
    pub async fn end_and_wait(self) -> SessionResult<()> {
        let (store, id, view, notifier) = self.teardown();
        persist_view(store, id, view, notifier).await
    }

    fn teardown(self) -> (Rc<S>, DocumentId, SavedView, Rc<dyn Notifier>) {
        let Self {
            store,
            id,
            view,
            pointer,
            keyboard,
            notifier,
            ..
        } = self;
        pointer.cancel();
        keyboard.cancel();
        let saved = SavedView::from(view.transform());
        tracing::debug!(id = %id, "viewport session ended");
        (store, id, saved, notifier)
    }
}

fn initial_transform(saved: Option<SavedView>, content: Size, viewport: Size) -> TransformState {
    if let Some(saved) = saved {
        match saved.to_transform() {
            Some(transform) => return transform,
            None => tracing::warn!(?saved, "ignoring ill-formed saved view"),
        }
    }
    TransformState::fit_to_bounds(content, viewport).unwrap_or(TransformState::IDENTITY)
}

async fn persist_view<S: DocumentStore>(
    store: Rc<S>,
    id: DocumentId,
    view: SavedView,
    notifier: Rc<dyn Notifier>,
) -> SessionResult<()> {
    match store.update_saved_view(&id, view).await {
        Ok(()) => {
            tracing::debug!(id = %id, "saved view written");
            Ok(())
        }
        Err(err) => {
            tracing::warn!(?err, id = %id, "failed to save view");
            notifier.notify(&format!("Could not save the current view: {err}"));
            Err(err.into())
        }
    }
}
