use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::input::{InputMotionState, MotionKey};
use crate::scheduler::FrameScheduler;
use crate::view::ViewCell;

pub const DEFAULT_PAN_SPEED: f64 = 10.0;
pub const DEFAULT_ROTATION_SPEED: f64 = 2.0;

/// Per-frame motion amounts for held keys.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionSettings {
    /// Viewport pixels per frame.
    pub pan_speed: f64,
    /// Degrees per frame.
    pub rotation_speed: f64,
}

impl Default for MotionSettings {
    fn default() -> Self {
        Self {
            pan_speed: DEFAULT_PAN_SPEED,
            rotation_speed: DEFAULT_ROTATION_SPEED,
        }
    }
}

struct MotionShared {
    view: Rc<ViewCell>,
    held: RefCell<InputMotionState>,
    frames: Box<dyn FrameScheduler>,
    settings: MotionSettings,
}

impl MotionShared {
    fn schedule(self: &Rc<Self>) {
        let shared: Weak<Self> = Rc::downgrade(self);
        self.frames.request(Box::new(move || {
            if let Some(shared) = shared.upgrade() {
                shared.step();
            }
        }));
    }

    fn step(self: &Rc<Self>) {
        let (pan_direction, rotation_sign) = {
            let held = self.held.borrow();
            if held.is_empty() {
                tracing::trace!("motion loop stopped");
                return;
            }
            (held.pan_direction(), held.rotation_sign())
        };

        let pan = pan_direction * self.settings.pan_speed;
        let rotation = rotation_sign * self.settings.rotation_speed;
        let viewport = self.view.viewport();
        self.view.update(|mut transform| {
            if rotation != 0.0 && viewport.is_usable() {
                transform = transform.rotate_about(viewport.center(), rotation);
            }
            if !pan.is_zero() {
                transform = transform.translate(pan);
            }
            transform
        });

        if !self.held.borrow().is_empty() {
            self.schedule();
        }
    }
}

/// Continuous pan/rotate while motion keys are held, one step per frame.
pub struct KeyboardMotionController {
    shared: Rc<MotionShared>,
}

impl KeyboardMotionController {
    pub fn new(
        view: Rc<ViewCell>,
        frames: Box<dyn FrameScheduler>,
        settings: MotionSettings,
    ) -> Self {
        Self {
            shared: Rc::new(MotionShared {
                view,
                held: RefCell::new(InputMotionState::new()),
                frames,
                settings,
            }),
        }
    }

    pub fn settings(&self) -> MotionSettings {
        self.shared.settings
    }

    pub fn key_down(&self, key: MotionKey) -> bool {
        let inserted = self.shared.held.borrow_mut().press(key);
        if !self.shared.frames.is_pending() {
            tracing::trace!(key = key.label(), "motion loop started");
            self.shared.schedule();
        }
        inserted
    }

    pub fn key_up(&self, key: MotionKey) -> bool {
        let (removed, now_empty) = {
            let mut held = self.shared.held.borrow_mut();
            let removed = held.release(key);
            (removed, held.is_empty())
        };
        if now_empty {
            self.shared.frames.cancel();
        }
        removed
    }

    /// Focus loss: forget every held key and stop the loop.
    pub fn release_all(&self) {
        self.shared.held.borrow_mut().clear();
        self.shared.frames.cancel();
    }

    /// Teardown; same effect as [`Self::release_all`].
    pub fn cancel(&self) {
        self.release_all();
    }

    pub fn is_animating(&self) -> bool {
        self.shared.frames.is_pending()
    }

    pub fn held_keys(&self) -> InputMotionState {
        self.shared.held.borrow().clone()
    }
}

impl Drop for KeyboardMotionController {
    fn drop(&mut self) {
        self.cancel();
    }
}
