//! Per-display-refresh coalescing of update requests.
//!
//! Each [`FrameScheduler`] is one logical stream: at most one callback is
//! pending on it at any time. A [`FrameClock`] hands out independent streams.

#[cfg(feature = "gtk")]
pub mod gtk;

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::fmt;
use std::rc::Rc;

pub type FrameCallback = Box<dyn FnOnce()>;

pub trait FrameScheduler {
    /// Schedules `callback` before the next render unless this stream
    /// already has one pending. Returns whether it was scheduled.
    fn request(&self, callback: FrameCallback) -> bool;

    /// Revokes the pending callback, if any.
    fn cancel(&self);

    fn is_pending(&self) -> bool;
}

pub trait FrameClock {
    fn stream(&self) -> Box<dyn FrameScheduler>;
}

struct QueuedFrame {
    stream: u64,
    ticket: u64,
    callback: FrameCallback,
}

#[derive(Default)]
struct ManualClockState {
    next_stream: Cell<u64>,
    next_ticket: Cell<u64>,
    frames_run: Cell<u64>,
    queue: RefCell<VecDeque<QueuedFrame>>,
}

/// Frame clock driven by the host calling [`ManualFrameClock::run_frame`]
/// once per display refresh.
#[derive(Clone, Default)]
pub struct ManualFrameClock {
    state: Rc<ManualClockState>,
}

impl ManualFrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs every callback that was pending when the frame began, in request
    /// order. Requests made from inside a callback wait for the next frame.
    pub fn run_frame(&self) -> usize {
        let cutoff = self.state.next_ticket.get();
        let mut ran = 0;
        loop {
            let next = {
                let mut queue = self.state.queue.borrow_mut();
                match queue.front() {
                    Some(frame) if frame.ticket < cutoff => queue.pop_front(),
                    _ => None,
                }
            };
            let Some(frame) = next else {
                break;
            };
            (frame.callback)();
            ran += 1;
        }
        self.state.frames_run.set(self.state.frames_run.get() + 1);
        tracing::trace!(callbacks = ran, "manual frame ran");
        ran
    }

    pub fn pending_count(&self) -> usize {
        self.state.queue.borrow().len()
    }

    pub fn frames_run(&self) -> u64 {
        self.state.frames_run.get()
    }
}

impl fmt::Debug for ManualFrameClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ManualFrameClock")
            .field("pending", &self.pending_count())
            .field("frames_run", &self.frames_run())
            .finish()
    }
}

impl FrameClock for ManualFrameClock {
    fn stream(&self) -> Box<dyn FrameScheduler> {
        let id = self.state.next_stream.get();
        self.state.next_stream.set(id + 1);
        Box::new(ManualFrameStream {
            id,
            state: Rc::clone(&self.state),
        })
    }
}

struct ManualFrameStream {
    id: u64,
    state: Rc<ManualClockState>,
}

impl FrameScheduler for ManualFrameStream {
    fn request(&self, callback: FrameCallback) -> bool {
        if self.is_pending() {
            return false;
        }
        let ticket = self.state.next_ticket.get();
        self.state.next_ticket.set(ticket + 1);
        self.state.queue.borrow_mut().push_back(QueuedFrame {
            stream: self.id,
            ticket,
            callback,
        });
        true
    }

    fn cancel(&self) {
        // Dropping the removed callbacks may release `Rc`s; keep the queue
        // borrow short.
        let removed: VecDeque<QueuedFrame> = {
            let mut queue = self.state.queue.borrow_mut();
            let (removed, kept): (VecDeque<_>, VecDeque<_>) =
                queue.drain(..).partition(|frame| frame.stream == self.id);
            *queue = kept;
            removed
        };
        drop(removed);
    }

    fn is_pending(&self) -> bool {
        self.state
            .queue
            .borrow()
            .iter()
            .any(|frame| frame.stream == self.id)
    }
}

impl Drop for ManualFrameStream {
    fn drop(&mut self) {
        self.cancel();
    }
}
