/// Sink for short user-facing messages about background failures.
pub trait Notifier {
    fn notify(&self, body: &str);
}

/// Desktop notification through the session notification daemon.
#[derive(Debug, Clone, Copy, Default)]
pub struct DesktopNotifier;

impl Notifier for DesktopNotifier {
    fn notify(&self, body: &str) {
        if let Err(err) = notify_rust::Notification::new()
            .appname("mapview")
            .summary("mapview")
            .body(body)
            .show()
        {
            tracing::warn!("system notification failed: {err}");
        }
    }
}

/// Drops every message; for headless use.
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentNotifier;

impl Notifier for SilentNotifier {
    fn notify(&self, body: &str) {
        tracing::debug!(body, "notification suppressed");
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::cell::RefCell;

    use super::Notifier;

    #[derive(Debug, Default)]
    pub(crate) struct RecordingNotifier {
        messages: RefCell<Vec<String>>,
    }

    impl RecordingNotifier {
        pub(crate) fn messages(&self) -> Vec<String> {
            self.messages.borrow().clone()
        }
    }

    impl Notifier for RecordingNotifier {
        fn notify(&self, body: &str) {
            self.messages.borrow_mut().push(body.to_string());
        }
    }
}
