//! "Is the consuming surface observed" signal.

use std::sync::Arc;

use tokio::sync::watch;

/// Boolean visibility flag with change notification.
///
/// The host flips it when its surface is hidden or shown; schedulers subscribe
/// and suspend their refresh timer while it is `false`.
#[derive(Debug, Clone)]
pub struct Visibility {
    tx: Arc<watch::Sender<bool>>,
}

impl Default for Visibility {
    fn default() -> Self {
        Self::new(true)
    }
}

impl Visibility {
    pub fn new(visible: bool) -> Self {
        let (tx, _rx) = watch::channel(visible);
        Self { tx: Arc::new(tx) }
    }

    /// Update the flag. Subscribers are only notified on an actual change.
    pub fn set_visible(&self, visible: bool) {
        self.tx.send_if_modified(|current| {
            if *current == visible {
                return false;
            }
            *current = visible;
            true
        });
    }

    pub fn is_visible(&self) -> bool {
        *self.tx.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn only_real_changes_notify() {
        let v = Visibility::default();
        let mut rx = v.subscribe();
        v.set_visible(true);
        assert!(!rx.has_changed().unwrap());
        v.set_visible(false);
        assert!(rx.has_changed().unwrap());
        assert!(!*rx.borrow_and_update());
        assert!(!v.is_visible());
    }
}
