//! Change notification
//!
//! Observers register against a content URI and receive one [`ChangeEvent`]
//! per mutation that affects it. Delivery goes over unbounded channels so a
//! slow observer never blocks the writer.

use crate::uri::ContentUri;
use crossbeam::channel::{self, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, Weak};
use std::time::Duration;

/// Sent to observers after a committed mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
    /// The URI the mutation was issued against
    pub uri: ContentUri,
}

struct Observer {
    id: u64,
    uri: ContentUri,
    notify_for_descendants: bool,
    tx: Sender<ChangeEvent>,
}

impl Observer {
    fn wants(&self, changed: &ContentUri) -> bool {
        self.uri == *changed
            || changed.is_ancestor_of(&self.uri)
            || (self.notify_for_descendants && self.uri.is_ancestor_of(changed))
    }
}

type Registry = Mutex<Vec<Observer>>;

fn lock(registry: &Registry) -> MutexGuard<'_, Vec<Observer>> {
    registry.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Registry of observers keyed by URI.
#[derive(Default)]
pub struct ChangeNotifier {
    observers: Arc<Registry>,
    next_id: AtomicU64,
}

impl ChangeNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Watch `uri`.
    ///
    /// Observers hear changes to `uri` itself and to any ancestor (a
    /// collection change reaches item observers). With
    /// `notify_for_descendants` they also hear changes below `uri`.
    pub fn register(&self, uri: ContentUri, notify_for_descendants: bool) -> Subscription {
        let (tx, rx) = channel::unbounded();
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        tracing::debug!("Registering observer {} for {}", id, uri);
        lock(&self.observers).push(Observer {
            id,
            uri: uri.clone(),
            notify_for_descendants,
            tx,
        });
        Subscription {
            id,
            uri,
            rx,
            registry: Arc::downgrade(&self.observers),
        }
    }

    /// Tell every interested observer that `uri` changed.
    ///
    /// Returns the number of observers notified.
    pub fn notify(&self, uri: &ContentUri) -> usize {
        let observers = lock(&self.observers);
        let mut delivered = 0;
        for observer in observers.iter().filter(|observer| observer.wants(uri)) {
            if observer.tx.send(ChangeEvent { uri: uri.clone() }).is_ok() {
                delivered += 1;
            }
        }
        tracing::debug!("Notified {} observer(s) of change to {}", delivered, uri);
        delivered
    }

    /// Number of live subscriptions
    pub fn observer_count(&self) -> usize {
        lock(&self.observers).len()
    }
}

/// Receiving end of an observer registration. Dropping it unregisters the
/// observer.
pub struct Subscription {
    id: u64,
    uri: ContentUri,
    rx: Receiver<ChangeEvent>,
    registry: Weak<Registry>,
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            lock(&registry).retain(|observer| observer.id != self.id);
        }
    }
}

impl Subscription {
    pub fn uri(&self) -> &ContentUri {
        &self.uri
    }

    /// Next pending event, if any
    pub fn try_next(&self) -> Option<ChangeEvent> {
        match self.rx.try_recv() {
            Ok(event) => Some(event),
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => None,
        }
    }

    /// Block until an event arrives or `timeout` elapses
    pub fn wait(&self, timeout: Duration) -> Option<ChangeEvent> {
        match self.rx.recv_timeout(timeout) {
            Ok(event) => Some(event),
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => None,
        }
    }

    /// Take every pending event
    pub fn drain(&self) -> Vec<ChangeEvent> {
        self.rx.try_iter().collect()
    }

    /// Number of pending events
    pub fn pending(&self) -> usize {
        self.rx.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::content_uri;

    #[test]
    fn test_exact_match_notified_once() {
        let notifier = ChangeNotifier::new();
        let sub = notifier.register(content_uri(), false);

        assert_eq!(notifier.notify(&content_uri()), 1);
        assert_eq!(sub.drain(), vec![ChangeEvent { uri: content_uri() }]);
        assert!(sub.try_next().is_none());
    }

    #[test]
    fn test_collection_change_reaches_item_observers() {
        let notifier = ChangeNotifier::new();
        let item = notifier.register(ContentUri::item(3), false);
        let other = notifier.register(ContentUri::item(4), false);

        notifier.notify(&content_uri());
        assert_eq!(item.pending(), 1);
        assert_eq!(other.pending(), 1);

        notifier.notify(&ContentUri::item(3));
        assert_eq!(item.pending(), 2);
        assert_eq!(other.pending(), 1);
    }

    #[test]
    fn test_descendant_changes_need_opt_in() {
        let notifier = ChangeNotifier::new();
        let plain = notifier.register(content_uri(), false);
        let deep = notifier.register(content_uri(), true);

        notifier.notify(&ContentUri::item(9));
        assert_eq!(plain.pending(), 0);
        assert_eq!(deep.pending(), 1);
    }

    #[test]
    fn test_dropped_subscriptions_unregister() {
        let notifier = ChangeNotifier::new();
        let kept = notifier.register(content_uri(), false);
        let sub = notifier.register(ContentUri::item(1), false);
        assert_eq!(notifier.observer_count(), 2);

        drop(sub);
        assert_eq!(notifier.observer_count(), 1);
        assert_eq!(notifier.notify(&content_uri()), 1);
        assert_eq!(kept.pending(), 1);
    }

    #[test]
    fn test_subscription_outlives_notifier() {
        let notifier = ChangeNotifier::new();
        let sub = notifier.register(content_uri(), false);
        drop(notifier);
        assert!(sub.try_next().is_none());
    }

    #[test]
    fn test_cross_thread_delivery() {
        let notifier = std::sync::Arc::new(ChangeNotifier::new());
        let sub = notifier.register(content_uri(), false);

        let writer = {
            let notifier = notifier.clone();
            std::thread::spawn(move || notifier.notify(&content_uri()))
        };
        assert!(sub.wait(Duration::from_secs(5)).is_some());
        assert_eq!(writer.join().unwrap(), 1);
    }
}
