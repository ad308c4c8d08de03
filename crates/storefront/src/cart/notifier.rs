//! The cross-context change notifier.
//!
//! A same-process publish/subscribe signal telling independent components
//! that a shared slot changed. Events carry no payload: subscribers re-read
//! the store to learn the new state, so the signal is a pure invalidation.
//! Delivery is best-effort and synchronous; the publisher calls it *after*
//! the store write, which is the only ordering guarantee there is.
//!
//! Consistency across processes (the browser-era equivalent was a second
//! open tab) is explicitly not provided. Matching the system this one
//! replaces, a stale peer catches up on its own next read.

use std::collections::HashMap;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::{Arc, Mutex};

/// Topics a component can subscribe to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeTopic {
    CartChanged,
    WishlistChanged,
}

/// Handle returned by [`ChangeNotifier::subscribe`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Handler = Arc<dyn Fn() + Send + Sync>;

#[derive(Default)]
struct Registry {
    next_id: u64,
    subscribers: HashMap<ChangeTopic, Vec<(SubscriptionId, Handler)>>,
}

/// Same-process change notifier.
///
/// Cheap to clone; clones share the subscriber registry.
#[derive(Clone, Default)]
pub struct ChangeNotifier {
    registry: Arc<Mutex<Registry>>,
}

impl ChangeNotifier {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler for a topic. The handler runs synchronously on
    /// the publishing thread.
    pub fn subscribe(&self, topic: ChangeTopic, handler: impl Fn() + Send + Sync + 'static) -> SubscriptionId {
        let mut registry = self.lock();
        registry.next_id += 1;
        let id = SubscriptionId(registry.next_id);
        registry
            .subscribers
            .entry(topic)
            .or_default()
            .push((id, Arc::new(handler)));
        id
    }

    /// Remove a previously registered handler. Unknown ids are ignored.
    pub fn unsubscribe(&self, id: SubscriptionId) {
        let mut registry = self.lock();
        for handlers in registry.subscribers.values_mut() {
            handlers.retain(|(handler_id, _)| *handler_id != id);
        }
    }

    /// Notify every subscriber of `topic`.
    ///
    /// Handlers are invoked outside the registry lock, so a handler may
    /// re-subscribe or publish without deadlocking. A panicking handler is
    /// logged and does not stop delivery to the rest.
    pub fn publish(&self, topic: ChangeTopic) {
        let handlers: Vec<Handler> = {
            let registry = self.lock();
            registry
                .subscribers
                .get(&topic)
                .map(|subs| subs.iter().map(|(_, h)| Arc::clone(h)).collect())
                .unwrap_or_default()
        };

        for handler in handlers {
            if catch_unwind(AssertUnwindSafe(|| handler())).is_err() {
                tracing::warn!(?topic, "change-notifier handler panicked");
            }
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Registry> {
        self.registry
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn publish_reaches_every_subscriber_of_the_topic() {
        let notifier = ChangeNotifier::new();
        let cart_hits = Arc::new(AtomicU32::new(0));
        let wishlist_hits = Arc::new(AtomicU32::new(0));

        {
            let hits = Arc::clone(&cart_hits);
            notifier.subscribe(ChangeTopic::CartChanged, move || {
                hits.fetch_add(1, Ordering::SeqCst);
            });
        }
        {
            let hits = Arc::clone(&cart_hits);
            notifier.subscribe(ChangeTopic::CartChanged, move || {
                hits.fetch_add(1, Ordering::SeqCst);
            });
        }
        {
            let hits = Arc::clone(&wishlist_hits);
            notifier.subscribe(ChangeTopic::WishlistChanged, move || {
                hits.fetch_add(1, Ordering::SeqCst);
            });
        }

        notifier.publish(ChangeTopic::CartChanged);

        assert_eq!(cart_hits.load(Ordering::SeqCst), 2);
        assert_eq!(wishlist_hits.load(Ordering::SeqCst), 0, "wrong topic untouched");
    }

    #[test]
    fn unsubscribed_handlers_stop_receiving() {
        let notifier = ChangeNotifier::new();
        let hits = Arc::new(AtomicU32::new(0));

        let id = {
            let hits = Arc::clone(&hits);
            notifier.subscribe(ChangeTopic::CartChanged, move || {
                hits.fetch_add(1, Ordering::SeqCst);
            })
        };

        notifier.publish(ChangeTopic::CartChanged);
        notifier.unsubscribe(id);
        notifier.publish(ChangeTopic::CartChanged);

        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn panicking_handler_does_not_block_the_rest() {
        let notifier = ChangeNotifier::new();
        let hits = Arc::new(AtomicU32::new(0));

        notifier.subscribe(ChangeTopic::CartChanged, || panic!("bad handler"));
        {
            let hits = Arc::clone(&hits);
            notifier.subscribe(ChangeTopic::CartChanged, move || {
                hits.fetch_add(1, Ordering::SeqCst);
            });
        }

        notifier.publish(ChangeTopic::CartChanged);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn publish_with_no_subscribers_is_fine() {
        ChangeNotifier::new().publish(ChangeTopic::WishlistChanged);
    }
}
