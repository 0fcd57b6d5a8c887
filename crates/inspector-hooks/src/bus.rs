//! Hook bus (C2): publish/subscribe for the fixed-name-but-open-catalogue
//! observation points in [`crate::catalogue`].
//!
//! Registration order is preserved per hook name (FIFO within a name, no
//! ordering guarantee across names). `emit` snapshot-reads the subscriber
//! list so concurrent `register`/`unregister` calls never tear a read in
//! progress, and a subscriber that panics or returns an error is logged and
//! skipped rather than aborting the remaining fan-out.

use crate::catalogue::{HookName, HookPayload};
use futures::future::BoxFuture;
use futures::FutureExt;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

/// A registered hook callback. Subscribers never mutate the payload they
/// are handed; that contract is documented, not enforced by the type.
pub trait Subscriber: Send + Sync {
    fn call<'a>(&'a self, payload: &'a HookPayload) -> BoxFuture<'a, ()>;
}

/// Wrap a plain async closure as a [`Subscriber`].
impl<F, Fut> Subscriber for F
where
    F: Fn(&HookPayload) -> Fut + Send + Sync,
    Fut: std::future::Future<Output = ()> + Send + 'static,
{
    fn call<'a>(&'a self, payload: &'a HookPayload) -> BoxFuture<'a, ()> {
        Box::pin((self)(payload))
    }
}

/// An opaque handle returned by [`HookBus::register`], used to identify the
/// registration for [`HookBus::unregister`]. Wraps a monotonic token rather
/// than the callback itself since trait objects aren't comparable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriptionId(u64);

struct Entry {
    id: SubscriptionId,
    subscriber: Arc<dyn Subscriber>,
}

/// Registry of hook subscribers, keyed by hook name.
///
/// The fast path for a hook with zero subscribers is a single `RwLock` read
/// and a `HashMap` miss — the performance contract in §4.2 (≤ 2 µs with no
/// observers attached) falls out of not marshalling or cloning anything
/// before that check.
#[derive(Default)]
pub struct HookBus {
    subscribers: RwLock<HashMap<HookName, Vec<Entry>>>,
    next_id: AtomicU64,
}

impl HookBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `subscriber` under `name`, appended after any existing
    /// registrations. Duplicate registrations for the same name are
    /// permitted and produce duplicate invocations on emit.
    pub fn register(&self, name: impl Into<HookName>, subscriber: impl Subscriber + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let entry = Entry {
            id,
            subscriber: Arc::new(subscriber),
        };
        let mut subscribers = self.subscribers.write().expect("hook bus lock poisoned");
        subscribers.entry(name.into()).or_default().push(entry);
        id
    }

    /// Remove the registration identified by `id` from `name`'s list.
    /// A no-op if the registration is unknown or already removed —
    /// unregistration is idempotent.
    pub fn unregister(&self, name: &str, id: SubscriptionId) {
        let mut subscribers = self.subscribers.write().expect("hook bus lock poisoned");
        if let Some(entries) = subscribers.get_mut(name) {
            entries.retain(|entry| entry.id != id);
        }
    }

    /// Number of live subscribers registered for `name`. Used by callers
    /// that want to skip payload construction entirely on the hot path.
    pub fn subscriber_count(&self, name: &str) -> usize {
        self.subscribers
            .read()
            .expect("hook bus lock poisoned")
            .get(name)
            .map_or(0, Vec::len)
    }

    /// Invoke every subscriber registered for `name`, in registration
    /// order, awaiting each before starting the next. A subscriber that
    /// panics is caught and logged at WARN; `emit` always returns
    /// normally once the fan-out completes.
    pub async fn emit(&self, name: &str, payload: &HookPayload) {
        let snapshot: Vec<Arc<dyn Subscriber>> = {
            let subscribers = self.subscribers.read().expect("hook bus lock poisoned");
            match subscribers.get(name) {
                Some(entries) if !entries.is_empty() => {
                    entries.iter().map(|entry| entry.subscriber.clone()).collect()
                }
                _ => return,
            }
        };
        for subscriber in snapshot {
            let outcome = std::panic::AssertUnwindSafe(subscriber.call(payload))
                .catch_unwind()
                .await;
            if outcome.is_err() {
                tracing::warn!(hook = name, "hook subscriber panicked; skipping");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    fn counting_subscriber(counter: Arc<AtomicUsize>) -> impl Subscriber {
        move |_payload: &HookPayload| {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
            }
        }
    }

    #[tokio::test]
    async fn emit_with_no_subscribers_is_a_no_op() {
        let bus = HookBus::new();
        bus.emit("tool-call.before", &HookPayload::new()).await;
    }

    #[tokio::test]
    async fn subscribers_fire_in_registration_order() {
        let bus = HookBus::new();
        let order = Arc::new(std::sync::Mutex::new(Vec::new()));
        for tag in ["first", "second", "third"] {
            let order = order.clone();
            bus.register("workflow-run.before", move |_: &HookPayload| {
                let order = order.clone();
                async move { order.lock().unwrap().push(tag) }
            });
        }
        bus.emit("workflow-run.before", &HookPayload::new()).await;
        assert_eq!(*order.lock().unwrap(), vec!["first", "second", "third"]);
    }

    #[tokio::test]
    async fn unregister_removes_only_the_matching_subscription() {
        let bus = HookBus::new();
        let counter_a = Arc::new(AtomicUsize::new(0));
        let counter_b = Arc::new(AtomicUsize::new(0));
        let id_a = bus.register("progress.update", counting_subscriber(counter_a.clone()));
        bus.register("progress.update", counting_subscriber(counter_b.clone()));

        bus.unregister("progress.update", id_a);
        bus.emit("progress.update", &HookPayload::new()).await;

        assert_eq!(counter_a.load(Ordering::SeqCst), 0);
        assert_eq!(counter_b.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn unregister_unknown_id_is_not_an_error() {
        let bus = HookBus::new();
        bus.unregister("progress.update", SubscriptionId(999));
    }

    #[tokio::test]
    async fn duplicate_registrations_each_invoke() {
        let bus = HookBus::new();
        let counter = Arc::new(AtomicUsize::new(0));
        bus.register("progress.update", counting_subscriber(counter.clone()));
        bus.register("progress.update", counting_subscriber(counter.clone()));
        bus.emit("progress.update", &HookPayload::new()).await;
        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn subscriber_count_reflects_registrations() {
        let bus = HookBus::new();
        assert_eq!(bus.subscriber_count("agent-call.before"), 0);
        bus.register("agent-call.before", counting_subscriber(Arc::new(AtomicUsize::new(0))));
        assert_eq!(bus.subscriber_count("agent-call.before"), 1);
    }
}
