//! Event bus & SSE fan-out (C6): monotonic event ids, a replay ring
//! buffer, and bounded per-subscriber broadcast queues.

pub mod sse;

use inspector_types::{EventPayload, StoredEvent};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use tokio::sync::broadcast;

/// Ring buffer capacity for replay-on-reconnect (§3 Event, §4.6).
pub const RING_CAPACITY: usize = 1000;

/// Bounded per-subscriber outbound queue length (§4.6 "K").
pub const SUBSCRIBER_QUEUE_CAPACITY: usize = 256;

/// Interval on which the bus emits a heartbeat comment to each subscriber.
pub const HEARTBEAT_INTERVAL: std::time::Duration = std::time::Duration::from_secs(15);

/// A freshly-subscribed client: any events it missed that are still in
/// the ring (oldest first), plus a receiver for everything published from
/// here on. `replay` never repeats on `live`: since `subscribe` reads the
/// ring and opens the live receiver as two separate steps, an event
/// published in between can land in both; `highest_replayed_id` records
/// the cutoff so a consumer can drop anything arriving on `live` that was
/// already delivered via `replay`.
pub struct Subscription {
    pub replay: Vec<StoredEvent>,
    pub highest_replayed_id: Option<u64>,
    pub live: broadcast::Receiver<StoredEvent>,
}

/// Whether an event arriving on `live` with id `event_id` was already
/// delivered as part of `replay` (see [`Subscription`]'s docs for why
/// that can happen) and should be skipped by the consumer.
pub fn already_replayed(highest_replayed_id: Option<u64>, event_id: u64) -> bool {
    matches!(highest_replayed_id, Some(id) if event_id <= id)
}

pub struct EventBus {
    next_id: AtomicU64,
    ring: Mutex<VecDeque<StoredEvent>>,
    tx: broadcast::Sender<StoredEvent>,
}

impl Default for EventBus {
    fn default() -> Self {
        let (tx, _rx) = broadcast::channel(SUBSCRIBER_QUEUE_CAPACITY);
        Self {
            next_id: AtomicU64::new(0),
            ring: Mutex::new(VecDeque::with_capacity(RING_CAPACITY)),
            tx,
        }
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assign the next monotonic id, timestamp the event, append it to the
    /// ring (evicting the oldest if full), and enqueue it to every live
    /// subscriber. Never blocks: subscribers with a full queue simply lag
    /// (see `subscribe`'s handling of `RecvError::Lagged`).
    pub fn publish(&self, payload: EventPayload) -> StoredEvent {
        let event_id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let event = StoredEvent {
            event_id,
            timestamp: chrono::Utc::now(),
            payload,
        };
        {
            let mut ring = self.ring.lock().expect("event ring poisoned");
            if ring.len() == RING_CAPACITY {
                ring.pop_front();
            }
            ring.push_back(event.clone());
        }
        // No receivers is not an error: it just means nobody is watching.
        let _ = self.tx.send(event.clone());
        event
    }

    /// Create a new subscription. If `last_event_id` is given, returns
    /// every still-buffered event after it for replay before switching to
    /// live delivery. When the requested id is older than everything the
    /// ring retains, this still replays the whole ring (the events strictly
    /// between the requested id and the ring's oldest entry are simply
    /// gone — the bus can't recover history it already evicted, but it
    /// never skips replay outright just because some of it was lost).
    pub fn subscribe(&self, last_event_id: Option<u64>) -> Subscription {
        let live = self.tx.subscribe();
        let replay: Vec<StoredEvent> = match last_event_id {
            Some(id) => {
                let ring = self.ring.lock().expect("event ring poisoned");
                ring.iter().filter(|e| e.event_id > id).cloned().collect()
            }
            None => Vec::new(),
        };
        // `live` is subscribed before the ring snapshot above, so a
        // publish landing between those two steps is visible to both —
        // `highest_replayed_id` lets the consumer drop that duplicate
        // when it later arrives on `live` (§8 "exactly once").
        let highest_replayed_id = replay.last().map(|e| e.event_id);
        Subscription { replay, highest_replayed_id, live }
    }

    /// Current size of the replay ring, mostly useful for tests/metrics.
    pub fn ring_len(&self) -> usize {
        self.ring.lock().expect("event ring poisoned").len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn progress(session_id: &str, percent: f32) -> EventPayload {
        EventPayload::Progress {
            session_id: session_id.to_string(),
            operation_id: "op".to_string(),
            percent,
            message: None,
        }
    }

    #[test]
    fn publish_assigns_strictly_increasing_ids() {
        let bus = EventBus::new();
        let a = bus.publish(progress("s", 1.0));
        let b = bus.publish(progress("s", 2.0));
        assert!(b.event_id > a.event_id);
    }

    #[test]
    fn ring_evicts_oldest_past_capacity() {
        let bus = EventBus::new();
        for i in 0..RING_CAPACITY + 10 {
            bus.publish(progress("s", i as f32));
        }
        assert_eq!(bus.ring_len(), RING_CAPACITY);
    }

    #[tokio::test]
    async fn reconnect_with_recent_id_replays_missed_events() {
        let bus = EventBus::new();
        let mut ids = Vec::new();
        for i in 0..10 {
            ids.push(bus.publish(progress("s", i as f32)).event_id);
        }
        let subscription = bus.subscribe(Some(ids[4]));
        assert_eq!(subscription.replay.len(), 5);
        assert_eq!(subscription.replay[0].event_id, ids[5]);
    }

    #[tokio::test]
    async fn reconnect_with_id_older_than_ring_replays_the_whole_ring() {
        let bus = EventBus::new();
        for i in 0..(RING_CAPACITY + 50) {
            bus.publish(progress("s", i as f32));
        }
        // last_event_id is older than anything retained; replay covers
        // everything still in the ring rather than nothing at all (§8
        // scenario 4: ids 1..1500 published, reconnect at 480, ring holds
        // 501..1500, client still receives 501..1500).
        let subscription = bus.subscribe(Some(0));
        assert_eq!(subscription.replay.len(), RING_CAPACITY);
    }

    #[tokio::test]
    async fn subscribe_with_no_last_id_gets_no_replay() {
        let bus = EventBus::new();
        bus.publish(progress("s", 1.0));
        let subscription = bus.subscribe(None);
        assert!(subscription.replay.is_empty());
        assert_eq!(subscription.highest_replayed_id, None);
    }

    #[tokio::test]
    async fn highest_replayed_id_matches_the_last_replayed_event() {
        let bus = EventBus::new();
        let mut ids = Vec::new();
        for i in 0..5 {
            ids.push(bus.publish(progress("s", i as f32)).event_id);
        }
        let subscription = bus.subscribe(Some(ids[1]));
        assert_eq!(subscription.highest_replayed_id, Some(ids[4]));
    }

    #[test]
    fn already_replayed_flags_ids_at_or_below_the_cutoff() {
        // This is the rule a `live` consumer applies to dedupe an event
        // that landed in both `replay` and the start of `live` because
        // `subscribe` opens the live receiver and reads the ring as two
        // separate, non-atomic steps (§8 "exactly once").
        assert!(already_replayed(Some(5), 5));
        assert!(already_replayed(Some(5), 3));
        assert!(!already_replayed(Some(5), 6));
        assert!(!already_replayed(None, 1));
    }

    #[tokio::test]
    async fn live_receiver_sees_events_published_after_subscribe() {
        let bus = EventBus::new();
        let mut subscription = bus.subscribe(None);
        bus.publish(progress("s", 1.0));
        let received = subscription.live.recv().await.unwrap();
        assert_eq!(received.event_id, 1);
    }

    #[tokio::test]
    async fn slow_subscriber_observes_lagged_error() {
        let bus = EventBus::new();
        let mut subscription = bus.subscribe(None);
        for i in 0..(SUBSCRIBER_QUEUE_CAPACITY + 20) {
            bus.publish(progress("s", i as f32));
        }
        let result = subscription.live.recv().await;
        assert!(matches!(result, Err(broadcast::error::RecvError::Lagged(_))));
    }
}
