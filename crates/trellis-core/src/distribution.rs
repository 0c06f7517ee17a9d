#![forbid(unsafe_code)]

//! Event Distribution System (EDS).
//!
//! A single producer (normally the terminal reader) publishes events; every
//! subscriber gets its own worker thread and its own [`BoundedQueue`], so a
//! slow subscriber never delays the producer or its siblings.
//!
//! # Delivery rules
//!
//! - A subscriber with an empty filter receives every event.
//! - Otherwise it receives events whose [`EventKind`] is in its filter.
//! - [`Event::Error`] reaches every subscriber regardless of filter.
//! - Each subscriber sees its events in publish order, minus whatever its
//!   [`DropPolicy`] discarded on overflow.
//!
//! # Progress
//!
//! An event counts as *processed* once every subscriber it was routed to has
//! either returned from its callback for it or dropped it. An event matching
//! no subscriber is processed on publish. [`DistributionSystem::processed`]
//! and [`DistributionSystem::wait_for_processed`] expose that counter, which
//! is how tests synchronise with the workers.
//!
//! # Example
//!
//! ```
//! use std::sync::mpsc;
//! use std::time::Duration;
//! use trellis_core::{DistributionSystem, Event, EventKind, SubscribeOptions};
//! use trellis_core::geometry::Size;
//!
//! let eds = DistributionSystem::new();
//! let (tx, rx) = mpsc::channel();
//! eds.subscribe(SubscribeOptions::new().with_filter([EventKind::Resize]), move |ev| {
//!     let _ = tx.send(ev.clone());
//! })
//! .unwrap();
//!
//! eds.publish(Event::Resize(Size::new(80, 24)));
//! assert!(eds.wait_for_processed(1, Duration::from_secs(1)));
//! assert_eq!(rx.recv().unwrap(), Event::Resize(Size::new(80, 24)));
//! ```

use std::collections::BTreeSet;
use std::fmt;
use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError, Weak};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::drop_policy::{BoundedQueue, DropPolicy, Push, TailDrop};
use crate::event::{Event, EventKind};

/// Default per-subscriber queue capacity.
pub const DEFAULT_QUEUE_CAPACITY: usize = 256;

/// Identifies one subscription for [`DistributionSystem::unsubscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    /// Raw numeric value.
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sub#{}", self.0)
    }
}

/// Per-subscriber configuration.
#[derive(Debug, Clone)]
pub struct SubscribeOptions {
    filter: BTreeSet<EventKind>,
    capacity: usize,
    policy: Arc<dyn DropPolicy>,
}

impl Default for SubscribeOptions {
    fn default() -> Self {
        Self {
            filter: BTreeSet::new(),
            capacity: DEFAULT_QUEUE_CAPACITY,
            policy: Arc::new(TailDrop),
        }
    }
}

impl SubscribeOptions {
    /// Receive everything, default capacity, tail drop.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict delivery to these kinds. Errors are delivered regardless.
    #[must_use]
    pub fn with_filter(mut self, kinds: impl IntoIterator<Item = EventKind>) -> Self {
        self.filter = kinds.into_iter().collect();
        self
    }

    /// Set the queue capacity (minimum 1).
    #[must_use]
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity.max(1);
        self
    }

    /// Replace the overflow policy.
    #[must_use]
    pub fn with_policy(mut self, policy: impl DropPolicy + 'static) -> Self {
        self.policy = Arc::new(policy);
        self
    }

    fn accepts(&self, event: &Event) -> bool {
        event.is_error() || self.filter.is_empty() || self.filter.contains(&event.kind())
    }
}

/// Errors from EDS management calls.
#[derive(Debug)]
pub enum DistributionError {
    /// The system was closed.
    Closed,
    /// The worker thread could not be spawned.
    Spawn(io::Error),
}

impl fmt::Display for DistributionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Closed => write!(f, "event distribution system is closed"),
            Self::Spawn(err) => write!(f, "failed to spawn subscriber worker: {err}"),
        }
    }
}

impl std::error::Error for DistributionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Spawn(err) => Some(err),
            Self::Closed => None,
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Shared processed counter.
#[derive(Debug, Default)]
struct Progress {
    processed: Mutex<u64>,
    advanced: Condvar,
}

impl Progress {
    fn complete_one(&self) {
        let mut processed = lock(&self.processed);
        *processed += 1;
        self.advanced.notify_all();
    }
}

/// Outstanding deliveries of one published event.
#[derive(Debug)]
struct Ticket {
    remaining: AtomicUsize,
    progress: Arc<Progress>,
}

impl Ticket {
    fn done(&self) {
        if self.remaining.fetch_sub(1, Ordering::AcqRel) == 1 {
            self.progress.complete_one();
        }
    }
}

#[derive(Debug)]
struct Inbox {
    queue: BoundedQueue<Arc<Ticket>>,
    closed: bool,
}

#[derive(Debug)]
struct Mailbox {
    inbox: Mutex<Inbox>,
    ready: Condvar,
}

impl Mailbox {
    fn close(&self) {
        let mut inbox = lock(&self.inbox);
        inbox.closed = true;
        self.ready.notify_all();
    }
}

struct Subscriber {
    id: SubscriptionId,
    options: SubscribeOptions,
    mailbox: Arc<Mailbox>,
    worker: Option<JoinHandle<()>>,
}

impl Subscriber {
    fn deliver(&self, event: &Event, ticket: &Arc<Ticket>) {
        let outcome = {
            let mut inbox = lock(&self.mailbox.inbox);
            if inbox.closed {
                drop(inbox);
                ticket.done();
                return;
            }
            let outcome = inbox
                .queue
                .push(event.clone(), ticket.clone(), self.options.policy.as_ref());
            self.mailbox.ready.notify_one();
            outcome
        };
        match outcome {
            Push::Queued => {}
            Push::Evicted(dropped, token) | Push::Rejected(dropped, token) => {
                crate::trace!(
                    subscription = %self.id,
                    kind = ?dropped.kind(),
                    "subscriber queue full; event dropped"
                );
                let _ = dropped;
                token.done();
            }
        }
    }

    fn stop(&mut self) {
        self.mailbox.close();
        if let Some(handle) = self.worker.take() {
            // A subscriber may unsubscribe itself from inside its callback.
            if handle.thread().id() != thread::current().id() {
                let _ = handle.join();
            }
        }
    }
}

struct Hub {
    subscribers: Mutex<Vec<Subscriber>>,
    next_id: AtomicU64,
    published: AtomicU64,
    progress: Arc<Progress>,
    closed: AtomicBool,
}

impl Hub {
    fn publish(&self, event: Event) {
        if self.closed.load(Ordering::Acquire) {
            return;
        }
        self.published.fetch_add(1, Ordering::Relaxed);

        let subscribers = lock(&self.subscribers);
        let targets: Vec<&Subscriber> = subscribers
            .iter()
            .filter(|sub| sub.options.accepts(&event))
            .collect();

        if targets.is_empty() {
            self.progress.complete_one();
            return;
        }

        let ticket = Arc::new(Ticket {
            remaining: AtomicUsize::new(targets.len()),
            progress: self.progress.clone(),
        });
        for sub in targets {
            sub.deliver(&event, &ticket);
        }
    }
}

/// The publish/subscribe hub.
///
/// Dropping the system closes it: workers are stopped and joined.
pub struct DistributionSystem {
    hub: Arc<Hub>,
}

impl Default for DistributionSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for DistributionSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DistributionSystem")
            .field("subscribers", &self.subscriber_count())
            .field("published", &self.published())
            .field("processed", &self.processed())
            .finish()
    }
}

impl DistributionSystem {
    /// Create an empty hub.
    #[must_use]
    pub fn new() -> Self {
        Self {
            hub: Arc::new(Hub {
                subscribers: Mutex::new(Vec::new()),
                next_id: AtomicU64::new(1),
                published: AtomicU64::new(0),
                progress: Arc::new(Progress::default()),
                closed: AtomicBool::new(false),
            }),
        }
    }

    /// Register `callback` on its own worker thread.
    ///
    /// The callback runs for each accepted event, in publish order. A panic
    /// inside the callback is caught and logged and the worker keeps running,
    /// provided panics unwind. Under `panic = "abort"` (this workspace's
    /// release profile) a panicking callback aborts the process.
    pub fn subscribe<F>(
        &self,
        options: SubscribeOptions,
        callback: F,
    ) -> Result<SubscriptionId, DistributionError>
    where
        F: FnMut(&Event) + Send + 'static,
    {
        if self.hub.closed.load(Ordering::Acquire) {
            return Err(DistributionError::Closed);
        }

        let id = SubscriptionId(self.hub.next_id.fetch_add(1, Ordering::Relaxed));
        let mailbox = Arc::new(Mailbox {
            inbox: Mutex::new(Inbox {
                queue: BoundedQueue::new(options.capacity),
                closed: false,
            }),
            ready: Condvar::new(),
        });

        let worker_mailbox = mailbox.clone();
        let worker = thread::Builder::new()
            .name(format!("trellis-eds-{}", id.get()))
            .spawn(move || run_worker(id, &worker_mailbox, callback))
            .map_err(DistributionError::Spawn)?;

        crate::debug!(subscription = %id, filter = ?options.filter, "subscriber registered");

        lock(&self.hub.subscribers).push(Subscriber {
            id,
            options,
            mailbox,
            worker: Some(worker),
        });
        Ok(id)
    }

    /// Stop one subscriber. Its pending events are dropped.
    ///
    /// Returns `false` if the id is unknown.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let removed = {
            let mut subscribers = lock(&self.hub.subscribers);
            subscribers
                .iter()
                .position(|sub| sub.id == id)
                .map(|idx| subscribers.remove(idx))
        };
        match removed {
            Some(mut sub) => {
                sub.stop();
                crate::debug!(subscription = %id, "subscriber removed");
                true
            }
            None => false,
        }
    }

    /// Fan `event` out to all matching subscribers. Never blocks on a
    /// subscriber. Ignored after [`close`](Self::close).
    pub fn publish(&self, event: Event) {
        self.hub.publish(event);
    }

    /// A producer handle that does not keep the hub alive.
    #[must_use]
    pub fn sink(&self) -> EventSink {
        EventSink {
            hub: Arc::downgrade(&self.hub),
        }
    }

    /// Number of events accepted by [`publish`](Self::publish).
    pub fn published(&self) -> u64 {
        self.hub.published.load(Ordering::Relaxed)
    }

    /// Number of events fully processed.
    pub fn processed(&self) -> u64 {
        *lock(&self.hub.progress.processed)
    }

    /// Block until at least `count` events were processed or `timeout`
    /// elapsed. Returns whether the count was reached.
    pub fn wait_for_processed(&self, count: u64, timeout: Duration) -> bool {
        let progress = &self.hub.progress;
        let deadline = Instant::now() + timeout;
        let mut processed = lock(&progress.processed);
        while *processed < count {
            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            let (guard, _) = progress
                .advanced
                .wait_timeout(processed, deadline - now)
                .unwrap_or_else(PoisonError::into_inner);
            processed = guard;
        }
        true
    }

    /// Number of live subscribers.
    pub fn subscriber_count(&self) -> usize {
        lock(&self.hub.subscribers).len()
    }

    /// Stop every worker and reject further publishes and subscriptions.
    /// Idempotent.
    pub fn close(&self) {
        if self.hub.closed.swap(true, Ordering::AcqRel) {
            return;
        }
        let subscribers = std::mem::take(&mut *lock(&self.hub.subscribers));
        for mut sub in subscribers {
            sub.stop();
        }
        crate::debug!("event distribution system closed");
    }

    /// Whether [`close`](Self::close) was called.
    pub fn is_closed(&self) -> bool {
        self.hub.closed.load(Ordering::Acquire)
    }
}

impl Drop for DistributionSystem {
    fn drop(&mut self) {
        self.close();
    }
}

/// Cloneable producer handle into a [`DistributionSystem`].
///
/// Holds a weak reference, so subscribers may own a sink without creating a
/// reference cycle with the hub that owns them.
#[derive(Clone)]
pub struct EventSink {
    hub: Weak<Hub>,
}

impl EventSink {
    /// Publish an event. Returns `false` if the hub is gone or closed.
    pub fn send(&self, event: Event) -> bool {
        match self.hub.upgrade() {
            Some(hub) if !hub.closed.load(Ordering::Acquire) => {
                hub.publish(event);
                true
            }
            _ => false,
        }
    }
}

impl fmt::Debug for EventSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventSink")
            .field("connected", &(self.hub.strong_count() > 0))
            .finish()
    }
}

fn run_worker<F>(id: SubscriptionId, mailbox: &Mailbox, mut callback: F)
where
    F: FnMut(&Event),
{
    loop {
        let next = {
            let mut inbox = lock(&mailbox.inbox);
            loop {
                if inbox.closed {
                    break None;
                }
                if let Some(item) = inbox.queue.pop() {
                    break Some(item);
                }
                inbox = mailbox
                    .ready
                    .wait(inbox)
                    .unwrap_or_else(PoisonError::into_inner);
            }
        };

        let Some((event, ticket)) = next else {
            break;
        };

        if panic::catch_unwind(AssertUnwindSafe(|| callback(&event))).is_err() {
            crate::error!(subscription = %id, kind = ?event.kind(), "subscriber callback panicked");
        }
        ticket.done();
    }

    // Closed: account for anything still pending so waiters are not stranded.
    let pending = lock(&mailbox.inbox).queue.drain();
    for (_, ticket) in pending {
        ticket.done();
    }
    crate::trace!(subscription = %id, "subscriber worker exited");
}
