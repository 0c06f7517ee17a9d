#![forbid(unsafe_code)]

//! Bounded subscriber queues and their overflow policy.
//!
//! Every EDS subscriber owns a [`BoundedQueue`]. When a push would exceed the
//! queue's capacity, the queue asks its [`DropPolicy`] which pending event to
//! give up. The default policy is [`TailDrop`]:
//!
//! 1. evict the oldest pending coalescable event (mouse move/drag/scroll,
//!    resize), otherwise
//! 2. evict the oldest pending non-error event, otherwise
//! 3. reject the incoming event.
//!
//! # Invariants
//!
//! - Error events are never dropped. A queue holding only errors still admits
//!   another error and temporarily grows past capacity.
//! - A policy that names an error as its victim is overruled: the incoming
//!   event is rejected instead (or admitted, if it is an error itself).

use std::collections::VecDeque;
use std::fmt;

use crate::event::Event;

/// The policy's answer to a full queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Victim {
    /// Remove the pending event at this index (0 = oldest).
    Evict(usize),
    /// Drop the incoming event and keep the queue as is.
    RejectIncoming,
}

/// Strategy deciding what to drop when a subscriber falls behind.
pub trait DropPolicy: Send + Sync + fmt::Debug {
    /// Pick a victim given the pending events (oldest first) and the incoming
    /// event. Only called when the queue is at capacity.
    fn select_victim(&self, pending: &[Event], incoming: &Event) -> Victim;
}

/// Oldest-first tail drop preferring coalescable events.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TailDrop;

impl DropPolicy for TailDrop {
    fn select_victim(&self, pending: &[Event], _incoming: &Event) -> Victim {
        let mut oldest_plain = None;
        for (idx, event) in pending.iter().enumerate() {
            if event.is_error() {
                continue;
            }
            if event.is_coalescable() {
                return Victim::Evict(idx);
            }
            if oldest_plain.is_none() {
                oldest_plain = Some(idx);
            }
        }
        oldest_plain.map_or(Victim::RejectIncoming, Victim::Evict)
    }
}

/// Result of [`BoundedQueue::push`].
#[derive(Debug, PartialEq, Eq)]
pub enum Push<T> {
    /// The event was queued without loss.
    Queued,
    /// The event was queued after evicting an older one.
    Evicted(Event, T),
    /// The incoming event was dropped.
    Rejected(Event, T),
}

/// FIFO of events with a per-event token, bounded by a drop policy.
///
/// The token travels with its event and is handed back when the event is
/// popped or dropped, so callers can account for every event exactly once.
#[derive(Debug)]
pub struct BoundedQueue<T> {
    events: VecDeque<Event>,
    tokens: VecDeque<T>,
    capacity: usize,
}

impl<T> BoundedQueue<T> {
    /// Create a queue holding at most `capacity` events (minimum 1).
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            events: VecDeque::with_capacity(capacity),
            tokens: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Maximum number of events held under normal operation.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of pending events.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether no events are pending.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Pending events, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &Event> {
        self.events.iter()
    }

    /// Append an event, consulting `policy` if the queue is full.
    pub fn push(&mut self, event: Event, token: T, policy: &dyn DropPolicy) -> Push<T> {
        if self.events.len() < self.capacity {
            self.events.push_back(event);
            self.tokens.push_back(token);
            return Push::Queued;
        }

        let victim = policy.select_victim(self.events.make_contiguous(), &event);
        let victim = match victim {
            Victim::Evict(idx) if self.events.get(idx).is_some_and(|e| !e.is_error()) => {
                Victim::Evict(idx)
            }
            _ => Victim::RejectIncoming,
        };

        match victim {
            Victim::Evict(idx) => {
                let evicted = self.remove(idx);
                self.events.push_back(event);
                self.tokens.push_back(token);
                match evicted {
                    Some((old, old_token)) => Push::Evicted(old, old_token),
                    None => Push::Queued,
                }
            }
            Victim::RejectIncoming if event.is_error() => {
                self.events.push_back(event);
                self.tokens.push_back(token);
                Push::Queued
            }
            Victim::RejectIncoming => Push::Rejected(event, token),
        }
    }

    /// Remove the oldest pending event.
    pub fn pop(&mut self) -> Option<(Event, T)> {
        let event = self.events.pop_front()?;
        let token = self.tokens.pop_front()?;
        Some((event, token))
    }

    /// Remove and return all pending events, oldest first.
    pub fn drain(&mut self) -> Vec<(Event, T)> {
        self.events.drain(..).zip(self.tokens.drain(..)).collect()
    }

    fn remove(&mut self, idx: usize) -> Option<(Event, T)> {
        let event = self.events.remove(idx)?;
        let token = self.tokens.remove(idx)?;
        Some((event, token))
    }
}
