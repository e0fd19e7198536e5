//! Channel plumbing between the core engine and a presentation layer.
//!
//! The core only ever holds an [`EventSender`]; whether anyone listens is
//! the caller's business. A pass with no UI attached runs against
//! [`null_sender`] and pays for nothing but a channel send.

use crossbeam_channel::{unbounded, Receiver, Sender};

use super::Event;

/// Emits events from a running pass.
///
/// Cloneable and thread-safe; the organize and dedup passes take one by
/// reference and fire events as they go.
#[derive(Clone)]
pub struct EventSender {
    inner: Sender<Event>,
}

impl EventSender {
    /// Send an event.
    ///
    /// A dropped receiver silently discards the event: progress reporting
    /// is optional and never stalls or fails a pass.
    pub fn send(&self, event: Event) {
        let _ = self.inner.send(event);
    }
}

/// The consuming end of an event channel, held by a UI layer.
pub struct EventReceiver {
    inner: Receiver<Event>,
}

impl EventReceiver {
    /// Iterate over events until every sender clone is dropped.
    pub fn iter(&self) -> impl Iterator<Item = Event> + '_ {
        self.inner.iter()
    }
}

/// Factory for connected sender/receiver pairs.
pub struct EventChannel;

impl EventChannel {
    /// Create an unbounded event channel.
    ///
    /// Events are small and far cheaper than the filesystem work between
    /// them, so backpressure is not a concern.
    pub fn new() -> (EventSender, EventReceiver) {
        let (sender, receiver) = unbounded();
        (
            EventSender { inner: sender },
            EventReceiver { inner: receiver },
        )
    }
}

/// A sender with no receiver, for passes that run without a UI.
pub fn null_sender() -> EventSender {
    let (sender, _receiver) = EventChannel::new();
    sender
}
