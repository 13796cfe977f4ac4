//! Event channel implementation using crossbeam-channel.
//!
//! Provides a thread-safe way to send events from a batch worker
//! to any UI layer.

use crossbeam_channel::{unbounded, Receiver, Sender};

use super::Event;

/// Sends events from the core library.
///
/// This is a thin wrapper around crossbeam's Sender that can be
/// cloned and moved onto a worker thread.
#[derive(Clone)]
pub struct EventSender {
    inner: Sender<Event>,
}

impl EventSender {
    /// Send an event without blocking.
    ///
    /// If the receiver is dropped, the event is silently discarded
    /// so a job keeps running after its observer goes away.
    pub fn send(&self, event: Event) {
        let _ = self.inner.send(event);
    }
}

/// Receives events from the core library.
///
/// Used by UI layers to subscribe to progress updates.
pub struct EventReceiver {
    inner: Receiver<Event>,
}

impl EventReceiver {
    /// Block until the next event is received
    pub fn recv(&self) -> Option<Event> {
        self.inner.recv().ok()
    }

    /// Returns an iterator over received events.
    ///
    /// Ends once every sender has been dropped.
    pub fn iter(&self) -> impl Iterator<Item = Event> + '_ {
        self.inner.iter()
    }
}

/// A bidirectional event channel for communication between
/// the core library and UI layers.
pub struct EventChannel;

impl EventChannel {
    /// Create a new unbounded event channel.
    pub fn new() -> (EventSender, EventReceiver) {
        let (sender, receiver) = unbounded();
        (
            EventSender { inner: sender },
            EventReceiver { inner: receiver },
        )
    }
}

impl Default for EventChannel {
    fn default() -> Self {
        EventChannel
    }
}

/// A no-op event sender for when you don't need progress reporting.
pub fn null_sender() -> EventSender {
    let (sender, _receiver) = EventChannel::new();
    sender
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{BatchEvent, BatchProgress};
    use std::path::PathBuf;
    use std::thread;

    #[test]
    fn events_can_be_sent_across_threads() {
        let (sender, receiver) = EventChannel::new();

        let handle = thread::spawn(move || {
            sender.send(Event::Batch(BatchEvent::Progress(BatchProgress {
                processed: 5,
                total: 25,
                current_path: PathBuf::from("/test/a.jpg"),
            })));
        });

        handle.join().unwrap();

        match receiver.recv().unwrap() {
            Event::Batch(BatchEvent::Progress(p)) => assert_eq!(p.total, 25),
            _ => panic!("Wrong event type"),
        }
    }

    #[test]
    fn null_sender_does_not_panic() {
        let sender = null_sender();
        sender.send(Event::Batch(BatchEvent::FileFailed {
            path: PathBuf::from("x.png"),
            message: "nobody listening".to_string(),
        }));
    }

    #[test]
    fn receiver_iteration_ends_when_senders_drop() {
        let (sender, receiver) = EventChannel::new();
        for i in 1..=3 {
            sender.send(Event::Batch(BatchEvent::Progress(BatchProgress {
                processed: i,
                total: 3,
                current_path: PathBuf::from("f.jpg"),
            })));
        }
        drop(sender);

        assert_eq!(receiver.iter().count(), 3);
    }
}
