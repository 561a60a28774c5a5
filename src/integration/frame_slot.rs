//! Latest-frame-wins hand-off between a frame producer and the pipeline
//! worker.
//!
//! The slot holds at most one pending frame. Publishing while a frame is still
//! pending replaces it, so a slow worker always picks up the newest frame and
//! never works through a backlog.

use crossbeam_channel::{Receiver, Sender, TryRecvError, TrySendError, bounded};
use tracing::trace;

/// Create a connected publisher/receiver pair.
pub fn frame_slot<T>() -> (FramePublisher<T>, FrameReceiver<T>) {
    let (tx, rx) = bounded(1);
    (
        FramePublisher {
            tx,
            rx: rx.clone(),
        },
        FrameReceiver { rx },
    )
}

/// Producer side. Dropping it ends the worker loop once the slot drains.
#[derive(Debug)]
pub struct FramePublisher<T> {
    tx: Sender<T>,
    /// Used to evict the stale frame when the slot is full.
    rx: Receiver<T>,
}

impl<T> FramePublisher<T> {
    /// Offer a frame. Returns `true` if a pending frame was dropped for it.
    pub fn publish(&self, frame: T) -> bool {
        let mut frame = frame;
        let mut dropped = false;
        loop {
            match self.tx.try_send(frame) {
                Ok(()) => return dropped,
                Err(TrySendError::Full(back)) => {
                    if self.rx.try_recv().is_ok() {
                        trace!("dropped stale frame");
                        dropped = true;
                    }
                    frame = back;
                }
                Err(TrySendError::Disconnected(_)) => return dropped,
            }
        }
    }
}

/// Worker side.
#[derive(Debug, Clone)]
pub struct FrameReceiver<T> {
    rx: Receiver<T>,
}

impl<T> FrameReceiver<T> {
    /// Block until a frame arrives. `None` once the publisher is gone and the
    /// slot is empty.
    pub fn recv(&self) -> Option<T> {
        self.rx.recv().ok()
    }

    /// Take the pending frame, if any.
    pub fn try_recv(&self) -> Option<T> {
        match self.rx.try_recv() {
            Ok(frame) => Some(frame),
            Err(TryRecvError::Empty | TryRecvError::Disconnected) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_latest_frame_wins() {
        let (publisher, receiver) = frame_slot();
        assert!(!publisher.publish(1));
        assert!(publisher.publish(2));
        assert!(publisher.publish(3));
        assert_eq!(receiver.try_recv(), Some(3));
        assert_eq!(receiver.try_recv(), None);
    }

    #[test]
    fn test_recv_ends_when_publisher_dropped() {
        let (publisher, receiver) = frame_slot::<u32>();
        publisher.publish(7);
        drop(publisher);
        assert_eq!(receiver.recv(), Some(7));
        assert_eq!(receiver.recv(), None);
    }

    #[test]
    fn test_cross_thread_handoff() {
        let (publisher, receiver) = frame_slot::<u32>();
        let worker = thread::spawn(move || {
            let mut seen = Vec::new();
            while let Some(frame) = receiver.recv() {
                seen.push(frame);
            }
            seen
        });
        for i in 0..100 {
            publisher.publish(i);
        }
        drop(publisher);
        let seen = worker.join().unwrap();
        // Frames may be skipped but never reordered, and the last one lands.
        assert!(seen.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(seen.last(), Some(&99));
    }
}
