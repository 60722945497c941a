use std::time::Duration;
use crossbeam_channel::{Receiver, Sender, TryRecvError, TrySendError};
use crate::aggregation::{tally, CoinTally};
use crate::common::CoinBox;

/// Result of one frame, as handed to the presentation layer.
#[derive(Debug, Clone, PartialEq)]
pub enum DetectionEvent {
    /// Nothing passed the confidence filter.
    Empty,
    Detections { boxes: Vec<CoinBox>, elapsed: Duration },
}

impl DetectionEvent {
    pub fn boxes(&self) -> &[CoinBox] {
        match self {
            DetectionEvent::Empty => &[],
            DetectionEvent::Detections { boxes, .. } => boxes,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, DetectionEvent::Empty)
    }

    /// Money shown in the frame. An empty frame is worth 0.
    pub fn tally(&self) -> CoinTally {
        tally(self.boxes())
    }
}

/// Sending half of a keep-only-latest frame queue.
///
/// Holds at most one pending frame: sending while a frame is still waiting replaces it.
#[derive(Debug, Clone)]
pub struct FrameSender<T> {
    frame_tx: Sender<T>,
    stale_rx: Receiver<T>,
}

#[derive(Debug, Clone)]
pub struct FrameReceiver<T> {
    pub frame_rx: Receiver<T>,
}

pub fn frame_channel<T>() -> (FrameSender<T>, FrameReceiver<T>) {
    let (frame_tx, frame_rx) = crossbeam_channel::bounded(1);
    (
        FrameSender { frame_tx, stale_rx: frame_rx.clone() },
        FrameReceiver { frame_rx },
    )
}

impl<T> FrameSender<T> {
    /// Queues a frame, dropping the pending one if the worker has not picked it up yet.
    pub fn send(&self, frame: T) {
        let mut frame = frame;
        loop {
            match self.frame_tx.try_send(frame) {
                Ok(()) | Err(TrySendError::Disconnected(_)) => return,
                Err(TrySendError::Full(f)) => {
                    frame = f;
                    match self.stale_rx.try_recv() {
                        Ok(_) => log::trace!("Dropped a stale frame"),
                        Err(TryRecvError::Empty) => {}
                        Err(TryRecvError::Disconnected) => return,
                    }
                }
            }
        }
    }
}

impl<T> FrameReceiver<T> {
    /// Blocks until a frame arrives. `None` once every sender is dropped.
    pub fn recv(&self) -> Option<T> {
        self.frame_rx.recv().ok()
    }
}
