//! [`FrameHandoff`] – single-slot, most-recent-wins frame exchange between
//! the acquisition and analysis tasks.
//!
//! Two binary signals pace the pipeline:
//!
//! - *ready*: raised by [`publish`][FrameHandoff::publish], awaited by
//!   [`take`][FrameHandoff::take];
//! - *consumed*: raised by `take`, awaited by
//!   [`wait_consumed`][FrameHandoff::wait_consumed] before the next capture.
//!
//! Signals do not queue: a second `publish` before a `take` replaces the
//! frame and leaves a single pending wake-up.

use std::sync::{Mutex, PoisonError};

use bee_hal::CameraFrame;
use tokio::sync::Notify;

#[derive(Debug, Default)]
pub struct FrameHandoff {
    slot: Mutex<Option<CameraFrame>>,
    ready: Notify,
    consumed: Notify,
}

impl FrameHandoff {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `frame`, replacing any frame not yet taken, and wake the
    /// analysis task.
    pub fn publish(&self, frame: CameraFrame) {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = Some(frame);
        self.ready.notify_one();
    }

    /// Wait for a frame and take it, signalling that the slot is free.
    pub async fn take(&self) -> CameraFrame {
        loop {
            if let Some(frame) = self.try_take() {
                self.consumed.notify_one();
                return frame;
            }
            self.ready.notified().await;
        }
    }

    fn try_take(&self) -> Option<CameraFrame> {
        self.slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }

    /// Wait until the last published frame has been taken.
    pub async fn wait_consumed(&self) {
        self.consumed.notified().await;
    }

    /// `true` when a frame is waiting to be taken.
    pub fn is_pending(&self) -> bool {
        self.slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn most_recent_frame_wins() {
        let handoff = FrameHandoff::new();
        handoff.publish(CameraFrame::gray(&[1]));
        handoff.publish(CameraFrame::gray(&[2]));
        assert_eq!(handoff.take().await.data, vec![2]);
        assert!(!handoff.is_pending());
    }

    #[tokio::test]
    async fn take_waits_for_publish() {
        let handoff = Arc::new(FrameHandoff::new());
        let consumer = {
            let handoff = handoff.clone();
            tokio::spawn(async move { handoff.take().await })
        };
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(!consumer.is_finished());
        handoff.publish(CameraFrame::gray(&[7, 7]));
        let frame = tokio::time::timeout(Duration::from_secs(1), consumer)
            .await
            .expect("take completes")
            .expect("task ok");
        assert_eq!(frame.data, vec![7, 7]);
    }

    #[tokio::test]
    async fn producer_waits_until_frame_consumed() {
        let handoff = Arc::new(FrameHandoff::new());
        handoff.publish(CameraFrame::gray(&[3]));

        let producer = {
            let handoff = handoff.clone();
            tokio::spawn(async move { handoff.wait_consumed().await })
        };
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(!producer.is_finished());

        handoff.take().await;
        tokio::time::timeout(Duration::from_secs(1), producer)
            .await
            .expect("producer released")
            .expect("task ok");
    }
}
