//! [`SharedState`] – every cross-task cell in one place.

use std::sync::Arc;

use bee_types::{BalloonObservation, Mode};

use crate::cells::{CaptureGate, ObservationCell, PlaybackFlag};
use crate::mode::ModeSupervisor;

/// Cross-task state handed to every task as an `Arc<SharedState>`.
#[derive(Debug, Default)]
pub struct SharedState {
    pub mode: ModeSupervisor,
    pub observation: ObservationCell,
    pub capture_gate: CaptureGate,
    pub playback: PlaybackFlag,
}

impl SharedState {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Mode, observation and capture gate at one instant, logged when the
    /// runtime comes to rest.
    pub fn snapshot(&self) -> (Mode, BalloonObservation, bool) {
        (
            self.mode.current(),
            self.observation.load(),
            self.capture_gate.is_enabled(),
        )
    }
}
