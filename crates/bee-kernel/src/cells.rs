//! Single-writer / multi-reader cells shared between tasks.
//!
//! | Cell | Writer | Readers |
//! |---|---|---|
//! | [`ObservationCell`] | analysis / acquisition task | control task |
//! | [`CaptureGate`] | control task (and analysis task on too-close) | acquisition task |
//! | [`PlaybackFlag`] | tone sequencer | audio task |
//!
//! Each cell is one atomic word.  A one-tick stale read is harmless; a torn
//! read is not, which is why the observation's position and kind share a
//! single `AtomicU32`.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use bee_types::{BalloonKind, BalloonObservation};

// ────────────────────────────────────────────────────────────────────────────
// ObservationCell
// ────────────────────────────────────────────────────────────────────────────

/// Latest [`BalloonObservation`], packed as `position | kind << 16`.
#[derive(Debug)]
pub struct ObservationCell {
    packed: AtomicU32,
}

impl Default for ObservationCell {
    fn default() -> Self {
        Self {
            packed: AtomicU32::new(pack(BalloonObservation::sentinel())),
        }
    }
}

fn pack(observation: BalloonObservation) -> u32 {
    u32::from(observation.position) | (u32::from(observation.kind.as_u8()) << 16)
}

fn unpack(raw: u32) -> BalloonObservation {
    BalloonObservation {
        position: (raw & 0xFFFF) as u16,
        kind: BalloonKind::from_u8((raw >> 16) as u8),
    }
}

impl ObservationCell {
    /// Starts at the sentinel.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn publish(&self, observation: BalloonObservation) {
        self.packed.store(pack(observation), Ordering::Release);
    }

    pub fn load(&self) -> BalloonObservation {
        unpack(self.packed.load(Ordering::Acquire))
    }

    /// Move the position back to `center`, keeping the last target kind.
    ///
    /// Used while captures are suspended during a close-range action.
    pub fn recenter(&self, center: u16) {
        let mut current = self.packed.load(Ordering::Acquire);
        loop {
            let next = (current & 0xFFFF_0000) | u32::from(center);
            match self.packed.compare_exchange_weak(
                current,
                next,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => return,
                Err(actual) => current = actual,
            }
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// CaptureGate
// ────────────────────────────────────────────────────────────────────────────

/// Whether the acquisition task may start new captures.  Open by default.
#[derive(Debug)]
pub struct CaptureGate {
    enabled: AtomicBool,
}

impl Default for CaptureGate {
    fn default() -> Self {
        Self {
            enabled: AtomicBool::new(true),
        }
    }
}

impl CaptureGate {
    pub fn enable(&self) {
        self.enabled.store(true, Ordering::Release);
    }

    pub fn disable(&self) {
        self.enabled.store(false, Ordering::Release);
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Acquire)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// PlaybackFlag
// ────────────────────────────────────────────────────────────────────────────

/// Set while a tone sequence is playing so the microphones ignore it.
#[derive(Debug, Default)]
pub struct PlaybackFlag {
    playing: AtomicBool,
}

impl PlaybackFlag {
    pub fn set(&self, playing: bool) {
        self.playing.store(playing, Ordering::Release);
    }

    pub fn is_playing(&self) -> bool {
        self.playing.load(Ordering::Acquire)
    }
}
