//! [`ModeSupervisor`] – the single authoritative top-level [`Mode`].
//!
//! Two writers exist and never act at the same time: the audio classifier
//! (voice commands) and the communication behavior (on completion, from the
//! control task).  Every other component only reads.  The mode is stored in
//! one `AtomicU8`, so a read always observes a whole, valid value.

use std::sync::atomic::{AtomicU8, Ordering};

use bee_types::Mode;
use tracing::info;

/// Who asked for a mode switch; recorded in the log only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeSource {
    /// A debounced command recognised by the audio classifier.
    VoiceCommand,
    /// The communication behavior finished its sequence.
    CommunicationComplete,
}

/// Holder of the process-wide [`Mode`].
///
/// # Example
///
/// ```
/// use bee_kernel::mode::{ModeSource, ModeSupervisor};
/// use bee_types::Mode;
///
/// let supervisor = ModeSupervisor::new();
/// assert_eq!(supervisor.current(), Mode::Stopped);
///
/// assert!(supervisor.switch_to(Mode::MovingToBalloon, ModeSource::VoiceCommand));
/// assert_eq!(supervisor.current(), Mode::MovingToBalloon);
///
/// // Re-issuing the current mode is not a transition.
/// assert!(!supervisor.switch_to(Mode::MovingToBalloon, ModeSource::VoiceCommand));
/// ```
#[derive(Debug, Default)]
pub struct ModeSupervisor {
    mode: AtomicU8,
}

impl ModeSupervisor {
    /// Start in [`Mode::Stopped`].
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Mode {
        Mode::from_u8(self.mode.load(Ordering::Acquire))
    }

    /// Store `mode`.  Returns `true` when it differs from the previous one.
    pub fn switch_to(&self, mode: Mode, source: ModeSource) -> bool {
        let previous = Mode::from_u8(self.mode.swap(mode.as_u8(), Ordering::AcqRel));
        if previous == mode {
            return false;
        }
        info!(from = %previous, to = %mode, ?source, "mode switched");
        true
    }
}
