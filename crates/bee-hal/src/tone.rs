//! Tone generator (speaker DAC).

use bee_types::BeeError;

/// A single-voice tone generator.
pub trait ToneDriver: Send {
    /// Start emitting `freq_hz`.  `0` keeps the output powered but silent,
    /// which is how rests between notes are rendered.
    ///
    /// # Errors
    ///
    /// Returns [`BeeError::HardwareFault`] if the DAC cannot be driven.
    fn play(&mut self, freq_hz: u16) -> Result<(), BeeError>;

    /// Silence the output and release the DAC.  Calling it while already
    /// stopped is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`BeeError::HardwareFault`] if the DAC cannot be driven.
    fn stop(&mut self) -> Result<(), BeeError>;
}
