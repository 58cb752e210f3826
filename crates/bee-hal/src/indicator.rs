//! RGB indicator LEDs.

use bee_types::{BeeError, Rgb};

/// The ring of RGB indicator LEDs.  A colour is always applied to every
/// element at once.
pub trait Indicator: Send {
    /// Light every indicator element with `color`.  [`Rgb::OFF`] switches
    /// them off.
    ///
    /// # Errors
    ///
    /// Returns [`BeeError::HardwareFault`] if the LED bus rejects the write.
    fn set_color(&mut self, color: Rgb) -> Result<(), BeeError>;
}
