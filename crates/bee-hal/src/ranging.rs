//! Time-of-flight distance sensor.

use bee_types::BeeError;

/// A forward-facing ranging sensor.
///
/// Polled synchronously from the control tick; every call is expected to
/// return a fresh measurement.
pub trait RangeSensor: Send {
    /// Distance to the nearest object ahead, in millimetres.
    ///
    /// # Errors
    ///
    /// Returns [`BeeError::HardwareFault`] if no measurement is available.
    fn distance_mm(&mut self) -> Result<u16, BeeError>;
}
