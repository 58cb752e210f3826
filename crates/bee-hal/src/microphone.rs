//! Microphone array sampling.
//!
//! The sampling driver is edge-triggered: it hands each completed burst to a
//! registered [`SampleSink`] and is never polled.  Bursts interleave every
//! microphone of the array, one sample per channel per frame.

use bee_types::BeeError;

/// Callback receiving one interleaved burst of samples.
pub type SampleSink = Box<dyn FnMut(&[i16]) + Send>;

/// A sampling driver that pushes bursts to a sink.
pub trait SampleSource: Send {
    /// Start sampling and deliver every burst to `sink`.  Replaces any sink
    /// registered by a previous call.
    ///
    /// # Errors
    ///
    /// Returns [`BeeError::HardwareFault`] if the microphones cannot start.
    fn start(&mut self, sink: SampleSink) -> Result<(), BeeError>;

    /// Stop sampling and drop the sink.
    ///
    /// # Errors
    ///
    /// Returns [`BeeError::HardwareFault`] if the microphones cannot stop.
    fn stop(&mut self) -> Result<(), BeeError>;
}
