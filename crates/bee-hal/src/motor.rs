//! Differential-drive wheel motors.
//!
//! Speeds are in driver ticks (steps per second on the reference robot).
//! Drivers accept any signed value and saturate internally, so callers never
//! clamp.

use bee_types::BeeError;

/// The two drive wheels of the robot.
pub trait WheelMotors: Send {
    /// Command the left wheel.  Positive values drive forward.
    ///
    /// # Errors
    ///
    /// Returns [`BeeError::HardwareFault`] if the command cannot be applied.
    fn set_left_speed(&mut self, speed: i32) -> Result<(), BeeError>;

    /// Command the right wheel.  Positive values drive forward.
    ///
    /// # Errors
    ///
    /// Returns [`BeeError::HardwareFault`] if the command cannot be applied.
    fn set_right_speed(&mut self, speed: i32) -> Result<(), BeeError>;
}

