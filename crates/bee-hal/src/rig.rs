//! [`BeeRig`] – the actuator and polled-sensor bundle driven by the controller.
//!
//! The rig owns one driver per collaborator the control tick talks to: the
//! wheel motors, the indicator LEDs, the ranging sensor and the tone
//! generator.  Behaviors only ever see the rig, so drivers can be swapped
//! (real board, simulator, test doubles) without touching control logic.
//!
//! The camera and the microphones are not part of the rig: they are owned by
//! their own acquisition tasks.

use bee_types::{BeeError, Rgb};
use tracing::warn;

use crate::indicator::Indicator;
use crate::motor::WheelMotors;
use crate::ranging::RangeSensor;
use crate::tone::ToneDriver;

/// Driver bundle used by the behavior controller.
pub struct BeeRig {
    motors: Box<dyn WheelMotors>,
    indicator: Box<dyn Indicator>,
    ranging: Box<dyn RangeSensor>,
    tone: Box<dyn ToneDriver>,
}

impl BeeRig {
    pub fn new(
        motors: Box<dyn WheelMotors>,
        indicator: Box<dyn Indicator>,
        ranging: Box<dyn RangeSensor>,
        tone: Box<dyn ToneDriver>,
    ) -> Self {
        Self {
            motors,
            indicator,
            ranging,
            tone,
        }
    }

    /// Command both wheels.
    ///
    /// # Errors
    ///
    /// Returns the first motor driver failure; the other wheel is not
    /// commanded in that case.
    pub fn drive(&mut self, left: i32, right: i32) -> Result<(), BeeError> {
        self.motors.set_right_speed(right)?;
        self.motors.set_left_speed(left)
    }

    /// Stop both wheels.
    ///
    /// # Errors
    ///
    /// Returns the first motor driver failure.
    pub fn halt(&mut self) -> Result<(), BeeError> {
        self.drive(0, 0)
    }

    /// # Errors
    ///
    /// Returns the indicator driver failure, if any.
    pub fn set_color(&mut self, color: Rgb) -> Result<(), BeeError> {
        self.indicator.set_color(color)
    }

    /// Poll the ranging sensor.
    ///
    /// # Errors
    ///
    /// Returns the ranging driver failure, if any.
    pub fn distance_mm(&mut self) -> Result<u16, BeeError> {
        self.ranging.distance_mm()
    }

    /// # Errors
    ///
    /// Returns the tone driver failure, if any.
    pub fn play_tone(&mut self, freq_hz: u16) -> Result<(), BeeError> {
        self.tone.play(freq_hz)
    }

    /// # Errors
    ///
    /// Returns the tone driver failure, if any.
    pub fn stop_tone(&mut self) -> Result<(), BeeError> {
        self.tone.stop()
    }

    /// Bring every actuator to rest: wheels stopped, tone silenced, LEDs off.
    ///
    /// Every actuator is attempted even if an earlier one fails; the first
    /// failure is returned.
    pub fn shutdown(&mut self) -> Result<(), BeeError> {
        let results = [self.halt(), self.stop_tone(), self.set_color(Rgb::OFF)];
        let mut first = Ok(());
        for result in results {
            if let Err(e) = result {
                warn!(error = %e, "actuator failed to come to rest");
                if first.is_ok() {
                    first = Err(e);
                }
            }
        }
        first
    }
}
