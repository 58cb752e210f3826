use bee_hal::BeeRig;
use bee_kernel::CaptureGate;
use bee_types::BeeError;

use super::Progress;
use crate::config::ControlConfig;

/// Drive into the flower, then wiggle in place.
///
/// The forward run lasts `forward_steps + 1` ticks.  The wiggle flips the
/// rotation direction every `wiggle_period` ticks and issues a wheel command
/// only on those flips; after `wiggle_flips` periods the wheels stop and the
/// capture gate reopens.
#[derive(Debug, Clone)]
pub struct Pollinate {
    normal_speed: i32,
    forward_steps: u32,
    wiggle_period: u32,
    wiggle_flips: u32,
    forward: u32,
    wiggle: u32,
    speed: i32,
}

impl Pollinate {
    pub fn new(config: &ControlConfig) -> Self {
        Self {
            normal_speed: config.normal_speed,
            forward_steps: config.pollinate_forward_steps,
            wiggle_period: config.wiggle_period.max(1),
            wiggle_flips: config.wiggle_flips,
            forward: 0,
            wiggle: 0,
            speed: config.normal_speed,
        }
    }

    /// # Errors
    ///
    /// Propagates motor driver failures.
    pub fn tick(&mut self, rig: &mut BeeRig, gate: &CaptureGate) -> Result<Progress, BeeError> {
        if self.forward <= self.forward_steps {
            self.forward += 1;
            rig.drive(self.normal_speed, self.normal_speed)?;
            return Ok(Progress::Running);
        }

        self.wiggle += 1;
        if self.wiggle % self.wiggle_period == 0 {
            self.speed = -self.speed;
            rig.drive(-self.speed, self.speed)?;
        }
        if self.wiggle < self.wiggle_flips.saturating_mul(self.wiggle_period) {
            return Ok(Progress::Running);
        }
        rig.halt()?;
        gate.enable();
        self.reset();
        Ok(Progress::Complete)
    }

    pub fn reset(&mut self) {
        self.forward = 0;
        self.wiggle = 0;
        self.speed = self.normal_speed;
    }

    pub fn is_idle(&self) -> bool {
        self.forward == 0 && self.wiggle == 0 && self.speed == self.normal_speed
    }
}
