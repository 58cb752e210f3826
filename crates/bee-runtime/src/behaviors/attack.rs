use bee_hal::BeeRig;
use bee_kernel::CaptureGate;
use bee_types::BeeError;

use super::Progress;
use crate::config::ControlConfig;

/// Turn round in place, then back away at full speed.
#[derive(Debug, Clone)]
pub struct Attack {
    normal_speed: i32,
    rotate_steps: u32,
    reverse_steps: u32,
    rotation: u32,
    reverse: u32,
}

impl Attack {
    pub fn new(config: &ControlConfig) -> Self {
        Self {
            normal_speed: config.normal_speed,
            rotate_steps: config.attack_rotate_steps,
            reverse_steps: config.attack_reverse_steps,
            rotation: 0,
            reverse: 0,
        }
    }

    /// # Errors
    ///
    /// Propagates motor driver failures.
    pub fn tick(&mut self, rig: &mut BeeRig, gate: &CaptureGate) -> Result<Progress, BeeError> {
        self.rotation = self.rotation.saturating_add(1);
        if self.rotation <= self.rotate_steps {
            let spin = self.normal_speed.saturating_mul(3);
            rig.drive(-spin, spin)?;
            return Ok(Progress::Running);
        }

        self.reverse += 1;
        let retreat = self.normal_speed.saturating_mul(-10);
        rig.drive(retreat, retreat)?;
        if self.reverse < self.reverse_steps {
            return Ok(Progress::Running);
        }
        rig.halt()?;
        gate.enable();
        self.reset();
        Ok(Progress::Complete)
    }

    pub fn reset(&mut self) {
        self.rotation = 0;
        self.reverse = 0;
    }

    pub fn is_idle(&self) -> bool {
        self.rotation == 0 && self.reverse == 0
    }
}
