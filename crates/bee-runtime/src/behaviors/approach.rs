use bee_hal::BeeRig;
use bee_types::{BalloonObservation, BeeError};

use super::Progress;
use crate::config::ControlConfig;

/// Proportional approach towards the observed balloon.
///
/// Forward speed is `kp * distance`, never below the base speed.  The lateral
/// offset of the balloon steers the wheels in opposite directions unless it
/// is within the noise deadband.
#[derive(Debug, Clone)]
pub struct Approach {
    kp: i32,
    normal_speed: i32,
    goal_distance_mm: u16,
    rotation_threshold: i32,
    rotation_coeff: i32,
}

impl Approach {
    pub fn new(config: &ControlConfig) -> Self {
        Self {
            kp: config.kp,
            normal_speed: config.normal_speed,
            goal_distance_mm: config.goal_distance_mm,
            rotation_threshold: config.rotation_threshold,
            rotation_coeff: config.rotation_coeff,
        }
    }

    /// Wheel speeds `(left, right)` for a distance and a lateral offset.
    pub fn wheel_speeds(&self, distance_mm: u16, lateral_offset: i32) -> (i32, i32) {
        let speed = self
            .kp
            .saturating_mul(i32::from(distance_mm))
            .max(self.normal_speed);
        let correction = if lateral_offset.abs() < self.rotation_threshold {
            0
        } else {
            lateral_offset
        };
        let steer = self.rotation_coeff.saturating_mul(correction);
        (speed.saturating_add(steer), speed.saturating_sub(steer))
    }

    /// Poll the ranging sensor and steer, or stop once the goal is reached.
    ///
    /// # Errors
    ///
    /// Propagates ranging and motor driver failures.
    pub fn tick(
        &self,
        rig: &mut BeeRig,
        observation: BalloonObservation,
    ) -> Result<Progress, BeeError> {
        let distance = rig.distance_mm()?;
        if distance < self.goal_distance_mm {
            rig.halt()?;
            return Ok(Progress::Complete);
        }
        let (left, right) = self.wheel_speeds(distance, observation.lateral_offset());
        rig.drive(left, right)?;
        Ok(Progress::Running)
    }
}
