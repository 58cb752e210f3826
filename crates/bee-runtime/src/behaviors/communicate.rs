use bee_hal::BeeRig;
use bee_kernel::PlaybackFlag;
use bee_types::BeeError;
use tracing::debug;

use super::Progress;
use crate::config::ControlConfig;
use crate::tone::ToneSequencer;

/// Spin in place while singing, reversing direction after every full turn.
///
/// The sequence lasts `flips * rotate_360_steps + 1` rotating ticks; the
/// following tick silences the melody, stops the wheels and reports
/// [`Progress::Complete`].  The caller then hands control back to the
/// balloon search.
#[derive(Debug, Clone)]
pub struct Communicate {
    spin_speed: i32,
    rotate_360_steps: u32,
    flips: u32,
    rotation: u32,
    speed: i32,
    tone: ToneSequencer,
}

impl Communicate {
    pub fn new(config: &ControlConfig, tone: ToneSequencer) -> Self {
        let spin_speed = config.normal_speed.saturating_mul(3);
        Self {
            spin_speed,
            rotate_360_steps: config.rotate_360_steps.max(1),
            flips: config.communicate_flips,
            rotation: 0,
            speed: spin_speed,
            tone,
        }
    }

    /// # Errors
    ///
    /// Propagates motor and tone driver failures.  A failure while finishing
    /// leaves the counters untouched so the next tick finishes again.
    pub fn tick(&mut self, rig: &mut BeeRig, playback: &PlaybackFlag) -> Result<Progress, BeeError> {
        if self.rotation <= self.flips.saturating_mul(self.rotate_360_steps) {
            self.tone.tick(rig, playback)?;
            self.rotation += 1;
            if self.rotation % self.rotate_360_steps == 0 {
                self.speed = -self.speed;
            }
            rig.drive(-self.speed, self.speed)?;
            return Ok(Progress::Running);
        }

        self.tone.stop(rig, playback)?;
        rig.halt()?;
        self.rotation = 0;
        self.speed = self.spin_speed;
        debug!(flips = self.flips, "communication sequence complete");
        Ok(Progress::Complete)
    }

    /// Rewind the rotation and silence the melody.
    ///
    /// # Errors
    ///
    /// Propagates the tone driver failure; the counters are rewound anyway.
    pub fn reset(&mut self, rig: &mut BeeRig, playback: &PlaybackFlag) -> Result<(), BeeError> {
        self.rotation = 0;
        self.speed = self.spin_speed;
        self.tone.stop(rig, playback)
    }

    pub fn is_idle(&self) -> bool {
        self.rotation == 0 && self.speed == self.spin_speed && !self.tone.is_active()
    }

    pub fn tone(&self) -> &ToneSequencer {
        &self.tone
    }
}
