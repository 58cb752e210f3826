//! Runtime configuration – `bee.toml`.
//!
//! Every field has a default matching the reference hardware, so an empty
//! (or missing) file yields a working configuration.
//!
//! ```toml
//! [control]
//! tick_ms = 10
//! normal_speed = 150
//!
//! [vision]
//! min_width = 80
//!
//! [audio]
//! debounce = 5
//!
//! [acquisition]
//! idle_ms = 200
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use bee_perception::{ClassifierConfig, DetectorConfig};
use bee_types::BeeError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failure to obtain a usable [`BeeConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error(transparent)]
    Invalid(#[from] BeeError),
}

// ────────────────────────────────────────────────────────────────────────────
// Sections
// ────────────────────────────────────────────────────────────────────────────

/// Controller timing, speeds and step counts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlConfig {
    /// Control tick period.
    pub tick_ms: u64,
    /// Base wheel speed; every manoeuvre is a multiple of it.
    pub normal_speed: i32,
    /// Lateral offsets at or below this are treated as camera noise.
    pub rotation_threshold: i32,
    /// Gain applied to the lateral correction on each wheel.
    pub rotation_coeff: i32,
    /// Ranging distance under which the approach ends.
    pub goal_distance_mm: u16,
    /// Proportional gain on the ranging distance.
    pub kp: i32,
    pub attack_rotate_steps: u32,
    pub attack_reverse_steps: u32,
    pub pollinate_forward_steps: u32,
    /// Ticks between two wiggle direction flips.
    pub wiggle_period: u32,
    pub wiggle_flips: u32,
    /// Ticks needed for a full in-place rotation.
    pub rotate_360_steps: u32,
    /// Direction flips before the communication sequence ends.
    pub communicate_flips: u32,
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            tick_ms: 10,
            normal_speed: 150,
            rotation_threshold: 10,
            rotation_coeff: 2,
            goal_distance_mm: 50,
            kp: 2,
            attack_rotate_steps: 138,
            attack_reverse_steps: 40,
            pollinate_forward_steps: 180,
            wiggle_period: 17,
            wiggle_flips: 10,
            rotate_360_steps: 352,
            communicate_flips: 4,
        }
    }
}

/// Upper bound on `control.normal_speed`; the retreat runs at ten times it.
pub const MAX_NORMAL_SPEED: i32 = 1_000;
/// Upper bound on `control.kp` and `control.rotation_coeff`.
pub const MAX_GAIN: i32 = 100;
/// Upper bound on any step count and on the length of a whole sequence.
pub const MAX_SEQUENCE_STEPS: u32 = 1_000_000;

impl ControlConfig {
    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }

    /// # Errors
    ///
    /// Returns [`BeeError::Config`] for a zero tick or period, a speed or
    /// gain outside its range, or a sequence longer than
    /// [`MAX_SEQUENCE_STEPS`].
    pub fn validate(&self) -> Result<(), BeeError> {
        if self.tick_ms == 0 {
            return Err(BeeError::Config("control.tick_ms must be positive".into()));
        }
        if !(1..=MAX_NORMAL_SPEED).contains(&self.normal_speed) {
            return Err(BeeError::Config(format!(
                "control.normal_speed must be in 1..={MAX_NORMAL_SPEED}, got {}",
                self.normal_speed
            )));
        }
        if !(1..=MAX_GAIN).contains(&self.kp) {
            return Err(BeeError::Config(format!(
                "control.kp must be in 1..={MAX_GAIN}, got {}",
                self.kp
            )));
        }
        if !(0..=MAX_GAIN).contains(&self.rotation_coeff) {
            return Err(BeeError::Config(format!(
                "control.rotation_coeff must be in 0..={MAX_GAIN}, got {}",
                self.rotation_coeff
            )));
        }
        if self.rotation_threshold < 0 {
            return Err(BeeError::Config(
                "control.rotation_threshold must not be negative".into(),
            ));
        }
        if self.wiggle_period == 0 || self.rotate_360_steps == 0 {
            return Err(BeeError::Config(
                "control.wiggle_period and control.rotate_360_steps must be positive".into(),
            ));
        }
        let sequences = [
            ("control.attack_rotate_steps", Some(self.attack_rotate_steps)),
            ("control.attack_reverse_steps", Some(self.attack_reverse_steps)),
            ("control.pollinate_forward_steps", Some(self.pollinate_forward_steps)),
            (
                "control.wiggle_flips * control.wiggle_period",
                self.wiggle_flips.checked_mul(self.wiggle_period),
            ),
            (
                "control.communicate_flips * control.rotate_360_steps",
                self.communicate_flips.checked_mul(self.rotate_360_steps),
            ),
        ];
        for (name, steps) in sequences {
            if steps.is_none_or(|n| n > MAX_SEQUENCE_STEPS) {
                return Err(BeeError::Config(format!(
                    "{name} must not exceed {MAX_SEQUENCE_STEPS} ticks"
                )));
            }
        }
        Ok(())
    }
}

/// Acquisition task pacing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AcquisitionConfig {
    /// Sleep between polls while captures are not wanted.
    pub idle_ms: u64,
}

impl Default for AcquisitionConfig {
    fn default() -> Self {
        Self { idle_ms: 200 }
    }
}

impl AcquisitionConfig {
    pub fn idle(&self) -> Duration {
        Duration::from_millis(self.idle_ms)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// BeeConfig
// ────────────────────────────────────────────────────────────────────────────

/// Complete runtime configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BeeConfig {
    pub control: ControlConfig,
    pub vision: DetectorConfig,
    pub audio: ClassifierConfig,
    pub acquisition: AcquisitionConfig,
}

impl BeeConfig {
    /// Read, parse and validate `path`, then apply environment overrides.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Io`] when the file cannot be read,
    /// [`ConfigError::Parse`] on malformed TOML and
    /// [`ConfigError::Invalid`] when a section fails validation.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut cfg = Self::from_toml(&raw)?;
        cfg.apply_env_overrides();
        cfg.validate()?;
        Ok(cfg)
    }

    /// Like [`load`][Self::load] but a missing file yields the defaults
    /// (with environment overrides applied).
    ///
    /// # Errors
    ///
    /// Same as [`load`][Self::load] for a file that exists.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            return Self::load(path);
        }
        let mut cfg = Self::default();
        cfg.apply_env_overrides();
        cfg.validate()?;
        Ok(cfg)
    }

    /// # Errors
    ///
    /// [`ConfigError::Parse`] on malformed TOML.
    pub fn from_toml(raw: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(raw)?)
    }

    /// Apply `BEE_*` environment variable overrides.
    ///
    /// | Variable | Config field |
    /// |---|---|
    /// | `BEE_TICK_MS` | `control.tick_ms` |
    /// | `BEE_IDLE_MS` | `acquisition.idle_ms` |
    ///
    /// Unparseable values are ignored.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(v) = std::env::var("BEE_TICK_MS")
            && let Ok(ms) = v.parse::<u64>()
        {
            self.control.tick_ms = ms;
        }
        if let Ok(v) = std::env::var("BEE_IDLE_MS")
            && let Ok(ms) = v.parse::<u64>()
        {
            self.acquisition.idle_ms = ms;
        }
    }

    /// # Errors
    ///
    /// The first section that fails validation.
    pub fn validate(&self) -> Result<(), BeeError> {
        self.control.validate()?;
        self.vision.validate()?;
        self.audio.validate()
    }
}
