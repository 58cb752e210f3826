//! Voice-command audio classifier.
//!
//! Samples from one microphone of the array are accumulated into a bounded
//! complex buffer (real part = sample, imaginary part = 0).  When the buffer
//! reaches `fft_size` it is transformed in place, converted to a magnitude
//! profile, and cleared for the next window.
//!
//! Classification looks at a narrow bin window `[min_bin, max_bin]` for the
//! strongest bin above `floor`.  Three narrow bands map to commands:
//!
//! | Band | Centre bin (≈ Hz at 1024 points) | Mode |
//! |---|---|---|
//! | move | 27 (≈ 415 Hz) | [`Mode::MovingToBalloon`] |
//! | communicate | 21 (≈ 330 Hz) | [`Mode::CommunicatingWithPeers`] |
//! | stop | 24 (≈ 370 Hz) | [`Mode::Stopped`] |
//!
//! A command is issued only after `debounce` consecutive windows peak in the
//! same band; anything else (no peak, peak outside every band, band change)
//! restarts the count.

use std::sync::Arc;

use bee_types::{BeeError, Mode};
use num_complex::Complex;
use rustfft::{Fft, FftPlanner};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

// ────────────────────────────────────────────────────────────────────────────
// Configuration
// ────────────────────────────────────────────────────────────────────────────

/// Tuning of the [`AudioClassifier`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Transform length (power of two).
    pub fft_size: usize,
    /// Microphones interleaved in each burst.
    pub channels: usize,
    /// Index of the microphone used for commands.
    pub channel: usize,
    pub min_bin: usize,
    pub max_bin: usize,
    /// Magnitude a peak must exceed to count.
    pub floor: f32,
    /// Consecutive matching windows required to issue a command.
    pub debounce: u8,
    pub move_bin: usize,
    pub communicate_bin: usize,
    pub stop_bin: usize,
    /// Bins on each side of a band centre that still belong to the band.
    pub band_half_width: usize,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            fft_size: 1024,
            channels: 4,
            channel: 3,
            min_bin: 10,
            max_bin: 30,
            floor: 10_000.0,
            debounce: 5,
            move_bin: 27,
            communicate_bin: 21,
            stop_bin: 24,
            band_half_width: 1,
        }
    }
}

impl ClassifierConfig {
    /// # Errors
    ///
    /// Returns [`BeeError::Config`] for a non power-of-two transform, a
    /// channel outside the array, a bin window outside the spectrum, a zero
    /// debounce, or overlapping bands.
    pub fn validate(&self) -> Result<(), BeeError> {
        if !self.fft_size.is_power_of_two() || self.fft_size < 2 {
            return Err(BeeError::Config(format!(
                "audio.fft_size must be a power of two, got {}",
                self.fft_size
            )));
        }
        if self.channel >= self.channels {
            return Err(BeeError::Config(format!(
                "audio.channel {} is outside the {}-microphone array",
                self.channel, self.channels
            )));
        }
        if self.min_bin > self.max_bin || self.max_bin >= self.fft_size {
            return Err(BeeError::Config(format!(
                "audio bin window {}..={} does not fit a {}-point spectrum",
                self.min_bin, self.max_bin, self.fft_size
            )));
        }
        if self.debounce == 0 {
            return Err(BeeError::Config("audio.debounce must be at least 1".into()));
        }
        let mut centres = [self.move_bin, self.communicate_bin, self.stop_bin];
        centres.sort_unstable();
        let span = 2 * self.band_half_width;
        if centres.windows(2).any(|pair| pair[1] - pair[0] <= span) {
            return Err(BeeError::Config("audio command bands overlap".into()));
        }
        Ok(())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Command bands
// ────────────────────────────────────────────────────────────────────────────

/// A frequency band carrying a voice command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandBand {
    Move,
    Communicate,
    Stop,
}

impl CommandBand {
    /// The mode requested by this command.
    pub fn mode(self) -> Mode {
        match self {
            CommandBand::Move => Mode::MovingToBalloon,
            CommandBand::Communicate => Mode::CommunicatingWithPeers,
            CommandBand::Stop => Mode::Stopped,
        }
    }
}

/// Debounce state: the band seen in the last windows and how many in a row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DebounceState {
    pub band: Option<CommandBand>,
    pub count: u8,
}

// ────────────────────────────────────────────────────────────────────────────
// AudioClassifier
// ────────────────────────────────────────────────────────────────────────────

/// Bounded sample buffer, spectral transform and debounced band classifier.
pub struct AudioClassifier {
    config: ClassifierConfig,
    fft: Arc<dyn Fft<f32>>,
    buffer: Vec<Complex<f32>>,
    scratch: Vec<Complex<f32>>,
    magnitudes: Vec<f32>,
    debounce: DebounceState,
    windows: u64,
}

impl AudioClassifier {
    pub fn new(config: ClassifierConfig) -> Self {
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(config.fft_size);
        let scratch = vec![Complex::new(0.0, 0.0); fft.get_inplace_scratch_len()];
        Self {
            buffer: Vec::with_capacity(config.fft_size),
            magnitudes: vec![0.0; config.fft_size],
            scratch,
            fft,
            config,
            debounce: DebounceState::default(),
            windows: 0,
        }
    }

    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    /// Append one interleaved burst.
    ///
    /// Only the configured channel is kept.  Once the buffer is full the
    /// remainder of the burst is dropped, the spectrum is recomputed and the
    /// buffer starts over.  Returns `true` when a fresh spectrum is ready.
    pub fn push_burst(&mut self, burst: &[i16]) -> bool {
        let capacity = self.config.fft_size;
        if capacity == 0 || self.config.channels == 0 {
            return false;
        }
        for frame in burst.chunks_exact(self.config.channels) {
            let Some(&sample) = frame.get(self.config.channel) else {
                return false;
            };
            self.buffer.push(Complex::new(f32::from(sample), 0.0));
            if self.buffer.len() >= capacity {
                break;
            }
        }
        if self.buffer.len() < capacity {
            return false;
        }

        self.fft
            .process_with_scratch(&mut self.buffer, &mut self.scratch);
        for (magnitude, bin) in self.magnitudes.iter_mut().zip(&self.buffer) {
            *magnitude = bin.norm();
        }
        self.buffer.clear();
        self.windows += 1;
        trace!(window = self.windows, "audio spectrum ready");
        true
    }

    /// Magnitude profile of the last completed window.
    pub fn magnitudes(&self) -> &[f32] {
        &self.magnitudes
    }

    /// Samples collected towards the next window.
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    pub fn debounce_state(&self) -> DebounceState {
        self.debounce
    }

    /// First strongest bin of the analysis window above the floor.
    pub fn peak_bin(&self) -> Option<usize> {
        let mut best = self.config.floor;
        let mut index = None;
        for bin in self.config.min_bin..=self.config.max_bin {
            let Some(&magnitude) = self.magnitudes.get(bin) else {
                break;
            };
            if magnitude > best {
                best = magnitude;
                index = Some(bin);
            }
        }
        index
    }

    /// The command band owning `bin`, if any.
    pub fn band_of(&self, bin: usize) -> Option<CommandBand> {
        let hw = self.config.band_half_width;
        let within = |centre: usize| bin + hw >= centre && bin <= centre + hw;
        if within(self.config.move_bin) {
            Some(CommandBand::Move)
        } else if within(self.config.communicate_bin) {
            Some(CommandBand::Communicate)
        } else if within(self.config.stop_bin) {
            Some(CommandBand::Stop)
        } else {
            None
        }
    }

    /// Classify the last completed window.
    ///
    /// Returns the requested mode on the window that completes the debounce.
    pub fn classify(&mut self) -> Option<Mode> {
        let peak = self.peak_bin();
        self.observe_peak(peak)
    }

    /// Feed one window's peak (or its absence) to the debounce counter.
    pub fn observe_peak(&mut self, peak: Option<usize>) -> Option<Mode> {
        let Some(band) = peak.and_then(|bin| self.band_of(bin)) else {
            self.debounce = DebounceState::default();
            return None;
        };
        if self.debounce.band != Some(band) {
            self.debounce = DebounceState {
                band: Some(band),
                count: 0,
            };
        }
        self.debounce.count += 1;
        if self.debounce.count < self.config.debounce {
            return None;
        }
        self.debounce.count = 0;
        debug!(?band, ?peak, "voice command recognised");
        Some(band.mode())
    }

    /// Drop buffered samples and the debounce history.
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.debounce = DebounceState::default();
    }
}

impl std::fmt::Debug for AudioClassifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AudioClassifier")
            .field("config", &self.config)
            .field("buffered", &self.buffer.len())
            .field("debounce", &self.debounce)
            .field("windows", &self.windows)
            .finish()
    }
}
