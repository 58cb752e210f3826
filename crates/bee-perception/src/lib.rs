//! `bee-perception` – turning raw sensor data into observations.
//!
//! # Modules
//!
//! - [`pixel`] – brightness extraction from RGB565 or grey camera lines.
//! - [`balloon`] – [`BalloonDetector`][balloon::BalloonDetector]: edge-pair
//!   scan of one brightness line that locates a balloon and classifies it as
//!   a flower (darker than the background) or an enemy (brighter).
//! - [`audio`] – [`AudioClassifier`][audio::AudioClassifier]: accumulates
//!   microphone samples into fixed-length windows, computes their magnitude
//!   spectrum and recognises debounced voice-command tones.
//!
//! Both analysers are plain synchronous values; the runtime decides which
//! task drives them.

pub mod audio;
pub mod balloon;
pub mod pixel;

pub use audio::{AudioClassifier, ClassifierConfig, CommandBand};
pub use balloon::{BalloonDetector, Detection, DetectorConfig};
pub use pixel::{brightness_line, rgb565_green};
