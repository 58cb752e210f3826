//! `bee-hal` – collaborator contracts of the bee core.
//!
//! Thin hardware wrappers are outside the core; this crate only fixes their
//! interfaces and ships simulated implementations.
//!
//! # Modules
//!
//! - [`motor`] – [`WheelMotors`][motor::WheelMotors]: left/right wheel speed.
//! - [`indicator`] – [`Indicator`][indicator::Indicator]: uniform RGB LED colour.
//! - [`ranging`] – [`RangeSensor`][ranging::RangeSensor]: forward distance in mm.
//! - [`tone`] – [`ToneDriver`][tone::ToneDriver]: single-voice tone playback.
//! - [`camera`] – [`ScanlineCamera`][camera::ScanlineCamera]: one-shot line
//!   capture with asynchronous completion.
//! - [`microphone`] – [`SampleSource`][microphone::SampleSource]: edge-triggered
//!   delivery of interleaved sample bursts.
//! - [`rig`] – [`BeeRig`][rig::BeeRig]: the bundle of drivers the controller
//!   commands on every tick.
//! - [`sim`] – [`SimRig`][sim::SimRig]: in-process simulated drivers for
//!   headless runs and tests.

pub mod camera;
pub mod indicator;
pub mod microphone;
pub mod motor;
pub mod ranging;
pub mod rig;
pub mod sim;
pub mod tone;

pub use camera::{CameraFrame, PixelFormat, ScanlineCamera};
pub use indicator::Indicator;
pub use microphone::{SampleSink, SampleSource};
pub use motor::WheelMotors;
pub use ranging::RangeSensor;
pub use rig::BeeRig;
pub use tone::ToneDriver;
