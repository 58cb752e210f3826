//! `bee-runtime` – behavior control and task orchestration.
//!
//! # Modules
//!
//! - [`controller`] – [`Controller`]: the hierarchical behavior state
//!   machine.  Dispatches on the top-level mode and, while hunting balloons,
//!   on the nested action state; resets every behavior on mode changes.
//! - [`behaviors`] – the step-counted manoeuvres run by the controller
//!   ([`Approach`][behaviors::Approach], [`Pollinate`][behaviors::Pollinate],
//!   [`Attack`][behaviors::Attack], [`Communicate`][behaviors::Communicate]).
//! - [`tone`] – [`ToneSequencer`][tone::ToneSequencer]: the looping melody
//!   played while communicating.
//! - [`voice`] – [`VoiceCommands`][voice::VoiceCommands]: microphone sink
//!   turning debounced command tones into mode switches.
//! - [`handoff`] – [`FrameHandoff`][handoff::FrameHandoff]: one-frame
//!   pipeline between capture and analysis.
//! - [`tasks`] – the control, acquisition and analysis loops.
//! - [`runtime`] – [`BeeRuntime`]: assembles everything from a
//!   [`BeeConfig`] and runs it until shutdown.
//! - [`config`] – [`BeeConfig`]: TOML configuration with `BEE_*`
//!   environment overrides.
//! - [`telemetry`] – [`init_tracing`][telemetry::init_tracing]: console
//!   logging plus optional OTLP span export.

pub mod behaviors;
pub mod config;
pub mod controller;
pub mod handoff;
pub mod runtime;
pub mod shutdown;
pub mod tasks;
pub mod telemetry;
pub mod tone;
pub mod voice;

pub use config::{BeeConfig, ConfigError};
pub use controller::Controller;
pub use runtime::BeeRuntime;
pub use shutdown::{Shutdown, ShutdownListener};
pub use telemetry::{TracerProviderGuard, init_tracing};
