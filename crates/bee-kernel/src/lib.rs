//! `bee-kernel` – cross-task state.
//!
//! The control, acquisition, analysis and audio tasks never lock each other.
//! They communicate through a handful of word-sized atomic cells, each with a
//! single writer:
//!
//! - [`mode`] – [`ModeSupervisor`][mode::ModeSupervisor]: the top-level
//!   [`Mode`][bee_types::Mode], switched by voice commands or by the
//!   communication behavior on completion.
//! - [`cells`] – [`ObservationCell`][cells::ObservationCell] (latest balloon
//!   observation), [`CaptureGate`][cells::CaptureGate] and
//!   [`PlaybackFlag`][cells::PlaybackFlag].
//! - [`shared`] – [`SharedState`][shared::SharedState]: the bundle handed to
//!   every task.

pub mod cells;
pub mod mode;
pub mod shared;

pub use cells::{CaptureGate, ObservationCell, PlaybackFlag};
pub use mode::{ModeSource, ModeSupervisor};
pub use shared::SharedState;
