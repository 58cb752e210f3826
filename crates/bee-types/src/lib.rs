//! `bee-types` – shared vocabulary of the bee behavior core.
//!
//! Every other crate in the workspace speaks in these types: the top-level
//! [`Mode`], the nested [`ActionState`], the [`BalloonObservation`] published
//! by the image pipeline, indicator colours, and the workspace-wide
//! [`BeeError`].

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of brightness samples in one camera scanline.
pub const SCANLINE_LEN: usize = 640;

/// Lateral position reported when no target is visible (centre of the line).
pub const SCANLINE_CENTER: u16 = (SCANLINE_LEN / 2) as u16;

// ────────────────────────────────────────────────────────────────────────────
// Mode
// ────────────────────────────────────────────────────────────────────────────

/// Top-level behavior selector.
///
/// Written by the audio pipeline (voice commands) and by the communication
/// behavior when it completes; read by the controller and the capture loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum Mode {
    #[default]
    Stopped = 0,
    MovingToBalloon = 1,
    CommunicatingWithPeers = 2,
}

impl Mode {
    /// Decode a value previously produced by [`Mode::as_u8`].
    ///
    /// Unknown values decode to [`Mode::Stopped`], the safe state.
    pub fn from_u8(raw: u8) -> Self {
        match raw {
            1 => Mode::MovingToBalloon,
            2 => Mode::CommunicatingWithPeers,
            _ => Mode::Stopped,
        }
    }

    pub fn as_u8(self) -> u8 {
        self as u8
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Mode::Stopped => write!(f, "stopped"),
            Mode::MovingToBalloon => write!(f, "moving_to_balloon"),
            Mode::CommunicatingWithPeers => write!(f, "communicating_with_peers"),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// ActionState
// ────────────────────────────────────────────────────────────────────────────

/// Nested action selector, meaningful only while the mode is
/// [`Mode::MovingToBalloon`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ActionState {
    #[default]
    Searching,
    Approaching,
    Pollinating,
    Attacking,
}

// ────────────────────────────────────────────────────────────────────────────
// Balloon observation
// ────────────────────────────────────────────────────────────────────────────

/// Classification of a detected balloon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum BalloonKind {
    /// No target in the last analysed scanline.
    #[default]
    None = 0,
    /// Bright-to-dark leading edge: a flower to pollinate.
    Flower = 1,
    /// Dark-to-bright leading edge: an enemy to chase away.
    Enemy = 2,
}

impl BalloonKind {
    /// Decode a value previously produced by [`BalloonKind::as_u8`].
    pub fn from_u8(raw: u8) -> Self {
        match raw {
            1 => BalloonKind::Flower,
            2 => BalloonKind::Enemy,
            _ => BalloonKind::None,
        }
    }

    pub fn as_u8(self) -> u8 {
        self as u8
    }
}

/// Latest result of the image pipeline.
///
/// `kind == BalloonKind::None` always comes with `position == SCANLINE_CENTER`;
/// that position is a sentinel, not a measurement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalloonObservation {
    /// Lateral position in sample units, `0..SCANLINE_LEN`.
    pub position: u16,
    pub kind: BalloonKind,
}

impl BalloonObservation {
    /// The "nothing in sight" observation.
    pub const fn sentinel() -> Self {
        Self {
            position: SCANLINE_CENTER,
            kind: BalloonKind::None,
        }
    }

    /// Build an observation of a real target.
    ///
    /// Passing [`BalloonKind::None`] yields the sentinel regardless of
    /// `position`.
    pub fn target(position: u16, kind: BalloonKind) -> Self {
        match kind {
            BalloonKind::None => Self::sentinel(),
            _ => Self { position, kind },
        }
    }

    pub fn has_target(&self) -> bool {
        self.kind != BalloonKind::None
    }

    /// Signed offset from the centre of the scanline.
    pub fn lateral_offset(&self) -> i32 {
        i32::from(self.position) - i32::from(SCANLINE_CENTER)
    }
}

impl Default for BalloonObservation {
    fn default() -> Self {
        Self::sentinel()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Indicator colour
// ────────────────────────────────────────────────────────────────────────────

/// RGB colour applied uniformly to every indicator LED.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const OFF: Rgb = Rgb::new(0, 0, 0);
    /// Searching and approaching.
    pub const YELLOW: Rgb = Rgb::new(255, 255, 0);
    /// Pollinating a flower.
    pub const BLUE: Rgb = Rgb::new(0, 0, 255);
    /// Attacking an enemy.
    pub const RED: Rgb = Rgb::new(255, 0, 0);
    /// Communicating with peers.
    pub const MAGENTA: Rgb = Rgb::new(255, 0, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Errors
// ────────────────────────────────────────────────────────────────────────────

/// Workspace-wide error type.
///
/// Control decisions never travel through this type: a missing target or a
/// noisy spectrum are ordinary values.  Only collaborator failures and
/// plumbing problems do.
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum BeeError {
    #[error("Hardware Fault on {component}: {details}")]
    HardwareFault { component: String, details: String },

    #[error("Configuration Error: {0}")]
    Config(String),

    #[error("Channel Error: {0}")]
    Channel(String),
}

impl BeeError {
    /// Shorthand for [`BeeError::HardwareFault`].
    pub fn hardware(component: impl Into<String>, details: impl Into<String>) -> Self {
        BeeError::HardwareFault {
            component: component.into(),
            details: details.into(),
        }
    }
}
