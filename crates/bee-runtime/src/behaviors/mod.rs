//! Nested behaviors run by the [`Controller`][crate::controller::Controller].
//!
//! Each behavior is a small context struct holding its own step counters.
//! The controller calls `tick` once per control tick while the behavior is
//! selected, and `reset` from the reset coordinator on every mode change.
//!
//! | Behavior | Runs while | Completes when |
//! |---|---|---|
//! | [`Approach`] | `ActionState::Approaching` | ranging distance below the goal |
//! | [`Pollinate`] | `ActionState::Pollinating` | forward run and wiggle are done |
//! | [`Attack`] | `ActionState::Attacking` | half turn and retreat are done |
//! | [`Communicate`] | `Mode::CommunicatingWithPeers` | the rotation flips are done |
//!
//! `reset` never drives the wheels or the indicator; only the communication
//! behavior touches hardware, to silence its melody.

mod approach;
mod attack;
mod communicate;
mod pollinate;

pub use approach::Approach;
pub use attack::Attack;
pub use communicate::Communicate;
pub use pollinate::Pollinate;

/// Outcome of one behavior tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Progress {
    /// The behavior wants more ticks.
    Running,
    /// The behavior finished and has rewound its counters.
    Complete,
}

impl Progress {
    pub fn is_complete(self) -> bool {
        self == Progress::Complete
    }
}
