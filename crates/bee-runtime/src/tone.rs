//! [`ToneSequencer`] – looping melody played while communicating with peers.
//!
//! The melody is a table of `(frequency, duration)` pairs, durations counted
//! in control ticks.  A zero frequency is a rest: the generator is driven
//! with `play(0)` rather than released, so the loop keeps its rhythm.
//!
//! While a sequence is active the shared [`PlaybackFlag`] is raised so the
//! audio classifier does not mistake the melody for a voice command.

use bee_hal::BeeRig;
use bee_kernel::PlaybackFlag;
use bee_types::BeeError;
use tracing::{debug, trace};

/// One entry of a melody.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Note {
    /// Frequency in Hz; `0` is a rest.
    pub freq_hz: u16,
    /// How many control ticks the note lasts.
    pub ticks: u16,
}

impl Note {
    pub const fn new(freq_hz: u16, ticks: u16) -> Self {
        Self { freq_hz, ticks }
    }

    pub fn is_rest(&self) -> bool {
        self.freq_hz == 0
    }
}

/// The bee's call sign.
pub const BEE_TUNE: [Note; 16] = [
    Note::new(466, 25),
    Note::new(0, 13),
    Note::new(466, 32),
    Note::new(0, 32),
    Note::new(415, 11),
    Note::new(0, 8),
    Note::new(466, 21),
    Note::new(0, 8),
    Note::new(349, 48),
    Note::new(0, 32),
    Note::new(311, 11),
    Note::new(0, 8),
    Note::new(349, 21),
    Note::new(0, 8),
    Note::new(233, 48),
    Note::new(0, 192),
];

/// Cursor over a looping melody, advanced once per control tick.
///
/// # Example
///
/// ```
/// use bee_hal::sim::SimRig;
/// use bee_kernel::PlaybackFlag;
/// use bee_runtime::tone::{Note, ToneSequencer};
///
/// let sim = SimRig::new();
/// let mut rig = sim.build();
/// let playback = PlaybackFlag::default();
/// let mut seq = ToneSequencer::new(vec![Note::new(440, 2), Note::new(0, 1)]);
///
/// for _ in 0..3 {
///     seq.tick(&mut rig, &playback).unwrap();
/// }
/// assert_eq!(sim.tone().played(), vec![440, 0, 440]);
/// assert!(playback.is_playing());
///
/// seq.stop(&mut rig, &playback).unwrap();
/// assert!(!playback.is_playing());
/// assert_eq!(sim.tone().current(), None);
/// ```
#[derive(Debug, Clone)]
pub struct ToneSequencer {
    tune: Vec<Note>,
    cursor: usize,
    elapsed: u16,
    active: bool,
}

impl Default for ToneSequencer {
    fn default() -> Self {
        Self::new(BEE_TUNE.to_vec())
    }
}

impl ToneSequencer {
    pub fn new(tune: Vec<Note>) -> Self {
        Self {
            tune,
            cursor: 0,
            elapsed: 0,
            active: false,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Index of the note currently sounding.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Advance by one tick.
    ///
    /// The first tick after activation starts the first note; a note of
    /// duration `d` is replaced by the next one on its `d`-th tick.  The
    /// melody wraps around after the last note.
    ///
    /// # Errors
    ///
    /// Propagates tone driver failures; the cursor is left where it was.
    pub fn tick(&mut self, rig: &mut BeeRig, playback: &PlaybackFlag) -> Result<(), BeeError> {
        let Some(first) = self.tune.first().copied() else {
            return Ok(());
        };
        if !self.active {
            rig.play_tone(first.freq_hz)?;
            self.active = true;
            playback.set(true);
            debug!(notes = self.tune.len(), "tone sequence started");
        }

        self.elapsed = self.elapsed.saturating_add(1);
        if self.elapsed < self.tune[self.cursor].ticks {
            return Ok(());
        }
        let next = (self.cursor + 1) % self.tune.len();
        rig.play_tone(self.tune[next].freq_hz)?;
        self.cursor = next;
        self.elapsed = 0;
        trace!(cursor = next, freq_hz = self.tune[next].freq_hz, "next note");
        Ok(())
    }

    /// Silence the generator and rewind to the first note.
    ///
    /// Idempotent.  The sequencer is rewound even if the driver fails.
    ///
    /// # Errors
    ///
    /// Propagates the tone driver failure.
    pub fn stop(&mut self, rig: &mut BeeRig, playback: &PlaybackFlag) -> Result<(), BeeError> {
        self.cursor = 0;
        self.elapsed = 0;
        self.active = false;
        playback.set(false);
        rig.stop_tone()
    }
}
