//! In-process simulated drivers for headless runs and tests.
//!
//! Every simulated driver is a cheap, clonable handle onto shared state: hand
//! one clone to the [`BeeRig`] (or the acquisition task) and keep another to
//! script sensor readings and assert on the commands that were issued.
//!
//! # Example
//!
//! ```rust
//! use bee_hal::sim::SimRig;
//! use bee_types::Rgb;
//!
//! let sim = SimRig::new();
//! let mut rig = sim.build();
//!
//! sim.ranging().set_distance(80);
//! assert_eq!(rig.distance_mm().unwrap(), 80);
//!
//! rig.drive(-150, 150).unwrap();
//! rig.set_color(Rgb::YELLOW).unwrap();
//! assert_eq!(sim.motors().speeds(), (-150, 150));
//! assert_eq!(sim.indicator().color(), Rgb::YELLOW);
//! ```

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use bee_types::{BeeError, Rgb, SCANLINE_LEN};

use crate::camera::{CameraFrame, ScanlineCamera};
use crate::indicator::Indicator;
use crate::microphone::{SampleSink, SampleSource};
use crate::motor::WheelMotors;
use crate::ranging::RangeSensor;
use crate::rig::BeeRig;
use crate::tone::ToneDriver;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

// ────────────────────────────────────────────────────────────────────────────
// Motors
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
struct MotorState {
    left: i32,
    right: i32,
    commands: usize,
}

/// Simulated wheel motors recording the last commanded speed of each wheel.
/// Values are stored unsaturated.
#[derive(Debug, Clone, Default)]
pub struct SimMotors {
    state: Arc<Mutex<MotorState>>,
}

impl SimMotors {
    /// `(left, right)` as last commanded.
    pub fn speeds(&self) -> (i32, i32) {
        let state = lock(&self.state);
        (state.left, state.right)
    }

    /// Total number of per-wheel commands received.
    pub fn command_count(&self) -> usize {
        lock(&self.state).commands
    }
}

impl WheelMotors for SimMotors {
    fn set_left_speed(&mut self, speed: i32) -> Result<(), BeeError> {
        let mut state = lock(&self.state);
        state.left = speed;
        state.commands += 1;
        Ok(())
    }

    fn set_right_speed(&mut self, speed: i32) -> Result<(), BeeError> {
        let mut state = lock(&self.state);
        state.right = speed;
        state.commands += 1;
        Ok(())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Indicator
// ────────────────────────────────────────────────────────────────────────────

/// Simulated LED ring recording the current colour.
#[derive(Debug, Clone, Default)]
pub struct SimIndicator {
    color: Arc<Mutex<Rgb>>,
}

impl SimIndicator {
    pub fn color(&self) -> Rgb {
        *lock(&self.color)
    }
}

impl Indicator for SimIndicator {
    fn set_color(&mut self, color: Rgb) -> Result<(), BeeError> {
        *lock(&self.color) = color;
        Ok(())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Ranging
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug)]
struct RangingState {
    distance_mm: u16,
    fault: Option<String>,
}

/// Simulated time-of-flight sensor returning a scripted distance.
///
/// Defaults to 8 m (nothing in range).
#[derive(Debug, Clone)]
pub struct SimRanging {
    state: Arc<Mutex<RangingState>>,
}

impl Default for SimRanging {
    fn default() -> Self {
        Self {
            state: Arc::new(Mutex::new(RangingState {
                distance_mm: 8000,
                fault: None,
            })),
        }
    }
}

impl SimRanging {
    pub fn set_distance(&self, distance_mm: u16) {
        lock(&self.state).distance_mm = distance_mm;
    }

    /// Make the next reading fail with `details`.
    pub fn fail_next(&self, details: impl Into<String>) {
        lock(&self.state).fault = Some(details.into());
    }
}

impl RangeSensor for SimRanging {
    fn distance_mm(&mut self) -> Result<u16, BeeError> {
        let mut state = lock(&self.state);
        match state.fault.take() {
            Some(details) => Err(BeeError::hardware("tof_sensor", details)),
            None => Ok(state.distance_mm),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tone
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
struct ToneState {
    /// `None` while the DAC is released.
    current: Option<u16>,
    played: Vec<u16>,
    stops: usize,
}

/// Simulated tone generator recording every played frequency.
#[derive(Debug, Clone, Default)]
pub struct SimTone {
    state: Arc<Mutex<ToneState>>,
}

impl SimTone {
    /// Frequency currently emitted, `None` when stopped.
    pub fn current(&self) -> Option<u16> {
        lock(&self.state).current
    }

    /// Every frequency passed to `play`, in order.
    pub fn played(&self) -> Vec<u16> {
        lock(&self.state).played.clone()
    }

    pub fn stop_count(&self) -> usize {
        lock(&self.state).stops
    }
}

impl ToneDriver for SimTone {
    fn play(&mut self, freq_hz: u16) -> Result<(), BeeError> {
        let mut state = lock(&self.state);
        state.current = Some(freq_hz);
        state.played.push(freq_hz);
        Ok(())
    }

    fn stop(&mut self) -> Result<(), BeeError> {
        let mut state = lock(&self.state);
        state.current = None;
        state.stops += 1;
        Ok(())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Camera
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug)]
struct CameraState {
    scene: CameraFrame,
    last: CameraFrame,
    in_flight: bool,
    captures: u64,
}

/// Simulated line camera.  Each completed capture copies the current scene
/// into the last-frame buffer after `frame_interval`.
///
/// The default scene is a uniform mid-grey line.
#[derive(Debug, Clone)]
pub struct SimCamera {
    state: Arc<Mutex<CameraState>>,
    frame_interval: Duration,
}

impl Default for SimCamera {
    fn default() -> Self {
        Self::new(Duration::from_millis(5))
    }
}

impl SimCamera {
    pub fn new(frame_interval: Duration) -> Self {
        let blank = CameraFrame::gray(&[128; SCANLINE_LEN]);
        Self {
            state: Arc::new(Mutex::new(CameraState {
                scene: blank.clone(),
                last: blank,
                in_flight: false,
                captures: 0,
            })),
            frame_interval,
        }
    }

    /// Replace what the camera sees from the next capture on.
    pub fn set_scene(&self, frame: CameraFrame) {
        lock(&self.state).scene = frame;
    }

    /// Number of completed captures.
    pub fn captures(&self) -> u64 {
        lock(&self.state).captures
    }
}

#[async_trait]
impl ScanlineCamera for SimCamera {
    fn start_capture(&mut self) -> Result<(), BeeError> {
        lock(&self.state).in_flight = true;
        Ok(())
    }

    async fn wait_capture_ready(&mut self) -> Result<(), BeeError> {
        if !lock(&self.state).in_flight {
            return Err(BeeError::hardware("camera", "no capture in flight"));
        }
        tokio::time::sleep(self.frame_interval).await;
        let mut state = lock(&self.state);
        state.last = state.scene.clone();
        state.in_flight = false;
        state.captures += 1;
        Ok(())
    }

    fn last_frame(&self) -> CameraFrame {
        lock(&self.state).last.clone()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Microphones
// ────────────────────────────────────────────────────────────────────────────

/// Simulated microphone array.  Tests push bursts with [`SimMicrophone::feed`].
#[derive(Clone, Default)]
pub struct SimMicrophone {
    sink: Arc<Mutex<Option<SampleSink>>>,
}

impl SimMicrophone {
    /// Deliver `burst` to the registered sink.  Returns `false` when
    /// sampling has not been started.
    pub fn feed(&self, burst: &[i16]) -> bool {
        match lock(&self.sink).as_mut() {
            Some(sink) => {
                sink(burst);
                true
            }
            None => false,
        }
    }

    pub fn is_running(&self) -> bool {
        lock(&self.sink).is_some()
    }
}

impl SampleSource for SimMicrophone {
    fn start(&mut self, sink: SampleSink) -> Result<(), BeeError> {
        *lock(&self.sink) = Some(sink);
        Ok(())
    }

    fn stop(&mut self) -> Result<(), BeeError> {
        *lock(&self.sink) = None;
        Ok(())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// SimRig builder
// ────────────────────────────────────────────────────────────────────────────

/// A full set of simulated collaborators.
///
/// Keep the `SimRig` to inspect and script the drivers; call
/// [`build`][Self::build] (as often as needed) to obtain a [`BeeRig`] wired to
/// the same state.
#[derive(Clone, Default)]
pub struct SimRig {
    motors: SimMotors,
    indicator: SimIndicator,
    ranging: SimRanging,
    tone: SimTone,
    camera: SimCamera,
    microphone: SimMicrophone,
}

impl SimRig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a [`BeeRig`] whose drivers share state with this simulator.
    pub fn build(&self) -> BeeRig {
        BeeRig::new(
            Box::new(self.motors.clone()),
            Box::new(self.indicator.clone()),
            Box::new(self.ranging.clone()),
            Box::new(self.tone.clone()),
        )
    }

    pub fn motors(&self) -> &SimMotors {
        &self.motors
    }

    pub fn indicator(&self) -> &SimIndicator {
        &self.indicator
    }

    pub fn ranging(&self) -> &SimRanging {
        &self.ranging
    }

    pub fn tone(&self) -> &SimTone {
        &self.tone
    }

    pub fn camera(&self) -> &SimCamera {
        &self.camera
    }

    pub fn microphone(&self) -> &SimMicrophone {
        &self.microphone
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn sim_motors_record_last_command() {
        let sim = SimRig::new();
        let mut rig = sim.build();
        rig.drive(-450, 450).unwrap();
        assert_eq!(sim.motors().speeds(), (-450, 450));
        assert_eq!(sim.motors().command_count(), 2);
        rig.halt().unwrap();
        assert_eq!(sim.motors().speeds(), (0, 0));
    }

    #[test]
    fn sim_ranging_fault_is_one_shot() {
        let sim = SimRig::new();
        let mut rig = sim.build();
        sim.ranging().set_distance(42);
        sim.ranging().fail_next("i2c nack");
        assert!(rig.distance_mm().is_err());
        assert_eq!(rig.distance_mm().unwrap(), 42);
    }

    #[test]
    fn sim_tone_tracks_playback() {
        let sim = SimRig::new();
        let mut rig = sim.build();
        rig.play_tone(466).unwrap();
        rig.play_tone(0).unwrap();
        assert_eq!(sim.tone().current(), Some(0));
        rig.stop_tone().unwrap();
        assert_eq!(sim.tone().current(), None);
        assert_eq!(sim.tone().played(), vec![466, 0]);
        assert_eq!(sim.tone().stop_count(), 1);
    }

    #[test]
    fn shutdown_brings_everything_to_rest() {
        let sim = SimRig::new();
        let mut rig = sim.build();
        rig.drive(100, 100).unwrap();
        rig.set_color(Rgb::RED).unwrap();
        rig.play_tone(311).unwrap();

        rig.shutdown().unwrap();
        assert_eq!(sim.motors().speeds(), (0, 0));
        assert_eq!(sim.indicator().color(), Rgb::OFF);
        assert_eq!(sim.tone().current(), None);
    }

    #[tokio::test]
    async fn sim_camera_delivers_scene_after_capture() {
        let sim = SimRig::new();
        let mut camera = sim.camera().clone();
        let scene = CameraFrame::gray(&[7; SCANLINE_LEN]);
        sim.camera().set_scene(scene.clone());

        camera.start_capture().unwrap();
        camera.wait_capture_ready().await.unwrap();
        assert_eq!(camera.last_frame(), scene);
        assert_eq!(sim.camera().captures(), 1);
    }

    #[tokio::test]
    async fn sim_camera_rejects_wait_without_start() {
        let mut camera = SimCamera::default();
        assert!(camera.wait_capture_ready().await.is_err());
    }

    #[test]
    fn sim_microphone_forwards_bursts_once_started() {
        let sim = SimRig::new();
        let mut mic = sim.microphone().clone();
        assert!(!sim.microphone().feed(&[1, 2, 3, 4]));

        let received = Arc::new(AtomicUsize::new(0));
        let counter = received.clone();
        mic.start(Box::new(move |burst| {
            counter.fetch_add(burst.len(), Ordering::SeqCst);
        }))
        .unwrap();

        assert!(sim.microphone().feed(&[1, 2, 3, 4]));
        assert_eq!(received.load(Ordering::SeqCst), 4);

        mic.stop().unwrap();
        assert!(!sim.microphone().is_running());
    }
}
