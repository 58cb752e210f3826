//! [`BeeRuntime`] – wires the controller, the image pipeline and the voice
//! command sink together and runs them on Tokio.
//!
//! # Example
//!
//! ```rust,no_run
//! use bee_hal::sim::SimRig;
//! use bee_runtime::{BeeConfig, BeeRuntime};
//!
//! # async fn demo() -> Result<(), bee_types::BeeError> {
//! let sim = SimRig::new();
//! let runtime = BeeRuntime::new(BeeConfig::default())?;
//! let shutdown = runtime.shutdown_handle();
//!
//! tokio::spawn(async move {
//!     tokio::time::sleep(std::time::Duration::from_secs(5)).await;
//!     shutdown.trigger();
//! });
//! runtime
//!     .run(sim.build(), sim.camera().clone(), sim.microphone().clone())
//!     .await
//! # }
//! ```

use std::sync::Arc;

use bee_hal::{BeeRig, SampleSource, ScanlineCamera};
use bee_kernel::SharedState;
use bee_perception::{AudioClassifier, BalloonDetector};
use bee_types::BeeError;
use tracing::{info, warn};

use crate::config::BeeConfig;
use crate::controller::Controller;
use crate::handoff::FrameHandoff;
use crate::shutdown::Shutdown;
use crate::tasks::{acquisition_loop, analysis_loop, control_loop};
use crate::voice::VoiceCommands;

/// The assembled bee.
#[derive(Debug)]
pub struct BeeRuntime {
    config: BeeConfig,
    shared: Arc<SharedState>,
    shutdown: Shutdown,
}

impl BeeRuntime {
    /// # Errors
    ///
    /// Returns [`BeeError::Config`] when `config` fails validation.
    pub fn new(config: BeeConfig) -> Result<Self, BeeError> {
        config.validate()?;
        Ok(Self {
            config,
            shared: SharedState::new(),
            shutdown: Shutdown::new(),
        })
    }

    pub fn config(&self) -> &BeeConfig {
        &self.config
    }

    /// Cross-task state, for observation and for scripted mode switches.
    pub fn shared(&self) -> Arc<SharedState> {
        self.shared.clone()
    }

    pub fn shutdown_handle(&self) -> Shutdown {
        self.shutdown.clone()
    }

    /// Run every task until shutdown is triggered, then stop sampling and
    /// bring the actuators to rest.
    ///
    /// # Errors
    ///
    /// Fails if sampling cannot be started, if a task panicked, or if the
    /// actuators could not be brought to rest.
    pub async fn run<C, S>(self, rig: BeeRig, camera: C, mut microphones: S) -> Result<(), BeeError>
    where
        C: ScanlineCamera + 'static,
        S: SampleSource,
    {
        let BeeRuntime {
            config,
            shared,
            shutdown,
        } = self;

        let detector = BalloonDetector::new(config.vision.clone());
        let voice = VoiceCommands::new(AudioClassifier::new(config.audio.clone()), shared.clone());
        microphones.start(voice.into_sink())?;

        let handoff = Arc::new(FrameHandoff::new());
        let controller = Controller::new(&config.control, shared.clone());
        let control = tokio::spawn(control_loop(
            controller,
            rig,
            config.control.tick(),
            shutdown.listener(),
        ));
        let acquisition = tokio::spawn(acquisition_loop(
            camera,
            shared.clone(),
            handoff.clone(),
            config.acquisition.idle(),
            shutdown.listener(),
        ));
        let analysis = tokio::spawn(analysis_loop(
            detector,
            shared.clone(),
            handoff,
            shutdown.listener(),
        ));
        info!(mode = %shared.mode.current(), "bee running");

        let (control, acquisition, analysis) = tokio::join!(control, acquisition, analysis);
        if let Err(e) = microphones.stop() {
            warn!(error = %e, "failed to stop sampling");
        }
        for (task, result) in [("acquisition", acquisition), ("analysis", analysis)] {
            if let Err(e) = result {
                warn!(task, error = %e, "task ended abnormally");
            }
        }
        let mut rig = control.map_err(|e| BeeError::Channel(format!("control task failed: {e}")))?;
        rig.shutdown()?;
        let (mode, observation, gate_open) = shared.snapshot();
        info!(%mode, ?observation, gate_open, "bee at rest");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use bee_hal::CameraFrame;
    use bee_hal::sim::SimRig;
    use bee_perception::ClassifierConfig;
    use bee_types::{BalloonKind, Mode, Rgb, SCANLINE_LEN};

    use super::*;

    fn command_window(bin: usize) -> Vec<i16> {
        let cfg = ClassifierConfig::default();
        let n = cfg.fft_size;
        let mut burst = vec![0i16; n * cfg.channels];
        for k in 0..n {
            let phase = 2.0 * std::f64::consts::PI * (bin * k) as f64 / n as f64;
            burst[k * cfg.channels + cfg.channel] = (1000.0 * phase.sin()) as i16;
        }
        burst
    }

    fn fast_config() -> BeeConfig {
        let mut config = BeeConfig::default();
        config.acquisition.idle_ms = 5;
        config
    }

    #[test]
    fn invalid_config_is_rejected() {
        let mut config = BeeConfig::default();
        config.control.tick_ms = 0;
        assert!(BeeRuntime::new(config).is_err());
    }

    #[tokio::test]
    async fn voice_command_starts_the_hunt_and_shutdown_rests_the_rig() {
        let sim = SimRig::new();
        let mut line = vec![200u8; SCANLINE_LEN];
        line[250..400].fill(40);
        sim.camera().set_scene(CameraFrame::gray(&line));

        let runtime = BeeRuntime::new(fast_config()).expect("valid config");
        let shared = runtime.shared();
        let shutdown = runtime.shutdown_handle();
        let task = tokio::spawn(runtime.run(
            sim.build(),
            sim.camera().clone(),
            sim.microphone().clone(),
        ));

        while !sim.microphone().is_running() {
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
        let burst = command_window(27);
        for _ in 0..5 {
            assert!(sim.microphone().feed(&burst));
        }
        assert_eq!(shared.mode.current(), Mode::MovingToBalloon);

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(shared.observation.load().kind, BalloonKind::Flower);
        assert!(sim.camera().captures() > 0);
        assert_eq!(sim.indicator().color(), Rgb::YELLOW);

        shutdown.trigger();
        tokio::time::timeout(Duration::from_secs(1), task)
            .await
            .expect("runtime stops")
            .expect("task ok")
            .expect("clean shutdown");
        assert_eq!(sim.motors().speeds(), (0, 0));
        assert_eq!(sim.indicator().color(), Rgb::OFF);
        assert!(!sim.microphone().is_running());
    }

    #[tokio::test]
    async fn stopped_bee_never_captures() {
        let sim = SimRig::new();
        let runtime = BeeRuntime::new(fast_config()).expect("valid config");
        let shared = runtime.shared();
        let shutdown = runtime.shutdown_handle();
        let task = tokio::spawn(runtime.run(
            sim.build(),
            sim.camera().clone(),
            sim.microphone().clone(),
        ));

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(sim.camera().captures(), 0);
        assert_eq!(shared.mode.current(), Mode::Stopped);
        assert_eq!(sim.motors().speeds(), (0, 0));

        shutdown.trigger();
        task.await.expect("task ok").expect("clean shutdown");
    }
}
