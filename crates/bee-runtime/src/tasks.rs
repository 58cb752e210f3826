//! The concurrent tasks of the bee.
//!
//! | Task | Paced by | Writes |
//! |---|---|---|
//! | [`control_loop`] | fixed-rate interval | actuators, mode on communication completion, capture gate |
//! | [`acquisition_loop`] | camera, or `idle` sleep | frame hand-off, idle observation |
//! | [`analysis_loop`] | frame hand-off | observation, capture gate on too-close |
//!
//! Every loop ends when the [`ShutdownListener`] fires.  A loop body, once
//! started, always runs to completion except for the acquisition wait
//! itself, which is abandoned on shutdown.

use std::sync::Arc;
use std::time::Duration;

use bee_hal::{BeeRig, ScanlineCamera};
use bee_kernel::SharedState;
use bee_perception::{BalloonDetector, brightness_line};
use bee_types::{BalloonObservation, BeeError, Mode, SCANLINE_CENTER};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, trace, warn};

use crate::controller::Controller;
use crate::handoff::FrameHandoff;
use crate::shutdown::ShutdownListener;

// ────────────────────────────────────────────────────────────────────────────
// Control
// ────────────────────────────────────────────────────────────────────────────

/// Tick `controller` every `period` on a fixed grid.
///
/// Deadlines are absolute: a late tick does not shift the following ones,
/// and missed ticks are skipped rather than replayed in a burst.  Returns the
/// rig so the caller can bring it to rest.
pub async fn control_loop(
    mut controller: Controller,
    mut rig: BeeRig,
    period: Duration,
    mut shutdown: ShutdownListener,
) -> BeeRig {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    info!(period_ms = period.as_millis() as u64, "control loop started");

    loop {
        tokio::select! {
            biased;
            _ = shutdown.wait() => break,
            _ = interval.tick() => {
                if let Err(e) = controller.tick(&mut rig) {
                    warn!(error = %e, "control tick aborted");
                }
            }
        }
    }
    info!("control loop stopped");
    rig
}

// ────────────────────────────────────────────────────────────────────────────
// Acquisition
// ────────────────────────────────────────────────────────────────────────────

/// Capture scanlines while balloons are wanted, otherwise idle.
///
/// At most one frame is in flight: after handing a frame over, the next
/// capture starts only once the analysis task has taken it.
pub async fn acquisition_loop<C: ScanlineCamera>(
    mut camera: C,
    shared: Arc<SharedState>,
    handoff: Arc<FrameHandoff>,
    idle: Duration,
    mut shutdown: ShutdownListener,
) {
    loop {
        tokio::select! {
            biased;
            _ = shutdown.wait() => break,
            result = acquire_once(&mut camera, &shared, &handoff, idle) => {
                if let Err(e) = result {
                    warn!(error = %e, "capture failed");
                    tokio::time::sleep(idle).await;
                }
            }
        }
    }
    debug!("acquisition loop stopped");
}

async fn acquire_once<C: ScanlineCamera>(
    camera: &mut C,
    shared: &SharedState,
    handoff: &FrameHandoff,
    idle: Duration,
) -> Result<(), BeeError> {
    let moving = shared.mode.current() == Mode::MovingToBalloon;
    if moving && shared.capture_gate.is_enabled() {
        camera.start_capture()?;
        camera.wait_capture_ready().await?;
        let frame = camera.last_frame();
        if !frame.is_well_formed() {
            return Err(BeeError::hardware(
                "camera",
                format!("{} bytes for a {}-pixel line", frame.data.len(), frame.width),
            ));
        }
        handoff.publish(frame);
        handoff.wait_consumed().await;
        return Ok(());
    }

    publish_idle(shared, moving);
    tokio::time::sleep(idle).await;
    Ok(())
}

/// Observation published while no capture runs.
///
/// Outside `MovingToBalloon` nothing is in sight.  With the gate closed a
/// close-range action is running on the ranging sensor: the position is
/// re-centred and the target kind kept so that action is not interrupted.
fn publish_idle(shared: &SharedState, moving: bool) {
    if moving {
        shared.observation.recenter(SCANLINE_CENTER);
    } else {
        shared.observation.publish(BalloonObservation::sentinel());
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Analysis
// ────────────────────────────────────────────────────────────────────────────

/// Run the detector on every handed-over frame and publish the result.
pub async fn analysis_loop(
    detector: BalloonDetector,
    shared: Arc<SharedState>,
    handoff: Arc<FrameHandoff>,
    mut shutdown: ShutdownListener,
) {
    loop {
        tokio::select! {
            biased;
            _ = shutdown.wait() => break,
            frame = handoff.take() => {
                let line = brightness_line(&frame);
                analyse(&detector, &shared, &line);
            }
        }
    }
    debug!("analysis loop stopped");
}

/// Detect, close the capture gate when the balloon fills the view, publish.
pub fn analyse(detector: &BalloonDetector, shared: &SharedState, line: &[u8]) -> BalloonObservation {
    let detection = detector.detect(line);
    if detection.too_close {
        debug!(span = ?detection.span, "balloon fills the view, suspending captures");
        shared.capture_gate.disable();
    }
    let previous = shared.observation.load();
    if previous.kind != detection.observation.kind {
        debug!(kind = ?detection.observation.kind, position = detection.observation.position, "target changed");
    } else {
        trace!(position = detection.observation.position, "target updated");
    }
    shared.observation.publish(detection.observation);
    detection.observation
}
