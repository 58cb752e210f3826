//! [`Controller`] – the hierarchical behavior state machine.
//!
//! Ticked at a fixed rate by the control task.  Each tick:
//!
//! 1. reads the [`Mode`]; if it changed since the previous tick, the reset
//!    coordinator ([`Controller::reset_all`]) rewinds every behavior first;
//! 2. dispatches on the mode:
//!
//! | Mode | Indicator | Action |
//! |---|---|---|
//! | `Stopped` | off | wheels stopped |
//! | `CommunicatingWithPeers` | magenta | [`Communicate`] |
//! | `MovingToBalloon` | per action | nested [`ActionState`] machine |
//!
//! # Action state machine
//!
//! ```text
//!              ┌──────────── target lost (any state) ─────────────┐
//!              ▼                                                   │
//!        ┌───────────┐ every tick ┌─────────────┐ distance < goal  │
//!   ───► │ Searching │──────────► │ Approaching │──┬─► Pollinating ┤ (flower)
//!        └───────────┘            └─────────────┘  └─► Attacking   ┤ (enemy)
//!              ▲                                                   │
//!              └──────────────── sequence complete ────────────────┘
//! ```
//!
//! Searching is a single spin step: the next tick always tries to approach
//! whatever observation is published at that time.
//!
//! A driver error aborts the remainder of the tick and is returned to the
//! caller; the state reached so far is kept and the next tick carries on.

use std::sync::Arc;

use bee_hal::BeeRig;
use bee_kernel::{ModeSource, SharedState};
use bee_types::{ActionState, BalloonKind, BalloonObservation, BeeError, Mode, Rgb};
use tracing::{debug, instrument};

use crate::behaviors::{Approach, Attack, Communicate, Pollinate};
use crate::config::ControlConfig;
use crate::tone::ToneSequencer;

/// Behavior state machine driving a [`BeeRig`].
#[derive(Debug)]
pub struct Controller {
    shared: Arc<SharedState>,
    normal_speed: i32,
    last_mode: Mode,
    action: ActionState,
    dispatched: Option<ActionState>,
    approach: Approach,
    pollinate: Pollinate,
    attack: Attack,
    communicate: Communicate,
}

impl Controller {
    /// Build a controller in the cold-start state: `Searching`, with the
    /// mode seen at construction as the previous mode.
    pub fn new(config: &ControlConfig, shared: Arc<SharedState>) -> Self {
        Self::with_tune(config, shared, ToneSequencer::default())
    }

    pub fn with_tune(config: &ControlConfig, shared: Arc<SharedState>, tone: ToneSequencer) -> Self {
        let last_mode = shared.mode.current();
        Self {
            shared,
            normal_speed: config.normal_speed,
            last_mode,
            action: ActionState::Searching,
            dispatched: None,
            approach: Approach::new(config),
            pollinate: Pollinate::new(config),
            attack: Attack::new(config),
            communicate: Communicate::new(config, tone),
        }
    }

    /// Action that will run on the next `MovingToBalloon` tick.
    pub fn action(&self) -> ActionState {
        self.action
    }

    /// Action whose branch ran during the last tick, `None` when the last
    /// tick was not in `MovingToBalloon`.
    pub fn dispatched_action(&self) -> Option<ActionState> {
        self.dispatched
    }

    pub fn shared(&self) -> &Arc<SharedState> {
        &self.shared
    }

    /// Run one control tick.
    ///
    /// # Errors
    ///
    /// Returns the first driver failure; the rest of the tick is skipped.
    #[instrument(level = "trace", skip_all)]
    pub fn tick(&mut self, rig: &mut BeeRig) -> Result<(), BeeError> {
        let mode = self.shared.mode.current();
        if mode != self.last_mode {
            debug!(from = %self.last_mode, to = %mode, "mode change, resetting behaviors");
            self.last_mode = mode;
            self.dispatched = None;
            self.reset_all(rig)?;
        }

        match mode {
            Mode::Stopped => {
                self.dispatched = None;
                rig.set_color(Rgb::OFF)?;
                rig.halt()
            }
            Mode::CommunicatingWithPeers => {
                self.dispatched = None;
                rig.set_color(Rgb::MAGENTA)?;
                if self.communicate.tick(rig, &self.shared.playback)?.is_complete() {
                    self.shared
                        .mode
                        .switch_to(Mode::MovingToBalloon, ModeSource::CommunicationComplete);
                }
                Ok(())
            }
            Mode::MovingToBalloon => self.move_to_balloon(rig),
        }
    }

    fn move_to_balloon(&mut self, rig: &mut BeeRig) -> Result<(), BeeError> {
        let observation = self.shared.observation.load();
        if !observation.has_target() {
            self.shared.capture_gate.enable();
            if self.action != ActionState::Searching {
                debug!(from = ?self.action, "target lost");
            }
            self.action = ActionState::Searching;
        }

        self.dispatched = Some(self.action);
        match self.action {
            ActionState::Searching => {
                rig.set_color(Rgb::YELLOW)?;
                rig.drive(-self.normal_speed, self.normal_speed)?;
                self.action = ActionState::Approaching;
            }
            ActionState::Approaching => {
                rig.set_color(Rgb::YELLOW)?;
                if self.approach.tick(rig, observation)?.is_complete() {
                    self.arrive(rig, observation)?;
                }
            }
            ActionState::Pollinating => {
                if self
                    .pollinate
                    .tick(rig, &self.shared.capture_gate)?
                    .is_complete()
                {
                    debug!("pollination done");
                    self.action = ActionState::Searching;
                }
            }
            ActionState::Attacking => {
                if self
                    .attack
                    .tick(rig, &self.shared.capture_gate)?
                    .is_complete()
                {
                    debug!("attack done");
                    self.action = ActionState::Searching;
                }
            }
        }
        Ok(())
    }

    fn arrive(&mut self, rig: &mut BeeRig, observation: BalloonObservation) -> Result<(), BeeError> {
        let (next, color) = match observation.kind {
            BalloonKind::Flower => (ActionState::Pollinating, Rgb::BLUE),
            BalloonKind::Enemy | BalloonKind::None => (ActionState::Attacking, Rgb::RED),
        };
        debug!(kind = ?observation.kind, next = ?next, "balloon reached");
        self.action = next;
        rig.set_color(color)
    }

    /// Reset coordinator: rewind every behavior to its cold-start state and
    /// reopen the capture gate.  No wheel or indicator command is issued;
    /// the melody is silenced.
    ///
    /// # Errors
    ///
    /// Returns the tone driver failure, after every behavior was rewound.
    pub fn reset_all(&mut self, rig: &mut BeeRig) -> Result<(), BeeError> {
        self.action = ActionState::Searching;
        self.pollinate.reset();
        self.attack.reset();
        self.shared.capture_gate.enable();
        self.communicate.reset(rig, &self.shared.playback)
    }

    /// `true` when every behavior is in its cold-start state.
    pub fn is_rewound(&self) -> bool {
        self.action == ActionState::Searching
            && self.pollinate.is_idle()
            && self.attack.is_idle()
            && self.communicate.is_idle()
    }
}

#[cfg(test)]
mod tests {
    use bee_hal::sim::SimRig;
    use bee_types::SCANLINE_CENTER;

    use super::*;

    struct Fixture {
        sim: SimRig,
        rig: BeeRig,
        shared: Arc<SharedState>,
        controller: Controller,
    }

    fn fixture(mode: Mode) -> Fixture {
        let sim = SimRig::new();
        let rig = sim.build();
        let shared = SharedState::new();
        shared.mode.switch_to(mode, ModeSource::VoiceCommand);
        let controller = Controller::new(&ControlConfig::default(), shared.clone());
        Fixture {
            sim,
            rig,
            shared,
            controller,
        }
    }

    impl Fixture {
        fn tick(&mut self) {
            self.controller.tick(&mut self.rig).unwrap();
        }

        fn see(&self, offset: i32, kind: BalloonKind) {
            let position = (i32::from(SCANLINE_CENTER) + offset) as u16;
            self.shared
                .observation
                .publish(BalloonObservation::target(position, kind));
        }
    }

    #[test]
    fn stopped_mode_halts_and_darkens() {
        let mut f = fixture(Mode::Stopped);
        f.tick();
        assert_eq!(f.sim.motors().speeds(), (0, 0));
        assert_eq!(f.sim.indicator().color(), Rgb::OFF);
        assert_eq!(f.controller.dispatched_action(), None);
    }

    #[test]
    fn searching_spins_then_approaches() {
        let mut f = fixture(Mode::MovingToBalloon);
        f.tick();
        assert_eq!(f.controller.dispatched_action(), Some(ActionState::Searching));
        assert_eq!(f.sim.motors().speeds(), (-150, 150));
        assert_eq!(f.sim.indicator().color(), Rgb::YELLOW);
        assert_eq!(f.controller.action(), ActionState::Approaching);
    }

    #[test]
    fn no_target_keeps_searching() {
        let mut f = fixture(Mode::MovingToBalloon);
        for _ in 0..5 {
            f.tick();
            assert_eq!(f.controller.dispatched_action(), Some(ActionState::Searching));
        }
    }

    #[test]
    fn flower_within_goal_starts_pollinating_with_wheels_stopped() {
        let mut f = fixture(Mode::MovingToBalloon);
        f.see(40, BalloonKind::Flower);
        f.sim.ranging().set_distance(30);
        f.tick(); // searching
        f.tick(); // approaching, goal reached
        assert_eq!(f.controller.dispatched_action(), Some(ActionState::Approaching));
        assert_eq!(f.controller.action(), ActionState::Pollinating);
        assert_eq!(f.sim.motors().speeds(), (0, 0));
        assert_eq!(f.sim.indicator().color(), Rgb::BLUE);
    }

    #[test]
    fn enemy_within_goal_starts_attacking() {
        let mut f = fixture(Mode::MovingToBalloon);
        f.see(0, BalloonKind::Enemy);
        f.sim.ranging().set_distance(10);
        f.tick();
        f.tick();
        assert_eq!(f.controller.action(), ActionState::Attacking);
        assert_eq!(f.sim.indicator().color(), Rgb::RED);
    }

    #[test]
    fn offset_inside_deadband_drives_straight() {
        let mut f = fixture(Mode::MovingToBalloon);
        f.see(5, BalloonKind::Flower);
        f.sim.ranging().set_distance(200);
        f.tick();
        f.tick();
        assert_eq!(f.controller.dispatched_action(), Some(ActionState::Approaching));
        assert_eq!(f.sim.motors().speeds(), (400, 400));
    }

    #[test]
    fn target_loss_returns_to_searching_from_any_action() {
        let mut f = fixture(Mode::MovingToBalloon);
        f.see(0, BalloonKind::Enemy);
        f.sim.ranging().set_distance(10);
        f.tick();
        f.tick();
        f.tick();
        assert_eq!(f.controller.dispatched_action(), Some(ActionState::Attacking));

        f.shared.observation.publish(BalloonObservation::sentinel());
        f.shared.capture_gate.disable();
        f.tick();
        assert_eq!(f.controller.dispatched_action(), Some(ActionState::Searching));
        assert!(f.shared.capture_gate.is_enabled());
    }

    #[test]
    fn target_loss_mid_pollination_returns_to_searching() {
        let mut f = fixture(Mode::MovingToBalloon);
        f.see(0, BalloonKind::Flower);
        f.sim.ranging().set_distance(20);
        for _ in 0..12 {
            f.tick();
        }
        assert_eq!(f.controller.dispatched_action(), Some(ActionState::Pollinating));
        assert_eq!(f.sim.motors().speeds(), (150, 150));

        f.shared.observation.publish(BalloonObservation::sentinel());
        f.shared.capture_gate.disable();
        f.tick();
        assert_eq!(f.controller.dispatched_action(), Some(ActionState::Searching));
        assert_eq!(f.sim.motors().speeds(), (-150, 150));
        assert_eq!(f.sim.indicator().color(), Rgb::YELLOW);
        assert!(f.shared.capture_gate.is_enabled());
    }

    #[test]
    fn pollination_runs_to_completion_and_searches_again() {
        let mut f = fixture(Mode::MovingToBalloon);
        f.see(0, BalloonKind::Flower);
        f.sim.ranging().set_distance(20);
        f.tick();
        f.tick();
        f.shared.capture_gate.disable();
        for _ in 0..351 {
            f.tick();
        }
        assert_eq!(f.controller.action(), ActionState::Searching);
        assert!(f.shared.capture_gate.is_enabled());
        assert_eq!(f.sim.motors().speeds(), (0, 0));
    }

    #[test]
    fn communication_completes_back_to_balloon_search() {
        let mut f = fixture(Mode::CommunicatingWithPeers);
        f.tick();
        assert_eq!(f.sim.indicator().color(), Rgb::MAGENTA);
        assert!(f.shared.playback.is_playing());
        for _ in 0..1409 {
            f.tick();
        }
        assert_eq!(f.shared.mode.current(), Mode::MovingToBalloon);
        assert_eq!(f.sim.tone().current(), None);
        assert!(!f.shared.playback.is_playing());
        assert_eq!(f.sim.motors().speeds(), (0, 0));

        // The next tick sees the mode change and starts searching.
        f.tick();
        assert_eq!(f.controller.dispatched_action(), Some(ActionState::Searching));
    }

    #[test]
    fn mode_change_mid_action_resets_everything() {
        let mut f = fixture(Mode::MovingToBalloon);
        f.see(0, BalloonKind::Flower);
        f.sim.ranging().set_distance(20);
        for _ in 0..50 {
            f.tick();
        }
        assert_eq!(f.controller.action(), ActionState::Pollinating);
        assert!(!f.controller.is_rewound());

        f.shared
            .mode
            .switch_to(Mode::Stopped, ModeSource::VoiceCommand);
        f.tick();
        assert!(f.controller.is_rewound());
        assert_eq!(f.sim.motors().speeds(), (0, 0));

        f.shared
            .mode
            .switch_to(Mode::MovingToBalloon, ModeSource::VoiceCommand);
        f.tick();
        assert_eq!(f.controller.dispatched_action(), Some(ActionState::Searching));
    }

    #[test]
    fn leaving_communication_silences_the_tone() {
        let mut f = fixture(Mode::CommunicatingWithPeers);
        for _ in 0..30 {
            f.tick();
        }
        assert!(f.sim.tone().current().is_some());
        f.shared
            .mode
            .switch_to(Mode::Stopped, ModeSource::VoiceCommand);
        f.tick();
        assert_eq!(f.sim.tone().current(), None);
        assert!(!f.shared.playback.is_playing());
    }

    #[test]
    fn reset_matches_cold_start() {
        // Warm controller: run communication part-way, then pollination.
        let mut warm = fixture(Mode::CommunicatingWithPeers);
        for _ in 0..500 {
            warm.tick();
        }
        warm.shared
            .mode
            .switch_to(Mode::MovingToBalloon, ModeSource::VoiceCommand);
        warm.see(0, BalloonKind::Flower);
        warm.sim.ranging().set_distance(20);
        for _ in 0..100 {
            warm.tick();
        }
        warm.controller.reset_all(&mut warm.rig).unwrap();
        warm.controller.reset_all(&mut warm.rig).unwrap();
        assert!(warm.controller.is_rewound());

        let mut cold = fixture(Mode::MovingToBalloon);
        cold.see(0, BalloonKind::Flower);
        cold.sim.ranging().set_distance(20);

        // Identical inputs from here on produce identical outputs.
        for step in 0..400 {
            if step == 250 {
                for f in [&warm, &cold] {
                    f.shared.observation.publish(BalloonObservation::target(
                        SCANLINE_CENTER + 60,
                        BalloonKind::Enemy,
                    ));
                    f.sim.ranging().set_distance(300);
                }
            }
            warm.tick();
            cold.tick();
            assert_eq!(warm.sim.motors().speeds(), cold.sim.motors().speeds(), "step {step}");
            assert_eq!(warm.sim.indicator().color(), cold.sim.indicator().color());
            assert_eq!(warm.controller.action(), cold.controller.action());
        }
    }

    #[test]
    fn driver_fault_aborts_only_the_current_tick() {
        let mut f = fixture(Mode::MovingToBalloon);
        f.see(0, BalloonKind::Flower);
        f.tick();
        f.sim.ranging().fail_next("i2c timeout");
        assert!(f.controller.tick(&mut f.rig).is_err());
        assert_eq!(f.controller.action(), ActionState::Approaching);
        f.sim.ranging().set_distance(500);
        f.tick();
        assert_eq!(f.sim.motors().speeds(), (1000, 1000));
    }
}
