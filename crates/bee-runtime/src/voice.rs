//! [`VoiceCommands`] – microphone sink turning recognised tones into mode
//! switches.
//!
//! The sampling driver calls the sink once per burst.  The FFT runs in that
//! call whenever the window fills; classification is skipped while the bee
//! is singing, so its own melody never counts towards a command.

use std::sync::Arc;

use bee_hal::SampleSink;
use bee_kernel::{ModeSource, SharedState};
use bee_perception::AudioClassifier;
use bee_types::Mode;
use tracing::trace;

pub struct VoiceCommands {
    classifier: AudioClassifier,
    shared: Arc<SharedState>,
}

impl VoiceCommands {
    pub fn new(classifier: AudioClassifier, shared: Arc<SharedState>) -> Self {
        Self { classifier, shared }
    }

    /// Handle one burst.  Returns the mode requested by a command completed
    /// in this burst, if any.
    pub fn on_burst(&mut self, burst: &[i16]) -> Option<Mode> {
        if !self.classifier.push_burst(burst) {
            return None;
        }
        if self.shared.playback.is_playing() {
            trace!("tone playing, classification skipped");
            return None;
        }
        let mode = self.classifier.classify()?;
        self.shared.mode.switch_to(mode, ModeSource::VoiceCommand);
        Some(mode)
    }

    pub fn classifier(&self) -> &AudioClassifier {
        &self.classifier
    }

    /// Box into the callback handed to [`SampleSource::start`][bee_hal::SampleSource::start].
    pub fn into_sink(mut self) -> SampleSink {
        Box::new(move |burst: &[i16]| {
            self.on_burst(burst);
        })
    }
}

#[cfg(test)]
mod tests {
    use bee_perception::ClassifierConfig;
    use bee_perception::audio::DebounceState;

    use super::*;

    fn window(bin: usize) -> Vec<i16> {
        let cfg = ClassifierConfig::default();
        let n = cfg.fft_size;
        let mut burst = vec![0i16; n * cfg.channels];
        for k in 0..n {
            let phase = 2.0 * std::f64::consts::PI * (bin * k) as f64 / n as f64;
            burst[k * cfg.channels + cfg.channel] = (1000.0 * phase.sin()) as i16;
        }
        burst
    }

    fn voice() -> (VoiceCommands, Arc<SharedState>) {
        let shared = SharedState::new();
        let classifier = AudioClassifier::new(ClassifierConfig::default());
        (VoiceCommands::new(classifier, shared.clone()), shared)
    }

    #[test]
    fn sustained_move_tone_switches_mode_once() {
        let (mut voice, shared) = voice();
        let burst = window(27);
        let issued: Vec<Option<Mode>> = (0..9).map(|_| voice.on_burst(&burst)).collect();
        assert_eq!(issued.iter().flatten().count(), 1);
        assert_eq!(issued[4], Some(Mode::MovingToBalloon));
        assert_eq!(shared.mode.current(), Mode::MovingToBalloon);
    }

    #[test]
    fn communicate_tone_selects_communication() {
        let (mut voice, shared) = voice();
        let burst = window(21);
        for _ in 0..5 {
            voice.on_burst(&burst);
        }
        assert_eq!(shared.mode.current(), Mode::CommunicatingWithPeers);
    }

    #[test]
    fn classification_skipped_while_playing() {
        let (mut voice, shared) = voice();
        let burst = window(24);
        shared.mode.switch_to(Mode::CommunicatingWithPeers, ModeSource::VoiceCommand);
        shared.playback.set(true);
        for _ in 0..10 {
            assert_eq!(voice.on_burst(&burst), None);
        }
        assert_eq!(shared.mode.current(), Mode::CommunicatingWithPeers);
        assert_eq!(voice.classifier().debounce_state(), DebounceState::default());
    }

    #[test]
    fn sink_forwards_bursts() {
        let (voice, shared) = voice();
        let mut sink = voice.into_sink();
        let burst = window(27);
        for _ in 0..5 {
            sink(&burst);
        }
        assert_eq!(shared.mode.current(), Mode::MovingToBalloon);
    }
}
