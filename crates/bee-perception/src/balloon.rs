//! Scanline balloon detector.
//!
//! A balloon shows up on a single camera line as a contiguous region whose
//! brightness differs from the background.  The detector looks for a pair of
//! opposite brightness edges delimiting such a region:
//!
//! - a **beginning** at `i` when `|s[i] − s[i+W]| > threshold`; a drop in
//!   brightness (`s[i] > s[i+W]`) marks a [`BalloonKind::Flower`], a rise
//!   marks a [`BalloonKind::Enemy`];
//! - an **ending** at `j` when `|s[j] − s[j−W]| > threshold` with the
//!   opposite slope (brightness recovers for a flower, falls back for an
//!   enemy).
//!
//! `W` is the lookahead width.  A span narrower than `min_width` is noise:
//! scanning resumes from its end.  Because both edges are found through the
//! lookahead window, any dip narrower than `W` is reported as a span of
//! exactly `2W`, so `min_width` must exceed `2W` to reject single-pixel
//! artefacts (see [`DetectorConfig::validate`]).
//!
//! # Example
//!
//! ```rust
//! use bee_perception::balloon::{BalloonDetector, DetectorConfig};
//! use bee_types::BalloonKind;
//!
//! let detector = BalloonDetector::new(DetectorConfig::default());
//!
//! let mut line = vec![200u8; 640];
//! line[250..400].fill(40); // dark region on a bright background
//!
//! let detection = detector.detect(&line);
//! assert_eq!(detection.observation.kind, BalloonKind::Flower);
//! assert_eq!(detection.span, Some(220..400));
//! assert_eq!(detection.observation.position, 310);
//! ```

use std::ops::Range;

use bee_types::{BalloonKind, BalloonObservation, BeeError, SCANLINE_CENTER, SCANLINE_LEN};
use serde::{Deserialize, Serialize};
use tracing::trace;

// ────────────────────────────────────────────────────────────────────────────
// Configuration
// ────────────────────────────────────────────────────────────────────────────

/// Tuning of the [`BalloonDetector`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DetectorConfig {
    /// Distance `W` between the two samples compared for an edge.
    pub lookahead: usize,
    /// Minimum brightness difference (exclusive) for an edge.
    pub threshold: u8,
    /// Spans narrower than this are discarded as noise.
    pub min_width: usize,
    /// Spans wider than this mean the balloon fills the view.
    pub too_close_width: usize,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            lookahead: 30,
            threshold: 20,
            min_width: 80,
            too_close_width: 400,
        }
    }
}

impl DetectorConfig {
    /// # Errors
    ///
    /// Returns [`BeeError::Config`] when the lookahead does not fit in the
    /// line, when `min_width` would let lookahead-wide artefacts through, or
    /// when the too-close width is below the noise floor.
    pub fn validate(&self) -> Result<(), BeeError> {
        if self.lookahead == 0 || self.lookahead >= SCANLINE_LEN {
            return Err(BeeError::Config(format!(
                "vision.lookahead must be in 1..{SCANLINE_LEN}, got {}",
                self.lookahead
            )));
        }
        if self.min_width <= 2 * self.lookahead {
            return Err(BeeError::Config(format!(
                "vision.min_width ({}) must exceed twice the lookahead ({})",
                self.min_width, self.lookahead
            )));
        }
        if self.too_close_width < self.min_width {
            return Err(BeeError::Config(format!(
                "vision.too_close_width ({}) must be at least vision.min_width ({})",
                self.too_close_width, self.min_width
            )));
        }
        Ok(())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Output
// ────────────────────────────────────────────────────────────────────────────

/// Result of analysing one scanline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Detection {
    pub observation: BalloonObservation,
    /// The accepted `[begin, end)` span, if any.
    pub span: Option<Range<usize>>,
    /// The span is wider than `too_close_width`: the position has been
    /// re-centred and further captures should be suspended.
    pub too_close: bool,
}

// ────────────────────────────────────────────────────────────────────────────
// BalloonDetector
// ────────────────────────────────────────────────────────────────────────────

/// Stateless edge-pair detector over one scanline.
#[derive(Debug, Clone)]
pub struct BalloonDetector {
    config: DetectorConfig,
}

impl BalloonDetector {
    pub fn new(config: DetectorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    /// Position reported when nothing is found.
    pub fn center(&self) -> u16 {
        SCANLINE_CENTER
    }

    /// Analyse `line`.  Never panics: empty or short lines yield the
    /// sentinel.
    pub fn detect(&self, line: &[u8]) -> Detection {
        let w = self.config.lookahead;
        if w == 0 {
            return self.nothing();
        }
        let usable = line.len().min(SCANLINE_LEN);
        let limit = usable.saturating_sub(w);

        let mut from = 0;
        loop {
            let Some((begin, kind)) =
                (from..limit).find_map(|i| self.beginning(line, i).map(|k| (i, k)))
            else {
                return self.nothing();
            };
            let Some(end) = (begin + 1..limit).find(|&j| self.is_ending(line, j, kind)) else {
                return self.nothing();
            };

            if end - begin < self.config.min_width {
                trace!(begin, end, "span below minimum width, skipping");
                from = end;
                continue;
            }
            return self.found(begin..end, kind);
        }
    }

    fn beginning(&self, line: &[u8], i: usize) -> Option<BalloonKind> {
        let here = line[i];
        let ahead = line[i + self.config.lookahead];
        if here.abs_diff(ahead) <= self.config.threshold {
            return None;
        }
        if here > ahead {
            Some(BalloonKind::Flower)
        } else {
            Some(BalloonKind::Enemy)
        }
    }

    fn is_ending(&self, line: &[u8], j: usize, kind: BalloonKind) -> bool {
        let Some(back) = j.checked_sub(self.config.lookahead) else {
            return false;
        };
        let here = line[j];
        let behind = line[back];
        if here.abs_diff(behind) <= self.config.threshold {
            return false;
        }
        match kind {
            BalloonKind::Flower => behind < here,
            BalloonKind::Enemy => behind > here,
            BalloonKind::None => false,
        }
    }

    fn nothing(&self) -> Detection {
        Detection {
            observation: BalloonObservation::sentinel(),
            span: None,
            too_close: false,
        }
    }

    fn found(&self, span: Range<usize>, kind: BalloonKind) -> Detection {
        let width = span.end - span.start;
        let too_close = width > self.config.too_close_width;
        let position = if too_close {
            self.center()
        } else {
            ((span.start + span.end) / 2) as u16
        };
        Detection {
            observation: BalloonObservation { position, kind },
            span: Some(span),
            too_close,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BRIGHT: u8 = 200;
    const DARK: u8 = 40;

    fn detector() -> BalloonDetector {
        BalloonDetector::new(DetectorConfig::default())
    }

    fn line_with(background: u8, regions: &[(Range<usize>, u8)]) -> Vec<u8> {
        let mut line = vec![background; SCANLINE_LEN];
        for (range, level) in regions {
            line[range.clone()].fill(*level);
        }
        line
    }

    #[test]
    fn default_config_is_valid() {
        DetectorConfig::default().validate().unwrap();
    }

    #[test]
    fn config_rejects_floor_that_lets_artefacts_through() {
        let cfg = DetectorConfig {
            min_width: 60,
            ..DetectorConfig::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn centred_balloon_has_no_lateral_offset() {
        let line = line_with(BRIGHT, &[(275..395, DARK)]);
        let d = detector().detect(&line);
        assert_eq!(d.span, Some(245..395));
        assert_eq!(d.observation.position, SCANLINE_CENTER);
        assert_eq!(d.observation.lateral_offset(), 0);
        assert_eq!(detector().center(), BalloonObservation::sentinel().position);
    }

    #[test]
    fn uniform_line_has_no_target() {
        let d = detector().detect(&[BRIGHT; SCANLINE_LEN]);
        assert_eq!(d.observation, BalloonObservation::sentinel());
        assert_eq!(d.span, None);
        assert!(!d.too_close);
    }

    #[test]
    fn empty_and_short_lines_yield_sentinel() {
        let det = detector();
        assert_eq!(det.detect(&[]).observation, BalloonObservation::sentinel());
        assert_eq!(det.detect(&[0, 255, 0]).observation, BalloonObservation::sentinel());
        assert_eq!(det.detect(&[BRIGHT; 30]).observation, BalloonObservation::sentinel());
    }

    #[test]
    fn dark_region_is_a_flower_centred_on_its_span() {
        let line = line_with(BRIGHT, &[(200..320, DARK)]);
        let d = detector().detect(&line);
        // Beginning is found one lookahead before the dark region, the
        // ending where brightness has recovered.
        assert_eq!(d.span, Some(170..320));
        assert_eq!(d.observation.kind, BalloonKind::Flower);
        assert_eq!(d.observation.position, (170 + 320) / 2);
        assert!(!d.too_close);
    }

    #[test]
    fn bright_region_is_an_enemy() {
        let line = line_with(DARK, &[(300..420, BRIGHT)]);
        let d = detector().detect(&line);
        assert_eq!(d.span, Some(270..420));
        assert_eq!(d.observation.kind, BalloonKind::Enemy);
        assert_eq!(d.observation.position, 345);
    }

    #[test]
    fn single_pixel_artefact_is_rejected() {
        let line = line_with(BRIGHT, &[(150..151, DARK)]);
        assert_eq!(detector().detect(&line).observation, BalloonObservation::sentinel());
    }

    #[test]
    fn narrow_span_is_skipped_and_search_continues() {
        // A 20-pixel dip (reported as a 60-wide span) followed by a real
        // balloon further right.
        let line = line_with(BRIGHT, &[(100..120, DARK), (300..400, DARK)]);
        let d = detector().detect(&line);
        assert_eq!(d.span, Some(270..400));
        assert_eq!(d.observation.kind, BalloonKind::Flower);
        assert_eq!(d.observation.position, 335);
    }

    #[test]
    fn narrow_span_never_reported_even_when_alone() {
        let line = line_with(DARK, &[(400..440, BRIGHT)]);
        // 40 px wide → reported span 370..440 (70) < min_width.
        assert_eq!(detector().detect(&line).observation, BalloonObservation::sentinel());
    }

    #[test]
    fn unterminated_region_is_not_a_target() {
        // Dark until the very end: no ending edge before the scan limit.
        let line = line_with(BRIGHT, &[(500..SCANLINE_LEN, DARK)]);
        assert_eq!(detector().detect(&line).observation, BalloonObservation::sentinel());
    }

    #[test]
    fn small_brightness_changes_are_below_threshold() {
        let line = line_with(BRIGHT, &[(200..320, BRIGHT - 20)]);
        assert_eq!(detector().detect(&line).observation, BalloonObservation::sentinel());
    }

    #[test]
    fn region_at_line_start_is_detected() {
        // Beginning edge at index 0.
        let line = line_with(BRIGHT, &[(30..150, DARK)]);
        let d = detector().detect(&line);
        assert_eq!(d.span, Some(0..150));
        assert_eq!(d.observation.kind, BalloonKind::Flower);
    }

    #[test]
    fn very_wide_span_is_too_close_and_recentred() {
        let line = line_with(BRIGHT, &[(60..520, DARK)]);
        let d = detector().detect(&line);
        assert_eq!(d.span, Some(30..520));
        assert!(d.too_close);
        assert_eq!(d.observation.position, detector().center());
        assert_eq!(d.observation.kind, BalloonKind::Flower);
    }

    #[test]
    fn longer_lines_are_truncated_to_configured_length() {
        let mut line = vec![BRIGHT; SCANLINE_LEN + 200];
        line[700..800].fill(DARK);
        assert_eq!(detector().detect(&line).observation, BalloonObservation::sentinel());
    }
}
