use std::time::Duration;

use tokio::time::Instant;

use super::state::{BowEvent, DetectorSnapshot, DetectorState};

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = true;

use crate::log_info;

/// Nose drop (fraction of frame height) that counts as a bow.
pub const BOW_DROP: f32 = 0.09;
/// Drop below which the head is considered back at neutral.
pub const RETURN_DROP: f32 = 0.04;
/// Minimum time between two counted bows.
pub const DEBOUNCE: Duration = Duration::from_millis(500);
/// Frames collected before the baseline is fixed (~0.7 s at 30 fps).
pub const CALIBRATION_SAMPLES: usize = 20;

/// Bow recognition for one session: calibration, hysteresis and debounce.
///
/// Timing is driven entirely by the `now` passed in, so the detector behaves
/// the same at any frame cadence.
#[derive(Debug)]
pub struct BowDetector {
    state: DetectorState,
    calibration: Vec<f32>,
    baseline: Option<f32>,
    bow_count: u32,
    last_bow_at: Option<Instant>,
}

impl Default for BowDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl BowDetector {
    pub fn new() -> Self {
        Self {
            state: DetectorState::Calibrating,
            calibration: Vec::with_capacity(CALIBRATION_SAMPLES),
            baseline: None,
            bow_count: 0,
            last_bow_at: None,
        }
    }

    pub fn state(&self) -> DetectorState {
        self.state
    }

    pub fn bow_count(&self) -> u32 {
        self.bow_count
    }

    pub fn baseline(&self) -> Option<f32> {
        self.baseline
    }

    pub fn snapshot(&self) -> DetectorSnapshot {
        DetectorSnapshot {
            state: self.state,
            baseline: self.baseline,
            bow_count: self.bow_count,
            calibration_samples: self.calibration.len(),
        }
    }

    /// Feed one nose-Y reading (0.0 = top of frame, 1.0 = bottom).
    pub fn process_sample(&mut self, nose_y: f32, now: Instant) -> Vec<BowEvent> {
        if !nose_y.is_finite() {
            return Vec::new();
        }

        let baseline = match (self.state, self.baseline) {
            (DetectorState::Calibrating, _) | (_, None) => return self.calibrate(nose_y),
            (_, Some(baseline)) => baseline,
        };

        // positive = head moved down
        let drop = nose_y - baseline;

        match self.state {
            DetectorState::Upright => {
                if drop > BOW_DROP && self.debounce_elapsed(now) {
                    let count = self.register_bow(now);
                    vec![
                        BowEvent::Bowed { count },
                        self.transition(DetectorState::Bowing),
                    ]
                } else {
                    Vec::new()
                }
            }
            DetectorState::Bowing if drop < BOW_DROP => {
                vec![self.transition(DetectorState::Returning)]
            }
            DetectorState::Returning if drop < RETURN_DROP => {
                vec![self.transition(DetectorState::Upright)]
            }
            _ => Vec::new(),
        }
    }

    /// Count a bow without looking at the camera. Subject to the same
    /// debounce as detected bows; returns the new count if accepted.
    pub fn manual_bow(&mut self, now: Instant) -> Option<u32> {
        if !self.debounce_elapsed(now) {
            return None;
        }
        Some(self.register_bow(now))
    }

    fn calibrate(&mut self, nose_y: f32) -> Vec<BowEvent> {
        self.calibration.push(nose_y);
        if self.calibration.len() < CALIBRATION_SAMPLES {
            return Vec::new();
        }

        // Median rather than mean so a single glitched frame can't skew it.
        let mut samples = std::mem::take(&mut self.calibration);
        samples.sort_by(|a, b| a.total_cmp(b));
        let baseline = samples[samples.len() / 2];
        self.baseline = Some(baseline);

        log_info!("calibrated neutral nose_y = {:.4}", baseline);

        vec![
            BowEvent::Calibrated,
            self.transition(DetectorState::Upright),
        ]
    }

    fn debounce_elapsed(&self, now: Instant) -> bool {
        self.last_bow_at
            .map(|last| now.saturating_duration_since(last) >= DEBOUNCE)
            .unwrap_or(true)
    }

    fn register_bow(&mut self, now: Instant) -> u32 {
        self.last_bow_at = Some(now);
        self.bow_count += 1;
        log_info!("bow {} registered", self.bow_count);
        self.bow_count
    }

    fn transition(&mut self, next: DetectorState) -> BowEvent {
        self.state = next;
        BowEvent::StateChanged { state: next }
    }
}
