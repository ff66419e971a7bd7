//! Synthetic camera and estimator for running the ritual without hardware.
//!
//! The estimator replays a scripted head track: a short still period for
//! calibration, then a smooth dip every `bow_period`, with tracking noise and
//! the occasional lost frame.

use std::f32::consts::PI;
use std::time::Duration;

use anyhow::{bail, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::time::{interval, Instant, Interval, MissedTickBehavior};

use super::source::{
    CaptureProvider, EstimatorLoader, Landmark, LandmarkEstimator, PoseLandmarks, VideoCapture,
};

const FRAME_INTERVAL: Duration = Duration::from_millis(33);
const NEUTRAL_NOSE_Y: f32 = 0.42;
const BOW_DEPTH: f32 = 0.13;
const BOW_DURATION_SECS: f32 = 0.9;
const STILL_LEAD_SECS: f32 = 1.5;
const NOISE: f32 = 0.004;
const LOST_FRAME_RATE: f64 = 0.02;

pub struct SimulatedFrame {
    pub index: u64,
    pub captured_at: Instant,
}

#[derive(Debug, Clone)]
pub struct SimulatedCamera {
    available: bool,
}

impl SimulatedCamera {
    pub fn new() -> Self {
        Self { available: true }
    }

    /// A camera whose acquisition always fails, as when permission is denied.
    pub fn unavailable() -> Self {
        Self { available: false }
    }
}

impl Default for SimulatedCamera {
    fn default() -> Self {
        Self::new()
    }
}

pub struct SimulatedCapture {
    ticker: Interval,
    index: u64,
    released: bool,
}

impl VideoCapture for SimulatedCapture {
    type Frame = SimulatedFrame;

    async fn next_frame(&mut self) -> Option<SimulatedFrame> {
        if self.released {
            return None;
        }
        let captured_at = self.ticker.tick().await;
        self.index += 1;
        Some(SimulatedFrame {
            index: self.index,
            captured_at,
        })
    }

    fn release(&mut self) {
        self.released = true;
    }
}

impl CaptureProvider for SimulatedCamera {
    type Capture = SimulatedCapture;

    async fn acquire(&self) -> Result<SimulatedCapture> {
        if !self.available {
            bail!("no capture device found");
        }
        let mut ticker = interval(FRAME_INTERVAL);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        Ok(SimulatedCapture {
            ticker,
            index: 0,
            released: false,
        })
    }
}

#[derive(Debug, Clone)]
pub struct SimulatedPoseModel {
    bow_period: Duration,
    seed: u64,
}

impl SimulatedPoseModel {
    pub fn new(bow_period: Duration, seed: u64) -> Self {
        Self { bow_period, seed }
    }
}

pub struct SimulatedEstimator {
    rng: StdRng,
    bow_period_secs: f32,
    started_at: Option<Instant>,
}

impl SimulatedEstimator {
    fn nose_y(&mut self, elapsed_secs: f32) -> f32 {
        let mut y = NEUTRAL_NOSE_Y + self.rng.gen_range(-NOISE..NOISE);
        if elapsed_secs > STILL_LEAD_SECS {
            let phase = (elapsed_secs - STILL_LEAD_SECS) % self.bow_period_secs;
            if phase < BOW_DURATION_SECS {
                y += BOW_DEPTH * (PI * phase / BOW_DURATION_SECS).sin();
            }
        }
        y.clamp(0.0, 1.0)
    }
}

impl LandmarkEstimator<SimulatedFrame> for SimulatedEstimator {
    fn estimate(
        &mut self,
        frame: &SimulatedFrame,
        _timestamp: Instant,
    ) -> Result<Option<PoseLandmarks>> {
        if self.rng.gen_bool(LOST_FRAME_RATE) {
            return Ok(None);
        }
        let started_at = *self.started_at.get_or_insert(frame.captured_at);
        let elapsed = frame.captured_at.saturating_duration_since(started_at);
        let y = self.nose_y(elapsed.as_secs_f32());
        Ok(Some(PoseLandmarks::new(vec![Landmark::at(0.5, y)])))
    }
}

impl EstimatorLoader<SimulatedFrame> for SimulatedPoseModel {
    type Estimator = SimulatedEstimator;

    async fn load(&self) -> Result<SimulatedEstimator> {
        if self.bow_period.as_secs_f32() <= BOW_DURATION_SECS {
            bail!(
                "bow period {:?} is shorter than a single bow",
                self.bow_period
            );
        }
        Ok(SimulatedEstimator {
            rng: StdRng::seed_from_u64(self.seed),
            bow_period_secs: self.bow_period.as_secs_f32(),
            started_at: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bow::{BowController, BowEvent};

    #[tokio::test(start_paused = true)]
    async fn simulated_session_produces_bows() {
        let model = SimulatedPoseModel::new(Duration::from_millis(1800), 7);
        let mut controller = BowController::new(SimulatedCamera::new(), model);
        let mut rx = controller.subscribe();

        assert!(controller.start().await);
        tokio::time::sleep(Duration::from_secs(7)).await;
        controller.stop().await.unwrap();

        let mut bows = Vec::new();
        let mut calibrated = false;
        while let Ok(event) = rx.try_recv() {
            match event {
                BowEvent::Bowed { count } => bows.push(count),
                BowEvent::Calibrated => calibrated = true,
                BowEvent::StateChanged { .. } => {}
            }
        }
        assert!(calibrated);
        assert!(bows.len() >= 3, "bows {bows:?}");
        assert_eq!(bows[..3], [1, 2, 3]);
    }

    #[tokio::test(start_paused = true)]
    async fn unavailable_camera_fails_to_start() {
        let model = SimulatedPoseModel::new(Duration::from_secs(2), 1);
        let mut controller = BowController::new(SimulatedCamera::unavailable(), model);
        assert!(!controller.start().await);
    }

    #[tokio::test]
    async fn too_short_bow_period_fails_to_load() {
        let model = SimulatedPoseModel::new(Duration::from_millis(500), 1);
        assert!(model.load().await.is_err());
    }
}
