//! Collaborators a bow session depends on but does not own: the capture
//! device and the pose-landmark estimator. Hosts inject implementations.

use std::future::Future;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tokio::time::Instant;

/// Index of the nose in a pose landmark set.
pub const NOSE: usize = 0;

/// One normalized landmark; `y` is 0.0 at the top of the frame and 1.0 at
/// the bottom.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub visibility: Option<f32>,
}

impl Landmark {
    pub fn at(x: f32, y: f32) -> Self {
        Self {
            x,
            y,
            z: 0.0,
            visibility: None,
        }
    }
}

/// Landmarks for the single tracked pose in a frame.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PoseLandmarks {
    pub points: Vec<Landmark>,
}

impl PoseLandmarks {
    pub fn new(points: Vec<Landmark>) -> Self {
        Self { points }
    }

    pub fn nose(&self) -> Option<&Landmark> {
        self.points.get(NOSE)
    }
}

/// A live capture stream.
pub trait VideoCapture: Send + 'static {
    type Frame: Send + 'static;

    /// Waits for the next frame. `None` means the stream has ended.
    fn next_frame(&mut self) -> impl Future<Output = Option<Self::Frame>> + Send;

    /// Stops the device. Called once when the session is done with it.
    fn release(&mut self);
}

/// Acquires a capture device; failure means the camera is unavailable.
pub trait CaptureProvider: Send + Sync + 'static {
    type Capture: VideoCapture;

    fn acquire(&self) -> impl Future<Output = Result<Self::Capture>> + Send;
}

/// Runs pose inference on a single frame. `Ok(None)` when nobody is in view.
pub trait LandmarkEstimator<F>: Send + 'static {
    fn estimate(&mut self, frame: &F, timestamp: Instant) -> Result<Option<PoseLandmarks>>;
}

/// Loads the estimator model; failure means inference is unavailable.
pub trait EstimatorLoader<F>: Send + Sync + 'static {
    type Estimator: LandmarkEstimator<F>;

    fn load(&self) -> impl Future<Output = Result<Self::Estimator>> + Send;
}

pub type FrameOf<P> = <<P as CaptureProvider>::Capture as VideoCapture>::Frame;
