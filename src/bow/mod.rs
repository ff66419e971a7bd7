//! Bow detection: a calibrated nose-height state machine driven by a camera
//! and pose estimator supplied by the host.

pub mod controller;
pub mod detector;
pub mod loop_worker;
pub mod simulated;
pub mod source;
pub mod state;

pub use controller::BowController;
pub use detector::{BowDetector, BOW_DROP, CALIBRATION_SAMPLES, DEBOUNCE, RETURN_DROP};
pub use simulated::{SimulatedCamera, SimulatedPoseModel};
pub use source::{
    CaptureProvider, EstimatorLoader, FrameOf, Landmark, LandmarkEstimator, PoseLandmarks,
    VideoCapture,
};
pub use state::{BowEvent, DetectorSnapshot, DetectorState};
