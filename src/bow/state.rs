use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum DetectorState {
    Calibrating,
    Upright,
    Bowing,
    Returning,
}

impl Default for DetectorState {
    fn default() -> Self {
        DetectorState::Calibrating
    }
}

impl DetectorState {
    pub fn as_str(&self) -> &'static str {
        match self {
            DetectorState::Calibrating => "calibrating",
            DetectorState::Upright => "upright",
            DetectorState::Bowing => "bowing",
            DetectorState::Returning => "returning",
        }
    }
}

/// Notifications published by a bow session.
#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum BowEvent {
    /// A bow completed; `count` is the session total including this one.
    Bowed { count: u32 },
    StateChanged { state: DetectorState },
    /// Neutral baseline established. Sent once per session.
    Calibrated,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DetectorSnapshot {
    pub state: DetectorState,
    pub baseline: Option<f32>,
    pub bow_count: u32,
    pub calibration_samples: usize,
}
