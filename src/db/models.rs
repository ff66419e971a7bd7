use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::bazi::{BaziChart, BirthInput};
use crate::fortune::Fortune;

/// The most recent completed reading, kept so a visitor can see it again
/// without repeating the ritual.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LastReading {
    pub id: String,
    pub birth: BirthInput,
    pub chart: BaziChart,
    pub fortune: Fortune,
    pub saved_at: DateTime<Utc>,
}

impl LastReading {
    pub fn new(birth: BirthInput, chart: BaziChart, fortune: Fortune) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            birth,
            chart,
            fortune,
            saved_at: Utc::now(),
        }
    }
}
