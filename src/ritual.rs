use serde::Serialize;

use crate::bazi::{BaziChart, BirthInput};
use crate::fortune::FortuneRequest;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum BowProgress {
    Pending { remaining: u32 },
    Complete,
}

/// One visitor's pass through the bows. Counts come from the detector (or
/// the manual fallback) and only ever move the ritual forward.
#[derive(Debug, Clone)]
pub struct Ritual {
    birth: BirthInput,
    chart: BaziChart,
    required_bows: u32,
    bows: u32,
}

impl Ritual {
    pub fn new(birth: BirthInput, chart: BaziChart, required_bows: u32) -> Self {
        Self {
            birth,
            chart,
            required_bows: required_bows.max(1),
            bows: 0,
        }
    }

    pub fn required_bows(&self) -> u32 {
        self.required_bows
    }

    pub fn bows(&self) -> u32 {
        self.bows
    }

    /// Record the detector's running bow count. Stale counts are ignored and
    /// counts past the requirement are clamped.
    pub fn record_bow(&mut self, count: u32) -> BowProgress {
        self.bows = self.bows.max(count.min(self.required_bows));
        self.progress()
    }

    pub fn progress(&self) -> BowProgress {
        if self.is_complete() {
            BowProgress::Complete
        } else {
            BowProgress::Pending {
                remaining: self.required_bows - self.bows,
            }
        }
    }

    pub fn is_complete(&self) -> bool {
        self.bows >= self.required_bows
    }

    pub fn birth(&self) -> &BirthInput {
        &self.birth
    }

    pub fn chart(&self) -> &BaziChart {
        &self.chart
    }

    pub fn fortune_request(&self, reading_year: i32) -> Option<FortuneRequest> {
        self.is_complete()
            .then(|| FortuneRequest::new(self.birth, self.chart, reading_year))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bazi::calculate_chart;

    fn ritual(required: u32) -> Ritual {
        let birth = BirthInput::parse("1990-05-17", None).unwrap();
        Ritual::new(birth, calculate_chart(&birth), required)
    }

    #[test]
    fn three_bows_complete_the_ritual() {
        let mut ritual = ritual(3);
        assert_eq!(ritual.progress(), BowProgress::Pending { remaining: 3 });
        assert!(ritual.fortune_request(2026).is_none());

        assert_eq!(ritual.record_bow(1), BowProgress::Pending { remaining: 2 });
        assert_eq!(ritual.record_bow(2), BowProgress::Pending { remaining: 1 });
        assert_eq!(ritual.record_bow(3), BowProgress::Complete);
        assert!(ritual.is_complete());

        let request = ritual.fortune_request(2026).unwrap();
        assert_eq!(request.chart, *ritual.chart());
        assert!(request.prompt.contains("(time unknown)"));
    }

    #[test]
    fn extra_and_stale_counts_are_ignored() {
        let mut ritual = ritual(3);
        ritual.record_bow(2);
        assert_eq!(ritual.record_bow(1), BowProgress::Pending { remaining: 1 });

        assert_eq!(ritual.record_bow(7), BowProgress::Complete);
        assert_eq!(ritual.bows(), 3);
    }

    #[test]
    fn zero_requirement_still_needs_one_bow() {
        let mut ritual = ritual(0);
        assert_eq!(ritual.required_bows(), 1);
        assert!(!ritual.is_complete());
        assert_eq!(ritual.record_bow(1), BowProgress::Complete);
    }
}
