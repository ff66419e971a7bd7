//! Four Pillars (八字) calendar engine.
//!
//! Pure and synchronous. Every index leaving this module has been reduced
//! modulo its cycle length into the non-negative range.

pub mod chart;
pub mod pillars;
pub mod tables;

use anyhow::Result;

pub use chart::{BaziChart, BirthInput, Pillar, PillarSlot};
pub use pillars::{day_pillar, hour_pillar, julian_day_number, month_pillar, year_pillar};
pub use tables::{Animal, Element, Polarity};

pub fn calculate_chart(input: &BirthInput) -> BaziChart {
    BaziChart {
        year: year_pillar(input.date),
        month: month_pillar(input.date),
        day: day_pillar(input.date),
        hour: hour_pillar(input.date, input.time),
    }
}

/// Parse a birth date (`YYYY-MM-DD`) and optional time (`HH:MM`), then chart it.
pub fn calculate_bazi(date: &str, time: Option<&str>) -> Result<BaziChart> {
    let input = BirthInput::parse(date, time)?;
    Ok(calculate_chart(&input))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_chart_with_time() {
        let chart = calculate_bazi("1990-05-17", Some("13:00")).unwrap();
        assert_eq!(chart.year.glyphs(), "庚午");
        assert_eq!(chart.month.glyphs(), "辛巳");
        assert_eq!(chart.day.glyphs(), "戊子");
        assert_eq!(chart.hour.map(|p| p.glyphs()).as_deref(), Some("己未"));
    }

    #[test]
    fn chart_without_time_has_no_hour() {
        let chart = calculate_bazi("2000-01-01", None).unwrap();
        assert!(chart.hour.is_none());
        // Before Li Chun, so still the 己卯 year
        assert_eq!(chart.year.glyphs(), "己卯");
        assert_eq!((chart.day.stem_index(), chart.day.branch_index()), (0, 0));

        let slots = chart.slots();
        assert_eq!(slots[3].0, PillarSlot::Hour);
        assert!(slots[3].1.is_none());
    }

    #[test]
    fn chart_round_trips_through_json() {
        let chart = calculate_bazi("1988-08-08", Some("08:08")).unwrap();
        let json = serde_json::to_string(&chart).unwrap();
        let back: BaziChart = serde_json::from_str(&json).unwrap();
        assert_eq!(back, chart);

        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert!(value["hour"].is_object());
        let untimed = serde_json::to_value(calculate_bazi("1988-08-08", None).unwrap()).unwrap();
        assert!(untimed["hour"].is_null());
    }

    #[test]
    fn malformed_date_is_rejected() {
        assert!(calculate_bazi("not-a-date", Some("12:00")).is_err());
    }
}
