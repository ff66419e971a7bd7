use anyhow::{Context, Result};
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use super::tables::{Animal, Branch, Element, Polarity, Stem, BRANCHES, BRANCH_COUNT, STEMS, STEM_COUNT};

/// A Stem/Branch pair with its display attributes.
///
/// Indices are normalized on construction, so a `Pillar` can never point
/// outside the stem or branch tables. Deserialization only trusts the two
/// indices and rebuilds everything else from the tables.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", from = "PillarIndices")]
pub struct Pillar {
    stem_index: usize,
    branch_index: usize,
    stem: char,
    branch: char,
    element: Element,
    polarity: Polarity,
    animal: Animal,
    branch_element: Element,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PillarIndices {
    stem_index: i64,
    branch_index: i64,
}

impl From<PillarIndices> for Pillar {
    fn from(raw: PillarIndices) -> Self {
        Pillar::new(raw.stem_index, raw.branch_index)
    }
}

impl Pillar {
    /// Build a pillar from raw cycle offsets, which may be negative.
    pub fn new(stem_offset: i64, branch_offset: i64) -> Self {
        let stem_index = stem_offset.rem_euclid(STEM_COUNT as i64) as usize;
        let branch_index = branch_offset.rem_euclid(BRANCH_COUNT as i64) as usize;
        let stem = &STEMS[stem_index];
        let branch = &BRANCHES[branch_index];

        Self {
            stem_index,
            branch_index,
            stem: stem.glyph,
            branch: branch.glyph,
            element: stem.element,
            polarity: stem.polarity,
            animal: branch.animal,
            branch_element: branch.element,
        }
    }

    pub fn stem_index(&self) -> usize {
        self.stem_index
    }

    pub fn branch_index(&self) -> usize {
        self.branch_index
    }

    pub fn stem(&self) -> &'static Stem {
        &STEMS[self.stem_index]
    }

    pub fn branch(&self) -> &'static Branch {
        &BRANCHES[self.branch_index]
    }

    pub fn element(&self) -> Element {
        self.element
    }

    pub fn polarity(&self) -> Polarity {
        self.polarity
    }

    pub fn animal(&self) -> Animal {
        self.animal
    }

    pub fn branch_element(&self) -> Element {
        self.branch_element
    }

    /// Two-glyph name, e.g. `丙午`.
    pub fn glyphs(&self) -> String {
        format!("{}{}", self.stem, self.branch)
    }

    /// `丙午 (Fire Horse)`
    pub fn label(&self) -> String {
        format!("{} ({} {})", self.glyphs(), self.element, self.animal)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PillarSlot {
    Year,
    Month,
    Day,
    Hour,
}

impl PillarSlot {
    pub fn as_str(&self) -> &'static str {
        match self {
            PillarSlot::Year => "Year",
            PillarSlot::Month => "Month",
            PillarSlot::Day => "Day",
            PillarSlot::Hour => "Hour",
        }
    }
}

/// Four Pillars. The hour pillar is `None` when the birth time is unknown,
/// which is not the same thing as the Rat hour.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct BaziChart {
    pub year: Pillar,
    pub month: Pillar,
    pub day: Pillar,
    pub hour: Option<Pillar>,
}

impl BaziChart {
    pub fn slots(&self) -> [(PillarSlot, Option<&Pillar>); 4] {
        [
            (PillarSlot::Year, Some(&self.year)),
            (PillarSlot::Month, Some(&self.month)),
            (PillarSlot::Day, Some(&self.day)),
            (PillarSlot::Hour, self.hour.as_ref()),
        ]
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BirthInput {
    pub date: NaiveDate,
    pub time: Option<NaiveTime>,
}

impl BirthInput {
    pub fn new(date: NaiveDate, time: Option<NaiveTime>) -> Self {
        Self { date, time }
    }

    /// Parse `YYYY-MM-DD` and an optional `HH:MM`. A missing or blank time
    /// means "unknown", never an error.
    pub fn parse(date: &str, time: Option<&str>) -> Result<Self> {
        let date = NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d")
            .with_context(|| format!("invalid birth date '{date}', expected YYYY-MM-DD"))?;

        let time = match time.map(str::trim).filter(|raw| !raw.is_empty()) {
            Some(raw) => Some(
                NaiveTime::parse_from_str(raw, "%H:%M")
                    .with_context(|| format!("invalid birth time '{raw}', expected HH:MM"))?,
            ),
            None => None,
        };

        Ok(Self { date, time })
    }

    pub fn date_label(&self) -> String {
        self.date.format("%Y-%m-%d").to_string()
    }

    pub fn time_label(&self) -> Option<String> {
        self.time.map(|time| time.format("%H:%M").to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pillar_normalizes_negative_offsets() {
        let pillar = Pillar::new(-1, -1);
        assert_eq!(pillar.stem_index(), 9);
        assert_eq!(pillar.branch_index(), 11);
        assert_eq!(pillar.glyphs(), "癸亥");
        assert_eq!(pillar.element(), Element::Water);
        assert_eq!(pillar.polarity(), Polarity::Yin);
        assert_eq!(pillar.animal(), Animal::Pig);
    }

    #[test]
    fn pillar_serializes_display_attributes() {
        let value = serde_json::to_value(Pillar::new(2, 6)).unwrap();
        assert_eq!(value["stemIndex"], 2);
        assert_eq!(value["branchIndex"], 6);
        assert_eq!(value["stem"], "丙");
        assert_eq!(value["branch"], "午");
        assert_eq!(value["element"], "Fire");
        assert_eq!(value["polarity"], "Yang");
        assert_eq!(value["animal"], "Horse");
        assert_eq!(value["branchElement"], "Fire");
    }

    #[test]
    fn pillar_deserialization_rebuilds_from_indices() {
        let pillar: Pillar = serde_json::from_str(
            r#"{"stemIndex": 12, "branchIndex": 14, "stem": "x", "animal": "Dog"}"#,
        )
        .unwrap();
        assert_eq!(pillar, Pillar::new(2, 2));
        assert_eq!(pillar.animal(), Animal::Tiger);
    }

    #[test]
    fn label_combines_glyphs_element_and_animal() {
        assert_eq!(Pillar::new(2, 6).label(), "丙午 (Fire Horse)");
    }

    #[test]
    fn parse_accepts_missing_or_blank_time() {
        let input = BirthInput::parse("1990-05-17", None).unwrap();
        assert_eq!(input.date, NaiveDate::from_ymd_opt(1990, 5, 17).unwrap());
        assert!(input.time.is_none());

        let blank = BirthInput::parse(" 1990-05-17 ", Some("  ")).unwrap();
        assert!(blank.time.is_none());
    }

    #[test]
    fn parse_reads_twenty_four_hour_time() {
        let input = BirthInput::parse("1990-05-17", Some("23:45")).unwrap();
        assert_eq!(input.time, NaiveTime::from_hms_opt(23, 45, 0));
        assert_eq!(input.time_label().as_deref(), Some("23:45"));
    }

    #[test]
    fn parse_rejects_malformed_input() {
        assert!(BirthInput::parse("17/05/1990", None).is_err());
        assert!(BirthInput::parse("1990-02-30", None).is_err());
        assert!(BirthInput::parse("1990-05-17", Some("25:00")).is_err());
        assert!(BirthInput::parse("1990-05-17", Some("8pm")).is_err());
    }
}
