use chrono::NaiveDate;
use serde::Serialize;

use crate::bazi::{year_pillar, BaziChart, BirthInput, Pillar};

const RESPONSE_SHAPE: &str = r#"{
  "zodiac_animal": "...",
  "zodiac_element": "...",
  "personality": "2-3 sentences",
  "five_elements": {
    "dominant": "element name",
    "reading": "1-2 sentences about their elemental balance and what it means in {YEAR}"
  },
  "wealth": "2-3 sentences",
  "relationships": "2-3 sentences",
  "compatibility": {
    "reading": "2-3 sentences about who they harmonize with and clash with in {YEAR} and why",
    "harmonious": ["Animal1", "Animal2"],
    "challenging": ["Animal1", "Animal2"]
  },
  "overall": "One powerful summary sentence: their fortune motto for {YEAR}",
  "lucky_numbers": [3, 7],
  "lucky_colors": ["Crimson", "Gold"],
  "lucky_directions": ["South", "Southeast"]
}"#;

/// Everything the host forwards to the fortune proxy once the bows are done.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FortuneRequest {
    pub birth: BirthInput,
    pub chart: BaziChart,
    pub prompt: String,
}

impl FortuneRequest {
    pub fn new(birth: BirthInput, chart: BaziChart, reading_year: i32) -> Self {
        let prompt = build_prompt(&birth, &chart, reading_year);
        Self {
            birth,
            chart,
            prompt,
        }
    }

    /// JSON body for `POST /fortune`.
    pub fn body(&self) -> serde_json::Value {
        serde_json::json!({ "prompt": self.prompt })
    }
}

fn format_pillar(pillar: Option<&Pillar>) -> String {
    pillar
        .map(Pillar::label)
        .unwrap_or_else(|| "Not provided".to_string())
}

/// Pillar of the Chinese year starting in `year`, e.g. 2026 is 丙午.
pub fn reading_year_pillar(year: i32) -> Option<Pillar> {
    NaiveDate::from_ymd_opt(year, 2, 4).map(year_pillar)
}

pub fn build_prompt(birth: &BirthInput, chart: &BaziChart, reading_year: i32) -> String {
    let born = match birth.time_label() {
        Some(time) => format!(
            "{} at {} (time provided)",
            birth.date_label(),
            time
        ),
        None => format!("{} (time unknown)", birth.date_label()),
    };

    let year_line = match reading_year_pillar(reading_year) {
        Some(pillar) => format!(
            "Today is Chinese New Year {reading_year}, the Year of the {} {} ({}).",
            pillar.element(),
            pillar.animal(),
            pillar.glyphs()
        ),
        None => format!("The reading is for the year {reading_year}."),
    };

    let shape = RESPONSE_SHAPE.replace("{YEAR}", &reading_year.to_string());

    format!(
        "You are a master Ba Zi (八字) fortune teller in the tradition of Chinese metaphysics.

The user was born on {born}.

Their Four Pillars (Ba Zi chart) are:
- Year Pillar:  {year}
- Month Pillar: {month}
- Day Pillar:   {day}
- Hour Pillar:  {hour}

{year_line}

Provide a Ba Zi reading with the following sections. Use poetic, evocative language.
Mix in occasional Chinese characters for key terms. Be specific to their chart,
avoiding generic horoscope language.

Format your response as JSON with EXACTLY these keys (no markdown, no code fences, raw JSON only):
{shape}",
        year = format_pillar(Some(&chart.year)),
        month = format_pillar(Some(&chart.month)),
        day = format_pillar(Some(&chart.day)),
        hour = format_pillar(chart.hour.as_ref()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bazi::calculate_chart;

    #[test]
    fn prompt_lists_pillars_and_reading_year() {
        let birth = BirthInput::parse("1990-05-17", Some("13:00")).unwrap();
        let chart = calculate_chart(&birth);
        let prompt = build_prompt(&birth, &chart, 2026);

        assert!(prompt.contains("born on 1990-05-17 at 13:00 (time provided)"));
        assert!(prompt.contains("- Year Pillar:  庚午 (Metal Horse)"));
        assert!(prompt.contains("- Month Pillar: 辛巳 (Metal Snake)"));
        assert!(prompt.contains("- Day Pillar:   戊子 (Earth Rat)"));
        assert!(prompt.contains("- Hour Pillar:  己未 (Earth Goat)"));
        assert!(prompt.contains("Year of the Fire Horse (丙午)"));
        assert!(prompt.contains("\"lucky_directions\""));
        assert!(prompt.contains("fortune motto for 2026"));
        assert!(!prompt.contains("{YEAR}"));
    }

    #[test]
    fn unknown_time_is_spelled_out() {
        let birth = BirthInput::parse("1990-05-17", None).unwrap();
        let chart = calculate_chart(&birth);
        let prompt = build_prompt(&birth, &chart, 2025);

        assert!(prompt.contains("born on 1990-05-17 (time unknown)"));
        assert!(prompt.contains("- Hour Pillar:  Not provided"));
        assert!(prompt.contains("Year of the Wood Snake (乙巳)"));
    }

    #[test]
    fn request_body_wraps_prompt() {
        let birth = BirthInput::parse("2001-09-09", None).unwrap();
        let request = FortuneRequest::new(birth, calculate_chart(&birth), 2026);
        assert_eq!(request.body()["prompt"], request.prompt.as_str());
    }
}
