use serde::{Deserialize, Serialize};

use super::error::FortuneError;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct FiveElements {
    #[serde(default)]
    pub dominant: String,
    #[serde(default)]
    pub reading: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Compatibility {
    #[serde(default)]
    pub reading: String,
    #[serde(default)]
    pub harmonious: Vec<String>,
    #[serde(default)]
    pub challenging: Vec<String>,
}

/// The reading returned by the language model. Keys are snake_case on the
/// wire, matching the shape requested in the prompt.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Fortune {
    pub zodiac_animal: String,
    pub zodiac_element: String,
    pub personality: String,
    #[serde(default)]
    pub five_elements: FiveElements,
    pub wealth: String,
    pub relationships: String,
    #[serde(default)]
    pub compatibility: Compatibility,
    pub overall: String,
    #[serde(default)]
    pub lucky_numbers: Vec<u32>,
    #[serde(default)]
    pub lucky_colors: Vec<String>,
    #[serde(default)]
    pub lucky_directions: Vec<String>,
}

/// Models sometimes wrap the JSON in markdown fences despite being asked not to.
fn strip_code_fences(text: &str) -> String {
    let mut cleaned = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(pos) = rest.find("```") {
        cleaned.push_str(&rest[..pos]);
        rest = &rest[pos + 3..];
        if rest
            .get(..4)
            .is_some_and(|tag| tag.eq_ignore_ascii_case("json"))
        {
            rest = &rest[4..];
        }
        rest = rest.trim_start();
    }
    cleaned.push_str(rest);
    cleaned.trim().to_string()
}

pub fn parse_fortune(text: &str) -> Result<Fortune, FortuneError> {
    let cleaned = strip_code_fences(text);
    serde_json::from_str(&cleaned).map_err(|source| FortuneError::Unparseable {
        source,
        raw: cleaned,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "zodiac_animal": "Horse",
        "zodiac_element": "Metal",
        "personality": "Restless and bright.",
        "five_elements": {"dominant": "Fire", "reading": "Fire feeds your Earth day master."},
        "wealth": "Steady.",
        "relationships": "Warm.",
        "compatibility": {"reading": "Tigers and Dogs.", "harmonious": ["Tiger", "Dog"], "challenging": ["Rat"]},
        "overall": "Gallop, but look where you land.",
        "lucky_numbers": [3, 7],
        "lucky_colors": ["Crimson", "Gold"],
        "lucky_directions": ["South"]
    }"#;

    #[test]
    fn parses_plain_json() {
        let fortune = parse_fortune(SAMPLE).unwrap();
        assert_eq!(fortune.zodiac_animal, "Horse");
        assert_eq!(fortune.five_elements.dominant, "Fire");
        assert_eq!(fortune.compatibility.harmonious, vec!["Tiger", "Dog"]);
        assert_eq!(fortune.lucky_numbers, vec![3, 7]);
    }

    #[test]
    fn strips_markdown_fences() {
        let fenced = format!("```json\n{SAMPLE}\n```\n");
        assert_eq!(parse_fortune(&fenced).unwrap(), parse_fortune(SAMPLE).unwrap());

        let upper = format!("```JSON {SAMPLE}```");
        assert!(parse_fortune(&upper).is_ok());
    }

    #[test]
    fn missing_lists_default_to_empty() {
        let minimal = r#"{"zodiac_animal": "Rat", "zodiac_element": "Water",
            "personality": "p", "wealth": "w", "relationships": "r", "overall": "o"}"#;
        let fortune = parse_fortune(minimal).unwrap();
        assert!(fortune.lucky_colors.is_empty());
        assert!(fortune.compatibility.challenging.is_empty());
    }

    #[test]
    fn prose_is_unparseable() {
        let err = parse_fortune("The stars are silent today.").unwrap_err();
        assert!(matches!(err, FortuneError::Unparseable { .. }));
        assert_eq!(err.to_string(), "The oracle spoke in riddles. Please try again.");
    }
}
