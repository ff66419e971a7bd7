use std::fmt;

use serde::{Deserialize, Serialize};

pub const STEM_COUNT: usize = 10;
pub const BRANCH_COUNT: usize = 12;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Element {
    Wood,
    Fire,
    Earth,
    Metal,
    Water,
}

impl Element {
    pub fn as_str(&self) -> &'static str {
        match self {
            Element::Wood => "Wood",
            Element::Fire => "Fire",
            Element::Earth => "Earth",
            Element::Metal => "Metal",
            Element::Water => "Water",
        }
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Polarity {
    Yang,
    Yin,
}

impl Polarity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Polarity::Yang => "Yang",
            Polarity::Yin => "Yin",
        }
    }
}

impl fmt::Display for Polarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Animal {
    Rat,
    Ox,
    Tiger,
    Rabbit,
    Dragon,
    Snake,
    Horse,
    Goat,
    Monkey,
    Rooster,
    Dog,
    Pig,
}

impl Animal {
    pub fn as_str(&self) -> &'static str {
        match self {
            Animal::Rat => "Rat",
            Animal::Ox => "Ox",
            Animal::Tiger => "Tiger",
            Animal::Rabbit => "Rabbit",
            Animal::Dragon => "Dragon",
            Animal::Snake => "Snake",
            Animal::Horse => "Horse",
            Animal::Goat => "Goat",
            Animal::Monkey => "Monkey",
            Animal::Rooster => "Rooster",
            Animal::Dog => "Dog",
            Animal::Pig => "Pig",
        }
    }
}

impl fmt::Display for Animal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One Heavenly Stem (天干).
#[derive(Debug, PartialEq, Eq)]
pub struct Stem {
    pub glyph: char,
    pub element: Element,
    pub polarity: Polarity,
}

/// One Earthly Branch (地支).
#[derive(Debug, PartialEq, Eq)]
pub struct Branch {
    pub glyph: char,
    pub animal: Animal,
    pub element: Element,
}

const fn stem(glyph: char, element: Element, polarity: Polarity) -> Stem {
    Stem {
        glyph,
        element,
        polarity,
    }
}

const fn branch(glyph: char, animal: Animal, element: Element) -> Branch {
    Branch {
        glyph,
        animal,
        element,
    }
}

pub static STEMS: [Stem; STEM_COUNT] = [
    stem('甲', Element::Wood, Polarity::Yang),
    stem('乙', Element::Wood, Polarity::Yin),
    stem('丙', Element::Fire, Polarity::Yang),
    stem('丁', Element::Fire, Polarity::Yin),
    stem('戊', Element::Earth, Polarity::Yang),
    stem('己', Element::Earth, Polarity::Yin),
    stem('庚', Element::Metal, Polarity::Yang),
    stem('辛', Element::Metal, Polarity::Yin),
    stem('壬', Element::Water, Polarity::Yang),
    stem('癸', Element::Water, Polarity::Yin),
];

pub static BRANCHES: [Branch; BRANCH_COUNT] = [
    branch('子', Animal::Rat, Element::Water),
    branch('丑', Animal::Ox, Element::Earth),
    branch('寅', Animal::Tiger, Element::Wood),
    branch('卯', Animal::Rabbit, Element::Wood),
    branch('辰', Animal::Dragon, Element::Earth),
    branch('巳', Animal::Snake, Element::Fire),
    branch('午', Animal::Horse, Element::Fire),
    branch('未', Animal::Goat, Element::Earth),
    branch('申', Animal::Monkey, Element::Metal),
    branch('酉', Animal::Rooster, Element::Metal),
    branch('戌', Animal::Dog, Element::Earth),
    branch('亥', Animal::Pig, Element::Water),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stems_pair_elements_and_alternate_polarity() {
        for (idx, stem) in STEMS.iter().enumerate() {
            assert_eq!(stem.element, STEMS[idx - idx % 2].element);
            let expected = if idx % 2 == 0 {
                Polarity::Yang
            } else {
                Polarity::Yin
            };
            assert_eq!(stem.polarity, expected);
        }
    }

    #[test]
    fn branch_animals_follow_zodiac_order() {
        assert_eq!(BRANCHES[0].animal, Animal::Rat);
        assert_eq!(BRANCHES[2].animal, Animal::Tiger);
        assert_eq!(BRANCHES[6].animal, Animal::Horse);
        assert_eq!(BRANCHES[11].animal, Animal::Pig);
        assert_eq!(BRANCHES[11].element, Element::Water);
    }
}
