//! Elemental affinities and the advantage cycle

use serde::{Deserialize, Serialize};
use std::fmt;

/// Multiplier when the attacker's element beats the defender's
pub const ADVANTAGE: f64 = 1.3;

/// Multiplier when the defender's element beats the attacker's
pub const DISADVANTAGE: f64 = 0.75;

/// Combined attack multiplier bounds (crit and element stacked)
pub const MIN_MULTIPLIER: f64 = 0.4;
pub const MAX_MULTIPLIER: f64 = 2.5;

/// Elemental affinity of a combatant
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Element {
    Fire,
    Ice,
    Thunder,
    Earth,
    Light,
    Dark,
    #[default]
    Physical,
}

/// Elements a synthesized opponent can roll (never physical).
/// Order is part of the seed contract.
pub const DRAWABLE_ELEMENTS: [Element; 6] = [
    Element::Fire,
    Element::Ice,
    Element::Thunder,
    Element::Earth,
    Element::Light,
    Element::Dark,
];

impl Element {
    /// The element this one beats, if any
    pub fn beats(self) -> Option<Element> {
        match self {
            Element::Fire => Some(Element::Ice),
            Element::Ice => Some(Element::Thunder),
            Element::Thunder => Some(Element::Earth),
            Element::Earth => Some(Element::Fire),
            Element::Light => Some(Element::Dark),
            Element::Dark => Some(Element::Light),
            Element::Physical => None,
        }
    }

    /// Damage factor for `self` attacking `defender`
    pub fn factor_against(self, defender: Element) -> f64 {
        if self.beats() == Some(defender) {
            ADVANTAGE
        } else if defender.beats() == Some(self) {
            DISADVANTAGE
        } else {
            1.0
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Element::Fire => "fire",
            Element::Ice => "ice",
            Element::Thunder => "thunder",
            Element::Earth => "earth",
            Element::Light => "light",
            Element::Dark => "dark",
            Element::Physical => "physical",
        }
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Element {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "fire" => Ok(Element::Fire),
            "ice" => Ok(Element::Ice),
            "thunder" => Ok(Element::Thunder),
            "earth" => Ok(Element::Earth),
            "light" => Ok(Element::Light),
            "dark" => Ok(Element::Dark),
            "physical" => Ok(Element::Physical),
            other => Err(format!("unknown element: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cycle() {
        assert_eq!(Element::Fire.factor_against(Element::Ice), ADVANTAGE);
        assert_eq!(Element::Ice.factor_against(Element::Thunder), ADVANTAGE);
        assert_eq!(Element::Thunder.factor_against(Element::Earth), ADVANTAGE);
        assert_eq!(Element::Earth.factor_against(Element::Fire), ADVANTAGE);
        assert_eq!(Element::Light.factor_against(Element::Dark), ADVANTAGE);
        assert_eq!(Element::Dark.factor_against(Element::Light), ADVANTAGE);
    }

    #[test]
    fn test_beaten_attacker_is_weakened() {
        assert_eq!(Element::Ice.factor_against(Element::Fire), DISADVANTAGE);
        assert_eq!(Element::Fire.factor_against(Element::Earth), DISADVANTAGE);
    }

    #[test]
    fn test_physical_is_neutral() {
        for e in DRAWABLE_ELEMENTS {
            assert_eq!(Element::Physical.factor_against(e), 1.0);
            assert_eq!(e.factor_against(Element::Physical), 1.0);
        }
        assert_eq!(Element::Fire.factor_against(Element::Light), 1.0);
    }

    #[test]
    fn test_serde_and_parse() {
        let json = serde_json::to_string(&Element::Thunder).unwrap();
        assert_eq!(json, "\"thunder\"");
        assert_eq!("Dark".parse::<Element>().unwrap(), Element::Dark);
        assert!("plasma".parse::<Element>().is_err());
    }
}
