//! Hero snapshots and the combatants built from them

use serde::{Deserialize, Serialize};

use crate::element::Element;
use crate::error::{DuelError, Result};

/// Hero state as supplied by a caller for one duel
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeroSnapshot {
    /// Persistent hero id; synthetic or anonymous opponents have none
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    #[serde(default = "default_level")]
    pub level: u32,
    pub hp: i32,
    pub max_hp: i32,
    #[serde(default)]
    pub armor: i32,
    pub power: i32,
    pub agility: i32,
    #[serde(default)]
    pub vitality: i32,
    /// Unset affinities are physical for heroes, rolled for opponents
    #[serde(default)]
    pub element: Option<Element>,
}

fn default_level() -> u32 {
    1
}

impl HeroSnapshot {
    /// Reject malformed snapshots before any RNG draw
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(DuelError::Validation("name must not be empty".into()));
        }
        if self.level == 0 {
            return Err(DuelError::Validation(format!(
                "{}: level must be at least 1",
                self.name
            )));
        }
        if self.max_hp <= 0 {
            return Err(DuelError::Validation(format!(
                "{}: max hp must be positive, got {}",
                self.name, self.max_hp
            )));
        }
        if self.hp <= 0 || self.hp > self.max_hp {
            return Err(DuelError::Validation(format!(
                "{}: hp {} outside 1..={}",
                self.name, self.hp, self.max_hp
            )));
        }
        for (label, value) in [
            ("armor", self.armor),
            ("power", self.power),
            ("agility", self.agility),
            ("vitality", self.vitality),
        ] {
            if value < 0 {
                return Err(DuelError::Validation(format!(
                    "{}: {} must not be negative, got {}",
                    self.name, label, value
                )));
            }
        }
        Ok(())
    }

    /// Build the combatant, using `element` where the snapshot has none
    pub(crate) fn to_combatant(&self, element: Element) -> Combatant {
        Combatant {
            name: self.name.clone(),
            hp: self.hp,
            max_hp: self.max_hp,
            armor: self.armor,
            power: self.power,
            agility: self.agility,
            vitality: self.vitality,
            element: self.element.unwrap_or(element),
        }
    }
}

/// One side of a duel, valid for a single resolution
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Combatant {
    pub name: String,
    pub hp: i32,
    pub max_hp: i32,
    pub armor: i32,
    pub power: i32,
    pub agility: i32,
    pub vitality: i32,
    pub element: Element,
}

impl Combatant {
    pub fn is_down(&self) -> bool {
        self.hp <= 0
    }

    /// Apply damage, clamped at zero hp. Returns hp actually lost.
    pub(crate) fn take_damage(&mut self, amount: i32) -> i32 {
        let lost = amount.min(self.hp).max(0);
        self.hp -= lost;
        lost
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot() -> HeroSnapshot {
        HeroSnapshot {
            id: Some("hero-1".into()),
            name: "Aria".into(),
            level: 3,
            hp: 40,
            max_hp: 40,
            armor: 4,
            power: 8,
            agility: 6,
            vitality: 6,
            element: None,
        }
    }

    #[test]
    fn test_valid_snapshot() {
        assert!(snapshot().validate().is_ok());
    }

    #[test]
    fn test_rejects_non_positive_max_hp() {
        let mut s = snapshot();
        s.max_hp = 0;
        s.hp = 0;
        assert!(matches!(s.validate(), Err(DuelError::Validation(_))));
    }

    #[test]
    fn test_rejects_hp_above_max() {
        let mut s = snapshot();
        s.hp = 41;
        assert!(s.validate().is_err());
    }

    #[test]
    fn test_rejects_blank_name_and_negative_stats() {
        let mut s = snapshot();
        s.name = "   ".into();
        assert!(s.validate().is_err());

        let mut s = snapshot();
        s.agility = -1;
        assert!(s.validate().is_err());
    }

    #[test]
    fn test_element_fallback() {
        let c = snapshot().to_combatant(Element::Physical);
        assert_eq!(c.element, Element::Physical);

        let mut s = snapshot();
        s.element = Some(Element::Fire);
        assert_eq!(s.to_combatant(Element::Physical).element, Element::Fire);
    }

    #[test]
    fn test_damage_clamps_at_zero() {
        let mut c = snapshot().to_combatant(Element::Physical);
        assert_eq!(c.take_damage(15), 15);
        assert_eq!(c.take_damage(100), 25);
        assert_eq!(c.hp, 0);
        assert!(c.is_down());
    }

    #[test]
    fn test_snapshot_defaults_from_json() {
        let s: HeroSnapshot = serde_json::from_str(
            r#"{"name":"Brann","hp":20,"max_hp":20,"power":5,"agility":4}"#,
        )
        .unwrap();
        assert_eq!(s.level, 1);
        assert_eq!(s.armor, 0);
        assert_eq!(s.id, None);
        assert_eq!(s.element, None);
    }
}
