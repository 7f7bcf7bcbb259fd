//! Combatant arguments shared by `resolve` and `simulate`

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;

use duel_core::{Element, HeroSnapshot};

#[derive(Args, Clone, Debug)]
pub struct HeroArgs {
    /// Hero snapshot JSON file; overrides the stat flags below
    #[arg(long, value_name = "FILE")]
    pub hero: Option<PathBuf>,

    #[arg(long, default_value = "Hero")]
    pub name: String,

    #[arg(long, default_value = "1")]
    pub level: u32,

    /// Max hit points; the hero starts at full health
    #[arg(long, default_value = "40")]
    pub hp: i32,

    #[arg(long, default_value = "4")]
    pub armor: i32,

    #[arg(long, default_value = "8")]
    pub power: i32,

    #[arg(long, default_value = "6")]
    pub agility: i32,

    #[arg(long, default_value = "6")]
    pub vitality: i32,

    #[arg(long)]
    pub element: Option<Element>,

    /// Opponent snapshot JSON file; a level-scaled foe is synthesized if absent
    #[arg(long, value_name = "FILE")]
    pub opponent: Option<PathBuf>,

    /// Force the opponent's element
    #[arg(long)]
    pub opponent_element: Option<Element>,
}

impl HeroArgs {
    /// Hero snapshot from the file or the flags, validated
    pub fn hero_snapshot(&self) -> Result<HeroSnapshot> {
        let hero = match &self.hero {
            Some(path) => load_snapshot(path)?,
            None => HeroSnapshot {
                id: None,
                name: self.name.clone(),
                level: self.level,
                hp: self.hp,
                max_hp: self.hp,
                armor: self.armor,
                power: self.power,
                agility: self.agility,
                vitality: self.vitality,
                element: self.element,
            },
        };
        hero.validate().context("Invalid hero")?;
        Ok(hero)
    }

    pub fn opponent_snapshot(&self) -> Result<Option<HeroSnapshot>> {
        let Some(path) = &self.opponent else {
            return Ok(None);
        };
        let opponent = load_snapshot(path)?;
        opponent.validate().context("Invalid opponent")?;
        Ok(Some(opponent))
    }
}

/// Read a hero snapshot from JSON
pub fn load_snapshot(path: &Path) -> Result<HeroSnapshot> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse hero snapshot: {}", path.display()))
}
