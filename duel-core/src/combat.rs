//! Combat resolver
//!
//! `resolve` is a pure function of (hero, opponent, seed): it seeds one
//! `DuelRng`, synthesizes an opponent if none is given, then plays at most
//! `MAX_TURNS` exchanges. Same inputs always give the same log and outcome.
//!
//! Draw order is fixed:
//! 1. opponent name (synthesized opponents only)
//! 2. opponent element (only when not supplied)
//! 3. per attack: hit roll, then crit roll on a hit
//! 4. per completed turn: freeze roll

use serde::{Deserialize, Serialize};

use crate::combatant::{Combatant, HeroSnapshot};
use crate::element::{Element, MAX_MULTIPLIER, MIN_MULTIPLIER};
use crate::error::Result;
use crate::opponent::{draw_element, synthesize_opponent};
use crate::rng::DuelRng;

// ============================================================================
// CONSTANTS
// ============================================================================

/// Hard turn cap; the ramp makes knockouts before this the norm
pub const MAX_TURNS: u32 = 20;

/// Flat weapon bonus added to attacker power
pub const WEAPON_BONUS: i32 = 2;

pub const CRIT_CHANCE: f64 = 0.05;
pub const CRIT_MULTIPLIER: f64 = 1.5;

/// Chance, after each full turn, that the opponent is frozen
pub const FREEZE_CHANCE: f64 = 0.05;

const MIN_HIT_CHANCE: i32 = 5;
const MAX_HIT_CHANCE: i32 = 95;

/// Damage floor before the ramp is applied
const MIN_DAMAGE: f64 = 1.0;

// ============================================================================
// TURN STATE
// ============================================================================

/// Which side of the duel
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Hero,
    Opponent,
}

/// Per-turn damage escalation
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ramp(f64);

impl Ramp {
    pub fn for_turn(turn: u32) -> Self {
        Ramp(1.0 + (0.10 + 0.06 * f64::from(turn)).min(2.0))
    }

    pub fn multiplier(self) -> f64 {
        self.0
    }
}

/// Status carried by the opponent from one turn into the next
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Status {
    Ready,
    /// Skips exactly its next attack
    Frozen,
}

/// How the duel ended
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Finish {
    Knockout,
    TurnLimit,
}

// ============================================================================
// OUTCOME
// ============================================================================

/// Experience and gold earned by the hero
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rewards {
    pub xp: u32,
    pub gold: u32,
}

/// Rewards against `opponent`, scaled from its max hp and attributes
pub fn rewards(victory: bool, opponent: &Combatant) -> Rewards {
    let max_hp = i64::from(opponent.max_hp.max(0));
    let power = i64::from(opponent.power.max(0));
    let agility = i64::from(opponent.agility.max(0));

    let (xp, gold) = if victory {
        (
            (max_hp + power + agility) as f64,
            (0.6 * (max_hp + power) as f64).floor(),
        )
    } else {
        (
            (0.2 * (max_hp + power) as f64).floor(),
            (0.1 * max_hp as f64).floor(),
        )
    };

    Rewards {
        xp: xp.min(f64::from(u32::MAX)) as u32,
        gold: gold.min(f64::from(u32::MAX)) as u32,
    }
}

/// Result of one resolution
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CombatOutcome {
    pub victory: bool,
    /// Total hp the hero lost
    pub damage_taken: i32,
    /// Total hp the opponent lost
    pub damage_dealt: i32,
    pub xp_gained: u32,
    pub gold_gained: u32,
    pub turns: u32,
    pub finish: Finish,
    pub seed: u32,
    /// Opponent as it entered the duel
    pub opponent: Combatant,
    pub hero_hp_left: i32,
    pub opponent_hp_left: i32,
    pub log: Vec<String>,
}

// ============================================================================
// RESOLUTION
// ============================================================================

/// Resolve a duel. `opponent = None` synthesizes a foe at the hero's level.
pub fn resolve(
    hero: &HeroSnapshot,
    opponent: Option<&HeroSnapshot>,
    seed: u32,
) -> Result<CombatOutcome> {
    resolve_with_element(hero, opponent, None, seed)
}

/// Resolve with an explicit opponent affinity, overriding the snapshot's
pub fn resolve_with_element(
    hero: &HeroSnapshot,
    opponent: Option<&HeroSnapshot>,
    opponent_element: Option<Element>,
    seed: u32,
) -> Result<CombatOutcome> {
    hero.validate()?;
    if let Some(foe) = opponent {
        foe.validate()?;
    }

    let mut rng = DuelRng::new(seed);
    let foe = match opponent {
        None => synthesize_opponent(hero.level, opponent_element, &mut rng),
        Some(snapshot) => {
            let element = match opponent_element.or(snapshot.element) {
                Some(e) => e,
                None => draw_element(&mut rng),
            };
            snapshot.to_combatant(element)
        }
    };

    let hero = hero.to_combatant(Element::Physical);

    Ok(Bout::new(hero, foe).run(&mut rng, seed))
}

/// Mutable state of a duel in progress
struct Bout {
    hero: Combatant,
    foe: Combatant,
    foe_entry: Combatant,
    foe_status: Status,
    dealt: i32,
    taken: i32,
    log: Vec<String>,
}

impl Bout {
    fn new(hero: Combatant, foe: Combatant) -> Self {
        Self {
            foe_entry: foe.clone(),
            hero,
            foe,
            foe_status: Status::Ready,
            dealt: 0,
            taken: 0,
            log: Vec::new(),
        }
    }

    fn run(mut self, rng: &mut DuelRng, seed: u32) -> CombatOutcome {
        self.log.push(format!(
            "{} ({}) faces {} ({})",
            self.hero.name, self.hero.element, self.foe.name, self.foe.element
        ));

        // Ties in agility go to the hero
        let order = if self.hero.agility >= self.foe.agility {
            [Side::Hero, Side::Opponent]
        } else {
            [Side::Opponent, Side::Hero]
        };
        let first = match order[0] {
            Side::Hero => &self.hero.name,
            Side::Opponent => &self.foe.name,
        };
        self.log.push(format!("{} seizes the initiative", first));

        let mut turns = 0;
        let mut finish = Finish::TurnLimit;

        for turn in 1..=MAX_TURNS {
            turns = turn;
            if self.play_turn(turn, order, rng) {
                finish = Finish::Knockout;
                break;
            }
            if rng.chance(FREEZE_CHANCE) {
                self.foe_status = Status::Frozen;
                self.log.push(format!("{} is frozen solid", self.foe.name));
            }
        }

        self.finish(turns, finish, seed)
    }

    /// Play one turn. Returns true once either side is down.
    fn play_turn(&mut self, turn: u32, order: [Side; 2], rng: &mut DuelRng) -> bool {
        let ramp = Ramp::for_turn(turn);
        self.log.push(format!("Turn {} (ramp x{:.2})", turn, ramp.multiplier()));

        for side in order {
            if side == Side::Opponent && self.foe_status == Status::Frozen {
                self.foe_status = Status::Ready;
                self.log.push(format!("{} is frozen and cannot act", self.foe.name));
                continue;
            }

            let (attacker, defender) = match side {
                Side::Hero => (&self.hero, &mut self.foe),
                Side::Opponent => (&self.foe, &mut self.hero),
            };
            let lost = strike(attacker, defender, ramp, rng, &mut self.log);
            match side {
                Side::Hero => self.dealt += lost,
                Side::Opponent => self.taken += lost,
            }

            if self.hero.is_down() || self.foe.is_down() {
                return true;
            }
        }
        false
    }

    fn finish(mut self, turns: u32, finish: Finish, seed: u32) -> CombatOutcome {
        let victory = if self.foe.is_down() {
            self.log.push(format!("{} defeats {}", self.hero.name, self.foe.name));
            true
        } else if self.hero.is_down() {
            self.log.push(format!("{} is defeated by {}", self.hero.name, self.foe.name));
            false
        } else if self.dealt > self.taken {
            self.log.push(format!(
                "Turn limit reached: {} claims a moral victory ({} dealt vs {} taken)",
                self.hero.name, self.dealt, self.taken
            ));
            true
        } else {
            self.log.push(format!(
                "Turn limit reached: {} holds the field ({} dealt vs {} taken)",
                self.foe.name, self.dealt, self.taken
            ));
            false
        };

        let earned = rewards(victory, &self.foe_entry);
        self.log.push(format!("Rewards: {} xp, {} gold", earned.xp, earned.gold));

        CombatOutcome {
            victory,
            damage_taken: self.taken,
            damage_dealt: self.dealt,
            xp_gained: earned.xp,
            gold_gained: earned.gold,
            turns,
            finish,
            seed,
            opponent: self.foe_entry,
            hero_hp_left: self.hero.hp,
            opponent_hp_left: self.foe.hp,
            log: self.log,
        }
    }
}

/// Hit chance in percent, clamped to [5, 95]
pub fn hit_chance(attacker_agility: i32, defender_agility: i32) -> i32 {
    let diff = i64::from(attacker_agility) - i64::from(defender_agility);
    (50 + 3 * diff).clamp(i64::from(MIN_HIT_CHANCE), i64::from(MAX_HIT_CHANCE)) as i32
}

/// Resolve one attack. Returns hp the defender lost.
fn strike(
    attacker: &Combatant,
    defender: &mut Combatant,
    ramp: Ramp,
    rng: &mut DuelRng,
    log: &mut Vec<String>,
) -> i32 {
    let chance = hit_chance(attacker.agility, defender.agility);
    let roll = rng.roll_percent();
    if roll as i32 > chance {
        log.push(format!(
            "{} misses {} (rolled {} vs {})",
            attacker.name, defender.name, roll, chance
        ));
        return 0;
    }

    let crit = rng.chance(CRIT_CHANCE);
    let crit_factor = if crit { CRIT_MULTIPLIER } else { 1.0 };
    let element_factor = attacker.element.factor_against(defender.element);
    let multiplier = (crit_factor * element_factor).clamp(MIN_MULTIPLIER, MAX_MULTIPLIER);

    let raw = f64::from(attacker.power.saturating_add(WEAPON_BONUS)) * multiplier
        - f64::from(defender.armor);
    let damage = (raw.max(MIN_DAMAGE) * ramp.multiplier()).floor();
    let damage = damage.min(f64::from(i32::MAX)) as i32;
    let lost = defender.take_damage(damage);

    let mut line = format!(
        "{} hits {} for {} damage",
        attacker.name, defender.name, damage
    );
    if crit {
        line.push_str(" (critical)");
    }
    if element_factor > 1.0 {
        line.push_str(" (super effective)");
    } else if element_factor < 1.0 {
        line.push_str(" (resisted)");
    }
    line.push_str(&format!(" [{}/{} hp]", defender.hp, defender.max_hp));
    log.push(line);

    lost
}

// ============================================================================
// TESTS
// ============================================================================
