//! Level-scaled synthetic opponents
//!
//! Used when a duel is requested without a real opponent. All draws come
//! from the duel's own RNG stream, name first and then element, so the
//! same seed always produces the same foe.

use crate::combatant::Combatant;
use crate::element::{Element, DRAWABLE_ELEMENTS};
use crate::rng::DuelRng;

/// Name pool for synthesized opponents. Order is part of the seed contract.
pub const OPPONENT_NAMES: [&str; 8] = [
    "Ashen Marauder",
    "Frostbound Sentinel",
    "Stormcaller Adept",
    "Gravel Brute",
    "Sunlit Zealot",
    "Duskblade Assassin",
    "Iron Gladiator",
    "Wandering Ronin",
];

/// Level-1 baseline stats
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BaseStats {
    pub hp: i32,
    pub armor: i32,
    pub power: i32,
    pub agility: i32,
    pub vitality: i32,
}

pub const OPPONENT_BASE: BaseStats = BaseStats {
    hp: 30,
    armor: 2,
    power: 6,
    agility: 5,
    vitality: 5,
};

/// Growth per level above 1, in tenths of the base value (0.3 per level)
const GROWTH_TENTHS_PER_LEVEL: i64 = 3;

/// Scale one base attribute to `level`, flooring the result.
///
/// Growth is proportional: `floor(base * (1 + 0.3 * (level - 1)))`, not the
/// flat `base + 0.3 * (level - 1)`, which would leave a level 4 opponent
/// within one point of a level 1 one. Integer tenths keep the floor exact
/// (1.6 * 30 must be 48, not 47).
pub fn scale_stat(base: i32, level: u32) -> i32 {
    let levels_above_one = i64::from(level.max(1) - 1);
    let factor_tenths = 10 + GROWTH_TENTHS_PER_LEVEL * levels_above_one;
    let scaled = i64::from(base) * factor_tenths / 10;
    scaled.min(i64::from(i32::MAX)) as i32
}

/// Roll an opponent affinity from the six drawable elements
pub fn draw_element(rng: &mut DuelRng) -> Element {
    DRAWABLE_ELEMENTS[rng.pick(DRAWABLE_ELEMENTS.len())]
}

/// Build a synthetic opponent for a hero of `level`
pub fn synthesize_opponent(level: u32, element: Option<Element>, rng: &mut DuelRng) -> Combatant {
    let name = OPPONENT_NAMES[rng.pick(OPPONENT_NAMES.len())];
    let element = match element {
        Some(e) => e,
        None => draw_element(rng),
    };
    let hp = scale_stat(OPPONENT_BASE.hp, level).max(1);

    Combatant {
        name: name.to_string(),
        hp,
        max_hp: hp,
        armor: scale_stat(OPPONENT_BASE.armor, level),
        power: scale_stat(OPPONENT_BASE.power, level),
        agility: scale_stat(OPPONENT_BASE.agility, level),
        vitality: scale_stat(OPPONENT_BASE.vitality, level),
        element,
    }
}
