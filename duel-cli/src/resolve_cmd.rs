//! Resolve command - run one seeded duel and print its log
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run() - orchestration
//! - Level 2: resolve_duel(), report_outcome()
//! - Level 4: formatting utilities

use anyhow::Result;
use clap::Args;
use rand::Rng;

use duel_core::{resolve_with_element, CombatOutcome, Finish};

use crate::hero_args::HeroArgs;

// ============================================================================
// COMMAND ARGUMENTS (Level 4 - Configuration)
// ============================================================================

#[derive(Args)]
pub struct ResolveArgs {
    #[command(flatten)]
    pub combatants: HeroArgs,

    /// Duel seed; drawn at random and printed if omitted
    #[arg(long)]
    pub seed: Option<u32>,

    /// Output the outcome as JSON
    #[arg(long)]
    pub json: bool,
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

/// Run resolve command
///
/// 1. Build combatants
/// 2. Resolve the duel
/// 3. Report the outcome
pub fn run(args: ResolveArgs) -> Result<()> {
    let seed = args.seed.unwrap_or_else(|| rand::thread_rng().gen());
    let outcome = resolve_duel(&args.combatants, seed)?;

    tracing::debug!(seed, victory = outcome.victory, turns = outcome.turns, "duel resolved");

    report_outcome(&outcome, args.json)
}

// ============================================================================
// LEVEL 2 - PHASES
// ============================================================================

pub fn resolve_duel(combatants: &HeroArgs, seed: u32) -> Result<CombatOutcome> {
    let hero = combatants.hero_snapshot()?;
    let opponent = combatants.opponent_snapshot()?;
    let outcome = resolve_with_element(&hero, opponent.as_ref(), combatants.opponent_element, seed)?;
    Ok(outcome)
}

fn report_outcome(outcome: &CombatOutcome, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(outcome)?);
    } else {
        print!("{}", format_outcome(outcome));
    }
    Ok(())
}

// ============================================================================
// LEVEL 4 - FORMATTING
// ============================================================================

fn format_outcome(outcome: &CombatOutcome) -> String {
    let mut out = String::new();
    let foe = &outcome.opponent;

    out.push_str(&format!("\n=== Duel (seed {}) ===\n", outcome.seed));
    out.push_str(&format!(
        "Opponent: {} [{}] hp {} armor {} power {} agility {}\n\n",
        foe.name, foe.element, foe.max_hp, foe.armor, foe.power, foe.agility
    ));
    for line in &outcome.log {
        out.push_str(line);
        out.push('\n');
    }

    let verdict = if outcome.victory { "VICTORY" } else { "DEFEAT" };
    let finish = match outcome.finish {
        Finish::Knockout => "knockout",
        Finish::TurnLimit => "turn limit",
    };
    out.push_str(&format!(
        "\n{} by {} after {} turns\n",
        verdict, finish, outcome.turns
    ));
    out.push_str(&format!(
        "Damage dealt: {}  taken: {}\n",
        outcome.damage_dealt, outcome.damage_taken
    ));
    out.push_str(&format!(
        "Rewards: {} xp, {} gold\n",
        outcome.xp_gained, outcome.gold_gained
    ));
    out
}

// ============================================================================
// TESTS
// ============================================================================
