//! Simulate command - resolve one matchup over many seeds
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run() - orchestration
//! - Level 2: simulate_range(), report_summary()
//! - Level 3: summarize()
//! - Level 4: progress bar, formatting

use anyhow::Result;
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use serde::Serialize;

use duel_core::{resolve_with_element, CombatOutcome, Element, Finish, HeroSnapshot, MAX_TURNS};

use crate::hero_args::HeroArgs;

// ============================================================================
// COMMAND ARGUMENTS (Level 4 - Configuration)
// ============================================================================

#[derive(Args)]
pub struct SimulateArgs {
    #[command(flatten)]
    pub combatants: HeroArgs,

    /// Number of duels to resolve
    #[arg(long, default_value = "1000")]
    pub duels: u32,

    /// First seed; duel i uses start_seed + i
    #[arg(long, default_value = "1")]
    pub start_seed: u32,

    /// Output the summary as JSON
    #[arg(long)]
    pub json: bool,

    /// Hide the progress bar
    #[arg(long)]
    pub quiet: bool,
}

/// Aggregate over a seed sweep
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct SimulationSummary {
    pub duels: u32,
    pub wins: u32,
    pub win_rate: f64,
    pub knockouts: u32,
    pub turn_limits: u32,
    pub mean_turns: f64,
    pub mean_xp: f64,
    pub mean_gold: f64,
    pub mean_damage_taken: f64,
    /// Turns histogram, index 0 is turn 1
    pub turns_histogram: Vec<u32>,
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

/// Run simulate command
///
/// 1. Build combatants
/// 2. Resolve every seed in parallel
/// 3. Report the summary
pub fn run(args: SimulateArgs) -> Result<()> {
    let hero = args.combatants.hero_snapshot()?;
    let opponent = args.combatants.opponent_snapshot()?;

    tracing::info!(
        hero = %hero.name,
        duels = args.duels,
        start_seed = args.start_seed,
        "Starting simulation"
    );

    let progress = create_progress_bar(args.duels, args.quiet);
    let outcomes = simulate_range(
        &hero,
        opponent.as_ref(),
        args.combatants.opponent_element,
        args.start_seed,
        args.duels,
        &progress,
    )?;
    progress.finish_and_clear();

    let summary = summarize(&outcomes);
    report_summary(&summary, args.json)
}

// ============================================================================
// LEVEL 2 - PHASES
// ============================================================================

/// Resolve `count` consecutive seeds. Seeds wrap at u32::MAX.
pub fn simulate_range(
    hero: &HeroSnapshot,
    opponent: Option<&HeroSnapshot>,
    opponent_element: Option<Element>,
    start_seed: u32,
    count: u32,
    progress: &ProgressBar,
) -> Result<Vec<CombatOutcome>> {
    let outcomes: Result<Vec<CombatOutcome>, _> = (0..count)
        .into_par_iter()
        .map(|i| {
            let seed = start_seed.wrapping_add(i);
            let outcome = resolve_with_element(hero, opponent, opponent_element, seed);
            progress.inc(1);
            outcome
        })
        .collect();
    Ok(outcomes?)
}

fn report_summary(summary: &SimulationSummary, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(summary)?);
    } else {
        print!("{}", format_summary(summary));
    }
    Ok(())
}

// ============================================================================
// LEVEL 3 - STEPS
// ============================================================================

pub fn summarize(outcomes: &[CombatOutcome]) -> SimulationSummary {
    if outcomes.is_empty() {
        return SimulationSummary::default();
    }

    let n = outcomes.len() as f64;
    let mut histogram = vec![0u32; MAX_TURNS as usize];
    for outcome in outcomes {
        let slot = (outcome.turns.clamp(1, MAX_TURNS) - 1) as usize;
        histogram[slot] += 1;
    }

    let wins = outcomes.iter().filter(|o| o.victory).count() as u32;
    let knockouts = outcomes
        .iter()
        .filter(|o| o.finish == Finish::Knockout)
        .count() as u32;
    let mean = |f: fn(&CombatOutcome) -> f64| outcomes.iter().map(f).sum::<f64>() / n;

    SimulationSummary {
        duels: outcomes.len() as u32,
        wins,
        win_rate: f64::from(wins) / n,
        knockouts,
        turn_limits: outcomes.len() as u32 - knockouts,
        mean_turns: mean(|o| f64::from(o.turns)),
        mean_xp: mean(|o| f64::from(o.xp_gained)),
        mean_gold: mean(|o| f64::from(o.gold_gained)),
        mean_damage_taken: mean(|o| f64::from(o.damage_taken)),
        turns_histogram: histogram,
    }
}

// ============================================================================
// LEVEL 4 - UTILITIES
// ============================================================================

fn create_progress_bar(total: u32, hidden: bool) -> ProgressBar {
    if hidden {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new(u64::from(total));
    let style = ProgressStyle::with_template("{spinner} [{bar:40}] {pos}/{len} duels ({eta})")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("=> ");
    bar.set_style(style);
    bar
}

fn format_summary(summary: &SimulationSummary) -> String {
    let mut out = String::new();
    out.push_str("\n=== Simulation Results ===\n");
    out.push_str(&format!("Duels:        {}\n", summary.duels));
    out.push_str(&format!(
        "Wins:         {} ({:.1}%)\n",
        summary.wins,
        summary.win_rate * 100.0
    ));
    out.push_str(&format!(
        "Finishes:     {} knockouts, {} at turn limit\n",
        summary.knockouts, summary.turn_limits
    ));
    out.push_str(&format!("Mean turns:   {:.2}\n", summary.mean_turns));
    out.push_str(&format!("Mean xp:      {:.1}\n", summary.mean_xp));
    out.push_str(&format!("Mean gold:    {:.1}\n", summary.mean_gold));
    out.push_str(&format!("Mean taken:   {:.1}\n", summary.mean_damage_taken));
    out
}

// ============================================================================
// TESTS
// ============================================================================
