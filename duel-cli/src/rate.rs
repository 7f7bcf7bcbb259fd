//! Rate command - apply one Elo update to a pair of ratings

use anyhow::Result;
use clap::{Args, ValueEnum};
use serde::Serialize;

use duel_core::{expected_score, update_ratings_with_k, RatedOutcome, DEFAULT_RATING, K_FACTOR};

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Winner {
    A,
    B,
}

impl From<Winner> for RatedOutcome {
    fn from(winner: Winner) -> Self {
        match winner {
            Winner::A => RatedOutcome::AWins,
            Winner::B => RatedOutcome::BWins,
        }
    }
}

#[derive(Args)]
pub struct RateArgs {
    /// Rating of side A before the match
    #[arg(long, default_value_t = DEFAULT_RATING)]
    pub a: i32,

    /// Rating of side B before the match
    #[arg(long, default_value_t = DEFAULT_RATING)]
    pub b: i32,

    #[arg(long, value_enum)]
    pub winner: Winner,

    #[arg(long, default_value_t = K_FACTOR)]
    pub k_factor: f64,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, PartialEq, Serialize)]
pub struct RatingChange {
    pub expected_a: f64,
    pub expected_b: f64,
    pub new_a: i32,
    pub new_b: i32,
    pub delta_a: i32,
    pub delta_b: i32,
}

pub fn run(args: RateArgs) -> Result<()> {
    let change = rate(&args)?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&change)?);
    } else {
        println!("Expected: A {:.3}  B {:.3}", change.expected_a, change.expected_b);
        println!("A: {} -> {} ({:+})", args.a, change.new_a, change.delta_a);
        println!("B: {} -> {} ({:+})", args.b, change.new_b, change.delta_b);
    }
    Ok(())
}

pub fn rate(args: &RateArgs) -> Result<RatingChange> {
    if args.a < 0 || args.b < 0 {
        anyhow::bail!("ratings cannot be negative");
    }
    if !args.k_factor.is_finite() || args.k_factor <= 0.0 {
        anyhow::bail!("--k-factor must be a positive number, got {}", args.k_factor);
    }

    let (new_a, new_b) = update_ratings_with_k(args.a, args.b, args.winner.into(), args.k_factor);
    Ok(RatingChange {
        expected_a: expected_score(args.a, args.b),
        expected_b: expected_score(args.b, args.a),
        new_a,
        new_b,
        delta_a: new_a - args.a,
        delta_b: new_b - args.b,
    })
}
