use std::path::PathBuf;

use alpha_sat::config::{MAX_CLAUSES, MAX_VARIABLES, REPEATS, RESIGN_DEPTH, SIMULATIONS, WORKERS};
use clap::Parser;

/// Generate self-play examples for SAT branching.
///
/// Examples are kept in memory and summarised in the log; nothing is written to disk.
#[derive(Parser)]
pub struct Args {
    /// Paths to DIMACS CNF files
    #[clap(required = true)]
    pub problems: Vec<PathBuf>,
    /// Rollouts per problem
    #[clap(short, long, default_value_t = REPEATS)]
    pub repeats: u32,
    /// Search simulations before every decision
    #[clap(short, long, default_value_t = SIMULATIONS)]
    pub simulations: u32,
    /// Depth at which a rollout is cut off
    #[clap(long, default_value_t = RESIGN_DEPTH)]
    pub resign_depth: u32,
    #[clap(long, default_value_t = MAX_CLAUSES)]
    pub max_clauses: usize,
    #[clap(long, default_value_t = MAX_VARIABLES)]
    pub max_variables: usize,
    /// Problems played at the same time
    #[clap(short, long, default_value_t = WORKERS)]
    pub workers: usize,
    /// Seed for reproducible runs
    #[clap(long)]
    pub seed: Option<u64>,
    /// Evaluate with the clause occurrence heuristic instead of flat priors
    #[clap(long)]
    pub heuristic: bool,
    /// Log to this file instead of stderr
    #[clap(long)]
    pub log_file: Option<PathBuf>,
    /// Log debug messages
    #[clap(short, long)]
    pub verbose: bool,
}
