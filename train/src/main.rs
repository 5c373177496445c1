use std::{error::Error, fs::read_to_string, sync::Arc};

use alpha_sat::{self_play_batch, Agent, ExampleBuffer, Limits, Occurrence, Problems, SatEnv, SelfPlay, Settings, Uniform};
use clap::Parser;
use cli::Args;
use log::{info, LevelFilter};
use mimalloc::MiMalloc;
use sat::Formula;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

mod cli;

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let level = if args.verbose { LevelFilter::Debug } else { LevelFilter::Info };
    match &args.log_file {
        Some(path) => simple_logging::log_to_file(path, level)?,
        None => simple_logging::log_to_stderr(level),
    }

    let mut formulas = Vec::with_capacity(args.problems.len());
    for path in &args.problems {
        info!("loading {}", path.display());
        let formula = read_to_string(path)?
            .parse::<Formula>()
            .map_err(|err| format!("{}: {err}", path.display()))?;
        formulas.push(Arc::new(formula));
    }
    let problems: Problems = formulas.into();

    let limits = Limits {
        max_clauses: args.max_clauses,
        max_variables: args.max_variables,
    };
    let env = SatEnv::new(Arc::clone(&problems), limits, args.simulations)?;
    let settings = Settings {
        repeats: args.repeats,
        resign_depth: args.resign_depth,
        seed: args.seed,
        ..Settings::default()
    };

    let agent: Box<dyn Agent> = if args.heuristic {
        Box::new(Occurrence)
    } else {
        Box::new(Uniform)
    };

    let mut buffer = ExampleBuffer::default();
    let performances = self_play_batch(
        0..problems.len(),
        args.workers,
        |problem| SelfPlay::new(env.clone(), problem, &settings),
        agent.as_ref(),
        &mut buffer,
    );

    let repeats: u64 = performances.iter().map(|p| u64::from(p.repeats)).sum();
    let score: u64 = performances.iter().map(|p| p.score).sum();
    info!(
        "self-played {} of {} problems, mean depth {:.2}",
        performances.len(),
        problems.len(),
        score as f64 / repeats.max(1) as f64,
    );
    summarize(&buffer);
    Ok(())
}

/// Log what the generated examples look like.
fn summarize(buffer: &ExampleBuffer) {
    match buffer.summary() {
        Some(summary) => info!(
            "{} examples over {} rollouts: mean score {:.3}, policy entropy {:.3}, {:.1} entries per state",
            summary.examples, summary.rollouts, summary.mean_score, summary.mean_entropy, summary.mean_entries
        ),
        None => info!("no examples were generated"),
    }
}
