use std::sync::Arc;

use sat::{Formula, Status};

use super::*;
use crate::{
    agent::{Agent, Uniform},
    math::softmax,
    repr::{valid_mask, Limits},
};

const LIMITS: Limits = Limits {
    max_clauses: 8,
    max_variables: 4,
};

fn env(dimacs: &[&str], simulations: u32) -> SatEnv {
    let problems: Problems = dimacs
        .iter()
        .map(|d| Arc::new(d.parse::<Formula>().unwrap()))
        .collect();
    SatEnv::new(problems, LIMITS, simulations).unwrap()
}

/// Answer every evaluation request until the search is done.
/// Returns how many evaluations were needed.
fn search<A: Agent>(env: &mut SatEnv, agent: &A, mut observation: Observation) -> u32 {
    let mut evaluations = 0;
    loop {
        let (logits, eval) = agent.policy_and_eval(&observation);
        let policy = softmax(&logits).unwrap();
        evaluations += 1;
        let mut simulation = env.simulate(&policy, eval).unwrap();
        while !simulation.needs_evaluation && simulation.needs_simulation {
            simulation = env.simulate(&policy, eval).unwrap();
        }
        if !simulation.needs_evaluation {
            return evaluations;
        }
        observation = simulation.observation;
    }
}

#[test]
fn unknown_problem() {
    let mut env = env(&["p cnf 2 1\n1 2 0\n"], 10);
    assert_eq!(env.reset_at(3).unwrap_err(), EnvError::UnknownProblem(3));
}

#[test]
fn rejects_oversized_problems() {
    let problems: Problems = vec![Arc::new("p cnf 5 1\n1 5 0\n".parse::<Formula>().unwrap())].into();
    assert!(matches!(
        SatEnv::new(problems, LIMITS, 10),
        Err(EnvError::TooLarge { problem: 0, .. })
    ));
    let problems: Problems = vec![Arc::new("p cnf 4 1\n1 4 0\n".parse::<Formula>().unwrap())].into();
    assert!(SatEnv::new(problems, LIMITS, 10).is_ok());
}

#[test]
fn trivial_problem_has_no_observation() {
    let mut env = env(&["p cnf 2 2\n1 0\n-1 2 0\n"], 10);
    assert!(env.reset_at(0).unwrap().is_none());
    assert_eq!(env.simulate(&[0.0; 8], 0.0).unwrap_err(), EnvError::NotReset);
}

#[test]
fn policy_must_cover_action_space() {
    let mut env = env(&["p cnf 2 1\n1 2 0\n"], 10);
    env.reset_at(0).unwrap();
    assert_eq!(
        env.simulate(&[0.5, 0.5], 0.0).unwrap_err(),
        EnvError::PolicySize { expected: 8, found: 2 }
    );
}

#[test]
fn counts_match_simulation_budget() {
    let mut env = env(&["p cnf 4 3\n1 2 -3 0\n-1 3 4 0\n2 -4 0\n"], 64);
    let observation = env.reset_at(0).unwrap().unwrap();
    let valid = valid_mask(&observation);
    let evaluations = search(&mut env, &Uniform, observation);

    let counts = env.visit_counts();
    assert_eq!(counts.len(), env.action_space());
    assert_eq!(counts.iter().sum::<f64>(), 64.0);
    assert!(evaluations <= 65);
    for (count, valid) in counts.iter().zip(valid) {
        assert!(valid || *count == 0.0);
    }
}

#[test]
fn win_in_one() {
    // Only setting 1 satisfies every clause at once.
    let mut env = env(&["p cnf 4 3\n1 2 3 0\n1 -2 4 0\n1 -3 -4 0\n"], 200);
    let observation = env.reset_at(0).unwrap().unwrap();
    search(&mut env, &Uniform, observation);

    let counts = env.visit_counts();
    assert!(counts.iter().all(|&c| c <= counts[0]), "{counts:?}");

    let step = env.step(0).unwrap();
    assert!(step.done);
    assert_eq!(env.solver().unwrap().status(), Status::Satisfied);
}

#[test]
fn step_reuses_searched_subtree() {
    let mut env = env(&["p cnf 4 2\n1 2 0\n3 4 0\n"], 100);
    let observation = env.reset_at(0).unwrap().unwrap();
    search(&mut env, &Uniform, observation);

    let counts = env.visit_counts();
    let best = (0..counts.len()).max_by(|&a, &b| counts[a].total_cmp(&counts[b])).unwrap();
    let step = env.step(best).unwrap();
    assert!(!step.done);
    assert!(env.visit_counts().iter().sum::<f64>() > 0.0);
    assert!(matches!(env.step(best), Err(EnvError::Decision(_))));
}
