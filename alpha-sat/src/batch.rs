use log::{error, info, warn};

use crate::{
    agent::Agent,
    environment::Environment,
    error::Error,
    example::Sink,
    repr::Observation,
    self_play::{Performance, SelfPlay},
};

/// Self-play many problems at once, `workers` at a time.
///
/// Each round gathers the observation every paused driver waits on and
/// evaluates them in a single agent batch. Finished drivers write their
/// examples to `sink` and make room for the next problem. A driver that
/// fails is logged and dropped without affecting the others.
pub fn self_play_batch<E, A, S, F, I>(
    problems: I,
    workers: usize,
    mut new_driver: F,
    agent: &A,
    sink: &mut S,
) -> Vec<Performance>
where
    E: Environment,
    A: Agent + ?Sized,
    S: Sink + ?Sized,
    F: FnMut(usize) -> Result<SelfPlay<E>, Error>,
    I: IntoIterator<Item = usize>,
{
    let workers = workers.max(1);
    info!("Starting self-play with {workers} workers");

    let mut problems = problems.into_iter();
    let mut performances = Vec::new();
    let mut drivers: Vec<SelfPlay<E>> = Vec::with_capacity(workers);
    let mut observations: Vec<Observation> = Vec::with_capacity(workers);

    loop {
        // Top up with fresh problems.
        while drivers.len() < workers {
            let Some(problem) = problems.next() else { break };
            let mut driver = match new_driver(problem) {
                Ok(driver) => driver,
                Err(err) => {
                    error!("dropping problem {problem}: {err}");
                    continue;
                }
            };
            if let Some(observation) = resume(&mut driver, &[], 0.0, sink, &mut performances) {
                drivers.push(driver);
                observations.push(observation);
            }
        }
        if drivers.is_empty() {
            break;
        }

        let outputs = agent.policy_eval_batch(&observations);
        if outputs.len() != drivers.len() {
            warn!(
                "agent answered {} of {} observations, dropping the rest",
                outputs.len(),
                drivers.len()
            );
        }
        observations.clear();
        let paused = std::mem::take(&mut drivers);
        for (mut driver, (policy, eval)) in paused.into_iter().zip(outputs) {
            if let Some(observation) = resume(&mut driver, &policy, eval, sink, &mut performances) {
                drivers.push(driver);
                observations.push(observation);
            }
        }
    }

    performances
}

/// Step a driver once. Returns the observation it waits on, if any.
fn resume<E, S>(
    driver: &mut SelfPlay<E>,
    policy: &[f32],
    eval: f32,
    sink: &mut S,
    performances: &mut Vec<Performance>,
) -> Option<Observation>
where
    E: Environment,
    S: Sink + ?Sized,
{
    match driver.step(policy, eval) {
        Ok(Some(observation)) => Some(observation),
        Ok(None) => {
            let written = driver.write_examples(sink);
            let performance = driver.performance();
            info!(
                "problem {}: mean depth {:.2} over {} repeats, {written} examples",
                performance.problem,
                performance.mean_depth(),
                performance.repeats
            );
            performances.push(performance);
            None
        }
        Err(err) => {
            error!("dropping problem {}: {err}", driver.problem());
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use sat::Formula;

    use super::*;
    use crate::{
        agent::Uniform,
        environment::{Problems, SatEnv},
        example::ExampleBuffer,
        policy::TemperatureSchedule,
        repr::Limits,
        self_play::Settings,
    };

    const LIMITS: Limits = Limits {
        max_clauses: 8,
        max_variables: 4,
    };

    fn problems() -> Problems {
        ["p cnf 3 2\n1 2 0\n-1 3 0\n", "p cnf 2 2\n1 0\n-1 2 0\n", "p cnf 4 3\n1 2 -3 0\n-1 3 4 0\n2 -4 0\n"]
            .iter()
            .map(|d| Arc::new(d.parse::<Formula>().unwrap()))
            .collect()
    }

    #[test]
    fn batch_plays_every_problem() {
        let problems = problems();
        let settings = Settings {
            repeats: 4,
            temperature: TemperatureSchedule::constant(1.0),
            seed: Some(1),
            ..Settings::default()
        };
        let mut buffer = ExampleBuffer::new(1_000);

        // Problem 3 does not exist and is dropped.
        let mut performances = self_play_batch(
            0..4,
            2,
            |problem| {
                let env = SatEnv::new(Arc::clone(&problems), LIMITS, 16).map_err(|e| Error::environment(problem, e))?;
                SelfPlay::new(env, problem, &settings)
            },
            &Uniform,
            &mut buffer,
        );
        performances.sort_by_key(|p| p.problem);

        assert_eq!(performances.len(), 3);
        assert_eq!(
            performances[1],
            Performance {
                problem: 1,
                repeats: 1,
                score: 1
            }
        );
        for performance in [performances[0], performances[2]] {
            assert_eq!(performance.repeats, 4);
            assert!(performance.score >= 4);
        }

        assert!(!buffer.is_empty());
        assert!(buffer.iter().all(|e| e.problem != 1 && e.policy.len() == 8));
        let roots = buffer.iter().filter(|e| e.weight == 4).count();
        assert!(roots >= 2);
    }
}
