mod sat_env;

pub use sat_env::{EnvError, Problems, SatEnv};

use crate::repr::Observation;

/// Result of one call into the environment's own search.
#[derive(Clone, Debug)]
pub struct Simulation {
    pub observation: Observation,
    /// `observation` must be evaluated and fed into the next call.
    pub needs_evaluation: bool,
    /// More simulations are needed before visit counts are ready.
    pub needs_simulation: bool,
}

#[derive(Clone, Debug)]
pub struct Step {
    pub done: bool,
    pub observation: Observation,
}

/// A decision process that runs its own evaluator-guided search.
pub trait Environment {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Number of actions every observation and policy covers.
    fn action_space(&self) -> usize;

    /// Start over at the given problem.
    /// `None` means the problem is solved without any decision.
    fn reset_at(&mut self, problem: usize) -> Result<Option<Observation>, Self::Error>;

    /// Feed the evaluation of the last observation that needed one and
    /// continue the search at the current position.
    fn simulate(&mut self, policy: &[f32], eval: f32) -> Result<Simulation, Self::Error>;

    /// Per-action visit counts of the search at the current position.
    fn visit_counts(&self) -> Vec<f64>;

    fn step(&mut self, action: usize) -> Result<Step, Self::Error>;
}

#[cfg(test)]
mod tests;
