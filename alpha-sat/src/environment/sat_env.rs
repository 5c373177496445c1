use std::sync::Arc;

use log::debug;
use sat::{DecisionError, Formula, Literal, Solver};
use thiserror::Error;

use super::{Environment, Simulation, Step};
use crate::{
    repr::{solver_repr, Limits, Observation},
    search::{Node, Rollout},
};

/// Problem set shared by every environment of a run.
pub type Problems = Arc<[Arc<Formula>]>;

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum EnvError {
    #[error("there is no problem {0}")]
    UnknownProblem(usize),
    #[error("problem {problem} has {clauses} clauses and {variables} variables, limits are {limits:?}")]
    TooLarge {
        problem: usize,
        clauses: usize,
        variables: usize,
        limits: Limits,
    },
    #[error("no problem has been reset yet")]
    NotReset,
    #[error("expected a policy over {expected} actions, got {found}")]
    PolicySize { expected: usize, found: usize },
    #[error("action {action} is outside the action space of {actions}")]
    Action { action: usize, actions: usize },
    #[error(transparent)]
    Decision(#[from] DecisionError),
}

/// SAT branching environment.
///
/// Every decision is a literal. Between decisions a PUCT search over solver
/// positions collects visit counts; the search pauses whenever a position
/// needs an evaluation and is continued by the next `simulate` call.
#[derive(Clone, Debug)]
pub struct SatEnv {
    problems: Problems,
    limits: Limits,
    simulations: u32,
    solver: Option<Solver>,
    root: Node,
    pending: Option<Vec<usize>>,
}

impl SatEnv {
    /// Every search runs at least one simulation.
    pub fn new(problems: Problems, limits: Limits, simulations: u32) -> Result<Self, EnvError> {
        for (problem, formula) in problems.iter().enumerate() {
            if formula.clauses.len() > limits.max_clauses || formula.literals() > limits.actions() {
                return Err(EnvError::TooLarge {
                    problem,
                    clauses: formula.clauses.len(),
                    variables: formula.variables,
                    limits,
                });
            }
        }
        Ok(SatEnv {
            problems,
            limits,
            simulations: simulations.max(1),
            solver: None,
            root: Node::default(),
            pending: None,
        })
    }

    pub fn limits(&self) -> Limits {
        self.limits
    }

    pub fn solver(&self) -> Option<&Solver> {
        self.solver.as_ref()
    }

    /// Initialise the root so its evaluation is the first thing `simulate` consumes.
    fn prepare_root(&mut self) {
        let Some(solver) = &self.solver else { return };
        if solver.is_finished() || self.root.is_initialized() {
            return;
        }
        let mut position = solver.clone();
        let mut path = Vec::new();
        if self.root.virtual_rollout(&mut position, &mut path) == Rollout::Pending {
            self.pending = Some(path);
        }
    }
}

impl Environment for SatEnv {
    type Error = EnvError;

    fn action_space(&self) -> usize {
        self.limits.actions()
    }

    fn reset_at(&mut self, problem: usize) -> Result<Option<Observation>, Self::Error> {
        let formula = self.problems.get(problem).ok_or(EnvError::UnknownProblem(problem))?;
        let solver = Solver::new(Arc::clone(formula));
        self.root = Node::default();
        self.pending = None;
        if solver.is_finished() {
            debug!("problem {problem} is {:?} after propagation", solver.status());
            self.solver = None;
            return Ok(None);
        }
        let observation = solver_repr(&solver, self.limits);
        self.solver = Some(solver);
        self.prepare_root();
        Ok(Some(observation))
    }

    fn simulate(&mut self, policy: &[f32], eval: f32) -> Result<Simulation, Self::Error> {
        let solver = self.solver.as_ref().ok_or(EnvError::NotReset)?;
        if policy.len() != self.limits.actions() {
            return Err(EnvError::PolicySize {
                expected: self.limits.actions(),
                found: policy.len(),
            });
        }

        if let Some(path) = self.pending.take() {
            self.root.devirtualize_path(&mut path.into_iter(), policy, eval);
        }

        let done = |root: &Node| solver.is_finished() || root.explored() >= self.simulations;
        if done(&self.root) {
            return Ok(Simulation {
                observation: solver_repr(solver, self.limits),
                needs_evaluation: false,
                needs_simulation: false,
            });
        }

        let mut position = solver.clone();
        let mut path = Vec::new();
        match self.root.virtual_rollout(&mut position, &mut path) {
            Rollout::Pending => {
                self.pending = Some(path);
                Ok(Simulation {
                    observation: solver_repr(&position, self.limits),
                    needs_evaluation: true,
                    needs_simulation: true,
                })
            }
            Rollout::Finished(_) => Ok(Simulation {
                observation: solver_repr(solver, self.limits),
                needs_evaluation: false,
                needs_simulation: !done(&self.root),
            }),
        }
    }

    fn visit_counts(&self) -> Vec<f64> {
        let mut counts = vec![0.0; self.limits.actions()];
        for (action, child) in &self.root.children {
            counts[*action] = child.visits as f64;
        }
        counts
    }

    fn step(&mut self, action: usize) -> Result<Step, Self::Error> {
        let actions = self.limits.actions();
        if action >= actions {
            return Err(EnvError::Action { action, actions });
        }
        let solver = self.solver.as_mut().ok_or(EnvError::NotReset)?;
        solver.decide(Literal::from_action(action))?;
        let done = solver.is_finished();
        if done {
            debug!("{:?} after {} decisions", solver.status(), solver.decisions_taken());
        }
        let observation = solver_repr(solver, self.limits);

        // Keep the searched sub-tree unless a path is still waiting on an evaluation.
        let root = std::mem::take(&mut self.root);
        self.root = if self.pending.take().is_some() {
            Node::default()
        } else {
            root.play(action)
        };
        self.prepare_root();

        Ok(Step { done, observation })
    }
}
