use log::{debug, info};
use rand::{rngs::StdRng, SeedableRng};

use crate::{
    config::{REPEATS, RESIGN_DEPTH},
    environment::Environment,
    error::Error,
    example::{collect_examples, Scale, Sink},
    math::softmax,
    policy::{NodeId, PolicyTree, TemperatureSchedule},
    repr::Observation,
};

/// Where a driver is in its pause and resume cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Running,
    /// The last observation handed out waits for an evaluation.
    AwaitingEvaluation,
    Finished,
}

#[derive(Clone, Debug)]
pub struct Settings {
    pub repeats: u32,
    pub temperature: TemperatureSchedule,
    pub resign_depth: u32,
    /// Base seed for the repeat sampling, offset by the problem id.
    /// Seeded from entropy when absent.
    pub seed: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            repeats: REPEATS,
            temperature: TemperatureSchedule::default(),
            resign_depth: RESIGN_DEPTH,
            seed: None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Performance {
    pub problem: usize,
    pub repeats: u32,
    pub score: u64,
}

impl Performance {
    /// Mean depth over the repeats.
    pub fn mean_depth(&self) -> f64 {
        self.score as f64 / self.repeats as f64
    }
}

/// Self-play of one problem.
///
/// `step` is called repeatedly with the evaluation of the observation it
/// last returned until it returns `None`. The first call, and any call that
/// follows a `None`, ignores its arguments.
pub struct SelfPlay<E: Environment> {
    env: E,
    problem: usize,
    phase: Phase,
    run: Option<Run>,
}

/// Everything a non-trivial problem needs while it is played.
struct Run {
    tree: PolicyTree,
    current: NodeId,
    state: Observation,
    resign_depth: u32,
    min_depth: u32,
    max_depth: u32,
    rng: StdRng,
}

impl<E: Environment> SelfPlay<E> {
    pub fn new(mut env: E, problem: usize, settings: &Settings) -> Result<Self, Error> {
        if settings.repeats == 0 {
            return Err(Error::NoRepeats { problem });
        }

        let Some(observation) = env.reset_at(problem).map_err(|e| Error::environment(problem, e))? else {
            info!("problem {problem} is solved without any decision");
            return Ok(SelfPlay {
                env,
                problem,
                phase: Phase::Finished,
                run: None,
            });
        };

        let mut tree = PolicyTree::new(env.action_space(), settings.repeats, problem, settings.temperature.clone());
        let root = tree.root();
        tree.establish_state(root, &observation)?;
        let rng = match settings.seed {
            Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(problem as u64)),
            None => StdRng::from_entropy(),
        };

        Ok(SelfPlay {
            env,
            problem,
            phase: Phase::Running,
            run: Some(Run {
                tree,
                current: root,
                state: observation,
                resign_depth: settings.resign_depth,
                min_depth: settings.resign_depth,
                max_depth: 0,
                rng,
            }),
        })
    }

    pub fn problem(&self) -> usize {
        self.problem
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_finished(&self) -> bool {
        self.phase == Phase::Finished
    }

    pub fn env(&self) -> &E {
        &self.env
    }

    /// `None` for a problem that needed no decision.
    pub fn tree(&self) -> Option<&PolicyTree> {
        self.run.as_ref().map(|run| &run.tree)
    }

    /// Drive the self-play until an observation needs evaluating.
    ///
    /// `policy` holds the raw logits and `eval` the value for the observation
    /// returned by the previous call. Returns `None` once every repeat is
    /// played. An error ends the driver: later calls return `None`.
    pub fn step(&mut self, policy: &[f32], eval: f32) -> Result<Option<Observation>, Error> {
        if self.phase == Phase::Finished {
            return Ok(None);
        }
        let Some(run) = &mut self.run else {
            self.phase = Phase::Finished;
            return Ok(None);
        };

        let result = run.drive(&mut self.env, self.problem, &mut self.phase, policy, eval);
        if result.is_err() {
            self.phase = Phase::Finished;
        }
        result
    }

    /// Terminal depths of the played tree. Only known once every repeat
    /// has finished; `None` before that and for trivial problems.
    pub fn scale(&self) -> Option<Scale> {
        let run = self.run.as_ref().filter(|_| self.phase == Phase::Finished)?;
        // A driver stopped by an error leaves the root with repeats to play.
        if !matches!(run.tree.next_action(run.tree.root()), Ok(None)) {
            return None;
        }
        let root = run.tree.node(run.tree.root());
        Some(Scale {
            min_depth: run.min_depth,
            mean_depth: root.score() as f64 / root.repeats() as f64,
            max_depth: run.max_depth,
        })
    }

    /// Write an example for every expanded node of the tree.
    /// Writes nothing until the driver is finished.
    pub fn write_examples<S: Sink + ?Sized>(&self, sink: &mut S) -> usize {
        match (&self.run, self.scale()) {
            (Some(run), Some(scale)) => collect_examples(&run.tree, &scale, sink),
            _ => 0,
        }
    }

    pub fn performance(&self) -> Performance {
        match &self.run {
            None => Performance {
                problem: self.problem,
                repeats: 1,
                score: 1,
            },
            Some(run) => {
                let root = run.tree.node(run.tree.root());
                Performance {
                    problem: self.problem,
                    repeats: root.repeats(),
                    score: root.score(),
                }
            }
        }
    }
}

impl Run {
    fn drive<E: Environment>(
        &mut self,
        env: &mut E,
        problem: usize,
        phase: &mut Phase,
        policy: &[f32],
        eval: f32,
    ) -> Result<Option<Observation>, Error> {
        loop {
            if !self.tree.node(self.current).is_expanded() {
                self.search(env, problem, phase, policy, eval)?;
                if *phase == Phase::AwaitingEvaluation {
                    return Ok(Some(self.state.clone()));
                }
                let counts = env.visit_counts();
                self.tree.expand(self.current, &counts, &mut self.rng)?;
            }

            let node = self.tree.node(self.current);
            let action = self.tree.next_action(self.current)?.ok_or(Error::Exhausted {
                problem,
                depth: node.depth(),
            })?;
            let repeats = node.repeat_count(action);
            let reached = node.depth() + 1;

            let step = env.step(action).map_err(|e| Error::environment(problem, e))?;
            if step.done || reached >= self.resign_depth {
                self.min_depth = self.min_depth.min(reached);
                self.max_depth = self.max_depth.max(reached);
                if self.tree.advance(self.current, u64::from(reached) * u64::from(repeats))?.is_none() {
                    let root = self.tree.node(self.tree.root());
                    info!(
                        "problem {problem}: finished {} repeats with score {}, depths {}..={}",
                        root.repeats(),
                        root.score(),
                        self.min_depth,
                        self.max_depth
                    );
                    *phase = Phase::Finished;
                    return Ok(None);
                }
                self.current = self.tree.root();
                self.state = env
                    .reset_at(problem)
                    .map_err(|e| Error::environment(problem, e))?
                    .ok_or(Error::Reset { problem })?;
            } else {
                let child = self
                    .tree
                    .node(self.current)
                    .child(action)
                    .ok_or(Error::MissingChild { problem, action })?;
                if self.tree.node(child).state().is_none() {
                    self.tree.establish_state(child, &step.observation)?;
                }
                self.current = child;
                self.state = step.observation;
            }
        }
    }

    /// Run the environment's search at the current node.
    /// Leaves `phase` at `AwaitingEvaluation` when `self.state` must be evaluated first.
    fn search<E: Environment>(
        &mut self,
        env: &mut E,
        problem: usize,
        phase: &mut Phase,
        policy: &[f32],
        eval: f32,
    ) -> Result<(), Error> {
        let mut needs_evaluation = true;
        let mut needs_simulation = true;
        while needs_evaluation || needs_simulation {
            if needs_evaluation {
                if *phase == Phase::Running {
                    *phase = Phase::AwaitingEvaluation;
                    return Ok(());
                }
                // The caller has just evaluated `self.state`.
                *phase = Phase::Running;
            }
            let policy = softmax(policy).ok_or(Error::EmptyPolicy { problem })?;
            let simulation = env.simulate(&policy, eval).map_err(|e| Error::environment(problem, e))?;
            self.state = simulation.observation;
            needs_evaluation = simulation.needs_evaluation;
            needs_simulation = simulation.needs_simulation;
        }
        debug!(
            "problem {problem}: search done at depth {}",
            self.tree.node(self.current).depth()
        );
        Ok(())
    }
}
