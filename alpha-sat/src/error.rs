use rand_distr::WeightedError;
use thiserror::Error;

type BoxedError = Box<dyn std::error::Error + Send + Sync>;

/// Contract violations raised while self-playing one problem.
///
/// None of these are recoverable for the problem they name: they mean the
/// environment or the evaluator broke its side of the protocol.
#[derive(Debug, Error)]
pub enum Error {
    #[error("problem {problem}: requested zero repeats")]
    NoRepeats { problem: usize },
    #[error("problem {problem}: expected {expected} actions but got {found}")]
    ActionSpace {
        problem: usize,
        expected: usize,
        found: usize,
    },
    #[error("problem {problem}: node at depth {depth} has no cached state")]
    MissingState { problem: usize, depth: u32 },
    #[error("problem {problem}: node at depth {depth} expanded twice")]
    AlreadyExpanded { problem: usize, depth: u32 },
    #[error("problem {problem}: node at depth {depth} used before expansion")]
    NotExpanded { problem: usize, depth: u32 },
    #[error("problem {problem}: counts {counts:?} put mass outside valid actions {valid:?}")]
    InvalidCounts {
        problem: usize,
        counts: Vec<f64>,
        valid: Vec<bool>,
    },
    #[error("problem {problem}: policy {policy:?} leaks mass outside valid actions {valid:?}")]
    PolicyLeak {
        problem: usize,
        policy: Vec<f64>,
        valid: Vec<bool>,
    },
    #[error("problem {problem}: repeat counts {counts:?} over valid actions {valid:?} do not add up to {repeats}")]
    RepeatMismatch {
        problem: usize,
        repeats: u32,
        counts: Vec<u32>,
        valid: Vec<bool>,
    },
    #[error("problem {problem}: could not sample actions: {source}")]
    Sampling {
        problem: usize,
        #[source]
        source: WeightedError,
    },
    #[error("problem {problem}: node at depth {depth} has no action left to explore")]
    Exhausted { problem: usize, depth: u32 },
    #[error("problem {problem}: no child for action {action}")]
    MissingChild { problem: usize, action: usize },
    #[error("problem {problem}: evaluator returned an empty policy")]
    EmptyPolicy { problem: usize },
    #[error("problem {problem}: environment reports the instance as solved on a later reset")]
    Reset { problem: usize },
    #[error("problem {problem}: environment failed: {source}")]
    Environment {
        problem: usize,
        #[source]
        source: BoxedError,
    },
}

impl Error {
    pub(crate) fn environment<E>(problem: usize, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Error::Environment {
            problem,
            source: Box::new(source),
        }
    }
}
