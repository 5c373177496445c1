use ndarray::{Array3, Axis};
use sat::Solver;

/// Raw observation: `clauses x variables x polarity`.
pub type Observation = Array3<f32>;

/// Shape limits the environment pads every observation to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Limits {
    pub max_clauses: usize,
    pub max_variables: usize,
}

impl Limits {
    pub fn actions(&self) -> usize {
        2 * self.max_variables
    }
}

impl Default for Limits {
    fn default() -> Self {
        Limits {
            max_clauses: crate::config::MAX_CLAUSES,
            max_variables: crate::config::MAX_VARIABLES,
        }
    }
}

/// Creates an observation of the clauses that are not yet satisfied.
/// Row `i` marks the unassigned literals of the `i`-th such clause.
pub fn solver_repr(solver: &Solver, limits: Limits) -> Observation {
    let mut observation = Array3::zeros((limits.max_clauses, limits.max_variables, 2));
    for (row, clause) in solver.active_clauses().into_iter().take(limits.max_clauses).enumerate() {
        for literal in clause {
            observation[[row, literal.var(), literal.is_negated() as usize]] = 1.0;
        }
    }
    observation
}

/// Number of actions an observation describes.
pub fn actions(observation: &Observation) -> usize {
    let shape = observation.shape();
    shape[1] * shape[2]
}

/// An action is valid when some row of the observation fires for it.
pub fn valid_mask(observation: &Observation) -> Vec<bool> {
    observation
        .map_axis(Axis(0), |lane| lane.iter().any(|&x| x != 0.0))
        .iter()
        .copied()
        .collect()
}

/// Sparse copy of an observation flattened to `rows x actions`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SparseState {
    pub rows: usize,
    pub columns: usize,
    pub entries: Vec<(u32, u32, f32)>,
}

impl SparseState {
    pub fn from_observation(observation: &Observation) -> Self {
        let (rows, variables, polarities) = observation.dim();
        let entries = observation
            .indexed_iter()
            .filter(|&(_, &x)| x != 0.0)
            .map(|((row, var, polarity), &x)| (row as u32, (var * polarities + polarity) as u32, x))
            .collect();
        SparseState {
            rows,
            columns: variables * polarities,
            entries,
        }
    }
}
