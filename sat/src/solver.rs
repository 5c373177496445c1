use std::sync::Arc;

use crate::{DecisionError, Formula, Literal};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Status {
    Ongoing,
    Satisfied,
    Unsatisfiable,
}

#[derive(Clone, Copy, Debug)]
struct Decision {
    trail_start: usize,
    literal: Literal,
    flipped: bool,
}

/// DPLL search where every branching literal is chosen by the caller.
///
/// Unit propagation runs after each decision. A conflict undoes the trail
/// back to the most recent decision whose other branch is still untried and
/// takes that branch instead.
#[derive(Clone, Debug)]
pub struct Solver {
    formula: Arc<Formula>,
    assignment: Vec<Option<bool>>,
    trail: Vec<Literal>,
    decisions: Vec<Decision>,
    decisions_taken: u32,
    status: Status,
}

impl Solver {
    pub fn new(formula: Arc<Formula>) -> Self {
        let mut solver = Solver {
            assignment: vec![None; formula.variables],
            formula,
            trail: Vec::new(),
            decisions: Vec::new(),
            decisions_taken: 0,
            status: Status::Ongoing,
        };
        solver.status = if solver.propagate() {
            solver.current_status()
        } else {
            Status::Unsatisfiable
        };
        solver
    }

    pub fn formula(&self) -> &Formula {
        &self.formula
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn is_finished(&self) -> bool {
        self.status != Status::Ongoing
    }

    pub fn value(&self, literal: Literal) -> Option<bool> {
        self.assignment[literal.var()].map(|v| v == literal.value())
    }

    /// Number of branching decisions made so far, flips excluded.
    pub fn decisions_taken(&self) -> u32 {
        self.decisions_taken
    }

    /// Branch on `literal`, then propagate and backtrack as needed.
    pub fn decide(&mut self, literal: Literal) -> Result<Status, DecisionError> {
        if self.is_finished() {
            return Err(DecisionError::Finished);
        }
        if literal.var() >= self.formula.variables {
            return Err(DecisionError::OutOfRange {
                var: literal.var(),
                variables: self.formula.variables,
            });
        }
        if self.assignment[literal.var()].is_some() {
            return Err(DecisionError::Assigned(literal.var()));
        }

        self.decisions_taken += 1;
        self.decisions.push(Decision {
            trail_start: self.trail.len(),
            literal,
            flipped: false,
        });
        self.assign(literal);

        while !self.propagate() {
            if !self.backtrack() {
                self.status = Status::Unsatisfiable;
                return Ok(self.status);
            }
        }
        self.status = self.current_status();
        Ok(self.status)
    }

    /// Clauses without a true literal, restricted to their unassigned literals.
    pub fn active_clauses(&self) -> Vec<Vec<Literal>> {
        self.formula
            .clauses
            .iter()
            .filter(|clause| !clause.iter().any(|&l| self.value(l) == Some(true)))
            .map(|clause| {
                clause
                    .iter()
                    .copied()
                    .filter(|&l| self.value(l).is_none())
                    .collect()
            })
            .collect()
    }

    fn assign(&mut self, literal: Literal) {
        self.assignment[literal.var()] = Some(literal.value());
        self.trail.push(literal);
    }

    /// Flip the latest untried decision. Returns false when none is left.
    fn backtrack(&mut self) -> bool {
        while let Some(decision) = self.decisions.pop() {
            for literal in self.trail.drain(decision.trail_start..) {
                self.assignment[literal.var()] = None;
            }
            if !decision.flipped {
                self.decisions.push(Decision {
                    literal: !decision.literal,
                    flipped: true,
                    ..decision
                });
                self.assign(!decision.literal);
                return true;
            }
        }
        false
    }

    /// Unit propagation to a fixed point. Returns false on conflict.
    fn propagate(&mut self) -> bool {
        let formula = Arc::clone(&self.formula);
        loop {
            let mut changed = false;
            for clause in &formula.clauses {
                let mut satisfied = false;
                let mut unassigned = None;
                let mut open = 0;
                for &literal in clause {
                    match self.value(literal) {
                        Some(true) => {
                            satisfied = true;
                            break;
                        }
                        Some(false) => {}
                        None => {
                            open += 1;
                            unassigned = Some(literal);
                        }
                    }
                }
                if satisfied {
                    continue;
                }
                match (open, unassigned) {
                    (0, _) => return false,
                    (1, Some(unit)) => {
                        self.assign(unit);
                        changed = true;
                    }
                    _ => {}
                }
            }
            if !changed {
                return true;
            }
        }
    }

    fn current_status(&self) -> Status {
        let satisfied = self
            .formula
            .clauses
            .iter()
            .all(|clause| clause.iter().any(|&l| self.value(l) == Some(true)));
        if satisfied {
            Status::Satisfied
        } else {
            Status::Ongoing
        }
    }
}
