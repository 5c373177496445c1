use ndarray::Axis;

use crate::repr::{actions, Observation};

pub type Policy = Vec<f32>;
pub type Eval = f32;

/// Scale applied to the Jeroslow-Wang weights before they are used as logits.
const OCCURRENCE_SCALE: f32 = 8.0;

/// Anything that can turn an observation into raw policy logits and a value.
pub trait Agent {
    fn policy_and_eval(&self, observation: &Observation) -> (Policy, Eval);

    fn policy_eval_batch(&self, observations: &[Observation]) -> Vec<(Policy, Eval)> {
        observations.iter().map(|o| self.policy_and_eval(o)).collect()
    }
}

/// Flat logits and a neutral value.
#[derive(Clone, Copy, Debug, Default)]
pub struct Uniform;

impl Agent for Uniform {
    fn policy_and_eval(&self, observation: &Observation) -> (Policy, Eval) {
        (vec![0.0; actions(observation)], 0.0)
    }
}

/// Jeroslow-Wang style agent: literals in short clauses get high logits and
/// the value grows as fewer clauses remain.
#[derive(Clone, Copy, Debug, Default)]
pub struct Occurrence;

impl Agent for Occurrence {
    fn policy_and_eval(&self, observation: &Observation) -> (Policy, Eval) {
        let (rows, variables, polarities) = observation.dim();
        let mut logits = vec![0.0; variables * polarities];
        let mut active = 0;
        for clause in observation.axis_iter(Axis(0)) {
            let len = clause.iter().filter(|&&x| x != 0.0).count();
            if len == 0 {
                continue;
            }
            active += 1;
            let weight = 0.5f32.powi(len as i32);
            for ((var, polarity), &x) in clause.indexed_iter() {
                if x != 0.0 {
                    logits[var * polarities + polarity] += OCCURRENCE_SCALE * weight;
                }
            }
        }
        let eval = if rows == 0 { 1.0 } else { 1.0 - active as f32 / rows as f32 };
        (logits, eval)
    }
}
