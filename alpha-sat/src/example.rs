use std::collections::VecDeque;

use log::debug;

use crate::{config::MAX_EXAMPLES, policy::PolicyTree, repr::SparseState};

/// One labelled position of a self-played tree.
#[derive(Clone, Debug, PartialEq)]
pub struct Example {
    pub problem: usize,
    pub state: SparseState,
    pub policy: Vec<f32>,
    pub score: f32,
    /// Number of rollouts that passed through the position.
    pub weight: u32,
}

/// Anything that accepts finished examples.
pub trait Sink {
    fn add(&mut self, example: Example);
}

impl Sink for Vec<Example> {
    fn add(&mut self, example: Example) {
        self.push(example);
    }
}

/// Keeps only the latest `capacity` examples.
#[derive(Clone, Debug)]
pub struct ExampleBuffer {
    capacity: usize,
    examples: VecDeque<Example>,
}

impl ExampleBuffer {
    pub fn new(capacity: usize) -> Self {
        ExampleBuffer {
            capacity,
            examples: VecDeque::with_capacity(capacity.min(MAX_EXAMPLES)),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.examples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.examples.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Example> {
        self.examples.iter()
    }

    /// Averages over the buffered examples, `None` when there are none.
    pub fn summary(&self) -> Option<Summary> {
        if self.examples.is_empty() {
            return None;
        }
        let count = self.examples.len() as f64;
        let entropy = |policy: &[f32]| -> f64 {
            policy
                .iter()
                .filter(|&&p| p > 0.0)
                .map(|&p| -f64::from(p) * f64::from(p).ln())
                .sum()
        };
        Some(Summary {
            examples: self.examples.len(),
            rollouts: self.iter().map(|e| u64::from(e.weight)).sum(),
            mean_score: self.iter().map(|e| f64::from(e.score)).sum::<f64>() / count,
            mean_entropy: self.iter().map(|e| entropy(&e.policy)).sum::<f64>() / count,
            mean_entries: self.iter().map(|e| e.state.entries.len()).sum::<usize>() as f64 / count,
        })
    }
}

/// What a buffer of examples looks like.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Summary {
    pub examples: usize,
    /// Rollouts summed over every example's position.
    pub rollouts: u64,
    pub mean_score: f64,
    /// Mean entropy of the policy targets, in nats.
    pub mean_entropy: f64,
    /// Mean number of nonzero observation entries per state.
    pub mean_entries: f64,
}

impl Default for ExampleBuffer {
    fn default() -> Self {
        Self::new(MAX_EXAMPLES)
    }
}

impl Sink for ExampleBuffer {
    fn add(&mut self, example: Example) {
        if self.capacity == 0 {
            return;
        }
        if self.examples.len() == self.capacity {
            self.examples.pop_front();
        }
        self.examples.push_back(example);
    }
}

/// Depth statistics of one problem's terminals.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Scale {
    pub min_depth: u32,
    pub mean_depth: f64,
    pub max_depth: u32,
}

impl Scale {
    /// Maps an average depth to `[-1, 1]`, positive when shallower than the mean.
    pub fn score(&self, average: f64) -> f32 {
        (3.0 * (self.mean_depth - average) / self.mean_depth).tanh() as f32
    }
}

/// Emit an example for every expanded node, children before parents.
/// Returns how many were written.
pub fn collect_examples<S: Sink + ?Sized>(tree: &PolicyTree, scale: &Scale, sink: &mut S) -> usize {
    let mut written = 0;
    for id in tree.post_order() {
        let node = tree.node(id);
        let (Some(state), Some(policy)) = (node.state(), node.policy()) else {
            continue;
        };
        let average = node.score() as f64 / node.repeats() as f64;
        sink.add(Example {
            problem: tree.problem(),
            state: state.clone(),
            policy: policy.iter().map(|&p| p as f32).collect(),
            score: scale.score(average),
            weight: node.repeats(),
        });
        written += 1;
    }
    debug!("problem {}: wrote {written} examples with {scale:?}", tree.problem());
    written
}
