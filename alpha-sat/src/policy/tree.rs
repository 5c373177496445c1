use log::debug;
use rand::Rng;
use rand_distr::{Distribution, WeightedIndex};

use super::{
    node::{Expansion, NodeId, PolicyNode},
    temperature::TemperatureSchedule,
};
use crate::{
    config::POLICY_TOLERANCE,
    error::Error,
    math::{repeat_counts, sharpen},
    repr::{actions, valid_mask, Observation, SparseState},
};

/// Self-play tree of one problem.
///
/// Nodes live in an arena and refer to each other by `NodeId`. Parents own
/// their children through `children`; the `parent` link is only used to
/// climb back up while backpropagating.
#[derive(Clone, Debug)]
pub struct PolicyTree {
    actions: usize,
    problem: usize,
    temperature: TemperatureSchedule,
    nodes: Vec<PolicyNode>,
}

impl PolicyTree {
    pub fn new(actions: usize, repeats: u32, problem: usize, temperature: TemperatureSchedule) -> Self {
        PolicyTree {
            actions,
            problem,
            temperature,
            nodes: vec![PolicyNode::new(repeats, 0, None)],
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn node(&self, id: NodeId) -> &PolicyNode {
        &self.nodes[id.0]
    }

    pub fn problem(&self) -> usize {
        self.problem
    }

    pub fn actions(&self) -> usize {
        self.actions
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Cache the observation of a node and derive its valid actions.
    pub fn establish_state(&mut self, id: NodeId, observation: &Observation) -> Result<(), Error> {
        let problem = self.problem;
        let found = actions(observation);
        if found != self.actions {
            return Err(Error::ActionSpace {
                problem,
                expected: self.actions,
                found,
            });
        }
        let node = &mut self.nodes[id.0];
        if node.is_expanded() {
            return Err(Error::AlreadyExpanded {
                problem,
                depth: node.depth,
            });
        }
        node.valid = valid_mask(observation);
        node.state = Some(SparseState::from_observation(observation));
        Ok(())
    }

    /// Turn visit counts into a policy target and split the node's repeats
    /// over its children by sampling from it.
    pub fn expand<R: Rng + ?Sized>(&mut self, id: NodeId, counts: &[f64], rng: &mut R) -> Result<(), Error> {
        let problem = self.problem;
        self.expand_with(id, counts, |weights, repeats| {
            let distribution = WeightedIndex::new(weights).map_err(|source| Error::Sampling { problem, source })?;
            Ok((0..repeats).map(|_| distribution.sample(rng)).collect())
        })
    }

    /// Like `expand`, but `sample` draws `repeats` actions from the given weights.
    pub(crate) fn expand_with<F>(&mut self, id: NodeId, counts: &[f64], sample: F) -> Result<(), Error>
    where
        F: FnOnce(&[f64], u32) -> Result<Vec<usize>, Error>,
    {
        let problem = self.problem;
        let node = &self.nodes[id.0];
        let depth = node.depth;
        if node.is_expanded() {
            return Err(Error::AlreadyExpanded { problem, depth });
        }
        if node.state.is_none() {
            return Err(Error::MissingState { problem, depth });
        }
        if counts.len() != self.actions {
            return Err(Error::ActionSpace {
                problem,
                expected: self.actions,
                found: counts.len(),
            });
        }
        let valid = &node.valid;
        if counts.iter().zip(valid).any(|(&count, &valid)| count != 0.0 && !valid) {
            return Err(Error::InvalidCounts {
                problem,
                counts: counts.to_vec(),
                valid: valid.clone(),
            });
        }

        let policy = sharpen(counts, self.temperature.at(depth));
        let mass: f64 = policy.iter().zip(valid).filter(|&(_, &valid)| valid).map(|(p, _)| p).sum();
        // Written as a negation so that NaN fails too.
        if !(mass > 1.0 - POLICY_TOLERANCE) {
            return Err(Error::PolicyLeak {
                problem,
                policy,
                valid: valid.clone(),
            });
        }

        let weights: Vec<f64> = policy
            .iter()
            .zip(valid)
            .map(|(&p, &valid)| if valid { p } else { 0.0 })
            .collect();
        let samples = sample(&weights, node.repeats)?;
        let counts = repeat_counts(&samples, self.actions);
        let routed: u32 = counts.iter().zip(valid).filter(|&(_, &valid)| valid).map(|(c, _)| c).sum();
        if routed != node.repeats {
            return Err(Error::RepeatMismatch {
                problem,
                repeats: node.repeats,
                counts,
                valid: valid.clone(),
            });
        }

        for (action, &count) in counts.iter().enumerate() {
            if count > 0 {
                let child = NodeId(self.nodes.len());
                self.nodes.push(PolicyNode::new(count, depth + 1, Some(id)));
                self.nodes[id.0].children.insert(action, child);
            }
        }

        let node = &mut self.nodes[id.0];
        node.expansion = Some(Expansion {
            policy,
            repeat_counts: counts,
        });
        node.cursor = node.first_actionable(0).unwrap_or(self.actions);
        debug!(
            "problem {problem}: expanded depth {depth} into {} children over {} repeats",
            node.children.len(),
            node.repeats
        );
        Ok(())
    }

    /// The action the next rollout through `id` takes, `None` once every
    /// child has used up its repeats. Does not move the cursor.
    pub fn next_action(&self, id: NodeId) -> Result<Option<usize>, Error> {
        let node = &self.nodes[id.0];
        if !node.is_expanded() {
            return Err(Error::NotExpanded {
                problem: self.problem,
                depth: node.depth,
            });
        }
        Ok(node.first_actionable(node.cursor))
    }

    /// Credit `score` to the action under the cursor of `id` and move on.
    ///
    /// A node that runs out of actions hands its whole score to its parent,
    /// which then advances in turn. Returns the next action to explore at
    /// the node where climbing stopped, or `None` when the root is exhausted.
    pub fn advance(&mut self, id: NodeId, score: u64) -> Result<Option<usize>, Error> {
        let (mut id, mut score) = (id, score);
        loop {
            let node = &mut self.nodes[id.0];
            if !node.is_expanded() {
                return Err(Error::NotExpanded {
                    problem: self.problem,
                    depth: node.depth,
                });
            }
            if node.cursor >= self.actions {
                return Err(Error::Exhausted {
                    problem: self.problem,
                    depth: node.depth,
                });
            }

            node.score += score;
            if let Some(action) = node.first_actionable(node.cursor + 1) {
                node.cursor = action;
                return Ok(Some(action));
            }
            node.cursor = self.actions;
            match node.parent {
                Some(parent) => {
                    score = node.score;
                    id = parent;
                }
                None => return Ok(None),
            }
        }
    }

    /// Every node, children in increasing action order before their parent.
    pub fn post_order(&self) -> Vec<NodeId> {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut stack = vec![(self.root(), false)];
        while let Some((id, visited)) = stack.pop() {
            if visited {
                order.push(id);
                continue;
            }
            stack.push((id, true));
            stack.extend(self.nodes[id.0].children.values().rev().map(|&child| (child, false)));
        }
        order
    }
}
