use std::collections::BTreeSet;

use sat::{Literal, Solver, Status};

use super::node::Node;
use crate::config::{DISCOUNT, EXPLORATION_BASE, EXPLORATION_INIT, FINISHED_REWARD};

pub fn exploration_rate(n: f32) -> f32 {
    ((1.0 + n + EXPLORATION_BASE) / EXPLORATION_BASE).ln() + EXPLORATION_INIT
}

/// Outcome of one descent through the tree.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Rollout {
    /// Stopped on a node that needs an evaluation before it can be expanded.
    Pending,
    /// Reached a decided formula. Carries the reward as seen by the caller.
    Finished(f32),
}

impl Node {
    /// Descend until an unexpanded or decided position.
    /// `solver` is left at that position and `path` holds the child indices taken.
    #[must_use]
    pub fn virtual_rollout(&mut self, solver: &mut Solver, path: &mut Vec<usize>) -> Rollout {
        let rollout = if self.is_initialized() {
            // We've been here before - recurse if we can.
            match self.status {
                Status::Ongoing => self.select(solver, path),
                _ => Rollout::Finished(FINISHED_REWARD),
            }
        } else {
            // Uninitialized node - initialize it and stop recursion.
            self.status = solver.status();
            if self.status == Status::Ongoing {
                let actions: BTreeSet<usize> = solver
                    .active_clauses()
                    .into_iter()
                    .flatten()
                    .map(Literal::action)
                    .collect();
                let temp_policy = 1.0 / actions.len() as f32;
                self.children = actions.into_iter().map(|a| (a, Node::new(temp_policy))).collect();
                Rollout::Pending
            } else {
                Rollout::Finished(FINISHED_REWARD)
            }
        };

        match rollout {
            Rollout::Finished(reward) => self.update_concrete(reward),
            // We've cut the recursion short of a decided node - count a virtual visit.
            Rollout::Pending => self.virtual_visits += 1,
        }

        rollout
    }

    /// Replace the virtual visits along `path` with the evaluation of its last node.
    pub fn devirtualize_path<I: Iterator<Item = usize>>(&mut self, path: &mut I, policy: &[f32], eval: f32) -> f32 {
        self.virtual_visits -= 1;

        let reward = if let Some(index) = path.next() {
            DISCOUNT * self.children[index].1.devirtualize_path(path, policy, eval)
        } else {
            // Replace the temporary policies, renormalised over the valid actions.
            let total: f32 = self.children.iter().map(|(action, _)| policy[*action]).sum();
            if total > 0.0 {
                for (action, child) in &mut self.children {
                    child.policy = policy[*action] / total;
                }
            }
            eval
        };

        self.update_concrete(reward);
        reward
    }

    fn select(&mut self, solver: &mut Solver, path: &mut Vec<usize>) -> Rollout {
        let visit_count = self.visit_count();
        let upper_confidence_bound = |child: &Node| -> f32 {
            // U(s, a) = Q(s, a) + C(s) * P(s, a) * sqrt(N(s)) / (1 + N(s, a))
            child.expected_reward
                + exploration_rate(visit_count) * child.policy * (visit_count.sqrt() / (1.0 + child.visit_count()))
        };

        // Select the node to recurse into.
        let (_ucb, index, action, node) = self
            .children
            .iter_mut()
            .enumerate()
            .map(|(index, (action, child))| (upper_confidence_bound(&*child), index, *action, child))
            .max_by(|(a, ..), (b, ..)| a.total_cmp(b))
            .expect("tried to select on a node without children");
        // Children are unassigned literals of this exact position.
        solver
            .decide(Literal::from_action(action))
            .expect("tried to branch on an assigned literal");
        path.push(index);

        match node.virtual_rollout(solver, path) {
            Rollout::Finished(reward) => Rollout::Finished(DISCOUNT * reward),
            Rollout::Pending => Rollout::Pending,
        }
    }

    fn update_concrete(&mut self, reward: f32) {
        let scaled_reward = self.expected_reward * self.visits as f32;
        self.visits += 1;
        self.expected_reward = (scaled_reward + reward) / self.visits as f32;
    }
}
