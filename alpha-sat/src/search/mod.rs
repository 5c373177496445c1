mod mcts;
mod node;

pub use mcts::{exploration_rate, Rollout};
pub use node::Node;

#[cfg(test)]
mod tests;
