use std::collections::BTreeMap;

use crate::repr::SparseState;

/// Index of a node inside its `PolicyTree`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(super) usize);

#[derive(Clone, Debug)]
pub(super) struct Expansion {
    pub policy: Vec<f64>,
    pub repeat_counts: Vec<u32>,
}

/// One decision point of a self-play tree.
///
/// `repeats` rollouts of the parent pass through this node. Once expanded,
/// they are split over the children according to a sampled policy target
/// and explored in increasing action order.
#[derive(Clone, Debug)]
pub struct PolicyNode {
    pub(super) repeats: u32,
    pub(super) depth: u32,
    pub(super) parent: Option<NodeId>,
    pub(super) children: BTreeMap<usize, NodeId>,
    pub(super) cursor: usize,
    pub(super) score: u64,
    pub(super) state: Option<SparseState>,
    pub(super) valid: Vec<bool>,
    pub(super) expansion: Option<Expansion>,
}

impl PolicyNode {
    pub(super) fn new(repeats: u32, depth: u32, parent: Option<NodeId>) -> Self {
        PolicyNode {
            repeats,
            depth,
            parent,
            children: BTreeMap::new(),
            cursor: 0,
            score: 0,
            state: None,
            valid: Vec::new(),
            expansion: None,
        }
    }

    pub fn repeats(&self) -> u32 {
        self.repeats
    }

    pub fn depth(&self) -> u32 {
        self.depth
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &BTreeMap<usize, NodeId> {
        &self.children
    }

    pub fn child(&self, action: usize) -> Option<NodeId> {
        self.children.get(&action).copied()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Sum of the scores credited to this node so far.
    pub fn score(&self) -> u64 {
        self.score
    }

    pub fn state(&self) -> Option<&SparseState> {
        self.state.as_ref()
    }

    pub fn valid_mask(&self) -> &[bool] {
        &self.valid
    }

    pub fn is_expanded(&self) -> bool {
        self.expansion.is_some()
    }

    pub fn policy(&self) -> Option<&[f64]> {
        self.expansion.as_ref().map(|e| e.policy.as_slice())
    }

    pub fn repeat_counts(&self) -> Option<&[u32]> {
        self.expansion.as_ref().map(|e| e.repeat_counts.as_slice())
    }

    /// Repeats routed through `action`, zero before expansion.
    pub fn repeat_count(&self, action: usize) -> u32 {
        self.repeat_counts()
            .and_then(|counts| counts.get(action).copied())
            .unwrap_or(0)
    }

    /// First action at or after `from` that is valid and still has repeats.
    pub(super) fn first_actionable(&self, from: usize) -> Option<usize> {
        let counts = &self.expansion.as_ref()?.repeat_counts;
        (from..counts.len()).find(|&action| counts[action] > 0 && self.valid[action])
    }
}
