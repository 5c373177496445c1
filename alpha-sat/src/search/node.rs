use sat::Status;

/// Node of the environment's own search tree over solver positions.
#[derive(Clone, Debug)]
pub struct Node {
    pub policy: f32,
    pub expected_reward: f32,
    pub status: Status,
    pub visits: u32,
    pub virtual_visits: u32,
    pub children: Vec<(usize, Node)>,
}

impl Default for Node {
    fn default() -> Self {
        Node {
            policy: 0.0,
            expected_reward: 0.0,
            status: Status::Ongoing,
            visits: 0,
            virtual_visits: 0,
            children: Vec::new(),
        }
    }
}

impl Node {
    pub fn new(policy: f32) -> Self {
        Node {
            policy,
            ..Default::default()
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.visits != 0 || self.virtual_visits != 0
    }

    pub fn visit_count(&self) -> f32 {
        (self.visits + self.virtual_visits) as f32
    }

    /// Concrete visits spread over the children.
    pub fn explored(&self) -> u32 {
        self.children.iter().map(|(_, child)| child.visits).sum()
    }

    /// Get the sub-tree for the given action.
    /// Unknown actions give a fresh node.
    #[must_use]
    pub fn play(self, action: usize) -> Node {
        self.children
            .into_iter()
            .find(|(a, _)| *a == action)
            .map(|(_, child)| child)
            .unwrap_or_default()
    }
}
