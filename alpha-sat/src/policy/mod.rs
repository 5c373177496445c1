mod node;
mod temperature;
mod tree;

pub use node::{NodeId, PolicyNode};
pub use temperature::TemperatureSchedule;
pub use tree::PolicyTree;
