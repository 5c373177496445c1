// environment limits
pub const MAX_CLAUSES: usize = 512;
pub const MAX_VARIABLES: usize = 128;

// search
pub const SIMULATIONS: u32 = 100;
pub const EXPLORATION_BASE: f32 = 500.0;
pub const EXPLORATION_INIT: f32 = 4.0;
pub const DISCOUNT: f32 = 0.95;
pub const FINISHED_REWARD: f32 = 1.0;

// self-play
pub const REPEATS: u32 = 100;
pub const RESIGN_DEPTH: u32 = 1_000_000;
pub const TEMPERATURE: f64 = 1.0;
pub const EXPLOIT_TEMPERATURE: f64 = 0.1;
pub const TEMPERATURE_DEPTH: u32 = 10;
pub const WORKERS: usize = 64;

// expansion checks
pub const POLICY_TOLERANCE: f64 = 1e-6;

// examples
pub const MAX_EXAMPLES: usize = 250_000;
