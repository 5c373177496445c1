pub mod agent;
pub mod config;
pub mod environment;
pub mod example;
pub mod math;
pub mod policy;
pub mod repr;
pub mod search;
pub mod self_play;

mod batch;
mod error;

pub use agent::{Agent, Occurrence, Uniform};
pub use batch::self_play_batch;
pub use environment::{EnvError, Environment, Problems, SatEnv};
pub use error::Error;
pub use example::{Example, ExampleBuffer, Scale, Sink, Summary};
pub use policy::{PolicyTree, TemperatureSchedule};
pub use repr::Limits;
pub use self_play::{Performance, Phase, SelfPlay, Settings};
