use std::{fmt::Debug, sync::Arc};

use crate::config::{EXPLOIT_TEMPERATURE, TEMPERATURE, TEMPERATURE_DEPTH};

/// Maps the depth of a node to the temperature used for its policy target.
#[derive(Clone)]
pub struct TemperatureSchedule(Arc<dyn Fn(u32) -> f64 + Send + Sync>);

impl TemperatureSchedule {
    pub fn new<F>(schedule: F) -> Self
    where
        F: Fn(u32) -> f64 + Send + Sync + 'static,
    {
        TemperatureSchedule(Arc::new(schedule))
    }

    pub fn constant(temperature: f64) -> Self {
        Self::new(move |_| temperature)
    }

    /// `high` above `depth`, `low` from `depth` on.
    pub fn step(high: f64, low: f64, depth: u32) -> Self {
        Self::new(move |d| if d < depth { high } else { low })
    }

    pub fn at(&self, depth: u32) -> f64 {
        (self.0)(depth)
    }
}

impl Default for TemperatureSchedule {
    fn default() -> Self {
        Self::step(TEMPERATURE, EXPLOIT_TEMPERATURE, TEMPERATURE_DEPTH)
    }
}

impl Debug for TemperatureSchedule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "TemperatureSchedule(τ(0) = {})", self.at(0))
    }
}
