mod error;
mod formula;
mod literal;
mod solver;

pub use error::*;
pub use formula::Formula;
pub use literal::{Literal, Var};
pub use solver::{Solver, Status};
