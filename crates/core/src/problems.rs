pub mod steady;
pub mod transient;

pub use steady::SteadyProblem;
pub use transient::TransientProblem;
