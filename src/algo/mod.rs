pub mod backward_induction;
pub mod rollout;
pub mod shift;

pub use backward_induction::{solve, BackwardInduction, BackwardInductionConfig, Plan};
pub use rollout::{Step, Trajectory};
pub use shift::{PolicyChange, PolicyShift};
