use std::fmt::Debug;

use crate::{
    env::{Environment, LayeredState},
    error::PlanError,
};

use super::Plan;

/// A single transition taken while following a plan
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Step<S, A> {
    /// The state before the action is taken
    pub state: S,
    /// The action chosen by the plan
    pub action: A,
    /// The reward received for the action
    pub reward: f64,
    /// The irreversible harm caused by the action
    pub delta_omega: f64,
    /// The state after the action is taken
    pub next_state: S,
}

/// The path traced by following a plan from the start state to the horizon
#[derive(Debug, Clone, PartialEq)]
pub struct Trajectory<S, A> {
    pub steps: Vec<Step<S, A>>,
    pub final_state: S,
}

impl<S, A: Copy> Trajectory<S, A> {
    /// Undiscounted sum of rewards
    pub fn total_reward(&self) -> f64 {
        self.steps.iter().map(|s| s.reward).sum()
    }

    /// Sum of irreversible harm along the path
    pub fn total_delta_omega(&self) -> f64 {
        self.steps.iter().map(|s| s.delta_omega).sum()
    }

    /// Discounted sum of rewards, without the irreversibility penalty
    pub fn discounted_return(&self, gamma: f64) -> f64 {
        self.steps
            .iter()
            .rev()
            .fold(0.0, |acc, s| s.reward + gamma * acc)
    }

    /// The chosen actions, in order
    pub fn actions(&self) -> Vec<A> {
        self.steps.iter().map(|s| s.action).collect()
    }
}

impl<S: LayeredState, A: Copy + Ord + Debug> Plan<S, A> {
    /// Deploy the plan into the environment it was solved for
    ///
    /// **Errors** if the environment leaves the states covered by the plan
    pub fn rollout<E>(&self, env: &E) -> Result<Trajectory<S, A>, PlanError>
    where
        E: Environment<State = S, Action = A>,
    {
        let mut state = self.start_state();
        let mut steps = Vec::with_capacity(env.horizon());

        while !env.is_terminal(&state) {
            let action = self.action(&state).ok_or_else(|| {
                PlanError::InconsistentStateSpace(format!("{state:?} is not covered by the plan"))
            })?;
            let next_state = env.transition(&state, action)?;
            steps.push(Step {
                state,
                action,
                reward: env.reward(&state, action)?,
                delta_omega: env.delta_omega(&state, action)?,
                next_state,
            });
            state = next_state;
        }

        Ok(Trajectory {
            steps,
            final_state: state,
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        algo::solve,
        gym::{Action, BridgeOrchard, BridgeOrchardConfig, OrchardState},
    };

    fn headline_env() -> BridgeOrchard {
        BridgeOrchard::new(BridgeOrchardConfig {
            r_burn: 6.0,
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn baseline_rollout_burns_throughout() {
        let env = headline_env();
        let plan = solve(&env, 0.98, 0.0).unwrap();
        let trajectory = plan.rollout(&env).unwrap();

        assert_eq!(trajectory.steps.len(), 20, "One step per time index");
        assert_eq!(trajectory.actions(), vec![Action::Burn; 20], "Burns every step");
        assert_eq!(trajectory.total_reward(), 120.0, "Total reward correct");
        assert_eq!(trajectory.total_delta_omega(), 20.0, "Scorches the orchard every step");
        assert_eq!(
            trajectory.final_state,
            OrchardState::new(20, false, true),
            "Ends at the horizon"
        );
    }

    #[test]
    fn shaped_rollout_limits_harm() {
        let env = headline_env();
        let plan = solve(&env, 0.98, 3.0).unwrap();
        let trajectory = plan.rollout(&env).unwrap();

        let mut expected = vec![Action::Burn; 20];
        expected[0] = Action::Repair;
        assert_eq!(trajectory.actions(), expected, "Repairs first, then burns");
        assert_eq!(trajectory.total_delta_omega(), 1.0, "Harms the orchard once");
        assert!((trajectory.total_reward() - 113.8).abs() < 1e-9, "Total reward correct");
        for step in &trajectory.steps {
            assert_eq!(step.next_state.t, step.state.t + 1, "Time advances");
        }
    }

    #[test]
    fn discounted_return_matches_value_without_penalty() {
        let env = headline_env();
        let plan = solve(&env, 0.98, 0.0).unwrap();
        let trajectory = plan.rollout(&env).unwrap();
        let start_value = plan.value(&plan.start_state()).unwrap();

        assert!(
            (trajectory.discounted_return(0.98) - start_value).abs() < 1e-9,
            "Return of the optimal path equals the start value"
        );
    }
}
