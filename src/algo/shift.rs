use std::fmt::Debug;

use crate::{
    env::{DiscreteActionSpace, DiscreteStateSpace, Environment, LayeredState},
    error::PlanError,
};

use super::{solve, Plan};

/// A decision state where two plans choose different actions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PolicyChange<S, A> {
    pub state: S,
    pub baseline: A,
    pub shaped: A,
}

/// A baseline plan and a penalty-shaped plan solved on the same environment
#[derive(Debug, Clone, PartialEq)]
pub struct PolicyShift<S, A> {
    baseline: Plan<S, A>,
    shaped: Plan<S, A>,
}

impl<S: LayeredState, A: Copy + Ord + Debug> PolicyShift<S, A> {
    /// Solve an environment twice with a shared `gamma`, once per penalty weight
    ///
    /// **Errors** if either solve fails
    pub fn compare<E>(
        env: &E,
        gamma: f64,
        baseline_lambda: f64,
        shaped_lambda: f64,
    ) -> Result<Self, PlanError>
    where
        E: Environment<State = S, Action = A> + DiscreteStateSpace + DiscreteActionSpace,
    {
        let baseline = solve(env, gamma, baseline_lambda)?;
        let shaped = solve(env, gamma, shaped_lambda)?;
        let shift = Self { baseline, shaped };

        log::info!(
            "policy shift: start action {:?} -> {:?}, {} states changed",
            shift.baseline.start_action(),
            shift.shaped.start_action(),
            shift.changes().len()
        );
        Ok(shift)
    }

    pub fn baseline(&self) -> &Plan<S, A> {
        &self.baseline
    }

    pub fn shaped(&self) -> &Plan<S, A> {
        &self.shaped
    }

    /// The `(baseline, shaped)` actions at the start state
    pub fn start_actions(&self) -> (A, A) {
        (self.baseline.start_action(), self.shaped.start_action())
    }

    /// Whether the penalty changed the action at the start state
    pub fn is_shifted(&self) -> bool {
        let (baseline, shaped) = self.start_actions();
        baseline != shaped
    }

    /// Every decision state whose action differs between the plans, in index order
    pub fn changes(&self) -> Vec<PolicyChange<S, A>> {
        self.baseline
            .policy()
            .iter()
            .zip(self.shaped.policy().entries())
            .filter(|((_, baseline), shaped)| baseline != shaped)
            .map(|((&state, &baseline), &shaped)| PolicyChange {
                state,
                baseline,
                shaped,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gym::{Action, BridgeOrchard, BridgeOrchardConfig, OrchardState};

    #[test]
    fn policy_shift_functional() {
        let env = BridgeOrchard::new(BridgeOrchardConfig {
            r_burn: 6.0,
            ..Default::default()
        })
        .unwrap();
        let shift = PolicyShift::compare(&env, 0.98, 0.0, 3.0).unwrap();

        assert!(shift.is_shifted(), "Start action shifts");
        assert_eq!(shift.start_actions(), (Action::Burn, Action::Repair), "Burn becomes repair");
        assert_eq!(shift.baseline().lambda(), 0.0, "Baseline lambda kept");
        assert_eq!(shift.shaped().lambda(), 3.0, "Shaped lambda kept");

        let changes = shift.changes();
        assert!(
            changes.contains(&PolicyChange {
                state: OrchardState::new(0, false, true),
                baseline: Action::Burn,
                shaped: Action::Repair,
            }),
            "Start state listed among the changes"
        );
        for change in &changes {
            assert_ne!(change.baseline, change.shaped, "Only differing states listed");
        }
    }

    #[test]
    fn identical_penalties_do_not_shift() {
        let env = BridgeOrchard::default();
        let shift = PolicyShift::compare(&env, 0.98, 1.0, 1.0).unwrap();
        assert!(!shift.is_shifted(), "Same lambda, same start action");
        assert!(shift.changes().is_empty(), "Same lambda, same policy");
    }
}
