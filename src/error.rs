use std::fmt::Debug;

use thiserror::Error;

/// Errors raised while configuring an environment or solving it
///
/// Every error is fatal: a solve that fails returns no tables at all.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlanError {
    #[error("invalid value for `{name}`: {value}. Must be in {expected}.")]
    InvalidParameter {
        name: &'static str,
        value: f64,
        expected: &'static str,
    },

    #[error("horizon must be greater than zero")]
    EmptyHorizon,

    #[error("environment declares no actions")]
    EmptyActionSet,

    #[error("no actions available at non-terminal state {state}")]
    NoActions { state: String },

    #[error("action {action} is not defined at state {state}")]
    UnknownAction { state: String, action: String },

    #[error("state {state} is terminal and has no successors")]
    TerminalState { state: String },

    #[error("transition {state} --{action}--> {next} does not advance time by one step")]
    NonTerminatingTransition {
        state: String,
        action: String,
        next: String,
    },

    #[error("delta_omega({state}, {action}) = {value} is outside [0, 1]")]
    IrreversibilityOutOfRange {
        state: String,
        action: String,
        value: f64,
    },

    #[error("non-finite value for action {action} at state {state}")]
    NonFiniteValue { state: String, action: String },

    #[error("inconsistent state space: {0}")]
    InconsistentStateSpace(String),

    #[error("solve exceeded its budget of {budget} evaluations")]
    BudgetExhausted { budget: u64 },
}

impl PlanError {
    /// Whether the error was caused by invalid configuration rather than by the environment's dynamics
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::InvalidParameter { .. } | Self::EmptyHorizon | Self::EmptyActionSet
        )
    }

    pub(crate) fn unknown_action(state: &impl Debug, action: &impl Debug) -> Self {
        Self::UnknownAction {
            state: format!("{state:?}"),
            action: format!("{action:?}"),
        }
    }

    pub(crate) fn terminal_state(state: &impl Debug) -> Self {
        Self::TerminalState {
            state: format!("{state:?}"),
        }
    }
}
