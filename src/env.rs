use std::fmt::Debug;

use crate::error::PlanError;

/// A state of a finite-horizon process
///
/// States are grouped into time layers of equal size. A state knows its own time index
/// and its slot inside that layer, which together give it a dense position in the state space.
pub trait LayeredState: Copy + Eq + Debug {
    /// Time index in `[0, T]`
    fn time(&self) -> usize;

    /// Position of the state inside its time layer, in `[0, layer_size)`
    fn slot(&self) -> usize;
}

/// Represents a deterministic, finite-horizon Markov decision process with an irreversibility signal.
///
/// Every transition advances time by exactly one step, so the process is acyclic and ends
/// at the horizon `T`. All methods must be pure: the same arguments always give the same result.
pub trait Environment {
    /// A representation of the state of the environment
    type State: LayeredState;

    /// A representation of an action that an agent can take to affect the environment
    ///
    /// The `Ord` implementation is the fixed priority order used to break ties between equally valued actions.
    type Action: Copy + Ord + Debug;

    /// The number of time steps before the process terminates
    fn horizon(&self) -> usize;

    /// The designated initial state, which must be non-terminal
    fn start_state(&self) -> Self::State;

    /// Determine if a state is terminal
    fn is_terminal(&self, state: &Self::State) -> bool {
        state.time() >= self.horizon()
    }

    /// Immediate reward for taking `action` at `state`
    ///
    /// **Errors** if the action is not defined at the state
    fn reward(&self, state: &Self::State, action: Self::Action) -> Result<f64, PlanError>;

    /// Deterministic successor of `state` under `action`
    ///
    /// **Errors** if the action is not defined at the state or the state is terminal
    fn transition(
        &self,
        state: &Self::State,
        action: Self::Action,
    ) -> Result<Self::State, PlanError>;

    /// Magnitude of irreversible harm caused by taking `action` at `state`, in `[0, 1]`
    ///
    /// This is independent of the reward, so the same environment can be solved under different penalty weights.
    ///
    /// **Errors** if the action is not defined at the state
    fn delta_omega(&self, state: &Self::State, action: Self::Action) -> Result<f64, PlanError>;
}

/// An environment whose state space can be enumerated layer by layer
pub trait DiscreteStateSpace: Environment {
    /// Number of states in every time layer
    fn layer_size(&self) -> usize;

    /// All states with time index `t`, in slot order
    fn layer(&self, t: usize) -> Vec<Self::State>;

    /// All states of the process, in time-major slot order
    fn states(&self) -> Vec<Self::State> {
        (0..=self.horizon()).flat_map(|t| self.layer(t)).collect()
    }
}

/// An environment with a finite set of actions at every state
pub trait DiscreteActionSpace: Environment {
    /// Get the available actions at a state
    ///
    /// The result is empty exactly at terminal states. Its order carries no meaning.
    fn actions(&self, state: &Self::State) -> Vec<Self::Action>;
}
