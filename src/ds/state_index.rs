use crate::{
    env::{DiscreteStateSpace, LayeredState},
    error::PlanError,
};

/// A dense bijection between the states of a layered state space and `0..len`
///
/// States are stored in an arena in time-major slot order, so the position of a state
/// is `time * layer_size + slot` and no hashing is needed to look one up.
#[derive(Debug, Clone, PartialEq)]
pub struct StateIndex<S> {
    layer_size: usize,
    states: Vec<S>,
}

impl<S: LayeredState> StateIndex<S> {
    /// Enumerate every layer of an environment into an index
    ///
    /// Optionally, `limit` bounds the number of states, failing before any enumeration happens.
    ///
    /// **Errors** if a layer has the wrong size, a state reports the wrong time or slot,
    /// or `is_terminal` does not hold exactly on the last layer
    pub fn build<E>(env: &E, limit: Option<u64>) -> Result<Self, PlanError>
    where
        E: DiscreteStateSpace<State = S>,
    {
        let layer_size = env.layer_size();
        let horizon = env.horizon();
        if layer_size == 0 {
            return Err(PlanError::InconsistentStateSpace(String::from(
                "layers are empty",
            )));
        }
        let len = horizon
            .checked_add(1)
            .and_then(|layers| layers.checked_mul(layer_size))
            .ok_or_else(|| PlanError::InconsistentStateSpace(String::from("too many states")))?;
        if let Some(limit) = limit {
            if len as u64 > limit {
                return Err(PlanError::BudgetExhausted { budget: limit });
            }
        }

        let mut states = Vec::with_capacity(len);
        for t in 0..=horizon {
            let layer = env.layer(t);
            if layer.len() != layer_size {
                return Err(PlanError::InconsistentStateSpace(format!(
                    "layer {t} has {} states, expected {layer_size}",
                    layer.len()
                )));
            }
            for (slot, state) in layer.into_iter().enumerate() {
                if state.time() != t || state.slot() != slot {
                    return Err(PlanError::InconsistentStateSpace(format!(
                        "{state:?} enumerated at time {t}, slot {slot}"
                    )));
                }
                if env.is_terminal(&state) != (t == horizon) {
                    return Err(PlanError::InconsistentStateSpace(format!(
                        "{state:?} must be terminal exactly at the horizon"
                    )));
                }
                states.push(state);
            }
        }

        Ok(Self { layer_size, states })
    }

    /// Position of a state, or `None` if it is not part of the index
    pub fn position(&self, state: &S) -> Option<usize> {
        let slot = state.slot();
        if slot >= self.layer_size {
            return None;
        }
        let ix = state.time().checked_mul(self.layer_size)?.checked_add(slot)?;
        (self.states.get(ix) == Some(state)).then_some(ix)
    }

    /// The states of time layer `t`
    pub fn layer(&self, t: usize) -> &[S] {
        let start = (t * self.layer_size).min(self.states.len());
        let end = (start + self.layer_size).min(self.states.len());
        &self.states[start..end]
    }

    /// An index over the first `layers` time layers only
    pub(crate) fn truncate(&self, layers: usize) -> Self {
        let len = (layers * self.layer_size).min(self.states.len());
        Self {
            layer_size: self.layer_size,
            states: self.states[..len].to_vec(),
        }
    }
}

impl<S> StateIndex<S> {
    /// Number of states in each time layer
    pub fn layer_size(&self) -> usize {
        self.layer_size
    }

    /// Number of time layers
    pub fn layers(&self) -> usize {
        self.states.len() / self.layer_size.max(1)
    }

    /// Number of indexed states
    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Get a slice view of the arena
    pub fn view(&self) -> &[S] {
        &self.states
    }
}
