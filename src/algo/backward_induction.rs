use crate::{
    ds::{PolicyTable, StateIndex, Table, ValueTable},
    env::{DiscreteActionSpace, DiscreteStateSpace, Environment, LayeredState},
    error::PlanError,
};

/// Configuration for the [`BackwardInduction`] solver
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BackwardInductionConfig {
    /// Discount factor applied to the value of the successor state, in `(0, 1]`
    ///
    /// **Default**: `0.98`
    pub gamma: f64,
    /// Weight of the irreversibility penalty subtracted from every reward, at least `0`
    ///
    /// **Default**: `0.0`
    pub lambda: f64,
    /// Upper bound on the number of states indexed and on the number of state-action pairs evaluated
    ///
    /// **Default**: `None`, no bound
    pub budget: Option<u64>,
}

impl Default for BackwardInductionConfig {
    fn default() -> Self {
        Self {
            gamma: 0.98,
            lambda: 0.0,
            budget: None,
        }
    }
}

impl BackwardInductionConfig {
    /// **Errors** if `gamma` is not in `(0, 1]` or `lambda` is negative or not finite
    pub fn validate(&self) -> Result<(), PlanError> {
        ensure_param!(gamma = self.gamma, gamma > 0.0 && gamma <= 1.0, "(0, 1]");
        ensure_param!(
            lambda = self.lambda,
            lambda >= 0.0 && lambda.is_finite(),
            "[0, inf)"
        );
        Ok(())
    }
}

/// Exact finite-horizon planner
///
/// Computes the optimal value and policy of every state by dynamic programming, sweeping
/// from the horizon back to time 0. The utility of an action is its reward minus `lambda` times
/// its irreversibility signal:
///
/// Q(s, a) = r(s, a) - λ·Δω(s, a) + γ·V(s')
///
/// Actions are scanned in priority order and only a strictly greater value displaces the
/// incumbent, so ties always go to the highest-priority action. The solver holds no state
/// between calls; every solve is a pure function of the environment and the configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct BackwardInduction {
    config: BackwardInductionConfig,
}

impl BackwardInduction {
    /// Initialize a new solver
    ///
    /// **Errors** if the configuration is invalid
    pub fn new(config: BackwardInductionConfig) -> Result<Self, PlanError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &BackwardInductionConfig {
        &self.config
    }

    /// Solve an environment
    ///
    /// **Errors** on the first inconsistency met: no partially filled tables are ever returned
    pub fn solve<E>(&self, env: &E) -> Result<Plan<E::State, E::Action>, PlanError>
    where
        E: Environment + DiscreteStateSpace + DiscreteActionSpace,
    {
        let BackwardInductionConfig {
            gamma,
            lambda,
            budget,
        } = self.config;
        let horizon = env.horizon();
        if horizon == 0 {
            return Err(PlanError::EmptyHorizon);
        }
        log::debug!("backward induction: horizon={horizon}, gamma={gamma}, lambda={lambda}");

        let index = StateIndex::build(env, budget)?;
        let layer_size = index.layer_size();
        let decisions = horizon * layer_size;

        // Terminal layer keeps its zero value
        let mut values = vec![0.0; index.len()];
        let mut policy = vec![None; decisions];
        let mut evaluations: u64 = 0;

        for t in (0..horizon).rev() {
            for (slot, &state) in index.layer(t).iter().enumerate() {
                let ix = t * layer_size + slot;
                let mut actions = env.actions(&state);
                actions.sort_unstable();
                actions.dedup();
                if actions.is_empty() {
                    return Err(PlanError::NoActions {
                        state: format!("{state:?}"),
                    });
                }

                let mut best: Option<(f64, E::Action)> = None;
                for action in actions {
                    evaluations += 1;
                    if let Some(budget) = budget {
                        if evaluations > budget {
                            return Err(PlanError::BudgetExhausted { budget });
                        }
                    }

                    let step = evaluate(env, &state, action, lambda)?;
                    let next = index.position(&step.next).ok_or_else(|| {
                        PlanError::InconsistentStateSpace(format!(
                            "successor {:?} of {state:?} is outside the state space",
                            step.next
                        ))
                    })?;
                    let q = step.utility + gamma * values[next];
                    if !q.is_finite() {
                        return Err(non_finite(&state, &action));
                    }
                    if best.map_or(true, |(value, _)| q > value) {
                        best = Some((q, action));
                    }
                }

                if let Some((value, action)) = best {
                    values[ix] = value;
                    policy[ix] = Some(action);
                }
            }
            log::trace!("backward induction: layer {t} solved");
        }

        let policy = policy
            .into_iter()
            .collect::<Option<Vec<_>>>()
            .ok_or_else(|| PlanError::InconsistentStateSpace(String::from("unsolved state")))?;

        let start = env.start_state();
        let start_action = index
            .position(&start)
            .and_then(|ix| policy.get(ix).copied())
            .ok_or_else(|| {
                PlanError::InconsistentStateSpace(format!(
                    "start state {start:?} is not a decision state"
                ))
            })?;

        log::info!(
            "backward induction: {} states, {evaluations} evaluations, gamma={gamma}, lambda={lambda}, start action {start_action:?}",
            index.len()
        );

        Ok(Plan {
            policy: Table::new(index.truncate(horizon), policy),
            values: Table::new(index, values),
            gamma,
            lambda,
            start,
            evaluations,
        })
    }
}

/// Solve an environment with the given discount factor and penalty weight
///
/// **Errors** if the parameters are invalid or the environment is inconsistent
pub fn solve<E>(env: &E, gamma: f64, lambda: f64) -> Result<Plan<E::State, E::Action>, PlanError>
where
    E: Environment + DiscreteStateSpace + DiscreteActionSpace,
{
    BackwardInduction::new(BackwardInductionConfig {
        gamma,
        lambda,
        ..Default::default()
    })?
    .solve(env)
}

/// The outcome of one solve: optimal values and actions under a fixed `gamma` and `lambda`
///
/// Immutable once returned.
#[derive(Debug, Clone, PartialEq)]
pub struct Plan<S, A> {
    values: ValueTable<S>,
    policy: PolicyTable<S, A>,
    gamma: f64,
    lambda: f64,
    start: S,
    evaluations: u64,
}

impl<S: LayeredState, A: Copy + Ord + std::fmt::Debug> Plan<S, A> {
    /// Optimal value of every state, terminal states included
    pub fn values(&self) -> &ValueTable<S> {
        &self.values
    }

    /// Optimal action of every non-terminal state
    pub fn policy(&self) -> &PolicyTable<S, A> {
        &self.policy
    }

    pub fn value(&self, state: &S) -> Option<f64> {
        self.values.get(state).copied()
    }

    pub fn action(&self, state: &S) -> Option<A> {
        self.policy.get(state).copied()
    }

    pub fn start_state(&self) -> S {
        self.start
    }

    /// The optimal action at the environment's start state
    pub fn start_action(&self) -> A {
        self.policy[&self.start]
    }

    pub fn gamma(&self) -> f64 {
        self.gamma
    }

    pub fn lambda(&self) -> f64 {
        self.lambda
    }

    /// Number of state-action pairs evaluated by the solve
    pub fn evaluations(&self) -> u64 {
        self.evaluations
    }

    /// Value of taking `action` at `state` and acting optimally afterwards, under this plan's `gamma` and `lambda`
    ///
    /// **Errors** if the action is undefined, the state is terminal, or the successor is not covered by the plan
    pub fn action_value<E>(&self, env: &E, state: &S, action: A) -> Result<f64, PlanError>
    where
        E: Environment<State = S, Action = A>,
    {
        let step = evaluate(env, state, action, self.lambda)?;
        let next = self.value(&step.next).ok_or_else(|| {
            PlanError::InconsistentStateSpace(format!(
                "successor {:?} of {state:?} is not covered by the plan",
                step.next
            ))
        })?;
        Ok(step.utility + self.gamma * next)
    }
}

/// Penalised one-step outcome of an action
struct Evaluation<S> {
    utility: f64,
    next: S,
}

fn evaluate<E>(
    env: &E,
    state: &E::State,
    action: E::Action,
    lambda: f64,
) -> Result<Evaluation<E::State>, PlanError>
where
    E: Environment,
{
    if env.is_terminal(state) {
        return Err(PlanError::terminal_state(state));
    }

    let reward = env.reward(state, action)?;
    let delta_omega = env.delta_omega(state, action)?;
    if !(0.0..=1.0).contains(&delta_omega) {
        return Err(PlanError::IrreversibilityOutOfRange {
            state: format!("{state:?}"),
            action: format!("{action:?}"),
            value: delta_omega,
        });
    }

    let next = env.transition(state, action)?;
    if next.time() != state.time() + 1 {
        return Err(PlanError::NonTerminatingTransition {
            state: format!("{state:?}"),
            action: format!("{action:?}"),
            next: format!("{next:?}"),
        });
    }

    let utility = reward - lambda * delta_omega;
    if !utility.is_finite() {
        return Err(non_finite(state, &action));
    }

    Ok(Evaluation { utility, next })
}

fn non_finite(state: &impl std::fmt::Debug, action: &impl std::fmt::Debug) -> PlanError {
    PlanError::NonFiniteValue {
        state: format!("{state:?}"),
        action: format!("{action:?}"),
    }
}
