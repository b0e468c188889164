use std::fmt;

use strum::{Display, EnumIter, EnumString, VariantArray};

use crate::{
    env::{DiscreteActionSpace, DiscreteStateSpace, Environment, LayeredState},
    error::PlanError,
};

/// Actions available in the [`BridgeOrchard`] environment
///
/// The declaration order is the tie-breaking priority: when two actions are worth
/// exactly the same, the one declared first is chosen.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Display,
    EnumIter,
    EnumString,
    VariantArray,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Action {
    /// Rebuild the bridge, at a cost
    Repair = 0,
    /// Gather fruit, which requires an intact bridge and a living orchard
    Harvest = 1,
    /// Set a fire for a fixed payout
    Burn = 2,
    /// Do nothing
    Wait = 3,
}

/// State `(t, b, o)` of the [`BridgeOrchard`] environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OrchardState {
    /// Time step in `[0, T]`
    pub t: usize,
    /// Whether the bridge is intact
    pub bridge: bool,
    /// Whether the orchard is alive
    pub orchard: bool,
}

impl OrchardState {
    pub fn new(t: usize, bridge: bool, orchard: bool) -> Self {
        Self { t, bridge, orchard }
    }
}

impl LayeredState for OrchardState {
    fn time(&self) -> usize {
        self.t
    }

    fn slot(&self) -> usize {
        (usize::from(self.bridge) << 1) | usize::from(self.orchard)
    }
}

impl fmt::Display for OrchardState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({}, {}, {})",
            self.t,
            u8::from(self.bridge),
            u8::from(self.orchard)
        )
    }
}

/// Harm attributed to a burn, depending on whether the orchard is still alive
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IrreversibilityRule {
    /// `delta_omega` of burning a living orchard
    ///
    /// **Default**: `1.0`
    pub burn_living: f64,
    /// `delta_omega` of burning an orchard that is already dead
    ///
    /// **Default**: `0.0`
    pub burn_dead: f64,
}

impl Default for IrreversibilityRule {
    fn default() -> Self {
        Self {
            burn_living: 1.0,
            burn_dead: 0.0,
        }
    }
}

/// How far a fire reaches when the agent burns
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FireSpread {
    /// The fire reaches the orchard only across an intact bridge. With the bridge down
    /// the orchard is scorched but survives: `o` stays 1, yet the burn still reports
    /// the `burn_living` harm, so `delta_omega` fires on a step that destroys nothing.
    #[default]
    AcrossBridge,
    /// Every burn destroys the orchard
    Unrestricted,
}

/// Configuration for the [`BridgeOrchard`] environment
#[derive(Debug, Clone, PartialEq)]
pub struct BridgeOrchardConfig {
    /// Number of time steps before the process terminates
    ///
    /// **Default**: `20`
    pub horizon: usize,
    /// Reward for harvesting with the bridge intact and the orchard alive
    ///
    /// **Default**: `1.0`
    pub r_harvest: f64,
    /// Reward for repairing the bridge, typically negative
    ///
    /// **Default**: `-0.2`
    pub c_repair: f64,
    /// Reward for burning, paid unconditionally
    ///
    /// **Default**: `5.0`
    pub r_burn: f64,
    /// Reward for waiting
    ///
    /// **Default**: `0.0`
    pub r_wait: f64,
    /// Harm attributed to burning
    pub irreversibility: IrreversibilityRule,
    /// Reach of a fire
    pub fire: FireSpread,
    /// The declared action alphabet
    ///
    /// **Default**: every [`Action`] in priority order
    pub actions: Vec<Action>,
}

impl Default for BridgeOrchardConfig {
    fn default() -> Self {
        Self {
            horizon: 20,
            r_harvest: 1.0,
            c_repair: -0.2,
            r_burn: 5.0,
            r_wait: 0.0,
            irreversibility: IrreversibilityRule::default(),
            fire: FireSpread::default(),
            actions: Action::VARIANTS.to_vec(),
        }
    }
}

/// A deterministic toy domain with one repairable and one destructible resource
///
/// State: `(t, b, o)` where `b` is whether the bridge is intact and `o` is whether the orchard is alive.
/// The process starts at `(0, 0, 1)` and terminates at `t = T`. Burning pays well but harms the orchard,
/// while harvesting pays a little on every step once the bridge has been repaired.
///
/// Intended to be solved with [`BackwardInduction`](crate::algo::BackwardInduction)
#[derive(Debug, Clone, PartialEq)]
pub struct BridgeOrchard {
    config: BridgeOrchardConfig,
}

impl BridgeOrchard {
    /// Validate a configuration and build the environment
    ///
    /// **Errors** if the horizon is zero, a reward is not finite, a harm is outside `[0, 1]`,
    /// or no actions are declared
    pub fn new(config: BridgeOrchardConfig) -> Result<Self, PlanError> {
        if config.horizon == 0 {
            return Err(PlanError::EmptyHorizon);
        }
        ensure_param!(r_harvest = config.r_harvest, r_harvest.is_finite(), "(-inf, inf)");
        ensure_param!(c_repair = config.c_repair, c_repair.is_finite(), "(-inf, inf)");
        ensure_param!(r_burn = config.r_burn, r_burn.is_finite(), "(-inf, inf)");
        ensure_param!(r_wait = config.r_wait, r_wait.is_finite(), "(-inf, inf)");
        ensure_param!(
            burn_living = config.irreversibility.burn_living,
            (0.0..=1.0).contains(&burn_living),
            "[0, 1]"
        );
        ensure_param!(
            burn_dead = config.irreversibility.burn_dead,
            (0.0..=1.0).contains(&burn_dead),
            "[0, 1]"
        );
        if config.actions.is_empty() {
            return Err(PlanError::EmptyActionSet);
        }

        log::debug!("bridge orchard environment: {config:?}");
        Ok(Self { config })
    }

    pub fn config(&self) -> &BridgeOrchardConfig {
        &self.config
    }

    fn check(&self, state: &OrchardState, action: Action) -> Result<(), PlanError> {
        if self.config.actions.contains(&action) {
            Ok(())
        } else {
            Err(PlanError::unknown_action(state, &action))
        }
    }
}

impl Default for BridgeOrchard {
    fn default() -> Self {
        Self {
            config: BridgeOrchardConfig::default(),
        }
    }
}

impl Environment for BridgeOrchard {
    type State = OrchardState;
    type Action = Action;

    fn horizon(&self) -> usize {
        self.config.horizon
    }

    fn start_state(&self) -> OrchardState {
        OrchardState::new(0, false, true)
    }

    fn reward(&self, state: &OrchardState, action: Action) -> Result<f64, PlanError> {
        self.check(state, action)?;
        if self.is_terminal(state) {
            return Ok(0.0);
        }

        let c = &self.config;
        Ok(match action {
            Action::Repair => c.c_repair,
            Action::Harvest if state.bridge && state.orchard => c.r_harvest,
            Action::Harvest => 0.0,
            Action::Burn => c.r_burn,
            Action::Wait => c.r_wait,
        })
    }

    fn transition(&self, state: &OrchardState, action: Action) -> Result<OrchardState, PlanError> {
        self.check(state, action)?;
        if self.is_terminal(state) {
            return Err(PlanError::terminal_state(state));
        }

        let mut next = OrchardState { t: state.t + 1, ..*state };
        match action {
            Action::Repair => next.bridge = true,
            Action::Burn => match self.config.fire {
                FireSpread::AcrossBridge => next.orchard &= !state.bridge,
                FireSpread::Unrestricted => next.orchard = false,
            },
            Action::Harvest | Action::Wait => {}
        }

        Ok(next)
    }

    fn delta_omega(&self, state: &OrchardState, action: Action) -> Result<f64, PlanError> {
        self.check(state, action)?;
        let rule = &self.config.irreversibility;
        Ok(match action {
            Action::Burn if state.orchard => rule.burn_living,
            Action::Burn => rule.burn_dead,
            Action::Repair | Action::Harvest | Action::Wait => 0.0,
        })
    }
}

impl DiscreteStateSpace for BridgeOrchard {
    fn layer_size(&self) -> usize {
        4
    }

    fn layer(&self, t: usize) -> Vec<OrchardState> {
        [(false, false), (false, true), (true, false), (true, true)]
            .into_iter()
            .map(|(bridge, orchard)| OrchardState::new(t, bridge, orchard))
            .collect()
    }
}

impl DiscreteActionSpace for BridgeOrchard {
    fn actions(&self, state: &OrchardState) -> Vec<Action> {
        if self.is_terminal(state) {
            Vec::new()
        } else {
            self.config.actions.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use strum::IntoEnumIterator;

    use super::*;

    fn s(t: usize, b: u8, o: u8) -> OrchardState {
        OrchardState::new(t, b == 1, o == 1)
    }

    #[test]
    fn start_and_terminal_states() {
        let env = BridgeOrchard::default();
        let start = env.start_state();
        assert_eq!(start, s(0, 0, 1), "Start state is (0, 0, 1)");
        assert!(!env.is_terminal(&start), "Start state is active");

        for state in env.states() {
            assert_eq!(
                env.is_terminal(&state),
                state.t == 20,
                "Terminal exactly at the horizon: {state}"
            );
        }
    }

    #[test]
    fn actions_full_alphabet_until_horizon() {
        let env = BridgeOrchard::default();
        for state in env.layer(7) {
            assert_eq!(env.actions(&state), Action::VARIANTS, "Full alphabet at {state}");
        }
        assert!(env.actions(&s(20, 1, 1)).is_empty(), "No actions at terminal");
    }

    #[test]
    fn rewards() {
        let env = BridgeOrchard::default();
        assert_eq!(env.reward(&s(0, 0, 1), Action::Repair), Ok(-0.2), "Repair cost");
        assert_eq!(env.reward(&s(0, 1, 1), Action::Harvest), Ok(1.0), "Harvest pays");
        assert_eq!(env.reward(&s(0, 0, 1), Action::Harvest), Ok(0.0), "No harvest without bridge");
        assert_eq!(env.reward(&s(0, 1, 0), Action::Harvest), Ok(0.0), "No harvest from dead orchard");
        assert_eq!(env.reward(&s(0, 0, 0), Action::Burn), Ok(5.0), "Burn pays unconditionally");
        assert_eq!(env.reward(&s(0, 1, 1), Action::Wait), Ok(0.0), "Waiting is free");
        assert_eq!(env.reward(&s(20, 1, 1), Action::Burn), Ok(0.0), "Terminal reward is zero");
    }

    #[test]
    fn transitions() {
        let env = BridgeOrchard::default();
        assert_eq!(env.transition(&s(3, 0, 1), Action::Repair), Ok(s(4, 1, 1)), "Repair fixes bridge");
        assert_eq!(env.transition(&s(3, 1, 1), Action::Harvest), Ok(s(4, 1, 1)), "Harvest keeps state");
        assert_eq!(env.transition(&s(3, 0, 0), Action::Wait), Ok(s(4, 0, 0)), "Wait keeps state");
        assert_eq!(env.transition(&s(3, 1, 1), Action::Burn), Ok(s(4, 1, 0)), "Fire crosses the bridge");
        assert_eq!(env.transition(&s(3, 0, 1), Action::Burn), Ok(s(4, 0, 1)), "Fire stopped by the river");
        assert!(
            matches!(env.transition(&s(20, 0, 1), Action::Wait), Err(PlanError::TerminalState { .. })),
            "No successor from terminal"
        );

        let env = BridgeOrchard::new(BridgeOrchardConfig {
            fire: FireSpread::Unrestricted,
            ..Default::default()
        })
        .unwrap();
        assert_eq!(env.transition(&s(3, 0, 1), Action::Burn), Ok(s(4, 0, 0)), "Unrestricted fire kills");
    }

    #[test]
    fn transitions_advance_time_by_one() {
        let env = BridgeOrchard::default();
        for state in env.states().into_iter().filter(|s| s.t < 20) {
            for action in Action::iter() {
                let next = env.transition(&state, action).unwrap();
                assert_eq!(next.t, state.t + 1, "{state} --{action}--> {next}");
            }
        }
    }

    #[test]
    fn burn_irreversibility_gated_on_living_orchard() {
        let env = BridgeOrchard::default();
        for state in env.states() {
            let harm = env.delta_omega(&state, Action::Burn).unwrap();
            if state.orchard {
                assert_eq!(harm, 1.0, "Burning a living orchard at {state}");
            } else {
                assert_eq!(harm, 0.0, "Burning a dead orchard at {state}");
            }
            for action in [Action::Repair, Action::Harvest, Action::Wait] {
                assert_eq!(env.delta_omega(&state, action), Ok(0.0), "{action} is harmless");
            }
        }
    }

    #[test]
    fn undeclared_actions_rejected() {
        let env = BridgeOrchard::new(BridgeOrchardConfig {
            actions: vec![Action::Repair, Action::Harvest, Action::Wait],
            ..Default::default()
        })
        .unwrap();
        let state = s(0, 0, 1);
        assert!(
            matches!(env.reward(&state, Action::Burn), Err(PlanError::UnknownAction { .. })),
            "reward rejects undeclared action"
        );
        assert!(env.transition(&state, Action::Burn).is_err(), "transition rejects undeclared action");
        assert!(env.delta_omega(&state, Action::Burn).is_err(), "delta_omega rejects undeclared action");
        assert!(!env.actions(&state).contains(&Action::Burn), "Undeclared action not offered");
    }

    #[test]
    fn invalid_configs_rejected() {
        let cases = [
            BridgeOrchardConfig {
                horizon: 0,
                ..Default::default()
            },
            BridgeOrchardConfig {
                r_burn: f64::INFINITY,
                ..Default::default()
            },
            BridgeOrchardConfig {
                c_repair: f64::NAN,
                ..Default::default()
            },
            BridgeOrchardConfig {
                irreversibility: IrreversibilityRule {
                    burn_living: 1.5,
                    burn_dead: 0.0,
                },
                ..Default::default()
            },
            BridgeOrchardConfig {
                actions: Vec::new(),
                ..Default::default()
            },
        ];
        for config in cases {
            let err = BridgeOrchard::new(config.clone()).unwrap_err();
            assert!(err.is_configuration(), "{config:?} rejected as configuration: {err}");
        }
    }

    #[test]
    fn layers_in_slot_order() {
        let env = BridgeOrchard::default();
        for (i, state) in env.layer(5).iter().enumerate() {
            assert_eq!(state.slot(), i, "Slot matches position for {state}");
            assert_eq!(state.time(), 5, "Time matches layer for {state}");
        }
        assert_eq!(env.states().len(), 21 * 4, "State space is (T+1) x 2 x 2");
    }

    #[test]
    fn action_names() {
        assert_eq!(Action::Repair.to_string(), "REPAIR", "Display uses upper case");
        assert_eq!("BURN".parse::<Action>(), Ok(Action::Burn), "Parses from upper case");
        assert!(Action::Repair < Action::Wait, "Priority follows declaration order");
        assert_eq!(s(3, 1, 0).to_string(), "(3, 1, 0)", "State display");
    }
}
