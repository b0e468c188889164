pub mod bridge_orchard;

pub use bridge_orchard::{
    Action, BridgeOrchard, BridgeOrchardConfig, FireSpread, IrreversibilityRule, OrchardState,
};
