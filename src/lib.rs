#[macro_use]
mod util;

/// Planning algorithms
pub mod algo;

/// Data structures
pub mod ds;

/// Environment
pub mod env;

/// Error types
pub mod error;

/// Decision domains
pub mod gym;

/// Tabular export of plans
#[cfg(feature = "csv")]
pub mod io;

pub use error::PlanError;
