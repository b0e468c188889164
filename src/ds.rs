mod state_index;
mod table;

pub use state_index::StateIndex;
pub use table::{PolicyTable, Table, ValueTable};
