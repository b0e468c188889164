use std::ops::Index;

use crate::env::LayeredState;

use super::StateIndex;

/// An immutable mapping from states to entries, backed by a flat array
#[derive(Debug, Clone, PartialEq)]
pub struct Table<S, T> {
    index: StateIndex<S>,
    entries: Vec<T>,
}

/// Optimal value of every state
pub type ValueTable<S> = Table<S, f64>;

/// Optimal action of every decision state
pub type PolicyTable<S, A> = Table<S, A>;

impl<S: LayeredState, T> Table<S, T> {
    pub(crate) fn new(index: StateIndex<S>, entries: Vec<T>) -> Self {
        debug_assert_eq!(index.len(), entries.len());
        Self { index, entries }
    }

    /// Get the entry for a state, or `None` if the state is not covered by the table
    pub fn get(&self, state: &S) -> Option<&T> {
        self.index.position(state).map(|ix| &self.entries[ix])
    }

    pub fn contains(&self, state: &S) -> bool {
        self.index.position(state).is_some()
    }
}

impl<S, T> Table<S, T> {
    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over `(state, entry)` pairs in index order
    pub fn iter(&self) -> impl Iterator<Item = (&S, &T)> {
        self.index.view().iter().zip(&self.entries)
    }

    /// The covered states, in index order
    pub fn states(&self) -> &[S] {
        self.index.view()
    }

    /// The entries, in index order
    pub fn entries(&self) -> &[T] {
        &self.entries
    }
}

impl<S: LayeredState, T> Index<&S> for Table<S, T> {
    type Output = T;

    /// **Panics** if the state is not covered by the table
    fn index(&self, state: &S) -> &Self::Output {
        match self.get(state) {
            Some(entry) => entry,
            None => panic!("{state:?} is not covered by the table"),
        }
    }
}
