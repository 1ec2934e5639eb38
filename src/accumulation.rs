use std::collections::HashMap;

use crate::traits::Goal;

/// Statistics collected from the trees of an ensemble, keyed by exemplar index
///
/// An accumulation is created for a single evaluation pass: every tree adds the statistics it
/// holds for an exemplar, and afterwards the accumulated value of each exemplar is merged into
/// one answer by the [`Goal`]. How contributions combine is up to
/// [`Goal::accumulate`](crate::traits::Goal::accumulate).
#[derive(Debug, Clone)]
pub struct Accumulation<A> {
    entries: HashMap<usize, A>,
    empty: A,
}

impl<A: Default> Default for Accumulation<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: Default> Accumulation<A> {
    pub fn new() -> Self {
        Accumulation {
            entries: HashMap::new(),
            empty: A::default(),
        }
    }

    /// Folds the statistics of one tree for exemplar `index` into the accumulation
    pub fn add<G>(&mut self, goal: &G, index: usize, stats: &G::Stats)
    where
        G: Goal<Accumulator = A>,
    {
        let acc = self.entries.entry(index).or_default();
        goal.accumulate(acc, stats);
    }

    /// The accumulated value for exemplar `index`
    ///
    /// Exemplars no tree contributed to yield the empty accumulator.
    pub fn get(&self, index: usize) -> &A {
        self.entries.get(&index).unwrap_or(&self.empty)
    }

    pub fn contains(&self, index: usize) -> bool {
        self.entries.contains_key(&index)
    }

    /// Number of exemplars with at least one contribution
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
