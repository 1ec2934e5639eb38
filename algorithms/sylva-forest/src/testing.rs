//! Minimal collaborators for unit tests
use ndarray::ArrayView1;
use rand::Rng;
use sylva::error::Result;
use sylva::traits::{Generator, Goal, Pruner, Tree};
use sylva::{Accumulation, ExemplarStore};

use crate::bootstrap::Resample;

/// Collects the labels of all contributing trees
#[derive(Clone, Debug)]
pub struct Nothing;

impl Goal for Nothing {
    type Stats = usize;
    type Accumulator = Vec<usize>;
    type Merged = Vec<usize>;
    type Decision = Option<usize>;

    fn stats<S: ExemplarStore + ?Sized>(
        &self,
        _store: &S,
        indices: &[usize],
        _weights: Option<ArrayView1<f32>>,
    ) -> usize {
        indices.len()
    }

    fn accumulate(&self, acc: &mut Vec<usize>, stats: &usize) {
        acc.push(*stats);
    }

    fn merge(&self, acc: &Vec<usize>) -> Vec<usize> {
        let mut merged = acc.clone();
        merged.sort_unstable();
        merged
    }

    fn best(&self, merged: &Vec<usize>) -> Option<usize> {
        merged.last().copied()
    }
}

#[derive(Clone, Debug)]
pub struct NoSplit;

impl Generator for NoSplit {
    type Test = ();

    fn propose<S: ExemplarStore + ?Sized>(
        &self,
        _store: &S,
        _indices: &[usize],
        _weights: ArrayView1<f32>,
    ) -> Vec<()> {
        Vec::new()
    }

    fn apply<S: ExemplarStore + ?Sized>(&self, _test: &(), _store: &S, _exemplar: usize) -> bool {
        false
    }
}

#[derive(Clone, Debug)]
pub struct NoStop;

impl Pruner for NoStop {
    fn should_stop(&self, _depth: usize, _indices: &[usize], _weights: ArrayView1<f32>) -> bool {
        false
    }
}

/// A tree remembering how many exemplars it was trained with
#[derive(Clone, Debug, PartialEq)]
pub struct Constant {
    pub label: usize,
}

impl Constant {
    pub fn new(label: usize) -> Self {
        Constant { label }
    }
}

impl Tree for Constant {
    type Goal = Nothing;
    type Generator = NoSplit;
    type Pruner = NoStop;

    fn grow<S: ExemplarStore + ?Sized>(
        goal: &Nothing,
        _generator: &NoSplit,
        _pruner: &NoStop,
        store: &S,
        indices: &[usize],
        weights: ArrayView1<f32>,
    ) -> Result<Self> {
        Ok(Constant::new(goal.stats(store, indices, Some(weights))))
    }

    fn extend<S: ExemplarStore + ?Sized>(
        &mut self,
        _goal: &Nothing,
        _generator: &NoSplit,
        _store: &S,
        indices: &[usize],
        _weights: ArrayView1<f32>,
    ) -> Result<()> {
        self.label += indices.len();
        Ok(())
    }

    fn error<S: ExemplarStore + ?Sized>(
        &self,
        _goal: &Nothing,
        _generator: &NoSplit,
        store: &S,
        indices: &[usize],
        _weights: Option<ArrayView1<f32>>,
        _incremental: bool,
    ) -> Result<f64> {
        Ok(indices.len() as f64 / store.exemplar_count() as f64)
    }

    fn evaluate<S: ExemplarStore + ?Sized>(
        &self,
        goal: &Nothing,
        _generator: &NoSplit,
        _store: &S,
        indices: &[usize],
        acc: &mut Accumulation<Vec<usize>>,
    ) -> Result<()> {
        for &idx in indices {
            acc.add(goal, idx, &self.label);
        }
        Ok(())
    }

    fn node_count(&self) -> usize {
        self.label + 1
    }
}

/// Draws the same replication count for every exemplar
#[derive(Clone, Debug)]
pub struct Fixed(pub u32);

impl Resample for Fixed {
    fn draw<R: Rng + ?Sized>(&self, _rng: &mut R, count: usize) -> Result<Vec<u32>> {
        Ok(vec![self.0; count])
    }
}
