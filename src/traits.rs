//! Strategy capabilities of a decision forest
//!
//! A forest is assembled from four exchangeable parts. The [`Goal`] says what a tree predicts
//! and how the predictions of several trees combine, the [`Generator`] proposes split tests,
//! the [`Pruner`] decides when a node stops splitting and the [`Tree`] grows, extends, scores
//! and evaluates a single tree using the other three.
use ndarray::ArrayView1;

use crate::accumulation::Accumulation;
use crate::error::Result;
use crate::exemplars::ExemplarStore;

/// The objective of a forest
pub trait Goal: Clone + Send + Sync {
    /// Statistics summarising a set of exemplars, typically stored in a leaf
    type Stats: Clone + Send + Sync;
    /// Collects the statistics contributed by several trees for one exemplar
    type Accumulator: Default + Send + Sync;
    /// The combined answer for one exemplar
    type Merged: Send;
    /// A point decision derived from a merged answer
    type Decision: Send;

    /// Computes the statistics of the exemplars at `indices`
    ///
    /// `weights`, when given, is indexed by exemplar index and covers the whole store.
    fn stats<S: ExemplarStore + ?Sized>(
        &self,
        store: &S,
        indices: &[usize],
        weights: Option<ArrayView1<f32>>,
    ) -> Self::Stats;

    /// Adds the statistics of one tree to an accumulator
    fn accumulate(&self, acc: &mut Self::Accumulator, stats: &Self::Stats);

    /// Merges everything accumulated for one exemplar
    fn merge(&self, acc: &Self::Accumulator) -> Self::Merged;

    /// Extracts the best answer from a merged result
    fn best(&self, merged: &Self::Merged) -> Self::Decision;
}

/// Source of candidate split tests
pub trait Generator: Clone + Send + Sync {
    type Test: Clone + Send + Sync;

    /// Proposes candidate tests for splitting the exemplars at `indices`
    fn propose<S: ExemplarStore + ?Sized>(
        &self,
        store: &S,
        indices: &[usize],
        weights: ArrayView1<f32>,
    ) -> Vec<Self::Test>;

    /// Applies a test to one exemplar, `true` sends it down the true branch
    fn apply<S: ExemplarStore + ?Sized>(&self, test: &Self::Test, store: &S, exemplar: usize)
        -> bool;
}

/// Stopping criterion for tree growth
pub trait Pruner: Clone + Send + Sync {
    /// Returns `true` if a node at `depth` holding `indices` must become a leaf
    fn should_stop(&self, depth: usize, indices: &[usize], weights: ArrayView1<f32>) -> bool;
}

/// A single tree of the forest
///
/// Weight vectors handed to a tree are indexed by exemplar index and span the whole store, so
/// exemplars that take no part in an operation simply carry a weight of zero.
pub trait Tree: Clone + Send + Sync + Sized {
    type Goal: Goal;
    type Generator: Generator;
    type Pruner: Pruner;

    /// Grows a new tree from the exemplars at `indices`
    fn grow<S: ExemplarStore + ?Sized>(
        goal: &Self::Goal,
        generator: &Self::Generator,
        pruner: &Self::Pruner,
        store: &S,
        indices: &[usize],
        weights: ArrayView1<f32>,
    ) -> Result<Self>;

    /// Incorporates further exemplars into an existing tree, keeping what it has learnt
    fn extend<S: ExemplarStore + ?Sized>(
        &mut self,
        goal: &Self::Goal,
        generator: &Self::Generator,
        store: &S,
        indices: &[usize],
        weights: ArrayView1<f32>,
    ) -> Result<()>;

    /// Error of the tree on held out exemplars, lower is better
    ///
    /// `indices` is never empty. Without `weights` all exemplars count equally. With
    /// `incremental` set, statistics gathered during earlier incremental rounds are taken into
    /// account.
    fn error<S: ExemplarStore + ?Sized>(
        &self,
        goal: &Self::Goal,
        generator: &Self::Generator,
        store: &S,
        indices: &[usize],
        weights: Option<ArrayView1<f32>>,
        incremental: bool,
    ) -> Result<f64>;

    /// Adds the statistics this tree holds for each exemplar at `indices` to `acc`
    fn evaluate<S: ExemplarStore + ?Sized>(
        &self,
        goal: &Self::Goal,
        generator: &Self::Generator,
        store: &S,
        indices: &[usize],
        acc: &mut Accumulation<<Self::Goal as Goal>::Accumulator>,
    ) -> Result<()>;

    /// Number of nodes in the tree
    fn node_count(&self) -> usize;
}
