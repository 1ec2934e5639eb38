use ndarray::ArrayView1;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256Plus;
use rayon::prelude::*;
use sylva::error::Error;
use sylva::traits::Tree;
use sylva::{ExemplarStore, ParamGuard};
use tracing::{debug, trace};

#[cfg(feature = "serde")]
use serde_crate::{Deserialize, Serialize};

use crate::bootstrap::{Partition, PoissonBootstrap, Resample, UNSCORED_ERROR};
use crate::error::{ForestError, Result};
use crate::hyperparams::TrainParams;

/// A tree of the forest together with its out-of-bag error
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Clone, Debug)]
pub struct TreeEntry<T> {
    pub(crate) tree: T,
    pub(crate) error: f64,
}

impl<T> TreeEntry<T> {
    pub fn tree(&self) -> &T {
        &self.tree
    }

    /// Out-of-bag error of the tree, [`UNSCORED_ERROR`] if it never had held out exemplars
    pub fn error(&self) -> f64 {
        self.error
    }
}

/// A bagged decision forest
///
/// The forest owns its goal, generator and pruner and a sequence of trees, each stored with an
/// out-of-bag error estimate. Every call to [`train`](Forest::train) grows new trees on
/// Poisson bootstrap samples of the store. With incremental learning enabled, later calls accept
/// a store with new exemplars appended: existing trees are extended with a fresh sample of the
/// new exemplars and rescored on the rest, then new trees are grown over everything. Capping the
/// ensemble size drops the trees with the highest error, which over time removes the trees that
/// have seen the least data.
///
/// Strategies and the incremental flag can only be changed before the first training call.
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Clone, Debug)]
pub struct Forest<T: Tree, B = PoissonBootstrap> {
    pub(crate) goal: T::Goal,
    pub(crate) generator: T::Generator,
    pub(crate) pruner: T::Pruner,
    pub(crate) incremental: bool,
    pub(crate) trees: Vec<TreeEntry<T>>,
    pub(crate) train_count: usize,
    resampler: B,
    rng: Xoshiro256Plus,
}

impl<T: Tree> Forest<T> {
    /// Creates an empty forest using Poisson bootstrap sampling
    pub fn new(goal: T::Goal, generator: T::Generator, pruner: T::Pruner) -> Self {
        Self::with_resampler(goal, generator, pruner, PoissonBootstrap)
    }
}

impl<T: Tree, B: Resample> Forest<T, B> {
    /// Creates an empty forest drawing its bootstrap samples from `resampler`
    pub fn with_resampler(
        goal: T::Goal,
        generator: T::Generator,
        pruner: T::Pruner,
        resampler: B,
    ) -> Self {
        Forest {
            goal,
            generator,
            pruner,
            incremental: false,
            trees: Vec::new(),
            train_count: 0,
            resampler,
            rng: Xoshiro256Plus::from_entropy(),
        }
    }

    /// Seeds the random number generator, which makes training reproducible
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = Xoshiro256Plus::seed_from_u64(seed);
        self
    }

    fn ensure_untrained(&self, what: &str) -> Result<()> {
        if self.train_count != 0 {
            Err(ForestError::Configuration(format!(
                "cannot change the {} after training has started",
                what
            )))
        } else {
            Ok(())
        }
    }

    pub fn set_goal(&mut self, goal: T::Goal) -> Result<()> {
        self.ensure_untrained("goal")?;
        self.goal = goal;
        Ok(())
    }

    pub fn set_generator(&mut self, generator: T::Generator) -> Result<()> {
        self.ensure_untrained("generator")?;
        self.generator = generator;
        Ok(())
    }

    pub fn set_pruner(&mut self, pruner: T::Pruner) -> Result<()> {
        self.ensure_untrained("pruner")?;
        self.pruner = pruner;
        Ok(())
    }

    /// Enables or disables incremental learning
    ///
    /// Incremental trees keep extra statistics around, so this costs memory but little
    /// computation.
    pub fn set_incremental(&mut self, incremental: bool) -> Result<()> {
        self.ensure_untrained("incremental flag")?;
        self.incremental = incremental;
        Ok(())
    }

    pub fn goal(&self) -> &T::Goal {
        &self.goal
    }

    pub fn generator(&self) -> &T::Generator {
        &self.generator
    }

    pub fn pruner(&self) -> &T::Pruner {
        &self.pruner
    }

    pub fn incremental(&self) -> bool {
        self.incremental
    }

    /// Number of exemplars the forest has been trained with so far
    pub fn train_count(&self) -> usize {
        self.train_count
    }

    /// The trees in their current order
    pub fn trees(&self) -> &[TreeEntry<T>] {
        &self.trees
    }

    /// Number of trees in the forest
    pub fn tree_count(&self) -> usize {
        self.trees.len()
    }

    /// Total number of nodes over all trees
    pub fn total_node_count(&self) -> usize {
        self.trees.iter().map(|entry| entry.tree.node_count()).sum()
    }

    /// Mean out-of-bag error of all trees, `None` for an empty forest
    pub fn mean_error(&self) -> Option<f64> {
        if self.trees.is_empty() {
            None
        } else {
            let sum: f64 = self.trees.iter().map(|entry| entry.error).sum();
            Some(sum / self.trees.len() as f64)
        }
    }

    /// Trains the forest with the exemplars of `store`
    ///
    /// On the first call the forest grows `n_trees` trees over the whole store. On later calls
    /// incremental learning has to be enabled and `store` must contain the exemplars of all
    /// earlier calls at their old indices, followed by at least one new exemplar. Every existing
    /// tree is then extended with a bootstrap sample of the new exemplars and its error is
    /// replaced by the error on the new out-of-bag exemplars, if there are any. Afterwards
    /// `n_trees` new trees are grown over all exemplars and, if an ensemble cap is set, the
    /// forest is culled to it.
    ///
    /// A failed call leaves the trees and the train count untouched. To get there, an
    /// incremental round updates copies of the existing trees and swaps them in at the end, so
    /// for its duration the forest holds every existing tree twice.
    pub fn train<S>(&mut self, params: &TrainParams, store: &S) -> Result<()>
    where
        S: ExemplarStore + Sync + ?Sized,
    {
        let params = params.check_ref()?;
        let total = store.exemplar_count();

        if self.train_count != 0 {
            if !self.incremental {
                return Err(ForestError::Configuration(
                    "forest was already trained and incremental learning is disabled".to_string(),
                ));
            }
            if total <= self.train_count {
                return Err(ForestError::Range(format!(
                    "store holds {} exemplars, incremental training needs more than {}",
                    total, self.train_count
                )));
            }
        }

        let weights = params
            .weight_channel()
            .map(|channel| store.weights(channel))
            .transpose()?;
        if let (Some(channel), Some(w)) = (params.weight_channel(), weights.as_ref()) {
            if w.len() != total {
                return Err(Error::ChannelLength {
                    name: channel.to_string(),
                    expected: total,
                    found: w.len(),
                }
                .into());
            }
        }
        let weights = weights.as_ref().map(|w| w.view());

        debug!(
            exemplars = total,
            previous = self.train_count,
            existing_trees = self.trees.len(),
            new_trees = params.n_trees(),
            "training forest"
        );

        let updated = if self.train_count != 0 {
            Some(self.update_trees(store, total, weights)?)
        } else {
            None
        };
        let grown = self.grow_trees(params.n_trees(), store, total, weights)?;

        if let Some(updated) = updated {
            self.trees = updated;
        }
        self.train_count = total;
        self.trees.extend(grown);

        if let Some(cap) = params.ensemble_cap() {
            self.cull(cap);
        }

        Ok(())
    }

    /// Reduces the forest to at most `max_count` trees
    ///
    /// Trees are ordered by ascending error, with ties kept in their current order, and only the
    /// first `max_count` survive. Trees that were never scored carry [`UNSCORED_ERROR`] and are
    /// therefore dropped first. Does nothing if the forest is small enough already.
    pub fn cull(&mut self, max_count: usize) {
        if self.trees.len() > max_count {
            debug!(trees = self.trees.len(), max_count, "culling forest");
            self.trees.sort_by(|a, b| a.error.total_cmp(&b.error));
            self.trees.truncate(max_count);
        }
    }

    /// Hands out one independent random stream per task
    ///
    /// Each stream is a copy of the main generator, which then jumps ahead by 2^128 steps, so
    /// streams never overlap and the outcome does not depend on thread scheduling.
    fn streams(&mut self, count: usize) -> Vec<Xoshiro256Plus> {
        (0..count)
            .map(|_| {
                let stream = self.rng.clone();
                self.rng.jump();
                stream
            })
            .collect()
    }

    /// Extends and rescores copies of the existing trees with the exemplars `[train_count, total)`
    fn update_trees<S>(
        &mut self,
        store: &S,
        total: usize,
        weights: Option<ArrayView1<f32>>,
    ) -> Result<Vec<TreeEntry<T>>>
    where
        S: ExemplarStore + Sync + ?Sized,
    {
        let offset = self.train_count;
        let streams = self.streams(self.trees.len());
        let (goal, generator, resampler) = (&self.goal, &self.generator, &self.resampler);

        self.trees
            .par_iter()
            .zip(streams)
            .enumerate()
            .map(|(idx, (entry, mut rng))| -> Result<TreeEntry<T>> {
                let part = Partition::draw(resampler, &mut rng, offset, total, weights)?;
                let mut tree = entry.tree.clone();
                let mut error = entry.error;

                if !part.is_degenerate() {
                    tree.extend(goal, generator, store, part.train(), part.train_weights())?;
                }
                if part.has_held_out() {
                    error = tree.error(
                        goal,
                        generator,
                        store,
                        part.test(),
                        part.test_weights(),
                        true,
                    )?;
                    trace!(tree = idx, previous = entry.error, error, "rescored tree");
                }

                Ok(TreeEntry { tree, error })
            })
            .collect()
    }

    /// Grows `n_trees` new trees over all exemplars of the store
    ///
    /// Samples without training exemplars are skipped, so fewer trees may come back.
    fn grow_trees<S>(
        &mut self,
        n_trees: usize,
        store: &S,
        total: usize,
        weights: Option<ArrayView1<f32>>,
    ) -> Result<Vec<TreeEntry<T>>>
    where
        S: ExemplarStore + Sync + ?Sized,
    {
        let streams = self.streams(n_trees);
        let this = &*self;

        let grown = streams
            .into_par_iter()
            .map(|mut rng| -> Result<Option<TreeEntry<T>>> {
                let part = Partition::draw(&this.resampler, &mut rng, 0, total, weights)?;
                if part.is_degenerate() {
                    trace!("bootstrap sample without training exemplars, skipping tree");
                    return Ok(None);
                }

                let tree = T::grow(
                    &this.goal,
                    &this.generator,
                    &this.pruner,
                    store,
                    part.train(),
                    part.train_weights(),
                )?;

                let error = if part.has_held_out() {
                    tree.error(
                        &this.goal,
                        &this.generator,
                        store,
                        part.test(),
                        part.test_weights(),
                        this.incremental,
                    )?
                } else {
                    UNSCORED_ERROR
                };

                Ok(Some(TreeEntry { tree, error }))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(grown.into_iter().flatten().collect())
    }
}
