//! # Bagged decision forests
//!
//! `sylva-forest` is the ensemble layer of the `sylva` ecosystem. It trains a forest of decision
//! trees against an exchangeable goal, split generator and pruner, all of which are defined in
//! the [`sylva`] core crate, and evaluates it by merging the statistics of every tree.
//!
//! ## The big picture
//!
//! * **Bagging.** Every tree sees its own bootstrap sample of the exemplars. Instead of drawing
//!   a fixed number of exemplars with replacement, each exemplar is replicated a Poisson(1)
//!   distributed number of times, the infinite-population limit of the bootstrap which stays
//!   valid when more data shows up later.
//! * **Out-of-bag error.** Exemplars a tree did not train with give an error estimate for that
//!   tree. Trees without such exemplars receive [`UNSCORED_ERROR`].
//! * **Incremental learning.** With [`Forest::set_incremental`] enabled, a forest can be trained
//!   again with a store that has new exemplars appended. Existing trees are extended with a
//!   sample of the new exemplars only and rescored on the remaining new ones before further
//!   trees are grown over the whole store.
//! * **Capping.** [`Forest::cull`], or an ensemble cap in [`TrainParams`], keeps the trees with
//!   the lowest error. Together with incremental learning this retires trees that have seen
//!   too little data.
//!
//! Growing and extending trees are independent of each other and run in parallel on `rayon`.
//! Each task receives its own random stream, so a forest created with [`Forest::with_seed`]
//! trains reproducibly.
//!
//! ## Example
//!
//! ```ignore
//! use sylva::Exemplars;
//! use sylva_forest::{EvalMode, Forest, TrainParams};
//!
//! let mut forest = Forest::<MyTree>::new(goal, generator, pruner).with_seed(42);
//! forest.set_incremental(true)?;
//!
//! // first batch
//! forest.train(&TrainParams::new(32), &store)?;
//!
//! // append a second batch, add 8 trees and keep the best 32
//! store.append(&batch)?;
//! forest.train(&TrainParams::new(8).ensemble_cap(Some(32)), &store)?;
//!
//! let decisions = forest.evaluate_all(&store, EvalMode::Decision)?;
//! ```
//!
mod algorithm;
mod bootstrap;
mod error;
mod evaluate;
mod hyperparams;

#[cfg(test)]
mod testing;

pub use algorithm::{Forest, TreeEntry};
pub use bootstrap::{Partition, PoissonBootstrap, Resample, UNSCORED_ERROR};
pub use error::{ForestError, Result};
pub use evaluate::{EvalMode, Evaluation};
pub use hyperparams::{TrainParams, TrainValidParams};
