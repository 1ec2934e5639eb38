//! `sylva` provides the shared vocabulary for learning decision forests in Rust.
//!
//! A decision forest is an ensemble of trees that are each trained on a resampled view of the
//! same data. What the trees predict, how candidate splits are generated and when growth stops
//! are all exchangeable, so this crate only defines the capabilities involved:
//!
//! * an [`ExemplarStore`] holds the data as named channels, one row per exemplar,
//! * a [`Goal`](traits::Goal) computes statistics, merges the output of several trees and
//!   extracts a decision,
//! * a [`Generator`](traits::Generator) proposes split tests,
//! * a [`Pruner`](traits::Pruner) decides when a node becomes a leaf,
//! * a [`Tree`](traits::Tree) grows, extends, scores and evaluates a single tree.
//!
//! The ensemble itself, with bagging, out-of-bag error estimation, incremental learning and
//! size capping, lives in the `sylva-forest` crate.
//!

pub mod accumulation;
pub mod error;
pub mod exemplars;
mod float;
mod param_guard;
pub mod prelude;
pub mod traits;

pub use accumulation::Accumulation;
pub use exemplars::{ExemplarStore, Exemplars};
pub use float::Float;
pub use param_guard::ParamGuard;
