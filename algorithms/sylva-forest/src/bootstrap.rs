//! Bootstrap partitions
//!
//! Every tree is trained on its own resampled view of the exemplars. Rather than drawing a fixed
//! number of exemplars with replacement, each exemplar independently receives a replication count
//! drawn from a Poisson distribution with mean one. This is the limit of bootstrap sampling for an
//! infinite population and, unlike the classic scheme, stays valid when more exemplars arrive
//! later on. Exemplars drawn at least once train the tree, the others are out-of-bag and estimate
//! its error.
use ndarray::{Array1, ArrayView1};
use ndarray_rand::rand_distr::{Distribution, Poisson};
use rand::Rng;
use sylva::error::{Error, Result};

#[cfg(feature = "serde")]
use serde_crate::{Deserialize, Serialize};

/// Error recorded for a tree that had no out-of-bag exemplars to be scored against
///
/// The value is large enough that such a tree is the first to go when the forest is capped.
pub const UNSCORED_ERROR: f64 = 1e100;

/// Draws one replication count per exemplar
pub trait Resample: Clone + Send + Sync {
    fn draw<R: Rng + ?Sized>(&self, rng: &mut R, count: usize) -> Result<Vec<u32>>;
}

/// Independent Poisson(1) replication counts
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PoissonBootstrap;

impl Resample for PoissonBootstrap {
    fn draw<R: Rng + ?Sized>(&self, rng: &mut R, count: usize) -> Result<Vec<u32>> {
        let poisson = Poisson::new(1.0f64).map_err(|e| Error::Parameters(e.to_string()))?;
        Ok((0..count).map(|_| poisson.sample(rng) as u32).collect())
    }
}

/// The split of a range of exemplars into training and out-of-bag members for one tree
///
/// Weight vectors span the whole store. Exemplars before the drawn range keep a weight of zero,
/// which is what stops an incremental round from counting previously learnt exemplars twice.
#[derive(Clone, Debug, PartialEq)]
pub struct Partition {
    train: Vec<usize>,
    test: Vec<usize>,
    train_weights: Array1<f32>,
    test_weights: Option<Array1<f32>>,
}

impl Partition {
    /// Draws a partition of the exemplars `[offset, total)`
    pub fn draw<B, R>(
        resampler: &B,
        rng: &mut R,
        offset: usize,
        total: usize,
        weights: Option<ArrayView1<f32>>,
    ) -> Result<Self>
    where
        B: Resample,
        R: Rng + ?Sized,
    {
        let count = total.saturating_sub(offset);
        let draws = resampler.draw(rng, count)?;
        if draws.len() != count {
            return Err(Error::Parameters(format!(
                "resampler returned {} draws for {} exemplars",
                draws.len(),
                count
            )));
        }

        Ok(Self::from_draws(&draws, offset, total, weights))
    }

    /// Builds a partition from replication counts
    ///
    /// `draws[i]` belongs to exemplar `offset + i`. An exemplar drawn `k > 0` times trains with
    /// weight `k`, multiplied by its external weight if there is one. Out-of-bag exemplars are
    /// only weighted when external weights are given; these cover the drawn range and are zero
    /// elsewhere.
    pub fn from_draws(
        draws: &[u32],
        offset: usize,
        total: usize,
        weights: Option<ArrayView1<f32>>,
    ) -> Self {
        debug_assert!(offset + draws.len() <= total);

        let mut train = Vec::new();
        let mut test = Vec::new();
        let mut train_weights = Array1::zeros(total);
        let mut test_weights = weights.map(|_| Array1::zeros(total));

        for (i, &draw) in draws.iter().enumerate() {
            let idx = offset + i;
            let external = weights.map(|w| w[idx]);

            if draw > 0 {
                train.push(idx);
                train_weights[idx] = draw as f32 * external.unwrap_or(1.0);
            } else {
                test.push(idx);
            }

            if let (Some(tw), Some(w)) = (test_weights.as_mut(), external) {
                tw[idx] = w;
            }
        }

        Partition {
            train,
            test,
            train_weights,
            test_weights,
        }
    }

    /// Indices of the training exemplars
    pub fn train(&self) -> &[usize] {
        &self.train
    }

    /// Indices of the out-of-bag exemplars
    pub fn test(&self) -> &[usize] {
        &self.test
    }

    pub fn train_weights(&self) -> ArrayView1<f32> {
        self.train_weights.view()
    }

    /// Weights of the out-of-bag exemplars, `None` if all count equally
    pub fn test_weights(&self) -> Option<ArrayView1<f32>> {
        self.test_weights.as_ref().map(|w| w.view())
    }

    /// A partition without training exemplars cannot produce a tree
    pub fn is_degenerate(&self) -> bool {
        self.train.is_empty()
    }

    pub fn has_held_out(&self) -> bool {
        !self.test.is_empty()
    }
}
