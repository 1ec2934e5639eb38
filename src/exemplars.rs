//! Exemplar stores
//!
//! An exemplar store is a read-only, indexable collection of exemplars. Every exemplar carries
//! one row in each of a number of named channels, where a channel is a two-dimensional matrix
//! with dimensionality (nexemplars, nfeatures). A channel holding a single feature can act as a
//! weight channel, giving each exemplar a scalar importance.
use ndarray::{concatenate, Array1, Array2, ArrayView1, ArrayView2, Axis};

#[cfg(feature = "serde")]
use serde_crate::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::Float;

/// Read access to a collection of exemplars
///
/// Learners only ever read from a store. For incremental learning the caller is expected to
/// keep previously seen exemplars at the same indices and append new ones at the end.
pub trait ExemplarStore {
    type Elem: Float;

    /// Number of exemplars in the store
    fn exemplar_count(&self) -> usize;

    /// Number of channels in the store
    fn channel_count(&self) -> usize;

    /// Position of the channel with the given name, if present
    fn channel_index(&self, name: &str) -> Option<usize>;

    /// The channel at `index`, with one row per exemplar
    fn channel(&self, index: usize) -> Option<ArrayView2<'_, Self::Elem>>;

    /// The channel called `name`, with one row per exemplar
    fn channel_by_name(&self, name: &str) -> Option<ArrayView2<'_, Self::Elem>> {
        self.channel_index(name).and_then(|idx| self.channel(idx))
    }

    /// All features of one exemplar within a channel
    fn exemplar(&self, channel: usize, exemplar: usize) -> Option<ArrayView1<'_, Self::Elem>> {
        let data = self.channel(channel)?;
        if exemplar < data.nrows() {
            Some(data.index_axis_move(Axis(0), exemplar))
        } else {
            None
        }
    }

    /// A single value, addressed by channel, exemplar and feature
    fn value(&self, channel: usize, exemplar: usize, feature: usize) -> Option<Self::Elem> {
        self.channel(channel)
            .and_then(|data| data.get((exemplar, feature)).copied())
    }

    /// Reads the first feature of the channel `name` as one weight per exemplar
    fn weights(&self, name: &str) -> Result<Array1<f32>> {
        let data = self
            .channel_by_name(name)
            .ok_or_else(|| Error::MissingChannel(name.to_string()))?;

        if data.ncols() == 0 {
            return Err(Error::EmptyChannel(name.to_string()));
        }
        if data.nrows() != self.exemplar_count() {
            return Err(Error::ChannelLength {
                name: name.to_string(),
                expected: self.exemplar_count(),
                found: data.nrows(),
            });
        }

        Ok(data.column(0).mapv(<f32 as Float>::cast))
    }
}

/// An owned exemplar store made of named, dense channels
///
/// # Example
///
/// ```rust
/// use ndarray::array;
/// use sylva::{ExemplarStore, Exemplars};
///
/// let store = Exemplars::new()
///     .with_channel("features", array![[0.5, 1.0], [1.5, -2.0], [0.0, 0.0]])
///     .unwrap()
///     .with_channel("weight", array![[1.0], [2.0], [0.5]])
///     .unwrap();
///
/// assert_eq!(store.exemplar_count(), 3);
/// assert_eq!(store.weights("weight").unwrap().to_vec(), vec![1.0, 2.0, 0.5]);
/// ```
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Clone, Debug, PartialEq)]
pub struct Exemplars<F> {
    names: Vec<String>,
    channels: Vec<Array2<F>>,
}

impl<F: Float> Default for Exemplars<F> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F: Float> Exemplars<F> {
    /// Creates a store without channels and without exemplars
    pub fn new() -> Self {
        Exemplars {
            names: Vec::new(),
            channels: Vec::new(),
        }
    }

    /// Adds a channel, consuming and returning the store
    pub fn with_channel(mut self, name: &str, data: Array2<F>) -> Result<Self> {
        self.push_channel(name, data)?;
        Ok(self)
    }

    /// Adds a channel
    ///
    /// The first channel fixes the number of exemplars, every later channel has to match it.
    pub fn push_channel(&mut self, name: &str, data: Array2<F>) -> Result<()> {
        if self.names.iter().any(|n| n == name) {
            return Err(Error::Parameters(format!(
                "channel {} is already present",
                name
            )));
        }
        if let Some(first) = self.channels.first() {
            if first.nrows() != data.nrows() {
                return Err(Error::ChannelLength {
                    name: name.to_string(),
                    expected: first.nrows(),
                    found: data.nrows(),
                });
            }
        }

        self.names.push(name.to_string());
        self.channels.push(data);
        Ok(())
    }

    /// Appends the exemplars of `other` after the current ones
    ///
    /// Both stores need the same channels, in the same order and with the same number of
    /// features. Existing exemplars keep their indices.
    pub fn append(&mut self, other: &Exemplars<F>) -> Result<()> {
        if self.names != other.names {
            return Err(Error::Parameters(format!(
                "channel layout {:?} does not match {:?}",
                other.names, self.names
            )));
        }

        let joined = self
            .channels
            .iter()
            .zip(other.channels.iter())
            .map(|(ours, theirs)| concatenate(Axis(0), &[ours.view(), theirs.view()]))
            .collect::<std::result::Result<Vec<_>, _>>()?;

        self.channels = joined;
        Ok(())
    }

    /// Names of all channels, in channel order
    pub fn channel_names(&self) -> &[String] {
        &self.names
    }
}

impl<F: Float> ExemplarStore for Exemplars<F> {
    type Elem = F;

    fn exemplar_count(&self) -> usize {
        self.channels.first().map(|c| c.nrows()).unwrap_or(0)
    }

    fn channel_count(&self) -> usize {
        self.channels.len()
    }

    fn channel_index(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    fn channel(&self, index: usize) -> Option<ArrayView2<'_, F>> {
        self.channels.get(index).map(|c| c.view())
    }
}
