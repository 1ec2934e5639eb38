use crate::error::ForestError;
use sylva::ParamGuard;

#[cfg(feature = "serde")]
use serde_crate::{Deserialize, Serialize};

/// A verified parameter set for one training call of a [`Forest`](crate::Forest)
///
/// See [`TrainParams`] for more information.
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TrainValidParams {
    n_trees: usize,
    weight_channel: Option<String>,
    ensemble_cap: Option<usize>,
}

impl TrainValidParams {
    pub fn n_trees(&self) -> usize {
        self.n_trees
    }

    pub fn weight_channel(&self) -> Option<&str> {
        self.weight_channel.as_deref()
    }

    pub fn ensemble_cap(&self) -> Option<usize> {
        self.ensemble_cap
    }
}

/// The parameters of a training call
///
/// ### Example
///
/// ```rust
/// use sylva::ParamGuard;
/// use sylva_forest::TrainParams;
///
/// // grow 16 new trees, weight exemplars by the "importance" channel and
/// // keep at most the 64 best trees afterwards
/// let params = TrainParams::new(16)
///     .weight_channel(Some("importance"))
///     .ensemble_cap(Some(64));
///
/// assert!(params.check_ref().is_ok());
/// assert!(TrainParams::new(16).ensemble_cap(Some(0)).check().is_err());
/// ```
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TrainParams(TrainValidParams);

impl TrainParams {
    /// Creates parameters that add `n_trees` new trees to the forest
    ///
    /// By default no weight channel is used and the size of the forest is not capped.
    pub fn new(n_trees: usize) -> Self {
        Self(TrainValidParams {
            n_trees,
            weight_channel: None,
            ensemble_cap: None,
        })
    }

    /// Sets the number of new trees to grow
    pub fn n_trees(mut self, n_trees: usize) -> Self {
        self.0.n_trees = n_trees;
        self
    }

    /// Sets the channel whose first feature weights the exemplars
    pub fn weight_channel(mut self, channel: Option<&str>) -> Self {
        self.0.weight_channel = channel.map(str::to_string);
        self
    }

    /// Sets the maximum number of trees kept after training
    ///
    /// Once the forest grows beyond the cap the trees with the highest out-of-bag error are
    /// dropped. This is what keeps incremental learning bounded.
    ///
    /// The cap must be at least one.
    pub fn ensemble_cap(mut self, cap: Option<usize>) -> Self {
        self.0.ensemble_cap = cap;
        self
    }
}

impl ParamGuard for TrainParams {
    type Checked = TrainValidParams;
    type Error = ForestError;

    fn check_ref(&self) -> Result<&Self::Checked, Self::Error> {
        if self.0.ensemble_cap == Some(0) {
            Err(ForestError::Range(
                "ensemble cap should be at least one, but was 0".to_string(),
            ))
        } else if self.0.weight_channel.as_deref() == Some("") {
            Err(ForestError::InvalidArgument(
                "weight channel name must not be empty".to_string(),
            ))
        } else {
            Ok(&self.0)
        }
    }

    fn check(self) -> Result<Self::Checked, Self::Error> {
        self.check_ref()?;
        Ok(self.0)
    }
}
