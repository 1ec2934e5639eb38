use rayon::prelude::*;
use std::str::FromStr;
use sylva::traits::{Goal, Tree};
use sylva::{Accumulation, ExemplarStore};

#[cfg(feature = "serde")]
use serde_crate::{Deserialize, Serialize};

use crate::algorithm::Forest;
use crate::error::{ForestError, Result};

/// What [`Forest::evaluate`] returns for each exemplar
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EvalMode {
    /// The merged output of all trees
    Merged,
    /// The decision the goal derives from the merged output
    Decision,
    /// Both, merged output first
    Both,
}

impl FromStr for EvalMode {
    type Err = ForestError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "merged" => Ok(EvalMode::Merged),
            "decision" | "best" => Ok(EvalMode::Decision),
            "both" => Ok(EvalMode::Both),
            _ => Err(ForestError::InvalidArgument(format!(
                "unknown evaluation mode {:?}, expected \"merged\", \"decision\" or \"both\"",
                s
            ))),
        }
    }
}

/// Maps a `best` flag to a mode: `Some(false)` merges, `Some(true)` decides and `None` does both
impl From<Option<bool>> for EvalMode {
    fn from(best: Option<bool>) -> Self {
        match best {
            Some(false) => EvalMode::Merged,
            Some(true) => EvalMode::Decision,
            None => EvalMode::Both,
        }
    }
}

/// The answer of a forest for one exemplar
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Clone, Debug, PartialEq)]
pub enum Evaluation<M, D> {
    Merged(M),
    Decision(D),
    Both(M, D),
}

impl<M, D> Evaluation<M, D> {
    pub fn merged(&self) -> Option<&M> {
        match self {
            Evaluation::Merged(m) | Evaluation::Both(m, _) => Some(m),
            Evaluation::Decision(_) => None,
        }
    }

    pub fn decision(&self) -> Option<&D> {
        match self {
            Evaluation::Decision(d) | Evaluation::Both(_, d) => Some(d),
            Evaluation::Merged(_) => None,
        }
    }

    pub fn into_parts(self) -> (Option<M>, Option<D>) {
        match self {
            Evaluation::Merged(m) => (Some(m), None),
            Evaluation::Decision(d) => (None, Some(d)),
            Evaluation::Both(m, d) => (Some(m), Some(d)),
        }
    }
}

type GoalEvaluation<T> = Evaluation<
    <<T as Tree>::Goal as Goal>::Merged,
    <<T as Tree>::Goal as Goal>::Decision,
>;

impl<T: Tree, B> Forest<T, B> {
    /// Evaluates the forest for the exemplars at `indices`
    ///
    /// Every tree adds its statistics for each queried exemplar to a shared accumulation, which
    /// the goal then merges per exemplar. The result is aligned with `indices`. An empty forest
    /// yields whatever the goal merges from an empty accumulator.
    pub fn evaluate<S>(
        &self,
        store: &S,
        indices: &[usize],
        mode: EvalMode,
    ) -> Result<Vec<GoalEvaluation<T>>>
    where
        S: ExemplarStore + ?Sized,
    {
        let total = store.exemplar_count();
        if let Some(bad) = indices.iter().find(|&&idx| idx >= total) {
            return Err(ForestError::Range(format!(
                "exemplar index {} is out of bounds for a store of {} exemplars",
                bad, total
            )));
        }

        let mut acc = Accumulation::new();
        for entry in &self.trees {
            entry
                .tree
                .evaluate(&self.goal, &self.generator, store, indices, &mut acc)?;
        }

        let goal = &self.goal;
        Ok(indices
            .par_iter()
            .map(|&idx| {
                let merged = goal.merge(acc.get(idx));
                match mode {
                    EvalMode::Merged => Evaluation::Merged(merged),
                    EvalMode::Decision => Evaluation::Decision(goal.best(&merged)),
                    EvalMode::Both => {
                        let decision = goal.best(&merged);
                        Evaluation::Both(merged, decision)
                    }
                }
            })
            .collect())
    }

    /// Evaluates the forest for every exemplar of `store`
    pub fn evaluate_all<S>(&self, store: &S, mode: EvalMode) -> Result<Vec<GoalEvaluation<T>>>
    where
        S: ExemplarStore + ?Sized,
    {
        let indices = (0..store.exemplar_count()).collect::<Vec<_>>();
        self.evaluate(store, &indices, mode)
    }
}
