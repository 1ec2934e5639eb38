//! Recording collaborators shared by the integration tests
#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use ndarray::{Array1, Array2, ArrayView1};
use num_traits::ToPrimitive;
use rand::Rng;
use sylva::error::{Error, Result};
use sylva::traits::{Generator, Goal, Pruner, Tree};
use sylva::{Accumulation, ExemplarStore, Exemplars};
use sylva_forest::{Forest, Resample};

/// A call made into a tree
#[derive(Clone, Debug, PartialEq)]
pub enum Call {
    Grow {
        indices: Vec<usize>,
        weights: Vec<f32>,
    },
    Extend {
        indices: Vec<usize>,
        weights: Vec<f32>,
    },
    Error {
        indices: Vec<usize>,
        weights: Option<Vec<f32>>,
        incremental: bool,
    },
}

/// Log of tree calls, shared between all clones
///
/// A silent recorder skips building the calls, which keeps benchmarks from measuring it.
#[derive(Clone, Debug)]
pub struct Recorder {
    calls: Arc<Mutex<Vec<Call>>>,
    enabled: bool,
}

impl Default for Recorder {
    fn default() -> Self {
        Recorder {
            calls: Arc::default(),
            enabled: true,
        }
    }
}

impl Recorder {
    pub fn silent() -> Self {
        Recorder {
            enabled: false,
            ..Recorder::default()
        }
    }

    pub fn record<F: FnOnce() -> Call>(&self, call: F) {
        if self.enabled {
            self.calls.lock().unwrap().push(call());
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.calls.lock().unwrap().clear();
    }

    pub fn grows(&self) -> Vec<(Vec<usize>, Vec<f32>)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Grow { indices, weights } => Some((indices, weights)),
                _ => None,
            })
            .collect()
    }

    pub fn extends(&self) -> Vec<(Vec<usize>, Vec<f32>)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Extend { indices, weights } => Some((indices, weights)),
                _ => None,
            })
            .collect()
    }

    pub fn errors(&self) -> Vec<(Vec<usize>, Option<Vec<f32>>, bool)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Error {
                    indices,
                    weights,
                    incremental,
                } => Some((indices, weights, incremental)),
                _ => None,
            })
            .collect()
    }
}

fn label_of<S: ExemplarStore + ?Sized>(store: &S, exemplar: usize) -> usize {
    store
        .channel_index("label")
        .and_then(|channel| store.value(channel, exemplar, 0))
        .and_then(|value| value.to_usize())
        .unwrap_or(0)
}

fn argmax(values: ArrayView1<f32>) -> usize {
    let mut best = 0;
    for (idx, value) in values.iter().enumerate() {
        if *value > values[best] {
            best = idx;
        }
    }
    best
}

/// Weighted class votes over the `label` channel
#[derive(Clone, Debug)]
pub struct Vote {
    pub classes: usize,
    pub recorder: Recorder,
}

impl Vote {
    pub fn new(classes: usize) -> Self {
        Vote {
            classes,
            recorder: Recorder::default(),
        }
    }
}

impl Goal for Vote {
    type Stats = Array1<f32>;
    type Accumulator = Vec<Array1<f32>>;
    type Merged = Array1<f32>;
    type Decision = usize;

    fn stats<S: ExemplarStore + ?Sized>(
        &self,
        store: &S,
        indices: &[usize],
        weights: Option<ArrayView1<f32>>,
    ) -> Array1<f32> {
        let mut counts = Array1::zeros(self.classes);
        for &idx in indices {
            let label = label_of(store, idx).min(self.classes - 1);
            counts[label] += weights.map_or(1.0, |w| w[idx]);
        }
        counts
    }

    fn accumulate(&self, acc: &mut Vec<Array1<f32>>, stats: &Array1<f32>) {
        acc.push(stats.clone());
    }

    fn merge(&self, acc: &Vec<Array1<f32>>) -> Array1<f32> {
        let mut merged = Array1::zeros(self.classes);
        for dist in acc {
            merged += dist;
        }
        if !acc.is_empty() {
            merged /= acc.len() as f32;
        }
        merged
    }

    fn best(&self, merged: &Array1<f32>) -> usize {
        argmax(merged.view())
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
pub struct StopAlways;

impl Pruner for StopAlways {
    fn should_stop(&self, _depth: usize, _indices: &[usize], _weights: ArrayView1<f32>) -> bool {
        true
    }
}

/// A single leaf holding weighted class counts
#[derive(Clone, Debug)]
pub struct Stump {
    pub counts: Array1<f32>,
}

impl Stump {
    fn prediction(&self) -> usize {
        argmax(self.counts.view())
    }
}

impl Tree for Stump {
    type Goal = Vote;
    type Generator = NoSplit;
    type Pruner = StopAlways;

    fn grow<S: ExemplarStore + ?Sized>(
        goal: &Vote,
        generator: &NoSplit,
        pruner: &StopAlways,
        store: &S,
        indices: &[usize],
        weights: ArrayView1<f32>,
    ) -> Result<Self> {
        goal.recorder.record(|| Call::Grow {
            indices: indices.to_vec(),
            weights: weights.to_vec(),
        });

        if !pruner.should_stop(0, indices, weights) {
            let _ = generator.propose(store, indices, weights);
        }

        Ok(Stump {
            counts: goal.stats(store, indices, Some(weights)),
        })
    }

    fn extend<S: ExemplarStore + ?Sized>(
        &mut self,
        goal: &Vote,
        _generator: &NoSplit,
        store: &S,
        indices: &[usize],
        weights: ArrayView1<f32>,
    ) -> Result<()> {
        goal.recorder.record(|| Call::Extend {
            indices: indices.to_vec(),
            weights: weights.to_vec(),
        });

        self.counts += &goal.stats(store, indices, Some(weights));
        Ok(())
    }

    fn error<S: ExemplarStore + ?Sized>(
        &self,
        goal: &Vote,
        _generator: &NoSplit,
        store: &S,
        indices: &[usize],
        weights: Option<ArrayView1<f32>>,
        incremental: bool,
    ) -> Result<f64> {
        goal.recorder.record(|| Call::Error {
            indices: indices.to_vec(),
            weights: weights.map(|w| w.to_vec()),
            incremental,
        });

        if indices.is_empty() {
            return Err(Error::Tree("scored without held out exemplars".to_string()));
        }

        let predicted = self.prediction();
        let (mut wrong, mut total) = (0.0f64, 0.0f64);
        for &idx in indices {
            let w = weights.map_or(1.0, |w| w[idx]) as f64;
            total += w;
            if label_of(store, idx) != predicted {
                wrong += w;
            }
        }

        Ok(if total > 0.0 { wrong / total } else { 0.0 })
    }

    fn evaluate<S: ExemplarStore + ?Sized>(
        &self,
        goal: &Vote,
        _generator: &NoSplit,
        _store: &S,
        indices: &[usize],
        acc: &mut Accumulation<Vec<Array1<f32>>>,
    ) -> Result<()> {
        let sum = self.counts.sum();
        let dist = if sum > 0.0 {
            &self.counts / sum
        } else {
            self.counts.clone()
        };

        for &idx in indices {
            acc.add(goal, idx, &dist);
        }
        Ok(())
    }

    fn node_count(&self) -> usize {
        1
    }
}

/// Replays prepared replication counts, one vector per draw
#[derive(Clone, Debug, Default)]
pub struct Script(Arc<Mutex<VecDeque<Vec<u32>>>>);

impl Script {
    pub fn new(draws: Vec<Vec<u32>>) -> Self {
        Script(Arc::new(Mutex::new(draws.into_iter().collect())))
    }

    pub fn push(&self, draws: Vec<u32>) {
        self.0.lock().unwrap().push_back(draws);
    }

    pub fn remaining(&self) -> usize {
        self.0.lock().unwrap().len()
    }
}

impl Resample for Script {
    fn draw<R: Rng + ?Sized>(&self, _rng: &mut R, _count: usize) -> Result<Vec<u32>> {
        self.0
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| Error::Parameters("no scripted draws left".to_string()))
    }
}

/// A store with a `label` channel and a noisy `x` channel
pub fn labelled(labels: &[usize]) -> Exemplars<f64> {
    let label = Array2::from_shape_fn((labels.len(), 1), |(i, _)| labels[i] as f64);
    let x = Array2::from_shape_fn((labels.len(), 2), |(i, j)| (i * 3 + j) as f64 * 0.1);

    Exemplars::new()
        .with_channel("label", label)
        .unwrap()
        .with_channel("x", x)
        .unwrap()
}

/// A store with labels drawn from `rng`, mostly class 0
pub fn random_labelled<R: Rng>(n: usize, rng: &mut R) -> Exemplars<f64> {
    let labels = (0..n)
        .map(|_| if rng.gen_bool(0.7) { 0 } else { rng.gen_range(1..3) })
        .collect::<Vec<_>>();
    labelled(&labels)
}

pub fn scripted_forest(script: Script) -> (Forest<Stump, Script>, Recorder) {
    let goal = Vote::new(2);
    let recorder = goal.recorder.clone();
    (
        Forest::with_resampler(goal, NoSplit, StopAlways, script),
        recorder,
    )
}

/// A seeded forest whose trees do not record their calls
pub fn silent_forest(classes: usize, seed: u64) -> Forest<Stump> {
    let goal = Vote {
        classes,
        recorder: Recorder::silent(),
    };
    Forest::new(goal, NoSplit, StopAlways).with_seed(seed)
}

pub fn seeded_forest(classes: usize, seed: u64) -> (Forest<Stump>, Recorder) {
    let goal = Vote::new(classes);
    let recorder = goal.recorder.clone();
    (
        Forest::new(goal, NoSplit, StopAlways).with_seed(seed),
        recorder,
    )
}
