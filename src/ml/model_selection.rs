//! Model selection utilities
//!
//! This module provides the k-fold partitioner and the cross-validation
//! routines that drive an [`Estimator`] over the folds.

use crate::error::{ensure_same_length, Error, Result};
use crate::ml::metrics::classification::Scores;
use crate::ml::models::Estimator;
use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};
use rayon::prelude::*;

/// Default number of folds
pub const DEFAULT_N_SPLITS: usize = 10;

/// One cross-validation iteration
///
/// `test` is a single fold. `train` holds the remaining folds in fold order
/// and is intentionally kept nested; use [`TrainTestSplit::train_indices`]
/// to iterate the flattened training positions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrainTestSplit {
    /// The other `n_splits - 1` folds
    pub train: Vec<Vec<usize>>,
    /// The held-out fold
    pub test: Vec<usize>,
}

impl TrainTestSplit {
    /// Training positions, concatenated in fold order
    pub fn train_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.train.iter().flatten().copied()
    }

    /// Number of training positions
    pub fn train_len(&self) -> usize {
        self.train.iter().map(Vec::len).sum()
    }
}

/// K-Fold cross-validation splitter
///
/// Every fold holds `floor(n_samples / n_splits)` original dataset positions.
/// The `n_samples % n_splits` positions left over are not assigned to any fold.
///
/// With shuffling enabled (the default) the fold contents are drawn uniformly
/// at random without replacement; the draw is reproducible when a random
/// state is set. Without shuffling the folds are contiguous ranges.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KFold {
    n_splits: usize,
    shuffle: bool,
    random_state: Option<u64>,
}

impl KFold {
    /// Create a new KFold splitter
    ///
    /// # Errors
    /// Returns [`Error::InvalidConfiguration`] when `n_splits` is zero.
    pub fn new(n_splits: usize) -> Result<Self> {
        if n_splits == 0 {
            return Err(Error::InvalidConfiguration(
                "n_splits must be at least 1".to_string(),
            ));
        }
        Ok(KFold {
            n_splits,
            shuffle: true,
            random_state: None,
        })
    }

    /// Enable or disable shuffling
    pub fn with_shuffle(mut self, shuffle: bool) -> Self {
        self.shuffle = shuffle;
        self
    }

    /// Set random seed for shuffling
    pub fn with_random_state(mut self, seed: u64) -> Self {
        self.random_state = Some(seed);
        self
    }

    pub fn n_splits(&self) -> usize {
        self.n_splits
    }

    pub fn shuffle(&self) -> bool {
        self.shuffle
    }

    pub fn random_state(&self) -> Option<u64> {
        self.random_state
    }

    /// Number of positions in every fold
    pub fn fold_size(&self, n_samples: usize) -> usize {
        n_samples / self.n_splits
    }

    /// Number of positions that end up in no fold
    pub fn excluded_count(&self, n_samples: usize) -> usize {
        n_samples - self.fold_size(n_samples) * self.n_splits
    }

    /// Draw the fold index groups
    pub fn folds(&self, n_samples: usize) -> Vec<Vec<usize>> {
        let mut rng = self.make_rng();
        self.folds_with_rng(n_samples, &mut rng)
    }

    /// Draw the fold index groups from the given generator
    ///
    /// The generator is only consulted when shuffling is enabled.
    pub fn folds_with_rng<G: Rng>(&self, n_samples: usize, rng: &mut G) -> Vec<Vec<usize>> {
        let fold_size = self.fold_size(n_samples);
        let assigned = fold_size * self.n_splits;

        if fold_size == 0 {
            log::warn!(
                "{} samples cannot fill {} folds; every fold is empty",
                n_samples,
                self.n_splits
            );
            return vec![Vec::new(); self.n_splits];
        }
        if assigned < n_samples {
            log::debug!(
                "{} of {} samples are not assigned to any fold",
                n_samples - assigned,
                n_samples
            );
        }

        let mut pool: Vec<usize> = (0..n_samples).collect();
        if self.shuffle {
            // Partial Fisher-Yates: position i receives a uniform draw from the unassigned tail
            for i in 0..assigned {
                let j = rng.random_range(i..n_samples);
                pool.swap(i, j);
            }
        }
        pool.truncate(assigned);

        pool.chunks(fold_size).map(<[usize]>::to_vec).collect()
    }

    /// Generate train/test splits for each fold
    pub fn split(&self, n_samples: usize) -> Vec<TrainTestSplit> {
        pair_folds(self.folds(n_samples))
    }

    /// Generate train/test splits using the given generator
    pub fn split_with_rng<G: Rng>(&self, n_samples: usize, rng: &mut G) -> Vec<TrainTestSplit> {
        pair_folds(self.folds_with_rng(n_samples, rng))
    }

    fn make_rng(&self) -> StdRng {
        match self.random_state {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => {
                let mut seed_bytes = [0u8; 32];
                rand::rng().fill_bytes(&mut seed_bytes);
                StdRng::from_seed(seed_bytes)
            }
        }
    }
}

impl Default for KFold {
    fn default() -> Self {
        KFold {
            n_splits: DEFAULT_N_SPLITS,
            shuffle: true,
            random_state: None,
        }
    }
}

fn pair_folds(folds: Vec<Vec<usize>>) -> Vec<TrainTestSplit> {
    (0..folds.len())
        .map(|n| TrainTestSplit {
            train: folds
                .iter()
                .enumerate()
                .filter(|(i, _)| *i != n)
                .map(|(_, fold)| fold.clone())
                .collect(),
            test: folds[n].clone(),
        })
        .collect()
}

fn gather<R: Clone, L: Clone>(
    x: &[R],
    y: &[L],
    indices: impl Iterator<Item = usize>,
) -> (Vec<R>, Vec<L>) {
    indices.map(|i| (x[i].clone(), y[i].clone())).unzip()
}

fn run_fold<M, R, L>(
    estimator: &mut M,
    x: &[R],
    y: &[L],
    fold: usize,
    split: &TrainTestSplit,
) -> std::result::Result<Scores, M::Error>
where
    M: Estimator<R, L>,
    R: Clone,
    L: Clone,
{
    let (x_train, y_train) = gather(x, y, split.train_indices());
    let (x_test, y_test) = gather(x, y, split.test.iter().copied());
    log::debug!(
        "fold {}: {} training rows, {} test rows",
        fold,
        y_train.len(),
        y_test.len()
    );

    estimator.train(&x_train, &y_train)?;
    let report = estimator.evaluate(&x_test, &y_test)?;
    Ok(report.into_scores())
}

/// Cross-validate an estimator over `n_folds` shuffled folds
///
/// # Arguments
/// * `estimator` - Trained once per fold, in place
/// * `x` - Feature rows
/// * `y` - Labels, parallel to `x`
/// * `n_folds` - Number of folds
///
/// # Returns
/// One [`Scores`] per fold, ordered by fold index. Errors from the
/// estimator are returned unchanged.
pub fn cross_validation_scores<M, R, L>(
    estimator: &mut M,
    x: &[R],
    y: &[L],
    n_folds: usize,
) -> std::result::Result<Vec<Scores>, M::Error>
where
    M: Estimator<R, L>,
    R: Clone,
    L: Clone,
{
    let kfold = KFold::new(n_folds)?;
    cross_validation_scores_with(estimator, x, y, &kfold)
}

/// Cross-validate an estimator over the folds of the given splitter
pub fn cross_validation_scores_with<M, R, L>(
    estimator: &mut M,
    x: &[R],
    y: &[L],
    kfold: &KFold,
) -> std::result::Result<Vec<Scores>, M::Error>
where
    M: Estimator<R, L>,
    R: Clone,
    L: Clone,
{
    ensure_same_length(x.len(), y.len())?;

    let splits = kfold.split(x.len());
    let mut scores = Vec::with_capacity(splits.len());
    for (fold, split) in splits.iter().enumerate() {
        scores.push(run_fold(estimator, x, y, fold, split)?);
    }

    Ok(scores)
}

/// Cross-validate folds in parallel
///
/// Each fold trains its own clone of `estimator`. Results are ordered by fold
/// index, and when several folds fail the error of the lowest fold is returned.
pub fn par_cross_validation_scores_with<M, R, L>(
    estimator: &M,
    x: &[R],
    y: &[L],
    kfold: &KFold,
) -> std::result::Result<Vec<Scores>, M::Error>
where
    M: Estimator<R, L> + Clone + Send + Sync,
    M::Error: Send,
    R: Clone + Sync,
    L: Clone + Sync,
{
    ensure_same_length(x.len(), y.len())?;

    let splits = kfold.split(x.len());
    let results: Vec<std::result::Result<Scores, M::Error>> = splits
        .par_iter()
        .enumerate()
        .map(|(fold, split)| {
            let mut model = estimator.clone();
            run_fold(&mut model, x, y, fold, split)
        })
        .collect();

    results.into_iter().collect()
}

/// Per-metric mean over folds
pub fn mean_scores(scores: &[Scores]) -> Option<Scores> {
    if scores.is_empty() {
        return None;
    }

    let n = scores.len() as f64;
    let sum = scores.iter().fold(
        Scores {
            accuracy: 0.0,
            precision: 0.0,
            recall: 0.0,
            f1_score: 0.0,
        },
        |acc, s| Scores {
            accuracy: acc.accuracy + s.accuracy,
            precision: acc.precision + s.precision,
            recall: acc.recall + s.recall,
            f1_score: acc.f1_score + s.f1_score,
        },
    );

    Some(Scores {
        accuracy: sum.accuracy / n,
        precision: sum.precision / n,
        recall: sum.recall / n,
        f1_score: sum.f1_score / n,
    })
}
