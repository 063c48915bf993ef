//! K-Nearest Neighbors implementation
//!
//! This module provides a k-nearest-neighbour classifier over numeric rows.
//! The last component of every row is reserved for the label and is ignored
//! by the distance computation.

use crate::error::{ensure_same_length, Error, Result};
use crate::ml::metrics::classification::{all_metrics, MetricsReport};
use crate::ml::metrics::distance::euclidian_distance;
use crate::ml::models::Estimator;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Configuration for the k-nearest-neighbour classifier
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KNearestNeighborsConfig {
    /// Number of neighbours taking part in the vote
    pub k: usize,
}

impl Default for KNearestNeighborsConfig {
    fn default() -> Self {
        KNearestNeighborsConfig { k: 5 }
    }
}

/// Builder for KNearestNeighborsConfig
pub struct KNearestNeighborsConfigBuilder {
    config: KNearestNeighborsConfig,
}

impl KNearestNeighborsConfigBuilder {
    pub fn new() -> Self {
        KNearestNeighborsConfigBuilder {
            config: KNearestNeighborsConfig::default(),
        }
    }

    pub fn k(mut self, k: usize) -> Self {
        self.config.k = k;
        self
    }

    pub fn build(self) -> KNearestNeighborsConfig {
        self.config
    }
}

impl Default for KNearestNeighborsConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// K-Nearest Neighbors Classifier
///
/// Predicts the majority label among the `k` closest training rows.
/// Ties are broken in favour of the smallest label.
#[derive(Debug, Clone)]
pub struct KNearestNeighbors<L> {
    config: KNearestNeighborsConfig,
    rows: Vec<Vec<f64>>,
    labels: Vec<L>,
}

impl<L: Ord + Clone> KNearestNeighbors<L> {
    /// Create a new classifier
    pub fn new(config: KNearestNeighborsConfig) -> Self {
        KNearestNeighbors {
            config,
            rows: Vec::new(),
            labels: Vec::new(),
        }
    }

    /// Create with default configuration
    pub fn default_config() -> Self {
        Self::new(KNearestNeighborsConfig::default())
    }

    pub fn is_fitted(&self) -> bool {
        !self.rows.is_empty()
    }

    /// Sorted distinct labels seen during training
    pub fn classes(&self) -> Vec<L> {
        let mut classes = self.labels.clone();
        classes.sort();
        classes.dedup();
        classes
    }

    /// Predict a label for every row
    pub fn predict(&self, x: &[Vec<f64>]) -> Result<Vec<L>> {
        if !self.is_fitted() {
            return Err(Error::InvalidInput(
                "Model has not been trained yet".to_string(),
            ));
        }
        x.iter().map(|row| self.predict_row(row)).collect()
    }

    fn predict_row(&self, row: &[f64]) -> Result<L> {
        let mut neighbours = self
            .rows
            .iter()
            .zip(&self.labels)
            .map(|(train_row, label)| {
                euclidian_distance(row, train_row.as_slice()).map(|d| (d, label))
            })
            .collect::<Result<Vec<(f64, &L)>>>()?;
        neighbours.sort_by(|a, b| a.0.total_cmp(&b.0));

        let mut votes: BTreeMap<&L, usize> = BTreeMap::new();
        for (_, label) in neighbours.iter().take(self.config.k) {
            *votes.entry(*label).or_insert(0) += 1;
        }

        let mut best: Option<(&L, usize)> = None;
        for (label, count) in votes {
            if best.map_or(true, |(_, c)| count > c) {
                best = Some((label, count));
            }
        }

        best.map(|(label, _)| label.clone())
            .ok_or_else(|| Error::InvalidInput("No neighbours available".to_string()))
    }
}

impl<L: Ord + Clone> Estimator<Vec<f64>, L> for KNearestNeighbors<L> {
    type Error = Error;

    fn train(&mut self, x: &[Vec<f64>], y: &[L]) -> Result<()> {
        ensure_same_length(x.len(), y.len())?;
        if self.config.k == 0 {
            return Err(Error::InvalidConfiguration(
                "k must be at least 1".to_string(),
            ));
        }
        if x.is_empty() {
            return Err(Error::InvalidInput("Training set is empty".to_string()));
        }

        self.rows = x.to_vec();
        self.labels = y.to_vec();
        log::debug!(
            "trained {}-nearest-neighbour classifier on {} rows",
            self.config.k,
            self.rows.len()
        );

        Ok(())
    }

    /// Scores the predictions with `all_metrics` over the sorted union of the
    /// training and evaluation labels.
    fn evaluate(&self, x: &[Vec<f64>], y: &[L]) -> Result<MetricsReport<L>> {
        ensure_same_length(x.len(), y.len())?;
        let y_pred = self.predict(x)?;

        let mut labels = self.classes();
        labels.extend(y.iter().cloned());
        labels.sort();
        labels.dedup();

        all_metrics(&y_pred, y, &labels)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ml::metrics::classification::ConfusionReport;

    fn create_classification_data() -> (Vec<Vec<f64>>, Vec<u8>) {
        let x = vec![
            vec![1.0, 1.0, 0.0],
            vec![1.2, 0.8, 0.0],
            vec![0.9, 1.1, 0.0],
            vec![5.0, 5.0, 0.0],
            vec![5.2, 4.9, 0.0],
            vec![4.8, 5.1, 0.0],
        ];
        let y = vec![0, 0, 0, 1, 1, 1];
        (x, y)
    }

    #[test]
    fn test_knn_predict() {
        let (x, y) = create_classification_data();
        let mut model = KNearestNeighbors::new(KNearestNeighborsConfigBuilder::new().k(3).build());
        model.train(&x, &y).unwrap();

        // the label slot must not influence the distance
        let queries = vec![vec![1.1, 1.0, 99.0], vec![5.1, 5.0, -99.0]];
        assert_eq!(model.predict(&queries).unwrap(), vec![0, 1]);
    }

    #[test]
    fn test_knn_tie_prefers_smallest_label() {
        let x = vec![vec![0.0, 0.0], vec![2.0, 0.0]];
        let y = vec![7, 3];
        let mut model = KNearestNeighbors::new(KNearestNeighborsConfigBuilder::new().k(2).build());
        model.train(&x, &y).unwrap();

        assert_eq!(model.predict(&[vec![1.0, 0.0]]).unwrap(), vec![3]);
    }

    #[test]
    fn test_knn_evaluate() {
        let (x, y) = create_classification_data();
        let mut model = KNearestNeighbors::new(KNearestNeighborsConfigBuilder::new().k(1).build());
        model.train(&x, &y).unwrap();

        let report = model.evaluate(&x, &y).unwrap();
        assert!(matches!(report.confusion_matrix, ConfusionReport::Binary(_)));
        assert!((report.accuracy - 1.0).abs() < 1e-12);
        assert!((report.f1_score - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_knn_errors() {
        let model: KNearestNeighbors<u8> = KNearestNeighbors::default_config();
        assert!(matches!(
            model.predict(&[vec![0.0, 0.0]]),
            Err(Error::InvalidInput(_))
        ));

        let mut model = KNearestNeighbors::new(KNearestNeighborsConfigBuilder::new().k(0).build());
        let (x, y) = create_classification_data();
        assert!(matches!(
            model.train(&x, &y),
            Err(Error::InvalidConfiguration(_))
        ));

        let mut model: KNearestNeighbors<u8> = KNearestNeighbors::default_config();
        assert!(matches!(
            model.train(&x, &y[..2]),
            Err(Error::LengthMismatch { .. })
        ));
    }
}
