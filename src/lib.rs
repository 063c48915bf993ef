//! Classification metrics and k-fold cross-validation
//!
//! ```
//! use foldscore::{all_metrics, KFold};
//!
//! let report = all_metrics(&[0, 1, 0, 0], &[0, 1, 1, 0], &[0, 1]).unwrap();
//! assert_eq!(report.accuracy, 0.75);
//!
//! let splits = KFold::new(3).unwrap().with_random_state(42).split(10);
//! assert_eq!(splits.len(), 3);
//! assert!(splits.iter().all(|s| s.test.len() == 3));
//! ```

pub mod config;
pub mod error;
pub mod ml;

// Re-export commonly used types
pub use config::{CrossValidationConfig, CrossValidationConfigBuilder};
pub use error::{Error, Result};
pub use ml::metrics::{
    accuracy_metrics, all_metrics, binary_confusion_matrix, class_weights, euclidian_distance,
    f1_score_metrics, multilabel_confusion_matrix, precision_metrics, recall_metrics,
    ConfusionMatrix, ConfusionReport, MetricsReport, MultilabelConfusionMatrix, Scores,
};
pub use ml::model_selection::{
    cross_validation_scores, cross_validation_scores_with, mean_scores,
    par_cross_validation_scores_with, KFold, TrainTestSplit,
};
pub use ml::models::{Estimator, KNearestNeighbors};

// Export version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
